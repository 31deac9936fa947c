//! Inventory document model and rendering
//!
//! The Ansible dynamic inventory shape: per-host variables under the
//! top-level `_meta.hostvars` key, plus one sibling top-level key per
//! group holding the member hostnames as a JSON array.

use crate::api::types::RawInstance;
use crate::error::Result;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const META_KEY: &str = "_meta";

// =============================================================================
// Host Record
// =============================================================================

/// One hostvars entry: the normalized instance plus the derived
/// `ansible_host` address.
#[derive(Debug, Clone, Serialize)]
pub struct HostRecord {
    #[serde(flatten)]
    instance: RawInstance,
    /// First userData value flattened to a plain string
    #[serde(rename = "userData")]
    user_data: String,
    ansible_host: String,
}

impl HostRecord {
    /// Normalize an instance into its hostvars form. The raw `userData`
    /// sequence collapses to its first value (or the empty string).
    pub fn new(mut instance: RawInstance, ansible_host: String) -> Self {
        let user_data = instance.user_data_string();
        // emptied so the flattened instance doesn't also serialize it
        instance.user_data.clear();
        Self {
            instance,
            user_data,
            ansible_host,
        }
    }

    pub fn ansible_host(&self) -> &str {
        &self.ansible_host
    }
}

// =============================================================================
// Inventory Document
// =============================================================================

/// The complete inventory: hostvars plus group membership.
///
/// Groups hold their members as sets, so an instance reported twice
/// under the same FQDN lands in each group once. Ordered maps keep the
/// rendered JSON keys sorted without a separate sort pass.
#[derive(Debug, Default)]
pub struct InventoryDocument {
    hostvars: BTreeMap<String, HostRecord>,
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl InventoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no instance was admitted
    pub fn is_empty(&self) -> bool {
        self.hostvars.is_empty() && self.groups.is_empty()
    }

    pub fn contains_host(&self, fqdn: &str) -> bool {
        self.hostvars.contains_key(fqdn)
    }

    /// Record hostvars for a host, replacing any earlier entry
    pub fn insert_host(&mut self, fqdn: String, record: HostRecord) {
        self.hostvars.insert(fqdn, record);
    }

    /// Add a host to a group, creating the group on first use
    pub fn add_to_group(&mut self, group: String, fqdn: String) {
        self.groups.entry(group).or_default().insert(fqdn);
    }

    pub fn host_vars(&self, fqdn: &str) -> Option<&HostRecord> {
        self.hostvars.get(fqdn)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hostvars.keys().map(String::as_str)
    }

    pub fn group(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Render the full document as pretty JSON: 2-space indent, keys
    /// sorted at every level (rendering goes through `Value`, whose
    /// object map is ordered).
    pub fn to_json_pretty(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Render one host's variables as pretty JSON; an unknown host
    /// renders as an empty object, per the dynamic inventory contract.
    pub fn host_vars_json_pretty(&self, fqdn: &str) -> Result<String> {
        match self.hostvars.get(fqdn) {
            Some(record) => {
                let value = serde_json::to_value(record)?;
                Ok(serde_json::to_string_pretty(&value)?)
            }
            None => Ok("{}".to_string()),
        }
    }
}

#[derive(Serialize)]
struct Meta<'a> {
    hostvars: &'a BTreeMap<String, HostRecord>,
}

impl Serialize for InventoryDocument {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let meta = Meta {
            hostvars: &self.hostvars,
        };

        // Keep the whole top level key-sorted: `_meta` is written at its
        // sort position among the group names.
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        let mut meta_written = false;
        for (name, members) in &self.groups {
            if !meta_written && META_KEY < name.as_str() {
                map.serialize_entry(META_KEY, &meta)?;
                meta_written = true;
            }
            map.serialize_entry(name, members)?;
        }
        if !meta_written {
            map.serialize_entry(META_KEY, &meta)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(fqdn: &str) -> HostRecord {
        let instance: RawInstance = serde_json::from_value(serde_json::json!({
            "id": 1,
            "fullyQualifiedDomainName": fqdn,
            "maxCpu": 2,
            "maxMemory": 4096
        }))
        .unwrap();
        HostRecord::new(instance, "10.0.0.1".to_string())
    }

    #[test]
    fn test_empty_document_shape() {
        let document = InventoryDocument::new();
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value, serde_json::json!({"_meta": {"hostvars": {}}}));
    }

    #[test]
    fn test_groups_render_as_top_level_arrays() {
        let mut document = InventoryDocument::new();
        document.insert_host("a.example.com".to_string(), make_record("a.example.com"));
        document.add_to_group("ams01".to_string(), "a.example.com".to_string());

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["ams01"], serde_json::json!(["a.example.com"]));
        assert_eq!(
            value["_meta"]["hostvars"]["a.example.com"]["ansible_host"],
            "10.0.0.1"
        );
    }

    #[test]
    fn test_top_level_keys_sorted_with_meta_in_place() {
        let mut document = InventoryDocument::new();
        // "UBUNTU..." sorts before "_meta", "ams01" after
        document.add_to_group("UBUNTU_22_64".to_string(), "a.example.com".to_string());
        document.add_to_group("ams01".to_string(), "a.example.com".to_string());

        let rendered = serde_json::to_string(&document).unwrap();
        let ubuntu = rendered.find("\"UBUNTU_22_64\"").unwrap();
        let meta = rendered.find("\"_meta\"").unwrap();
        let ams = rendered.find("\"ams01\"").unwrap();
        assert!(ubuntu < meta && meta < ams);
    }

    #[test]
    fn test_group_membership_is_set_semantics() {
        let mut document = InventoryDocument::new();
        document.add_to_group("ams01".to_string(), "a.example.com".to_string());
        document.add_to_group("ams01".to_string(), "a.example.com".to_string());
        assert_eq!(document.group("ams01").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_host_vars_render_empty_object() {
        let document = InventoryDocument::new();
        assert_eq!(
            document.host_vars_json_pretty("missing.example.com").unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_host_record_user_data_not_duplicated() {
        let instance: RawInstance = serde_json::from_value(serde_json::json!({
            "id": 1,
            "fullyQualifiedDomainName": "a.example.com",
            "userData": [{"value": "abc"}, {"value": "ignored"}]
        }))
        .unwrap();
        let record = HostRecord::new(instance, "10.0.0.1".to_string());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userData"], "abc");
    }
}

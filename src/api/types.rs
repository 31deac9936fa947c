//! SoftLayer wire types
//!
//! Instance records as the account service returns them. Every field is
//! conditionally present on the wire, so each one is an `Option`; absent
//! fields stay absent when a record is re-serialized into hostvars.

use serde::{Deserialize, Serialize};

// =============================================================================
// Object Masks
// =============================================================================

/// Object mask for the account virtual guest listing
pub const VIRTUAL_GUEST_MASK: &str = "mask[id,globalIdentifier,hostname,domain,\
fullyQualifiedDomainName,primaryBackendIpAddress,primaryIpAddress,datacenter,\
tagReferences.tag.name,userData.value,lastKnownPowerState.name,powerState,\
maxCpu,maxMemory,activeTransaction.transactionStatus[friendlyName,name],status]";

/// Object mask for the account bare-metal server listing
pub const HARDWARE_MASK: &str = "mask[id,globalIdentifier,hostname,domain,\
fullyQualifiedDomainName,primaryBackendIpAddress,primaryIpAddress,datacenter,\
tagReferences.tag.name,userData.value,hardwareStatusId,\
processorPhysicalCoreAmount,memoryCapacity]";

/// Object mask for the per-instance operating system lookup
pub const OPERATING_SYSTEM_MASK: &str =
    "mask[operatingSystem.softwareLicense.softwareDescription]";

// =============================================================================
// Sub-Records
// =============================================================================

/// A `{name: ...}` sub-record (status, power state, datacenter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One `userData` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One tag reference (`tagReferences[].tag.name`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An in-flight provisioning transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<TransactionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

// =============================================================================
// Raw Instance
// =============================================================================

/// A compute instance as returned by the account listing.
///
/// Covers both virtual guests and bare-metal servers; `hardwareStatusId`
/// only appears on the latter, `status`/`powerState` only on the former.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fully_qualified_domain_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_backend_ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<NamedResource>,

    /// Virtual guest lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NamedResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_state: Option<NamedResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_known_power_state: Option<NamedResource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_transaction: Option<ActiveTransaction>,

    /// Bare-metal lifecycle status id; 5 means in service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_status_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<i64>,

    /// Memory in MiB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_data: Vec<UserDataEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_references: Vec<TagReference>,
}

impl RawInstance {
    /// First `userData` entry as a plain string, empty when none exists.
    pub fn user_data_string(&self) -> String {
        self.user_data
            .first()
            .and_then(|entry| entry.value.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Bare-Metal Servers
// =============================================================================

/// A bare-metal server as returned by the account hardware listing.
///
/// Hardware reports its shape through different fields than virtual
/// guests do; [`HardwareInstance::into_raw`] maps them onto the common
/// record so one classifier covers both fleets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareInstance {
    pub id: Option<i64>,
    pub global_identifier: Option<String>,
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub fully_qualified_domain_name: Option<String>,
    pub primary_ip_address: Option<String>,
    pub primary_backend_ip_address: Option<String>,
    pub datacenter: Option<NamedResource>,
    pub hardware_status_id: Option<i64>,
    pub processor_physical_core_amount: Option<i64>,
    /// Memory in GiB
    pub memory_capacity: Option<i64>,
    #[serde(default)]
    pub user_data: Vec<UserDataEntry>,
    #[serde(default)]
    pub tag_references: Vec<TagReference>,
}

impl HardwareInstance {
    /// Convert to the common record shape. Physical cores become
    /// `maxCpu` and memory reported in GiB becomes MiB.
    pub fn into_raw(self) -> RawInstance {
        RawInstance {
            id: self.id,
            global_identifier: self.global_identifier,
            hostname: self.hostname,
            domain: self.domain,
            fully_qualified_domain_name: self.fully_qualified_domain_name,
            primary_ip_address: self.primary_ip_address,
            primary_backend_ip_address: self.primary_backend_ip_address,
            datacenter: self.datacenter,
            status: None,
            power_state: None,
            last_known_power_state: None,
            active_transaction: None,
            hardware_status_id: self.hardware_status_id,
            max_cpu: self.processor_physical_core_amount,
            max_memory: self.memory_capacity.map(|gib| gib * 1024),
            user_data: self.user_data,
            tag_references: self.tag_references,
        }
    }
}

// =============================================================================
// Operating System Lookup
// =============================================================================

/// Response of the masked per-instance `getObject` call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemDetail {
    pub operating_system: Option<OperatingSystemRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemRef {
    pub software_license: Option<SoftwareLicense>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareLicense {
    pub software_description: Option<SoftwareDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareDescription {
    pub reference_code: Option<String>,
}

impl OperatingSystemDetail {
    /// The OS reference code, when the license chain is fully populated.
    pub fn reference_code(self) -> Option<String> {
        self.operating_system?
            .software_license?
            .software_description?
            .reference_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_virtual_guest() {
        let json = serde_json::json!({
            "id": 12345,
            "fullyQualifiedDomainName": "web01.example.com",
            "hostname": "web01",
            "domain": "example.com",
            "primaryIpAddress": "169.44.1.2",
            "primaryBackendIpAddress": "10.44.1.2",
            "datacenter": {"name": "ams01"},
            "status": {"name": "Active"},
            "powerState": {"name": "Running"},
            "maxCpu": 4,
            "maxMemory": 8192,
            "userData": [{"value": "#cloud-config"}],
            "tagReferences": [{"tag": {"name": "web"}}]
        });

        let instance: RawInstance = serde_json::from_value(json).unwrap();
        assert_eq!(instance.id, Some(12345));
        assert_eq!(
            instance.fully_qualified_domain_name.as_deref(),
            Some("web01.example.com")
        );
        assert_eq!(
            instance.datacenter.as_ref().and_then(|d| d.name.as_deref()),
            Some("ams01")
        );
        assert_eq!(instance.max_memory, Some(8192));
        assert_eq!(instance.user_data_string(), "#cloud-config");
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let instance: RawInstance = serde_json::from_value(serde_json::json!({
            "id": 99
        }))
        .unwrap();
        assert!(instance.status.is_none());
        assert!(instance.fully_qualified_domain_name.is_none());
        assert!(instance.user_data.is_empty());
        assert_eq!(instance.user_data_string(), "");
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let instance: RawInstance =
            serde_json::from_value(serde_json::json!({"id": 99})).unwrap();
        let value = serde_json::to_value(&instance).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("id"));
    }

    #[test]
    fn test_hardware_conversion() {
        let hardware: HardwareInstance = serde_json::from_value(serde_json::json!({
            "id": 777,
            "fullyQualifiedDomainName": "db01.example.com",
            "hardwareStatusId": 5,
            "processorPhysicalCoreAmount": 16,
            "memoryCapacity": 64
        }))
        .unwrap();

        let raw = hardware.into_raw();
        assert_eq!(raw.hardware_status_id, Some(5));
        assert_eq!(raw.max_cpu, Some(16));
        assert_eq!(raw.max_memory, Some(64 * 1024));
        assert!(raw.status.is_none());
        assert!(raw.power_state.is_none());
    }

    #[test]
    fn test_os_reference_code() {
        let detail: OperatingSystemDetail = serde_json::from_value(serde_json::json!({
            "operatingSystem": {
                "softwareLicense": {
                    "softwareDescription": {"referenceCode": "UBUNTU_22_64"}
                }
            }
        }))
        .unwrap();
        assert_eq!(detail.reference_code().as_deref(), Some("UBUNTU_22_64"));

        let partial: OperatingSystemDetail =
            serde_json::from_value(serde_json::json!({"operatingSystem": {}})).unwrap();
        assert_eq!(partial.reference_code(), None);
    }
}

//! Instance classification and grouping
//!
//! Turns raw compute records into an Ansible inventory. A filter chain
//! decides which instances are reachable, then each admitted instance is
//! normalized into a hostvars entry and pushed into its datacenter,
//! domain, CPU/memory shape, and operating-system groups.

use crate::api::types::RawInstance;
use crate::error::{Error, Result};
use crate::inventory::document::{HostRecord, InventoryDocument};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

// =============================================================================
// Constants
// =============================================================================

const ACTIVE_STATUS: &str = "Active";
const RUNNING_POWER_STATE: &str = "Running";
/// Hardware status id for an in-service bare-metal server
const HARDWARE_STATUS_ACTIVE: i64 = 5;

// =============================================================================
// Operating System Lookup
// =============================================================================

/// Per-instance operating system lookup, keyed by provider id.
///
/// `None` means the provider has no software description for this id;
/// an error means the lookup itself failed and the caller decides how
/// much of the instance survives.
#[async_trait]
pub trait OperatingSystemLookup: Send + Sync {
    async fn operating_system(&self, id: i64) -> Result<Option<String>>;
}

// =============================================================================
// Classifier Configuration
// =============================================================================

/// Configuration for the inventory classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Maximum in-flight operating system lookups
    pub lookup_concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            lookup_concurrency: 8,
        }
    }
}

// =============================================================================
// Filter Chain
// =============================================================================

/// Why an instance was left out of the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NotActive,
    NotRunning,
    HardwareNotInService,
    MissingFqdn,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotActive => write!(f, "status is not Active"),
            SkipReason::NotRunning => write!(f, "power state is not Running"),
            SkipReason::HardwareNotInService => write!(f, "hardware status is not in service"),
            SkipReason::MissingFqdn => write!(f, "no fully qualified domain name"),
        }
    }
}

/// Evaluate the admission filters in order.
///
/// The status, power state, and hardware status guards pass when their
/// field is absent; the FQDN guard fails when absent, since an instance
/// without one cannot be addressed.
fn skip_reason(instance: &RawInstance) -> Option<SkipReason> {
    let status = instance.status.as_ref().and_then(|s| s.name.as_deref());
    if matches!(status, Some(name) if name != ACTIVE_STATUS) {
        return Some(SkipReason::NotActive);
    }

    let power = instance.power_state.as_ref().and_then(|s| s.name.as_deref());
    if matches!(power, Some(name) if name != RUNNING_POWER_STATE) {
        return Some(SkipReason::NotRunning);
    }

    if matches!(instance.hardware_status_id, Some(id) if id != HARDWARE_STATUS_ACTIVE) {
        return Some(SkipReason::HardwareNotInService);
    }

    if instance.fully_qualified_domain_name.is_none() {
        return Some(SkipReason::MissingFqdn);
    }

    None
}

// =============================================================================
// Sanitize
// =============================================================================

/// Make a string safe as an Ansible group or variable name: every
/// character outside `[A-Za-z0-9.-]` becomes an underscore.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Inventory Classifier
// =============================================================================

/// Classifies compute instances into inventory groups.
///
/// Stateless between calls; everything a `classify` call builds lives in
/// its own scope, so one classifier can serve concurrent callers.
pub struct InventoryClassifier {
    config: ClassifierConfig,
}

impl InventoryClassifier {
    /// Create a classifier with default config
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    /// Create a classifier with custom config
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Build an inventory document from raw instance records.
    ///
    /// Instances failing an admission filter are dropped silently (debug
    /// log only). Admitted records missing a field the grouping needs are
    /// skipped with a warning rather than aborting the run, and a failed
    /// OS lookup only costs that instance its OS group.
    pub async fn classify<L>(
        &self,
        instances: Vec<RawInstance>,
        lookup: &L,
    ) -> Result<InventoryDocument>
    where
        L: OperatingSystemLookup,
    {
        let admitted: Vec<RawInstance> = instances
            .into_iter()
            .filter_map(|instance| match skip_reason(&instance) {
                Some(reason) => {
                    debug!(
                        "Skipping instance {}: {}",
                        instance.id.unwrap_or_default(),
                        reason
                    );
                    None
                }
                None => Some(instance),
            })
            .collect();

        // The per-instance OS lookups dominate latency on large fleets,
        // so they fan out with bounded concurrency. `buffered` keeps
        // results in submission order.
        let looked_up = stream::iter(admitted.into_iter().map(|instance| async move {
            let os = match instance.id {
                Some(id) => lookup.operating_system(id).await,
                None => Ok(None),
            };
            (instance, os)
        }))
        .buffered(self.config.lookup_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

        let mut document = InventoryDocument::new();
        for (instance, os) in looked_up {
            if let Err(error) = insert_instance(&mut document, instance, os) {
                warn!("Skipping record: {}", error);
            }
        }

        Ok(document)
    }
}

impl Default for InventoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize one admitted instance into hostvars and group memberships.
fn insert_instance(
    document: &mut InventoryDocument,
    instance: RawInstance,
    os: Result<Option<String>>,
) -> Result<()> {
    // The admission filter guarantees the FQDN is present.
    let fqdn = instance
        .fully_qualified_domain_name
        .clone()
        .ok_or_else(|| Error::MalformedRecord {
            host: format!("id {}", instance.id.unwrap_or_default()),
            field: "fullyQualifiedDomainName",
        })?;

    let missing = |field| Error::MalformedRecord {
        host: fqdn.clone(),
        field,
    };

    let datacenter = instance
        .datacenter
        .as_ref()
        .and_then(|d| d.name.as_deref())
        .ok_or_else(|| missing("datacenter.name"))?;
    let domain = instance.domain.as_deref().ok_or_else(|| missing("domain"))?;
    let address = instance
        .primary_ip_address
        .as_deref()
        .ok_or_else(|| missing("primaryIpAddress"))?;
    let max_cpu = instance.max_cpu.ok_or_else(|| missing("maxCpu"))?;
    let max_memory = instance.max_memory.ok_or_else(|| missing("maxMemory"))?;

    let datacenter_group = sanitize(datacenter);
    let domain_group = sanitize(domain);
    // Shape group: CPU count and memory in whole GiB, e.g. "c4.m8"
    let shape_group = sanitize(&format!("c{}.m{}", max_cpu, max_memory / 1024));
    let ansible_host = sanitize(address);

    let os_group = match os {
        Ok(Some(code)) => Some(sanitize(&code)),
        Ok(None) => None,
        Err(error) => {
            warn!("No OS group for {}: {}", fqdn, error);
            None
        }
    };

    if document.contains_host(&fqdn) {
        warn!("Duplicate record for {}; keeping the newest", fqdn);
    }

    document.insert_host(fqdn.clone(), HostRecord::new(instance, ansible_host));
    document.add_to_group(datacenter_group, fqdn.clone());
    document.add_to_group(domain_group, fqdn.clone());
    document.add_to_group(shape_group, fqdn.clone());
    if let Some(group) = os_group {
        document.add_to_group(group, fqdn);
    }

    Ok(())
}

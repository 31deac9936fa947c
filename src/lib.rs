//! SoftLayer Dynamic Inventory
//!
//! Queries the SoftLayer (IBM Cloud classic infrastructure) account API
//! and renders an Ansible-style dynamic inventory: per-host variables
//! under `_meta.hostvars` plus hostname groups keyed by datacenter,
//! domain, CPU/memory shape, and operating system.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────────────┐    ┌───────────────────┐
//! │ SoftLayer REST  │───▶│   Instance Classifier     │───▶│ InventoryDocument │
//! │ client          │    │   filter → normalize →    │    │ _meta.hostvars +  │
//! │ (account list + │    │   group by datacenter,    │    │ group arrays,     │
//! │  OS lookups)    │    │   domain, shape, OS       │    │ pretty JSON       │
//! └─────────────────┘    └──────────────────────────┘    └───────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`api`]: SoftLayer REST client and wire types
//! - [`inventory`]: classification pipeline and document rendering
//! - [`config`]: credential and endpoint resolution
//! - [`error`]: error types and handling

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;

// Re-export commonly used types
pub use api::{HardwareInstance, RawInstance, SoftLayerClient};
pub use config::{ConfigOverrides, SoftLayerConfig};
pub use error::{Error, Result};
pub use inventory::{
    sanitize, ClassifierConfig, HostRecord, InventoryClassifier, InventoryDocument,
    OperatingSystemLookup,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! SoftLayer API Module
//!
//! REST client and wire types for the account and virtual-guest
//! services.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;

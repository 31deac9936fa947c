//! Error types for the inventory tool
//!
//! Structured errors for configuration resolution, the SoftLayer API
//! client, and per-record classification failures.

use thiserror::Error;

/// Unified error type for the inventory tool
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "SoftLayer credentials missing: pass --username/--api-key, set \
         SL_USERNAME/SL_API_KEY, or write a ~/.softlayer configuration file"
    )]
    MissingCredentials,

    // =========================================================================
    // SoftLayer API Errors
    // =========================================================================
    #[error("SoftLayer authentication failed: check username and API key")]
    Authentication,

    #[error("SoftLayer API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("SoftLayer API error: {service} returned HTTP {status}")]
    ApiStatus { service: String, status: u16 },

    // =========================================================================
    // Per-Record Errors
    // =========================================================================
    #[error("Malformed instance record {host}: missing {field}")]
    MalformedRecord { host: String, field: &'static str },

    #[error("Operating system lookup failed for instance {id}: {reason}")]
    OsLookup { id: i64, reason: String },

    // =========================================================================
    // Parse/IO Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts the whole run.
    ///
    /// Per-record errors are recoverable: a malformed record is skipped
    /// with a warning and a failed OS lookup only costs that instance its
    /// OS group. Everything else means no usable inventory can be built.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::MalformedRecord { .. } | Error::OsLookup { .. }
        )
    }
}

/// Result type alias for the inventory tool
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_record_errors_are_recoverable() {
        let err = Error::MalformedRecord {
            host: "web01.example.com".into(),
            field: "datacenter.name",
        };
        assert!(!err.is_fatal());

        let err = Error::OsLookup {
            id: 42,
            reason: "HTTP 500".into(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_run_level_errors_are_fatal() {
        assert!(Error::Authentication.is_fatal());
        assert!(Error::MissingCredentials.is_fatal());
        assert!(Error::Configuration("bad timeout".into()).is_fatal());
        assert!(Error::ApiStatus {
            service: "SoftLayer_Account".into(),
            status: 500,
        }
        .is_fatal());
    }
}

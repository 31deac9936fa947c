//! Credential and endpoint configuration
//!
//! Resolves SoftLayer connection settings from CLI flags, environment
//! variables, and the INI files the SoftLayer CLI writes (`~/.softlayer`,
//! `/etc/softlayer.conf`), in that order of precedence. Credentials are
//! carried in an explicit struct passed to the client at call time, never
//! held in shared mutable state.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// =============================================================================
// Defaults
// =============================================================================

/// Public SoftLayer REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.softlayer.com/rest/v3.1";

/// Default API request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// System-wide fallback configuration file
const SYSTEM_CONFIG_PATH: &str = "/etc/softlayer.conf";

/// INI section the SoftLayer CLI writes credentials under
const CONFIG_SECTION: &str = "softlayer";

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved SoftLayer connection settings
#[derive(Debug, Clone)]
pub struct SoftLayerConfig {
    /// API username
    pub username: String,
    /// API key
    pub api_key: String,
    /// REST endpoint base URL
    pub endpoint_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Settings gathered from CLI flags and environment, before the
/// configuration files are consulted
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Explicit configuration file path; skips the default search
    pub config_path: Option<PathBuf>,
}

impl SoftLayerConfig {
    /// Resolve the final configuration.
    ///
    /// Overrides win over file values; an explicit `--config` path must
    /// exist, while the default paths are probed silently. Missing
    /// credentials after resolution are a fatal error.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::first_present(&default_config_paths()),
        };

        let username = overrides
            .username
            .or(file.username)
            .ok_or(Error::MissingCredentials)?;
        let api_key = overrides
            .api_key
            .or(file.api_key)
            .ok_or(Error::MissingCredentials)?;

        Ok(Self {
            username,
            api_key,
            endpoint_url: overrides
                .endpoint_url
                .or(file.endpoint_url)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout_secs: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Default configuration file search order: `~/.softlayer`, then the
/// system-wide `/etc/softlayer.conf`.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(".softlayer"));
    }
    paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
    paths
}

// =============================================================================
// INI File Parsing
// =============================================================================

/// Values read from a `[softlayer]` INI section
#[derive(Debug, Clone, Default)]
struct FileConfig {
    username: Option<String>,
    api_key: Option<String>,
    endpoint_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load the first existing file from `paths`, or an empty config when
    /// none is present.
    fn first_present(paths: &[PathBuf]) -> Self {
        for path in paths {
            if path.is_file() {
                match Self::load(path) {
                    Ok(config) => {
                        debug!("Loaded SoftLayer configuration from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        debug!("Ignoring unreadable config {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    /// Parse the `[softlayer]` section of an INI document. Unknown keys
    /// and other sections are ignored; `#` and `;` start comments.
    fn parse(content: &str) -> Self {
        let mut config = Self::default();
        let mut in_section = false;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_section = section.trim().eq_ignore_ascii_case(CONFIG_SECTION);
                continue;
            }

            if !in_section {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "username" => config.username = Some(value.to_string()),
                "api_key" => config.api_key = Some(value.to_string()),
                "endpoint_url" => config.endpoint_url = Some(value.to_string()),
                "timeout" => config.timeout_secs = value.parse().ok(),
                _ => {}
            }
        }

        config
    }
}

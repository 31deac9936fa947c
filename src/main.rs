//! SoftLayer dynamic inventory for Ansible
//!
//! Fetches the account's compute instances, classifies them into groups,
//! and prints the inventory document on stdout. All diagnostics go to
//! stderr so Ansible can parse stdout as JSON.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use softlayer_inventory::{
    ClassifierConfig, ConfigOverrides, InventoryClassifier, Result, SoftLayerClient,
    SoftLayerConfig,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Produce an Ansible inventory from a SoftLayer account
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["list", "host"])))]
struct Args {
    /// List all instances as a full inventory document
    #[arg(long)]
    list: bool,

    /// Print the variables for a single host
    #[arg(long, value_name = "FQDN")]
    host: Option<String>,

    /// Also inventory bare-metal servers
    #[arg(long, env = "SL_INCLUDE_HARDWARE")]
    hardware: bool,

    /// SoftLayer API username
    #[arg(long, env = "SL_USERNAME")]
    username: Option<String>,

    /// SoftLayer API key
    #[arg(long, env = "SL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// SoftLayer REST endpoint base URL
    #[arg(long, env = "SL_API_ENDPOINT")]
    endpoint: Option<String>,

    /// API request timeout in seconds
    #[arg(long, env = "SL_API_TIMEOUT")]
    timeout: Option<u64>,

    /// Path to a SoftLayer INI configuration file
    #[arg(long, env = "SL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum concurrent operating system lookups
    #[arg(long, env = "SL_LOOKUP_CONCURRENCY", default_value = "8")]
    lookup_concurrency: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);
    debug!(
        "{} {} starting",
        softlayer_inventory::NAME,
        softlayer_inventory::VERSION
    );

    let config = SoftLayerConfig::resolve(ConfigOverrides {
        username: args.username.clone(),
        api_key: args.api_key.clone(),
        endpoint_url: args.endpoint.clone(),
        timeout_secs: args.timeout,
        config_path: args.config.clone(),
    })?;

    let client = SoftLayerClient::new(config)?;

    let mut instances = client.list_virtual_guests().await?;
    debug!("Fetched {} virtual guests", instances.len());
    if args.hardware {
        let hardware = client.list_hardware().await?;
        debug!("Fetched {} bare-metal servers", hardware.len());
        instances.extend(hardware);
    }

    let classifier = InventoryClassifier::with_config(ClassifierConfig {
        lookup_concurrency: args.lookup_concurrency,
    });
    let document = classifier.classify(instances, &client).await?;

    if args.list {
        println!("{}", document.to_json_pretty()?);
    } else if let Some(fqdn) = &args.host {
        println!("{}", document.host_vars_json_pretty(fqdn)?);
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    // stdout must stay clean for the inventory JSON
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

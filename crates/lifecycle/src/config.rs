//! Engine settings.
//!
//! Settings cover the parts of the engine that are deployment concerns:
//! store routing and logging. Lifecycle flags and hooks are code, configured
//! on the [`Registry`](crate::registry::Registry).
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DOCKET_DEFAULT_STORE` | default | Default store locator |
//! | `DOCKET_STORE_OVERRIDES` | (none) | Per-type locators, `Type=locator,...` |
//! | `DOCKET_LOG_LEVEL` | info | Log level |
//! | `DOCKET_TRACE_QUERIES` | true | Emit query events |
//!
//! # Example
//!
//! ```rust
//! use docket_lifecycle::config::EngineSettings;
//! use docket_lifecycle::registry::Registry;
//!
//! let settings = EngineSettings {
//!     store_overrides: Some("Order=orders,Note=archive".to_string()),
//!     ..Default::default()
//! };
//! let registry = Registry::from_settings(&settings).unwrap();
//! assert_eq!(registry.global().locator_override("Order"), Some("orders"));
//! ```

use clap::Parser;

use crate::error::ConfigError;
use crate::registry::DEFAULT_LOCATOR;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Deployment settings for a lifecycle engine.
///
/// Constructed from environment variables with [`EngineSettings::from_env`],
/// from command line arguments with [`EngineSettings::parse`], or
/// programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "docket")]
#[command(about = "Persistence lifecycle engine settings")]
pub struct EngineSettings {
    /// Locator of the default document store.
    #[arg(long, env = "DOCKET_DEFAULT_STORE", default_value = "default")]
    pub default_store: String,

    /// Per-type store locators (`Type=locator`, comma-separated).
    #[arg(long, env = "DOCKET_STORE_OVERRIDES")]
    pub store_overrides: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "DOCKET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit a log event for every composed query.
    #[arg(
        long,
        env = "DOCKET_TRACE_QUERIES",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub trace_queries: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_store: DEFAULT_LOCATOR.to_string(),
            store_overrides: None,
            log_level: "info".to_string(),
            trace_queries: true,
        }
    }
}

impl EngineSettings {
    /// Reads settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Parses the per-type store overrides into `(type name, locator)` pairs.
    pub fn store_overrides(&self) -> Result<Vec<(String, String)>, ConfigError> {
        let Some(raw) = self.store_overrides.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(type_name, locator)| (type_name.trim(), locator.trim()))
                    .filter(|(type_name, locator)| !type_name.is_empty() && !locator.is_empty())
                    .map(|(type_name, locator)| (type_name.to_string(), locator.to_string()))
                    .ok_or_else(|| ConfigError::InvalidOverride {
                        entry: entry.to_string(),
                    })
            })
            .collect()
    }

    /// Validates the settings and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.default_store.trim().is_empty() {
            errors.push("Default store locator cannot be empty".to_string());
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Log level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if let Err(err) = self.store_overrides() {
            errors.push(err.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
///
/// # Arguments
///
/// * `level` - The log level (error, warn, info, debug, trace)
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docket_lifecycle={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

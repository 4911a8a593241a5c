//! Service configuration
//!
//! Read from the process environment (after `.env` has been loaded). Values
//! that fail to parse fall back to their defaults with a warning.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::estimator::DEFAULT_DENSITY_FACTOR;
use crate::ledger::LedgerConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_host: String,
    pub port: u16,
    /// Command line of the external weight model; fallback only when unset
    pub model_command: Option<String>,
    pub model_timeout: Duration,
    pub default_density: f64,
    /// Directory for the rolling log file; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Expose `POST /api/warehouse/admin/reset`
    pub allow_reset: bool,
    pub ledger: LedgerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            model_command: None,
            model_timeout: Duration::from_secs(10),
            default_density: DEFAULT_DENSITY_FACTOR,
            log_dir: None,
            allow_reset: false,
            ledger: LedgerConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_density = parse_or(get("WAREHOUSE_DEFAULT_DENSITY"), "WAREHOUSE_DEFAULT_DENSITY", defaults.default_density);
        let default_density = if default_density.is_finite() && default_density > 0.0 {
            default_density
        } else {
            warn!(value = default_density, "WAREHOUSE_DEFAULT_DENSITY must be positive, using default");
            defaults.default_density
        };

        Self {
            bind_host: get("WAREHOUSE_BIND_HOST").unwrap_or(defaults.bind_host),
            port: parse_or(get("PORT"), "PORT", defaults.port),
            model_command: get("WAREHOUSE_MODEL_COMMAND"),
            model_timeout: Duration::from_secs(parse_or(
                get("WAREHOUSE_MODEL_TIMEOUT_SECS"),
                "WAREHOUSE_MODEL_TIMEOUT_SECS",
                defaults.model_timeout.as_secs(),
            )),
            default_density,
            log_dir: get("WAREHOUSE_LOG_DIR").map(PathBuf::from),
            allow_reset: parse_flag(get("LEDGER_ALLOW_RESET")),
            ledger: LedgerConfig {
                simulated_latency: Duration::from_millis(parse_or(
                    get("LEDGER_SIMULATED_LATENCY_MS"),
                    "LEDGER_SIMULATED_LATENCY_MS",
                    0,
                )),
                strict_transitions: parse_flag(get("LEDGER_STRICT_TRANSITIONS")),
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

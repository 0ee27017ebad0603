//! Configuration module for the battmon backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Alert thresholds are deliberately configuration, not constants, so operators
//! can tune sensitivity without redeploying.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::alerts::{AlertThresholds, ServiceLifeSemantics};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Thresholds driving alert classification
    pub thresholds: AlertThresholds,
    /// Maximum number of batteries a single device may hold
    pub max_batteries_per_device: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `BATTMON_SERVICE_LIFE_SEMANTICS` picks the direction of the
    /// service-life comparison: `elapsed` (default) treats `service_life` as
    /// the battery's age in days and flags it once the limit is reached;
    /// `remaining` treats it as days left and flags it once it drops below
    /// the limit.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("BATTMON_DB_PATH")
            .unwrap_or_else(|_| "./data/battmon.sqlite".to_string())
            .into();

        let bind_addr = env::var("BATTMON_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .expect("Invalid BATTMON_BIND_ADDR format");

        let log_level = env::var("BATTMON_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = AlertThresholds::default();
        let thresholds = AlertThresholds {
            low_capacity: env_parse("BATTMON_LOW_CAPACITY_THRESHOLD", defaults.low_capacity),
            critical_capacity: env_parse(
                "BATTMON_CRITICAL_CAPACITY_THRESHOLD",
                defaults.critical_capacity,
            ),
            service_life_limit: env_parse(
                "BATTMON_SERVICE_LIFE_LIMIT",
                defaults.service_life_limit,
            ),
            service_life_semantics: env::var("BATTMON_SERVICE_LIFE_SEMANTICS")
                .map(|v| {
                    ServiceLifeSemantics::from_str(&v)
                        .expect("BATTMON_SERVICE_LIFE_SEMANTICS must be 'elapsed' or 'remaining'")
                })
                .unwrap_or(defaults.service_life_semantics),
        };

        let max_batteries_per_device = env_parse("BATTMON_MAX_BATTERIES_PER_DEVICE", 5);

        Self {
            db_path,
            bind_addr,
            log_level,
            thresholds,
            max_batteries_per_device,
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("Invalid {} value: {}", name, value)),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("BATTMON_DB_PATH");
        env::remove_var("BATTMON_BIND_ADDR");
        env::remove_var("BATTMON_LOG_LEVEL");
        env::remove_var("BATTMON_LOW_CAPACITY_THRESHOLD");
        env::remove_var("BATTMON_CRITICAL_CAPACITY_THRESHOLD");
        env::remove_var("BATTMON_SERVICE_LIFE_LIMIT");
        env::remove_var("BATTMON_SERVICE_LIFE_SEMANTICS");
        env::remove_var("BATTMON_MAX_BATTERIES_PER_DEVICE");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/battmon.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.thresholds.low_capacity, 20.0);
        assert_eq!(config.thresholds.critical_capacity, 10.0);
        assert_eq!(config.thresholds.service_life_limit, 365);
        assert_eq!(
            config.thresholds.service_life_semantics,
            ServiceLifeSemantics::Elapsed
        );
        assert_eq!(config.max_batteries_per_device, 5);
    }
}

//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Inventory reporting configuration.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite:...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Inventory reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Variants at or below this stock level are listed as low stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

fn default_low_stock_threshold() -> i32 {
    10
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "stockbook=debug,sea_orm=warn".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `STOCKBOOK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("STOCKBOOK__DATABASE__URL", Some("sqlite::memory:")),
                ("STOCKBOOK__INVENTORY__LOW_STOCK_THRESHOLD", Some("4")),
                ("RUN_MODE", Some("config-test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.inventory.low_stock_threshold, 4);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("STOCKBOOK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("config-test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(InventoryConfig::default().low_stock_threshold, 10);
        assert_eq!(
            LoggingConfig::default().filter,
            "stockbook=debug,sea_orm=warn"
        );
    }
}

//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration. Without it the ledger lives in memory only.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
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

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Prefix used for journal entry numbers (`JV-2026-0001`).
    #[serde(default = "default_entry_prefix")]
    pub entry_prefix: String,
    /// Base (posting) currency code.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Taxable income exempt from corporate tax.
    #[serde(default = "default_corporate_tax_threshold")]
    pub corporate_tax_threshold: Decimal,
    /// Corporate tax rate applied above the threshold.
    #[serde(default = "default_corporate_tax_rate")]
    pub corporate_tax_rate: Decimal,
    /// Date window used by bank statement auto-matching.
    #[serde(default = "default_reconciliation_tolerance_days")]
    pub reconciliation_tolerance_days: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            entry_prefix: default_entry_prefix(),
            base_currency: default_base_currency(),
            corporate_tax_threshold: default_corporate_tax_threshold(),
            corporate_tax_rate: default_corporate_tax_rate(),
            reconciliation_tolerance_days: default_reconciliation_tolerance_days(),
        }
    }
}

fn default_entry_prefix() -> String {
    "JV".to_string()
}

fn default_base_currency() -> String {
    "AED".to_string()
}

fn default_corporate_tax_threshold() -> Decimal {
    Decimal::new(375_000, 0)
}

fn default_corporate_tax_rate() -> Decimal {
    Decimal::new(9, 2)
}

fn default_reconciliation_tolerance_days() -> u32 {
    3
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.entry_prefix, "JV");
        assert_eq!(ledger.base_currency, "AED");
        assert_eq!(ledger.corporate_tax_threshold, dec!(375000));
        assert_eq!(ledger.corporate_tax_rate, dec!(0.09));
        assert_eq!(ledger.reconciliation_tolerance_days, 3);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(["RUN_MODE", "FOLIO__DATABASE__URL"], || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.port, 8080);
            assert!(config.database.is_none());
            assert!(!config.log.json);
            assert_eq!(config.ledger, LedgerConfig::default());
        });
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("FOLIO__SERVER__PORT", Some("9090")),
                ("FOLIO__LEDGER__ENTRY_PREFIX", Some("GL")),
                ("FOLIO__DATABASE__URL", Some("postgres://localhost/folio")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.ledger.entry_prefix, "GL");
                assert_eq!(
                    config.database.map(|db| db.url).as_deref(),
                    Some("postgres://localhost/folio")
                );
            },
        );
    }
}

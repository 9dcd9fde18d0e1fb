//! Configuration management for cashdesk
//!
//! This module handles loading, validation, and management of
//! cashdesk configuration from YAML files. The list of cash register
//! categories shown on the dashboard lives here, so adding a category is
//! a configuration change only.

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
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
    8082
}

/// Local record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// YAML file holding the cash register records
    #[serde(default = "default_records_file")]
    pub records_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records_file: default_records_file(),
        }
    }
}

fn default_records_file() -> PathBuf {
    PathBuf::from("./data/records.yaml")
}

/// Where the current user identity can be read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Identity of the active session, if the client already knows it
    #[serde(default)]
    pub user: Option<String>,
    /// Request context values handed over by the embedding page
    #[serde(default)]
    pub request_context: BTreeMap<String, String>,
    /// Identity field name inside the request context
    #[serde(default = "default_identity_field")]
    pub context_field: String,
    /// Identity field name inside the remote context response
    #[serde(default = "default_identity_field")]
    pub remote_field: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: None,
            request_context: BTreeMap::new(),
            context_field: default_identity_field(),
            remote_field: default_identity_field(),
        }
    }
}

fn default_identity_field() -> String {
    "uid".to_string()
}

/// Symbolic action names registered by the host application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryActions {
    /// Opens the category list
    #[serde(default)]
    pub open: Option<String>,
    /// Opens the creation form
    #[serde(default)]
    pub create: Option<String>,
    /// Opens the list restricted to open records
    #[serde(default)]
    pub open_only: Option<String>,
}

/// One kind of cash register shown on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashCategory {
    /// Stable key (e.g., "petty_cash")
    pub key: String,
    /// Backing collection (e.g., "petty.cash")
    pub collection: String,
    /// Display title
    pub title: String,
    /// Title of the creation form; "New <title>" when unset
    #[serde(default)]
    pub create_title: Option<String>,
    /// Collection holding the movement lines of this category
    #[serde(default)]
    pub line_collection: Option<String>,
    /// Title of the movement analysis view; "<title> Movements" when unset
    #[serde(default)]
    pub movements_title: Option<String>,
    #[serde(default)]
    pub actions: CategoryActions,
}

impl CashCategory {
    /// Build a category whose symbolic actions follow the
    /// `<module>.action_<key>[_new|_open]` naming convention
    pub fn conventional(module: &str, key: &str, collection: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            collection: collection.to_string(),
            title: title.to_string(),
            create_title: None,
            line_collection: Some(format!("{}.line", collection)),
            movements_title: None,
            actions: CategoryActions {
                open: Some(format!("{}.action_{}", module, key)),
                create: Some(format!("{}.action_{}_new", module, key)),
                open_only: Some(format!("{}.action_{}_open", module, key)),
            },
        }
    }

    pub fn create_title(&self) -> String {
        self.create_title
            .clone()
            .unwrap_or_else(|| format!("New {}", self.title))
    }

    pub fn movements_title(&self) -> String {
        self.movements_title
            .clone()
            .unwrap_or_else(|| format!("{} Movements", self.title))
    }
}

/// Dashboard widget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Cash register categories, in display order
    #[serde(default = "default_categories")]
    pub categories: Vec<CashCategory>,
    /// Upper bound for every remote call, in milliseconds
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    /// Restrict the "view open" precheck to the current user's records
    #[serde(default)]
    pub scope_open_to_identity: bool,
    /// Symbolic actions the host application has registered
    #[serde(default = "default_registered_actions")]
    pub registered_actions: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            query_timeout_ms: default_query_timeout_ms(),
            scope_open_to_identity: false,
            registered_actions: default_registered_actions(),
        }
    }
}

fn default_categories() -> Vec<CashCategory> {
    vec![
        CashCategory::conventional("petty_cash", "petty_cash", "petty.cash", "Petty Cash"),
        CashCategory::conventional("petty_cash", "distribution_cash", "distribution.cash", "Distribution Cash"),
        CashCategory::conventional("petty_cash", "logistics_cash", "logistics.cash", "Logistics Cash"),
    ]
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_registered_actions() -> Vec<String> {
    default_categories()
        .into_iter()
        .flat_map(|c| [c.actions.open, c.actions.create, c.actions.open_only])
        .flatten()
        .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Record store settings
    #[serde(default)]
    pub data: DataConfig,
    /// Identity sources
    #[serde(default)]
    pub session: SessionConfig,
    /// Dashboard widget settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.dashboard.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.query_timeout_ms".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.dashboard.categories.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.categories".to_string(),
                reason: "At least one cash category is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for category in &self.dashboard.categories {
            if category.key.trim().is_empty() || category.collection.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "dashboard.categories".to_string(),
                    reason: "Every category needs a key and a collection".to_string(),
                });
            }
            if !seen.insert(category.key.as_str()) {
                return Err(ConfigError::DuplicateCategory {
                    key: category.key.clone(),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Look up a category by key
    pub fn category(&self, key: &str) -> Option<&CashCategory> {
        self.dashboard.categories.iter().find(|c| c.key == key)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dashboard.categories.len(), 3);
        assert_eq!(config.dashboard.query_timeout_ms, 5000);
        assert_eq!(config.session.context_field, "uid");
    }

    #[test]
    fn test_conventional_category_actions() {
        let category = CashCategory::conventional("petty_cash", "petty_cash", "petty.cash", "Petty Cash");
        assert_eq!(category.actions.open.as_deref(), Some("petty_cash.action_petty_cash"));
        assert_eq!(category.actions.create.as_deref(), Some("petty_cash.action_petty_cash_new"));
        assert_eq!(category.actions.open_only.as_deref(), Some("petty_cash.action_petty_cash_open"));
        assert_eq!(category.line_collection.as_deref(), Some("petty.cash.line"));
        assert_eq!(category.create_title(), "New Petty Cash");
        assert_eq!(category.movements_title(), "Petty Cash Movements");
    }

    #[test]
    fn test_generated_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.dashboard.categories.len(), 3);
        assert!(config.category("logistics_cash").is_some());
        assert!(config.category("unknown").is_none());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.dashboard.categories.len(), 3);
        assert!(!config.dashboard.registered_actions.is_empty());
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let yaml = r#"
dashboard:
  categories:
    - { key: petty_cash, collection: petty.cash, title: Petty Cash }
    - { key: petty_cash, collection: other.cash, title: Other }
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCategory { key } if key == "petty_cash"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_yaml("dashboard:\n  query_timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "dashboard.query_timeout_ms"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/cashdesk.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}

//! Configuration module for canopy
//!
//! Manages application configuration including database paths and the
//! fan-out used by bulk operations. Configuration is stored in the user's
//! config directory.

mod setup;

pub use setup::first_time_setup;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::bulk::{DEFAULT_CONCURRENCY, ExecuteOptions};

const fn default_max_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CanopyConfig {
    /// Map of database names to their filesystem paths
    #[serde(default)]
    pub databases: HashMap<String, PathBuf>,

    /// The default database to use when none is specified
    #[serde(default)]
    pub default_database: Option<String>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Maximum store calls in flight during a bulk operation
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            databases: HashMap::new(),
            default_database: None,
            quiet: false,
            max_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl CanopyConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("canopy").join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    ///
    /// `CANOPY_*` environment variables (e.g. `CANOPY_MAX_CONCURRENCY=8`)
    /// override values from the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layered(path, Environment::with_prefix("CANOPY").try_parsing(true))
    }

    fn load_layered(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created or the file
    /// cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Add a database to the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if saving the configuration fails.
    pub fn add_database(&mut self, name: String, path: PathBuf) -> Result<(), ConfigError> {
        self.databases.insert(name, path);
        self.save()
    }

    /// Remove a database from the configuration
    ///
    /// Clears the default when it pointed at the removed database.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if saving the configuration fails.
    pub fn remove_database(&mut self, name: &str) -> Result<Option<PathBuf>, ConfigError> {
        let removed = self.databases.remove(name);
        if self.default_database.as_deref() == Some(name) {
            self.default_database = None;
        }
        self.save()?;
        Ok(removed)
    }

    /// Get a database path by name
    #[must_use]
    pub fn get_database(&self, name: &str) -> Option<&PathBuf> {
        self.databases.get(name)
    }

    /// List all database names, sorted
    #[must_use]
    pub fn list_databases(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.databases.keys().collect();
        names.sort();
        names
    }

    /// Set the default database
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database name doesn't exist in the configuration
    /// or if saving the configuration fails.
    pub fn set_default_database(&mut self, name: String) -> Result<(), ConfigError> {
        if !self.databases.contains_key(&name) {
            return Err(ConfigError::Message(
                format!("Database '{name}' does not exist in configuration")
            ));
        }
        self.default_database = Some(name);
        self.save()
    }

    /// Get the default database name
    #[must_use]
    pub const fn get_default_database(&self) -> Option<&String> {
        self.default_database.as_ref()
    }

    /// Execution settings for bulk operations
    #[must_use]
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions::default().with_concurrency(self.max_concurrency.max(1))
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load()
        } else {
            first_time_setup()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CanopyConfig::default();
        assert!(config.databases.is_empty());
        assert!(config.default_database.is_none());
        assert_eq!(config.max_concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = CanopyConfig::default();
        config.max_concurrency = 2;
        config.save_to(&path).unwrap();

        let vars: ::config::Map<String, String> = [
            ("CANOPY_MAX_CONCURRENCY".to_string(), "8".to_string()),
            ("CANOPY_QUIET".to_string(), "true".to_string()),
        ]
        .into_iter()
        .collect();
        let env = Environment::with_prefix("CANOPY").try_parsing(true).source(Some(vars));
        let loaded = CanopyConfig::load_layered(&path, env).unwrap();
        assert_eq!(loaded.max_concurrency, 8);
        assert!(loaded.quiet);

        let unset = Environment::with_prefix("CANOPY").source(Some(::config::Map::new()));
        assert_eq!(CanopyConfig::load_layered(&path, unset).unwrap().max_concurrency, 2);
    }

    #[test]
    fn test_list_databases_sorted() {
        let mut config = CanopyConfig::default();
        config.databases.insert("gamma".to_string(), PathBuf::from("/tmp/gamma"));
        config.databases.insert("alpha".to_string(), PathBuf::from("/tmp/alpha"));
        config.databases.insert("beta".to_string(), PathBuf::from("/tmp/beta"));

        let names: Vec<&str> = config.list_databases().into_iter().map(String::as_str).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CanopyConfig::default();
        config.databases.insert("main".to_string(), PathBuf::from("/data/main"));
        config.default_database = Some("main".to_string());
        config.max_concurrency = 8;
        config.save_to(&path).unwrap();

        let loaded = CanopyConfig::load_from(&path).unwrap();
        assert_eq!(loaded.get_database("main"), Some(&PathBuf::from("/data/main")));
        assert_eq!(loaded.get_default_database(), Some(&"main".to_string()));
        assert_eq!(loaded.max_concurrency, 8);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quiet = true\n").unwrap();

        let loaded = CanopyConfig::load_from(&path).unwrap();
        assert!(loaded.quiet);
        assert!(loaded.databases.is_empty());
        assert_eq!(loaded.max_concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_execute_options_never_zero() {
        let config = CanopyConfig {
            max_concurrency: 0,
            ..CanopyConfig::default()
        };
        assert_eq!(config.execute_options().concurrency, 1);
    }
}

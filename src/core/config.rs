use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_EXPORT_FILE: &str = "dataFromDatabase.xlsx";
pub const DEFAULT_DATABASE_FILE: &str = "currencyDatabase.db";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

fn default_base_currency() -> String {
    "CHF".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub export_path: Option<String>,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            export_path: None,
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "ratebook", "ratebook")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "ratebook", "ratebook")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.default_data_path()?.join(DEFAULT_DATABASE_FILE)),
        }
    }

    /// Fixed location used by the save-to-file and read-from-file operations.
    pub fn export_path(&self) -> Result<PathBuf> {
        match &self.export_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.default_data_path()?.join(DEFAULT_EXPORT_FILE)),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: "EUR"
store:
  backend: sqlite
  path: "/var/lib/ratebook/rates.db"
server:
  listen_addr: "0.0.0.0:8080"
export_path: "/srv/backup/rates.xlsx"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/var/lib/ratebook/rates.db")
        );
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(
            config.export_path().unwrap(),
            PathBuf::from("/srv/backup/rates.xlsx")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: /tmp/ratebook\n").unwrap();
        assert_eq!(config.base_currency, "CHF");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.server.listen_addr, "127.0.0.1:5000");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/ratebook").join(DEFAULT_DATABASE_FILE)
        );
        assert_eq!(
            config.export_path().unwrap(),
            PathBuf::from("/tmp/ratebook").join(DEFAULT_EXPORT_FILE)
        );
    }

    #[test]
    fn test_memory_backend() {
        let config: AppConfig = serde_yaml::from_str("store:\n  backend: memory\n").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("store:\n  backend: postgres\n");
        assert!(result.is_err());
    }
}

// User configuration loaded from YAML

use crate::fields::Defaults;
use crate::file_store::FileStore;
use crate::sqlite_store::SqliteStore;
use crate::storage::{self, DEFAULT_STORAGE_KEY, Storage};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const APP_DIR: &str = "grocerytracker";
const CONFIG_FILE: &str = "config.yaml";

/// Which storage backend holds the item blob
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for Backend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(eyre!("Unknown backend: {} (expected json or sqlite)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where storage files live; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub backend: Backend,
    pub storage_key: String,
    /// Fixed prefix for displayed amounts
    pub currency: String,
    /// Whether transcripts may be read from stdin
    pub voice_input: bool,
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            backend: Backend::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: "₹".to_string(),
            voice_input: true,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicitly given path must exist. Without one, the default location
    /// is tried and built-in defaults are used when it has no file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        storage::validate_key(&self.storage_key)?;
        self.defaults.validate()?;
        Ok(())
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Box<dyn Storage>> {
        let dir = self.data_dir();
        let storage: Box<dyn Storage> = match self.backend {
            Backend::Json => Box::new(FileStore::open(&dir, &self.storage_key)?),
            Backend::Sqlite => Box::new(SqliteStore::open(&dir, &self.storage_key)?),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Json);
        assert_eq!(config.storage_key, "groceryData");
        assert_eq!(config.currency, "₹");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "backend: sqlite\ncurrency: \"$\"\ndefaults:\n  unit: count\n  quantity: 2\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.currency, "$");
        assert_eq!(config.storage_key, "groceryData");
        assert_eq!(config.defaults.unit, Unit::Count);
        assert_eq!(config.defaults.quantity, 2.0);
        assert_eq!(config.defaults.price, 0.0);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.yaml").as_path())).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");

        fs::write(&path, "storage_key: \"bad key\"\n").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());

        fs::write(&path, "defaults:\n  quantity: 0\n").unwrap();
        assert!(Config::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert_eq!("json".parse::<Backend>().unwrap(), Backend::Json);
        assert!("csv".parse::<Backend>().is_err());
    }

    #[test]
    fn test_open_storage_in_data_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };

        let mut storage = config.open_storage().unwrap();
        storage.save(&[]).unwrap();
        assert!(temp.path().join("groceryData.json").exists());

        config.backend = Backend::Sqlite;
        let storage = config.open_storage().unwrap();
        assert!(storage.load().unwrap().is_empty());
        assert!(temp.path().join("grocerytracker.db").exists());
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::BackendType;

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "FLOCK_CONFIG_PATH";
/// Environment variable overriding the data file location
pub const DATA_PATH_ENV: &str = "FLOCK_DATA_PATH";

const DEFAULT_DATA_FILE: &str = "flock-data.json";

/// User configuration stored as YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Path to the data file holding option sets and journals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    /// Backing type ("json" or "sqlite"); inferred from the extension if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl Config {
    /// Loads the configuration from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Loads the configuration, treating a missing file as empty
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the configuration to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Parsed backend type, if one is configured
    pub fn backend_type(&self) -> Result<Option<BackendType>> {
        self.backend
            .as_deref()
            .map(|s| s.parse::<BackendType>().map_err(anyhow::Error::msg))
            .transpose()
    }
}

/// Gets the path to the configuration file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.flock.config
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".flock.config"))
}

/// Default data file in the platform data directory
pub fn default_data_path() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .context("Failed to determine data directory")?;
    Ok(base.join("flock").join(DEFAULT_DATA_FILE))
}

/// Determines the data file to use.
///
/// Priority: explicit override, then `FLOCK_DATA_PATH`, then the configured
/// `data_path`, then the platform default.
pub fn determine_data_path(override_path: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = env::var(DATA_PATH_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    if let Some(path) = &config.data_path {
        return Ok(PathBuf::from(path));
    }

    default_data_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join(".flock.config");

        let config = Config {
            data_path: Some("/var/lib/flock/farm.db".to_string()),
            backend: Some("sqlite".to_string()),
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.backend_type().unwrap(), Some(BackendType::Sqlite));
    }

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend_type().unwrap(), None);
    }

    #[test]
    fn test_bad_backend_name_is_an_error() {
        let config = Config {
            data_path: None,
            backend: Some("postgres".to_string()),
        };
        assert!(config.backend_type().is_err());
    }

    #[test]
    fn test_override_path_wins() {
        let config = Config {
            data_path: Some("configured.json".to_string()),
            backend: None,
        };
        let path = determine_data_path(Some(Path::new("explicit.db")), &config).unwrap();
        assert_eq!(path, PathBuf::from("explicit.db"));
    }
}

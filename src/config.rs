//! TOML configuration for where tracker data lives.
//!
//! Resolution order for the data directory:
//! 1. `CYCLE_INSIGHTS_DATA_DIR` environment variable
//! 2. `data_dir` in the config file
//! 3. `<local data dir>/cycle-insights`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::JsonFileStore;

pub const DATA_DIR_ENV: &str = "CYCLE_INSIGHTS_DATA_DIR";
const APP_DIR_NAME: &str = "cycle-insights";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("data directory not found")]
    NoDataDir,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// Pretty-print the stored JSON document.
    #[serde(default)]
    pub pretty: bool,
}

fn default_data_file() -> String {
    "data.json".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            data_file: default_data_file(),
            pretty: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn data_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join(&self.data_file))
    }

    pub fn store(&self) -> Result<JsonFileStore, ConfigError> {
        Ok(JsonFileStore::new(self.data_path()?).pretty(self.pretty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.data_file, "data.json");
    }

    #[test]
    fn parses_fields() {
        let cfg = Config::from_toml_str(
            r#"
            data_dir = "/tmp/cycles"
            data_file = "records.json"
            pretty = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/cycles")));
        assert_eq!(cfg.data_file, "records.json");
        assert!(cfg.pretty);
    }

    #[test]
    fn rejects_wrong_types() {
        let result = Config::from_toml_str("pretty = \"yes\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_file = \"x.json\"\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.data_file, "x.json");
    }
}

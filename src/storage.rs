use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::AppData;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
    #[error("store lock poisoned")]
    Poisoned,
}

/// Whole-document persistence for tracked records.
pub trait Store: Send + Sync {
    /// Whether a document has been saved before.
    fn exists(&self) -> Result<bool, StorageError>;
    fn load(&self) -> Result<AppData, StorageError>;
    fn save(&self, data: &AppData) -> Result<(), StorageError>;
    /// Delete all data permanently.
    fn wipe(&self) -> Result<(), StorageError>;
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.path.exists())
    }

    fn load(&self) -> Result<AppData, StorageError> {
        let bytes = fs::read(&self.path)?;
        let data: AppData = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            periods = data.periods.len(),
            "loaded tracker data"
        );
        Ok(data)
    }

    fn save(&self, data: &AppData) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };
        // Write to a sibling file first so a crash never leaves half a document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "saved tracker data");
        Ok(())
    }

    fn wipe(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "wiped tracker data");
        }
        Ok(())
    }
}

/// In-process store that never touches disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Option<AppData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: AppData) -> Self {
        Self {
            data: Mutex::new(Some(data)),
        }
    }
}

impl Store for MemoryStore {
    fn exists(&self) -> Result<bool, StorageError> {
        Ok(self.data.lock().map_err(|_| StorageError::Poisoned)?.is_some())
    }

    fn load(&self) -> Result<AppData, StorageError> {
        Ok(self
            .data
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clone()
            .unwrap_or_default())
    }

    fn save(&self, data: &AppData) -> Result<(), StorageError> {
        *self.data.lock().map_err(|_| StorageError::Poisoned)? = Some(data.clone());
        Ok(())
    }

    fn wipe(&self) -> Result<(), StorageError> {
        *self.data.lock().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}

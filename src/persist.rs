//! Saved Process Store
//!
//! JSON file persistence for saved command sets. The orchestrator only
//! borrows `ConnectionConfig` + `CommandQueue` from a record at run start
//! and never writes back; everything stored here is redacted by
//! construction (see [`SavedProcess`]).
//!
//! [`SavedProcess`]: crate::models::SavedProcess

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::models::SavedProcess;

/// Default store file name, placed in the user's home directory
const DEFAULT_STORE_FILE: &str = ".remoterun_processes.json";

/// Errors from the saved-process store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not resolve a home directory for the store")]
    NoHomeDirectory,
    #[error("failed to read store file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write store file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("store file '{path}' is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize processes: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save access to the saved-process collection
pub trait ProcessStore: Send {
    fn load(&self) -> Result<Vec<SavedProcess>, StoreError>;
    fn save(&self, processes: &[SavedProcess]) -> Result<(), StoreError>;
}

/// JSON file store
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at the default location (`~/.remoterun_processes.json`)
    pub fn default_location() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDirectory)?;
        Ok(Self {
            path: home.join(DEFAULT_STORE_FILE),
        })
    }

    /// Store at an explicit path
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProcessStore for JsonFileStore {
    /// Load all saved processes. A missing file is an empty collection, not
    /// an error; a corrupt file is surfaced so the caller can decide.
    fn load(&self) -> Result<Vec<SavedProcess>, StoreError> {
        if !self.path.exists() {
            info!("no saved-process store at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, processes: &[SavedProcess]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(processes)?;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("could not create store directory {}: {}", parent.display(), e);
                }
            }
        }

        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

//! Backing storage for session documents.
//!
//! The engine in [`crate::store`] only ever sees an in-memory mapping. This
//! module covers how that mapping gets loaded before a session starts and
//! written back after it changes:
//! - `MemoryStorage` keeps the document in process memory
//! - `FileStorage` keeps it as a JSON file on disk
//!
//! All methods are synchronous, matching the rest of this crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::tree::Tree;

/// Errors that can occur while loading or saving a document.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be interpreted as a document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Document could not be encoded.
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Storage lock was poisoned by a panicking writer.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Abstract document storage.
pub trait SessionStorage: Send + Sync {
    /// Load the stored document. Nothing stored yet loads as empty.
    fn load(&self) -> Result<Tree, StorageError>;

    /// Replace the stored document.
    fn save(&self, document: &Tree) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RwLock<Tree>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document.
    pub fn with_document(document: Tree) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Tree, StorageError> {
        self.document
            .read()
            .map(|doc| doc.clone())
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn save(&self, document: &Tree) -> Result<(), StorageError> {
        let mut stored = self
            .document
            .write()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        *stored = document.clone();
        Ok(())
    }
}

/// Storage backed by a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file a save is staged in before it replaces `path`.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Tree, StorageError> {
        if !self.path.exists() {
            debug!("No document at {}, starting empty", self.path.display());
            return Ok(Map::new());
        }

        let text = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => Err(StorageError::InvalidData(format!(
                "{} does not hold a JSON object (found {})",
                self.path.display(),
                type_name(&other)
            ))),
            Err(e) => Err(StorageError::InvalidData(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, document: &Tree) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Stage then rename so a partial write never replaces a good document
        let text = serde_json::to_string_pretty(document)?;
        let staging = self.staging_path();
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        debug!("Saved document to {}", self.path.display());
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use comp_core::CompositionRecord;
use engine_logging::engine_debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("deserialize error in {path:?}: {message}")]
    Deserialize { path: PathBuf, message: String },
}

/// Where finished composition records go, keyed by name.
#[async_trait::async_trait]
pub trait CompositionStore: Send + Sync {
    async fn exists_by_name(&self, name: &str) -> Result<bool, StoreError>;
    async fn create(&self, record: CompositionRecord) -> Result<(), StoreError>;
    async fn list_names(&self) -> Result<Vec<String>, StoreError>;
    /// Returns how many records were removed.
    async fn delete_by_name(&self, name: &str) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CompositionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CompositionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub async fn records(&self) -> Vec<CompositionRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl CompositionStore for MemoryStore {
    async fn exists_by_name(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.records.lock().await.iter().any(|r| r.name == name))
    }

    async fn create(&self, record: CompositionRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.records.lock().await.iter().map(|r| r.name.clone()).collect())
    }

    async fn delete_by_name(&self, name: &str) -> Result<usize, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.name != name);
        Ok(before - records.len())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    compositions: Vec<CompositionRecord>,
}

/// All records in one RON document, rewritten atomically on every change.
#[derive(Debug)]
pub struct RonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(err) => return Err(err.into()),
        };
        ron::from_str(&content).map_err(|err| StoreError::Deserialize {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let content = ron::ser::to_string_pretty(document, ron::ser::PrettyConfig::new())
            .map_err(|err| StoreError::Serialize(err.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        engine_debug!("Wrote {} records to {:?}", document.compositions.len(), self.path);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CompositionStore for RonFileStore {
    async fn exists_by_name(&self, name: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.compositions.iter().any(|r| r.name == name))
    }

    async fn create(&self, record: CompositionRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load()?;
        document.compositions.push(record);
        self.save(&document)
    }

    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.compositions.into_iter().map(|r| r.name).collect())
    }

    async fn delete_by_name(&self, name: &str) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load()?;
        let before = document.compositions.len();
        document.compositions.retain(|r| r.name != name);
        let removed = before - document.compositions.len();
        if removed > 0 {
            self.save(&document)?;
        }
        Ok(removed)
    }
}

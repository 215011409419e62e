//! JSON file storage backend.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

use super::{KeyValueStore, StorageError};

type Entries = BTreeMap<String, String>;

/// Storage persisted as a single JSON object on disk.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let bytes = serde_json::to_vec_pretty(entries).map_err(StorageError::Encode)?;
        let tmp = self.path.with_extension("tmp");

        fs::write(&tmp, bytes)
            .await
            .map_err(|source| self.io_error(source))?;

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;

        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await?;

        entries.insert(key.to_string(), value.to_string());

        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await?;

        if entries.remove(key).is_none() {
            return Ok(());
        }

        self.save(&entries).await
    }
}

//! Durable client-side key-value storage.

mod errors;
mod file;
mod memory;

use async_trait::async_trait;
use mockall::automock;

pub use errors::StorageError;
pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

/// Persistence scoped to a single device or profile.
///
/// Values survive process restarts for the file backend; keys are owned by
/// the session type that writes them and must not be touched elsewhere.
#[automock]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

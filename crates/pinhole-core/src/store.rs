use crate::error::StorageError;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for key-value store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A durable string-to-string map scoped to one device or process.
///
/// This is the only surface the engine persists through. Values are opaque
/// strings; the registry decides what goes in them.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes every entry or none of them.
    ///
    /// Readers never observe a state where only part of `entries` has been
    /// applied.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()>;

    /// Removes `key`. Returns `true` if it was present.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Removes every key.
    async fn clear(&self) -> Result<()>;

    /// Writes a single value.
    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.set_many(vec![(key.to_owned(), value)]).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        (**self).set_many(entries).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value).await
    }
}

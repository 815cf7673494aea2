use async_trait::async_trait;
use pinhole_core::store::{KeyValueStore, Result};
use pinhole_core::StorageError;
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// A [`KeyValueStore`] kept in a single JSON document on disk.
///
/// The whole document is loaded once by [`FileStore::open`] and rewritten on
/// every mutation. Each write goes to its own uniquely named temp file in the
/// same directory, which is then renamed over the original, so a crash or a
/// concurrent writer leaves either the old or a complete new document and
/// never a mix of the two. Handles on the same path do not see each other's
/// writes: the last rename wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::InvalidData(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file does not exist yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` to disk. The in-memory copy is only replaced by the
    /// caller once this succeeds.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let bytes = body.len();

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &body))
            .await
            .map_err(|e| {
                StorageError::Io(format!("{}: write task failed: {e}", self.path.display()))
            })??;

        trace!(path = %self.path.display(), bytes, "store file written");
        Ok(())
    }
}

/// Replaces `path` with `body` through a fresh temp file in the same
/// directory. On failure the temp file is removed and `path` is untouched.
fn replace_file(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    temp.write_all(body).map_err(|e| io_error(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| io_error(temp.path(), e))?;

    temp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<()> {
        let mut guard = self.entries.lock().await;
        let mut next = guard.clone();
        next.extend(entries);
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        if !guard.contains_key(key) {
            return Ok(false);
        }
        let mut next = guard.clone();
        next.remove(key);
        self.persist(&next).await?;
        *guard = next;
        Ok(true)
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.entries.lock().await;
        let next = BTreeMap::new();
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("pinhole.json")
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(store_path(&dir)).await.unwrap();

        assert!(store.get("links").await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        {
            let store = FileStore::open(&path).await.unwrap();
            store
                .set_many(vec![
                    ("links".to_string(), "[]".to_string()),
                    ("mappings".to_string(), "{}".to_string()),
                ])
                .await
                .unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("links").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("mappings").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("k", "v".to_string()).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(store_path(&dir)).await.unwrap();
        store.set("k", "v".to_string()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("pinhole.json")]);
    }

    #[tokio::test]
    async fn malformed_file_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[tokio::test]
    async fn remove_and_clear_are_persisted() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = FileStore::open(&path).await.unwrap();
        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();
        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());

        let reopened = FileStore::open(&path).await.unwrap();
        assert!(reopened.get("a").await.unwrap().is_none());
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));

        reopened.clear().await.unwrap();
        let cleared = FileStore::open(&path).await.unwrap();
        assert!(cleared.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        // A directory where the document should be makes the final rename fail.
        let path = store_path(&dir);
        std::fs::create_dir(&path).unwrap();

        let store = FileStore {
            path: path.clone(),
            entries: Mutex::new(BTreeMap::new()),
        };

        let err = store.set("k", "v".to_string()).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(store.get("k").await.unwrap().is_none());

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("pinhole.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_handles_never_mix_documents() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let large = Arc::new(FileStore::open(&path).await.unwrap());
        let small = Arc::new(FileStore::open(&path).await.unwrap());
        let large_value = "x".repeat(20 * 1024);

        for _ in 0..50 {
            let (a, b) = tokio::join!(
                tokio::spawn({
                    let store = Arc::clone(&large);
                    let value = large_value.clone();
                    async move { store.set("k", value).await }
                }),
                tokio::spawn({
                    let store = Arc::clone(&small);
                    async move { store.set("k", "small".to_string()).await }
                }),
            );
            a.unwrap().unwrap();
            b.unwrap().unwrap();

            let on_disk = FileStore::open(&path).await.unwrap();
            let value = on_disk.get("k").await.unwrap().unwrap();
            assert!(value == "small" || value == large_value);
        }

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("pinhole.json")]);
    }
}

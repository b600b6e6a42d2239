//! File-backed key-value store.
//!
//! All keys live in one JSON object file inside a capability directory.
//! Every mutation rewrites the file atomically; mutations are serialised so a
//! read-modify-write never loses a concurrent update. A file that no longer
//! parses fails reads and keyed writes until [`KeyValueStore::clear`]
//! replaces it.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tokio::sync::Mutex;
use tracing::debug;

use super::atomic_write::write_atomic;
use crate::domain::ports::{KeyValueStore, StorageError, StorageKey};

/// File name used inside the storage directory.
pub const STORE_FILE_NAME: &str = "gomate-storage.json";

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: Arc<Dir>,
    file: Utf8PathBuf,
    mutations: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open (creating if needed) the storage directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> Result<Self, StorageError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(path, ambient_authority()))
            .map(Self::from_dir)
            .map_err(|err| StorageError::unavailable(format!("{path}: {err}")))
    }

    /// Use an already opened directory.
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir: Arc::new(dir),
            file: Utf8PathBuf::from(STORE_FILE_NAME),
            mutations: Mutex::new(()),
        }
    }

    async fn read_entries(&self, key: &str) -> Result<Entries, StorageError> {
        let (dir, file) = (Arc::clone(&self.dir), self.file.clone());
        tokio::task::spawn_blocking(move || load(&dir, &file))
            .await
            .map_err(|err| StorageError::read(key, err.to_string()))?
            .map_err(|err| StorageError::read(key, err))
    }

    async fn update(
        &self,
        key: &str,
        apply: impl FnOnce(&mut Entries) + Send + 'static,
    ) -> Result<(), StorageError> {
        let _guard = self.mutations.lock().await;
        let (dir, file) = (Arc::clone(&self.dir), self.file.clone());
        tokio::task::spawn_blocking(move || {
            let mut entries = load(&dir, &file)?;
            apply(&mut entries);
            let encoded = serde_json::to_string_pretty(&entries).map_err(|err| err.to_string())?;
            write_atomic(&dir, &file, &encoded).map_err(|err| err.to_string())
        })
        .await
        .map_err(|err| StorageError::write(key, err.to_string()))?
        .map_err(|err| StorageError::write(key, err))?;
        debug!(key, "storage updated");
        Ok(())
    }

    /// Replace the file with an empty map without reading what it held.
    async fn truncate(&self) -> Result<(), StorageError> {
        let _guard = self.mutations.lock().await;
        let (dir, file) = (Arc::clone(&self.dir), self.file.clone());
        tokio::task::spawn_blocking(move || write_atomic(&dir, &file, "{}"))
            .await
            .map_err(|err| StorageError::write("*", err.to_string()))?
            .map_err(|err| StorageError::write("*", err.to_string()))?;
        debug!("storage cleared");
        Ok(())
    }
}

fn load(dir: &Dir, file: &Utf8Path) -> Result<Entries, String> {
    match dir.read_to_string(file) {
        Ok(raw) if raw.trim().is_empty() => Ok(Entries::new()),
        Ok(raw) => serde_json::from_str(&raw).map_err(|err| format!("{file} is corrupt: {err}")),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
        Err(err) => Err(err.to_string()),
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let mut entries = self.read_entries(key.as_str()).await?;
        Ok(entries.remove(key.as_str()))
    }

    async fn set_item(&self, key: StorageKey, value: Option<String>) -> Result<(), StorageError> {
        let Some(value) = value else {
            return self.remove_item(key).await;
        };
        self.update(key.as_str(), move |entries| {
            entries.insert(key.as_str().to_owned(), value);
        })
        .await
    }

    async fn remove_item(&self, key: StorageKey) -> Result<(), StorageError> {
        self.update(key.as_str(), move |entries| {
            entries.remove(key.as_str());
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.truncate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    struct Harness {
        _root: tempfile::TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn harness() -> Harness {
        let root = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(root.path().join("gomate"))
            .expect("utf-8 temp path");
        Harness { _root: root, path }
    }

    #[rstest]
    #[tokio::test]
    async fn values_survive_reopening(harness: Harness) {
        let store = FileKeyValueStore::open(&harness.path).expect("open");
        store
            .set_item(StorageKey::Token, Some("tok".to_owned()))
            .await
            .expect("write token");
        store
            .set_item(StorageKey::AppTheme, Some("dark".to_owned()))
            .await
            .expect("write theme");
        drop(store);

        let reopened = FileKeyValueStore::open(&harness.path).expect("reopen");
        assert_eq!(
            reopened.get_item(StorageKey::Token).await.expect("read"),
            Some("tok".to_owned())
        );
        assert_eq!(
            reopened.get_item(StorageKey::AppTheme).await.expect("read"),
            Some("dark".to_owned())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn none_and_remove_delete_keys(harness: Harness) {
        let store = FileKeyValueStore::open(&harness.path).expect("open");
        store
            .set_item(StorageKey::User, Some("{}".to_owned()))
            .await
            .expect("write");
        store.set_item(StorageKey::User, None).await.expect("set none");
        assert_eq!(store.get_item(StorageKey::User).await.expect("read"), None);

        store
            .set_item(StorageKey::Favourites, Some("[]".to_owned()))
            .await
            .expect("write");
        store.clear().await.expect("clear");
        assert_eq!(
            store.get_item(StorageKey::Favourites).await.expect("read"),
            None
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_file_reads_as_empty(harness: Harness) {
        let store = FileKeyValueStore::open(&harness.path).expect("open");
        assert_eq!(store.get_item(StorageKey::Token).await.expect("read"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_file_fails_reads(harness: Harness) {
        std::fs::create_dir_all(&harness.path).expect("mkdir");
        std::fs::write(harness.path.join(STORE_FILE_NAME), "{oops").expect("seed");
        let store = FileKeyValueStore::open(&harness.path).expect("open");

        let err = store
            .get_item(StorageKey::Token)
            .await
            .expect_err("corrupt");
        assert!(matches!(err, StorageError::Read { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn clearing_a_corrupt_file_makes_it_usable_again(harness: Harness) {
        std::fs::create_dir_all(&harness.path).expect("mkdir");
        std::fs::write(harness.path.join(STORE_FILE_NAME), "{oops").expect("seed");
        let store = FileKeyValueStore::open(&harness.path).expect("open");
        let err = store
            .set_item(StorageKey::Token, Some("tok".to_owned()))
            .await
            .expect_err("corrupt file refuses keyed writes");
        assert!(err.is_write());

        store.clear().await.expect("clear ignores the old contents");

        assert_eq!(store.get_item(StorageKey::Token).await.expect("read"), None);
        store
            .set_item(StorageKey::Token, Some("tok".to_owned()))
            .await
            .expect("write after clear");
        assert_eq!(
            store.get_item(StorageKey::Token).await.expect("read").as_deref(),
            Some("tok")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_writes_to_different_keys_do_not_conflict(harness: Harness) {
        let store = Arc::new(FileKeyValueStore::open(&harness.path).expect("open"));
        let handles: Vec<_> = StorageKey::ALL
            .into_iter()
            .map(|key| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .set_item(key, Some(key.as_str().to_owned()))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("task").expect("write");
        }

        for key in StorageKey::ALL {
            assert_eq!(
                store.get_item(key).await.expect("read").as_deref(),
                Some(key.as_str())
            );
        }
    }
}

//! Driven port for durable on-device key-value storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::define_port_error;

/// Keys written by the client. Each concern owns a distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Bearer token of the current session.
    Token,
    /// Serialised profile of the current session.
    User,
    /// Serialised favourites list.
    Favourites,
    /// Preferred colour scheme.
    AppTheme,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [Self; 4] = [Self::Token, Self::User, Self::Favourites, Self::AppTheme];

    /// Name under which the value is stored.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::User => "user",
            Self::Favourites => "favourites",
            Self::AppTheme => "app_theme",
        }
    }

    /// Key for a stored name, if the client knows it.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Errors raised by key-value storage adapters.
    pub enum StorageError {
        /// The backing store could not be opened.
        Unavailable { message: String } => "storage unavailable: {message}",
        /// Reading a key failed.
        Read { key: String, message: String } => "failed to read `{key}`: {message}",
        /// Writing or removing a key failed.
        Write { key: String, message: String } => "failed to write `{key}`: {message}",
    }
}

/// String-to-string storage that survives restarts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stored value, or `None` when the key is absent.
    async fn get_item(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value`; `None` removes the key instead.
    async fn set_item(&self, key: StorageKey, value: Option<String>) -> Result<(), StorageError>;

    /// Remove the key. Absent keys are not an error.
    async fn remove_item(&self, key: StorageKey) -> Result<(), StorageError>;

    /// Remove every key.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local store for tests and ephemeral runs.
///
/// Reads and writes can be made to fail on demand to exercise degraded
/// storage paths.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<StorageKey, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryKeyValueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `key = value`.
    pub fn with_item(self, key: StorageKey, value: impl Into<String>) -> Self {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.into());
        self
    }

    /// Make subsequent reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes, removals and clears fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current value without going through the async port.
    pub fn peek(&self, key: StorageKey) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Number of successful mutating calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::write(key, "injected write failure"));
        }
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut HashMap<StorageKey, String>)) {
        apply(&mut self.values.lock().unwrap_or_else(PoisonError::into_inner));
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_item(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::read(key.as_str(), "injected read failure"));
        }
        Ok(self.peek(key))
    }

    async fn set_item(&self, key: StorageKey, value: Option<String>) -> Result<(), StorageError> {
        self.check_write(key.as_str())?;
        self.mutate(|values| match value {
            Some(value) => {
                values.insert(key, value);
            }
            None => {
                values.remove(&key);
            }
        });
        Ok(())
    }

    async fn remove_item(&self, key: StorageKey) -> Result<(), StorageError> {
        self.check_write(key.as_str())?;
        self.mutate(|values| {
            values.remove(&key);
        });
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check_write("*")?;
        self.mutate(HashMap::clear);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StorageKey::Token, "token")]
    #[case(StorageKey::User, "user")]
    #[case(StorageKey::Favourites, "favourites")]
    #[case(StorageKey::AppTheme, "app_theme")]
    fn keys_round_trip_through_their_names(#[case] key: StorageKey, #[case] name: &str) {
        assert_eq!(key.as_str(), name);
        assert_eq!(StorageKey::from_name(name), Some(key));
    }

    #[tokio::test]
    async fn setting_none_removes_the_key() {
        let store = InMemoryKeyValueStore::new().with_item(StorageKey::Token, "tok");
        store
            .set_item(StorageKey::Token, None)
            .await
            .expect("set none");
        assert_eq!(store.get_item(StorageKey::Token).await.expect("read"), None);
    }

    #[tokio::test]
    async fn injected_failures_leave_values_untouched() {
        let store = InMemoryKeyValueStore::new().with_item(StorageKey::User, "{}");
        store.fail_writes(true);
        let err = store.clear().await.expect_err("clear must fail");
        assert!(matches!(err, StorageError::Write { .. }));
        assert_eq!(store.peek(StorageKey::User).as_deref(), Some("{}"));
        assert_eq!(store.write_count(), 0);

        store.fail_reads(true);
        let err = store
            .get_item(StorageKey::User)
            .await
            .expect_err("read must fail");
        assert_eq!(err.to_string(), "failed to read `user`: injected read failure");
    }
}

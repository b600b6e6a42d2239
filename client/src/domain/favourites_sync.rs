//! Keeps the favourites slice and the `favourites` storage key consistent.
//!
//! Every mutation is applied to the slice first, then the full list is
//! written. Writes are serialised and each one serialises the slice as it is
//! when the write starts, so the stored value always matches the slice once
//! the mutation returns.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::{KeyValueStore, StorageError, StorageKey};
use crate::domain::{
    Coordinator, Destination, EntryId, Error, FavouritesEvent, Lifecycle, OperationKind,
};

/// Result of a favourites mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Whether the in-memory list changed.
    pub changed: bool,
    /// Outcome of writing the full list to storage.
    pub persisted: Result<(), StorageError>,
}

impl PersistOutcome {
    /// Whether the write succeeded.
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_ok()
    }
}

/// Result of loading the persisted list.
#[derive(Debug, Clone, PartialEq)]
pub enum FavouritesLoad {
    /// The stored list was read.
    Restored(Vec<Destination>),
    /// Nothing was stored.
    Empty,
    /// The stored value could not be parsed and was replaced with `[]`.
    Recovered {
        /// Parser message for the discarded value.
        reason: String,
    },
}

impl FavouritesLoad {
    /// Entries the slice holds after the load.
    pub fn entries(&self) -> Vec<Destination> {
        match self {
            Self::Restored(entries) => entries.clone(),
            Self::Empty | Self::Recovered { .. } => Vec::new(),
        }
    }
}

/// Applies favourites mutations and persists the result.
pub struct FavouritesSync<S: ?Sized> {
    coordinator: Arc<Coordinator>,
    storage: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S: ?Sized> FavouritesSync<S> {
    /// Create a synchroniser writing to `storage`.
    pub fn new(coordinator: Arc<Coordinator>, storage: Arc<S>) -> Self {
        Self {
            coordinator,
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Whether `id` is a favourite.
    pub fn is_favourite(&self, id: EntryId) -> bool {
        self.coordinator
            .store()
            .select(|state| state.favourites.contains(id))
    }
}

impl<S> FavouritesSync<S>
where
    S: KeyValueStore + ?Sized,
{
    /// Replace the list wholesale.
    pub async fn set_all(&self, list: Vec<Destination>) -> PersistOutcome {
        self.mutate(FavouritesEvent::SetAll(list)).await
    }

    /// Append `entry` unless its id is already present.
    pub async fn add(&self, entry: Destination) -> PersistOutcome {
        self.mutate(FavouritesEvent::Add(entry)).await
    }

    /// Drop the entry with `id`, if present.
    pub async fn remove(&self, id: EntryId) -> PersistOutcome {
        self.mutate(FavouritesEvent::Remove(id)).await
    }

    /// Remove `entry` when present, append it otherwise.
    pub async fn toggle(&self, entry: Destination) -> PersistOutcome {
        self.mutate(FavouritesEvent::Toggle(entry)).await
    }

    /// Replace the slice with the persisted list.
    ///
    /// A missing value yields an empty list. A value that does not parse is
    /// overwritten with `[]`. A failing read rejects the load and leaves the
    /// slice as it was.
    pub async fn load(&self) -> Result<FavouritesLoad, Error> {
        self.coordinator
            .run(OperationKind::LoadFavourites, self.read(), |lifecycle| {
                FavouritesEvent::Load(lifecycle.map(|loaded| loaded.entries())).into()
            })
            .await
    }

    async fn mutate(&self, event: FavouritesEvent) -> PersistOutcome {
        let store = self.coordinator.store();
        let before = store.select(|state| state.favourites.items().to_vec());
        store.dispatch(event);
        let changed = store.select(|state| state.favourites.items() != before.as_slice());

        let persisted = self.write_snapshot().await;
        if let Err(error) = &persisted {
            warn!(%error, "favourites were not persisted");
        }
        PersistOutcome { changed, persisted }
    }

    async fn write_snapshot(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self
            .coordinator
            .store()
            .select(|state| state.favourites.items().to_vec());
        let encoded = serde_json::to_string(&snapshot)
            .map_err(|err| StorageError::write(StorageKey::Favourites.as_str(), err.to_string()))?;
        debug!(count = snapshot.len(), "persisting favourites");
        self.storage
            .set_item(StorageKey::Favourites, Some(encoded))
            .await
    }

    async fn read(&self) -> Result<FavouritesLoad, Error> {
        let stored = self
            .storage
            .get_item(StorageKey::Favourites)
            .await
            .map_err(|err| {
                warn!(kind = err.kind(), error = %err, "failed to read favourites");
                Error::service_unavailable(format!("Unable to load favourites: {err}"))
            })?;
        let Some(raw) = stored else {
            return Ok(FavouritesLoad::Empty);
        };
        match serde_json::from_str::<Vec<Destination>>(&raw) {
            Ok(entries) => Ok(FavouritesLoad::Restored(entries)),
            Err(err) => {
                let reason = err.to_string();
                warn!(%reason, "discarding malformed favourites");
                let _guard = self.write_lock.lock().await;
                if let Err(error) = self
                    .storage
                    .set_item(StorageKey::Favourites, Some("[]".to_owned()))
                    .await
                {
                    warn!(%error, "failed to reset malformed favourites");
                }
                Ok(FavouritesLoad::Recovered { reason })
            }
        }
    }
}

#[cfg(test)]
#[path = "favourites_sync_tests.rs"]
mod tests;

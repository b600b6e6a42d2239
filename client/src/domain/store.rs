//! Observable in-memory state store.
//!
//! The store owns every slice. Transitions are applied one at a time under a
//! lock; observers are notified afterwards with the post-transition snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::trace;

use super::catalog::{CatalogEvent, CatalogSlice};
use super::favourites::{FavouritesEvent, FavouritesSlice};
use super::session::{Session, SessionEvent};

/// Snapshot of every slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Authentication slice.
    pub session: Session,
    /// Catalogue slice.
    pub catalog: CatalogSlice,
    /// Favourites slice.
    pub favourites: FavouritesSlice,
}

/// A transition addressed to exactly one slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Session slice event.
    Session(SessionEvent),
    /// Catalogue slice event.
    Catalog(CatalogEvent),
    /// Favourites slice event.
    Favourites(FavouritesEvent),
}

impl Transition {
    /// Name of the slice this transition targets.
    pub const fn slice(&self) -> &'static str {
        match self {
            Self::Session(_) => "session",
            Self::Catalog(_) => "catalog",
            Self::Favourites(_) => "favourites",
        }
    }
}

impl From<SessionEvent> for Transition {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}

impl From<CatalogEvent> for Transition {
    fn from(event: CatalogEvent) -> Self {
        Self::Catalog(event)
    }
}

impl From<FavouritesEvent> for Transition {
    fn from(event: FavouritesEvent) -> Self {
        Self::Favourites(event)
    }
}

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked after every dispatch.
pub type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// The single shared mutable resource of the client.
pub struct StateStore {
    state: Mutex<AppState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    updates: watch::Sender<AppState>,
}

impl StateStore {
    /// Create a store seeded with `initial`.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{AppState, StateStore};
    ///
    /// let store = StateStore::new(AppState::default());
    /// assert!(!store.snapshot().session.is_authenticated());
    /// ```
    pub fn new(initial: AppState) -> Self {
        let (updates, _) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            updates,
        }
    }

    /// Apply `transition` to its slice, then notify observers.
    pub fn dispatch(&self, transition: impl Into<Transition>) {
        let transition = transition.into();
        trace!(slice = transition.slice(), ?transition, "dispatch");
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match transition {
                Transition::Session(event) => state.session.apply(event),
                Transition::Catalog(event) => state.catalog.apply(event),
                Transition::Favourites(event) => state.favourites.apply(event),
            }
            state.clone()
        };

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        self.updates.send_replace(snapshot);
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Project the current state without cloning every slice.
    pub fn select<R>(&self, projection: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        projection(&state)
    }

    /// Register `listener`; it runs after every later dispatch.
    pub fn subscribe(&self, listener: impl Fn(&AppState) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Receiver that observes every post-dispatch snapshot.
    pub fn watch(&self) -> watch::Receiver<AppState> {
        self.updates.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

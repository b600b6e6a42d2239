//! Composition object handed to presentation layers.
//!
//! `GoMateApp` owns the store and every service. Nothing here is global: a
//! test or a binary builds its own instance with the adapters it wants.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::domain::ports::{CatalogGateway, KeyValueStore, StorageError};
use crate::domain::{
    AppState, AuthenticatedUser, CatalogPage, CatalogService, Coordinator, Destination, EntryId,
    Error, FavouritesEvent, FavouritesLoad, FavouritesSync, PersistOutcome, SessionEvent, SessionService,
    SettlementPolicy, StateStore, SubscriptionId, ThemeMode, ThemeService, UserProfile,
};

/// Slices that carry a user-visible error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSlice {
    /// Session errors.
    Session,
    /// Catalogue errors.
    Catalog,
}

/// What launch-time rehydration found.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchReport {
    /// Whether a persisted session was restored.
    pub authenticated: bool,
    /// Outcome of reading persisted favourites.
    pub favourites: Result<FavouritesLoad, Error>,
    /// Stored colour scheme.
    pub theme: ThemeMode,
}

/// The client application: store plus operations.
pub struct GoMateApp {
    store: Arc<StateStore>,
    session: SessionService<dyn CatalogGateway, dyn KeyValueStore>,
    catalog: CatalogService<dyn CatalogGateway>,
    favourites: FavouritesSync<dyn KeyValueStore>,
    theme: ThemeService<dyn KeyValueStore>,
    storage: Arc<dyn KeyValueStore>,
}

impl GoMateApp {
    /// Wire a new application around `initial` state.
    pub fn new(
        initial: AppState,
        gateway: Arc<dyn CatalogGateway>,
        storage: Arc<dyn KeyValueStore>,
        policy: SettlementPolicy,
    ) -> Self {
        let store = Arc::new(StateStore::new(initial));
        let coordinator = Arc::new(Coordinator::new(Arc::clone(&store), policy));
        Self {
            session: SessionService::new(
                Arc::clone(&coordinator),
                Arc::clone(&gateway),
                Arc::clone(&storage),
            ),
            catalog: CatalogService::new(Arc::clone(&coordinator), gateway),
            favourites: FavouritesSync::new(coordinator, Arc::clone(&storage)),
            theme: ThemeService::new(Arc::clone(&storage)),
            storage,
            store,
        }
    }

    /// Shared store.
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Immutable snapshot of every slice.
    pub fn state(&self) -> AppState {
        self.store.snapshot()
    }

    /// Register a listener run after every transition.
    pub fn subscribe(
        &self,
        listener: impl Fn(&AppState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Async view of post-transition snapshots.
    pub fn watch(&self) -> watch::Receiver<AppState> {
        self.store.watch()
    }

    /// Restore the session, favourites and theme from storage.
    pub async fn launch(&self) -> LaunchReport {
        let authenticated = self.session.check_status().await.is_ok();
        let favourites = self.favourites.load().await;
        let theme = self.theme.load_theme().await;
        info!(authenticated, theme = %theme, "client rehydrated");
        LaunchReport {
            authenticated,
            favourites,
            theme,
        }
    }

    /// See [`SessionService::login`].
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, Error> {
        self.session.login(username, password).await
    }

    /// See [`SessionService::check_status`].
    pub async fn check_status(&self) -> Result<AuthenticatedUser, Error> {
        self.session.check_status().await
    }

    /// See [`SessionService::logout`].
    pub async fn logout(&self) -> Result<(), StorageError> {
        self.session.logout().await
    }

    /// Erase every persisted key, then drop the session and favourites held
    /// in memory. Succeeds even when the stored file no longer parses.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.storage.clear().await?;
        self.store.dispatch(SessionEvent::Logout);
        self.store.dispatch(FavouritesEvent::SetAll(Vec::new()));
        info!("persisted state erased");
        Ok(())
    }

    /// See [`SessionService::refresh_profile`].
    pub async fn refresh_profile(&self) -> Result<UserProfile, Error> {
        self.session.refresh_profile().await
    }

    /// See [`CatalogService::fetch_catalog`].
    pub async fn fetch_catalog(&self, limit: u64, skip: u64) -> Result<CatalogPage, Error> {
        self.catalog.fetch_catalog(limit, skip).await
    }

    /// See [`CatalogService::search_catalog`].
    pub async fn search_catalog(&self, query: &str) -> Result<CatalogPage, Error> {
        self.catalog.search_catalog(query).await
    }

    /// See [`CatalogService::fetch_entry`].
    pub async fn fetch_entry(&self, id: EntryId) -> Result<Destination, Error> {
        self.catalog.fetch_entry(id).await
    }

    /// See [`CatalogService::fetch_categories`].
    pub async fn fetch_categories(&self) -> Result<Vec<String>, Error> {
        self.catalog.fetch_categories().await
    }

    /// See [`CatalogService::fetch_by_category`].
    pub async fn fetch_by_category(&self, category: &str) -> Result<CatalogPage, Error> {
        self.catalog.fetch_by_category(category).await
    }

    /// Record the search text without searching.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.catalog.set_search_query(query);
    }

    /// Record the chosen category without fetching.
    pub fn set_selected_category(&self, category: Option<String>) {
        self.catalog.set_selected_category(category);
    }

    /// Forget the entry on the details view.
    pub fn clear_current_entry(&self) {
        self.catalog.clear_current_entry();
    }

    /// Clear the error of one slice.
    pub fn clear_error(&self, slice: ErrorSlice) {
        match slice {
            ErrorSlice::Session => self.store.dispatch(SessionEvent::ClearError),
            ErrorSlice::Catalog => self.catalog.clear_error(),
        }
    }

    /// See [`FavouritesSync::set_all`].
    pub async fn set_favourites(&self, list: Vec<Destination>) -> PersistOutcome {
        self.favourites.set_all(list).await
    }

    /// See [`FavouritesSync::add`].
    pub async fn add_favourite(&self, entry: Destination) -> PersistOutcome {
        self.favourites.add(entry).await
    }

    /// See [`FavouritesSync::remove`].
    pub async fn remove_favourite(&self, id: EntryId) -> PersistOutcome {
        self.favourites.remove(id).await
    }

    /// See [`FavouritesSync::toggle`].
    pub async fn toggle_favourite(&self, entry: Destination) -> PersistOutcome {
        self.favourites.toggle(entry).await
    }

    /// See [`FavouritesSync::load`].
    pub async fn load_favourites(&self) -> Result<FavouritesLoad, Error> {
        self.favourites.load().await
    }

    /// Whether `id` is a favourite.
    pub fn is_favourite(&self, id: EntryId) -> bool {
        self.favourites.is_favourite(id)
    }

    /// See [`ThemeService::load_theme`].
    pub async fn load_theme(&self) -> ThemeMode {
        self.theme.load_theme().await
    }

    /// See [`ThemeService::set_theme`].
    pub async fn set_theme(&self, mode: ThemeMode) -> Result<(), StorageError> {
        self.theme.set_theme(mode).await
    }

    /// See [`ThemeService::toggle_theme`].
    pub async fn toggle_theme(&self) -> Result<ThemeMode, StorageError> {
        self.theme.toggle_theme().await
    }
}

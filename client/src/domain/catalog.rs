//! Catalogue slice: the browsable list, the entry being viewed, and the
//! loading and error bookkeeping shared by every catalogue request.

use super::entry::{CatalogPage, Destination, PageInfo};
use super::lifecycle::Lifecycle;

/// Events accepted by the catalogue slice.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// Paged listing lifecycle.
    Fetch(Lifecycle<CatalogPage>),
    /// Free-text search lifecycle.
    Search(Lifecycle<CatalogPage>),
    /// Category listing lifecycle.
    FetchByCategory(Lifecycle<CatalogPage>),
    /// Single entry lifecycle.
    FetchEntry(Lifecycle<Destination>),
    /// Category names lifecycle. Only fulfilment changes the slice.
    Categories(Lifecycle<Vec<String>>),
    /// Record the query typed by the user.
    SetSearchQuery(String),
    /// Record the category chosen by the user.
    SetSelectedCategory(Option<String>),
    /// Forget the entry being viewed.
    ClearCurrentEntry,
    /// Clear the surfaced error.
    ClearError,
}

/// Catalogue state.
///
/// `items` is replaced wholesale by every listing response. On failure the
/// previous `items` and `current_item` are kept so the last good data stays
/// visible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogSlice {
    items: Vec<Destination>,
    current_item: Option<Destination>,
    loading: bool,
    error: Option<String>,
    search_query: String,
    categories: Vec<String>,
    selected_category: Option<String>,
    page: Option<PageInfo>,
}

impl CatalogSlice {
    /// Entries from the last settled listing.
    pub fn items(&self) -> &[Destination] {
        &self.items
    }

    /// Entry shown on the details view.
    pub fn current_item(&self) -> Option<&Destination> {
        self.current_item.as_ref()
    }

    /// Whether a catalogue request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last surfaced error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Query text last recorded.
    pub fn search_query(&self) -> &str {
        self.search_query.as_str()
    }

    /// Known category names.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category chosen by the user.
    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Paging metadata from the last settled listing.
    pub fn page(&self) -> Option<PageInfo> {
        self.page
    }

    /// Apply one event. Total over every event and state.
    pub fn apply(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Fetch(lifecycle)
            | CatalogEvent::Search(lifecycle)
            | CatalogEvent::FetchByCategory(lifecycle) => self.apply_listing(lifecycle),
            CatalogEvent::FetchEntry(lifecycle) => match lifecycle {
                Lifecycle::Pending => self.begin(),
                Lifecycle::Fulfilled(entry) => {
                    self.loading = false;
                    self.current_item = Some(entry);
                }
                Lifecycle::Rejected(message) => self.fail(message),
            },
            CatalogEvent::Categories(Lifecycle::Fulfilled(categories)) => {
                self.categories = categories;
            }
            CatalogEvent::Categories(Lifecycle::Pending | Lifecycle::Rejected(_)) => {}
            CatalogEvent::SetSearchQuery(query) => self.search_query = query,
            CatalogEvent::SetSelectedCategory(category) => self.selected_category = category,
            CatalogEvent::ClearCurrentEntry => self.current_item = None,
            CatalogEvent::ClearError => self.error = None,
        }
    }

    fn apply_listing(&mut self, lifecycle: Lifecycle<CatalogPage>) {
        match lifecycle {
            Lifecycle::Pending => self.begin(),
            Lifecycle::Fulfilled(page) => {
                self.loading = false;
                self.page = Some(page.info());
                self.items = page.entries;
            }
            Lifecycle::Rejected(message) => self.fail(message),
        }
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

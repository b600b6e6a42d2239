//! Catalogue operations.
//!
//! Gateway failures are reduced to fixed user-facing messages; the technical
//! detail is only traced.

use std::sync::Arc;

use crate::domain::ports::CatalogGateway;
use crate::domain::{
    CatalogEvent, CatalogPage, Coordinator, Destination, EntryId, Error, OperationKind,
};

/// Page size used when the caller does not choose one.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

const LIST_FAILED: &str = "Unable to load destinations. Please check your connection.";
const ENTRY_FAILED: &str = "Unable to load destination details.";
const SEARCH_FAILED: &str = "Unable to search destinations. Please try again.";
const CATEGORY_FAILED: &str = "Unable to load destinations by category.";
const CATEGORIES_FAILED: &str = "Failed to fetch categories";

/// Drives the catalogue slice.
pub struct CatalogService<G: ?Sized> {
    coordinator: Arc<Coordinator>,
    gateway: Arc<G>,
}

impl<G: ?Sized> CatalogService<G> {
    /// Create a service dispatching through `coordinator`.
    pub fn new(coordinator: Arc<Coordinator>, gateway: Arc<G>) -> Self {
        Self {
            coordinator,
            gateway,
        }
    }

    /// Record the query typed by the user.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.coordinator
            .store()
            .dispatch(CatalogEvent::SetSearchQuery(query.into()));
    }

    /// Record the category chosen by the user.
    pub fn set_selected_category(&self, category: Option<String>) {
        self.coordinator
            .store()
            .dispatch(CatalogEvent::SetSelectedCategory(category));
    }

    /// Forget the entry shown on the details view.
    pub fn clear_current_entry(&self) {
        self.coordinator
            .store()
            .dispatch(CatalogEvent::ClearCurrentEntry);
    }

    /// Clear the catalogue error.
    pub fn clear_error(&self) {
        self.coordinator.store().dispatch(CatalogEvent::ClearError);
    }
}

impl<G> CatalogService<G>
where
    G: CatalogGateway + ?Sized,
{
    /// Load one page and replace the visible items with it.
    pub async fn fetch_catalog(&self, limit: u64, skip: u64) -> Result<CatalogPage, Error> {
        let listing = async {
            self.gateway
                .list_entries(limit, skip)
                .await
                .map_err(|err| err.into_domain(LIST_FAILED))
        };
        self.coordinator
            .run(OperationKind::FetchCatalog, listing, |lifecycle| {
                CatalogEvent::Fetch(lifecycle).into()
            })
            .await
    }

    /// Record `query` and replace the visible items with its matches.
    ///
    /// A blank query falls back to the first page of the full catalogue.
    pub async fn search_catalog(&self, query: &str) -> Result<CatalogPage, Error> {
        self.set_search_query(query);
        let query = query.trim();
        if query.is_empty() {
            return self.fetch_catalog(DEFAULT_PAGE_LIMIT, 0).await;
        }
        let search = async {
            self.gateway
                .search_entries(query)
                .await
                .map_err(|err| err.into_domain(SEARCH_FAILED))
        };
        self.coordinator
            .run(OperationKind::SearchCatalog, search, |lifecycle| {
                CatalogEvent::Search(lifecycle).into()
            })
            .await
    }

    /// Load one entry into the details view.
    pub async fn fetch_entry(&self, id: EntryId) -> Result<Destination, Error> {
        let lookup = async {
            self.gateway
                .get_entry(id)
                .await
                .map_err(|err| err.into_domain(ENTRY_FAILED))
        };
        self.coordinator
            .run(OperationKind::FetchEntry, lookup, |lifecycle| {
                CatalogEvent::FetchEntry(lifecycle).into()
            })
            .await
    }

    /// Load the category names. Failures leave the known list unchanged.
    pub async fn fetch_categories(&self) -> Result<Vec<String>, Error> {
        let categories = async {
            self.gateway
                .list_categories()
                .await
                .map_err(|err| err.into_domain(CATEGORIES_FAILED))
        };
        self.coordinator
            .run(OperationKind::FetchCategories, categories, |lifecycle| {
                CatalogEvent::Categories(lifecycle).into()
            })
            .await
    }

    /// Select `category` and replace the visible items with its entries.
    pub async fn fetch_by_category(&self, category: &str) -> Result<CatalogPage, Error> {
        self.set_selected_category(Some(category.to_owned()));
        let listing = async {
            self.gateway
                .entries_by_category(category)
                .await
                .map_err(|err| err.into_domain(CATEGORY_FAILED))
        };
        self.coordinator
            .run(OperationKind::FetchByCategory, listing, |lifecycle| {
                CatalogEvent::FetchByCategory(lifecycle).into()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{GatewayError, MockCatalogGateway};
    use crate::domain::{ErrorCode, SettlementPolicy, StateStore};
    use rstest::rstest;

    fn make_service(gateway: MockCatalogGateway) -> (Arc<StateStore>, CatalogService<MockCatalogGateway>) {
        let store = Arc::new(StateStore::default());
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&store),
            SettlementPolicy::default(),
        ));
        (store, CatalogService::new(coordinator, Arc::new(gateway)))
    }

    fn page(ids: &[u64]) -> CatalogPage {
        CatalogPage {
            entries: ids
                .iter()
                .map(|id| Destination::new(EntryId::new(*id), format!("Visit {id}")))
                .collect(),
            total: 100,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    #[tokio::test]
    async fn fetch_catalog_stores_items_and_paging() {
        let mut gateway = MockCatalogGateway::new();
        gateway
            .expect_list_entries()
            .withf(|limit, skip| *limit == 20 && *skip == 0)
            .return_once(|_, _| Ok(page(&[1, 2])));
        let (store, service) = make_service(gateway);

        service.fetch_catalog(DEFAULT_PAGE_LIMIT, 0).await.expect("page");

        let catalog = store.snapshot().catalog;
        assert_eq!(catalog.items().len(), 2);
        assert!(catalog.page().is_some_and(|info| info.has_more()));
    }

    #[rstest]
    #[case(GatewayError::transport("connection reset"), LIST_FAILED)]
    #[case(GatewayError::decode("missing products"), LIST_FAILED)]
    #[tokio::test]
    async fn fetch_failure_keeps_stale_items(#[case] failure: GatewayError, #[case] message: &str) {
        let mut gateway = MockCatalogGateway::new();
        let mut calls = 0;
        gateway.expect_list_entries().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(page(&[7]))
            } else {
                Err(failure.clone())
            }
        });
        let (store, service) = make_service(gateway);

        service.fetch_catalog(20, 0).await.expect("first page");
        service.fetch_catalog(20, 20).await.expect_err("second page fails");

        let catalog = store.snapshot().catalog;
        assert_eq!(catalog.items()[0].id, EntryId::new(7));
        assert_eq!(catalog.error(), Some(message));
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn search_records_the_query_and_replaces_items() {
        let mut gateway = MockCatalogGateway::new();
        gateway
            .expect_search_entries()
            .withf(|query| query == "phone")
            .return_once(|_| Ok(page(&[9])));
        let (store, service) = make_service(gateway);

        service.search_catalog(" phone ").await.expect("search");

        let catalog = store.snapshot().catalog;
        assert_eq!(catalog.search_query(), " phone ");
        assert_eq!(catalog.items()[0].id, EntryId::new(9));
    }

    #[tokio::test]
    async fn blank_search_lists_the_first_page() {
        let mut gateway = MockCatalogGateway::new();
        gateway.expect_search_entries().never();
        gateway
            .expect_list_entries()
            .times(1)
            .return_once(|_, _| Ok(page(&[1])));
        let (_, service) = make_service(gateway);

        assert!(service.search_catalog("   ").await.is_ok());
    }

    #[tokio::test]
    async fn missing_entry_maps_to_not_found() {
        let mut gateway = MockCatalogGateway::new();
        gateway
            .expect_get_entry()
            .return_once(|id| Err(GatewayError::not_found(format!("destination {id}"))));
        let (store, service) = make_service(gateway);

        let err = service.fetch_entry(EntryId::new(404)).await.expect_err("missing");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(store.snapshot().catalog.error(), Some(ENTRY_FAILED));
    }

    #[tokio::test]
    async fn category_failures_do_not_touch_the_slice() {
        let mut gateway = MockCatalogGateway::new();
        gateway
            .expect_list_categories()
            .return_once(|| Err(GatewayError::timeout("10s")));
        let (store, service) = make_service(gateway);

        let err = service.fetch_categories().await.expect_err("timeout");

        assert_eq!(err.message(), CATEGORIES_FAILED);
        let catalog = store.snapshot().catalog;
        assert!(catalog.error().is_none());
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn fetch_by_category_selects_it() {
        let mut gateway = MockCatalogGateway::new();
        gateway
            .expect_entries_by_category()
            .withf(|category| category == "beauty")
            .return_once(|_| Ok(page(&[3, 4])));
        let (store, service) = make_service(gateway);

        service.fetch_by_category("beauty").await.expect("listing");

        let catalog = store.snapshot().catalog;
        assert_eq!(catalog.selected_category(), Some("beauty"));
        assert_eq!(catalog.items().len(), 2);
    }
}

//! Asynchronous operation coordinator.
//!
//! Wraps one unit of asynchronous work into a `Pending` transition followed by
//! exactly one `Fulfilled` or `Rejected` transition. Each run is stamped with
//! a [`RequestTicket`]; the [`SettlementPolicy`] decides what happens when an
//! older request settles after a newer one on the same channel.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::lifecycle::Lifecycle;
use super::store::{StateStore, Transition};

/// How overlapping requests on one channel are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlementPolicy {
    /// Every settlement is applied; whichever settles last is visible.
    #[default]
    LastSettledWins,
    /// Settlements from superseded requests are discarded.
    LatestIssuedWins,
}

impl SettlementPolicy {
    /// Canonical configuration spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastSettledWins => "last-settled-wins",
            Self::LatestIssuedWins => "latest-issued-wins",
        }
    }
}

/// Returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown settlement policy `{0}`; expected `last-settled-wins` or `latest-issued-wins`")]
pub struct UnknownSettlementPolicy(pub String);

impl FromStr for SettlementPolicy {
    type Err = UnknownSettlementPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-settled-wins" | "last_settled_wins" => Ok(Self::LastSettledWins),
            "latest-issued-wins" | "latest_issued_wins" => Ok(Self::LatestIssuedWins),
            _ => Err(UnknownSettlementPolicy(value.to_owned())),
        }
    }
}

/// State region whose requests supersede one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Session requests.
    Session,
    /// Listing requests that replace `items`.
    CatalogListing,
    /// Requests that set `current_item`.
    CatalogEntry,
    /// Category name requests.
    Categories,
    /// Favourites load requests.
    FavouritesLoad,
}

/// Logical asynchronous operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Credential login.
    Login,
    /// Launch-time rehydration.
    CheckStatus,
    /// Profile refresh.
    RefreshProfile,
    /// Paged catalogue listing.
    FetchCatalog,
    /// Free-text search.
    SearchCatalog,
    /// Single entry lookup.
    FetchEntry,
    /// Category names.
    FetchCategories,
    /// Listing filtered by category.
    FetchByCategory,
    /// Favourites read from storage.
    LoadFavourites,
}

impl OperationKind {
    /// Channel on which this operation competes.
    pub const fn channel(self) -> Channel {
        match self {
            Self::Login | Self::CheckStatus | Self::RefreshProfile => Channel::Session,
            Self::FetchCatalog | Self::SearchCatalog | Self::FetchByCategory => {
                Channel::CatalogListing
            }
            Self::FetchEntry => Channel::CatalogEntry,
            Self::FetchCategories => Channel::Categories,
            Self::LoadFavourites => Channel::FavouritesLoad,
        }
    }

    /// Name used in trace output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::CheckStatus => "check_status",
            Self::RefreshProfile => "refresh_profile",
            Self::FetchCatalog => "fetch_catalog",
            Self::SearchCatalog => "search_catalog",
            Self::FetchEntry => "fetch_entry",
            Self::FetchCategories => "fetch_categories",
            Self::FetchByCategory => "fetch_by_category",
            Self::LoadFavourites => "load_favourites",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Monotonic stamp for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    channel: Channel,
    sequence: u64,
}

impl RequestTicket {
    /// Channel the ticket was issued on.
    pub const fn channel(self) -> Channel {
        self.channel
    }

    /// Position in the channel's issue order, starting at 1.
    pub const fn sequence(self) -> u64 {
        self.sequence
    }
}

/// Drives asynchronous operations against a [`StateStore`].
#[derive(Debug)]
pub struct Coordinator {
    store: Arc<StateStore>,
    policy: SettlementPolicy,
    issued: Mutex<HashMap<Channel, u64>>,
}

impl Coordinator {
    /// Create a coordinator that dispatches into `store`.
    pub fn new(store: Arc<StateStore>, policy: SettlementPolicy) -> Self {
        Self {
            store,
            policy,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Store the coordinator dispatches into.
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Active settlement policy.
    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// Run `operation`, reflecting its lifecycle through `to_transition`.
    ///
    /// `Pending` is dispatched before the future is first polled. The result
    /// is handed back unchanged so callers can offer a retry.
    pub async fn run<T, E, Fut, F>(
        &self,
        kind: OperationKind,
        operation: Fut,
        to_transition: F,
    ) -> Result<T, E>
    where
        T: Clone,
        E: fmt::Display,
        Fut: Future<Output = Result<T, E>>,
        F: Fn(Lifecycle<T>) -> Transition,
    {
        let ticket = self.issue(kind.channel());
        debug!(operation = kind.name(), sequence = ticket.sequence, "operation issued");
        self.store.dispatch(to_transition(Lifecycle::Pending));

        let result = operation.await;

        if !self.accepts(ticket) {
            debug!(
                operation = kind.name(),
                sequence = ticket.sequence,
                "discarding superseded settlement"
            );
            return result;
        }
        match &result {
            Ok(value) => {
                debug!(operation = kind.name(), sequence = ticket.sequence, "operation fulfilled");
                self.store.dispatch(to_transition(Lifecycle::Fulfilled(value.clone())));
            }
            Err(error) => {
                let message = error.to_string();
                warn!(operation = kind.name(), sequence = ticket.sequence, %message, "operation rejected");
                self.store.dispatch(to_transition(Lifecycle::Rejected(message)));
            }
        }
        result
    }

    fn issue(&self, channel: Channel) -> RequestTicket {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = issued.entry(channel).or_insert(0);
        *sequence += 1;
        RequestTicket {
            channel,
            sequence: *sequence,
        }
    }

    fn accepts(&self, ticket: RequestTicket) -> bool {
        match self.policy {
            SettlementPolicy::LastSettledWins => true,
            SettlementPolicy::LatestIssuedWins => {
                let issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
                issued.get(&ticket.channel).copied() == Some(ticket.sequence)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CatalogEvent, CatalogPage, Destination, EntryId, Error};
    use rstest::rstest;
    use tokio::sync::oneshot;

    fn page(id: u64) -> CatalogPage {
        CatalogPage {
            entries: vec![Destination::new(EntryId::new(id), format!("Entry {id}"))],
            total: 1,
            skip: 0,
            limit: 20,
        }
    }

    fn search(lifecycle: Lifecycle<CatalogPage>) -> Transition {
        CatalogEvent::Search(lifecycle).into()
    }

    #[rstest]
    #[case("last-settled-wins", SettlementPolicy::LastSettledWins)]
    #[case("LATEST_ISSUED_WINS", SettlementPolicy::LatestIssuedWins)]
    fn parses_policy_names(#[case] raw: &str, #[case] expected: SettlementPolicy) {
        assert_eq!(raw.parse::<SettlementPolicy>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_policy_names() {
        let err = "newest".parse::<SettlementPolicy>().expect_err("unknown policy");
        assert!(err.to_string().contains("newest"));
    }

    #[rstest]
    #[case(OperationKind::SearchCatalog, Channel::CatalogListing)]
    #[case(OperationKind::FetchByCategory, Channel::CatalogListing)]
    #[case(OperationKind::FetchEntry, Channel::CatalogEntry)]
    #[case(OperationKind::CheckStatus, Channel::Session)]
    fn operations_share_channels_by_slice_region(
        #[case] kind: OperationKind,
        #[case] channel: Channel,
    ) {
        assert_eq!(kind.channel(), channel);
    }

    #[tokio::test]
    async fn pending_precedes_the_settlement() {
        let store = Arc::new(StateStore::default());
        let coordinator = Coordinator::new(Arc::clone(&store), SettlementPolicy::default());
        let observer = Arc::clone(&store);

        let result = coordinator
            .run(
                OperationKind::SearchCatalog,
                async move {
                    assert!(observer.select(|state| state.catalog.is_loading()));
                    Ok::<_, Error>(page(4))
                },
                search,
            )
            .await;

        assert!(result.is_ok());
        let state = store.snapshot();
        assert!(!state.catalog.is_loading());
        assert_eq!(state.catalog.items()[0].id, EntryId::new(4));
    }

    #[tokio::test]
    async fn rejection_dispatches_the_error_text() {
        let store = Arc::new(StateStore::default());
        let coordinator = Coordinator::new(Arc::clone(&store), SettlementPolicy::default());

        let result = coordinator
            .run(
                OperationKind::SearchCatalog,
                async { Err::<CatalogPage, _>(Error::service_unavailable("offline")) },
                search,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.snapshot().catalog.error(), Some("offline"));
    }

    async fn race(policy: SettlementPolicy) -> Vec<EntryId> {
        let store = Arc::new(StateStore::default());
        let coordinator = Arc::new(Coordinator::new(Arc::clone(&store), policy));
        let (first_tx, first_rx) = oneshot::channel::<CatalogPage>();
        let (second_tx, second_rx) = oneshot::channel::<CatalogPage>();

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .run(
                        OperationKind::SearchCatalog,
                        async move { first_rx.await.map_err(|_| Error::internal("dropped")) },
                        search,
                    )
                    .await
            }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move {
                coordinator
                    .run(
                        OperationKind::SearchCatalog,
                        async move { second_rx.await.map_err(|_| Error::internal("dropped")) },
                        search,
                    )
                    .await
            }
        });
        tokio::task::yield_now().await;

        second_tx.send(page(2)).expect("second receiver alive");
        second.await.expect("second task").expect("second result");
        first_tx.send(page(1)).expect("first receiver alive");
        first.await.expect("first task").expect("first result");

        assert!(!store.select(|state| state.catalog.is_loading()));
        store.select(|state| state.catalog.items().iter().map(|entry| entry.id).collect())
    }

    #[tokio::test]
    async fn last_settled_wins_by_default() {
        assert_eq!(race(SettlementPolicy::default()).await, vec![EntryId::new(1)]);
    }

    #[tokio::test]
    async fn latest_issued_wins_discards_superseded_results() {
        assert_eq!(
            race(SettlementPolicy::LatestIssuedWins).await,
            vec![EntryId::new(2)]
        );
    }
}

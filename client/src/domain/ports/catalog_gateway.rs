//! Driven port for the remote catalogue and authentication API.
//!
//! Adapters return domain types; wire payloads never cross this boundary.

use async_trait::async_trait;

use crate::domain::{
    AccessToken, AuthenticatedUser, CatalogPage, Destination, EntryId, Error, ErrorCode,
    LoginCredentials, UserProfile,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue gateway adapters.
    pub enum GatewayError {
        /// The credential endpoint rejected the username or password.
        InvalidCredentials => "invalid credentials",
        /// The bearer token was missing, expired or revoked.
        Unauthorized => "bearer token rejected",
        /// The requested resource does not exist upstream.
        NotFound { resource: String } => "{resource} not found",
        /// The upstream answered with an unexpected status.
        Status { status: u16, message: String } => "upstream returned {status}: {message}",
        /// The request could not be sent or the connection dropped.
        Transport { message: String } => "transport failure: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } => "request timed out: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "malformed response: {message}",
    }
}

impl GatewayError {
    /// Domain error carrying a user-facing `message`.
    ///
    /// The error code follows the failure kind; the technical detail stays in
    /// the trace output.
    pub fn into_domain(self, message: impl Into<String>) -> Error {
        tracing::debug!(kind = self.kind(), error = %self, "gateway call failed");
        let code = match self {
            Self::InvalidCredentials | Self::Unauthorized => ErrorCode::Unauthorized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Decode { .. } => ErrorCode::InternalError,
            Self::Status { .. } | Self::Transport { .. } | Self::Timeout { .. } => {
                ErrorCode::ServiceUnavailable
            }
        };
        Error::new(code, message)
    }
}

/// Remote source of destinations and identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Exchange credentials for a profile and bearer token.
    async fn login(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, GatewayError>;

    /// Profile belonging to `token`.
    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, GatewayError>;

    /// One page of the full catalogue.
    async fn list_entries(&self, limit: u64, skip: u64) -> Result<CatalogPage, GatewayError>;

    /// A single entry by id.
    async fn get_entry(&self, id: EntryId) -> Result<Destination, GatewayError>;

    /// Entries matching a free-text query.
    async fn search_entries(&self, query: &str) -> Result<CatalogPage, GatewayError>;

    /// Entries in one upstream category.
    async fn entries_by_category(&self, category: &str) -> Result<CatalogPage, GatewayError>;

    /// Upstream category names.
    async fn list_categories(&self) -> Result<Vec<String>, GatewayError>;
}

/// Offline gateway serving a small canned catalogue.
///
/// `emilys` / `emilyspass` authenticates; every other pair is rejected.
#[derive(Debug, Clone)]
pub struct FixtureCatalogGateway {
    entries: Vec<Destination>,
}

impl Default for FixtureCatalogGateway {
    fn default() -> Self {
        let seed = [
            (1, "Explore Paris", "City Break", "Paris, France", "beauty"),
            (2, "Discover Kyoto", "Cultural Tour", "Tokyo, Japan", "beauty"),
            (3, "Escape to Bali", "Island Getaway", "Bali, Indonesia", "fragrances"),
            (4, "Journey to Reykjavik", "Nature Escape", "Iceland", "furniture"),
            (5, "Visit Santorini", "Beach Paradise", "Santorini, Greece", "groceries"),
        ];
        let entries = seed
            .into_iter()
            .map(|(id, title, category, location, tag)| Destination {
                description: format!("{title}: an unforgettable travel experience awaits you."),
                price: id * 1_000,
                category: category.to_owned(),
                tags: vec![tag.to_owned()],
                rating: 4.5,
                location: Some(location.to_owned()),
                duration: Some(format!("{id}-{} days", id + 6)),
                ..Destination::new(EntryId::new(id), title)
            })
            .collect();
        Self { entries }
    }
}

impl FixtureCatalogGateway {
    /// Gateway serving exactly `entries`.
    pub fn with_entries(entries: Vec<Destination>) -> Self {
        Self { entries }
    }

    fn page(&self, entries: Vec<Destination>, limit: u64, skip: u64) -> CatalogPage {
        CatalogPage {
            total: entries.len() as u64,
            entries: entries
                .into_iter()
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            skip,
            limit,
        }
    }

    fn fixture_user() -> UserProfile {
        UserProfile {
            id: 1,
            email: "emily.johnson@x.dummyjson.com".to_owned(),
            first_name: "Emily".to_owned(),
            last_name: "Johnson".to_owned(),
            ..UserProfile::with_username("emilys")
        }
    }
}

const FIXTURE_TOKEN: &str = "fixture-token";

#[async_trait]
impl CatalogGateway for FixtureCatalogGateway {
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, GatewayError> {
        if credentials.username() == "emilys" && credentials.password() == "emilyspass" {
            Ok(AuthenticatedUser::new(
                Self::fixture_user(),
                AccessToken::new(FIXTURE_TOKEN),
            ))
        } else {
            Err(GatewayError::invalid_credentials())
        }
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, GatewayError> {
        if token.as_str() == FIXTURE_TOKEN {
            Ok(Self::fixture_user())
        } else {
            Err(GatewayError::unauthorized())
        }
    }

    async fn list_entries(&self, limit: u64, skip: u64) -> Result<CatalogPage, GatewayError> {
        Ok(self.page(self.entries.clone(), limit, skip))
    }

    async fn get_entry(&self, id: EntryId) -> Result<Destination, GatewayError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("destination {id}")))
    }

    async fn search_entries(&self, query: &str) -> Result<CatalogPage, GatewayError> {
        let needle = query.to_lowercase();
        let hits: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| {
                entry.title.to_lowercase().contains(&needle)
                    || entry.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        let limit = hits.len() as u64;
        Ok(self.page(hits, limit, 0))
    }

    async fn entries_by_category(&self, category: &str) -> Result<CatalogPage, GatewayError> {
        let hits: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.tags.iter().any(|tag| tag == category))
            .cloned()
            .collect();
        let limit = hits.len() as u64;
        Ok(self.page(hits, limit, 0))
    }

    async fn list_categories(&self) -> Result<Vec<String>, GatewayError> {
        let mut categories: Vec<String> = self
            .entries
            .iter()
            .flat_map(|entry| entry.tags.iter().cloned())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

//! Reqwest-backed DummyJSON gateway adapter.
//!
//! This adapter owns transport details only: URL construction, timeouts,
//! status mapping and JSON decoding into domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{CategoryDto, LoginRequestDto, LoginResponseDto, ProductDto, ProductListDto, UserDto};
use super::transform::product_to_destination;
use crate::domain::ports::{CatalogGateway, GatewayError};
use crate::domain::{
    AccessToken, AuthenticatedUser, CatalogPage, Destination, EntryId, LoginCredentials,
    UserProfile,
};

/// Public DummyJSON deployment.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";
const USER_AGENT: &str = concat!("gomate-client/", env!("CARGO_PKG_VERSION"));

/// Gateway that talks to a DummyJSON-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct DummyJsonGateway {
    client: Client,
    base_url: Url,
}

impl DummyJsonGateway {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::transport(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), bytes = body.len(), resource, "dummyjson response");
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref(), resource));
        }
        decode(body.as_ref(), resource)
    }

    async fn fetch_listing(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<CatalogPage, GatewayError> {
        let listing: ProductListDto = self.fetch(request, resource).await?;
        Ok(listing.into_domain())
    }
}

#[async_trait]
impl CatalogGateway for DummyJsonGateway {
    async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, GatewayError> {
        let url = self.endpoint(&["auth", "login"])?;
        let request = self.client.post(url).json(&LoginRequestDto {
            username: credentials.username(),
            password: credentials.password(),
        });
        let response: LoginResponseDto = match self.fetch(request, "login").await {
            Err(GatewayError::Status { status: 400 | 401, .. } | GatewayError::Unauthorized) => {
                return Err(GatewayError::invalid_credentials());
            }
            other => other?,
        };
        response.into_domain().map_err(GatewayError::decode)
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["auth", "me"])?;
        let request = self.client.get(url).bearer_auth(token.as_str());
        let user: UserDto = self.fetch(request, "current user").await?;
        Ok(user.into_domain())
    }

    async fn list_entries(&self, limit: u64, skip: u64) -> Result<CatalogPage, GatewayError> {
        let url = self.endpoint(&["products"])?;
        let request = self
            .client
            .get(url)
            .query(&[("limit", limit), ("skip", skip)]);
        self.fetch_listing(request, "destinations").await
    }

    async fn get_entry(&self, id: EntryId) -> Result<Destination, GatewayError> {
        let raw_id = id.to_string();
        let url = self.endpoint(&["products", raw_id.as_str()])?;
        let product: ProductDto = self
            .fetch(self.client.get(url), &format!("destination {id}"))
            .await?;
        Ok(product_to_destination(product))
    }

    async fn search_entries(&self, query: &str) -> Result<CatalogPage, GatewayError> {
        let url = self.endpoint(&["products", "search"])?;
        let request = self.client.get(url).query(&[("q", query)]);
        self.fetch_listing(request, "search results").await
    }

    async fn entries_by_category(&self, category: &str) -> Result<CatalogPage, GatewayError> {
        let url = self.endpoint(&["products", "category", category])?;
        self.fetch_listing(self.client.get(url), &format!("category {category}"))
            .await
    }

    async fn list_categories(&self) -> Result<Vec<String>, GatewayError> {
        let url = self.endpoint(&["products", "categories"])?;
        let categories: Vec<CategoryDto> = self.fetch(self.client.get(url), "categories").await?;
        Ok(categories.into_iter().map(CategoryDto::into_name).collect())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], resource: &str) -> Result<T, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|error| GatewayError::decode(format!("invalid {resource} payload: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(error.to_string())
    } else {
        GatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8], resource: &str) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if resource != "login" => {
            GatewayError::unauthorized()
        }
        StatusCode::NOT_FOUND => GatewayError::not_found(resource),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GatewayError::timeout(format!("status {}", status.as_u16()))
        }
        _ => GatewayError::status(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

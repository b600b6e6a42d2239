//! DTOs for decoding DummyJSON responses.
//!
//! The adapter decodes into these transport shapes first, then maps them into
//! domain types in one pass.

use serde::{Deserialize, Serialize};

use super::transform::product_to_destination;
use crate::domain::{AccessToken, AuthenticatedUser, CatalogPage, UserProfile};

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    #[serde(default)]
    pub(super) id: u64,
    pub(super) username: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) first_name: String,
    #[serde(default)]
    pub(super) last_name: String,
    pub(super) image: Option<String>,
}

impl UserDto {
    pub(super) fn into_domain(self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            image: self.image.filter(|image| !image.is_empty()),
        }
    }
}

/// Login payload: the profile fields plus a token under either spelling.
#[derive(Debug, Deserialize)]
pub(super) struct LoginResponseDto {
    #[serde(flatten)]
    pub(super) user: UserDto,
    #[serde(rename = "accessToken", alias = "token")]
    pub(super) access_token: String,
}

impl LoginResponseDto {
    pub(super) fn into_domain(self) -> Result<AuthenticatedUser, String> {
        if self.access_token.is_empty() {
            return Err("login response carried an empty token".to_owned());
        }
        Ok(AuthenticatedUser::new(
            self.user.into_domain(),
            AccessToken::new(self.access_token),
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ProductDto {
    pub(super) id: u64,
    #[serde(default)]
    pub(super) title: String,
    #[serde(default)]
    pub(super) description: String,
    #[serde(default)]
    pub(super) price: f64,
    pub(super) rating: Option<f64>,
    #[serde(default)]
    pub(super) tags: Vec<String>,
    #[serde(default)]
    pub(super) thumbnail: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductListDto {
    #[serde(default)]
    pub(super) products: Vec<ProductDto>,
    #[serde(default)]
    pub(super) total: u64,
    #[serde(default)]
    pub(super) skip: u64,
    #[serde(default)]
    pub(super) limit: u64,
}

impl ProductListDto {
    pub(super) fn into_domain(self) -> CatalogPage {
        CatalogPage {
            entries: self
                .products
                .into_iter()
                .map(product_to_destination)
                .collect(),
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Category listing entry. Older deployments return bare names, newer ones
/// return objects keyed by slug.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum CategoryDto {
    Name(String),
    Detailed { slug: String },
}

impl CategoryDto {
    pub(super) fn into_name(self) -> String {
        match self {
            Self::Name(name) => name,
            Self::Detailed { slug } => slug,
        }
    }
}

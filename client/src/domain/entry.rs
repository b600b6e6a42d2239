//! Browsable catalogue entries.
//!
//! An entry is an immutable value object: the store replaces entries wholesale
//! and never edits one in place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable entry identifier.
///
/// Serialises as a bare JSON number so persisted favourites read as
/// `[{"id":5,...}]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A travel destination shown in the catalogue.
///
/// `location` and `duration` are presentation extensions; stored favourites
/// written before they existed deserialise with both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Identifier used for favourites uniqueness.
    pub id: EntryId,
    /// Travel-themed title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Hero image URL.
    pub image: String,
    /// Price in whole currency units.
    pub price: u64,
    /// Travel category label.
    pub category: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Average rating out of five.
    pub rating: f64,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Human-readable location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Suggested trip length, for example `"3-9 days"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Destination {
    /// Build a destination with the given identity and empty presentation
    /// fields.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{Destination, EntryId};
    ///
    /// let entry = Destination::new(EntryId::new(5), "Explore Lisbon");
    /// assert_eq!(entry.id, EntryId::new(5));
    /// assert!(entry.tags.is_empty());
    /// ```
    pub fn new(id: EntryId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            image: String::new(),
            price: 0,
            category: String::new(),
            tags: Vec::new(),
            rating: 0.0,
            thumbnail: String::new(),
            location: None,
            duration: None,
        }
    }
}

/// One page of catalogue results together with paging metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogPage {
    /// Entries in server order.
    pub entries: Vec<Destination>,
    /// Total number of entries matching the request.
    pub total: u64,
    /// Offset of the first entry.
    pub skip: u64,
    /// Page size requested from the server.
    pub limit: u64,
}

impl CatalogPage {
    /// Paging metadata without the entries.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Paging metadata retained by the catalogue slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Total number of entries matching the last request.
    pub total: u64,
    /// Offset of the first entry.
    pub skip: u64,
    /// Page size.
    pub limit: u64,
}

impl PageInfo {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        self.skip.saturating_add(self.limit) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn entry_id_serialises_as_a_bare_number() {
        let entry = Destination::new(EntryId::new(5), "Explore Lisbon");
        let value = serde_json::to_value(&entry).expect("serialise entry");
        assert_eq!(value.get("id"), Some(&json!(5)));
        assert!(value.get("location").is_none(), "absent extensions are omitted");
    }

    #[rstest]
    fn entries_without_extensions_still_decode() {
        let raw = r#"{"id":7,"title":"Visit Rome","description":"","image":"","price":10,
            "category":"City Break","rating":4.2,"thumbnail":""}"#;
        let entry: Destination = serde_json::from_str(raw).expect("decode entry");
        assert_eq!(entry.id.get(), 7);
        assert!(entry.tags.is_empty());
        assert!(entry.duration.is_none());
    }

    #[rstest]
    #[case(PageInfo { total: 100, skip: 0, limit: 20 }, true)]
    #[case(PageInfo { total: 100, skip: 80, limit: 20 }, false)]
    #[case(PageInfo { total: 0, skip: 0, limit: 20 }, false)]
    fn has_more_compares_the_window_with_the_total(#[case] info: PageInfo, #[case] expected: bool) {
        assert_eq!(info.has_more(), expected);
    }
}

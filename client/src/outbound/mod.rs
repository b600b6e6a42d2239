//! Outbound adapters implementing domain ports.
//!
//! - **dummyjson**: reqwest-backed [`crate::domain::ports::CatalogGateway`]
//! - **storage**: cap-std backed [`crate::domain::ports::KeyValueStore`]
//!
//! Adapters translate between domain types and wire or file formats. They
//! contain no state-management logic.

pub mod dummyjson;
pub mod storage;

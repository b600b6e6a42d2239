//! DummyJSON outbound adapter.
//!
//! Products served by the mock API are presented as travel destinations.

mod dto;
mod http_gateway;
mod transform;

pub use http_gateway::{DEFAULT_BASE_URL, DummyJsonGateway};

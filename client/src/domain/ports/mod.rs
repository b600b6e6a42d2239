//! Domain ports: the traits adapters implement to reach the outside world.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_gateway;
mod key_value_store;

#[cfg(test)]
pub use catalog_gateway::MockCatalogGateway;
pub use catalog_gateway::{CatalogGateway, FixtureCatalogGateway, GatewayError};
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore, StorageError, StorageKey};

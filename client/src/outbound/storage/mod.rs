//! On-device storage adapters.

mod atomic_write;
mod file_store;

pub use file_store::{FileKeyValueStore, STORE_FILE_NAME};

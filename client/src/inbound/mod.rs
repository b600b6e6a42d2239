//! Inbound adapters that drive the client.

pub mod cli;

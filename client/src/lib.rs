//! GoMate client core.
//!
//! The crate is organised as a small hexagon:
//!
//! - [`domain`]: state slices, the observable [`domain::StateStore`], the
//!   async operation coordinator, and the use-case services that drive them.
//! - [`outbound`]: adapters for the DummyJSON HTTP API and on-device storage.
//! - [`inbound`]: the command-line presentation surface.
//!
//! [`config`] holds the settings consumed by the composition root in
//! `main.rs`.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

//! Client domain: state slices, the observable store, the operation
//! coordinator, and the services that drive them through ports.
//!
//! Nothing in this module performs I/O directly. Remote calls go through
//! [`ports::CatalogGateway`] and durable state through
//! [`ports::KeyValueStore`].

pub mod app;
pub mod auth;
pub mod catalog;
pub mod catalog_service;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod favourites;
pub mod favourites_sync;
pub mod lifecycle;
pub mod ports;
pub mod session;
pub mod session_service;
pub mod store;
pub mod theme;
pub mod user;

pub use self::app::{ErrorSlice, GoMateApp, LaunchReport};
pub use self::auth::{LoginCredentials, LoginValidationError, PASSWORD_MIN, validate_login_form};
pub use self::catalog::{CatalogEvent, CatalogSlice};
pub use self::catalog_service::{CatalogService, DEFAULT_PAGE_LIMIT};
pub use self::coordinator::{
    Channel, Coordinator, OperationKind, RequestTicket, SettlementPolicy, UnknownSettlementPolicy,
};
pub use self::entry::{CatalogPage, Destination, EntryId, PageInfo};
pub use self::error::{Error, ErrorCode};
pub use self::favourites::{FavouritesEvent, FavouritesSlice};
pub use self::favourites_sync::{FavouritesLoad, FavouritesSync, PersistOutcome};
pub use self::lifecycle::Lifecycle;
pub use self::session::{Session, SessionEvent, SessionPhase};
pub use self::session_service::SessionService;
pub use self::store::{AppState, Listener, StateStore, SubscriptionId, Transition};
pub use self::theme::{Palette, ThemeMode, ThemeService, UnknownTheme};
pub use self::user::{AccessToken, AuthenticatedUser, UserProfile};

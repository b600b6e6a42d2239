//! Session slice and its lifecycle.
//!
//! The authenticated identity is stored as a single optional pair, so the
//! slice cannot represent "authenticated without a user" or "authenticated
//! without a token".

use super::lifecycle::Lifecycle;
use super::user::{AccessToken, AuthenticatedUser, UserProfile};

/// Coarse session phase derived from the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No identity and no authentication request outstanding.
    Anonymous,
    /// A login or status check is outstanding.
    Authenticating,
    /// An identity is present.
    Authenticated,
}

/// Events accepted by the session slice.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Credential login lifecycle.
    Login(Lifecycle<AuthenticatedUser>),
    /// Launch-time rehydration from persisted credentials.
    CheckStatus(Lifecycle<AuthenticatedUser>),
    /// Profile refresh for the current token.
    RefreshProfile(Lifecycle<UserProfile>),
    /// The server rejected the token: drop the identity and surface why.
    Expired(String),
    /// Drop the identity and any error.
    Logout,
    /// Clear the surfaced error.
    ClearError,
}

/// Authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    identity: Option<AuthenticatedUser>,
    loading: bool,
    error: Option<String>,
}

impl Session {
    /// Authenticated profile, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        self.identity.as_ref().map(|identity| &identity.user)
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<&AccessToken> {
        self.identity.as_ref().map(|identity| &identity.token)
    }

    /// True exactly when both a user and a token are present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether an authentication request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last surfaced error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Phase of the session state machine.
    pub fn phase(&self) -> SessionPhase {
        match (self.is_authenticated(), self.loading) {
            (true, _) => SessionPhase::Authenticated,
            (false, true) => SessionPhase::Authenticating,
            (false, false) => SessionPhase::Anonymous,
        }
    }

    /// Apply one event. Total over every event and state.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Login(Lifecycle::Pending) => {
                self.loading = true;
                self.error = None;
            }
            SessionEvent::Login(Lifecycle::Fulfilled(identity))
            | SessionEvent::CheckStatus(Lifecycle::Fulfilled(identity)) => {
                self.loading = false;
                self.error = None;
                self.identity = Some(identity);
            }
            SessionEvent::Login(Lifecycle::Rejected(message)) => {
                self.loading = false;
                self.identity = None;
                self.error = Some(message);
            }
            SessionEvent::CheckStatus(Lifecycle::Pending) => {
                self.loading = true;
            }
            // A failed status check is silent: no error reaches the user.
            SessionEvent::CheckStatus(Lifecycle::Rejected(_)) => {
                self.loading = false;
                self.identity = None;
            }
            SessionEvent::RefreshProfile(Lifecycle::Pending) => {
                self.loading = true;
                self.error = None;
            }
            SessionEvent::RefreshProfile(Lifecycle::Fulfilled(user)) => {
                self.loading = false;
                if let Some(identity) = self.identity.as_mut() {
                    identity.user = user;
                }
            }
            SessionEvent::RefreshProfile(Lifecycle::Rejected(message)) => {
                self.loading = false;
                self.error = Some(message);
            }
            SessionEvent::Expired(message) => {
                self.loading = false;
                self.identity = None;
                self.error = Some(message);
            }
            SessionEvent::Logout => *self = Self::default(),
            SessionEvent::ClearError => self.error = None,
        }
    }
}

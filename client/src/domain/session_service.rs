//! Session operations: login, launch-time rehydration, refresh and logout.
//!
//! These are the only paths that write the `token` and `user` keys.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{CatalogGateway, GatewayError, KeyValueStore, StorageError, StorageKey};
use crate::domain::{
    AccessToken, AuthenticatedUser, Coordinator, Error, ErrorCode, LoginCredentials,
    OperationKind, SessionEvent, UserProfile,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const NO_STORED_SESSION: &str = "No token or user data";
const PROFILE_UNAVAILABLE: &str = "Failed to get user";
const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// Drives the session slice.
pub struct SessionService<G: ?Sized, S: ?Sized> {
    coordinator: Arc<Coordinator>,
    gateway: Arc<G>,
    storage: Arc<S>,
}

impl<G: ?Sized, S: ?Sized> SessionService<G, S> {
    /// Create a service dispatching through `coordinator`.
    pub fn new(coordinator: Arc<Coordinator>, gateway: Arc<G>, storage: Arc<S>) -> Self {
        Self {
            coordinator,
            gateway,
            storage,
        }
    }
}

impl<G, S> SessionService<G, S>
where
    G: CatalogGateway + ?Sized,
    S: KeyValueStore + ?Sized,
{
    /// Authenticate and persist the resulting identity.
    ///
    /// Blank input is rejected before the gateway is contacted.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthenticatedUser, Error> {
        self.coordinator
            .run(
                OperationKind::Login,
                self.authenticate(username, password),
                |lifecycle| SessionEvent::Login(lifecycle).into(),
            )
            .await
    }

    /// Restore the session from persisted credentials without contacting
    /// the gateway. Failure leaves the session anonymous and surfaces no
    /// error in the slice.
    pub async fn check_status(&self) -> Result<AuthenticatedUser, Error> {
        self.coordinator
            .run(OperationKind::CheckStatus, self.restore(), |lifecycle| {
                SessionEvent::CheckStatus(lifecycle).into()
            })
            .await
    }

    /// Re-read the profile for the current token and persist it.
    ///
    /// A token the server no longer accepts ends the session: the identity is
    /// dropped and the persisted credentials are removed.
    pub async fn refresh_profile(&self) -> Result<UserProfile, Error> {
        let token = self
            .coordinator
            .store()
            .select(|state| state.session.token().cloned())
            .ok_or_else(|| Error::unauthorized("Not logged in"))?;
        let result = self
            .coordinator
            .run(
                OperationKind::RefreshProfile,
                self.fetch_profile(token),
                |lifecycle| SessionEvent::RefreshProfile(lifecycle).into(),
            )
            .await;
        match &result {
            Err(err) if err.code() == ErrorCode::Unauthorized => {
                self.expire(err.message()).await;
            }
            _ => {}
        }
        result
    }

    /// Clear the session, then remove persisted credentials.
    ///
    /// The slice is cleared even when storage fails; the failure is returned.
    pub async fn logout(&self) -> Result<(), StorageError> {
        self.coordinator.store().dispatch(SessionEvent::Logout);
        info!("session cleared");
        let token = self.storage.remove_item(StorageKey::Token).await;
        let user = self.storage.remove_item(StorageKey::User).await;
        token.and(user).inspect_err(|error| {
            warn!(%error, "failed to remove persisted credentials");
        })
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, Error> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let identity = self
            .gateway
            .login(&credentials)
            .await
            .map_err(map_login_error)?;
        self.persist_identity(&identity).await?;
        info!(username = %identity.user.username, "login succeeded");
        Ok(identity)
    }

    async fn restore(&self) -> Result<AuthenticatedUser, Error> {
        let token = self
            .storage
            .get_item(StorageKey::Token)
            .await
            .map_err(map_storage_error)?;
        let user = self
            .storage
            .get_item(StorageKey::User)
            .await
            .map_err(map_storage_error)?;
        let (Some(token), Some(user)) = (token.filter(|t| !t.is_empty()), user) else {
            return Err(Error::unauthorized(NO_STORED_SESSION));
        };
        let profile: UserProfile = serde_json::from_str(&user)
            .map_err(|err| Error::internal(format!("stored user is malformed: {err}")))?;
        Ok(AuthenticatedUser::new(profile, AccessToken::new(token)))
    }

    async fn fetch_profile(&self, token: AccessToken) -> Result<UserProfile, Error> {
        let profile = self.gateway.current_user(&token).await.map_err(|err| {
            let message = if err.is_unauthorized() {
                SESSION_EXPIRED
            } else {
                PROFILE_UNAVAILABLE
            };
            err.into_domain(message)
        })?;
        if let Err(error) = self.write_profile(&profile).await {
            warn!(%error, "refreshed profile was not persisted");
        }
        Ok(profile)
    }

    /// Write the token and profile as a pair. When either write fails both
    /// keys are removed, so a rejected login never leaves a token next to
    /// another user's profile.
    async fn persist_identity(&self, identity: &AuthenticatedUser) -> Result<(), Error> {
        let written = match self
            .storage
            .set_item(StorageKey::Token, Some(identity.token.as_str().to_owned()))
            .await
        {
            Ok(()) => self.write_profile(&identity.user).await,
            Err(error) => Err(error),
        };
        if let Err(error) = written {
            self.discard_credentials().await;
            return Err(map_storage_error(error));
        }
        Ok(())
    }

    async fn expire(&self, message: &str) {
        self.coordinator
            .store()
            .dispatch(SessionEvent::Expired(message.to_owned()));
        info!("session expired");
        self.discard_credentials().await;
    }

    /// Best-effort removal of both credential keys.
    async fn discard_credentials(&self) {
        for key in [StorageKey::Token, StorageKey::User] {
            if let Err(error) = self.storage.remove_item(key).await {
                warn!(%key, kind = error.kind(), %error, "failed to discard credential");
            }
        }
    }

    async fn write_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(profile)
            .map_err(|err| StorageError::write(StorageKey::User.as_str(), err.to_string()))?;
        self.storage.set_item(StorageKey::User, Some(encoded)).await
    }
}

fn map_login_error(error: GatewayError) -> Error {
    let message = if error.is_transport() || error.is_timeout() {
        "Unable to reach the server. Please check your connection."
    } else {
        INVALID_CREDENTIALS
    };
    error.into_domain(message)
}

fn map_storage_error(error: StorageError) -> Error {
    warn!(kind = error.kind(), %error, "session storage failed");
    Error::service_unavailable(error.to_string())
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;

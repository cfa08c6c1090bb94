//! # Session Gate
//!
//! Owns the login state. Everything else asks the gate for the current
//! token or subscribes to its changes.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌────────────┐   login() ok    ┌────────────────┐                    │
//! │   │ Anonymous  │────────────────►│ Authenticated  │                    │
//! │   │ token=None │◄────────────────│ token=Some     │                    │
//! │   └────────────┘   logout()      └───────┬────────┘                    │
//! │         ▲          profile fetch fails   │                             │
//! │         └────────────────────────────────┘                             │
//! │                                                                         │
//! │   Watch channels: token, profile, form status                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The token is persisted before it is published, and cleared from the store
//! before `None` is published.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::StorefrontApi;
use crate::error::{ClientError, ClientResult};
use storefront_core::validation::{validate_credentials, validate_profile_update};
use storefront_core::{AuthStatus, AuthToken, Credentials, Profile, ProfileUpdate};
use storefront_db::PreferencesRepository;

pub struct SessionGate {
    api: Arc<dyn StorefrontApi>,
    store: PreferencesRepository,
    token_tx: watch::Sender<Option<AuthToken>>,
    profile_tx: watch::Sender<Option<Profile>>,
    status_tx: watch::Sender<AuthStatus>,
}

impl SessionGate {
    /// Restores the persisted token, if any.
    pub async fn load(
        api: Arc<dyn StorefrontApi>,
        store: PreferencesRepository,
    ) -> ClientResult<Self> {
        let token = store.auth_token().await?;
        debug!(authenticated = token.is_some(), "Session restored");

        let (token_tx, _) = watch::channel(token);
        let (profile_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(AuthStatus::Idle);

        Ok(SessionGate {
            api,
            store,
            token_tx,
            profile_tx,
            status_tx,
        })
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.token_tx.borrow().is_some()
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token_tx.borrow().clone()
    }

    /// Fires on every login, logout and forced logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthToken>> {
        self.token_tx.subscribe()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.profile_tx.borrow().clone()
    }

    pub fn subscribe_profile(&self) -> watch::Receiver<Option<Profile>> {
        self.profile_tx.subscribe()
    }

    pub fn status(&self) -> AuthStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<AuthStatus> {
        self.status_tx.subscribe()
    }

    // =========================================================================
    // Login / Register / Logout
    // =========================================================================

    pub async fn login(&self, credentials: Credentials) -> ClientResult<()> {
        if let Err(e) = validate_credentials(&credentials) {
            self.status_tx.send_replace(AuthStatus::Error(e.to_string()));
            return Err(e.into());
        }

        self.status_tx.send_replace(AuthStatus::Loading);

        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.status_tx.send_replace(AuthStatus::Error(e.to_string()));
                return Err(e);
            }
        };

        let token = response.clone().into_token();
        if let Err(e) = self.store.save_auth_token(&token).await {
            error!(error = %e, "Failed to persist session token");
            self.status_tx.send_replace(AuthStatus::Error(e.to_string()));
            return Err(e.into());
        }

        self.token_tx.send_replace(Some(token));
        self.status_tx.send_replace(AuthStatus::Success(Some(response)));
        info!("Logged in");
        Ok(())
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, credentials: Credentials) -> ClientResult<()> {
        if let Err(e) = validate_credentials(&credentials) {
            self.status_tx.send_replace(AuthStatus::Error(e.to_string()));
            return Err(e.into());
        }

        self.status_tx.send_replace(AuthStatus::Loading);

        match self.api.register(&credentials).await {
            Ok(()) => {
                info!("Account registered");
                self.status_tx.send_replace(AuthStatus::Success(None));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.status_tx.send_replace(AuthStatus::Error(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.store.clear_auth_token().await?;
        self.token_tx.send_replace(None);
        self.profile_tx.send_replace(None);
        info!("Logged out");
        Ok(())
    }

    /// Back to `Idle` once the form has shown the outcome.
    pub fn reset_status(&self) {
        self.status_tx.send_replace(AuthStatus::Idle);
    }

    /// Drops the session even if the store cannot be written.
    async fn force_logout(&self) {
        if let Err(e) = self.store.clear_auth_token().await {
            error!(error = %e, "Failed to clear stored token during forced logout");
        }
        self.token_tx.send_replace(None);
        self.profile_tx.send_replace(None);
        warn!("Session ended by forced logout");
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetches the profile when logged in, clears it otherwise.
    ///
    /// A failed fetch means the token is no longer usable and ends the
    /// session.
    pub async fn refresh_profile(&self) {
        let Some(token) = self.token() else {
            self.profile_tx.send_replace(None);
            return;
        };

        match self.api.profile(&token).await {
            Ok(profile) => {
                debug!(user_id = profile.id, "Profile loaded");
                self.profile_tx.send_replace(Some(profile));
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed");
                self.force_logout().await;
            }
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<Profile> {
        let Some(token) = self.token() else {
            self.force_logout().await;
            return Err(ClientError::NotAuthenticated);
        };

        validate_profile_update(&update)?;

        match self.api.update_profile(&token, &update).await {
            Ok(profile) => {
                info!(user_id = profile.id, "Profile updated");
                self.profile_tx.send_replace(Some(profile.clone()));
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                Err(e)
            }
        }
    }

    /// Runs [`refresh_profile`](Self::refresh_profile) now and on every
    /// session change. Ends when the gate is dropped.
    pub fn spawn_profile_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let gate = Arc::downgrade(self);
        let rx = self.subscribe();
        tokio::spawn(listen(gate, rx))
    }
}

async fn listen(gate: Weak<SessionGate>, mut rx: watch::Receiver<Option<AuthToken>>) {
    loop {
        drop(rx.borrow_and_update());
        match gate.upgrade() {
            Some(gate) => gate.refresh_profile().await,
            None => break,
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
    debug!("Profile listener stopped");
}

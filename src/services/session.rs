// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session synchronizer.
//!
//! Turns an external principal into the local `ApplicationUser` by fetching
//! the backend profile with a freshly minted bearer token.
//!
//! Outcomes:
//! - success: backend-enriched user, persisted with its token
//! - 403: full sign-out, storage cleared
//! - anything else (including exhausted 429 retries): stub user built from
//!   the principal alone, session still authenticated
//!
//! Calls arriving within the throttle window of the last executed sync are
//! dropped, not queued.

use crate::config::Config;
use crate::error::{AppError, FailureKind};
use crate::models::{ApplicationUser, Principal, ProfileRecord};
use crate::services::identity::IdentityProvider;
use crate::services::retry::{self, RetryPolicy};
use crate::services::throttle::Throttle;
use crate::storage::{keys, DurableStore};
use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Backend capability consumed by the synchronizer: `GET /users/{id}`.
pub trait ProfileStore: Send + Sync {
    fn fetch_profile<'a>(
        &'a self,
        user_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<ProfileRecord, AppError>>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    fn fetch_profile<'a>(
        &'a self,
        user_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<ProfileRecord, AppError>> {
        (**self).fetch_profile(user_id, token)
    }
}

/// Published session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    Syncing,
    Authenticated {
        user: ApplicationUser,
        /// True when `user` is a stub built without the backend profile.
        degraded: bool,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Result of a single `sync` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Throttled; nothing happened.
    Dropped,
    SignedOut,
    Authenticated(ApplicationUser),
    /// Stub user after a non-fatal backend failure.
    Degraded(ApplicationUser),
}

impl SyncOutcome {
    pub fn user(&self) -> Option<&ApplicationUser> {
        match self {
            SyncOutcome::Authenticated(user) | SyncOutcome::Degraded(user) => Some(user),
            SyncOutcome::Dropped | SyncOutcome::SignedOut => None,
        }
    }

    pub fn into_user(self) -> Option<ApplicationUser> {
        match self {
            SyncOutcome::Authenticated(user) | SyncOutcome::Degraded(user) => Some(user),
            SyncOutcome::Dropped | SyncOutcome::SignedOut => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, SyncOutcome::Dropped)
    }
}

/// Keeps the current `ApplicationUser` in step with the identity provider.
pub struct SessionSync<P, S> {
    profiles: P,
    storage: Arc<S>,
    retry: RetryPolicy,
    throttle: Throttle,
    /// Authoritative copy during a session; storage mirrors it.
    current: RwLock<Option<ApplicationUser>>,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
    identity: Option<IdentityProvider>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<P: ProfileStore, S: DurableStore> SessionSync<P, S> {
    /// Create an isolated synchronizer, restoring any persisted user.
    pub fn init(config: &Config, profiles: P, storage: Arc<S>) -> Self {
        let restored = storage
            .get_json::<ApplicationUser>(keys::USER)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable persisted user");
                None
            });
        let token = storage.get(keys::TOKEN).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable persisted token");
            None
        });

        let initial = match &restored {
            Some(user) => {
                tracing::info!(user = %user.id, "Restored persisted session");
                SessionState::Authenticated {
                    user: user.clone(),
                    degraded: false,
                }
            }
            None => SessionState::SignedOut,
        };
        let (state, _rx) = watch::channel(initial);

        Self {
            profiles,
            storage,
            retry: RetryPolicy::from_config(config),
            throttle: Throttle::new(config.sync_throttle),
            current: RwLock::new(restored),
            token: RwLock::new(token),
            state,
            identity: None,
            watcher: Mutex::new(None),
        }
    }

    /// Attach the identity provider signed out on forbidden and on logout.
    pub fn with_identity(mut self, identity: IdentityProvider) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Reconcile local session state with `principal`.
    pub async fn sync(&self, principal: Option<Principal>) -> SyncOutcome {
        let Some(principal) = principal else {
            self.clear_local().await;
            return SyncOutcome::SignedOut;
        };

        if !self.throttle.try_acquire() {
            tracing::debug!(principal = %principal.id, "Sync dropped by throttle");
            return SyncOutcome::Dropped;
        }

        tracing::info!(principal = %principal.id, "Syncing session");
        self.state.send_replace(SessionState::Syncing);

        let token = match principal.mint_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    principal = %principal.id,
                    error = %e,
                    "Token minting failed, falling back to stub user"
                );
                return self.degrade(&principal, None).await;
            }
        };

        let result = retry::with_backoff(self.retry, "profile fetch", || {
            self.profiles.fetch_profile(&principal.id, &token)
        })
        .await;

        match result {
            Ok(profile) => {
                let user = ApplicationUser::from_profile(&principal, profile);
                self.establish(user.clone(), Some(token), false).await;
                tracing::info!(
                    user = %user.id,
                    interests = user.interests.len(),
                    is_admin = user.is_admin,
                    "Session synced"
                );
                SyncOutcome::Authenticated(user)
            }
            Err(e) if e.kind() == FailureKind::Forbidden => {
                tracing::warn!(principal = %principal.id, "Profile fetch forbidden, signing out");
                self.sign_out().await;
                SyncOutcome::SignedOut
            }
            Err(e) => {
                tracing::warn!(
                    principal = %principal.id,
                    error = %e,
                    "Profile fetch failed, falling back to stub user"
                );
                self.degrade(&principal, Some(token)).await
            }
        }
    }

    /// Explicit sign-out: clear local state and the identity provider.
    pub async fn logout(&self) {
        self.sign_out().await;
    }

    pub async fn current_user(&self) -> Option<ApplicationUser> {
        self.current.read().await.clone()
    }

    pub async fn current_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Stop the identity watcher, if any. Persisted state is kept.
    pub fn teardown(&self) {
        let handle = self
            .watcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("Session watcher stopped");
        }
    }

    async fn degrade(&self, principal: &Principal, token: Option<String>) -> SyncOutcome {
        let user = ApplicationUser::stub(principal);
        self.establish(user.clone(), token, true).await;
        SyncOutcome::Degraded(user)
    }

    async fn establish(&self, user: ApplicationUser, token: Option<String>, degraded: bool) {
        *self.current.write().await = Some(user.clone());
        *self.token.write().await = token.clone();

        if let Err(e) = self.storage.set_json(keys::USER, &user) {
            tracing::warn!(error = %e, "Failed to persist user");
        }
        let token_write = match &token {
            Some(token) => self.storage.set(keys::TOKEN, token),
            None => self.storage.remove(keys::TOKEN),
        };
        if let Err(e) = token_write {
            tracing::warn!(error = %e, "Failed to persist token");
        }

        self.state
            .send_replace(SessionState::Authenticated { user, degraded });
    }

    async fn sign_out(&self) {
        self.clear_local().await;
        if let Some(identity) = &self.identity {
            identity.sign_out();
        }
    }

    async fn clear_local(&self) {
        let previous = self.current.write().await.take();
        self.token.write().await.take();

        for key in [keys::USER, keys::TOKEN] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear storage");
            }
        }

        self.state.send_replace(SessionState::SignedOut);
        tracing::info!(
            user = previous.as_ref().map(|u| u.id.as_str()).unwrap_or("<none>"),
            "Session cleared"
        );
    }
}

impl<P, S> SessionSync<P, S>
where
    P: ProfileStore + 'static,
    S: DurableStore + 'static,
{
    /// Sync on every principal change pushed by the attached identity provider.
    ///
    /// A principal already present is synced immediately; an initial
    /// signed-out value is not, so a restored session survives startup.
    pub fn watch(self: &Arc<Self>) -> Result<(), AppError> {
        let provider = self
            .identity
            .as_ref()
            .ok_or_else(|| AppError::Identity("no identity provider attached".to_string()))?;

        let mut rx = provider.subscribe();
        let this = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let initial = rx.borrow_and_update().clone();
            if initial.is_some() {
                this.sync(initial).await;
            }

            while rx.changed().await.is_ok() {
                let principal = rx.borrow_and_update().clone();
                this.sync(principal).await;
            }
        });

        let previous = self
            .watcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        tracing::debug!("Session watcher started");
        Ok(())
    }
}

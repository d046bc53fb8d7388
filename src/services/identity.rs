// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider handle.
//!
//! Holds the current principal and pushes every change to subscribers.
//! The login flow itself (OAuth popup, password, ...) lives outside this
//! crate and reports its result through `sign_in`.

use crate::models::Principal;
use std::sync::Arc;
use tokio::sync::watch;

/// Cheaply cloneable handle to the current external identity.
#[derive(Clone)]
pub struct IdentityProvider {
    tx: Arc<watch::Sender<Option<Principal>>>,
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current principal and notify subscribers.
    pub fn sign_in(&self, principal: Principal) {
        tracing::info!(principal = %principal.id, "Identity provider signed in");
        self.tx.send_replace(Some(principal));
    }

    /// Drop the current principal and notify subscribers.
    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            tracing::info!("Identity provider signed out");
        }
    }

    pub fn current(&self) -> Option<Principal> {
        self.tx.borrow().clone()
    }

    /// Receive principal changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaticToken;

    #[tokio::test]
    async fn subscribers_see_changes() {
        let provider = IdentityProvider::new();
        let mut rx = provider.subscribe();

        provider.sign_in(Principal::new("u1", Arc::new(StaticToken("t".to_string()))));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().map(|p| p.id.clone()), Some("u1".to_string()));

        provider.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
        assert!(provider.current().is_none());
    }
}

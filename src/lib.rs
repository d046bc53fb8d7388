// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hidden Spots: client services for the hidden-spots travel locator
//!
//! This crate keeps the signed-in application user in step with the
//! identity provider and caches the shared spot collection, both backed by
//! the REST API and mirrored to durable local storage.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use error::AppError;
use services::{ApiClient, IdentityProvider, SessionSync, SpotStore};
use std::sync::Arc;
use storage::FileStore;

/// Explicitly constructed client services.
pub struct AppState {
    pub config: Config,
    pub identity: IdentityProvider,
    pub session: Arc<SessionSync<ApiClient, FileStore>>,
    pub spots: SpotStore<FileStore>,
}

impl AppState {
    /// Build the services, restore persisted state and start watching the
    /// identity provider. Must be called inside a tokio runtime.
    pub async fn init(config: Config) -> Result<Self, AppError> {
        let storage = Arc::new(FileStore::open(&config.storage_path)?);
        tracing::info!(path = %storage.path().display(), "Durable storage ready");
        let api = ApiClient::new(&config)?;
        let identity = IdentityProvider::new();

        let session = Arc::new(
            SessionSync::init(&config, api.clone(), storage.clone()).with_identity(identity.clone()),
        );
        session.watch()?;

        let spots = SpotStore::new(&config, api, storage);
        match spots.restore().await {
            Ok(count) => tracing::debug!(count, "Spot cache warmed from storage"),
            Err(e) => tracing::warn!(error = %e, "Ignoring unreadable persisted spots"),
        }

        Ok(Self {
            config,
            identity,
            session,
            spots,
        })
    }

    /// Stop background work. Persisted state is left for the next start.
    pub fn teardown(&self) {
        self.session.teardown();
    }
}

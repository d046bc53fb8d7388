// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spot collection cache.
//!
//! The collection is held in memory, mirrored to durable storage, and
//! refreshed from `GET /spots`. Refreshes share the session throttle
//! semantics: a refresh inside the window serves the cache instead of
//! hitting the backend.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewSpot, Spot, SpotUpdate};
use crate::services::api::ApiClient;
use crate::services::retry::{with_backoff, RetryPolicy};
use crate::services::throttle::Throttle;
use crate::storage::{keys, DurableStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

/// Loading/error bookkeeping for the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpotsStatus {
    pub loading: bool,
    /// Message of the last failed refresh, cleared by the next success.
    pub error: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub count: usize,
}

/// Cached spot collection backed by the REST API.
pub struct SpotStore<S> {
    api: ApiClient,
    storage: Arc<S>,
    retry: RetryPolicy,
    throttle: Throttle,
    cache: DashMap<String, Spot>,
    status: RwLock<SpotsStatus>,
}

impl<S: DurableStore> SpotStore<S> {
    pub fn new(config: &Config, api: ApiClient, storage: Arc<S>) -> Self {
        Self {
            api,
            storage,
            retry: RetryPolicy::from_config(config),
            throttle: Throttle::new(config.sync_throttle),
            cache: DashMap::new(),
            status: RwLock::new(SpotsStatus::default()),
        }
    }

    /// Load the persisted collection into memory. Returns the number loaded.
    pub async fn restore(&self) -> Result<usize, AppError> {
        let spots: Vec<Spot> = self.storage.get_json(keys::SPOTS)?.unwrap_or_default();
        let count = spots.len();

        self.replace_cache(spots);
        self.status.write().await.count = count;

        tracing::debug!(count, "Restored spot collection");
        Ok(count)
    }

    /// Re-fetch the collection from the backend.
    pub async fn refresh(&self) -> Result<Vec<Spot>, AppError> {
        if !self.throttle.try_acquire() {
            tracing::debug!("Spot refresh throttled, serving cache");
            return Ok(self.spots());
        }

        {
            let mut status = self.status.write().await;
            status.loading = true;
            status.error = None;
        }

        let result = with_backoff(self.retry, "list spots", || self.api.list_spots()).await;

        let mut status = self.status.write().await;
        status.loading = false;

        match result {
            Ok(spots) => {
                self.replace_cache(spots);
                self.persist();
                status.last_fetched = Some(Utc::now());
                status.count = self.cache.len();
                tracing::info!(count = status.count, "Spot collection refreshed");
                Ok(self.spots())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Spot refresh failed, keeping cached collection");
                status.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// All cached spots, ordered by name.
    pub fn spots(&self) -> Vec<Spot> {
        let mut spots: Vec<Spot> = self.cache.iter().map(|e| e.value().clone()).collect();
        spots.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        spots
    }

    /// Get a spot, from the cache when present.
    pub async fn get(&self, spot_id: &str) -> Result<Spot, AppError> {
        if let Some(spot) = self.cache.get(spot_id) {
            return Ok(spot.clone());
        }

        let spot = with_backoff(self.retry, "get spot", || self.api.get_spot(spot_id)).await?;
        self.cache.insert(spot.id.clone(), spot.clone());
        self.commit().await;
        Ok(spot)
    }

    pub fn by_category(&self, category: &str) -> Vec<Spot> {
        self.spots()
            .into_iter()
            .filter(|s| {
                s.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            })
            .collect()
    }

    pub fn search(&self, text: &str) -> Vec<Spot> {
        let text = text.trim();
        if text.is_empty() {
            return self.spots();
        }
        self.spots().into_iter().filter(|s| s.matches(text)).collect()
    }

    pub async fn status(&self) -> SpotsStatus {
        self.status.read().await.clone()
    }

    /// Validate and create a spot, then add it to the cache.
    pub async fn create(&self, token: &str, spot: NewSpot) -> Result<Spot, AppError> {
        spot.validate()?;

        let created =
            with_backoff(self.retry, "create spot", || self.api.create_spot(token, &spot)).await?;

        self.cache.insert(created.id.clone(), created.clone());
        self.commit().await;

        tracing::info!(spot = %created.id, name = %created.name, "Spot created");
        Ok(created)
    }

    pub async fn update(
        &self,
        token: &str,
        spot_id: &str,
        update: SpotUpdate,
    ) -> Result<Spot, AppError> {
        update.validate()?;

        let updated = with_backoff(self.retry, "update spot", || {
            self.api.update_spot(token, spot_id, &update)
        })
        .await?;

        self.cache.insert(updated.id.clone(), updated.clone());
        self.commit().await;

        tracing::info!(spot = %updated.id, "Spot updated");
        Ok(updated)
    }

    pub async fn delete(&self, token: &str, spot_id: &str) -> Result<(), AppError> {
        with_backoff(self.retry, "delete spot", || self.api.delete_spot(token, spot_id)).await?;

        self.cache.remove(spot_id);
        self.commit().await;

        tracing::info!(spot = spot_id, "Spot deleted");
        Ok(())
    }

    fn replace_cache(&self, spots: Vec<Spot>) {
        self.cache.clear();
        for spot in spots {
            self.cache.insert(spot.id.clone(), spot);
        }
    }

    /// Mirror the cache to storage and the status count after a mutation.
    async fn commit(&self) {
        self.persist();
        self.status.write().await.count = self.cache.len();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.set_json(keys::SPOTS, &self.spots()) {
            tracing::warn!(error = %e, "Failed to persist spot collection");
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST backend client.
//!
//! Handles:
//! - Profile fetching for session sync
//! - Spot collection reads and bearer-authenticated mutations
//! - Status classification (429 rate limit, 403 forbidden, ...)

use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewSpot, ProfileRecord, Spot, SpotUpdate};
use crate::services::session::ProfileStore;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Deserialize;

/// REST backend client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with the configured base URL and request timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get a user's profile document.
    pub async fn get_profile(&self, user_id: &str, token: &str) -> Result<ProfileRecord, AppError> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// List all spots.
    pub async fn list_spots(&self) -> Result<Vec<Spot>, AppError> {
        let url = format!("{}/spots", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let body: SpotList = self.check_response_json(response).await?;
        Ok(body.into_spots())
    }

    /// Get a single spot by ID.
    pub async fn get_spot(&self, spot_id: &str) -> Result<Spot, AppError> {
        let url = self.spot_url(spot_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Create a spot on behalf of the bearer.
    pub async fn create_spot(&self, token: &str, spot: &NewSpot) -> Result<Spot, AppError> {
        let url = format!("{}/spots", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(spot)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Apply a partial update to a spot.
    pub async fn update_spot(
        &self,
        token: &str,
        spot_id: &str,
        update: &SpotUpdate,
    ) -> Result<Spot, AppError> {
        let response = self
            .http
            .put(self.spot_url(spot_id))
            .bearer_auth(token)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Delete a spot.
    pub async fn delete_spot(&self, token: &str, spot_id: &str) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.spot_url(spot_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    fn spot_url(&self, spot_id: &str) -> String {
        format!("{}/spots/{}", self.base_url, urlencoding::encode(spot_id))
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            429 => {
                tracing::warn!(path = %url, "Backend rate limit hit (429)");
                Err(AppError::RateLimited)
            }
            403 => Err(AppError::Forbidden),
            401 => Err(AppError::Unauthorized),
            404 => Err(AppError::NotFound(url)),
            400 | 422 => Err(AppError::BadRequest(body)),
            _ => Err(AppError::Backend(format!("HTTP {}: {}", status, body))),
        }
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        self.check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

impl ProfileStore for ApiClient {
    fn fetch_profile<'a>(
        &'a self,
        user_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<ProfileRecord, AppError>> {
        self.get_profile(user_id, token).boxed()
    }
}

/// `GET /spots` answers either a bare array or `{"spots": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpotList {
    Bare(Vec<Spot>),
    Wrapped { spots: Vec<Spot> },
}

impl SpotList {
    fn into_spots(self) -> Vec<Spot> {
        match self {
            SpotList::Bare(spots) | SpotList::Wrapped { spots } => spots,
        }
    }
}

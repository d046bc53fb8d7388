// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity and user models.

use crate::error::AppError;
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Something that can mint short-lived bearer tokens for a principal.
pub trait TokenSource: Send + Sync {
    fn mint_token(&self) -> BoxFuture<'_, Result<String, AppError>>;
}

/// A fixed token, for tests and for tokens handed over by an external login flow.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn mint_token(&self) -> BoxFuture<'_, Result<String, AppError>> {
        let token = self.0.clone();
        async move { Ok(token) }.boxed()
    }
}

/// External identity owned by the identity provider.
#[derive(Clone)]
pub struct Principal {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    tokens: Arc<dyn TokenSource>,
}

impl Principal {
    pub fn new(id: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            photo_url: None,
            tokens,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Mint a fresh bearer token.
    pub async fn mint_token(&self) -> Result<String, AppError> {
        self.tokens.mint_token().await
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("photo_url", &self.photo_url)
            .finish_non_exhaustive()
    }
}

/// Profile document returned by `GET /users/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    pub is_admin: Option<bool>,
}

/// Local, backend-enriched projection of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl ApplicationUser {
    /// Build from a principal and its backend profile.
    ///
    /// Display fields come from the principal when it has them. Interests and
    /// the admin flag come from the backend only.
    pub fn from_profile(principal: &Principal, profile: ProfileRecord) -> Self {
        Self {
            id: principal.id.clone(),
            name: principal.display_name.clone().or(profile.username),
            email: principal.email.clone().or(profile.email),
            avatar: principal.photo_url.clone().or(profile.avatar),
            interests: profile.interests.unwrap_or_default().into_iter().collect(),
            is_admin: profile.is_admin.unwrap_or(false),
        }
    }

    /// Degraded user built from principal fields alone.
    pub fn stub(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            name: principal.display_name.clone(),
            email: principal.email.clone(),
            avatar: principal.photo_url.clone(),
            interests: BTreeSet::new(),
            is_admin: false,
        }
    }
}

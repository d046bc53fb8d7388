// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types and the failure taxonomy used by session sync.

/// How a failed backend call should be handled by callers that retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429: retry with backoff.
    RateLimited,
    /// HTTP 403: tear the session down.
    Forbidden,
    /// Anything else.
    Other,
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Rate limited by backend")]
    RateLimited,

    #[error("Access forbidden")]
    Forbidden,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Classify this error for retry and session handling.
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::RateLimited => FailureKind::RateLimited,
            AppError::Forbidden => FailureKind::Forbidden,
            _ => FailureKind::Other,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind() == FailureKind::RateLimited
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("serialization failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod api;
pub mod identity;
pub mod retry;
pub mod session;
pub mod spots;
pub mod throttle;

pub use api::ApiClient;
pub use identity::IdentityProvider;
pub use retry::RetryPolicy;
pub use session::{ProfileStore, SessionState, SessionSync, SyncOutcome};
pub use spots::{SpotStore, SpotsStatus};
pub use throttle::Throttle;

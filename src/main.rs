// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hidden Spots client driver
//!
//! Signs in with a principal handed over through the environment, syncs
//! the session against the backend and refreshes the spot collection.

use hidden_spots::{
    config::Config,
    models::{Principal, StaticToken},
    services::SessionState,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(api = %config.api_url, "Starting Hidden Spots client");

    let state = AppState::init(config).await?;
    let mut session_rx = state.session.subscribe();

    if let Some(principal) = principal_from_env() {
        state.identity.sign_in(principal);

        // Wait for the sync triggered by the sign-in to settle
        loop {
            session_rx.changed().await?;
            let current = session_rx.borrow_and_update().clone();
            match current {
                SessionState::Syncing => continue,
                SessionState::Authenticated { user, degraded } => {
                    tracing::info!(
                        user = %user.id,
                        name = user.name.as_deref().unwrap_or(""),
                        degraded,
                        "Signed in"
                    );
                    break;
                }
                SessionState::SignedOut => {
                    tracing::warn!("Backend refused the session");
                    break;
                }
            }
        }
    } else if let Some(user) = state.session.current_user().await {
        tracing::info!(user = %user.id, "Using persisted session");
    } else {
        tracing::info!("No principal configured, browsing anonymously");
    }

    match state.spots.refresh().await {
        Ok(spots) => tracing::info!(count = spots.len(), "Spots loaded"),
        Err(e) => tracing::warn!(
            error = %e,
            cached = state.spots.spots().len(),
            "Using cached spots"
        ),
    }

    state.teardown();
    Ok(())
}

/// Principal handed over by an external login flow.
fn principal_from_env() -> Option<Principal> {
    let id = std::env::var("HIDDEN_SPOTS_PRINCIPAL_ID").ok()?;
    let token = std::env::var("HIDDEN_SPOTS_ID_TOKEN").ok()?;

    let mut principal = Principal::new(id, Arc::new(StaticToken(token)));
    if let Ok(name) = std::env::var("HIDDEN_SPOTS_DISPLAY_NAME") {
        principal = principal.with_display_name(name);
    }
    if let Ok(email) = std::env::var("HIDDEN_SPOTS_EMAIL") {
        principal = principal.with_email(email);
    }
    Some(principal)
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hidden_spots=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

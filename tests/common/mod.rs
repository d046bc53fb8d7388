// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use futures_util::future::{BoxFuture, FutureExt};
use hidden_spots::config::Config;
use hidden_spots::error::AppError;
use hidden_spots::models::{Principal, ProfileRecord, StaticToken, TokenSource};
use hidden_spots::services::ProfileStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Canned backend answer for `FakeProfiles`.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub enum Reply {
    Profile(ProfileRecord),
    RateLimited,
    Forbidden,
    Fail,
}

impl Reply {
    fn into_result(self) -> Result<ProfileRecord, AppError> {
        match self {
            Reply::Profile(profile) => Ok(profile),
            Reply::RateLimited => Err(AppError::RateLimited),
            Reply::Forbidden => Err(AppError::Forbidden),
            Reply::Fail => Err(AppError::Backend("HTTP 500: boom".to_string())),
        }
    }
}

/// Scripted profile backend that records every call.
pub struct FakeProfiles {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl FakeProfiles {
    pub fn always(reply: Reply) -> Arc<Self> {
        Self::scripted(vec![], reply)
    }

    /// Answer with `replies` in order, then `fallback` forever.
    pub fn scripted(replies: Vec<Reply>, fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            fallback,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(user_id, bearer)` pairs in call order.
    pub fn seen(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ProfileStore for FakeProfiles {
    fn fetch_profile<'a>(
        &'a self,
        user_id: &'a str,
        token: &'a str,
    ) -> BoxFuture<'a, Result<ProfileRecord, AppError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((user_id.to_string(), token.to_string()));

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        async move { reply.into_result() }.boxed()
    }
}

/// Token source that always fails.
#[allow(dead_code)]
pub struct BrokenTokens;

impl TokenSource for BrokenTokens {
    fn mint_token(&self) -> BoxFuture<'_, Result<String, AppError>> {
        async { Err(AppError::Identity("token endpoint unavailable".to_string())) }.boxed()
    }
}

#[allow(dead_code)]
pub fn profile(interests: &[&str], is_admin: bool) -> ProfileRecord {
    ProfileRecord {
        interests: Some(interests.iter().map(|s| s.to_string()).collect()),
        is_admin: Some(is_admin),
        ..ProfileRecord::default()
    }
}

/// Principal `{id:"u1", displayName:"Ann", email:"a@x.com"}` with token "ann-token".
#[allow(dead_code)]
pub fn ann() -> Principal {
    Principal::new("u1", Arc::new(StaticToken("ann-token".to_string())))
        .with_display_name("Ann")
        .with_email("a@x.com")
}

/// Default timings pointed at `api_url`.
#[allow(dead_code)]
pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        ..Config::default()
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock backend crashed");
    });

    format!("http://{}", addr)
}

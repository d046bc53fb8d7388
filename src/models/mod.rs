// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod spot;
pub mod user;

pub use spot::{NewSpot, Spot, SpotUpdate};
pub use user::{ApplicationUser, Principal, ProfileRecord, StaticToken, TokenSource};

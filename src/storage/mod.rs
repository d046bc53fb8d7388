// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable local storage.
//!
//! A small synchronous key/value interface. Writes are whole-value
//! overwrites, last writer wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};

/// Storage keys as constants.
pub mod keys {
    /// Serialized `ApplicationUser`
    pub const USER: &str = "user";
    /// Current bearer token
    pub const TOKEN: &str = "token";
    /// Serialized spot collection
    pub const SPOTS: &str = "spots";
}

/// Key/value storage that survives a reload.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Read and deserialize a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a JSON value.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError>
    where
        Self: Sized,
    {
        self.set(key, &serde_json::to_string(value)?)
    }
}

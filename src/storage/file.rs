// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-file backed store.
//!
//! The whole map is kept in memory and rewritten on every mutation via a
//! temp file + rename, so a crash never leaves a half-written file behind.
//! Memory only changes once the write has succeeded.

use super::DurableStore;
use crate::error::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened storage file");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("storage lock poisoned".to_string()))
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("failed to create {}: {}", parent.display(), e)))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)
            .map_err(|e| AppError::Storage(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::Storage(format!("failed to replace {}: {}", self.path.display(), e)))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());

        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);

        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set(keys::TOKEN, "abc").unwrap();
        store.set(keys::USER, r#"{"id":"u1"}"#).unwrap();
        store.remove(keys::USER).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(keys::USER).unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set(keys::TOKEN, "old").unwrap();

        // A directory squatting on the temp file name makes every flush fail
        fs::create_dir(path.with_extension("tmp")).unwrap();

        assert!(matches!(store.set(keys::TOKEN, "new"), Err(AppError::Storage(_))));
        assert!(store.remove(keys::TOKEN).is_err());
        assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("old"));

        drop(store);
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(keys::TOKEN).unwrap(), None);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed slot storage: one file per slot inside a directory.
//!
//! Writes go to a sibling temp file and are renamed into place, so a crash
//! mid-write leaves either the old value or the new one.

use super::SlotStorage;
use crate::error::ClientError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Slot storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ClientError::Storage(format!("Failed to create {}: {}", root.display(), e))
        })?;
        tracing::debug!(path = %root.display(), "Opened file storage");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, ClientError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(ClientError::Storage(format!("Invalid slot name: {key:?}")));
        }
        Ok(self.root.join(key))
    }
}

impl SlotStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let path = self.slot_path(key)?;
        let tmp = self.root.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                ClientError::Storage(format!("Failed to write {}: {}", path.display(), e))
            })
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "driverxp-file-storage-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn values_survive_reopen() {
        let dir = scratch_dir("reopen");
        let storage = FileStorage::open(&dir).unwrap();
        storage.set("driverxp_token", "tok").unwrap();

        let reopened = FileStorage::open(&dir).unwrap();
        assert_eq!(reopened.get("driverxp_token").unwrap().as_deref(), Some("tok"));

        reopened.remove("driverxp_token").unwrap();
        reopened.remove("driverxp_token").unwrap();
        assert_eq!(storage.get("driverxp_token").unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = scratch_dir("keys");
        let storage = FileStorage::open(&dir).unwrap();
        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get(".hidden").is_err());
        assert!(storage.get("").is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}

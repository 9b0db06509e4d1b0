// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process slot storage. Used by tests and short-lived embeddings.

use super::SlotStorage;
use crate::error::ClientError;
use dashmap::DashMap;
use std::sync::Arc;

/// Slot storage backed by a concurrent map.
///
/// Clones share the same slots, so a test can keep a handle and inspect
/// what the session store persisted.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.slots.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_slots() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.set("driverxp_token", "abc").unwrap();
        assert_eq!(handle.get("driverxp_token").unwrap().as_deref(), Some("abc"));

        handle.remove("driverxp_token").unwrap();
        handle.remove("driverxp_token").unwrap();
        assert!(storage.is_empty());
    }
}

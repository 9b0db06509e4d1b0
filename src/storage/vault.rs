// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted credential pair: `<namespace>_token` + `<namespace>_user`.
//!
//! Invariants:
//! - Both slots are written together and removed together.
//! - A load that finds only one half, a blank token, or an identity record
//!   without id/firstName/email reports `StorageCorrupt`; the caller decides
//!   whether to discard.
//! - Every read-modify-write of the pair holds `pair_lock`.

use super::SlotStorage;
use crate::config::Config;
use crate::error::ClientError;
use crate::models::User;
use std::sync::{Arc, Mutex, MutexGuard};

/// Token and identity as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

/// Owner of the durable credential pair.
#[derive(Clone)]
pub struct CredentialVault {
    storage: Arc<dyn SlotStorage>,
    token_key: String,
    user_key: String,
    pair_lock: Arc<Mutex<()>>,
}

impl CredentialVault {
    pub fn new(storage: Arc<dyn SlotStorage>, config: &Config) -> Self {
        Self {
            storage,
            token_key: config.token_key(),
            user_key: config.user_key(),
            pair_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.pair_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current bearer token, if one is persisted and non-blank.
    pub fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .storage
            .get(&self.token_key)?
            .filter(|t| !t.trim().is_empty()))
    }

    /// Read the pair.
    ///
    /// `Ok(None)` when neither slot exists, `Err(StorageCorrupt)` when the
    /// pair is unusable.
    pub fn load(&self) -> Result<Option<Credentials>, ClientError> {
        let _guard = self.lock();
        let token = self.storage.get(&self.token_key)?;
        let user_json = self.storage.get(&self.user_key)?;

        let (token, user_json) = match (token, user_json) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ClientError::StorageCorrupt("user record missing".to_string()))
            }
            (None, Some(_)) => {
                return Err(ClientError::StorageCorrupt("token missing".to_string()))
            }
            (Some(token), Some(user_json)) => (token, user_json),
        };

        if token.trim().is_empty() {
            return Err(ClientError::StorageCorrupt("token is blank".to_string()));
        }

        let user: User = serde_json::from_str(&user_json).map_err(|e| {
            ClientError::StorageCorrupt(format!("user record unparseable: {}", e))
        })?;

        if let Some(field) = user.missing_identity_field() {
            return Err(ClientError::StorageCorrupt(format!(
                "user record missing {}",
                field
            )));
        }

        Ok(Some(Credentials { token, user }))
    }

    /// Persist both halves. A failed second write rolls back the first.
    pub fn save(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(&credentials.user)
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Failed to encode user: {}", e)))?;

        let _guard = self.lock();
        self.storage.set(&self.token_key, &credentials.token)?;
        if let Err(e) = self.storage.set(&self.user_key, &user_json) {
            if let Err(rollback) = self.storage.remove(&self.token_key) {
                tracing::warn!(error = %rollback, "Failed to roll back token after user write failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Replace the identity half, leaving the token untouched.
    pub fn replace_user(&self, user: &User) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Failed to encode user: {}", e)))?;

        let _guard = self.lock();
        if self.storage.get(&self.token_key)?.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.storage.set(&self.user_key, &user_json)
    }

    /// Remove both halves. Idempotent.
    pub fn clear(&self) -> Result<(), ClientError> {
        let _guard = self.lock();
        let token_result = self.storage.remove(&self.token_key);
        let user_result = self.storage.remove(&self.user_key);
        token_result.and(user_result)
    }
}

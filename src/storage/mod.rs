// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable storage layer.
//!
//! Storage is a flat set of string slots, the same shape as browser
//! `localStorage`. The [`CredentialVault`] owns the two slots that make up
//! the persisted session and is the only writer of them.

pub mod file;
pub mod memory;
pub mod vault;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use vault::{CredentialVault, Credentials};

use crate::error::ClientError;

/// String slot storage.
///
/// Implementations must be safe to share between tasks; pair-level
/// atomicity is the vault's job, not the slot store's.
pub trait SlotStorage: Send + Sync {
    /// Read a slot. Missing slots are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Create or overwrite a slot.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Delete a slot. Deleting a missing slot succeeds.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

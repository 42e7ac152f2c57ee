// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value backend trait for the (possibly remote, replicated) store.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StrongboxError;
use crate::types::PutOptions;

/// Asynchronous key-value store the vault persists entries into.
///
/// Absent keys are simply missing from the returned maps; they are not errors.
/// Deleting a key that does not exist succeeds.
#[async_trait]
pub trait KeyValueBackend: Send + Sync + 'static {
    /// Human-readable backend name used in logs.
    fn name(&self) -> &str;

    /// Writes `value` under `key`, returning the number of bytes written.
    async fn put(
        &self,
        key: &str,
        value: &[u8],
        options: PutOptions,
    ) -> Result<usize, StrongboxError>;

    /// Fetches the given keys in one batch.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StrongboxError>;

    /// Fetches every entry in the store.
    async fn get_all(&self) -> Result<HashMap<String, Vec<u8>>, StrongboxError>;

    /// Deletes the given keys.
    async fn delete(&self, keys: &[String]) -> Result<(), StrongboxError>;

    /// Whether replicated entries are end-to-end encrypted by the backend.
    async fn is_end_to_end_encryption_available(&self) -> Result<bool, StrongboxError> {
        Ok(false)
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value backend for deterministic testing.
//!
//! State sits behind a `std::sync::Mutex` so tests can arrange and inspect it
//! from plain synchronous code while the vault drives the async side.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use strongbox_core::{KeyValueBackend, PutOptions, StrongboxError};

#[derive(Default)]
struct State {
    entries: HashMap<String, Vec<u8>>,
    failing_puts: HashSet<String>,
    put_log: Vec<(String, PutOptions)>,
}

/// A mock backend storing entries in a `HashMap`.
///
/// Every operation first applies the configured delay, then hangs forever
/// if [`hang_all`](MemoryBackend::hang_all) is set, then fails if
/// [`fail_all`](MemoryBackend::fail_all) is set.
pub struct MemoryBackend {
    state: Mutex<State>,
    fail_all: AtomicBool,
    hang_all: AtomicBool,
    e2ee_available: AtomicBool,
    delay_ms: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_all: AtomicBool::new(false),
            hang_all: AtomicBool::new(false),
            e2ee_available: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a value directly, bypassing the vault.
    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.state().entries.insert(key.to_string(), value.to_vec());
    }

    pub fn remove_raw(&self, key: &str) {
        self.state().entries.remove(key);
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.state().entries.get(key).cloned()
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.state().entries.clone()
    }

    /// Make every `put` of `key` fail with a backend error.
    pub fn fail_put_for(&self, key: &str) {
        self.state().failing_puts.insert(key.to_string());
    }

    pub fn clear_put_failures(&self) {
        self.state().failing_puts.clear();
    }

    pub fn fail_all(&self, enabled: bool) {
        self.fail_all.store(enabled, Ordering::SeqCst);
    }

    /// Never complete any operation.
    pub fn hang_all(&self, enabled: bool) {
        self.hang_all.store(enabled, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_e2ee_available(&self, available: bool) {
        self.e2ee_available.store(available, Ordering::SeqCst);
    }

    /// Every successful `put` so far, in completion order.
    pub fn put_log(&self) -> Vec<(String, PutOptions)> {
        self.state().put_log.clone()
    }

    pub fn clear_put_log(&self) {
        self.state().put_log.clear();
    }

    async fn simulate(&self, operation: &str) -> Result<(), StrongboxError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.hang_all.load(Ordering::SeqCst) {
            futures::future::pending::<()>().await;
        }
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StrongboxError::backend(format!(
                "injected {operation} failure"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(
        &self,
        key: &str,
        value: &[u8],
        options: PutOptions,
    ) -> Result<usize, StrongboxError> {
        self.simulate("put").await?;
        let mut state = self.state();
        if state.failing_puts.contains(key) {
            return Err(StrongboxError::backend(format!(
                "injected put failure for `{key}`"
            )));
        }
        state.entries.insert(key.to_string(), value.to_vec());
        state.put_log.push((key.to_string(), options));
        Ok(value.len())
    }

    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        self.simulate("get").await?;
        let state = self.state();
        Ok(keys
            .iter()
            .filter_map(|k| state.entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn get_all(&self) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        self.simulate("get_all").await?;
        Ok(self.state().entries.clone())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StrongboxError> {
        self.simulate("delete").await?;
        let mut state = self.state();
        for key in keys {
            state.entries.remove(key);
        }
        Ok(())
    }

    async fn is_end_to_end_encryption_available(&self) -> Result<bool, StrongboxError> {
        self.simulate("is_end_to_end_encryption_available").await?;
        Ok(self.e2ee_available.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let backend = MemoryBackend::new();
        backend
            .put("k", b"v", PutOptions { should_backup: true })
            .await
            .unwrap();

        let got = backend.get(&["k".into(), "missing".into()]).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["k"], b"v");
        assert_eq!(backend.put_log(), vec![("k".to_string(), PutOptions { should_backup: true })]);

        backend.delete(&["k".into(), "missing".into()]).await.unwrap();
        assert!(backend.keys().is_empty());
    }

    #[tokio::test]
    async fn injected_put_failure_leaves_key_unset() {
        let backend = MemoryBackend::new();
        backend.fail_put_for("k");
        assert!(backend.put("k", b"v", PutOptions::default()).await.is_err());
        assert_eq!(backend.raw("k"), None);
        assert!(backend.put_log().is_empty());
    }

    #[tokio::test]
    async fn fail_all_applies_to_reads() {
        let backend = MemoryBackend::new();
        backend.fail_all(true);
        assert!(backend.get_all().await.is_err());
        assert!(backend.is_end_to_end_encryption_available().await.is_err());
    }

    #[tokio::test]
    async fn hang_never_completes() {
        let backend = MemoryBackend::new();
        backend.hang_all(true);
        let result =
            tokio::time::timeout(Duration::from_millis(20), backend.get_all()).await;
        assert!(result.is_err());
    }
}

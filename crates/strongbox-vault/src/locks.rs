// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-service mutual exclusion.
//!
//! Entries are never evicted: removing a mutex while another thread still
//! holds a clone would let a third thread create a fresh one and run
//! concurrently with the holder.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

pub(crate) struct ServiceLocks {
    enabled: bool,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ServiceLocks {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: DashMap::new(),
        }
    }

    /// Run `f` while holding the lock for `service`, or directly when disabled.
    pub(crate) fn with_lock<T>(&self, service: &str, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }
        // Clone out of the map first so the shard lock is released before blocking.
        let mutex = Arc::clone(
            self.locks
                .entry(service.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let _guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

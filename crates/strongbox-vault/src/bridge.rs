// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking facade over an async [`KeyValueBackend`].
//!
//! The bridge owns a dedicated multi-thread tokio runtime and drives every
//! backend future to completion with a hard timeout. Vault operations are
//! synchronous, so the bridge must not be entered from inside an async
//! context (tokio panics on nested `block_on`). Dropping the bridge shuts
//! its runtime down, so that must not happen on an async worker either.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures::future::join_all;
use strongbox_config::model::VaultConfig;
use strongbox_core::{E2eeCapability, KeyValueBackend, PutOptions, StrongboxError};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Result of one write dispatched by [`AsyncBridge::write_all`].
#[derive(Debug)]
pub struct WriteOutcome {
    pub key: String,
    pub result: Result<usize, StrongboxError>,
}

pub struct AsyncBridge {
    backend: Arc<dyn KeyValueBackend>,
    runtime: Runtime,
    timeout: Duration,
    e2ee: Arc<ArcSwap<E2eeCapability>>,
}

impl AsyncBridge {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        timeout: Duration,
        worker_threads: usize,
    ) -> Result<Self, StrongboxError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("strongbox-bridge")
            .enable_all()
            .build()
            .map_err(|e| StrongboxError::Internal(format!("failed to start bridge runtime: {e}")))?;

        debug!(
            backend = backend.name(),
            timeout_ms = timeout.as_millis() as u64,
            worker_threads,
            "async bridge started"
        );

        Ok(Self {
            backend,
            runtime,
            timeout,
            e2ee: Arc::new(ArcSwap::from_pointee(E2eeCapability::Unknown)),
        })
    }

    pub fn from_config(
        backend: Arc<dyn KeyValueBackend>,
        config: &VaultConfig,
    ) -> Result<Self, StrongboxError> {
        Self::new(backend, config.bridge_timeout(), config.bridge_worker_threads)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn block_on<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StrongboxError>>,
    ) -> Result<T, StrongboxError> {
        let result = self.runtime.block_on(bounded(operation, self.timeout, fut));
        if let Err(ref e) = result {
            warn!(backend = self.backend.name(), operation, error = %e, "backend call failed");
        }
        result
    }

    /// Fetch `keys`. Missing keys are simply absent from the map.
    pub fn read(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        self.block_on("get", self.backend.get(keys))
    }

    pub fn read_all(&self) -> Result<HashMap<String, Vec<u8>>, StrongboxError> {
        self.block_on("get_all", self.backend.get_all())
    }

    pub fn write(
        &self,
        key: &str,
        value: &[u8],
        options: PutOptions,
    ) -> Result<usize, StrongboxError> {
        self.block_on("put", self.backend.put(key, value, options))
    }

    /// Dispatch every write concurrently and wait for all of them.
    ///
    /// Each write carries its own timeout, so the call returns after at most
    /// one timeout period. Outcomes are returned in input order.
    pub fn write_all(&self, writes: &[(String, Vec<u8>)], options: PutOptions) -> Vec<WriteOutcome> {
        let duration = self.timeout;
        let backend = &self.backend;
        let outcomes = self.runtime.block_on(join_all(writes.iter().map(
            |(key, value)| async move {
                WriteOutcome {
                    key: key.clone(),
                    result: bounded("put", duration, backend.put(key, value, options)).await,
                }
            },
        )));

        for outcome in &outcomes {
            if let Err(ref e) = outcome.result {
                warn!(backend = self.backend.name(), key = %outcome.key, error = %e, "backend write failed");
            }
        }
        outcomes
    }

    pub fn delete(&self, keys: &[String]) -> Result<(), StrongboxError> {
        self.block_on("delete", self.backend.delete(keys))
    }

    /// Last known end-to-end encryption capability of the backend.
    pub fn e2ee_capability(&self) -> E2eeCapability {
        **self.e2ee.load()
    }

    /// Query the backend synchronously and cache the answer.
    ///
    /// A failed query leaves the cached value untouched.
    pub fn refresh_e2ee_capability(&self) -> E2eeCapability {
        match self.block_on(
            "is_end_to_end_encryption_available",
            self.backend.is_end_to_end_encryption_available(),
        ) {
            Ok(available) => {
                let capability = E2eeCapability::from(available);
                self.e2ee.store(Arc::new(capability));
                debug!(backend = self.backend.name(), %capability, "e2ee capability refreshed");
                capability
            }
            Err(_) => self.e2ee_capability(),
        }
    }

    /// Cached capability, querying synchronously if it is still unknown.
    pub fn ensure_e2ee_capability(&self) -> E2eeCapability {
        match self.e2ee_capability() {
            E2eeCapability::Unknown => self.refresh_e2ee_capability(),
            known => known,
        }
    }

    /// Start a background capability query without waiting for it.
    pub fn spawn_e2ee_refresh(&self) {
        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.e2ee);
        let duration = self.timeout;
        self.runtime.spawn(async move {
            match bounded(
                "is_end_to_end_encryption_available",
                duration,
                backend.is_end_to_end_encryption_available(),
            )
            .await
            {
                Ok(available) => {
                    // Fills the cache only while unknown; a synchronous refresh may be newer.
                    let current = cache.load();
                    if **current == E2eeCapability::Unknown {
                        cache.compare_and_swap(&current, Arc::new(E2eeCapability::from(available)));
                    }
                }
                Err(e) => {
                    debug!(backend = backend.name(), error = %e, "background e2ee query failed");
                }
            }
        });
    }
}

async fn bounded<T>(
    operation: &'static str,
    duration: Duration,
    fut: impl Future<Output = Result<T, StrongboxError>>,
) -> Result<T, StrongboxError> {
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(StrongboxError::BackendTimeout {
            operation,
            duration,
        }),
    }
}

impl std::fmt::Debug for AsyncBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncBridge")
            .field("backend", &self.backend.name())
            .field("timeout", &self.timeout)
            .field("e2ee", &self.e2ee_capability())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use strongbox_test_utils::MemoryBackend;

    fn bridge(backend: &Arc<MemoryBackend>, timeout_ms: u64) -> AsyncBridge {
        AsyncBridge::new(
            Arc::clone(backend) as Arc<dyn KeyValueBackend>,
            Duration::from_millis(timeout_ms),
            2,
        )
        .unwrap()
    }

    #[test]
    fn read_returns_only_present_keys() {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert_raw("a", b"1");
        let bridge = bridge(&backend, 1000);

        let values = bridge.read(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], b"1");
    }

    #[test]
    fn hanging_read_times_out() {
        let backend = Arc::new(MemoryBackend::new());
        backend.hang_all(true);
        let bridge = bridge(&backend, 50);

        let started = Instant::now();
        let err = bridge.read(&["a".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            StrongboxError::BackendTimeout {
                operation: "get",
                ..
            }
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn write_all_reports_each_key() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_put_for("b");
        let bridge = bridge(&backend, 1000);

        let outcomes = bridge.write_all(
            &[
                ("a".to_string(), b"1".to_vec()),
                ("b".to_string(), b"2".to_vec()),
                ("c".to_string(), b"3".to_vec()),
            ],
            PutOptions::default(),
        );

        let keys: Vec<_> = outcomes.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
        assert_eq!(backend.raw("a"), Some(b"1".to_vec()));
        assert_eq!(backend.raw("b"), None);
    }

    #[test]
    fn concurrent_writes_share_one_timeout_window() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_delay(Duration::from_millis(150));
        let bridge = bridge(&backend, 1000);

        let writes: Vec<_> = (0..3).map(|i| (format!("k{i}"), vec![i as u8])).collect();
        let started = Instant::now();
        let outcomes = bridge.write_all(&writes, PutOptions::default());

        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        // Sequential dispatch would take at least 450ms.
        assert!(started.elapsed() < Duration::from_millis(440));
    }

    #[test]
    fn e2ee_capability_is_cached() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_e2ee_available(true);
        let bridge = bridge(&backend, 1000);

        assert_eq!(bridge.e2ee_capability(), E2eeCapability::Unknown);
        assert_eq!(bridge.ensure_e2ee_capability(), E2eeCapability::Available);

        backend.set_e2ee_available(false);
        assert_eq!(bridge.ensure_e2ee_capability(), E2eeCapability::Available);
        assert_eq!(bridge.refresh_e2ee_capability(), E2eeCapability::Unavailable);
    }

    #[test]
    fn background_refresh_fills_unknown_capability() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_e2ee_available(true);
        let bridge = bridge(&backend, 1000);

        bridge.spawn_e2ee_refresh();
        let deadline = Instant::now() + Duration::from_secs(2);
        while bridge.e2ee_capability() == E2eeCapability::Unknown && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(bridge.e2ee_capability(), E2eeCapability::Available);
    }

    #[test]
    fn background_refresh_never_overwrites_known_capability() {
        let backend = Arc::new(MemoryBackend::new());
        let bridge = bridge(&backend, 1000);
        assert_eq!(bridge.refresh_e2ee_capability(), E2eeCapability::Unavailable);

        backend.set_e2ee_available(true);
        bridge.spawn_e2ee_refresh();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(bridge.e2ee_capability(), E2eeCapability::Unavailable);
    }

    #[test]
    fn failed_e2ee_query_keeps_unknown() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_all(true);
        let bridge = bridge(&backend, 1000);

        assert_eq!(bridge.ensure_e2ee_capability(), E2eeCapability::Unknown);
    }
}

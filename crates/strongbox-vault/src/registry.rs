// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-indexed set of cipher strategies.

use std::sync::Arc;

use strongbox_core::{CipherDescriptor, CipherStrategy, StrongboxError};
use tracing::debug;

/// Registered cipher strategies in declaration order.
///
/// Names are unique; lookups by name serve reads, capability ranking serves writes.
#[derive(Clone, Default)]
pub struct CipherRegistry {
    strategies: Vec<Arc<dyn CipherStrategy>>,
}

impl CipherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a strategy, rejecting a name that is already taken.
    pub fn register(&mut self, strategy: Arc<dyn CipherStrategy>) -> Result<(), StrongboxError> {
        if self.contains(strategy.name()) {
            return Err(StrongboxError::Config(format!(
                "cipher `{}` is registered twice",
                strategy.name()
            )));
        }
        debug!(
            cipher = strategy.name(),
            score = strategy.capability_score(),
            tier = %strategy.security_tier(),
            "cipher registered"
        );
        self.strategies.push(strategy);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, strategy: impl CipherStrategy) -> Result<Self, StrongboxError> {
        self.register(Arc::new(strategy))?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CipherStrategy>> {
        self.strategies.iter().find(|s| s.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Highest-scoring strategy usable on `platform_version`.
    ///
    /// Ties go to the strategy registered first.
    pub fn best_for(&self, platform_version: u32) -> Option<&Arc<dyn CipherStrategy>> {
        self.strategies
            .iter()
            .filter(|s| s.descriptor().is_usable_on(platform_version))
            .fold(None, |best: Option<&Arc<dyn CipherStrategy>>, candidate| match best {
                Some(current) if current.capability_score() >= candidate.capability_score() => {
                    Some(current)
                }
                _ => Some(candidate),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CipherStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn descriptors(&self) -> Vec<&CipherDescriptor> {
        self.strategies.iter().map(|s| s.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for CipherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StrongboxConfig;

const MIN_KDF_MEMORY_COST: u32 = 32768;
const MIN_KDF_ITERATIONS: u32 = 2;
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation rather than failing on the first.
pub fn validate_config(config: &StrongboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.bridge_timeout_ms == 0 {
        errors.push(ConfigError::validation(
            "vault.bridge_timeout_ms must be greater than 0",
        ));
    }

    if config.vault.bridge_worker_threads == 0 {
        errors.push(ConfigError::validation(
            "vault.bridge_worker_threads must be at least 1",
        ));
    }

    if config.vault.legacy_cipher_tag.trim().is_empty() {
        errors.push(ConfigError::validation(
            "vault.legacy_cipher_tag must not be empty",
        ));
    }

    if config.kdf.memory_cost < MIN_KDF_MEMORY_COST {
        errors.push(ConfigError::validation(format!(
            "kdf.memory_cost must be at least {MIN_KDF_MEMORY_COST} (32 MiB), got {}",
            config.kdf.memory_cost
        )));
    }

    if config.kdf.iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::validation(format!(
            "kdf.iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
            config.kdf.iterations
        )));
    }

    if config.kdf.parallelism < 1 {
        errors.push(ConfigError::validation(format!(
            "kdf.parallelism must be at least 1, got {}",
            config.kdf.parallelism
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Strongbox credential vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Strongbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrongboxConfig {
    /// Vault orchestration settings (bridge, ranking, policies).
    #[serde(default)]
    pub vault: VaultConfig,

    /// Argon2id parameters for the passphrase cipher.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// SQLite backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Whether written entries ask the backend to replicate off-device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Always request backup.
    #[default]
    Always,
    /// Request backup only when the backend reports end-to-end encryption.
    WhenEndToEndEncrypted,
}

/// What `get` does with an entry written under a weaker-than-best cipher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradePolicy {
    /// Leave the entry under its original cipher.
    #[default]
    Never,
    /// Re-encrypt it under the current best cipher after a successful read.
    Automatic,
}

/// Vault orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Upper bound on every backend call, in milliseconds.
    #[serde(default = "default_bridge_timeout_ms")]
    pub bridge_timeout_ms: u64,

    /// Worker threads of the runtime driving backend futures.
    #[serde(default = "default_bridge_worker_threads")]
    pub bridge_worker_threads: usize,

    /// Platform version used to filter cipher strategies for writes.
    #[serde(default = "default_platform_version")]
    pub platform_version: u32,

    /// Off-device backup flag policy for writes.
    #[serde(default)]
    pub backup_policy: BackupPolicy,

    /// Automatic cipher upgrade on read.
    #[serde(default)]
    pub upgrade_policy: UpgradePolicy,

    /// Serialize operations on the same service with a per-service mutex.
    #[serde(default = "default_lock_per_service")]
    pub lock_per_service: bool,

    /// Tag assumed for entries stored without a cipher tag.
    #[serde(default = "default_legacy_cipher_tag")]
    pub legacy_cipher_tag: String,
}

impl VaultConfig {
    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            bridge_timeout_ms: default_bridge_timeout_ms(),
            bridge_worker_threads: default_bridge_worker_threads(),
            platform_version: default_platform_version(),
            backup_policy: BackupPolicy::default(),
            upgrade_policy: UpgradePolicy::default(),
            lock_per_service: default_lock_per_service(),
            legacy_cipher_tag: default_legacy_cipher_tag(),
        }
    }
}

fn default_bridge_timeout_ms() -> u64 {
    5_000
}

fn default_bridge_worker_threads() -> usize {
    2
}

fn default_platform_version() -> u32 {
    34
}

fn default_lock_per_service() -> bool {
    true
}

fn default_legacy_cipher_tag() -> String {
    "FB".to_string()
}

/// Argon2id key derivation parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_kdf_memory_cost(),
            iterations: default_kdf_iterations(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// SQLite backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "strongbox.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_timeout_converts_millis() {
        let config = VaultConfig {
            bridge_timeout_ms: 1500,
            ..VaultConfig::default()
        };
        assert_eq!(config.bridge_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn defaults_follow_block_store_behavior() {
        let config = VaultConfig::default();
        assert_eq!(config.backup_policy, BackupPolicy::Always);
        assert_eq!(config.upgrade_policy, UpgradePolicy::Never);
        assert_eq!(config.legacy_cipher_tag, "FB");
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strongbox.toml` > `~/.config/strongbox/strongbox.toml` >
//! `/etc/strongbox/strongbox.toml` with environment variable overrides via `STRONGBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StrongboxConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/strongbox/strongbox.toml";

/// Local config file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "strongbox.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/strongbox/strongbox.toml` (system-wide)
/// 3. `~/.config/strongbox/strongbox.toml` (user XDG config)
/// 4. `./strongbox.toml` (local directory)
/// 5. `STRONGBOX_*` environment variables
pub fn load_config() -> Result<StrongboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/strongbox/strongbox.toml`, if a config dir exists on this platform.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("strongbox/strongbox.toml"))
}

/// Config sections that `STRONGBOX_*` variables may target.
const ENV_SECTIONS: [&str; 4] = ["vault", "kdf", "storage", "log"];

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `STRONGBOX_VAULT_BRIDGE_TIMEOUT_MS` must map to
/// `vault.bridge_timeout_ms`, not `vault.bridge.timeout.ms`.
///
/// Only variables naming a known section are read. `STRONGBOX_PASSPHRASE`,
/// `STRONGBOX_SECRET` and other non-config variables share the prefix.
fn env_provider() -> Env {
    Env::prefixed("STRONGBOX_")
        .filter(|key| section_of(key.as_str()).is_some())
        .map(|key| match section_of(key.as_str()) {
            Some(section) => format!("{section}.{}", &key.as_str()[section.len() + 1..]).into(),
            None => key.as_str().to_string().into(),
        })
}

/// Section named by an env key such as `vault_bridge_timeout_ms`.
fn section_of(key: &str) -> Option<&'static str> {
    ENV_SECTIONS.into_iter().find(|section| {
        key.len() > section.len() + 1
            && key.is_char_boundary(section.len())
            && key[..section.len()].eq_ignore_ascii_case(section)
            && key.as_bytes()[section.len()] == b'_'
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackupPolicy, UpgradePolicy};

    #[test]
    fn env_vars_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRONGBOX_VAULT_BRIDGE_TIMEOUT_MS", "750");
            jail.set_env("STRONGBOX_VAULT_BACKUP_POLICY", "when_end_to_end_encrypted");
            jail.set_env("STRONGBOX_KDF_MEMORY_COST", "32768");
            jail.set_env("STRONGBOX_STORAGE_DATABASE_PATH", "/tmp/sb.db");
            jail.set_env("STRONGBOX_LOG_LEVEL", "debug");

            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert_eq!(config.vault.bridge_timeout_ms, 750);
            assert_eq!(
                config.vault.backup_policy,
                BackupPolicy::WhenEndToEndEncrypted
            );
            assert_eq!(config.kdf.memory_cost, 32768);
            assert_eq!(config.storage.database_path, "/tmp/sb.db");
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn passphrase_env_var_is_not_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRONGBOX_PASSPHRASE", "not-a-config-key");
            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert_eq!(config.vault.upgrade_policy, UpgradePolicy::Never);
            Ok(())
        });
    }

    #[test]
    fn secret_env_var_does_not_break_loading() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRONGBOX_SECRET", "hunter2");
            jail.set_env("STRONGBOX_VAULT_BRIDGE_TIMEOUT_MS", "900");
            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert_eq!(config.vault.bridge_timeout_ms, 900);
            Ok(())
        });
    }

    #[test]
    fn section_prefix_requires_separator() {
        assert_eq!(section_of("vault_platform_version"), Some("vault"));
        assert_eq!(section_of("LOG_LEVEL"), Some("log"));
        assert_eq!(section_of("logger"), None);
        assert_eq!(section_of("vault_"), None);
        assert_eq!(section_of("secret"), None);
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[vault]
platform_version = 26
upgrade_policy = "automatic"
"#,
            )?;
            jail.set_env("STRONGBOX_VAULT_PLATFORM_VERSION", "30");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.vault.platform_version, 30);
            assert_eq!(config.vault.upgrade_policy, UpgradePolicy::Automatic);
            Ok(())
        });
    }
}

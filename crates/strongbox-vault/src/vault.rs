// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential vault: put, get, remove and audit entries.
//!
//! Each credential is stored as three backend keys (see [`KeyNamingScheme`]):
//! - the username ciphertext,
//! - the password ciphertext,
//! - the cipher tag naming the strategy that produced both.
//!
//! Writes pick the best-ranked usable strategy. Reads never rank: they
//! dispatch on the stored tag, falling back to the configured legacy tag
//! for entries written before tagging existed.

use std::collections::BTreeSet;
use std::sync::Arc;

use strongbox_config::model::{BackupPolicy, UpgradePolicy, VaultConfig};
use strongbox_core::{
    CipherStrategy, Credential, E2eeCapability, EncryptedEntry, KeyValueBackend, PutOptions,
    StrongboxError,
};
use tracing::{debug, error, info, warn};

use crate::bridge::AsyncBridge;
use crate::locks::ServiceLocks;
use crate::naming::{KeyNamingScheme, KeyRole, StorageKeys, SuffixNaming};
use crate::registry::CipherRegistry;

pub struct CredentialVault {
    registry: CipherRegistry,
    naming: Box<dyn KeyNamingScheme>,
    bridge: AsyncBridge,
    locks: ServiceLocks,
    platform_version: u32,
    backup_policy: BackupPolicy,
    upgrade_policy: UpgradePolicy,
    legacy_cipher_tag: String,
}

impl CredentialVault {
    /// Build a vault over `backend` with the default `:u`/`:p`/`:c` key scheme.
    ///
    /// Must be called outside any async runtime; the vault owns its own.
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        registry: CipherRegistry,
        config: &VaultConfig,
    ) -> Result<Self, StrongboxError> {
        if registry.is_empty() {
            return Err(StrongboxError::Config(
                "at least one cipher must be registered".to_string(),
            ));
        }
        if !registry.contains(&config.legacy_cipher_tag) {
            warn!(
                legacy_cipher_tag = %config.legacy_cipher_tag,
                "legacy cipher is not registered; untagged entries will be unreadable"
            );
        }

        let bridge = AsyncBridge::from_config(backend, config)?;
        if config.backup_policy == BackupPolicy::WhenEndToEndEncrypted {
            bridge.spawn_e2ee_refresh();
        }

        info!(
            backend = bridge.backend_name(),
            ciphers = ?registry.names(),
            platform_version = config.platform_version,
            "credential vault ready"
        );

        Ok(Self {
            registry,
            naming: Box::new(SuffixNaming),
            bridge,
            locks: ServiceLocks::new(config.lock_per_service),
            platform_version: config.platform_version,
            backup_policy: config.backup_policy,
            upgrade_policy: config.upgrade_policy,
            legacy_cipher_tag: config.legacy_cipher_tag.clone(),
        })
    }

    /// Replace the key naming scheme. Existing entries stay under the old keys.
    pub fn with_naming(mut self, naming: impl KeyNamingScheme) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn registry(&self) -> &CipherRegistry {
        &self.registry
    }

    pub fn bridge(&self) -> &AsyncBridge {
        &self.bridge
    }

    pub fn naming(&self) -> &dyn KeyNamingScheme {
        self.naming.as_ref()
    }

    /// Tag assumed for entries stored without one.
    pub fn legacy_cipher_tag(&self) -> &str {
        &self.legacy_cipher_tag
    }

    pub(crate) fn locks(&self) -> &ServiceLocks {
        &self.locks
    }

    /// The strategy new writes would use.
    pub fn write_cipher(&self) -> Result<&Arc<dyn CipherStrategy>, StrongboxError> {
        self.registry
            .best_for(self.platform_version)
            .ok_or(StrongboxError::NoUsableCipher {
                platform_version: self.platform_version,
            })
    }

    /// Encrypt and store a credential with the best-ranked usable cipher.
    ///
    /// Overwrites any existing entry. On [`StrongboxError::PartialWriteFailed`]
    /// the stored triple may be inconsistent; retrying the whole put repairs it.
    pub fn put(
        &self,
        service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<(), StrongboxError> {
        validate_service(service)?;
        let cipher = self.write_cipher()?;
        self.locks
            .with_lock(service, || self.store(service, cipher, username, password))
    }

    /// Like [`put`](Self::put), with an explicitly named cipher.
    pub fn put_with_cipher(
        &self,
        service: &str,
        cipher_name: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<(), StrongboxError> {
        validate_service(service)?;
        let cipher = self.usable_cipher(cipher_name)?;
        self.locks
            .with_lock(service, || self.store(service, cipher, username, password))
    }

    /// Fetch and decrypt a credential.
    ///
    /// `Ok(None)` when either half is missing, even if a cipher tag is stored.
    /// A present entry whose tag names no registered cipher is an
    /// [`StrongboxError::UnknownCipher`] error, not an absence.
    pub fn get(&self, service: &str) -> Result<Option<Credential>, StrongboxError> {
        validate_service(service)?;
        match self.upgrade_policy {
            UpgradePolicy::Never => Ok(self.load(service)?.map(|loaded| loaded.credential)),
            UpgradePolicy::Automatic => {
                self.locks
                    .with_lock(service, || -> Result<_, StrongboxError> {
                        let Some(loaded) = self.load(service)? else {
                            return Ok(None);
                        };
                        self.upgrade(service, &loaded);
                        Ok(Some(loaded.credential))
                    })
            }
        }
    }

    /// Delete all three keys of a service. Removing an absent entry succeeds.
    pub fn remove(&self, service: &str) -> Result<(), StrongboxError> {
        validate_service(service)?;
        let keys = self.naming.keys_for(service);
        self.locks.with_lock(service, || -> Result<(), StrongboxError> {
            self.bridge.delete(&keys.all())?;
            debug!(service, "credential removed");
            Ok(())
        })
    }

    /// Distinct cipher tags stored anywhere in the backend.
    ///
    /// Best effort: a backend failure is logged and yields an empty set.
    pub fn list_used_cipher_names(&self) -> BTreeSet<String> {
        let entries = match self.bridge.read_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "cannot enumerate cipher tags");
                return BTreeSet::new();
            }
        };
        entries
            .iter()
            .filter(|(key, _)| self.naming.is_cipher_key(key))
            .map(|(_, tag)| String::from_utf8_lossy(tag).into_owned())
            .collect()
    }

    /// Services with a stored username key, sorted.
    pub fn list_services(&self) -> Result<Vec<String>, StrongboxError> {
        let entries = self.bridge.read_all()?;
        let services: BTreeSet<String> = entries
            .keys()
            .filter_map(|key| match self.naming.parse(key) {
                Some((service, KeyRole::Username)) => Some(service.to_string()),
                _ => None,
            })
            .collect();
        Ok(services.into_iter().collect())
    }

    /// Registered cipher by name, rejecting one the platform cannot run.
    pub(crate) fn usable_cipher(
        &self,
        name: &str,
    ) -> Result<&Arc<dyn CipherStrategy>, StrongboxError> {
        let cipher = self
            .registry
            .get(name)
            .ok_or_else(|| StrongboxError::Config(format!("cipher `{name}` is not registered")))?;
        if !cipher.descriptor().is_usable_on(self.platform_version) {
            return Err(StrongboxError::Config(format!(
                "cipher `{name}` requires platform version {}, running on {}",
                cipher.descriptor().min_platform_version,
                self.platform_version
            )));
        }
        Ok(cipher)
    }

    /// Read and decrypt without locking. The caller holds the service lock if needed.
    pub(crate) fn load(&self, service: &str) -> Result<Option<Loaded<'_>>, StrongboxError> {
        let keys = self.naming.keys_for(service);
        let mut values = self.bridge.read(&keys.all())?;

        let (Some(username), Some(password)) =
            (values.remove(&keys.username), values.remove(&keys.password))
        else {
            debug!(service, "no complete credential stored");
            return Ok(None);
        };

        let cipher_tag = match values.remove(&keys.cipher) {
            Some(tag) => String::from_utf8(tag).map_err(|e| StrongboxError::UnknownCipher {
                service: service.to_string(),
                tag: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })?,
            None => {
                debug!(service, tag = %self.legacy_cipher_tag, "untagged entry, assuming legacy cipher");
                self.legacy_cipher_tag.clone()
            }
        };

        let Some(cipher) = self.registry.get(&cipher_tag) else {
            return Err(StrongboxError::UnknownCipher {
                service: service.to_string(),
                tag: cipher_tag,
            });
        };

        let entry = EncryptedEntry {
            username,
            password,
            cipher_tag,
        };
        let credential = cipher.decrypt(service, &entry)?;
        Ok(Some(Loaded {
            cipher,
            entry,
            credential,
        }))
    }

    /// Re-store `loaded` under `to`.
    ///
    /// If the new triple is only partly written, the original ciphertexts are
    /// written back so the entry stays readable under its old cipher.
    pub(crate) fn replace(
        &self,
        service: &str,
        loaded: &Loaded<'_>,
        to: &Arc<dyn CipherStrategy>,
    ) -> Result<(), StrongboxError> {
        let result = self.store(
            service,
            to,
            loaded.credential.username(),
            loaded.credential.password(),
        );
        if let Err(StrongboxError::PartialWriteFailed { .. }) = &result {
            match self.write_entry(service, loaded.entry.clone()) {
                Ok(()) => debug!(service, cipher = loaded.cipher.name(), "original entry restored"),
                Err(e) => error!(
                    service,
                    cipher = loaded.cipher.name(),
                    error = %e,
                    "cannot restore original entry after failed rewrite"
                ),
            }
        }
        result
    }

    /// Encrypt with `cipher` and write the triple. The caller holds the service lock.
    pub(crate) fn store(
        &self,
        service: &str,
        cipher: &Arc<dyn CipherStrategy>,
        username: &[u8],
        password: &[u8],
    ) -> Result<(), StrongboxError> {
        let entry = cipher.encrypt(service, username, password)?;
        if entry.cipher_tag != cipher.name() {
            return Err(StrongboxError::Internal(format!(
                "cipher `{}` stamped entry with tag `{}`",
                cipher.name(),
                entry.cipher_tag
            )));
        }
        self.write_entry(service, entry)
    }

    fn write_entry(&self, service: &str, entry: EncryptedEntry) -> Result<(), StrongboxError> {
        let StorageKeys {
            username,
            password,
            cipher,
        } = self.naming.keys_for(service);
        let options = self.put_options();
        let tag = entry.cipher_tag;

        let outcomes = self.bridge.write_all(
            &[
                (username, entry.username),
                (password, entry.password),
                (cipher, tag.clone().into_bytes()),
            ],
            options,
        );

        let mut failed_keys = Vec::new();
        let mut first_error = None;
        for outcome in outcomes {
            if let Err(e) = outcome.result {
                failed_keys.push(outcome.key);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        if let Some(source) = first_error {
            return Err(StrongboxError::PartialWriteFailed {
                service: service.to_string(),
                failed_keys,
                source: Box::new(source),
            });
        }

        debug!(service, cipher = %tag, should_backup = options.should_backup, "credential stored");
        Ok(())
    }

    fn put_options(&self) -> PutOptions {
        let should_backup = match self.backup_policy {
            BackupPolicy::Always => true,
            BackupPolicy::WhenEndToEndEncrypted => {
                self.bridge.ensure_e2ee_capability() == E2eeCapability::Available
            }
        };
        PutOptions { should_backup }
    }

    /// Re-store under the write cipher if it outranks the stored one. Failures are logged only.
    fn upgrade(&self, service: &str, loaded: &Loaded<'_>) {
        let Ok(best) = self.write_cipher() else {
            return;
        };
        let current = loaded.cipher;
        if best.name() == current.name() || best.capability_score() <= current.capability_score() {
            return;
        }
        match self.replace(service, loaded, best) {
            Ok(()) => info!(
                service,
                from = current.name(),
                to = best.name(),
                "credential upgraded"
            ),
            Err(e) => warn!(
                service,
                from = current.name(),
                to = best.name(),
                error = %e,
                "credential upgrade failed"
            ),
        }
    }
}

/// A decrypted entry together with what it was read from.
pub(crate) struct Loaded<'a> {
    pub(crate) cipher: &'a Arc<dyn CipherStrategy>,
    pub(crate) entry: EncryptedEntry,
    pub(crate) credential: Credential,
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("registry", &self.registry)
            .field("bridge", &self.bridge)
            .field("platform_version", &self.platform_version)
            .finish_non_exhaustive()
    }
}

pub(crate) fn validate_service(service: &str) -> Result<(), StrongboxError> {
    if service.is_empty() {
        return Err(StrongboxError::InvalidService(
            "service name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_test_utils::{MemoryBackend, MockCipher};
    use tracing_test::traced_test;

    fn vault_with(
        backend: &Arc<MemoryBackend>,
        registry: CipherRegistry,
        config: VaultConfig,
    ) -> CredentialVault {
        CredentialVault::new(
            Arc::clone(backend) as Arc<dyn KeyValueBackend>,
            registry,
            &config,
        )
        .unwrap()
    }

    fn fb_only() -> CipherRegistry {
        CipherRegistry::new().with(MockCipher::new("FB", 19)).unwrap()
    }

    #[test]
    fn empty_registry_rejected() {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let err =
            CredentialVault::new(backend, CipherRegistry::new(), &VaultConfig::default())
                .unwrap_err();
        assert!(matches!(err, StrongboxError::Config(_)));
    }

    #[test]
    fn empty_service_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        assert!(matches!(
            vault.put("", b"u", b"p"),
            Err(StrongboxError::InvalidService(_))
        ));
        assert!(matches!(vault.get(""), Err(StrongboxError::InvalidService(_))));
        assert!(matches!(vault.remove(""), Err(StrongboxError::InvalidService(_))));
    }

    #[test]
    fn no_usable_cipher_on_old_platform() {
        let backend = Arc::new(MemoryBackend::new());
        let config = VaultConfig {
            platform_version: 18,
            ..VaultConfig::default()
        };
        let vault = vault_with(&backend, fb_only(), config);
        assert!(matches!(
            vault.put("mail", b"u", b"p"),
            Err(StrongboxError::NoUsableCipher { platform_version: 18 })
        ));
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn put_writes_three_keys() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        vault.put("mail", b"alice", b"pw").unwrap();
        assert_eq!(backend.keys(), ["mail:c", "mail:p", "mail:u"]);
        assert_eq!(backend.raw("mail:c"), Some(b"FB".to_vec()));
    }

    #[test]
    fn put_with_unregistered_cipher_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        assert!(matches!(
            vault.put_with_cipher("mail", "NOPE", b"u", b"p"),
            Err(StrongboxError::Config(_))
        ));
    }

    #[test]
    fn put_with_cipher_above_platform_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let registry = fb_only().with(MockCipher::new("NEW", 40)).unwrap();
        let vault = vault_with(&backend, registry, VaultConfig::default());
        assert!(matches!(
            vault.put_with_cipher("mail", "NEW", b"u", b"p"),
            Err(StrongboxError::Config(_))
        ));
    }

    #[test]
    fn encryption_failure_writes_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let cipher = MockCipher::new("FB", 19);
        cipher.fail_encrypt(true);
        let registry = CipherRegistry::new().with(cipher).unwrap();
        let vault = vault_with(&backend, registry, VaultConfig::default());

        assert!(matches!(
            vault.put("mail", b"u", b"p"),
            Err(StrongboxError::EncryptionFailed { .. })
        ));
        assert!(backend.keys().is_empty());
    }

    #[test]
    fn non_utf8_tag_is_unknown_cipher() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        backend.insert_raw("mail:u", b"x");
        backend.insert_raw("mail:p", b"y");
        backend.insert_raw("mail:c", &[0xff, 0xfe]);
        assert!(matches!(
            vault.get("mail"),
            Err(StrongboxError::UnknownCipher { .. })
        ));
    }

    #[test]
    fn list_services_ignores_foreign_and_partial_keys() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        vault.put("mail", b"u", b"p").unwrap();
        vault.put("bank", b"u", b"p").unwrap();
        backend.insert_raw("unrelated", b"x");
        backend.insert_raw("orphan:c", b"FB");

        assert_eq!(vault.list_services().unwrap(), ["bank", "mail"]);
    }

    #[test]
    #[traced_test]
    fn enumeration_failure_is_logged_and_empty() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        vault.put("mail", b"u", b"p").unwrap();
        backend.fail_all(true);

        assert!(vault.list_used_cipher_names().is_empty());
        assert!(logs_contain("cannot enumerate cipher tags"));
    }

    #[test]
    #[traced_test]
    fn unregistered_legacy_cipher_is_warned() {
        let backend = Arc::new(MemoryBackend::new());
        let registry = CipherRegistry::new().with(MockCipher::new("BS", 28)).unwrap();
        let _vault = vault_with(&backend, registry, VaultConfig::default());
        assert!(logs_contain("legacy cipher is not registered"));
    }

    #[test]
    fn debug_lists_ciphers() {
        let backend = Arc::new(MemoryBackend::new());
        let vault = vault_with(&backend, fb_only(), VaultConfig::default());
        let debug = format!("{vault:?}");
        assert!(debug.contains("FB"));
        assert!(debug.contains("memory"));
    }
}

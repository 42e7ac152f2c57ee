// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM with a caller-supplied key.
//!
//! Each field is sealed separately with associated data naming the service
//! and the field, so ciphertexts cannot be moved between entries or swapped
//! between username and password.

use strongbox_core::{CipherDescriptor, CipherStrategy, Credential, EncryptedEntry, StrongboxError};
use zeroize::Zeroizing;

use super::{check_tag, decryption_failed, encryption_failed, field_aad};
use crate::crypto::{generate_random_key, open_envelope, seal_envelope};
use crate::naming::KeyRole;

pub const AES_GCM_CIPHER_NAME: &str = "AES_GCM";
pub const AES_GCM_MIN_PLATFORM: u32 = 23;

/// Tag of the oldest on-device format, assumed for untagged entries.
pub const LEGACY_CIPHER_NAME: &str = "FB";
pub const LEGACY_MIN_PLATFORM: u32 = 19;

pub struct AesGcmCipher {
    descriptor: CipherDescriptor,
    key: Zeroizing<[u8; 32]>,
}

impl AesGcmCipher {
    /// Build a strategy under an arbitrary descriptor.
    pub fn new(descriptor: CipherDescriptor, key: [u8; 32]) -> Self {
        Self {
            descriptor,
            key: Zeroizing::new(key),
        }
    }

    /// `AES_GCM`, usable from platform 23. `hardware_backed` should reflect
    /// where `key` actually lives.
    pub fn standard(key: [u8; 32], hardware_backed: bool) -> Self {
        Self::new(
            CipherDescriptor::new(AES_GCM_CIPHER_NAME, AES_GCM_MIN_PLATFORM)
                .with_hardware_backing(hardware_backed),
            key,
        )
    }

    /// The legacy `FB` format: same algorithm, lowest platform floor.
    pub fn legacy(key: [u8; 32]) -> Self {
        Self::new(
            CipherDescriptor::new(LEGACY_CIPHER_NAME, LEGACY_MIN_PLATFORM),
            key,
        )
    }

    /// [`standard`](Self::standard) with a fresh random software key.
    pub fn generate() -> Result<Self, StrongboxError> {
        let key = generate_random_key().map_err(|e| encryption_failed(AES_GCM_CIPHER_NAME, e))?;
        Ok(Self::standard(key, false))
    }
}

impl CipherStrategy for AesGcmCipher {
    fn descriptor(&self) -> &CipherDescriptor {
        &self.descriptor
    }

    fn encrypt(
        &self,
        service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<EncryptedEntry, StrongboxError> {
        let seal = |role: KeyRole, plaintext: &[u8]| {
            seal_envelope(&self.key, &field_aad(service, role), plaintext)
                .map_err(|e| encryption_failed(self.name(), e))
        };
        Ok(EncryptedEntry {
            username: seal(KeyRole::Username, username)?,
            password: seal(KeyRole::Password, password)?,
            cipher_tag: self.descriptor.name.clone(),
        })
    }

    fn decrypt(
        &self,
        service: &str,
        entry: &EncryptedEntry,
    ) -> Result<Credential, StrongboxError> {
        check_tag(self.name(), &entry.cipher_tag)?;
        let open = |role: KeyRole, envelope: &[u8]| {
            open_envelope(&self.key, &field_aad(service, role), envelope)
                .map_err(|e| decryption_failed(self.name(), e))
        };
        Ok(Credential::new(
            service,
            open(KeyRole::Username, &entry.username)?,
            open(KeyRole::Password, &entry.password)?,
        ))
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("descriptor", &self.descriptor)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_core::SecurityTier;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::standard([7u8; 32], true)
    }

    #[test]
    fn round_trip() {
        let cipher = cipher();
        let entry = cipher.encrypt("mail", b"alice", b"hunter2").unwrap();
        assert_eq!(entry.cipher_tag, "AES_GCM");
        assert_ne!(entry.password, b"hunter2");

        let cred = cipher.decrypt("mail", &entry).unwrap();
        assert_eq!(cred.username(), b"alice");
        assert_eq!(cred.password(), b"hunter2");
        assert_eq!(cred.service(), "mail");
    }

    #[test]
    fn empty_fields_round_trip() {
        let cipher = cipher();
        let entry = cipher.encrypt("mail", b"", b"").unwrap();
        let cred = cipher.decrypt("mail", &entry).unwrap();
        assert!(cred.username().is_empty());
        assert!(cred.password().is_empty());
    }

    #[test]
    fn entry_bound_to_service() {
        let cipher = cipher();
        let entry = cipher.encrypt("mail", b"alice", b"hunter2").unwrap();
        assert!(matches!(
            cipher.decrypt("bank", &entry),
            Err(StrongboxError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn swapped_fields_fail() {
        let cipher = cipher();
        let mut entry = cipher.encrypt("mail", b"alice", b"hunter2").unwrap();
        std::mem::swap(&mut entry.username, &mut entry.password);
        assert!(cipher.decrypt("mail", &entry).is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let entry = cipher().encrypt("mail", b"alice", b"pw").unwrap();
        let other = AesGcmCipher::standard([8u8; 32], true);
        assert!(other.decrypt("mail", &entry).is_err());
    }

    #[test]
    fn legacy_descriptor() {
        let legacy = AesGcmCipher::legacy([1u8; 32]);
        assert_eq!(legacy.name(), "FB");
        assert_eq!(legacy.capability_score(), 19);
        assert_eq!(legacy.security_tier(), SecurityTier::Software);
        assert_eq!(cipher().capability_score(), 123);
    }

    #[test]
    fn debug_redacts_key() {
        let debug = format!("{:?}", cipher());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("7, 7"));
    }

    #[test]
    fn generated_keys_differ() {
        let a = AesGcmCipher::generate().unwrap();
        let b = AesGcmCipher::generate().unwrap();
        let entry = a.encrypt("svc", b"u", b"p").unwrap();
        assert!(b.decrypt("svc", &entry).is_err());
    }
}

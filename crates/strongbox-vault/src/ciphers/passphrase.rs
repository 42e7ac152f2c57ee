// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM under an Argon2id key derived from a passphrase.
//!
//! Every entry gets a fresh salt, stored in front of each field:
//! `salt (16) || nonce (12) || ciphertext || tag (16)`. Both fields of one
//! entry share the salt, so a read costs a single derivation.

use secrecy::{ExposeSecret, SecretString};
use strongbox_config::model::KdfConfig;
use strongbox_core::{CipherDescriptor, CipherStrategy, Credential, EncryptedEntry, StrongboxError};
use zeroize::Zeroizing;

use super::{check_tag, decryption_failed, encryption_failed, field_aad};
use crate::crypto::{CryptoError, open_envelope, seal_envelope};
use crate::kdf::{SALT_LEN, derive_key, generate_salt};
use crate::naming::KeyRole;

pub const PASSPHRASE_CIPHER_NAME: &str = "ARGON2ID";
pub const PASSPHRASE_MIN_PLATFORM: u32 = 21;

pub struct PassphraseCipher {
    descriptor: CipherDescriptor,
    passphrase: SecretString,
    kdf: KdfConfig,
}

impl PassphraseCipher {
    pub fn new(passphrase: SecretString, kdf: KdfConfig) -> Self {
        Self {
            descriptor: CipherDescriptor::new(PASSPHRASE_CIPHER_NAME, PASSPHRASE_MIN_PLATFORM),
            passphrase,
            kdf,
        }
    }

    fn key(&self, salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
        derive_key(self.passphrase.expose_secret().as_bytes(), salt, &self.kdf)
    }
}

fn split_salt(field: &[u8]) -> Result<([u8; SALT_LEN], &[u8]), CryptoError> {
    if field.len() < SALT_LEN {
        return Err(CryptoError::Truncated(field.len()));
    }
    let (salt, envelope) = field.split_at(SALT_LEN);
    let mut out = [0u8; SALT_LEN];
    out.copy_from_slice(salt);
    Ok((out, envelope))
}

impl CipherStrategy for PassphraseCipher {
    fn descriptor(&self) -> &CipherDescriptor {
        &self.descriptor
    }

    fn encrypt(
        &self,
        service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<EncryptedEntry, StrongboxError> {
        let fail = |e| encryption_failed(self.name(), e);
        let salt = generate_salt().map_err(fail)?;
        let key = self.key(&salt).map_err(fail)?;

        let seal = |role: KeyRole, plaintext: &[u8]| -> Result<Vec<u8>, StrongboxError> {
            let envelope =
                seal_envelope(&key, &field_aad(service, role), plaintext).map_err(fail)?;
            let mut field = Vec::with_capacity(SALT_LEN + envelope.len());
            field.extend_from_slice(&salt);
            field.extend_from_slice(&envelope);
            Ok(field)
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
        let fail = |e| decryption_failed(self.name(), e);

        let (user_salt, user_envelope) = split_salt(&entry.username).map_err(fail)?;
        let (pass_salt, pass_envelope) = split_salt(&entry.password).map_err(fail)?;

        let user_key = self.key(&user_salt).map_err(fail)?;
        let username = open_envelope(&user_key, &field_aad(service, KeyRole::Username), user_envelope)
            .map_err(fail)?;

        let password = if pass_salt == user_salt {
            open_envelope(&user_key, &field_aad(service, KeyRole::Password), pass_envelope)
        } else {
            let pass_key = self.key(&pass_salt).map_err(fail)?;
            open_envelope(&pass_key, &field_aad(service, KeyRole::Password), pass_envelope)
        }
        .map_err(fail)?;

        Ok(Credential::new(service, username, password))
    }
}

impl std::fmt::Debug for PassphraseCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseCipher")
            .field("descriptor", &self.descriptor)
            .field("passphrase", &"[REDACTED]")
            .field("kdf", &self.kdf)
            .finish()
    }
}

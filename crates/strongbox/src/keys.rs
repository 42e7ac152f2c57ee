// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key for the AES-GCM ciphers, derived from the vault passphrase.
//!
//! The Argon2id salt and a key-check envelope live in the backend next to the
//! credentials. Neither key matches the credential naming scheme, so they
//! never show up as services or cipher tags.

use secrecy::{ExposeSecret, SecretString};
use strongbox_config::model::KdfConfig;
use strongbox_core::{KeyValueBackend, PutOptions, StrongboxError};
use strongbox_vault::crypto::{open_envelope, seal_envelope};
use strongbox_vault::kdf::{SALT_LEN, derive_key, generate_salt};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub const KDF_SALT_KEY: &str = "strongbox.kdf_salt";
pub const KEY_CHECK_KEY: &str = "strongbox.key_check";

const KEY_CHECK_PLAINTEXT: &[u8] = b"strongbox";

/// Derive the master key, creating salt and key check on first use.
///
/// A passphrase that does not open the stored key check is rejected here,
/// before any credential is touched.
pub async fn master_key(
    backend: &dyn KeyValueBackend,
    passphrase: &SecretString,
    kdf: &KdfConfig,
) -> Result<Zeroizing<[u8; 32]>, StrongboxError> {
    let stored = backend
        .get(&[KDF_SALT_KEY.to_string(), KEY_CHECK_KEY.to_string()])
        .await?;

    let Some(salt_bytes) = stored.get(KDF_SALT_KEY) else {
        return initialize(backend, passphrase, kdf).await;
    };
    let salt: [u8; SALT_LEN] = salt_bytes
        .as_slice()
        .try_into()
        .map_err(|_| StrongboxError::Internal("stored key derivation salt is corrupt".into()))?;

    let key = derive(passphrase, &salt, kdf)?;
    match stored.get(KEY_CHECK_KEY) {
        Some(check) => {
            if open_envelope(&key, KEY_CHECK_KEY.as_bytes(), check).is_err() {
                return Err(StrongboxError::Config(
                    "wrong passphrase for this vault".to_string(),
                ));
            }
        }
        None => restore_key_check(backend, &key).await?,
    }
    Ok(key)
}

/// Recreate a key check lost by an interrupted first run.
///
/// Only safe while no credential exists: otherwise the passphrase could not
/// be verified against anything.
async fn restore_key_check(
    backend: &dyn KeyValueBackend,
    key: &[u8; 32],
) -> Result<(), StrongboxError> {
    let entries = backend.get_all().await?;
    if entries.keys().any(|k| k.as_str() != KDF_SALT_KEY) {
        return Err(StrongboxError::Internal(
            "key check is missing from a vault holding credentials".to_string(),
        ));
    }
    write_key_check(backend, key).await?;
    warn!("restored missing key check");
    Ok(())
}

async fn write_key_check(
    backend: &dyn KeyValueBackend,
    key: &[u8; 32],
) -> Result<(), StrongboxError> {
    let check = seal_envelope(key, KEY_CHECK_KEY.as_bytes(), KEY_CHECK_PLAINTEXT)
        .map_err(|e| StrongboxError::Internal(format!("cannot seal key check: {e}")))?;
    backend
        .put(KEY_CHECK_KEY, &check, PutOptions { should_backup: true })
        .await?;
    Ok(())
}

async fn initialize(
    backend: &dyn KeyValueBackend,
    passphrase: &SecretString,
    kdf: &KdfConfig,
) -> Result<Zeroizing<[u8; 32]>, StrongboxError> {
    let salt = generate_salt()
        .map_err(|e| StrongboxError::Internal(format!("cannot generate salt: {e}")))?;
    let key = derive(passphrase, &salt, kdf)?;
    backend
        .put(KDF_SALT_KEY, &salt, PutOptions { should_backup: true })
        .await?;
    write_key_check(backend, &key).await?;
    info!("initialized master key material");
    Ok(key)
}

fn derive(
    passphrase: &SecretString,
    salt: &[u8; SALT_LEN],
    kdf: &KdfConfig,
) -> Result<Zeroizing<[u8; 32]>, StrongboxError> {
    derive_key(passphrase.expose_secret().as_bytes(), salt, kdf)
        .map_err(|e| StrongboxError::Internal(format!("master key derivation failed: {e}")))
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! Derives a 32-byte key (Argon2id, version 0x13) with the cost parameters
//! from [`KdfConfig`].

use strongbox_config::model::KdfConfig;
use zeroize::Zeroizing;

use crate::crypto::{CryptoError, fill_random};

pub const SALT_LEN: usize = 16;

/// Derive a 32-byte key from `passphrase`. Zeroed on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    config: &KdfConfig,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let params = argon2::Params::new(
        config.memory_cost,
        config.iterations,
        config.parallelism,
        Some(32),
    )
    .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    Ok(output)
}

pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest values validation accepts; keeps the tests fast.
    fn cheap() -> KdfConfig {
        KdfConfig {
            memory_cost: 32768,
            iterations: 2,
            parallelism: 1,
        }
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let key1 = derive_key(b"test passphrase", &[1u8; SALT_LEN], &cheap()).unwrap();
        let key2 = derive_key(b"test passphrase", &[1u8; SALT_LEN], &cheap()).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn passphrase_changes_output() {
        let key1 = derive_key(b"passphrase one", &[2u8; SALT_LEN], &cheap()).unwrap();
        let key2 = derive_key(b"passphrase two", &[2u8; SALT_LEN], &cheap()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn salt_changes_output() {
        let key1 = derive_key(b"same", &[1u8; SALT_LEN], &cheap()).unwrap();
        let key2 = derive_key(b"same", &[2u8; SALT_LEN], &cheap()).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = KdfConfig {
            iterations: 0,
            ..cheap()
        };
        assert!(matches!(
            derive_key(b"x", &[0u8; SALT_LEN], &config),
            Err(CryptoError::Kdf(_))
        ));
    }
}

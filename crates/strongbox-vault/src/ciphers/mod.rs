// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in cipher strategies.

pub mod aes_gcm;
pub mod passphrase;
pub mod passthrough;

pub use aes_gcm::AesGcmCipher;
pub use passphrase::PassphraseCipher;
pub use passthrough::PassthroughCipher;

use strongbox_core::StrongboxError;

use crate::crypto::CryptoError;
use crate::naming::KeyRole;

/// Associated data binding a ciphertext to its service and field, so a
/// ciphertext copied to another service or swapped between username and
/// password fails authentication.
pub(crate) fn field_aad(service: &str, role: KeyRole) -> Vec<u8> {
    let role = match role {
        KeyRole::Username => b'u',
        KeyRole::Password => b'p',
        KeyRole::Cipher => b'c',
    };
    let mut aad = Vec::with_capacity(service.len() + 2);
    aad.extend_from_slice(service.as_bytes());
    aad.push(0);
    aad.push(role);
    aad
}

pub(crate) fn encryption_failed(cipher: &str, err: CryptoError) -> StrongboxError {
    StrongboxError::EncryptionFailed {
        cipher: cipher.to_string(),
        reason: err.to_string(),
    }
}

pub(crate) fn decryption_failed(cipher: &str, err: CryptoError) -> StrongboxError {
    StrongboxError::DecryptionFailed {
        cipher: cipher.to_string(),
        reason: err.to_string(),
    }
}

/// Reject entries tagged for another strategy.
pub(crate) fn check_tag(cipher: &str, tag: &str) -> Result<(), StrongboxError> {
    if cipher == tag {
        Ok(())
    } else {
        Err(StrongboxError::DecryptionFailed {
            cipher: cipher.to_string(),
            reason: format!("entry is tagged `{tag}`"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aad_differs_per_service_and_role() {
        assert_ne!(
            field_aad("mail", KeyRole::Username),
            field_aad("mail", KeyRole::Password)
        );
        assert_ne!(
            field_aad("mail", KeyRole::Password),
            field_aad("bank", KeyRole::Password)
        );
        assert_eq!(field_aad("a", KeyRole::Password), b"a\0p");
    }
}

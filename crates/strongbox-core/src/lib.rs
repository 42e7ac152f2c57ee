// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strongbox credential vault.
//!
//! This crate provides the error taxonomy, the domain types, and the two trait
//! seams every other crate builds on: [`CipherStrategy`] for interchangeable
//! encryption algorithms and [`KeyValueBackend`] for the asynchronous store the
//! vault persists into.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StrongboxError;
pub use traits::{CipherStrategy, KeyValueBackend};
pub use types::{
    CipherDescriptor, Credential, E2eeCapability, EncryptedEntry, PutOptions, SecurityTier,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_cipher(_: &dyn CipherStrategy) {}
        fn _assert_backend(_: &dyn KeyValueBackend) {}
    }

    #[test]
    fn cipher_errors_name_the_cipher() {
        let enc = StrongboxError::EncryptionFailed {
            cipher: "AES_GCM".into(),
            reason: "nonce exhausted".into(),
        };
        assert_eq!(
            enc.to_string(),
            "encryption with cipher `AES_GCM` failed: nonce exhausted"
        );

        let dec = StrongboxError::DecryptionFailed {
            cipher: "FB".into(),
            reason: "bad tag".into(),
        };
        assert_eq!(dec.to_string(), "decryption with cipher `FB` failed: bad tag");
    }

    #[test]
    fn vault_setup_errors_display() {
        let none = StrongboxError::NoUsableCipher {
            platform_version: 18,
        };
        assert_eq!(
            none.to_string(),
            "no registered cipher is usable on platform version 18"
        );
        assert_eq!(
            StrongboxError::InvalidService("empty".into()).to_string(),
            "invalid service name: empty"
        );
        assert!(!none.is_backend_failure());
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity cipher for backends that already encrypt at rest and in transit.
//!
//! Only register this when the backend reports end-to-end encryption; the
//! vault itself adds no confidentiality.

use strongbox_core::{CipherDescriptor, CipherStrategy, Credential, EncryptedEntry, StrongboxError};

use super::check_tag;

pub const PASSTHROUGH_CIPHER_NAME: &str = "BS";
pub const PASSTHROUGH_MIN_PLATFORM: u32 = 28;

#[derive(Debug)]
pub struct PassthroughCipher {
    descriptor: CipherDescriptor,
}

impl PassthroughCipher {
    pub fn new() -> Self {
        Self {
            descriptor: CipherDescriptor::new(PASSTHROUGH_CIPHER_NAME, PASSTHROUGH_MIN_PLATFORM),
        }
    }
}

impl Default for PassthroughCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl CipherStrategy for PassthroughCipher {
    fn descriptor(&self) -> &CipherDescriptor {
        &self.descriptor
    }

    fn encrypt(
        &self,
        _service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<EncryptedEntry, StrongboxError> {
        Ok(EncryptedEntry {
            username: username.to_vec(),
            password: password.to_vec(),
            cipher_tag: self.descriptor.name.clone(),
        })
    }

    fn decrypt(
        &self,
        service: &str,
        entry: &EncryptedEntry,
    ) -> Result<Credential, StrongboxError> {
        check_tag(self.name(), &entry.cipher_tag)?;
        Ok(Credential::new(
            service,
            entry.username.clone(),
            entry.password.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_core::SecurityTier;

    #[test]
    fn descriptor_matches_block_store() {
        let cipher = PassthroughCipher::new();
        assert_eq!(cipher.name(), "BS");
        assert_eq!(cipher.capability_score(), 28);
        assert_eq!(cipher.security_tier(), SecurityTier::Software);
    }

    #[test]
    fn stores_plaintext_and_stamps_tag() {
        let cipher = PassthroughCipher::new();
        let entry = cipher.encrypt("svc", b"alice", b"pw").unwrap();
        assert_eq!(entry.username, b"alice");
        assert_eq!(entry.password, b"pw");
        assert_eq!(entry.cipher_tag, "BS");

        let cred = cipher.decrypt("svc", &entry).unwrap();
        assert_eq!(cred.username(), b"alice");
        assert_eq!(cred.password(), b"pw");
    }

    #[test]
    fn foreign_tag_rejected() {
        let cipher = PassthroughCipher::new();
        let entry = EncryptedEntry {
            username: b"u".to_vec(),
            password: b"p".to_vec(),
            cipher_tag: "FB".into(),
        };
        assert!(matches!(
            cipher.decrypt("svc", &entry),
            Err(StrongboxError::DecryptionFailed { .. })
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock cipher strategy with an arbitrary descriptor.
//!
//! "Encryption" prefixes the plaintext with the cipher name and reverses it,
//! which is enough to prove which strategy produced an entry and that
//! decryption was dispatched to the same one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use strongbox_core::{CipherDescriptor, CipherStrategy, Credential, EncryptedEntry, StrongboxError};

pub struct MockCipher {
    descriptor: CipherDescriptor,
    fail_encrypt: AtomicBool,
    fail_decrypt: AtomicBool,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl MockCipher {
    /// Software-only cipher usable from `min_platform_version`.
    pub fn new(name: &str, min_platform_version: u32) -> Self {
        Self::with_descriptor(CipherDescriptor::new(name, min_platform_version))
    }

    pub fn with_descriptor(descriptor: CipherDescriptor) -> Self {
        Self {
            descriptor,
            fail_encrypt: AtomicBool::new(false),
            fail_decrypt: AtomicBool::new(false),
            encrypt_calls: AtomicUsize::new(0),
            decrypt_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_encrypt(&self, enabled: bool) {
        self.fail_encrypt.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_decrypt(&self, enabled: bool) {
        self.fail_decrypt.store(enabled, Ordering::SeqCst);
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    /// The bytes this cipher stores for `plaintext`.
    pub fn seal(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut out = self.descriptor.name.as_bytes().to_vec();
        out.push(b'|');
        out.extend(plaintext.iter().rev());
        out
    }

    fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>, StrongboxError> {
        let prefix_len = self.descriptor.name.len() + 1;
        let prefix_ok = sealed.len() >= prefix_len
            && sealed.starts_with(self.descriptor.name.as_bytes())
            && sealed[prefix_len - 1] == b'|';
        if !prefix_ok {
            return Err(self.decrypt_error("entry was not produced by this cipher"));
        }
        Ok(sealed[prefix_len..].iter().rev().copied().collect())
    }

    fn decrypt_error(&self, reason: &str) -> StrongboxError {
        StrongboxError::DecryptionFailed {
            cipher: self.descriptor.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl CipherStrategy for MockCipher {
    fn descriptor(&self) -> &CipherDescriptor {
        &self.descriptor
    }

    fn encrypt(
        &self,
        _service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<EncryptedEntry, StrongboxError> {
        self.encrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encrypt.load(Ordering::SeqCst) {
            return Err(StrongboxError::EncryptionFailed {
                cipher: self.descriptor.name.clone(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(EncryptedEntry {
            username: self.seal(username),
            password: self.seal(password),
            cipher_tag: self.descriptor.name.clone(),
        })
    }

    fn decrypt(
        &self,
        service: &str,
        entry: &EncryptedEntry,
    ) -> Result<Credential, StrongboxError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_decrypt.load(Ordering::SeqCst) {
            return Err(self.decrypt_error("injected failure"));
        }
        Ok(Credential::new(
            service,
            self.unseal(&entry.username)?,
            self.unseal(&entry.password)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversible_and_tagged() {
        let cipher = MockCipher::new("X", 19);
        let entry = cipher.encrypt("svc", b"alice", b"pw").unwrap();
        assert_eq!(entry.cipher_tag, "X");
        assert_eq!(entry.username, b"X|ecila");

        let cred = cipher.decrypt("svc", &entry).unwrap();
        assert_eq!(cred.username(), b"alice");
        assert_eq!(cred.password(), b"pw");
        assert_eq!(cipher.encrypt_calls(), 1);
        assert_eq!(cipher.decrypt_calls(), 1);
    }

    #[test]
    fn rejects_foreign_entries() {
        let x = MockCipher::new("X", 19);
        let y = MockCipher::new("Y", 19);
        let entry = y.encrypt("svc", b"u", b"p").unwrap();
        assert!(matches!(
            x.decrypt("svc", &entry),
            Err(StrongboxError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn injected_encrypt_failure() {
        let cipher = MockCipher::new("X", 19);
        cipher.fail_encrypt(true);
        assert!(matches!(
            cipher.encrypt("svc", b"u", b"p"),
            Err(StrongboxError::EncryptionFailed { .. })
        ));
    }
}

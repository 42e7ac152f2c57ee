// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cipher strategy trait: one named algorithm for sealing a credential.

use crate::error::StrongboxError;
use crate::types::{CipherDescriptor, Credential, EncryptedEntry, SecurityTier};

/// A named, capability-scored algorithm that turns a username/password pair
/// into an [`EncryptedEntry`] and back.
///
/// Implementations must stamp their own [`name`](CipherStrategy::name) as the
/// entry's cipher tag. Ciphertext may differ between calls (random nonces),
/// so decryption must never rely on byte-for-byte repeatability.
pub trait CipherStrategy: Send + Sync + 'static {
    /// Static description of this strategy.
    fn descriptor(&self) -> &CipherDescriptor;

    /// Encrypts both halves of a credential for `service`.
    fn encrypt(
        &self,
        service: &str,
        username: &[u8],
        password: &[u8],
    ) -> Result<EncryptedEntry, StrongboxError>;

    /// Decrypts an entry whose tag names this strategy.
    ///
    /// Calling this with an entry tagged for another strategy is a caller
    /// error; implementations may reject it with
    /// [`StrongboxError::DecryptionFailed`].
    fn decrypt(
        &self,
        service: &str,
        entry: &EncryptedEntry,
    ) -> Result<Credential, StrongboxError>;

    /// The stable name persisted as the cipher tag.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn capability_score(&self) -> u32 {
        self.descriptor().capability_score()
    }

    fn security_tier(&self) -> SecurityTier {
        self.descriptor().security_tier()
    }
}

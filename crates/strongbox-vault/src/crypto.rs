// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM sealing with associated data.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.
//! Sealed fields are stored as a self-contained envelope: `nonce || ciphertext || tag`.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Low-level failures from the primitives in this module and [`crate::kdf`].
///
/// Cipher strategies translate these into
/// [`StrongboxError::EncryptionFailed`](strongbox_core::StrongboxError::EncryptionFailed)
/// or [`StrongboxError::DecryptionFailed`](strongbox_core::StrongboxError::DecryptionFailed)
/// with their own name attached.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("failed to create AES-256-GCM key")]
    InvalidKey,
    #[error("system random source unavailable")]
    Rng,
    #[error("AES-256-GCM encryption failed")]
    Seal,
    #[error("authentication failed: wrong key, wrong context or corrupted data")]
    Open,
    #[error("envelope too short: {0} bytes")]
    Truncated(usize),
    #[error("key derivation failed: {0}")]
    Kdf(String),
}

fn less_safe_key(key: &[u8; 32]) -> Result<LessSafeKey, CryptoError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key).map_err(|_| CryptoError::InvalidKey)?;
    Ok(LessSafeKey::new(unbound))
}

pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    SystemRandom::new().fill(buf).map_err(|_| CryptoError::Rng)
}

/// Encrypt `plaintext` bound to `aad`.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    key: &[u8; 32],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), CryptoError> {
    let key = less_safe_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| CryptoError::Seal)?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt a ciphertext produced by [`seal`] with the same key and `aad`.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let key = less_safe_key(key)?;
    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| CryptoError::Open)?;

    Ok(plaintext.to_vec())
}

/// [`seal`] and prefix the nonce.
pub fn seal_envelope(key: &[u8; 32], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (ciphertext, nonce) = seal(key, aad, plaintext)?;
    let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Inverse of [`seal_envelope`].
pub fn open_envelope(key: &[u8; 32], aad: &[u8], envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if envelope.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Truncated(envelope.len()));
    }
    let (nonce, ciphertext) = envelope.split_at(NONCE_LEN);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);
    open(key, &nonce_bytes, aad, ciphertext)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; 32], CryptoError> {
    let mut key = [0u8; 32];
    fill_random(&mut key)?;
    Ok(key)
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential vault for the Strongbox workspace.
//!
//! Credentials are encrypted by interchangeable [`CipherStrategy`] instances
//! held in a [`CipherRegistry`], and persisted through an asynchronous
//! [`KeyValueBackend`] wrapped by the blocking [`AsyncBridge`]. Every entry
//! carries the name of the cipher that produced it, so strategies can be
//! added, ranked and retired without changing the stored format.
//!
//! [`CipherStrategy`]: strongbox_core::CipherStrategy
//! [`KeyValueBackend`]: strongbox_core::KeyValueBackend

pub mod bridge;
pub mod ciphers;
pub mod crypto;
pub mod kdf;
mod locks;
pub mod migration;
pub mod naming;
pub mod prompt;
pub mod registry;
pub mod vault;

pub use bridge::{AsyncBridge, WriteOutcome};
pub use ciphers::{AesGcmCipher, PassphraseCipher, PassthroughCipher};
pub use migration::{MigrationOutcome, MigrationReport};
pub use naming::{KeyNamingScheme, KeyRole, StorageKeys, SuffixNaming};
pub use registry::CipherRegistry;
pub use vault::CredentialVault;

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by cipher strategies, backends, and the vault.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use zeroize::Zeroizing;

/// Security tier reported by a cipher strategy. Ordered weakest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityTier {
    Software,
    Hardware,
    Biometry,
}

/// Static description of a cipher strategy.
///
/// The capability score is derived from the other fields and cannot be set
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherDescriptor {
    /// Stable name, persisted as the cipher tag next to every entry.
    pub name: String,
    /// Lowest platform version the strategy can run on.
    pub min_platform_version: u32,
    /// Whether keys live in secure hardware.
    pub supports_hardware_backing: bool,
    /// Whether key access is gated by biometric authentication.
    pub supports_biometry: bool,
}

impl CipherDescriptor {
    pub fn new(name: impl Into<String>, min_platform_version: u32) -> Self {
        Self {
            name: name.into(),
            min_platform_version,
            supports_hardware_backing: false,
            supports_biometry: false,
        }
    }

    pub fn with_hardware_backing(mut self, supported: bool) -> Self {
        self.supports_hardware_backing = supported;
        self
    }

    pub fn with_biometry(mut self, supported: bool) -> Self {
        self.supports_biometry = supported;
        self
    }

    /// `1000 * biometry + 100 * hardware + min_platform_version`.
    ///
    /// Higher means stronger. Used only to rank strategies for writes.
    pub fn capability_score(&self) -> u32 {
        1000 * u32::from(self.supports_biometry)
            + 100 * u32::from(self.supports_hardware_backing)
            + self.min_platform_version
    }

    pub fn security_tier(&self) -> SecurityTier {
        if self.supports_biometry {
            SecurityTier::Biometry
        } else if self.supports_hardware_backing {
            SecurityTier::Hardware
        } else {
            SecurityTier::Software
        }
    }

    /// Whether the strategy may be selected on `platform_version`.
    pub fn is_usable_on(&self, platform_version: u32) -> bool {
        self.min_platform_version <= platform_version
    }
}

/// A decrypted credential. Only lives in memory; the buffers are zeroed on drop.
///
/// Debug output intentionally omits the password.
pub struct Credential {
    service: String,
    username: Zeroizing<Vec<u8>>,
    password: Zeroizing<Vec<u8>>,
}

impl Credential {
    pub fn new(service: impl Into<String>, username: Vec<u8>, password: Vec<u8>) -> Self {
        Self {
            service: service.into(),
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn username(&self) -> &[u8] {
        &self.username
    }

    pub fn password(&self) -> &[u8] {
        &self.password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("service", &self.service)
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The persisted form of a credential: two ciphertexts and the tag of the
/// strategy that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEntry {
    pub username: Vec<u8>,
    pub password: Vec<u8>,
    pub cipher_tag: String,
}

/// Per-write options passed to a [`KeyValueBackend`](crate::KeyValueBackend).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Replicate / back up this entry off-device.
    pub should_backup: bool,
}

/// Cached answer to "does the backend encrypt end-to-end when replicating?".
///
/// `Unknown` means the backend has not answered yet (or the last query failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum E2eeCapability {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl From<bool> for E2eeCapability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

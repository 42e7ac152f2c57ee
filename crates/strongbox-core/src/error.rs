// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Strongbox credential vault.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Strongbox traits and vault operations.
///
/// A missing credential is never an error: lookups return `Ok(None)` for that
/// case so callers can tell "no data yet" apart from "data present but
/// unreadable" ([`StrongboxError::UnknownCipher`]).
#[derive(Debug, Error)]
pub enum StrongboxError {
    /// A backend call did not complete within the bridge timeout.
    #[error("backend {operation} timed out after {duration:?}")]
    BackendTimeout {
        operation: &'static str,
        duration: Duration,
    },

    /// The key-value backend reported a failure.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A cipher strategy failed to encrypt a credential.
    #[error("encryption with cipher `{cipher}` failed: {reason}")]
    EncryptionFailed { cipher: String, reason: String },

    /// A cipher strategy failed to decrypt a stored entry.
    #[error("decryption with cipher `{cipher}` failed: {reason}")]
    DecryptionFailed { cipher: String, reason: String },

    /// The stored cipher tag does not name any registered strategy.
    #[error("credential for service `{service}` uses unknown cipher `{tag}`")]
    UnknownCipher { service: String, tag: String },

    /// At least one of the username/password/cipher writes failed.
    ///
    /// Writes that did succeed are not rolled back.
    #[error("write for service `{service}` failed for keys {failed_keys:?}: {source}")]
    PartialWriteFailed {
        service: String,
        failed_keys: Vec<String>,
        #[source]
        source: Box<StrongboxError>,
    },

    /// No registered cipher strategy can run on the current platform.
    #[error("no registered cipher is usable on platform version {platform_version}")]
    NoUsableCipher { platform_version: u32 },

    /// The service name cannot be mapped to storage keys.
    #[error("invalid service name: {0}")]
    InvalidService(String),

    /// Configuration errors (invalid TOML, bad values, duplicate cipher names).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Build a [`StrongboxError::Backend`] without an underlying source.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Build a [`StrongboxError::Backend`] wrapping an underlying error.
    pub fn backend_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for errors raised by the backend or the bridge around it.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::BackendTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_operation() {
        let err = StrongboxError::BackendTimeout {
            operation: "get",
            duration: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "backend get timed out after 250ms");
        assert!(err.is_backend_failure());
    }

    #[test]
    fn partial_write_exposes_cause() {
        let err = StrongboxError::PartialWriteFailed {
            service: "mail".into(),
            failed_keys: vec!["mail:p".into()],
            source: Box::new(StrongboxError::backend("disk full")),
        };
        let source = std::error::Error::source(&err).expect("cause should be chained");
        assert_eq!(source.to_string(), "backend error: disk full");
        assert!(!err.is_backend_failure());
    }

    #[test]
    fn backend_with_source_keeps_source() {
        let err = StrongboxError::backend_with_source("io", std::io::Error::other("boom"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unknown_cipher_is_distinct_from_decryption_failure() {
        let unknown = StrongboxError::UnknownCipher {
            service: "svc".into(),
            tag: "XYZ".into(),
        };
        assert!(matches!(unknown, StrongboxError::UnknownCipher { .. }));
        assert!(unknown.to_string().contains("XYZ"));
    }
}

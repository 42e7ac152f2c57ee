// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from service names to backend storage keys.
//!
//! The key scheme is the only index into the backend, so it must stay stable
//! across releases: changing a suffix orphans every stored credential.

/// Which half of an entry a storage key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Username,
    Password,
    Cipher,
}

/// The three backend keys of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub username: String,
    pub password: String,
    pub cipher: String,
}

impl StorageKeys {
    /// All three keys, username first.
    pub fn all(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.password.clone(),
            self.cipher.clone(),
        ]
    }
}

/// Deterministic, injective mapping `service -> StorageKeys`.
///
/// [`parse`](KeyNamingScheme::parse) must invert [`keys_for`](KeyNamingScheme::keys_for)
/// exactly for every key the scheme produces: enumerating cipher tags across
/// the whole store relies on it.
pub trait KeyNamingScheme: Send + Sync + 'static {
    fn keys_for(&self, service: &str) -> StorageKeys;

    /// Split a key into its service and role, or `None` for foreign keys.
    fn parse<'k>(&self, key: &'k str) -> Option<(&'k str, KeyRole)>;

    fn is_cipher_key(&self, key: &str) -> bool {
        matches!(self.parse(key), Some((_, KeyRole::Cipher)))
    }
}

/// `service:u`, `service:p`, `service:c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixNaming;

const USERNAME_SUFFIX: &str = ":u";
const PASSWORD_SUFFIX: &str = ":p";
const CIPHER_SUFFIX: &str = ":c";

impl KeyNamingScheme for SuffixNaming {
    fn keys_for(&self, service: &str) -> StorageKeys {
        StorageKeys {
            username: format!("{service}{USERNAME_SUFFIX}"),
            password: format!("{service}{PASSWORD_SUFFIX}"),
            cipher: format!("{service}{CIPHER_SUFFIX}"),
        }
    }

    fn parse<'k>(&self, key: &'k str) -> Option<(&'k str, KeyRole)> {
        [
            (USERNAME_SUFFIX, KeyRole::Username),
            (PASSWORD_SUFFIX, KeyRole::Password),
            (CIPHER_SUFFIX, KeyRole::Cipher),
        ]
        .into_iter()
        .find_map(|(suffix, role)| key.strip_suffix(suffix).map(|service| (service, role)))
        .filter(|(service, _)| !service.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_suffixes() {
        let keys = SuffixNaming.keys_for("mail");
        assert_eq!(keys.username, "mail:u");
        assert_eq!(keys.password, "mail:p");
        assert_eq!(keys.cipher, "mail:c");
    }

    #[test]
    fn cipher_key_classification() {
        let naming = SuffixNaming;
        assert!(naming.is_cipher_key("mail:c"));
        assert!(!naming.is_cipher_key("mail:u"));
        assert!(!naming.is_cipher_key("mail:p"));
        assert!(!naming.is_cipher_key("unrelated"));
    }

    #[test]
    fn service_containing_suffix_text() {
        let naming = SuffixNaming;
        let keys = naming.keys_for("a:c");
        assert_eq!(naming.parse(&keys.username), Some(("a:c", KeyRole::Username)));
        assert!(!naming.is_cipher_key(&keys.username));
        assert!(naming.is_cipher_key(&keys.cipher));
    }

    #[test]
    fn bare_suffix_is_foreign() {
        assert_eq!(SuffixNaming.parse(":c"), None);
    }

    proptest! {
        #[test]
        fn distinct_services_share_no_key(a in "[a-z:.]{1,12}", b in "[a-z:.]{1,12}") {
            prop_assume!(a != b);
            let naming = SuffixNaming;
            let ka = naming.keys_for(&a).all();
            let kb = naming.keys_for(&b).all();
            for key in &ka {
                prop_assert!(!kb.contains(key));
            }
        }

        #[test]
        fn parse_inverts_keys_for(service in "[ -~]{1,24}") {
            let naming = SuffixNaming;
            let keys = naming.keys_for(&service);
            prop_assert_eq!(naming.parse(&keys.username), Some((service.as_str(), KeyRole::Username)));
            prop_assert_eq!(naming.parse(&keys.password), Some((service.as_str(), KeyRole::Password)));
            prop_assert_eq!(naming.parse(&keys.cipher), Some((service.as_str(), KeyRole::Cipher)));
            prop_assert!(naming.is_cipher_key(&keys.cipher));
            prop_assert!(!naming.is_cipher_key(&keys.username));
            prop_assert!(!naming.is_cipher_key(&keys.password));
        }
    }
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via environment variable or TTY prompt.

use secrecy::SecretString;
use strongbox_core::StrongboxError;

/// Passphrase for the [`PassphraseCipher`](crate::ciphers::PassphraseCipher).
pub const PASSPHRASE_ENV_VAR: &str = "STRONGBOX_PASSPHRASE";

/// Credential password for non-interactive `put`.
pub const SECRET_ENV_VAR: &str = "STRONGBOX_SECRET";

/// Read a secret from `env_var`, or prompt for it on an interactive terminal.
///
/// Empty values are rejected from both sources.
pub fn read_secret(env_var: &str, prompt: &str) -> Result<SecretString, StrongboxError> {
    if let Ok(value) = std::env::var(env_var)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("{prompt}");
        let value = rpassword::read_password()
            .map_err(|e| StrongboxError::Internal(format!("failed to read secret: {e}")))?;
        if value.is_empty() {
            return Err(StrongboxError::Config("empty secret not allowed".to_string()));
        }
        return Ok(SecretString::from(value));
    }

    Err(StrongboxError::Config(format!(
        "no secret provided. Set {env_var} or run interactively."
    )))
}

pub fn get_passphrase() -> Result<SecretString, StrongboxError> {
    read_secret(PASSPHRASE_ENV_VAR, "Vault passphrase: ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn passphrase_from_env_var() {
        // SAFETY: test-only env mutation, serialized with other env tests.
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "test-passphrase") };
        let result = get_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "test-passphrase");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_rejected() {
        unsafe { std::env::set_var(SECRET_ENV_VAR, "") };
        // stdin is not a terminal under the test harness.
        let result = read_secret(SECRET_ENV_VAR, "Password: ");
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };

        assert!(result.is_err());
    }
}

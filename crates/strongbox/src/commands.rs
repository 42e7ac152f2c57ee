// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::sync::Arc;

use secrecy::ExposeSecret;
use strongbox_config::StrongboxConfig;
use strongbox_core::{KeyValueBackend, StrongboxError};
use strongbox_storage::SqliteBackend;
use strongbox_vault::prompt::{SECRET_ENV_VAR, get_passphrase, read_secret};
use strongbox_vault::{
    AesGcmCipher, CipherRegistry, CredentialVault, MigrationOutcome, PassphraseCipher,
    PassthroughCipher,
};
use tracing::debug;

use crate::Commands;
use crate::keys::master_key;

pub fn run(command: Commands, config: &StrongboxConfig) -> Result<(), StrongboxError> {
    let vault = open_vault(config)?;

    match command {
        Commands::Put {
            service,
            username,
            cipher,
        } => {
            let password = read_secret(SECRET_ENV_VAR, &format!("Password for {service}: "))?;
            let password = password.expose_secret().as_bytes();
            match cipher {
                Some(name) => vault.put_with_cipher(&service, &name, username.as_bytes(), password)?,
                None => vault.put(&service, username.as_bytes(), password)?,
            }
            println!("stored {service}");
        }
        Commands::Get {
            service,
            show_password,
        } => match vault.get(&service)? {
            Some(credential) => {
                println!("username: {}", String::from_utf8_lossy(credential.username()));
                if show_password {
                    println!("password: {}", String::from_utf8_lossy(credential.password()));
                }
            }
            None => {
                eprintln!("no credential stored for {service}");
                std::process::exit(2);
            }
        },
        Commands::Remove { service } => {
            vault.remove(&service)?;
            println!("removed {service}");
        }
        Commands::Ciphers => print_ciphers(&vault),
        Commands::Services => {
            for service in vault.list_services()? {
                println!("{service}");
            }
        }
        Commands::Migrate { service, from, to } => match (service, from) {
            (Some(service), _) => match vault.migrate(&service, to.as_deref())? {
                MigrationOutcome::Migrated { from, to } => {
                    println!("{service}: {from} -> {to}")
                }
                MigrationOutcome::AlreadyCurrent => println!("{service}: already current"),
                MigrationOutcome::NotFound => println!("{service}: not found"),
            },
            (None, Some(from)) => {
                let report = vault.migrate_cipher(&from, to.as_deref())?;
                println!(
                    "migrated {}, skipped {}, failed {}",
                    report.migrated.len(),
                    report.skipped.len(),
                    report.failed.len()
                );
                for (service, reason) in &report.failed {
                    println!("  {service}: {reason}");
                }
                if !report.is_clean() {
                    std::process::exit(1);
                }
            }
            (None, None) => {
                return Err(StrongboxError::Config(
                    "migrate needs --service or --from".to_string(),
                ));
            }
        },
    }
    Ok(())
}

fn print_ciphers(vault: &CredentialVault) {
    let in_use = vault.list_used_cipher_names();
    let write_cipher = vault.write_cipher().ok().map(|c| c.name().to_string());

    println!(
        "{:<10} {:>6} {:<9} {:>4}  STATUS",
        "NAME", "SCORE", "TIER", "MIN"
    );
    for cipher in vault.registry().iter() {
        let name = cipher.name();
        let mut status = Vec::new();
        if write_cipher.as_deref() == Some(name) {
            status.push("write");
        }
        if in_use.contains(name) {
            status.push("in use");
        }
        println!(
            "{:<10} {:>6} {:<9} {:>4}  {}",
            name,
            cipher.capability_score(),
            cipher.security_tier().to_string(),
            cipher.descriptor().min_platform_version,
            status.join(", ")
        );
    }
    for orphan in in_use.iter().filter(|tag| !vault.registry().contains(tag)) {
        println!("{orphan:<10} {:>6} {:<9} {:>4}  in use, not registered", "-", "-", "-");
    }
}

/// Open storage, derive keys and assemble the cipher registry.
fn open_vault(config: &StrongboxConfig) -> Result<CredentialVault, StrongboxError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| StrongboxError::Internal(format!("failed to start runtime: {e}")))?;

    let backend = Arc::new(runtime.block_on(SqliteBackend::open(&config.storage))?);
    let passphrase = get_passphrase()?;
    let key = runtime.block_on(master_key(&*backend, &passphrase, &config.kdf))?;
    let e2ee = runtime
        .block_on(backend.is_end_to_end_encryption_available())
        .unwrap_or(false);
    // The vault owns its own runtime; this one is only for setup.
    drop(runtime);

    let mut registry = CipherRegistry::new();
    registry.register(Arc::new(AesGcmCipher::legacy(*key)))?;
    registry.register(Arc::new(PassphraseCipher::new(passphrase, config.kdf.clone())))?;
    registry.register(Arc::new(AesGcmCipher::standard(*key, false)))?;
    if e2ee {
        registry.register(Arc::new(PassthroughCipher::new()))?;
    }
    debug!(path = backend.path(), e2ee, "storage opened");

    CredentialVault::new(backend as Arc<dyn KeyValueBackend>, registry, &config.vault)
}

// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Re-encrypting stored credentials under another cipher.
//!
//! Used to drain a cipher before it is deprecated: find the tags still in use
//! with [`CredentialVault::list_used_cipher_names`], then migrate every entry
//! carrying the old tag.

use std::collections::BTreeSet;

use strongbox_core::StrongboxError;
use tracing::{info, warn};

use crate::naming::KeyRole;
use crate::vault::{CredentialVault, validate_service};

/// What happened to a single service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated { from: String, to: String },
    /// Already stored under the target cipher.
    AlreadyCurrent,
    NotFound,
}

/// Report of a bulk migration.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Services re-encrypted under the target cipher.
    pub migrated: Vec<String>,
    /// Services already current or gone by the time they were visited.
    pub skipped: Vec<String>,
    /// Services that could not be migrated, with the reason.
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CredentialVault {
    /// Re-encrypt one credential under `target`, or the current write cipher.
    pub fn migrate(
        &self,
        service: &str,
        target: Option<&str>,
    ) -> Result<MigrationOutcome, StrongboxError> {
        validate_service(service)?;
        let to = match target {
            Some(name) => self.usable_cipher(name)?,
            None => self.write_cipher()?,
        };

        self.locks()
            .with_lock(service, || -> Result<_, StrongboxError> {
                let Some(loaded) = self.load(service)? else {
                    return Ok(MigrationOutcome::NotFound);
                };
                let from = loaded.cipher;
                if from.name() == to.name() {
                    return Ok(MigrationOutcome::AlreadyCurrent);
                }
                self.replace(service, &loaded, to)?;
                info!(service, from = from.name(), to = to.name(), "credential migrated");
                Ok(MigrationOutcome::Migrated {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                })
            })
    }

    /// Migrate every credential tagged `from_tag`.
    ///
    /// Untagged entries count as `from_tag` when it is the legacy tag.
    /// Per-service failures are collected in the report; only the initial
    /// enumeration failing is an error.
    pub fn migrate_cipher(
        &self,
        from_tag: &str,
        target: Option<&str>,
    ) -> Result<MigrationReport, StrongboxError> {
        let services = self.services_tagged(from_tag)?;
        let mut report = MigrationReport::default();

        for service in services {
            match self.migrate(&service, target) {
                Ok(MigrationOutcome::Migrated { .. }) => report.migrated.push(service),
                Ok(MigrationOutcome::AlreadyCurrent | MigrationOutcome::NotFound) => {
                    report.skipped.push(service)
                }
                Err(e) => {
                    warn!(service = %service, error = %e, "migration failed");
                    report.failed.push((service, e.to_string()));
                }
            }
        }

        info!(
            from = from_tag,
            migrated = report.migrated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "cipher migration finished"
        );
        Ok(report)
    }

    fn services_tagged(&self, tag: &str) -> Result<BTreeSet<String>, StrongboxError> {
        let entries = self.bridge().read_all()?;
        let naming = self.naming();
        let treat_untagged = tag == self.legacy_cipher_tag();

        let mut services = BTreeSet::new();
        for (key, value) in &entries {
            match naming.parse(key) {
                Some((service, KeyRole::Cipher)) if value.as_slice() == tag.as_bytes() => {
                    services.insert(service.to_string());
                }
                Some((service, KeyRole::Username)) if treat_untagged => {
                    if !entries.contains_key(&naming.keys_for(service).cipher) {
                        services.insert(service.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(services)
    }
}

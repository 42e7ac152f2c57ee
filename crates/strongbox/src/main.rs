// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox - a credential vault with pluggable cipher strategies.
//!
//! This is the binary entry point. Vault operations block, so `main` stays
//! synchronous and never enters an async runtime around them.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod keys;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::error;

/// Strongbox - a credential vault with pluggable cipher strategies.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a credential. The password is read from STRONGBOX_SECRET or prompted.
    Put {
        service: String,
        username: String,
        /// Encrypt with this cipher instead of the best-ranked one.
        #[arg(long)]
        cipher: Option<String>,
    },
    /// Print a stored credential.
    Get {
        service: String,
        #[arg(long)]
        show_password: bool,
    },
    /// Delete a stored credential.
    Remove { service: String },
    /// List registered ciphers and which are in use.
    Ciphers,
    /// List services with stored credentials.
    Services,
    /// Re-encrypt credentials under another cipher.
    #[command(group(ArgGroup::new("scope").required(true).args(["service", "from"])))]
    Migrate {
        /// Migrate a single service.
        #[arg(long)]
        service: Option<String>,
        /// Migrate every credential stored under this cipher tag.
        #[arg(long)]
        from: Option<String>,
        /// Target cipher (default: best-ranked usable cipher).
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => strongbox_config::load_and_validate_path(path),
        None => strongbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            strongbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = commands::run(cli.command, &config) {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strongbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

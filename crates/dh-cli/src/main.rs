//! deckhand CLI entry point.
//!
//! Thin by design: tracing setup, argument parsing, and dispatch into
//! `commands`. The `show`/`decks`/`reconcile` subcommands run against a
//! fixture-seeded in-memory ledger so the whole reconcile path can be
//! exercised offline; live transports are wired by the host application,
//! not here.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Deckhand deck reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the minimal add/remove delta between two selection files
    Diff {
        /// Selection file describing the current deck
        old: PathBuf,
        /// Selection file describing the desired deck
        new: PathBuf,
    },

    /// Show one deck from a fixture-backed ledger
    Show {
        /// Ledger fixture (YAML)
        #[arg(long)]
        fixture: PathBuf,
        /// Deck id
        #[arg(long)]
        deck: u64,
    },

    /// List the fixture signer's decks
    Decks {
        /// Ledger fixture (YAML)
        #[arg(long)]
        fixture: PathBuf,
    },

    /// Reconcile a deck against a selection file, end to end
    Reconcile {
        /// Ledger fixture (YAML)
        #[arg(long)]
        fixture: PathBuf,
        /// Deck id
        #[arg(long)]
        deck: u64,
        /// Selection file describing the desired deck
        #[arg(long)]
        selection: PathBuf,
    },

    /// Compute the layered config digest and print the canonical JSON
    ConfigDigest {
        /// Config paths in merge order (base -> env -> local)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Validate a layered session config and print its typed form
    ConfigCheck {
        /// Config paths in merge order (base -> env -> local)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Diff { old, new } => commands::diff(&old, &new),
        Commands::Show { fixture, deck } => commands::show(&fixture, deck).await,
        Commands::Decks { fixture } => commands::decks(&fixture).await,
        Commands::Reconcile {
            fixture,
            deck,
            selection,
        } => commands::reconcile(&fixture, deck, &selection).await,
        Commands::ConfigDigest { paths } => commands::config_digest(&paths),
        Commands::ConfigCheck { paths } => commands::config_check(&paths),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

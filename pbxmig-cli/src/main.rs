//! pbxmig: move an Asterisk/FreePBX installation onto a new server.
//!
//! # Usage
//!
//! ```text
//! pbxmig [--config <file>] config init [--force]
//! pbxmig [--config <file>] config show [--json]
//! pbxmig [--config <file>] fetch [--side old|new|both] [--dry-run]
//! pbxmig [--config <file>] compare [--old-etc P] [--new-etc P] [--old-dump P] [--new-dump P]
//!                                  [--output <file>] [--json]
//! pbxmig [--config <file>] push [--files] [--database] [--dry-run] [--yes]
//! ```

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{compare::CompareArgs, config::ConfigCommand, fetch::FetchArgs, push::PushArgs};
use pbxmig_core::Side;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pbxmig",
    version,
    about = "Compare two PBX installations and replay what the new one is missing",
    long_about = None,
)]
struct Cli {
    /// Migration config file (default: ~/.pbxmig/config.yaml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or inspect the migration config.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Pull configuration trees and database dumps from the hosts.
    Fetch(FetchArgs),

    /// Diff the local snapshots and print the migration plan.
    Compare(CompareArgs),

    /// Copy missing files and import the old database onto the new host.
    Push(PushArgs),
}

// ---------------------------------------------------------------------------
// Shared side argument: `old`, `new` or `both`
// ---------------------------------------------------------------------------

/// Which installations a command applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SideArg {
    Old,
    New,
    #[default]
    Both,
}

impl SideArg {
    pub fn sides(self) -> Vec<Side> {
        match self {
            Self::Old => vec![Side::Old],
            Self::New => vec![Side::New],
            Self::Both => Side::BOTH.to_vec(),
        }
    }
}

impl FromStr for SideArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown side '{other}'; expected: old, new, both")),
        }
    }
}

impl fmt::Display for SideArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => f.write_str("old"),
            Self::New => f.write_str("new"),
            Self::Both => f.write_str("both"),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Config { command } => commands::config::run(command, config),
        Commands::Fetch(args) => args.run(config),
        Commands::Compare(args) => args.run(config),
        Commands::Push(args) => args.run(config),
    }
}

/// Diagnostics go to stderr so the report on stdout stays pipeable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

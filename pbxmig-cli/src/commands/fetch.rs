//! `pbxmig fetch`: pull configuration trees and dumps into the snapshot layout.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::Colorize;

use pbxmig_remote::{CommandRunner, DryRunRunner, Fetcher, SystemRunner};

use super::load_config;
use crate::SideArg;

/// Arguments for `pbxmig fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Which host to fetch from: old | new | both.
    #[arg(long, default_value_t = SideArg::Both, value_name = "SIDE")]
    pub side: SideArg,

    /// Print the ssh/rsync commands without running them.
    #[arg(long)]
    pub dry_run: bool,
}

impl FetchArgs {
    pub fn run(self, explicit: Option<&Path>) -> Result<()> {
        let config = load_config(explicit)?;

        if self.dry_run {
            let runner = DryRunRunner::new();
            fetch(&config, &runner, self.side)?;
            for spec in runner.recorded() {
                println!("[dry-run] {spec}");
            }
            return Ok(());
        }

        let fetched = fetch(&config, &SystemRunner, self.side)?;
        for snapshot in fetched {
            println!(
                "{} {} side fetched at {}",
                "✓".green(),
                snapshot.side,
                Local::now().format("%H:%M:%S")
            );
            println!("  config: {}", snapshot.etc_dir.display());
            println!("  dump:   {}", snapshot.dump_path.display());
        }
        Ok(())
    }
}

fn fetch(
    config: &pbxmig_core::MigrationConfig,
    runner: &dyn CommandRunner,
    side: SideArg,
) -> Result<Vec<pbxmig_remote::FetchedSnapshot>> {
    let fetcher = Fetcher::new(config, runner).context("cannot fetch with this config")?;
    side.sides()
        .into_iter()
        .map(|side| {
            fetcher
                .fetch_side(side)
                .with_context(|| format!("fetch from {side} host failed"))
        })
        .collect()
}

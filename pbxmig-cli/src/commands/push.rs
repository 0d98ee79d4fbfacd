//! `pbxmig push`: replay missing files and the old database onto the new host.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use pbxmig_core::MigrationConfig;
use pbxmig_remote::{CommandRunner, DryRunRunner, Replayer, SystemRunner};

use super::{compare::CompareArgs, load_config};

/// Arguments for `pbxmig push`. With neither `--files` nor `--database`,
/// both are pushed.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Copy files that exist only on the old system.
    #[arg(long)]
    pub files: bool,

    /// Import the old database dump into the new host.
    #[arg(long)]
    pub database: bool,

    /// Print the commands without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Confirm changes to the new host.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl PushArgs {
    pub fn run(self, explicit: Option<&Path>) -> Result<()> {
        if !self.dry_run && !self.yes {
            bail!("push modifies the new host; re-run with --yes (or --dry-run to preview)");
        }
        let (push_files, push_database) = match (self.files, self.database) {
            (false, false) => (true, true),
            selected => selected,
        };

        let config = load_config(explicit)?;
        let files = if push_files {
            let plan = CompareArgs::default()
                .plan(explicit)
                .context("cannot decide which files to push")?;
            plan.files.missing_in_new
        } else {
            Vec::new()
        };

        if self.dry_run {
            let runner = DryRunRunner::new();
            replay(&config, &runner, &files, push_files, push_database)?;
            for spec in runner.recorded() {
                println!("[dry-run] {spec}");
            }
            return Ok(());
        }

        replay(&config, &SystemRunner, &files, push_files, push_database)?;
        Ok(())
    }
}

fn replay(
    config: &MigrationConfig,
    runner: &dyn CommandRunner,
    files: &[String],
    push_files: bool,
    push_database: bool,
) -> Result<()> {
    let replayer = Replayer::new(config, runner).context("cannot push with this config")?;
    let prefix = if runner.executes() { "" } else { "[dry-run] " };

    if push_files {
        let count = replayer.push_files(files).context("file push failed")?;
        if count == 0 {
            println!("{prefix}{} no files to copy", "✓".green());
        } else {
            println!("{prefix}{} {count} files copied to {}", "✓".green(), config.new.host);
        }
    }
    if push_database {
        replayer.import_dump().context("database import failed")?;
        println!(
            "{prefix}{} database {} imported on {}",
            "✓".green(),
            config.database,
            config.new.host
        );
    }
    Ok(())
}

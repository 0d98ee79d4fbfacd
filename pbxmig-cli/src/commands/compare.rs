//! `pbxmig compare`: diff the local snapshots and print the migration plan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pbxmig_core::{MigrationConfig, Side};
use pbxmig_diff::{build_plan, MigrationPlan, SnapshotPaths};
use pbxmig_remote::{extract_archive, is_archive, ExtractedArchive, SystemRunner};

use super::load_config;

/// Arguments for `pbxmig compare`. Every path defaults to the configured
/// snapshot layout; the config is only read when one is left out.
#[derive(Args, Debug, Default)]
pub struct CompareArgs {
    /// Old configuration tree (directory or .tar.gz/.tgz).
    #[arg(long, value_name = "PATH")]
    pub old_etc: Option<PathBuf>,

    /// New configuration tree (directory or .tar.gz/.tgz).
    #[arg(long, value_name = "PATH")]
    pub new_etc: Option<PathBuf>,

    /// Old database dump.
    #[arg(long, value_name = "PATH")]
    pub old_dump: Option<PathBuf>,

    /// New database dump.
    #[arg(long, value_name = "PATH")]
    pub new_dump: Option<PathBuf>,

    /// Write the report to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Emit the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

impl CompareArgs {
    pub fn run(self, explicit: Option<&Path>) -> Result<()> {
        let plan = self.plan(explicit)?;

        let rendered = if self.json {
            let mut json =
                serde_json::to_string_pretty(&plan).context("failed to serialize plan JSON")?;
            json.push('\n');
            json
        } else {
            plan.render()
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
                println!("{} Report written to {}", "✓".green(), path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }

    /// Resolve the four inputs and build the plan.
    pub fn plan(&self, explicit: Option<&Path>) -> Result<MigrationPlan> {
        let inputs = [&self.old_etc, &self.new_etc, &self.old_dump, &self.new_dump];
        let config = if inputs.iter().all(|p| p.is_some()) {
            None
        } else {
            Some(load_config(explicit)?)
        };
        let pick = |given: &Option<PathBuf>, default: fn(&MigrationConfig) -> PathBuf| {
            given
                .clone()
                .or_else(|| config.as_ref().map(default))
                .context("snapshot path not given and no config loaded")
        };

        let old_etc = SnapshotTree::open(pick(&self.old_etc, |c| c.etc_dir(Side::Old))?)?;
        let new_etc = SnapshotTree::open(pick(&self.new_etc, |c| c.etc_dir(Side::New))?)?;
        let old_dump = pick(&self.old_dump, |c| c.dump_path(Side::Old))?;
        let new_dump = pick(&self.new_dump, |c| c.dump_path(Side::New))?;

        build_plan(SnapshotPaths {
            old_etc: old_etc.root(),
            new_etc: new_etc.root(),
            old_dump: &old_dump,
            new_dump: &new_dump,
        })
        .context("comparison failed; run `pbxmig fetch` or pass the snapshot paths")
    }
}

/// A configuration tree given as a directory or as an archive to unpack.
enum SnapshotTree {
    Dir(PathBuf),
    Extracted(ExtractedArchive),
}

impl SnapshotTree {
    fn open(path: PathBuf) -> Result<Self> {
        if is_archive(&path) {
            let extracted = extract_archive(&SystemRunner, &path)
                .with_context(|| format!("failed to unpack {}", path.display()))?;
            return Ok(Self::Extracted(extracted));
        }
        Ok(Self::Dir(path))
    }

    fn root(&self) -> &Path {
        match self {
            Self::Dir(path) => path,
            Self::Extracted(archive) => archive.root(),
        }
    }
}

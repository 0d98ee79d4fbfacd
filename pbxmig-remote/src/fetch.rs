//! Pull configuration trees and database dumps into the local snapshot layout.

use std::path::PathBuf;

use pbxmig_core::{MigrationConfig, Side};

use crate::error::{io_err, RemoteError};
use crate::runner::CommandRunner;
use crate::ssh::SshTarget;
use crate::{mysql, rsync};

/// Local artifacts produced for one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSnapshot {
    pub side: Side,
    pub etc_dir: PathBuf,
    pub dump_path: PathBuf,
}

/// Remote-fetch collaborator. Holds the config it was built with; nothing
/// global is consulted.
pub struct Fetcher<'a> {
    config: &'a MigrationConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Fetcher<'a> {
    pub fn new(config: &'a MigrationConfig, runner: &'a dyn CommandRunner) -> Result<Self, RemoteError> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// rsync the remote configuration tree into `<snapshot>/asterisk`.
    pub fn fetch_etc(&self, side: Side) -> Result<PathBuf, RemoteError> {
        let host = self.config.host(side);
        let local = self.config.etc_dir(side);
        self.ensure_dir(&local)?;

        tracing::info!("fetching {} from {} ({side})", self.config.remote_etc_path, host.host);
        let spec = rsync::pull(&SshTarget::new(host), &self.config.remote_etc_path, &local, &host.exclude);
        self.runner.run(&spec)?;
        Ok(local)
    }

    /// mysqldump the configured database into `<snapshot>/<dump_file_name>`.
    pub fn fetch_dump(&self, side: Side) -> Result<PathBuf, RemoteError> {
        let host = self.config.host(side);
        let dump_path = self.config.dump_path(side);
        self.ensure_dir(&self.config.snapshot_dir(side))?;

        tracing::info!("dumping database {} from {} ({side})", self.config.database, host.host);
        let spec = mysql::dump(&SshTarget::new(host), &host.mysql, &self.config.database, &dump_path);
        self.runner.run(&spec)?;
        Ok(dump_path)
    }

    pub fn fetch_side(&self, side: Side) -> Result<FetchedSnapshot, RemoteError> {
        let etc_dir = self.fetch_etc(side)?;
        let dump_path = self.fetch_dump(side)?;
        Ok(FetchedSnapshot {
            side,
            etc_dir,
            dump_path,
        })
    }

    /// Old side first, then new. Stops at the first failure.
    pub fn fetch_all(&self) -> Result<Vec<FetchedSnapshot>, RemoteError> {
        Side::BOTH.iter().map(|side| self.fetch_side(*side)).collect()
    }

    fn ensure_dir(&self, dir: &std::path::Path) -> Result<(), RemoteError> {
        if !self.runner.executes() {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::runner::DryRunRunner;

    fn config_in(dir: &TempDir) -> MigrationConfig {
        MigrationConfig {
            data_dir: dir.path().join("data"),
            ..MigrationConfig::default()
        }
    }

    #[test]
    fn fetch_all_runs_rsync_then_dump_per_side_in_order() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir);
        let runner = DryRunRunner::new();
        let fetched = Fetcher::new(&config, &runner).expect("fetcher").fetch_all().expect("fetch");

        let programs: Vec<String> = runner
            .recorded()
            .iter()
            .map(|spec| format!("{} {}", spec.program(), spec.argv().last().cloned().unwrap_or_default()))
            .collect();
        assert_eq!(programs.len(), 4);
        assert!(programs[0].starts_with("rsync"));
        assert!(programs[0].ends_with("old_system/asterisk"));
        assert!(programs[1].starts_with("ssh mysqldump"));
        assert!(programs[2].ends_with("new_system/asterisk"));
        assert!(programs[3].starts_with("ssh mysqldump"));

        assert_eq!(fetched[0].side, Side::Old);
        assert_eq!(fetched[1].dump_path, config.dump_path(Side::New));
    }

    #[test]
    fn dry_run_creates_no_directories() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir);
        let runner = DryRunRunner::new();
        Fetcher::new(&config, &runner).expect("fetcher").fetch_side(Side::Old).expect("fetch");
        assert!(!config.data_dir.exists());
    }

    #[test]
    fn only_new_side_pull_excludes_keys() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir);
        let runner = DryRunRunner::new();
        let fetcher = Fetcher::new(&config, &runner).expect("fetcher");
        fetcher.fetch_etc(Side::Old).expect("old");
        fetcher.fetch_etc(Side::New).expect("new");

        let recorded = runner.recorded();
        assert!(!recorded[0].argv().contains(&"--exclude=keys".to_string()));
        assert!(recorded[1].argv().contains(&"--exclude=keys".to_string()));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = MigrationConfig::default();
        config.old.host.clear();
        let runner = DryRunRunner::new();
        let err = Fetcher::new(&config, &runner).err().expect("should fail");
        assert!(matches!(err, RemoteError::Config(_)), "got: {err}");
    }
}

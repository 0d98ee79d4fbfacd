//! Replay the old system's data onto the new host.

use std::io::Write;

use pbxmig_core::{MigrationConfig, Side};

use crate::error::{io_err, RemoteError};
use crate::runner::CommandRunner;
use crate::ssh::SshTarget;
use crate::{mysql, rsync};

/// Remote-push collaborator; the mirror of [`crate::Fetcher`].
pub struct Replayer<'a> {
    config: &'a MigrationConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Replayer<'a> {
    pub fn new(config: &'a MigrationConfig, runner: &'a dyn CommandRunner) -> Result<Self, RemoteError> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Copy `files` (relative to the old snapshot tree) to the new host.
    ///
    /// Returns how many files were handed to rsync; an empty list runs nothing.
    pub fn push_files(&self, files: &[String]) -> Result<usize, RemoteError> {
        if files.is_empty() {
            tracing::info!("no files to push");
            return Ok(0);
        }

        let source = self.config.etc_dir(Side::Old);
        if !source.is_dir() {
            return Err(io_err(
                &source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "old snapshot missing; run fetch first"),
            ));
        }

        let mut list = tempfile::Builder::new()
            .prefix("pbxmig-files-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| io_err(std::env::temp_dir(), e))?;
        for file in files {
            writeln!(list, "{file}").map_err(|e| io_err(list.path(), e))?;
        }
        list.flush().map_err(|e| io_err(list.path(), e))?;

        let host = &self.config.new;
        tracing::info!("pushing {} files to {}", files.len(), host.host);
        let spec = rsync::push(&SshTarget::new(host), &source, &self.config.remote_etc_path, list.path());
        self.runner.run(&spec)?;
        Ok(files.len())
    }

    /// Import the old side's dump into the new host's database.
    pub fn import_dump(&self) -> Result<(), RemoteError> {
        let dump_path = self.config.dump_path(Side::Old);
        if !dump_path.is_file() {
            return Err(io_err(
                &dump_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "old dump missing; run fetch first"),
            ));
        }

        let host = &self.config.new;
        tracing::info!("importing {} into {} on {}", dump_path.display(), self.config.database, host.host);
        let spec = mysql::import(&SshTarget::new(host), &host.mysql, &self.config.database, &dump_path);
        self.runner.run(&spec)?;
        Ok(())
    }
}

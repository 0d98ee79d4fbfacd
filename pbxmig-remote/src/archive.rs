//! Unpacking `.tar.gz` snapshots handed in place of a directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::command::CommandSpec;
use crate::error::{io_err, RemoteError};
use crate::runner::CommandRunner;

/// True when `path` is a regular file named `*.tar.gz` or `*.tgz`.
pub fn is_archive(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    (name.ends_with(".tar.gz") || name.ends_with(".tgz")) && path.is_file()
}

/// An archive unpacked into a temporary directory. The directory is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct ExtractedArchive {
    _dir: TempDir,
    root: PathBuf,
}

impl ExtractedArchive {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `tar -xzf <archive> -C <tmp>`
pub fn extract_command(archive: &Path, into: &Path) -> CommandSpec {
    CommandSpec::new("tar")
        .option("-xzf", archive.display().to_string())
        .option("-C", into.display().to_string())
}

/// Extract `archive` and return its root directory.
///
/// The root is always the extraction directory, so archive members keep the
/// exact relative paths they were packed with. An archive made with
/// `tar -czf x.tgz -C <tree> .` therefore lists the same as `<tree>`.
pub fn extract_archive(runner: &dyn CommandRunner, archive: &Path) -> Result<ExtractedArchive, RemoteError> {
    let dir = tempfile::Builder::new()
        .prefix("pbxmig-snapshot-")
        .tempdir()
        .map_err(|e| io_err(std::env::temp_dir(), e))?;

    tracing::debug!("extracting {} into {}", archive.display(), dir.path().display());
    runner.run(&extract_command(archive, dir.path()))?;

    let root = dir.path().to_path_buf();
    Ok(ExtractedArchive { _dir: dir, root })
}

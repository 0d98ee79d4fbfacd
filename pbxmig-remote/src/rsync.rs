//! rsync command construction.

use std::path::Path;

use crate::command::CommandSpec;
use crate::ssh::SshTarget;

fn base(target: &SshTarget, excludes: &[String]) -> CommandSpec {
    let spec = excludes
        .iter()
        .fold(CommandSpec::new("rsync").flag("-avz"), |spec, pattern| {
            spec.option_joined("--exclude", pattern)
        });
    spec.option("-e", target.rsh())
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Copy the contents of `remote_dir` on the host into `local_dir`.
pub fn pull(target: &SshTarget, remote_dir: &str, local_dir: &Path, excludes: &[String]) -> CommandSpec {
    base(target, excludes)
        .arg(format!("{}:{}", target.destination(), with_trailing_slash(remote_dir)))
        .arg(local_dir.display().to_string())
}

/// Copy the files listed in `files_from` (relative to `local_dir`) to
/// `remote_dir` on the host.
pub fn push(target: &SshTarget, local_dir: &Path, remote_dir: &str, files_from: &Path) -> CommandSpec {
    base(target, &[])
        .option_joined("--files-from", files_from.display().to_string())
        .arg(with_trailing_slash(&local_dir.display().to_string()))
        .arg(format!("{}:{}", target.destination(), with_trailing_slash(remote_dir)))
}

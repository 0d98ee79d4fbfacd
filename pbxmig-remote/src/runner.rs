//! Execution seam for external commands.
//!
//! [`SystemRunner`] spawns real processes. [`DryRunRunner`] records what
//! would have run and is also what the tests use to assert exact argv.

use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::command::CommandSpec;
use crate::error::{io_err, RemoteError};

/// What a finished command produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured stdout; empty when redirected to a file.
    pub stdout: Vec<u8>,
    pub stderr: String,
}

pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError>;

    /// `false` for runners that only pretend; callers skip local side effects.
    fn executes(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Runs commands with `std::process::Command`, blocking until exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError> {
        tracing::info!("running: {spec}");

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.argv()).stderr(Stdio::piped());

        if let Some(stdin) = spec.stdin() {
            let file = File::open(stdin).map_err(|e| io_err(stdin, e))?;
            cmd.stdin(Stdio::from(file));
        } else {
            cmd.stdin(Stdio::null());
        }

        // Redirected stdout lands in a `.partial` sibling and is only renamed
        // into place on success.
        let partial = spec.stdout().map(partial_path);
        if let Some(partial) = &partial {
            if let Some(parent) = partial.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            let file = File::create(partial).map_err(|e| io_err(partial, e))?;
            cmd.stdout(Stdio::from(file));
        } else {
            cmd.stdout(Stdio::piped());
        }

        let output = match cmd.output() {
            Ok(output) => output,
            Err(source) => {
                discard(partial.as_deref());
                return Err(RemoteError::Spawn {
                    program: spec.program().to_string(),
                    source,
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            discard(partial.as_deref());
            return Err(RemoteError::CommandFailed {
                program: spec.program().to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        if let (Some(partial), Some(target)) = (&partial, spec.stdout()) {
            std::fs::rename(partial, target).map_err(|e| io_err(target, e))?;
        }
        if !stderr.is_empty() {
            tracing::debug!("{} stderr: {stderr}", spec.program());
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr,
        })
    }
}

fn partial_path(target: &Path) -> PathBuf {
    PathBuf::from(format!("{}.partial", target.display()))
}

fn discard(partial: Option<&Path>) {
    if let Some(path) = partial {
        let _ = std::fs::remove_file(path);
    }
}

// ---------------------------------------------------------------------------
// DryRunRunner
// ---------------------------------------------------------------------------

/// Records every command instead of running it.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    recorded: RefCell<Vec<CommandSpec>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands seen so far, in order.
    pub fn recorded(&self) -> Vec<CommandSpec> {
        self.recorded.borrow().clone()
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RemoteError> {
        tracing::info!("[dry-run] would run: {spec}");
        self.recorded.borrow_mut().push(spec.clone());
        Ok(CommandOutput::default())
    }

    fn executes(&self) -> bool {
        false
    }
}

//! Remote collaborators for the migration: fetching snapshots from the old
//! and new hosts, replaying files and the database onto the new host, and
//! unpacking archived snapshots.
//!
//! Every external program is described as a [`CommandSpec`] and executed
//! through a [`CommandRunner`], so a dry run is just a different runner.

pub mod archive;
pub mod command;
pub mod error;
pub mod fetch;
pub mod mysql;
pub mod push;
pub mod rsync;
pub mod runner;
pub mod ssh;

pub use archive::{extract_archive, is_archive, ExtractedArchive};
pub use command::{shell_quote, CommandArg, CommandSpec, OptionStyle};
pub use error::RemoteError;
pub use fetch::{FetchedSnapshot, Fetcher};
pub use push::Replayer;
pub use runner::{CommandOutput, CommandRunner, DryRunRunner, SystemRunner};
pub use ssh::SshTarget;

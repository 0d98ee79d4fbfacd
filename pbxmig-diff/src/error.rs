//! Error types for pbxmig-diff.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading snapshots.
///
/// Nothing is retried and nothing is partially returned: either both sides
/// are read in full or the comparison fails with one of these.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot root that exists but is not a directory.
    #[error("snapshot root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A file name that is not valid UTF-8.
    #[error("file name is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },
}

/// Convenience constructor for [`DiffError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DiffError {
    DiffError::Io {
        path: path.into(),
        source,
    }
}

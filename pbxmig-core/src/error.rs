//! Error types for pbxmig-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, read-only filesystem, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.pbxmig/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `pbxmig config init` first")]
    NotFound { path: PathBuf },

    /// Refused to overwrite an existing config file.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// Structurally valid YAML with unusable values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

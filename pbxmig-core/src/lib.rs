//! pbxmig core library: shared types, migration config, errors.
//!
//! - [`types`]: [`Side`] and the redacting [`Secret`] wrapper
//! - [`config`]: [`MigrationConfig`] load / save / init and snapshot layout
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{HostConfig, MigrationConfig, MysqlCredentials};
pub use error::ConfigError;
pub use types::{Secret, Side};

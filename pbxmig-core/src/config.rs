//! Migration configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.pbxmig/
//!   config.yaml     (mode 0600: holds database credentials)
//! ```
//!
//! # Snapshot layout
//!
//! ```text
//! <data_dir>/
//!   old_system/
//!     asterisk/            (rsync of remote_etc_path)
//!     asterisk_dump.sql    (mysqldump output)
//!   new_system/
//!     ...
//! ```
//!
//! # API pattern
//!
//! Path-taking functions (`load_at`, `save_at`, `init_at`) do the work; the
//! no-arg wrappers derive `~/.pbxmig/config.yaml` from `dirs::home_dir()`.
//! Tests must always use the `_at` forms with a `TempDir`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Secret, Side};

/// Environment variable that overrides the old host's MySQL password.
pub const OLD_PASSWORD_ENV: &str = "PBXMIG_OLD_MYSQL_PASSWORD";
/// Environment variable that overrides the new host's MySQL password.
pub const NEW_PASSWORD_ENV: &str = "PBXMIG_NEW_MYSQL_PASSWORD";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// MySQL login used for dump and import on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysqlCredentials {
    pub user: String,
    #[serde(default)]
    pub password: Secret,
}

/// Connection details for one telephony server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    pub host: String,
    pub user: String,
    /// Re-enable `ssh-rsa` host keys for servers running an old sshd.
    #[serde(default)]
    pub legacy_host_keys: bool,
    /// Extra `-o` options passed to ssh, e.g. `ConnectTimeout=10`.
    #[serde(default)]
    pub ssh_options: Vec<String>,
    /// rsync `--exclude` patterns applied when pulling this host's tree.
    #[serde(default)]
    pub exclude: Vec<String>,
    pub mysql: MysqlCredentials,
}

impl HostConfig {
    /// `user@host` destination for ssh and rsync.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }
}

/// Everything the fetch and push collaborators need, injected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub old: HostConfig,
    pub new: HostConfig,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_remote_etc_path")]
    pub remote_etc_path: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_dump_file_name")]
    pub dump_file_name: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            old: HostConfig {
                host: "old-pbx.example.net".to_string(),
                user: "root".to_string(),
                legacy_host_keys: true,
                ssh_options: vec![],
                exclude: vec![],
                mysql: MysqlCredentials {
                    user: "root".to_string(),
                    password: Secret::default(),
                },
            },
            new: HostConfig {
                host: "new-pbx.example.net".to_string(),
                user: "root".to_string(),
                legacy_host_keys: false,
                ssh_options: vec![],
                exclude: vec!["keys".to_string()],
                mysql: MysqlCredentials {
                    user: "freepbxuser".to_string(),
                    password: Secret::default(),
                },
            },
            database: default_database(),
            remote_etc_path: default_remote_etc_path(),
            data_dir: default_data_dir(),
            dump_file_name: default_dump_file_name(),
        }
    }
}

impl MigrationConfig {
    pub fn host(&self, side: Side) -> &HostConfig {
        match side {
            Side::Old => &self.old,
            Side::New => &self.new,
        }
    }

    /// `<data_dir>/<old_system|new_system>/`
    pub fn snapshot_dir(&self, side: Side) -> PathBuf {
        self.data_dir.join(side.snapshot_dir_name())
    }

    /// Local copy of the remote configuration tree.
    pub fn etc_dir(&self, side: Side) -> PathBuf {
        self.snapshot_dir(side).join("asterisk")
    }

    /// Local copy of the database dump.
    pub fn dump_path(&self, side: Side) -> PathBuf {
        self.snapshot_dir(side).join(&self.dump_file_name)
    }

    /// Overlay secrets from the environment (or any other lookup).
    ///
    /// Empty values are ignored so an unset-but-exported variable does not
    /// wipe a configured password.
    pub fn apply_secret_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pw) = lookup(OLD_PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.old.mysql.password = Secret::new(pw);
        }
        if let Some(pw) = lookup(NEW_PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.new.mysql.password = Secret::new(pw);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in Side::BOTH {
            let host = self.host(side);
            if host.host.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{side}.host is empty")));
            }
            if host.user.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{side}.user is empty")));
            }
            if host.mysql.user.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{side}.mysql.user is empty")));
            }
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database is empty".to_string()));
        }
        if self.dump_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("dump_file_name is empty".to_string()));
        }
        Ok(())
    }
}

fn default_database() -> String {
    "asterisk".to_string()
}

fn default_remote_etc_path() -> String {
    "/etc/asterisk/".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_dump_file_name() -> String {
    "asterisk_dump.sql".to_string()
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.pbxmig/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".pbxmig").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<MigrationConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load from `path` if given, else from `~/.pbxmig/config.yaml`.
pub fn load(path: Option<&Path>) -> Result<MigrationConfig, ConfigError> {
    match path {
        Some(path) => load_at(path),
        None => load_at(&config_path()?),
    }
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(path: &Path, config: &MigrationConfig) -> Result<(), ConfigError> {
    let yaml = serde_yaml::to_string(config)?;
    write_atomic(path, &yaml)
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            set_dir_permissions(parent)?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");
    std::fs::write(&tmp_path, contents)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Write a default config to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_at(path: &Path, force: bool) -> Result<MigrationConfig, ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let config = MigrationConfig::default();
    let body = serde_yaml::to_string(&config)?;
    let header = format!(
        "# pbxmig migration config, generated {}\n\
         # Passwords may be left empty and supplied via {OLD_PASSWORD_ENV} / {NEW_PASSWORD_ENV}.\n",
        Utc::now().to_rfc3339()
    );
    write_atomic(path, &format!("{header}{body}"))?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_path_is_correct() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        assert!(path.ends_with(".pbxmig/config.yaml"));
    }

    #[test]
    fn snapshot_layout_follows_data_dir() {
        let mut config = MigrationConfig::default();
        config.data_dir = PathBuf::from("/srv/migration");
        assert_eq!(
            config.etc_dir(Side::Old),
            PathBuf::from("/srv/migration/old_system/asterisk")
        );
        assert_eq!(
            config.dump_path(Side::New),
            PathBuf::from("/srv/migration/new_system/asterisk_dump.sql")
        );
    }

    #[test]
    fn init_writes_loadable_config_with_perms() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        let written = init_at(&path, false).expect("init");
        let loaded = load_at(&path).expect("load");
        assert_eq!(written, loaded);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        init_at(&path, false).expect("first init");
        let err = init_at(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
        init_at(&path, true).expect("forced init");
    }

    #[test]
    fn atomic_save_cleans_up_tmp() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        save_at(&path, &MigrationConfig::default()).expect("save");
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn load_missing_returns_not_found() {
        let home = TempDir::new().expect("tempdir");
        let err = load_at(&config_path_at(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn load_malformed_returns_parse_error_with_path() {
        let home = TempDir::new().expect("tempdir");
        let path = home.path().join("broken.yaml");
        std::fs::write(&path, "old: [not, a, host").expect("write");
        let err = load_at(&path).unwrap_err();
        match err {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn secret_overrides_replace_only_non_empty_values() {
        let mut config = MigrationConfig::default();
        config.new.mysql.password = Secret::from("from-file");
        config.apply_secret_overrides(|name| match name {
            OLD_PASSWORD_ENV => Some("from-env".to_string()),
            NEW_PASSWORD_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.old.mysql.password.expose(), "from-env");
        assert_eq!(config.new.mysql.password.expose(), "from-file");
    }

    #[test]
    fn validate_rejects_empty_host() {
        let mut config = MigrationConfig::default();
        config.new.host = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("new.host"));
    }

    #[test]
    fn default_config_excludes_keys_on_new_host_only() {
        let config = MigrationConfig::default();
        assert!(config.old.exclude.is_empty());
        assert_eq!(config.new.exclude, vec!["keys".to_string()]);
        assert!(config.old.legacy_host_keys);
        assert!(!config.new.legacy_host_keys);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}

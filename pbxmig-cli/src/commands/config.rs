//! `pbxmig config init` and `pbxmig config show`

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use pbxmig_core::{config as core_config, HostConfig, MigrationConfig, Secret};

use super::{config_path, load_config};

/// Create or inspect the migration config.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default config with placeholder hosts.
    Init(InitArgs),

    /// Print the effective config. Passwords are never shown.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommand::Init(args) => init(args, explicit),
        ConfigCommand::Show(args) => show(args, explicit),
    }
}

fn init(args: InitArgs, explicit: Option<&Path>) -> Result<()> {
    let path = config_path(explicit)?;
    core_config::init_at(&path, args.force)
        .with_context(|| format!("failed to write config to {}", path.display()))?;

    println!("✓ Wrote default config to {}", path.display());
    println!(
        "  Edit the host names, then set {} / {} or fill in the passwords.",
        core_config::OLD_PASSWORD_ENV,
        core_config::NEW_PASSWORD_ENV
    );
    Ok(())
}

fn show(args: ShowArgs, explicit: Option<&Path>) -> Result<()> {
    let config = load_config(explicit)?;

    if args.json {
        let payload = ConfigJson::from(&config);
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize config JSON")?
        );
        return Ok(());
    }

    let mut table = Table::new(rows(&config));
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn password_state(secret: &Secret) -> &'static str {
    if secret.is_empty() {
        "unset"
    } else {
        "set"
    }
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "setting")]
    setting: &'static str,
    #[tabled(rename = "old")]
    old: String,
    #[tabled(rename = "new")]
    new: String,
}

fn rows(config: &MigrationConfig) -> Vec<ConfigRow> {
    let host_row = |setting: &'static str, value: fn(&HostConfig) -> String| ConfigRow {
        setting,
        old: value(&config.old),
        new: value(&config.new),
    };
    let shared_row = |setting: &'static str, value: String| ConfigRow {
        setting,
        old: value.clone(),
        new: value,
    };

    vec![
        host_row("host", |h| h.host.clone()),
        host_row("ssh user", |h| h.user.clone()),
        host_row("legacy host keys", |h| h.legacy_host_keys.to_string()),
        host_row("ssh options", |h| h.ssh_options.join(" ")),
        host_row("exclude", |h| h.exclude.join(" ")),
        host_row("mysql user", |h| h.mysql.user.clone()),
        host_row("mysql password", |h| password_state(&h.mysql.password).to_string()),
        shared_row("database", config.database.clone()),
        shared_row("remote etc path", config.remote_etc_path.clone()),
        shared_row("data dir", config.data_dir.display().to_string()),
        shared_row("dump file", config.dump_file_name.clone()),
    ]
}

#[derive(Serialize)]
struct ConfigJson<'a> {
    old: HostJson<'a>,
    new: HostJson<'a>,
    database: &'a str,
    remote_etc_path: &'a str,
    data_dir: String,
    dump_file_name: &'a str,
}

#[derive(Serialize)]
struct HostJson<'a> {
    host: &'a str,
    user: &'a str,
    legacy_host_keys: bool,
    ssh_options: &'a [String],
    exclude: &'a [String],
    mysql_user: &'a str,
    mysql_password: &'static str,
}

impl<'a> From<&'a HostConfig> for HostJson<'a> {
    fn from(host: &'a HostConfig) -> Self {
        Self {
            host: &host.host,
            user: &host.user,
            legacy_host_keys: host.legacy_host_keys,
            ssh_options: &host.ssh_options,
            exclude: &host.exclude,
            mysql_user: &host.mysql.user,
            mysql_password: password_state(&host.mysql.password),
        }
    }
}

impl<'a> From<&'a MigrationConfig> for ConfigJson<'a> {
    fn from(config: &'a MigrationConfig) -> Self {
        Self {
            old: HostJson::from(&config.old),
            new: HostJson::from(&config.new),
            database: &config.database,
            remote_etc_path: &config.remote_etc_path,
            data_dir: config.data_dir.display().to_string(),
            dump_file_name: &config.dump_file_name,
        }
    }
}

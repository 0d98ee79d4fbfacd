//! MySQL dump and import, piped through ssh.
//!
//! The password travels as `-p<password>` on the remote command line, which
//! is visible to other users of that host while the command runs.

use std::path::Path;

use pbxmig_core::MysqlCredentials;

use crate::command::CommandSpec;
use crate::ssh::SshTarget;

fn client_words<'a>(program: &'a str, creds: &'a MysqlCredentials, password_flag: &'a str, database: &'a str) -> Vec<&'a str> {
    let mut words = vec![program, "-u", creds.user.as_str()];
    if !creds.password.is_empty() {
        words.push(password_flag);
    }
    words.push(database);
    words
}

/// `ssh host 'mysqldump ...' > dump_path`
pub fn dump(target: &SshTarget, creds: &MysqlCredentials, database: &str, dump_path: &Path) -> CommandSpec {
    let password_flag = format!("-p{}", creds.password.expose());
    target
        .remote_command(&client_words("mysqldump", creds, &password_flag, database))
        .stdout_to(dump_path)
        .redact(creds.password.expose())
}

/// `ssh host 'mysql ...' < dump_path`
pub fn import(target: &SshTarget, creds: &MysqlCredentials, database: &str, dump_path: &Path) -> CommandSpec {
    let password_flag = format!("-p{}", creds.password.expose());
    target
        .remote_command(&client_words("mysql", creds, &password_flag, database))
        .stdin_from(dump_path)
        .redact(creds.password.expose())
}

#[cfg(test)]
mod tests {
    use pbxmig_core::{MigrationConfig, Secret};

    use super::*;

    #[test]
    fn dump_runs_mysqldump_remotely_into_file() {
        let mut config = MigrationConfig::default();
        config.old.mysql.password = Secret::from("s3cret");
        let target = SshTarget::new(&config.old);
        let spec = dump(&target, &config.old.mysql, "asterisk", Path::new("old/dump.sql"));

        assert_eq!(spec.argv().last().map(String::as_str), Some("mysqldump -u root -ps3cret asterisk"));
        assert_eq!(spec.stdout(), Some(Path::new("old/dump.sql")));
        assert!(!spec.to_string().contains("s3cret"));
    }

    #[test]
    fn empty_password_omits_flag() {
        let config = MigrationConfig::default();
        let target = SshTarget::new(&config.new);
        let spec = import(&target, &config.new.mysql, "asterisk", Path::new("old/dump.sql"));

        assert_eq!(spec.argv().last().map(String::as_str), Some("mysql -u freepbxuser asterisk"));
        assert_eq!(spec.stdin(), Some(Path::new("old/dump.sql")));
    }

    #[test]
    fn password_with_shell_metacharacters_is_quoted() {
        let mut config = MigrationConfig::default();
        config.new.mysql.password = Secret::from("a b$c");
        let target = SshTarget::new(&config.new);
        let spec = import(&target, &config.new.mysql, "asterisk", Path::new("d.sql"));
        assert_eq!(
            spec.argv().last().map(String::as_str),
            Some("mysql -u freepbxuser '-pa b$c' asterisk")
        );
    }

    #[test]
    fn password_with_single_quote_never_shows_in_display() {
        let mut config = MigrationConfig::default();
        config.old.mysql.password = Secret::from("pa'ss");
        let target = SshTarget::new(&config.old);
        let spec = dump(&target, &config.old.mysql, "asterisk", Path::new("d.sql"));

        let shown = spec.to_string();
        assert!(!shown.contains("pa'"), "{shown}");
        assert!(shown.contains("-p***"), "{shown}");
        assert!(shown.ends_with("> d.sql"));
    }
}

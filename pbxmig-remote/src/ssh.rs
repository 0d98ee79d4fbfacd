//! ssh invocation for one host.

use pbxmig_core::HostConfig;

use crate::command::{shell_quote, CommandSpec};

const COMMON_OPTIONS: &[&str] = &["StrictHostKeyChecking=no"];
const LEGACY_RSA_OPTIONS: &[&str] = &["HostKeyAlgorithms=+ssh-rsa", "PubkeyAcceptedKeyTypes=+ssh-rsa"];

/// ssh options and destination derived from a [`HostConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    destination: String,
    options: Vec<String>,
}

impl SshTarget {
    pub fn new(host: &HostConfig) -> Self {
        let mut options: Vec<String> = COMMON_OPTIONS.iter().map(|s| s.to_string()).collect();
        if host.legacy_host_keys {
            options.extend(LEGACY_RSA_OPTIONS.iter().map(|s| s.to_string()));
        }
        options.extend(host.ssh_options.iter().cloned());
        Self {
            destination: host.destination(),
            options,
        }
    }

    /// `user@host`
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// `ssh -o ... ` with no destination; the base for both ssh and `rsync -e`.
    pub fn base_command(&self) -> CommandSpec {
        self.options
            .iter()
            .fold(CommandSpec::new("ssh"), |spec, opt| spec.option("-o", opt))
    }

    /// Run `words` on the remote host. Each word is quoted for the remote shell.
    pub fn remote_command(&self, words: &[&str]) -> CommandSpec {
        let remote = words
            .iter()
            .map(|w| shell_quote(w))
            .collect::<Vec<_>>()
            .join(" ");
        self.base_command().arg(self.destination.clone()).arg(remote)
    }

    /// Value for `rsync -e`.
    pub fn rsh(&self) -> String {
        self.base_command().to_shell_line()
    }
}

#[cfg(test)]
mod tests {
    use pbxmig_core::MigrationConfig;

    use super::*;

    #[test]
    fn legacy_host_gets_rsa_options() {
        let config = MigrationConfig::default();
        let target = SshTarget::new(&config.old);
        assert_eq!(
            target.rsh(),
            "ssh -o StrictHostKeyChecking=no -o HostKeyAlgorithms=+ssh-rsa -o PubkeyAcceptedKeyTypes=+ssh-rsa"
        );
    }

    #[test]
    fn modern_host_gets_common_options_plus_extras() {
        let mut config = MigrationConfig::default();
        config.new.ssh_options = vec!["ConnectTimeout=10".to_string()];
        let target = SshTarget::new(&config.new);
        assert_eq!(
            target.base_command().argv(),
            vec!["-o", "StrictHostKeyChecking=no", "-o", "ConnectTimeout=10"]
        );
    }

    #[test]
    fn remote_command_quotes_words_and_ends_with_destination_then_command() {
        let config = MigrationConfig::default();
        let target = SshTarget::new(&config.new);
        let argv = target.remote_command(&["ls", "/etc/my dir"]).argv();
        let n = argv.len();
        assert_eq!(argv[n - 2], "root@new-pbx.example.net");
        assert_eq!(argv[n - 1], "ls '/etc/my dir'");
    }
}

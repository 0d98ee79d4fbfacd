//! Structured external-command construction.
//!
//! A [`CommandSpec`] is a program plus an ordered list of [`CommandArg`]s.
//! Flags and options render first, in insertion order, followed by every
//! positional operand. Adding an `--exclude` after the source and destination
//! are set therefore still lands before them.

use std::fmt;
use std::path::{Path, PathBuf};

/// How an option and its value are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStyle {
    /// `-o value`: two argv entries.
    Separate,
    /// `--name=value`: one argv entry.
    Joined,
}

/// One element of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    Flag(String),
    Option {
        name: String,
        value: String,
        style: OptionStyle,
    },
    Positional(String),
}

/// A fully described external command, ready for a [`crate::CommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<CommandArg>,
    stdin: Option<PathBuf>,
    stdout: Option<PathBuf>,
    redactions: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            stdout: None,
            redactions: Vec::new(),
        }
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.args.push(CommandArg::Flag(flag.into()));
        self
    }

    /// `name value` as two argv entries.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Option {
            name: name.into(),
            value: value.into(),
            style: OptionStyle::Separate,
        });
        self
    }

    /// `name=value` as a single argv entry.
    pub fn option_joined(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Option {
            name: name.into(),
            value: value.into(),
            style: OptionStyle::Joined,
        });
        self
    }

    pub fn arg(mut self, operand: impl Into<String>) -> Self {
        self.args.push(CommandArg::Positional(operand.into()));
        self
    }

    /// Feed the file at `path` to the child's stdin.
    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Capture the child's stdout into the file at `path`.
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// Mask `needle` wherever the command is displayed or logged.
    pub fn redact(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if !needle.is_empty() {
            self.redactions.push(needle);
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    pub fn stdin(&self) -> Option<&Path> {
        self.stdin.as_deref()
    }

    pub fn stdout(&self) -> Option<&Path> {
        self.stdout.as_deref()
    }

    /// Arguments exactly as passed to the process (program excluded).
    pub fn argv(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + 2);
        for arg in &self.args {
            match arg {
                CommandArg::Flag(flag) => out.push(flag.clone()),
                CommandArg::Option {
                    name,
                    value,
                    style: OptionStyle::Separate,
                } => {
                    out.push(name.clone());
                    out.push(value.clone());
                }
                CommandArg::Option {
                    name,
                    value,
                    style: OptionStyle::Joined,
                } => out.push(format!("{name}={value}")),
                CommandArg::Positional(_) => {}
            }
        }
        for arg in &self.args {
            if let CommandArg::Positional(operand) = arg {
                out.push(operand.clone());
            }
        }
        out
    }

    /// Program plus argv, shell-quoted, one string. Used for `rsync -e`.
    pub fn to_shell_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.argv())
            .map(|word| shell_quote(&word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-like rendering with redactions applied and redirections shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = std::iter::once(self.program.clone())
            .chain(self.argv())
            .map(|word| shell_quote(&self.redacted(&word)))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(stdin) = &self.stdin {
            line.push_str(&format!(" < {}", shell_quote(&stdin.display().to_string())));
        }
        if let Some(stdout) = &self.stdout {
            line.push_str(&format!(" > {}", shell_quote(&stdout.display().to_string())));
        }
        f.write_str(&line)
    }
}

impl CommandSpec {
    /// Mask every registered needle in one argv word, before that word is
    /// quoted. A word that is itself a quoted remote command carries the
    /// needle in its escaped form, so both forms are masked.
    fn redacted(&self, word: &str) -> String {
        let mut out = word.to_string();
        for needle in &self.redactions {
            let escaped = escape_single_quotes(needle);
            if escaped != *needle {
                out = out.replace(&escaped, "***");
            }
            out = out.replace(needle.as_str(), "***");
        }
        out
    }
}

fn escape_single_quotes(word: &str) -> String {
    word.replace('\'', r"'\''")
}

/// Quote `word` for a POSIX shell. Safe words pass through untouched.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,%".contains(c));
    if safe {
        return word.to_string();
    }
    format!("'{}'", escape_single_quotes(word))
}

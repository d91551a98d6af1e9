//! Command invocation description.

use crate::tokenize::split_pipeline;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Characters that switch a command into shell mode.
pub const SHELL_METACHARS: [char; 3] = ['|', '*', '?'];

/// How captured output bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    #[default]
    Utf8Lossy,
    /// Invalid UTF-8 is reported as `CommandError::Decode`.
    Utf8Strict,
}

/// One external command invocation, possibly a `|`-separated pipe chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    command: String,
    cwd: Option<PathBuf>,
    shell: bool,
    env: Option<HashMap<String, String>>,
    encoding: Encoding,
}

impl CommandSpec {
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let shell = command.contains(SHELL_METACHARS);
        Self {
            command,
            cwd: None,
            shell,
            env: None,
            encoding: Encoding::default(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Force shell mode on or off regardless of the command text.
    pub fn with_shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Replace the inherited environment with exactly `env`.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn shell(&self) -> bool {
        self.shell
    }

    pub fn env(&self) -> Option<&HashMap<String, String>> {
        self.env.as_ref()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Ordered pipe stages. A command without an unquoted `|` yields a single
    /// stage.
    ///
    /// Pipes are only split in shell mode; with shell mode forced off the whole
    /// string is one stage.
    pub fn stages(&self) -> Vec<&str> {
        if !self.shell {
            return vec![self.command.trim()];
        }
        split_pipeline(&self.command)
    }
}

impl From<&str> for CommandSpec {
    fn from(command: &str) -> Self {
        CommandSpec::new(command)
    }
}

impl From<String> for CommandSpec {
    fn from(command: String) -> Self {
        CommandSpec::new(command)
    }
}

/// Outcome of the final stage of a command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

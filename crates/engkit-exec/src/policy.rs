//! Return-code policy with per-command exemptions.

use engkit_error::{CommandError, CommandResult};

/// Maps a command-line prefix to a single non-zero return code that counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnCodePolicy {
    exemptions: Vec<(String, i32)>,
}

impl Default for ReturnCodePolicy {
    /// `smartctl` sets bit 2 (code 4) when some SMART command failed, which is
    /// routine on drives without full SMART support.
    fn default() -> Self {
        Self::empty().with_exemption("smartctl", 4)
    }
}

impl ReturnCodePolicy {
    /// A policy where every non-zero code is an error.
    pub fn empty() -> Self {
        Self {
            exemptions: Vec::new(),
        }
    }

    pub fn with_exemption(mut self, prefix: impl Into<String>, code: i32) -> Self {
        let prefix = prefix.into();
        self.exemptions.retain(|(p, _)| *p != prefix);
        self.exemptions.push((prefix, code));
        self
    }

    pub fn exemptions(&self) -> &[(String, i32)] {
        &self.exemptions
    }

    /// True when `command` exiting with `code` is acceptable.
    pub fn allows(&self, command: &str, code: i32) -> bool {
        code == 0
            || self
                .exemptions
                .iter()
                .any(|(prefix, exempt)| command.starts_with(prefix.as_str()) && code == *exempt)
    }

    /// Check a return code, logging and returning `CommandError::Execution` on violation.
    pub fn check_returncode(&self, command: &str, code: i32) -> CommandResult<()> {
        if self.allows(command, code) {
            return Ok(());
        }
        log::error!("Shell Command Execution Error");
        log::debug!("command: {:?}, returncode: {}", command, code);
        Err(CommandError::Execution {
            command: command.to_string(),
            return_code: code,
        })
    }
}

//! Command execution trait.
//!
//! Code that shells out to system utilities takes a `&dyn ShellOps` so it can be
//! exercised against `FakeRunner` without spawning real processes.

use crate::{CommandResult as Captured, CommandSpec};
use engkit_error::CommandResult;
use std::fs::File;

/// Where the final stage's stdout goes for fire-and-forget calls.
#[derive(Debug, Default)]
pub enum OutputSink {
    /// Discard stdout.
    #[default]
    Null,
    /// Share the caller's stdout.
    Inherit,
    /// Write stdout into an already-open file.
    File(File),
}

/// External command runner.
pub trait ShellOps {
    /// Run a command or pipe chain and capture the final stage's output.
    fn get_shell_cmd(&self, spec: &CommandSpec) -> CommandResult<Captured>;

    /// Run a command or pipe chain, sending the final stage's stdout to `sink`.
    ///
    /// Returns the final return code once the policy accepted it.
    fn call_shell_cmd(&self, spec: &CommandSpec, sink: OutputSink) -> CommandResult<i32>;

    /// Shorthand for `get_shell_cmd` on a bare command string.
    fn run(&self, command: &str) -> CommandResult<Captured> {
        self.get_shell_cmd(&CommandSpec::new(command))
    }

    /// Shorthand for `call_shell_cmd` with stdout discarded.
    fn call(&self, command: &str) -> CommandResult<i32> {
        self.call_shell_cmd(&CommandSpec::new(command), OutputSink::Null)
    }
}

//! Fake runner for testing.
//!
//! Records every invocation without spawning processes and answers from a table
//! of scripted outputs, so code that parses tool output can run in CI.

use crate::ops::{OutputSink, ShellOps};
use crate::policy::ReturnCodePolicy;
use crate::spec::{CommandResult as Captured, CommandSpec};
use engkit_error::{CommandError, CommandResult};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// How a recorded command was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Get,
    Call,
}

/// Invocation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub kind: CallKind,
}

#[derive(Debug, Default)]
struct FakeRunnerState {
    invocations: Vec<Invocation>,
    responses: HashMap<String, Captured>,
}

/// Fake runner that records commands and replays scripted results.
///
/// Commands without a scripted response fail the way a missing executable does.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<FakeRunnerState>>,
    policy: ReturnCodePolicy,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: ReturnCodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Script a successful response for `command`.
    pub fn respond(&self, command: impl Into<String>, stdout: impl Into<String>) -> &Self {
        self.respond_with(
            command,
            Captured {
                return_code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            },
        )
    }

    /// Script an arbitrary result, including non-zero return codes.
    pub fn respond_with(&self, command: impl Into<String>, result: Captured) -> &Self {
        self.lock().responses.insert(command.into(), result);
        self
    }

    /// Get all recorded invocations.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    /// Recorded command strings, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .invocations
            .iter()
            .map(|i| i.command.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeRunnerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn replay(&self, spec: &CommandSpec, kind: CallKind) -> CommandResult<Captured> {
        let scripted = {
            let mut state = self.lock();
            state.invocations.push(Invocation {
                command: spec.command().to_string(),
                cwd: spec.cwd().map(PathBuf::from),
                kind,
            });
            state.responses.get(spec.command()).cloned()
        };
        let result = scripted.ok_or_else(|| CommandError::Start {
            command: spec.command().to_string(),
            cwd: spec.cwd().map(PathBuf::from),
            source: io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
        })?;
        self.policy
            .check_returncode(spec.command(), result.return_code)?;
        Ok(result)
    }
}

impl ShellOps for FakeRunner {
    fn get_shell_cmd(&self, spec: &CommandSpec) -> CommandResult<Captured> {
        self.replay(spec, CallKind::Get)
    }

    fn call_shell_cmd(&self, spec: &CommandSpec, _sink: OutputSink) -> CommandResult<i32> {
        self.replay(spec, CallKind::Call).map(|r| r.return_code)
    }
}

//! Real command runner backed by `std::process`.

use crate::guard::ChildGuard;
use crate::interrupt::InterruptFlag;
use crate::ops::{OutputSink, ShellOps};
use crate::policy::ReturnCodePolicy;
use crate::spec::{CommandResult as Captured, CommandSpec, Encoding};
use crate::tokenize::prepare;
use engkit_error::{CommandError, CommandResult};
use std::io::{Read, Write};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

const SETTLE_DELAY: Duration = Duration::from_secs(1);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Tunables for `SystemRunner`.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub policy: ReturnCodePolicy,
    /// Pause after every `call_shell_cmd` so hardware tools are not hammered
    /// back to back.
    pub settle_delay: Duration,
    /// How often a blocking wait checks the interrupt flag.
    pub poll_interval: Duration,
    /// Time between SIGTERM and SIGKILL when an interrupted child is stopped.
    pub terminate_grace: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            policy: ReturnCodePolicy::default(),
            settle_delay: SETTLE_DELAY,
            poll_interval: POLL_INTERVAL,
            terminate_grace: TERMINATE_GRACE,
        }
    }
}

/// Runs commands on the host.
///
/// Pipe stages run one after another: each stage is fully buffered in memory
/// before the next one starts, so very large intermediate output costs memory.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    config: RunnerConfig,
    interrupt: Option<InterruptFlag>,
}

struct StageOutput {
    return_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            config,
            interrupt: None,
        }
    }

    /// Abort blocking waits when `flag` is raised.
    pub fn with_interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn check_returncode(&self, command: &str, code: i32) -> CommandResult<()> {
        self.config.policy.check_returncode(command, code)
    }

    /// Run every stage of `spec`; the final stage writes to `sink`, or is
    /// captured when `sink` is `None`.
    fn run_stages(&self, spec: &CommandSpec, sink: Option<OutputSink>) -> CommandResult<StageOutput> {
        let stages = spec.stages();
        let (final_stage, leading) = stages.split_last().ok_or_else(|| CommandError::Parse {
            command: spec.command().to_string(),
            reason: "empty command".to_string(),
        })?;

        let mut input: Option<Vec<u8>> = None;
        for (idx, stage) in leading.iter().enumerate() {
            let output = self.run_checked(spec, idx, stage, input.take(), Stdio::piped())?;
            input = Some(output.stdout);
        }

        let stdout = match sink {
            None => Stdio::piped(),
            Some(OutputSink::Null) => Stdio::null(),
            Some(OutputSink::Inherit) => Stdio::inherit(),
            Some(OutputSink::File(file)) => Stdio::from(file),
        };
        self.run_checked(spec, leading.len(), final_stage, input, stdout)
    }

    fn run_checked(
        &self,
        spec: &CommandSpec,
        idx: usize,
        stage: &str,
        input: Option<Vec<u8>>,
        stdout: Stdio,
    ) -> CommandResult<StageOutput> {
        self.check_interrupt(stage)?;
        let argv = prepare(stage, spec.shell(), spec.cwd()).inspect_err(|err| {
            log::error!("Shell Command Parse Error");
            log::debug!("{}", err);
        })?;
        let output = self.run_stage(spec, stage, &argv, input, stdout)?;
        log::debug!("stage {} returncode: {}", idx, output.return_code);
        if !output.stderr.is_empty() {
            log::debug!("stage {} stderr: {}", idx, String::from_utf8_lossy(&output.stderr).trim_end());
        }
        self.check_returncode(stage, output.return_code)?;
        Ok(output)
    }

    fn run_stage(
        &self,
        spec: &CommandSpec,
        stage: &str,
        argv: &[String],
        input: Option<Vec<u8>>,
        stdout: Stdio,
    ) -> CommandResult<StageOutput> {
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..]);
        if let Some(cwd) = spec.cwd() {
            cmd.current_dir(cwd);
        }
        if let Some(env) = spec.env() {
            cmd.env_clear().envs(env);
        }
        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(stdout)
        .stderr(Stdio::piped());

        log::debug!("cmd: {:?}", argv);
        let child = cmd
            .spawn()
            .map_err(|source| start_failed(stage, spec.cwd(), source))?;
        let mut guard = ChildGuard::new(child, stage);

        // Feed stdin from its own thread so a chatty child cannot deadlock us.
        let writer = match (input, guard.child_mut().stdin.take()) {
            (Some(bytes), Some(mut stdin)) => Some(thread::spawn(move || {
                let _ = stdin.write_all(&bytes);
            })),
            _ => None,
        };
        let stdout_handle = guard.child_mut().stdout.take().map(drain);
        let stderr_handle = guard.child_mut().stderr.take().map(drain);

        let status = self.wait(&mut guard, stage)?;
        guard.release();

        if let Some(handle) = writer {
            let _ = handle.join();
        }
        Ok(StageOutput {
            return_code: exit_code(status),
            stdout: join_drain(stdout_handle),
            stderr: join_drain(stderr_handle),
        })
    }

    fn wait(&self, guard: &mut ChildGuard, stage: &str) -> CommandResult<ExitStatus> {
        loop {
            let polled = guard
                .child_mut()
                .wait_timeout(self.config.poll_interval)
                .map_err(|source| CommandError::Io {
                    command: stage.to_string(),
                    source,
                })?;
            if let Some(status) = polled {
                // A signal that landed during the last poll still counts.
                self.check_interrupt(stage)?;
                return Ok(status);
            }
            if let Err(err) = self.check_interrupt(stage) {
                guard.terminate(self.config.terminate_grace);
                return Err(err);
            }
        }
    }

    /// `Interrupted` when the flag was raised since the last check.
    fn check_interrupt(&self, command: &str) -> CommandResult<()> {
        if self.interrupt.as_ref().is_some_and(InterruptFlag::take) {
            log::error!("Keyboard Interrupt");
            log::debug!("interrupted: {}", command);
            return Err(CommandError::Interrupted {
                command: command.to_string(),
            });
        }
        Ok(())
    }

    /// Sleep for `settle_delay`, waking every poll interval to honor interrupts.
    fn settle(&self, command: &str) -> CommandResult<()> {
        let deadline = Instant::now() + self.config.settle_delay;
        loop {
            self.check_interrupt(command)?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep((deadline - now).min(self.config.poll_interval));
        }
    }
}

impl ShellOps for SystemRunner {
    fn get_shell_cmd(&self, spec: &CommandSpec) -> CommandResult<Captured> {
        let output = self.run_stages(spec, None)?;
        Ok(Captured {
            return_code: output.return_code,
            stdout: decode(spec, output.stdout)?,
            stderr: decode(spec, output.stderr)?,
        })
    }

    fn call_shell_cmd(&self, spec: &CommandSpec, sink: OutputSink) -> CommandResult<i32> {
        let output = self.run_stages(spec, Some(sink))?;
        self.settle(spec.command())?;
        Ok(output.return_code)
    }
}

fn start_failed(stage: &str, cwd: Option<&Path>, source: std::io::Error) -> CommandError {
    log::error!("Shell Command Start Error");
    log::debug!("command: {:?}, cwd: {:?}, error: {}", stage, cwd, source);
    CommandError::Start {
        command: stage.to_string(),
        cwd: cwd.map(Path::to_path_buf),
        source,
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Exit code, or the negated signal number when the child was killed.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or_else(|| -status.signal().unwrap_or(0))
}

fn decode(spec: &CommandSpec, bytes: Vec<u8>) -> CommandResult<String> {
    match spec.encoding() {
        Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Encoding::Utf8Strict => String::from_utf8(bytes).map_err(|_| {
            log::error!("Shell Command Decode Error");
            CommandError::Decode {
                command: spec.command().to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn quick_runner() -> SystemRunner {
        SystemRunner::with_config(RunnerConfig {
            settle_delay: Duration::ZERO,
            ..RunnerConfig::default()
        })
    }

    #[test]
    fn captures_stdout_and_return_code() {
        let result = quick_runner().run("echo hello").unwrap();
        assert_eq!(result.return_code, 0);
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
    }

    #[test]
    fn pipe_feeds_previous_stdout() {
        let result = quick_runner().run("printf 'b\\na\\nc\\n' | sort | head -n 2").unwrap();
        assert_eq!(result.stdout, "a\nb\n");
    }

    #[test]
    fn failing_intermediate_stage_stops_the_chain() {
        let err = quick_runner().run("false | cat").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Execution { ref command, return_code: 1 } if command == "false"
        ));
    }

    #[test]
    fn missing_executable_is_start_error() {
        let err = quick_runner()
            .run("engkit-definitely-not-a-real-binary --flag")
            .unwrap_err();
        assert!(matches!(err, CommandError::Start { .. }));
    }

    #[test]
    fn cwd_and_env_are_applied() {
        let dir = tempdir().unwrap();
        let spec = CommandSpec::new("pwd").with_cwd(dir.path());
        let result = quick_runner().get_shell_cmd(&spec).unwrap();
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());

        let env = [
            ("PATH".to_string(), std::env::var("PATH").unwrap_or_default()),
            ("ENGKIT_MARKER".to_string(), "42".to_string()),
        ]
        .into_iter()
        .collect();
        let spec = CommandSpec::new("printenv ENGKIT_MARKER").with_env(env);
        assert_eq!(quick_runner().get_shell_cmd(&spec).unwrap().stdout, "42\n");
    }

    #[test]
    fn strict_encoding_rejects_invalid_utf8() {
        let spec = CommandSpec::new("printf '\\377'").with_encoding(Encoding::Utf8Strict);
        let err = quick_runner().get_shell_cmd(&spec).unwrap_err();
        assert!(matches!(err, CommandError::Decode { .. }));

        let spec = CommandSpec::new("printf '\\377'");
        assert_eq!(quick_runner().get_shell_cmd(&spec).unwrap().stdout, "\u{FFFD}");
    }

    #[test]
    fn raised_interrupt_terminates_child() {
        let flag = InterruptFlag::new();
        let runner = quick_runner().with_interrupt(flag.clone());
        let raiser = {
            let flag = flag.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(150));
                flag.raise();
            })
        };
        let started = Instant::now();
        let err = runner.run("sleep 30").unwrap_err();
        raiser.join().unwrap();
        assert!(matches!(err, CommandError::Interrupted { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!flag.is_raised());
    }

    #[test]
    fn interrupt_raised_before_start_skips_the_command() {
        let flag = InterruptFlag::new();
        flag.raise();
        let err = quick_runner()
            .with_interrupt(flag)
            .run("engkit-definitely-not-a-real-binary")
            .unwrap_err();
        assert!(matches!(err, CommandError::Interrupted { .. }));
    }

    #[test]
    fn interrupt_during_a_short_command_is_not_lost() {
        let flag = InterruptFlag::new();
        let runner = quick_runner().with_interrupt(flag.clone());
        let raiser = {
            let flag = flag.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                flag.raise();
            })
        };
        let err = runner.run("sleep 0.07").unwrap_err();
        raiser.join().unwrap();
        assert!(matches!(err, CommandError::Interrupted { ref command } if command == "sleep 0.07"));
        assert!(!flag.is_raised());
    }

    #[test]
    fn interrupt_cuts_the_settle_delay_short() {
        let flag = InterruptFlag::new();
        let runner = SystemRunner::with_config(RunnerConfig {
            settle_delay: Duration::from_secs(5),
            poll_interval: Duration::from_millis(20),
            ..RunnerConfig::default()
        })
        .with_interrupt(flag.clone());
        let raiser = {
            let flag = flag.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(200));
                flag.raise();
            })
        };
        let started = Instant::now();
        let err = runner.call("true").unwrap_err();
        raiser.join().unwrap();
        assert!(matches!(err, CommandError::Interrupted { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn final_stage_stderr_is_reported() {
        let result = quick_runner().run("sh -c 'echo out; echo err >&2'").unwrap();
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
    }

    #[test]
    fn earlier_stage_stderr_is_left_out() {
        let result = quick_runner()
            .run("sh -c 'echo e1 >&2; echo x' | sh -c 'cat; echo e2 >&2'")
            .unwrap();
        assert_eq!(result.stdout, "x\n");
        assert_eq!(result.stderr, "e2\n");
    }

    #[test]
    fn quoted_pipe_reaches_the_program() {
        let result = quick_runner().run("echo 'a|b'").unwrap();
        assert_eq!(result.stdout, "a|b\n");

        let result = quick_runner()
            .run("printf 'VGA\\nx\\n3D\\n' | grep -E 'VGA|3D'")
            .unwrap();
        assert_eq!(result.stdout, "VGA\n3D\n");
    }

    #[test]
    fn quoted_wildcard_is_not_globbed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("x.log"), "").unwrap();
        let spec = CommandSpec::new("echo '*'").with_cwd(dir.path());
        assert_eq!(quick_runner().get_shell_cmd(&spec).unwrap().stdout, "*\n");

        let spec = CommandSpec::new("echo *").with_cwd(dir.path());
        assert_eq!(quick_runner().get_shell_cmd(&spec).unwrap().stdout, "x.log\n");
    }

    #[test]
    fn call_writes_final_stage_to_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let file = std::fs::File::create(&path).unwrap();
        let code = quick_runner()
            .call_shell_cmd(&CommandSpec::new("echo one | tr a-z A-Z"), OutputSink::File(file))
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ONE\n");
    }

    #[test]
    fn killed_child_reports_negative_signal() {
        let err = quick_runner().run("sh -c 'kill -9 $$'").unwrap_err();
        assert_eq!(err.return_code(), Some(-9));
    }
}

use engkit_exec::{CommandError, CommandSpec, ReturnCodePolicy, RunnerConfig, ShellOps, SystemRunner};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn runner() -> SystemRunner {
    SystemRunner::with_config(RunnerConfig {
        settle_delay: Duration::ZERO,
        ..RunnerConfig::default()
    })
}

#[test]
fn two_stage_pipe_matches_standalone_second_stage() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("data.txt"), "gamma\nalpha\nbeta\nalpha\n").unwrap();

    let piped = runner()
        .get_shell_cmd(&CommandSpec::new("cat data.txt | sort -u").with_cwd(dir.path()))
        .unwrap();

    let first = Command::new("cat")
        .arg("data.txt")
        .current_dir(dir.path())
        .output()
        .unwrap();
    let mut second = Command::new("sort")
        .arg("-u")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    second
        .stdin
        .take()
        .unwrap()
        .write_all(&first.stdout)
        .unwrap();
    let standalone = second.wait_with_output().unwrap();

    assert_eq!(piped.stdout, String::from_utf8(standalone.stdout).unwrap());
    assert_eq!(piped.stderr, String::from_utf8(standalone.stderr).unwrap());
    assert_eq!(piped.return_code, 0);
}

#[test]
fn plain_command_equals_direct_invocation() {
    let result = runner().run("echo -n plain words").unwrap();
    let direct = Command::new("echo")
        .args(["-n", "plain", "words"])
        .output()
        .unwrap();
    assert_eq!(result.stdout.as_bytes(), direct.stdout.as_slice());
}

#[test]
fn only_final_stage_stderr_is_reported() {
    let result = runner()
        .run("sh -c 'echo first >&2; echo data' | sh -c 'cat; echo last >&2'")
        .unwrap();
    assert_eq!(result.stdout, "data\n");
    assert_eq!(result.stderr, "last\n");
}

#[test]
fn exit_one_without_exemption_keeps_command_text() {
    let err = runner().run("sh -c 'exit 1'").unwrap_err();
    match err {
        CommandError::Execution {
            command,
            return_code,
        } => {
            assert_eq!(command, "sh -c 'exit 1'");
            assert_eq!(return_code, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_exemption_allows_specific_code() {
    let config = RunnerConfig {
        policy: ReturnCodePolicy::empty().with_exemption("sh -c 'exit 3'", 3),
        settle_delay: Duration::ZERO,
        ..RunnerConfig::default()
    };
    let result = SystemRunner::with_config(config)
        .run("sh -c 'exit 3'")
        .unwrap();
    assert_eq!(result.return_code, 3);
}

#[test]
fn call_shell_cmd_pauses_after_completion() {
    let config = RunnerConfig {
        settle_delay: Duration::from_millis(300),
        ..RunnerConfig::default()
    };
    let start = Instant::now();
    let code = SystemRunner::with_config(config).call("true").unwrap();
    assert_eq!(code, 0);
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[test]
fn call_shell_cmd_enforces_policy() {
    let err = runner().call("false").unwrap_err();
    assert_eq!(err.return_code(), Some(1));
}

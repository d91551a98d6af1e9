use anyhow::{Context, Result};
use clap::Parser;
use engkit_core::{write_file, Cli, WriteMode};
use engkit_exec::{CommandSpec, InterruptFlag, OutputSink, RunnerConfig, ShellOps, SystemRunner};
use engkit_log::{log_error, log_file_path, log_info, log_raw};
use std::time::Duration;

mod cli;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let session = Cli::new("engrun", env!("CARGO_PKG_VERSION"), args.session_args())
        .context("failed to start log session")?;
    let _guard = session.install();
    session.print_versions();
    session.print_logdir();

    let interrupt = InterruptFlag::register().context("failed to register signal handlers")?;
    let runner = SystemRunner::with_config(RunnerConfig {
        settle_delay: Duration::from_millis(args.settle_ms),
        ..RunnerConfig::default()
    })
    .with_interrupt(interrupt);

    let outcome = run_commands(&session, &runner, &args);
    save_stdout(&session)?;
    outcome
}

fn run_commands(session: &Cli, runner: &dyn ShellOps, args: &cli::Args) -> Result<()> {
    let mut entries: Vec<(String, String)> = Vec::with_capacity(args.commands.len());

    let mut outcome = Ok(());
    for command in &args.commands {
        log_info!(session, "Running: {}", command);
        let spec = CommandSpec::new(command.as_str());
        let step = if args.call {
            runner
                .call_shell_cmd(&spec, OutputSink::Inherit)
                .map(|code| format!("returncode: {}", code))
        } else {
            runner.get_shell_cmd(&spec).map(|result| {
                log_raw!(session, "{}", result.stdout.trim_end());
                log_info!(session, "returncode: {}", result.return_code);
                result.stdout
            })
        };
        match step {
            Ok(text) => entries.push((command.clone(), text)),
            Err(err) => {
                log_error!(session, "{}", err);
                outcome = Err(err).with_context(|| format!("command failed: {}", command));
                break;
            }
        }
    }

    session
        .write_logs(entries, WriteMode::Truncate)
        .context("failed to write test log")?;
    outcome
}

fn save_stdout(session: &Cli) -> Result<()> {
    let path = log_file_path(session.logdir(), "engrun", "stdout", std::process::id());
    let stdout = session.get_stdout().context("failed to fetch session output")?;
    write_file(&path, &stdout, WriteMode::Truncate).context("failed to save session output")?;
    Ok(())
}

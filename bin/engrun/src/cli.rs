//! CLI argument parsing for engrun

use clap::Parser;
use engkit_core::CliArgs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "engrun")]
#[command(about = "Run system commands inside an engkit log session")]
#[command(long_about = "Run system commands inside an engkit log session.\n\n\
    Each command may be a `|` pipe chain. Output is captured, logged and \
    collected into <logdir>/engrun.test.<pid>.log.")]
pub struct Args {
    /// Run identifier (default: random three-word phrase)
    #[arg(long)]
    pub log_id: Option<String>,

    /// Log directory prefix (default: /tmp/logs)
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Show debug records on the console and in the command log
    #[arg(long)]
    pub debug: bool,

    /// Fire-and-forget: stream stdout to the terminal instead of capturing it
    #[arg(long)]
    pub call: bool,

    /// Pause after each --call command, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub settle_ms: u64,

    /// Commands to run, in order
    #[arg(required = true, last = true)]
    pub commands: Vec<String>,
}

impl Args {
    pub fn session_args(&self) -> CliArgs {
        CliArgs {
            log_id: self.log_id.clone(),
            prefix: self.prefix.clone(),
            debug: self.debug,
        }
    }
}

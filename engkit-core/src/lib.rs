//! engkit core library.
//!
//! `engkit-core` ties the command runner and session logging together for
//! engineering command-line tools, and carries the small helpers those tools
//! share: run identifiers, structured test logs, file writes and value checks.

pub mod cli;
pub mod fileio;
pub mod logs;
pub mod randomword;
pub mod testvar;
pub mod versions;

pub use cli::{Cli, CliArgs};
pub use engkit_error::{CommandError, EngError, EngResult, LogError};
pub use fileio::{write_file, WriteMode};
pub use logs::get_formatted_logs;
pub use randomword::{get_random_phrase, FixedPhrase, PhraseOptions, PhraseSource, WordListPhrase};
pub use testvar::{check_null, check_path, get_debug};

//! Per-run log directory naming.
//!
//! Layout: `<prefix>/<hostname>/<suffix>/<program>.<YYYY.MM.DD-HHMMSS>`
//! e.g. `/tmp/logs/ribeye/favorable-wire/runxhpl.2020.06.15-134944`.

use chrono::{Local, NaiveDateTime};
use engkit_error::{LogError, LogResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_PREFIX: &str = "/tmp/logs";
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirOptions {
    pub prefix: PathBuf,
    /// Usually the run identifier; empty means no extra level.
    pub suffix: String,
}

impl Default for LogDirOptions {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from(DEFAULT_LOG_PREFIX),
            suffix: String::new(),
        }
    }
}

impl LogDirOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

/// Log directory for `program`, stamped with the current local time.
///
/// Pure path arithmetic: nothing is created on disk.
pub fn get_logdir(program: &str, opts: &LogDirOptions) -> PathBuf {
    compose_logdir(program, opts, &hostname(), Local::now().naive_local())
}

pub fn compose_logdir(
    program: &str,
    opts: &LogDirOptions,
    hostname: &str,
    at: NaiveDateTime,
) -> PathBuf {
    let mut dir = opts.prefix.join(hostname);
    if !opts.suffix.is_empty() {
        dir.push(&opts.suffix);
    }
    dir.push(format!("{}.{}", program, at.format(TIMESTAMP_FORMAT)));
    dir
}

pub fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Create `dir` and its parents. An existing directory is fine.
pub fn ensure_logdir(dir: &Path) -> LogResult<()> {
    fs::create_dir_all(dir).map_err(|source| {
        log::error!("Log Directory Create Error");
        log::debug!("logdir: {}", dir.display());
        LogError::Io {
            path: dir.to_path_buf(),
            source,
        }
    })
}

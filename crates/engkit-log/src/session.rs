//! Standard session logger assembly.
//!
//! Each session is its own `tracing_subscriber` registry wrapped in a
//! [`Dispatch`]. Four formatted layers (file, console, buffer, debug file) take
//! every target except `noformat`; one raw layer writes `noformat` records into
//! the debug file:
//!
//! ```text
//! D/P.cmd.<pid>.log      formatted session log
//! D/P.debug.<pid>.log    always-on debug log + unformatted passthrough
//! ```

use crate::format::SessionFormat;
use crate::logdir::{get_logdir, LogDirOptions};
use crate::writer::{file_appender, SharedBuffer};
use engkit_error::{LogError, LogResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer, Registry};

/// Target of records that skip the line prefix and go only to the debug file.
pub const NOFORMAT_LOGGER: &str = "noformat";

/// `{logdir}/{program}.{kind}.{pid}.log`
pub fn log_file_path(logdir: &Path, program: &str, kind: &str, pid: u32) -> PathBuf {
    logdir.join(format!("{}.{}.{}.log", program, kind, pid))
}

/// Named roles of the standard layer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Formatted session log, `P.cmd.N.log`.
    File,
    Console,
    /// In-memory copy of the session, fetched once via `get_stdout`.
    Buffer,
    /// Always-on diagnostic trail, `P.debug.N.log`.
    Debug,
    /// Unformatted passthrough into the debug log.
    NoFormat,
}

/// Something that owns a session dispatcher; the `log_*!` macros accept it.
pub trait SessionLog {
    fn dispatch(&self) -> &Dispatch;
}

impl<T: SessionLog + ?Sized> SessionLog for &T {
    fn dispatch(&self) -> &Dispatch {
        (**self).dispatch()
    }
}

/// The dispatcher and file locations of one session.
#[derive(Debug, Clone)]
pub struct StdLoggers {
    dispatch: Dispatch,
    buffer: SharedBuffer,
    levels: Vec<(HandlerKind, LevelFilter)>,
    program: String,
    logdir: PathBuf,
    pid: u32,
}

/// Formatted records at `level` and above, `noformat` excluded.
fn formatted(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(NOFORMAT_LOGGER, LevelFilter::OFF)
}

/// Build the standard session for `program`.
///
/// `logdir` must already exist; when `None` it is derived with default
/// [`LogDirOptions`]. With `debug` off the file, console and buffer layers
/// only pass `INFO` and above; the debug-file layer always takes everything.
pub fn get_std_logger(program: &str, debug: bool, logdir: Option<&Path>) -> LogResult<StdLoggers> {
    let logdir = match logdir {
        Some(dir) => dir.to_path_buf(),
        None => get_logdir(program, &LogDirOptions::default()),
    };
    let pid = std::process::id();
    let visible = if debug {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let debug_log = log_file_path(&logdir, program, "debug", pid);
    let buffer = SharedBuffer::new();

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .event_format(SessionFormat::Simple)
                .with_ansi(false)
                .with_writer(file_appender(&log_file_path(&logdir, program, "cmd", pid))?)
                .with_filter(formatted(visible)),
        )
        .with(
            fmt::layer()
                .event_format(SessionFormat::Simple)
                .with_ansi(false)
                .with_writer(io::stdout)
                .with_filter(formatted(visible)),
        )
        .with(
            fmt::layer()
                .event_format(SessionFormat::Simple)
                .with_ansi(false)
                .with_writer(buffer.clone())
                .with_filter(formatted(visible)),
        )
        .with(
            fmt::layer()
                .event_format(SessionFormat::Simple)
                .with_ansi(false)
                .with_writer(file_appender(&debug_log)?)
                .with_filter(formatted(LevelFilter::TRACE)),
        )
        .with(
            fmt::layer()
                .event_format(SessionFormat::Raw)
                .with_ansi(false)
                .with_writer(file_appender(&debug_log)?)
                .with_filter(Targets::new().with_target(NOFORMAT_LOGGER, LevelFilter::TRACE)),
        );

    Ok(StdLoggers {
        dispatch: Dispatch::new(subscriber),
        buffer,
        levels: vec![
            (HandlerKind::File, visible),
            (HandlerKind::Console, visible),
            (HandlerKind::Buffer, visible),
            (HandlerKind::Debug, LevelFilter::TRACE),
            (HandlerKind::NoFormat, LevelFilter::TRACE),
        ],
        program: program.to_string(),
        logdir,
        pid,
    })
}

impl SessionLog for StdLoggers {
    fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl StdLoggers {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn logdir(&self) -> &Path {
        &self.logdir
    }

    /// Level a layer was built with; `None` for a detached buffer.
    pub fn handler_level(&self, kind: HandlerKind) -> Option<LevelFilter> {
        if kind == HandlerKind::Buffer && !self.buffer.is_attached() {
            return None;
        }
        self.levels
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, level)| *level)
    }

    pub fn cmd_log(&self) -> PathBuf {
        log_file_path(&self.logdir, &self.program, "cmd", self.pid)
    }

    pub fn debug_log(&self) -> PathBuf {
        log_file_path(&self.logdir, &self.program, "debug", self.pid)
    }

    /// Companion file for structured test output.
    pub fn test_log(&self) -> PathBuf {
        log_file_path(&self.logdir, &self.program, "test", self.pid)
    }

    /// Text captured by the buffer layer since the session started.
    ///
    /// The buffer is detached; later records are no longer mirrored and a
    /// second call returns [`LogError::BufferDetached`].
    pub fn get_stdout(&self) -> LogResult<String> {
        crate::log_debug!(self, "Saving STDOUT");
        match self.buffer.detach() {
            Some(text) => Ok(text),
            None => {
                crate::log_error!(self, "Buffer Detached Error");
                Err(LogError::BufferDetached)
            }
        }
    }
}

//! engkit session logging.
//!
//! Each program run gets a unique, timestamped log directory and a
//! `tracing_subscriber` registry of its own: a formatted command log, the
//! console, an in-memory buffer that can be fetched once, and an always-on
//! debug file, each layer with an independent level.
//!
//! Sessions are plain values. Log to one with the [`log_info!`] family of
//! macros, or call [`install`] to make it the thread's default so that `log`
//! facade records from engkit crates land there too.

pub mod bridge;
pub mod format;
pub mod logdir;
mod macros;
pub mod session;
pub mod writer;

pub use bridge::{install, SessionGuard};
pub use format::{level_name, module_name, SessionFormat};
pub use logdir::{compose_logdir, ensure_logdir, get_logdir, hostname, LogDirOptions};
pub use session::{get_std_logger, log_file_path, HandlerKind, SessionLog, StdLoggers, NOFORMAT_LOGGER};
pub use writer::{file_appender, SharedBuffer};
pub use tracing::Dispatch;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}

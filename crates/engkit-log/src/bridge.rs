//! Routes the `log` facade to a session.
//!
//! `log` records are converted into `tracing` events once per process by
//! `tracing_log::LogTracer`. Each converted record then goes to the current
//! thread's default dispatcher, which [`install`] sets to a session until the
//! returned guard is dropped. Guards nest: dropping an inner guard restores the
//! outer session.

use crate::session::SessionLog;
use once_cell::sync::OnceCell;
use tracing::dispatcher::DefaultGuard;

static LOG_BRIDGE: OnceCell<bool> = OnceCell::new();

/// Keeps a session as the thread's default dispatcher while alive.
#[must_use = "the session stops receiving facade records when the guard is dropped"]
#[derive(Debug)]
pub struct SessionGuard {
    bridged: bool,
    _default: DefaultGuard,
}

impl SessionGuard {
    /// False when another `log` backend was registered first, in which case
    /// `log` macro records never reach the session. `tracing` events still do.
    pub fn is_bridged(&self) -> bool {
        self.bridged
    }
}

/// Make `session` the default dispatcher of the calling thread and route `log`
/// macros to it. Records with target `"noformat"` go to the raw layer.
pub fn install(session: &impl SessionLog) -> SessionGuard {
    let bridged = *LOG_BRIDGE.get_or_init(|| tracing_log::LogTracer::init().is_ok());
    SessionGuard {
        bridged,
        _default: tracing::dispatcher::set_default(session.dispatch()),
    }
}

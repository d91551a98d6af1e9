//! Logging macros bound to a session.
//!
//! ```no_run
//! use engkit_log::{get_std_logger, log_info, log_raw};
//!
//! let loggers = get_std_logger("demo", false, None)?;
//! log_info!(loggers, "running {}", "lscpu");
//! log_raw!(loggers, "Architecture: x86_64");
//! # Ok::<(), engkit_error::LogError>(())
//! ```
//!
//! The first argument is anything implementing [`SessionLog`](crate::SessionLog);
//! the record goes to that session whatever the thread's default dispatcher is.

#[doc(hidden)]
#[macro_export]
macro_rules! __session_event {
    ($session:expr, $level:ident, $($arg:tt)+) => {
        $crate::__private::tracing::dispatcher::with_default(
            $crate::SessionLog::dispatch(&$session),
            || $crate::__private::tracing::$level!($($arg)+),
        )
    };
}

#[macro_export]
macro_rules! log_trace {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, error, $($arg)+)
    };
}

/// Unformatted block into the session's debug file.
#[macro_export]
macro_rules! log_raw {
    ($session:expr, $($arg:tt)+) => {
        $crate::__session_event!($session, info, target: $crate::NOFORMAT_LOGGER, $($arg)+)
    };
}

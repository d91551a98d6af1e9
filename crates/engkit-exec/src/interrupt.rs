//! SIGINT/SIGTERM observation for blocking command waits.

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag raised when the process receives an interrupt.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// A flag not connected to any signal; raise it manually.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag raised by SIGINT and SIGTERM.
    ///
    /// Registering replaces the default terminate-on-signal behaviour, so the
    /// caller is responsible for exiting once a command reports `Interrupted`.
    pub fn register() -> io::Result<Self> {
        let flag = Self::new();
        signal_hook::flag::register(SIGINT, Arc::clone(&flag.0))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&flag.0))?;
        Ok(flag)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Read and clear the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_flag() {
        let flag = InterruptFlag::new();
        assert!(!flag.take());
        flag.clone().raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.is_raised());
    }
}

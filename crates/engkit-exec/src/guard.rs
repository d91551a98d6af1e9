use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use wait_timeout::ChildExt;

/// RAII guard that kills and reaps a child process when dropped.
#[derive(Debug)]
pub struct ChildGuard {
    child: Child,
    command: String,
    active: bool,
}

impl ChildGuard {
    pub fn new(child: Child, command: impl Into<String>) -> Self {
        Self {
            child,
            command: command.into(),
            active: true,
        }
    }

    pub fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Mark the child as reaped so dropping the guard leaves it alone.
    pub fn release(mut self) {
        self.active = false;
    }

    /// Ask the child to stop with SIGTERM, then kill it once `grace` expires.
    pub fn terminate(&mut self, grace: Duration) -> Option<ExitStatus> {
        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(err) = signal::kill(pid, Signal::SIGTERM) {
            log::debug!("SIGTERM to {} ({}) failed: {}", pid, self.command, err);
        }
        let status = match self.child.wait_timeout(grace) {
            Ok(Some(status)) => Some(status),
            _ => {
                let _ = self.child.kill();
                self.child.wait().ok()
            }
        };
        self.active = false;
        status
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        log::warn!("child guard killing unfinished process: {}", self.command);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

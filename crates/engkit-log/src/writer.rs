//! Destinations for session layers.

use engkit_error::{LogError, LogResult};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;

/// Appending writer for `path`. The parent directory must already exist.
pub fn file_appender(path: &Path) -> LogResult<RollingFileAppender> {
    let io_err = |source| LogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let (dir, name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name.to_string_lossy()),
        _ => {
            return Err(io_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "log path has no file name",
            )))
        }
    };
    if !dir.is_dir() {
        return Err(io_err(io::Error::new(
            io::ErrorKind::NotFound,
            "log directory does not exist",
        )));
    }
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.as_ref())
        .build(dir)
        .map_err(|err| io_err(io::Error::other(err.to_string())))
}

/// In-memory capture that can be detached once.
///
/// Clones share the same text. After [`SharedBuffer::detach`] writes are
/// accepted and dropped.
#[derive(Debug, Clone)]
pub struct SharedBuffer(Arc<Mutex<Option<String>>>);

impl Default for SharedBuffer {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Some(String::new()))))
    }
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Take the captured text, or `None` if it was already taken.
    pub fn detach(&self) -> Option<String> {
        self.lock().take()
    }

    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(text) = self.lock().as_mut() {
            text.push_str(&String::from_utf8_lossy(buf));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

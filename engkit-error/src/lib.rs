use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type CommandResult<T> = Result<T, CommandError>;
pub type LogResult<T> = Result<T, LogError>;
pub type EngResult<T> = Result<T, EngError>;

/// Failures raised while starting or running an external command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command could not be started: {command} (cwd={})", display_cwd(.cwd))]
    Start {
        command: String,
        cwd: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("Command failed with non-zero return code: {command} (returncode={return_code})")]
    Execution { command: String, return_code: i32 },

    #[error("Command interrupted: {command}")]
    Interrupted { command: String },

    #[error("Command could not be parsed: {command}: {reason}")]
    Parse { command: String, reason: String },

    #[error("Command output is not valid UTF-8: {command}")]
    Decode { command: String },

    #[error("I/O error while running {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Command line the error refers to.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Start { command, .. }
            | CommandError::Execution { command, .. }
            | CommandError::Interrupted { command }
            | CommandError::Parse { command, .. }
            | CommandError::Decode { command }
            | CommandError::Io { command, .. } => command,
        }
    }

    /// Return code carried by an execution failure.
    pub fn return_code(&self) -> Option<i32> {
        match self {
            CommandError::Execution { return_code, .. } => Some(*return_code),
            _ => None,
        }
    }
}

fn display_cwd(cwd: &Option<PathBuf>) -> String {
    match cwd {
        Some(path) => path.display().to_string(),
        None => "<inherited>".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Buffer handler already detached; stdout can only be fetched once")]
    BufferDetached,

    #[error("Log file error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum EngError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("Variable has null value: {0}")]
    NullValue(String),

    #[error("Path does not exist: {}", .0.display())]
    PathNotExist(PathBuf),

    #[error("File error: {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_reports_command_and_code() {
        let err = CommandError::Execution {
            command: "smartctl -a /dev/sda".to_string(),
            return_code: 1,
        };
        assert_eq!(err.command(), "smartctl -a /dev/sda");
        assert_eq!(err.return_code(), Some(1));
        assert_eq!(
            err.to_string(),
            "Command failed with non-zero return code: smartctl -a /dev/sda (returncode=1)"
        );
    }

    #[test]
    fn start_error_mentions_cwd() {
        let err = CommandError::Start {
            command: "nope".to_string(),
            cwd: Some(PathBuf::from("/srv")),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("cwd=/srv"));
        assert_eq!(err.return_code(), None);
    }

    #[test]
    fn eng_error_wraps_command_error_transparently() {
        let err: EngError = CommandError::Interrupted {
            command: "sleep 10".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Command interrupted: sleep 10");
    }
}

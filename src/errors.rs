use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a command could not be run to completion.
///
/// A non-zero exit status is not an error: it is reported through
/// [`Execution::exit_code`](crate::command::Execution::exit_code).
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no command given")]
    EmptyCommand,

    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program}: permission denied")]
    PermissionDenied { program: String },

    #[error("{program}: failed to start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("can't open {} for writing: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{program}: failed to collect output: {source}")]
    Capture {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    /// Classify an error returned by `std::process::Command::spawn`.
    pub(crate) fn from_spawn(program: &str, source: io::Error) -> Self {
        let program = program.to_string();
        match source.kind() {
            io::ErrorKind::NotFound => ExecError::NotFound { program },
            io::ErrorKind::PermissionDenied => ExecError::PermissionDenied { program },
            _ => ExecError::Spawn { program, source },
        }
    }
}

use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB host-protocol operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("Failed to connect to ADB daemon at {address}: {source}. Is the adb server running?")]
    Connection {
        address: String,
        source: std::io::Error,
    },

    #[error("I/O error talking to ADB daemon: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("ADB protocol error: {description}")]
    Protocol { description: String },

    #[error("ADB daemon rejected '{command}': {message}")]
    DaemonRejected { command: String, message: String },

    #[error("Invalid argument: {description}")]
    InvalidArgument { description: String },

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: std::time::Duration,
        description: String,
    },

    // Displayed verbatim, callers match on the installer output.
    #[error("{message}")]
    InstallFailed { message: String },
}

impl AdbError {
    pub(crate) fn protocol(description: impl Into<String>) -> Self {
        AdbError::Protocol {
            description: description.into(),
        }
    }

    pub(crate) fn invalid_argument(description: impl Into<String>) -> Self {
        AdbError::InvalidArgument {
            description: description.into(),
        }
    }

    /// Check if this error means the daemon could not be reached at all
    pub fn is_connection_failure(&self) -> bool {
        match self {
            AdbError::Connection { .. } => true,
            AdbError::Io { source } => matches!(
                source.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// The daemon's explanation for a `FAIL` status, if that is what this error is.
    pub fn daemon_message(&self) -> Option<&str> {
        match self {
            AdbError::DaemonRejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

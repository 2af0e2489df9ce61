//! Driver Control Error Types

use thiserror::Error;

/// Errors from driver control commands
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Driver control not supported on this platform")]
    UnsupportedPlatform,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    CommandFailed {
        program: &'static str,
        code: Option<i32>,
        stderr: String,
    },
}

/// Result type alias for driver control operations
pub type DriverResult<T> = Result<T, DriverError>;

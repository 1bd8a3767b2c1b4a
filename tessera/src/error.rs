use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed ({status}): {command}: {stderr}")]
    Execution {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("OCR operation timed out after {limit:?}")]
    Timeout { limit: Duration },

    #[error("Output discovery error: {0}")]
    Discovery(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TesseraError {
    /// Exit code of the failed binary, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            TesseraError::Execution { status, .. } => status.code(),
            _ => None,
        }
    }
}

impl From<glob::PatternError> for TesseraError {
    fn from(e: glob::PatternError) -> Self {
        TesseraError::Discovery(format!("invalid pattern: {e}"))
    }
}

impl From<glob::GlobError> for TesseraError {
    fn from(e: glob::GlobError) -> Self {
        TesseraError::Discovery(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TesseraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_maps_to_discovery() {
        let err = glob::Pattern::new("[").unwrap_err();
        let mapped: TesseraError = err.into();
        assert!(matches!(mapped, TesseraError::Discovery(_)));
        assert!(mapped.to_string().contains("invalid pattern"));
    }

    #[test]
    fn test_exit_code_only_for_execution_errors() {
        let err = TesseraError::Discovery("nothing".to_string());
        assert_eq!(err.exit_code(), None);
    }
}

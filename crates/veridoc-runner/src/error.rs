//! Error types for the runner

use thiserror::Error;

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that stop the runner before or around a validation run
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid command-line arguments
    #[error(transparent)]
    Args(#[from] clap::Error),

    /// IO error (e.g. the async runtime could not start)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Veridoc library error
    #[error("Veridoc error: {0}")]
    Veridoc(#[from] veridoc::VeridocError),
}

impl RunnerError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message() {
        let err = RunnerError::config("bad seed");
        assert_eq!(err.to_string(), "Configuration error: bad seed");
    }

    #[test]
    fn test_from_io() {
        let err: RunnerError = std::io::Error::other("no runtime").into();
        assert!(err.to_string().contains("no runtime"));
    }

    #[test]
    fn test_from_veridoc() {
        let err: RunnerError = veridoc::VeridocError::config("VERIDOC_ORDER").into();
        assert!(err.to_string().starts_with("Veridoc error:"));
    }
}

//! Result and error types for veridoc.

use crate::failure::Failure;
use thiserror::Error;

/// Result type for veridoc operations
pub type VeridocResult<T> = Result<T, VeridocError>;

/// Errors that abort a validation run.
///
/// Claim and setup failures never show up here: they are recorded as
/// invalid or skipped claims. These are the driver-level failures that the
/// entry point hands to [`Reporter::terminate`](crate::Reporter::terminate).
#[derive(Debug, Error)]
pub enum VeridocError {
    /// Example teardown failed after its scripts ran
    #[error("Teardown failed for {example}: {failure}")]
    Teardown {
        /// Example description (or a placeholder for anonymous examples)
        example: String,
        /// Failure raised by the teardown callback
        failure: Failure,
    },

    /// A panic escaped the driver
    #[error("Validation panicked: {failure}")]
    Panicked {
        /// Failure built from the panic payload
        failure: Failure,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

impl VeridocError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a teardown error
    #[must_use]
    pub fn teardown(example: impl Into<String>, failure: Failure) -> Self {
        Self::Teardown {
            example: example.into(),
            failure,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = VeridocError::config("VERIDOC_ORDER must be 'default' or 'random'");
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.to_string().contains("VERIDOC_ORDER"));
    }

    #[test]
    fn test_teardown_error_names_example() {
        let err = VeridocError::teardown("closing the ledger", Failure::new("disk full"));
        let message = err.to_string();
        assert!(message.contains("closing the ledger"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn test_panicked_error_keeps_payload() {
        let err = VeridocError::Panicked {
            failure: Failure::new("boom"),
        };
        assert_eq!(err.to_string(), "Validation panicked: boom");
    }

    #[test]
    fn test_error_converts_to_failure() {
        let failure = Failure::from(VeridocError::config("bad seed"));
        assert_eq!(
            failure.message.as_deref(),
            Some("Configuration error: bad seed")
        );
    }
}

//! Failure payloads carried by invalid claims.
//!
//! A [`Failure`] is opaque to the engine: it is produced by caller callbacks
//! (returned as `Err`, converted from any [`std::error::Error`], or recovered
//! from a panic) and forwarded untouched to the reporter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Message used for the synthetic failure of a composite claim.
pub const NESTED_FAILURE_MESSAGE: &str = "One or more nested claims are invalid";

/// Why a claim (or a context callback) did not hold.
///
/// `expected` and `actual` are arbitrary serializable values; reporters
/// render them, the engine never compares them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Human readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Comparison operator (e.g. `equals`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Expected value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// Actual value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// Stack or backtrace text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl Failure {
    /// Create a failure with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Create a comparison failure.
    ///
    /// Values that cannot be serialized are replaced by a description of the
    /// serialization error so the failure itself is never lost.
    #[must_use]
    pub fn expected_actual<E, A>(operator: impl Into<String>, expected: &E, actual: &A) -> Self
    where
        E: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        Self {
            operator: Some(operator.into()),
            expected: Some(to_value(expected)),
            actual: Some(to_value(actual)),
            ..Self::default()
        }
    }

    /// Marker failure for composite claims with invalid children
    #[must_use]
    pub fn nested() -> Self {
        Self::new(NESTED_FAILURE_MESSAGE)
    }

    /// Recover a failure from a panic payload.
    ///
    /// A payload raised with `std::panic::panic_any(failure)` passes through
    /// unchanged; string payloads (`panic!`, `assert!`) become the message.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<Self>() {
            Ok(failure) => *failure,
            Err(payload) => {
                let message = if let Some(message) = payload.downcast_ref::<&str>() {
                    (*message).to_string()
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "callback panicked with a non-string payload".to_string()
                };
                Self::new(message)
            }
        }
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the stack text
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Whether this is the synthetic composite marker
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.message.as_deref() == Some(NESTED_FAILURE_MESSAGE)
    }

    /// Whether both expected and actual values are present
    #[must_use]
    pub const fn has_comparison(&self) -> bool {
        self.expected.is_some() && self.actual.is_some()
    }
}

/// Compare two values, failing with an `equals` comparison when they differ.
///
/// # Errors
///
/// Returns a failure carrying both values when `actual != expected`.
pub fn expect_equal<V>(actual: &V, expected: &V) -> Result<(), Failure>
where
    V: PartialEq + Serialize + ?Sized,
{
    if actual == expected {
        Ok(())
    } else {
        Err(Failure::expected_actual("equals", expected, actual))
    }
}

fn to_value<V: Serialize + ?Sized>(value: &V) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| Value::String(format!("<unserializable value: {err}>")))
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(message);
        }
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                let operator = self.operator.as_deref().unwrap_or("equals");
                write!(f, "expected {expected} ({operator}), actual {actual}")
            }
            _ => f.write_str("claim failed"),
        }
    }
}

/// Any error can be returned from a claim with `?`.
impl<E> From<E> for Failure
where
    E: std::error::Error,
{
    fn from(err: E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        let failure = Self::new(err.to_string());
        if causes.is_empty() {
            failure
        } else {
            failure.with_stack(causes.join("\n"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expected_actual_keeps_values_opaque() {
        let failure = Failure::expected_actual("equals", "something", &json!({"n": 3}));
        assert_eq!(failure.operator.as_deref(), Some("equals"));
        assert_eq!(failure.expected, Some(json!("something")));
        assert_eq!(failure.actual, Some(json!({"n": 3})));
        assert!(failure.has_comparison());
        assert!(failure.message.is_none());
    }

    #[test]
    fn test_display_prefers_message() {
        let failure = Failure::expected_actual("equals", &1, &2).with_message("off by one");
        assert_eq!(failure.to_string(), "off by one");
    }

    #[test]
    fn test_display_comparison() {
        let failure = Failure::expected_actual("equals", &10, &12);
        assert_eq!(failure.to_string(), "expected 10 (equals), actual 12");
        assert_eq!(Failure::default().to_string(), "claim failed");
    }

    #[test]
    fn test_from_panic_str_and_string() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(
            Failure::from_panic(payload).message.as_deref(),
            Some("static message")
        );

        let value = 7;
        let payload = std::panic::catch_unwind(|| panic!("value was {value}")).unwrap_err();
        assert_eq!(
            Failure::from_panic(payload).message.as_deref(),
            Some("value was 7")
        );
    }

    #[test]
    fn test_from_panic_failure_passes_through() {
        let original = Failure::expected_actual("equals", "a", "b").with_stack("fake stack");
        let thrown = original.clone();
        let payload = std::panic::catch_unwind(move || std::panic::panic_any(thrown)).unwrap_err();
        assert_eq!(Failure::from_panic(payload), original);
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ledger could not be opened")]
    struct OpenError(#[source] LockError);

    #[derive(Debug, thiserror::Error)]
    #[error("ledger is locked")]
    struct LockError;

    #[test]
    fn test_from_error_collects_causes() {
        let failure = Failure::from(OpenError(LockError));
        assert_eq!(failure.message.as_deref(), Some("ledger could not be opened"));
        assert_eq!(failure.stack.as_deref(), Some("caused by: ledger is locked"));
    }

    #[test]
    fn test_from_error_without_source() {
        let failure = Failure::from(LockError);
        assert_eq!(failure.message.as_deref(), Some("ledger is locked"));
        assert!(failure.stack.is_none());
    }

    #[test]
    fn test_expect_equal() {
        assert!(expect_equal(&10, &10).is_ok());
        let failure = expect_equal(&9, &10).unwrap_err();
        assert_eq!(failure.expected, Some(json!(10)));
        assert_eq!(failure.actual, Some(json!(9)));
        assert!(expect_equal("abc", "abc").is_ok());
    }

    #[test]
    fn test_nested_marker() {
        assert!(Failure::nested().is_nested());
        assert!(!Failure::new("boom").is_nested());
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let json = serde_json::to_value(Failure::new("boom")).unwrap();
        assert_eq!(json, json!({"message": "boom"}));
    }
}

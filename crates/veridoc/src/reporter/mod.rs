//! Reporter protocol and the bundled reporters.
//!
//! The driver streams events to a [`Reporter`] as results are produced:
//!
//! ```text
//! start(order)
//! ├── start_behavior(description)
//! │   ├── start_example(description?)
//! │   │   ├── record_* / skip_*   one call per top-level claim
//! │   └── end_example()
//! └── end_behavior()
//! end(summary) | terminate(failure)
//! ```
//!
//! Reporters are synchronous; the driver never awaits them.

mod format;
mod recording;
mod standard;
mod tap;

pub use format::Formatter;
pub use recording::{RecordingReporter, ReporterEvent};
pub use standard::StandardReporter;
pub use tap::TapReporter;

use crate::claim::ClaimResult;
use crate::failure::Failure;
use crate::summary::Summary;
use std::fmt;
use std::io::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

/// Receives the events of a validation run.
///
/// Skip callbacks receive a skipped result that mirrors the claim's shape,
/// so nested descriptions of skipped composites stay visible.
pub trait Reporter: Send {
    /// Run started with the given order description
    fn start(&mut self, order_description: &str);
    /// Run finished
    fn end(&mut self, summary: &Summary);
    /// Run aborted by a driver-level failure
    fn terminate(&mut self, failure: &Failure);

    /// Behavior started
    fn start_behavior(&mut self, description: &str);
    /// Behavior finished
    fn end_behavior(&mut self);
    /// Example started
    fn start_example(&mut self, description: Option<&str>);
    /// Example finished
    fn end_example(&mut self);

    /// Presupposition ran
    fn record_presupposition(&mut self, result: &ClaimResult);
    /// Action ran
    fn record_action(&mut self, result: &ClaimResult);
    /// Observation ran
    fn record_observation(&mut self, result: &ClaimResult);

    /// Presupposition was not run
    fn skip_presupposition(&mut self, result: &ClaimResult);
    /// Action was not run
    fn skip_action(&mut self, result: &ClaimResult);
    /// Observation was not run
    fn skip_observation(&mut self, result: &ClaimResult);
}

/// Reporter that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn start(&mut self, _order_description: &str) {}
    fn end(&mut self, _summary: &Summary) {}
    fn terminate(&mut self, _failure: &Failure) {}
    fn start_behavior(&mut self, _description: &str) {}
    fn end_behavior(&mut self) {}
    fn start_example(&mut self, _description: Option<&str>) {}
    fn end_example(&mut self) {}
    fn record_presupposition(&mut self, _result: &ClaimResult) {}
    fn record_action(&mut self, _result: &ClaimResult) {}
    fn record_observation(&mut self, _result: &ClaimResult) {}
    fn skip_presupposition(&mut self, _result: &ClaimResult) {}
    fn skip_action(&mut self, _result: &ClaimResult) {}
    fn skip_observation(&mut self, _result: &ClaimResult) {}
}

/// Line-oriented output sink for text reporters
pub trait Writer: Send + fmt::Debug {
    /// Write one line (without trailing newline)
    fn write_line(&mut self, line: &str);
}

/// Writes lines to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl Writer for ConsoleWriter {
    fn write_line(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{line}") {
            tracing::warn!(error = %err, "failed to write report line");
        }
    }
}

/// Collects lines in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferWriter {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Writer for BufferWriter {
    fn write_line(&mut self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

//! TAP version 13 reporter.
//!
//! Every top-level claim becomes one test point. A composite is a single
//! point whose diagnostics list its invalid leaves. Valid actions are
//! steps, not claims, so they produce no test point of their own.
//!
//! The `1..N` plan therefore counts top-level points, while the
//! `# valid`, `# invalid` and `# skipped` footer repeats the [`Summary`],
//! which counts leaves. The two differ whenever a composite is reported.

use super::{ConsoleWriter, Reporter, Writer};
use crate::claim::{ClaimKind, ClaimResult};
use crate::failure::Failure;
use crate::summary::Summary;
use serde_json::Value;

/// Emits the Test Anything Protocol
#[derive(Debug)]
pub struct TapReporter {
    writer: Box<dyn Writer>,
    count: usize,
}

impl Default for TapReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TapReporter {
    /// Reporter writing to stdout
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Box::new(ConsoleWriter),
            count: 0,
        }
    }

    /// Write to a different sink
    #[must_use]
    pub fn with_writer(mut self, writer: impl Writer + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    fn record(&mut self, kind: ClaimKind, result: &ClaimResult) {
        match result {
            ClaimResult::Valid { description, .. } => {
                if kind.counts_when_valid() {
                    self.count += 1;
                    let line = format!("ok {} {description}", self.count);
                    self.writer.write_line(&line);
                }
            }
            ClaimResult::Invalid {
                description, error, ..
            } => {
                self.count += 1;
                let line = format!("not ok {} {description}", self.count);
                self.writer.write_line(&line);
                self.write_diagnostics(result, error);
            }
            ClaimResult::Skipped { description, .. } => self.skip(description),
        }
    }

    fn skip(&mut self, description: &str) {
        self.count += 1;
        let line = format!("ok {} {description} # SKIP", self.count);
        self.writer.write_line(&line);
    }

    fn write_diagnostics(&mut self, result: &ClaimResult, error: &Failure) {
        self.writer.write_line("  ---");
        if error.is_nested() {
            self.writer
                .write_line(&format!("  message: {}", error.message.as_deref().unwrap_or("")));
            self.writer.write_line("  invalid:");
            for leaf in result.leaves().into_iter().filter(|leaf| leaf.is_invalid()) {
                self.writer
                    .write_line(&format!("    - {}", leaf.description()));
            }
        } else {
            if let Some(message) = error.message.as_deref().filter(|_| !error.has_comparison()) {
                self.writer.write_line(&format!("  message: {message}"));
            }
            if let Some(operator) = &error.operator {
                self.writer.write_line(&format!("  operator: {operator}"));
            }
            if let Some(expected) = &error.expected {
                self.writer
                    .write_line(&format!("  expected: {}", render_value(expected)));
            }
            if let Some(actual) = &error.actual {
                self.writer
                    .write_line(&format!("  actual:   {}", render_value(actual)));
            }
            if let Some(stack) = &error.stack {
                self.writer.write_line("  stack: |-");
                for line in stack.lines() {
                    self.writer.write_line(&format!("    {line}"));
                }
            }
        }
        self.writer.write_line("  ...");
    }
}

impl Reporter for TapReporter {
    fn start(&mut self, order_description: &str) {
        self.count = 0;
        self.writer.write_line("TAP version 13");
        self.writer.write_line(&format!("# {order_description}"));
    }

    fn end(&mut self, summary: &Summary) {
        self.writer.write_line(&format!("1..{}", self.count));
        self.writer
            .write_line(&format!("# valid {}", summary.valid));
        self.writer
            .write_line(&format!("# invalid {}", summary.invalid));
        self.writer
            .write_line(&format!("# skipped {}", summary.skipped));
    }

    fn terminate(&mut self, failure: &Failure) {
        let message = failure.to_string();
        let first = message.lines().next().unwrap_or_default();
        self.writer.write_line(&format!("Bail out! {first}"));
    }

    fn start_behavior(&mut self, description: &str) {
        self.writer.write_line(&format!("# {description}"));
    }

    fn end_behavior(&mut self) {}

    fn start_example(&mut self, description: Option<&str>) {
        if let Some(description) = description {
            self.writer.write_line(&format!("# {description}"));
        }
    }

    fn end_example(&mut self) {}

    fn record_presupposition(&mut self, result: &ClaimResult) {
        self.record(ClaimKind::Presupposition, result);
    }

    fn record_action(&mut self, result: &ClaimResult) {
        self.record(ClaimKind::Action, result);
    }

    fn record_observation(&mut self, result: &ClaimResult) {
        self.record(ClaimKind::Observation, result);
    }

    fn skip_presupposition(&mut self, result: &ClaimResult) {
        self.skip(result.description());
    }

    fn skip_action(&mut self, result: &ClaimResult) {
        self.skip(result.description());
    }

    fn skip_observation(&mut self, result: &ClaimResult) {
        self.skip(result.description());
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

//! Human readable console reporter.

use super::{ConsoleWriter, Formatter, Reporter, Writer};
use crate::claim::ClaimResult;
use crate::failure::Failure;
use crate::summary::Summary;
use crate::timer::Timer;
use serde_json::Value;
use std::time::Duration;

/// Claims slower than this get their duration printed
pub const DEFAULT_SLOW_CLAIM: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
enum Indicator {
    Presupposition,
    Action,
    Observation,
    Nested,
}

impl Indicator {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Presupposition => "+",
            Self::Action => "•",
            Self::Observation => "✔",
            Self::Nested => "➜",
        }
    }
}

const CHECK: &str = "✔";
const FAIL: &str = "✖";
const IGNORE: &str = "-";

/// Prints behaviors, examples and claim results as an indented outline,
/// followed by a summary.
///
/// ```text
/// Ledger
///
///   deposits add up
///
///   + an empty account
///   • deposit 10
///   ✖ the balance is 10
///
///     Actual
///
///       12
/// ```
#[derive(Debug)]
pub struct StandardReporter {
    writer: Box<dyn Writer>,
    format: Formatter,
    timer: Timer,
    slow_claim: Duration,
    order_description: Option<String>,
}

impl Default for StandardReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardReporter {
    /// Reporter writing to stdout with auto-detected colors
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Box::new(ConsoleWriter),
            format: Formatter::default(),
            timer: Timer::new(),
            slow_claim: DEFAULT_SLOW_CLAIM,
            order_description: None,
        }
    }

    /// Write to a different sink
    #[must_use]
    pub fn with_writer(mut self, writer: impl Writer + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Use a specific formatter
    #[must_use]
    pub const fn with_formatter(mut self, format: Formatter) -> Self {
        self.format = format;
        self
    }

    /// Print durations of claims at least this slow
    #[must_use]
    pub const fn with_slow_claim_threshold(mut self, threshold: Duration) -> Self {
        self.slow_claim = threshold;
        self
    }

    fn line(&mut self, text: &str) {
        self.writer.write_line(text);
    }

    fn space(&mut self) {
        self.writer.write_line("");
    }

    fn record(&mut self, indicator: Indicator, result: &ClaimResult) {
        match result {
            ClaimResult::Valid { .. } => self.write_valid(indicator, result, 1),
            ClaimResult::Invalid { error, .. } => self.write_invalid(result, error, 1),
            ClaimResult::Skipped { .. } => self.write_skipped(result, 1),
        }
    }

    fn slow_duration(&self, result: &ClaimResult) -> Option<String> {
        result
            .duration()
            .filter(|duration| *duration >= self.slow_claim)
            .map(|duration| self.format.cyan(&format!(" ({})", format_time(duration))))
    }

    fn write_valid(&mut self, indicator: Indicator, result: &ClaimResult, level: usize) {
        let mut description = self
            .format
            .green(&format!("{} {}", indicator.symbol(), result.description()));
        if let Some(duration) = self.slow_duration(result) {
            description.push_str(&duration);
        }
        let line = indent(level, &description);
        if level == 1 {
            self.line(&line);
        } else {
            let dimmed = self.format.dim(&line);
            self.line(&dimmed);
        }
        for child in result.subsumed() {
            self.write_nested(child, level + 1);
        }
    }

    fn write_nested(&mut self, result: &ClaimResult, level: usize) {
        match result {
            ClaimResult::Valid { .. } => self.write_valid(Indicator::Nested, result, level),
            ClaimResult::Invalid { error, .. } => self.write_invalid(result, error, level),
            ClaimResult::Skipped { .. } => self.write_skipped(result, level),
        }
    }

    fn write_invalid(&mut self, result: &ClaimResult, error: &Failure, level: usize) {
        let mut description = self
            .format
            .red(&self.format.bold(&format!("{FAIL} {}", result.description())));
        if let Some(duration) = self.slow_duration(result) {
            description.push_str(&duration);
        }
        self.line(&indent(level, &description));

        if !result.subsumed().is_empty() {
            for child in result.subsumed() {
                self.write_nested(child, level + 1);
            }
            return;
        }

        self.space();
        if let Some(message) = &error.message {
            for line in message.lines() {
                let text = indent(level + 1, &self.format.red(line));
                self.line(&text);
            }
            self.space();
        }
        if let (Some(expected), Some(actual)) = (&error.expected, &error.actual) {
            self.write_detail("Actual", actual, level + 1);
            self.write_detail("Expected", expected, level + 1);
        }
        if let Some(stack) = &error.stack {
            self.write_stack(stack, level + 1);
            self.space();
        }
    }

    fn write_detail(&mut self, title: &str, detail: &Value, level: usize) {
        let heading = indent(level, &self.format.dim(&self.format.underline(title)));
        self.line(&heading);
        self.space();
        for line in render_value(detail).lines() {
            self.line(&indent(level + 1, line));
        }
        self.space();
    }

    fn write_stack(&mut self, stack: &str, level: usize) {
        for frame in stack.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let text = indent(level, &self.format.dim(frame));
            self.line(&text);
        }
    }

    fn write_skipped(&mut self, result: &ClaimResult, level: usize) {
        let text = if level == 1 {
            self.format
                .yellow(&format!("{IGNORE} {}", result.description()))
        } else {
            self.format.dim(&self.format.yellow(&format!(
                "{} {}",
                Indicator::Nested.symbol(),
                result.description()
            )))
        };
        self.line(&indent(level, &text));
        for child in result.subsumed() {
            self.write_skipped(child, level + 1);
        }
    }
}

impl Reporter for StandardReporter {
    fn start(&mut self, order_description: &str) {
        self.order_description = Some(order_description.to_string());
        self.timer.start();
    }

    fn end(&mut self, summary: &Summary) {
        self.timer.stop();
        let title = self.format.bold(&self.format.underline("Summary"));
        self.line(&title);
        self.space();

        let behaviors = pluralize(summary.behaviors, "behavior");
        let examples = pluralize(summary.examples, "example");
        let claims = pluralize(summary.total_claims(), "claim");
        let duration = format!(
            "({})",
            format_time(self.timer.duration().unwrap_or_default())
        );
        let totals = self.format.bold(&format!(
            "{behaviors}, {examples}, {claims} {}",
            self.format.dim(&duration)
        ));
        self.line(&totals);

        if let Some(order) = self.order_description.clone() {
            self.space();
            let order = self.format.dim(&order);
            self.line(&order);
        }
        self.space();

        if summary.skipped == 0 && summary.invalid == 0 {
            let text = self
                .format
                .bold(&self.format.green(&format!("{CHECK} All claims are valid!")));
            self.line(&text);
        }
        if summary.invalid > 0 {
            let text = self.format.bold(&self.format.red(&format!(
                "{FAIL} {}",
                pluralize(summary.invalid, "invalid claim")
            )));
            self.line(&text);
        }
        if summary.skipped > 0 {
            let text = self.format.bold(&self.format.yellow(&format!(
                "{IGNORE} {}",
                pluralize(summary.skipped, "skipped claim")
            )));
            self.line(&text);
        }
        self.space();
    }

    fn terminate(&mut self, failure: &Failure) {
        let title = self
            .format
            .bold(&self.format.red("Failed to validate behaviors!"));
        self.line(&title);
        self.space();
        if let Some(order) = self.order_description.clone() {
            let order = self.format.dim(&order);
            self.line(&order);
            self.space();
        }
        let message = failure.to_string();
        for line in message.lines() {
            let text = indent(1, &self.format.red(line));
            self.line(&text);
        }
        self.space();
        if let Some(stack) = &failure.stack {
            self.write_stack(stack, 1);
            self.space();
        }
    }

    fn start_behavior(&mut self, description: &str) {
        let title = self.format.bold(&self.format.underline(description));
        self.line(&title);
        self.space();
    }

    fn end_behavior(&mut self) {
        self.space();
    }

    fn start_example(&mut self, description: Option<&str>) {
        if let Some(description) = description {
            let title = indent(1, &self.format.bold(description));
            self.line(&title);
            self.space();
        }
    }

    fn end_example(&mut self) {
        self.space();
    }

    fn record_presupposition(&mut self, result: &ClaimResult) {
        self.record(Indicator::Presupposition, result);
    }

    fn record_action(&mut self, result: &ClaimResult) {
        self.record(Indicator::Action, result);
    }

    fn record_observation(&mut self, result: &ClaimResult) {
        self.record(Indicator::Observation, result);
    }

    fn skip_presupposition(&mut self, result: &ClaimResult) {
        self.write_skipped(result, 1);
    }

    fn skip_action(&mut self, result: &ClaimResult) {
        self.write_skipped(result, 1);
    }

    fn skip_observation(&mut self, result: &ClaimResult) {
        self.write_skipped(result, 1);
    }
}

fn indent(level: usize, text: &str) -> String {
    format!("{}{text}", "  ".repeat(level))
}

fn pluralize(total: usize, name: &str) -> String {
    if total == 1 {
        format!("{total} {name}")
    } else {
        format!("{total} {name}s")
    }
}

/// Milliseconds below half a second, seconds (up to two decimals) above.
fn format_time(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 500 {
        return format!("{millis}ms");
    }
    let seconds = format!("{:.2}", duration.as_secs_f64());
    let seconds = seconds.trim_end_matches('0').trim_end_matches('.');
    format!("{seconds}s")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

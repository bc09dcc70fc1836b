//! Driver that walks behaviors and examples in order.

use crate::behavior::Behavior;
use crate::example::{ExampleOutcome, RunMode, ValidatableExample};
use crate::order::OrderProvider;
use crate::reporter::Reporter;
use crate::result::VeridocResult;
use crate::summary::Summary;
use tracing::{debug, debug_span, info, Instrument};

/// A set of behaviors validated together
#[derive(Debug)]
pub struct Documentation<'a> {
    behaviors: &'a [Behavior],
    order: &'a dyn OrderProvider,
    fail_fast: bool,
}

impl<'a> Documentation<'a> {
    /// Bind behaviors to an order and a fail-fast policy
    #[must_use]
    pub fn new(behaviors: &'a [Behavior], order: &'a dyn OrderProvider, fail_fast: bool) -> Self {
        Self {
            behaviors,
            order,
            fail_fast,
        }
    }

    /// Run every behavior, streaming events to the reporter.
    ///
    /// Returns the accumulated counts, partial when fail-fast stopped the
    /// run. Does not call `start`, `end` or `terminate`; that is left to
    /// the entry point.
    pub async fn validate(&self, reporter: &mut dyn Reporter) -> VeridocResult<Summary> {
        let picked_only = self.behaviors.iter().any(Behavior::has_picked);
        let mut summary = Summary::default();

        for behavior in self.order.order(self.behaviors) {
            let span = debug_span!("behavior", description = behavior.description());
            let stop = self
                .validate_behavior(behavior, picked_only, &mut *reporter, &mut summary)
                .instrument(span)
                .await?;
            if stop {
                info!(
                    behavior = behavior.description(),
                    "fail-fast: stopping after failed example"
                );
                break;
            }
        }
        Ok(summary)
    }

    async fn validate_behavior(
        &self,
        behavior: &Behavior,
        picked_only: bool,
        reporter: &mut dyn Reporter,
        summary: &mut Summary,
    ) -> VeridocResult<bool> {
        reporter.start_behavior(behavior.description());
        summary.behaviors += 1;

        let mut stop = false;
        for example in self.order.order(behavior.examples()) {
            reporter.start_example(example.description());
            let outcome = if runs(&**example, picked_only) {
                let span = debug_span!("example", description = example.description());
                example.validate(&mut *reporter).instrument(span).await?
            } else {
                debug!(example = example.description(), "example skipped");
                ExampleOutcome {
                    tally: example.skip(&mut *reporter),
                    setup_failed: false,
                }
            };
            reporter.end_example();

            summary.examples += 1;
            *summary += outcome.tally;
            if self.fail_fast && outcome.is_failure() {
                stop = true;
                break;
            }
        }

        reporter.end_behavior();
        Ok(stop)
    }
}

fn runs(example: &dyn ValidatableExample, picked_only: bool) -> bool {
    match example.mode() {
        RunMode::Normal => !picked_only,
        RunMode::Skipped => false,
        RunMode::Picked => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::claim::{effect, Claim};
    use crate::example::{example, Context, Script};
    use crate::failure::Failure;
    use crate::order::DefaultOrderProvider;
    use crate::reporter::{RecordingReporter, ReporterEvent};

    fn check(description: &str, holds: bool) -> Claim<()> {
        effect(description, move |_: &mut ()| {
            if holds {
                Ok(())
            } else {
                Err(Failure::new("does not hold"))
            }
        })
    }

    fn single(behavior: &str, claim: Claim<()>) -> Behavior {
        Behavior::new(behavior).example(
            example(Context::<()>::default_value()).script(Script::new().observe(vec![claim])),
        )
    }

    #[tokio::test]
    async fn test_event_sequence() {
        let behaviors = vec![single("one", check("holds", true))];
        let order = DefaultOrderProvider::new();
        let mut recorder = RecordingReporter::new();
        let summary = Documentation::new(&behaviors, &order, false)
            .validate(&mut recorder)
            .await
            .unwrap();

        let events = recorder.events();
        assert_eq!(events[0], ReporterEvent::StartBehavior("one".to_string()));
        assert_eq!(events[1], ReporterEvent::StartExample(None));
        assert!(matches!(events[2], ReporterEvent::Record { .. }));
        assert_eq!(events[3], ReporterEvent::EndExample);
        assert_eq!(events[4], ReporterEvent::EndBehavior);
        assert_eq!(summary.behaviors, 1);
        assert_eq!(summary.examples, 1);
        assert_eq!(summary.valid, 1);
    }

    #[tokio::test]
    async fn test_picked_is_global() {
        let behaviors = vec![
            single("normal", check("never runs", false)),
            Behavior::new("picked").example(
                example(Context::<()>::default_value())
                    .pick()
                    .script(Script::new().observe(vec![check("runs", true)])),
            ),
        ];
        let order = DefaultOrderProvider::new();
        let mut recorder = RecordingReporter::new();
        let summary = Documentation::new(&behaviors, &order, false)
            .validate(&mut recorder)
            .await
            .unwrap();

        assert_eq!((summary.valid, summary.invalid, summary.skipped), (1, 0, 1));
        assert_eq!(summary.examples, 2);
    }

    #[tokio::test]
    async fn test_fail_fast_closes_behavior() {
        let behaviors = vec![
            Behavior::new("first")
                .example(
                    example(Context::<()>::default_value())
                        .script(Script::new().observe(vec![check("fails", false)])),
                )
                .example(
                    example(Context::<()>::default_value())
                        .script(Script::new().observe(vec![check("not reached", true)])),
                ),
            single("second", check("not reached either", true)),
        ];
        let order = DefaultOrderProvider::new();
        let mut recorder = RecordingReporter::new();
        let summary = Documentation::new(&behaviors, &order, true)
            .validate(&mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.behaviors(), vec!["first"]);
        assert_eq!(recorder.events().last(), Some(&ReporterEvent::EndBehavior));
        assert_eq!(summary.examples, 1);
        assert_eq!(summary.invalid, 1);
    }
}

//! Veridoc: executable behavior documentation
//!
//! Behaviors are described by examples. Each example owns a context and a
//! chain of scripts; each script is a list of presuppositions, actions and
//! observations run against that context.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────────┐    ┌───────────────┐
//! │ Behavior   │    │ Documentation   │    │ Reporter      │
//! │  Example   │───►│ order, picked,  │───►│ standard, TAP │
//! │   Script   │    │ fail-fast       │    │ recording     │
//! └────────────┘    └─────────────────┘    └───────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use veridoc::{behavior, effect, example, expect_equal, step, Context, Script};
//! use veridoc::{DefaultOrderProvider, NullReporter, ValidationOptions};
//!
//! let counter = behavior(
//!     "a counter",
//!     vec![example(Context::new(|| 7))
//!         .description("counting up")
//!         .script(
//!             Script::new()
//!                 .perform(vec![step("add three", |n: &mut i32| {
//!                     *n += 3;
//!                     Ok(())
//!                 })])
//!                 .observe(vec![effect("reaches ten", |n: &mut i32| expect_equal(&*n, &10))]),
//!         )
//!         .into()],
//! );
//!
//! let options = ValidationOptions::new()
//!     .with_reporter(NullReporter)
//!     .with_order(DefaultOrderProvider::new());
//! let summary = futures::executor::block_on(veridoc::validate(&[counter], options));
//! assert_eq!(summary.valid, 1);
//! ```

#![warn(missing_docs)]

mod behavior;
mod claim;
mod documentation;
mod example;
mod failure;
mod options;
mod order;
mod reporter;
mod result;
mod summary;
mod timer;

pub use behavior::{behavior, Behavior};
pub use claim::{
    effect, effect_async, fact, fact_async, outcome, procedure, situation, step, step_async,
    Action, Claim, ClaimKind, ClaimOutcome, ClaimResult, ClaimStatus, Observation, Presupposition,
};
pub use documentation::Documentation;
pub use example::{
    example, Context, Example, ExampleOutcome, ExampleScripts, ExampleSetup, RunMode, Script,
    ValidatableExample, ANONYMOUS_EXAMPLE,
};
pub use failure::{expect_equal, Failure, NESTED_FAILURE_MESSAGE};
pub use options::{ColorChoice, ValidationOptions, FAIL_FAST_ENV, ORDER_ENV, SEED_ENV};
pub use order::{default_order, random_order, DefaultOrderProvider, OrderProvider, SeededRandomizer};
pub use reporter::{
    BufferWriter, ConsoleWriter, Formatter, NullReporter, RecordingReporter, Reporter,
    ReporterEvent, StandardReporter, TapReporter, Writer,
};
pub use result::{VeridocError, VeridocResult};
pub use summary::Summary;
pub use timer::Timer;

/// Re-exported so async claims can call `.boxed()` without a direct
/// dependency on `futures`.
pub use futures::future::BoxFuture;
pub use futures::FutureExt;

use std::panic::AssertUnwindSafe;

/// Validate behaviors and report the run.
///
/// Unset options default to [`StandardReporter`] on stdout and a
/// [`SeededRandomizer`] with a fresh seed. A driver-level error (or a panic
/// escaping the driver) is handed to [`Reporter::terminate`] and yields an
/// all-zero summary. Use [`try_validate`] to get the error itself.
pub async fn validate(behaviors: &[Behavior], options: ValidationOptions) -> Summary {
    try_validate(behaviors, options)
        .await
        .unwrap_or_else(|_| Summary::empty())
}

/// Validate behaviors and report the run, returning the error that
/// terminated it.
///
/// The reporter sees the same events as with [`validate`]: `end` on
/// success, `terminate` before an error is returned.
pub async fn try_validate(
    behaviors: &[Behavior],
    options: ValidationOptions,
) -> VeridocResult<Summary> {
    let ValidationOptions {
        reporter,
        order,
        fail_fast,
    } = options;
    let mut reporter = reporter.unwrap_or_else(|| Box::new(StandardReporter::new()));
    let order = order.unwrap_or_else(|| Box::new(SeededRandomizer::new()));

    let description = order.description();
    tracing::info!(order = %description, behaviors = behaviors.len(), fail_fast, "validation started");
    reporter.start(&description);

    let documentation = Documentation::new(behaviors, order.as_ref(), fail_fast);
    let outcome = AssertUnwindSafe(documentation.validate(reporter.as_mut()))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(summary)) => {
            tracing::info!(
                valid = summary.valid,
                invalid = summary.invalid,
                skipped = summary.skipped,
                "validation finished"
            );
            reporter.end(&summary);
            Ok(summary)
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "validation terminated");
            reporter.terminate(&Failure::from(&err));
            Err(err)
        }
        Err(payload) => {
            let failure = Failure::from_panic(payload);
            tracing::error!(error = %failure, "validation panicked");
            reporter.terminate(&failure);
            Err(VeridocError::Panicked { failure })
        }
    }
}

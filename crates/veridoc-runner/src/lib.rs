//! Veridoc runner: drive behavior documentation from a test binary
//!
//! ## Usage
//!
//! Declare a `harness = false` test target and hand its behaviors to
//! [`run_main`]:
//!
//! ```no_run
//! use std::process::ExitCode;
//! use veridoc::{behavior, effect, example, Context, Script};
//!
//! fn main() -> ExitCode {
//!     veridoc_runner::run_main(vec![behavior(
//!         "an empty list",
//!         vec![example(Context::new(Vec::<u8>::new))
//!             .script(Script::new().observe(vec![effect("has no items", |items: &mut Vec<u8>| {
//!                 veridoc::expect_equal(&items.len(), &0)
//!             })]))
//!             .into()],
//!     )])
//! }
//! ```
//!
//! ```bash
//! cargo test --test docs                           # random order, fresh seed
//! cargo test --test docs -- --seed a1b2c3d4e5      # replay an order
//! cargo test --test docs -- ledger --format tap    # filter, TAP output
//! ```

mod args;
mod error;
mod telemetry;

pub use args::{ColorArg, FormatArg, OrderArg, RunnerArgs, Verbosity};
pub use error::{RunnerError, RunnerResult};
pub use telemetry::init_tracing;

use clap::Parser;
use std::process::ExitCode;
use veridoc::{Behavior, Summary};

/// Parse process arguments, validate the behaviors and map the outcome to
/// an exit code.
///
/// Exits with failure when any claim is invalid or the run terminated.
pub fn run_main(behaviors: Vec<Behavior>) -> ExitCode {
    let args = match RunnerArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version requests are reported through the same path
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(args.verbosity().level());

    match run_with_args(&args, behaviors) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Validate the behaviors selected by `args` on a fresh runtime.
///
/// An error that terminated the run is returned as
/// [`RunnerError::Veridoc`] after the reporter has been told about it.
pub fn run_with_args(args: &RunnerArgs, mut behaviors: Vec<Behavior>) -> RunnerResult<Summary> {
    let options = args.validation_options()?;
    behaviors.retain(|behavior| args.selects(behavior.description()));
    tracing::debug!(selected = behaviors.len(), "behaviors selected");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(veridoc::try_validate(&behaviors, options))?;
    Ok(summary)
}

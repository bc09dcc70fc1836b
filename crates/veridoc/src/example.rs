//! Examples: a context plus chained scripts of claims.
//!
//! An example runs in these steps:
//!
//! ```text
//!   init ──► [prepare ──► perform ──► observe] × scripts ──► teardown
//! ```
//!
//! Once a claim fails, later phases (and later scripts) are reported as
//! skipped without invoking their callbacks. Teardown always runs once the
//! context exists.

use crate::claim::{guarded, sync_validator, validator, Claim, ClaimKind, ClaimOutcome, Validator};
use crate::claim::{Action, Observation, Presupposition};
use crate::failure::Failure;
use crate::reporter::Reporter;
use crate::result::{VeridocError, VeridocResult};
use crate::summary::Summary;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Label used for examples without a description
pub const ANONYMOUS_EXAMPLE: &str = "<anonymous example>";

type Init<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, Failure>> + Send + Sync>;

/// How an example produces and disposes of its context
pub struct Context<T> {
    init: Init<T>,
    teardown: Option<Validator<T>>,
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_teardown", &self.teardown.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Context<T> {
    /// Context built by an infallible constructor
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::try_new(move || Ok(init()))
    }

    /// Context built by a constructor that may fail
    pub fn try_new<F>(init: F) -> Self
    where
        F: Fn() -> Result<T, Failure> + Send + Sync + 'static,
    {
        Self {
            init: Arc::new(move || futures::future::ready(init()).boxed()),
            teardown: None,
        }
    }

    /// Context built asynchronously
    pub fn new_async<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Failure>> + Send + 'static,
    {
        Self {
            init: Arc::new(move || init().boxed()),
            teardown: None,
        }
    }

    /// Context starting from `T::default()`
    #[must_use]
    pub fn default_value() -> Self
    where
        T: Default,
    {
        Self::new(T::default)
    }
}

impl<T> Context<T> {
    /// Dispose of the context with a synchronous callback
    #[must_use]
    pub fn with_teardown<F>(mut self, teardown: F) -> Self
    where
        F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
    {
        self.teardown = Some(sync_validator(teardown));
        self
    }

    /// Dispose of the context with an asynchronous callback
    #[must_use]
    pub fn with_async_teardown<F>(mut self, teardown: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
    {
        self.teardown = Some(validator(teardown));
        self
    }

    /// Check if a teardown callback is set
    #[must_use]
    pub const fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    async fn initialize(&self) -> Result<T, Failure> {
        guarded(|| (self.init)()).await
    }

    async fn tear_down(&self, context: &mut T) -> ClaimOutcome {
        match &self.teardown {
            Some(teardown) => guarded(move || teardown(context)).await,
            None => Ok(()),
        }
    }
}

/// One prepare / perform / observe pass over the context
pub struct Script<T> {
    /// Presuppositions checked first
    pub prepare: Vec<Presupposition<T>>,
    /// Actions that drive the context
    pub perform: Vec<Action<T>>,
    /// Observations checked last
    pub observe: Vec<Observation<T>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            prepare: Vec::new(),
            perform: Vec::new(),
            observe: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for Script<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("prepare", &self.prepare)
            .field("perform", &self.perform)
            .field("observe", &self.observe)
            .finish()
    }
}

impl<T> Script<T> {
    /// Empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the presuppositions
    #[must_use]
    pub fn prepare(mut self, presuppositions: Vec<Presupposition<T>>) -> Self {
        self.prepare = presuppositions;
        self
    }

    /// Set the actions
    #[must_use]
    pub fn perform(mut self, actions: Vec<Action<T>>) -> Self {
        self.perform = actions;
        self
    }

    /// Set the observations
    #[must_use]
    pub fn observe(mut self, observations: Vec<Observation<T>>) -> Self {
        self.observe = observations;
        self
    }

    /// Claims of one phase
    #[must_use]
    pub fn claims(&self, kind: ClaimKind) -> &[Claim<T>] {
        match kind {
            ClaimKind::Presupposition => &self.prepare,
            ClaimKind::Action => &self.perform,
            ClaimKind::Observation => &self.observe,
        }
    }
}

/// Whether an example runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Runs unless some example in the run is picked
    #[default]
    Normal,
    /// Never runs; every claim is reported skipped
    Skipped,
    /// Runs, and makes every normal example in the run skip
    Picked,
}

/// A finished example declaration
pub struct Example<T> {
    description: Option<String>,
    context: Context<T>,
    scripts: Vec<Script<T>>,
    mode: RunMode,
}

impl<T> fmt::Debug for Example<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Example")
            .field("description", &self.description)
            .field("context", &self.context)
            .field("scripts", &self.scripts)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<T> Example<T> {
    /// Scripts in the order they run
    #[must_use]
    pub fn scripts(&self) -> &[Script<T>] {
        &self.scripts
    }

    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(ANONYMOUS_EXAMPLE)
    }

    fn skip_scripts(&self, reporter: &mut dyn Reporter, tally: &mut Summary) {
        for script in &self.scripts {
            for kind in ClaimKind::PHASES {
                for claim in script.claims(kind) {
                    let result = claim.skipped();
                    kind.skip(reporter, &result);
                    tally.record(kind, &result);
                }
            }
        }
    }
}

/// Start declaring an example around a context
#[must_use]
pub fn example<T>(context: Context<T>) -> ExampleSetup<T> {
    ExampleSetup {
        description: None,
        context,
        mode: RunMode::Normal,
    }
}

/// Example under construction, before its first script
#[derive(Debug)]
pub struct ExampleSetup<T> {
    description: Option<String>,
    context: Context<T>,
    mode: RunMode,
}

impl<T> ExampleSetup<T> {
    /// Describe the example
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Never run this example
    #[must_use]
    pub const fn skip(mut self) -> Self {
        self.mode = RunMode::Skipped;
        self
    }

    /// Run only picked examples
    #[must_use]
    pub const fn pick(mut self) -> Self {
        self.mode = RunMode::Picked;
        self
    }

    /// Add the first script
    #[must_use]
    pub fn script(self, script: Script<T>) -> ExampleScripts<T> {
        ExampleScripts {
            setup: self,
            scripts: vec![script],
        }
    }
}

/// Example with at least one script
#[derive(Debug)]
pub struct ExampleScripts<T> {
    setup: ExampleSetup<T>,
    scripts: Vec<Script<T>>,
}

impl<T> ExampleScripts<T> {
    /// Chain another script on the same context
    #[must_use]
    pub fn and_then(mut self, script: Script<T>) -> Self {
        self.scripts.push(script);
        self
    }

    /// Finish the declaration
    #[must_use]
    pub fn build(self) -> Example<T> {
        Example {
            description: self.setup.description,
            context: self.setup.context,
            scripts: self.scripts,
            mode: self.setup.mode,
        }
    }
}

impl<T> From<ExampleScripts<T>> for Example<T> {
    fn from(scripts: ExampleScripts<T>) -> Self {
        scripts.build()
    }
}

/// Counts of one example run, and whether its context could be built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExampleOutcome {
    /// Claim counts of the example
    pub tally: Summary,
    /// `init` failed, so every claim was skipped
    pub setup_failed: bool,
}

impl ExampleOutcome {
    /// Check if the example stops a fail-fast run
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.setup_failed || self.tally.invalid > 0
    }
}

/// An example with its context type erased, so one behavior can hold
/// examples over different contexts.
pub trait ValidatableExample: Send + Sync {
    /// Example description
    fn description(&self) -> Option<&str>;

    /// Run mode as declared
    fn mode(&self) -> RunMode;

    /// Run the example, streaming every top-level claim to the reporter.
    ///
    /// Only a teardown failure is an error. Claim failures are part of the
    /// returned counts and an init failure sets `setup_failed`.
    fn validate<'a>(
        &'a self,
        reporter: &'a mut dyn Reporter,
    ) -> BoxFuture<'a, VeridocResult<ExampleOutcome>>;

    /// Report every claim as skipped without running anything
    fn skip(&self, reporter: &mut dyn Reporter) -> Summary;
}

impl<T: Send + 'static> ValidatableExample for Example<T> {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn validate<'a>(
        &'a self,
        reporter: &'a mut dyn Reporter,
    ) -> BoxFuture<'a, VeridocResult<ExampleOutcome>> {
        Box::pin(async move {
            let mut tally = Summary::default();
            let mut context = match self.context.initialize().await {
                Ok(context) => context,
                Err(failure) => {
                    warn!(example = self.label(), error = %failure, "context init failed, skipping claims");
                    self.skip_scripts(reporter, &mut tally);
                    return Ok(ExampleOutcome {
                        tally,
                        setup_failed: true,
                    });
                }
            };

            let mut failed = false;
            for script in &self.scripts {
                for kind in ClaimKind::PHASES {
                    failed = run_phase(
                        kind,
                        script.claims(kind),
                        &mut context,
                        failed,
                        &mut *reporter,
                        &mut tally,
                    )
                    .await;
                }
            }

            if let Err(failure) = self.context.tear_down(&mut context).await {
                error!(example = self.label(), error = %failure, "teardown failed");
                return Err(VeridocError::teardown(self.label(), failure));
            }
            Ok(ExampleOutcome {
                tally,
                setup_failed: false,
            })
        })
    }

    fn skip(&self, reporter: &mut dyn Reporter) -> Summary {
        let mut tally = Summary::default();
        self.skip_scripts(reporter, &mut tally);
        tally
    }
}

impl<T: Send + 'static> From<Example<T>> for Box<dyn ValidatableExample> {
    fn from(example: Example<T>) -> Self {
        Box::new(example)
    }
}

impl<T: Send + 'static> From<ExampleScripts<T>> for Box<dyn ValidatableExample> {
    fn from(scripts: ExampleScripts<T>) -> Self {
        Box::new(scripts.build())
    }
}

/// Run one phase of a script and return the updated `failed` flag.
///
/// A phase entered after a failure skips every claim. Within a phase only
/// actions stop at the first invalid claim.
async fn run_phase<T: Send>(
    kind: ClaimKind,
    claims: &[Claim<T>],
    context: &mut T,
    failed: bool,
    reporter: &mut dyn Reporter,
    tally: &mut Summary,
) -> bool {
    let mut phase_failed = false;
    for claim in claims {
        if failed || (phase_failed && kind.halts_siblings()) {
            let result = claim.skipped();
            kind.skip(reporter, &result);
            tally.record(kind, &result);
            continue;
        }
        let result = claim.execute(kind, context).await;
        debug!(
            kind = kind.as_str(),
            claim = result.description(),
            status = ?result.status(),
            "claim finished"
        );
        kind.record(reporter, &result);
        tally.record(kind, &result);
        phase_failed |= result.is_invalid();
    }
    failed || phase_failed
}

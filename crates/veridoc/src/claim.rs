//! Claims and their results.
//!
//! A claim is a named callback run against an example's context. The three
//! roles share one shape and are told apart by [`ClaimKind`], which is
//! decided by the script phase a claim is placed in:
//!
//! ```text
//!   prepare ──► Presupposition (fact / situation)
//!   perform ──► Action         (step / procedure)
//!   observe ──► Observation    (effect / outcome)
//! ```
//!
//! Composite claims group children under one description. Their result is
//! derived from the children and keeps the nested shape for reporting.

use crate::failure::Failure;
use crate::reporter::Reporter;
use crate::timer::Timer;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a claim callback
pub type ClaimOutcome = Result<(), Failure>;

/// Uniform suspendable claim body, shared by sync and async callbacks.
pub(crate) type Validator<T> =
    Arc<dyn for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync>;

pub(crate) fn validator<T, F>(validate: F) -> Validator<T>
where
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
{
    Arc::new(validate)
}

pub(crate) fn sync_validator<T, F>(validate: F) -> Validator<T>
where
    F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
{
    validator(move |context: &mut T| future::ready(validate(context)).boxed())
}

/// Run a callback, turning panics (while building or polling its future)
/// into failures.
pub(crate) async fn guarded<'a, R>(
    call: impl FnOnce() -> BoxFuture<'a, Result<R, Failure>>,
) -> Result<R, Failure> {
    let pending = panic::catch_unwind(AssertUnwindSafe(call)).map_err(Failure::from_panic)?;
    AssertUnwindSafe(pending)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(Failure::from_panic(payload)))
}

/// Role of a claim, fixed by the phase it runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimKind {
    /// Setup assertion ("given")
    Presupposition,
    /// Step that drives the context ("when")
    Action,
    /// Assertion about the result ("then")
    Observation,
}

impl ClaimKind {
    /// Phases in execution order
    pub const PHASES: [Self; 3] = [Self::Presupposition, Self::Action, Self::Observation];

    /// Short name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Presupposition => "presupposition",
            Self::Action => "action",
            Self::Observation => "observation",
        }
    }

    /// Whether a failure stops the remaining siblings of the same phase.
    ///
    /// Only actions do: a failed step leaves the context in a state later
    /// steps cannot rely on.
    #[must_use]
    pub const fn halts_siblings(self) -> bool {
        matches!(self, Self::Action)
    }

    /// Whether a valid result of this kind counts towards the summary.
    #[must_use]
    pub const fn counts_when_valid(self) -> bool {
        !matches!(self, Self::Action)
    }

    /// Hand an executed result to the matching reporter callback
    pub fn record(self, reporter: &mut dyn Reporter, result: &ClaimResult) {
        match self {
            Self::Presupposition => reporter.record_presupposition(result),
            Self::Action => reporter.record_action(result),
            Self::Observation => reporter.record_observation(result),
        }
    }

    /// Hand a skipped claim to the matching reporter callback
    pub fn skip(self, reporter: &mut dyn Reporter, result: &ClaimResult) {
        match self {
            Self::Presupposition => reporter.skip_presupposition(result),
            Self::Action => reporter.skip_action(result),
            Self::Observation => reporter.skip_observation(result),
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse outcome of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Claim held
    Valid,
    /// Claim did not hold
    Invalid,
    /// Claim was not run
    Skipped,
}

/// Result of a claim, possibly with nested results from a composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClaimResult {
    /// Claim held
    #[serde(rename = "valid-claim")]
    Valid {
        /// Claim description
        description: String,
        /// Time spent in the callback (leaf claims only)
        duration: Option<Duration>,
        /// Results of composite children
        subsumed: Vec<ClaimResult>,
    },
    /// Claim did not hold
    #[serde(rename = "invalid-claim")]
    Invalid {
        /// Claim description
        description: String,
        /// Time spent in the callback (leaf claims only)
        duration: Option<Duration>,
        /// Why it did not hold
        error: Failure,
        /// Results of composite children
        subsumed: Vec<ClaimResult>,
    },
    /// Claim was not run
    #[serde(rename = "skipped-claim")]
    Skipped {
        /// Claim description
        description: String,
        /// Skipped composite children
        subsumed: Vec<ClaimResult>,
    },
}

impl ClaimResult {
    /// Valid leaf result
    #[must_use]
    pub fn valid(description: impl Into<String>, duration: Option<Duration>) -> Self {
        Self::Valid {
            description: description.into(),
            duration,
            subsumed: Vec::new(),
        }
    }

    /// Invalid leaf result
    #[must_use]
    pub fn invalid(
        description: impl Into<String>,
        duration: Option<Duration>,
        error: Failure,
    ) -> Self {
        Self::Invalid {
            description: description.into(),
            duration,
            error,
            subsumed: Vec::new(),
        }
    }

    /// Skipped leaf result
    #[must_use]
    pub fn skipped(description: impl Into<String>) -> Self {
        Self::Skipped {
            description: description.into(),
            subsumed: Vec::new(),
        }
    }

    /// Derive a composite result from its children.
    ///
    /// Invalid if any child is invalid, skipped if every child was skipped,
    /// valid otherwise.
    #[must_use]
    pub fn from_subsumed(description: impl Into<String>, subsumed: Vec<Self>) -> Self {
        let description = description.into();
        if subsumed.iter().any(Self::is_invalid) {
            Self::Invalid {
                description,
                duration: None,
                error: Failure::nested(),
                subsumed,
            }
        } else if !subsumed.is_empty() && subsumed.iter().all(Self::is_skipped) {
            Self::Skipped {
                description,
                subsumed,
            }
        } else {
            Self::Valid {
                description,
                duration: None,
                subsumed,
            }
        }
    }

    /// Claim description
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Valid { description, .. }
            | Self::Invalid { description, .. }
            | Self::Skipped { description, .. } => description,
        }
    }

    /// Coarse status
    #[must_use]
    pub const fn status(&self) -> ClaimStatus {
        match self {
            Self::Valid { .. } => ClaimStatus::Valid,
            Self::Invalid { .. } => ClaimStatus::Invalid,
            Self::Skipped { .. } => ClaimStatus::Skipped,
        }
    }

    /// Nested results (empty for leaf claims)
    #[must_use]
    pub fn subsumed(&self) -> &[Self] {
        match self {
            Self::Valid { subsumed, .. }
            | Self::Invalid { subsumed, .. }
            | Self::Skipped { subsumed, .. } => subsumed,
        }
    }

    /// Callback duration, if the claim ran as a leaf
    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        match self {
            Self::Valid { duration, .. } | Self::Invalid { duration, .. } => *duration,
            Self::Skipped { .. } => None,
        }
    }

    /// Failure of an invalid claim
    #[must_use]
    pub const fn error(&self) -> Option<&Failure> {
        match self {
            Self::Invalid { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Check if valid
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Check if invalid
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Check if skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Leaf results in depth-first order
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Self>) {
        if self.subsumed().is_empty() {
            leaves.push(self);
        } else {
            for child in self.subsumed() {
                child.collect_leaves(leaves);
            }
        }
    }
}

enum ClaimBody<T> {
    Leaf(Validator<T>),
    Composite(Vec<Claim<T>>),
}

/// A named, validated unit of an example script.
pub struct Claim<T> {
    description: String,
    body: ClaimBody<T>,
}

/// Claim placed in the prepare phase
pub type Presupposition<T> = Claim<T>;
/// Claim placed in the perform phase
pub type Action<T> = Claim<T>;
/// Claim placed in the observe phase
pub type Observation<T> = Claim<T>;

impl<T> fmt::Debug for Claim<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Claim");
        debug.field("description", &self.description);
        match &self.body {
            ClaimBody::Leaf(_) => debug.field("body", &"<callback>"),
            ClaimBody::Composite(children) => debug.field("children", children),
        };
        debug.finish()
    }
}

impl<T> Claim<T> {
    /// Claim backed by a synchronous callback
    pub fn leaf<F>(description: impl Into<String>, validate: F) -> Self
    where
        F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            body: ClaimBody::Leaf(sync_validator(validate)),
        }
    }

    /// Claim backed by an asynchronous callback
    pub fn leaf_async<F>(description: impl Into<String>, validate: F) -> Self
    where
        F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            body: ClaimBody::Leaf(validator(validate)),
        }
    }

    /// Claim grouping child claims of the same role
    pub fn composite(description: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            description: description.into(),
            body: ClaimBody::Composite(children),
        }
    }

    /// Claim description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Child claims (empty for leaf claims)
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.body {
            ClaimBody::Leaf(_) => &[],
            ClaimBody::Composite(children) => children,
        }
    }

    /// Check if this claim groups other claims
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self.body, ClaimBody::Composite(_))
    }

    /// Skipped result mirroring this claim's shape
    #[must_use]
    pub fn skipped(&self) -> ClaimResult {
        ClaimResult::Skipped {
            description: self.description.clone(),
            subsumed: self.children().iter().map(Self::skipped).collect(),
        }
    }
}

impl<T: Send> Claim<T> {
    /// Run the claim against a context.
    ///
    /// Composite children run one after another on the same context. A
    /// failed child of a composite action skips its remaining siblings;
    /// presupposition and observation children always all run.
    pub(crate) fn execute<'a>(
        &'a self,
        kind: ClaimKind,
        context: &'a mut T,
    ) -> BoxFuture<'a, ClaimResult> {
        Box::pin(async move {
            match &self.body {
                ClaimBody::Leaf(validate) => {
                    let mut timer = Timer::started();
                    let outcome = guarded(move || validate(context)).await;
                    timer.stop();
                    match outcome {
                        Ok(()) => ClaimResult::valid(&self.description, timer.duration()),
                        Err(failure) => {
                            ClaimResult::invalid(&self.description, timer.duration(), failure)
                        }
                    }
                }
                ClaimBody::Composite(children) => {
                    let mut subsumed = Vec::with_capacity(children.len());
                    let mut halted = false;
                    for child in children {
                        if halted {
                            subsumed.push(child.skipped());
                            continue;
                        }
                        let result = child.execute(kind, context).await;
                        halted = kind.halts_siblings() && result.is_invalid();
                        subsumed.push(result);
                    }
                    ClaimResult::from_subsumed(&self.description, subsumed)
                }
            }
        })
    }
}

/// Presupposition backed by a synchronous callback
pub fn fact<T, F>(description: impl Into<String>, validate: F) -> Presupposition<T>
where
    F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
{
    Claim::leaf(description, validate)
}

/// Presupposition backed by an asynchronous callback
pub fn fact_async<T, F>(description: impl Into<String>, validate: F) -> Presupposition<T>
where
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
{
    Claim::leaf_async(description, validate)
}

/// Presupposition grouping other presuppositions
pub fn situation<T>(
    description: impl Into<String>,
    presuppositions: Vec<Presupposition<T>>,
) -> Presupposition<T> {
    Claim::composite(description, presuppositions)
}

/// Action backed by a synchronous callback
pub fn step<T, F>(description: impl Into<String>, perform: F) -> Action<T>
where
    F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
{
    Claim::leaf(description, perform)
}

/// Action backed by an asynchronous callback
pub fn step_async<T, F>(description: impl Into<String>, perform: F) -> Action<T>
where
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
{
    Claim::leaf_async(description, perform)
}

/// Action grouping other actions
pub fn procedure<T>(description: impl Into<String>, steps: Vec<Action<T>>) -> Action<T> {
    Claim::composite(description, steps)
}

/// Observation backed by a synchronous callback
pub fn effect<T, F>(description: impl Into<String>, observe: F) -> Observation<T>
where
    F: Fn(&mut T) -> ClaimOutcome + Send + Sync + 'static,
{
    Claim::leaf(description, observe)
}

/// Observation backed by an asynchronous callback
pub fn effect_async<T, F>(description: impl Into<String>, observe: F) -> Observation<T>
where
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, ClaimOutcome> + Send + Sync + 'static,
{
    Claim::leaf_async(description, observe)
}

/// Observation grouping other observations
pub fn outcome<T>(description: impl Into<String>, effects: Vec<Observation<T>>) -> Observation<T> {
    Claim::composite(description, effects)
}

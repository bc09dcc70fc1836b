//! Reporter that captures the event stream, for asserting on runs.

use super::Reporter;
use crate::claim::{ClaimKind, ClaimResult};
use crate::failure::Failure;
use crate::summary::Summary;
use std::sync::{Arc, Mutex, PoisonError};

/// One reporter callback, as received
#[derive(Debug, Clone, PartialEq)]
pub enum ReporterEvent {
    /// `start`
    Start {
        /// Order description
        order: String,
    },
    /// `end`
    End(Summary),
    /// `terminate`
    Terminate(Failure),
    /// `start_behavior`
    StartBehavior(String),
    /// `end_behavior`
    EndBehavior,
    /// `start_example`
    StartExample(Option<String>),
    /// `end_example`
    EndExample,
    /// `record_*`
    Record {
        /// Role of the claim
        kind: ClaimKind,
        /// Its result
        result: ClaimResult,
    },
    /// `skip_*`
    Skip {
        /// Role of the claim
        kind: ClaimKind,
        /// Skipped result mirroring the claim
        result: ClaimResult,
    },
}

/// Records every event. Clones share one log, so a clone can be handed to
/// the run while the original is inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<ReporterEvent>>>,
}

impl RecordingReporter {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far
    #[must_use]
    pub fn events(&self) -> Vec<ReporterEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Claim events (recorded or skipped) in order
    #[must_use]
    pub fn claims(&self) -> Vec<(ClaimKind, ClaimResult)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::Record { kind, result } | ReporterEvent::Skip { kind, result } => {
                    Some((kind, result))
                }
                _ => None,
            })
            .collect()
    }

    /// Descriptions of claims that were recorded or skipped
    #[must_use]
    pub fn claim_descriptions(&self) -> Vec<String> {
        self.claims()
            .into_iter()
            .map(|(_, result)| result.description().to_string())
            .collect()
    }

    /// Descriptions of behaviors in the order they started
    #[must_use]
    pub fn behaviors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::StartBehavior(description) => Some(description),
                _ => None,
            })
            .collect()
    }

    /// Descriptions of examples in the order they started
    #[must_use]
    pub fn examples(&self) -> Vec<Option<String>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::StartExample(description) => Some(description),
                _ => None,
            })
            .collect()
    }

    /// The terminate failure, if the run was aborted
    #[must_use]
    pub fn termination(&self) -> Option<Failure> {
        self.events().into_iter().find_map(|event| match event {
            ReporterEvent::Terminate(failure) => Some(failure),
            _ => None,
        })
    }

    fn push(&self, event: ReporterEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Reporter for RecordingReporter {
    fn start(&mut self, order_description: &str) {
        self.push(ReporterEvent::Start {
            order: order_description.to_string(),
        });
    }

    fn end(&mut self, summary: &Summary) {
        self.push(ReporterEvent::End(*summary));
    }

    fn terminate(&mut self, failure: &Failure) {
        self.push(ReporterEvent::Terminate(failure.clone()));
    }

    fn start_behavior(&mut self, description: &str) {
        self.push(ReporterEvent::StartBehavior(description.to_string()));
    }

    fn end_behavior(&mut self) {
        self.push(ReporterEvent::EndBehavior);
    }

    fn start_example(&mut self, description: Option<&str>) {
        self.push(ReporterEvent::StartExample(description.map(str::to_string)));
    }

    fn end_example(&mut self) {
        self.push(ReporterEvent::EndExample);
    }

    fn record_presupposition(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Record {
            kind: ClaimKind::Presupposition,
            result: result.clone(),
        });
    }

    fn record_action(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Record {
            kind: ClaimKind::Action,
            result: result.clone(),
        });
    }

    fn record_observation(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Record {
            kind: ClaimKind::Observation,
            result: result.clone(),
        });
    }

    fn skip_presupposition(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Skip {
            kind: ClaimKind::Presupposition,
            result: result.clone(),
        });
    }

    fn skip_action(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Skip {
            kind: ClaimKind::Action,
            result: result.clone(),
        });
    }

    fn skip_observation(&mut self, result: &ClaimResult) {
        self.push(ReporterEvent::Skip {
            kind: ClaimKind::Observation,
            result: result.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let recorder = RecordingReporter::new();
        let mut handle = recorder.clone();
        handle.start_behavior("ledger");
        handle.record_action(&ClaimResult::valid("deposit", None));
        handle.skip_observation(&ClaimResult::skipped("balance"));

        assert_eq!(recorder.behaviors(), vec!["ledger"]);
        assert_eq!(recorder.claim_descriptions(), vec!["deposit", "balance"]);
        assert_eq!(recorder.claims()[1].0, ClaimKind::Observation);
        assert!(recorder.termination().is_none());
    }

    #[test]
    fn test_dispatch_through_claim_kind() {
        let mut recorder = RecordingReporter::new();
        ClaimKind::Presupposition.record(&mut recorder, &ClaimResult::valid("given", None));
        ClaimKind::Action.skip(&mut recorder, &ClaimResult::skipped("when"));
        assert_eq!(
            recorder.events(),
            vec![
                ReporterEvent::Record {
                    kind: ClaimKind::Presupposition,
                    result: ClaimResult::valid("given", None),
                },
                ReporterEvent::Skip {
                    kind: ClaimKind::Action,
                    result: ClaimResult::skipped("when"),
                },
            ]
        );
    }
}

//! Aggregate counts for a validation run.

use crate::claim::{ClaimKind, ClaimResult, ClaimStatus};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counts accumulated over a run.
///
/// Claim counts are taken from leaf results, depth first. A valid action is
/// a step rather than a claim about behavior, so it is not counted; failed
/// and skipped actions are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Behaviors started
    pub behaviors: usize,
    /// Examples visited (including skipped ones)
    pub examples: usize,
    /// Valid claims
    pub valid: usize,
    /// Invalid claims
    pub invalid: usize,
    /// Skipped claims
    pub skipped: usize,
}

impl Summary {
    /// All-zero summary, returned when a run terminates
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            behaviors: 0,
            examples: 0,
            valid: 0,
            invalid: 0,
            skipped: 0,
        }
    }

    /// Total number of counted claims
    #[must_use]
    pub const fn total_claims(&self) -> usize {
        self.valid + self.invalid + self.skipped
    }

    /// Check if no claim was invalid
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.invalid == 0
    }

    /// Fold a top-level claim result into the counts
    pub fn record(&mut self, kind: ClaimKind, result: &ClaimResult) {
        for leaf in result.leaves() {
            match leaf.status() {
                ClaimStatus::Valid if kind.counts_when_valid() => self.valid += 1,
                ClaimStatus::Valid => {}
                ClaimStatus::Invalid => self.invalid += 1,
                ClaimStatus::Skipped => self.skipped += 1,
            }
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.behaviors += other.behaviors;
        self.examples += other.examples;
        self.valid += other.valid;
        self.invalid += other.invalid;
        self.skipped += other.skipped;
    }
}

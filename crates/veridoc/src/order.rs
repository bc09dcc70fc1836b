//! Execution order of behaviors and examples.
//!
//! Random order is seeded so that any run can be reproduced: the seed is
//! part of the order description that reporters print, and feeding it back
//! through [`SeededRandomizer::with_seed`] replays the same permutation.

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Decides the order in which behaviors and examples run.
pub trait OrderProvider: Send + Sync + fmt::Debug {
    /// Human readable description, reported at the start of a run
    fn description(&self) -> String;

    /// A permutation of `0..len`
    fn permutation(&self, len: usize) -> Vec<usize>;
}

impl dyn OrderProvider + '_ {
    /// Items in provider order. The input slice is left untouched.
    pub fn order<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.permutation(items.len())
            .into_iter()
            .filter_map(|index| items.get(index))
            .collect()
    }
}

/// Runs everything in declaration order
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOrderProvider;

impl DefaultOrderProvider {
    /// Create the provider
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OrderProvider for DefaultOrderProvider {
    fn description(&self) -> String {
        "Order: default (as declared)".to_string()
    }

    fn permutation(&self, len: usize) -> Vec<usize> {
        (0..len).collect()
    }
}

/// Xorshift64 PRNG
#[derive(Debug, Clone)]
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-enough value in `0..bound`
    fn next_below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        self.next() % bound
    }
}

/// Shuffles with Fisher–Yates driven by a seeded PRNG.
///
/// The generator advances with every call, so successive calls within a run
/// yield different permutations while the whole run stays reproducible.
#[derive(Debug)]
pub struct SeededRandomizer {
    seed: String,
    rng: Mutex<Xorshift64>,
}

impl SeededRandomizer {
    /// Create a randomizer with a freshly generated seed
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(fresh_seed())
    }

    /// Create a randomizer with an explicit seed
    #[must_use]
    pub fn with_seed(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let rng = Mutex::new(Xorshift64::new(seed_state(&seed)));
        Self { seed, rng }
    }

    /// The seed, for reproducing this order
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for SeededRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderProvider for SeededRandomizer {
    fn description(&self) -> String {
        format!("Order: random, seed: {}", self.seed)
    }

    fn permutation(&self, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        for i in (1..len).rev() {
            let j = rng.next_below(i as u64 + 1) as usize;
            indices.swap(i, j);
        }
        indices
    }
}

fn fresh_seed() -> String {
    Uuid::new_v4().simple().to_string().chars().take(10).collect()
}

/// Stable across platforms and toolchains, unlike `DefaultHasher`.
fn seed_state(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Declaration order
#[must_use]
pub fn default_order() -> Box<dyn OrderProvider> {
    Box::new(DefaultOrderProvider::new())
}

/// Random order, with the given seed or a fresh one
#[must_use]
pub fn random_order(seed: Option<&str>) -> Box<dyn OrderProvider> {
    match seed {
        Some(seed) => Box::new(SeededRandomizer::with_seed(seed)),
        None => Box::new(SeededRandomizer::new()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_keeps_declaration_order() {
        let provider = default_order();
        let items = ["a", "b", "c"];
        let ordered: Vec<&str> = provider.order(&items).into_iter().copied().collect();
        assert_eq!(ordered, vec!["a", "b", "c"]);
        assert_eq!(provider.description(), "Order: default (as declared)");
    }

    #[test]
    fn test_random_description_contains_seed() {
        let provider = SeededRandomizer::with_seed("tangerine");
        assert_eq!(provider.description(), "Order: random, seed: tangerine");
        assert_eq!(provider.seed(), "tangerine");
    }

    #[test]
    fn test_fresh_seeds_differ() {
        let first = SeededRandomizer::new();
        let second = SeededRandomizer::new();
        assert_eq!(first.seed().len(), 10);
        assert_ne!(first.seed(), second.seed());
    }

    #[test]
    fn test_same_seed_same_run() {
        let first = SeededRandomizer::with_seed("reproducible");
        let second = SeededRandomizer::with_seed("reproducible");
        for len in [0, 1, 5, 12, 12, 40] {
            assert_eq!(first.permutation(len), second.permutation(len));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let items: Vec<u32> = (0..10).collect();
        let first = random_order(Some("alpha"));
        let second = random_order(Some("beta"));
        assert_ne!(first.order(&items), second.order(&items));
    }

    #[test]
    fn test_successive_calls_advance() {
        let provider = SeededRandomizer::with_seed("advance");
        let runs: Vec<Vec<usize>> = (0..4).map(|_| provider.permutation(8)).collect();
        assert!(runs.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn test_order_does_not_mutate_input() {
        let items = vec![1, 2, 3, 4, 5];
        let provider = random_order(Some("pure"));
        let _ = provider.order(&items);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_xorshift_zero_seed_is_usable() {
        let mut rng = Xorshift64::new(0);
        assert_ne!(rng.next(), 0);
        assert_eq!(rng.next_below(1), 0);
    }

    proptest! {
        #[test]
        fn prop_permutation_is_complete(seed in "[a-z0-9]{1,12}", len in 0usize..64) {
            let provider = SeededRandomizer::with_seed(seed);
            let mut permutation = provider.permutation(len);
            permutation.sort_unstable();
            prop_assert_eq!(permutation, (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn prop_seed_reproduces_order(seed in "[a-z0-9]{1,12}", len in 0usize..64) {
            let first = SeededRandomizer::with_seed(seed.clone()).permutation(len);
            let second = SeededRandomizer::with_seed(seed).permutation(len);
            prop_assert_eq!(first, second);
        }
    }
}

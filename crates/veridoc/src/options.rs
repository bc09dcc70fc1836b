//! Run configuration.

use crate::order::{DefaultOrderProvider, OrderProvider, SeededRandomizer};
use crate::reporter::Reporter;
use crate::result::{VeridocError, VeridocResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the order seed
pub const SEED_ENV: &str = "VERIDOC_SEED";
/// Environment variable selecting `default` or `random` order
pub const ORDER_ENV: &str = "VERIDOC_ORDER";
/// Environment variable enabling fail-fast
pub const FAIL_FAST_ENV: &str = "VERIDOC_FAIL_FAST";

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::colors_enabled(),
        }
    }
}

/// Options for [`validate`](crate::validate).
///
/// Unset fields fall back to the standard reporter on stdout and a random
/// order with a fresh seed.
#[derive(Default)]
pub struct ValidationOptions {
    /// Where events go
    pub reporter: Option<Box<dyn Reporter>>,
    /// Order of behaviors and examples
    pub order: Option<Box<dyn OrderProvider>>,
    /// Stop after the first example with an invalid claim
    pub fail_fast: bool,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("reporter", &self.reporter.as_ref().map(|_| "<reporter>"))
            .field("order", &self.order)
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

impl ValidationOptions {
    /// Create options with every default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `VERIDOC_*` environment variables
    pub fn from_env() -> VeridocResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options through a variable lookup.
    ///
    /// A seed without an order implies random order; a seed combined with
    /// `default` order is rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VeridocResult<Self> {
        let seed = lookup(SEED_ENV)
            .map(|seed| seed.trim().to_string())
            .filter(|seed| !seed.is_empty());
        let order: Option<Box<dyn OrderProvider>> =
            match lookup(ORDER_ENV).as_deref().map(str::trim) {
                None | Some("") => seed.map(|seed| {
                    Box::new(SeededRandomizer::with_seed(seed)) as Box<dyn OrderProvider>
                }),
                Some("random") => Some(match seed {
                    Some(seed) => Box::new(SeededRandomizer::with_seed(seed)),
                    None => Box::new(SeededRandomizer::new()),
                }),
                Some("default") => {
                    if seed.is_some() {
                        return Err(VeridocError::config(format!(
                            "{SEED_ENV} cannot be combined with {ORDER_ENV}=default"
                        )));
                    }
                    Some(Box::new(DefaultOrderProvider::new()))
                }
                Some(other) => {
                    return Err(VeridocError::config(format!(
                        "{ORDER_ENV} must be 'default' or 'random', got '{other}'"
                    )));
                }
            };
        let fail_fast = match lookup(FAIL_FAST_ENV).as_deref().map(str::trim) {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(VeridocError::config(format!(
                    "{FAIL_FAST_ENV} must be a boolean, got '{other}'"
                )));
            }
        };
        Ok(Self {
            reporter: None,
            order,
            fail_fast,
        })
    }

    /// Set the reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Set the order provider
    #[must_use]
    pub fn with_order(mut self, order: impl OrderProvider + 'static) -> Self {
        self.order = Some(Box::new(order));
        self
    }

    /// Set an already boxed order provider
    #[must_use]
    pub fn with_boxed_order(mut self, order: Box<dyn OrderProvider>) -> Self {
        self.order = Some(order);
        self
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }
}

//! Command-line arguments using clap

use crate::error::{RunnerError, RunnerResult};
use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Level;
use veridoc::{
    ColorChoice, DefaultOrderProvider, Formatter, Reporter, SeededRandomizer, StandardReporter,
    TapReporter, ValidationOptions,
};

/// Validate veridoc behaviors and report the results
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "veridoc")]
#[command(about, long_about = None)]
pub struct RunnerArgs {
    /// Only run behaviors whose description contains this text
    pub filter: Option<String>,

    /// Seed for random ordering (implies --order random)
    #[arg(long, env = "VERIDOC_SEED")]
    pub seed: Option<String>,

    /// Order of behaviors and examples
    #[arg(long, value_enum, env = "VERIDOC_ORDER")]
    pub order: Option<OrderArg>,

    /// Stop after the first example with an invalid claim
    #[arg(long, env = "VERIDOC_FAIL_FAST", value_parser = BoolishValueParser::new())]
    pub fail_fast: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "standard")]
    pub format: FormatArg,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorArg,

    /// Show durations of claims slower than this many milliseconds
    #[arg(long, default_value = "100")]
    pub slow_ms: u64,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,

    /// Accepted for compatibility with `cargo test -- --nocapture`
    #[arg(long, hide = true)]
    pub nocapture: bool,
}

/// Order argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// As declared
    Default,
    /// Seeded shuffle
    Random,
}

/// Output format argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatArg {
    /// Human readable console output
    #[default]
    Standard,
    /// Test Anything Protocol
    Tap,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    #[default]
    Normal,
    /// Run-level information
    Verbose,
    /// Per-claim events
    Debug,
}

impl Verbosity {
    /// Default tracing level when `RUST_LOG` is not set
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
        }
    }
}

impl RunnerArgs {
    /// Effective verbosity from `-q` and `-v` flags
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    /// Reporter for the selected format
    #[must_use]
    pub fn reporter(&self) -> Box<dyn Reporter> {
        match self.format {
            FormatArg::Standard => Box::new(
                StandardReporter::new()
                    .with_formatter(Formatter::for_choice(self.color.into()))
                    .with_slow_claim_threshold(Duration::from_millis(self.slow_ms)),
            ),
            FormatArg::Tap => Box::new(TapReporter::new()),
        }
    }

    /// Validation options described by the arguments
    pub fn validation_options(&self) -> RunnerResult<ValidationOptions> {
        let options = ValidationOptions {
            reporter: Some(self.reporter()),
            order: None,
            fail_fast: self.fail_fast,
        };
        let options = match (self.order, self.seed.as_deref()) {
            (Some(OrderArg::Default), Some(_)) => {
                return Err(RunnerError::config(
                    "--seed cannot be combined with --order default",
                ));
            }
            (Some(OrderArg::Default), None) => options.with_order(DefaultOrderProvider::new()),
            (_, Some(seed)) => options.with_order(SeededRandomizer::with_seed(seed)),
            (_, None) => options.with_order(SeededRandomizer::new()),
        };
        Ok(options)
    }

    /// Check if a behavior description passes the filter
    #[must_use]
    pub fn selects(&self, description: &str) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |filter| description.contains(filter))
    }
}

/// Parse `args` (without the binary name) with every `VERIDOC_*` fallback
/// disabled, so tests do not see the developer's environment.
#[cfg(test)]
pub(crate) fn parse_ignoring_env(args: &[&str]) -> Result<RunnerArgs, clap::Error> {
    use clap::{CommandFactory, FromArgMatches};

    let command = RunnerArgs::command().mut_args(|arg| arg.env(None::<&'static str>));
    let matches =
        command.try_get_matches_from(std::iter::once("veridoc").chain(args.iter().copied()))?;
    RunnerArgs::from_arg_matches(&matches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunnerArgs {
        parse_ignoring_env(args).unwrap()
    }

    fn order_description(args: &RunnerArgs) -> String {
        args.validation_options()
            .unwrap()
            .order
            .map(|order| order.description())
            .unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let args = parse(&[]);
            assert_eq!(args.format, FormatArg::Standard);
            assert_eq!(args.color, ColorArg::Auto);
            assert_eq!(args.slow_ms, 100);
            assert!(args.filter.is_none());
        }

        #[test]
        fn test_all_flags() {
            let args = parse(&[
                "ledger",
                "--order",
                "random",
                "--seed",
                "plum",
                "--fail-fast",
                "--format",
                "tap",
                "--color",
                "never",
                "--slow-ms",
                "5",
                "-vv",
            ]);
            assert_eq!(args.filter.as_deref(), Some("ledger"));
            assert_eq!(args.order, Some(OrderArg::Random));
            assert_eq!(args.seed.as_deref(), Some("plum"));
            assert!(args.fail_fast);
            assert_eq!(args.format, FormatArg::Tap);
            assert_eq!(args.color, ColorArg::Never);
            assert_eq!(args.slow_ms, 5);
            assert_eq!(args.verbosity(), Verbosity::Debug);
        }

        #[test]
        fn test_rejects_unknown_order() {
            assert!(parse_ignoring_env(&["--order", "sideways"]).is_err());
        }

        #[test]
        fn test_environment_fallbacks_can_be_disabled() {
            std::env::set_var("VERIDOC_SEED", "from-shell");
            let from_env = RunnerArgs::try_parse_from(["veridoc"]).unwrap();
            let isolated = parse(&[]);
            std::env::remove_var("VERIDOC_SEED");

            assert_eq!(from_env.seed.as_deref(), Some("from-shell"));
            assert!(isolated.seed.is_none());
            assert!(parse(&["--order", "default"]).validation_options().is_ok());
        }

        #[test]
        fn test_accepts_nocapture() {
            assert!(parse(&["--nocapture"]).nocapture);
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_seed_selects_random_order() {
            let args = parse(&["--seed", "plum"]);
            assert_eq!(order_description(&args), "Order: random, seed: plum");
        }

        #[test]
        fn test_default_order() {
            let args = parse(&["--order", "default"]);
            assert_eq!(order_description(&args), "Order: default (as declared)");
        }

        #[test]
        fn test_seed_with_default_order_is_rejected() {
            let args = parse(&["--order", "default", "--seed", "plum"]);
            assert!(matches!(
                args.validation_options(),
                Err(RunnerError::Config { .. })
            ));
        }

        #[test]
        fn test_fail_fast_is_passed_through() {
            let args = parse(&["--fail-fast", "--order", "default"]);
            assert!(args.validation_options().unwrap().fail_fast);
        }
    }

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_quiet_wins() {
            assert_eq!(parse(&["-q", "-v"]).verbosity(), Verbosity::Quiet);
        }

        #[test]
        fn test_levels() {
            assert_eq!(Verbosity::Normal.level(), Level::WARN);
            assert_eq!(Verbosity::Verbose.level(), Level::INFO);
            assert_eq!(parse(&["-v"]).verbosity(), Verbosity::Verbose);
        }
    }

    #[test]
    fn test_filter_selection() {
        let args = parse(&["ledger"]);
        assert!(args.selects("a ledger"));
        assert!(!args.selects("a counter"));
        assert!(parse(&[]).selects("anything"));
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
    }
}

//! Veridoc documenting itself, run through the runner.
//!
//! Run with: `cargo test --test docs -- --order default`

use std::process::ExitCode;
use std::time::Duration;
use veridoc::{
    behavior, effect, example, expect_equal, fact, outcome, procedure, step, Behavior, ClaimKind,
    ClaimResult, Context, Failure, FutureExt, OrderProvider, SeededRandomizer, Summary, Timer,
};

fn main() -> ExitCode {
    veridoc_runner::run_main(vec![
        seeded_randomizer(),
        summary_counting(),
        failures(),
        timer(),
    ])
}

struct Shuffle {
    randomizer: SeededRandomizer,
    items: Vec<u32>,
    first: Vec<u32>,
    second: Vec<u32>,
}

fn shuffle_context(seed: &'static str) -> Context<Shuffle> {
    Context::new(move || Shuffle {
        randomizer: SeededRandomizer::with_seed(seed),
        items: (0..10).collect(),
        first: Vec::new(),
        second: Vec::new(),
    })
}

fn ordered(provider: &dyn OrderProvider, items: &[u32]) -> Vec<u32> {
    provider.order(items).into_iter().copied().collect()
}

fn seeded_randomizer() -> Behavior {
    behavior(
        "a seeded randomizer",
        vec![
            example(shuffle_context("a1b2c3d4e5"))
                .description("shuffling keeps every item")
                .script(
                    veridoc::Script::new()
                        .prepare(vec![fact("there are ten items", |s: &mut Shuffle| {
                            expect_equal(&s.items.len(), &10)
                        })])
                        .perform(vec![
                            step("the items are ordered", |s: &mut Shuffle| {
                                s.first = ordered(&s.randomizer, &s.items);
                                Ok(())
                            }),
                            step("a fresh randomizer with the same seed orders them", |s: &mut Shuffle| {
                                let fresh = SeededRandomizer::with_seed(s.randomizer.seed());
                                s.second = ordered(&fresh, &s.items);
                                Ok(())
                            }),
                        ])
                        .observe(vec![outcome(
                            "the permutation",
                            vec![
                                effect("has the same length", |s: &mut Shuffle| {
                                    expect_equal(&s.first.len(), &s.items.len())
                                }),
                                effect("contains every item", |s: &mut Shuffle| {
                                    let mut sorted = s.first.clone();
                                    sorted.sort_unstable();
                                    expect_equal(&sorted, &s.items)
                                }),
                                effect("leaves the input untouched", |s: &mut Shuffle| {
                                    expect_equal(&s.items, &(0..10).collect::<Vec<u32>>())
                                }),
                                effect("is reproduced by the same seed", |s: &mut Shuffle| {
                                    expect_equal(&s.second, &s.first)
                                }),
                            ],
                        )]),
                )
                .into(),
            example(shuffle_context("plum"))
                .description("the seed is part of the description")
                .script(veridoc::Script::new().observe(vec![effect(
                    "the description names the seed",
                    |s: &mut Shuffle| {
                        expect_equal(
                            s.randomizer.description().as_str(),
                            "Order: random, seed: plum",
                        )
                    },
                )]))
                .into(),
        ],
    )
}

fn summary_counting() -> Behavior {
    behavior(
        "a summary",
        vec![example(Context::<Summary>::default_value())
            .description("valid actions are steps, not claims")
            .script(
                veridoc::Script::new()
                    .perform(vec![procedure(
                        "results are recorded",
                        vec![
                            step("a valid action", |s: &mut Summary| {
                                s.record(ClaimKind::Action, &ClaimResult::valid("step", None));
                                Ok(())
                            }),
                            step("a valid observation", |s: &mut Summary| {
                                s.record(ClaimKind::Observation, &ClaimResult::valid("then", None));
                                Ok(())
                            }),
                            step("a skipped action", |s: &mut Summary| {
                                s.record(ClaimKind::Action, &ClaimResult::skipped("later"));
                                Ok(())
                            }),
                        ],
                    )])
                    .observe(vec![
                        effect("counts one valid claim", |s: &mut Summary| {
                            expect_equal(&s.valid, &1)
                        }),
                        effect("counts the skipped action", |s: &mut Summary| {
                            expect_equal(&s.skipped, &1)
                        }),
                    ]),
            )
            .into()],
    )
}

fn failures() -> Behavior {
    behavior(
        "a failure",
        vec![example(Context::new(|| Failure::expected_actual("equals", &10, &12)))
            .description("built from a comparison")
            .script(veridoc::Script::new().observe(vec![
                effect("has no message", |f: &mut Failure| {
                    expect_equal(&f.message.is_none(), &true)
                }),
                effect("renders both values", |f: &mut Failure| {
                    expect_equal(f.to_string().as_str(), "expected 10 (equals), actual 12")
                }),
            ]))
            .into()],
    )
}

fn timer() -> Behavior {
    behavior(
        "a timer",
        vec![example(Context::new(Timer::new))
            .description("measures an awaited pause")
            .script(
                veridoc::Script::new()
                    .perform(vec![veridoc::step_async("a short pause is timed", |t: &mut Timer| {
                        async move {
                            t.start();
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            t.stop();
                            Ok(())
                        }
                        .boxed()
                    })])
                    .observe(vec![effect("the duration covers the pause", |t: &mut Timer| {
                        match t.duration() {
                            Some(duration) if duration >= Duration::from_millis(5) => Ok(()),
                            other => Err(Failure::new(format!("unexpected duration {other:?}"))),
                        }
                    })]),
            )
            .into()],
    )
}

//! Behaviors group the examples that document one unit of functionality.

use crate::example::{RunMode, ValidatableExample};
use std::fmt;

/// A described group of examples, possibly over different context types
pub struct Behavior {
    description: String,
    examples: Vec<Box<dyn ValidatableExample>>,
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let examples: Vec<Option<&str>> = self.examples.iter().map(|e| e.description()).collect();
        f.debug_struct("Behavior")
            .field("description", &self.description)
            .field("examples", &examples)
            .finish()
    }
}

impl Behavior {
    /// Behavior without examples
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            examples: Vec::new(),
        }
    }

    /// Add an example
    #[must_use]
    pub fn example(mut self, example: impl Into<Box<dyn ValidatableExample>>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Behavior description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Examples in declaration order
    #[must_use]
    pub fn examples(&self) -> &[Box<dyn ValidatableExample>] {
        &self.examples
    }

    /// Check if any example is picked
    #[must_use]
    pub fn has_picked(&self) -> bool {
        self.examples
            .iter()
            .any(|example| example.mode() == RunMode::Picked)
    }
}

/// Declare a behavior from a list of examples
#[must_use]
pub fn behavior(
    description: impl Into<String>,
    examples: Vec<Box<dyn ValidatableExample>>,
) -> Behavior {
    Behavior {
        description: description.into(),
        examples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{example, Context, Script};

    #[test]
    fn test_mixed_context_types() {
        let behavior = Behavior::new("a counter")
            .example(
                example(Context::new(|| 0_i32))
                    .description("integers")
                    .script(Script::new()),
            )
            .example(
                example(Context::new(String::new))
                    .description("strings")
                    .pick()
                    .script(Script::new())
                    .build(),
            );

        assert_eq!(behavior.description(), "a counter");
        assert_eq!(behavior.examples().len(), 2);
        assert!(behavior.has_picked());
        assert!(format!("{behavior:?}").contains("strings"));
    }

    #[test]
    fn test_behavior_function() {
        let declared = behavior(
            "empty",
            vec![example(Context::<()>::default_value())
                .script(Script::new())
                .into()],
        );
        assert!(!declared.has_picked());
        assert_eq!(declared.examples()[0].description(), None);
    }
}

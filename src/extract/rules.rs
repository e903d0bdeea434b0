//! Ordered first-match rule tables
//!
//! Several extractors resolve a value by testing conditions in a fixed order
//! and taking the outcome of the first one that holds, falling back to a
//! default. `RuleSet` makes that order explicit and inspectable.

use std::fmt;

type Predicate<'a, C> = Box<dyn Fn(&C) -> bool + Send + Sync + 'a>;

struct Rule<'a, C: ?Sized, O> {
    name: &'static str,
    test: Predicate<'a, C>,
    outcome: O,
}

/// An ordered list of `(condition, outcome)` rules with a default outcome
pub struct RuleSet<'a, C: ?Sized, O> {
    rules: Vec<Rule<'a, C, O>>,
    default: O,
}

impl<'a, C: ?Sized, O> RuleSet<'a, C, O> {
    /// Create a rule set that resolves to `default` when no rule holds
    #[must_use]
    pub fn new(default: O) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Append a rule; rules are tested in insertion order
    #[must_use]
    pub fn rule(
        mut self,
        name: &'static str,
        test: impl Fn(&C) -> bool + Send + Sync + 'a,
        outcome: O,
    ) -> Self {
        self.rules.push(Rule {
            name,
            test: Box::new(test),
            outcome,
        });
        self
    }

    /// Name and outcome of the first rule that holds
    pub fn first_match(&self, context: &C) -> Option<(&'static str, &O)> {
        self.rules
            .iter()
            .find(|rule| (rule.test)(context))
            .map(|rule| (rule.name, &rule.outcome))
    }

    /// Outcome of the first rule that holds, else the default
    pub fn resolve(&self, context: &C) -> &O {
        self.first_match(context)
            .map_or(&self.default, |(_, outcome)| outcome)
    }

    /// Rule names in test order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<C: ?Sized, O: fmt::Debug> fmt::Debug for RuleSet<'_, C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names().collect::<Vec<_>>())
            .field("default", &self.default)
            .finish()
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
//! Cardinality rule evaluation.
//!
//! For every statement the evaluator counts the values that satisfy at least
//! one class combination of the statement, then applies the statement kind
//! to that count. Statements are checked in order and evaluation stops at
//! the first failing one.
//!
//! Cost is O(values × statements × combinations).

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, trace};

use crate::class::{ClassResolver, Classified, TagResolver};
use crate::config::SemanticConfig;
use crate::error::Result;
use crate::statement::{AlternativeSet, ClassCombination, RawRule, RuleSet, Statement};

/// The first statement a value list failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Position of the statement in its rule set
    pub index: usize,
    /// Rendered statement text, e.g. `min 2 Class1`
    pub statement: String,
    /// Number of values matching the statement's alternatives
    pub match_count: usize,
    /// Total number of values
    pub value_count: usize,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "statement {} ({}) not satisfied: {} of {} values match",
            self.index, self.statement, self.match_count, self.value_count
        )
    }
}

/// Evaluates rule sets against value lists using a class resolution strategy
#[derive(Debug)]
pub struct Evaluator<'r, R: ?Sized> {
    resolver: &'r R,
}

impl<R: ?Sized> Clone for Evaluator<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for Evaluator<'_, R> {}

impl<'r, R: ?Sized> Evaluator<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &'r R {
        self.resolver
    }

    /// Whether `value` belongs to every class of `combination`
    pub fn matches<V: ?Sized>(&self, value: &V, combination: &ClassCombination) -> bool
    where
        R: ClassResolver<V>,
    {
        combination
            .classes()
            .iter()
            .all(|class| self.resolver.is_instance(value, class))
    }

    /// Whether `value` satisfies at least one combination of `alternatives`
    pub fn matches_any<V: ?Sized>(&self, value: &V, alternatives: &AlternativeSet) -> bool
    where
        R: ClassResolver<V>,
    {
        alternatives
            .combinations()
            .iter()
            .any(|combination| self.matches(value, combination))
    }

    /// Number of values satisfying the statement's alternatives.
    /// A value matching several combinations counts once.
    pub fn match_count<V>(&self, values: &[V], statement: &Statement) -> usize
    where
        R: ClassResolver<V>,
    {
        values
            .iter()
            .filter(|value| self.matches_any(*value, statement.alternatives()))
            .count()
    }

    /// The first statement `values` fails, if any
    pub fn first_violation<V>(&self, values: &[V], rules: &RuleSet) -> Option<Violation>
    where
        R: ClassResolver<V>,
    {
        for (index, statement) in rules.iter().enumerate() {
            let match_count = self.match_count(values, statement);
            trace!(
                index,
                statement = %statement,
                match_count,
                value_count = values.len(),
                "Statement evaluated"
            );

            if !statement.kind().admits(match_count, values.len()) {
                debug!(
                    index,
                    statement = %statement,
                    match_count,
                    value_count = values.len(),
                    "Cardinality statement not satisfied"
                );
                return Some(Violation {
                    index,
                    statement: statement.to_string(),
                    match_count,
                    value_count: values.len(),
                });
            }
        }
        None
    }

    /// Whether `values` satisfies every statement of `rules`.
    /// An empty rule set is satisfied by any value list.
    pub fn evaluate<V>(&self, values: &[V], rules: &RuleSet) -> bool
    where
        R: ClassResolver<V>,
    {
        self.first_violation(values, rules).is_none()
    }

    /// Parse generator output and evaluate it in one step.
    ///
    /// Malformed statements are reported before any value is inspected.
    #[instrument(skip_all, fields(values = values.len(), statements = raw.len()))]
    pub fn evaluate_raw<V>(&self, values: &[V], raw: &[RawRule], config: &SemanticConfig) -> Result<bool>
    where
        R: ClassResolver<V>,
    {
        let rules = RuleSet::from_raw_with(raw, config)?;
        Ok(self.evaluate(values, &rules))
    }
}

/// Evaluate `rules` against values that carry their full tag sets
pub fn evaluate<V: Classified>(values: &[V], rules: &RuleSet) -> bool {
    Evaluator::new(&TagResolver).evaluate(values, rules)
}

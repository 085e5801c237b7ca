// SPDX-License-Identifier: PMPL-1.0-or-later
//! Relationship fields.
//!
//! A [`Relationship`] is the value list of one relationship field together
//! with the restriction it must satisfy. The rule set and the class resolver
//! are fixed when the relationship is created; only the value list changes.
//! Validity is recomputed on every call to [`Relationship::validate`].

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::class::{ClassResolver, Classified, TagResolver};
use crate::error::{Result, SemanticError};
use crate::evaluator::{Evaluator, Violation};
use crate::statement::{RawRule, RuleSet};

/// Shared class resolution strategy for a relationship's values
pub type SharedResolver<V> = Arc<dyn ClassResolver<V> + Send + Sync>;

/// Values of a relationship field constrained by a cardinality rule set
pub struct Relationship<V> {
    rule: String,
    rules: Arc<RuleSet>,
    resolver: SharedResolver<V>,
    values: Vec<V>,
}

impl<V> Relationship<V> {
    /// Create an empty relationship resolving classes through `resolver`
    pub fn new(rules: Arc<RuleSet>, resolver: SharedResolver<V>) -> Self {
        Self {
            rule: rules.to_string(),
            rules,
            resolver,
            values: Vec::new(),
        }
    }

    /// Create an empty relationship from generator output.
    ///
    /// Malformed statements fail here rather than at validation time.
    pub fn from_raw(raw: &[RawRule], resolver: SharedResolver<V>) -> Result<Self> {
        let rules = RuleSet::from_raw(raw)?;
        Ok(Self::new(Arc::new(rules), resolver))
    }

    /// Replace the derived rule text with the text given by the vocabulary
    pub fn with_rule_text(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    /// Human-readable restriction, e.g. `some (Class2 or Class4)`
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Append a value; duplicates are allowed
    pub fn append(&mut self, value: V) {
        self.values.push(value);
    }

    /// Remove and return the value at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<V> {
        if index >= self.values.len() {
            return Err(SemanticError::IndexOutOfRange {
                index,
                len: self.values.len(),
            });
        }
        Ok(self.values.remove(index))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether the current values satisfy every statement
    pub fn validate(&self) -> bool {
        self.evaluator().evaluate(&self.values, &self.rules)
    }

    /// The first statement the current values fail, if any
    pub fn violation(&self) -> Option<Violation> {
        self.evaluator().first_violation(&self.values, &self.rules)
    }

    fn evaluator(&self) -> Evaluator<'_, dyn ClassResolver<V> + Send + Sync> {
        Evaluator::new(&*self.resolver)
    }
}

impl<V: PartialEq> Relationship<V> {
    /// Remove the first value equal to `value`, returning whether one was found
    pub fn remove(&mut self, value: &V) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<V: Classified + 'static> Relationship<V> {
    /// Create an empty relationship whose values carry their full tag sets
    pub fn with_tags(rules: RuleSet) -> Self {
        Self::new(Arc::new(rules), Arc::new(TagResolver))
    }
}

impl<V> Deref for Relationship<V> {
    type Target = [V];

    fn deref(&self) -> &[V] {
        &self.values
    }
}

impl<V> Extend<V> for Relationship<V> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<'a, V> IntoIterator for &'a Relationship<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<V: Clone> Clone for Relationship<V> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            rules: Arc::clone(&self.rules),
            resolver: Arc::clone(&self.resolver),
            values: self.values.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Relationship<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("rule", &self.rule)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl<V: fmt::Debug> fmt::Display for Relationship<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.values)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
//! Cardinality statements and rule sets.
//!
//! A restriction on a relationship field arrives from the vocabulary model
//! generator as a list of `(token, [[class, ...], ...])` pairs. The token
//! packs the statement kind and its bound (`min|3`, `range|1,3`, `some`);
//! the nested list is an OR over AND-groups of class names.
//!
//! Parsing is eager: a malformed token fails here, never during evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::config::SemanticConfig;
use crate::error::{Result, SemanticError};

/// One restriction as produced by the model generator: kind token plus
/// alternative class combinations.
pub type RawRule = (String, Vec<Vec<String>>);

/// Kind of a cardinality statement, with its bound where one applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", try_from = "KindRepr")]
pub enum StatementKind {
    /// Every value matches
    Only,
    /// At least one value matches
    Some,
    /// At least `n` values match
    Min { n: usize },
    /// At most `n` values match
    Max { n: usize },
    /// Exactly `n` values match
    Exactly { n: usize },
    /// Between `min` and `max` values match, inclusive
    Range { min: usize, max: usize },
    /// The named individual is among the values
    Value,
}

/// Unchecked wire form of [`StatementKind`]
#[derive(Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
enum KindRepr {
    Only,
    Some,
    Min { n: usize },
    Max { n: usize },
    Exactly { n: usize },
    Range { min: usize, max: usize },
    Value,
}

impl TryFrom<KindRepr> for StatementKind {
    type Error = SemanticError;

    fn try_from(repr: KindRepr) -> Result<Self> {
        let kind = match repr {
            KindRepr::Only => StatementKind::Only,
            KindRepr::Some => StatementKind::Some,
            KindRepr::Value => StatementKind::Value,
            KindRepr::Min { n } => StatementKind::Min { n },
            KindRepr::Max { n } => StatementKind::Max { n },
            KindRepr::Exactly { n } => StatementKind::Exactly { n },
            KindRepr::Range { min, max } => StatementKind::Range { min, max },
        };
        kind.check()?;
        Ok(kind)
    }
}

impl StatementKind {
    /// Parse a kind token with the default configuration
    pub fn parse(token: &str) -> Result<Self> {
        Self::parse_with(token, &SemanticConfig::default())
    }

    /// Parse a kind token such as `min|3` or `some`
    pub fn parse_with(token: &str, config: &SemanticConfig) -> Result<Self> {
        let (kind, bound) = match token.split_once(config.separator) {
            Some((kind, bound)) => (kind.trim(), Some(bound.trim())),
            None => (token.trim(), None),
        };
        let kind = if config.case_insensitive_kinds {
            kind.to_lowercase()
        } else {
            kind.to_string()
        };

        match kind.as_str() {
            "only" | "some" | "value" => {
                if let Some(bound) = bound {
                    if config.reject_unexpected_bounds {
                        return Err(SemanticError::InvalidBound {
                            statement: token.to_string(),
                            reason: format!("{kind} takes no bound"),
                        });
                    }
                    warn!(statement = %token, bound = %bound, "Ignoring bound on unbounded statement");
                }
                Ok(match kind.as_str() {
                    "only" => StatementKind::Only,
                    "some" => StatementKind::Some,
                    _ => StatementKind::Value,
                })
            }
            "min" => Ok(StatementKind::Min { n: parse_bound(token, bound)? }),
            "max" => Ok(StatementKind::Max { n: parse_bound(token, bound)? }),
            "exactly" => Ok(StatementKind::Exactly { n: parse_bound(token, bound)? }),
            "range" => {
                let bound = required(token, bound)?;
                let (lower, upper) = bound.split_once(config.range_separator).ok_or_else(|| {
                    SemanticError::InvalidBound {
                        statement: token.to_string(),
                        reason: format!(
                            "expected lower{}upper, found {bound:?}",
                            config.range_separator
                        ),
                    }
                })?;
                let min = parse_number(token, lower.trim())?;
                let max = parse_number(token, upper.trim())?;
                if min > max {
                    return Err(SemanticError::InvalidBound {
                        statement: token.to_string(),
                        reason: format!("lower bound {min} exceeds upper bound {max}"),
                    });
                }
                Ok(StatementKind::Range { min, max })
            }
            _ => Err(SemanticError::UnknownStatementKind(token.to_string())),
        }
    }

    /// Reject a range whose lower bound exceeds its upper bound
    pub fn check(&self) -> Result<()> {
        if let StatementKind::Range { min, max } = *self {
            if min > max {
                return Err(SemanticError::InvalidBound {
                    statement: self.to_string(),
                    reason: format!("lower bound {min} exceeds upper bound {max}"),
                });
            }
        }
        Ok(())
    }

    /// Whether `match_count` matching values out of `value_count` satisfy this kind
    pub fn admits(&self, match_count: usize, value_count: usize) -> bool {
        match *self {
            StatementKind::Only => match_count == value_count,
            StatementKind::Some | StatementKind::Value => match_count >= 1,
            StatementKind::Min { n } => match_count >= n,
            StatementKind::Max { n } => match_count <= n,
            StatementKind::Exactly { n } => match_count == n,
            StatementKind::Range { min, max } => (min..=max).contains(&match_count),
        }
    }

    /// Encode back into the token form, e.g. `min|3`
    pub fn to_token(&self, config: &SemanticConfig) -> String {
        let sep = config.separator;
        match *self {
            StatementKind::Only => "only".to_string(),
            StatementKind::Some => "some".to_string(),
            StatementKind::Value => "value".to_string(),
            StatementKind::Min { n } => format!("min{sep}{n}"),
            StatementKind::Max { n } => format!("max{sep}{n}"),
            StatementKind::Exactly { n } => format!("exactly{sep}{n}"),
            StatementKind::Range { min, max } => {
                format!("range{sep}{min}{}{max}", config.range_separator)
            }
        }
    }
}

fn required<'a>(token: &str, bound: Option<&'a str>) -> Result<&'a str> {
    match bound {
        Some(b) if !b.is_empty() => Ok(b),
        _ => Err(SemanticError::MissingBound(token.to_string())),
    }
}

fn parse_bound(token: &str, bound: Option<&str>) -> Result<usize> {
    parse_number(token, required(token, bound)?)
}

fn parse_number(token: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().map_err(|_| SemanticError::InvalidBound {
        statement: token.to_string(),
        reason: format!("expected a non-negative integer, found {raw:?}"),
    })
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Only => write!(f, "only"),
            StatementKind::Some => write!(f, "some"),
            StatementKind::Value => write!(f, "value"),
            StatementKind::Min { n } => write!(f, "min {n}"),
            StatementKind::Max { n } => write!(f, "max {n}"),
            StatementKind::Exactly { n } => write!(f, "exactly {n}"),
            StatementKind::Range { min, max } => write!(f, "range {min},{max}"),
        }
    }
}

impl FromStr for StatementKind {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Classes a value must all belong to (logical AND)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCombination(Vec<String>);

impl ClassCombination {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self(classes.into_iter().map(Into::into).collect())
    }

    pub fn classes(&self) -> &[String] {
        &self.0
    }

    /// An empty combination is satisfied by every value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClassCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "Thing"),
            [single] => write!(f, "{single}"),
            many => write!(f, "({})", many.join(" and ")),
        }
    }
}

/// Alternative combinations, any one of which suffices (logical OR)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlternativeSet(Vec<ClassCombination>);

impl AlternativeSet {
    pub fn new(combinations: impl IntoIterator<Item = ClassCombination>) -> Self {
        Self(combinations.into_iter().collect())
    }

    pub fn combinations(&self) -> &[ClassCombination] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every class name mentioned in any combination
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(|c| c.0.iter().map(String::as_str))
    }
}

impl From<Vec<Vec<String>>> for AlternativeSet {
    fn from(raw: Vec<Vec<String>>) -> Self {
        Self(raw.into_iter().map(ClassCombination).collect())
    }
}

impl fmt::Display for AlternativeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            many => {
                write!(f, "(")?;
                for (i, combination) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{combination}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A single cardinality constraint.
///
/// Every constructor, deserialization included, rejects an empty
/// alternative set and an inverted range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StatementRepr")]
pub struct Statement {
    kind: StatementKind,
    alternatives: AlternativeSet,
}

#[derive(Deserialize)]
struct StatementRepr {
    kind: StatementKind,
    alternatives: AlternativeSet,
}

impl TryFrom<StatementRepr> for Statement {
    type Error = SemanticError;

    fn try_from(repr: StatementRepr) -> Result<Self> {
        Self::new(repr.kind, repr.alternatives)
    }
}

impl Statement {
    /// Create a statement; the alternative set must not be empty
    pub fn new(kind: StatementKind, alternatives: AlternativeSet) -> Result<Self> {
        kind.check()?;
        if alternatives.is_empty() {
            return Err(SemanticError::EmptyAlternativeSet(kind.to_string()));
        }
        Ok(Self { kind, alternatives })
    }

    /// Parse a raw `(token, alternatives)` pair with the default configuration
    pub fn parse(token: &str, alternatives: Vec<Vec<String>>) -> Result<Self> {
        Self::parse_with(token, alternatives, &SemanticConfig::default())
    }

    pub fn parse_with(
        token: &str,
        alternatives: Vec<Vec<String>>,
        config: &SemanticConfig,
    ) -> Result<Self> {
        let kind = StatementKind::parse_with(token, config)?;
        if alternatives.is_empty() {
            return Err(SemanticError::EmptyAlternativeSet(token.to_string()));
        }
        Ok(Self {
            kind,
            alternatives: alternatives.into(),
        })
    }
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn alternatives(&self) -> &AlternativeSet {
        &self.alternatives
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.alternatives)
    }
}

/// Ordered statements, all of which must hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<Statement>);

impl RuleSet {
    pub fn new(statements: impl IntoIterator<Item = Statement>) -> Self {
        Self(statements.into_iter().collect())
    }

    /// Parse generator output with the default configuration
    pub fn from_raw(raw: &[RawRule]) -> Result<Self> {
        Self::from_raw_with(raw, &SemanticConfig::default())
    }

    pub fn from_raw_with(raw: &[RawRule], config: &SemanticConfig) -> Result<Self> {
        raw.iter()
            .map(|(token, alternatives)| Statement::parse_with(token, alternatives.clone(), config))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Encode back into generator form
    pub fn to_raw(&self, config: &SemanticConfig) -> Vec<RawRule> {
        self.0
            .iter()
            .map(|s| {
                let alternatives = s
                    .alternatives
                    .combinations()
                    .iter()
                    .map(|c| c.classes().to_vec())
                    .collect();
                (s.kind.to_token(config), alternatives)
            })
            .collect()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every class name the rule set refers to, deduplicated and sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .0
            .iter()
            .flat_map(|s| s.alternatives.class_names())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(token: &str, alternatives: &[&[&str]]) -> RawRule {
        (
            token.to_string(),
            alternatives
                .iter()
                .map(|c| c.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(StatementKind::parse("only").unwrap(), StatementKind::Only);
        assert_eq!(StatementKind::parse("some").unwrap(), StatementKind::Some);
        assert_eq!(StatementKind::parse("value").unwrap(), StatementKind::Value);
        assert_eq!(StatementKind::parse("min|3").unwrap(), StatementKind::Min { n: 3 });
        assert_eq!(StatementKind::parse("max|0").unwrap(), StatementKind::Max { n: 0 });
        assert_eq!(
            StatementKind::parse("exactly|2").unwrap(),
            StatementKind::Exactly { n: 2 }
        );
        assert_eq!(
            StatementKind::parse("range|1,3").unwrap(),
            StatementKind::Range { min: 1, max: 3 }
        );
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = StatementKind::parse("maybe|3").unwrap_err();
        assert!(matches!(err, SemanticError::UnknownStatementKind(ref s) if s == "maybe|3"));

        // Substrings of known kinds are not accepted
        assert!(StatementKind::parse("minimum|3").is_err());
        assert!(StatementKind::parse("somewhat").is_err());
    }

    #[test]
    fn test_bound_errors() {
        assert!(matches!(
            StatementKind::parse("min"),
            Err(SemanticError::MissingBound(_))
        ));
        assert!(matches!(
            StatementKind::parse("max|"),
            Err(SemanticError::MissingBound(_))
        ));
        assert!(matches!(
            StatementKind::parse("exactly|two"),
            Err(SemanticError::InvalidBound { .. })
        ));
        assert!(matches!(
            StatementKind::parse("min|-1"),
            Err(SemanticError::InvalidBound { .. })
        ));
        assert!(matches!(
            StatementKind::parse("range|3"),
            Err(SemanticError::InvalidBound { .. })
        ));
        assert!(matches!(
            StatementKind::parse("range|4,2"),
            Err(SemanticError::InvalidBound { .. })
        ));
        assert!(matches!(
            StatementKind::parse("some|3"),
            Err(SemanticError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_lenient_config() {
        let config = SemanticConfig::lenient();
        assert_eq!(
            StatementKind::parse_with("MIN|2", &config).unwrap(),
            StatementKind::Min { n: 2 }
        );
        assert_eq!(
            StatementKind::parse_with("some|3", &config).unwrap(),
            StatementKind::Some
        );
        // Unknown kinds stay fatal even in lenient mode
        assert!(StatementKind::parse_with("maybe", &config).is_err());
    }

    #[test]
    fn test_custom_separator() {
        let config = SemanticConfig {
            separator: ':',
            range_separator: '-',
            ..SemanticConfig::default()
        };
        assert_eq!(
            StatementKind::parse_with("min:4", &config).unwrap(),
            StatementKind::Min { n: 4 }
        );
        assert_eq!(
            StatementKind::parse_with("range:1-2", &config).unwrap(),
            StatementKind::Range { min: 1, max: 2 }
        );
        assert_eq!(StatementKind::Min { n: 4 }.to_token(&config), "min:4");
    }

    #[test]
    fn test_admits_table() {
        assert!(StatementKind::Only.admits(3, 3));
        assert!(!StatementKind::Only.admits(2, 3));
        assert!(StatementKind::Only.admits(0, 0));

        assert!(!StatementKind::Some.admits(0, 4));
        assert!(StatementKind::Some.admits(1, 4));
        assert!(StatementKind::Value.admits(1, 1));

        assert!(!StatementKind::Min { n: 2 }.admits(1, 5));
        assert!(StatementKind::Min { n: 2 }.admits(2, 5));
        assert!(StatementKind::Max { n: 2 }.admits(2, 5));
        assert!(!StatementKind::Max { n: 2 }.admits(3, 5));
        assert!(StatementKind::Exactly { n: 2 }.admits(2, 5));
        assert!(!StatementKind::Exactly { n: 2 }.admits(3, 5));

        let range = StatementKind::Range { min: 1, max: 2 };
        assert!(!range.admits(0, 3));
        assert!(range.admits(1, 3));
        assert!(range.admits(2, 3));
        assert!(!range.admits(3, 3));
    }

    #[test]
    fn test_empty_alternatives_rejected() {
        assert!(matches!(
            Statement::parse("min|1", vec![]),
            Err(SemanticError::EmptyAlternativeSet(_))
        ));
        assert!(matches!(
            Statement::new(StatementKind::Some, AlternativeSet::default()),
            Err(SemanticError::EmptyAlternativeSet(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected_at_construction() {
        let inverted = StatementKind::Range { min: 5, max: 1 };
        assert!(matches!(
            inverted.check(),
            Err(SemanticError::InvalidBound { .. })
        ));
        assert!(matches!(
            Statement::new(inverted, AlternativeSet::from(vec![vec!["A".to_string()]])),
            Err(SemanticError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates_statements() {
        let empty = r#"[{"kind":{"kind":"min","n":0},"alternatives":[]}]"#;
        assert!(serde_json::from_str::<RuleSet>(empty).is_err());

        let inverted = r#"[{"kind":{"kind":"range","min":5,"max":1},"alternatives":[["A"]]}]"#;
        assert!(serde_json::from_str::<RuleSet>(inverted).is_err());
        assert!(serde_json::from_str::<StatementKind>(r#"{"kind":"range","min":5,"max":1}"#).is_err());

        let rules = RuleSet::from_raw(&[
            raw("range|1,3", &[&["A"], &["B", "C"]]),
            raw("value", &[&["Individual1"]]),
        ])
        .unwrap();
        let json = serde_json::to_string(&rules).unwrap();
        let reloaded: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, rules);
        assert_eq!(reloaded.statements()[0].kind(), StatementKind::Range { min: 1, max: 3 });
        assert_eq!(reloaded.statements()[1].alternatives().to_string(), "Individual1");
    }

    #[test]
    fn test_rule_text() {
        let rules = RuleSet::from_raw(&[raw("some", &[&["Class2"], &["Class4"]])]).unwrap();
        assert_eq!(rules.to_string(), "some (Class2 or Class4)");

        let rules = RuleSet::from_raw(&[
            raw("some", &[&["Class1"]]),
            raw("value", &[&["Individual1"]]),
            raw("some", &[&["Class1", "Class2"]]),
        ])
        .unwrap();
        assert_eq!(
            rules.to_string(),
            "some Class1, value Individual1, some (Class1 and Class2)"
        );

        let rules = RuleSet::from_raw(&[
            raw("min|2", &[&["A"]]),
            raw("range|1,3", &[&["A", "B"], &["C"]]),
        ])
        .unwrap();
        assert_eq!(rules.to_string(), "min 2 A, range 1,3 ((A and B) or C)");
    }

    #[test]
    fn test_raw_round_trip() {
        let original = vec![
            raw("exactly|1", &[&["A"], &["B", "C"]]),
            raw("only", &[&["A"]]),
        ];
        let config = SemanticConfig::default();
        let rules = RuleSet::from_raw_with(&original, &config).unwrap();
        assert_eq!(rules.to_raw(&config), original);
    }

    #[test]
    fn test_class_names_deduplicated() {
        let rules = RuleSet::from_raw(&[
            raw("some", &[&["B", "A"]]),
            raw("only", &[&["A"], &["C"]]),
        ])
        .unwrap();
        assert_eq!(rules.class_names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_first_bad_statement_fails_the_set() {
        let result = RuleSet::from_raw(&[raw("some", &[&["A"]]), raw("maybe|3", &[&["A"]])]);
        assert!(matches!(result, Err(SemanticError::UnknownStatementKind(_))));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
//! Statement parsing configuration.
//!
//! Defaults match the encoding produced by the vocabulary model generator:
//! - kind and bound joined by `|` (`min|3`)
//! - range bounds joined by `,` (`range|1,3`)
//! - kinds are lowercase, bounds on unbounded kinds are rejected

use serde::{Deserialize, Serialize};

/// Configuration for turning raw statement tokens into [`crate::Statement`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Separator between the kind and its bound.
    pub separator: char,
    /// Separator between the lower and upper bound of a range.
    pub range_separator: char,
    /// Accept kinds regardless of case (`MIN|2`).
    pub case_insensitive_kinds: bool,
    /// Treat a bound on `some`/`only`/`value` as a configuration error.
    /// When false the bound is ignored and a warning is logged.
    pub reject_unexpected_bounds: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            separator: '|',
            range_separator: ',',
            case_insensitive_kinds: false,
            reject_unexpected_bounds: true,
        }
    }
}

impl SemanticConfig {
    /// Lenient configuration: case-insensitive kinds, stray bounds ignored.
    pub fn lenient() -> Self {
        Self {
            case_insensitive_kinds: true,
            reject_unexpected_bounds: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SemanticConfig::default();
        assert_eq!(config.separator, '|');
        assert_eq!(config.range_separator, ',');
        assert!(!config.case_insensitive_kinds);
        assert!(config.reject_unexpected_bounds);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: SemanticConfig =
            serde_json::from_str(r#"{"separator": ":"}"#).unwrap();
        assert_eq!(config.separator, ':');
        assert_eq!(config.range_separator, ',');
        assert!(config.reject_unexpected_bounds);
    }

    #[test]
    fn test_lenient() {
        let config = SemanticConfig::lenient();
        assert!(config.case_insensitive_kinds);
        assert!(!config.reject_unexpected_bounds);
        assert_eq!(config.separator, '|');
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
//! Vocabulary schema.
//!
//! JSON description of the classes, individuals and relationship
//! restrictions produced by the vocabulary model generator:
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "Class1", "relationships": { "oProp1": [["some", [["Class2"], ["Class4"]]]] } },
//!     { "name": "Class2" },
//!     { "name": "Class4" },
//!     { "name": "Class123", "parents": ["Class1", "Class2"] }
//!   ],
//!   "individuals": [ { "name": "Individual1", "classes": ["Class1"] } ]
//! }
//! ```
//!
//! Classes may be listed in any order. Every restriction is parsed and every
//! class name checked while loading.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::info;

use crate::class::{ClassName, ClassRegistry};
use crate::config::SemanticConfig;
use crate::error::{Result, SemanticError};
use crate::statement::{RawRule, RuleSet};

/// A class entry in the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    pub name: ClassName,
    #[serde(default)]
    pub parents: Vec<ClassName>,
    /// Relationship field name to restriction
    #[serde(default)]
    pub relationships: BTreeMap<String, Vec<RawRule>>,
}

/// A named individual in the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualSchema {
    pub name: ClassName,
    #[serde(default)]
    pub classes: Vec<ClassName>,
}

/// Complete vocabulary description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySchema {
    #[serde(default)]
    pub config: SemanticConfig,
    #[serde(default)]
    pub classes: Vec<ClassSchema>,
    #[serde(default)]
    pub individuals: Vec<IndividualSchema>,
}

impl VocabularySchema {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a registry from this schema.
    ///
    /// Classes are registered parents first regardless of listing order.
    /// A parent that is never declared is reported as
    /// [`SemanticError::UnknownClass`], a parent cycle as
    /// [`SemanticError::CyclicHierarchy`].
    pub fn build_registry(&self) -> Result<ClassRegistry> {
        let mut builder = ClassRegistry::builder().with_config(self.config.clone());

        let mut registered: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&ClassSchema> = self.classes.iter().collect();
        while !pending.is_empty() {
            let (ready, waiting): (Vec<&ClassSchema>, Vec<&ClassSchema>) = pending
                .into_iter()
                .partition(|c| c.parents.iter().all(|p| registered.contains(p.as_str())));

            if ready.is_empty() {
                let declared: HashSet<&str> =
                    self.classes.iter().map(|c| c.name.as_str()).collect();
                if let Some(missing) = waiting
                    .iter()
                    .flat_map(|c| c.parents.iter())
                    .find(|p| !declared.contains(p.as_str()))
                {
                    return Err(SemanticError::UnknownClass(missing.clone()));
                }
                let mut stuck: Vec<ClassName> = waiting.iter().map(|c| c.name.clone()).collect();
                stuck.sort_unstable();
                return Err(SemanticError::CyclicHierarchy(stuck));
            }

            for class in ready {
                builder.add_class(&class.name, class.parents.as_slice())?;
                registered.insert(&class.name);
            }
            pending = waiting;
        }

        for individual in &self.individuals {
            builder.add_individual(&individual.name, individual.classes.as_slice())?;
        }

        for class in &self.classes {
            for (field, raw) in &class.relationships {
                let rules = RuleSet::from_raw_with(raw, builder.config())?;
                builder.add_relationship(&class.name, field, rules)?;
            }
        }

        info!(
            classes = self.classes.len(),
            individuals = self.individuals.len(),
            "Vocabulary loaded"
        );
        Ok(builder.build())
    }
}

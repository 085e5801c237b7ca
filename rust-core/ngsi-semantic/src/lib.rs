// SPDX-License-Identifier: PMPL-1.0-or-later
//! NGSI Semantic Models
//!
//! Relationship fields of semantic entity models, constrained by OWL-style
//! cardinality restrictions (`only`, `some`, `min n`, `max n`, `exactly n`,
//! `range n,m`, `value`). A restriction is an ordered list of statements;
//! each statement counts the values that belong to at least one of its class
//! combinations and checks that count against its kind.
//!
//! ```
//! use std::sync::Arc;
//! use ngsi_semantic::{VocabularySchema, SemanticError};
//!
//! # fn main() -> Result<(), SemanticError> {
//! let schema = VocabularySchema::from_json(r#"{
//!     "classes": [
//!         { "name": "Class1", "relationships": { "oProp1": [["some", [["Class2"], ["Class4"]]]] } },
//!         { "name": "Class2" },
//!         { "name": "Class4" }
//!     ]
//! }"#)?;
//! let registry = Arc::new(schema.build_registry()?);
//!
//! let mut class1 = registry.instantiate("Class1")?;
//! assert!(!class1.is_valid());
//!
//! class1.relationship_mut("oProp1")?.append(registry.instance("Class2")?);
//! assert!(class1.is_valid());
//! # Ok(())
//! # }
//! ```

pub mod class;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod relationship;
pub mod schema;
pub mod statement;

pub use class::{
    ClassDef, ClassName, ClassRegistry, ClassRegistryBuilder, ClassResolver, Classified,
    IndividualDef, TagResolver, TagSet,
};
pub use config::SemanticConfig;
pub use error::{Result, SemanticError};
pub use evaluator::{evaluate, Evaluator, Violation};
pub use model::{Instance, InstanceRelationship, SemanticEntity};
pub use relationship::{Relationship, SharedResolver};
pub use schema::{ClassSchema, IndividualSchema, VocabularySchema};
pub use statement::{AlternativeSet, ClassCombination, RawRule, RuleSet, Statement, StatementKind};

// SPDX-License-Identifier: PMPL-1.0-or-later
//! Semantic instances and entities.
//!
//! An [`Instance`] is a value that can be placed in a relationship: an
//! instance of a registered class or a named individual. A
//! [`SemanticEntity`] is an instance of a class together with its
//! relationship fields, each starting empty and carrying the restriction the
//! vocabulary declares for it (including fields inherited from ancestors).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::class::{ClassName, ClassRegistry, Classified, TagSet};
use crate::error::{Result, SemanticError};
use crate::evaluator::Violation;
use crate::relationship::{Relationship, SharedResolver};

/// A classified value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instance {
    id: String,
    class: ClassName,
    individual: bool,
    tags: TagSet,
}

impl Instance {
    /// Create an instance with an explicit tag set, outside any registry
    pub fn new(id: impl Into<String>, class: impl Into<ClassName>, tags: TagSet) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            individual: false,
            tags,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The class (or individual name) this instance was created from
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn is_individual(&self) -> bool {
        self.individual
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}

impl Classified for Instance {
    fn class_tags(&self) -> &TagSet {
        &self.tags
    }
}

/// Relationship field holding shared instances
pub type InstanceRelationship = Relationship<Arc<Instance>>;

/// An instance of a class with its relationship fields
#[derive(Debug, Clone)]
pub struct SemanticEntity {
    instance: Arc<Instance>,
    relationships: BTreeMap<String, InstanceRelationship>,
}

impl SemanticEntity {
    /// The entity as a value that can be placed in other relationships
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn id(&self) -> &str {
        self.instance.id()
    }

    pub fn class(&self) -> &str {
        self.instance.class()
    }

    pub fn relationship_names(&self) -> impl Iterator<Item = &str> {
        self.relationships.keys().map(String::as_str)
    }

    pub fn relationship(&self, field: &str) -> Result<&InstanceRelationship> {
        self.relationships
            .get(field)
            .ok_or_else(|| self.unknown_field(field))
    }

    pub fn relationship_mut(&mut self, field: &str) -> Result<&mut InstanceRelationship> {
        let instance = &self.instance;
        self.relationships
            .get_mut(field)
            .ok_or_else(|| SemanticError::UnknownRelationship {
                class: instance.class().to_string(),
                field: field.to_string(),
            })
    }

    fn unknown_field(&self, field: &str) -> SemanticError {
        SemanticError::UnknownRelationship {
            class: self.instance.class().to_string(),
            field: field.to_string(),
        }
    }

    /// Whether every relationship field satisfies its restriction
    pub fn is_valid(&self) -> bool {
        self.relationships.values().all(Relationship::validate)
    }

    /// Names of the relationship fields that fail their restriction
    pub fn invalid_relationships(&self) -> Vec<&str> {
        self.relationships
            .iter()
            .filter(|(_, rel)| !rel.validate())
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// First violation of each failing relationship field
    pub fn violations(&self) -> Vec<(&str, Violation)> {
        self.relationships
            .iter()
            .filter_map(|(field, rel)| rel.violation().map(|v| (field.as_str(), v)))
            .collect()
    }
}

impl ClassRegistry {
    /// Create a value of a registered class or a named individual
    pub fn instance(&self, name: &str) -> Result<Arc<Instance>> {
        if self.is_individual(name) {
            return self.individual(name);
        }
        let id = self.next_instance_id(name);
        self.instance_with_id(name, id)
    }

    /// Create a value of a registered class with a caller-chosen id
    pub fn instance_with_id(&self, class: &str, id: impl Into<String>) -> Result<Arc<Instance>> {
        let def = self
            .class(class)
            .ok_or_else(|| SemanticError::UnknownClass(class.to_string()))?;

        Ok(Arc::new(Instance {
            id: id.into(),
            class: def.name.clone(),
            individual: false,
            tags: def.ancestors.clone(),
        }))
    }

    /// The value standing for a named individual
    pub fn individual(&self, name: &str) -> Result<Arc<Instance>> {
        let def = self
            .individual_def(name)
            .ok_or_else(|| SemanticError::UnknownClass(name.to_string()))?;

        Ok(Arc::new(Instance {
            id: def.name.clone(),
            class: def.name.clone(),
            individual: true,
            tags: def.tags.clone(),
        }))
    }

    /// Create an entity of `class` with empty relationship fields
    pub fn instantiate(self: &Arc<Self>, class: &str) -> Result<SemanticEntity> {
        let id = self.next_instance_id(class);
        self.instantiate_with_id(class, id)
    }

    pub fn instantiate_with_id(
        self: &Arc<Self>,
        class: &str,
        id: impl Into<String>,
    ) -> Result<SemanticEntity> {
        let fields = self.relationships_of(class)?;
        let instance = self.instance_with_id(class, id)?;
        let resolver: SharedResolver<Arc<Instance>> = Arc::clone(self) as _;

        let relationships = fields
            .into_iter()
            .map(|(field, rules)| (field, Relationship::new(rules, Arc::clone(&resolver))))
            .collect();

        debug!(id = %instance.id(), class = %class, "Entity instantiated");
        Ok(SemanticEntity {
            instance,
            relationships,
        })
    }
}

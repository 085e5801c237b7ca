// SPDX-License-Identifier: PMPL-1.0-or-later
//! Class membership.
//!
//! A value belongs to any number of classes at once. Membership is an
//! explicit capability: each value exposes a [`TagSet`] through
//! [`Classified`], and a [`ClassResolver`] decides whether a value is an
//! instance of a named class. Two resolvers are provided:
//!
//! - [`TagResolver`] reads the value's tags literally.
//! - [`ClassRegistry`] expands the value's tags through the registered class
//!   hierarchy, so a value tagged `Class123` is also a `Class1` when
//!   `Class123` declares `Class1` as a parent.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::config::SemanticConfig;
use crate::error::{Result, SemanticError};
use crate::statement::RuleSet;

/// Name of a class or individual in the vocabulary
pub type ClassName = String;

/// Set of class tags carried by a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<ClassName>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, returning whether it was new
    pub fn insert(&mut self, tag: impl Into<ClassName>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn extend_from(&mut self, other: &TagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<ClassName>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tag}")?;
        }
        write!(f, "}}")
    }
}

/// A value that can report the class tags it carries
pub trait Classified {
    fn class_tags(&self) -> &TagSet;
}

impl Classified for TagSet {
    fn class_tags(&self) -> &TagSet {
        self
    }
}

impl<T: Classified + ?Sized> Classified for &T {
    fn class_tags(&self) -> &TagSet {
        (**self).class_tags()
    }
}

impl<T: Classified + ?Sized> Classified for Box<T> {
    fn class_tags(&self) -> &TagSet {
        (**self).class_tags()
    }
}

impl<T: Classified + ?Sized> Classified for Arc<T> {
    fn class_tags(&self) -> &TagSet {
        (**self).class_tags()
    }
}

/// Strategy for deciding class membership of a value
pub trait ClassResolver<V: ?Sized> {
    /// Whether `value` is an instance of `class`
    fn is_instance(&self, value: &V, class: &str) -> bool;
}

/// Resolver that matches a value's tags literally
#[derive(Debug, Clone, Copy, Default)]
pub struct TagResolver;

impl<V: Classified + ?Sized> ClassResolver<V> for TagResolver {
    fn is_instance(&self, value: &V, class: &str) -> bool {
        value.class_tags().contains(class)
    }
}

/// A class registered in the vocabulary
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Class name
    pub name: ClassName,
    /// Direct parent classes
    pub parents: Vec<ClassName>,
    /// The class itself plus every transitive parent
    pub ancestors: TagSet,
    /// Relationship fields declared directly on this class
    pub relationships: BTreeMap<String, Arc<RuleSet>>,
}

/// A named individual registered in the vocabulary
#[derive(Debug, Clone)]
pub struct IndividualDef {
    /// Individual name
    pub name: ClassName,
    /// Classes the individual belongs to
    pub classes: Vec<ClassName>,
    /// The individual's own name plus the ancestors of all its classes
    pub tags: TagSet,
}

/// Immutable registry of classes and individuals.
///
/// Built once through [`ClassRegistryBuilder`] and then shared (usually as
/// `Arc<ClassRegistry>`) by every relationship that resolves class names
/// against it.
#[derive(Debug)]
pub struct ClassRegistry {
    classes: HashMap<ClassName, ClassDef>,
    individuals: HashMap<ClassName, IndividualDef>,
    config: SemanticConfig,
    next_instance: AtomicU64,
}

impl ClassRegistry {
    pub fn builder() -> ClassRegistryBuilder {
        ClassRegistryBuilder::new()
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    pub fn individual_def(&self, name: &str) -> Option<&IndividualDef> {
        self.individuals.get(name)
    }

    /// Whether `name` is a registered class or individual
    pub fn knows(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.individuals.contains_key(name)
    }

    pub fn is_individual(&self, name: &str) -> bool {
        self.individuals.contains_key(name)
    }

    /// Names of all registered classes, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of all registered individuals, sorted
    pub fn individual_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.individuals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Full tag closure for a class or individual name
    pub fn tags_of(&self, name: &str) -> Option<&TagSet> {
        self.classes
            .get(name)
            .map(|c| &c.ancestors)
            .or_else(|| self.individuals.get(name).map(|i| &i.tags))
    }

    /// Whether `class` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|c| c.ancestors.contains(ancestor))
    }

    /// Relationship fields of a class, including inherited ones.
    ///
    /// A field redeclared on a subclass replaces the inherited rule set.
    pub fn relationships_of(&self, class: &str) -> Result<BTreeMap<String, Arc<RuleSet>>> {
        if self.individuals.contains_key(class) {
            return Err(SemanticError::IndividualHasNoRelationships(class.to_string()));
        }
        let def = self
            .classes
            .get(class)
            .ok_or_else(|| SemanticError::UnknownClass(class.to_string()))?;

        let mut fields = BTreeMap::new();
        self.collect_relationships(def, &mut fields);
        Ok(fields)
    }

    fn collect_relationships(&self, def: &ClassDef, fields: &mut BTreeMap<String, Arc<RuleSet>>) {
        for (field, rules) in &def.relationships {
            fields.entry(field.clone()).or_insert_with(|| Arc::clone(rules));
        }
        for parent in &def.parents {
            if let Some(parent_def) = self.classes.get(parent) {
                self.collect_relationships(parent_def, fields);
            }
        }
    }

    pub(crate) fn next_instance_id(&self, class: &str) -> String {
        let n = self.next_instance.fetch_add(1, Ordering::Relaxed);
        format!("urn:ngsi-ld:{class}:{n}")
    }
}

impl<V: Classified + ?Sized> ClassResolver<V> for ClassRegistry {
    fn is_instance(&self, value: &V, class: &str) -> bool {
        value.class_tags().iter().any(|tag| {
            tag == class
                || self
                    .tags_of(tag)
                    .is_some_and(|closure| closure.contains(class))
        })
    }
}

/// Builder for [`ClassRegistry`].
///
/// Parents must be registered before their children, which keeps the
/// hierarchy acyclic.
#[derive(Debug, Default)]
pub struct ClassRegistryBuilder {
    classes: HashMap<ClassName, ClassDef>,
    individuals: HashMap<ClassName, IndividualDef>,
    config: SemanticConfig,
}

impl ClassRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SemanticConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    fn knows(&self, name: &str) -> bool {
        self.classes.contains_key(name) || self.individuals.contains_key(name)
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if self.knows(name) {
            return Err(SemanticError::DuplicateClass(name.to_string()));
        }
        Ok(())
    }

    fn closure_of(&self, parents: &[ClassName]) -> Result<TagSet> {
        let mut tags = TagSet::new();
        for parent in parents {
            let def = self
                .classes
                .get(parent)
                .ok_or_else(|| SemanticError::UnknownClass(parent.clone()))?;
            tags.extend_from(&def.ancestors);
        }
        Ok(tags)
    }

    /// Register a class with its direct parents
    pub fn add_class<S: AsRef<str>>(&mut self, name: &str, parents: &[S]) -> Result<&mut Self> {
        self.ensure_free(name)?;
        let parents: Vec<ClassName> = parents.iter().map(|p| p.as_ref().to_string()).collect();
        let mut ancestors = self.closure_of(&parents)?;
        ancestors.insert(name);

        debug!(class = %name, parents = parents.len(), "Class registered");
        self.classes.insert(
            name.to_string(),
            ClassDef {
                name: name.to_string(),
                parents,
                ancestors,
                relationships: BTreeMap::new(),
            },
        );
        Ok(self)
    }

    /// Register a named individual belonging to the given classes
    pub fn add_individual<S: AsRef<str>>(&mut self, name: &str, classes: &[S]) -> Result<&mut Self> {
        self.ensure_free(name)?;
        let classes: Vec<ClassName> = classes.iter().map(|c| c.as_ref().to_string()).collect();
        let mut tags = self.closure_of(&classes)?;
        tags.insert(name);

        debug!(individual = %name, classes = classes.len(), "Individual registered");
        self.individuals.insert(
            name.to_string(),
            IndividualDef {
                name: name.to_string(),
                classes,
                tags,
            },
        );
        Ok(self)
    }

    /// Attach a relationship field and its restriction to a class.
    ///
    /// Every class name the rules mention must already be registered.
    pub fn add_relationship(&mut self, class: &str, field: &str, rules: RuleSet) -> Result<&mut Self> {
        for name in rules.class_names() {
            if !self.knows(name) {
                return Err(SemanticError::UnknownClass(name.to_string()));
            }
        }
        if self.individuals.contains_key(class) {
            return Err(SemanticError::IndividualHasNoRelationships(class.to_string()));
        }
        let def = self
            .classes
            .get_mut(class)
            .ok_or_else(|| SemanticError::UnknownClass(class.to_string()))?;

        debug!(class = %class, field = %field, rule = %rules, "Relationship declared");
        def.relationships.insert(field.to_string(), Arc::new(rules));
        Ok(self)
    }

    pub fn build(self) -> ClassRegistry {
        ClassRegistry {
            classes: self.classes,
            individuals: self.individuals,
            config: self.config,
            next_instance: AtomicU64::new(1),
        }
    }
}

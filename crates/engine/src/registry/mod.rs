//! Class and enumeration registrations.
//!
//! Registrations are collected by a [`RegistryBuilder`] during bootstrap and frozen into a
//! [`Registry`]: an arena of entries indexed by [`ClassId`], cheap to clone and read
//! without locking. Hierarchy navigation and discriminator resolution live in
//! [`hierarchy`].

mod builder;
pub mod hierarchy;

pub use builder::RegistryBuilder;

use crate::error::EngineError;
use crate::model::{ConstructorModel, ResolvedModel};
use forma_domain::config::EngineConfig;
use forma_domain::instance::{Arguments, Value};
use forma_tree::{Node, Tree};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Index of a class entry inside one [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role of an entry in its hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassKind {
    /// Unnamed default entry of a hierarchy.
    Root,
    /// Selected by the given discriminator.
    Variant(Arc<str>),
    /// Unnamed, never constructed, transparent for discriminator lookup.
    Intermediate,
    /// Plain record outside any hierarchy.
    Record,
}

/// Builds a class value from its resolved arguments.
pub type Factory = Arc<dyn Fn(&mut Arguments) -> Result<Value, EngineError> + Send + Sync>;

/// Rewrites a template's configuration arguments into the configuration it stands for.
pub type Template = Arc<dyn Fn(&Tree) -> Result<Tree, EngineError> + Send + Sync>;

/// Declaration of one class: name, constructor model and factory or template.
#[derive(Clone)]
pub struct ClassSpec {
    name: Arc<str>,
    model: ConstructorModel,
    factory: Option<Factory>,
    template: Option<Template>,
}

impl ClassSpec {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), model: ConstructorModel::new().inherit(), factory: None, template: None }
    }

    /// Replaces the default model, which inherits everything and declares nothing.
    #[must_use]
    pub fn model(mut self, model: ConstructorModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the factory; its output is stored type-erased inside the built object.
    #[must_use]
    pub fn constructor<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut Arguments) -> Result<T, EngineError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move |args| factory(args).map(|value| Arc::new(value) as Value)));
        self.template = None;
        self
    }

    /// Makes the class a template: its checked arguments, still configuration data and
    /// without the discriminator, are rewritten into the configuration of the type
    /// that was requested, which is then checked and built in its place.
    ///
    /// ```rust
    /// use forma_engine::registry::ClassSpec;
    /// use forma_tree::Tree;
    ///
    /// let spec = ClassSpec::new("Square").template(|args: &Tree| {
    ///     let side = args.get("side").cloned().unwrap_or_default();
    ///     Ok([("type", "rect".into()), ("width", side.clone()), ("height", side)].into_iter().collect())
    /// });
    /// assert_eq!(spec.name(), "Square");
    /// ```
    #[must_use]
    pub fn template<F>(mut self, template: F) -> Self
    where
        F: Fn(&Tree) -> Result<Tree, EngineError> + Send + Sync + 'static,
    {
        self.template = Some(Arc::new(template));
        self.factory = None;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassSpec")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("constructible", &self.factory.is_some())
            .field("template", &self.template.is_some())
            .finish()
    }
}

/// Declaration of an enumeration. Members default to the values `1..=n`.
#[derive(Debug, Clone)]
pub struct EnumSpec {
    name: Arc<str>,
    members: IndexMap<Arc<str>, Node>,
}

impl EnumSpec {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), members: IndexMap::new() }
    }

    #[must_use]
    pub fn member(self, name: impl Into<Arc<str>>) -> Self {
        let value = i64::try_from(self.members.len() + 1).map_or(Node::Null, Node::Int);
        self.member_with_value(name, value)
    }

    #[must_use]
    pub fn member_with_value(mut self, name: impl Into<Arc<str>>, value: impl Into<Node>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }
}

/// A registered enumeration; members are selected by name.
#[derive(Debug, Clone)]
pub struct Enumeration {
    name: Arc<str>,
    members: IndexMap<Arc<str>, Node>,
}

impl Enumeration {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(|m| &**m)
    }

    /// Canonical name and value of a member.
    #[must_use]
    pub fn get(&self, member: &str) -> Option<(&Arc<str>, &Node)> {
        self.members.get_key_value(member)
    }
}

/// One frozen class registration.
pub struct ClassEntry {
    id: ClassId,
    name: Arc<str>,
    kind: ClassKind,
    parent: Option<ClassId>,
    children: Vec<ClassId>,
    model: Arc<ResolvedModel>,
    factory: Option<Factory>,
    template: Option<Template>,
}

impl ClassEntry {
    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &ClassKind {
        &self.kind
    }

    #[must_use]
    pub fn discriminator(&self) -> Option<&str> {
        match &self.kind {
            ClassKind::Variant(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[ClassId] {
        &self.children
    }

    #[must_use]
    pub fn model(&self) -> &ResolvedModel {
        &self.model
    }

    /// Whether the entry can be selected: it has a factory or is a template.
    #[must_use]
    pub const fn is_concrete(&self) -> bool {
        self.factory.is_some() || self.template.is_some()
    }

    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.template.is_some()
    }

    #[must_use]
    pub const fn is_hierarchy(&self) -> bool {
        !matches!(self.kind, ClassKind::Record)
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("template", &self.template.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Arena {
    entries: Vec<ClassEntry>,
    by_name: FxHashMap<Arc<str>, ClassId>,
    enumerations: FxHashMap<Arc<str>, Arc<Enumeration>>,
}

impl Arena {
    fn get(&self, id: ClassId) -> Option<&ClassEntry> {
        self.entries.get(id.index())
    }

    /// Discriminators selectable directly below `owner`, looking through intermediates.
    fn level(&self, owner: ClassId) -> Vec<(&str, ClassId)> {
        let mut found = Vec::new();
        self.collect_level(owner, &mut found);
        found
    }

    fn collect_level<'a>(&'a self, owner: ClassId, found: &mut Vec<(&'a str, ClassId)>) {
        let Some(entry) = self.get(owner) else { return };
        for &child in &entry.children {
            let Some(child_entry) = self.get(child) else { continue };
            match &child_entry.kind {
                ClassKind::Variant(d) => found.push((d, child)),
                ClassKind::Intermediate => self.collect_level(child, found),
                ClassKind::Root | ClassKind::Record => {},
            }
        }
    }
}

struct RegistryInner {
    arena: Arena,
    config: EngineConfig,
}

/// Frozen registrations shared by every orchestrator built on top of them.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn class(&self, name: &str) -> Option<ClassId> {
        self.inner.arena.by_name.get(name).copied()
    }

    #[must_use]
    pub fn entry(&self, id: ClassId) -> Option<&ClassEntry> {
        self.inner.arena.get(id)
    }

    #[must_use]
    pub fn entry_by_name(&self, name: &str) -> Option<&ClassEntry> {
        self.class(name).and_then(|id| self.entry(id))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.inner.arena.entries.iter()
    }

    #[must_use]
    pub fn enumeration(&self, name: &str) -> Option<&Arc<Enumeration>> {
        self.inner.arena.enumerations.get(name)
    }

    /// Class name of `id`, or an empty string for ids from another registry.
    #[must_use]
    pub fn name(&self, id: ClassId) -> &str {
        self.entry(id).map_or("", ClassEntry::name)
    }

    /// Calls the factory of a concrete class.
    ///
    /// # Errors
    /// * [`EngineError::Configuration`] if `id` has no factory.
    /// * Whatever the factory returns.
    pub fn construct(&self, id: ClassId, args: &mut Arguments) -> Result<Value, EngineError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| EngineError::configuration(format!("unknown class id {id}")))?;
        let factory = entry.factory.as_ref().ok_or_else(|| {
            EngineError::configuration(format!("`{}` is not constructible", entry.name))
        })?;
        debug!(class = %entry.name, "Constructing");
        factory(args)
    }

    /// Calls the template of `id` on its configuration arguments.
    ///
    /// # Errors
    /// * [`EngineError::Configuration`] if `id` is not a template.
    /// * Whatever the template returns.
    pub fn expand_template(&self, id: ClassId, args: &Tree) -> Result<Tree, EngineError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| EngineError::configuration(format!("unknown class id {id}")))?;
        let template = entry
            .template
            .as_ref()
            .ok_or_else(|| EngineError::configuration(format!("`{}` is not a template", entry.name)))?;
        debug!(class = %entry.name, "Expanding template");
        template(args)
    }

    /// The root of the hierarchy `id` belongs to.
    #[must_use]
    pub fn root_of(&self, mut id: ClassId) -> ClassId {
        while let Some(parent) = self.get_direct_parent(id) {
            id = parent;
        }
        id
    }

    fn arena(&self) -> &Arena {
        &self.inner.arena
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("classes", &self.inner.arena.entries.len())
            .field("enumerations", &self.inner.arena.enumerations.len())
            .finish()
    }
}

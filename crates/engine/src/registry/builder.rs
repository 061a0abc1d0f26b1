use super::{Arena, ClassEntry, ClassId, ClassKind, ClassSpec, EnumSpec, Enumeration, Registry, RegistryInner};
use crate::error::{EngineError, EngineErrorExt};
use forma_domain::config::EngineConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Collects registrations during bootstrap.
///
/// Every method takes `&self`; concurrent registrations are serialized by one lock.
/// Misuse is reported immediately as [`EngineError::Configuration`], and constructor
/// models are validated before the entry is added.
///
/// ```rust
/// use forma_domain::descriptor::TypeDescriptor;
/// use forma_engine::model::ConstructorModel;
/// use forma_engine::registry::{ClassSpec, RegistryBuilder};
///
/// let builder = RegistryBuilder::new();
/// builder.root(ClassSpec::new("Shape")).unwrap();
/// builder
///     .register(
///         "Shape",
///         "circle",
///         ClassSpec::new("Circle")
///             .model(ConstructorModel::new().param("radius", TypeDescriptor::float()))
///             .constructor(|args| args.take::<f64>("radius").map_err(Into::into)),
///     )
///     .unwrap();
/// let registry = builder.build();
/// assert!(registry.class("Circle").is_some());
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    arena: Mutex<Arena>,
    config: EngineConfig,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self { arena: Mutex::default(), config }
    }

    /// Starts a new hierarchy. The root is its unnamed default entry and may be abstract.
    ///
    /// # Errors
    /// Returns [`EngineError::Configuration`] for a duplicate name or a template.
    /// An invalid model is [`EngineError::TypeCheck`] carrying its diagnostic.
    pub fn root(&self, spec: ClassSpec) -> Result<ClassId, EngineError> {
        let mut arena = self.arena.lock();
        if spec.template.is_some() {
            return Err(EngineError::configuration(format!(
                "template `{}` must be registered below the class it stands in for",
                spec.name
            )));
        }
        self.insert(&mut arena, spec, ClassKind::Root, None)
    }

    /// Attaches a constructible subclass selected by `discriminator`.
    ///
    /// The discriminator must be unique within the level of the nearest named ancestor;
    /// deeper levels may reuse it.
    ///
    /// # Errors
    /// Returns [`EngineError::Configuration`] when the parent is unknown, a record or a
    /// template, the discriminator is empty or taken, or the class has neither a
    /// constructor nor a template.
    /// An invalid model is [`EngineError::TypeCheck`] carrying its diagnostic.
    pub fn register(
        &self,
        parent: &str,
        discriminator: &str,
        spec: ClassSpec,
    ) -> Result<ClassId, EngineError> {
        let mut arena = self.arena.lock();
        if discriminator.is_empty() {
            return Err(EngineError::configuration(format!(
                "`{}` needs a non-empty discriminator",
                spec.name
            )));
        }
        if spec.factory.is_none() && spec.template.is_none() {
            return Err(EngineError::configuration(format!(
                "`{}` is registered as `{discriminator}` but has no constructor or template",
                spec.name
            )));
        }
        let parent_id = parent_of(&arena, parent)?;
        let owner = level_owner(&arena, parent_id);
        if let Some((_, taken)) = arena.level(owner).into_iter().find(|(d, _)| *d == discriminator) {
            return Err(EngineError::configuration(format!(
                "discriminator `{discriminator}` under `{}` is already used by `{}`",
                arena.get(owner).map_or("", ClassEntry::name),
                arena.get(taken).map_or("", ClassEntry::name),
            )));
        }
        self.insert(&mut arena, spec, ClassKind::Variant(discriminator.into()), Some(parent_id))
    }

    /// Attaches an unnamed grouping class that contributes parameters but is never built.
    ///
    /// # Errors
    /// Returns [`EngineError::Configuration`] when the parent is unknown, a record or a
    /// template, or the class has a constructor or template.
    /// An invalid model is [`EngineError::TypeCheck`] carrying its diagnostic.
    pub fn intermediate(&self, parent: &str, spec: ClassSpec) -> Result<ClassId, EngineError> {
        let mut arena = self.arena.lock();
        if spec.factory.is_some() || spec.template.is_some() {
            return Err(EngineError::configuration(format!(
                "unnamed `{}` cannot be constructed; register it with a discriminator",
                spec.name
            )));
        }
        let parent_id = parent_of(&arena, parent)?;
        self.insert(&mut arena, spec, ClassKind::Intermediate, Some(parent_id))
    }

    /// Registers a plain record: constructed from its parameters, no discriminator.
    ///
    /// # Errors
    /// Returns [`EngineError::Configuration`] for a duplicate name or a missing constructor.
    /// Templates need a hierarchy and are rejected.
    /// An invalid model is [`EngineError::TypeCheck`] carrying its diagnostic.
    pub fn record(&self, spec: ClassSpec) -> Result<ClassId, EngineError> {
        let mut arena = self.arena.lock();
        if spec.factory.is_none() {
            return Err(EngineError::configuration(format!("record `{}` has no constructor", spec.name)));
        }
        self.insert(&mut arena, spec, ClassKind::Record, None)
    }

    /// # Errors
    /// Returns [`EngineError::Configuration`] for a duplicate name or an empty member list.
    pub fn enumeration(&self, spec: EnumSpec) -> Result<(), EngineError> {
        let mut arena = self.arena.lock();
        if spec.members.is_empty() {
            return Err(EngineError::configuration(format!("enumeration `{}` has no members", spec.name)));
        }
        if arena.enumerations.contains_key(&spec.name) {
            return Err(EngineError::configuration(format!(
                "enumeration `{}` is already registered",
                spec.name
            )));
        }
        debug!(enumeration = %spec.name, members = spec.members.len(), "Registered enumeration");
        let enumeration = Enumeration { name: Arc::clone(&spec.name), members: spec.members };
        arena.enumerations.insert(spec.name, Arc::new(enumeration));
        Ok(())
    }

    /// Freezes the registrations.
    #[must_use]
    pub fn build(self) -> Registry {
        let arena = self.arena.into_inner();
        info!(
            classes = arena.entries.len(),
            enumerations = arena.enumerations.len(),
            "Registry built"
        );
        Registry { inner: Arc::new(RegistryInner { arena, config: self.config }) }
    }

    fn insert(
        &self,
        arena: &mut Arena,
        spec: ClassSpec,
        kind: ClassKind,
        parent: Option<ClassId>,
    ) -> Result<ClassId, EngineError> {
        if arena.by_name.contains_key(&spec.name) {
            return Err(EngineError::configuration(format!("class `{}` is already registered", spec.name)));
        }
        let parent_model = parent.and_then(|p| arena.get(p)).map(|p| Arc::clone(&p.model));
        let model = spec
            .model
            .resolve(&spec.name, parent_model.as_deref(), self.config.limits.max_dependency_depth)
            .context(format!("while registering `{}`", spec.name))?;

        let id = ClassId(
            u32::try_from(arena.entries.len()).map_err(|_| EngineError::from("registry is full"))?,
        );
        debug!(class = %spec.name, kind = ?kind, %id, "Registered class");
        arena.entries.push(ClassEntry {
            id,
            name: Arc::clone(&spec.name),
            kind,
            parent,
            children: Vec::new(),
            model: Arc::new(model),
            factory: spec.factory,
            template: spec.template,
        });
        arena.by_name.insert(spec.name, id);
        if let Some(entry) = parent.and_then(|p| arena.entries.get_mut(p.index())) {
            entry.children.push(id);
        }
        Ok(id)
    }
}

fn parent_of(arena: &Arena, name: &str) -> Result<ClassId, EngineError> {
    let id = arena
        .by_name
        .get(name)
        .copied()
        .ok_or_else(|| EngineError::configuration(format!("unknown parent class `{name}`")))?;
    match arena.get(id).map(|e| &e.kind) {
        Some(ClassKind::Record) => {
            Err(EngineError::configuration(format!("record `{name}` cannot have subclasses")))
        },
        _ if arena.get(id).is_some_and(ClassEntry::is_template) => {
            Err(EngineError::configuration(format!("template `{name}` cannot have subclasses")))
        },
        _ => Ok(id),
    }
}

/// Nearest entry at or above `id` that is not an intermediate.
fn level_owner(arena: &Arena, mut id: ClassId) -> ClassId {
    while let Some(entry) = arena.get(id) {
        match (&entry.kind, entry.parent) {
            (ClassKind::Intermediate, Some(parent)) => id = parent,
            _ => break,
        }
    }
    id
}

use crate::alter::{self, Alter};
use crate::diagnostic::{Diagnostic, too_deep, unrepresented};
use crate::error::EngineError;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::unit::{self, HierarchyUnit, Unit};
use forma_domain::config::EngineConfig;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::{FromInstance, Instance};
use forma_tree::{Node, Tree};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Entry point for checking and building configuration.
///
/// Dispatch is first match wins over the ordered unit list, then the hierarchy
/// resolver for registered class hierarchies. Cloning is cheap and clones share
/// the same frozen registry, so one orchestrator can serve many threads.
///
/// ```rust
/// use forma_domain::descriptor::TypeDescriptor;
/// use forma_engine::orchestrator::Orchestrator;
/// use forma_engine::registry::RegistryBuilder;
/// use forma_tree::Node;
///
/// let orchestrator = Orchestrator::new(RegistryBuilder::new().build());
/// let target = TypeDescriptor::tuple([TypeDescriptor::int(), TypeDescriptor::str()]);
///
/// assert!(orchestrator.type_check(&target, &Node::from(vec![Node::from(1), Node::from("a")])).is_none());
/// assert!(orchestrator.type_check(&target, &Node::from(vec![1, 2, 3])).is_some());
/// ```
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    registry: Registry,
    units: Vec<Arc<dyn Unit>>,
    hierarchy: HierarchyUnit,
    alters: Vec<Arc<dyn Alter>>,
}

impl Orchestrator {
    /// An orchestrator with the default units and no alters.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::builder(registry).build()
    }

    #[must_use]
    pub fn builder(registry: Registry) -> OrchestratorBuilder {
        OrchestratorBuilder { registry, units: unit::defaults(), alters: Vec::new() }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.inner.registry.config()
    }

    /// Whether any unit, or the hierarchy resolver, handles `target`.
    #[must_use]
    pub fn contains(&self, target: &TypeDescriptor) -> bool {
        self.get(target).is_some()
    }

    /// The unit that owns `target`, without checking anything.
    #[must_use]
    pub fn get(&self, target: &TypeDescriptor) -> Option<&dyn Unit> {
        if let Some(unit) = self.inner.units.iter().find(|unit| unit.contains(target, self)) {
            return Some(&**unit);
        }
        let hierarchy = &self.inner.hierarchy;
        hierarchy.contains(target, self).then_some(hierarchy as &dyn Unit)
    }

    /// Validates `node` against `target`. `None` means it can be built.
    #[must_use]
    pub fn type_check(&self, target: &TypeDescriptor, node: &Node) -> Option<Diagnostic> {
        let diagnostic = self.check_in(target, node, Scope::root());
        if let Some(d) = &diagnostic {
            debug!(ty = %target, code = %d.code(), "Type check failed");
        }
        diagnostic
    }

    /// Checks, then builds. Nothing is constructed when the check fails.
    ///
    /// # Errors
    /// * [`EngineError::TypeCheck`] with the diagnostic when `node` does not conform.
    /// * Whatever a factory returns.
    pub fn from_obj(&self, target: &TypeDescriptor, node: &Node) -> Result<Instance, EngineError> {
        if let Some(diagnostic) = self.type_check(target, node) {
            return Err(diagnostic.into());
        }
        self.build_in(target, node, Scope::root())
    }

    /// [`Orchestrator::from_obj`] followed by a [`FromInstance`] conversion.
    ///
    /// # Errors
    /// As [`Orchestrator::from_obj`], plus [`EngineError::Instance`] if the conversion fails.
    pub fn build<T: FromInstance>(&self, target: &TypeDescriptor, node: &Node) -> Result<T, EngineError> {
        Ok(T::from_instance(self.from_obj(target, node)?)?)
    }

    /// Dispatches a nested check. Units call this for every sub-value.
    #[must_use]
    pub fn check_in(&self, target: &TypeDescriptor, node: &Node, scope: Scope<'_>) -> Option<Diagnostic> {
        let limit = self.config().limits.max_depth;
        if scope.depth() > limit {
            return Some(too_deep(target, limit).with_node(node));
        }
        let node = if scope.parameter().is_some() {
            match self.apply_alters(node) {
                Ok(node) => node,
                Err(diagnostic) => return Some(diagnostic),
            }
        } else {
            Cow::Borrowed(node)
        };
        let Some(unit) = self.get(target) else {
            return Some(unrepresented(target).with_node(&node));
        };
        trace!(unit = unit.name(), ty = %target, depth = scope.depth(), "Checking");
        unit.type_check(target, &node, self, scope)
    }

    /// Dispatches a nested build. Units call this for every sub-value.
    ///
    /// # Errors
    /// Returns the first failure below `node`.
    pub fn build_in(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let limit = self.config().limits.max_depth;
        if scope.depth() > limit {
            return Err(too_deep(target, limit).with_node(node).into());
        }
        let node = if scope.parameter().is_some() { self.apply_alters(node)? } else { Cow::Borrowed(node) };
        let unit = self.get(target).ok_or_else(|| unrepresented(target).with_node(&node))?;
        trace!(unit = unit.name(), ty = %target, depth = scope.depth(), "Building");
        unit.from_obj(target, &node, self, scope)
    }

    /// Replaces an alter marker mapping with the value it points at.
    ///
    /// # Errors
    /// Returns a [`DiagnosticCode::Alter`](crate::diagnostic::DiagnosticCode::Alter)
    /// diagnostic when the marker cannot be resolved.
    pub fn apply_alters<'n>(&self, node: &'n Node) -> Result<Cow<'n, Node>, Diagnostic> {
        alter::substitute(&self.inner.alters, &self.config().schema.discriminator_key, node)
    }

    /// Rewrites every alter marker in `tree` with its sourced value.
    ///
    /// # Errors
    /// Returns the first marker that cannot be resolved.
    pub fn alter(&self, tree: &Tree) -> Result<Tree, Diagnostic> {
        alter::rewrite(&self.inner.alters, &self.config().schema.discriminator_key, tree)
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.inner.registry)
            .field("units", &self.inner.units)
            .field("alters", &self.inner.alters)
            .finish()
    }
}

/// Assembles an [`Orchestrator`] with a custom unit list or alters.
#[derive(Debug)]
pub struct OrchestratorBuilder {
    registry: Registry,
    units: Vec<Arc<dyn Unit>>,
    alters: Vec<Arc<dyn Alter>>,
}

impl OrchestratorBuilder {
    /// Replaces the unit list. Order is priority.
    #[must_use]
    pub fn units(mut self, units: Vec<Arc<dyn Unit>>) -> Self {
        self.units = units;
        self
    }

    /// Appends a unit after the existing ones.
    #[must_use]
    pub fn unit(mut self, unit: impl Unit + 'static) -> Self {
        self.units.push(Arc::new(unit));
        self
    }

    /// Inserts a unit ahead of the existing ones.
    #[must_use]
    pub fn prepend_unit(mut self, unit: impl Unit + 'static) -> Self {
        self.units.insert(0, Arc::new(unit));
        self
    }

    #[must_use]
    pub fn alter(mut self, alter: impl Alter + 'static) -> Self {
        self.alters.push(Arc::new(alter));
        self
    }

    #[must_use]
    pub fn build(self) -> Orchestrator {
        debug!(units = self.units.len(), alters = self.alters.len(), "Orchestrator built");
        Orchestrator {
            inner: Arc::new(OrchestratorInner {
                registry: self.registry,
                units: self.units,
                hierarchy: HierarchyUnit,
                alters: self.alters,
            }),
        }
    }
}

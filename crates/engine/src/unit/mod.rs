//! Pluggable handlers for subsets of [`TypeDescriptor`]s.
//!
//! The [`Orchestrator`] asks its units in order; the first whose
//! [`Unit::contains`] accepts a descriptor checks and builds every value of it.

mod dependent;
mod enumeration;
mod hierarchy;
mod record;
mod scalar;
mod shape;
mod template;

pub use dependent::DependentUnit;
pub use enumeration::EnumUnit;
pub use hierarchy::HierarchyUnit;
pub use record::RecordUnit;
pub use scalar::ScalarUnit;
pub use shape::ShapeUnit;
pub use template::TemplateUnit;

use crate::diagnostic::Diagnostic;
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::scope::Scope;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_tree::Node;
use std::fmt;
use std::sync::Arc;

/// A checking and building strategy.
///
/// Units receive the orchestrator so nested values go back through dispatch,
/// and a [`Scope`] carrying the recursion depth and the enclosing parameter.
pub trait Unit: fmt::Debug + Send + Sync {
    /// Short name used in traces.
    fn name(&self) -> &'static str;

    fn contains(&self, target: &TypeDescriptor, orchestrator: &Orchestrator) -> bool;

    /// Validates without building. `None` means `node` can become a `target`.
    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic>;

    /// Builds the value. Callers check first; units may assume a valid `node`.
    ///
    /// # Errors
    /// Returns an error when `node` cannot be built or a factory fails.
    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError>;

    /// Checks, then builds.
    ///
    /// # Errors
    /// Returns [`EngineError::TypeCheck`] with the diagnostic if the check fails.
    fn get(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        if let Some(diagnostic) = self.type_check(target, node, orchestrator, scope) {
            return Err(diagnostic.into());
        }
        self.from_obj(target, node, orchestrator, scope)
    }
}

/// The default priority list: scalars, shapes, enumerations, records, dependents, templates.
#[must_use]
pub fn defaults() -> Vec<Arc<dyn Unit>> {
    vec![
        Arc::new(ScalarUnit),
        Arc::new(ShapeUnit),
        Arc::new(EnumUnit),
        Arc::new(RecordUnit),
        Arc::new(DependentUnit),
        Arc::new(TemplateUnit),
    ]
}

use super::{TemplateUnit, Unit};
use crate::constructor;
use crate::diagnostic::{Diagnostic, unrepresented};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::registry::{ClassEntry, ClassId};
use crate::scope::Scope;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_tree::Node;
use indexmap::IndexMap;

/// Polymorphic classes: the discriminator picks a concrete class at or below the target.
///
/// The orchestrator consults this unit after its ordered list. Selected templates are
/// expanded by [`TemplateUnit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyUnit;

impl HierarchyUnit {
    fn query(target: &TypeDescriptor, orchestrator: &Orchestrator) -> Option<ClassId> {
        let registry = orchestrator.registry();
        let id = registry.class(target.class_name()?)?;
        registry.entry(id).filter(|e| e.is_hierarchy()).map(|e| e.id())
    }

    fn resolve(
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
    ) -> Result<(ClassId, Vec<TypeDescriptor>), Diagnostic> {
        let (Some(query), TypeDescriptor::UserClass { args, .. }) = (Self::query(target, orchestrator), target)
        else {
            return Err(unrepresented(target));
        };
        let resolved = orchestrator.registry().resolve(query, node)?;
        Ok((resolved, args.clone()))
    }
}

impl Unit for HierarchyUnit {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn contains(&self, target: &TypeDescriptor, orchestrator: &Orchestrator) -> bool {
        Self::query(target, orchestrator).is_some()
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        match Self::resolve(target, node, orchestrator) {
            Ok((class, args)) if is_template(class, orchestrator) => {
                TemplateUnit::check_resolved(target, class, &args, node, orchestrator, scope)
            },
            Ok((class, args)) => constructor::check(orchestrator, class, &args, node, scope, &[]),
            Err(diagnostic) => Some(diagnostic),
        }
    }

    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let (class, args) = Self::resolve(target, node, orchestrator)?;
        if is_template(class, orchestrator) {
            return TemplateUnit::build_resolved(target, class, node, orchestrator, scope);
        }
        constructor::build(orchestrator, class, &args, node, scope, IndexMap::new())
    }
}

fn is_template(class: ClassId, orchestrator: &Orchestrator) -> bool {
    orchestrator.registry().entry(class).is_some_and(ClassEntry::is_template)
}

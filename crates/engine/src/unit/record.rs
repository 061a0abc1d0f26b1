use super::Unit;
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

/// Plain records: a class outside any hierarchy, built straight from its parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordUnit;

impl RecordUnit {
    fn record(target: &TypeDescriptor, orchestrator: &Orchestrator) -> Option<ClassId> {
        let registry = orchestrator.registry();
        let id = registry.class(target.class_name()?)?;
        registry.entry(id).filter(|e| !e.is_hierarchy()).map(ClassEntry::id)
    }
}

impl Unit for RecordUnit {
    fn name(&self) -> &'static str {
        "record"
    }

    fn contains(&self, target: &TypeDescriptor, orchestrator: &Orchestrator) -> bool {
        Self::record(target, orchestrator).is_some()
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        let (Some(id), TypeDescriptor::UserClass { args, .. }) = (Self::record(target, orchestrator), target)
        else {
            return Some(unrepresented(target));
        };
        constructor::check(orchestrator, id, args, node, scope, &[])
    }

    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let (Some(id), TypeDescriptor::UserClass { args, .. }) = (Self::record(target, orchestrator), target)
        else {
            return Err(unrepresented(target).into());
        };
        constructor::build(orchestrator, id, args, node, scope, IndexMap::new())
    }
}

use super::Unit;
use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, unrepresented};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::scope::Scope;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::{Instance, Member};
use forma_tree::Node;
use std::sync::Arc;

/// Registered enumerations, selected by member name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumUnit;

impl Unit for EnumUnit {
    fn name(&self) -> &'static str {
        "enumeration"
    }

    fn contains(&self, target: &TypeDescriptor, orchestrator: &Orchestrator) -> bool {
        match target {
            TypeDescriptor::Enumeration(name) => orchestrator.registry().enumeration(name).is_some(),
            _ => false,
        }
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        _: Scope<'_>,
    ) -> Option<Diagnostic> {
        let TypeDescriptor::Enumeration(name) = target else {
            return Some(unrepresented(target));
        };
        let Some(enumeration) = orchestrator.registry().enumeration(name) else {
            return Some(unrepresented(target));
        };
        let Node::Str(member) = node else {
            return Some(
                Diagnostic::new(
                    DiagnosticCode::AnumWrongType,
                    target.clone(),
                    format!("members of `{name}` are selected by name, received {}", node.kind()),
                )
                .with_node(node),
            );
        };
        if enumeration.get(member).is_some() {
            return None;
        }
        Some(
            Diagnostic::new(
                DiagnosticCode::AnumMember,
                target.clone(),
                format!("`{member}` is not a member of `{name}`"),
            )
            .with_node(node)
            .with_details(enumeration.members().map(|m| Detail::Available(m.to_owned()))),
        )
    }

    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let member = match (target, node) {
            (TypeDescriptor::Enumeration(name), Node::Str(member)) => orchestrator
                .registry()
                .enumeration(name)
                .and_then(|e| e.get(member))
                .map(|(member, value)| Member {
                    enumeration: Arc::clone(name),
                    name: Arc::clone(member),
                    value: value.clone(),
                }),
            _ => None,
        };
        member.map(Instance::Member).ok_or_else(|| {
            self.type_check(target, node, orchestrator, scope)
                .unwrap_or_else(|| unrepresented(target))
                .into()
        })
    }
}

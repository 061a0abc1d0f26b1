use super::Unit;
use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, Label, wrong_type};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::scope::Scope;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_tree::Node;

/// Structural descriptors: optionals, unions, tuples, sequences, mappings and literals.
///
/// Optional and union members are checked with the enclosing parameter still in
/// scope, so they may wrap dependent descriptors. Container elements are not.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeUnit;

impl Unit for ShapeUnit {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn contains(&self, target: &TypeDescriptor, _: &Orchestrator) -> bool {
        matches!(
            target,
            TypeDescriptor::Optional(_)
                | TypeDescriptor::Union(_)
                | TypeDescriptor::Tuple(_)
                | TypeDescriptor::Sequence(_)
                | TypeDescriptor::Mapping(_)
                | TypeDescriptor::Literal(_)
        )
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        match target {
            TypeDescriptor::Optional(_) if node.is_null() => None,
            TypeDescriptor::Optional(inner) => orchestrator.check_in(inner, node, scope.passthrough()),
            TypeDescriptor::Union(members) => check_union(target, members, node, orchestrator, scope),
            TypeDescriptor::Tuple(elements) => {
                let Node::Seq(items) = node else {
                    return Some(wrong_type(target, node));
                };
                if items.len() != elements.len() {
                    return Some(
                        Diagnostic::new(
                            DiagnosticCode::TupleArgLen,
                            target.clone(),
                            format!("expected {} elements, received {}", elements.len(), items.len()),
                        )
                        .with_node(node),
                    );
                }
                let failures = elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .filter_map(|(i, (ty, item))| {
                        orchestrator.check_in(ty, item, scope.nested()).map(|d| (Label::Index(i), d))
                    });
                aggregate(target, node, failures)
            },
            TypeDescriptor::Sequence(element) => {
                let Node::Seq(items) = node else {
                    return Some(wrong_type(target, node));
                };
                let failures = items.iter().enumerate().filter_map(|(i, item)| {
                    orchestrator.check_in(element, item, scope.nested()).map(|d| (Label::Index(i), d))
                });
                aggregate(target, node, failures)
            },
            TypeDescriptor::Mapping(value) => {
                let Node::Map(tree) = node else {
                    return Some(wrong_type(target, node));
                };
                let failures = tree.iter().filter_map(|(key, item)| {
                    orchestrator.check_in(value, item, scope.nested()).map(|d| (Label::Key(key.clone()), d))
                });
                aggregate(target, node, failures)
            },
            TypeDescriptor::Literal(allowed) => check_literal(target, allowed, node),
            _ => Some(wrong_type(target, node)),
        }
    }

    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        match (target, node) {
            (TypeDescriptor::Optional(_), Node::Null) => Ok(Instance::Null),
            (TypeDescriptor::Optional(inner), _) => orchestrator.build_in(inner, node, scope.passthrough()),
            (TypeDescriptor::Union(members), _) => {
                let member = members
                    .iter()
                    .find(|m| orchestrator.check_in(m, node, scope.passthrough()).is_none());
                match member {
                    Some(member) => orchestrator.build_in(member, node, scope.passthrough()),
                    None => Err(check_union(target, members, node, orchestrator, scope)
                        .unwrap_or_else(|| wrong_type(target, node))
                        .into()),
                }
            },
            (TypeDescriptor::Tuple(elements), Node::Seq(items)) => elements
                .iter()
                .zip(items)
                .map(|(ty, item)| orchestrator.build_in(ty, item, scope.nested()))
                .collect::<Result<_, _>>()
                .map(Instance::Tuple),
            (TypeDescriptor::Sequence(element), Node::Seq(items)) => items
                .iter()
                .map(|item| orchestrator.build_in(element, item, scope.nested()))
                .collect::<Result<_, _>>()
                .map(Instance::Seq),
            (TypeDescriptor::Mapping(value), Node::Map(tree)) => tree
                .iter()
                .map(|(key, item)| {
                    orchestrator.build_in(value, item, scope.nested()).map(|built| (key.clone(), built))
                })
                .collect::<Result<_, _>>()
                .map(Instance::Map),
            (TypeDescriptor::Literal(_), _) => Ok(Instance::from(node)),
            _ => Err(wrong_type(target, node).into()),
        }
    }
}

/// First member wins; without a winner every member's failure is reported.
fn check_union(
    target: &TypeDescriptor,
    members: &[TypeDescriptor],
    node: &Node,
    orchestrator: &Orchestrator,
    scope: Scope<'_>,
) -> Option<Diagnostic> {
    let mut failures = Vec::with_capacity(members.len());
    for member in members {
        match orchestrator.check_in(member, node, scope.passthrough()) {
            None => return None,
            Some(d) => failures.push((Label::Member(member.to_string()), d)),
        }
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::KeyValue,
            target.clone(),
            format!("no member of {target} accepts a {}", node.kind()),
        )
        .with_node(node)
        .with_children(failures),
    )
}

fn check_literal(target: &TypeDescriptor, allowed: &[Node], node: &Node) -> Option<Diagnostic> {
    if !node.is_scalar() {
        return Some(
            Diagnostic::new(
                DiagnosticCode::Hashable,
                target.clone(),
                format!("a {} cannot be compared against literal values", node.kind()),
            )
            .with_node(node),
        );
    }
    if allowed.contains(node) {
        return None;
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::WrongType,
            target.clone(),
            format!("{node} is not one of the allowed values"),
        )
        .with_node(node)
        .with_details(allowed.iter().map(|v| Detail::Available(v.to_string()))),
    )
}

fn aggregate(
    target: &TypeDescriptor,
    node: &Node,
    failures: impl Iterator<Item = (Label, Diagnostic)>,
) -> Option<Diagnostic> {
    let failures: Vec<_> = failures.collect();
    if failures.is_empty() {
        return None;
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::KeyValue,
            target.clone(),
            format!("{} element(s) of {target} failed", failures.len()),
        )
        .with_node(node)
        .with_children(failures),
    )
}

use super::Unit;
use crate::diagnostic::{Diagnostic, wrong_type};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::scope::Scope;
use forma_domain::descriptor::{ScalarKind, TypeDescriptor};
use forma_domain::instance::Instance;
use forma_tree::Node;

/// Primitive leaves. `int` never accepts booleans; `float` accepts integers when
/// `schema.widen_int_to_float` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarUnit;

impl Unit for ScalarUnit {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn contains(&self, target: &TypeDescriptor, _: &Orchestrator) -> bool {
        matches!(target, TypeDescriptor::Scalar(_))
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        _: Scope<'_>,
    ) -> Option<Diagnostic> {
        let TypeDescriptor::Scalar(kind) = target else {
            return Some(wrong_type(target, node));
        };
        let widen = orchestrator.config().schema.widen_int_to_float;
        let accepted = match (kind, node) {
            (ScalarKind::Any, _)
            | (ScalarKind::Str, Node::Str(_))
            | (ScalarKind::Int, Node::Int(_))
            | (ScalarKind::Float, Node::Float(_))
            | (ScalarKind::Bool, Node::Bool(_))
            | (ScalarKind::Null, Node::Null) => true,
            (ScalarKind::Float, Node::Int(_)) => widen,
            _ => false,
        };
        (!accepted).then(|| wrong_type(target, node))
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        _: &Orchestrator,
        _: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        Ok(match (target, node) {
            (TypeDescriptor::Scalar(ScalarKind::Float), Node::Int(i)) => Instance::Float(*i as f64),
            _ => Instance::from(node),
        })
    }
}

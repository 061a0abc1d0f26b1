//! Parameter consistency checking and argument assembly for registered classes.
//!
//! [`check`] compares a configuration mapping with a class's resolved model: key sets
//! first, then every present value against its declared type. [`build`] walks the same
//! parameters in order, builds each argument, and hands them to the class factory.

use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, Label, not_a_mapping, unrepresented};
use crate::error::{EngineError, EngineErrorExt};
use crate::model::{ExtraKeys, ResolvedModel};
use crate::orchestrator::Orchestrator;
use crate::registry::{ClassEntry, ClassId};
use crate::scope::{ParameterScope, Scope, Siblings};
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::{Arguments, Instance, Object};
use forma_tree::{Node, Tree};
use indexmap::IndexMap;
use tracing::debug;

/// Validates `node` as the arguments of the concrete class `class`.
///
/// `args` bind the class's generic parameters. Parameters named in `supplied` are
/// provided by the caller and may be absent from `node`.
#[must_use]
pub fn check(
    orchestrator: &Orchestrator,
    class: ClassId,
    args: &[TypeDescriptor],
    node: &Node,
    scope: Scope<'_>,
    supplied: &[&str],
) -> Option<Diagnostic> {
    let Some(entry) = orchestrator.registry().entry(class) else {
        return Some(unrepresented(&TypeDescriptor::class(format!("{class}"))));
    };
    let target = TypeDescriptor::generic(entry.name(), args.to_vec());
    let Node::Map(tree) = node else {
        return Some(not_a_mapping(&target, node));
    };
    let model = entry.model();
    let bound = match bind_type_args(model, args, &target) {
        Ok(bound) => bound,
        Err(diagnostic) => return Some(diagnostic),
    };
    let skip = skipped_key(orchestrator, entry);

    if let Some(diagnostic) = check_keys(&target, model, tree, node, skip, supplied) {
        return Some(diagnostic);
    }

    let mut failures: Vec<(Label, Diagnostic)> = Vec::new();
    let mut failed: Vec<&str> = Vec::new();
    for param in model.params() {
        let Some(value) = tree.get(param.name()) else { continue };

        let broken: Vec<Detail> = param
            .ty()
            .bindings()
            .into_iter()
            .filter(|b| failed.contains(&b.sibling()))
            .map(|b| Detail::Binding { target: b.target.to_string(), source: b.source.to_string() })
            .collect();
        if !broken.is_empty() {
            failures.push((
                Label::Key(param.name().to_owned()),
                Diagnostic::new(
                    DiagnosticCode::MissingDependency,
                    param.ty().clone(),
                    format!("`{}` depends on siblings that failed to check", param.name()),
                )
                .with_details(broken),
            ));
            failed.push(param.name());
            continue;
        }

        let ty = param.ty().substitute(model.type_params(), &bound);
        let parameter = ParameterScope { owner: entry.name(), name: param.name(), siblings: Siblings::Raw(tree) };
        if let Some(diagnostic) = orchestrator.check_in(&ty, value, scope.with_parameter(parameter)) {
            failures.push((Label::Key(param.name().to_owned()), diagnostic));
            failed.push(param.name());
        }
    }

    if failures.is_empty() {
        return None;
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::KeyValue,
            target,
            format!("{} argument(s) of `{}` failed", failures.len(), entry.name()),
        )
        .with_node(node)
        .with_children(failures),
    )
}

/// Builds the arguments of `class` from a checked `node` and calls its factory.
///
/// Values in `supplied` fill parameters absent from `node`.
///
/// # Errors
/// Returns the first argument that fails to build, or the factory's error.
pub fn build(
    orchestrator: &Orchestrator,
    class: ClassId,
    args: &[TypeDescriptor],
    node: &Node,
    scope: Scope<'_>,
    mut supplied: IndexMap<String, Instance>,
) -> Result<Instance, EngineError> {
    let registry = orchestrator.registry();
    let entry = registry
        .entry(class)
        .ok_or_else(|| EngineError::from(format!("unknown class id {class}")))?;
    let target = TypeDescriptor::generic(entry.name(), args.to_vec());
    let Node::Map(tree) = node else {
        return Err(not_a_mapping(&target, node).into());
    };
    let model = entry.model();
    let bound = bind_type_args(model, args, &target)?;

    let mut values: IndexMap<String, Instance> = IndexMap::with_capacity(model.params().len());
    for param in model.params() {
        let built = if let Some(value) = tree.get(param.name()) {
            let ty = param.ty().substitute(model.type_params(), &bound);
            let parameter =
                ParameterScope { owner: entry.name(), name: param.name(), siblings: Siblings::Built(&values) };
            orchestrator.build_in(&ty, value, scope.with_parameter(parameter))?
        } else if let Some(value) = supplied.shift_remove(param.name()) {
            value
        } else {
            continue;
        };
        values.insert(param.name().to_owned(), built);
    }

    let mut extra = IndexMap::new();
    if model.extra() == ExtraKeys::Collect {
        let skip = skipped_key(orchestrator, entry);
        for (key, value) in tree {
            if model.get(key).is_some() || Some(key.as_str()) == skip {
                continue;
            }
            let parameter =
                ParameterScope { owner: entry.name(), name: key, siblings: Siblings::Built(&values) };
            let built = orchestrator.build_in(&TypeDescriptor::any(), value, scope.with_parameter(parameter))?;
            extra.insert(key.clone(), built);
        }
    }

    debug!(class = %entry.name(), arguments = values.len(), extra = extra.len(), "Building object");
    let mut fields = values.clone();
    fields.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    let mut arguments = Arguments::new(entry.name(), values, extra);
    let value = registry
        .construct(class, &mut arguments)
        .context(format!("while constructing `{}`", entry.name()))?;
    Ok(Instance::Object(Object::new(entry.name(), fields, value)))
}

/// Missing required keys and undeclared keys, reported together.
fn check_keys(
    target: &TypeDescriptor,
    model: &ResolvedModel,
    tree: &Tree,
    node: &Node,
    skip: Option<&str>,
    supplied: &[&str],
) -> Option<Diagnostic> {
    let missing = model
        .required()
        .filter(|p| !tree.contains_key(p.name()) && !supplied.contains(&p.name()))
        .map(|p| Detail::Missing { key: p.name().to_owned(), expected: p.ty().to_string() });
    let extra = tree
        .iter()
        .filter(|(key, _)| {
            model.extra() == ExtraKeys::Reject
                && model.get(key).is_none()
                && Some(key.as_str()) != skip
        })
        .map(|(key, value)| Detail::Extra { key: key.clone(), found: value.kind() });
    let details: Vec<Detail> = missing.chain(extra).collect();
    if details.is_empty() {
        return None;
    }
    Some(
        Diagnostic::new(
            DiagnosticCode::KeyValueDiff,
            target.clone(),
            format!("keys do not match the parameters of {target}"),
        )
        .with_node(node)
        .with_details(details),
    )
}

/// Generic arguments for the model's type parameters; unbound parameters become `any`.
fn bind_type_args(
    model: &ResolvedModel,
    args: &[TypeDescriptor],
    target: &TypeDescriptor,
) -> Result<Vec<TypeDescriptor>, Diagnostic> {
    let expected = model.type_params().len();
    if args.is_empty() {
        return Ok(vec![TypeDescriptor::any(); expected]);
    }
    if args.len() != expected {
        return Err(Diagnostic::new(
            DiagnosticCode::UnrepresentedType,
            target.clone(),
            format!("expects {expected} type argument(s), received {}", args.len()),
        ));
    }
    Ok(args.to_vec())
}

/// Hierarchy classes carry their discriminator among the arguments.
fn skipped_key<'a>(orchestrator: &'a Orchestrator, entry: &ClassEntry) -> Option<&'a str> {
    entry.is_hierarchy().then(|| orchestrator.config().schema.discriminator_key.as_str())
}

use super::Unit;
use crate::constructor;
use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, Label, not_a_mapping, unrepresented};
use crate::error::EngineError;
use crate::model::ExtraKeys;
use crate::orchestrator::Orchestrator;
use crate::registry::{ClassEntry, ClassId, Registry};
use crate::scope::{ParameterScope, Scope, Siblings};
use forma_domain::descriptor::{Binding, DependentMode, DependentSpec, TypeDescriptor};
use forma_domain::instance::Instance;
use forma_tree::{Node, Tree};
use indexmap::IndexMap;

/// Parameters completed from their siblings.
///
/// Each binding fills constructor parameter `target` of the dependent class from the
/// sibling path `source`, unless the configuration sets `target` itself. In
/// [`DependentMode::TypeCheck`] the bound sibling configuration is checked against the
/// target parameter's type; in [`DependentMode::FromObj`] the value is read from the
/// built sibling, attribute by attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependentUnit;

impl Unit for DependentUnit {
    fn name(&self) -> &'static str {
        "dependent"
    }

    fn contains(&self, target: &TypeDescriptor, _: &Orchestrator) -> bool {
        matches!(target, TypeDescriptor::Dependent(_))
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        let context = match Context::new(target, node, orchestrator, scope) {
            Ok(context) => context,
            Err(diagnostic) => return Some(diagnostic),
        };
        let pending = context.pending();

        match context.spec.mode {
            DependentMode::TypeCheck => {
                let mut merged = context.tree.clone();
                let mut missing = Vec::new();
                for binding in pending {
                    let Some(value) = context.parameter.siblings.node_at(&binding.source) else {
                        missing.push(binding_detail(binding));
                        continue;
                    };
                    match orchestrator.apply_alters(&value) {
                        Ok(value) => {
                            merged.insert(&*binding.target, value.into_owned());
                        },
                        Err(diagnostic) => return Some(diagnostic),
                    }
                }
                if !missing.is_empty() {
                    return Some(context.missing(missing));
                }
                constructor::check(
                    orchestrator,
                    context.class,
                    &context.args,
                    &Node::Map(merged),
                    scope.nested(),
                    &[],
                )
            },
            DependentMode::FromObj => {
                let missing: Vec<Detail> = pending
                    .iter()
                    .filter(|b| !context.parameter.siblings.contains(b.sibling()))
                    .map(|b| binding_detail(b))
                    .collect();
                if !missing.is_empty() {
                    return Some(context.missing(missing));
                }
                if let Some(diagnostic) = context.check_sources(&pending, orchestrator) {
                    return Some(diagnostic);
                }
                let supplied: Vec<&str> = pending.iter().map(|b| &*b.target).collect();
                constructor::check(orchestrator, context.class, &context.args, node, scope.nested(), &supplied)
            },
        }
    }

    fn from_obj(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let context = Context::new(target, node, orchestrator, scope)?;
        let siblings = context.parameter.siblings;
        if !matches!(siblings, Siblings::Built(_)) {
            return Err(context.malformed("sibling values are not built yet").into());
        }

        let mut merged = context.tree.clone();
        let mut supplied = IndexMap::new();
        for binding in context.pending() {
            let value = siblings.built_at(&binding.source).ok_or_else(|| {
                context
                    .malformed(format!("`{}` does not resolve on the built siblings", binding.source))
                    .with_detail(binding_detail(binding))
            })?;
            match (context.spec.mode, value.to_node()) {
                (DependentMode::TypeCheck, Some(node)) => {
                    merged.insert(&*binding.target, node);
                },
                _ => {
                    supplied.insert(binding.target.to_string(), value.clone());
                },
            }
        }
        constructor::build(orchestrator, context.class, &context.args, &Node::Map(merged), scope.nested(), supplied)
    }
}

/// Everything both passes need, validated once.
struct Context<'a> {
    target: &'a TypeDescriptor,
    spec: &'a DependentSpec,
    tree: &'a Tree,
    parameter: ParameterScope<'a>,
    scope: Scope<'a>,
    class: ClassId,
    args: Vec<TypeDescriptor>,
}

impl<'a> Context<'a> {
    fn new(
        target: &'a TypeDescriptor,
        node: &'a Node,
        orchestrator: &Orchestrator,
        scope: Scope<'a>,
    ) -> Result<Self, Diagnostic> {
        let TypeDescriptor::Dependent(spec) = target else {
            return Err(unrepresented(target));
        };
        let Some(parameter) = scope.parameter().copied() else {
            return Err(Diagnostic::new(
                DiagnosticCode::MissingDependency,
                target.clone(),
                "dependent values are only available as constructor parameters",
            )
            .with_node(node));
        };
        let TypeDescriptor::UserClass { name, args } = &spec.class else {
            return Err(Diagnostic::new(
                DiagnosticCode::MalformedDependency,
                target.clone(),
                format!("dependent values must build a class, not {}", spec.class),
            ));
        };
        let registry = orchestrator.registry();
        let query = registry.class(name).ok_or_else(|| unrepresented(&spec.class))?;
        let Node::Map(tree) = node else {
            return Err(not_a_mapping(target, node));
        };
        let class = match registry.entry(query) {
            Some(entry) if entry.is_hierarchy() => registry.resolve(query, node)?,
            _ => query,
        };

        let context = Self { target, spec, tree, parameter, scope, class, args: args.clone() };
        context.check_bindings(orchestrator)?;
        Ok(context)
    }

    /// Targets must be parameters of the resolved class; paths must stay shallow.
    fn check_bindings(&self, orchestrator: &Orchestrator) -> Result<(), Diagnostic> {
        let registry = orchestrator.registry();
        let Some(entry) = registry.entry(self.class) else {
            return Err(unrepresented(&self.spec.class));
        };
        let unknown: Vec<Detail> = self
            .spec
            .bindings
            .iter()
            .filter(|b| entry.model().get(&b.target).is_none())
            .map(binding_detail)
            .collect();
        if !unknown.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticCode::ExtraLiteral,
                self.target.clone(),
                format!("bindings name parameters `{}` does not declare", entry.name()),
            )
            .with_details(unknown));
        }

        let limit = orchestrator.config().limits.max_dependency_depth;
        let deep: Vec<Detail> = self
            .spec
            .bindings
            .iter()
            .filter(|b| b.segments().count() > limit)
            .map(binding_detail)
            .collect();
        if !deep.is_empty() {
            return Err(Diagnostic::new(
                DiagnosticCode::TooDeepLiteral,
                self.target.clone(),
                format!("binding paths may have at most {limit} segments"),
            )
            .with_details(deep));
        }
        Ok(())
    }

    /// Attribute paths of pending bindings against the raw sibling configuration.
    ///
    /// Each path must name parameters of the sibling classes it walks through, and a
    /// configured attribute value must fit the target parameter. Defaulted attributes
    /// and untyped containers are only known once built.
    fn check_sources(&self, pending: &[&Binding], orchestrator: &Orchestrator) -> Option<Diagnostic> {
        let Siblings::Raw(raw) = self.parameter.siblings else { return None };
        let registry = orchestrator.registry();
        let owner = registry.entry_by_name(self.parameter.owner)?;
        let model = registry.entry(self.class)?.model();
        let args = if self.args.len() == model.type_params().len() {
            self.args.clone()
        } else {
            vec![TypeDescriptor::any(); model.type_params().len()]
        };

        let mut unknown = Vec::new();
        let mut failures = Vec::new();
        for &binding in pending {
            let mut segments = binding.segments();
            let Some(sibling) = segments.next() else { continue };
            let Some(param) = owner.model().get(sibling) else { continue };
            let mut declared = param.ty().clone();
            let mut value = raw.get(sibling);
            for segment in segments {
                let Some(entry) = attribute_owner(registry, &declared, value) else {
                    value = None;
                    break;
                };
                let fields = value.and_then(Node::as_map);
                match entry.model().get(segment) {
                    Some(param) => declared = param.ty().clone(),
                    None if entry.model().extra() == ExtraKeys::Collect
                        && fields.is_some_and(|f| f.contains_key(segment)) =>
                    {
                        declared = TypeDescriptor::any();
                    },
                    None => {
                        unknown.push(Detail::Missing {
                            key: binding.source.to_string(),
                            expected: format!("an attribute of `{}`", entry.name()),
                        });
                        value = None;
                        break;
                    },
                }
                value = fields.and_then(|f| f.get(segment));
            }

            let (Some(value), Some(param)) = (value, model.get(&binding.target)) else { continue };
            let ty = param.ty().substitute(model.type_params(), &args);
            let value = match orchestrator.apply_alters(value) {
                Ok(value) => value,
                Err(diagnostic) => return Some(diagnostic),
            };
            if let Some(diagnostic) = orchestrator.check_in(&ty, &value, self.scope.nested()) {
                let diagnostic = diagnostic.with_detail(binding_detail(binding));
                failures.push((Label::Key(binding.target.to_string()), diagnostic));
            }
        }

        if !unknown.is_empty() {
            return Some(
                Diagnostic::new(
                    DiagnosticCode::MissingDependency,
                    self.target.clone(),
                    format!(
                        "`{}.{}` binds attributes its siblings do not have",
                        self.parameter.owner, self.parameter.name
                    ),
                )
                .with_details(unknown),
            );
        }
        if failures.is_empty() {
            return None;
        }
        Some(
            Diagnostic::new(
                DiagnosticCode::KeyValue,
                self.target.clone(),
                format!("{} bound value(s) do not fit `{}`", failures.len(), registry.name(self.class)),
            )
            .with_children(failures),
        )
    }

    /// Bindings whose target the configuration does not set explicitly.
    fn pending(&self) -> Vec<&'a Binding> {
        self.spec.bindings.iter().filter(|b| !self.tree.contains_key(&b.target)).collect()
    }

    fn missing(&self, details: Vec<Detail>) -> Diagnostic {
        Diagnostic::new(
            DiagnosticCode::MissingDependency,
            self.target.clone(),
            format!(
                "`{}.{}` depends on siblings that are not configured",
                self.parameter.owner, self.parameter.name
            ),
        )
        .with_details(details)
    }

    fn malformed(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::MalformedDependency, self.target.clone(), message.into())
    }
}

/// The concrete class whose parameters are the attributes of a `declared` value.
fn attribute_owner<'r>(
    registry: &'r Registry,
    declared: &TypeDescriptor,
    value: Option<&Node>,
) -> Option<&'r ClassEntry> {
    match declared {
        TypeDescriptor::Optional(inner) => attribute_owner(registry, inner, value),
        TypeDescriptor::UserClass { name, .. } => {
            let query = registry.class(name)?;
            let entry = registry.entry(query)?;
            if !entry.is_hierarchy() {
                return Some(entry);
            }
            // A template's attributes are those of its expansion, known only once built.
            registry.resolve(query, value?).ok().and_then(|id| registry.entry(id)).filter(|e| !e.is_template())
        },
        _ => None,
    }
}

fn binding_detail(binding: &Binding) -> Detail {
    Detail::Binding { target: binding.target.to_string(), source: binding.source.to_string() }
}

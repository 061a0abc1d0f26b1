use super::Unit;
use crate::constructor;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Label, not_a_mapping, unrepresented};
use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::registry::{ClassEntry, ClassId};
use crate::scope::Scope;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_tree::{Node, Tree};
use tracing::debug;

/// Template classes: a subclass that stands in for another configuration.
///
/// The template's own arguments are checked against its model, then rewritten by its
/// template function into a configuration of the requested type. That expansion is
/// checked and built in place of the template, so a failure anywhere is reported before
/// anything is constructed. Requesting the template class itself expands into its
/// hierarchy root.
///
/// The hierarchy resolver hands selected templates to [`TemplateUnit::check_resolved`]
/// and [`TemplateUnit::build_resolved`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateUnit;

impl TemplateUnit {
    fn template(target: &TypeDescriptor, orchestrator: &Orchestrator) -> Option<ClassId> {
        let registry = orchestrator.registry();
        let id = registry.class(target.class_name()?)?;
        registry.entry(id).filter(|e| e.is_template()).map(ClassEntry::id)
    }

    /// The type an expansion of `class` is checked as.
    fn shadowed(target: &TypeDescriptor, class: ClassId, orchestrator: &Orchestrator) -> TypeDescriptor {
        let registry = orchestrator.registry();
        if target.class_name() == Some(registry.name(class)) {
            return TypeDescriptor::class(registry.name(registry.root_of(class)));
        }
        target.clone()
    }

    fn expand(class: ClassId, node: &Node, orchestrator: &Orchestrator) -> Result<Tree, Diagnostic> {
        let registry = orchestrator.registry();
        let name = registry.name(class);
        let Node::Map(tree) = node else {
            return Err(not_a_mapping(&TypeDescriptor::class(name), node));
        };
        let mut args = tree.clone();
        args.remove(&orchestrator.config().schema.discriminator_key);
        registry.expand_template(class, &args).map_err(|error| {
            Diagnostic::new(
                DiagnosticCode::Template,
                TypeDescriptor::class(name),
                format!("template `{name}` failed: {error}"),
            )
            .with_node(node)
        })
    }

    /// Checks the arguments of the resolved template `class`, then its expansion.
    #[must_use]
    pub fn check_resolved(
        target: &TypeDescriptor,
        class: ClassId,
        args: &[TypeDescriptor],
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        if let Some(diagnostic) = constructor::check(orchestrator, class, args, node, scope, &[]) {
            return Some(diagnostic);
        }
        let expanded = match Self::expand(class, node, orchestrator) {
            Ok(expanded) => Node::Map(expanded),
            Err(diagnostic) => return Some(diagnostic),
        };
        let shadowed = Self::shadowed(target, class, orchestrator);
        let diagnostic = orchestrator.check_in(&shadowed, &expanded, scope.nested())?;
        let name = orchestrator.registry().name(class);
        Some(
            Diagnostic::new(
                DiagnosticCode::KeyValue,
                target.clone(),
                format!("template `{name}` expands to an invalid {shadowed}"),
            )
            .with_node(node)
            .with_children([(Label::Member(name.to_owned()), diagnostic)]),
        )
    }

    /// Expands the resolved template `class` and builds the expansion.
    ///
    /// # Errors
    /// Returns the template's failure or the first failure building the expansion.
    pub fn build_resolved(
        target: &TypeDescriptor,
        class: ClassId,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Result<Instance, EngineError> {
        let expanded = Self::expand(class, node, orchestrator)?;
        let shadowed = Self::shadowed(target, class, orchestrator);
        debug!(template = %orchestrator.registry().name(class), ty = %shadowed, "Building template expansion");
        orchestrator.build_in(&shadowed, &Node::Map(expanded), scope.nested())
    }

    fn resolve(
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
    ) -> Result<(ClassId, Vec<TypeDescriptor>), Diagnostic> {
        let (Some(query), TypeDescriptor::UserClass { args, .. }) = (Self::template(target, orchestrator), target)
        else {
            return Err(unrepresented(target));
        };
        let resolved = orchestrator.registry().resolve(query, node)?;
        Ok((resolved, args.clone()))
    }
}

impl Unit for TemplateUnit {
    fn name(&self) -> &'static str {
        "template"
    }

    fn contains(&self, target: &TypeDescriptor, orchestrator: &Orchestrator) -> bool {
        Self::template(target, orchestrator).is_some()
    }

    fn type_check(
        &self,
        target: &TypeDescriptor,
        node: &Node,
        orchestrator: &Orchestrator,
        scope: Scope<'_>,
    ) -> Option<Diagnostic> {
        match Self::resolve(target, node, orchestrator) {
            Ok((class, args)) => Self::check_resolved(target, class, &args, node, orchestrator, scope),
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
        let (class, _) = Self::resolve(target, node, orchestrator)?;
        Self::build_resolved(target, class, node, orchestrator, scope)
    }
}

//! Declarative constructor signatures.
//!
//! Each registered class describes its constructor once with a [`ConstructorModel`].
//! At registration the model is merged with its ancestors' models and validated into
//! a [`ResolvedModel`], so ordering mistakes surface before any configuration is read.

use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode};
use forma_domain::descriptor::TypeDescriptor;
use std::sync::Arc;

/// One declared constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: Arc<str>,
    ty: TypeDescriptor,
    has_default: bool,
}

impl Parameter {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.has_default
    }

    /// Whether the value is completed from sibling parameters.
    #[must_use]
    pub fn is_dependent(&self) -> bool {
        self.ty.is_dependent()
    }
}

/// What happens to configuration keys that match no parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraKeys {
    #[default]
    Reject,
    /// Extra keys are built as plain data and handed to the factory.
    Collect,
}

/// Builder for a class's constructor signature.
///
/// ```rust
/// use forma_domain::descriptor::TypeDescriptor;
/// use forma_engine::model::ConstructorModel;
///
/// let model = ConstructorModel::new()
///     .param("name", TypeDescriptor::str())
///     .param_with_default("weight", TypeDescriptor::float())
///     .inherit();
/// assert_eq!(model.params().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstructorModel {
    params: Vec<Parameter>,
    order: Option<Vec<Arc<str>>>,
    inherit: bool,
    extra: ExtraKeys,
    type_params: Vec<Arc<str>>,
}

impl ConstructorModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required parameter. Redeclaring a name replaces it in place.
    #[must_use]
    pub fn param(self, name: impl Into<Arc<str>>, ty: TypeDescriptor) -> Self {
        self.push(Parameter { name: name.into(), ty, has_default: false })
    }

    /// Declares a parameter the constructor can do without.
    #[must_use]
    pub fn param_with_default(self, name: impl Into<Arc<str>>, ty: TypeDescriptor) -> Self {
        self.push(Parameter { name: name.into(), ty, has_default: true })
    }

    /// Explicit parameter order, covering every parameter after inheritance.
    #[must_use]
    pub fn order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Forwards unconsumed keys to the parent constructor.
    #[must_use]
    pub const fn inherit(mut self) -> Self {
        self.inherit = true;
        self
    }

    #[must_use]
    pub const fn collect_extra(mut self) -> Self {
        self.extra = ExtraKeys::Collect;
        self
    }

    /// Names of generic parameters, bound positionally by `UserClass` arguments.
    #[must_use]
    pub fn type_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.type_params = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[must_use]
    pub const fn inherits(&self) -> bool {
        self.inherit
    }

    fn push(mut self, parameter: Parameter) -> Self {
        match self.params.iter_mut().find(|p| p.name == parameter.name) {
            Some(slot) => *slot = parameter,
            None => self.params.push(parameter),
        }
        self
    }

    /// Merges with the parent's resolved model and validates the result.
    ///
    /// Inherited parameters keep their position; redeclared ones take the subclass type.
    ///
    /// # Errors
    /// * [`DiagnosticCode::ParameterOrder`] when an explicit order is not a permutation of
    ///   the parameters or a dependent parameter precedes its source.
    /// * [`DiagnosticCode::MalformedDependency`] for bindings to unknown siblings.
    /// * [`DiagnosticCode::TooDeepLiteral`] for binding paths longer than `max_dependency_depth`.
    pub fn resolve(
        &self,
        class: &str,
        parent: Option<&ResolvedModel>,
        max_dependency_depth: usize,
    ) -> Result<ResolvedModel, Diagnostic> {
        let parent = parent.filter(|_| self.inherit);
        let mut params = parent.map(|p| p.params.clone()).unwrap_or_default();
        for own in &self.params {
            match params.iter_mut().find(|p| p.name == own.name) {
                Some(slot) => *slot = own.clone(),
                None => params.push(own.clone()),
            }
        }

        if let Some(order) = &self.order {
            params = reorder(class, params, order)?;
        }

        let extra = match parent {
            Some(p) if p.extra == ExtraKeys::Collect => ExtraKeys::Collect,
            _ => self.extra,
        };
        let type_params = match parent {
            Some(p) if self.type_params.is_empty() => p.type_params.clone(),
            _ => self.type_params.clone(),
        };

        let model = ResolvedModel { params, extra, type_params };
        model.validate_dependencies(class, max_dependency_depth)?;
        Ok(model)
    }
}

fn reorder(
    class: &str,
    params: Vec<Parameter>,
    order: &[Arc<str>],
) -> Result<Vec<Parameter>, Diagnostic> {
    let missing: Vec<Detail> = params
        .iter()
        .filter(|p| !order.contains(&p.name))
        .map(|p| Detail::Missing { key: p.name.to_string(), expected: p.ty.to_string() })
        .collect();
    let mut seen: Vec<&Arc<str>> = Vec::new();
    let mut extra = Vec::new();
    for name in order {
        if seen.contains(&name) || !params.iter().any(|p| &p.name == name) {
            extra.push(Detail::Extra { key: name.to_string(), found: "order entry" });
        }
        seen.push(name);
    }
    if !missing.is_empty() || !extra.is_empty() {
        return Err(Diagnostic::new(
            DiagnosticCode::ParameterOrder,
            TypeDescriptor::class(class),
            format!("explicit order of `{class}` does not match its parameters"),
        )
        .with_details(missing)
        .with_details(extra));
    }

    let mut params = params;
    let mut ordered = Vec::with_capacity(params.len());
    for name in order {
        if let Some(index) = params.iter().position(|p| &p.name == name) {
            ordered.push(params.swap_remove(index));
        }
    }
    Ok(ordered)
}

/// A constructor signature after inheritance, ready for checking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedModel {
    params: Vec<Parameter>,
    extra: ExtraKeys,
    type_params: Vec<Arc<str>>,
}

impl ResolvedModel {
    #[must_use]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| &*p.name == name)
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| &*p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }

    pub fn required(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.has_default)
    }

    #[must_use]
    pub const fn extra(&self) -> ExtraKeys {
        self.extra
    }

    #[must_use]
    pub fn type_params(&self) -> &[Arc<str>] {
        &self.type_params
    }

    fn validate_dependencies(&self, class: &str, max_depth: usize) -> Result<(), Diagnostic> {
        let target = || TypeDescriptor::class(class);
        for (index, param) in self.params.iter().enumerate() {
            for binding in param.ty.bindings() {
                let detail =
                    Detail::Binding { target: binding.target.to_string(), source: binding.source.to_string() };
                if binding.target.is_empty() || binding.segments().any(str::is_empty) {
                    return Err(Diagnostic::new(
                        DiagnosticCode::MalformedDependency,
                        target(),
                        format!("`{class}.{}` has an empty binding segment", param.name),
                    )
                    .with_detail(detail));
                }
                if binding.segments().count() > max_depth {
                    return Err(Diagnostic::new(
                        DiagnosticCode::TooDeepLiteral,
                        target(),
                        format!(
                            "`{class}.{}` binds `{}`, deeper than {max_depth} segments",
                            param.name, binding.source
                        ),
                    )
                    .with_detail(detail));
                }
                let sibling = binding.sibling();
                match self.position(sibling) {
                    Some(source) if source < index => {},
                    Some(source) if source == index => {
                        return Err(Diagnostic::new(
                            DiagnosticCode::MalformedDependency,
                            target(),
                            format!("`{class}.{}` depends on itself", param.name),
                        )
                        .with_detail(detail));
                    },
                    Some(_) => {
                        return Err(Diagnostic::new(
                            DiagnosticCode::ParameterOrder,
                            target(),
                            format!(
                                "`{class}.{}` is declared before `{sibling}`, which it depends on",
                                param.name
                            ),
                        )
                        .with_detail(detail));
                    },
                    None => {
                        return Err(Diagnostic::new(
                            DiagnosticCode::MalformedDependency,
                            target(),
                            format!("`{class}.{}` depends on unknown parameter `{sibling}`", param.name),
                        )
                        .with_detail(detail));
                    },
                }
            }
        }
        Ok(())
    }
}

//! Normalized target types.
//!
//! A [`TypeDescriptor`] names what a configuration node should become. Descriptors are
//! plain data: structurally comparable, hashable and serializable, so they can be
//! declared in code or loaded alongside configuration.

use forma_tree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Primitive leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
    /// Accepts any node unchanged.
    Any,
}

/// How a dependent parameter consumes its sibling values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentMode {
    /// Bound sibling values are validated against the target parameter types.
    TypeCheck,
    /// Bound values are read from the already built sibling objects.
    FromObj,
}

/// One `target <- source` edge of a dependent parameter.
///
/// `target` is a constructor parameter of the dependent class, `source` a dotted
/// path whose first segment is a sibling parameter (`"d"` or `"dlc.dd"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub target: Arc<str>,
    pub source: Arc<str>,
}

impl Binding {
    /// The sibling parameter this binding reads from.
    #[must_use]
    pub fn sibling(&self) -> &str {
        self.source.split('.').next().unwrap_or_default()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.source.split('.')
    }
}

/// A parameter whose configuration is completed from sibling parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependentSpec {
    pub class: TypeDescriptor,
    pub bindings: Vec<Binding>,
    pub mode: DependentMode,
}

/// Closed set of target types understood by the engine.
///
/// Build descriptors through the constructor functions ([`TypeDescriptor::union`],
/// [`TypeDescriptor::literal`], ...), which normalize their payloads. Variants written
/// out by hand or deserialized keep their payload as given; repeated union members or
/// literal values then only cost extra checks and appear twice in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Optional(Box<Self>),
    /// Members in precedence order. Prefer [`TypeDescriptor::union`].
    Union(Vec<Self>),
    Tuple(Vec<Self>),
    Sequence(Box<Self>),
    /// String keys, values of the inner type.
    Mapping(Box<Self>),
    /// Allowed values. Prefer [`TypeDescriptor::literal`].
    Literal(Vec<Node>),
    Enumeration(Arc<str>),
    UserClass { name: Arc<str>, args: Vec<Self> },
    /// Generic parameter of a class, replaced by the matching `UserClass` argument.
    TypeVar(Arc<str>),
    Dependent(Box<DependentSpec>),
}

impl TypeDescriptor {
    #[must_use]
    pub const fn str() -> Self {
        Self::Scalar(ScalarKind::Str)
    }

    #[must_use]
    pub const fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    #[must_use]
    pub const fn float() -> Self {
        Self::Scalar(ScalarKind::Float)
    }

    #[must_use]
    pub const fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(ScalarKind::Null)
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::Scalar(ScalarKind::Any)
    }

    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Builds a union, dropping repeated members while keeping the first occurrence.
    #[must_use]
    pub fn union(members: impl IntoIterator<Item = Self>) -> Self {
        Self::Union(dedup(members))
    }

    #[must_use]
    pub fn tuple(elements: impl IntoIterator<Item = Self>) -> Self {
        Self::Tuple(elements.into_iter().collect())
    }

    #[must_use]
    pub fn sequence(element: Self) -> Self {
        Self::Sequence(Box::new(element))
    }

    #[must_use]
    pub fn mapping(value: Self) -> Self {
        Self::Mapping(Box::new(value))
    }

    /// Builds a literal set, dropping repeated values while keeping the first occurrence.
    #[must_use]
    pub fn literal<T: Into<Node>>(allowed: impl IntoIterator<Item = T>) -> Self {
        Self::Literal(dedup(allowed.into_iter().map(Into::into)))
    }

    #[must_use]
    pub fn enumeration(name: impl Into<Arc<str>>) -> Self {
        Self::Enumeration(name.into())
    }

    #[must_use]
    pub fn class(name: impl Into<Arc<str>>) -> Self {
        Self::UserClass { name: name.into(), args: Vec::new() }
    }

    #[must_use]
    pub fn generic(name: impl Into<Arc<str>>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::UserClass { name: name.into(), args: args.into_iter().collect() }
    }

    #[must_use]
    pub fn var(name: impl Into<Arc<str>>) -> Self {
        Self::TypeVar(name.into())
    }

    /// A dependent parameter of class `class`, completed from sibling values.
    ///
    /// ```rust
    /// use forma_domain::descriptor::{DependentMode, TypeDescriptor};
    ///
    /// let s = TypeDescriptor::dependent(
    ///     TypeDescriptor::class("Summary"),
    ///     [("dataset", "dataset")],
    ///     DependentMode::TypeCheck,
    /// );
    /// assert!(s.is_dependent());
    /// ```
    #[must_use]
    pub fn dependent<T, S>(
        class: Self,
        bindings: impl IntoIterator<Item = (T, S)>,
        mode: DependentMode,
    ) -> Self
    where
        T: Into<Arc<str>>,
        S: Into<Arc<str>>,
    {
        let bindings = bindings
            .into_iter()
            .map(|(target, source)| Binding { target: target.into(), source: source.into() })
            .collect();
        Self::Dependent(Box::new(DependentSpec { class, bindings, mode }))
    }

    /// Class name for `UserClass` descriptors.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::UserClass { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether a dependent descriptor is reachable through optional/union wrappers.
    #[must_use]
    pub fn is_dependent(&self) -> bool {
        !self.bindings().is_empty()
    }

    /// Every binding reachable through optional/union wrappers, in declaration order.
    #[must_use]
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut found = Vec::new();
        self.collect_bindings(&mut found);
        found
    }

    fn collect_bindings<'a>(&'a self, found: &mut Vec<&'a Binding>) {
        match self {
            Self::Dependent(spec) => found.extend(spec.bindings.iter()),
            Self::Optional(inner) => inner.collect_bindings(found),
            Self::Union(members) => members.iter().for_each(|m| m.collect_bindings(found)),
            _ => {},
        }
    }

    /// Replaces `TypeVar`s named in `params` with the argument at the same position.
    ///
    /// Variables without a matching argument are left in place.
    #[must_use]
    pub fn substitute(&self, params: &[Arc<str>], args: &[Self]) -> Self {
        if params.is_empty() {
            return self.clone();
        }
        let sub = |t: &Self| t.substitute(params, args);
        match self {
            Self::TypeVar(name) => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i))
                .map_or_else(|| self.clone(), Clone::clone),
            Self::Optional(inner) => Self::Optional(Box::new(sub(inner))),
            Self::Union(members) => Self::Union(members.iter().map(sub).collect()),
            Self::Tuple(elements) => Self::Tuple(elements.iter().map(sub).collect()),
            Self::Sequence(element) => Self::Sequence(Box::new(sub(element))),
            Self::Mapping(value) => Self::Mapping(Box::new(sub(value))),
            Self::UserClass { name, args: inner } => {
                Self::UserClass { name: Arc::clone(name), args: inner.iter().map(sub).collect() }
            },
            Self::Dependent(spec) => Self::Dependent(Box::new(DependentSpec {
                class: sub(&spec.class),
                bindings: spec.bindings.clone(),
                mode: spec.mode,
            })),
            Self::Scalar(_) | Self::Literal(_) | Self::Enumeration(_) => self.clone(),
        }
    }
}

fn dedup<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Null => "null",
            Self::Any => "any",
        })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Optional(inner) => write!(f, "Optional<{inner}>"),
            Self::Union(members) => write_list(f, "Union", members),
            Self::Tuple(elements) => write_list(f, "Tuple", elements),
            Self::Sequence(element) => write!(f, "Sequence<{element}>"),
            Self::Mapping(value) => write!(f, "Mapping<str, {value}>"),
            Self::Literal(allowed) => write_list(f, "Literal", allowed),
            Self::Enumeration(name) => write!(f, "Enum<{name}>"),
            Self::UserClass { name, args } if args.is_empty() => f.write_str(name),
            Self::UserClass { name, args } => write_list(f, name, args),
            Self::TypeVar(name) => f.write_str(name),
            Self::Dependent(spec) => {
                write!(f, "Dependent<{}, {{", spec.class)?;
                for (i, b) in spec.bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", b.target, b.source)?;
                }
                f.write_str("}>")
            },
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, head: &str, items: &[T]) -> fmt::Result {
    write!(f, "{head}<")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(">")
}

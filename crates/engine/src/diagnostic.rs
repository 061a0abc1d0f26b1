//! Structured validation failures.
//!
//! A [`Diagnostic`] names what failed ([`DiagnosticCode`]), the target type it was
//! checked against, the offending configuration node and any nested failures of
//! union members, sequence elements, mapping values or constructor arguments.

use forma_domain::descriptor::TypeDescriptor;
use forma_tree::Node;
use std::borrow::Cow;
use std::fmt;

/// Closed taxonomy of validation failures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
)]
pub enum DiagnosticCode {
    /// No unit or hierarchy can represent the target type.
    UnrepresentedType,
    /// A value is present but has the wrong kind.
    WrongType,
    /// One or more nested values failed; see the children.
    KeyValue,
    /// Required keys are missing or undeclared keys are present.
    KeyValueDiff,
    /// Parameters are ordered so that a dependent comes before its source.
    ParameterOrder,
    /// A dependent parameter's source sibling is absent or invalid.
    MissingDependency,
    /// A dependent binding is malformed or resolves to nothing usable.
    MalformedDependency,
    /// A dependent binding targets a parameter the class does not declare.
    ExtraLiteral,
    /// A tuple received the wrong number of elements.
    TupleArgLen,
    /// The nesting depth or a binding path exceeded its limit.
    TooDeepLiteral,
    /// A value cannot be compared as a literal.
    Hashable,
    /// The string does not name a member of the enumeration.
    AnumMember,
    /// Enumeration members are selected by string only.
    AnumWrongType,
    /// The discriminator names no class at or below the queried class.
    ComplexTypeMismatch,
    /// The configuration cannot drive resolution (not a mapping, ambiguous, ...).
    Param,
    /// An alter marker could not be resolved.
    Alter,
    /// A template could not expand its arguments.
    Template,
}

/// Where a child diagnostic sits relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Key(String),
    Index(usize),
    Member(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "`{key}`"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Member(member) => write!(f, "<{member}>"),
        }
    }
}

/// Extra facts attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    /// A required key is absent.
    Missing { key: String, expected: String },
    /// A key is not declared.
    Extra { key: String, found: &'static str },
    /// An alternative the caller could have used.
    Available(String),
    /// A dependent binding involved in the failure.
    Binding { target: String, source: String },
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key, expected } => write!(f, "- missing `{key}`: {expected}"),
            Self::Extra { key, found } => write!(f, "+ unexpected `{key}`: {found}"),
            Self::Available(option) => write!(f, "? {option}"),
            Self::Binding { target, source } => write!(f, "~ `{target}` <- `{source}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: DiagnosticCode,
    target: TypeDescriptor,
    message: Cow<'static, str>,
    node: Option<Node>,
    details: Vec<Detail>,
    children: Vec<(Label, Self)>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        code: DiagnosticCode,
        target: TypeDescriptor,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            target,
            message: message.into(),
            node: None,
            details: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Records a snapshot of the offending node.
    #[must_use]
    pub fn with_node(mut self, node: &Node) -> Self {
        self.node = Some(node.clone());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.details.push(detail);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl IntoIterator<Item = Detail>) -> Self {
        self.details.extend(details);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = (Label, Self)>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    #[must_use]
    pub const fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    #[must_use]
    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    #[must_use]
    pub fn children(&self) -> &[(Label, Self)] {
        &self.children
    }

    /// Child diagnostic recorded under `label`.
    #[must_use]
    pub fn child(&self, label: &Label) -> Option<&Self> {
        self.children.iter().find(|(l, _)| l == label).map(|(_, d)| d)
    }

    pub fn missing_keys(&self) -> impl Iterator<Item = &str> {
        self.details.iter().filter_map(|d| match d {
            Detail::Missing { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn extra_keys(&self) -> impl Iterator<Item = &str> {
        self.details.iter().filter_map(|d| match d {
            Detail::Extra { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.details.iter().filter_map(|d| match d {
            Detail::Available(option) => Some(option.as_str()),
            _ => None,
        })
    }

    /// Depth-first search for the first diagnostic (self included) with `code`.
    #[must_use]
    pub fn find(&self, code: DiagnosticCode) -> Option<&Self> {
        if self.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|(_, child)| child.find(code))
    }

    #[must_use]
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.find(code).is_some()
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);
        write!(f, "[{}] {} (target: {})", self.code, self.message, self.target)?;
        if let Some(node) = &self.node {
            write!(f, "\n{pad}  received: {node}")?;
        }
        for detail in &self.details {
            write!(f, "\n{pad}  {detail}")?;
        }
        for (label, child) in &self.children {
            write!(f, "\n{pad}  at {label}: ")?;
            child.render(f, indent + 4)?;
        }
        Ok(())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

// --- Shorthands ---

pub(crate) fn unrepresented(target: &TypeDescriptor) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::UnrepresentedType,
        target.clone(),
        format!("no unit or hierarchy represents `{target}`"),
    )
}

pub(crate) fn wrong_type(target: &TypeDescriptor, node: &Node) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::WrongType,
        target.clone(),
        format!("expected {target}, received {}", node.kind()),
    )
    .with_node(node)
}

pub(crate) fn not_a_mapping(target: &TypeDescriptor, node: &Node) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::Param,
        target.clone(),
        format!("`{target}` is configured by a mapping, received {}", node.kind()),
    )
    .with_node(node)
}

pub(crate) fn too_deep(target: &TypeDescriptor, limit: usize) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::TooDeepLiteral,
        target.clone(),
        format!("nesting exceeds the maximum depth of {limit}"),
    )
}

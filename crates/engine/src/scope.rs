use forma_domain::instance::Instance;
use forma_tree::{Node, SEPARATOR, Tree};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Sibling values visible to a constructor parameter.
#[derive(Debug, Clone, Copy)]
pub enum Siblings<'a> {
    /// Configuration nodes, used while checking.
    Raw(&'a Tree),
    /// Already built arguments, used while constructing.
    Built(&'a IndexMap<String, Instance>),
}

impl<'a> Siblings<'a> {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Raw(tree) => tree.contains_key(name),
            Self::Built(values) => values.contains_key(name),
        }
    }

    /// Configuration data at a dotted path. Built siblings are converted back to
    /// data; objects have no data form and yield `None`.
    #[must_use]
    pub fn node_at(&self, path: &str) -> Option<Cow<'a, Node>> {
        match *self {
            Self::Raw(tree) => tree.get_path(path).map(Cow::Borrowed),
            Self::Built(_) => self.built_at(path)?.to_node().map(Cow::Owned),
        }
    }

    /// A built sibling, then its attributes: `dataset.rows`. `None` while checking.
    #[must_use]
    pub fn built_at(&self, path: &str) -> Option<&'a Instance> {
        let Self::Built(values) = *self else { return None };
        let mut segments = path.split(SEPARATOR);
        let mut current = values.get(segments.next()?)?;
        for segment in segments {
            current = current.attribute(segment)?;
        }
        Some(current)
    }
}

/// The constructor parameter a value is being checked for.
#[derive(Debug, Clone, Copy)]
pub struct ParameterScope<'a> {
    /// Class whose constructor declares the parameter.
    pub owner: &'a str,
    pub name: &'a str,
    pub siblings: Siblings<'a>,
}

/// Per-call recursion state threaded through the units.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    depth: usize,
    parameter: Option<ParameterScope<'a>>,
}

impl<'a> Scope<'a> {
    #[must_use]
    pub const fn root() -> Self {
        Self { depth: 0, parameter: None }
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn parameter(&self) -> Option<&ParameterScope<'a>> {
        self.parameter.as_ref()
    }

    /// One level deeper; nested values no longer see the enclosing parameter.
    #[must_use]
    pub const fn nested(&self) -> Self {
        Self { depth: self.depth + 1, parameter: None }
    }

    /// One level deeper while keeping the enclosing parameter (optional and union members).
    #[must_use]
    pub const fn passthrough(&self) -> Self {
        Self { depth: self.depth + 1, parameter: self.parameter }
    }

    /// One level deeper, entering a constructor parameter.
    #[must_use]
    pub const fn with_parameter(&self, parameter: ParameterScope<'a>) -> Self {
        Self { depth: self.depth + 1, parameter: Some(parameter) }
    }
}

impl Default for Scope<'_> {
    fn default() -> Self {
        Self::root()
    }
}

//! Search spaces and the components they are composed of.
//!
//! Every space yields an ordered list of [`Point`]s. A point maps dotted
//! configuration paths to the values that replace them.

use crate::error::{SearchError, SearchErrorExt};
use forma_kernel::document::load_document;
use forma_tree::Node;
use indexmap::IndexMap;
use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// Dotted path to override value, in assignment order.
pub type Point = IndexMap<String, Node>;

/// Something that can be enumerated into configuration overrides.
///
/// Implement this for custom components and return a [`SearchSpace`] from the
/// class factory to plug them into the `GridSearch`/`GridElement` hierarchies.
pub trait Space: fmt::Debug + Send + Sync {
    /// Number of points [`Space::points`] yields, saturating at `usize::MAX`.
    fn len(&self) -> usize;

    /// Enumerates the space.
    ///
    /// # Errors
    /// Returns an error when a point cannot be produced (unreadable file, malformed document).
    fn points(&self) -> Result<Vec<Point>, SearchError>;
}

/// Shared handle to a [`Space`], the value every search class builds.
#[derive(Debug, Clone)]
pub struct SearchSpace(Arc<dyn Space>);

impl SearchSpace {
    #[must_use]
    pub fn new(space: impl Space + 'static) -> Self {
        Self(Arc::new(space))
    }
}

impl Deref for SearchSpace {
    type Target = dyn Space;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/// One point per value, the value assigned to every key.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    keys: Vec<String>,
    values: Vec<Node>,
}

impl Grid {
    #[must_use]
    pub const fn new(keys: Vec<String>, values: Vec<Node>) -> Self {
        Self { keys, values }
    }
}

impl Space for Grid {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn points(&self) -> Result<Vec<Point>, SearchError> {
        Ok(self
            .values
            .iter()
            .map(|value| self.keys.iter().map(|key| (key.clone(), value.clone())).collect())
            .collect())
    }
}

/// Cartesian product of its members; later members override earlier ones on shared keys.
#[derive(Debug, Clone)]
pub struct Product(Vec<SearchSpace>);

impl Product {
    #[must_use]
    pub const fn new(spaces: Vec<SearchSpace>) -> Self {
        Self(spaces)
    }
}

impl Space for Product {
    fn len(&self) -> usize {
        self.0.iter().fold(1, |acc: usize, space| acc.saturating_mul(space.len()))
    }

    fn points(&self) -> Result<Vec<Point>, SearchError> {
        self.0.iter().try_fold(vec![Point::new()], |acc, space| {
            let next = space.points()?;
            Ok(acc
                .iter()
                .flat_map(|left| {
                    next.iter().map(move |right| {
                        let mut point = left.clone();
                        point.extend(right.iter().map(|(k, v)| (k.clone(), v.clone())));
                        point
                    })
                })
                .collect())
        })
    }
}

/// Concatenation of its members.
#[derive(Debug, Clone)]
pub struct Concat(Vec<SearchSpace>);

impl Concat {
    #[must_use]
    pub const fn new(spaces: Vec<SearchSpace>) -> Self {
        Self(spaces)
    }
}

impl Space for Concat {
    fn len(&self) -> usize {
        self.0.iter().fold(0, |acc: usize, space| acc.saturating_add(space.len()))
    }

    fn points(&self) -> Result<Vec<Point>, SearchError> {
        let mut points = Vec::new();
        for space in &self.0 {
            points.extend(space.points()?);
        }
        Ok(points)
    }
}

/// One point per document; every leaf of the document becomes an override.
#[derive(Debug, Clone)]
pub struct Files(Vec<PathBuf>);

impl Files {
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }
}

impl Space for Files {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn points(&self) -> Result<Vec<Point>, SearchError> {
        self.0
            .iter()
            .map(|path| {
                load_document(path)
                    .map(|tree| tree.flatten())
                    .context(format!("Failed to load search point `{}`", path.display()))
            })
            .collect()
    }
}

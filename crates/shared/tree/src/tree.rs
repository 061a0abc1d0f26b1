use crate::error::{TreeError, TreeErrorExt};
use crate::hash;
use crate::node::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Path separator for flattened keys and path access.
pub const SEPARATOR: char = '.';

/// An ordered, string-keyed configuration mapping.
///
/// Insertion order is preserved for iteration and serialization; equality and
/// hashing ignore it. A tree is *well-formed* when no key is empty or contains
/// [`SEPARATOR`]; for well-formed trees `Tree::unflatten(tree.flatten())` yields
/// the original tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    entries: IndexMap<String, Node>,
}

impl Tree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object, preserving key order.
    ///
    /// # Errors
    /// Returns [`TreeError::Serialization`] if `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).context("Failed to parse configuration tree")
    }

    /// Renders the tree as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns [`TreeError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, TreeError> {
        serde_json::to_string_pretty(self).context("Failed to render configuration tree")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a direct key.
    ///
    /// `None` means the key is absent; `Some(&Node::Null)` means it is present with a null value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces a direct key, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Node>) -> Option<Node> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes a direct key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Node> {
        self.entries
    }

    /// Resolves a dotted path. Numeric segments index into sequences.
    ///
    /// ```rust
    /// use forma_tree::Tree;
    ///
    /// let tree = Tree::from_json(r#"{"a": {"b": [10, 20]}}"#).unwrap();
    /// assert_eq!(tree.get_path("a.b.1").and_then(|n| n.as_i64()), Some(20));
    /// assert!(tree.get_path("a.c").is_none());
    /// ```
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split(SEPARATOR);
        let mut current = self.entries.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Node::Map(tree) => tree.entries.get(segment)?,
                Node::Seq(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.get_path(path).is_some()
    }

    /// Writes `value` at a dotted path, creating intermediate mappings on the way.
    ///
    /// # Errors
    /// * [`TreeError::InvalidPath`] if the path has an empty segment.
    /// * [`TreeError::Conflict`] if the path runs through a scalar or past the end of a sequence.
    pub fn insert_path(
        &mut self,
        path: &str,
        value: impl Into<Node>,
    ) -> Result<Option<Node>, TreeError> {
        let segments = split_path(path)?;
        insert_segments(self, &segments, path, value.into())
    }

    /// Flattens nested mappings into dotted keys.
    ///
    /// Sequences and empty mappings are kept as leaves so the result can be
    /// turned back into the same tree with [`Tree::unflatten`].
    #[must_use]
    pub fn flatten(&self) -> IndexMap<String, Node> {
        let mut flat = IndexMap::new();
        flatten_into(&mut flat, None, self);
        flat
    }

    /// Rebuilds a nested tree from dotted keys.
    ///
    /// # Errors
    /// * [`TreeError::InvalidPath`] for empty keys or empty segments.
    /// * [`TreeError::Conflict`] when one key is a prefix of another (`a` and `a.b`)
    ///   or the same location is written twice.
    pub fn unflatten<K, I>(flat: I) -> Result<Self, TreeError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Node)>,
    {
        let mut root = Self::new();
        for (key, value) in flat {
            let key = key.as_ref();
            let segments = split_path(key)?;
            let (last, parents) = segments.split_last().ok_or_else(|| empty_path(key))?;

            let mut slot = &mut root;
            for segment in parents {
                let next = slot.entries.entry((*segment).to_owned()).or_insert_with(|| Node::Map(Self::new()));
                slot = match next {
                    Node::Map(tree) => tree,
                    _ => return Err(conflict(key)),
                };
            }
            if slot.entries.contains_key(*last) {
                return Err(conflict(key));
            }
            slot.entries.insert((*last).to_owned(), value);
        }
        Ok(root)
    }

    /// Returns a copy of `self` with `overlay` merged on top.
    ///
    /// Nested mappings merge key by key; any other overlay value replaces the base value.
    #[must_use]
    pub fn deep_merge(&self, overlay: &Self) -> Self {
        let mut merged = self.clone();
        merged.merge_in_place(overlay);
        merged
    }

    fn merge_in_place(&mut self, overlay: &Self) {
        for (key, value) in &overlay.entries {
            if let (Some(Node::Map(base)), Node::Map(top)) = (self.entries.get_mut(key), value) {
                base.merge_in_place(top);
                continue;
            }
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Stable SHA-256 digest (hex) of the flattened content.
    ///
    /// Key order does not affect the digest; any change to a key or leaf does.
    #[must_use]
    pub fn content_hash(&self) -> String {
        hash::digest(self)
    }
}

fn flatten_into(flat: &mut IndexMap<String, Node>, prefix: Option<&str>, tree: &Tree) {
    for (key, value) in &tree.entries {
        let path = prefix.map_or_else(|| key.clone(), |p| format!("{p}{SEPARATOR}{key}"));
        match value {
            Node::Map(inner) if !inner.is_empty() => flatten_into(flat, Some(&path), inner),
            leaf => {
                flat.insert(path, leaf.clone());
            },
        }
    }
}

fn insert_segments(
    tree: &mut Tree,
    segments: &[&str],
    path: &str,
    value: Node,
) -> Result<Option<Node>, TreeError> {
    let (first, rest) = segments.split_first().ok_or_else(|| empty_path(path))?;
    if rest.is_empty() {
        return Ok(tree.entries.insert((*first).to_owned(), value));
    }
    let next = tree.entries.entry((*first).to_owned()).or_insert_with(|| Node::Map(Tree::new()));
    insert_node(next, rest, path, value)
}

fn insert_node(
    node: &mut Node,
    segments: &[&str],
    path: &str,
    value: Node,
) -> Result<Option<Node>, TreeError> {
    match node {
        Node::Map(tree) => insert_segments(tree, segments, path, value),
        Node::Seq(items) => {
            let (first, rest) = segments.split_first().ok_or_else(|| empty_path(path))?;
            let index = first.parse::<usize>().map_err(|_| conflict(path))?;
            let item = items.get_mut(index).ok_or_else(|| conflict(path))?;
            if rest.is_empty() {
                return Ok(Some(std::mem::replace(item, value)));
            }
            insert_node(item, rest, path, value)
        },
        other => Err(TreeError::Conflict {
            message: Cow::Owned(format!("a {} cannot contain `{path}`", other.kind())),
            context: None,
        }),
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, TreeError> {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(empty_path(path));
    }
    Ok(segments)
}

fn empty_path(path: &str) -> TreeError {
    TreeError::InvalidPath {
        message: Cow::Owned(format!("`{path}` contains an empty segment")),
        context: None,
    }
}

fn conflict(path: &str) -> TreeError {
    TreeError::Conflict {
        message: Cow::Owned(format!("`{path}` collides with an existing entry")),
        context: None,
    }
}

impl Hash for Tree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.len().hash(state);
        for (key, value) in entries {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key:?}: {value}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Tree {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

impl From<IndexMap<String, Node>> for Tree {
    fn from(entries: IndexMap<String, Node>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for Tree {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! Value injection ahead of checking.
//!
//! An alter owns a marker string. A mapping whose discriminator equals that marker,
//! such as `{"type": "user_dict", "key": "model.width"}`, is replaced by the value the
//! alter holds under `key` before any unit sees it.

use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode};
use forma_domain::constants::{ALTER_KEY, ENV, USER_DICT};
use forma_domain::descriptor::TypeDescriptor;
use forma_tree::{Node, Tree};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A source of values that configuration can reference by marker.
pub trait Alter: fmt::Debug + Send + Sync {
    /// Discriminator value that selects this alter.
    fn marker(&self) -> &str;

    fn get(&self, path: &str) -> Option<Node>;

    fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Resolves a marker mapping to the value it names.
    ///
    /// # Errors
    /// Returns a [`DiagnosticCode::Alter`] diagnostic when `key` is absent, not a
    /// string, or names nothing.
    fn resolve(&self, marker: &Tree) -> Result<Node, Diagnostic> {
        let Some(path) = marker.get(ALTER_KEY).and_then(Node::as_str) else {
            return Err(Diagnostic::new(
                DiagnosticCode::Alter,
                TypeDescriptor::any(),
                format!("`{}` markers need a string `{ALTER_KEY}`", self.marker()),
            )
            .with_node(&Node::Map(marker.clone())));
        };
        match self.get(path) {
            Some(value) => {
                debug!(marker = self.marker(), path, "Alter applied");
                Ok(value)
            },
            None => {
                warn!(marker = self.marker(), path, "Alter has no value");
                Err(Diagnostic::new(
                    DiagnosticCode::Alter,
                    TypeDescriptor::any(),
                    format!("`{}` holds no value at `{path}`", self.marker()),
                )
                .with_node(&Node::Map(marker.clone()))
                .with_detail(Detail::Missing { key: path.to_owned(), expected: self.marker().to_owned() }))
            },
        }
    }

    /// Rewrites every marker of this alter inside `tree`, reading markers from `key`.
    ///
    /// Pass the registry's configured discriminator key;
    /// [`Orchestrator::alter`](crate::orchestrator::Orchestrator::alter) does so for all its alters.
    ///
    /// # Errors
    /// Returns the first marker that cannot be resolved.
    fn alter(&self, tree: &Tree, key: &str) -> Result<Tree, Diagnostic> {
        rewrite_tree(key, tree, &|marker, map| {
            (marker == self.marker()).then(|| self.resolve(map))
        })
    }
}

type Resolver<'r> = dyn Fn(&str, &Tree) -> Option<Result<Node, Diagnostic>> + 'r;

/// Replaces `node` when it is a marker of one of `alters`.
pub(crate) fn substitute<'n>(
    alters: &[Arc<dyn Alter>],
    key: &str,
    node: &'n Node,
) -> Result<Cow<'n, Node>, Diagnostic> {
    if alters.is_empty() {
        return Ok(Cow::Borrowed(node));
    }
    match marker_of(key, node).and_then(|(marker, map)| dispatch(alters, marker, map)) {
        Some(resolved) => resolved.map(Cow::Owned),
        None => Ok(Cow::Borrowed(node)),
    }
}

/// Replaces every marker of `alters` below `tree`, through mappings and sequences.
pub(crate) fn rewrite(alters: &[Arc<dyn Alter>], key: &str, tree: &Tree) -> Result<Tree, Diagnostic> {
    rewrite_tree(key, tree, &|marker, map| dispatch(alters, marker, map))
}

fn dispatch(alters: &[Arc<dyn Alter>], marker: &str, map: &Tree) -> Option<Result<Node, Diagnostic>> {
    alters.iter().find(|alter| alter.marker() == marker).map(|alter| alter.resolve(map))
}

fn marker_of<'n>(key: &str, node: &'n Node) -> Option<(&'n str, &'n Tree)> {
    let Node::Map(tree) = node else { return None };
    Some((tree.get(key)?.as_str()?, tree))
}

fn rewrite_tree(key: &str, tree: &Tree, resolver: &Resolver<'_>) -> Result<Tree, Diagnostic> {
    tree.iter()
        .map(|(k, v)| rewrite_node(key, v, resolver).map(|v| (k.clone(), v)))
        .collect()
}

fn rewrite_node(key: &str, node: &Node, resolver: &Resolver<'_>) -> Result<Node, Diagnostic> {
    if let Some(resolved) = marker_of(key, node).and_then(|(marker, map)| resolver(marker, map)) {
        return resolved;
    }
    Ok(match node {
        Node::Map(tree) => Node::Map(rewrite_tree(key, tree, resolver)?),
        Node::Seq(items) => {
            Node::Seq(items.iter().map(|item| rewrite_node(key, item, resolver)).collect::<Result<_, _>>()?)
        },
        other => other.clone(),
    })
}

/// Values from a caller-supplied tree, addressed by dotted path.
#[derive(Debug, Clone)]
pub struct UserDictAlter {
    marker: String,
    values: Tree,
}

impl UserDictAlter {
    #[must_use]
    pub fn new(values: Tree) -> Self {
        Self { marker: USER_DICT.to_owned(), values }
    }

    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }
}

impl Alter for UserDictAlter {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn get(&self, path: &str) -> Option<Node> {
        self.values.get(path).or_else(|| self.values.get_path(path)).cloned()
    }
}

/// A snapshot of environment variables. Values are cast from their string form,
/// so `"42"` arrives as an integer.
#[derive(Debug, Clone, Default)]
pub struct EnvAlter {
    vars: Tree,
}

impl EnvAlter {
    /// Snapshots the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    #[must_use]
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (Into::<String>::into(k), Node::Str(v.into()).infer_and_cast()))
            .collect();
        Self { vars }
    }
}

impl Alter for EnvAlter {
    fn marker(&self) -> &str {
        ENV
    }

    fn get(&self, path: &str) -> Option<Node> {
        self.vars.get(path).cloned()
    }
}

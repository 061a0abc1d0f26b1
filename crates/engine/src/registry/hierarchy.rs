//! Navigation and discriminator resolution inside class hierarchies.

use super::{ClassEntry, ClassId, ClassKind, Registry};
use crate::diagnostic::{Detail, Diagnostic, DiagnosticCode, not_a_mapping};
use forma_domain::descriptor::TypeDescriptor;
use forma_tree::Node;
use std::collections::VecDeque;
use tracing::debug;

impl Registry {
    /// The entry `id` was registered under; `None` for roots and records.
    #[must_use]
    pub fn get_direct_parent(&self, id: ClassId) -> Option<ClassId> {
        self.entry(id).and_then(ClassEntry::parent)
    }

    /// Direct children that group further subclasses.
    #[must_use]
    pub fn get_intermediate_children(&self, id: ClassId) -> Vec<ClassId> {
        let Some(entry) = self.entry(id) else { return Vec::new() };
        entry
            .children
            .iter()
            .copied()
            .filter(|&child| {
                self.entry(child).is_some_and(|c| {
                    matches!(c.kind, ClassKind::Intermediate) || !c.children.is_empty()
                })
            })
            .collect()
    }

    /// Every constructible class at or below `id`, shallowest first.
    #[must_use]
    pub fn get_instantiate_children(&self, id: ClassId) -> Vec<ClassId> {
        let mut found = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.entry(current) else { continue };
            if entry.is_concrete() {
                found.push(current);
            }
            queue.extend(entry.children.iter().copied());
        }
        found
    }

    /// Names of every constructible class at or below `id`.
    #[must_use]
    pub fn list_available(&self, id: ClassId) -> Vec<&str> {
        self.get_instantiate_children(id).into_iter().map(|c| self.name(c)).collect()
    }

    /// Discriminators selectable directly below `id`, looking through unnamed intermediates.
    #[must_use]
    pub fn level(&self, id: ClassId) -> Vec<(&str, ClassId)> {
        self.arena().level(id)
    }

    /// Whether `id` is `ancestor` or registered somewhere below it.
    #[must_use]
    pub fn is_subclass(&self, mut id: ClassId, ancestor: ClassId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.get_direct_parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Picks the concrete class a configuration mapping selects, starting at `query`.
    ///
    /// Without a discriminator a constructible `query` selects itself. Otherwise the
    /// discriminator is matched against the level below `query` and resolution descends
    /// as long as the next level matches again. A constructible `query` carrying the same
    /// discriminator selects itself; failing both, the shallowest unique match anywhere
    /// below `query` is used.
    ///
    /// # Errors
    /// * [`DiagnosticCode::Param`] when `node` is not a mapping, the discriminator is not a
    ///   string, it is absent for an abstract `query`, or several classes match at once.
    /// * [`DiagnosticCode::ComplexTypeMismatch`] when nothing below `query` matches.
    pub fn resolve(&self, query: ClassId, node: &Node) -> Result<ClassId, Diagnostic> {
        let name = self.name(query);
        let target = TypeDescriptor::class(name);
        let Node::Map(tree) = node else {
            return Err(not_a_mapping(&target, node));
        };
        let key = &self.config().schema.discriminator_key;

        let discriminator = match tree.get(key) {
            None => {
                if self.entry(query).is_some_and(ClassEntry::is_concrete) {
                    return Ok(query);
                }
                return Err(Diagnostic::new(
                    DiagnosticCode::Param,
                    target.clone(),
                    format!("`{name}` is abstract; `{key}` must select a subclass"),
                )
                .with_node(node)
                .with_details(self.available(query)));
            },
            Some(Node::Str(discriminator)) => discriminator.as_str(),
            Some(other) => {
                return Err(Diagnostic::new(
                    DiagnosticCode::Param,
                    target,
                    format!("`{key}` must be a string, received {}", other.kind()),
                )
                .with_node(node));
            },
        };

        let start = if let Some(child) = self.match_level(query, discriminator) {
            child
        } else if self
            .entry(query)
            .is_some_and(|e| e.is_concrete() && e.discriminator() == Some(discriminator))
        {
            return Ok(query);
        } else {
            self.deep_match(query, discriminator, &target, node)?
        };

        let mut resolved = start;
        while let Some(child) = self.match_level(resolved, discriminator) {
            resolved = child;
        }
        debug!(query = %name, resolved = %self.name(resolved), %discriminator, "Resolved class");
        Ok(resolved)
    }

    /// Name-based resolution, for callers holding a class name.
    ///
    /// # Errors
    /// [`DiagnosticCode::UnrepresentedType`] for unknown names, otherwise see [`Registry::resolve`].
    pub fn resolve_name(&self, query: &str, node: &Node) -> Result<ClassId, Diagnostic> {
        let id = self.class(query).ok_or_else(|| {
            Diagnostic::new(
                DiagnosticCode::UnrepresentedType,
                TypeDescriptor::class(query),
                format!("`{query}` is not registered"),
            )
        })?;
        self.resolve(id, node)
    }

    fn match_level(&self, id: ClassId, discriminator: &str) -> Option<ClassId> {
        self.level(id).into_iter().find(|(d, _)| *d == discriminator).map(|(_, c)| c)
    }

    /// Breadth-first over levels below `query`, skipping the first one.
    fn deep_match(
        &self,
        query: ClassId,
        discriminator: &str,
        target: &TypeDescriptor,
        node: &Node,
    ) -> Result<ClassId, Diagnostic> {
        let mut frontier: Vec<ClassId> = self.level(query).into_iter().map(|(_, c)| c).collect();
        while !frontier.is_empty() {
            let next: Vec<(&str, ClassId)> =
                frontier.iter().flat_map(|&c| self.level(c)).collect();
            let matches: Vec<ClassId> =
                next.iter().filter(|(d, _)| *d == discriminator).map(|(_, c)| *c).collect();
            match matches.as_slice() {
                [] => frontier = next.into_iter().map(|(_, c)| c).collect(),
                [single] => return Ok(*single),
                several => {
                    return Err(Diagnostic::new(
                        DiagnosticCode::Param,
                        target.clone(),
                        format!("`{discriminator}` is ambiguous below `{}`", self.name(query)),
                    )
                    .with_node(node)
                    .with_details(
                        several.iter().map(|&c| Detail::Available(self.name(c).to_owned())),
                    ));
                },
            }
        }
        Err(Diagnostic::new(
            DiagnosticCode::ComplexTypeMismatch,
            target.clone(),
            format!("`{discriminator}` names no subclass of `{}`", self.name(query)),
        )
        .with_node(node)
        .with_details(self.available(query)))
    }

    fn available(&self, query: ClassId) -> Vec<Detail> {
        self.get_instantiate_children(query)
            .into_iter()
            .filter_map(|c| self.entry(c))
            .map(|e| {
                let option = match e.discriminator() {
                    Some(d) => format!("{d} ({})", e.name()),
                    None => format!("<default> ({})", e.name()),
                };
                Detail::Available(option)
            })
            .collect()
    }
}

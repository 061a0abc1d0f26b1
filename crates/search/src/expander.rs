use crate::classes::{GRID_ELEMENT, GRID_SEARCH};
use crate::error::{SearchError, SearchErrorExt};
use crate::space::{Point, SearchSpace};
use forma_domain::constants::SEARCH_KEY;
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::instance::Instance;
use forma_engine::EngineError;
use forma_engine::orchestrator::Orchestrator;
use forma_tree::{Node, Tree};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};

/// Expands a configuration holding a search definition into concrete configurations.
///
/// The orchestrator must know the search hierarchies, see [`crate::register`].
#[derive(Debug, Clone)]
pub struct GridExpander {
    orchestrator: Orchestrator,
    search_key: String,
}

impl GridExpander {
    /// # Errors
    /// Returns [`SearchError::Configuration`] if the registry lacks the search classes.
    pub fn new(orchestrator: Orchestrator) -> Result<Self, SearchError> {
        if let Some(missing) =
            [GRID_SEARCH, GRID_ELEMENT].into_iter().find(|name| orchestrator.registry().class(name).is_none())
        {
            return Err(SearchError::Configuration {
                message: Cow::Owned(format!("`{missing}` is not registered")),
                context: None,
            });
        }
        Ok(Self { orchestrator, search_key: SEARCH_KEY.to_owned() })
    }

    /// Reads the search definition from `key` instead of `"search"`.
    #[must_use]
    pub fn with_search_key(mut self, key: impl Into<String>) -> Self {
        self.search_key = key.into();
        self
    }

    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Builds a search definition into its space.
    ///
    /// # Errors
    /// Returns [`SearchError::Engine`] if `node` is not a valid `GridSearch` or `GridElement`.
    pub fn space(&self, node: &Node) -> Result<SearchSpace, SearchError> {
        let target = TypeDescriptor::union([TypeDescriptor::class(GRID_SEARCH), TypeDescriptor::class(GRID_ELEMENT)]);
        let space: Arc<SearchSpace> = self.orchestrator.build(&target, node).context("Invalid search definition")?;
        Ok(SearchSpace::clone(&space))
    }

    /// Splits `tree` into the configuration without its search key and the points to apply.
    ///
    /// A tree without a search key is a single empty point.
    ///
    /// # Errors
    /// See [`GridExpander::space`] and [`crate::Space::points`].
    pub fn points(&self, tree: &Tree) -> Result<(Tree, Vec<Point>), SearchError> {
        let mut base = tree.clone();
        let Some(search) = base.remove(&self.search_key) else {
            debug!(key = %self.search_key, "No search definition");
            return Ok((base, vec![Point::new()]));
        };
        let points = self.space(&search)?.points()?;
        Ok((base, points))
    }

    /// Expands `tree` and type checks every resulting configuration against `target`.
    ///
    /// Points are applied in order; each override writes its dotted path into a
    /// copy of the configuration, creating intermediate mappings as needed.
    ///
    /// # Errors
    /// * [`SearchError::Engine`] for an invalid search definition or a point whose
    ///   configuration does not conform to `target`.
    /// * [`SearchError::Tree`] if an override path runs through a scalar.
    /// * [`SearchError::Kernel`] if a file point cannot be loaded.
    pub fn expand(&self, target: &TypeDescriptor, tree: &Tree) -> Result<Vec<Tree>, SearchError> {
        let (base, points) = self.points(tree)?;
        info!(%target, points = points.len(), "Expanding search space");

        points
            .into_iter()
            .enumerate()
            .map(|(index, point)| -> Result<Tree, SearchError> {
                let mut config = base.clone();
                for (path, value) in point {
                    config.insert_path(&path, value).context(format!("Failed to apply point {index}"))?;
                }
                if let Some(diagnostic) = self.orchestrator.type_check(target, &Node::Map(config.clone())) {
                    return Err(EngineError::from(diagnostic)).context(format!("Point {index} is invalid"));
                }
                debug!(index, hash = %config.content_hash(), "Expanded configuration");
                Ok(config)
            })
            .collect()
    }

    /// Expands `tree` and builds every configuration as `target`.
    ///
    /// # Errors
    /// See [`GridExpander::expand`]; construction failures are reported with the point index.
    pub fn instantiate(&self, target: &TypeDescriptor, tree: &Tree) -> Result<Vec<Instance>, SearchError> {
        self.expand(target, tree)?
            .into_iter()
            .enumerate()
            .map(|(index, config)| {
                self.orchestrator
                    .from_obj(target, &Node::Map(config))
                    .context(format!("Failed to build point {index}"))
            })
            .collect()
    }
}

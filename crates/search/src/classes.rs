//! Registers the search hierarchies with a [`RegistryBuilder`].
//!
//! ```text
//! GridElement ── base_grid (BaseGrid) ── id_grid (IdGrid, a template for a one-value base_grid)
//! GridSearch  ─┬ base_grid_search (BaseGridSearch)
//!              ├ list_grid_search (ListGridSearch)
//!              └ file_grid_search (FileGridSearch)
//! ```

use crate::space::{Concat, Files, Grid, Product, SearchSpace};
use forma_domain::descriptor::TypeDescriptor;
use forma_domain::error::InstanceError;
use forma_domain::instance::{Arguments, FromInstance, Instance};
use forma_engine::EngineError;
use forma_engine::model::ConstructorModel;
use forma_engine::registry::{ClassSpec, RegistryBuilder};
use forma_tree::{Node, Tree};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Root of composed search spaces.
pub const GRID_SEARCH: &str = "GridSearch";
/// Root of single search components.
pub const GRID_ELEMENT: &str = "GridElement";

/// Adds the `GridElement` and `GridSearch` hierarchies.
///
/// # Errors
/// Returns [`EngineError::Configuration`] if any of the class names or
/// discriminators is already taken in `builder`.
pub fn register(builder: &RegistryBuilder) -> Result<(), EngineError> {
    let keys = TypeDescriptor::union([TypeDescriptor::str(), TypeDescriptor::sequence(TypeDescriptor::str())]);
    let component =
        TypeDescriptor::union([TypeDescriptor::class(GRID_ELEMENT), TypeDescriptor::class(GRID_SEARCH)]);

    builder.root(ClassSpec::new(GRID_ELEMENT))?;
    builder.register(
        GRID_ELEMENT,
        "base_grid",
        ClassSpec::new("BaseGrid")
            .model(
                ConstructorModel::new()
                    .inherit()
                    .param("keys", keys.clone())
                    .param("values", TypeDescriptor::sequence(TypeDescriptor::any())),
            )
            .constructor(|args| {
                let keys = take_keys(args)?;
                Ok(SearchSpace::new(Grid::new(keys, args.take::<Vec<Node>>("values")?)))
            }),
    )?;
    builder.register(
        "BaseGrid",
        "id_grid",
        ClassSpec::new("IdGrid")
            .model(ConstructorModel::new().param("keys", keys).param("value", TypeDescriptor::any()))
            .template(|args| {
                let mut grid = Tree::new();
                grid.insert("type", "base_grid");
                grid.insert("keys", args.get("keys").cloned().unwrap_or_default());
                grid.insert("values", vec![args.get("value").cloned().unwrap_or_default()]);
                Ok(grid)
            }),
    )?;

    builder.root(ClassSpec::new(GRID_SEARCH))?;
    builder.register(
        GRID_SEARCH,
        "base_grid_search",
        ClassSpec::new("BaseGridSearch")
            .model(ConstructorModel::new().inherit().param("search_space", TypeDescriptor::sequence(component)))
            .constructor(|args| Ok(SearchSpace::new(Product::new(take_spaces(args)?)))),
    )?;
    builder.register(
        GRID_SEARCH,
        "list_grid_search",
        ClassSpec::new("ListGridSearch")
            .model(
                ConstructorModel::new()
                    .inherit()
                    .param("search_space", TypeDescriptor::sequence(TypeDescriptor::class(GRID_SEARCH))),
            )
            .constructor(|args| Ok(SearchSpace::new(Concat::new(take_spaces(args)?)))),
    )?;
    builder.register(
        GRID_SEARCH,
        "file_grid_search",
        ClassSpec::new("FileGridSearch")
            .model(
                ConstructorModel::new()
                    .inherit()
                    .param("filenames", TypeDescriptor::sequence(TypeDescriptor::str())),
            )
            .constructor(|args| {
                let paths = args.take::<Vec<String>>("filenames")?;
                Ok(SearchSpace::new(Files::new(paths.into_iter().map(PathBuf::from).collect())))
            }),
    )?;

    debug!("Registered grid search classes");
    Ok(())
}

/// `keys` is either one key or a list of keys.
fn take_keys(args: &mut Arguments) -> Result<Vec<String>, InstanceError> {
    match args.take::<Instance>("keys")? {
        Instance::Str(key) => Ok(vec![key]),
        other => Vec::<String>::from_instance(other),
    }
}

fn take_spaces(args: &mut Arguments) -> Result<Vec<SearchSpace>, InstanceError> {
    let spaces = args.take::<Vec<Arc<SearchSpace>>>("search_space")?;
    Ok(spaces.iter().map(|space| SearchSpace::clone(space)).collect())
}

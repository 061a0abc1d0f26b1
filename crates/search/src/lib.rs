//! # Grid search
//!
//! Expands one configuration into many. The sweep itself is configuration: it
//! lives under the `"search"` key and is checked and built by the engine like
//! any other hierarchy.
//!
//! - `base_grid`: `keys` (one or many dotted paths) take each of `values` in turn.
//! - `id_grid`: `keys` take a single `value`.
//! - `base_grid_search`: cartesian product of its `search_space`.
//! - `list_grid_search`: concatenation of its `search_space`.
//! - `file_grid_search`: one point per JSON/TOML document in `filenames`.
//!
//! ## Example
//! ```rust
//! use forma_domain::descriptor::TypeDescriptor;
//! use forma_engine::prelude::*;
//! use forma_search::prelude::*;
//! use forma_tree::{Node, Tree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = RegistryBuilder::new();
//! forma_search::register(&builder)?;
//! builder.record(
//!     ClassSpec::new("Run")
//!         .model(ConstructorModel::new().param("lr", TypeDescriptor::float()))
//!         .constructor(|args| Ok(args.take::<f64>("lr")?)),
//! )?;
//! let expander = GridExpander::new(Orchestrator::new(builder.build()))?;
//!
//! let config = Tree::from_json(
//!     r#"{"lr": 0.1, "search": {"type": "base_grid_search", "search_space": [
//!         {"type": "base_grid", "keys": "lr", "values": [0.1, 0.01, 0.001]}
//!     ]}}"#,
//! )?;
//! let runs = expander.expand(&TypeDescriptor::class("Run"), &config)?;
//!
//! assert_eq!(runs.len(), 3);
//! assert_eq!(runs[2].get("lr"), Some(&Node::Float(0.001)));
//! assert!(!runs[0].contains_key("search"));
//! # Ok(())
//! # }
//! ```

mod classes;
mod error;
mod expander;
pub mod prelude;
pub mod space;

pub use classes::{GRID_ELEMENT, GRID_SEARCH, register};
pub use error::{SearchError, SearchErrorExt};
pub use expander::GridExpander;
pub use space::{Point, SearchSpace, Space};

//! Registry-driven type checking and construction for configuration trees.
//!
//! Classes are declared once on a [`RegistryBuilder`](registry::RegistryBuilder) with an
//! explicit [`ConstructorModel`](model::ConstructorModel) and a factory closure. The
//! frozen [`Registry`](registry::Registry) then backs an [`Orchestrator`](orchestrator::Orchestrator),
//! which dispatches every target type to the first [`Unit`](unit::Unit) that accepts it.
//!
//! - `type_check` never fails; it returns an optional [`Diagnostic`](diagnostic::Diagnostic).
//! - `from_obj` checks first and builds only if the whole configuration conforms.
//!
//! ```rust
//! use forma_domain::descriptor::TypeDescriptor;
//! use forma_engine::prelude::*;
//! use forma_tree::Tree;
//!
//! #[derive(Debug)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! let builder = RegistryBuilder::new();
//! builder
//!     .record(
//!         ClassSpec::new("Point")
//!             .model(ConstructorModel::new().param("x", TypeDescriptor::int()).param("y", TypeDescriptor::int()))
//!             .constructor(|args| Ok(Point { x: args.take("x")?, y: args.take("y")? })),
//!     )
//!     .unwrap();
//! let orchestrator = Orchestrator::new(builder.build());
//!
//! let tree = Tree::from_json(r#"{"x": 1, "y": 2}"#).unwrap();
//! let point = orchestrator.from_obj(&TypeDescriptor::class("Point"), &tree.into()).unwrap();
//! let point = point.as_object().and_then(|o| o.downcast_ref::<Point>()).unwrap();
//! assert_eq!((point.x, point.y), (1, 2));
//! ```

pub mod alter;
pub mod constructor;
pub mod diagnostic;
mod error;
pub mod model;
pub mod orchestrator;
pub mod prelude;
pub mod registry;
pub mod scope;
pub mod unit;

pub use error::{EngineError, EngineErrorExt};

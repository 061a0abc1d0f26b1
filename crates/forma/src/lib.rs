//! Facade crate for Forma.
//! Re-exports the tree, domain, kernel and engine crates and wires the optional collaborators.
//! Keep this crate thin: it composes the other crates, it does not implement engine logic.
//!
//! ## Usage
//! ```rust
//! use forma::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = forma::init(None::<&str>)?;
//! builder.record(
//!     ClassSpec::new("Point")
//!         .model(ConstructorModel::new().param("x", TypeDescriptor::int()).param("y", TypeDescriptor::int()))
//!         .constructor(|args| Ok((args.take::<i64>("x")?, args.take::<i64>("y")?))),
//! )?;
//! let orchestrator = forma::orchestrator(builder.build());
//!
//! let config = Tree::from_json(r#"{"x": 1, "y": {"type": "user_dict", "key": "y"}}"#)?;
//! assert!(orchestrator.type_check(&TypeDescriptor::class("Point"), &Node::Map(config)).is_some());
//! # Ok(())
//! # }
//! ```

pub use forma_domain as domain;
pub use forma_engine as engine;
pub use forma_kernel as kernel;
#[cfg(feature = "search")]
pub use forma_search as search;
pub use forma_tree as tree;

pub mod prelude;

use forma_engine::alter::EnvAlter;
use forma_engine::orchestrator::Orchestrator;
use forma_engine::registry::{Registry, RegistryBuilder};
use std::path::Path;
use tracing::info;

/// Collaborators compiled into this build.
pub mod features {
    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "search")]
        "search",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Loads engine settings and prepares a registry builder with every enabled collaborator registered.
///
/// Settings come from the optional file at `settings` layered under
/// `FORMA__`-prefixed environment variables.
///
/// # Errors
/// Returns an error if the settings cannot be loaded or a collaborator fails to register.
pub fn init(settings: Option<impl AsRef<Path>>) -> Result<RegistryBuilder, Box<dyn std::error::Error>> {
    let config = kernel::config::load_engine_config(settings)?;
    let builder = RegistryBuilder::with_config(config);

    #[cfg(feature = "search")]
    search::register(&builder)?;

    info!(features = ?features::ENABLED, "Forma initialized");
    Ok(builder)
}

/// The default orchestrator over `registry`, with environment markers (`{"type": "ENV", ...}`) resolved.
#[must_use]
pub fn orchestrator(registry: Registry) -> Orchestrator {
    Orchestrator::builder(registry).alter(EnvAlter::from_env()).build()
}

pub use forma_domain::config::EngineConfig;
pub use forma_domain::descriptor::{DependentMode, TypeDescriptor};
pub use forma_domain::instance::{Arguments, FromInstance, Instance, Member, Object};
pub use forma_engine::prelude::*;
pub use forma_tree::{Node, Tree};

#[cfg(feature = "search")]
pub use forma_search::{GridExpander, SearchError, SearchSpace, Space};

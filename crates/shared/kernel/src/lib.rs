//! Kernel utilities shared across the workspace.
//! Keep this crate lightweight; it covers settings loading and document ingestion.
//!
//! ## Config loading
//! ```rust,ignore
//! use forma_kernel::config::load_engine_config;
//! let cfg = load_engine_config(Some("forma.toml")).unwrap();
//! ```
//!
//! ## Documents
//! ```rust,ignore
//! use forma_kernel::document::load_document;
//! let tree = load_document("experiment.json").unwrap();
//! ```

pub mod config;
pub mod document;
mod error;
pub mod prelude;

pub use error::{KernelError, KernelErrorExt};
pub use forma_domain as domain;

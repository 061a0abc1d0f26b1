//! Ordered configuration trees.
//!
//! A [`Tree`] is the in-memory form of a configuration document: a string-keyed
//! mapping whose values are [`Node`]s (scalars, sequences or nested trees).
//!
//! ## Features
//! - **Order preserving**: keys iterate and serialize in insertion order.
//! - **Flatten/unflatten**: dotted-path form (`"model.optimizer.lr"`) that round-trips.
//! - **Deep merge**: overlay one tree onto another.
//! - **Stable hashing**: a SHA-256 content digest that ignores key order.
//! - **Absent vs null**: [`Tree::get`] returns `None` for a missing key and
//!   `Some(&Node::Null)` for an explicit null.
//!
//! ## Example
//! ```rust
//! use forma_tree::{Node, Tree};
//!
//! # fn main() -> Result<(), forma_tree::TreeError> {
//! let base = Tree::from_json(r#"{"model": {"type": "linear", "lr": 0.1}}"#)?;
//! let overlay = Tree::from_json(r#"{"model": {"lr": 0.01}}"#)?;
//!
//! let merged = base.deep_merge(&overlay);
//! assert_eq!(merged.get_path("model.lr"), Some(&Node::Float(0.01)));
//!
//! let flat = merged.flatten();
//! assert_eq!(Tree::unflatten(flat)?, merged);
//! # Ok(())
//! # }
//! ```

mod error;
mod hash;
mod node;
mod tree;

pub use error::{TreeError, TreeErrorExt};
pub use indexmap::IndexMap;
pub use node::Node;
pub use tree::{SEPARATOR, Tree};

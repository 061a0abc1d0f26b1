//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `indexmap`, `thiserror`).
//! Keep it lean: no I/O and no engine logic, just data and simple helpers.
//!
//! - [`descriptor`]: the closed set of target types ([`TypeDescriptor`](descriptor::TypeDescriptor)).
//! - [`instance`]: values produced by construction and the [`Arguments`](instance::Arguments) view factories read from.
//! - [`config`]: engine settings, deserializable from any `serde` source.

pub mod config;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod instance;

pub use forma_tree as tree;

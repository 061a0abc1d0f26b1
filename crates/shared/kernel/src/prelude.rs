pub use crate::config::{load_config, load_engine_config};
pub use crate::document::{Format, load_document, parse_document, store_document};
pub use crate::error::{KernelError, KernelErrorExt};

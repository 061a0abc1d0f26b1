//! Configuration document ingestion.
//!
//! Documents are read into a [`Tree`] keeping the key order of the source file.
//! The format follows the file extension: `.json` or `.toml`.

use crate::error::{KernelError, KernelErrorExt};
use forma_tree::Tree;
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    /// Returns [`KernelError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, KernelError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(KernelError::UnsupportedFormat {
                message: Cow::Owned(format!(
                    "`{}` has extension {other:?}, expected json or toml",
                    path.display()
                )),
                context: None,
            }),
        }
    }
}

/// Parses a document from text.
///
/// # Errors
/// Returns a decode error when `text` is not a valid document of `format`.
pub fn parse_document(text: &str, format: Format) -> Result<Tree, KernelError> {
    match format {
        Format::Json => Tree::from_json(text).context("Failed to parse JSON document"),
        Format::Toml => toml::from_str::<Tree>(text).context("Failed to parse TOML document"),
    }
}

/// Reads a configuration document from disk.
///
/// # Errors
/// * [`KernelError::UnsupportedFormat`] for unknown extensions.
/// * [`KernelError::Io`] if the file cannot be read.
/// * A decode error if the content is malformed.
pub fn load_document(path: impl AsRef<Path>) -> Result<Tree, KernelError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path).context("Failed to read document")?;
    debug!(path = %path.display(), ?format, "Loaded document");
    parse_document(&text, format)
}

/// Writes a configuration document to disk in the format named by its extension.
///
/// TOML has no null; trees holding null values only store as JSON.
///
/// # Errors
/// * [`KernelError::UnsupportedFormat`] for unknown extensions.
/// * An encode error if the tree cannot be represented.
/// * [`KernelError::Io`] if the file cannot be written.
pub fn store_document(tree: &Tree, path: impl AsRef<Path>) -> Result<(), KernelError> {
    let path = path.as_ref();
    let text = match Format::from_path(path)? {
        Format::Json => tree.to_json().context("Failed to render JSON document")?,
        Format::Toml => toml::to_string(tree).context("Failed to render TOML document")?,
    };
    std::fs::write(path, text).context("Failed to write document")
}

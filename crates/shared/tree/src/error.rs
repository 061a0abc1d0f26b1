//! # Tree Errors
//!
//! This module defines the [`TreeError`] enum used by path access, flattening and
//! (de)serialization of configuration trees.

use std::borrow::Cow;

/// Failures raised while addressing, rebuilding or serializing a [`Tree`](crate::Tree).
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A dotted path was empty or contained an empty segment.
    #[error("Invalid path{}: {message}", format_context(.context))]
    InvalidPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two flattened entries claim the same location, or a path runs through a leaf.
    #[error("Path conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// JSON encoding or decoding failed.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues.
    #[error("Internal tree error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait TreeErrorExt<T> {
    /// Attaches a human readable context to the error.
    ///
    /// # Errors
    /// Returns the original error with `context` recorded.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, TreeError>;
}

impl<T> TreeErrorExt<T> for Result<T, TreeError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                TreeError::InvalidPath { context: c, .. }
                | TreeError::Conflict { context: c, .. }
                | TreeError::Serialization { context: c, .. }
                | TreeError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> TreeErrorExt<T> for Result<T, serde_json::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, TreeError> {
        self.map_err(|source| TreeError::Serialization { source, context: Some(context.into()) })
    }
}

impl From<serde_json::Error> for TreeError {
    #[inline]
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization { source, context: None }
    }
}

impl From<&'static str> for TreeError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for TreeError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

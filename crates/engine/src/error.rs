use crate::diagnostic::Diagnostic;
use forma_domain::error::InstanceError;
use forma_tree::TreeError;
use std::borrow::Cow;

/// Failures surfaced by registration, checking and construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration does not conform to the target type.
    #[error("Type check failed{}: {diagnostic}", format_context(.context))]
    TypeCheck { diagnostic: Box<Diagnostic>, context: Option<Cow<'static, str>> },

    /// Registration misuse: duplicate names, bad parents, malformed models.
    #[error("Configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A class factory refused the resolved arguments.
    #[error("Construction failed{}: {message}", format_context(.context))]
    Construction { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Instance error{}: {source}", format_context(.context))]
    Instance { source: InstanceError, context: Option<Cow<'static, str>> },

    #[error("Tree error{}: {source}", format_context(.context))]
    Tree { source: TreeError, context: Option<Cow<'static, str>> },

    #[error("Internal engine error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl EngineError {
    /// The diagnostic behind a [`EngineError::TypeCheck`] failure.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::TypeCheck { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    pub(crate) fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Configuration { message: message.into(), context: None }
    }

    /// Shorthand for factories that reject their arguments.
    #[must_use]
    pub fn construction(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Construction { message: message.into(), context: None }
    }
}

pub trait EngineErrorExt<T> {
    /// Attaches a human readable context to the error.
    ///
    /// # Errors
    /// Returns the original error converted into [`EngineError`] with `context` recorded.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EngineError>;
}

impl<T> EngineErrorExt<T> for Result<T, EngineError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                EngineError::TypeCheck { context: c, .. }
                | EngineError::Configuration { context: c, .. }
                | EngineError::Construction { context: c, .. }
                | EngineError::Instance { context: c, .. }
                | EngineError::Tree { context: c, .. }
                | EngineError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> EngineErrorExt<T> for Result<T, InstanceError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EngineError> {
        self.map_err(|source| EngineError::Instance { source, context: Some(context.into()) })
    }
}

impl<T> EngineErrorExt<T> for Result<T, TreeError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EngineError> {
        self.map_err(|source| EngineError::Tree { source, context: Some(context.into()) })
    }
}

impl<T> EngineErrorExt<T> for Result<T, Diagnostic> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EngineError> {
        self.map_err(|d| EngineError::TypeCheck { diagnostic: Box::new(d), context: Some(context.into()) })
    }
}

impl From<Diagnostic> for EngineError {
    #[inline]
    fn from(diagnostic: Diagnostic) -> Self {
        Self::TypeCheck { diagnostic: Box::new(diagnostic), context: None }
    }
}

impl From<InstanceError> for EngineError {
    #[inline]
    fn from(source: InstanceError) -> Self {
        Self::Instance { source, context: None }
    }
}

impl From<TreeError> for EngineError {
    #[inline]
    fn from(source: TreeError) -> Self {
        Self::Tree { source, context: None }
    }
}

impl From<&'static str> for EngineError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for EngineError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

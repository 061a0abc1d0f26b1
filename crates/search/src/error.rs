use forma_engine::EngineError;
use forma_kernel::KernelError;
use forma_tree::TreeError;
use std::borrow::Cow;

/// Failures while building or expanding a search space.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Checking or building the search definition, or one of its points, failed.
    #[error("Engine error{}: {source}", format_context(.context))]
    Engine { source: EngineError, context: Option<Cow<'static, str>> },

    /// A file referenced by a file search could not be loaded.
    #[error("Kernel error{}: {source}", format_context(.context))]
    Kernel { source: KernelError, context: Option<Cow<'static, str>> },

    /// A point override could not be written into the configuration.
    #[error("Tree error{}: {source}", format_context(.context))]
    Tree { source: TreeError, context: Option<Cow<'static, str>> },

    /// The registry behind the expander lacks the search hierarchies.
    #[error("Configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal search error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait SearchErrorExt<T> {
    /// Attaches a human readable context to the error.
    ///
    /// # Errors
    /// Returns the original error converted into [`SearchError`] with `context` recorded.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SearchError>;
}

impl<T> SearchErrorExt<T> for Result<T, SearchError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                SearchError::Engine { context: c, .. }
                | SearchError::Kernel { context: c, .. }
                | SearchError::Tree { context: c, .. }
                | SearchError::Configuration { context: c, .. }
                | SearchError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

macro_rules! source_variant {
    ($variant:ident, $source:ty) => {
        impl From<$source> for SearchError {
            #[inline]
            fn from(source: $source) -> Self {
                Self::$variant { source, context: None }
            }
        }

        impl<T> SearchErrorExt<T> for Result<T, $source> {
            #[inline]
            fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SearchError> {
                self.map_err(|source| SearchError::$variant { source, context: Some(context.into()) })
            }
        }
    };
}

source_variant!(Engine, EngineError);
source_variant!(Kernel, KernelError);
source_variant!(Tree, TreeError);

impl From<&'static str> for SearchError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for SearchError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

use forma_tree::TreeError;
use std::borrow::Cow;

/// Failures while loading settings or configuration documents.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Tree error{}: {source}", format_context(.context))]
    Tree { source: TreeError, context: Option<Cow<'static, str>> },

    #[error("TOML decode error{}: {source}", format_context(.context))]
    TomlDecode { source: toml::de::Error, context: Option<Cow<'static, str>> },

    #[error("TOML encode error{}: {source}", format_context(.context))]
    TomlEncode { source: toml::ser::Error, context: Option<Cow<'static, str>> },

    /// The file extension does not name a supported document format.
    #[error("Unsupported format{}: {message}", format_context(.context))]
    UnsupportedFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal kernel error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait KernelErrorExt<T> {
    /// Attaches a human readable context to the error.
    ///
    /// # Errors
    /// Returns the original error converted into [`KernelError`] with `context` recorded.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KernelError>;
}

impl<T> KernelErrorExt<T> for Result<T, KernelError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                KernelError::Config { context: c, .. }
                | KernelError::Io { context: c, .. }
                | KernelError::Tree { context: c, .. }
                | KernelError::TomlDecode { context: c, .. }
                | KernelError::TomlEncode { context: c, .. }
                | KernelError::UnsupportedFormat { context: c, .. }
                | KernelError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

macro_rules! source_variant {
    ($variant:ident, $source:ty) => {
        impl From<$source> for KernelError {
            #[inline]
            fn from(source: $source) -> Self {
                Self::$variant { source, context: None }
            }
        }

        impl<T> KernelErrorExt<T> for Result<T, $source> {
            #[inline]
            fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KernelError> {
                self.map_err(|source| KernelError::$variant { source, context: Some(context.into()) })
            }
        }
    };
}

source_variant!(Config, config::ConfigError);
source_variant!(Io, std::io::Error);
source_variant!(Tree, TreeError);
source_variant!(TomlDecode, toml::de::Error);
source_variant!(TomlEncode, toml::ser::Error);

impl From<&'static str> for KernelError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for KernelError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

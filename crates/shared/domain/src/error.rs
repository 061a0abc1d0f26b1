use std::borrow::Cow;

/// Failures while reading constructor arguments out of [`Arguments`](crate::instance::Arguments).
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    /// The argument was not supplied.
    #[error("Missing argument{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The argument exists but holds a different kind of value.
    #[error("Argument mismatch{}: {message}", format_context(.context))]
    Mismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues.
    #[error("Internal instance error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait InstanceErrorExt<T> {
    /// Attaches a human readable context to the error.
    ///
    /// # Errors
    /// Returns the original error with `context` recorded.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, InstanceError>;
}

impl<T> InstanceErrorExt<T> for Result<T, InstanceError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                InstanceError::Missing { context: c, .. }
                | InstanceError::Mismatch { context: c, .. }
                | InstanceError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl From<&'static str> for InstanceError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for InstanceError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

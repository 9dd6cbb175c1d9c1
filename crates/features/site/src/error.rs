use std::borrow::Cow;

/// A specialized [`SiteError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The script bundle declaration is inconsistent.
    #[error("Bootstrap error{}: {message}", format_context(.context))]
    Bootstrap { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// A value could not be serialized into the page.
    #[error("Render error{}: {source}", format_context(.context))]
    Render { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl SiteError {
    pub(crate) fn bootstrap(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Bootstrap { message: message.into(), context: None }
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(source: serde_json::Error) -> Self {
        Self::Render { source, context: None }
    }
}

/// Attaches context to a failed site operation.
pub trait SiteErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SiteError>;
}

impl<T, E: Into<SiteError>> SiteErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SiteError> {
        self.map_err(|e| {
            let mut e = e.into();
            match &mut e {
                SiteError::Bootstrap { context: c, .. }
                | SiteError::Render { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

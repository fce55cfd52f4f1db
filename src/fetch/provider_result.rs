use std::sync::Arc;

/// Outcome of fetching one piece of per-repository data.
///
/// Only `Found` carries data; the other variants explain why a repository has to make do
/// without it.
#[derive(Debug, Clone)]
pub enum ProviderResult<T> {
    /// The data was fetched.
    Found(T),

    /// The data does not exist upstream (missing repository, no usable image, ...).
    Unavailable(Arc<str>),

    /// The data exists but failed validation (wrong content type, too large, ...).
    Rejected(Arc<str>),

    /// A transport, decoding or timeout error.
    Error(Arc<ohno::AppError>),
}

impl<T> ProviderResult<T> {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert into an `Option`, dropping the reason.
    #[must_use]
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn unavailable(reason: impl Into<Arc<str>>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub(crate) fn rejected(reason: impl Into<Arc<str>>) -> Self {
        Self::Rejected(reason.into())
    }

    pub(crate) fn error(error: ohno::AppError) -> Self {
        Self::Error(Arc::new(error))
    }
}

impl<T> core::fmt::Display for ProviderResult<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Found(_) => write!(f, "found"),
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Error(e) => write!(f, "error: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[test]
    fn test_is_found() {
        assert!(ProviderResult::Found(1).is_found());
        assert!(!ProviderResult::<u32>::unavailable("gone").is_found());
        assert!(!ProviderResult::<u32>::rejected("too big").is_found());
        assert!(!ProviderResult::<u32>::error(app_err!("boom")).is_found());
    }

    #[test]
    fn test_found_drops_reason() {
        assert_eq!(ProviderResult::Found("x").found(), Some("x"));
        assert_eq!(ProviderResult::<&str>::rejected("nope").found(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProviderResult::<u8>::rejected("not an image").to_string(), "rejected: not an image");
        assert_eq!(ProviderResult::<u8>::unavailable("no readme").to_string(), "unavailable: no readme");
        assert!(ProviderResult::<u8>::error(app_err!("timeout")).to_string().contains("timeout"));
    }
}

use crate::context::ContextError;
use thiserror::Error;

/// A boxed error returned by [`Resource::test`](crate::Resource::test).
///
/// Adapters return their own error types through it; callers can recover
/// them with `downcast_ref`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by methods in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty.
    #[error("{name:?}: invalid argument")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// The resource location could not be parsed as a URL.
    #[error("invalid resource url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// No registered resource handles this scheme.
    #[error("resource with scheme {0:?} is not supported")]
    UnsupportedScheme(String),
    /// A resource test failed.
    #[error("{url}: {source}")]
    Resource {
        /// The tested location, password redacted.
        url: String,
        /// Whatever the resource returned.
        source: BoxError,
    },
    /// The context was cancelled or its deadline elapsed.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(name: &'static str) -> Self {
        Error::InvalidArgument { name }
    }

    /// Whether this is the invalid-argument sentinel, regardless of which
    /// parameter it names.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_the_parameter() {
        let err = Error::invalid_argument("url");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "\"url\": invalid argument");
    }

    #[test]
    fn other_errors_are_not_invalid_argument() {
        let err = Error::UnsupportedScheme("redis".into());
        assert!(!err.is_invalid_argument());
        assert!(!Error::from(ContextError::Canceled).is_invalid_argument());
    }
}

use std::error::Error as StdError;
use std::fmt;

/// Broad category of an [`Error`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// Input is not a syntactically valid URL.
    Parse,
    /// Configuration or input was rejected before any URL work was done.
    Validation,
    /// A parameter value has no defined string form.
    Stringification,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Parse => f.write_str("parse error"),
            Kind::Validation => f.write_str("validation error"),
            Kind::Stringification => f.write_str("parameter stringification error"),
        }
    }
}

/// Error returned by every fallible operation in this crate.
///
/// The [`Kind`] tells callers what went wrong; the boxed source carries the
/// details (a [`url::ParseError`], [`Validation`] or [`Stringification`]).
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl Error {
    /// Wraps `source` as an error of the given kind.
    #[must_use]
    pub fn with_source<E>(kind: Kind, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self {
            kind,
            inner: source.into(),
        }
    }

    /// A [`Kind::Validation`] error with a human readable reason.
    #[must_use]
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Self::with_source(
            Kind::Validation,
            Validation {
                reason: reason.into(),
            },
        )
    }

    pub(crate) fn stringification<K: Into<String>>(key: K, reason: &'static str) -> Self {
        Self::with_source(
            Kind::Stringification,
            Stringification {
                key: key.into(),
                reason,
            },
        )
    }

    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The underlying error.
    #[must_use]
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    /// Returns the underlying error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.inner)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::with_source(Kind::Parse, e)
    }
}

/// Rejected configuration or input, with a human readable reason.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl StdError for Validation {}

/// A parameter whose value cannot be rendered deterministically.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stringification {
    pub key: String,
    pub reason: &'static str,
}

impl fmt::Display for Stringification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter `{}`: {}", self.key, self.reason)
    }
}

impl StdError for Stringification {}

mod adhoc;
mod duplicate_statement;
mod invalid_config;
mod invalid_query;
mod mapping;
mod unsupported_capability;

use adhoc::AdhocError;
use duplicate_statement::DuplicateStatement;
use invalid_config::InvalidConfig;
use invalid_query::InvalidQuery;
use mapping::MappingError;
use std::sync::Arc;
use unsupported_capability::UnsupportedCapability;

/// Returns early with an ad-hoc error built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error raised while building domain models or compiling statements.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// is shown first, followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let kind = match consequent.inner {
            Some(inner) => match Arc::try_unwrap(inner) {
                Ok(inner) => inner.kind,
                // Shared consequent: keep its message, drop its identity
                Err(shared) => ErrorKind::Adhoc(AdhocError::new(shared.kind.to_string())),
            },
            None => ErrorKind::Unknown,
        };

        Error {
            inner: Some(Arc::new(ErrorInner {
                kind,
                cause: Some(self),
            })),
        }
    }

    pub(crate) fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    /// Returns `true` if this error, or any error in its cause chain, matches
    /// the predicate.
    fn any_kind(&self, f: impl Fn(&ErrorKind) -> bool) -> bool {
        self.chain().any(|err| f(err.kind()))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    Mapping(MappingError),
    UnsupportedCapability(UnsupportedCapability),
    InvalidQuery(InvalidQuery),
    InvalidConfig(InvalidConfig),
    DuplicateStatement(DuplicateStatement),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Mapping(err) => core::fmt::Display::fmt(err, f),
            UnsupportedCapability(err) => core::fmt::Display::fmt(err, f),
            InvalidQuery(err) => core::fmt::Display::fmt(err, f),
            InvalidConfig(err) => core::fmt::Display::fmt(err, f),
            DuplicateStatement(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown tabula error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Error {
        Error::invalid_config(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_one_pointer_wide() {
        assert_eq!(core::mem::size_of::<Error>(), core::mem::size_of::<usize>());
    }

    #[test]
    fn context_is_displayed_outermost_first() {
        let err = Error::unsupported_capability("sequences", "mysql")
            .context(err!("resolving key generator of `Invoice.id`"))
            .context(err!("building domain model for `Invoice`"));

        assert_eq!(
            err.to_string(),
            "building domain model for `Invoice`: resolving key generator of `Invoice.id`: \
             unsupported capability: dialect `mysql` does not support sequences"
        );
        assert!(err.is_unsupported_capability());
    }

    #[test]
    fn toml_errors_are_config_errors() {
        let err: Error = toml::from_str::<toml::Value>("dialect = ").unwrap_err().into();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn mapping_error_names_entity_and_property() {
        let err = Error::mapping("Post", "author", "no column `uid` in target `User`");
        assert_eq!(
            err.to_string(),
            "mapping error in `Post.author`: no column `uid` in target `User`"
        );
        assert!(err.is_mapping());
        assert!(!err.is_unsupported_capability());
    }

    #[test]
    fn mapping_error_survives_context() {
        let err = Error::mapping("Post", "id", "composite key member is an association")
            .context(err!("building domain model for `Blog`"));

        assert!(err.is_mapping());
        assert_eq!(
            err.to_string(),
            "building domain model for `Blog`: mapping error in `Post.id`: composite key member is an association"
        );
    }

    #[test]
    fn unsupported_capability_names_capability() {
        let err = Error::unsupported_capability("regex predicate", "derby");
        assert_eq!(
            err.to_string(),
            "unsupported capability: dialect `derby` does not support regex predicate"
        );
        assert!(err.is_unsupported_capability());
    }

    #[test]
    fn duplicate_statement_is_recoverable() {
        let err = Error::duplicate_statement("ShopRepository.findByName");
        assert!(err.is_duplicate_statement());
        assert_eq!(
            err.to_string(),
            "statement `ShopRepository.findByName` is already registered"
        );
    }

    #[test]
    fn invalid_query_error() {
        let err = Error::invalid_query("UserRepository.search", "unterminated placeholder");
        assert_eq!(
            err.to_string(),
            "invalid query `UserRepository.search`: unterminated placeholder"
        );
    }
}

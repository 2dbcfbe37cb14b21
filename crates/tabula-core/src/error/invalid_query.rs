use super::Error;

/// Error when a logical query description cannot be compiled.
///
/// Raised for predicates naming unknown properties, malformed placeholders in
/// declared queries, and constructor expressions with no matching
/// constructor.
#[derive(Debug)]
pub(super) struct InvalidQuery {
    statement: Box<str>,
    message: Box<str>,
}

impl std::error::Error for InvalidQuery {}

impl core::fmt::Display for InvalidQuery {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid query `{}`: {}", self.statement, self.message)
    }
}

impl Error {
    /// Creates an invalid query error for the named statement.
    pub fn invalid_query(statement: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidQuery(InvalidQuery {
            statement: statement.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error, or one of its causes, is an invalid query
    /// error.
    pub fn is_invalid_query(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidQuery(_)))
    }
}

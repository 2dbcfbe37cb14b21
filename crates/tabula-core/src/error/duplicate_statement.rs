use super::Error;

/// Raised when a statement key is registered a second time.
///
/// Compilation is triggered lazily and may race; callers treat this error as
/// "already compiled".
#[derive(Debug)]
pub(super) struct DuplicateStatement {
    id: Box<str>,
}

impl std::error::Error for DuplicateStatement {}

impl core::fmt::Display for DuplicateStatement {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "statement `{}` is already registered", self.id)
    }
}

impl Error {
    /// Creates a duplicate statement error for the given statement key.
    pub fn duplicate_statement(id: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DuplicateStatement(DuplicateStatement {
            id: id.into().into(),
        }))
    }

    /// Returns `true` if this error is a duplicate statement error.
    pub fn is_duplicate_statement(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DuplicateStatement(_))
    }
}

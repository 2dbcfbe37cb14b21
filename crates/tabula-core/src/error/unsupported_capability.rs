use super::Error;

/// Error when the active dialect lacks a capability a mapping or query needs.
///
/// Callers can match on [`Error::is_unsupported_capability`] to degrade
/// deliberately, e.g. by falling back to a LIKE predicate when regex matching
/// is unavailable.
#[derive(Debug)]
pub(super) struct UnsupportedCapability {
    capability: Box<str>,
    dialect: Box<str>,
}

impl std::error::Error for UnsupportedCapability {}

impl core::fmt::Display for UnsupportedCapability {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unsupported capability: dialect `{}` does not support {}",
            self.dialect, self.capability
        )
    }
}

impl Error {
    /// Creates an unsupported capability error naming the capability and the
    /// dialect that lacks it.
    pub fn unsupported_capability(
        capability: impl Into<String>,
        dialect: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::UnsupportedCapability(
            UnsupportedCapability {
                capability: capability.into().into(),
                dialect: dialect.into().into(),
            },
        ))
    }

    /// Returns `true` if this error, or one of its causes, is an unsupported
    /// capability error.
    pub fn is_unsupported_capability(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnsupportedCapability(_)))
    }
}

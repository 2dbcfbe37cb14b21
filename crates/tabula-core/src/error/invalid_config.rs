use super::Error;

/// Error when configuration cannot be parsed or names an unknown dialect.
#[derive(Debug)]
pub(super) struct InvalidConfig {
    message: Box<str>,
}

impl std::error::Error for InvalidConfig {}

impl core::fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidConfig(InvalidConfig {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid configuration error.
    pub fn is_invalid_config(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidConfig(_)))
    }
}

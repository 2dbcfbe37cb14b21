use super::Error;

/// Error when a domain class cannot be mapped to a relational shape.
///
/// This occurs when:
/// - A join column references a column that does not exist in the target
/// - An entity declares no primary key, or declares more than one kind
/// - A composite or embedded id contains an unsupported member
/// - An association targets a class the metadata provider does not know
///
/// Mapping errors are fatal for the entity they name.
#[derive(Debug)]
pub(super) struct MappingError {
    entity: Box<str>,
    property: Option<Box<str>>,
    message: Box<str>,
}

impl std::error::Error for MappingError {}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match &self.property {
            Some(property) => write!(
                f,
                "mapping error in `{}.{}`: {}",
                self.entity, property, self.message
            ),
            None => write!(f, "mapping error in `{}`: {}", self.entity, self.message),
        }
    }
}

impl Error {
    /// Creates a mapping error for a property of an entity.
    pub fn mapping(
        entity: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::Mapping(MappingError {
            entity: entity.into().into(),
            property: Some(property.into().into()),
            message: message.into().into(),
        }))
    }

    /// Creates a mapping error that concerns the entity as a whole.
    pub fn mapping_entity(entity: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Mapping(MappingError {
            entity: entity.into().into(),
            property: None,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error, or one of its causes, is a mapping error.
    pub fn is_mapping(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Mapping(_)))
    }
}

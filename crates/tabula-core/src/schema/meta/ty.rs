use super::ClassId;

/// Declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Char,
    Bytes,
    Date,
    Time,
    Timestamp,
    Uuid,

    /// An enumeration, stored by name or ordinal.
    Enum,

    /// Another domain class: an entity or an embeddable.
    Class(ClassId),

    /// A collection of values.
    List(Box<ValueType>),
}

impl ValueType {
    pub fn list(item: ValueType) -> ValueType {
        ValueType::List(Box::new(item))
    }

    /// The class named by this type, looking through collections.
    pub fn class(&self) -> Option<&ClassId> {
        match self {
            ValueType::Class(id) => Some(id),
            ValueType::List(item) => item.class(),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ValueType::List(_))
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, ValueType::Class(_) | ValueType::List(_))
    }

    /// Types usable as an optimistic locking version.
    pub fn is_version(&self) -> bool {
        matches!(
            self,
            ValueType::I16 | ValueType::I32 | ValueType::I64 | ValueType::Timestamp
        )
    }
}

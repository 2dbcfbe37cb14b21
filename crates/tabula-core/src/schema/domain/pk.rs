use super::ColumnId;
use crate::{dialect::KeyGenerator, schema::meta::ClassId};

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    pub kind: PrimaryKeyKind,

    /// Columns composing the primary key, in declaration order.
    pub columns: Vec<ColumnId>,

    /// Key generation, for single-column keys with a generated value.
    pub generator: Option<KeyGenerator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKeyKind {
    /// One id property.
    Single { property: String },

    /// Several id properties.
    Composite { properties: Vec<String> },

    /// One embeddable id property whose members are the key columns.
    Embedded { property: String, class: ClassId },
}

impl PrimaryKey {
    pub fn is_single(&self) -> bool {
        matches!(self.kind, PrimaryKeyKind::Single { .. })
    }

    /// Property the key value binds to when fetched or passed as one value.
    pub fn property(&self) -> Option<&str> {
        match &self.kind {
            PrimaryKeyKind::Single { property } | PrimaryKeyKind::Embedded { property, .. } => {
                Some(property)
            }
            PrimaryKeyKind::Composite { .. } => None,
        }
    }
}

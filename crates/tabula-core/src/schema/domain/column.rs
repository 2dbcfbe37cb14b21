use super::SqlType;
use crate::{dialect::Identifier, schema::meta::ValueType};

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Position of the column in its table.
    pub id: ColumnId,

    /// The name of the column in the database.
    pub name: Identifier,

    /// Dotted property path the column is bound to, e.g. `address.city` or
    /// `author.id` for a foreign key column.
    pub property: String,

    /// The declared type of the bound property.
    pub ty: ValueType,

    pub sql_type: SqlType,

    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,

    pub nullable: bool,
    pub unique: bool,

    /// False if the column is left out of generated inserts.
    pub insertable: bool,

    /// False if the column is left out of generated updates.
    pub updatable: bool,

    /// True if the column is part of the table's primary key
    pub primary_key: bool,

    /// True if the column holds the optimistic locking version.
    pub version: bool,

    /// Value converter applied when binding and reading the column.
    pub converter: Option<String>,

    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Bound to a scalar property, possibly nested in embeddables.
    Basic,

    /// Foreign key column synthesized or declared for a to-one association.
    JoinColumn {
        /// Name of the owning association property.
        association: String,
    },
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ColumnId(pub usize);

impl Column {
    pub fn is_join_column(&self) -> bool {
        matches!(self.kind, ColumnKind::JoinColumn { .. })
    }

    /// Leaf property name.
    pub fn property_name(&self) -> &str {
        self.property.rsplit('.').next().unwrap_or(&self.property)
    }
}

impl From<&Column> for ColumnId {
    fn from(value: &Column) -> Self {
        value.id
    }
}

impl fmt::Debug for ColumnId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ColumnId({})", self.0)
    }
}

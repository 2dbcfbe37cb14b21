//! The relational shape of a domain class.

mod association;
pub use association::{
    Association, AssociationKind, FetchMode, ForeignKey, ForeignKeySide, JoinColumn,
    JoinDefinition, JoinTable,
};

mod column;
pub use column::{Column, ColumnId, ColumnKind};

mod pk;
pub use pk::{PrimaryKey, PrimaryKeyKind};

mod sql_type;
pub use sql_type::SqlType;

mod table;
pub use table::Table;

use super::meta::ClassId;

use indexmap::IndexMap;

/// Immutable relational model of one entity class.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub class: ClassId,

    /// Entity name, the class name without its path.
    pub name: String,

    pub table: Table,

    pub primary_key: PrimaryKey,

    /// Optimistic locking version column.
    pub version: Option<ColumnId>,

    pub associations: Vec<Association>,

    /// Embeddables flattened into this table.
    pub embedded: Vec<Embedding>,

    /// Dotted property path to column.
    pub(crate) lookup: IndexMap<String, ColumnId>,
}

/// An embeddable flattened into its owner's table.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// Property on the owner (or enclosing embeddable).
    pub property: String,

    /// Full dotted path from the entity.
    pub path: String,

    pub class: ClassId,

    /// Prefix for column aliases of this embedding, derived from the path.
    pub alias: String,

    /// Columns directly bound to the embeddable's own properties.
    pub columns: Vec<ColumnId>,

    pub nested: Vec<Embedding>,
}

impl Domain {
    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        self.table.column(id)
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &Column> {
        self.table.columns.iter()
    }

    /// Finds the column bound to a dotted property path.
    pub fn column_by_path(&self, path: &str) -> Option<&Column> {
        self.lookup.get(path).map(|id| self.column(*id))
    }

    /// Resolves a reference written either as a dotted property path or as a
    /// physical column name.
    pub fn resolve_column(&self, reference: &str) -> Option<&Column> {
        self.column_by_path(reference)
            .or_else(|| self.table.column_by_name(reference))
    }

    pub fn association(&self, property: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|association| association.property == property)
    }

    pub fn primary_key_columns(&self) -> impl ExactSizeIterator<Item = &Column> + '_ {
        self.primary_key.columns.iter().map(|id| self.column(*id))
    }

    pub fn version_column(&self) -> Option<&Column> {
        self.version.map(|id| self.column(id))
    }

    /// Columns written by a full insert.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns().filter(|column| column.insertable)
    }

    /// Non-key columns written by a full update.
    pub fn updatable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns()
            .filter(|column| column.updatable && !column.primary_key)
    }

    pub fn embedding(&self, path: &str) -> Option<&Embedding> {
        fn find<'a>(embedded: &'a [Embedding], path: &str) -> Option<&'a Embedding> {
            embedded.iter().find_map(|embedding| {
                if embedding.path == path {
                    Some(embedding)
                } else {
                    find(&embedding.nested, path)
                }
            })
        }

        find(&self.embedded, path)
    }
}

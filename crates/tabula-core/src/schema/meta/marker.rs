use super::ClassId;
use crate::{
    dialect::GenerationType,
    schema::{FetchMode, SqlType},
};

/// A declarative marker on a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Column(ColumnMarker),

    /// The property is (part of) the primary key.
    Id,

    /// The property is an embeddable holding every primary key column.
    EmbeddedId,

    GeneratedValue {
        strategy: GenerationType,

        /// Name of a [`SequenceGenerator`] declared on the property or class.
        generator: Option<String>,
    },

    SequenceGenerator(SequenceGenerator),

    ManyToOne(RelationMarker),
    OneToOne(RelationMarker),
    OneToMany(RelationMarker),
    ManyToMany(RelationMarker),

    /// One column of a (possibly composite) foreign key. Repeat the marker for
    /// composite keys.
    JoinColumn(JoinColumnMarker),

    JoinTable(JoinTableMarker),

    Fetch(FetchMode),

    /// The property is an embeddable flattened into the owner's table.
    Embedded,

    /// Optimistic locking version.
    Version,

    /// The property is not persisted.
    Transient,

    /// Large object: CLOB for text, BLOB for bytes.
    Lob,

    Temporal(TemporalType),

    /// Explicit SQL type code, overriding the type lookup.
    SqlType(SqlType),

    /// Name of a value converter applied to the column.
    Convert(String),

    Enumerated(EnumType),

    /// Ordering applied to collection associations, as SQL.
    OrderBy(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMarker {
    pub name: Option<String>,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
    pub unique: bool,
    pub insertable: bool,
    pub updatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMarker {
    pub name: Option<String>,
    pub schema: Option<String>,
    pub catalog: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGenerator {
    /// Name referenced by [`Marker::GeneratedValue`].
    pub name: String,

    /// Physical sequence name.
    pub sequence_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationMarker {
    /// Target class, when it cannot be read from the property type.
    pub target: Option<ClassId>,

    /// Property on the target that owns the relationship.
    pub mapped_by: Option<String>,

    pub fetch: Option<FetchMode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumnMarker {
    pub name: Option<String>,

    /// Column on the referenced side, by dotted property path or column name.
    pub referenced_column: Option<String>,

    pub nullable: bool,
    pub insertable: bool,
    pub updatable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinTableMarker {
    pub name: Option<String>,

    /// Columns referencing the owning side.
    pub join_columns: Vec<JoinColumnMarker>,

    /// Columns referencing the target side.
    pub inverse_join_columns: Vec<JoinColumnMarker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalType {
    Date,
    Time,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumType {
    Ordinal,
    String,
}

impl ColumnMarker {
    pub fn named(name: &str) -> ColumnMarker {
        ColumnMarker {
            name: Some(name.to_string()),
            ..ColumnMarker::default()
        }
    }
}

impl Default for ColumnMarker {
    fn default() -> Self {
        ColumnMarker {
            name: None,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
        }
    }
}

impl TableMarker {
    pub fn named(name: &str) -> TableMarker {
        TableMarker {
            name: Some(name.to_string()),
            schema: None,
            catalog: None,
        }
    }
}

impl RelationMarker {
    pub fn mapped_by(property: &str) -> RelationMarker {
        RelationMarker {
            mapped_by: Some(property.to_string()),
            ..RelationMarker::default()
        }
    }
}

impl JoinColumnMarker {
    pub fn new(name: &str, referenced_column: Option<&str>) -> JoinColumnMarker {
        JoinColumnMarker {
            name: Some(name.to_string()),
            referenced_column: referenced_column.map(str::to_string),
            ..JoinColumnMarker::default()
        }
    }
}

impl Default for JoinColumnMarker {
    fn default() -> Self {
        JoinColumnMarker {
            name: None,
            referenced_column: None,
            nullable: true,
            insertable: true,
            updatable: true,
        }
    }
}

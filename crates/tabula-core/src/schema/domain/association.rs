use crate::{dialect::Identifier, schema::meta::ClassId};

use serde::Deserialize;

/// A relationship from one domain model to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    /// Property on the owner holding the association.
    pub property: String,

    pub kind: AssociationKind,

    /// Target class. Its domain model is obtained from the metamodel; keeping
    /// the identity rather than the model lets associations be cyclic.
    pub target: ClassId,

    pub fetch: FetchMode,

    /// Property on the target that owns the relationship, for inverse sides.
    pub mapped_by: Option<String>,

    /// SQL ordering applied to collection loads.
    pub order_by: Option<String>,

    pub join: JoinDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// How an association is loaded together with its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// A separate nested select per owner row.
    #[default]
    Select,

    /// Inlined into the owner's select with an outer join.
    Join,
}

/// Physical linkage between owner and target.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinDefinition {
    ForeignKey(ForeignKey),
    JoinTable(JoinTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    /// Table holding the foreign key columns.
    pub side: ForeignKeySide,

    pub columns: Vec<JoinColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeySide {
    /// Columns live in the owner's table and reference the target.
    Owner,

    /// Columns live in the target's table and reference the owner.
    Target,
}

/// One column pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumn {
    /// The foreign key column.
    pub column: Identifier,

    /// The referenced column on the other side.
    pub referenced: Identifier,

    /// Dotted property path of the referenced column.
    pub referenced_property: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinTable {
    pub table: Identifier,

    /// Join table columns referencing the owner.
    pub owner_columns: Vec<JoinColumn>,

    /// Join table columns referencing the target.
    pub target_columns: Vec<JoinColumn>,
}

impl Association {
    pub fn is_collection(&self) -> bool {
        matches!(
            self.kind,
            AssociationKind::OneToMany | AssociationKind::ManyToMany
        )
    }

    /// True if the owner's table holds the foreign key.
    pub fn is_owning(&self) -> bool {
        match &self.join {
            JoinDefinition::ForeignKey(fk) => fk.side == ForeignKeySide::Owner,
            JoinDefinition::JoinTable(_) => self.mapped_by.is_none(),
        }
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        match &self.join {
            JoinDefinition::ForeignKey(fk) => Some(fk),
            JoinDefinition::JoinTable(_) => None,
        }
    }

    pub fn join_table(&self) -> Option<&JoinTable> {
        match &self.join {
            JoinDefinition::JoinTable(join_table) => Some(join_table),
            JoinDefinition::ForeignKey(_) => None,
        }
    }
}

impl JoinTable {
    /// The same join table seen from the target side.
    pub fn inverse(&self) -> JoinTable {
        JoinTable {
            table: self.table.clone(),
            owner_columns: self.target_columns.clone(),
            target_columns: self.owner_columns.clone(),
        }
    }
}

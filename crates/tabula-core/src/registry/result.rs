use super::StatementId;
use crate::schema::{ClassId, SqlType};

use std::sync::Arc;

/// Describes how result rows map back to objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultShape {
    /// Identifier of the shape, unique within a namespace.
    pub id: String,

    pub kind: ResultKind,

    /// Column to property mappings. For constructors, in argument order.
    pub mappings: Vec<ResultMapping>,

    /// Associations loaded by the same select through a join.
    pub nested: Vec<NestedShape>,

    /// Associations loaded by a separate statement per row.
    pub nested_selects: Vec<NestedSelect>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    /// Rows map to an entity.
    Entity(ClassId),

    /// Rows are passed positionally to a constructor.
    Constructor { class: ClassId, arity: usize },

    /// A single value per row, e.g. a count.
    Scalar(SqlType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMapping {
    /// Column label in the result set.
    pub column: String,

    /// Dotted property path, or the argument expression for constructors.
    pub property: String,

    pub sql_type: SqlType,

    /// True for identifying columns.
    pub id: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedShape {
    pub property: String,
    pub collection: bool,

    /// Prefix of the nested columns' labels.
    pub column_prefix: String,

    pub shape: Arc<ResultShape>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedSelect {
    pub property: String,
    pub collection: bool,
    pub statement: StatementId,

    /// `(parameter, column)` pairs: the nested statement's parameter bound to
    /// a column of the owner's row.
    pub arguments: Vec<(String, String)>,
}

impl ResultShape {
    pub fn entity(id: impl Into<String>, class: ClassId) -> ResultShape {
        ResultShape {
            id: id.into(),
            kind: ResultKind::Entity(class),
            mappings: vec![],
            nested: vec![],
            nested_selects: vec![],
        }
    }

    pub fn scalar(id: impl Into<String>, sql_type: SqlType) -> ResultShape {
        ResultShape {
            id: id.into(),
            kind: ResultKind::Scalar(sql_type),
            mappings: vec![],
            nested: vec![],
            nested_selects: vec![],
        }
    }

    pub fn mapping(&self, property: &str) -> Option<&ResultMapping> {
        self.mappings
            .iter()
            .find(|mapping| mapping.property == property)
    }
}

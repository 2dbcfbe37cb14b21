use super::{Expr, TableRef};

use tabula_core::dialect::Identifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<InsertColumn>,

    /// Only columns whose value is non-null are written.
    pub selective: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertColumn {
    pub name: Identifier,
    pub value: Expr,

    /// Property path tested for null in selective inserts. Columns without a
    /// test are always written.
    pub test: Option<String>,
}

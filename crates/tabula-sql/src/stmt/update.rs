use super::{Expr, TableRef};

use tabula_core::dialect::Identifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub filter: Option<Expr>,

    /// Only assignments whose value is non-null are applied.
    pub selective: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Identifier,
    pub value: Expr,

    /// Property path tested for null in selective updates.
    pub test: Option<String>,
}

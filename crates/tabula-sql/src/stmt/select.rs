use super::{ColumnRef, Expr, TableRef};

use tabula_core::stmt::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projection: Projection,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderTerm>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Columns(Vec<SelectItem>),

    /// `COUNT(*)`
    Count,

    /// `1`, for existence checks.
    One,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub column: ColumnRef,

    /// Result label, when it differs from the column name.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub expr: Expr,
    pub direction: Direction,
}

impl Select {
    pub fn new(from: TableRef, projection: Projection) -> Select {
        Select {
            distinct: false,
            projection,
            from,
            joins: vec![],
            filter: None,
            order_by: vec![],
        }
    }
}

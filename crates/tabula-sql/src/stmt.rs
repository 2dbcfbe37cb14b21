mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{BinaryOp, Expr, Foreach};

mod insert;
pub use insert::{Insert, InsertColumn};

mod select;
pub use select::{Join, JoinKind, OrderTerm, Projection, Select, SelectItem};

mod table_ref;
pub use table_ref::{ColumnRef, TableRef};

mod update;
pub use update::{Assignment, Update};

use tabula_core::registry::StatementKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Delete(Delete),
    Insert(Insert),
    Select(Select),
    Update(Update),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Delete(_) => StatementKind::Delete,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Select(_) => StatementKind::Select,
            Statement::Update(_) => StatementKind::Update,
        }
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

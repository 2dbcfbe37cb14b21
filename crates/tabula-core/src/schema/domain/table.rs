use super::{Column, ColumnId};
use crate::dialect::{Dialect, Identifier};

/// A physical table and every column mapped into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub schema: Option<Identifier>,
    pub catalog: Option<Identifier>,
    pub name: Identifier,

    /// Alias used when the table participates in a join.
    pub alias: String,

    pub columns: Vec<Column>,
}

impl Table {
    pub(crate) fn new(name: Identifier, alias: String) -> Table {
        Table {
            schema: None,
            catalog: None,
            name,
            alias,
            columns: vec![],
        }
    }

    pub fn column(&self, id: impl Into<ColumnId>) -> &Column {
        &self.columns[id.into().0]
    }

    /// Finds a column by its physical name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name.matches(name))
    }

    /// Renders `catalog.schema.name` with the dialect's quoting.
    pub fn qualified_name(&self, dialect: &Dialect) -> String {
        let mut ret = String::new();

        for part in [&self.catalog, &self.schema].into_iter().flatten() {
            ret.push_str(&dialect.ident(part));
            ret.push('.');
        }

        ret.push_str(&dialect.ident(&self.name));
        ret
    }
}

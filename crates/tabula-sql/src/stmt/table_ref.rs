use tabula_core::{dialect::Identifier, schema::Table};

/// A table in a FROM, JOIN or DML target position.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub catalog: Option<Identifier>,
    pub schema: Option<Identifier>,
    pub name: Identifier,

    /// Correlation name, when the statement qualifies its columns.
    pub alias: Option<String>,
}

/// A column, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub name: Identifier,
}

impl TableRef {
    pub fn new(table: &Table) -> TableRef {
        TableRef {
            catalog: table.catalog.clone(),
            schema: table.schema.clone(),
            name: table.name.clone(),
            alias: None,
        }
    }

    /// A bare table name, e.g. a join table.
    pub fn named(name: Identifier) -> TableRef {
        TableRef {
            catalog: None,
            schema: None,
            name,
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> TableRef {
        self.alias = Some(alias.into());
        self
    }

    /// A column of this table, qualified by its alias if it has one.
    pub fn column(&self, name: &Identifier) -> ColumnRef {
        ColumnRef {
            qualifier: self.alias.clone(),
            name: name.clone(),
        }
    }
}

impl ColumnRef {
    pub fn new(name: &Identifier) -> ColumnRef {
        ColumnRef {
            qualifier: None,
            name: name.clone(),
        }
    }
}

mod result;
pub use result::{NestedSelect, NestedShape, ResultKind, ResultMapping, ResultShape};

mod statement;
pub use statement::{CompiledStatement, KeyFetch, StatementId, StatementKind};

use crate::{Error, Result};

use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// Compiled statements keyed by `(namespace, name)`, shared with the
/// execution layer for the lifetime of the process.
#[derive(Debug, Default)]
pub struct StatementRegistry {
    statements: DashMap<StatementId, Arc<CompiledStatement>>,
}

/// Outcome of [`StatementRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,

    /// A statement with the same id was registered first; the new one was
    /// dropped.
    AlreadyPresent,
}

impl StatementRegistry {
    pub fn new() -> StatementRegistry {
        StatementRegistry::default()
    }

    /// Registers `statement` unless its id is taken. The check and the insert
    /// are one atomic step per key.
    pub fn register(&self, statement: CompiledStatement) -> Registration {
        match self.statements.entry(statement.id.clone()) {
            Entry::Occupied(_) => {
                tracing::trace!(id = %statement.id, "statement already registered");
                Registration::AlreadyPresent
            }
            Entry::Vacant(entry) => {
                tracing::debug!(id = %statement.id, kind = ?statement.kind, "registered statement");
                tracing::trace!(id = %statement.id, sql = %statement.sql);
                entry.insert(Arc::new(statement));
                Registration::Inserted
            }
        }
    }

    /// Like [`register`](Self::register), but a taken id is an error.
    pub fn try_register(&self, statement: CompiledStatement) -> Result<()> {
        let id = statement.id.clone();

        match self.register(statement) {
            Registration::Inserted => Ok(()),
            Registration::AlreadyPresent => Err(Error::duplicate_statement(id.to_string())),
        }
    }

    pub fn contains(&self, id: &StatementId) -> bool {
        self.statements.contains_key(id)
    }

    pub fn get(&self, id: &StatementId) -> Option<Arc<CompiledStatement>> {
        self.statements.get(id).map(|statement| statement.value().clone())
    }

    pub fn lookup(&self, namespace: &str, name: &str) -> Option<Arc<CompiledStatement>> {
        self.get(&StatementId::new(namespace, name))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<StatementId> {
        let mut ids: Vec<_> = self
            .statements
            .iter()
            .map(|statement| statement.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Registered statements of one namespace, sorted by name.
    pub fn namespace(&self, namespace: &str) -> Vec<Arc<CompiledStatement>> {
        let mut statements: Vec<_> = self
            .statements
            .iter()
            .filter(|statement| statement.key().namespace == namespace)
            .map(|statement| statement.value().clone())
            .collect();
        statements.sort_by(|a, b| a.id.cmp(&b.id));
        statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_statement(name: &str, sql: &str) -> CompiledStatement {
        CompiledStatement::new(
            StatementId::new("ShopRepository", name),
            StatementKind::Select,
            sql,
        )
    }

    #[test]
    fn second_registration_is_a_no_op() {
        let registry = StatementRegistry::new();

        assert_eq!(
            registry.register(make_statement("findAll", "SELECT 1")),
            Registration::Inserted
        );
        assert_eq!(
            registry.register(make_statement("findAll", "SELECT 2")),
            Registration::AlreadyPresent
        );

        let statement = registry.lookup("ShopRepository", "findAll").unwrap();
        assert_eq!(statement.sql, "SELECT 1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn try_register_reports_duplicates() {
        let registry = StatementRegistry::new();
        registry.try_register(make_statement("a", "SELECT 1")).unwrap();

        let err = registry
            .try_register(make_statement("a", "SELECT 1"))
            .unwrap_err();
        assert!(err.is_duplicate_statement());
    }

    #[test]
    fn namespace_listing_is_sorted() {
        let registry = StatementRegistry::new();
        registry.register(make_statement("b", "SELECT 1"));
        registry.register(make_statement("a", "SELECT 1"));
        registry.register(CompiledStatement::new(
            StatementId::new("Other", "c"),
            StatementKind::Select,
            "SELECT 1",
        ));

        let names: Vec<_> = registry
            .namespace("ShopRepository")
            .iter()
            .map(|statement| statement.id.name.clone())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(registry.ids().len(), 3);
    }
}

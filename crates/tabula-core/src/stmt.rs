//! Logical query descriptions consumed by the precompiler.
//!
//! Parsing method names or reading annotations happens upstream; these types
//! are the already-parsed result.

mod declared;
pub use declared::{DeclaredQuery, ParamDecl};

mod predicate;
pub use predicate::{AndGroup, InArg, Operator, Paging, Part, PredicateQuery, Subject};

mod sort;
pub use sort::{Direction, Order};

/// A query to compile for one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Predicate(PredicateQuery),
    Declared(DeclaredQuery),
}

impl Query {
    /// Statement name inside the namespace.
    pub fn name(&self) -> &str {
        match self {
            Query::Predicate(query) => &query.name,
            Query::Declared(query) => &query.name,
        }
    }
}

impl From<PredicateQuery> for Query {
    fn from(value: PredicateQuery) -> Self {
        Query::Predicate(value)
    }
}

impl From<DeclaredQuery> for Query {
    fn from(value: DeclaredQuery) -> Self {
        Query::Declared(value)
    }
}

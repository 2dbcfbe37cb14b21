mod mapper;
pub use mapper::{Builder, Tabula};

pub use tabula_core::{
    config::{self, CaseFolding},
    dialect, registry,
    schema::{self, ClassId, Domain, MetadataProvider, MetadataRegistry},
    stmt::{self, DeclaredQuery, PredicateQuery, Query},
    Config, Dialect, Error, Metamodel, Result, StatementRegistry,
};

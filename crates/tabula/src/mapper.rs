mod builder;
pub use builder::Builder;

use tabula_core::{
    registry::CompiledStatement,
    schema::{ClassId, Domain},
    stmt::Query,
    Dialect, Metamodel, Result, StatementRegistry,
};
use tabula_sql::Precompiler;

use std::sync::Arc;

/// Shared state between all `Tabula` clones.
#[derive(Debug)]
struct Shared {
    metamodel: Metamodel,
    registry: StatementRegistry,
}

/// Entry point to the mapping metamodel and the compiled statements.
///
/// Cloning is cheap; clones share domain models and registered statements.
#[derive(Debug, Clone)]
pub struct Tabula {
    shared: Arc<Shared>,
}

impl Tabula {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The domain model of `class`, built on first request.
    #[tracing::instrument(skip(self))]
    pub fn domain_model(&self, class: &ClassId) -> Result<Arc<Domain>> {
        self.shared.metamodel.domain_model(class)
    }

    pub fn dialect(&self) -> &Dialect {
        self.shared.metamodel.dialect()
    }

    pub fn metamodel(&self) -> &Metamodel {
        &self.shared.metamodel
    }

    /// Compiles `query` for `class` into `namespace` and returns the
    /// registered statement.
    #[tracing::instrument(skip(self, query))]
    pub fn compile(
        &self,
        namespace: &str,
        class: &ClassId,
        query: impl Into<Query>,
    ) -> Result<Arc<CompiledStatement>> {
        let query = query.into();
        self.precompiler().compile(namespace, class, &query)?;

        self.statement(namespace, query.name())
    }

    /// Compiles the base statements of `class` into `namespace`.
    pub fn compile_entity(&self, namespace: &str, class: &ClassId) -> Result<()> {
        self.precompiler().compile_entity(namespace, class)
    }

    pub fn registry(&self) -> &StatementRegistry {
        &self.shared.registry
    }

    /// A registered statement by namespace and name.
    pub fn statement(&self, namespace: &str, name: &str) -> Result<Arc<CompiledStatement>> {
        self.shared
            .registry
            .lookup(namespace, name)
            .ok_or_else(|| tabula_core::err!("statement `{namespace}.{name}` is not registered"))
    }

    fn precompiler(&self) -> Precompiler<'_> {
        Precompiler::new(&self.shared.metamodel, &self.shared.registry)
    }
}

mod declared;
mod entity;
mod predicate;
mod result;
mod scope;

use crate::{Serializer, Statement};

use tabula_core::{
    dialect::Bound,
    err,
    registry::{CompiledStatement, ResultShape, StatementId, StatementRegistry},
    schema::ClassId,
    stmt::Query,
    Metamodel, Result,
};

use std::sync::Arc;

/// Bind parameter carrying the first row of a page.
const OFFSET_PARAM: &str = "offset";

/// Bind parameter carrying the page size.
const PAGE_SIZE_PARAM: &str = "pageSize";

/// Suffix of the paginated sibling of a select.
const PAGED_SUFFIX: &str = "__paged";

/// Suffix of the count sibling of a select.
const COUNT_SUFFIX: &str = "__count";

/// Suffix of the select run before a delete that returns deleted rows.
const SELECT_SUFFIX: &str = "__select";

/// Turns logical query descriptions into registered SQL templates.
///
/// Compilation is idempotent per `(namespace, name)`: a query whose
/// statement is already registered is skipped, and losing a registration
/// race against another thread counts as success.
#[derive(Debug)]
pub struct Precompiler<'a> {
    metamodel: &'a Metamodel,
    registry: &'a StatementRegistry,
    serializer: Serializer<'a>,
}

impl<'a> Precompiler<'a> {
    pub fn new(metamodel: &'a Metamodel, registry: &'a StatementRegistry) -> Precompiler<'a> {
        Precompiler {
            metamodel,
            registry,
            serializer: Serializer::new(metamodel.dialect(), metamodel.config()),
        }
    }

    /// Compiles `query` against the domain model of `class` into `namespace`,
    /// along with the entity's base statements.
    pub fn compile(&self, namespace: &str, class: &ClassId, query: &Query) -> Result<()> {
        let id = StatementId::new(namespace, query.name());

        if self.registry.contains(&id) {
            tracing::trace!(%id, "already compiled");
            return Ok(());
        }

        self.compile_entity(namespace, class)?;

        let domain = self.metamodel.domain_model(class)?;

        let statements = match query {
            Query::Predicate(query) => self.predicate(&domain, &id, query),
            Query::Declared(query) => self.declared(&domain, &id, query),
        }
        .map_err(|err| err.context(err!("compiling `{id}`")))?;

        tracing::debug!(%id, statements = statements.len(), "compiled query");
        self.publish(&id, statements)
    }

    /// Compiles the base statements of `class` (insert, update, delete and
    /// lookups by id, nested association selects) into `namespace`.
    pub fn compile_entity(&self, namespace: &str, class: &ClassId) -> Result<()> {
        let marker = StatementId::new(namespace, entity::INSERT);

        if self.registry.contains(&marker) {
            return Ok(());
        }

        let domain = self.metamodel.domain_model(class)?;

        let statements = self
            .entity(&domain, namespace)
            .map_err(|err| err.context(err!("compiling base statements of `{class}`")))?;

        tracing::debug!(
            namespace,
            entity = %domain.name,
            statements = statements.len(),
            "compiled entity statements"
        );
        self.publish(&marker, statements)
    }

    /// Registers compiled statements, `marker` last. `compile` and
    /// `compile_entity` test for the marker, so a query is only seen as
    /// compiled once all of its siblings are in.
    fn publish(&self, marker: &StatementId, statements: Vec<CompiledStatement>) -> Result<()> {
        let (marker, siblings): (Vec<_>, Vec<_>) = statements
            .into_iter()
            .partition(|statement| statement.id == *marker);

        for statement in siblings.into_iter().chain(marker) {
            if let Err(err) = self.registry.try_register(statement) {
                if !err.is_duplicate_statement() {
                    return Err(err);
                }

                tracing::trace!(%err, "statement registered concurrently");
            }
        }

        Ok(())
    }

    fn statement(
        &self,
        id: StatementId,
        stmt: &Statement,
        result: Option<Arc<ResultShape>>,
    ) -> CompiledStatement {
        let sql = self.serializer.serialize(stmt);
        let mut compiled = CompiledStatement::new(id, stmt.kind(), sql);
        compiled.result = result;
        compiled
    }

    /// `sql` paginated with runtime offset and page size binds.
    fn paged(&self, sql: &str) -> String {
        self.metamodel.dialect().paginate(
            sql,
            Some(&Bound::placeholder(format!("#{{{OFFSET_PARAM}}}"))),
            &Bound::placeholder(format!("#{{{PAGE_SIZE_PARAM}}}")),
        )
    }
}

/// Name of the count statement accompanying the paged `name`.
fn count_name(name: &str) -> String {
    format!("{name}{COUNT_SUFFIX}")
}

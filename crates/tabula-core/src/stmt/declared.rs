/// A query written by hand against the entity's properties and tables.
///
/// Placeholders `?1`, `:name`, `:#{expr}` and `?#{expr}` are rewritten to
/// bind syntax; `#{#entityName}` expands to the entity's table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredQuery {
    pub name: String,
    pub sql: String,

    /// Method parameters, in positional order.
    pub params: Vec<ParamDecl>,

    /// Explicit count query for paged execution.
    pub count_sql: Option<String>,

    /// The query modifies rows (UPDATE / DELETE / INSERT).
    pub modifying: bool,

    /// A count companion is compiled for paged execution.
    pub paged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,

    /// The argument is a collection; positional uses expand to an iteration.
    pub collection: bool,
}

impl DeclaredQuery {
    pub fn new(name: &str, sql: &str) -> DeclaredQuery {
        DeclaredQuery {
            name: name.to_string(),
            sql: sql.to_string(),
            params: vec![],
            count_sql: None,
            modifying: false,
            paged: false,
        }
    }

    pub fn param(mut self, name: &str) -> DeclaredQuery {
        self.params.push(ParamDecl {
            name: name.to_string(),
            collection: false,
        });
        self
    }

    pub fn collection_param(mut self, name: &str) -> DeclaredQuery {
        self.params.push(ParamDecl {
            name: name.to_string(),
            collection: true,
        });
        self
    }

    pub fn count_query(mut self, sql: &str) -> DeclaredQuery {
        self.count_sql = Some(sql.to_string());
        self
    }

    pub fn modifying(mut self) -> DeclaredQuery {
        self.modifying = true;
        self
    }

    pub fn paged(mut self) -> DeclaredQuery {
        self.paged = true;
        self
    }

    /// The parameter a positional placeholder `?index` refers to (1-based).
    pub fn positional(&self, index: usize) -> Option<&ParamDecl> {
        index.checked_sub(1).and_then(|i| self.params.get(i))
    }

    pub fn named(&self, name: &str) -> Option<&ParamDecl> {
        self.params.iter().find(|param| param.name == name)
    }
}

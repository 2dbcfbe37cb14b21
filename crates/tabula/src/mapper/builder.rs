use super::{Shared, Tabula};

use tabula_core::{
    schema::MetadataProvider, Config, Dialect, Error, Metamodel, Result, StatementRegistry,
};

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    config: Config,

    /// Used when the configuration names no dialect.
    dialect: Option<Dialect>,

    metadata: Option<Arc<dyn MetadataProvider>>,
}

impl Builder {
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Loads the configuration from TOML.
    pub fn config_toml(&mut self, src: &str) -> Result<&mut Self> {
        self.config = Config::from_toml(src)?;
        Ok(self)
    }

    pub fn dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn metadata(&mut self, provider: impl MetadataProvider + 'static) -> &mut Self {
        self.metadata = Some(Arc::new(provider));
        self
    }

    /// Set the table name prefix for all table names
    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.config.table_name_prefix(prefix);
        self
    }

    pub fn build(&mut self) -> Result<Tabula> {
        let Some(metadata) = self.metadata.clone() else {
            return Err(Error::invalid_config("no metadata provider given"));
        };

        let dialect = match self.config.resolve_dialect()? {
            Some(dialect) => dialect,
            None => self
                .dialect
                .clone()
                .unwrap_or(Dialect::ANSI)
                .with_quote_all(self.config.quote_identifiers),
        };

        tracing::debug!(dialect = dialect.name, "building tabula");

        Ok(Tabula {
            shared: Arc::new(Shared {
                metamodel: Metamodel::new(metadata, dialect, self.config.clone()),
                registry: StatementRegistry::new(),
            }),
        })
    }
}

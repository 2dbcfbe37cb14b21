use crate::{Error, Result};

use serde::Deserialize;

/// Primary key generation strategy as declared on an id property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// The caller assigns the key before insert.
    Assigned,

    /// The database generates the key on insert; it is fetched afterwards.
    Identity,

    /// The key is drawn from a sequence before insert.
    Sequence,

    /// Let the dialect choose between identity and sequence.
    Auto,
}

/// Which of identity and sequence a product prefers for AUTO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preferred {
    Identity,
    Sequence,
}

/// When the key-fetch statement runs relative to the insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    Before,
    After,
}

/// A product's key generation support, as SQL templates.
///
/// `identity` may reference `{table}` and `{column}`; `sequence` references
/// `{sequence}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyGeneration {
    pub identity: Option<&'static str>,
    pub sequence: Option<&'static str>,
    pub preferred: Preferred,
}

/// A resolved key generation strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyGenerator {
    /// Never [`GenerationType::Auto`].
    pub strategy: GenerationType,

    /// Sequence the key is drawn from, for [`GenerationType::Sequence`].
    pub sequence: Option<String>,

    /// SQL that produces the key value.
    pub sql: Option<String>,

    /// When `sql` runs.
    pub order: Option<KeyOrder>,
}

impl KeyGeneration {
    pub const NONE: KeyGeneration = KeyGeneration {
        identity: None,
        sequence: None,
        preferred: Preferred::Identity,
    };

    pub(super) fn resolve(
        &self,
        dialect: &str,
        strategy: GenerationType,
        table: &str,
        column: &str,
        sequence: Option<&str>,
    ) -> Result<KeyGenerator> {
        let generated = match strategy {
            GenerationType::Assigned => {
                return Ok(KeyGenerator {
                    strategy,
                    sequence: None,
                    sql: None,
                    order: None,
                })
            }
            GenerationType::Identity => Preferred::Identity,
            GenerationType::Sequence => Preferred::Sequence,
            GenerationType::Auto => self.auto(dialect)?,
        };

        match generated {
            Preferred::Identity => self.identity(dialect, table, column),
            Preferred::Sequence => self.sequence(dialect, table, column, sequence),
        }
    }

    fn identity(&self, dialect: &str, table: &str, column: &str) -> Result<KeyGenerator> {
        let Some(template) = self.identity else {
            return Err(Error::unsupported_capability("identity key retrieval", dialect));
        };

        Ok(KeyGenerator {
            strategy: GenerationType::Identity,
            sequence: None,
            sql: Some(
                template
                    .replace("{table}", table)
                    .replace("{column}", column),
            ),
            order: Some(KeyOrder::After),
        })
    }

    fn sequence(
        &self,
        dialect: &str,
        table: &str,
        column: &str,
        sequence: Option<&str>,
    ) -> Result<KeyGenerator> {
        let Some(template) = self.sequence else {
            return Err(Error::unsupported_capability("sequences", dialect));
        };

        let sequence = match sequence {
            Some(sequence) => sequence.to_string(),
            None => default_sequence_name(table, column),
        };

        Ok(KeyGenerator {
            strategy: GenerationType::Sequence,
            sql: Some(template.replace("{sequence}", &sequence)),
            sequence: Some(sequence),
            order: Some(KeyOrder::Before),
        })
    }

    /// The concrete strategy AUTO stands for on this product.
    fn auto(&self, dialect: &str) -> Result<Preferred> {
        let identity = self.identity.is_some();
        let sequence = self.sequence.is_some();

        match (self.preferred, identity, sequence) {
            (Preferred::Identity, true, _) | (Preferred::Sequence, true, false) => {
                Ok(Preferred::Identity)
            }
            (Preferred::Sequence, _, true) | (Preferred::Identity, false, true) => {
                Ok(Preferred::Sequence)
            }
            (_, false, false) => Err(Error::unsupported_capability(
                "AUTO key generation (neither identity nor sequences)",
                dialect,
            )),
        }
    }
}

/// Sequence name used when a SEQUENCE strategy names no generator.
pub(crate) fn default_sequence_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_seq")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;

    #[test]
    fn identity_runs_after_insert() {
        let key = Dialect::MYSQL
            .key_generator(GenerationType::Identity, "shop", "id", None)
            .unwrap();
        assert_eq!(key.strategy, GenerationType::Identity);
        assert_eq!(key.sql.as_deref(), Some("SELECT LAST_INSERT_ID()"));
        assert_eq!(key.order, Some(KeyOrder::After));
    }

    #[test]
    fn sequence_runs_before_insert() {
        let key = Dialect::ORACLE
            .key_generator(GenerationType::Sequence, "shop", "id", Some("shop_seq"))
            .unwrap();
        assert_eq!(key.sql.as_deref(), Some("SELECT shop_seq.NEXTVAL FROM DUAL"));
        assert_eq!(key.sequence.as_deref(), Some("shop_seq"));
        assert_eq!(key.order, Some(KeyOrder::Before));
    }

    #[test]
    fn sequence_name_defaults_from_table_and_column() {
        let key = Dialect::POSTGRESQL
            .key_generator(GenerationType::Sequence, "shop", "id", None)
            .unwrap();
        assert_eq!(key.sql.as_deref(), Some("SELECT nextval('shop_id_seq')"));
    }

    #[test]
    fn identity_template_substitution() {
        let key = Dialect::POSTGRESQL
            .key_generator(GenerationType::Identity, "shop", "id", None)
            .unwrap();
        assert_eq!(
            key.sql.as_deref(),
            Some("SELECT currval(pg_get_serial_sequence('shop', 'id'))")
        );
    }

    #[test]
    fn auto_follows_preference() {
        let key = Dialect::H2
            .key_generator(GenerationType::Auto, "t", "id", None)
            .unwrap();
        assert_eq!(key.strategy, GenerationType::Sequence);

        let key = Dialect::HSQLDB
            .key_generator(GenerationType::Auto, "t", "id", None)
            .unwrap();
        assert_eq!(key.strategy, GenerationType::Identity);

        // Oracle has no identity retrieval: AUTO falls to sequences
        let key = Dialect::ORACLE
            .key_generator(GenerationType::Auto, "t", "id", None)
            .unwrap();
        assert_eq!(key.strategy, GenerationType::Sequence);

        // MySQL has no sequences: AUTO falls to identity
        let key = Dialect::MYSQL
            .key_generator(GenerationType::Auto, "t", "id", None)
            .unwrap();
        assert_eq!(key.strategy, GenerationType::Identity);
    }

    #[test]
    fn auto_without_support_is_an_error() {
        let err = Dialect::ANSI
            .key_generator(GenerationType::Auto, "t", "id", None)
            .unwrap_err();
        assert!(err.is_unsupported_capability());
    }

    #[test]
    fn sequence_on_mysql_is_an_error() {
        let err = Dialect::MYSQL
            .key_generator(GenerationType::Sequence, "t", "id", None)
            .unwrap_err();
        assert!(err.is_unsupported_capability());
        assert!(err.to_string().contains("sequences"));
    }

    #[test]
    fn assigned_has_no_sql() {
        let key = Dialect::ANSI
            .key_generator(GenerationType::Assigned, "t", "id", None)
            .unwrap();
        assert_eq!(key.sql, None);
        assert_eq!(key.order, None);
    }
}

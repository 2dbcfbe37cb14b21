//! Database dialects.
//!
//! A [`Dialect`] is a plain record of capability descriptors: how the product
//! paginates, how it generates primary keys, how it quotes identifiers, and a
//! handful of feature flags. Products that differ from a relative in one or two
//! places are declared with struct-update syntax on the relative.

mod capabilities;
pub use capabilities::{Capabilities, ConcatStyle};

mod key_generation;
pub use key_generation::{GenerationType, KeyGeneration, KeyGenerator, KeyOrder, Preferred};

mod pagination;
pub use pagination::{Bound, Pagination};

mod quoting;
pub use quoting::{IdentCase, Identifier, Quoting};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Dialect {
    /// Short, stable name of the dialect.
    pub name: &'static str,

    /// How LIMIT/OFFSET is expressed.
    pub pagination: Pagination,

    /// Identity and sequence support.
    pub key_generation: KeyGeneration,

    /// Identifier quoting characters and casing.
    pub quoting: Quoting,

    /// Feature flags.
    pub capabilities: Capabilities,
}

impl Dialect {
    /// Plain SQL:2008. Neither identity retrieval nor sequences are known.
    pub const ANSI: Self = Self {
        name: "ansi",
        pagination: Pagination::OffsetFetch,
        key_generation: KeyGeneration::NONE,
        quoting: Quoting::ANSI,
        capabilities: Capabilities::ANSI,
    };

    pub const MYSQL: Self = Self {
        name: "mysql",
        pagination: Pagination::LimitComma,
        key_generation: KeyGeneration {
            identity: Some("SELECT LAST_INSERT_ID()"),
            sequence: None,
            preferred: Preferred::Identity,
        },
        quoting: Quoting::BACKTICK,
        capabilities: Capabilities {
            boolean: true,
            regex: Some("{column} REGEXP {pattern}"),
            concat: ConcatStyle::Function,
        },
    };

    /// MySQL plus sequences (10.3+).
    pub const MARIADB: Self = Self {
        name: "mariadb",
        key_generation: KeyGeneration {
            sequence: Some("SELECT NEXTVAL({sequence})"),
            ..Self::MYSQL.key_generation
        },
        ..Self::MYSQL
    };

    pub const POSTGRESQL: Self = Self {
        name: "postgresql",
        pagination: Pagination::LimitOffset,
        key_generation: KeyGeneration {
            identity: Some("SELECT currval(pg_get_serial_sequence('{table}', '{column}'))"),
            sequence: Some("SELECT nextval('{sequence}')"),
            preferred: Preferred::Identity,
        },
        quoting: Quoting {
            casing: IdentCase::Lower,
            ..Quoting::ANSI
        },
        capabilities: Capabilities {
            boolean: true,
            regex: Some("{column} ~ {pattern}"),
            concat: ConcatStyle::Pipes,
        },
    };

    pub const SQLITE: Self = Self {
        name: "sqlite",
        pagination: Pagination::LimitOffset,
        key_generation: KeyGeneration {
            identity: Some("SELECT last_insert_rowid()"),
            sequence: None,
            preferred: Preferred::Identity,
        },
        quoting: Quoting::ANSI,
        capabilities: Capabilities {
            boolean: false,
            regex: Some("{column} REGEXP {pattern}"),
            concat: ConcatStyle::Pipes,
        },
    };

    pub const H2: Self = Self {
        name: "h2",
        pagination: Pagination::LimitOffset,
        key_generation: KeyGeneration {
            identity: Some("CALL IDENTITY()"),
            sequence: Some("CALL NEXT VALUE FOR {sequence}"),
            preferred: Preferred::Sequence,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: true,
            regex: Some("REGEXP_LIKE({column}, {pattern})"),
            concat: ConcatStyle::Function,
        },
    };

    /// H2 with identity preferred and a different regex function.
    pub const HSQLDB: Self = Self {
        name: "hsqldb",
        key_generation: KeyGeneration {
            preferred: Preferred::Identity,
            ..Self::H2.key_generation
        },
        capabilities: Capabilities {
            regex: Some("REGEXP_MATCHES({column}, {pattern})"),
            concat: ConcatStyle::Pipes,
            ..Self::H2.capabilities
        },
        ..Self::H2
    };

    pub const DERBY: Self = Self {
        name: "derby",
        pagination: Pagination::OffsetFetch,
        key_generation: KeyGeneration {
            identity: Some("VALUES IDENTITY_VAL_LOCAL()"),
            sequence: Some("VALUES NEXT VALUE FOR {sequence}"),
            preferred: Preferred::Identity,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: true,
            regex: None,
            concat: ConcatStyle::Pipes,
        },
    };

    pub const DB2: Self = Self {
        name: "db2",
        pagination: Pagination::RowNumberOver { top: false },
        key_generation: KeyGeneration {
            identity: Some("VALUES IDENTITY_VAL_LOCAL()"),
            sequence: Some("VALUES NEXTVAL FOR {sequence}"),
            preferred: Preferred::Identity,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: false,
            regex: Some("REGEXP_LIKE({column}, {pattern})"),
            concat: ConcatStyle::Pipes,
        },
    };

    pub const ORACLE: Self = Self {
        name: "oracle",
        pagination: Pagination::RowNum,
        key_generation: KeyGeneration {
            identity: None,
            sequence: Some("SELECT {sequence}.NEXTVAL FROM DUAL"),
            preferred: Preferred::Sequence,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: false,
            regex: Some("REGEXP_LIKE({column}, {pattern})"),
            concat: ConcatStyle::Pipes,
        },
    };

    /// Oracle with SQL:2008 row limiting.
    pub const ORACLE12C: Self = Self {
        name: "oracle12c",
        pagination: Pagination::OffsetFetch,
        ..Self::ORACLE
    };

    pub const SQLSERVER2005: Self = Self {
        name: "sqlserver2005",
        pagination: Pagination::RowNumberOver { top: true },
        key_generation: KeyGeneration {
            identity: Some("SELECT SCOPE_IDENTITY()"),
            sequence: None,
            preferred: Preferred::Identity,
        },
        quoting: Quoting::BRACKET,
        capabilities: Capabilities {
            boolean: false,
            regex: None,
            concat: ConcatStyle::Plus,
        },
    };

    /// SQL Server 2005 plus OFFSET/FETCH and sequences.
    pub const SQLSERVER2012: Self = Self {
        name: "sqlserver2012",
        pagination: Pagination::OffsetFetch,
        key_generation: KeyGeneration {
            sequence: Some("SELECT NEXT VALUE FOR {sequence}"),
            ..Self::SQLSERVER2005.key_generation
        },
        capabilities: Capabilities {
            concat: ConcatStyle::Function,
            ..Self::SQLSERVER2005.capabilities
        },
        ..Self::SQLSERVER2005
    };

    /// SQL Server 2005 with Sybase identity retrieval.
    pub const SYBASE: Self = Self {
        name: "sybase",
        key_generation: KeyGeneration {
            identity: Some("SELECT @@IDENTITY"),
            ..Self::SQLSERVER2005.key_generation
        },
        ..Self::SQLSERVER2005
    };

    pub const INFORMIX: Self = Self {
        name: "informix",
        pagination: Pagination::FirstSkip { skip_first: true },
        key_generation: KeyGeneration {
            identity: Some("SELECT dbinfo('sqlca.sqlerrd1') FROM systables WHERE tabid = 1"),
            sequence: Some("SELECT {sequence}.NEXTVAL FROM systables WHERE tabid = 1"),
            preferred: Preferred::Identity,
        },
        quoting: Quoting {
            casing: IdentCase::Lower,
            ..Quoting::ANSI
        },
        capabilities: Capabilities::ANSI,
    };

    pub const FIREBIRD: Self = Self {
        name: "firebird",
        pagination: Pagination::FirstSkip { skip_first: false },
        key_generation: KeyGeneration {
            identity: None,
            sequence: Some("SELECT GEN_ID({sequence}, 1) FROM RDB$DATABASE"),
            preferred: Preferred::Sequence,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: true,
            regex: Some("{column} SIMILAR TO {pattern}"),
            concat: ConcatStyle::Pipes,
        },
    };

    pub const CUBRID: Self = Self {
        name: "cubrid",
        pagination: Pagination::LimitComma,
        key_generation: KeyGeneration {
            identity: Some("SELECT LAST_INSERT_ID()"),
            sequence: Some("SELECT {sequence}.NEXT_VALUE FROM db_root"),
            preferred: Preferred::Identity,
        },
        quoting: Quoting::BACKTICK,
        capabilities: Capabilities {
            boolean: false,
            regex: Some("{column} REGEXP {pattern}"),
            concat: ConcatStyle::Function,
        },
    };

    pub const PHOENIX: Self = Self {
        name: "phoenix",
        pagination: Pagination::LimitOffset,
        key_generation: KeyGeneration {
            identity: None,
            sequence: Some("SELECT NEXT VALUE FOR {sequence}"),
            preferred: Preferred::Sequence,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: true,
            regex: Some("REGEXP_SUBSTR({column}, {pattern}) IS NOT NULL"),
            concat: ConcatStyle::Pipes,
        },
    };

    pub const HANA: Self = Self {
        name: "hana",
        pagination: Pagination::LimitOffset,
        key_generation: KeyGeneration {
            identity: Some("SELECT CURRENT_IDENTITY_VALUE() FROM DUMMY"),
            sequence: Some("SELECT {sequence}.NEXTVAL FROM DUMMY"),
            preferred: Preferred::Sequence,
        },
        quoting: Quoting::ANSI_UPPER,
        capabilities: Capabilities {
            boolean: true,
            regex: Some("{column} LIKE_REGEXPR {pattern}"),
            concat: ConcatStyle::Pipes,
        },
    };

    /// Every dialect known to tabula.
    pub const ALL: &'static [&'static Dialect] = &[
        &Self::ANSI,
        &Self::MYSQL,
        &Self::MARIADB,
        &Self::POSTGRESQL,
        &Self::SQLITE,
        &Self::H2,
        &Self::HSQLDB,
        &Self::DERBY,
        &Self::DB2,
        &Self::ORACLE,
        &Self::ORACLE12C,
        &Self::SQLSERVER2005,
        &Self::SQLSERVER2012,
        &Self::SYBASE,
        &Self::INFORMIX,
        &Self::FIREBIRD,
        &Self::CUBRID,
        &Self::PHOENIX,
        &Self::HANA,
    ];

    /// Looks up a dialect by its short name or a common alias.
    pub fn from_name(name: &str) -> Result<Dialect> {
        let name = name.trim().to_ascii_lowercase();

        let dialect = match name.as_str() {
            "ansi" | "default" | "sql2008" => &Self::ANSI,
            "mysql" => &Self::MYSQL,
            "mariadb" => &Self::MARIADB,
            "postgresql" | "postgres" | "pgsql" => &Self::POSTGRESQL,
            "sqlite" | "sqlite3" => &Self::SQLITE,
            "h2" => &Self::H2,
            "hsqldb" | "hsql" => &Self::HSQLDB,
            "derby" => &Self::DERBY,
            "db2" => &Self::DB2,
            "oracle" => &Self::ORACLE,
            "oracle12c" => &Self::ORACLE12C,
            "sqlserver" | "mssql" | "sqlserver2012" => &Self::SQLSERVER2012,
            "sqlserver2005" | "sqlserver2008" => &Self::SQLSERVER2005,
            "sybase" | "ase" => &Self::SYBASE,
            "informix" => &Self::INFORMIX,
            "firebird" => &Self::FIREBIRD,
            "cubrid" => &Self::CUBRID,
            "phoenix" => &Self::PHOENIX,
            "hana" | "saphana" => &Self::HANA,
            _ => return Err(Error::invalid_config(format!("unknown dialect `{name}`"))),
        };

        Ok(dialect.clone())
    }

    /// Picks a dialect from a database product name as reported by a driver,
    /// together with the product's major version.
    pub fn for_product(product: &str, major_version: u32) -> Result<Dialect> {
        let product_lower = product.to_ascii_lowercase();

        let dialect = if product_lower.starts_with("mysql") {
            &Self::MYSQL
        } else if product_lower.starts_with("mariadb") {
            &Self::MARIADB
        } else if product_lower.starts_with("postgresql") {
            &Self::POSTGRESQL
        } else if product_lower.starts_with("sqlite") {
            &Self::SQLITE
        } else if product_lower == "h2" {
            &Self::H2
        } else if product_lower.starts_with("hsql") {
            &Self::HSQLDB
        } else if product_lower.contains("derby") {
            &Self::DERBY
        } else if product_lower.starts_with("db2") {
            &Self::DB2
        } else if product_lower.starts_with("oracle") {
            if major_version >= 12 {
                &Self::ORACLE12C
            } else {
                &Self::ORACLE
            }
        } else if product_lower.contains("sybase") || product_lower.starts_with("adaptive server") {
            &Self::SYBASE
        } else if product_lower.contains("sql server") {
            if major_version >= 11 {
                &Self::SQLSERVER2012
            } else {
                &Self::SQLSERVER2005
            }
        } else if product_lower.starts_with("informix") {
            &Self::INFORMIX
        } else if product_lower.starts_with("firebird") {
            &Self::FIREBIRD
        } else if product_lower.starts_with("cubrid") {
            &Self::CUBRID
        } else if product_lower.starts_with("phoenix") {
            &Self::PHOENIX
        } else if product_lower == "hdb" || product_lower.contains("hana") {
            &Self::HANA
        } else {
            return Err(Error::invalid_config(format!(
                "no dialect for database product `{product}` (version {major_version})"
            )));
        };

        Ok(dialect.clone())
    }

    /// Returns a copy of this dialect that quotes every identifier.
    pub fn with_quote_all(mut self, quote_all: bool) -> Dialect {
        self.quoting.always = quote_all;
        self
    }

    /// Renders an identifier, quoting it when it was declared quoted, when it
    /// is a reserved word, or when the dialect quotes everything.
    pub fn ident(&self, ident: &Identifier) -> String {
        self.quoting.render(ident)
    }

    /// Quotes an identifier unconditionally.
    pub fn quote(&self, name: &str) -> String {
        self.quoting.quote(name)
    }

    /// Applies LIMIT/OFFSET to a select statement.
    ///
    /// See [`Pagination::paginate`].
    pub fn paginate(&self, sql: &str, offset: Option<&Bound>, limit: &Bound) -> String {
        self.pagination.paginate(sql, offset, limit)
    }

    /// Resolves a requested key generation strategy into the SQL needed to
    /// obtain the key.
    pub fn key_generator(
        &self,
        strategy: GenerationType,
        table: &str,
        column: &str,
        sequence: Option<&str>,
    ) -> Result<KeyGenerator> {
        self.key_generation
            .resolve(self.name, strategy, table, column, sequence)
    }

    /// Renders a regex match predicate, or fails when the product has no
    /// native regex support.
    pub fn regex_predicate(&self, column: &str, pattern: &str) -> Result<String> {
        match self.capabilities.regex {
            Some(template) => Ok(template
                .replace("{column}", column)
                .replace("{pattern}", pattern)),
            None => Err(Error::unsupported_capability("regex predicate", self.name)),
        }
    }

    /// Renders a boolean literal.
    pub fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.capabilities.boolean, value) {
            (true, true) => "TRUE",
            (true, false) => "FALSE",
            (false, true) => "1",
            (false, false) => "0",
        }
    }

    /// Renders string concatenation of already-rendered SQL parts.
    pub fn concat(&self, parts: &[&str]) -> String {
        self.capabilities.concat.render(parts)
    }

    pub fn supports_identity(&self) -> bool {
        self.key_generation.identity.is_some()
    }

    pub fn supports_sequences(&self) -> bool {
        self.key_generation.sequence.is_some()
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ANSI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_fifteen_dialects() {
        assert!(Dialect::ALL.len() >= 15);

        let mut names: Vec<_> = Dialect::ALL.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Dialect::ALL.len(), "dialect names must be unique");
    }

    #[test]
    fn every_dialect_resolves_by_name() {
        for dialect in Dialect::ALL {
            let found = Dialect::from_name(dialect.name).unwrap();
            assert_eq!(&found, *dialect);
        }
    }

    #[test]
    fn unknown_dialect_name() {
        let err = Dialect::from_name("dbase").unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn product_detection_uses_version() {
        assert_eq!(
            Dialect::for_product("Microsoft SQL Server", 10).unwrap().name,
            "sqlserver2005"
        );
        assert_eq!(
            Dialect::for_product("Microsoft SQL Server", 15).unwrap().name,
            "sqlserver2012"
        );
        assert_eq!(Dialect::for_product("Oracle", 11).unwrap().name, "oracle");
        assert_eq!(Dialect::for_product("Oracle", 19).unwrap().name, "oracle12c");
        assert_eq!(
            Dialect::for_product("HSQL Database Engine", 2).unwrap().name,
            "hsqldb"
        );
        assert!(Dialect::for_product("Paradox", 7).is_err());
    }

    #[test]
    fn relatives_only_override_what_differs() {
        assert_eq!(Dialect::ORACLE12C.key_generation, Dialect::ORACLE.key_generation);
        assert_eq!(Dialect::ORACLE12C.quoting, Dialect::ORACLE.quoting);
        assert_ne!(Dialect::ORACLE12C.pagination, Dialect::ORACLE.pagination);

        assert_eq!(Dialect::MARIADB.pagination, Dialect::MYSQL.pagination);
        assert!(!Dialect::MYSQL.supports_sequences());
        assert!(Dialect::MARIADB.supports_sequences());
        assert!(Dialect::MYSQL.supports_identity());
    }

    #[test]
    fn regex_capability() {
        assert_eq!(
            Dialect::POSTGRESQL.regex_predicate("name", "#{pattern}").unwrap(),
            "name ~ #{pattern}"
        );
        assert_eq!(
            Dialect::ORACLE.regex_predicate("NAME", "#{p}").unwrap(),
            "REGEXP_LIKE(NAME, #{p})"
        );

        let err = Dialect::DERBY.regex_predicate("name", "#{p}").unwrap_err();
        assert!(err.is_unsupported_capability());
        assert!(err.to_string().contains("regex predicate"));
    }

    #[test]
    fn boolean_literals() {
        assert_eq!(Dialect::POSTGRESQL.boolean_literal(true), "TRUE");
        assert_eq!(Dialect::ORACLE.boolean_literal(true), "1");
        assert_eq!(Dialect::SQLSERVER2005.boolean_literal(false), "0");
    }
}

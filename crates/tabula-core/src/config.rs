use crate::{
    schema::{FetchMode, NamingStrategy},
    Dialect, Result,
};

use serde::Deserialize;

/// Settings shared by the metamodel builder and the precompiler.
///
/// ```toml
/// dialect = "postgresql"
/// naming = "snake_case"
/// table_name_prefix = "app_"
/// case_folding = { collate = "und-x-icu" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dialect name (see [`Dialect::from_name`]). When unset, the dialect
    /// handed to the builder is used, falling back to ANSI.
    pub dialect: Option<String>,

    /// Transform from class and property names to table and column names.
    pub naming: NamingStrategy,

    /// If set, prefix all derived table names with this string.
    pub table_name_prefix: Option<String>,

    /// How case-insensitive predicates fold their operands.
    pub case_folding: CaseFolding,

    /// Quote every identifier, not only reserved words.
    pub quote_identifiers: bool,

    /// Fetch mode for associations that do not declare one.
    pub default_fetch: FetchMode,

    /// Pattern for sequence names when a SEQUENCE strategy names no
    /// generator. `{table}` and `{column}` are substituted.
    pub sequence_name_pattern: String,
}

/// Case folding applied by ignore-case predicates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseFolding {
    /// `UPPER(column) = UPPER(#{value})`
    Upper,

    /// `LOWER(column) = LOWER(#{value})`
    Lower,

    /// `column COLLATE name = #{value}`, for collation-aware matching. Only
    /// the column side is folded.
    Collate(String),
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Config> {
        Ok(toml::from_str(src)?)
    }

    pub fn dialect(&mut self, name: impl Into<String>) -> &mut Self {
        self.dialect = Some(name.into());
        self
    }

    pub fn naming(&mut self, naming: NamingStrategy) -> &mut Self {
        self.naming = naming;
        self
    }

    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn case_folding(&mut self, case_folding: CaseFolding) -> &mut Self {
        self.case_folding = case_folding;
        self
    }

    pub fn quote_identifiers(&mut self, quote: bool) -> &mut Self {
        self.quote_identifiers = quote;
        self
    }

    pub fn default_fetch(&mut self, fetch: FetchMode) -> &mut Self {
        self.default_fetch = fetch;
        self
    }

    /// Resolves the configured dialect, if one is named.
    pub fn resolve_dialect(&self) -> Result<Option<Dialect>> {
        self.dialect
            .as_deref()
            .map(Dialect::from_name)
            .transpose()
            .map(|dialect| dialect.map(|dialect| dialect.with_quote_all(self.quote_identifiers)))
    }

    pub fn sequence_name(&self, table: &str, column: &str) -> String {
        self.sequence_name_pattern
            .replace("{table}", table)
            .replace("{column}", column)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: None,
            naming: NamingStrategy::default(),
            table_name_prefix: None,
            case_folding: CaseFolding::Upper,
            quote_identifiers: false,
            default_fetch: FetchMode::Select,
            sequence_name_pattern: "{table}_{column}_seq".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
            dialect = "mysql"
            naming = "preserve"
            table_name_prefix = "app_"
            case_folding = { collate = "utf8mb4_general_ci" }
            quote_identifiers = true
            default_fetch = "join"
            sequence_name_pattern = "seq_{table}"
            "#,
        )
        .unwrap();

        assert_eq!(config.naming, NamingStrategy::Preserve);
        assert_eq!(config.table_name_prefix.as_deref(), Some("app_"));
        assert_eq!(
            config.case_folding,
            CaseFolding::Collate("utf8mb4_general_ci".to_string())
        );
        assert_eq!(config.default_fetch, FetchMode::Join);
        assert_eq!(config.sequence_name("shop", "id"), "seq_shop");

        let dialect = config.resolve_dialect().unwrap().unwrap();
        assert_eq!(dialect.name, "mysql");
        assert!(dialect.quoting.always);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("dialekt = \"mysql\"").unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        let mut config = Config::default();
        config.dialect("foxpro");
        assert!(config.resolve_dialect().is_err());
    }
}

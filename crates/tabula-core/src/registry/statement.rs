use super::ResultShape;
use crate::dialect::KeyOrder;

use indexmap::IndexSet;
use regex::Regex;
use std::{fmt, sync::Arc, sync::LazyLock};

/// `#{name}` or `#{name,jdbcType=VARCHAR}`.
static BIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{\s*([A-Za-z_][\w.]*)\s*(?:,[^}]*)?\}").expect("valid regex"));

/// Attributes of an iteration construct.
static FOREACH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<foreach\s+collection="([^"]+)"\s+item="([^"]+)""#).expect("valid regex")
});

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId {
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// A named, parameterized SQL template.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub id: StatementId,
    pub kind: StatementKind,

    /// SQL with `#{name}` binds and `<foreach>` iteration constructs.
    pub sql: String,

    /// How rows map back to objects, for selects.
    pub result: Option<Arc<ResultShape>>,

    /// Name of the count statement run alongside a paged select.
    pub paging_companion: Option<String>,

    /// How a generated key is obtained, for inserts.
    pub key_fetch: Option<KeyFetch>,

    /// Bound parameter names in order of first appearance.
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFetch {
    pub sql: String,
    pub order: KeyOrder,

    /// Property receiving the key.
    pub property: String,

    /// Column holding the key.
    pub column: String,
}

impl StatementId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> StatementId {
        StatementId {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Another statement in the same namespace.
    pub fn sibling(&self, name: impl Into<String>) -> StatementId {
        StatementId::new(self.namespace.clone(), name)
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl fmt::Debug for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatementId({self})")
    }
}

impl CompiledStatement {
    pub fn new(id: StatementId, kind: StatementKind, sql: impl Into<String>) -> CompiledStatement {
        let sql = sql.into();
        let parameters = bind_parameters(&sql);

        CompiledStatement {
            id,
            kind,
            sql,
            result: None,
            paging_companion: None,
            key_fetch: None,
            parameters,
        }
    }

    pub fn result(mut self, shape: Arc<ResultShape>) -> CompiledStatement {
        self.result = Some(shape);
        self
    }

    pub fn paging_companion(mut self, name: impl Into<String>) -> CompiledStatement {
        self.paging_companion = Some(name.into());
        self
    }

    pub fn key_fetch(mut self, key_fetch: KeyFetch) -> CompiledStatement {
        self.key_fetch = Some(key_fetch);
        self
    }
}

/// Parameter names referenced by a template. Iteration items are replaced by
/// the collection they iterate.
fn bind_parameters(sql: &str) -> Vec<String> {
    let mut items = IndexSet::new();
    let mut found: Vec<(usize, String)> = vec![];

    for cap in FOREACH.captures_iter(sql) {
        if let (Some(collection), Some(item)) = (cap.get(1), cap.get(2)) {
            found.push((collection.start(), collection.as_str().to_string()));
            items.insert(item.as_str().to_string());
        }
    }

    for cap in BIND.captures_iter(sql) {
        if let Some(name) = cap.get(1) {
            let root = name.as_str().split('.').next().unwrap_or(name.as_str());
            if !items.contains(root) {
                found.push((name.start(), name.as_str().to_string()));
            }
        }
    }

    found.sort_by_key(|(position, _)| *position);

    let mut parameters = IndexSet::new();
    for (_, name) in found {
        parameters.insert(name);
    }
    parameters.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_in_order_of_appearance() {
        let params = bind_parameters(
            "SELECT * FROM shop WHERE name = #{name} AND id > #{min,jdbcType=BIGINT} AND name <> #{name}",
        );
        assert_eq!(params, ["name", "min"]);
    }

    #[test]
    fn iteration_items_are_not_parameters() {
        let params = bind_parameters(
            r#"DELETE FROM shop WHERE id IN <foreach collection="ids" item="item" open="(" separator=", " close=")">#{item}</foreach> AND owner = #{owner}"#,
        );
        assert_eq!(params, ["ids", "owner"]);
    }

    #[test]
    fn nested_property_binds() {
        let params = bind_parameters("UPDATE t SET city = #{address.city} WHERE id = #{id}");
        assert_eq!(params, ["address.city", "id"]);
    }

    #[test]
    fn display_id() {
        assert_eq!(
            StatementId::new("ShopRepository", "findAll").to_string(),
            "ShopRepository.findAll"
        );
    }
}

use super::{count_name, result, Precompiler, PAGED_SUFFIX};
use crate::stmt::{Expr, Foreach};

use tabula_core::{
    registry::{CompiledStatement, ResultKind, ResultMapping, ResultShape, StatementId, StatementKind},
    schema::{ClassId, Domain, SqlType},
    stmt::DeclaredQuery,
    Error, Result,
};

use regex::{Captures, Regex};
use std::sync::{Arc, LazyLock};

/// Expands to the entity's qualified table name.
const ENTITY_NAME: &str = "#{#entityName}";

/// Quoted literals, existing binds and casts are copied through; parameter
/// placeholders are captured with their surrounding `LIKE`, parentheses and
/// wildcards.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"'(?:[^']|'')*'|#\{[^}]*\}|::|((?i:\blike)\s+)?(\(\s*)?(%)?(\?\d+|:[A-Za-z_]\w*|[:?]#\{[^}]*\})(%)?(\s*\))?",
    )
    .expect("valid regex")
});

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+)").expect("valid regex"));

static CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*select\s+(distinct\s+)?new\s+([A-Za-z_][\w.:$]*)\s*\(")
        .expect("valid regex")
});

static SELECT_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*select\s+(?:distinct\s+)?(?:\w+\.)?\*\s+from\b").expect("valid regex")
});

static SELECT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*select\s+count\s*\(").expect("valid regex"));

static TRAILING_ORDER_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\s+order\s+by\s+[^()']*$").expect("valid regex"));

/// A `select new Class(args) ...` projection.
#[derive(Debug, PartialEq)]
struct Constructor<'a> {
    distinct: bool,
    class: &'a str,
    args: Vec<&'a str>,

    /// Everything after the closing parenthesis.
    rest: &'a str,
}

impl Precompiler<'_> {
    /// Statements for a hand-written query.
    pub(super) fn declared(
        &self,
        domain: &Domain,
        id: &StatementId,
        query: &DeclaredQuery,
    ) -> Result<Vec<CompiledStatement>> {
        let kind = statement_kind(id, &query.sql)?;

        match (kind, query.modifying) {
            (StatementKind::Select, true) => {
                return Err(Error::invalid_query(
                    id.to_string(),
                    "a modifying query must be an INSERT, UPDATE or DELETE",
                ));
            }
            (StatementKind::Insert | StatementKind::Update | StatementKind::Delete, false) => {
                return Err(Error::invalid_query(
                    id.to_string(),
                    format!("{kind:?} query must be declared modifying"),
                ));
            }
            _ => {}
        }

        if query.paged && kind != StatementKind::Select {
            return Err(Error::invalid_query(id.to_string(), "only selects can be paged"));
        }

        let sql = self.expand_entity_name(domain, query.sql.trim());

        let (sql, shape) = match constructor(&sql) {
            Some(constructor) => {
                let shape = self.constructor_shape(domain, id, &constructor)?;
                (constructor.rewrite(), Some(Arc::new(shape)))
            }
            None => {
                let shape = if kind != StatementKind::Select {
                    None
                } else if SELECT_ALL.is_match(&sql) {
                    Some(Arc::new(result::entity_shape(&id.namespace, domain, &[])))
                } else if SELECT_COUNT.is_match(&sql) {
                    Some(result::count_shape())
                } else {
                    None
                };
                (sql.clone(), shape)
            }
        };

        let sql = self.rewrite_params(id, query, &sql)?;

        let mut main = CompiledStatement::new(id.clone(), kind, sql.clone());
        main.result = shape.clone();
        let mut statements = vec![main];

        let count = id.sibling(count_name(&id.name));

        if let Some(count_sql) = &query.count_sql {
            let count_sql = self.expand_entity_name(domain, count_sql.trim());
            let count_sql = self.rewrite_params(id, query, &count_sql)?;

            statements.push(
                CompiledStatement::new(count.clone(), StatementKind::Select, count_sql)
                    .result(result::count_shape()),
            );
        } else if query.paged {
            let body = TRAILING_ORDER_BY.replace(&sql, "");

            statements.push(
                CompiledStatement::new(
                    count.clone(),
                    StatementKind::Select,
                    format!("SELECT COUNT(*) FROM ( {body} ) count_"),
                )
                .result(result::count_shape()),
            );
        }

        if query.paged {
            let mut paged = CompiledStatement::new(
                id.sibling(format!("{}{PAGED_SUFFIX}", id.name)),
                StatementKind::Select,
                self.paged(&sql),
            )
            .paging_companion(count.name);
            paged.result = shape;
            statements.push(paged);
        }

        Ok(statements)
    }

    fn expand_entity_name(&self, domain: &Domain, sql: &str) -> String {
        if !sql.contains(ENTITY_NAME) {
            return sql.to_string();
        }

        let table = domain.table.qualified_name(self.metamodel.dialect());
        sql.replace(ENTITY_NAME, &table)
    }

    /// Rewrites `?N`, `:name`, `:#{..}` and `?#{..}` placeholders to binds.
    fn rewrite_params(&self, id: &StatementId, query: &DeclaredQuery, sql: &str) -> Result<String> {
        let mut out = String::with_capacity(sql.len());
        let mut last = 0;

        for caps in TOKEN.captures_iter(sql) {
            let Some(token) = caps.get(0) else { continue };
            out.push_str(&sql[last..token.start()]);
            last = token.end();

            let Some(placeholder) = caps.get(4) else {
                out.push_str(token.as_str());
                continue;
            };

            let (name, collection) = param(id, query, placeholder.as_str())?;
            out.push_str(&self.placeholder(&caps, name, collection));
        }

        out.push_str(&sql[last..]);
        Ok(out)
    }

    fn placeholder(&self, caps: &Captures<'_>, name: String, collection: bool) -> String {
        let group = |i| caps.get(i).map_or("", |m| m.as_str());
        let (like, open, close) = (group(1), group(2), group(6));
        let mut out = like.to_string();

        if collection {
            // The iteration renders its own parentheses
            if open.is_empty() != close.is_empty() {
                out.push_str(open);
            }
            out.push_str(&self.serializer.serialize_expr(&Expr::Foreach(Foreach::list(name))));
            if open.is_empty() != close.is_empty() {
                out.push_str(close);
            }
            return out;
        }

        let bind = format!("#{{{name}}}");
        out.push_str(open);

        let (leading, trailing) = (caps.get(3).is_some(), caps.get(5).is_some());
        if leading || trailing {
            let mut parts: Vec<&str> = vec![];
            if leading {
                parts.push("'%'");
            }
            parts.push(&bind);
            if trailing {
                parts.push("'%'");
            }
            out.push_str(&self.metamodel.dialect().concat(&parts));
        } else {
            out.push_str(&bind);
        }

        out.push_str(close);
        out
    }

    fn constructor_shape(
        &self,
        domain: &Domain,
        id: &StatementId,
        constructor: &Constructor<'_>,
    ) -> Result<ResultShape> {
        let Some(meta) = self
            .metamodel
            .metadata()
            .class_meta(&ClassId::new(constructor.class))
        else {
            return Err(Error::invalid_query(
                id.to_string(),
                format!("unknown class `{}` in constructor expression", constructor.class),
            ));
        };

        let arity = constructor.args.len();
        if !meta.has_constructor(arity) {
            return Err(Error::mapping_entity(
                meta.id.simple_name(),
                format!("no constructor taking {arity} arguments"),
            ));
        }

        let mappings = constructor
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| ResultMapping {
                column: format!("arg{i}"),
                property: arg.to_string(),
                sql_type: argument_type(domain, arg),
                id: false,
            })
            .collect();

        Ok(ResultShape {
            id: format!("{}Result", id.name),
            kind: ResultKind::Constructor {
                class: meta.id.clone(),
                arity,
            },
            mappings,
            nested: vec![],
            nested_selects: vec![],
        })
    }
}

/// Statement kind from the leading keyword.
fn statement_kind(id: &StatementId, sql: &str) -> Result<StatementKind> {
    let keyword = LEADING_KEYWORD
        .captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase());

    match keyword.as_deref() {
        Some("select" | "with") => Ok(StatementKind::Select),
        Some("insert") => Ok(StatementKind::Insert),
        Some("update") => Ok(StatementKind::Update),
        Some("delete") => Ok(StatementKind::Delete),
        _ => Err(Error::invalid_query(
            id.to_string(),
            "expected SELECT, WITH, INSERT, UPDATE or DELETE",
        )),
    }
}

/// Bind name of a placeholder, and whether it is a collection parameter.
fn param(id: &StatementId, query: &DeclaredQuery, placeholder: &str) -> Result<(String, bool)> {
    let positional = |index: usize| -> Result<(String, bool)> {
        if index == 0 {
            return Err(Error::invalid_query(
                id.to_string(),
                "positional parameters start at 1",
            ));
        }

        Ok(match query.positional(index) {
            Some(decl) => (decl.name.clone(), decl.collection),
            None => (format!("param{index}"), false),
        })
    };
    let named = |name: &str| {
        let collection = query.named(name).is_some_and(|decl| decl.collection);
        (name.to_string(), collection)
    };

    if let Some(expr) = placeholder
        .strip_prefix(":#{")
        .or_else(|| placeholder.strip_prefix("?#{"))
    {
        let expr = expr.trim_end_matches('}').trim();

        if let Some(index) = expr
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|index| index.trim().parse::<usize>().ok())
        {
            return positional(index + 1);
        }

        return Ok(named(expr.strip_prefix('#').unwrap_or(expr)));
    }

    if let Some(index) = placeholder.strip_prefix('?') {
        let index = index.parse::<usize>().map_err(|_| {
            Error::invalid_query(id.to_string(), format!("invalid placeholder `{placeholder}`"))
        })?;
        return positional(index);
    }

    Ok(named(placeholder.trim_start_matches(':')))
}

fn constructor(sql: &str) -> Option<Constructor<'_>> {
    let caps = CONSTRUCTOR.captures(sql)?;
    let open = caps.get(0)?.end();
    let close = open + matching_paren(&sql[open..])?;

    Some(Constructor {
        distinct: caps.get(1).is_some(),
        class: caps.get(2)?.as_str(),
        args: split_top_level(&sql[open..close]),
        rest: &sql[close + 1..],
    })
}

impl Constructor<'_> {
    /// The select with the constructor replaced by aliased arguments.
    fn rewrite(&self) -> String {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let args = self
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| format!("{arg} AS arg{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!("SELECT {distinct}{args}{}", self.rest)
    }
}

/// Offset of the parenthesis closing an already-open one.
fn matching_paren(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;

    for (i, ch) in src.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    None
}

/// Splits on commas outside parentheses and literals.
fn split_top_level(src: &str) -> Vec<&str> {
    let mut parts = vec![];
    let (mut depth, mut quoted, mut start) = (0usize, false, 0);

    for (i, ch) in src.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                parts.push(src[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = src[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// SQL type of a constructor argument, looked up by its last path segment.
fn argument_type(domain: &Domain, arg: &str) -> SqlType {
    let last = arg.rsplit('.').next().unwrap_or(arg).trim();

    domain
        .columns()
        .find(|column| column.property_name() == last || column.name.matches(last))
        .map_or(SqlType::Other, |column| column.sql_type)
}

use regex::Regex;
use std::{fmt, sync::LazyLock};

/// Matches a trailing row-locking clause, e.g. `FOR UPDATE` or
/// `for update nowait`.
static FOR_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+for\s+update(\s+(nowait|skip\s+locked|wait\s+\d+|of\s+[\w.,\s]+))?\s*;?\s*$")
        .expect("FOR UPDATE pattern is valid")
});

/// Matches the leading SELECT keyword, with an optional DISTINCT.
static LEADING_SELECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*select\b(\s+distinct\b)?").expect("SELECT pattern is valid")
});

/// How a product limits the rows returned by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `... LIMIT n OFFSET o`
    LimitOffset,

    /// `... LIMIT o, n`
    LimitComma,

    /// SQL:2008 `... OFFSET o ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,

    /// `SELECT FIRST n SKIP o ...` or, when `skip_first`, `SELECT SKIP o FIRST n ...`
    FirstSkip { skip_first: bool },

    /// Oracle-style wrapping with the `ROWNUM` pseudo column.
    RowNum,

    /// Wrapping with `ROW_NUMBER() OVER ()`. When `top` is set the inner
    /// query is additionally bounded with `TOP`, which products such as SQL
    /// Server require for ordered subqueries, and the window is given the
    /// constant ordering those products insist on.
    RowNumberOver { top: bool },
}

/// A pagination bound: either a literal row count or an already-rendered
/// bind placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Literal(u64),
    Placeholder(String),
}

impl Bound {
    pub fn placeholder(text: impl Into<String>) -> Bound {
        Bound::Placeholder(text.into())
    }

    fn is_zero(&self) -> bool {
        matches!(self, Bound::Literal(0))
    }

    /// The sum of two bounds. Literals are folded, saturating at `u64::MAX`;
    /// otherwise an arithmetic expression is produced.
    fn plus(&self, other: &Bound) -> Bound {
        match (self, other) {
            (Bound::Literal(a), Bound::Literal(b)) => Bound::Literal(a.saturating_add(*b)),
            (a, b) if a.is_zero() => b.clone(),
            (a, b) if b.is_zero() => a.clone(),
            (a, b) => Bound::Placeholder(format!("{a} + {b}")),
        }
    }

    /// Renders the bound where a single term is expected.
    fn term(&self) -> String {
        match self {
            Bound::Placeholder(text) if text.contains(' ') => format!("({text})"),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(n) => write!(f, "{n}"),
            Bound::Placeholder(text) => f.write_str(text),
        }
    }
}

impl From<u64> for Bound {
    fn from(value: u64) -> Self {
        Bound::Literal(value)
    }
}

impl Pagination {
    /// Returns `true` for the styles that nest the query in subqueries.
    pub fn is_wrap(&self) -> bool {
        matches!(self, Pagination::RowNum | Pagination::RowNumberOver { .. })
    }

    /// Applies the pagination style to `sql`.
    ///
    /// An offset of `None` or literal zero is omitted. A trailing `FOR UPDATE`
    /// clause is moved after the pagination so that it applies to the outer
    /// query. The result is a pure function of the inputs.
    pub fn paginate(&self, sql: &str, offset: Option<&Bound>, limit: &Bound) -> String {
        let (body, lock) = split_for_update(sql);
        let offset = offset.filter(|offset| !offset.is_zero());

        let mut ret = match self {
            Pagination::LimitOffset => match offset {
                Some(offset) => format!("{body} LIMIT {limit} OFFSET {offset}"),
                None => format!("{body} LIMIT {limit}"),
            },
            Pagination::LimitComma => match offset {
                Some(offset) => format!("{body} LIMIT {offset}, {limit}"),
                None => format!("{body} LIMIT {limit}"),
            },
            Pagination::OffsetFetch => match offset {
                Some(offset) => {
                    format!("{body} OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
                }
                None => format!("{body} FETCH FIRST {limit} ROWS ONLY"),
            },
            Pagination::FirstSkip { skip_first } => {
                let clause = match (offset, *skip_first) {
                    (Some(offset), true) => {
                        format!(" SKIP {} FIRST {}", offset.term(), limit.term())
                    }
                    (Some(offset), false) => {
                        format!(" FIRST {} SKIP {}", limit.term(), offset.term())
                    }
                    (None, _) => format!(" FIRST {}", limit.term()),
                };
                insert_after_select(body, &clause, false)
            }
            Pagination::RowNum => match offset {
                Some(offset) => {
                    let upper = offset.plus(limit);
                    format!(
                        "SELECT * FROM ( SELECT row_.*, ROWNUM rownum_ FROM ( {body} ) row_ WHERE ROWNUM <= {upper} ) WHERE rownum_ > {offset}"
                    )
                }
                None => format!("SELECT * FROM ( {body} ) WHERE ROWNUM <= {limit}"),
            },
            Pagination::RowNumberOver { top } => {
                let upper = match offset {
                    Some(offset) => offset.plus(limit),
                    None => limit.clone(),
                };
                let inner = if *top {
                    insert_after_select(body, &format!(" TOP ({upper})"), true)
                } else {
                    body.to_string()
                };
                let filter = match offset {
                    Some(offset) => {
                        format!("rownumber_ > {offset} AND rownumber_ <= {upper}")
                    }
                    None => format!("rownumber_ <= {upper}"),
                };
                let window = if *top { "ORDER BY (SELECT 0)" } else { "" };
                format!(
                    "SELECT * FROM ( SELECT inner_.*, ROW_NUMBER() OVER ({window}) AS rownumber_ FROM ( {inner} ) inner_ ) outer_ WHERE {filter} ORDER BY rownumber_"
                )
            }
        };

        if let Some(lock) = lock {
            ret.push(' ');
            ret.push_str(lock);
        }

        ret
    }
}

/// Splits a trailing row-locking clause off the statement.
fn split_for_update(sql: &str) -> (&str, Option<&str>) {
    let sql = sql.trim_end();
    match FOR_UPDATE.find(sql) {
        Some(m) => (
            sql[..m.start()].trim_end(),
            Some(m.as_str().trim().trim_end_matches(';').trim_end()),
        ),
        None => (sql.trim_end_matches(';').trim_end(), None),
    }
}

/// Inserts `clause` right after the leading `SELECT`, or after `SELECT
/// DISTINCT` when `after_distinct` is set. A statement that does not start
/// with SELECT is wrapped first.
fn insert_after_select(sql: &str, clause: &str, after_distinct: bool) -> String {
    let Some(captures) = LEADING_SELECT.captures(sql) else {
        return format!("SELECT{clause} * FROM ( {sql} ) paged_");
    };

    let at = match captures.get(1) {
        Some(distinct) if !after_distinct => distinct.start(),
        _ => captures.get(0).map_or(0, |m| m.end()),
    };

    format!("{}{}{}", &sql[..at], clause, &sql[at..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SQL: &str = "SELECT id, name FROM shop WHERE active = #{active}";

    #[test]
    fn limit_offset() {
        let p = Pagination::LimitOffset;
        assert_eq!(
            p.paginate(SQL, None, &Bound::Literal(2)),
            format!("{SQL} LIMIT 2")
        );
        assert_eq!(
            p.paginate(SQL, Some(&Bound::Literal(0)), &Bound::Literal(2)),
            format!("{SQL} LIMIT 2")
        );
        assert_eq!(
            p.paginate(SQL, Some(&Bound::Literal(4)), &Bound::Literal(2)),
            format!("{SQL} LIMIT 2 OFFSET 4")
        );
    }

    #[test]
    fn limit_comma() {
        let p = Pagination::LimitComma;
        assert_eq!(
            p.paginate(SQL, Some(&Bound::Literal(10)), &Bound::Literal(5)),
            format!("{SQL} LIMIT 10, 5")
        );
    }

    #[test]
    fn offset_fetch() {
        let p = Pagination::OffsetFetch;
        assert_eq!(
            p.paginate(SQL, None, &Bound::Literal(3)),
            format!("{SQL} FETCH FIRST 3 ROWS ONLY")
        );
        assert_eq!(
            p.paginate(SQL, Some(&Bound::Literal(6)), &Bound::Literal(3)),
            format!("{SQL} OFFSET 6 ROWS FETCH NEXT 3 ROWS ONLY")
        );
    }

    #[test]
    fn first_skip() {
        let informix = Pagination::FirstSkip { skip_first: true };
        assert_eq!(
            informix.paginate("select distinct a from t", Some(&Bound::Literal(5)), &Bound::Literal(10)),
            "select SKIP 5 FIRST 10 distinct a from t"
        );

        let firebird = Pagination::FirstSkip { skip_first: false };
        assert_eq!(
            firebird.paginate("SELECT a FROM t", None, &Bound::Literal(10)),
            "SELECT FIRST 10 a FROM t"
        );
    }

    #[test]
    fn rownum_wrap_contains_both_bounds() {
        let sql = Pagination::RowNum.paginate(SQL, Some(&Bound::Literal(5)), &Bound::Literal(10));
        assert!(sql.contains("ROWNUM <= 15"), "{sql}");
        assert!(sql.contains("rownum_ > 5"), "{sql}");
        assert!(sql.contains(SQL));
        assert!(Pagination::RowNum.is_wrap());
        assert!(!Pagination::LimitOffset.is_wrap());
    }

    #[test]
    fn row_number_over_wrap_contains_both_bounds() {
        let sql = Pagination::RowNumberOver { top: false }.paginate(
            SQL,
            Some(&Bound::Literal(5)),
            &Bound::Literal(10),
        );
        assert!(sql.contains("rownumber_ > 5"), "{sql}");
        assert!(sql.contains("rownumber_ <= 15"), "{sql}");

        let sql = Pagination::RowNumberOver { top: true }.paginate(
            SQL,
            Some(&Bound::Literal(5)),
            &Bound::Literal(10),
        );
        assert!(sql.contains("SELECT TOP (15) id, name"), "{sql}");
        assert!(sql.contains("ROW_NUMBER() OVER (ORDER BY (SELECT 0)) AS rownumber_"), "{sql}");
    }

    #[test]
    fn row_number_over_without_top() {
        assert_eq!(
            Pagination::RowNumberOver { top: false }.paginate("SELECT a FROM t", None, &Bound::Literal(3)),
            "SELECT * FROM ( SELECT inner_.*, ROW_NUMBER() OVER () AS rownumber_ FROM ( SELECT a FROM t ) inner_ ) outer_ WHERE rownumber_ <= 3 ORDER BY rownumber_"
        );
    }

    #[test]
    fn literal_upper_bound_saturates() {
        let sql = Pagination::RowNum.paginate(SQL, Some(&Bound::Literal(u64::MAX)), &Bound::Literal(2));
        assert!(sql.contains(&format!("ROWNUM <= {}", u64::MAX)), "{sql}");
        assert!(sql.contains(&format!("rownum_ > {}", u64::MAX)), "{sql}");
    }

    #[test]
    fn wrap_relocates_for_update() {
        for style in [Pagination::RowNum, Pagination::RowNumberOver { top: false }] {
            let sql = style.paginate(
                "select * from shop where id = #{id} for update",
                Some(&Bound::Literal(5)),
                &Bound::Literal(10),
            );
            assert!(sql.ends_with(" for update"), "{sql}");
            assert_eq!(sql.matches("for update").count(), 1, "{sql}");
            let wrapper_close = sql.rfind(')').unwrap();
            assert!(sql.rfind("for update").unwrap() > wrapper_close, "{sql}");
        }
    }

    #[test]
    fn append_keeps_lock_clause_last() {
        let sql = Pagination::LimitOffset.paginate(
            "SELECT * FROM shop FOR UPDATE NOWAIT",
            None,
            &Bound::Literal(1),
        );
        assert_eq!(sql, "SELECT * FROM shop LIMIT 1 FOR UPDATE NOWAIT");
    }

    #[test]
    fn placeholder_bounds() {
        let offset = Bound::placeholder("#{offset}");
        let limit = Bound::placeholder("#{pageSize}");

        assert_eq!(
            Pagination::LimitOffset.paginate(SQL, Some(&offset), &limit),
            format!("{SQL} LIMIT #{{pageSize}} OFFSET #{{offset}}")
        );

        let sql = Pagination::RowNum.paginate(SQL, Some(&offset), &limit);
        assert!(sql.contains("ROWNUM <= #{offset} + #{pageSize}"), "{sql}");
        assert!(sql.contains("rownum_ > #{offset}"), "{sql}");
    }

    #[test]
    fn deterministic() {
        for style in [
            Pagination::LimitOffset,
            Pagination::LimitComma,
            Pagination::OffsetFetch,
            Pagination::FirstSkip { skip_first: true },
            Pagination::RowNum,
            Pagination::RowNumberOver { top: true },
        ] {
            let a = style.paginate(SQL, None, &Bound::Literal(7));
            let b = style.paginate(SQL, None, &Bound::Literal(7));
            assert_eq!(a, b);
        }
    }
}

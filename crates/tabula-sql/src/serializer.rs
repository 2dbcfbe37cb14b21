#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod ident;
use ident::Ident;

// Fragment serializers
mod dml;
mod expr;
mod select;

use crate::stmt::Statement;

use tabula_core::{config::CaseFolding, Config, Dialect};

/// Serialize a statement tree to a SQL template.
///
/// Templates carry `#{name}` binds and `<foreach>` iteration constructs in
/// place of driver placeholders; the execution layer binds them.
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Quoting, concatenation and literal syntax.
    dialect: &'a Dialect,

    /// How case-insensitive comparisons fold.
    case_folding: &'a CaseFolding,
}

struct Formatter<'a> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,
}

impl<'a> Serializer<'a> {
    pub fn new(dialect: &'a Dialect, config: &'a Config) -> Serializer<'a> {
        Serializer {
            dialect,
            case_folding: &config.case_folding,
        }
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    pub fn serialize(&self, stmt: &Statement) -> String {
        self.render(stmt)
    }

    /// Renders a single expression, e.g. for a fragment spliced into
    /// hand-written SQL.
    pub fn serialize_expr(&self, expr: &crate::stmt::Expr) -> String {
        self.render(expr)
    }

    fn render(&self, fragment: impl ToSql) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
        };

        fragment.to_sql(&mut fmt);
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{ColumnRef, Delete, Expr, Foreach, TableRef};
    use tabula_core::dialect::Identifier;

    fn make_delete(filter: Expr) -> Statement {
        Delete {
            table: TableRef::named(Identifier::plain("shop")),
            filter: Some(filter),
        }
        .into()
    }

    fn column(name: &str) -> Expr {
        Expr::column(ColumnRef::new(&Identifier::plain(name)))
    }

    #[test]
    fn or_of_and_groups_is_parenthesized() {
        let config = Config::default();
        let serializer = Serializer::new(&Dialect::POSTGRESQL, &config);

        let filter = Expr::or(vec![
            Expr::and(vec![
                Expr::eq(column("name"), Expr::bind("name")),
                Expr::is_null(column("closed_at"), false),
            ]),
            Expr::eq(column("id"), Expr::bind("id")),
        ]);

        assert_eq!(
            serializer.serialize(&make_delete(filter)),
            "DELETE FROM shop WHERE (name = #{name} AND closed_at IS NULL) OR id = #{id}"
        );
    }

    #[test]
    fn collection_binds_render_an_iteration() {
        let config = Config::default();
        let serializer = Serializer::new(&Dialect::MYSQL, &config);

        let filter = Expr::InCollection {
            expr: Box::new(column("id")),
            collection: Foreach::list("ids"),
            negate: true,
        };

        assert_eq!(
            serializer.serialize(&make_delete(filter)),
            r#"DELETE FROM shop WHERE id NOT IN <foreach collection="ids" item="item" open="(" separator=", " close=")">#{item}</foreach>"#
        );
    }

    #[test]
    fn folding_follows_config() {
        let mut config = Config::default();
        config.case_folding(CaseFolding::Collate("nocase".to_string()));
        let serializer = Serializer::new(&Dialect::SQLITE, &config);

        let expr = Expr::eq(Expr::fold(column("name")), Expr::bind("name"));
        assert_eq!(serializer.serialize_expr(&expr), "name COLLATE nocase = #{name}");

        let config = Config::default();
        let serializer = Serializer::new(&Dialect::SQLITE, &config);
        let expr = Expr::eq(Expr::fold(column("name")), Expr::fold(Expr::bind("name")));
        assert_eq!(serializer.serialize_expr(&expr), "UPPER(name) = UPPER(#{name})");
    }

    #[test]
    fn reserved_words_are_quoted() {
        let config = Config::default();
        let serializer = Serializer::new(&Dialect::MYSQL, &config);

        let stmt = Delete {
            table: TableRef::named(Identifier::plain("order")),
            filter: None,
        }
        .into();

        assert_eq!(serializer.serialize(&stmt), "DELETE FROM `order`");
    }
}

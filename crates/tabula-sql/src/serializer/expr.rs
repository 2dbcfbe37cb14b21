use super::{Comma, Delimited, Formatter, ToSql};

use crate::stmt::{self, BinaryOp, Expr};
use tabula_core::config::CaseFolding;

/// Renders an operand of AND/OR, parenthesizing nested compound predicates.
struct Operand<'a>(&'a Expr);

impl ToSql for &Expr {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Expr::And(operands) => {
                fmt!(f, Delimited(operands.iter().map(Operand), " AND "));
            }
            Expr::Or(operands) => {
                fmt!(f, Delimited(operands.iter().map(Operand), " OR "));
            }
            Expr::BinaryOp { lhs, op, rhs } => {
                let (lhs, op, rhs) = (&**lhs, *op, &**rhs);
                fmt!(f, lhs " " op " " rhs);
            }
            Expr::Between { expr, low, high } => {
                let (expr, low, high) = (&**expr, &**low, &**high);
                fmt!(f, expr " BETWEEN " low " AND " high);
            }
            Expr::Bind(name) => {
                fmt!(f, "#{" name "}");
            }
            Expr::Column(column) => {
                fmt!(f, column);
            }
            Expr::Concat(parts) => {
                let parts: Vec<String> = parts
                    .iter()
                    .map(|part| f.serializer.render(part))
                    .collect();
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                let sql = f.serializer.dialect.concat(&parts);
                fmt!(f, sql);
            }
            Expr::Fold(expr) => {
                let expr = &**expr;
                let case_folding = f.serializer.case_folding;
                match case_folding {
                    CaseFolding::Upper => fmt!(f, "UPPER(" expr ")"),
                    CaseFolding::Lower => fmt!(f, "LOWER(" expr ")"),
                    CaseFolding::Collate(collation) => fmt!(f, expr " COLLATE " collation),
                }
            }
            Expr::Foreach(foreach) => {
                fmt!(f, foreach);
            }
            Expr::InList {
                expr,
                items,
                negate,
            } => {
                let expr = &**expr;
                let op = if *negate { " NOT IN (" } else { " IN (" };
                fmt!(f, expr op Comma(items) ")");
            }
            Expr::InCollection {
                expr,
                collection,
                negate,
            } => {
                let expr = &**expr;
                let op = if *negate { " NOT IN " } else { " IN " };
                fmt!(f, expr op collection);
            }
            Expr::IsNull { expr, negate } => {
                let expr = &**expr;
                let op = if *negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, expr op);
            }
            Expr::Like {
                expr,
                pattern,
                negate,
            } => {
                let (expr, pattern) = (&**expr, &**pattern);
                let op = if *negate { " NOT LIKE " } else { " LIKE " };
                fmt!(f, expr op pattern);
            }
            Expr::Raw(sql) => {
                fmt!(f, sql);
            }
            Expr::Regex { expr, pattern } => {
                let column = f.serializer.render(&**expr);
                let pattern = f.serializer.render(&**pattern);

                // Capability is checked when the tree is built
                if let Some(template) = f.serializer.dialect.capabilities.regex {
                    let sql = template
                        .replace("{column}", &column)
                        .replace("{pattern}", &pattern);
                    fmt!(f, sql);
                }
            }
        }
    }
}

impl ToSql for Operand<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if self.0.is_compound() {
            fmt!(f, "(" self.0 ")");
        } else {
            fmt!(f, self.0);
        }
    }
}

impl ToSql for BinaryOp {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
        });
    }
}

impl ToSql for &stmt::Foreach {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let (collection, item, body) = (&self.collection, &self.item, &*self.body);

        fmt!(
            f, "<foreach collection=\"" collection "\" item=\"" item
            "\" open=\"" self.open "\" separator=\"" self.separator
            "\" close=\"" self.close "\">" body "</foreach>"
        );
    }
}

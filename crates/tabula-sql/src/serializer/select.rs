use super::{Comma, Formatter, ToSql};

use crate::stmt::{self, JoinKind, Projection};

impl ToSql for &stmt::Statement {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Select(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let projection = &self.projection;
        let from = &self.from;

        fmt!(f, "SELECT " distinct projection " FROM " from);

        for join in &self.joins {
            fmt!(f, join);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }
    }
}

impl ToSql for &Projection {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Projection::Columns(items) => fmt!(f, Comma(items)),
            Projection::Count => fmt!(f, "COUNT(*)"),
            Projection::One => fmt!(f, "1"),
        }
    }
}

impl ToSql for &stmt::SelectItem {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let column = &self.column;
        fmt!(f, column);

        if let Some(label) = self.label.as_ref().filter(|label| **label != column.name.name) {
            fmt!(f, " AS " label);
        }
    }
}

impl ToSql for &stmt::Join {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let kind = match self.kind {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::LeftOuter => " LEFT OUTER JOIN ",
        };
        let (table, on) = (&self.table, &self.on);

        fmt!(f, kind table " ON " on);
    }
}

impl ToSql for &stmt::OrderTerm {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let expr = &self.expr;
        fmt!(f, expr " " self.direction.as_sql());
    }
}

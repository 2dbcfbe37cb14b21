use super::{Comma, Formatter, Ident, ToSql};

use crate::stmt;

/// `<if test="path != null">body</if>` around selective fragments.
struct Guarded<'a, T> {
    test: Option<&'a str>,
    body: T,
}

impl<T: ToSql> ToSql for Guarded<'_, T> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self.test {
            Some(test) => fmt!(f, "<if test=\"" test " != null\">" self.body "</if>"),
            None => fmt!(f, self.body),
        }
    }
}

struct ColumnName<'a>(&'a stmt::InsertColumn);

struct Value<'a>(&'a stmt::InsertColumn);

impl ToSql for ColumnName<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(&self.0.name));
    }
}

impl ToSql for Value<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, &self.0.value);
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;

        if !self.selective {
            let columns = Comma(self.columns.iter().map(ColumnName));
            let values = Comma(self.columns.iter().map(Value));
            fmt!(f, "INSERT INTO " table " (" columns ") VALUES (" values ")");
            return;
        }

        fmt!(f, "INSERT INTO " table " <trim prefix=\"(\" suffix=\")\" suffixOverrides=\",\">");
        for column in &self.columns {
            let test = column.test.as_deref();
            fmt!(f, Guarded { test, body: ColumnName(column) } ",");
        }
        fmt!(f, "</trim> <trim prefix=\"VALUES (\" suffix=\")\" suffixOverrides=\",\">");
        for column in &self.columns {
            let test = column.test.as_deref();
            fmt!(f, Guarded { test, body: Value(column) } ",");
        }
        fmt!(f, "</trim>");
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let value = &self.value;
        fmt!(f, Ident(&self.column) " = " value);
    }
}

impl ToSql for &stmt::Update {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;

        if self.selective {
            fmt!(f, "UPDATE " table " <set>");
            for assignment in &self.assignments {
                let test = assignment.test.as_deref();
                fmt!(f, Guarded { test, body: assignment } ",");
            }
            fmt!(f, "</set>");
        } else {
            fmt!(f, "UPDATE " table " SET " Comma(&self.assignments));
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let table = &self.table;
        fmt!(f, "DELETE FROM " table);

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }
    }
}

use super::{Formatter, ToSql};

use crate::stmt::{ColumnRef, TableRef};
use tabula_core::dialect::Identifier;

pub(super) struct Ident<'a>(pub(super) &'a Identifier);

impl ToSql for Ident<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let rendered = f.serializer.dialect.ident(self.0);
        f.dst.push_str(&rendered);
    }
}

/// A table alias or column qualifier. Aliases derived from entity or
/// property names may be reserved words.
struct Alias<'a>(&'a str);

impl ToSql for Alias<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(&Identifier::plain(self.0)));
    }
}

impl ToSql for &ColumnRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        if let Some(qualifier) = &self.qualifier {
            fmt!(f, Alias(qualifier) ".");
        }

        fmt!(f, Ident(&self.name));
    }
}

impl ToSql for &TableRef {
    fn to_sql(self, f: &mut Formatter<'_>) {
        for part in [&self.catalog, &self.schema].into_iter().flatten() {
            fmt!(f, Ident(part) ".");
        }

        fmt!(f, Ident(&self.name));

        // A table aliased by its own name is addressed by that name anyway
        if let Some(alias) = self.alias.as_ref().filter(|alias| **alias != self.name.name) {
            fmt!(f, " " Alias(alias));
        }
    }
}

use std::{collections::HashSet, fmt, sync::LazyLock};

/// SQL reserved words that must be quoted when used as identifiers.
static RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "all", "alter", "and", "as", "between", "by", "case", "check", "column", "constraint",
        "create", "cross", "current", "default", "delete", "desc", "distinct", "drop", "else",
        "end", "exists", "false", "fetch", "for", "foreign", "from", "full", "grant", "group",
        "having", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "key",
        "left", "like", "limit", "not", "null", "offset", "on", "or", "order", "outer",
        "primary", "references", "right", "rownum", "select", "set", "table", "then", "to",
        "true", "union", "unique", "update", "user", "using", "values", "when", "where", "with",
    ]
    .into_iter()
    .collect()
});

/// How a product folds identifiers when they are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentCase {
    Preserve,
    Lower,
    Upper,
}

/// Identifier quoting characters and casing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoting {
    pub open: char,
    pub close: char,
    pub casing: IdentCase,

    /// When set, every identifier is quoted.
    pub always: bool,
}

/// A table or column name as declared in metadata.
///
/// Names declared wrapped in back-ticks or double quotes are remembered as
/// explicitly quoted; they are always rendered quoted and their case is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub quoted: bool,
}

impl Quoting {
    pub const ANSI: Quoting = Quoting {
        open: '"',
        close: '"',
        casing: IdentCase::Preserve,
        always: false,
    };

    pub const ANSI_UPPER: Quoting = Quoting {
        casing: IdentCase::Upper,
        ..Quoting::ANSI
    };

    pub const BACKTICK: Quoting = Quoting {
        open: '`',
        close: '`',
        casing: IdentCase::Lower,
        always: false,
    };

    pub const BRACKET: Quoting = Quoting {
        open: '[',
        close: ']',
        casing: IdentCase::Preserve,
        always: false,
    };

    /// Quotes `name`, applying the casing policy and doubling any embedded
    /// closing quote character.
    pub fn quote(&self, name: &str) -> String {
        let name = match self.casing {
            IdentCase::Preserve => name.to_string(),
            IdentCase::Lower => name.to_lowercase(),
            IdentCase::Upper => name.to_uppercase(),
        };
        self.wrap(&name)
    }

    fn wrap(&self, name: &str) -> String {
        let mut ret = String::with_capacity(name.len() + 2);
        ret.push(self.open);
        for c in name.chars() {
            if c == self.close {
                ret.push(c);
            }
            ret.push(c);
        }
        ret.push(self.close);
        ret
    }

    pub(super) fn render(&self, ident: &Identifier) -> String {
        if ident.quoted {
            self.wrap(&ident.name)
        } else if self.always || needs_quoting(&ident.name) {
            self.quote(&ident.name)
        } else {
            ident.name.clone()
        }
    }
}

/// Returns `true` if `name` is a reserved word or is not a plain identifier.
pub(crate) fn needs_quoting(name: &str) -> bool {
    RESERVED_WORDS.contains(name.to_ascii_lowercase().as_str())
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().is_some_and(|c| c.is_numeric())
}

impl Identifier {
    /// Parses a declared name, recognizing explicit back-tick or double-quote
    /// quoting.
    pub fn parse(declared: &str) -> Identifier {
        let declared = declared.trim();

        for (open, close) in [('`', '`'), ('"', '"')] {
            if declared.len() >= 2 && declared.starts_with(open) && declared.ends_with(close) {
                return Identifier {
                    name: declared[1..declared.len() - 1].to_string(),
                    quoted: true,
                };
            }
        }

        Identifier {
            name: declared.to_string(),
            quoted: false,
        }
    }

    pub fn plain(name: impl Into<String>) -> Identifier {
        Identifier {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name comparison, the way unquoted SQL names compare.
    pub fn matches(&self, name: &str) -> bool {
        if self.quoted {
            self.name == name
        } else {
            self.name.eq_ignore_ascii_case(name)
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::parse(value)
    }
}

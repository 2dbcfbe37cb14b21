use super::ColumnRef;

/// A SQL expression or predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All operands must hold.
    And(Vec<Expr>),

    /// Any operand may hold.
    Or(Vec<Expr>),

    BinaryOp {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },

    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },

    /// `#{name}`
    Bind(String),

    Column(ColumnRef),

    /// Dialect string concatenation.
    Concat(Vec<Expr>),

    /// Case folding as configured, e.g. `UPPER(expr)`.
    Fold(Box<Expr>),

    /// Iteration over a collection parameter.
    Foreach(Foreach),

    /// `expr [NOT] IN (items)`
    InList {
        expr: Box<Expr>,
        items: Vec<Expr>,
        negate: bool,
    },

    /// `expr [NOT] IN <foreach ..>`, the iteration renders the parentheses.
    InCollection {
        expr: Box<Expr>,
        collection: Foreach,
        negate: bool,
    },

    IsNull {
        expr: Box<Expr>,
        negate: bool,
    },

    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negate: bool,
    },

    /// Verbatim SQL, e.g. a quoted literal.
    Raw(String),

    /// Dialect regex match.
    Regex {
        expr: Box<Expr>,
        pattern: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
}

/// `<foreach collection=".." item=".." open=".." separator=".." close="..">body</foreach>`
#[derive(Debug, Clone, PartialEq)]
pub struct Foreach {
    pub collection: String,
    pub item: String,
    pub open: &'static str,
    pub separator: &'static str,
    pub close: &'static str,
    pub body: Box<Expr>,
}

impl Expr {
    pub fn column(column: ColumnRef) -> Expr {
        Expr::Column(column)
    }

    pub fn bind(name: impl Into<String>) -> Expr {
        Expr::Bind(name.into())
    }

    pub fn raw(sql: impl Into<String>) -> Expr {
        Expr::Raw(sql.into())
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn fold(expr: impl Into<Expr>) -> Expr {
        Expr::Fold(Box::new(expr.into()))
    }

    pub fn is_null(expr: impl Into<Expr>, negate: bool) -> Expr {
        Expr::IsNull {
            expr: Box::new(expr.into()),
            negate,
        }
    }

    /// Conjunction that collapses to its single operand.
    pub fn and(operands: Vec<Expr>) -> Expr {
        Expr::flatten(operands, Expr::And)
    }

    /// Disjunction that collapses to its single operand.
    pub fn or(operands: Vec<Expr>) -> Expr {
        Expr::flatten(operands, Expr::Or)
    }

    fn flatten(mut operands: Vec<Expr>, f: fn(Vec<Expr>) -> Expr) -> Expr {
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            f(operands)
        }
    }

    pub(crate) fn is_compound(&self) -> bool {
        matches!(self, Expr::And(operands) | Expr::Or(operands) if operands.len() > 1)
    }
}

impl From<ColumnRef> for Expr {
    fn from(value: ColumnRef) -> Self {
        Expr::Column(value)
    }
}

impl Foreach {
    /// `(#{item}, #{item}, ...)` over `collection`.
    pub fn list(collection: impl Into<String>) -> Foreach {
        Foreach {
            collection: collection.into(),
            item: "item".to_string(),
            open: "(",
            separator: ", ",
            close: ")",
            body: Box::new(Expr::bind("item")),
        }
    }
}

use super::Order;

/// A query derived from a parsed predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateQuery {
    pub name: String,
    pub subject: Subject,
    pub distinct: bool,

    /// Disjunction of conjunctions: the groups are OR-ed, the parts of a group
    /// AND-ed. An empty tree matches every row.
    pub tree: Vec<AndGroup>,

    pub sort: Vec<Order>,

    /// `first N` / `top N`.
    pub limit: Option<u64>,

    pub paging: Paging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Find,
    Count,
    Exists,
    Delete {
        /// The deleted rows are returned, so a select with the same predicate
        /// runs first.
        return_deleted: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndGroup {
    pub parts: Vec<Part>,
}

/// One condition on one property.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Dotted property path.
    pub property: String,
    pub operator: Operator,
    pub ignore_case: bool,

    /// Parameter names. When empty, names are generated in order of
    /// appearance across the query.
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Before,
    After,
    Between,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    StartingWith,
    EndingWith,
    Containing,
    NotContaining,
    In(InArg),
    NotIn(InArg),
    True,
    False,
    Regex,
}

/// Argument shape of IN / NOT IN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InArg {
    /// A fixed number of discrete parameters.
    List(usize),

    /// One collection parameter, expanded at execution time.
    Collection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Paging {
    #[default]
    None,

    /// Compile-time offset and page size.
    Fixed { offset: u64, size: u64 },

    /// Offset and page size bound at execution time.
    Pageable,
}

impl PredicateQuery {
    pub fn find(name: &str) -> PredicateQuery {
        PredicateQuery {
            name: name.to_string(),
            subject: Subject::Find,
            distinct: false,
            tree: vec![],
            sort: vec![],
            limit: None,
            paging: Paging::None,
        }
    }

    pub fn count(name: &str) -> PredicateQuery {
        PredicateQuery {
            subject: Subject::Count,
            ..PredicateQuery::find(name)
        }
    }

    pub fn exists(name: &str) -> PredicateQuery {
        PredicateQuery {
            subject: Subject::Exists,
            ..PredicateQuery::find(name)
        }
    }

    pub fn delete(name: &str, return_deleted: bool) -> PredicateQuery {
        PredicateQuery {
            subject: Subject::Delete { return_deleted },
            ..PredicateQuery::find(name)
        }
    }

    /// Adds an AND group, OR-ed with the existing ones.
    pub fn or(mut self, parts: impl IntoIterator<Item = Part>) -> PredicateQuery {
        self.tree.push(AndGroup {
            parts: parts.into_iter().collect(),
        });
        self
    }

    pub fn distinct(mut self) -> PredicateQuery {
        self.distinct = true;
        self
    }

    pub fn order_by(mut self, order: Order) -> PredicateQuery {
        self.sort.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> PredicateQuery {
        self.limit = Some(limit);
        self
    }

    pub fn paging(mut self, paging: Paging) -> PredicateQuery {
        self.paging = paging;
        self
    }
}

impl Part {
    pub fn new(property: &str, operator: Operator) -> Part {
        Part {
            property: property.to_string(),
            operator,
            ignore_case: false,
            params: vec![],
        }
    }

    pub fn ignore_case(mut self) -> Part {
        self.ignore_case = true;
        self
    }

    pub fn param(mut self, name: &str) -> Part {
        self.params.push(name.to_string());
        self
    }
}

impl Operator {
    /// Number of parameters the operator consumes.
    pub fn arity(&self) -> usize {
        match self {
            Operator::IsNull | Operator::IsNotNull | Operator::True | Operator::False => 0,
            Operator::Between => 2,
            Operator::In(InArg::List(n)) | Operator::NotIn(InArg::List(n)) => *n,
            _ => 1,
        }
    }

    /// Operators whose operand is a string pattern.
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            Operator::Like
                | Operator::NotLike
                | Operator::StartingWith
                | Operator::EndingWith
                | Operator::Containing
                | Operator::NotContaining
        )
    }
}

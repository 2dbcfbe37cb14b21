use super::{
    count_name, result,
    scope::{EntitySelect, Scope},
    Precompiler, PAGED_SUFFIX, SELECT_SUFFIX,
};
use crate::stmt::{BinaryOp, Delete, Expr, Foreach, OrderTerm, Projection, Select};

use tabula_core::{
    config::CaseFolding,
    dialect::Bound,
    registry::{CompiledStatement, ResultShape, StatementId, StatementKind},
    schema::{Column, Domain, SqlType},
    stmt::{InArg, Operator, Order, Paging, Part, PredicateQuery, Subject},
    Error, Result,
};

use std::sync::Arc;

/// How one condition folds case.
#[derive(Debug, Clone, Copy)]
struct Folding {
    enabled: bool,

    /// Collations apply to the column side only.
    lhs_only: bool,
}

impl Folding {
    fn lhs(self, expr: Expr) -> Expr {
        if self.enabled {
            Expr::fold(expr)
        } else {
            expr
        }
    }

    fn rhs(self, expr: Expr) -> Expr {
        if self.enabled && !self.lhs_only {
            Expr::fold(expr)
        } else {
            expr
        }
    }
}

impl Precompiler<'_> {
    /// Statements for a query derived from a predicate tree.
    pub(super) fn predicate(
        &self,
        domain: &Domain,
        id: &StatementId,
        query: &PredicateQuery,
    ) -> Result<Vec<CompiledStatement>> {
        let plain = Scope::plain(domain);
        let plain_filter = self.filter(&plain, id, query)?;

        let mut statements = vec![];

        match query.subject {
            Subject::Find => {
                let EntitySelect {
                    scope,
                    mut select,
                    result,
                } = self.entity_select(domain, &id.namespace)?;

                select.distinct = query.distinct;
                select.filter = self.filter(&scope, id, query)?;
                select.order_by = self.order_terms(&scope, id, &query.sort)?;

                let sql = self.serializer.serialize(&select.clone().into());
                let dialect = self.metamodel.dialect();

                let bounded = match (query.paging, query.limit) {
                    (Paging::Fixed { offset, size }, _) => dialect.paginate(
                        &sql,
                        Some(&Bound::Literal(offset)),
                        &Bound::Literal(size),
                    ),
                    (_, Some(limit)) => dialect.paginate(&sql, None, &Bound::Literal(limit)),
                    _ => sql.clone(),
                };

                statements.push(
                    CompiledStatement::new(id.clone(), StatementKind::Select, bounded)
                        .result(result.clone()),
                );

                let count = id.sibling(count_name(&id.name));
                statements.push(self.count(count.clone(), &plain, plain_filter, query.distinct));

                if query.paging == Paging::Pageable {
                    statements.push(
                        CompiledStatement::new(
                            id.sibling(format!("{}{PAGED_SUFFIX}", id.name)),
                            StatementKind::Select,
                            self.paged(&sql),
                        )
                        .result(result)
                        .paging_companion(count.name),
                    );
                }
            }
            Subject::Count => {
                statements.push(self.count(id.clone(), &plain, plain_filter, query.distinct));
            }
            Subject::Exists => {
                let mut select = Select::new(plain.table.clone(), Projection::One);
                select.filter = plain_filter;

                let sql = self.serializer.serialize(&select.into());
                let sql = self
                    .metamodel
                    .dialect()
                    .paginate(&sql, None, &Bound::Literal(1));

                statements.push(
                    CompiledStatement::new(id.clone(), StatementKind::Select, sql)
                        .result(Arc::new(ResultShape::scalar("__exists", SqlType::Integer))),
                );
            }
            Subject::Delete { return_deleted } => {
                let delete = Delete {
                    table: plain.table.clone(),
                    filter: plain_filter,
                };
                statements.push(self.statement(id.clone(), &delete.into(), None));

                if return_deleted {
                    let EntitySelect {
                        scope,
                        mut select,
                        result,
                    } = self.entity_select(domain, &id.namespace)?;
                    select.filter = self.filter(&scope, id, query)?;

                    statements.push(self.statement(
                        id.sibling(format!("{}{SELECT_SUFFIX}", id.name)),
                        &select.into(),
                        Some(result),
                    ));
                }
            }
        }

        Ok(statements)
    }

    /// `COUNT(*)` over the rows matching `filter`. Distinct counts wrap the
    /// distinct select.
    fn count(
        &self,
        id: StatementId,
        scope: &Scope<'_>,
        filter: Option<Expr>,
        distinct: bool,
    ) -> CompiledStatement {
        if !distinct {
            let mut select = Select::new(scope.table.clone(), Projection::Count);
            select.filter = filter;
            return self.statement(id, &select.into(), Some(result::count_shape()));
        }

        let mut inner = Select::new(
            scope.table.clone(),
            Projection::Columns(scope.select_items("")),
        );
        inner.distinct = true;
        inner.filter = filter;

        let inner = self.serializer.serialize(&inner.into());
        CompiledStatement::new(
            id,
            StatementKind::Select,
            format!("SELECT COUNT(*) FROM ( {inner} ) count_"),
        )
        .result(result::count_shape())
    }

    /// The WHERE clause of a predicate tree: groups OR-ed, parts AND-ed.
    /// `None` when the tree is empty.
    fn filter(
        &self,
        scope: &Scope<'_>,
        id: &StatementId,
        query: &PredicateQuery,
    ) -> Result<Option<Expr>> {
        if query.tree.is_empty() {
            return Ok(None);
        }

        let mut position = 0;
        let mut groups = vec![];

        for group in &query.tree {
            if group.parts.is_empty() {
                return Err(Error::invalid_query(id.to_string(), "empty predicate group"));
            }

            let mut conditions = vec![];
            for part in &group.parts {
                if let Operator::In(InArg::List(0)) | Operator::NotIn(InArg::List(0)) = part.operator {
                    return Err(Error::invalid_query(
                        id.to_string(),
                        format!("`{}` is compared against an empty IN list", part.property),
                    ));
                }

                let arity = part.operator.arity();

                let params: Vec<String> = if part.params.is_empty() {
                    (1..=arity)
                        .map(|n| format!("param{}", position + n))
                        .collect()
                } else if part.params.len() == arity {
                    part.params.clone()
                } else {
                    return Err(Error::invalid_query(
                        id.to_string(),
                        format!(
                            "`{}` takes {arity} parameter(s), {} given",
                            part.property,
                            part.params.len()
                        ),
                    ));
                };
                position += arity;

                conditions.push(self.condition(scope, id, part, params)?);
            }

            groups.push(Expr::and(conditions));
        }

        Ok(Some(Expr::or(groups)))
    }

    fn condition(
        &self,
        scope: &Scope<'_>,
        id: &StatementId,
        part: &Part,
        params: Vec<String>,
    ) -> Result<Expr> {
        let column = self.resolve(scope, id, &part.property)?;
        let dialect = self.metamodel.dialect();

        let folding = Folding {
            enabled: part.ignore_case && column.sql_type.is_textual(),
            lhs_only: matches!(self.metamodel.config().case_folding, CaseFolding::Collate(_)),
        };

        let lhs = folding.lhs(scope.column(column));

        // Arity was checked by the caller
        let first = params.first().cloned().unwrap_or_default();
        let mut params = params.into_iter();
        let mut bind = || folding.rhs(Expr::bind(params.next().unwrap_or_default()));

        let compare = |op: BinaryOp, rhs: Expr| Expr::binary_op(lhs.clone(), op, rhs);
        let like = |pattern: Vec<Expr>, negate: bool| Expr::Like {
            expr: Box::new(lhs.clone()),
            pattern: Box::new(Expr::Concat(pattern)),
            negate,
        };
        let wildcard = || Expr::raw("'%'");

        let expr = match part.operator {
            Operator::Equals => compare(BinaryOp::Eq, bind()),
            Operator::NotEquals => compare(BinaryOp::Ne, bind()),
            Operator::LessThan | Operator::Before => compare(BinaryOp::Lt, bind()),
            Operator::LessThanEqual => compare(BinaryOp::Le, bind()),
            Operator::GreaterThan | Operator::After => compare(BinaryOp::Gt, bind()),
            Operator::GreaterThanEqual => compare(BinaryOp::Ge, bind()),
            Operator::Between => {
                let (low, high) = (bind(), bind());
                Expr::Between {
                    expr: Box::new(lhs.clone()),
                    low: Box::new(low),
                    high: Box::new(high),
                }
            }
            Operator::IsNull => Expr::is_null(scope.column(column), false),
            Operator::IsNotNull => Expr::is_null(scope.column(column), true),
            Operator::Like | Operator::NotLike => Expr::Like {
                expr: Box::new(lhs.clone()),
                pattern: Box::new(bind()),
                negate: part.operator == Operator::NotLike,
            },
            Operator::StartingWith => like(vec![bind(), wildcard()], false),
            Operator::EndingWith => like(vec![wildcard(), bind()], false),
            Operator::Containing => like(vec![wildcard(), bind(), wildcard()], false),
            Operator::NotContaining => like(vec![wildcard(), bind(), wildcard()], true),
            Operator::In(arg) | Operator::NotIn(arg) => {
                let negate = matches!(part.operator, Operator::NotIn(_));

                match arg {
                    InArg::List(n) => Expr::InList {
                        expr: Box::new(lhs.clone()),
                        items: (0..n).map(|_| bind()).collect(),
                        negate,
                    },
                    InArg::Collection => {
                        let mut foreach = Foreach::list(first);
                        foreach.body = Box::new(folding.rhs(Expr::bind(foreach.item.clone())));

                        Expr::InCollection {
                            expr: Box::new(lhs.clone()),
                            collection: foreach,
                            negate,
                        }
                    }
                }
            }
            Operator::True => compare(BinaryOp::Eq, Expr::raw(dialect.boolean_literal(true))),
            Operator::False => compare(BinaryOp::Eq, Expr::raw(dialect.boolean_literal(false))),
            Operator::Regex => {
                if dialect.capabilities.regex.is_none() {
                    return Err(Error::unsupported_capability("regex predicate", dialect.name));
                }

                Expr::Regex {
                    expr: Box::new(scope.column(column)),
                    pattern: Box::new(bind()),
                }
            }
        };

        Ok(expr)
    }

    fn order_terms(
        &self,
        scope: &Scope<'_>,
        id: &StatementId,
        sort: &[Order],
    ) -> Result<Vec<OrderTerm>> {
        sort.iter()
            .map(|order| {
                let column = self.resolve(scope, id, &order.property)?;
                let mut expr = scope.column(column);

                if order.ignore_case {
                    expr = Expr::fold(expr);
                }

                Ok(OrderTerm {
                    expr,
                    direction: order.direction,
                })
            })
            .collect()
    }

    fn resolve<'d>(&self, scope: &Scope<'d>, id: &StatementId, property: &str) -> Result<&'d Column> {
        scope.resolve(property).ok_or_else(|| {
            Error::invalid_query(
                id.to_string(),
                format!("no property `{property}` on `{}`", scope.domain.name),
            )
        })
    }
}

use super::{
    result,
    scope::{EntitySelect, Scope},
    Precompiler,
};
use crate::stmt::{
    Assignment, BinaryOp, Delete, Expr, Foreach, Insert, InsertColumn, Join, JoinKind, OrderTerm,
    Projection, Select, TableRef, Update,
};

use tabula_core::{
    dialect::GenerationType,
    registry::{CompiledStatement, KeyFetch, StatementId},
    schema::{domain::ForeignKeySide, Association, Column, Domain, JoinDefinition},
    stmt::Direction,
    Error, Result,
};

use std::sync::Arc;

/// Registered last; its presence marks the entity as compiled.
pub(super) const INSERT: &str = "__insert";

const INSERT_SELECTIVE: &str = "__insert_selective";
const UPDATE_BY_ID: &str = "__update_by_id";
const UPDATE_SELECTIVE_BY_ID: &str = "__update_selective_by_id";
const DELETE_BY_ID: &str = "__delete_by_id";
const DELETE_BY_IDS: &str = "__delete_by_ids";
const DELETE_ALL: &str = "__delete_all";
const GET_BY_ID: &str = "__get_by_id";
const FIND_ALL: &str = "__find_all";
const FIND_ALL_PAGED: &str = "__find_all_paged";
const FIND_BY_IDS: &str = "__find_by_ids";
const COUNT_ALL: &str = "__count_all";
const EXISTS_BY_ID: &str = "__exists_by_id";

/// Collection parameter of the by-ids statements.
const IDS_PARAM: &str = "ids";

impl Precompiler<'_> {
    /// Base statements of one entity, the insert marker last.
    pub(super) fn entity(&self, domain: &Domain, namespace: &str) -> Result<Vec<CompiledStatement>> {
        let id = |name: &str| StatementId::new(namespace, name);
        let mut statements = vec![];

        // Lookups
        let EntitySelect {
            scope,
            select,
            result,
        } = self.entity_select(domain, namespace)?;

        let mut get_by_id = select.clone();
        get_by_id.filter = Some(scope.primary_key_filter(None));
        statements.push(self.statement(id(GET_BY_ID), &get_by_id.into(), Some(result.clone())));

        let mut find_by_ids = select.clone();
        find_by_ids.filter = Some(ids_filter(&scope));
        statements.push(self.statement(id(FIND_BY_IDS), &find_by_ids.into(), Some(result.clone())));

        let find_all = self.statement(id(FIND_ALL), &select.into(), Some(result.clone()));
        let paged = CompiledStatement::new(
            id(FIND_ALL_PAGED),
            find_all.kind,
            self.paged(&find_all.sql),
        )
        .result(result)
        .paging_companion(COUNT_ALL);
        statements.push(find_all);
        statements.push(paged);

        // Counts
        let plain = Scope::plain(domain);

        let count_all = Select::new(plain.table.clone(), Projection::Count);
        statements.push(self.statement(
            id(COUNT_ALL),
            &count_all.into(),
            Some(result::count_shape()),
        ));

        let mut exists = Select::new(plain.table.clone(), Projection::Count);
        exists.filter = Some(plain.primary_key_filter(None));
        statements.push(self.statement(
            id(EXISTS_BY_ID),
            &exists.into(),
            Some(result::count_shape()),
        ));

        // Deletes
        let delete_by_id = Delete {
            table: plain.table.clone(),
            filter: Some(plain.primary_key_filter(None)),
        };
        statements.push(self.statement(id(DELETE_BY_ID), &delete_by_id.into(), None));

        let delete_by_ids = Delete {
            table: plain.table.clone(),
            filter: Some(ids_filter(&plain)),
        };
        statements.push(self.statement(id(DELETE_BY_IDS), &delete_by_ids.into(), None));

        let delete_all = Delete {
            table: plain.table.clone(),
            filter: None,
        };
        statements.push(self.statement(id(DELETE_ALL), &delete_all.into(), None));

        // Updates
        statements.push(self.statement(id(UPDATE_BY_ID), &update(&plain, false).into(), None));
        statements.push(self.statement(
            id(UPDATE_SELECTIVE_BY_ID),
            &update(&plain, true).into(),
            None,
        ));

        // Associations
        for association in &domain.associations {
            let statement = self
                .association_select(domain, namespace, association)
                .map_err(|err| {
                    err.context(tabula_core::err!(
                        "compiling nested select of `{}.{}`",
                        domain.name,
                        association.property
                    ))
                })?;
            statements.push(statement);
        }

        // Inserts
        let key_fetch = key_fetch(domain);
        let skip_key = domain
            .primary_key
            .generator
            .as_ref()
            .is_some_and(|generator| generator.strategy == GenerationType::Identity);

        for (name, selective) in [(INSERT_SELECTIVE, true), (INSERT, false)] {
            let mut statement = self.statement(
                id(name),
                &insert(&plain, selective, skip_key).into(),
                None,
            );
            statement.key_fetch = key_fetch.clone();
            statements.push(statement);
        }

        Ok(statements)
    }

    /// Loads one association of an owner row, keyed by the owner's columns.
    fn association_select(
        &self,
        domain: &Domain,
        namespace: &str,
        association: &Association,
    ) -> Result<CompiledStatement> {
        let target = self.metamodel.domain_model(&association.target)?;

        let (scope, join, filter) = match &association.join {
            JoinDefinition::ForeignKey(fk) => {
                let scope = Scope::plain(&target);
                let filter = Expr::and(
                    fk.columns
                        .iter()
                        .map(|join_column| {
                            let column = match fk.side {
                                ForeignKeySide::Owner => &join_column.referenced,
                                ForeignKeySide::Target => &join_column.column,
                            };
                            Expr::eq(
                                scope.table.column(column),
                                Expr::bind(join_column.referenced_property.clone()),
                            )
                        })
                        .collect(),
                );
                (scope, None, filter)
            }
            JoinDefinition::JoinTable(join_table) => {
                let scope = Scope::aliased(&target, target.table.alias.clone());
                let link = TableRef::named(join_table.table.clone()).alias("jt");

                let on = Expr::and(
                    join_table
                        .target_columns
                        .iter()
                        .map(|join_column| {
                            Expr::eq(
                                link.column(&join_column.column),
                                scope.table.column(&join_column.referenced),
                            )
                        })
                        .collect(),
                );
                let filter = Expr::and(
                    join_table
                        .owner_columns
                        .iter()
                        .map(|join_column| {
                            Expr::eq(
                                link.column(&join_column.column),
                                Expr::bind(join_column.referenced_property.clone()),
                            )
                        })
                        .collect(),
                );

                let join = Join {
                    kind: JoinKind::Inner,
                    table: link,
                    on,
                };
                (scope, Some(join), filter)
            }
        };

        let mut select = Select::new(
            scope.table.clone(),
            Projection::Columns(scope.select_items("")),
        );
        select.joins.extend(join);
        select.filter = Some(filter);

        if let Some(order_by) = &association.order_by {
            select.order_by = order_terms(&scope, order_by).map_err(|message| {
                Error::mapping(domain.name.clone(), association.property.clone(), message)
            })?;
        }

        let shape = Arc::new(result::flat_shape(&target));
        Ok(self.statement(
            StatementId::new(namespace, result::nested_select_name(&association.property)),
            &select.into(),
            Some(shape),
        ))
    }
}

/// Matches any of the keys in the `ids` collection parameter.
fn ids_filter(scope: &Scope<'_>) -> Expr {
    let columns: Vec<&Column> = scope.domain.primary_key_columns().collect();

    match &columns[..] {
        [column] if scope.domain.primary_key.is_single() => Expr::InCollection {
            expr: Box::new(scope.column(column)),
            collection: Foreach::list(IDS_PARAM),
            negate: false,
        },
        _ => Expr::Foreach(Foreach {
            collection: IDS_PARAM.to_string(),
            item: "item".to_string(),
            open: "(",
            separator: " OR ",
            close: ")",
            body: Box::new(scope.primary_key_filter(Some("item"))),
        }),
    }
}

/// Full or selective insert. Identity keys are left to the database.
fn insert(scope: &Scope<'_>, selective: bool, skip_key: bool) -> Insert {
    let columns = scope
        .domain
        .insertable_columns()
        .filter(|column| !(skip_key && column.primary_key))
        .map(|column| InsertColumn {
            name: column.name.clone(),
            value: Expr::bind(column.property.clone()),
            test: (selective && !column.primary_key).then(|| column.property.clone()),
        })
        .collect();

    Insert {
        table: scope.table.clone(),
        columns,
        selective,
    }
}

/// Full or selective update by primary key. A version column is checked
/// against the bound value and incremented.
fn update(scope: &Scope<'_>, selective: bool) -> Update {
    let domain = scope.domain;

    let mut assignments: Vec<Assignment> = domain
        .updatable_columns()
        .filter(|column| !column.version)
        .map(|column| Assignment {
            column: column.name.clone(),
            value: Expr::bind(column.property.clone()),
            test: selective.then(|| column.property.clone()),
        })
        .collect();

    let mut filter = vec![scope.primary_key_filter(None)];

    if let Some(version) = domain.version_column() {
        assignments.push(Assignment {
            column: version.name.clone(),
            value: Expr::binary_op(scope.column(version), BinaryOp::Add, Expr::raw("1")),
            test: None,
        });
        filter.push(Expr::eq(scope.column(version), Expr::bind(version.property.clone())));
    }

    Update {
        table: scope.table.clone(),
        assignments,
        filter: Some(Expr::and(filter)),
        selective,
    }
}

/// How the insert obtains a generated key.
fn key_fetch(domain: &Domain) -> Option<KeyFetch> {
    let generator = domain.primary_key.generator.as_ref()?;
    let (sql, order) = (generator.sql.clone()?, generator.order?);
    let column = domain.primary_key_columns().next()?;

    Some(KeyFetch {
        sql,
        order,
        property: column.property.clone(),
        column: column.name.as_str().to_string(),
    })
}

/// Parses `prop [ASC|DESC], ...` against the target's properties or columns.
fn order_terms(scope: &Scope<'_>, order_by: &str) -> std::result::Result<Vec<OrderTerm>, String> {
    order_by
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            let mut words = term.split_whitespace();
            let property = words.next().unwrap_or_default();

            let direction = match words.next() {
                None => Direction::Asc,
                Some(word) if word.eq_ignore_ascii_case("asc") => Direction::Asc,
                Some(word) if word.eq_ignore_ascii_case("desc") => Direction::Desc,
                Some(word) => return Err(format!("invalid order-by direction `{word}`")),
            };

            let column = scope
                .resolve(property)
                .or_else(|| scope.domain.resolve_column(property))
                .ok_or_else(|| {
                    format!(
                        "order-by property `{property}` not found on `{}`",
                        scope.domain.name
                    )
                })?;

            Ok(OrderTerm {
                expr: scope.column(column),
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{
        schema::{
            meta::{ClassMeta, PropertyMeta, ValueType},
            MetadataRegistry,
        },
        Config, Dialect, Metamodel,
    };

    #[test]
    fn order_terms_resolve_properties() {
        let metadata = MetadataRegistry::new().with(
            ClassMeta::new("Comment")
                .property(PropertyMeta::new("id", ValueType::I64).id())
                .property(PropertyMeta::new("postedAt", ValueType::Timestamp)),
        );
        let metamodel = Metamodel::new(Arc::new(metadata), Dialect::POSTGRESQL, Config::default());
        let domain = metamodel.domain_model(&"Comment".into()).unwrap();
        let scope = Scope::plain(&domain);

        let terms = order_terms(&scope, "postedAt desc, id").unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].direction, Direction::Desc);
        assert_eq!(terms[1].direction, Direction::Asc);

        let err = order_terms(&scope, "missing").unwrap_err();
        assert_eq!(err, "order-by property `missing` not found on `Comment`");
    }
}

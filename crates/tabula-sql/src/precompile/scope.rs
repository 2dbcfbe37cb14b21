use super::{result, Precompiler};
use crate::stmt::{Expr, Join, JoinKind, Projection, Select, SelectItem, TableRef};

use tabula_core::{
    registry::ResultShape,
    schema::{
        domain::{ForeignKeySide, JoinDefinition},
        Association, Column, Domain, FetchMode, NamingStrategy,
    },
    Result,
};

use std::sync::Arc;

/// How one entity's table is addressed within a statement.
#[derive(Debug)]
pub(super) struct Scope<'a> {
    pub(super) domain: &'a Domain,
    pub(super) table: TableRef,
}

/// The select loading whole entities, with JOIN-fetched associations inlined.
#[derive(Debug)]
pub(super) struct EntitySelect<'a> {
    pub(super) scope: Scope<'a>,
    pub(super) select: Select,
    pub(super) result: Arc<ResultShape>,
}

/// A to-one association inlined with an outer join.
#[derive(Debug)]
pub(super) struct Inlined<'a> {
    pub(super) association: &'a Association,
    pub(super) target: Arc<Domain>,

    /// Prefix of the target's column labels.
    pub(super) prefix: String,
}

impl<'a> Scope<'a> {
    /// The entity's table, unaliased.
    pub(super) fn plain(domain: &'a Domain) -> Scope<'a> {
        Scope {
            domain,
            table: TableRef::new(&domain.table),
        }
    }

    /// The entity's table under `alias`.
    pub(super) fn aliased(domain: &'a Domain, alias: impl Into<String>) -> Scope<'a> {
        Scope {
            domain,
            table: TableRef::new(&domain.table).alias(alias),
        }
    }

    pub(super) fn column(&self, column: &Column) -> Expr {
        Expr::column(self.table.column(&column.name))
    }

    /// Resolves a dotted property path to a column. A to-one association
    /// with a single foreign key column resolves to that column.
    pub(super) fn resolve(&self, property: &str) -> Option<&'a Column> {
        let domain = self.domain;

        if let Some(column) = domain.column_by_path(property) {
            return Some(column);
        }

        let association = domain.association(property)?;
        match &association.join {
            JoinDefinition::ForeignKey(fk) if fk.side == ForeignKeySide::Owner => match &fk.columns[..] {
                [join_column] => domain.resolve_column(join_column.column.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// `pk1 = #{prefix.pk1} AND ...`, binding each key column to its
    /// property path, optionally re-rooted under `prefix`.
    pub(super) fn primary_key_filter(&self, prefix: Option<&str>) -> Expr {
        let key_property = self.domain.primary_key.property();

        let operands = self
            .domain
            .primary_key_columns()
            .map(|column| {
                let path = match prefix {
                    Some(prefix) => format!("{prefix}.{}", relative_path(key_property, column)),
                    None => column.property.clone(),
                };
                Expr::eq(self.column(column), Expr::bind(path))
            })
            .collect();

        Expr::and(operands)
    }

    /// Every column of the entity, labelled by `prefix` + column name.
    pub(super) fn select_items(&self, prefix: &str) -> Vec<SelectItem> {
        self.domain
            .columns()
            .map(|column| SelectItem {
                column: self.table.column(&column.name),
                label: Some(format!("{prefix}{}", column.name.as_str())),
            })
            .collect()
    }
}

/// Path of a key column relative to the key value: the member path for
/// embedded ids, the property itself otherwise.
fn relative_path<'c>(key_property: Option<&str>, column: &'c Column) -> &'c str {
    key_property
        .and_then(|key| column.property.strip_prefix(key))
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(&column.property)
}

impl Precompiler<'_> {
    /// Builds the select of whole entities: every column of the entity plus,
    /// for each JOIN-fetched to-one association, the target's columns through
    /// a left outer join.
    pub(super) fn entity_select<'d>(
        &self,
        domain: &'d Domain,
        namespace: &str,
    ) -> Result<EntitySelect<'d>> {
        let joined: Vec<&Association> = domain
            .associations
            .iter()
            .filter(|association| {
                association.fetch == FetchMode::Join && !association.is_collection()
            })
            .collect();

        if joined.is_empty() {
            let scope = Scope::plain(domain);
            let select = Select::new(
                scope.table.clone(),
                Projection::Columns(scope.select_items("")),
            );
            let result = Arc::new(result::entity_shape(namespace, domain, &[]));

            return Ok(EntitySelect {
                scope,
                select,
                result,
            });
        }

        let owner_alias = domain.table.alias.clone();
        let scope = Scope::aliased(domain, owner_alias.clone());

        let mut items = scope.select_items("");
        let mut joins = vec![];
        let mut inlined = vec![];

        for association in joined {
            let target = self.metamodel.domain_model(&association.target)?;

            let mut alias = NamingStrategy::SnakeCase.apply(&association.property);
            if alias == owner_alias {
                alias.push('_');
            }

            let prefix = format!("{alias}__");
            let target_scope = Scope::aliased(&target, alias);
            items.extend(target_scope.select_items(&prefix));

            let on = match &association.join {
                JoinDefinition::ForeignKey(fk) => Expr::and(
                    fk.columns
                        .iter()
                        .map(|join_column| {
                            let (owner_column, target_column) = match fk.side {
                                ForeignKeySide::Owner => (&join_column.column, &join_column.referenced),
                                ForeignKeySide::Target => (&join_column.referenced, &join_column.column),
                            };
                            Expr::eq(
                                scope.table.column(owner_column),
                                target_scope.table.column(target_column),
                            )
                        })
                        .collect(),
                ),
                // To-one associations never use a join table
                JoinDefinition::JoinTable(_) => continue,
            };

            joins.push(Join {
                kind: JoinKind::LeftOuter,
                table: target_scope.table.clone(),
                on,
            });

            inlined.push(Inlined {
                association,
                target: target.clone(),
                prefix,
            });
        }

        let mut select = Select::new(scope.table.clone(), Projection::Columns(items));
        select.joins = joins;

        let result = Arc::new(result::entity_shape(namespace, domain, &inlined));

        Ok(EntitySelect {
            scope,
            select,
            result,
        })
    }
}

use super::scope::Inlined;

use tabula_core::{
    registry::{NestedSelect, NestedShape, ResultMapping, ResultShape, StatementId},
    schema::{domain::JoinDefinition, Association, Domain, SqlType},
};

use std::sync::Arc;

/// Statement loading an association of an entity row.
pub(super) fn nested_select_name(property: &str) -> String {
    format!("__select_{property}")
}

/// Scalar result of count statements.
pub(super) fn count_shape() -> Arc<ResultShape> {
    Arc::new(ResultShape::scalar("__count", SqlType::BigInt))
}

/// Every column of `domain`, without associations.
pub(super) fn flat_shape(domain: &Domain) -> ResultShape {
    let mut shape = ResultShape::entity(format!("{}Result", domain.name), domain.class.clone());

    shape.mappings = domain
        .columns()
        .map(|column| ResultMapping {
            column: column.name.as_str().to_string(),
            property: column.property.clone(),
            sql_type: column.sql_type,
            id: column.primary_key,
        })
        .collect();

    shape
}

/// The entity's columns, with `inlined` associations read from the same row
/// and every other association loaded by its nested select.
pub(super) fn entity_shape(namespace: &str, domain: &Domain, inlined: &[Inlined<'_>]) -> ResultShape {
    let mut shape = flat_shape(domain);

    for inlined in inlined {
        let mut nested = flat_shape(&inlined.target);
        nested.id = format!("{}.{}", shape.id, inlined.association.property);

        shape.nested.push(NestedShape {
            property: inlined.association.property.clone(),
            collection: false,
            column_prefix: inlined.prefix.clone(),
            shape: Arc::new(nested),
        });
    }

    shape.nested_selects = domain
        .associations
        .iter()
        .filter(|association| {
            !inlined
                .iter()
                .any(|inlined| inlined.association.property == association.property)
        })
        .map(|association| nested_select(namespace, association))
        .collect();

    shape
}

fn nested_select(namespace: &str, association: &Association) -> NestedSelect {
    NestedSelect {
        property: association.property.clone(),
        collection: association.is_collection(),
        statement: StatementId::new(namespace, nested_select_name(&association.property)),
        arguments: select_arguments(association),
    }
}

/// `(parameter, owner column)` pairs feeding an association's nested select.
///
/// The parameter is named after the referenced property on whichever side
/// holds the referenced key.
pub(super) fn select_arguments(association: &Association) -> Vec<(String, String)> {
    use tabula_core::schema::domain::ForeignKeySide::*;

    match &association.join {
        JoinDefinition::ForeignKey(fk) => fk
            .columns
            .iter()
            .map(|join_column| match fk.side {
                Owner => (
                    join_column.referenced_property.clone(),
                    join_column.column.as_str().to_string(),
                ),
                Target => (
                    join_column.referenced_property.clone(),
                    join_column.referenced.as_str().to_string(),
                ),
            })
            .collect(),
        JoinDefinition::JoinTable(join_table) => join_table
            .owner_columns
            .iter()
            .map(|join_column| {
                (
                    join_column.referenced_property.clone(),
                    join_column.referenced.as_str().to_string(),
                )
            })
            .collect(),
    }
}

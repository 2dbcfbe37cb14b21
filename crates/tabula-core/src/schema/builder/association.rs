use super::{BuildState, Metamodel, Shape};
use crate::{
    dialect::Identifier,
    schema::{
        domain::{
            Association, AssociationKind, Column, ColumnId, ColumnKind, Domain, ForeignKey,
            ForeignKeySide, JoinColumn, JoinDefinition, JoinTable,
        },
        meta::{JoinColumnMarker, Marker, PropertyMeta, RelationMarker},
    },
    Error, Result,
};

impl Metamodel {
    /// Resolves one association property of `owner`. Foreign key columns held
    /// by the owner's table are added to `domain`.
    pub(super) fn association(
        &self,
        state: &mut BuildState,
        owner: &Shape,
        domain: &mut Domain,
        property: &PropertyMeta,
    ) -> Result<Association> {
        let entity = owner.name();

        let (kind, relation) = relation_of(property).ok_or_else(|| {
            Error::mapping(entity, &property.name, "property is not an association")
        })?;

        let target_id = relation
            .target
            .clone()
            .or_else(|| property.ty.class().cloned())
            .ok_or_else(|| {
                Error::mapping(
                    entity,
                    &property.name,
                    "cannot determine the association target class",
                )
            })?;

        let target = self.shape(state, &target_id).map_err(|err| {
            err.context(Error::mapping(
                entity,
                &property.name,
                format!("association target `{target_id}` cannot be mapped"),
            ))
        })?;

        let fetch = property
            .fetch_marker()
            .or(relation.fetch)
            .unwrap_or(self.config.default_fetch);

        let join = match (kind, relation.mapped_by.as_deref()) {
            (AssociationKind::ManyToOne, Some(_)) => {
                return Err(Error::mapping(
                    entity,
                    &property.name,
                    "many-to-one associations always own their foreign key",
                ));
            }
            (AssociationKind::ManyToOne | AssociationKind::OneToOne, None) => {
                let columns = self.join_columns(
                    owner,
                    property,
                    &property.join_columns(),
                    &target,
                    &self.config.naming.apply(&property.name),
                )?;

                self.add_join_columns(domain, property, &columns, &target)?;

                JoinDefinition::ForeignKey(ForeignKey {
                    side: ForeignKeySide::Owner,
                    columns,
                })
            }
            (AssociationKind::OneToOne | AssociationKind::OneToMany, Some(mapped_by)) => {
                let inverse =
                    self.inverse_property(owner, property, &target, mapped_by, kind)?;

                let columns = self.join_columns(
                    &target,
                    inverse,
                    &inverse.join_columns(),
                    owner,
                    &self.config.naming.apply(&inverse.name),
                )?;

                JoinDefinition::ForeignKey(ForeignKey {
                    side: ForeignKeySide::Target,
                    columns,
                })
            }
            (AssociationKind::OneToMany, None) => {
                // Unidirectional: the foreign key still lives in the target
                // table and references the owner
                let columns = self.join_columns(
                    owner,
                    property,
                    &property.join_columns(),
                    owner,
                    &self.config.naming.apply(&property.name),
                )?;

                JoinDefinition::ForeignKey(ForeignKey {
                    side: ForeignKeySide::Target,
                    columns,
                })
            }
            (AssociationKind::ManyToMany, Some(mapped_by)) => {
                let inverse =
                    self.inverse_property(owner, property, &target, mapped_by, kind)?;
                let join_table = self.join_table(&target, inverse, owner)?;

                JoinDefinition::JoinTable(join_table.inverse())
            }
            (AssociationKind::ManyToMany, None) => {
                JoinDefinition::JoinTable(self.join_table(owner, property, &target)?)
            }
        };

        tracing::trace!(
            entity = %entity,
            property = %property.name,
            target = %target_id,
            ?kind,
            ?fetch,
            "resolved association"
        );

        Ok(Association {
            property: property.name.clone(),
            kind,
            target: target_id,
            fetch,
            mapped_by: relation.mapped_by.clone(),
            order_by: property.order_by().map(str::to_string),
            join,
        })
    }

    /// Finds the owning property a `mapped_by` names on the target.
    fn inverse_property<'a>(
        &self,
        owner: &Shape,
        property: &PropertyMeta,
        target: &'a Shape,
        mapped_by: &str,
        kind: AssociationKind,
    ) -> Result<&'a PropertyMeta> {
        let entity = owner.name();

        let Some(inverse) = target.meta.property_named(mapped_by) else {
            return Err(Error::mapping(
                entity,
                &property.name,
                format!(
                    "mapped-by property `{mapped_by}` not found on `{}`",
                    target.name()
                ),
            ));
        };

        let expected = match kind {
            AssociationKind::OneToMany => AssociationKind::ManyToOne,
            kind => kind,
        };

        let owning = relation_of(inverse).filter(|(inverse_kind, relation)| {
            *inverse_kind == expected && relation.mapped_by.is_none()
        });

        let Some((_, relation)) = owning else {
            return Err(Error::mapping(
                entity,
                &property.name,
                format!(
                    "`{}.{mapped_by}` is not an owning {expected:?} association",
                    target.name()
                ),
            ));
        };

        let inverse_target = relation.target.as_ref().or_else(|| inverse.ty.class());
        if inverse_target != Some(&owner.meta.id) {
            return Err(Error::mapping(
                entity,
                &property.name,
                format!(
                    "`{}.{mapped_by}` does not reference `{entity}`",
                    target.name()
                ),
            ));
        }

        Ok(inverse)
    }

    /// Resolves the join column markers declared on `property` of `declaring`
    /// against the columns of `referenced`.
    ///
    /// Without markers, one column per referenced primary key column is
    /// synthesized as `{prefix}_{referencedColumn}`.
    fn join_columns(
        &self,
        declaring: &Shape,
        property: &PropertyMeta,
        markers: &[&JoinColumnMarker],
        referenced: &Shape,
        prefix: &str,
    ) -> Result<Vec<JoinColumn>> {
        let pk: Vec<&Column> = referenced.domain.primary_key_columns().collect();

        let default_name =
            |referenced: &Column| Identifier::plain(format!("{prefix}_{}", referenced.name.name));

        if markers.is_empty() {
            return Ok(pk
                .iter()
                .map(|column| JoinColumn {
                    column: default_name(column),
                    referenced: column.name.clone(),
                    referenced_property: column.property.clone(),
                })
                .collect());
        }

        let mut ret = Vec::with_capacity(markers.len());

        for (i, marker) in markers.iter().enumerate() {
            let column = match &marker.referenced_column {
                Some(reference) => referenced.resolve(reference).ok_or_else(|| {
                    Error::mapping(
                        declaring.name(),
                        &property.name,
                        format!(
                            "join column references `{reference}`, which is not a column of `{}`",
                            referenced.name()
                        ),
                    )
                })?,
                // Unnamed references pair with the primary key by position
                None if markers.len() == pk.len() => pk[i],
                None => {
                    return Err(Error::mapping(
                        declaring.name(),
                        &property.name,
                        format!(
                            "{} join columns for a {}-column key must name their referenced columns",
                            markers.len(),
                            pk.len()
                        ),
                    ));
                }
            };

            ret.push(JoinColumn {
                column: match &marker.name {
                    Some(name) => Identifier::parse(name),
                    None => default_name(column),
                },
                referenced: column.name.clone(),
                referenced_property: column.property.clone(),
            });
        }

        Ok(ret)
    }

    /// Adds the owner-side foreign key columns of a to-one association to the
    /// owner's table. Their types mirror the referenced columns.
    fn add_join_columns(
        &self,
        domain: &mut Domain,
        property: &PropertyMeta,
        columns: &[JoinColumn],
        target: &Shape,
    ) -> Result<()> {
        let markers = property.join_columns();

        for (i, join_column) in columns.iter().enumerate() {
            let path = format!("{}.{}", property.name, join_column.referenced_property);

            // A basic property may already map the same physical column
            if let Some(existing) = domain.table.column_by_name(join_column.column.as_str()) {
                let id = existing.id;
                domain.lookup.entry(path).or_insert(id);
                continue;
            }

            let referenced = target
                .resolve(&join_column.referenced_property)
                .ok_or_else(|| {
                    Error::mapping(
                        &domain.name,
                        &property.name,
                        format!(
                            "join column references `{}`, which is not a column of `{}`",
                            join_column.referenced_property,
                            target.name()
                        ),
                    )
                })?;

            let marker = markers.get(i).copied().cloned().unwrap_or_default();
            let id = ColumnId(domain.table.columns.len());

            let column = Column {
                id,
                name: join_column.column.clone(),
                property: path.clone(),
                ty: referenced.ty.clone(),
                sql_type: referenced.sql_type,
                length: referenced.length,
                precision: referenced.precision,
                scale: referenced.scale,
                nullable: marker.nullable,
                unique: false,
                insertable: marker.insertable,
                updatable: marker.updatable,
                primary_key: false,
                version: false,
                converter: referenced.converter.clone(),
                kind: ColumnKind::JoinColumn {
                    association: property.name.clone(),
                },
            };

            tracing::trace!(
                entity = %domain.name,
                property = %path,
                column = %column.name,
                references = %referenced.name,
                "mapped join column"
            );

            domain.lookup.insert(path, id);
            domain.table.columns.push(column);
        }

        Ok(())
    }

    /// The join table of an owning many-to-many property.
    fn join_table(
        &self,
        owner: &Shape,
        property: &PropertyMeta,
        target: &Shape,
    ) -> Result<JoinTable> {
        let marker = property.join_table_marker().cloned().unwrap_or_default();
        let owner_table = &owner.domain.table.name.name;
        let target_table = &target.domain.table.name.name;

        let table = match &marker.name {
            Some(name) => Identifier::parse(name),
            None => Identifier::plain(format!("{owner_table}_{target_table}")),
        };

        let owner_markers: Vec<&JoinColumnMarker> = marker.join_columns.iter().collect();
        let target_markers: Vec<&JoinColumnMarker> =
            marker.inverse_join_columns.iter().collect();

        Ok(JoinTable {
            table,
            owner_columns: self.join_columns(owner, property, &owner_markers, owner, owner_table)?,
            target_columns: self.join_columns(
                owner,
                property,
                &target_markers,
                target,
                target_table,
            )?,
        })
    }
}

fn relation_of(property: &PropertyMeta) -> Option<(AssociationKind, &RelationMarker)> {
    match property.relation()? {
        Marker::ManyToOne(relation) => Some((AssociationKind::ManyToOne, relation)),
        Marker::OneToOne(relation) => Some((AssociationKind::OneToOne, relation)),
        Marker::OneToMany(relation) => Some((AssociationKind::OneToMany, relation)),
        Marker::ManyToMany(relation) => Some((AssociationKind::ManyToMany, relation)),
        _ => None,
    }
}

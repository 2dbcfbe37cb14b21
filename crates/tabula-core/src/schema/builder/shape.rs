use super::Metamodel;
use crate::{
    dialect::{GenerationType, Identifier, KeyGenerator},
    schema::{
        domain::{
            Column, ColumnId, ColumnKind, Domain, Embedding, PrimaryKey, PrimaryKeyKind, SqlType,
            Table,
        },
        meta::{ClassId, ClassMeta, PropertyMeta, ValueType},
        NamingStrategy,
    },
    Error, Result,
};

use indexmap::IndexMap;
use std::sync::Arc;

/// Embeddables nested deeper than this are rejected.
const MAX_EMBEDDED_DEPTH: usize = 8;

/// Everything about a class that can be derived without looking at other
/// entities: table identity, scalar and embedded columns, primary key.
///
/// Associations are resolved against shapes, so building a shape never
/// recurses into another entity.
#[derive(Debug)]
pub(super) struct Shape {
    pub(super) meta: Arc<ClassMeta>,

    /// The domain model without associations or foreign key columns.
    pub(super) domain: Domain,
}

struct BuildShape<'a> {
    metamodel: &'a Metamodel,
    meta: &'a ClassMeta,

    /// Entity name used in errors and logs.
    name: String,

    table: Table,
    lookup: IndexMap<String, ColumnId>,
    pk_columns: Vec<ColumnId>,
    version: Option<ColumnId>,

    /// Embeddables currently being flattened.
    embedding_stack: Vec<ClassId>,
}

impl Shape {
    pub(super) fn build(metamodel: &Metamodel, meta: Arc<ClassMeta>) -> Result<Shape> {
        let domain = BuildShape::new(metamodel, &meta)?.build()?;
        Ok(Shape { meta, domain })
    }

    pub(super) fn name(&self) -> &str {
        &self.domain.name
    }

    pub(super) fn resolve(&self, reference: &str) -> Option<&Column> {
        self.domain.resolve_column(reference)
    }
}

impl<'a> BuildShape<'a> {
    fn new(metamodel: &'a Metamodel, meta: &'a ClassMeta) -> Result<BuildShape<'a>> {
        let name = meta.id.simple_name().to_string();

        if meta.is_embeddable() {
            return Err(Error::mapping_entity(
                name,
                "embeddable classes have no table of their own",
            ));
        }

        let table = table_for(metamodel, meta);

        Ok(BuildShape {
            metamodel,
            meta,
            name,
            table,
            lookup: IndexMap::new(),
            pk_columns: vec![],
            version: None,
            embedding_stack: vec![],
        })
    }

    fn build(mut self) -> Result<Domain> {
        let meta = self.meta;

        let ids: Vec<&PropertyMeta> = meta
            .properties
            .iter()
            .filter(|property| !property.is_transient() && property.is_id())
            .collect();
        let embedded_ids: Vec<&PropertyMeta> = meta
            .properties
            .iter()
            .filter(|property| !property.is_transient() && property.is_embedded_id())
            .collect();

        match (ids.len(), embedded_ids.len()) {
            (0, 0) => {
                return Err(Error::mapping_entity(
                    &self.name,
                    "no primary key declared",
                ))
            }
            (0, 1) | (_, 0) => {}
            (0, _) => {
                return Err(Error::mapping_entity(
                    &self.name,
                    "more than one embedded id declared",
                ))
            }
            _ => {
                return Err(Error::mapping_entity(
                    &self.name,
                    "both id and embedded id properties declared",
                ))
            }
        }

        let mut embedded = vec![];

        for property in &meta.properties {
            if property.is_transient() {
                tracing::trace!(entity = %self.name, property = %property.name, "skipping transient property");
                continue;
            }

            if property.is_association() {
                if property.is_id() || property.is_embedded_id() {
                    return Err(Error::mapping(
                        &self.name,
                        &property.name,
                        "primary key member cannot be an association",
                    ));
                }

                // Resolved once target shapes are known
                continue;
            }

            if property.is_embedded_id() {
                let embedding = self.embed(property, property.name.clone(), true, 0)?;
                embedded.push(embedding);
            } else if property.is_embedded() || self.is_embeddable(&property.ty) {
                if property.is_id() {
                    return Err(Error::mapping(
                        &self.name,
                        &property.name,
                        "composite key member must be a basic property; mark embeddable ids as embedded id",
                    ));
                }

                let embedding = self.embed(property, property.name.clone(), false, 0)?;
                embedded.push(embedding);
            } else {
                if !property.ty.is_scalar() {
                    return Err(Error::mapping(
                        &self.name,
                        &property.name,
                        format!(
                            "property of type `{:?}` needs an association or embedded marker",
                            property.ty
                        ),
                    ));
                }

                self.basic_column(property, property.name.clone(), property.is_id())?;
            }
        }

        let primary_key = self.primary_key(&ids, &embedded_ids)?;

        Ok(Domain {
            class: meta.id.clone(),
            name: self.name,
            table: self.table,
            primary_key,
            version: self.version,
            associations: vec![],
            embedded,
            lookup: self.lookup,
        })
    }

    fn is_embeddable(&self, ty: &ValueType) -> bool {
        match ty {
            ValueType::Class(class) => self
                .metamodel
                .provider
                .class_meta(class)
                .is_some_and(|meta| meta.is_embeddable()),
            _ => false,
        }
    }

    fn basic_column(
        &mut self,
        property: &PropertyMeta,
        path: String,
        primary_key: bool,
    ) -> Result<ColumnId> {
        let marker = property.column_marker().cloned().unwrap_or_default();

        let name = match &marker.name {
            Some(name) => Identifier::parse(name),
            None => Identifier::plain(self.metamodel.config.naming.apply(&property.name)),
        };

        if self.table.column_by_name(name.as_str()).is_some() {
            return Err(Error::mapping(
                &self.name,
                &path,
                format!("column `{name}` is mapped more than once"),
            ));
        }

        let id = ColumnId(self.table.columns.len());
        let version = property.is_version();

        if version {
            if self.version.is_some() {
                return Err(Error::mapping(
                    &self.name,
                    &path,
                    "more than one version property declared",
                ));
            }

            if !property.ty.is_version() {
                return Err(Error::mapping(
                    &self.name,
                    &path,
                    "version property must be an integer or a timestamp",
                ));
            }

            self.version = Some(id);
        }

        let column = Column {
            id,
            name,
            property: path.clone(),
            ty: property.ty.clone(),
            sql_type: SqlType::for_property(property),
            length: marker.length,
            precision: marker.precision,
            scale: marker.scale,
            nullable: marker.nullable && !primary_key,
            unique: marker.unique,
            insertable: marker.insertable,
            updatable: marker.updatable,
            primary_key,
            version,
            converter: property.converter().map(str::to_string),
            kind: ColumnKind::Basic,
        };

        tracing::trace!(
            entity = %self.name,
            property = %path,
            column = %column.name,
            sql_type = %column.sql_type,
            "mapped column"
        );

        if primary_key {
            self.pk_columns.push(id);
        }

        self.lookup.insert(path, id);
        self.table.columns.push(column);
        Ok(id)
    }

    fn embed(
        &mut self,
        property: &PropertyMeta,
        path: String,
        primary_key: bool,
        depth: usize,
    ) -> Result<Embedding> {
        let Some(class) = property.ty.class().filter(|_| !property.ty.is_list()) else {
            return Err(Error::mapping(
                &self.name,
                &path,
                "embedded property must be of an embeddable class",
            ));
        };

        if self.embedding_stack.contains(class) {
            return Err(Error::mapping(
                &self.name,
                &path,
                format!("embeddable `{class}` embeds itself"),
            ));
        }

        if depth >= MAX_EMBEDDED_DEPTH {
            return Err(Error::mapping(
                &self.name,
                &path,
                format!("embeddables nested deeper than {MAX_EMBEDDED_DEPTH} levels"),
            ));
        }

        let Some(meta) = self.metamodel.provider.class_meta(class) else {
            return Err(Error::mapping(
                &self.name,
                &path,
                format!("no metadata registered for class `{class}`"),
            ));
        };

        if !meta.is_embeddable() {
            return Err(Error::mapping(
                &self.name,
                &path,
                format!("`{class}` is not embeddable"),
            ));
        }

        self.embedding_stack.push(class.clone());

        let mut embedding = Embedding {
            property: property.name.clone(),
            alias: format!("{}_", path.replace('.', "_")),
            path: path.clone(),
            class: class.clone(),
            columns: vec![],
            nested: vec![],
        };

        for nested in &meta.properties {
            if nested.is_transient() {
                continue;
            }

            let nested_path = format!("{path}.{}", nested.name);

            if nested.is_association() {
                return Err(Error::mapping(
                    &self.name,
                    &nested_path,
                    format!("associations inside embeddable `{class}` are not supported"),
                ));
            }

            if nested.is_embedded() || self.is_embeddable(&nested.ty) {
                let inner = self.embed(nested, nested_path, primary_key, depth + 1)?;
                embedding.nested.push(inner);
            } else if nested.ty.is_scalar() {
                let id = self.basic_column(nested, nested_path, primary_key)?;
                embedding.columns.push(id);
            } else {
                return Err(Error::mapping(
                    &self.name,
                    &nested_path,
                    "embedded members must be basic properties or embeddables",
                ));
            }
        }

        self.embedding_stack.pop();
        Ok(embedding)
    }

    fn primary_key(
        &self,
        ids: &[&PropertyMeta],
        embedded_ids: &[&PropertyMeta],
    ) -> Result<PrimaryKey> {
        let columns = self.pk_columns.clone();

        if let Some(property) = embedded_ids.first() {
            if property.generated_value().is_some() {
                return Err(Error::mapping(
                    &self.name,
                    &property.name,
                    "key generation requires a single-column primary key",
                ));
            }

            let class = property.ty.class().cloned().ok_or_else(|| {
                Error::mapping(
                    &self.name,
                    &property.name,
                    "embedded id must be of an embeddable class",
                )
            })?;

            return Ok(PrimaryKey {
                kind: PrimaryKeyKind::Embedded {
                    property: property.name.clone(),
                    class,
                },
                columns,
                generator: None,
            });
        }

        if let [property] = ids {
            let generator = match property.generated_value() {
                Some((strategy, generator)) => {
                    Some(self.key_generator(property, strategy, generator)?)
                }
                None => None,
            };

            return Ok(PrimaryKey {
                kind: PrimaryKeyKind::Single {
                    property: property.name.clone(),
                },
                columns,
                generator,
            });
        }

        if let Some(property) = ids.iter().find(|property| property.generated_value().is_some()) {
            return Err(Error::mapping(
                &self.name,
                &property.name,
                "key generation requires a single-column primary key",
            ));
        }

        Ok(PrimaryKey {
            kind: PrimaryKeyKind::Composite {
                properties: ids.iter().map(|property| property.name.clone()).collect(),
            },
            columns,
            generator: None,
        })
    }

    fn key_generator(
        &self,
        property: &PropertyMeta,
        strategy: GenerationType,
        generator: Option<&str>,
    ) -> Result<KeyGenerator> {
        let column = self
            .lookup
            .get(&property.name)
            .map(|id| &self.table.columns[id.0])
            .ok_or_else(|| Error::mapping(&self.name, &property.name, "id column not mapped"))?;

        // Generator names resolve against the property first, then the class
        let sequence = match generator {
            Some(generator) => property
                .sequence_generators()
                .chain(self.meta.sequence_generators())
                .find(|declared| declared.name == generator)
                .map(|declared| declared.sequence_name.clone())
                .unwrap_or_else(|| generator.to_string()),
            None => self
                .metamodel
                .config
                .sequence_name(self.table.name.as_str(), column.name.as_str()),
        };

        self.metamodel
            .dialect
            .key_generator(
                strategy,
                self.table.name.as_str(),
                column.name.as_str(),
                Some(&sequence),
            )
            .map_err(|err| {
                let strategy = format!("{strategy:?}").to_uppercase();
                err.context(Error::mapping(
                    &self.name,
                    &property.name,
                    format!("cannot resolve {strategy} key generation"),
                ))
            })
    }
}

fn table_for(metamodel: &Metamodel, meta: &ClassMeta) -> Table {
    let marker = meta.table_marker();
    let simple_name = meta.id.simple_name();

    let mut name = match marker.and_then(|marker| marker.name.as_deref()) {
        Some(name) => Identifier::parse(name),
        None => Identifier::plain(metamodel.config.naming.apply(simple_name)),
    };

    if let Some(prefix) = &metamodel.config.table_name_prefix {
        name.name = format!("{prefix}{}", name.name);
    }

    let mut table = Table::new(name, NamingStrategy::SnakeCase.apply(simple_name));

    if let Some(marker) = marker {
        table.schema = marker.schema.as_deref().map(Identifier::parse);
        table.catalog = marker.catalog.as_deref().map(Identifier::parse);
    }

    table
}

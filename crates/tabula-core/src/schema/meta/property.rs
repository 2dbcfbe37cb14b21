use super::{
    ColumnMarker, EnumType, JoinColumnMarker, JoinTableMarker, Marker, RelationMarker,
    SequenceGenerator, TemporalType, ValueType,
};
use crate::{
    dialect::GenerationType,
    schema::{FetchMode, SqlType},
};

/// One property of a class and the markers declared on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMeta {
    pub name: String,
    pub ty: ValueType,
    pub markers: Vec<Marker>,
}

impl PropertyMeta {
    pub fn new(name: &str, ty: ValueType) -> PropertyMeta {
        PropertyMeta {
            name: name.to_string(),
            ty,
            markers: vec![],
        }
    }

    pub fn marker(mut self, marker: Marker) -> PropertyMeta {
        self.markers.push(marker);
        self
    }

    pub fn id(self) -> PropertyMeta {
        self.marker(Marker::Id)
    }

    pub fn embedded_id(self) -> PropertyMeta {
        self.marker(Marker::EmbeddedId)
    }

    pub fn generated(self, strategy: GenerationType) -> PropertyMeta {
        self.marker(Marker::GeneratedValue {
            strategy,
            generator: None,
        })
    }

    pub fn generated_by(self, strategy: GenerationType, generator: &str) -> PropertyMeta {
        self.marker(Marker::GeneratedValue {
            strategy,
            generator: Some(generator.to_string()),
        })
    }

    pub fn column(self, column: ColumnMarker) -> PropertyMeta {
        self.marker(Marker::Column(column))
    }

    pub fn column_name(self, name: &str) -> PropertyMeta {
        self.column(ColumnMarker::named(name))
    }

    pub fn many_to_one(self) -> PropertyMeta {
        self.marker(Marker::ManyToOne(RelationMarker::default()))
    }

    pub fn one_to_one(self) -> PropertyMeta {
        self.marker(Marker::OneToOne(RelationMarker::default()))
    }

    pub fn one_to_many(self, mapped_by: &str) -> PropertyMeta {
        self.marker(Marker::OneToMany(RelationMarker::mapped_by(mapped_by)))
    }

    pub fn many_to_many(self) -> PropertyMeta {
        self.marker(Marker::ManyToMany(RelationMarker::default()))
    }

    pub fn join_column(self, name: &str, referenced_column: Option<&str>) -> PropertyMeta {
        self.marker(Marker::JoinColumn(JoinColumnMarker::new(
            name,
            referenced_column,
        )))
    }

    pub fn join_table(self, join_table: JoinTableMarker) -> PropertyMeta {
        self.marker(Marker::JoinTable(join_table))
    }

    pub fn fetch(self, fetch: FetchMode) -> PropertyMeta {
        self.marker(Marker::Fetch(fetch))
    }

    pub fn embedded(self) -> PropertyMeta {
        self.marker(Marker::Embedded)
    }

    pub fn version(self) -> PropertyMeta {
        self.marker(Marker::Version)
    }

    pub fn transient(self) -> PropertyMeta {
        self.marker(Marker::Transient)
    }

    pub fn lob(self) -> PropertyMeta {
        self.marker(Marker::Lob)
    }

    pub fn sql_type(self, sql_type: SqlType) -> PropertyMeta {
        self.marker(Marker::SqlType(sql_type))
    }

    pub fn enumerated(self, ty: EnumType) -> PropertyMeta {
        self.marker(Marker::Enumerated(ty))
    }

    pub fn convert(self, converter: &str) -> PropertyMeta {
        self.marker(Marker::Convert(converter.to_string()))
    }

    pub fn has(&self, f: impl Fn(&Marker) -> bool) -> bool {
        self.markers.iter().any(f)
    }

    pub fn is_transient(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::Transient))
    }

    pub fn is_id(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::Id))
    }

    pub fn is_embedded_id(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::EmbeddedId))
    }

    pub fn is_embedded(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::Embedded))
    }

    pub fn is_version(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::Version))
    }

    pub fn is_lob(&self) -> bool {
        self.has(|marker| matches!(marker, Marker::Lob))
    }

    /// True if any association marker is present.
    pub fn is_association(&self) -> bool {
        self.relation().is_some()
    }

    pub fn column_marker(&self) -> Option<&ColumnMarker> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Column(column) => Some(column),
            _ => None,
        })
    }

    pub fn generated_value(&self) -> Option<(GenerationType, Option<&str>)> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::GeneratedValue {
                strategy,
                generator,
            } => Some((*strategy, generator.as_deref())),
            _ => None,
        })
    }

    pub fn sequence_generators(&self) -> impl Iterator<Item = &SequenceGenerator> {
        self.markers.iter().filter_map(|marker| match marker {
            Marker::SequenceGenerator(generator) => Some(generator),
            _ => None,
        })
    }

    /// The association marker, if any, with the marker variant.
    pub fn relation(&self) -> Option<&Marker> {
        self.markers.iter().find(|marker| {
            matches!(
                marker,
                Marker::ManyToOne(_)
                    | Marker::OneToOne(_)
                    | Marker::OneToMany(_)
                    | Marker::ManyToMany(_)
            )
        })
    }

    pub fn join_columns(&self) -> Vec<&JoinColumnMarker> {
        self.markers
            .iter()
            .filter_map(|marker| match marker {
                Marker::JoinColumn(join_column) => Some(join_column),
                _ => None,
            })
            .collect()
    }

    pub fn join_table_marker(&self) -> Option<&JoinTableMarker> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::JoinTable(join_table) => Some(join_table),
            _ => None,
        })
    }

    pub fn fetch_marker(&self) -> Option<FetchMode> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Fetch(fetch) => Some(*fetch),
            _ => None,
        })
    }

    pub fn sql_type_marker(&self) -> Option<SqlType> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::SqlType(sql_type) => Some(*sql_type),
            _ => None,
        })
    }

    pub fn temporal(&self) -> Option<TemporalType> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Temporal(temporal) => Some(*temporal),
            _ => None,
        })
    }

    pub fn enum_type(&self) -> Option<EnumType> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Enumerated(ty) => Some(*ty),
            _ => None,
        })
    }

    pub fn converter(&self) -> Option<&str> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::Convert(converter) => Some(converter.as_str()),
            _ => None,
        })
    }

    pub fn order_by(&self) -> Option<&str> {
        self.markers.iter().find_map(|marker| match marker {
            Marker::OrderBy(order_by) => Some(order_by.as_str()),
            _ => None,
        })
    }
}

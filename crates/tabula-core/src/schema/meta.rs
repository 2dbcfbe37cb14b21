//! Declarative class metadata, as answered by a [`MetadataProvider`].

mod class;
pub use class::{ClassId, ClassMarker, ClassMeta};

mod marker;
pub use marker::{
    ColumnMarker, EnumType, JoinColumnMarker, JoinTableMarker, Marker, RelationMarker,
    SequenceGenerator, TableMarker, TemporalType,
};

mod property;
pub use property::PropertyMeta;

mod provider;
pub use provider::{MetadataProvider, MetadataRegistry};

mod ty;
pub use ty::ValueType;

mod builder;
pub use builder::Metamodel;

pub mod domain;
pub use domain::{
    Association, AssociationKind, Column, ColumnId, Domain, FetchMode, JoinDefinition, SqlType,
    Table,
};

pub mod meta;
pub use meta::{ClassId, ClassMeta, MetadataProvider, MetadataRegistry, PropertyMeta, ValueType};

mod name;
pub use name::NamingStrategy;

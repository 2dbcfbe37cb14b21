use super::{PropertyMeta, SequenceGenerator, TableMarker};

use std::{fmt, sync::Arc};

/// Stable identity of a domain class, usually its fully qualified name.
///
/// Cloning is a reference count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(Arc<str>);

/// Metadata declared on one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMeta {
    pub id: ClassId,

    /// Class-level markers.
    pub markers: Vec<ClassMarker>,

    /// Properties in declaration order.
    pub properties: Vec<PropertyMeta>,

    /// Arity of every public constructor.
    pub constructors: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMarker {
    /// The class is an entity stored in the named table.
    Table(TableMarker),

    /// The class has no table of its own; it is flattened into the tables of
    /// the entities that embed it.
    Embeddable,

    /// A named sequence generator visible to every id property of the class.
    SequenceGenerator(SequenceGenerator),
}

impl ClassId {
    pub fn new(name: impl AsRef<str>) -> ClassId {
        ClassId(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The class name without its package or module path.
    pub fn simple_name(&self) -> &str {
        let name = self.name();
        let name = name.rsplit("::").next().unwrap_or(name);
        name.rsplit('.').next().unwrap_or(name)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(value: &str) -> Self {
        ClassId::new(value)
    }
}

impl From<String> for ClassId {
    fn from(value: String) -> Self {
        ClassId(Arc::from(value))
    }
}

impl From<&ClassId> for ClassId {
    fn from(value: &ClassId) -> Self {
        value.clone()
    }
}

impl ClassMeta {
    pub fn new(id: impl Into<ClassId>) -> ClassMeta {
        ClassMeta {
            id: id.into(),
            markers: vec![],
            properties: vec![],
            constructors: vec![0],
        }
    }

    /// Stores the entity in an explicitly named table.
    pub fn table(self, name: &str) -> ClassMeta {
        self.marker(ClassMarker::Table(TableMarker::named(name)))
    }

    pub fn embeddable(self) -> ClassMeta {
        self.marker(ClassMarker::Embeddable)
    }

    pub fn marker(mut self, marker: ClassMarker) -> ClassMeta {
        self.markers.push(marker);
        self
    }

    pub fn property(mut self, property: PropertyMeta) -> ClassMeta {
        self.properties.push(property);
        self
    }

    /// Declares an additional constructor taking `arity` arguments.
    pub fn constructor(mut self, arity: usize) -> ClassMeta {
        if !self.constructors.contains(&arity) {
            self.constructors.push(arity);
        }
        self
    }

    pub fn table_marker(&self) -> Option<&TableMarker> {
        self.markers.iter().find_map(|marker| match marker {
            ClassMarker::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn is_embeddable(&self) -> bool {
        self.markers
            .iter()
            .any(|marker| matches!(marker, ClassMarker::Embeddable))
    }

    pub fn sequence_generators(&self) -> impl Iterator<Item = &SequenceGenerator> {
        self.markers.iter().filter_map(|marker| match marker {
            ClassMarker::SequenceGenerator(generator) => Some(generator),
            _ => None,
        })
    }

    pub fn property_named(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn has_constructor(&self, arity: usize) -> bool {
        self.constructors.contains(&arity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_paths() {
        assert_eq!(ClassId::new("com.example.Shop").simple_name(), "Shop");
        assert_eq!(ClassId::new("crate::model::Shop").simple_name(), "Shop");
        assert_eq!(ClassId::new("Shop").simple_name(), "Shop");
    }

    #[test]
    fn constructors_are_deduplicated() {
        let meta = ClassMeta::new("Dto").constructor(2).constructor(2);
        assert_eq!(meta.constructors, vec![0, 2]);
        assert!(meta.has_constructor(2));
        assert!(!meta.has_constructor(3));
    }
}

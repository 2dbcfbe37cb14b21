use super::{ClassId, ClassMeta};

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// Answers "which properties, with which markers, does class C declare".
///
/// Implementations must be safe to share between threads; the metamodel may
/// be asked for domain models concurrently.
pub trait MetadataProvider: Send + Sync + fmt::Debug {
    /// Returns the metadata for `class`, or `None` if the class is unknown.
    fn class_meta(&self, class: &ClassId) -> Option<Arc<ClassMeta>>;
}

/// A [`MetadataProvider`] populated by explicit registration.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: IndexMap<ClassId, Arc<ClassMeta>>,
}

impl MetadataRegistry {
    pub fn new() -> MetadataRegistry {
        MetadataRegistry::default()
    }

    /// Registers a class, replacing any earlier registration with the same id.
    pub fn register(&mut self, class: ClassMeta) -> &mut Self {
        self.classes.insert(class.id.clone(), Arc::new(class));
        self
    }

    pub fn with(mut self, class: ClassMeta) -> Self {
        self.register(class);
        self
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassId> {
        self.classes.keys()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl MetadataProvider for MetadataRegistry {
    fn class_meta(&self, class: &ClassId) -> Option<Arc<ClassMeta>> {
        self.classes.get(class).cloned()
    }
}

impl<T: MetadataProvider + ?Sized> MetadataProvider for Arc<T> {
    fn class_meta(&self, class: &ClassId) -> Option<Arc<ClassMeta>> {
        (**self).class_meta(class)
    }
}

mod association;
mod shape;

use shape::Shape;

use super::{
    domain::Domain,
    meta::{ClassId, ClassMeta, MetadataProvider},
};
use crate::{err, Config, Dialect, Error, Result};

use dashmap::DashMap;
use indexmap::IndexSet;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// Builds and caches one immutable [`Domain`] per entity class.
///
/// Finished models are published to a concurrent map; readers never block
/// once a model exists. Construction is serialized behind a build lock, and
/// classes under construction are tracked so that cyclic associations
/// (self-references, mutual pairs) terminate and produce exactly one instance
/// per class.
#[derive(Debug)]
pub struct Metamodel {
    provider: Arc<dyn MetadataProvider>,
    dialect: Dialect,
    config: Config,

    /// Finished domain models.
    models: DashMap<ClassId, Arc<Domain>>,

    state: Mutex<BuildState>,
}

/// Used to track state during the build process
#[derive(Debug, Default)]
struct BuildState {
    /// Association-free shapes, reused across builds.
    shapes: HashMap<ClassId, Arc<Shape>>,

    /// Classes whose domain model is being built.
    in_progress: IndexSet<ClassId>,
}

impl Metamodel {
    pub fn new(provider: Arc<dyn MetadataProvider>, dialect: Dialect, config: Config) -> Metamodel {
        Metamodel {
            provider,
            dialect,
            config,
            models: DashMap::new(),
            state: Mutex::new(BuildState::default()),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The metadata provider models are built from.
    pub fn metadata(&self) -> &dyn MetadataProvider {
        &*self.provider
    }

    /// Returns the domain model for `class`, building it (and the models of
    /// every class it associates with) on first request.
    ///
    /// Repeated calls return the same instance.
    pub fn domain_model(&self, class: &ClassId) -> Result<Arc<Domain>> {
        if let Some(domain) = self.get(class) {
            return Ok(domain);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have finished the build while this one waited
        if let Some(domain) = self.get(class) {
            return Ok(domain);
        }

        self.build(&mut state, class)
            .and_then(|domain| {
                domain.ok_or_else(|| err!("domain model for `{class}` is still being built"))
            })
            .map_err(|err| err.context(err!("building domain model for `{class}`")))
    }

    /// Returns the domain model for `class` if it was already built.
    pub fn get(&self, class: &ClassId) -> Option<Arc<Domain>> {
        self.models.get(class).map(|domain| domain.value().clone())
    }

    /// Number of finished domain models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Builds `class` unless it is finished or already being built further up
    /// the stack, in which case the caller that started it will finish it.
    fn build(&self, state: &mut BuildState, class: &ClassId) -> Result<Option<Arc<Domain>>> {
        if let Some(domain) = self.get(class) {
            return Ok(Some(domain));
        }

        if !state.in_progress.insert(class.clone()) {
            tracing::trace!(class = %class, "domain model already in progress");
            return Ok(None);
        }

        let result = self.build_domain(state, class);
        state.in_progress.shift_remove(class);

        let domain = Arc::new(result?);
        let domain = self
            .models
            .entry(class.clone())
            .or_insert(domain)
            .value()
            .clone();

        Ok(Some(domain))
    }

    fn build_domain(&self, state: &mut BuildState, class: &ClassId) -> Result<Domain> {
        let shape = self.shape(state, class)?;

        tracing::debug!(
            entity = %shape.name(),
            table = %shape.domain.table.name,
            "building domain model"
        );

        let mut domain = shape.domain.clone();

        for property in &shape.meta.properties {
            if property.is_transient() || !property.is_association() {
                continue;
            }

            let association = self.association(state, &shape, &mut domain, property)?;
            domain.associations.push(association);
        }

        // Targets are built before the owner is published so a broken target
        // fails the owner too. Targets already in progress are skipped.
        let targets: Vec<ClassId> = domain
            .associations
            .iter()
            .map(|association| association.target.clone())
            .collect();

        for target in &targets {
            self.build(state, target)?;
        }

        tracing::debug!(
            entity = %domain.name,
            columns = domain.table.columns.len(),
            associations = domain.associations.len(),
            "built domain model"
        );

        Ok(domain)
    }

    fn shape(&self, state: &mut BuildState, class: &ClassId) -> Result<Arc<Shape>> {
        if let Some(shape) = state.shapes.get(class) {
            return Ok(shape.clone());
        }

        let meta = self.class_meta(class)?;
        let shape = Arc::new(Shape::build(self, meta)?);
        state.shapes.insert(class.clone(), shape.clone());
        Ok(shape)
    }

    fn class_meta(&self, class: &ClassId) -> Result<Arc<ClassMeta>> {
        self.provider.class_meta(class).ok_or_else(|| {
            Error::mapping_entity(class.simple_name(), format!("no metadata registered for `{class}`"))
        })
    }
}

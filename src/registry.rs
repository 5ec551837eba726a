//! Type-indexed mapper registry.
//!
//! Mappers are registered once through an [`EntityMapperConfiguration`] and
//! looked up by entity type afterwards. Each registration is stored behind a
//! type-erased handle keyed by the entity's `TypeId`; [`EntityMapperFactory::get_mapper`]
//! restores the concrete `dyn EntityMapper<Entity = T>` at the call site.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::ConfigError;
use crate::mapping::EntityMapper;

/// Shared handle to the mapper for entity type `T`.
pub type SharedMapper<T> = Arc<dyn EntityMapper<Entity = T>>;

type MapperHandle<T> = Arc<dyn Fn() -> SharedMapper<T> + Send + Sync>;

struct Registration {
    entity: &'static str,
    handle: Box<dyn Any + Send + Sync>,
}

/// Collects mapper registrations, at most one per entity type.
#[derive(Default)]
pub struct EntityMapperConfiguration {
    mappers: HashMap<TypeId, Registration>,
}

impl EntityMapperConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper instance, shared by every lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MapperAlreadyRegisteredForType` if the mapper's
    /// entity type already has a mapper.
    pub fn add_mapper<M>(&mut self, mapper: M) -> Result<&mut Self, ConfigError>
    where
        M: EntityMapper + 'static,
        M::Entity: 'static,
    {
        let shared: SharedMapper<M::Entity> = Arc::new(mapper);
        let handle: MapperHandle<M::Entity> = Arc::new(move || Arc::clone(&shared));
        self.insert::<M::Entity>(handle)
    }

    /// Register a mapper type; every lookup gets a fresh `M::default()`.
    pub fn add_mapper_type<M>(&mut self) -> Result<&mut Self, ConfigError>
    where
        M: EntityMapper + Default + 'static,
        M::Entity: 'static,
    {
        let handle: MapperHandle<M::Entity> =
            Arc::new(|| Arc::new(M::default()) as SharedMapper<M::Entity>);
        self.insert::<M::Entity>(handle)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.mappers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    fn insert<T: 'static>(&mut self, handle: MapperHandle<T>) -> Result<&mut Self, ConfigError> {
        let entity = type_name::<T>();
        if self.contains::<T>() {
            return Err(ConfigError::MapperAlreadyRegisteredForType { entity });
        }
        self.mappers.insert(
            TypeId::of::<T>(),
            Registration {
                entity,
                handle: Box::new(handle),
            },
        );
        Ok(self)
    }
}

impl fmt::Debug for EntityMapperConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.mappers.values().map(|r| r.entity))
            .finish()
    }
}

/// Hook that fills a fresh configuration with registrations.
pub trait ConfigureMappers: Send + Sync {
    fn configure(&self, cfg: &mut EntityMapperConfiguration) -> Result<(), ConfigError>;
}

impl<F> ConfigureMappers for F
where
    F: Fn(&mut EntityMapperConfiguration) -> Result<(), ConfigError> + Send + Sync,
{
    fn configure(&self, cfg: &mut EntityMapperConfiguration) -> Result<(), ConfigError> {
        self(cfg)
    }
}

/// Resolves entity types to their mappers.
///
/// The registry is written once by [`register_mappers`](Self::register_mappers)
/// and frozen afterwards, so a registered factory can be shared freely.
pub struct EntityMapperFactory {
    configurator: Box<dyn ConfigureMappers>,
    registry: OnceLock<HashMap<TypeId, Registration>>,
}

impl EntityMapperFactory {
    pub fn new(configurator: impl ConfigureMappers + 'static) -> Self {
        Self {
            configurator: Box::new(configurator),
            registry: OnceLock::new(),
        }
    }

    /// Build a factory whose configuration hook is a closure.
    pub fn from_fn<F>(configure: F) -> Self
    where
        F: Fn(&mut EntityMapperConfiguration) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        Self::new(configure)
    }

    /// Run the configuration hook and freeze the resulting registry.
    ///
    /// # Errors
    ///
    /// Returns `NoMappersRegistered` if the hook registered nothing,
    /// `MappersAlreadyRegistered` on a second call, or whatever the hook
    /// itself returned.
    pub fn register_mappers(&self) -> Result<(), ConfigError> {
        if self.is_registered() {
            return Err(ConfigError::MappersAlreadyRegistered);
        }

        let mut cfg = EntityMapperConfiguration::new();
        self.configurator.configure(&mut cfg)?;

        if cfg.is_empty() {
            return Err(ConfigError::NoMappersRegistered);
        }

        let count = cfg.len();
        self.registry
            .set(cfg.mappers)
            .map_err(|_| ConfigError::MappersAlreadyRegistered)?;
        tracing::debug!(count, "registered entity mappers");
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.registry.get().is_some()
    }

    /// Look up the mapper for `T`.
    ///
    /// # Errors
    ///
    /// `NoMappersRegistered` before registration, `TypeHasNoMapper` if `T`
    /// has no registration.
    pub fn get_mapper<T: 'static>(&self) -> Result<SharedMapper<T>, ConfigError> {
        let registry = self
            .registry
            .get()
            .ok_or(ConfigError::NoMappersRegistered)?;

        registry
            .get(&TypeId::of::<T>())
            .and_then(|r| r.handle.downcast_ref::<MapperHandle<T>>())
            .map(|make| make())
            .ok_or(ConfigError::TypeHasNoMapper {
                entity: type_name::<T>(),
            })
    }
}

impl fmt::Debug for EntityMapperFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entities: Option<Vec<&str>> = self
            .registry
            .get()
            .map(|r| r.values().map(|reg| reg.entity).collect());
        f.debug_struct("EntityMapperFactory")
            .field("entities", &entities)
            .finish_non_exhaustive()
    }
}

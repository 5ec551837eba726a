//! The decomposed HAL resource and its projections onto entities.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::cast::{source_key_for, ComplexProperty, FieldMapping, FromValue};
use crate::embedded::extract_embedded;
use crate::error::{CastError, LoadError};
use crate::links::{extract_links, Links};
use crate::loader::ResponseLoader;
use crate::mapping::map_entity;
use crate::registry::EntityMapperFactory;
use crate::types::{Link, RawMap, Value};
use crate::validator::validate_raw_document;

/// Embedded resources keyed by embed key, in document order.
pub type EmbeddedItems = IndexMap<String, Vec<HalResource>>;

/// A HAL document split into links, plain properties and embedded resources.
///
/// A resource starts out empty and is filled by [`load`](Self::load).
/// Embedded resources are owned by their parent and share its loader and
/// mapper factory.
#[derive(Clone, Serialize)]
pub struct HalResource {
    links: Links,
    properties: RawMap,
    #[serde(rename = "embedded")]
    embedded_items: EmbeddedItems,
    #[serde(skip)]
    loaded: bool,
    #[serde(skip)]
    loader: Arc<dyn ResponseLoader>,
    #[serde(skip)]
    mappers: Option<Arc<EntityMapperFactory>>,
}

struct Decomposed {
    links: Links,
    properties: RawMap,
    embedded_items: EmbeddedItems,
}

impl HalResource {
    /// Create an empty resource that loads documents with `loader`.
    pub fn new(loader: impl ResponseLoader + 'static) -> Self {
        Self::with_shared(Arc::new(loader), None)
    }

    /// Create an empty resource that can also project itself onto entities
    /// through `mappers`.
    pub fn with_mappers(
        loader: impl ResponseLoader + 'static,
        mappers: Arc<EntityMapperFactory>,
    ) -> Self {
        Self::with_shared(Arc::new(loader), Some(mappers))
    }

    pub(crate) fn with_shared(
        loader: Arc<dyn ResponseLoader>,
        mappers: Option<Arc<EntityMapperFactory>>,
    ) -> Self {
        Self {
            links: Links::new(),
            properties: RawMap::new(),
            embedded_items: EmbeddedItems::new(),
            loaded: false,
            loader,
            mappers,
        }
    }

    /// Decode `raw_response` and decompose it into this resource.
    ///
    /// The document is validated, then `_links` and `_embedded` are
    /// extracted (recursively for embedded documents). A successful load
    /// replaces any previously loaded state; a failed one leaves it as it was.
    ///
    /// # Errors
    ///
    /// `EmptyResponse` for an empty input, any error from the loader, and the
    /// structural errors raised by validation and section extraction.
    pub fn load(&mut self, raw_response: &str) -> Result<(), LoadError> {
        if raw_response.is_empty() {
            return Err(LoadError::EmptyResponse);
        }

        let document = self.loader.load(raw_response)?;
        let decomposed = self.decompose(document)?;

        tracing::debug!(
            links = decomposed.links.len(),
            properties = decomposed.properties.len(),
            embedded = decomposed.embedded_items.len(),
            "loaded HAL resource"
        );

        self.links = decomposed.links;
        self.properties = decomposed.properties;
        self.embedded_items = decomposed.embedded_items;
        self.loaded = true;
        Ok(())
    }

    fn decompose(&self, mut document: RawMap) -> Result<Decomposed, LoadError> {
        if document.is_empty() {
            return Ok(Decomposed {
                links: Links::new(),
                properties: document,
                embedded_items: EmbeddedItems::new(),
            });
        }

        validate_raw_document(&document)?;
        let links = extract_links(&mut document)?;
        let embedded_items = extract_embedded(&mut document, |child| self.child(child))?;

        Ok(Decomposed {
            links,
            properties: document,
            embedded_items,
        })
    }

    fn child(&self, document: RawMap) -> Result<HalResource, LoadError> {
        let mut child = HalResource::with_shared(Arc::clone(&self.loader), self.mappers.clone());
        let decomposed = child.decompose(document)?;
        child.links = decomposed.links;
        child.properties = decomposed.properties;
        child.embedded_items = decomposed.embedded_items;
        child.loaded = true;
        Ok(child)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    /// Links for one relation.
    pub fn link(&self, relation: &str) -> Option<&[Link]> {
        self.links.get(relation).map(Vec::as_slice)
    }

    /// Properties with `_links` and `_embedded` removed.
    pub fn properties(&self) -> &RawMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn embedded_items(&self) -> &EmbeddedItems {
        &self.embedded_items
    }

    pub fn embedded(&self, key: &str) -> Option<&[HalResource]> {
        self.embedded_items.get(key).map(Vec::as_slice)
    }

    /// Cast a scalar property to `T`.
    ///
    /// # Errors
    ///
    /// `EmptyArgument`, `KeyNotFound`, or `InvalidCast` when the value is not a `T`.
    pub fn cast_simple_property_to<T: FromValue>(&self, name: &str) -> Result<T, CastError> {
        require_non_empty(name, "name")?;
        let value = self
            .properties
            .get(name)
            .ok_or_else(|| CastError::KeyNotFound {
                key: name.to_string(),
            })?;
        Ok(T::from_value(name, value)?)
    }

    /// Build a `T` from a nested-map property.
    ///
    /// Each field of `T` is read from the key given by `mappings`, or from the
    /// field name lowercased when no mapping names it.
    ///
    /// # Errors
    ///
    /// `NoSuchProperty` if the property is missing, `InvalidComplexProperty`
    /// if it is not a map, `KeyNotFound` if a field's source key is absent,
    /// `InvalidCast` if a field value has the wrong kind.
    pub fn cast_complex_property_to<T: ComplexProperty>(
        &self,
        name: &str,
        mappings: &[FieldMapping<'_>],
    ) -> Result<T, CastError> {
        require_non_empty(name, "name")?;

        let value = self
            .properties
            .get(name)
            .ok_or_else(|| CastError::NoSuchProperty {
                property: name.to_string(),
            })?;
        let Value::Map(fields) = value else {
            return Err(CastError::InvalidComplexProperty {
                property: name.to_string(),
            });
        };

        let mut entity = T::default();
        for field in T::field_names() {
            let key = source_key_for(field, mappings);
            let field_value = fields
                .get(&key)
                .ok_or_else(|| CastError::KeyNotFound { key: key.clone() })?;
            entity.set_field(field, field_value)?;
        }
        Ok(entity)
    }

    /// Project this resource's properties onto `T` with its registered mapper.
    ///
    /// # Errors
    ///
    /// `NoMappersProvided` without a mapper factory, `ResourceHasNoProperties`
    /// for an empty resource, `Config(TypeHasNoMapper)` when `T` has no mapper,
    /// and `ProblemWithMapper` wrapping any failure inside the mapper.
    pub fn cast_resource_as<T: Default + 'static>(&self) -> Result<T, CastError> {
        self.project(&self.properties)
    }

    /// Project the single embedded resource under `key` onto `T`.
    ///
    /// # Errors
    ///
    /// `NoEmbeddedItemWithKey` if the key is absent, `EmbeddedItemIsCollection`
    /// if it holds more than one resource, plus everything
    /// [`cast_resource_as`](Self::cast_resource_as) can return.
    pub fn cast_embedded_item_as<T: Default + 'static>(&self, key: &str) -> Result<T, CastError> {
        match self.embedded_set(key)? {
            [item] => self.project(&item.properties),
            _ => Err(CastError::EmbeddedItemIsCollection {
                key: key.to_string(),
            }),
        }
    }

    /// Project every embedded resource under `key` onto `T`, in order.
    ///
    /// All or nothing: the first failing item aborts the whole set.
    pub fn cast_embedded_item_set_as<T: Default + 'static>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, CastError> {
        self.embedded_set(key)?
            .iter()
            .map(|item| self.project(&item.properties))
            .collect()
    }

    fn embedded_set(&self, key: &str) -> Result<&[HalResource], CastError> {
        require_non_empty(key, "key")?;
        self.embedded(key)
            .ok_or_else(|| CastError::NoEmbeddedItemWithKey {
                key: key.to_string(),
            })
    }

    fn project<T: Default + 'static>(&self, properties: &RawMap) -> Result<T, CastError> {
        let mappers = self.mappers.as_ref().ok_or(CastError::NoMappersProvided)?;
        if properties.is_empty() {
            return Err(CastError::ResourceHasNoProperties);
        }

        let mapper = mappers.get_mapper::<T>()?;
        map_entity(mapper.as_ref(), properties).map_err(|source| {
            tracing::debug!(entity = type_name::<T>(), error = %source, "mapper failed");
            CastError::ProblemWithMapper {
                entity: type_name::<T>(),
                source,
            }
        })
    }
}

impl fmt::Debug for HalResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalResource")
            .field("links", &self.links)
            .field("properties", &self.properties)
            .field("embedded_items", &self.embedded_items)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

fn require_non_empty(value: &str, argument: &'static str) -> Result<(), CastError> {
    if value.is_empty() {
        Err(CastError::EmptyArgument { argument })
    } else {
        Ok(())
    }
}

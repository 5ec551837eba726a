//! Entity mappers: field-by-field projection of raw data onto typed entities.

use std::marker::PhantomData;

use crate::cast::FromValue;
use crate::error::MappingError;
use crate::types::{RawMap, Value};

/// Projects a raw property map onto one entity type.
///
/// Implementations read fields through the [`MapContext`] helpers and
/// assign them to `ctx.entity`:
///
/// ```
/// use hal_reader::{raw_map, map_entity, EntityMapper, MapContext, MappingError};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// struct PersonMapper;
///
/// impl EntityMapper for PersonMapper {
///     type Entity = Person;
///
///     fn map(&self, mut ctx: MapContext<'_, Person>) -> Result<Person, MappingError> {
///         ctx.entity.name = ctx.map_to("full-name")?;
///         ctx.entity.age = ctx.map_to("age")?;
///         Ok(ctx.into_entity())
///     }
/// }
///
/// let raw = raw_map! { "full-name" => "Ann", "age" => 41i64 };
/// let person = map_entity(&PersonMapper, &raw).unwrap();
/// assert_eq!(person.name, "Ann");
/// ```
pub trait EntityMapper: Send + Sync {
    type Entity: Default;

    /// Populate `ctx.entity` from the raw data and return it.
    ///
    /// Only returned errors are wrapped as `CastError::ProblemWithMapper` by
    /// the resource casts. A panic inside `map` is not caught and unwinds
    /// through the caller.
    fn map(&self, ctx: MapContext<'_, Self::Entity>) -> Result<Self::Entity, MappingError>;
}

/// Run `mapper` against `raw` with a freshly default-initialized entity.
pub fn map_entity<M>(mapper: &M, raw: &RawMap) -> Result<M::Entity, MappingError>
where
    M: EntityMapper + ?Sized,
{
    let ctx = MapContext::load_data(raw)?;
    mapper.map(ctx)
}

/// Mapping state for a single entity: the raw data it reads from and the
/// entity being populated.
#[derive(Debug)]
pub struct MapContext<'a, T> {
    /// The entity under construction.
    pub entity: T,
    raw: &'a RawMap,
}

impl<'a, T: Default> MapContext<'a, T> {
    /// Bind a new context to `raw`.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::EmptyRawData` if `raw` has no entries.
    pub fn load_data(raw: &'a RawMap) -> Result<Self, MappingError> {
        if raw.is_empty() {
            return Err(MappingError::EmptyRawData);
        }
        Ok(Self {
            entity: T::default(),
            raw,
        })
    }
}

impl<'a, T> MapContext<'a, T> {
    pub fn raw_data(&self) -> &'a RawMap {
        self.raw
    }

    /// Read a simple (scalar) property.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `PropertyIsComplex` if the value is a nested
    /// map, `InvalidCast` if it is not a `P`.
    pub fn map_to<P: FromValue>(&self, name: &str) -> Result<P, MappingError> {
        let value = self.lookup(name)?;
        if value.is_map() {
            return Err(MappingError::PropertyIsComplex {
                property: name.to_string(),
            });
        }
        Ok(P::from_value(name, value)?)
    }

    /// Read a complex property as its nested map.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if absent, `PropertyIsSimple` if the value is not a map.
    pub fn get_property_as_map(&self, name: &str) -> Result<&'a RawMap, MappingError> {
        match self.lookup(name)? {
            Value::Map(map) => Ok(map),
            _ => Err(MappingError::PropertyIsSimple {
                property: name.to_string(),
            }),
        }
    }

    /// Defer mapping of a complex property to a closure or another mapper.
    pub fn map_to_complex<P>(&self, name: &str) -> Result<ComplexFieldMapper<'a, P>, MappingError> {
        let fields = self.get_property_as_map(name)?;
        Ok(ComplexFieldMapper::new(fields))
    }

    pub fn into_entity(self) -> T {
        self.entity
    }

    fn lookup(&self, name: &str) -> Result<&'a Value, MappingError> {
        if name.is_empty() {
            return Err(MappingError::EmptyArgument { argument: "name" });
        }
        self.raw.get(name).ok_or_else(|| MappingError::KeyNotFound {
            key: name.to_string(),
        })
    }
}

/// A nested map waiting to be turned into a `P`.
#[derive(Debug)]
pub struct ComplexFieldMapper<'a, P> {
    fields: &'a RawMap,
    _target: PhantomData<fn() -> P>,
}

impl<'a, P> ComplexFieldMapper<'a, P> {
    fn new(fields: &'a RawMap) -> Self {
        Self {
            fields,
            _target: PhantomData,
        }
    }

    pub fn fields(&self) -> &'a RawMap {
        self.fields
    }

    /// Build the value with a caller-supplied transform.
    pub fn map<F>(self, transform: F) -> Result<P, MappingError>
    where
        F: FnOnce(&'a RawMap) -> Result<P, MappingError>,
    {
        transform(self.fields)
    }

    /// Build the value by running a full mapper over the nested map.
    pub fn map_with<M>(self, mapper: &M) -> Result<P, MappingError>
    where
        M: EntityMapper<Entity = P> + ?Sized,
    {
        map_entity(mapper, self.fields)
    }
}

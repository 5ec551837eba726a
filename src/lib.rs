//! HAL Reader
//!
//! Decomposes HAL+JSON responses into navigable resource trees and projects
//! them onto strongly-typed entities through registered mappers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hal_reader::{
//!     EntityMapper, EntityMapperFactory, HalResource, JsonLoader, MapContext, MappingError,
//! };
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Order {
//!     id: i64,
//!     status: String,
//! }
//!
//! struct OrderMapper;
//!
//! impl EntityMapper for OrderMapper {
//!     type Entity = Order;
//!
//!     fn map(&self, mut ctx: MapContext<'_, Order>) -> Result<Order, MappingError> {
//!         ctx.entity.id = ctx.map_to("id")?;
//!         ctx.entity.status = ctx.map_to("status")?;
//!         Ok(ctx.into_entity())
//!     }
//! }
//!
//! let mappers = Arc::new(EntityMapperFactory::from_fn(|cfg| {
//!     cfg.add_mapper(OrderMapper)?;
//!     Ok(())
//! }));
//! mappers.register_mappers().unwrap();
//!
//! let mut resource = HalResource::with_mappers(JsonLoader::new(), mappers);
//! resource
//!     .load(r#"{
//!         "_links": { "self": { "href": "/orders" } },
//!         "_embedded": {
//!             "orders": [
//!                 { "id": 1, "status": "shipped" },
//!                 { "id": 2, "status": "open" }
//!             ]
//!         },
//!         "count": 2
//!     }"#)
//!     .unwrap();
//!
//! assert_eq!(resource.link("self").unwrap()[0].href(), "/orders");
//! assert!(resource.property("_embedded").is_none());
//!
//! let orders: Vec<Order> = resource.cast_embedded_item_set_as("orders").unwrap();
//! assert_eq!(orders[1], Order { id: 2, status: "open".into() });
//! ```
//!
//! # Wire Shapes
//!
//! | Section | Single | Collection |
//! |---------|--------|------------|
//! | `_links` | `{ "rel": { "href": ..., "title": ... } }` | `{ "rel": [ { "href": ... }, ... ] }` |
//! | `_embedded` | `{ "key": { ...document... } }` | `{ "key": [ { ...document... }, ... ] }` |
//!
//! Both shapes load the same way: a single entry becomes a one-element
//! sequence.

mod cast;
#[cfg(feature = "remote")]
mod client;
mod embedded;
mod error;
mod links;
mod loader;
mod mapping;
mod registry;
mod resource;
mod types;
mod validator;

pub use cast::{source_key_for, ComplexProperty, FieldMapping, FromValue, InvalidCast};
pub use error::{CastError, ConfigError, LoadError, MappingError, LINKS_EXAMPLE};
pub use links::Links;
pub use loader::{is_url, json_type_name, read_response, read_response_auto, JsonLoader, ResponseLoader};
pub use mapping::{map_entity, ComplexFieldMapper, EntityMapper, MapContext};
pub use registry::{ConfigureMappers, EntityMapperConfiguration, EntityMapperFactory, SharedMapper};
pub use resource::{EmbeddedItems, HalResource};
pub use types::{Link, OpaqueValue, RawMap, Value, EMBEDDED_KEY, LINKS_KEY};
pub use validator::validate_raw_document;

#[cfg(feature = "remote")]
pub use client::{fetch_text, ClientOptions, HalClient, HAL_JSON};

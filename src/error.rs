//! Error types for HAL resource loading, casting and entity mapping.

use std::path::PathBuf;
use thiserror::Error;

use crate::cast::InvalidCast;

/// Literal example of a well-formed `_links` section, embedded in
/// [`LoadError::LinksDataInWrongFormat`] messages to guide API authors.
pub const LINKS_EXAMPLE: &str = r#"{
  "_links": {
    "self": { "href": "/api/categories", "title": "Some Title" },
    "products": [
      { "href": "/api/products/product1", "title": "Product" },
      { "href": "/api/products/product2", "title": "Product" }
    ]
  }
}"#;

/// Errors while obtaining and decomposing a raw HAL document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Input errors (exit code 2)
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("raw response must not be empty")]
    EmptyResponse,

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("HAL document must be a JSON object, got {actual}")]
    NotAnObject { actual: String },

    // Structural errors (exit code 2)
    #[error("property '{property}' holds a {kind}; only nested maps and whitelisted scalars (string, boolean, number, decimal, uuid, date-time, time-span, uri) are allowed")]
    RawDataInput { property: String, kind: String },

    #[error("{}", links_format_message(.relation.as_deref()))]
    LinksDataInWrongFormat { relation: Option<String> },

    #[error("link in relation '{relation}' has no href")]
    LinkHrefMissing { relation: String },

    #[error("embedded item data must be a map of embed key to a document or an array of documents{}", key_suffix(.key.as_deref()))]
    EmbeddedItemDataInWrongFormat { key: Option<String> },
}

fn links_format_message(relation: Option<&str>) -> String {
    let subject = match relation {
        Some(rel) => format!("links for relation '{}' are in the wrong format", rel),
        None => "links data is in the wrong format".to_string(),
    };
    format!(
        "{}: _links must map each relation to a link object or an array of link objects, e.g.\n{}",
        subject, LINKS_EXAMPLE
    )
}

fn key_suffix(key: Option<&str>) -> String {
    key.map(|k| format!(" (key '{}')", k)).unwrap_or_default()
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors raised by mapper logic while projecting raw data onto an entity.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("argument '{argument}' must not be empty")]
    EmptyArgument { argument: &'static str },

    #[error("raw data handed to a mapper must not be empty")]
    EmptyRawData,

    #[error("no raw data property named '{key}'")]
    KeyNotFound { key: String },

    #[error(transparent)]
    InvalidCast(#[from] InvalidCast),

    #[error("property '{property}' is complex; use get_property_as_map or map_to_complex instead")]
    PropertyIsComplex { property: String },

    #[error("property '{property}' is simple; use map_to instead")]
    PropertyIsSimple { property: String },

    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl MappingError {
    /// Wrap an arbitrary error raised by mapper code.
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        MappingError::Custom(err.into())
    }
}

/// Errors in mapper registration and lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a mapper is already registered for type {entity}")]
    MapperAlreadyRegisteredForType { entity: &'static str },

    #[error("no mappers have been registered")]
    NoMappersRegistered,

    #[error("mappers have already been registered for this factory")]
    MappersAlreadyRegistered,

    #[error("type {entity} has no mapper")]
    TypeHasNoMapper { entity: &'static str },
}

/// Errors from `HalResource` accessors and projections.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("argument '{argument}' must not be empty")]
    EmptyArgument { argument: &'static str },

    #[error("no property named '{key}'")]
    KeyNotFound { key: String },

    #[error(transparent)]
    InvalidCast(#[from] InvalidCast),

    #[error("no property called '{property}' was found")]
    NoSuchProperty { property: String },

    #[error("the complex property '{property}' must be decomposed as a nested map to be valid")]
    InvalidComplexProperty { property: String },

    #[error("in order to map a resource to an entity a mapper factory must be provided")]
    NoMappersProvided,

    #[error("resource has no properties to map")]
    ResourceHasNoProperties,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("there are no embedded items with a key of '{key}'")]
    NoEmbeddedItemWithKey { key: String },

    #[error("embedded item '{key}' is a collection; use cast_embedded_item_set_as")]
    EmbeddedItemIsCollection { key: String },

    #[error("the mapper for {entity} failed: {source}")]
    ProblemWithMapper {
        entity: &'static str,
        #[source]
        source: MappingError,
    },
}

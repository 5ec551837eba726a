//! Raw response loading.
//!
//! A [`ResponseLoader`] turns a raw response body into a [`RawMap`]. The
//! bundled [`JsonLoader`] decodes HAL+JSON with `serde_json`; anything else
//! (other encodings, canned test documents) can be plugged in through the
//! trait or a closure.

use std::path::Path;

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use crate::error::LoadError;
use crate::types::{RawMap, Value};

/// Decodes a raw response body into a raw document.
pub trait ResponseLoader: Send + Sync {
    /// Decode `raw_response`.
    ///
    /// The returned map may only contain nested maps and whitelisted scalars
    /// (plus `_links` / `_embedded` sections); anything else is rejected when
    /// the document is loaded into a resource.
    fn load(&self, raw_response: &str) -> Result<RawMap, LoadError>;
}

impl<F> ResponseLoader for F
where
    F: Fn(&str) -> Result<RawMap, LoadError> + Send + Sync,
{
    fn load(&self, raw_response: &str) -> Result<RawMap, LoadError> {
        self(raw_response)
    }
}

/// HAL+JSON loader backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader {
    detect_typed_strings: bool,
}

impl JsonLoader {
    /// Create a loader that keeps all JSON strings as strings.
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, strings that parse as a UUID, an RFC 3339 date-time or
    /// an absolute http(s) URL load as the matching typed scalar.
    pub fn detect_typed_strings(mut self, detect: bool) -> Self {
        self.detect_typed_strings = detect;
        self
    }

    fn convert(&self, value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    // Non-integral numbers always have an f64 form
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) if self.detect_typed_strings => typed_string(s),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(|v| self.convert(v)).collect())
            }
            serde_json::Value::Object(map) => Value::Map(self.convert_object(map)),
        }
    }

    fn convert_object(&self, map: serde_json::Map<String, serde_json::Value>) -> RawMap {
        map.into_iter()
            .map(|(k, v)| (k, self.convert(v)))
            .collect()
    }
}

impl ResponseLoader for JsonLoader {
    fn load(&self, raw_response: &str) -> Result<RawMap, LoadError> {
        let parsed: serde_json::Value = serde_json::from_str(raw_response)
            .map_err(|source| LoadError::InvalidJson { source })?;

        match parsed {
            serde_json::Value::Object(map) => Ok(self.convert_object(map)),
            other => Err(LoadError::NotAnObject {
                actual: json_type_name(&other).to_string(),
            }),
        }
    }
}

fn typed_string(s: String) -> Value {
    if let Ok(id) = Uuid::parse_str(&s) {
        return Value::Uuid(id);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Value::DateTime(dt.with_timezone(&Utc));
    }
    if is_url(&s) {
        if let Ok(url) = Url::parse(&s) {
            return Value::Uri(url);
        }
    }
    Value::String(s)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Read a raw response body from a file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::ReadError` if it can't be read.
pub fn read_response(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a raw response body from a file path or URL.
///
/// URL fetching requires the `remote` feature (enabled by default).
pub fn read_response_auto(source: &str) -> Result<String, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            crate::client::fetch_text(source, &crate::client::ClientOptions::default())
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        read_response(Path::new(source))
    }
}

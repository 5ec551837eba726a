//! Core types for HAL resource decomposition.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use url::Url;
use uuid::Uuid;

/// Reserved key holding a document's hypermedia links.
pub const LINKS_KEY: &str = "_links";

/// Reserved key holding a document's embedded resources.
pub const EMBEDDED_KEY: &str = "_embedded";

/// A string-keyed map of raw values, as produced by a [`ResponseLoader`](crate::ResponseLoader).
///
/// Iteration follows insertion order, so a loaded document keeps its source order.
pub type RawMap = IndexMap<String, Value>;

/// A raw document value.
///
/// Scalars form a closed whitelist. `Map` holds a nested document or complex
/// property. `List` is only meaningful as a sequence of maps inside `_links`
/// or `_embedded`. `Null` and `Opaque` exist so loaders can hand over
/// whatever they found; the validator rejects them as property values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    TimeSpan(TimeDelta),
    Uri(Url),
    Map(RawMap),
    List(Vec<Value>),
    Opaque(OpaqueValue),
}

impl Value {
    /// Wrap an application-defined value that has no whitelisted representation.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(OpaqueValue::new(value))
    }

    /// Returns the kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::DateTime(_) => "date-time",
            Value::TimeSpan(_) => "time-span",
            Value::Uri(_) => "uri",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Opaque(o) => o.type_name(),
        }
    }

    /// True for the whitelisted scalar kinds.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Value::Null | Value::Map(_) | Value::List(_) | Value::Opaque(_)
        )
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Value::TimeSpan(ts) => write!(f, "{}", ts),
            Value::Uri(u) => f.write_str(u.as_str()),
            Value::Map(_) | Value::List(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
            Value::Opaque(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::UInt(n) => serializer.serialize_u64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::List(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            // Typed scalars go out as their canonical string form
            other => serializer.collect_str(other),
        }
    }
}

/// An application-defined value carried through a raw document untouched.
///
/// Equality is identity: two opaque values are equal only when they share
/// the same allocation.
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueValue").field(&self.type_name).finish()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f64 => Float,
    Decimal => Decimal,
    String => String,
    &str => String,
    Uuid => Uuid,
    DateTime<Utc> => DateTime,
    TimeDelta => TimeSpan,
    Url => Uri,
    RawMap => Map,
}

impl From<Vec<RawMap>> for Value {
    fn from(maps: Vec<RawMap>) -> Self {
        Value::List(maps.into_iter().map(Value::Map).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Build a [`RawMap`] from `key => value` pairs, converting each value with `Value::from`.
///
/// ```
/// use hal_reader::{raw_map, Value};
///
/// let doc = raw_map! {
///     "name" => "Widget",
///     "_links" => raw_map! { "self" => raw_map! { "href" => "/widgets/1" } },
/// };
/// assert_eq!(doc["name"], Value::from("Widget"));
/// ```
#[macro_export]
macro_rules! raw_map {
    () => { $crate::RawMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::RawMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>, title: Option<String>) -> Self {
        Self {
            href: href.into(),
            title,
        }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Shape of a `_links` relation or `_embedded` key payload.
///
/// HAL encodes "one or many" by shape alone: a bare object is a single
/// entry, an array of objects is a collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OneOrMany {
    Single(RawMap),
    Many(Vec<RawMap>),
}

impl OneOrMany {
    /// Classify a payload by runtime shape.
    ///
    /// Returns `None` for scalars and for arrays holding anything but maps.
    pub(crate) fn classify(value: Value) -> Option<Self> {
        match value {
            Value::Map(map) => Some(OneOrMany::Single(map)),
            Value::List(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Map(map) => Some(map),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(OneOrMany::Many),
            _ => None,
        }
    }

    pub(crate) fn into_vec(self) -> Vec<RawMap> {
        match self {
            OneOrMany::Single(map) => vec![map],
            OneOrMany::Many(maps) => maps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_whitelist() {
        assert!(Value::from("text").is_scalar());
        assert!(Value::from(Uuid::nil()).is_scalar());
        assert!(Value::from(TimeDelta::seconds(5)).is_scalar());
        assert!(!Value::Null.is_scalar());
        assert!(!Value::from(RawMap::new()).is_scalar());
        assert!(!Value::List(vec![]).is_scalar());
        assert!(!Value::opaque(42u8).is_scalar());
    }

    #[test]
    fn opaque_reports_type_name() {
        struct Customer;
        let value = Value::opaque(Customer);
        assert!(value.kind_name().ends_with("Customer"));
    }

    #[test]
    fn opaque_equality_is_identity() {
        let a = OpaqueValue::new(1u32);
        let b = a.clone();
        let c = OpaqueValue::new(1u32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<u32>(), Some(&1));
    }

    #[test]
    fn classify_single_map() {
        let shape = OneOrMany::classify(Value::from(raw_map! { "href" => "/a" }));
        assert!(matches!(shape, Some(OneOrMany::Single(_))));
    }

    #[test]
    fn classify_list_of_maps() {
        let shape = OneOrMany::classify(Value::from(vec![
            raw_map! { "href" => "/a" },
            raw_map! { "href" => "/b" },
        ]));
        match shape {
            Some(OneOrMany::Many(maps)) => assert_eq!(maps.len(), 2),
            other => panic!("expected many, got {:?}", other),
        }
    }

    #[test]
    fn classify_rejects_scalars_and_mixed_lists() {
        assert_eq!(OneOrMany::classify(Value::from("x")), None);
        assert_eq!(
            OneOrMany::classify(Value::List(vec![
                Value::from(raw_map! { "href" => "/a" }),
                Value::from(3i64),
            ])),
            None
        );
    }

    #[test]
    fn typed_scalars_serialize_as_strings() {
        let id = Uuid::parse_str("3b947c60-dcf8-4199-95a1-7a70fd81d16a").unwrap();
        let doc = Value::from(raw_map! { "id" => id, "count" => 3i64 });
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], "3b947c60-dcf8-4199-95a1-7a70fd81d16a");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn link_accessors() {
        let link = Link::new("/orders", Some("Orders".into()));
        assert_eq!(link.href(), "/orders");
        assert_eq!(link.title(), Some("Orders"));
        assert_eq!(Link::new("/orders", None).title(), None);
    }
}

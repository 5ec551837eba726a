//! Strict casts from raw values to Rust types.
//!
//! Casting never coerces: a string is not parsed into a number, a float is
//! not truncated into an integer. Integer casts succeed only when the value
//! fits the target type exactly.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::types::Value;

/// A raw value could not be cast to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot cast property '{property}' from {actual} to {expected}")]
pub struct InvalidCast {
    pub property: String,
    pub expected: &'static str,
    pub actual: String,
}

impl InvalidCast {
    pub fn new(property: &str, expected: &'static str, value: &Value) -> Self {
        Self {
            property: property.to_string(),
            expected,
            actual: value.kind_name().to_string(),
        }
    }
}

/// Types that can be read out of a raw [`Value`].
pub trait FromValue: Sized {
    /// Cast `value`, found under `property`, into `Self`.
    fn from_value(property: &str, value: &Value) -> Result<Self, InvalidCast>;
}

macro_rules! from_value_variant {
    ($($ty:ty => $variant:ident, $expected:literal);* $(;)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(property: &str, value: &Value) -> Result<Self, InvalidCast> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(InvalidCast::new(property, $expected, other)),
                    }
                }
            }
        )*
    };
}

from_value_variant! {
    bool => Bool, "boolean";
    f64 => Float, "float";
    Decimal => Decimal, "decimal";
    String => String, "string";
    Uuid => Uuid, "uuid";
    DateTime<Utc> => DateTime, "date-time";
    TimeDelta => TimeSpan, "time-span";
    Url => Uri, "uri";
}

macro_rules! from_value_integer {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(property: &str, value: &Value) -> Result<Self, InvalidCast> {
                    let fitted = match value {
                        Value::Int(n) => <$ty>::try_from(*n).ok(),
                        Value::UInt(n) => <$ty>::try_from(*n).ok(),
                        _ => None,
                    };
                    fitted.ok_or_else(|| InvalidCast::new(property, $expected, value))
                }
            }
        )*
    };
}

from_value_integer! {
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(property: &str, value: &Value) -> Result<Self, InvalidCast> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(property, other).map(Some),
        }
    }
}

/// Overrides the source key for one field of a [`ComplexProperty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping<'a> {
    pub field: &'a str,
    pub source: &'a str,
}

impl<'a> FieldMapping<'a> {
    /// Map the entity field `field` from the raw key `source`.
    pub fn new(field: &'a str, source: &'a str) -> Self {
        Self { field, source }
    }
}

/// Resolve the raw key for `field`: an explicit mapping wins, otherwise the
/// field name lowercased.
pub fn source_key_for(field: &str, mappings: &[FieldMapping<'_>]) -> String {
    mappings
        .iter()
        .find(|m| m.field == field)
        .map(|m| m.source.to_string())
        .unwrap_or_else(|| field.to_lowercase())
}

/// An entity built field-by-field from a nested map.
///
/// Usually implemented with [`impl_complex_property!`](crate::impl_complex_property).
pub trait ComplexProperty: Default {
    /// Field names in declaration order.
    fn field_names() -> &'static [&'static str];

    /// Assign `value` to `field`.
    fn set_field(&mut self, field: &str, value: &Value) -> Result<(), InvalidCast>;
}

/// Implement [`ComplexProperty`] for a struct by listing its fields.
///
/// ```
/// use hal_reader::{impl_complex_property, raw_map, HalResource, JsonLoader};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Address {
///     street: String,
///     number: i64,
/// }
/// impl_complex_property!(Address { street, number });
///
/// let mut resource = HalResource::new(JsonLoader::new());
/// resource.load(r#"{"address": {"street": "Main", "number": 7}}"#).unwrap();
/// let address: Address = resource.cast_complex_property_to("address", &[]).unwrap();
/// assert_eq!(address, Address { street: "Main".into(), number: 7 });
/// ```
#[macro_export]
macro_rules! impl_complex_property {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::ComplexProperty for $ty {
            fn field_names() -> &'static [&'static str] {
                &[$(stringify!($field)),+]
            }

            fn set_field(
                &mut self,
                field: &str,
                value: &$crate::Value,
            ) -> ::std::result::Result<(), $crate::InvalidCast> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::FromValue::from_value(field, value)?;
                        }
                    )+
                    _ => {}
                }
                Ok(())
            }
        }
    };
}

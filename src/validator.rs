//! Raw document validation.

use crate::error::LoadError;
use crate::types::{RawMap, Value};

/// Check that every top-level value is a nested map or a whitelisted scalar.
///
/// Nested maps are not descended into here; embedded documents get validated
/// when they are loaded in turn.
///
/// # Errors
///
/// Returns `LoadError::RawDataInput` naming the first offending property.
pub fn validate_raw_document(document: &RawMap) -> Result<(), LoadError> {
    match document.iter().find(|(_, value)| !is_allowed(value)) {
        Some((property, value)) => Err(LoadError::RawDataInput {
            property: property.clone(),
            kind: value.kind_name().to_string(),
        }),
        None => Ok(()),
    }
}

fn is_allowed(value: &Value) -> bool {
    value.is_map() || value.is_scalar()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_map;
    use chrono::{TimeDelta, TimeZone, Utc};
    use rust_decimal::Decimal;
    use url::Url;
    use uuid::Uuid;

    #[test]
    fn accepts_whitelisted_scalars() {
        let doc = raw_map! {
            "string" => "text",
            "bool" => true,
            "int" => -4i64,
            "uint" => 4u64,
            "float" => 1.5f64,
            "decimal" => Decimal::new(1000, 2),
            "uuid" => Uuid::nil(),
            "date" => Utc.with_ymd_and_hms(2020, 7, 5, 0, 0, 0).unwrap(),
            "span" => TimeDelta::milliseconds(1000),
            "uri" => Url::parse("http://www.someurl.com").unwrap(),
        };
        assert!(validate_raw_document(&doc).is_ok());
    }

    #[test]
    fn accepts_nested_maps_without_descending() {
        let doc = raw_map! {
            "complex" => raw_map! { "inner" => Value::opaque(1u8) },
        };
        assert!(validate_raw_document(&doc).is_ok());
    }

    #[test]
    fn accepts_empty_document() {
        assert!(validate_raw_document(&RawMap::new()).is_ok());
    }

    #[test]
    fn rejects_application_defined_value() {
        struct Customer;
        let doc = raw_map! { "name" => "x", "customer" => Value::opaque(Customer) };
        match validate_raw_document(&doc) {
            Err(LoadError::RawDataInput { property, kind }) => {
                assert_eq!(property, "customer");
                assert!(kind.ends_with("Customer"));
            }
            other => panic!("expected RawDataInput, got {:?}", other),
        }
    }

    #[test]
    fn rejects_top_level_lists_and_null() {
        let doc = raw_map! { "tags" => vec![Value::from("a")] };
        assert!(matches!(
            validate_raw_document(&doc),
            Err(LoadError::RawDataInput { .. })
        ));

        let doc = raw_map! { "missing" => Value::Null };
        assert!(matches!(
            validate_raw_document(&doc),
            Err(LoadError::RawDataInput { .. })
        ));
    }
}

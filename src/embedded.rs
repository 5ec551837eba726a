//! Extraction of the `_embedded` section.

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::types::{OneOrMany, RawMap, Value, EMBEDDED_KEY};

/// Remove `_embedded` from `document` and turn each embedded document into a
/// node with `build`.
///
/// `build` is expected to run the full load pipeline on the child, which is
/// how arbitrarily deep embedding is handled. Keys holding an empty array
/// are left out.
pub(crate) fn extract_embedded<T, F>(
    document: &mut RawMap,
    mut build: F,
) -> Result<IndexMap<String, Vec<T>>, LoadError>
where
    F: FnMut(RawMap) -> Result<T, LoadError>,
{
    let mut embedded = IndexMap::new();

    let Some(section) = document.shift_remove(EMBEDDED_KEY) else {
        return Ok(embedded);
    };

    let Value::Map(items) = section else {
        return Err(LoadError::EmbeddedItemDataInWrongFormat { key: None });
    };

    for (key, payload) in items {
        let shape = OneOrMany::classify(payload).ok_or_else(|| {
            LoadError::EmbeddedItemDataInWrongFormat {
                key: Some(key.clone()),
            }
        })?;

        let children = shape
            .into_vec()
            .into_iter()
            .map(&mut build)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(key = %key, count = children.len(), "decoded embedded items");

        if !children.is_empty() {
            embedded.insert(key, children);
        }
    }
    Ok(embedded)
}

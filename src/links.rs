//! Extraction of the `_links` section.

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::types::{Link, OneOrMany, RawMap, Value, LINKS_KEY};

const HREF_KEY: &str = "href";
const TITLE_KEY: &str = "title";

/// Links of a resource keyed by relation name, in document order.
pub type Links = IndexMap<String, Vec<Link>>;

/// Remove `_links` from `document` and decode it.
///
/// A relation holding a single link object becomes a one-element sequence;
/// an array keeps its source order. Relations with an empty array are left
/// out. Any malformed relation fails the whole section.
pub(crate) fn extract_links(document: &mut RawMap) -> Result<Links, LoadError> {
    let Some(section) = document.shift_remove(LINKS_KEY) else {
        return Ok(Links::new());
    };

    let Value::Map(relations) = section else {
        return Err(LoadError::LinksDataInWrongFormat { relation: None });
    };

    let mut links = Links::new();
    for (relation, payload) in relations {
        let shape =
            OneOrMany::classify(payload).ok_or_else(|| LoadError::LinksDataInWrongFormat {
                relation: Some(relation.clone()),
            })?;

        let decoded = shape
            .into_vec()
            .iter()
            .map(|fields| decode_link(&relation, fields))
            .collect::<Result<Vec<_>, _>>()?;

        if !decoded.is_empty() {
            links.insert(relation, decoded);
        }
    }
    Ok(links)
}

fn decode_link(relation: &str, fields: &RawMap) -> Result<Link, LoadError> {
    let href = match fields.get(HREF_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.to_string()),
    }
    .filter(|href| !href.is_empty())
    .ok_or_else(|| LoadError::LinkHrefMissing {
        relation: relation.to_string(),
    })?;

    let title = match fields.get(TITLE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.to_string()),
    };

    Ok(Link::new(href, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_map;
    use url::Url;

    #[test]
    fn no_links_section() {
        let mut doc = raw_map! { "name" => "x" };
        let links = extract_links(&mut doc).unwrap();
        assert!(links.is_empty());
        assert!(doc.contains_key("name"));
    }

    #[test]
    fn singular_link_becomes_one_element_sequence() {
        let mut doc = raw_map! {
            "_links" => raw_map! {
                "self" => raw_map! { "href" => "/api/categories", "title" => "Some Title" },
            },
        };
        let links = extract_links(&mut doc).unwrap();
        assert_eq!(
            links["self"],
            vec![Link::new("/api/categories", Some("Some Title".into()))]
        );
        assert!(!doc.contains_key("_links"));
    }

    #[test]
    fn link_collection_keeps_order() {
        let mut doc = raw_map! {
            "_links" => raw_map! {
                "products" => vec![
                    raw_map! { "href" => "/api/products/product1" },
                    raw_map! { "href" => "/api/products/product2" },
                    raw_map! { "href" => "/api/products/product3" },
                ],
            },
        };
        let links = extract_links(&mut doc).unwrap();
        let hrefs: Vec<_> = links["products"].iter().map(Link::href).collect();
        assert_eq!(
            hrefs,
            [
                "/api/products/product1",
                "/api/products/product2",
                "/api/products/product3"
            ]
        );
    }

    #[test]
    fn relations_keep_document_order() {
        let mut doc = raw_map! {
            "_links" => raw_map! {
                "self" => raw_map! { "href" => "/a" },
                "next" => raw_map! { "href" => "/a?page=2" },
                "alpha" => raw_map! { "href" => "/alpha" },
            },
        };
        let links = extract_links(&mut doc).unwrap();
        let relations: Vec<&str> = links.keys().map(String::as_str).collect();
        assert_eq!(relations, ["self", "next", "alpha"]);
    }

    #[test]
    fn missing_title_is_none() {
        let mut doc = raw_map! {
            "_links" => raw_map! { "self" => raw_map! { "href" => "/a" } },
        };
        let links = extract_links(&mut doc).unwrap();
        assert_eq!(links["self"][0].title(), None);
    }

    #[test]
    fn href_uses_string_form_of_value() {
        let uri = Url::parse("http://example.com/a").unwrap();
        let mut doc = raw_map! {
            "_links" => raw_map! { "self" => raw_map! { "href" => uri } },
        };
        let links = extract_links(&mut doc).unwrap();
        assert_eq!(links["self"][0].href(), "http://example.com/a");
    }

    #[test]
    fn empty_link_array_is_omitted() {
        let mut doc = raw_map! {
            "_links" => raw_map! { "items" => Vec::<RawMap>::new() },
        };
        let links = extract_links(&mut doc).unwrap();
        assert!(!links.contains_key("items"));
        assert!(!doc.contains_key("_links"));
    }

    #[test]
    fn section_must_be_a_map() {
        let mut doc = raw_map! { "_links" => "not links" };
        let err = extract_links(&mut doc).unwrap_err();
        assert!(matches!(
            err,
            LoadError::LinksDataInWrongFormat { relation: None }
        ));
    }

    #[test]
    fn malformed_relation_fails_whole_section() {
        let mut doc = raw_map! {
            "_links" => raw_map! {
                "self" => raw_map! { "href" => "/a" },
                "zzz" => 42i64,
            },
        };
        match extract_links(&mut doc) {
            Err(LoadError::LinksDataInWrongFormat { relation }) => {
                assert_eq!(relation.as_deref(), Some("zzz"));
            }
            other => panic!("expected LinksDataInWrongFormat, got {:?}", other),
        }
    }

    #[test]
    fn href_is_required() {
        let mut doc = raw_map! {
            "_links" => raw_map! { "self" => raw_map! { "title" => "no href" } },
        };
        assert!(matches!(
            extract_links(&mut doc),
            Err(LoadError::LinkHrefMissing { relation }) if relation == "self"
        ));

        let mut doc = raw_map! {
            "_links" => raw_map! { "self" => raw_map! { "href" => "" } },
        };
        assert!(matches!(
            extract_links(&mut doc),
            Err(LoadError::LinkHrefMissing { .. })
        ));
    }
}

//! HTTP client tests against a local mock server.

#![cfg(feature = "remote")]

use std::sync::Arc;
use std::time::Duration;

use hal_reader::{
    ClientOptions, EntityMapper, EntityMapperFactory, HalClient, JsonLoader, LoadError,
    MapContext, MappingError, Value,
};
use mockito::Matcher;
use serde::Serialize;

const ORDERS: &str = r#"{
    "_links": { "self": { "href": "/orders" } },
    "_embedded": {
        "orders": [
            { "id": 123, "status": "shipped" },
            { "id": 124, "status": "processing" }
        ]
    },
    "count": 2
}"#;

#[derive(Debug, Default, PartialEq, Serialize)]
struct Order {
    id: i64,
    status: String,
}

struct OrderMapper;

impl EntityMapper for OrderMapper {
    type Entity = Order;

    fn map(&self, mut ctx: MapContext<'_, Order>) -> Result<Order, MappingError> {
        ctx.entity.id = ctx.map_to("id")?;
        ctx.entity.status = ctx.map_to("status")?;
        Ok(ctx.into_entity())
    }
}

fn client() -> HalClient {
    HalClient::new(JsonLoader::new(), &ClientOptions::default()).unwrap()
}

fn order_mappers() -> Arc<EntityMapperFactory> {
    Arc::new(EntityMapperFactory::from_fn(|cfg| {
        cfg.add_mapper(OrderMapper)?;
        Ok(())
    }))
}

mod get {
    use super::*;

    #[test]
    fn loads_resource() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/orders")
            .match_header("accept", "application/hal+json")
            .with_status(200)
            .with_header("content-type", "application/hal+json")
            .with_body(ORDERS)
            .create();

        let resource = client()
            .get_resource(&format!("{}/orders", server.url()))
            .unwrap();

        mock.assert();
        assert!(resource.is_loaded());
        assert_eq!(resource.link("self").unwrap()[0].href(), "/orders");
        assert_eq!(resource.property("count"), Some(&Value::Int(2)));
        assert_eq!(resource.embedded("orders").unwrap().len(), 2);
    }

    #[test]
    fn custom_accept_header() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/orders")
            .match_header("accept", "application/json")
            .with_body("{}")
            .create();

        let options = ClientOptions::new()
            .accept("application/json")
            .timeout(Duration::from_secs(2));
        let client = HalClient::new(JsonLoader::new(), &options).unwrap();
        let body = client.fetch_raw(&format!("{}/orders", server.url())).unwrap();

        mock.assert();
        assert_eq!(body, "{}");
    }

    #[test]
    fn not_found_is_a_network_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/missing").with_status(404).create();

        let err = client()
            .get_resource(&format!("{}/missing", server.url()))
            .unwrap_err();
        assert!(matches!(err, LoadError::NetworkError { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn malformed_body_is_a_load_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/orders")
            .with_body(r#"{"_links": "/orders"}"#)
            .create();

        let err = client()
            .get_resource(&format!("{}/orders", server.url()))
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::LinksDataInWrongFormat { relation: None }
        ));
    }

    #[test]
    fn fetch_text_without_client() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/doc").with_body(ORDERS).create();

        let body =
            hal_reader::fetch_text(&format!("{}/doc", server.url()), &ClientOptions::default())
                .unwrap();
        assert!(body.contains("\"count\": 2"));
    }
}

mod create {
    use super::*;

    #[test]
    fn posts_entity_as_json() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/orders")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "id": 125,
                "status": "open"
            })))
            .with_status(201)
            .with_body(
                r#"{"_links": {"self": {"href": "/orders/125"}}, "id": 125, "status": "open"}"#,
            )
            .create();

        let order = Order {
            id: 125,
            status: "open".into(),
        };
        let created = client()
            .create(&format!("{}/orders", server.url()), &order)
            .unwrap();

        mock.assert();
        assert_eq!(created.link("self").unwrap()[0].href(), "/orders/125");
    }

    #[test]
    fn rejected_post_is_a_network_error() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/orders").with_status(422).create();

        let err = client()
            .create(&format!("{}/orders", server.url()), &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, LoadError::NetworkError { .. }));
    }
}

mod mappers {
    use super::*;

    #[test]
    fn with_mappers_registers_and_projects() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/orders").with_body(ORDERS).create();

        let mappers = order_mappers();
        let client = client().with_mappers(Arc::clone(&mappers)).unwrap();
        assert!(mappers.is_registered());

        let resource = client
            .get_resource(&format!("{}/orders", server.url()))
            .unwrap();
        let orders: Vec<Order> = resource.cast_embedded_item_set_as("orders").unwrap();
        assert_eq!(
            orders,
            [
                Order {
                    id: 123,
                    status: "shipped".into()
                },
                Order {
                    id: 124,
                    status: "processing".into()
                },
            ]
        );
    }

    #[test]
    fn already_registered_factory_is_accepted() {
        let mappers = order_mappers();
        mappers.register_mappers().unwrap();
        assert!(client().with_mappers(mappers).is_ok());
    }

    #[test]
    fn empty_factory_is_rejected() {
        let mappers = Arc::new(EntityMapperFactory::from_fn(|_| Ok(())));
        assert!(client().with_mappers(mappers).is_err());
    }
}

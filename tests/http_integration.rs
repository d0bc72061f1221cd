//! Integration tests for the Vultr client using wiremock
//!
//! These tests run the gateway, the catalog loader and a few request builders
//! against mocked endpoints.

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use vultr_client::api::client::{VultrClient, BLOCKS, REGIONS};
use vultr_client::api::http::USER_AGENT;
use vultr_client::resources::block_storage::{BlockStorage, CreateBlock};
use vultr_client::resources::Catalogs;
use vultr_client::{Catalog, VultrError};
use wiremock::matchers::{
    bearer_token, body_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> VultrClient {
    VultrClient::with_base_url("test-token", &server.uri()).unwrap()
}

mod gateway_tests {
    use super::*;

    /// Every request carries the token, the user agent and a JSON content type
    #[tokio::test]
    async fn test_fixed_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/account"))
            .and(bearer_token("test-token"))
            .and(header("user-agent", USER_AGENT))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"account":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let body = assert_ok!(client_for(&server).get("/account").await);
        assert_eq!(body, r#"{"account":{}}"#);
    }

    /// Success bodies are returned verbatim, even when empty
    #[tokio::test]
    async fn test_empty_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/blocks/blk-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let body = assert_ok!(client_for(&server).delete("/blocks/blk-1").await);
        assert!(body.is_empty());
    }

    /// The `error` field of a failure body becomes the message
    #[tokio::test]
    async fn test_error_field_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/instances/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "Invalid instance-id.", "status": 404})),
            )
            .mount(&server)
            .await;

        let err = assert_err!(client_for(&server).get("/instances/missing").await);
        match err {
            VultrError::Request { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Invalid instance-id.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Without an `error` field the raw body is kept
    #[tokio::test]
    async fn test_raw_body_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = assert_err!(client_for(&server).get(REGIONS).await);
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    /// No listener on the port means no response at all
    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = VultrClient::with_base_url("test-token", "http://127.0.0.1:1").unwrap();
        let err = assert_err!(client.get(REGIONS).await);
        assert!(matches!(err, VultrError::Transport { .. }), "{err:?}");
        assert_eq!(err.status(), None);
    }
}

mod catalog_tests {
    use super::*;

    /// Cursor pagination is followed until `links.next` is empty
    #[tokio::test]
    async fn test_pagination_collects_every_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{"id": "ewr", "options": ["block_storage"]}, {"id": "ord"}],
                "meta": {"total": 3, "links": {"next": "page2", "prev": ""}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(query_param("cursor", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{"id": "ams"}],
                "meta": {"total": 3, "links": {"next": "", "prev": "page1"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let catalog: Catalog<String> =
            assert_ok!(Catalog::load(&client_for(&server), REGIONS, "regions").await);
        assert_eq!(catalog.ids(), ["ewr", "ord", "ams"]);
        assert_eq!(catalog.reported_total(), Some(3));
        assert!(catalog.total_agrees());
        assert!(catalog.contains("ams"));
    }

    /// A cursor cycle (a -> b -> a) fails the load instead of paging forever
    #[tokio::test]
    async fn test_cursor_cycle_fails_load() {
        let server = MockServer::start().await;

        let page = |next: &str| {
            ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{"id": format!("r-{next}")}],
                "meta": {"total": 3, "links": {"next": next, "prev": ""}}
            }))
        };

        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(query_param_is_missing("cursor"))
            .respond_with(page("a"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(query_param("cursor", "a"))
            .respond_with(page("b"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/regions"))
            .and(query_param("cursor", "b"))
            .respond_with(page("a"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let load = Catalog::<String>::load(&client, REGIONS, "regions");
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), load)
            .await
            .expect("load should terminate");
        let err = assert_err!(result);
        assert!(matches!(err, VultrError::MalformedResponse(_)), "{err:?}");
    }

    /// `meta.total` is recorded but never trusted over the records themselves
    #[tokio::test]
    async fn test_reported_total_disagreement_is_tolerated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{"id": "ewr"}],
                "meta": {"total": 5, "links": {"next": "", "prev": ""}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let catalog: Catalog<String> =
            assert_ok!(Catalog::load(&client_for(&server), REGIONS, "regions").await);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.reported_total(), Some(5));
        assert!(!catalog.total_agrees());
        assert!(catalog.contains("ewr"));
    }

    /// A failed list request fails the load
    #[tokio::test]
    async fn test_failed_page_fails_load() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ssh-keys"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid API token."})))
            .mount(&server)
            .await;

        let result: vultr_client::Result<Catalog<String>> =
            Catalog::load(&client_for(&server), "/ssh-keys", "ssh_keys").await;
        assert_eq!(assert_err!(result).status(), Some(401));
    }

    /// Integer identifiers key the OS catalog
    #[tokio::test]
    async fn test_integer_ids() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/os"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "os": [{"id": 215, "name": "Ubuntu 20.04 x64"}, {"id": 387, "name": "Debian 11"}],
                "meta": {"total": 2, "links": {"next": "", "prev": ""}}
            })))
            .mount(&server)
            .await;

        let catalog: Catalog<u64> = assert_ok!(Catalog::load(&client_for(&server), "/os", "os").await);
        assert!(catalog.contains(&215u64));
        assert_eq!(catalog.attr_str(&387u64, "name"), Some("Debian 11"));
    }
}

mod builder_tests {
    use super::*;

    fn catalogs() -> Catalogs {
        Catalogs {
            regions: Catalog::from_records(vec![
                json!({"id": "ewr", "options": ["ddos_protection", "block_storage"]}),
                json!({"id": "ams", "options": []}),
            ])
            .unwrap(),
            ..Catalogs::default()
        }
    }

    /// A validated block create reaches the server with the documented body
    #[tokio::test]
    async fn test_block_create_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BLOCKS))
            .and(body_json(json!({"region": "ewr", "size_gb": 50, "label": ""})))
            .respond_with(
                ResponseTemplate::new(202).set_body_json(json!({"block": {"id": "blk-new"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let blocks = BlockStorage::from_catalog(client_for(&server), Catalog::default());
        let opts = CreateBlock {
            region: Some("ewr".to_string()),
            size: Some(50),
            label: None,
        };

        let body = assert_ok!(blocks.create(&opts, &catalogs()).await);
        assert!(body.contains("blk-new"));
    }

    /// A rejected builder never reaches the server
    #[tokio::test]
    async fn test_invalid_block_create_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BLOCKS))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let blocks = BlockStorage::from_catalog(client_for(&server), Catalog::default());
        let opts = CreateBlock {
            region: Some("ams".to_string()),
            ..CreateBlock::default()
        };

        let err = assert_err!(blocks.create(&opts, &catalogs()).await);
        assert!(err.is_validation());
    }
}

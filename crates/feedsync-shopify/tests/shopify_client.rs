//! Integration tests for `AdminClient` catalog reads using wiremock HTTP mocks.

use feedsync_shopify::{AdminClient, ClientSettings, ShopifyError};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = "/admin/api/2024-01/graphql.json";
const PRODUCTS_PATH: &str = "/admin/api/2024-01/products.json";

fn settings(max_retries: u32) -> ClientSettings {
    ClientSettings {
        api_version: "2024-01".to_owned(),
        timeout_secs: 5,
        user_agent: "feedsync-test/0.1".to_owned(),
        max_retries,
        backoff_base_secs: 0,
    }
}

fn test_client(server: &MockServer) -> AdminClient {
    AdminClient::new(&server.uri(), "shpat_test", &settings(0))
        .expect("client construction should not fail")
}

fn variant(id: u32, sku: Option<&str>, price: &str, cost: Option<&str>, qty: i64) -> Value {
    json!({
        "id": format!("gid://shopify/ProductVariant/{id}"),
        "sku": sku,
        "price": price,
        "inventoryQuantity": qty,
        "inventoryItem": {
            "id": format!("gid://shopify/InventoryItem/{id}"),
            "unitCost": cost.map(|amount| json!({ "amount": amount })),
        },
    })
}

fn variants_page(nodes: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "data": {
            "productVariants": {
                "edges": nodes.into_iter().map(|node| json!({ "node": node })).collect::<Vec<_>>(),
                "pageInfo": { "hasNextPage": next_cursor.is_some(), "endCursor": next_cursor },
            }
        }
    })
}

async fn mount_two_catalog_pages(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .and(body_partial_json(json!({ "variables": { "cursor": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(variants_page(
            vec![
                variant(1, Some("4001"), "159.00", Some("99.95"), 4),
                variant(2, Some("  "), "10.00", None, 0),
            ],
            Some("cursor1"),
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": { "cursor": "cursor1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(variants_page(
            vec![
                variant(3, Some("4002"), "79.00", None, 0),
                variant(4, Some("4001"), "169.00", Some("105.00"), 2),
            ],
            None,
        )))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_catalog_follows_cursor_across_pages() {
    let server = MockServer::start().await;
    mount_two_catalog_pages(&server).await;

    let catalog = test_client(&server).fetch_catalog(250, 0).await.unwrap();

    assert_eq!(catalog.len(), 2, "blank SKU skipped, duplicate collapsed");
    let dup = &catalog["4001"];
    assert_eq!(dup.internal_id, "gid://shopify/ProductVariant/4", "last write wins");
    assert_eq!(dup.price, Decimal::new(16900, 2));
    assert_eq!(dup.cost, Some(Decimal::new(10500, 2)));
    assert_eq!(dup.inventory_quantity, 2);

    let no_cost = &catalog["4002"];
    assert_eq!(no_cost.cost, None);
    assert_eq!(
        no_cost.inventory_item_id.as_deref(),
        Some("gid://shopify/InventoryItem/3")
    );
}

#[tokio::test]
async fn fetch_all_skus_is_sorted_and_unique() {
    let server = MockServer::start().await;
    mount_two_catalog_pages(&server).await;

    let skus = test_client(&server).fetch_all_skus(250, 0).await.unwrap();
    assert_eq!(skus.into_iter().collect::<Vec<_>>(), ["4001", "4002"]);
}

#[tokio::test]
async fn graphql_errors_abort_the_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Access denied for productVariants field." }]
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_catalog(250, 0).await.unwrap_err();
    match err {
        ShopifyError::Graphql { messages, .. } => {
            assert!(messages.contains("Access denied"), "got: {messages}");
        }
        other => panic!("expected ShopifyError::Graphql, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_carries_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"errors":"[API] Invalid API key or access token"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_catalog(250, 0).await.unwrap_err();
    match err {
        ShopifyError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"), "got: {body}");
        }
        other => panic!("expected ShopifyError::UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn second_page_failure_discards_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": { "cursor": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(variants_page(
            vec![variant(1, Some("4001"), "159.00", None, 4)],
            Some("cursor_fail"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": { "cursor": "cursor_fail" } })))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_client(&server).fetch_catalog(250, 0).await;
    assert!(
        matches!(result, Err(ShopifyError::UnexpectedStatus { status: 503, .. })),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn rate_limit_is_not_retried_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_all_skus(250, 0).await.unwrap_err();
    assert!(
        matches!(err, ShopifyError::RateLimited { retry_after_secs: 0, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn rate_limit_is_retried_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(variants_page(
            vec![variant(1, Some("4001"), "159.00", None, 1)],
            None,
        )))
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri(), "shpat_test", &settings(1)).unwrap();
    let skus = client.fetch_all_skus(250, 0).await.unwrap();
    assert_eq!(skus.len(), 1);
}

#[tokio::test]
async fn throttled_response_is_retried_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Throttled", "extensions": { "code": "THROTTLED" } }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(variants_page(Vec::new(), None)),
        )
        .mount(&server)
        .await;

    let client = AdminClient::new(&server.uri(), "shpat_test", &settings(2)).unwrap();
    let catalog = client.fetch_catalog(250, 0).await.unwrap();
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn fetch_catalog_rest_follows_link_header() {
    let server = MockServer::start().await;

    let next_link = format!(
        "<{}{PRODUCTS_PATH}?limit=250&page_info=cursor2>; rel=\"next\"",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(header("X-Shopify-Access-Token", "shpat_test"))
        .and(query_param("fields", "id,variants"))
        .and(wiremock::matchers::query_param_is_missing("page_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "products": [{ "id": 1, "variants": [
                    { "id": 11, "sku": "4001", "price": "159.00", "inventory_quantity": 4, "inventory_item_id": 111 },
                    { "id": 12, "sku": null, "price": "10.00" }
                ]}]}))
                .insert_header("Link", next_link.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .and(query_param("page_info", "cursor2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [
            { "id": 2, "variants": [{ "id": 21, "sku": "4002", "price": "79.00", "inventory_quantity": 0 }] }
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = test_client(&server).fetch_catalog_rest(250, 0).await.unwrap();

    assert_eq!(catalog.len(), 2);
    let first = &catalog["4001"];
    assert_eq!(first.internal_id, "11");
    assert_eq!(first.inventory_item_id.as_deref(), Some("111"));
    assert_eq!(first.cost, None, "REST exposes no unit cost");
    assert_eq!(catalog["4002"].price, Decimal::new(7900, 2));
}

#[tokio::test]
async fn malformed_products_page_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PRODUCTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
        .mount(&server)
        .await;

    let err = test_client(&server).fetch_catalog_rest(250, 0).await.unwrap_err();
    assert!(matches!(err, ShopifyError::Deserialize { .. }), "got: {err:?}");
}

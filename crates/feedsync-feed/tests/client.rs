//! Integration tests for `FeedClient` using wiremock HTTP mocks.

use feedsync_feed::{FeedClient, FeedError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> FeedClient {
    FeedClient::new(5, "feedsync-test/0.1").expect("client construction should not fail")
}

const FEED_CSV: &str = "SKU,Title,B2B price,Stock\n\
                        4001,Garden chair,99.95,4\n\
                        4002,Parasol,50.00,0\n";

#[tokio::test]
async fn fetch_records_parses_feed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channel/feed.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string(FEED_CSV),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/channel/feed.csv", server.uri());
    let records = test_client()
        .fetch_records(&url)
        .await
        .expect("should parse feed");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sku, "4001");
    assert_eq!(records[0].stock, 4);
    assert_eq!(records[1].b2b_price.to_string(), "50.00");
}

#[tokio::test]
async fn fetch_records_on_empty_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("SKU,B2B price,Stock\n"))
        .mount(&server)
        .await;

    let url = format!("{}/feed.csv", server.uri());
    let records = test_client().fetch_records(&url).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn non_success_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/feed.csv", server.uri());
    let err = test_client().fetch_records(&url).await.unwrap_err();
    assert!(
        matches!(err, FeedError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn malformed_feed_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Name,Price\nchair,10\n"))
        .mount(&server)
        .await;

    let url = format!("{}/feed.csv", server.uri());
    let err = test_client().fetch_records(&url).await.unwrap_err();
    assert!(matches!(err, FeedError::MissingColumn(_)), "got {err:?}");
}

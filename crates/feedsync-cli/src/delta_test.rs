use feedsync_store::{read_delta_file, DELTA_FILE_HEADERS};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::test_support::test_config;

const FEED_HEADER: &str = "SKU,B2B price,Stock\n";

async fn feed_server(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.csv"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn feed_url(server: &MockServer) -> Option<String> {
    Some(format!("{}/feed.csv", server.uri()))
}

#[tokio::test]
async fn unavailable_feed_writes_header_only_delta_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(503, "maintenance").await;
    let config = test_config(dir.path(), feed_url(&server));

    run_delta(&config, false, false)
        .await
        .expect("non-strict delta should succeed");

    let contents = std::fs::read_to_string(config.delta_file_path()).unwrap();
    assert_eq!(contents.trim_end(), DELTA_FILE_HEADERS.join(","));
    assert_eq!(read_delta_file(&config.delta_file_path()).unwrap(), Some(vec![]));
    assert!(
        !config.snapshot_path().exists(),
        "a failed fetch must not create a snapshot"
    );
}

#[tokio::test]
async fn unavailable_feed_fails_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(503, "maintenance").await;
    let config = test_config(dir.path(), feed_url(&server));

    let err = run_delta(&config, false, true)
        .await
        .expect_err("strict delta should fail on a 503 feed");
    assert!(
        format!("{err:#}").contains("feed fetch failed"),
        "unexpected error: {err:#}"
    );
    assert!(!config.delta_file_path().exists());
}

#[tokio::test]
async fn unavailable_feed_in_transform_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(503, "maintenance").await;
    let config = test_config(dir.path(), feed_url(&server));

    assert!(run_transform(&config).await.is_err());
    assert!(!config.full_update_path().exists());
}

#[tokio::test]
async fn empty_feed_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    let first = feed_server(200, &format!("{FEED_HEADER}4001,99.95,4\n4002,50,0\n")).await;
    let config = test_config(dir.path(), feed_url(&first));
    run_delta(&config, false, true).await.unwrap();
    assert_eq!(
        read_delta_file(&config.delta_file_path()).unwrap().unwrap().len(),
        2
    );
    let snapshot_before = std::fs::read(config.snapshot_path()).unwrap();

    let empty = feed_server(200, FEED_HEADER).await;
    let config = test_config(dir.path(), feed_url(&empty));
    run_delta(&config, false, true).await.unwrap();

    assert_eq!(read_delta_file(&config.delta_file_path()).unwrap(), Some(vec![]));
    assert_eq!(std::fs::read(config.snapshot_path()).unwrap(), snapshot_before);
}

#[tokio::test]
async fn unchanged_feed_on_second_run_writes_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(200, &format!("{FEED_HEADER}4001,99.95,4\n")).await;
    let config = test_config(dir.path(), feed_url(&server));

    run_delta(&config, false, false).await.unwrap();
    run_delta(&config, false, false).await.unwrap();

    assert_eq!(read_delta_file(&config.delta_file_path()).unwrap(), Some(vec![]));
}

#[tokio::test]
async fn oversized_price_fails_delta_without_touching_files() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(
        200,
        &format!("{FEED_HEADER}4001,79228162514264337593543950335,1\n"),
    )
    .await;
    let config = test_config(dir.path(), feed_url(&server));

    let err = run_delta(&config, false, false).await.unwrap_err();
    assert!(format!("{err:#}").contains("4001"), "unexpected error: {err:#}");
    assert!(!config.delta_file_path().exists());
    assert!(!config.snapshot_path().exists());
}

#[tokio::test]
async fn known_only_without_cache_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = feed_server(200, &format!("{FEED_HEADER}4001,10,1\n")).await;
    let config = test_config(dir.path(), feed_url(&server));

    let err = run_delta(&config, true, false).await.unwrap_err();
    assert!(err.to_string().contains("cache-skus"), "unexpected error: {err}");
}

//! HTTP-level tests for the LMS client against a mock server

use assert_matches::assert_matches;
use lms_remote_lms_client::{LmsClient, LmsError, LmsTransport, StatusResult};
use lms_remote_shared_config::LmsConfig;
use lms_remote_test_utils::{playlist_entry, MockLmsServer};
use serde_json::json;

fn client_for(server: &MockLmsServer) -> LmsClient {
    LmsClient::new(&LmsConfig::with_url(server.url()))
        .unwrap()
        .with_retry_config(3, 1)
}

#[tokio::test]
async fn test_list_posts_slim_request_and_returns_result() {
    let server = MockLmsServer::start().await;
    server
        .mock_status_page(
            0,
            "1712345678.25",
            2,
            vec![playlist_entry(1, "One"), playlist_entry(2, "Two")],
        )
        .await;
    let client = client_for(&server);

    let result = client
        .list("aa:bb", &["status"], &["tags:adcltuK"], 0, 50)
        .await
        .unwrap();
    let status: StatusResult = serde_json::from_value(result).unwrap();

    assert_eq!(status.playlist_tracks, 2);
    assert_eq!(status.playlist_loop.len(), 2);

    let received = server.received_commands().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "aa:bb");
    assert_eq!(
        received[0].1,
        vec![json!("status"), json!(0), json!(50), json!("tags:adcltuK")]
    );
}

#[tokio::test]
async fn test_query_retries_server_errors() {
    let server = MockLmsServer::start().await;
    server.mock_failure(vec![json!("status")], 503).await;
    let client = client_for(&server);

    let err = client
        .query("aa:bb", vec![json!("status"), json!("-"), json!(1)])
        .await
        .unwrap_err();

    assert_matches!(err, LmsError::RetriesExhausted { attempts: 3, .. });
    assert_eq!(server.count_matching(&[json!("status")]).await, 3);
}

#[tokio::test]
async fn test_command_is_not_retried() {
    let server = MockLmsServer::start().await;
    server
        .mock_failure(vec![json!("playlist"), json!("delete")], 500)
        .await;
    let client = client_for(&server);

    let err = client
        .command("aa:bb", vec![json!("playlist"), json!("delete"), json!(3)])
        .await
        .unwrap_err();

    assert_matches!(err, LmsError::ApiError { status: 500, .. });
    assert_eq!(
        server
            .count_matching(&[json!("playlist"), json!("delete")])
            .await,
        1
    );
}

#[tokio::test]
async fn test_missing_result_is_an_error() {
    let server = MockLmsServer::start().await;
    server.mock_missing_result(vec![json!("playlist")]).await;
    let client = client_for(&server);

    let err = client
        .command("aa:bb", vec![json!("playlist"), json!("clear")])
        .await
        .unwrap_err();

    assert_matches!(err, LmsError::MissingResult(cmd) if cmd == "playlist clear");
}

#[tokio::test]
async fn test_server_status_version() {
    let server = MockLmsServer::start().await;
    server
        .mock_result(
            vec![json!("serverstatus")],
            json!({"version": "8.5.2", "player count": 2}),
        )
        .await;
    let client = client_for(&server);

    let status = client.server_status().await.unwrap();
    assert_eq!(status.version.as_deref(), Some("8.5.2"));
    assert_eq!(status.player_count, 2);
}

#[tokio::test]
async fn test_connection_refused_is_retryable() {
    // Nothing listens on this port
    let config = LmsConfig::with_url("http://127.0.0.1:9");
    let client = LmsClient::new(&config).unwrap().with_retry_config(1, 1);

    let err = client
        .command("", vec![json!("serverstatus")])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

//! Integration tests for the CPBM client against a stub server.

use cpbm::{Client, ClientConfig, CpbmError, Credentials, RequestLog};
use reqwest::Method;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(endpoint: String) -> Client {
    Client::with_config(
        Credentials::new("test_key", "test_secret"),
        ClientConfig {
            endpoint: Some(endpoint),
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_get_decodes_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accounts": []
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let result = client.get("/accounts", &[]).await.unwrap();
    assert_eq!(result, serde_json::json!({"accounts": []}));
}

#[tokio::test]
async fn test_request_url_carries_signed_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    client.get("/accounts", &[("page", "1")]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let query = requests[0].url.query().unwrap();

    // Insertion order: caller params, then timestamp, apiKey, signature.
    assert!(query.starts_with("page=1&_="));
    assert!(query.contains("&apiKey=test_key&signature="));
}

#[tokio::test]
async fn test_payload_implies_post_with_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/accounts"))
        .and(body_json(serde_json::json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let result = client
        .request("/accounts", &[], Some(&serde_json::json!({"name": "x"})), None)
        .await
        .unwrap();
    assert_eq!(result, serde_json::json!({"id": 7}));
}

#[tokio::test]
async fn test_no_payload_dispatches_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    client.request("/accounts", &[], None, None).await.unwrap();
}

#[tokio::test]
async fn test_explicit_method_wins_over_payload_inference() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/accounts/7"))
        .and(body_json(serde_json::json!({"name": "y"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    client
        .request(
            "/accounts/7",
            &[],
            Some(&serde_json::json!({"name": "y"})),
            Some(Method::PUT),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_carries_no_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/accounts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    client.delete("/accounts/7", &[]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_non_success_status_yields_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let err = client.get("/accounts", &[]).await.unwrap_err();

    match err {
        CpbmError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal failure");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_never_reported_as_decode() {
    let mock_server = MockServer::start().await;

    // Non-JSON error body must stay an Api error, not become Decode.
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let err = client.get("/accounts", &[]).await.unwrap_err();
    assert!(matches!(err, CpbmError::Api { status: 404, .. }));
}

#[tokio::test]
async fn test_invalid_json_on_success_yields_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri());
    let err = client.get("/accounts", &[]).await.unwrap_err();

    match err {
        CpbmError::Decode { body, .. } => assert_eq!(body, "not json at all"),
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_secret_fails_without_network_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = Client::with_config(
        Credentials::new("test_key", ""),
        ClientConfig {
            endpoint: Some(mock_server.uri()),
            ..Default::default()
        },
    );

    let err = client.get("/accounts", &[]).await.unwrap_err();
    assert!(matches!(err, CpbmError::Configuration(_)));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no request should have been sent");
}

#[tokio::test]
async fn test_request_log_redacts_signature() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accounts": []
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cpbm.log");

    let client = Client::with_config(
        Credentials::new("test_key", "test_secret"),
        ClientConfig {
            endpoint: Some(mock_server.uri()),
            log: Some(RequestLog::open(&log_path, true).unwrap()),
            ..Default::default()
        },
    );
    client.get("/accounts", &[]).await.unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let entry: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(entry["method"], "GET");
    let url = entry["url"].as_str().unwrap();
    assert!(url.ends_with("&signature=REDACTED"), "url was {url}");
    assert_eq!(entry["result"], serde_json::json!({"accounts": []}));
}

#[tokio::test]
async fn test_failed_call_is_logged_with_error_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cpbm.log");

    let client = Client::with_config(
        Credentials::new("test_key", "test_secret"),
        ClientConfig {
            endpoint: Some(mock_server.uri()),
            log: Some(RequestLog::open(&log_path, true).unwrap()),
            ..Default::default()
        },
    );
    let err = client.get("/accounts", &[]).await.unwrap_err();
    assert!(matches!(err, CpbmError::Api { status: 503, .. }));

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let entry: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert!(entry["error"].as_str().unwrap().contains("maintenance"));
    assert!(entry.get("result").is_none());
}

//! HTTP-level tests against a local mock server.

use crate::client::{ClientOptions, DebridClient, FormData, RequestOptions};
use crate::error::{ApiErrorSubtype, ErrorKind, SdkError};
use crate::protocol::Envelope;
use crate::resources::{AllDebrid, MagnetState, TorrentFile};
use mockito::{Matcher, Server};
use serde_json::{json, Value};

fn client_for(server: &Server) -> DebridClient {
    DebridClient::with_options(
        ClientOptions::new("test-api-key")
            .with_base_url(server.url())
            .with_max_retries(2)
            .with_retry_delay_ms(1),
    )
    .unwrap()
}

fn success_body(data: Value) -> String {
    serde_json::to_string(&Envelope::success(data)).unwrap()
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/user")
        .match_header("authorization", "Bearer test-api-key")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body(json!({ "ok": true })))
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client.get::<Value>("/v4/user", RequestOptions::new()).await.unwrap();

    assert_eq!(response.data, json!({ "ok": true }));
    assert!(!response.demo);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_public_endpoint_has_no_authorization() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/hosts/priority")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(success_body(json!({ "hosts": { "uptobox": 1 } })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let priorities = api.hosts().priorities().await.unwrap();

    assert_eq!(priorities["uptobox"], 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_leading_slashes_are_normalized() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/user")
        .with_status(200)
        .with_body(success_body(json!({})))
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    for path in ["/v4/user", "v4/user", "///v4/user"] {
        client.get::<Value>(path, RequestOptions::new()).await.unwrap();
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_query_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4.1/magnet/status")
        .match_query(Matcher::UrlEncoded("id".into(), "42".into()))
        .with_status(200)
        .with_body(success_body(json!({
            "magnets": {
                "id": 42,
                "filename": "ubuntu.iso",
                "hash": "abc",
                "status": "Ready",
                "statusCode": 4,
                "size": 100,
                "uploadDate": 1_700_000_000,
                "completionDate": 1_700_000_500,
                "nbLinks": 1,
            }
        })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let magnet = api.magnets().get(42).await.unwrap();

    assert_eq!(magnet.state(), MagnetState::Ready);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_json_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/custom")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "file": "test.txt" })))
        .with_status(200)
        .with_body(success_body(json!({ "uploaded": true })))
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .post::<Value>("v4/custom", RequestOptions::new().with_json(json!({ "file": "test.txt" })))
        .await
        .unwrap();

    assert_eq!(response.data["uploaded"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_multipart_form_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/magnet/upload")
        .match_header("content-type", Matcher::Regex("^multipart/form-data; boundary=".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="magnets\[\]""#.into()),
            Matcher::Regex("magnet:\\?xt=urn:btih:aaa".into()),
        ]))
        .with_status(200)
        .with_body(success_body(json!({
            "magnets": [{ "magnet": "magnet:?xt=urn:btih:aaa", "name": "a", "id": 1, "hash": "aaa", "size": 1, "ready": true }]
        })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let uploaded = api.magnets().upload(["magnet:?xt=urn:btih:aaa"]).await.unwrap();

    assert_eq!(uploaded.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_multipart_file_upload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/magnet/upload/file")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files\[0\]"; filename="ubuntu.torrent""#.into()),
            Matcher::Regex("d8:announce".into()),
        ]))
        .with_status(200)
        .with_body(success_body(json!({
            "files": [{ "file": "ubuntu.torrent", "name": "ubuntu", "id": 3, "hash": "ccc", "size": 10, "ready": false }]
        })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let uploaded = api
        .magnets()
        .upload_files(vec![TorrentFile::new("ubuntu.torrent", b"d8:announce".to_vec())])
        .await
        .unwrap();

    assert_eq!(uploaded.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_envelope_becomes_api_error() {
    let mut server = Server::new_async().await;
    let body = serde_json::to_string(&Envelope::<Value>::error("AUTH_BAD_APIKEY", "The auth apikey is invalid")).unwrap();
    let mock = server
        .mock("GET", "/v4/user")
        .with_status(200)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let err = api.users().get().await.unwrap_err();

    let SdkError::Api(api_error) = &err else {
        panic!("expected API error, got {err:?}");
    };
    assert_eq!(api_error.code, "AUTH_BAD_APIKEY");
    assert_eq!(api_error.subtype, ApiErrorSubtype::Auth);
    assert!(api_error.request_id.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_demo_flag_string() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v4/user")
        .with_status(200)
        .with_body(r#"{"status":"success","data":{},"demo":"true"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client.get::<Value>("v4/user", RequestOptions::new()).await.unwrap();
    assert!(response.demo);
}

#[tokio::test]
async fn test_server_error_is_retried_up_to_limit() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/user")
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get::<Value>("v4/user", RequestOptions::new()).await.unwrap_err();

    let SdkError::Network(network) = &err else {
        panic!("expected network error, got {err:?}");
    };
    assert_eq!(network.status_code, Some(503));
    assert!(network.retryable);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_status_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v4/nope")
        .with_status(404)
        .with_body("Not Found")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get::<Value>("v4/nope", RequestOptions::new()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!err.is_retryable());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v4/user")
        .with_status(200)
        .with_body(success_body(json!({ "user": { "username": "alice" } })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let err = api.users().get().await.unwrap_err();

    let SdkError::Validation(validation) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(!validation.issues.is_empty());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_form_with_link_password() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/link/unlock")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="link""#.into()),
            Matcher::Regex(r#"name="password""#.into()),
            Matcher::Regex("hunter2".into()),
        ]))
        .with_status(200)
        .with_body(success_body(json!({
            "link": "https://dl.example/x",
            "filename": "x.bin",
            "host": "example",
            "filesize": 1,
            "id": "x",
            "hostDomain": "example.com",
        })))
        .create_async()
        .await;

    let api = AllDebrid::from_client(client_for(&server));
    let unlocked = api.links().unlock("https://example.com/x", Some("hunter2")).await.unwrap();

    assert_eq!(unlocked.filename, "x.bin");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_raw_form_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/user/links/save")
        .match_body(Matcher::Regex(r#"name="links\[\]""#.into()))
        .with_status(200)
        .with_body(success_body(json!({ "message": "Links successfully saved" })))
        .create_async()
        .await;

    let client = client_for(&server);
    let form = FormData::new().text_list("links", ["https://example.com/a"]);
    let response = client
        .post::<Value>("v4/user/links/save", RequestOptions::new().with_form(form))
        .await
        .unwrap();

    assert_eq!(response.data["message"], "Links successfully saved");
    mock.assert_async().await;
}

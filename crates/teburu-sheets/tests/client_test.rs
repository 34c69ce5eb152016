//! Sheets client tests against a mock Sheets API

use std::time::Duration;

use serde_json::json;
use teburu_core::{Cell, CellValue};
use teburu_sheets::auth::AuthorizedUser;
use teburu_sheets::{range, Credentials, SheetSource, SheetsClient, SheetsClientConfig, SheetsError};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, credentials: Credentials) -> SheetsClient {
    let config = SheetsClientConfig::new()
        .base_url(server.uri())
        .timeout(Duration::from_secs(5));
    SheetsClient::new(config, credentials).unwrap()
}

fn grid_body() -> serde_json::Value {
    json!({
        "sheets": [{
            "data": [{
                "rowData": [
                    {"values": [
                        {"effectiveValue": {"stringValue": "Name"}},
                        {"effectiveValue": {"stringValue": "Age"}}
                    ]},
                    {"values": [
                        {"effectiveValue": {"stringValue": "Ada"}, "hyperlink": "http://x"},
                        {"effectiveValue": {"numberValue": 37}}
                    ]}
                ]
            }]
        }]
    })
}

#[tokio::test]
async fn test_fetch_list_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id"))
        .and(query_param("ranges", "Sheet1!A1:Z"))
        .and(query_param("fields", teburu_sheets::SHEET_FIELDS))
        .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::None);
    let grid = client
        .fetch("sheet-id", &range::list_ranges("Sheet1"))
        .await
        .unwrap();

    let rows = grid.sheets[0].rows(0);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].cells[0], Cell::from("Ada").with_link("http://x"));
    assert_eq!(rows[1].cells[1].value, Some(CellValue::Number(37.0)));
}

#[tokio::test]
async fn test_fetch_row_ranges_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id"))
        .and(query_param("ranges", "People!A1:Z1"))
        .and(query_param("ranges", "People!A5:Z5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [{"data": [
                {"rowData": [{"values": [{"effectiveValue": {"stringValue": "Name"}}]}]},
                {"rowData": [{"values": [{"effectiveValue": {"stringValue": "Grace"}}]}]}
            ]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::None);
    let grid = client
        .fetch("sheet-id", &range::row_ranges("People", 5))
        .await
        .unwrap();

    assert_eq!(grid.sheets[0].data.len(), 2);
    assert_eq!(grid.sheets[0].rows(1)[0].cells[0], Cell::from("Grace"));
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::None);
    let err = client
        .fetch("missing", &range::list_ranges("Sheet1"))
        .await
        .unwrap_err();

    match err {
        SheetsError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Requested entity was not found."));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::None);
    let err = client.fetch("id", &range::list_ranges("S")).await.unwrap_err();
    assert!(matches!(err, SheetsError::Json(_)));
}

#[tokio::test]
async fn test_api_key_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("key", "public-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sheets": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::ApiKey("public-key".into()));
    let grid = client.fetch("id", &range::list_ranges("S")).await.unwrap();
    assert!(grid.sheets.is_empty());
}

#[tokio::test]
async fn test_access_token_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer static-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Credentials::AccessToken("static-token".into()));
    client.fetch("id", &range::list_ranges("S")).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_exchanged_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grid_body()))
        .expect(2)
        .mount(&server)
        .await;

    let credentials = Credentials::AuthorizedUser(AuthorizedUser {
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "r-token".into(),
        token_uri: format!("{}/token", server.uri()),
    });
    let client = client_for(&server, credentials);

    client.fetch("id", &range::list_ranges("S")).await.unwrap();
    client.fetch("id", &range::list_ranges("S")).await.unwrap();
}

#[tokio::test]
async fn test_refresh_failure_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let credentials = Credentials::AuthorizedUser(AuthorizedUser {
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "revoked".into(),
        token_uri: format!("{}/token", server.uri()),
    });
    let client = client_for(&server, credentials);

    let err = client.fetch("id", &range::list_ranges("S")).await.unwrap_err();
    assert!(matches!(err, SheetsError::Auth(_)));
    assert!(err.to_string().contains("invalid_grant"));
}

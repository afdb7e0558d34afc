// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sheets directory against a mocked Sheets API.

use courier_config::model::SheetsDirectoryConfig;
use courier_core::{CampaignStatus, ContactStatus, CourierError, DirectoryAdapter, RowId, SenderId};
use courier_directory::{RowLayout, ServiceAccountAuth, SheetsAuth, SheetsDirectory, StatusCodec};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_KEY: &str = include_str!("fixtures/service_key.pem");

fn layout() -> RowLayout {
    RowLayout::new(
        vec!["name".into(), "company".into(), "tax_id".into()],
        StatusCodec::default(),
    )
}

fn directory_with(server: &MockServer, auth: SheetsAuth) -> SheetsDirectory {
    SheetsDirectory::new(
        &server.uri(),
        "sheet-1".into(),
        auth,
        "Contacts".into(),
        "Campaigns".into(),
        layout(),
    )
    .unwrap()
}

fn directory(server: &MockServer) -> SheetsDirectory {
    directory_with(server, SheetsAuth::Token("tok".into()))
}

/// A service-account key file whose token endpoint is the mock server.
fn key_file(server: &MockServer) -> String {
    json!({
        "type": "service_account",
        "project_id": "demo",
        "private_key_id": "k1",
        "private_key": SERVICE_KEY,
        "client_email": "courier@demo.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", server.uri()),
    })
    .to_string()
}

fn service_account(server: &MockServer) -> SheetsAuth {
    SheetsAuth::ServiceAccount(
        ServiceAccountAuth::from_json(&key_file(server), reqwest::Client::new()).unwrap(),
    )
}

async fn mount_token(server: &MockServer, token: &str, expires_in: u64, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=ey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer"
        })))
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_campaigns(server: &MockServer, bearer: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/Campaigns!A2:F"))
        .and(header("authorization", format!("Bearer {bearer}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "values": [] })))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn reads_contacts_range_with_trailing_cells_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/Contacts!A2:F"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Contacts!A2:F100",
            "majorDimension": "ROWS",
            "values": [
                ["Ana", "ACME", "111", "5511900000001", "5511"],
                ["Bruno", "Globex", "222", "5511900000002", "5522", "Sent"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let contacts = directory(&server).list_contacts().await.unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].id, RowId(2));
    assert_eq!(contacts[0].status, ContactStatus::Pending);
    assert_eq!(contacts[1].id, RowId(3));
    assert_eq!(contacts[1].assigned_sender, SenderId::from("5522"));
    assert_eq!(contacts[1].status, ContactStatus::Sent);
}

#[tokio::test]
async fn empty_sheet_has_no_values_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/Campaigns!A2:F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Campaigns!A2:F1000",
            "majorDimension": "ROWS"
        })))
        .mount(&server)
        .await;

    assert!(directory(&server).list_campaigns().await.unwrap().is_empty());
}

#[tokio::test]
async fn writes_campaign_status_cell_raw() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet-1/values/Campaigns!F7"))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_json(json!({
            "range": "Campaigns!F7",
            "majorDimension": "ROWS",
            "values": [["In progress"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedCells": 1})))
        .expect(1)
        .mount(&server)
        .await;

    directory(&server)
        .update_campaign_status(RowId(7), CampaignStatus::InProgress)
        .await
        .unwrap();
}

#[tokio::test]
async fn write_rejection_is_directory_write_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = directory(&server)
        .update_contact_status(RowId(5), ContactStatus::Sent)
        .await
        .unwrap_err();
    match err {
        CourierError::DirectoryWrite { row, message, .. } => {
            assert_eq!(row, RowId(5));
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn read_failure_is_directory_read_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    assert!(matches!(
        directory(&server).list_campaigns().await.unwrap_err(),
        CourierError::DirectoryRead { .. }
    ));
}

#[tokio::test]
async fn service_account_token_is_exchanged_once_and_reused() {
    let server = MockServer::start().await;
    mount_token(&server, "ya29.service", 3600, 1).await;
    mount_campaigns(&server, "ya29.service", 2).await;

    let dir = tempfile::tempdir().unwrap();
    let credentials = dir.path().join("credentials.json");
    std::fs::write(&credentials, key_file(&server)).unwrap();
    let config = SheetsDirectoryConfig {
        spreadsheet_id: Some("sheet-1".into()),
        credentials_path: credentials.display().to_string(),
        base_url: server.uri(),
        ..SheetsDirectoryConfig::default()
    };

    let directory = SheetsDirectory::from_config(&config, layout()).unwrap();
    directory.list_campaigns().await.unwrap();
    directory.list_campaigns().await.unwrap();
}

#[tokio::test]
async fn short_lived_tokens_are_refreshed_before_use() {
    let server = MockServer::start().await;
    mount_token(&server, "ya29.short", 30, 2).await;
    mount_campaigns(&server, "ya29.short", 2).await;

    let directory = directory_with(&server, service_account(&server));
    directory.list_campaigns().await.unwrap();
    directory.list_campaigns().await.unwrap();
}

#[tokio::test]
async fn rejected_token_exchange_fails_reads_and_writes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let directory = directory_with(&server, service_account(&server));
    match directory.list_campaigns().await.unwrap_err() {
        CourierError::DirectoryRead { message, .. } => {
            assert!(message.contains("invalid_grant"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        directory
            .update_contact_status(RowId(3), ContactStatus::Sent)
            .await
            .unwrap_err(),
        CourierError::DirectoryWrite { row: RowId(3), .. }
    ));
}

#[test]
fn missing_credentials_file_is_a_config_error() {
    let config = SheetsDirectoryConfig {
        spreadsheet_id: Some("sheet-1".into()),
        credentials_path: "/nonexistent/credentials.json".into(),
        ..SheetsDirectoryConfig::default()
    };
    let err = SheetsDirectory::from_config(&config, layout()).unwrap_err();
    assert!(matches!(err, CourierError::Config(_)), "{err}");
}

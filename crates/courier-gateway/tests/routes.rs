// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway route tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use courier_gateway::{GatewayState, build_router};
use courier_sender::{PoolSettings, SenderPool};
use courier_test_utils::{MockTransport, OpenBehavior};
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "test-token";

fn router(transport: &MockTransport, token: Option<&str>) -> Router {
    let pool = SenderPool::start(Arc::new(transport.clone()), PoolSettings::default());
    build_router(GatewayState::new(
        pool,
        "s.whatsapp.net",
        token.map(str::to_string),
    ))
}

fn send_request(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/v1/send").header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = router(&MockTransport::new(), Some(TOKEN));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn api_routes_require_the_bearer_token() {
    let app = router(&MockTransport::new(), Some(TOKEN));

    let missing = app
        .clone()
        .oneshot(Request::get("/v1/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .oneshot(send_request(json!({}), Some("nope")))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gateway_without_token_rejects_everything() {
    let app = router(&MockTransport::new(), None);

    let response = app
        .oneshot(send_request(json!({}), Some("anything")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_delivers_through_the_pool() {
    let transport = MockTransport::new();
    let app = router(&transport, Some(TOKEN));

    let response = app
        .oneshot(send_request(
            json!({ "identity": "5511", "destination": "+55 11 99999-0001", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["to"], "5511999990001@s.whatsapp.net");
    assert_eq!(body["identity"], "5511");
    let sent = transport.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "oi");
}

#[tokio::test]
async fn destination_with_suffix_is_kept_verbatim() {
    let transport = MockTransport::new();
    let app = router(&transport, Some(TOKEN));

    let response = app
        .oneshot(send_request(
            json!({ "identity": "5511", "destination": "120363@g.us", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(transport.sent_messages().await[0].to.as_str(), "120363@g.us");
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let app = router(&MockTransport::new(), Some(TOKEN));

    let response = app
        .oneshot(send_request(json!({ "identity": "5511", "message": "oi" }), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["type"], "invalid_request");
    assert!(body["error"]["message"].as_str().unwrap().contains("destination"));
}

#[tokio::test]
async fn path_like_identity_is_refused_before_the_pool() {
    let transport = MockTransport::new();
    let app = router(&transport, Some(TOKEN));

    let response = app
        .clone()
        .oneshot(send_request(
            json!({ "identity": "../../etc", "destination": "5511999990001", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("invalid sender identity"));
    assert_eq!(transport.open_count(&"../../etc".into()).await, 0);

    let sessions = app
        .oneshot(
            Request::get("/v1/sessions")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(sessions).await["sessions"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = router(&MockTransport::new(), Some(TOKEN));
    let request = Request::post("/v1/send")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_out_identity_is_service_unavailable() {
    let transport = MockTransport::new().with_behavior("5511", OpenBehavior::SignedOut);
    let app = router(&transport, Some(TOKEN));

    let response = app
        .oneshot(send_request(
            json!({ "identity": "5511", "destination": "5511999990001", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"]["type"], "session_unavailable");
}

#[tokio::test]
async fn rejected_destination_is_bad_gateway() {
    let transport = MockTransport::new().with_failing_destination("5511999990001");
    let app = router(&transport, Some(TOKEN));

    let response = app
        .oneshot(send_request(
            json!({ "identity": "5511", "destination": "5511999990001", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn sessions_lists_known_identities() {
    let transport = MockTransport::new();
    let app = router(&transport, Some(TOKEN));

    let sent = app
        .clone()
        .oneshot(send_request(
            json!({ "identity": "5511", "destination": "5511999990001", "message": "oi" }),
            Some(TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(sent.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/v1/sessions")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["sessions"][0]["identity"], "5511");
    assert_eq!(body["sessions"][0]["state"], "ready");
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/send, GET /v1/sessions, GET /health.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use courier_core::{Address, SendError, SenderId};
use courier_sender::SessionInfo;
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Request body for POST /v1/send.
///
/// Fields are optional at the serde level so that a missing field is a 400
/// with a readable message rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub identity: Option<String>,
    /// Digits, or a full address that already carries the network suffix.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body for POST /v1/send.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub message_id: String,
    pub identity: String,
    pub to: String,
    pub sent_at: DateTime<Utc>,
}

/// Response body for GET /v1/sessions.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Failure of a gateway request.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Send(SendError),
}

impl From<SendError> for ApiError {
    fn from(e: SendError) -> Self {
        ApiError::Send(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Send(e) => {
                let (status, kind) = match &e {
                    SendError::SessionUnavailable { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "session_unavailable")
                    }
                    SendError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                    SendError::Rejected { .. } => (StatusCode::BAD_GATEWAY, "rejected"),
                    SendError::Disconnected { .. } => (StatusCode::BAD_GATEWAY, "disconnected"),
                };
                (status, kind, e.to_string())
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: ErrorDetail {
                    error_type: error_type.to_string(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("`{field}` is required")))
}

/// POST /v1/send: deliver one message through the sender pool, bypassing campaigns.
pub async fn post_send(
    State(state): State<GatewayState>,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let identity = SenderId::parse(&required(body.identity, "identity")?)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let destination = required(body.destination, "destination")?;
    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("`message` is required".into()))?;

    let to = Address::normalize(&destination, &state.network_suffix);
    if to.user().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "`destination` has no usable address: `{destination}`"
        )));
    }

    let session = state.pool.acquire(&identity).await?;
    let ack = state.pool.send(&session, &to, &message).await?;
    tracing::info!(identity = %identity, to = %to, message_id = %ack.message_id.0, "ad-hoc message sent");

    Ok(Json(SendResponse {
        message_id: ack.message_id.0,
        identity: ack.identity.0,
        to: ack.address.0,
        sent_at: ack.sent_at,
    }))
}

/// GET /v1/sessions: state of every sender identity the pool knows.
pub async fn get_sessions(State(state): State<GatewayState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.pool.sessions(),
    })
}

/// GET /health: unauthenticated liveness check.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a messaging bridge sidecar.
//!
//! The bridge holds the actual network connections. Courier drives it with
//! a small JSON API:
//!
//! | Method | Path | Body | Purpose |
//! |---|---|---|---|
//! | `POST` | `/sessions/{id}` | `{credentials_dir}` | start or resume a session |
//! | `GET` | `/sessions/{id}/status` | | `{state, code?, reason?}` |
//! | `POST` | `/sessions/{id}/messages` | `{to, text}` | send, returns `{id}` |
//! | `DELETE` | `/sessions/{id}` | | close |
//!
//! A poll task per identity turns status changes into [`TransportEvent`]s.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier_config::model::SenderConfig;
use courier_core::{
    AdapterType, Address, CourierError, DisconnectReason, HealthStatus, MessageId, PluginAdapter,
    SendError, SenderId, TransportAdapter, TransportEvent,
};
use dashmap::DashMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::credentials::credentials_dir;

/// Consecutive failed status polls before a session is reported lost.
const MAX_POLL_FAILURES: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct OpenRequest {
    credentials_dir: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BridgeState {
    Connecting,
    Pairing,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct StatusResponse {
    state: BridgeState,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Transport backed by a messaging bridge sidecar.
pub struct BridgeTransport {
    client: reqwest::Client,
    base_url: String,
    auth_dir: PathBuf,
    poll_interval: Duration,
    pollers: Arc<DashMap<SenderId, CancellationToken>>,
}

impl BridgeTransport {
    pub fn new(
        base_url: impl Into<String>,
        auth_dir: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Result<Self, CourierError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CourierError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_dir: auth_dir.into(),
            poll_interval,
            pollers: Arc::new(DashMap::new()),
        })
    }

    pub fn from_config(config: &SenderConfig) -> Result<Self, CourierError> {
        Self::new(
            &config.bridge_url,
            &config.auth_dir,
            Duration::from_secs(config.status_poll_secs),
        )
    }

    fn session_url(&self, identity: &SenderId) -> String {
        format!("{}/sessions/{}", self.base_url, identity)
    }

    fn stop_poller(&self, identity: &SenderId) {
        if let Some((_, token)) = self.pollers.remove(identity) {
            token.cancel();
        }
    }
}

fn transport_error(message: String, source: reqwest::Error) -> CourierError {
    CourierError::Transport {
        message,
        source: Some(Box::new(source)),
    }
}

async fn poll_status(
    client: reqwest::Client,
    url: String,
    identity: SenderId,
    interval: Duration,
    events: mpsc::Sender<TransportEvent>,
    cancel: CancellationToken,
    pollers: Arc<DashMap<SenderId, CancellationToken>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<StatusResponse> = None;
    let mut failures = 0;

    let closing = loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let status = match fetch_status(&client, &url).await {
            Ok(status) => {
                failures = 0;
                status
            }
            Err(reason) => {
                failures += 1;
                debug!(identity = %identity, failures, reason = %reason, "bridge status poll failed");
                if failures >= MAX_POLL_FAILURES {
                    break Some(DisconnectReason::Lost(format!("bridge unreachable: {reason}")));
                }
                continue;
            }
        };

        if last.as_ref() == Some(&status) {
            continue;
        }
        let event = match status.state {
            BridgeState::Connecting => None,
            BridgeState::Pairing => status.code.clone().map(|code| TransportEvent::PairingRequired {
                identity: identity.clone(),
                code,
            }),
            BridgeState::Open => Some(TransportEvent::Ready {
                identity: identity.clone(),
            }),
            BridgeState::Closed => {
                break Some(match status.reason.as_deref() {
                    Some("logged_out" | "signed_out") => DisconnectReason::SignedOut,
                    Some(other) => DisconnectReason::Lost(other.to_string()),
                    None => DisconnectReason::Lost("closed by bridge".into()),
                });
            }
        };
        last = Some(status);
        if let Some(event) = event
            && events.send(event).await.is_err()
        {
            break None;
        }
    };

    // A newer poller for the same identity holds a live token; only ours is cancelled.
    cancel.cancel();
    pollers.remove_if(&identity, |_, token| token.is_cancelled());
    if let Some(reason) = closing {
        info!(identity = %identity, reason = ?reason, "bridge reported session closed");
        let _ = events
            .send(TransportEvent::Closed { identity, reason })
            .await;
    }
}

async fn fetch_status(client: &reqwest::Client, url: &str) -> Result<StatusResponse, String> {
    let response = client
        .get(format!("{url}/status"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(StatusResponse {
            state: BridgeState::Closed,
            code: None,
            reason: Some("session unknown to bridge".into()),
        });
    }
    if !status.is_success() {
        return Err(format!("bridge returned {status}"));
    }
    response.json().await.map_err(|e| e.to_string())
}

#[async_trait]
impl PluginAdapter for BridgeTransport {
    fn name(&self) -> &str {
        "bridge-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierError> {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(r) => Ok(HealthStatus::Degraded(format!("bridge returned {}", r.status()))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("bridge unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), CourierError> {
        for entry in self.pollers.iter() {
            entry.value().cancel();
        }
        self.pollers.clear();
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for BridgeTransport {
    async fn open(
        &self,
        identity: &SenderId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<(), CourierError> {
        let credentials = credentials_dir(&self.auth_dir, identity)?;
        let url = self.session_url(identity);
        let response = self
            .client
            .post(&url)
            .json(&OpenRequest {
                credentials_dir: credentials.display().to_string(),
            })
            .send()
            .await
            .map_err(|e| transport_error(format!("bridge open for {identity} failed: {e}"), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CourierError::Transport {
                message: format!("bridge refused to open {identity}: {status} {body}"),
                source: None,
            });
        }

        self.stop_poller(identity);
        let cancel = CancellationToken::new();
        self.pollers.insert(identity.clone(), cancel.clone());
        tokio::spawn(poll_status(
            self.client.clone(),
            url,
            identity.clone(),
            self.poll_interval,
            events,
            cancel,
            Arc::clone(&self.pollers),
        ));
        debug!(identity = %identity, "bridge session opened, polling status");
        Ok(())
    }

    async fn send_text(
        &self,
        identity: &SenderId,
        to: &Address,
        text: &str,
    ) -> Result<MessageId, SendError> {
        let response = self
            .client
            .post(format!("{}/messages", self.session_url(identity)))
            .json(&SendRequest {
                to: to.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| SendError::Disconnected {
                message: format!("bridge unreachable: {e}"),
            })?;

        let status = response.status();
        if status.is_success() {
            let body: SendResponse = response.json().await.map_err(|e| SendError::Rejected {
                message: format!("invalid bridge response: {e}"),
            })?;
            return Ok(MessageId(body.id));
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => SendError::SessionUnavailable {
                identity: identity.clone(),
                reason: "bridge has no session for this identity".into(),
            },
            StatusCode::CONFLICT | StatusCode::SERVICE_UNAVAILABLE => SendError::Disconnected {
                message: format!("{status}: {body}"),
            },
            StatusCode::GATEWAY_TIMEOUT => SendError::Timeout {
                duration: REQUEST_TIMEOUT,
            },
            _ => SendError::Rejected {
                message: format!("{status}: {body}"),
            },
        })
    }

    async fn close(&self, identity: &SenderId) -> Result<(), CourierError> {
        self.stop_poller(identity);
        let response = self
            .client
            .delete(self.session_url(identity))
            .send()
            .await
            .map_err(|e| transport_error(format!("bridge close for {identity} failed: {e}"), e))?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            warn!(identity = %identity, status = %status, "bridge refused to close session");
            Err(CourierError::Transport {
                message: format!("bridge refused to close {identity}: {status}"),
                source: None,
            })
        }
    }
}

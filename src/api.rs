use crate::config::Config;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::Duration;

/// Failures from the chat service endpoints.
///
/// Every variant resolves locally: probes flip the status indicator,
/// exchanges surface as a fallback bot reply, clears are logged only.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, request timeout
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("service returned {0}")]
    Status(StatusCode),

    /// The reply body was not the expected JSON shape
    #[error("malformed reply: {0}")]
    MalformedReply(#[source] reqwest::Error),
}

/// Reply from `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// The bot's answer to the submitted message
    pub response: String,
    /// Server-assigned session id, replacing the local one when present
    /// and different
    #[serde(default)]
    pub session_id: Option<String>,
}

/// The three operations the remote chat service exposes.
///
/// The production implementation is [`ChatClient`]; tests substitute a
/// scripted double to drive exchange outcomes without a network.
pub trait ChatBackend {
    /// `GET /health` — any success status means the service is up.
    async fn probe_health(&self) -> Result<(), ApiError>;

    /// `POST /chat` — one user message in, one bot reply out.
    async fn send_chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ApiError>;

    /// `POST /conversation/clear` — drop server-side context for the
    /// session. The response body is ignored.
    async fn clear_conversation(&self, session_id: Option<&str>) -> Result<(), ApiError>;
}

/// HTTP client for the Ripple chat service.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.service_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ChatBackend for ChatClient {
    async fn probe_health(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.endpoint("/health")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }

    async fn send_chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let payload = serde_json::json!({
            "message": message,
            "session_id": session_id,
        });

        let response = self
            .client
            .post(self.endpoint("/chat"))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        response
            .json::<ChatReply>()
            .await
            .map_err(ApiError::MalformedReply)
    }

    async fn clear_conversation(&self, session_id: Option<&str>) -> Result<(), ApiError> {
        let payload = serde_json::json!({
            "session_id": session_id,
        });

        let response = self
            .client
            .post(self.endpoint("/conversation/clear"))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status()))
        }
    }
}

//! A client for sending notifications to a DingTalk robot webhook.

use crate::config::DingtalkConfig;
use crate::core::{Diagnostic, KeyValue};
use crate::notification::handler::DingtalkHandler;
use crate::notification::store::{ConfigCandidate, ConfigStore, UpdateError};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// The DingTalk robot endpoint. The access token is appended as a query
/// parameter.
pub const DEFAULT_DINGTALK_URL: &str = "https://oapi.dingtalk.com/robot/send";

const JSON_UTF8: &str = "application/json;charset=utf-8";

/// The request body for a plain-text robot message.
#[derive(Debug, Serialize)]
struct Message<'a> {
    msgtype: &'static str,
    text: MessageText<'a>,
}

#[derive(Debug, Serialize)]
struct MessageText<'a> {
    content: &'a str,
}

impl<'a> Message<'a> {
    fn text(content: &'a str) -> Self {
        Self {
            msgtype: "text",
            text: MessageText { content },
        }
    }
}

/// The error body returned by the webhook on failure.
#[derive(Debug, Deserialize)]
struct WebhookResponse {
    errcode: i64,
    errmsg: String,
}

/// Errors from a single send attempt.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("failed to POST alert data: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to understand DingTalk response. code: {status} content: {body}")]
    Protocol { status: u16, body: String },

    #[error("sendMessage error ({code}) description: {message}")]
    Remote { code: i64, message: String },
}

/// Delivers messages to DingTalk using the currently stored configuration.
pub struct DingtalkService {
    config: ConfigStore,
    client: reqwest::Client,
    endpoint: String,
    diag: Arc<dyn Diagnostic>,
}

impl DingtalkService {
    /// Creates a service with a default HTTP client.
    pub fn new(config: DingtalkConfig, diag: Arc<dyn Diagnostic>) -> Self {
        Self::with_client(config, diag, reqwest::Client::new())
    }

    /// Creates a service that sends through the given HTTP client.
    pub fn with_client(
        config: DingtalkConfig,
        diag: Arc<dyn Diagnostic>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            config: ConfigStore::new(config),
            client,
            endpoint: DEFAULT_DINGTALK_URL.to_string(),
            diag,
        }
    }

    /// Points the service at a different endpoint, e.g. a mock server.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Returns a snapshot of the active configuration.
    pub fn config(&self) -> Arc<DingtalkConfig> {
        self.config.current()
    }

    /// Replaces the active configuration with an already validated value.
    pub fn store(&self, config: DingtalkConfig) {
        self.config.store(config);
    }

    /// Applies a reconfiguration batch. See [`ConfigStore::update`].
    pub fn update(&self, batch: Vec<ConfigCandidate>) -> Result<(), UpdateError> {
        self.config.update(batch)
    }

    /// Returns a handler whose diagnostics carry `ctx`.
    pub fn handler(self: &Arc<Self>, ctx: &[KeyValue]) -> DingtalkHandler {
        DingtalkHandler::new(self.clone(), self.diag.with_context(ctx))
    }

    /// Sends `message` as a text message in a single HTTP round trip.
    #[instrument(skip(self, message), fields(len = message.len()))]
    pub async fn send(&self, message: &str) -> Result<(), SendError> {
        let access_token = self.config.current().access_token.clone();

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("access_token", access_token.as_str())])
            .header(CONTENT_TYPE, JSON_UTF8)
            .json(&Message::text(message))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request to DingTalk failed");
                metrics::counter!("dingtalk_messages_failed_total", "reason" => "transport")
                    .increment(1);
                SendError::Transport(e)
            })?;

        let status = response.status();
        // The body is read once and reused for both logging and parsing.
        let body = response.text().await.map_err(|e| {
            error!(status = %status, error = %e, "Failed to read DingTalk response body");
            metrics::counter!("dingtalk_messages_failed_total", "reason" => "transport")
                .increment(1);
            SendError::Transport(e)
        })?;
        debug!(status = %status, body = %body, "DingTalk responded");

        // DingTalk only signals delivery with 200; other 2xx codes are failures.
        if status == StatusCode::OK {
            info!("Successfully sent message to DingTalk.");
            metrics::counter!("dingtalk_messages_sent_total").increment(1);
            return Ok(());
        }

        let err = classify_failure(status, body);
        let reason = match err {
            SendError::Remote { .. } => "remote",
            _ => "protocol",
        };
        metrics::counter!("dingtalk_messages_failed_total", "reason" => reason).increment(1);
        error!(status = %status, error = %err, "Failed to send DingTalk notification");
        Err(err)
    }
}

/// Maps a non-200 response onto a `SendError`.
fn classify_failure(status: StatusCode, body: String) -> SendError {
    match serde_json::from_str::<WebhookResponse>(&body) {
        Ok(res) => SendError::Remote {
            code: res.errcode,
            message: res.errmsg,
        },
        Err(e) => {
            debug!(error = %e, "DingTalk error body is not a webhook response");
            SendError::Protocol {
                status: status.as_u16(),
                body,
            }
        }
    }
}

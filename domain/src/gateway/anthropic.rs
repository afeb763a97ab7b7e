//! Anthropic Messages API client.
//!
//! The relay makes exactly one call per user message with the caller's own API
//! key. Failures are classified the way the chat client expects: anything that
//! mentions `authentication_error` or `401` is an authentication failure, the rest
//! is passed through with the provider's message.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageParam {
    pub role: Role,
    pub content: String,
}

/// Request payload for `POST /v1/messages`
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<MessageParam>,
}

/// Content block of a model reply. Only text blocks are read.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Response from `POST /v1/messages`
#[derive(Debug, Deserialize)]
pub struct CreateMessageResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl CreateMessageResponse {
    /// Text of the first content block, or an empty string when it is not text.
    pub fn first_text(&self) -> String {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => text.clone(),
            _ => String::new(),
        }
    }
}

/// Anthropic API client bound to one caller's API key
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(config: &Config, api_key: &str) -> Result<Self, Error> {
        let client = build_client(config, api_key)?;
        let base_url = config.anthropic_base_url().to_string();

        Ok(Self { client, base_url })
    }

    pub async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, Error> {
        let url = format!("{}/v1/messages", self.base_url);

        debug!(
            "Sending {} messages to model {}",
            request.messages.len(),
            request.model
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to send message request: {e:?}");
                classify(e.to_string(), Some(Box::new(e)))
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response.json::<CreateMessageResponse>().await.map_err(|e| {
                warn!("Failed to decode model response: {e:?}");
                Error::from(e)
            })?;
            info!(
                "Model replied (id: {:?}, stop_reason: {:?})",
                body.id, body.stop_reason
            );
            Ok(body)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Model request failed: {} - {}", status, error_text);
            Err(classify(format!("{status} {error_text}"), None))
        }
    }
}

/// Maps a provider failure message onto the domain error tree.
pub(crate) fn classify(
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
) -> Error {
    let error_kind = if message.contains("authentication_error") || message.contains("401") {
        ExternalErrorKind::Unauthenticated
    } else {
        ExternalErrorKind::Provider(message)
    };

    Error {
        source,
        error_kind: DomainErrorKind::External(error_kind),
    }
}

/// Build HTTP client with Anthropic authentication
fn build_client(config: &Config, api_key: &str) -> Result<reqwest::Client, Error> {
    let headers = build_auth_headers(config, api_key)?;

    Ok(reqwest::Client::builder()
        .use_rustls_tls()
        .default_headers(headers)
        .build()?)
}

fn build_auth_headers(config: &Config, api_key: &str) -> Result<reqwest::header::HeaderMap, Error> {
    let mut headers = reqwest::header::HeaderMap::new();

    let mut key_header = reqwest::header::HeaderValue::from_str(api_key).map_err(|err| {
        warn!("Failed to create x-api-key header value: {err:?}");
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to create x-api-key header value".to_string(),
            )),
        }
    })?;
    key_header.set_sensitive(true);
    headers.insert("x-api-key", key_header);

    let version = reqwest::header::HeaderValue::from_str(config.anthropic_version()).map_err(
        |err| {
            warn!("Failed to create anthropic-version header value: {err:?}");
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        },
    )?;
    headers.insert("anthropic-version", version);

    headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    Ok(headers)
}

//! HTTP transport for OpenAI-compatible backends.
//!
//! One call maps to one HTTP request; the transport holds no state across
//! calls beyond the shared connection pool. Streaming calls return a
//! [`ChatStream`] that yields delta events terminated by exactly one
//! `StreamEnd` (or an `Err` item on connection-level failure).

mod request;
mod response;
mod sse;

pub use response::{ChatResponse, GeneratedImage};

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::error::{EngineError, classify_http_error};
use crate::stream::ChatStream;
use crate::types::{Message, ProviderConfig, ResponseFormat};

/// Seam between executors and the wire. Implemented over HTTP in production
/// and by in-memory fakes in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// One synchronous request/response exchange.
    async fn execute(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        format: &ResponseFormat,
    ) -> Result<ChatResponse, EngineError>;

    /// Open a streaming exchange and return the delta stream.
    async fn execute_stream(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        format: &ResponseFormat,
    ) -> Result<ChatStream, EngineError>;
}

/// HTTP transport over a shared `reqwest` client.
#[derive(Clone, Default)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// One images/generations exchange. Single-shot, no deltas.
    pub async fn execute_image(
        &self,
        config: &ProviderConfig,
        prompt: &str,
    ) -> Result<Vec<GeneratedImage>, EngineError> {
        let url = format!("{}/images/generations", config.base_url());
        let body = request::image_body(config, prompt);
        let raw = self.post_json(config, &url, &body).await?;
        response::parse_image_response(&raw)
    }

    async fn post_json(
        &self,
        config: &ProviderConfig,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, EngineError> {
        tracing::debug!(provider_id = %config.id, %url, "dispatching request");
        let resp = self
            .http_client
            .post(url)
            .headers(auth_headers(config)?)
            .json(body)
            .send()
            .await
            .map_err(|e| EngineError::HttpError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &text));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| EngineError::HttpError(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| EngineError::ParseError(format!("response is not JSON: {e}")))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn execute(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        format: &ResponseFormat,
    ) -> Result<ChatResponse, EngineError> {
        let url = format!("{}/chat/completions", config.base_url());
        let body = request::chat_body(config, messages, format, false);
        let raw = self.post_json(config, &url, &body).await?;
        response::parse_chat_response(&raw)
    }

    async fn execute_stream(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        format: &ResponseFormat,
    ) -> Result<ChatStream, EngineError> {
        let url = format!("{}/chat/completions", config.base_url());
        let body = request::chat_body(config, messages, format, true);

        tracing::debug!(provider_id = %config.id, %url, "opening stream");
        let resp = self
            .http_client
            .post(&url)
            .headers(auth_headers(config)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::HttpError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_http_error(status, &text));
        }

        let converter = sse::SseConverter::new();
        let mut frames = resp.bytes_stream().eventsource();

        // Exactly one terminal item per stream: the [DONE] marker, a bare
        // connection close, or a connection-level error all settle it.
        let stream = async_stream::stream! {
            while let Some(item) = frames.next().await {
                match item {
                    Ok(frame) => {
                        let data = frame.data.trim();
                        if data == "[DONE]" {
                            yield Ok(converter.finish());
                            return;
                        }
                        if data.is_empty() {
                            continue;
                        }
                        for event in converter.convert_frame(data) {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(EngineError::StreamError(e.to_string()));
                        return;
                    }
                }
            }
            // Provider closed the connection without a [DONE] marker; the
            // accumulated totals are still authoritative.
            yield Ok(converter.finish());
        };

        Ok(Box::pin(stream))
    }
}

fn auth_headers(config: &ProviderConfig) -> Result<HeaderMap, EngineError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|e| EngineError::ConfigurationError(format!("invalid API key: {e}")))?,
    );
    Ok(headers)
}

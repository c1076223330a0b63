//! Error types for the execution engine.
//!
//! Failures that reach the caller are represented as values
//! ([`ExecutionOutcome`](crate::types::ExecutionOutcome)); `EngineError` is
//! the internal currency that gets folded into those outcomes. Recoverable
//! conditions (malformed stream frames, invalid response-format schemas) are
//! absorbed where they occur and never surface here.

use serde_json::Value;

/// Engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Missing or invalid provider configuration. Raised before any network
    /// call is made.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Network-level HTTP failure (connect, send, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-2xx response from the provider.
    #[error("API error {code}: {message}")]
    ApiError {
        /// HTTP status code
        code: u16,
        /// Provider error message
        message: String,
    },

    /// Authentication failure (401 or an auth-typed error envelope).
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Rate limit hit (429 or a rate-limit-typed error envelope).
    #[error("Rate limit error: {0}")]
    RateLimitError(String),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Connection-level streaming failure.
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Caller-supplied timeout expired. Treated as a network failure when
    /// folded into an outcome.
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Caller-initiated cancellation. Distinct terminal state, never folded
    /// into a failed outcome.
    #[error("Execution cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether this error is the caller-initiated cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Classify a non-2xx provider response by parsing the OpenAI-style error
/// envelope:
///
/// `{ "error": { "message": "...", "type": "...", "code": "..." } }`
///
/// Falls back to a generic [`EngineError::ApiError`] carrying the raw body
/// when the envelope is absent or unreadable.
pub fn classify_http_error(status: u16, body_text: &str) -> EngineError {
    let Some(error_obj) = serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|json| json.get("error").cloned())
    else {
        return EngineError::ApiError {
            code: status,
            message: body_text.to_string(),
        };
    };

    let message = error_obj
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error")
        .to_string();
    let error_type = error_obj
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    // Prefer the structured `type`, otherwise fall back to status heuristics.
    match error_type {
        "authentication_error" => EngineError::AuthenticationError(message),
        "rate_limit_error" => EngineError::RateLimitError(message),
        "" => map_status_heuristics(status, message),
        other => EngineError::ApiError {
            code: status,
            message: format!("{other}: {message}"),
        },
    }
}

fn map_status_heuristics(status: u16, message: String) -> EngineError {
    let lower = message.to_lowercase();

    if status == 401 || lower.contains("api key") || lower.contains("unauthorized") {
        return EngineError::AuthenticationError(message);
    }
    if status == 429 || lower.contains("rate limit") {
        return EngineError::RateLimitError(message);
    }

    EngineError::ApiError {
        code: status,
        message,
    }
}

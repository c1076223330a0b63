//! Execution outcomes.
//!
//! One [`ExecutionOutcome`] is produced per execution, always: success,
//! failure and cancellation are all values, never unwound errors. Outcomes
//! are write-once: the engine hands them to the caller fully formed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::ProviderConfig;

/// Terminal state of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// Provider returned a response
    Success,
    /// Provider or transport failed; `error` carries the message
    Failed,
    /// Caller cancelled the execution before it settled
    Cancelled,
}

/// Immutable result of one execution against one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Routing key: the originating config's `id`
    pub provider_id: String,
    pub model_name: String,
    pub provider_kind: String,
    pub status: OutcomeStatus,
    /// Final answer text (or image URL / data URI for image executions)
    pub content: String,
    /// Reasoning trace, when the provider emitted one
    pub thinking_content: String,
    /// Wall-clock latency of the execution in milliseconds
    pub latency_ms: u64,
    /// Human-readable failure message, set only when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Successful outcome with final content.
    pub fn success(
        config: &ProviderConfig,
        content: String,
        thinking_content: String,
        latency: Duration,
    ) -> Self {
        Self {
            provider_id: config.id.clone(),
            model_name: config.model_name.clone(),
            provider_kind: config.provider_kind.clone(),
            status: OutcomeStatus::Success,
            content,
            thinking_content,
            latency_ms: latency.as_millis() as u64,
            error: None,
        }
    }

    /// Failed outcome carrying a human-readable message.
    pub fn failure(config: &ProviderConfig, error: &EngineError, latency: Duration) -> Self {
        Self {
            provider_id: config.id.clone(),
            model_name: config.model_name.clone(),
            provider_kind: config.provider_kind.clone(),
            status: OutcomeStatus::Failed,
            content: String::new(),
            thinking_content: String::new(),
            latency_ms: latency.as_millis() as u64,
            error: Some(error.to_string()),
        }
    }

    /// Cancelled outcome. Distinct from failure so callers can tell
    /// "gave up" from "provider failed".
    pub fn cancelled(config: &ProviderConfig, latency: Duration) -> Self {
        Self {
            provider_id: config.id.clone(),
            model_name: config.model_name.clone(),
            provider_kind: config.provider_kind.clone(),
            status: OutcomeStatus::Cancelled,
            content: String::new(),
            thinking_content: String::new(),
            latency_ms: latency.as_millis() as u64,
            error: None,
        }
    }

    /// Empty placeholder emitted by the comparator before any network round
    /// trip completes, so observers have something to render.
    pub fn placeholder(config: &ProviderConfig) -> Self {
        Self {
            provider_id: config.id.clone(),
            model_name: config.model_name.clone(),
            provider_kind: config.provider_kind.clone(),
            status: OutcomeStatus::Success,
            content: String::new(),
            thinking_content: String::new(),
            latency_ms: 0,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OutcomeStatus::Cancelled
    }
}

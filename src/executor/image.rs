//! Image-generation execution.
//!
//! Structurally a single-shot sibling of the chat executor: one request, one
//! response, no deltas and no thinking content. Failure and latency
//! semantics match the chat path so callers can mix chat and image outcomes
//! in one result set.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::executor::single::ExecutionHandle;
use crate::transport::HttpTransport;
use crate::types::{ExecutionOutcome, ProviderConfig};

/// Executes one image-generation call end-to-end.
#[derive(Clone, Default)]
pub struct ImageExecutor {
    transport: HttpTransport,
    timeout: Option<Duration>,
}

impl ImageExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(transport: HttpTransport) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Per-execution timeout. Expiry is reported as a failed outcome.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run one image generation. Never returns an error; the outcome's
    /// content carries the image URL or a data URI for inline payloads.
    pub async fn run(&self, config: &ProviderConfig, prompt: &str) -> ExecutionOutcome {
        self.run_with_token(config, prompt, CancellationToken::new())
            .await
    }

    /// Spawn the generation and hand back a cancellable handle.
    pub fn spawn(&self, config: ProviderConfig, prompt: String) -> ExecutionHandle {
        let cancel = CancellationToken::new();
        let executor = self.clone();
        let token = cancel.clone();
        let task_config = config.clone();
        let task = tokio::spawn(async move {
            executor
                .run_with_token(&task_config, &prompt, token)
                .await
        });
        ExecutionHandle::new(config, cancel, task)
    }

    /// Run one image generation under an externally supplied cancellation
    /// token.
    pub async fn run_with_token(
        &self,
        config: &ProviderConfig,
        prompt: &str,
        cancel: CancellationToken,
    ) -> ExecutionOutcome {
        let start = Instant::now();

        if let Err(e) = config.validate() {
            return ExecutionOutcome::failure(config, &e, start.elapsed());
        }

        let request = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(EngineError::Cancelled),
                result = self.transport.execute_image(config, prompt) => result,
            }
        };
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::TimeoutError(format!(
                    "provider '{}' did not respond within {timeout:?}",
                    config.id
                ))),
            },
            None => request.await,
        };

        let latency = start.elapsed();
        match result {
            Ok(images) => {
                let reference = images.iter().find_map(|img| img.reference());
                match reference {
                    Some(content) => {
                        ExecutionOutcome::success(config, content, String::new(), latency)
                    }
                    None => {
                        let error = EngineError::ParseError(
                            "image response carried neither url nor b64_json".into(),
                        );
                        ExecutionOutcome::failure(config, &error, latency)
                    }
                }
            }
            Err(EngineError::Cancelled) => {
                tracing::debug!(provider_id = %config.id, "image generation cancelled");
                ExecutionOutcome::cancelled(config, latency)
            }
            Err(e) => {
                tracing::warn!(provider_id = %config.id, "image generation failed: {e}");
                ExecutionOutcome::failure(config, &e, latency)
            }
        }
    }
}

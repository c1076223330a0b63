//! Single-provider execution.
//!
//! One [`SingleModelExecutor::run`] call drives one provider end to end:
//! build messages, open the transport, pump the aggregator, settle into an
//! [`ExecutionOutcome`]. The executor never returns an error; failure,
//! timeout and cancellation are all represented as outcome values so one
//! provider's trouble cannot unwind its siblings.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::aggregator::{FlushScheduler, ResponseAggregator, SnapshotObserver, TokioScheduler};
use crate::error::EngineError;
use crate::stream::{ChatStream, StreamEvent};
use crate::transport::{ChatTransport, HttpTransport};
use crate::types::{ExecutionOutcome, Message, ProviderConfig, ResponseFormat, build_messages};

/// Executes one provider call end-to-end.
#[derive(Clone)]
pub struct SingleModelExecutor {
    transport: Arc<dyn ChatTransport>,
    flush_interval: Duration,
    timeout: Option<Duration>,
}

impl Default for SingleModelExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleModelExecutor {
    /// Executor over the default HTTP transport.
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    /// Executor over a custom transport (tests inject fakes here).
    pub fn with_transport(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            flush_interval: Duration::from_millis(30),
            timeout: None,
        }
    }

    /// Per-execution timeout. Expiry is reported as a failed outcome.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Snapshot emission cadence for streaming executions.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Run one execution to completion.
    ///
    /// `observer`, when supplied, receives bounded-rate snapshots during a
    /// streaming execution; the last snapshot always equals the outcome's
    /// final content.
    pub async fn run(
        &self,
        config: &ProviderConfig,
        system: Option<&str>,
        user: &str,
        format: ResponseFormat,
        observer: Option<SnapshotObserver>,
    ) -> ExecutionOutcome {
        self.run_with_token(config, system, user, format, observer, CancellationToken::new())
            .await
    }

    /// Spawn the execution and hand back a cancellable handle.
    pub fn spawn(
        &self,
        config: ProviderConfig,
        system: Option<String>,
        user: String,
        format: ResponseFormat,
        observer: Option<SnapshotObserver>,
    ) -> ExecutionHandle {
        let cancel = CancellationToken::new();
        let executor = self.clone();
        let token = cancel.clone();
        let task_config = config.clone();
        let task = tokio::spawn(async move {
            executor
                .run_with_token(
                    &task_config,
                    system.as_deref(),
                    &user,
                    format,
                    observer,
                    token,
                )
                .await
        });
        ExecutionHandle::new(config, cancel, task)
    }

    /// Run one execution under an externally supplied cancellation token.
    pub async fn run_with_token(
        &self,
        config: &ProviderConfig,
        system: Option<&str>,
        user: &str,
        format: ResponseFormat,
        observer: Option<SnapshotObserver>,
        cancel: CancellationToken,
    ) -> ExecutionOutcome {
        let start = Instant::now();

        if let Err(e) = config.validate() {
            tracing::debug!(provider_id = %config.id, "configuration rejected: {e}");
            return ExecutionOutcome::failure(config, &e, start.elapsed());
        }

        let format = format.validated();
        let messages = build_messages(system, user);

        let execution = self.execute(config, &messages, &format, observer, &cancel);
        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, execution).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::TimeoutError(format!(
                    "provider '{}' did not settle within {timeout:?}",
                    config.id
                ))),
            },
            None => execution.await,
        };

        let latency = start.elapsed();
        match result {
            Ok((content, thinking)) => {
                tracing::debug!(provider_id = %config.id, latency_ms = latency.as_millis() as u64, "execution completed");
                ExecutionOutcome::success(config, content, thinking, latency)
            }
            Err(EngineError::Cancelled) => {
                tracing::debug!(provider_id = %config.id, "execution cancelled");
                ExecutionOutcome::cancelled(config, latency)
            }
            Err(e) => {
                tracing::warn!(provider_id = %config.id, "execution failed: {e}");
                ExecutionOutcome::failure(config, &e, latency)
            }
        }
    }

    async fn execute(
        &self,
        config: &ProviderConfig,
        messages: &[Message],
        format: &ResponseFormat,
        observer: Option<SnapshotObserver>,
        cancel: &CancellationToken,
    ) -> Result<(String, String), EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        if config.chat_params.stream {
            let stream = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                stream = self.transport.execute_stream(config, messages, format) => stream?,
            };
            self.drain(stream, observer, cancel).await
        } else {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                response = self.transport.execute(config, messages, format) => response?,
            };
            Ok((response.content, response.thinking_content))
        }
    }

    /// Drain the delta stream through the aggregator, forwarding coalesced
    /// snapshots to the observer. Cancellation is checked before anything
    /// else so no snapshot fires after it is requested.
    async fn drain(
        &self,
        mut stream: ChatStream,
        observer: Option<SnapshotObserver>,
        cancel: &CancellationToken,
    ) -> Result<(String, String), EngineError> {
        let mut aggregator = ResponseAggregator::new();
        let mut scheduler = TokioScheduler::new(self.flush_interval);
        let mut flush_tick: Option<Pin<Box<dyn Future<Output = ()> + Send>>> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    // Stop draining; the aggregator (and any pending flush)
                    // is discarded without emitting further snapshots.
                    return Err(EngineError::Cancelled);
                }
                _ = async { flush_tick.as_mut().expect("guarded").await }, if flush_tick.is_some() => {
                    flush_tick = None;
                    if let Some(snapshot) = aggregator.flush()
                        && let Some(observer) = &observer
                    {
                        observer(snapshot);
                    }
                }
                event = stream.next() => match event {
                    Some(Ok(StreamEvent::StreamEnd { content, thinking })) => {
                        let snapshot = aggregator.finalize(content, thinking);
                        if let Some(observer) = &observer {
                            observer(snapshot.clone());
                        }
                        return Ok((snapshot.content, snapshot.thinking));
                    }
                    Some(Ok(delta)) => {
                        if aggregator.on_delta(&delta) {
                            flush_tick = Some(scheduler.tick());
                        }
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        return Err(EngineError::StreamError(
                            "stream ended without a terminal event".into(),
                        ));
                    }
                }
            }
        }
    }
}

/// Cancellable handle to one spawned execution.
///
/// Makes cleanup structural: dropping the handle (without joining it)
/// cancels the execution via a drop guard on the shared token, so the drain
/// loop stops and the underlying connection closes instead of relying on a
/// forgotten closure to stop firing.
pub struct ExecutionHandle {
    config: ProviderConfig,
    cancel: CancellationToken,
    _guard: DropGuard,
    task: tokio::task::JoinHandle<ExecutionOutcome>,
}

impl ExecutionHandle {
    pub(crate) fn new(
        config: ProviderConfig,
        cancel: CancellationToken,
        task: tokio::task::JoinHandle<ExecutionOutcome>,
    ) -> Self {
        let guard = cancel.clone().drop_guard();
        Self {
            config,
            cancel,
            _guard: guard,
            task,
        }
    }

    /// Routing key of the execution this handle controls.
    pub fn provider_id(&self) -> &str {
        &self.config.id
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the running execution.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the execution to settle.
    pub async fn join(self) -> ExecutionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let error = EngineError::StreamError(format!("execution task failed: {e}"));
                ExecutionOutcome::failure(&self.config, &error, Duration::ZERO)
            }
        }
    }
}

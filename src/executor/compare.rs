//! Multi-provider fan-out and join.
//!
//! Dispatches one execution per config concurrently against the same prompt,
//! isolates per-provider failure, and joins into a result set ordered by the
//! input configs (not by completion). Observers are routed strictly by
//! config `id`, never by model name, so two configs referencing the same
//! model with different parameters cannot cross-talk.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::aggregator::SnapshotObserver;
use crate::error::EngineError;
use crate::executor::single::SingleModelExecutor;
use crate::types::{ExecutionOutcome, ProviderConfig, ResponseFormat};

/// Per-provider snapshot observers, keyed by config `id`.
pub type ObserverMap = HashMap<String, SnapshotObserver>;

/// Fans out N concurrent executions and reconciles their outcomes.
#[derive(Clone, Default)]
pub struct MultiModelComparator {
    executor: SingleModelExecutor,
}

impl MultiModelComparator {
    pub fn new(executor: SingleModelExecutor) -> Self {
        Self { executor }
    }

    /// Empty per-config outcomes for immediate rendering, before any network
    /// round trip completes. Presentation convenience only.
    pub fn placeholders(configs: &[ProviderConfig]) -> Vec<ExecutionOutcome> {
        configs.iter().map(ExecutionOutcome::placeholder).collect()
    }

    /// Run all configs to a settled state and return outcomes in input
    /// order. One provider's failure neither cancels nor delays siblings.
    pub async fn compare(
        &self,
        configs: &[ProviderConfig],
        system: Option<&str>,
        user: &str,
        format: &ResponseFormat,
        observers: &ObserverMap,
    ) -> Vec<ExecutionOutcome> {
        self.compare_with_token(
            configs,
            system,
            user,
            format,
            observers,
            CancellationToken::new(),
        )
        .await
    }

    /// Spawn the comparison and hand back a cancellable handle. Cancelling
    /// marks every unsettled execution `Cancelled` and stops its snapshots.
    pub fn spawn(
        &self,
        configs: Vec<ProviderConfig>,
        system: Option<String>,
        user: String,
        format: ResponseFormat,
        observers: ObserverMap,
    ) -> CompareHandle {
        let cancel = CancellationToken::new();
        let comparator = self.clone();
        let token = cancel.clone();
        let task_configs = configs.clone();
        let task = tokio::spawn(async move {
            comparator
                .compare_with_token(
                    &task_configs,
                    system.as_deref(),
                    &user,
                    &format,
                    &observers,
                    token,
                )
                .await
        });
        let guard = cancel.clone().drop_guard();
        CompareHandle {
            configs,
            cancel,
            _guard: guard,
            task,
        }
    }

    async fn compare_with_token(
        &self,
        configs: &[ProviderConfig],
        system: Option<&str>,
        user: &str,
        format: &ResponseFormat,
        observers: &ObserverMap,
        cancel: CancellationToken,
    ) -> Vec<ExecutionOutcome> {
        debug_assert!(
            has_distinct_ids(configs),
            "configs in one comparison must have distinct ids"
        );
        tracing::debug!(count = configs.len(), "starting comparison fan-out");

        let runs = configs.iter().map(|config| {
            let observer = observers.get(&config.id).cloned();
            let cancel = cancel.clone();
            async move {
                self.executor
                    .run_with_token(config, system, user, format.clone(), observer, cancel)
                    .await
            }
        });

        // join_all preserves input order, decoupled from completion order.
        join_all(runs).await
    }
}

fn has_distinct_ids(configs: &[ProviderConfig]) -> bool {
    let mut seen = std::collections::HashSet::new();
    configs.iter().all(|c| seen.insert(c.id.as_str()))
}

/// Cancellable handle to one spawned comparison. Dropping it without
/// joining cancels every execution in the run via a drop guard on the
/// shared token.
pub struct CompareHandle {
    configs: Vec<ProviderConfig>,
    cancel: CancellationToken,
    _guard: DropGuard,
    task: tokio::task::JoinHandle<Vec<ExecutionOutcome>>,
}

impl CompareHandle {
    /// Empty outcomes for this run's configs, in input order, so callers
    /// can render every slot before the first snapshot arrives.
    pub fn placeholders(&self) -> Vec<ExecutionOutcome> {
        MultiModelComparator::placeholders(&self.configs)
    }

    /// Cancel every in-flight execution in this comparison. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared by the comparison's executions.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for every execution to settle.
    pub async fn join(self) -> Vec<ExecutionOutcome> {
        match self.task.await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                let error = EngineError::StreamError(format!("comparison task failed: {e}"));
                self.configs
                    .iter()
                    .map(|c| ExecutionOutcome::failure(c, &error, Duration::ZERO))
                    .collect()
            }
        }
    }
}

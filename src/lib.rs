//! # promptbench
//!
//! Test-execution engine for prompt libraries: takes a filled prompt, sends
//! it to one or several independently configured OpenAI-compatible backends,
//! and reconciles streamed, partial and failed responses into consistent,
//! displayable state.
//!
//! The engine is library-style and stateless across calls; the only state it
//! holds is one in-flight execution's accumulation buffer. Failures are
//! values ([`ExecutionOutcome`]), not panics or unwound errors, so a broken
//! provider never disturbs its siblings in a comparison run.
//!
//! ```rust,no_run
//! use promptbench::{
//!     ChatParams, MultiModelComparator, ProviderConfig, ResponseFormat,
//! };
//!
//! # async fn demo() {
//! let configs = vec![
//!     ProviderConfig::chat("fast", "openai", "sk-...", "https://api.openai.com/v1", "gpt-4o-mini")
//!         .with_streaming(true),
//!     ProviderConfig::chat("strong", "deepseek", "sk-...", "https://api.deepseek.com/v1", "deepseek-chat"),
//! ];
//!
//! let comparator = MultiModelComparator::default();
//! let outcomes = comparator
//!     .compare(&configs, Some("Be terse."), "What is Rust?", &ResponseFormat::Text, &Default::default())
//!     .await;
//!
//! for outcome in &outcomes {
//!     println!("{}: {}", outcome.provider_id, outcome.content);
//! }
//! # }
//! ```

pub mod aggregator;
pub mod error;
pub mod executor;
pub mod stream;
pub mod transport;
pub mod types;

pub use aggregator::{FlushScheduler, ResponseAggregator, Snapshot, SnapshotObserver, TokioScheduler};
pub use error::EngineError;
pub use executor::{
    CompareHandle, ExecutionHandle, ImageExecutor, MultiModelComparator, ObserverMap,
    SingleModelExecutor,
};
pub use stream::{ChatStream, StreamEvent};
pub use transport::{ChatResponse, ChatTransport, GeneratedImage, HttpTransport};
pub use types::{
    ChatParams, ExecutionOutcome, ImageParams, JsonSchemaSpec, Message, MessageRole,
    OutcomeStatus, ProviderConfig, ProviderKind, ResponseFormat, build_messages,
};

// Cancellation token re-export so callers don't need a direct tokio-util dep.
pub use tokio_util::sync::CancellationToken;

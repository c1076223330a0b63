//! Streaming event types.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One event from a streamed chat execution.
///
/// Zero or more delta events precede exactly one terminal event per
/// execution: either `StreamEnd` or an `Err` item on the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental answer text
    ContentDelta { delta: String },
    /// Incremental reasoning-trace text
    ThinkingDelta { delta: String },
    /// Terminal event. The payload is authoritative: it equals the
    /// concatenation, in arrival order, of every delta emitted, even when
    /// the observer dropped or coalesced intermediate ones.
    StreamEnd { content: String, thinking: String },
}

/// Stream of chat events for one execution.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, EngineError>> + Send>>;

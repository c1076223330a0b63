//! SSE frame conversion for OpenAI-compatible streaming responses.
//!
//! Frames carry `delta.content` and, depending on the provider, one of
//! several thinking-field spellings. A malformed individual frame is skipped
//! and logged rather than failing the stream; only connection-level failure
//! terminates an execution.

use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::stream::StreamEvent;

#[derive(Debug, Deserialize)]
struct WireStreamEvent {
    choices: Option<Vec<WireChoice>>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    delta: Option<WireDelta>,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    content: Option<String>,

    // Provider-specific thinking/reasoning spellings
    thinking: Option<String>,
    reasoning_content: Option<String>,
    reasoning: Option<String>,
}

#[derive(Debug, Default)]
struct Totals {
    content: String,
    thinking: String,
}

/// Converts SSE frames into [`StreamEvent`]s while accumulating the running
/// totals, so the terminal `StreamEnd` payload is exactly the concatenation
/// of every delta emitted.
#[derive(Clone, Default)]
pub(crate) struct SseConverter {
    totals: Arc<Mutex<Totals>>,
}

impl SseConverter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Convert one frame's data payload into zero or more delta events.
    /// Unparseable frames yield nothing.
    pub(crate) fn convert_frame(&self, data: &str) -> Vec<StreamEvent> {
        let wire: WireStreamEvent = match serde_json::from_str(data) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::warn!("skipping malformed stream frame: {e}");
                tracing::debug!(frame = %data, "malformed frame payload");
                return Vec::new();
            }
        };

        let Some(delta) = wire
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.delta)
        else {
            return Vec::new();
        };

        let mut events = Vec::with_capacity(2);
        let mut totals = self.totals.lock().expect("totals lock poisoned");

        if let Some(content) = delta.content
            && !content.is_empty()
        {
            totals.content.push_str(&content);
            events.push(StreamEvent::ContentDelta { delta: content });
        }

        let thinking = delta
            .reasoning_content
            .or(delta.reasoning)
            .or(delta.thinking);
        if let Some(thinking) = thinking
            && !thinking.is_empty()
        {
            totals.thinking.push_str(&thinking);
            events.push(StreamEvent::ThinkingDelta { delta: thinking });
        }

        events
    }

    /// Terminal event carrying the authoritative accumulated totals.
    pub(crate) fn finish(&self) -> StreamEvent {
        let totals = self.totals.lock().expect("totals lock poisoned");
        StreamEvent::StreamEnd {
            content: totals.content.clone(),
            thinking: totals.thinking.clone(),
        }
    }
}

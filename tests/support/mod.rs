//! Shared test support: scripted transports and observer capture.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use promptbench::{
    ChatResponse, ChatStream, ChatTransport, EngineError, Message, ProviderConfig, ResponseFormat,
    Snapshot, SnapshotObserver, StreamEvent,
};

/// Per-provider behavior for a [`ScriptedTransport`], keyed by config id.
#[derive(Clone)]
pub enum Script {
    /// Stream the given content chunks (with optional thinking chunks),
    /// pausing between items, then emit the authoritative StreamEnd.
    Stream {
        content_chunks: Vec<&'static str>,
        thinking_chunks: Vec<&'static str>,
        delay: Duration,
    },
    /// Stream some chunks, then fail at the connection level.
    StreamThenError {
        content_chunks: Vec<&'static str>,
        error: &'static str,
        delay: Duration,
    },
    /// Single synchronous response.
    Respond {
        content: &'static str,
        thinking: &'static str,
    },
    /// Fail before anything is produced.
    Fail(&'static str),
    /// Never settle (for timeout tests).
    Hang,
}

/// In-memory [`ChatTransport`] driven by per-provider scripts.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, provider_id: impl Into<String>, script: Script) -> Self {
        self.scripts.insert(provider_id.into(), script);
        self
    }

    fn script_for(&self, config: &ProviderConfig) -> Result<Script, EngineError> {
        self.scripts
            .get(&config.id)
            .cloned()
            .ok_or_else(|| EngineError::HttpError(format!("no script for '{}'", config.id)))
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn execute(
        &self,
        config: &ProviderConfig,
        _messages: &[Message],
        _format: &ResponseFormat,
    ) -> Result<ChatResponse, EngineError> {
        match self.script_for(config)? {
            Script::Respond { content, thinking } => Ok(ChatResponse {
                content: content.to_string(),
                thinking_content: thinking.to_string(),
            }),
            Script::Fail(message) => Err(EngineError::HttpError(message.to_string())),
            Script::Hang => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            _ => Err(EngineError::HttpError(
                "script expects a streaming call".into(),
            )),
        }
    }

    async fn execute_stream(
        &self,
        config: &ProviderConfig,
        _messages: &[Message],
        _format: &ResponseFormat,
    ) -> Result<ChatStream, EngineError> {
        match self.script_for(config)? {
            Script::Stream {
                content_chunks,
                thinking_chunks,
                delay,
            } => {
                let stream = async_stream::stream! {
                    let mut content = String::new();
                    let mut thinking = String::new();
                    for chunk in thinking_chunks {
                        thinking.push_str(chunk);
                        yield Ok(StreamEvent::ThinkingDelta { delta: chunk.to_string() });
                        tokio::time::sleep(delay).await;
                    }
                    for chunk in content_chunks {
                        content.push_str(chunk);
                        yield Ok(StreamEvent::ContentDelta { delta: chunk.to_string() });
                        tokio::time::sleep(delay).await;
                    }
                    yield Ok(StreamEvent::StreamEnd { content, thinking });
                };
                Ok(Box::pin(stream))
            }
            Script::StreamThenError {
                content_chunks,
                error,
                delay,
            } => {
                let stream = async_stream::stream! {
                    for chunk in content_chunks {
                        yield Ok(StreamEvent::ContentDelta { delta: chunk.to_string() });
                        tokio::time::sleep(delay).await;
                    }
                    yield Err(EngineError::StreamError(error.to_string()));
                };
                Ok(Box::pin(stream))
            }
            Script::Fail(message) => Err(EngineError::HttpError(message.to_string())),
            Script::Hang => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
            _ => Err(EngineError::HttpError(
                "script expects a non-streaming call".into(),
            )),
        }
    }
}

/// Collects observer snapshots for assertions.
#[derive(Clone, Default)]
pub struct SnapshotLog {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer(&self) -> SnapshotObserver {
        let snapshots = Arc::clone(&self.snapshots);
        Arc::new(move |snapshot| {
            snapshots.lock().unwrap().push(snapshot);
        })
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

/// Install a test subscriber once so `RUST_LOG=debug cargo test` shows
/// engine traces.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Chat config pointing at a scripted transport (URL and key are unused but
/// must pass validation).
pub fn chat_config(id: &str, model: &str, stream: bool) -> ProviderConfig {
    ProviderConfig::chat(id, "openai", "sk-test", "https://scripted.test/v1", model)
        .with_streaming(stream)
}

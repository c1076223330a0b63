//! Non-streaming response parsing.

use serde::Deserialize;

use crate::error::EngineError;

/// Final response of one non-streaming chat exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub thinking_content: String,
}

/// Parse `choices[0].message.content` plus the thinking-field spellings
/// providers use for reasoning traces (`reasoning_content` for DeepSeek,
/// `reasoning` and `thinking` elsewhere).
pub(crate) fn parse_chat_response(raw: &serde_json::Value) -> Result<ChatResponse, EngineError> {
    #[derive(Deserialize)]
    struct WireMessage {
        content: Option<String>,
        thinking: Option<String>,
        reasoning_content: Option<String>,
        reasoning: Option<String>,
    }
    #[derive(Deserialize)]
    struct WireChoice {
        message: WireMessage,
    }
    #[derive(Deserialize)]
    struct WireResponse {
        choices: Vec<WireChoice>,
    }

    let resp: WireResponse = serde_json::from_value(raw.clone())
        .map_err(|e| EngineError::ParseError(format!("invalid chat response: {e}")))?;
    let message = resp
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| EngineError::ParseError("chat response has no choices".into()))?;

    let thinking = message
        .reasoning_content
        .or(message.reasoning)
        .or(message.thinking)
        .unwrap_or_default();

    Ok(ChatResponse {
        content: message.content.unwrap_or_default(),
        thinking_content: thinking,
    })
}

/// One generated image: a remote URL or inline base64 payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

impl GeneratedImage {
    /// Displayable reference: the URL when present, otherwise a data URI
    /// wrapping the inline payload.
    pub fn reference(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        self.b64_json
            .as_ref()
            .map(|b64| format!("data:image/png;base64,{b64}"))
    }
}

/// Parse an images/generations response (`data[].url` / `data[].b64_json`).
pub(crate) fn parse_image_response(
    raw: &serde_json::Value,
) -> Result<Vec<GeneratedImage>, EngineError> {
    #[derive(Deserialize)]
    struct WireResponse {
        data: Vec<GeneratedImage>,
    }

    let resp: WireResponse = serde_json::from_value(raw.clone())
        .map_err(|e| EngineError::ParseError(format!("invalid image response: {e}")))?;
    if resp.data.is_empty() {
        return Err(EngineError::ParseError(
            "image response has no generated items".into(),
        ));
    }
    Ok(resp.data)
}

//! Request body construction for the OpenAI-compatible wire surface.

use serde_json::{Value, json};

use crate::types::{Message, ProviderConfig, ResponseFormat};

/// Build the JSON body for a chat/completions call.
///
/// Optional sampling parameters are omitted when unset so provider defaults
/// apply. `stream` is taken from the argument rather than the config so the
/// executor can force a non-streaming exchange.
pub(crate) fn chat_body(
    config: &ProviderConfig,
    messages: &[Message],
    format: &ResponseFormat,
    stream: bool,
) -> Value {
    let params = &config.chat_params;
    let mut body = json!({
        "model": config.model_name,
        "messages": messages,
    });

    if let Some(t) = params.temperature {
        body["temperature"] = json!(t);
    }
    if let Some(max) = params.max_tokens {
        body["max_tokens"] = json!(max);
    }
    if let Some(tp) = params.top_p {
        body["top_p"] = json!(tp);
    }
    if let Some(tk) = params.top_k {
        body["top_k"] = json!(tk);
    }
    if let Some(fp) = params.frequency_penalty {
        body["frequency_penalty"] = json!(fp);
    }
    if let Some(pp) = params.presence_penalty {
        body["presence_penalty"] = json!(pp);
    }
    if params.enable_thinking {
        body["enable_thinking"] = json!(true);
    }
    if stream {
        body["stream"] = json!(true);
    }
    if let Some(wire) = format.to_wire() {
        body["response_format"] = wire;
    }

    body
}

/// Build the JSON body for an images/generations call.
pub(crate) fn image_body(config: &ProviderConfig, prompt: &str) -> Value {
    let params = &config.image_params;
    let mut body = json!({
        "model": config.model_name,
        "prompt": prompt,
    });

    if let Some(size) = &params.size {
        body["size"] = json!(size);
    }
    if let Some(quality) = &params.quality {
        body["quality"] = json!(quality);
    }
    if let Some(style) = &params.style {
        body["style"] = json!(style);
    }
    if let Some(n) = params.n {
        body["n"] = json!(n);
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatParams, JsonSchemaSpec, build_messages};

    fn config() -> ProviderConfig {
        ProviderConfig::chat("p1", "openai", "k", "https://api.test", "gpt-4o").with_chat_params(
            ChatParams {
                temperature: Some(0.7),
                max_tokens: Some(256),
                enable_thinking: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn chat_body_includes_set_params_and_omits_unset() {
        let messages = build_messages(Some("sys"), "hi");
        let body = chat_body(&config(), &messages, &ResponseFormat::Text, true);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["enable_thinking"], true);
        assert_eq!(body["stream"], true);
        assert!(body.get("top_p").is_none());
        assert!(body.get("frequency_penalty").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn chat_body_carries_json_schema_format() {
        let format = ResponseFormat::JsonSchema {
            json_schema: JsonSchemaSpec {
                name: "answer".into(),
                strict: true,
                schema: serde_json::json!({ "type": "object" }),
            },
        };
        let messages = build_messages(None, "hi");
        let body = chat_body(&config(), &messages, &format, false);

        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "answer");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn image_body_carries_optional_params() {
        let cfg = ProviderConfig::image("p2", "openai", "k", "https://api.test", "dall-e-3")
            .with_image_params(crate::types::ImageParams {
                size: Some("1024x1024".into()),
                n: Some(1),
                ..Default::default()
            });
        let body = image_body(&cfg, "a lighthouse");
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["prompt"], "a lighthouse");
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["n"], 1);
        assert!(body.get("quality").is_none());
    }
}

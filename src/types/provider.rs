//! Provider configuration types.
//!
//! A [`ProviderConfig`] describes one callable backend. The `id` field is the
//! only safe routing key across a comparison run: two configs may reference
//! the same model with different parameters, so `model_name` is never used
//! for result attribution.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Kind of backend this config points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Chat/completions backend (streaming or not)
    #[default]
    Chat,
    /// Image-generation backend (single request/response)
    Image,
}

/// Sampling and streaming parameters for chat backends.
///
/// All numeric fields are optional and omitted from the request body when
/// unset, so provider defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Request a streamed (SSE) response
    #[serde(default)]
    pub stream: bool,
    /// Ask the provider to emit a reasoning trace alongside the answer
    #[serde(default)]
    pub enable_thinking: bool,
}

/// Generation parameters for image backends.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

/// Configuration for one callable model-serving backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Stable identity of this config within a comparison run. The only
    /// safe routing key; must be distinct per run.
    pub id: String,
    /// Human-oriented provider label ("openai", "deepseek", ...). Not used
    /// for routing.
    pub provider_kind: String,
    /// API key, kept out of Debug output and logs.
    pub api_key: SecretString,
    /// Base URL of the OpenAI-compatible API surface.
    pub api_url: String,
    /// Model identifier sent in the request body.
    pub model_name: String,
    /// Chat or image backend.
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default)]
    pub chat_params: ChatParams,
    #[serde(default)]
    pub image_params: ImageParams,
}

impl ProviderConfig {
    /// Create a chat config with default parameters.
    pub fn chat(
        id: impl Into<String>,
        provider_kind: impl Into<String>,
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            provider_kind: provider_kind.into(),
            api_key: SecretString::from(api_key.into()),
            api_url: api_url.into(),
            model_name: model_name.into(),
            kind: ProviderKind::Chat,
            chat_params: ChatParams::default(),
            image_params: ImageParams::default(),
        }
    }

    /// Create an image config with default parameters.
    pub fn image(
        id: impl Into<String>,
        provider_kind: impl Into<String>,
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: ProviderKind::Image,
            ..Self::chat(id, provider_kind, api_key, api_url, model_name)
        }
    }

    /// Set chat parameters.
    pub fn with_chat_params(mut self, params: ChatParams) -> Self {
        self.chat_params = params;
        self
    }

    /// Set image parameters.
    pub fn with_image_params(mut self, params: ImageParams) -> Self {
        self.image_params = params;
        self
    }

    /// Enable or disable streaming for this config.
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.chat_params.stream = stream;
        self
    }

    /// Expose the API key for header construction.
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Fail fast before any network call when the config is unusable.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.api_url.trim().is_empty() {
            return Err(EngineError::ConfigurationError(format!(
                "provider '{}': api_url is empty",
                self.id
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(EngineError::ConfigurationError(format!(
                "provider '{}': model_name is empty",
                self.id
            )));
        }
        if self.api_key().trim().is_empty() {
            return Err(EngineError::ConfigurationError(format!(
                "provider '{}': api_key is empty",
                self.id
            )));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_fields() {
        let cfg = ProviderConfig::chat("a", "openai", "", "https://api.test", "gpt-4o");
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::ConfigurationError(_))
        ));

        let cfg = ProviderConfig::chat("a", "openai", "sk-x", "", "gpt-4o");
        assert!(cfg.validate().is_err());

        let cfg = ProviderConfig::chat("a", "openai", "sk-x", "https://api.test", "");
        assert!(cfg.validate().is_err());

        let cfg = ProviderConfig::chat("a", "openai", "sk-x", "https://api.test", "gpt-4o");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn api_key_is_not_in_debug_output() {
        let cfg = ProviderConfig::chat("a", "openai", "sk-secret", "https://api.test", "gpt-4o");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let cfg = ProviderConfig::chat("a", "openai", "k", "https://api.test/v1/", "m");
        assert_eq!(cfg.base_url(), "https://api.test/v1");
    }
}

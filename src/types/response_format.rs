//! Structured output hints for chat requests.
//!
//! Mirrors the OpenAI `response_format` request field. A malformed
//! `json_schema` request degrades to plain text instead of failing the
//! execution.

use serde::{Deserialize, Serialize};

/// JSON schema payload for `response_format: json_schema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    #[serde(default)]
    pub strict: bool,
    pub schema: serde_json::Value,
}

/// Response format hint sent with a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
    JsonSchema { json_schema: JsonSchemaSpec },
}

impl ResponseFormat {
    /// Validate the format, degrading a malformed `json_schema` to `Text`.
    ///
    /// Never returns an error: an uncompilable or non-object schema is
    /// logged and dropped so the request still goes out as plain text.
    pub fn validated(self) -> ResponseFormat {
        match self {
            ResponseFormat::JsonSchema { json_schema } => {
                if !json_schema.schema.is_object() {
                    tracing::warn!(
                        schema_name = %json_schema.name,
                        "response_format schema is not a JSON object; falling back to text"
                    );
                    return ResponseFormat::Text;
                }
                match jsonschema::validator_for(&json_schema.schema) {
                    Ok(_) => ResponseFormat::JsonSchema { json_schema },
                    Err(e) => {
                        tracing::warn!(
                            schema_name = %json_schema.name,
                            "invalid response_format schema, falling back to text: {e}"
                        );
                        ResponseFormat::Text
                    }
                }
            }
            other => other,
        }
    }

    /// Wire representation for the request body, or `None` for plain text
    /// (the provider default; omitting the field avoids tripping backends
    /// that reject an explicit `{"type":"text"}`).
    pub(crate) fn to_wire(&self) -> Option<serde_json::Value> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(serde_json::json!({ "type": "json_object" })),
            ResponseFormat::JsonSchema { json_schema } => Some(serde_json::json!({
                "type": "json_schema",
                "json_schema": json_schema,
            })),
        }
    }
}

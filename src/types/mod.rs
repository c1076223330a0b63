//! Data model: provider configuration, messages, response formats and
//! execution outcomes.

mod message;
mod outcome;
mod provider;
mod response_format;

pub use message::{Message, MessageRole, build_messages};
pub use outcome::{ExecutionOutcome, OutcomeStatus};
pub use provider::{ChatParams, ImageParams, ProviderConfig, ProviderKind};
pub use response_format::{JsonSchemaSpec, ResponseFormat};

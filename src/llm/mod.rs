//! LLM-backed message generation: provider routing, retries and prompts.

pub mod generator;
pub mod json;
pub mod prompt;
pub mod retry;
pub mod router;
pub mod subprocess;

pub use generator::{ChangelogStyle, LlmGenerator, MessageGenerator, MessageRequest};
pub use json::{extract_json, parse_json};
pub use router::{LlmCompletion, LlmError, LlmRouter, Provider, ProviderSelection};

#[cfg(test)]
pub use generator::MockMessageGenerator;

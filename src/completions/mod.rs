//! External generative completion collaborator.
//!
//! The core only builds the prompt's context; producing the final answer is
//! delegated to whatever completion service is configured.

pub mod openai;

pub use openai::OpenAiCompletionProvider;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::RagError;

/// Generates an assistant reply from a system prompt and a user message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, RagError>;
}

/// Canned-reply provider for tests. Records the prompts it was given so
/// tests can assert on the assembled context.
#[derive(Debug, Default)]
pub struct MockCompletionProvider {
    reply: String,
    seen_system_prompts: Mutex<Vec<String>>,
}

impl MockCompletionProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            seen_system_prompts: Mutex::new(Vec::new()),
        }
    }

    /// System prompts received so far, in call order.
    pub fn seen_system_prompts(&self) -> Vec<String> {
        self.seen_system_prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, system_prompt: &str, _user_message: &str) -> Result<String, RagError> {
        self.seen_system_prompts.lock().push(system_prompt.to_string());
        Ok(self.reply.clone())
    }
}

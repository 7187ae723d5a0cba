//! LLM backends used by the default content producer.
//!
//! [`Provider`] resolves configuration into one backend; [`Provider::build`]
//! turns it into a boxed [`LLM`]:
//!
//! ```ignore
//! let llm = Provider::from_config(&config.llm)?.build()?;
//! let text = llm.complete_with_system(SYSTEM, &prompt).await?;
//! ```

mod claude;
mod error;
mod http;
mod openai;
mod provider;

pub use claude::ClaudeClient;
pub use error::LLMError;
pub use openai::OpenAIClient;
pub use provider::Provider;

use async_trait::async_trait;

/// A chat model that answers one prompt at a time.
#[async_trait]
pub trait LLM: Send + Sync {
    /// Sends `prompt` as the user turn. An empty `system` sends no system prompt.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError>;

    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        self.complete_with_system("", prompt).await
    }
}

#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        (**self).complete_with_system(system, prompt).await
    }
}

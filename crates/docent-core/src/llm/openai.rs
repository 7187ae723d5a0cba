use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http::{self, non_empty};
use super::{LLMError, LLM};
use crate::config::DEFAULT_MAX_TOKENS;

/// Client for the OpenAI chat completions protocol.
///
/// Also serves Ollama, OpenRouter and self-hosted servers (vLLM, llama.cpp)
/// that speak the same protocol under a different base URL.
pub struct OpenAIClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    http: Client,
}

impl OpenAIClient {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`.
    /// Local servers usually need no key.
    pub fn new(base_url: &str, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            http: http::client(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn body<'a>(&'a self, system: &'a str, prompt: &'a str) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(Turn {
                role: "system",
                content: system,
            });
        }
        messages.push(Turn {
            role: "user",
            content: prompt,
        });

        CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl LLM for OpenAIClient {
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        let mut request = self.http.post(&self.endpoint).json(&self.body(system, prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: CompletionResponse = http::send_json(request).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        non_empty(text)
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Turn<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Reply,
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    content: Option<String>,
}

use super::{ClaudeClient, LLMError, OpenAIClient, LLM};
use crate::config::{
    LLMConfig, DEFAULT_ANTHROPIC_API_VERSION, DEFAULT_ANTHROPIC_MODEL, DEFAULT_ANTHROPIC_URL,
    DEFAULT_MAX_TOKENS, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_MODEL,
    DEFAULT_OPENAI_URL, DEFAULT_OPENROUTER_URL,
};

/// A fully resolved LLM backend.
///
/// Every variant carries the fields its client needs, resolved from
/// configuration and environment once in [`Provider::from_config`]. The
/// backend identifier and model feed the cache fingerprint, so two runs with
/// equal providers reuse each other's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Any server speaking the OpenAI chat completions protocol.
    OpenAI {
        base_url: String,
        api_key: Option<String>,
        model: String,
    },
    /// OpenRouter's hosted gateway; always needs a key.
    OpenRouter {
        api_key: Option<String>,
        model: String,
    },
    /// Anthropic Messages API.
    Anthropic {
        api_url: String,
        api_key: Option<String>,
        api_version: String,
        model: String,
    },
    /// Local Ollama; keyless.
    Ollama { base_url: String, model: String },
}

impl Default for Provider {
    fn default() -> Self {
        Provider::OpenAI {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

impl Provider {
    /// Resolves a provider from LLMConfig, rejecting unknown provider names.
    ///
    /// Explicit config wins, then the backend's conventional environment
    /// variable, then the built-in default.
    pub fn from_config(config: &LLMConfig) -> Result<Self, LLMError> {
        let api_key = config.api_key_or_env();
        let base_url = config.base_url.as_deref();
        let model = config.model.as_deref();

        let provider = match config.provider.to_lowercase().as_str() {
            "openai" | "openai-compatible" => Provider::OpenAI {
                base_url: first_of(base_url, env("OPENAI_BASE_URL"), DEFAULT_OPENAI_URL),
                api_key,
                model: first_of(model, env("OPENAI_MODEL"), DEFAULT_OPENAI_MODEL),
            },
            "openrouter" => Provider::OpenRouter {
                api_key,
                model: config.model_or_default(),
            },
            "anthropic" | "claude" => Provider::Anthropic {
                api_url: first_of(base_url, None, DEFAULT_ANTHROPIC_URL),
                api_key,
                api_version: first_of(
                    config.api_version.as_deref(),
                    None,
                    DEFAULT_ANTHROPIC_API_VERSION,
                ),
                model: first_of(model, env("ANTHROPIC_MODEL"), DEFAULT_ANTHROPIC_MODEL),
            },
            "ollama" => {
                let host = env("OLLAMA_HOST").map(|h| format!("{}/v1", h.trim_end_matches('/')));
                Provider::Ollama {
                    base_url: first_of(base_url, host, DEFAULT_OLLAMA_URL),
                    model: first_of(model, env("OLLAMA_MODEL"), DEFAULT_OLLAMA_MODEL),
                }
            }
            other => return Err(LLMError::UnknownProvider(other.to_string())),
        };
        Ok(provider)
    }

    /// Stable backend identifier.
    pub fn backend_id(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "openai",
            Provider::OpenRouter { .. } => "openrouter",
            Provider::Anthropic { .. } => "anthropic",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Model identifier sent to the backend.
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. }
            | Provider::OpenRouter { model, .. }
            | Provider::Anthropic { model, .. }
            | Provider::Ollama { model, .. } => model,
        }
    }

    /// Creates an LLM client with the default response token limit.
    pub fn build(self) -> Result<Box<dyn LLM>, LLMError> {
        self.build_with_max_tokens(DEFAULT_MAX_TOKENS)
    }

    /// Builds the client, failing when a keyed backend has no key.
    pub fn build_with_max_tokens(self, max_tokens: u32) -> Result<Box<dyn LLM>, LLMError> {
        match self {
            Provider::OpenAI {
                base_url,
                api_key,
                model,
            } => Ok(Box::new(
                OpenAIClient::new(&base_url, api_key, model)
                    .with_max_tokens(max_tokens),
            )),

            Provider::OpenRouter { api_key, model } => {
                let key = api_key.ok_or(LLMError::MissingApiKey("openrouter"))?;
                Ok(Box::new(
                    OpenAIClient::new(DEFAULT_OPENROUTER_URL, Some(key), model)
                        .with_max_tokens(max_tokens),
                ))
            }

            Provider::Anthropic {
                api_url,
                api_key,
                api_version,
                model,
            } => {
                let key = api_key.ok_or(LLMError::MissingApiKey("anthropic"))?;
                Ok(Box::new(
                    ClaudeClient::new(key)
                        .with_api_url(api_url)
                        .with_api_version(api_version)
                        .with_model(model)
                        .with_max_tokens(max_tokens),
                ))
            }

            Provider::Ollama { base_url, model } => Ok(Box::new(
                OpenAIClient::new(&base_url, None, model).with_max_tokens(max_tokens),
            )),
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn first_of(configured: Option<&str>, from_env: Option<String>, fallback: &str) -> String {
    configured
        .map(str::to_string)
        .or(from_env)
        .unwrap_or_else(|| fallback.to_string())
}

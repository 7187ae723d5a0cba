use std::time::Duration;
use thiserror::Error;

/// Failures talking to an LLM backend.
///
/// All of these are per-file from the engine's point of view: the affected
/// document records the error and the file stays uncached.
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("Missing API key for {0}; set it in docent.toml or the provider's environment variable")]
    MissingApiKey(&'static str),

    #[error("Could not build request: {0}")]
    RequestFailed(String),

    #[error("{status} from backend: {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    ParseError(String),

    #[error("Rate limited{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Unknown provider '{0}' (expected openai, anthropic, ollama or openrouter)")]
    UnknownProvider(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(" (retry after {}s)", wait.as_secs()),
        None => String::new(),
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else if err.is_builder() {
            LLMError::RequestFailed(err.to_string())
        } else if err.is_decode() {
            LLMError::ParseError(err.to_string())
        } else {
            LLMError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message() {
        let err = LLMError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
        };
        assert_eq!(err.to_string(), "Rate limited (retry after 20s)");
        assert_eq!(
            LLMError::RateLimited { retry_after: None }.to_string(),
            "Rate limited"
        );
    }
}

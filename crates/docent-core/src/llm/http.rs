//! Shared request plumbing for the HTTP backends.

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::LLMError;

/// Generation of a long file can take minutes on local models.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Error bodies are cut to this many characters before being reported.
const MAX_ERROR_BODY: usize = 500;

/// HTTP client with the timeout every backend uses.
pub(super) fn client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Sends `request` and decodes a successful JSON body into `T`.
pub(super) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LLMError> {
    let response = request.send().await?;
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| LLMError::ParseError(e.to_string()))
}

async fn check_status(response: Response) -> Result<Response, LLMError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(LLMError::RateLimited { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    Err(LLMError::ApiError {
        status: status.as_u16(),
        message: truncate_body(body.trim()),
    })
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Treats whitespace-only model output as no output.
pub(super) fn non_empty(text: String) -> Result<String, LLMError> {
    if text.trim().is_empty() {
        Err(LLMError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        assert_eq!(truncate_body(&long).len(), MAX_ERROR_BODY + 3);
    }

    #[test]
    fn test_non_empty() {
        assert!(matches!(non_empty("  \n".to_string()), Err(LLMError::EmptyResponse)));
        assert_eq!(non_empty("ok".to_string()).unwrap(), "ok");
    }
}

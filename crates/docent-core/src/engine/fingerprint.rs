//! Fingerprint of the configuration that shapes generated output.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use super::digest::content_hash;
use crate::config::{Config, DEFAULT_PROMPT_TEMPLATE, UNREADABLE_TEMPLATE_SENTINEL};
use crate::llm::{LLMError, Provider};

/// Opaque digest of backend, model and prompt template.
///
/// A change invalidates every cached file hash on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFingerprint(String);

#[derive(Serialize)]
struct FingerprintInput<'a> {
    model: &'a str,
    backend: &'a str,
    template_path: String,
    template_hash: String,
}

impl ConfigFingerprint {
    /// Computes the fingerprint. Never fails: an unreadable template hashes
    /// to a fixed sentinel instead.
    pub fn compute(backend: &str, model: &str, template: Option<&Path>) -> Self {
        let (template_path, template_hash) = match template {
            Some(path) => (
                normalize_path(path),
                std::fs::read(path)
                    .map(|bytes| content_hash(&bytes))
                    .unwrap_or_else(|_| UNREADABLE_TEMPLATE_SENTINEL.to_string()),
            ),
            None => (
                String::new(),
                content_hash(DEFAULT_PROMPT_TEMPLATE.as_bytes()),
            ),
        };

        let input = FingerprintInput {
            model,
            backend,
            template_path,
            template_hash,
        };
        let canonical = serde_json::to_vec(&input).unwrap_or_default();
        Self(content_hash(&canonical))
    }

    /// Computes the fingerprint for a resolved provider.
    pub fn for_provider(provider: &Provider, template: Option<&Path>) -> Self {
        Self::compute(provider.backend_id(), provider.model(), template)
    }

    /// Resolves the provider from `config` and computes its fingerprint.
    pub fn for_config(config: &Config) -> Result<Self, LLMError> {
        let provider = Provider::from_config(&config.llm)?;
        Ok(Self::for_provider(
            &provider,
            config.generation.prompt_template.as_deref(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute path with `/` separators. Falls back to joining the working
/// directory when the file cannot be canonicalized.
fn normalize_path(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    });
    absolute.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stable_for_same_inputs() {
        let a = ConfigFingerprint::compute("openai", "gpt-4o", None);
        let b = ConfigFingerprint::compute("openai", "gpt-4o", None);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_changes_with_model_or_backend() {
        let base = ConfigFingerprint::compute("openai", "gpt-4o", None);
        assert_ne!(base, ConfigFingerprint::compute("openai", "gpt-4o-mini", None));
        assert_ne!(base, ConfigFingerprint::compute("ollama", "gpt-4o", None));
    }

    #[test]
    fn test_changes_with_template_content() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("prompt.txt");

        std::fs::write(&template, "Explain {{path}}").unwrap();
        let first = ConfigFingerprint::compute("openai", "gpt-4o", Some(&template));

        std::fs::write(&template, "Summarize {{path}}").unwrap();
        let second = ConfigFingerprint::compute("openai", "gpt-4o", Some(&template));

        assert_ne!(first, second);
        assert_ne!(first, ConfigFingerprint::compute("openai", "gpt-4o", None));
    }

    #[test]
    fn test_unreadable_template_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.txt");
        let a = ConfigFingerprint::compute("openai", "gpt-4o", Some(&missing));
        let b = ConfigFingerprint::compute("openai", "gpt-4o", Some(&missing));
        assert_eq!(a, b);
    }

    #[test]
    fn test_for_provider_matches_compute() {
        let provider = Provider::default();
        assert_eq!(
            ConfigFingerprint::for_provider(&provider, None),
            ConfigFingerprint::compute("openai", provider.model(), None)
        );
    }
}

//! Layered settings for docent.
//!
//! A run reads exactly one TOML file: `./docent.toml` when present, otherwise
//! `~/.config/docent/config.toml`, otherwise nothing. Missing keys fall back
//! to the values in [`defaults`]. `DOCENT_*` environment variables are applied
//! last and win over both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

mod defaults;

pub use defaults::*;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "docent.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete docent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to document.
    pub source: SourceConfig,

    /// Where documents go.
    pub output: OutputConfig,

    pub cache: CacheConfig,

    /// Backend used by the default producer.
    pub llm: LLMConfig,

    /// Prompting and throttling.
    pub generation: GenerationConfig,
}

impl Config {
    /// Loads the first config file found, or defaults, then applies the environment.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::discover(Path::new(".")) {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file found; using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Config file that [`load`](Self::load) would read when started in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let project = dir.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }

        dirs::config_dir()
            .map(|d| d.join("docent").join("config.toml"))
            .filter(|user| user.is_file())
    }

    /// Reads one TOML file, applies the environment and validates.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded configuration from {}", path.display());

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(provider) = env_value("DOCENT_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        self.llm.model = env_value("DOCENT_LLM_MODEL").or(self.llm.model.take());
        self.llm.base_url = env_value("DOCENT_LLM_BASE_URL").or(self.llm.base_url.take());
        self.llm.api_key = env_value("DOCENT_LLM_API_KEY").or(self.llm.api_key.take());
        if let Some(max_tokens) = env_value("DOCENT_LLM_MAX_TOKENS") {
            self.llm.max_tokens = max_tokens;
        }

        if let Some(dir) = env_value("DOCENT_OUTPUT_DIR") {
            self.output.dir = dir;
        }
        if let Some(file) = env_value("DOCENT_CACHE_FILE") {
            self.cache.file = file;
        }
        if env_value::<String>("DOCENT_NO_CACHE")
            .is_some_and(|flag| matches!(flag.as_str(), "1" | "true" | "yes"))
        {
            self.cache.enabled = false;
        }

        if let Some(delay_ms) = env_value("DOCENT_DELAY_MS") {
            self.generation.delay_ms = delay_ms;
        }
        if let Some(template) = env_value("DOCENT_PROMPT_TEMPLATE") {
            self.generation.prompt_template = Some(template);
        }
    }

    /// Rejects settings under which no run could do anything useful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.source.extensions.is_empty() {
            return invalid("source.extensions must list at least one extension");
        }
        if self.generation.chars_per_token == 0 {
            return invalid("generation.chars_per_token must be greater than zero");
        }
        if self.output.index_file.trim().is_empty() {
            return invalid("output.index_file must not be empty");
        }
        Ok(())
    }

    /// Starter `docent.toml` with every default spelled out.
    pub fn default_config_string() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Parsed environment variable; unset or unparsable values are ignored.
fn env_value<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Source tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directories to walk. Each contributes a subtree named after its base name.
    pub roots: Vec<PathBuf>,

    /// File extensions to document (without leading dot, matched lowercase).
    pub extensions: Vec<String>,

    /// Directories to skip, as a single segment or a root-relative path.
    pub skip_dirs: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            roots: DEFAULT_SOURCE_ROOTS.iter().map(PathBuf::from).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output tree configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving generated documents.
    pub dir: PathBuf,

    /// File name of the root index document.
    pub index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

impl OutputConfig {
    /// Location of the root index inside the output directory.
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index_file)
    }
}

/// Incremental cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every file is processed and no cache file is touched.
    pub enabled: bool,

    /// Location of the JSON cache file.
    pub file: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

/// Backend selection for the default producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider name: "openai", "anthropic", "ollama", or "openrouter".
    pub provider: String,

    /// Backend-specific model identifier.
    pub model: Option<String>,

    /// API root override for OpenAI-protocol backends.
    pub base_url: Option<String>,

    /// Never written back to disk; prefer the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Response token cap.
    pub max_tokens: u32,

    /// `anthropic-version` header; ignored by other backends.
    pub api_version: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_version: Some(DEFAULT_ANTHROPIC_API_VERSION.to_string()),
        }
    }
}

impl LLMConfig {
    /// Configured model, or the provider's default model.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_MODEL.to_string(),
            "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
            _ => DEFAULT_OPENAI_MODEL.to_string(),
        })
    }

    /// Configured key, then `DOCENT_LLM_API_KEY`, then the provider's own variable.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("DOCENT_LLM_API_KEY").ok())
            .or_else(|| match self.provider.as_str() {
                "anthropic" | "claude" => std::env::var("ANTHROPIC_API_KEY").ok(),
                "openrouter" => std::env::var("OPENROUTER_API_KEY").ok(),
                "ollama" => None,
                _ => std::env::var("OPENAI_API_KEY").ok(),
            })
    }
}

/// Document generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Custom prompt template file. The built-in template is used when unset.
    pub prompt_template: Option<PathBuf>,

    /// Pause after each producer call, in milliseconds.
    pub delay_ms: u64,

    /// Input budget per file, in estimated tokens.
    pub max_input_tokens: usize,

    /// Characters per token for the input size estimate.
    pub chars_per_token: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt_template: None,
            delay_ms: DEFAULT_DELAY_MS,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl GenerationConfig {
    /// Maximum number of content characters sent to the producer.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_tokens.saturating_mul(self.chars_per_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[cache]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[generation]"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[source]
roots = ["app", "routes"]
extensions = ["php"]

[cache]
enabled = false

[llm]
provider = "ollama"
model = "llama3"

[generation]
delay_ms = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.roots, vec![PathBuf::from("app"), PathBuf::from("routes")]);
        assert_eq!(config.source.extensions, vec!["php".to_string()]);
        assert!(!config.cache.enabled);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, Some("llama3".to_string()));
        assert_eq!(config.generation.delay_ms, 0);
        // Untouched sections keep their defaults
        assert_eq!(config.output.index_file, DEFAULT_INDEX_FILE);
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = Config::default();
        config.source.extensions.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_max_input_chars() {
        let generation = GenerationConfig {
            max_input_tokens: 10,
            chars_per_token: 4,
            ..Default::default()
        };
        assert_eq!(generation.max_input_chars(), 40);
    }

    #[test]
    fn test_model_or_default() {
        let mut config = LLMConfig {
            provider: "anthropic".to_string(),
            ..Default::default()
        };
        assert_eq!(config.model_or_default(), DEFAULT_ANTHROPIC_MODEL);

        config.provider = "ollama".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_OLLAMA_MODEL);

        config.provider = "openai".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_OPENAI_MODEL);

        config.model = Some("custom-model".to_string());
        assert_eq!(config.model_or_default(), "custom-model");
    }
}

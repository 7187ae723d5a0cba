//! Default values for docent configuration.
//!
//! Anything a config file may leave out resolves to a constant here.

// source

/// Default source roots, relative to the working directory.
pub const DEFAULT_SOURCE_ROOTS: &[&str] = &["src"];

/// Default file extensions eligible for documentation (lowercase, no dot).
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // PHP
    "php",
    // Rust
    "rs",
    // web
    "js", "ts", "jsx", "tsx", "mjs", "cjs", "vue",
    // Python
    "py",
    // Go
    "go",
    // JVM
    "java", "kt",
    // C/C++
    "c", "h", "cpp", "hpp",
    // C#
    "cs",
    // Ruby
    "rb",
    // Swift
    "swift",
];

/// Default directories skipped while walking source roots.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    // Dependencies
    "node_modules",
    "vendor",
    "venv",
    "__pycache__",
    // Build outputs
    "target",
    "build",
    "dist",
    // Framework caches and storage
    "storage",
    "bootstrap/cache",
    "public/build",
    // Test fixtures
    "coverage",
];

// output

/// Default output directory for generated documents.
pub const DEFAULT_OUTPUT_DIR: &str = "docs/generated";

/// Extension of generated documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Default file name of the root index document.
pub const DEFAULT_INDEX_FILE: &str = "index.md";

/// Heading of the root index document.
pub const INDEX_TITLE: &str = "Documentation Index";

// cache

/// Default cache file location.
pub const DEFAULT_CACHE_FILE: &str = ".docent/cache.json";

/// Reserved cache key holding the configuration fingerprint.
pub const CONFIG_FINGERPRINT_KEY: &str = "__config_fingerprint__";

/// Template digest used when the prompt template cannot be read.
pub const UNREADABLE_TEMPLATE_SENTINEL: &str = "unreadable";

// llm

/// Provider used when `[llm] provider` is absent.
pub const DEFAULT_LLM_PROVIDER: &str = "openai";

/// Response token cap passed to every backend.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// OpenAI API root.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Model used for `openai` when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Anthropic Messages endpoint.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
/// Model used for `anthropic` when none is configured.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// `anthropic-version` header value.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Local Ollama server speaking the OpenAI protocol.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
/// Model used for `ollama` when none is configured.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// OpenRouter API root.
pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1";

// generation

/// Pause between producer calls, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Input budget per file, in estimated tokens.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 12_000;

/// Characters per token used for the input size estimate.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Marker appended to truncated file content.
pub const TRUNCATION_MARKER: &str = "\n\n... [content truncated]";

// prompts

/// Built-in system prompt for documentation generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a senior engineer writing concise, accurate documentation for a colleague who is new to this codebase.";

/// Built-in user prompt template.
///
/// Placeholders: `{{path}}`, `{{context}}`, `{{content}}`.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"Explain the following source file.

Describe its purpose, its main types and functions, how it fits into the wider application, and anything surprising a maintainer should know. Use Markdown with short sections. Do not repeat the code verbatim.

## File

{{path}}

## Structural Context

{{context}}

## Source

```
{{content}}
```"#;

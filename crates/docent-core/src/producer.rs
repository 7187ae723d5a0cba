//! Content producers turn one source file into documentation text.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{DEFAULT_PROMPT_TEMPLATE, DEFAULT_SYSTEM_PROMPT};
use crate::context::SourceContext;
use crate::llm::{LLMError, LLM};

/// Errors a producer reports for a single file.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),

    #[error("Failed to read prompt template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Generates documentation for a single source file.
///
/// A failure never aborts a run: the engine writes an error document instead
/// and does not cache the file.
#[async_trait]
pub trait ContentProducer: Send + Sync {
    async fn produce(
        &self,
        path: &Path,
        content: &str,
        context: &SourceContext,
    ) -> Result<String, ProducerError>;
}

#[async_trait]
impl<P: ContentProducer + ?Sized> ContentProducer for Box<P> {
    async fn produce(
        &self,
        path: &Path,
        content: &str,
        context: &SourceContext,
    ) -> Result<String, ProducerError> {
        (**self).produce(path, content, context).await
    }
}

/// Where the user prompt comes from.
#[derive(Debug, Clone)]
pub enum PromptTemplate {
    Builtin,
    /// Re-read on every call, so a missing file fails per document rather than per run.
    File(PathBuf),
}

impl PromptTemplate {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => PromptTemplate::File(p.to_path_buf()),
            None => PromptTemplate::Builtin,
        }
    }

    /// Renders the prompt, substituting `{{path}}`, `{{context}}` and `{{content}}`.
    pub fn render(
        &self,
        path: &Path,
        content: &str,
        context: &SourceContext,
    ) -> Result<String, ProducerError> {
        let template = match self {
            PromptTemplate::Builtin => DEFAULT_PROMPT_TEMPLATE.to_string(),
            PromptTemplate::File(file) => {
                std::fs::read_to_string(file).map_err(|source| ProducerError::Template {
                    path: file.clone(),
                    source,
                })?
            }
        };

        // Content goes last so placeholders inside the source are left alone
        Ok(template
            .replace("{{path}}", &path.display().to_string())
            .replace("{{context}}", &context.to_prompt_string())
            .replace("{{content}}", content))
    }
}

/// Producer backed by an [`LLM`] client.
pub struct LlmProducer<L: LLM> {
    llm: L,
    template: PromptTemplate,
    system_prompt: String,
}

impl<L: LLM> LlmProducer<L> {
    /// Creates a producer using the built-in prompt.
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            template: PromptTemplate::Builtin,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Sets the user prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

#[async_trait]
impl<L: LLM> ContentProducer for LlmProducer<L> {
    async fn produce(
        &self,
        path: &Path,
        content: &str,
        context: &SourceContext,
    ) -> Result<String, ProducerError> {
        let prompt = self.template.render(path, content, context)?;
        Ok(self
            .llm
            .complete_with_system(&self.system_prompt, &prompt)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct EchoLlm {
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LLM for EchoLlm {
        async fn complete_with_system(
            &self,
            system: &str,
            prompt: &str,
        ) -> Result<String, LLMError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok("explained".to_string())
        }
    }

    fn echo() -> EchoLlm {
        EchoLlm {
            prompts: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_builtin_template_substitutes_placeholders() {
        let rendered = PromptTemplate::Builtin
            .render(Path::new("app/User.php"), "<?php echo 1;", &SourceContext::default())
            .unwrap();
        assert!(rendered.contains("app/User.php"));
        assert!(rendered.contains("<?php echo 1;"));
        assert!(rendered.contains("(none detected)"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_placeholders_inside_content_survive() {
        let rendered = PromptTemplate::Builtin
            .render(Path::new("t.js"), "const s = '{{path}}';", &SourceContext::default())
            .unwrap();
        assert!(rendered.contains("const s = '{{path}}';"));
    }

    #[test]
    fn test_missing_template_file_is_error() {
        let temp = TempDir::new().unwrap();
        let template = PromptTemplate::File(temp.path().join("missing.txt"));
        let result = template.render(Path::new("a.rs"), "", &SourceContext::default());
        assert!(matches!(result, Err(ProducerError::Template { .. })));
    }

    #[tokio::test]
    async fn test_llm_producer_uses_custom_template() {
        let temp = TempDir::new().unwrap();
        let template_path = temp.path().join("prompt.txt");
        std::fs::write(&template_path, "Document {{path}}:\n{{content}}").unwrap();

        let producer = LlmProducer::new(echo())
            .with_template(PromptTemplate::File(template_path))
            .with_system_prompt("sys");
        let text = producer
            .produce(Path::new("lib.rs"), "fn main() {}", &SourceContext::default())
            .await
            .unwrap();

        assert_eq!(text, "explained");
        let prompts = producer.llm.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "sys");
        assert_eq!(prompts[0].1, "Document lib.rs:\nfn main() {}");
    }
}

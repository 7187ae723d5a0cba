//! Per-file orchestration: decide, produce, write, record.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

use super::cache::CacheRecord;
use super::detector::{ChangeDetector, Decision, SkipReason};
use super::digest::file_hash;
use super::error::EngineError;
use super::index::IndexBuilder;
use super::layout::OutputLayout;
use super::walker::SourceFile;
use crate::config::TRUNCATION_MARKER;
use crate::context::{ApplicationContext, ContextExtractor};
use crate::producer::ContentProducer;

/// Terminal state of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Skipped(SkipReason),
    /// Producer succeeded; document written and hash recorded.
    Written,
    /// Producer failed; an error document was written and nothing cached.
    ErrorWritten,
}

/// Source paths seen during the current run.
#[derive(Debug, Default)]
pub struct EncounteredSet(HashSet<PathBuf>);

impl EncounteredSet {
    pub fn insert(&mut self, path: &Path) {
        self.0.insert(path.to_path_buf());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}

/// Mutable state threaded through the walk of one run.
#[derive(Debug)]
pub struct RunState {
    pub record: CacheRecord,
    pub encountered: EncounteredSet,
    pub app_context: ApplicationContext,
    pub detector: ChangeDetector,
    pub cache_enabled: bool,
}

impl RunState {
    pub fn new(record: CacheRecord, detector: ChangeDetector, cache_enabled: bool) -> Self {
        Self {
            record,
            encountered: EncounteredSet::default(),
            app_context: ApplicationContext::new(),
            detector,
            cache_enabled,
        }
    }
}

/// File content as handed to the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Text(String),
    /// The file could not be read; carries the placeholder sent instead.
    Unreadable(String),
}

impl ReadOutcome {
    pub fn read(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => ReadOutcome::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => ReadOutcome::Unreadable(format!("[Error reading file: {}]", e)),
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ReadOutcome::Text(text) | ReadOutcome::Unreadable(text) => text,
        }
    }
}

/// Writes one document per eligible source file.
pub struct DocumentWriter<'a, P, X> {
    producer: &'a P,
    extractor: &'a X,
    layout: &'a OutputLayout,
    index: &'a IndexBuilder,
    max_input_chars: usize,
    delay: Duration,
}

impl<'a, P, X> DocumentWriter<'a, P, X>
where
    P: ContentProducer,
    X: ContextExtractor,
{
    pub fn new(
        producer: &'a P,
        extractor: &'a X,
        layout: &'a OutputLayout,
        index: &'a IndexBuilder,
    ) -> Self {
        Self {
            producer,
            extractor,
            layout,
            index,
            max_input_chars: usize::MAX,
            delay: Duration::ZERO,
        }
    }

    /// Content beyond this many characters is truncated before the producer call.
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Pause after every producer call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs one file through skip check, production and write.
    ///
    /// Only failures to write into the output directory are returned as errors.
    pub async fn process(
        &self,
        file: &SourceFile,
        state: &mut RunState,
    ) -> Result<FileOutcome, EngineError> {
        // Skipped files still exist, so they must never be reaped
        state.encountered.insert(&file.absolute);

        let target = self.layout.document_path(file);
        if target.exists() {
            info!("Skipping {} (document exists)", file);
            if state.cache_enabled && !state.record.contains(&file.absolute) {
                match file_hash(&file.absolute) {
                    Ok(hash) => state.record.insert(&file.absolute, hash),
                    Err(e) => warn!("Failed to hash {}: {}", file, e),
                }
            }
            return Ok(FileOutcome::Skipped(SkipReason::OutputExists));
        }

        let current = if state.detector.needs_hash() {
            file_hash(&file.absolute).ok()
        } else {
            None
        };
        let decision =
            state
                .detector
                .decide(false, state.record.get(&file.absolute), current.as_deref());

        let reason = match decision {
            Decision::Skip(reason) => {
                info!("Skipping {} ({})", file, decision);
                return Ok(FileOutcome::Skipped(reason));
            }
            Decision::Process(reason) => reason,
        };
        info!("Processing {} ({})", file, decision);

        let content = match ReadOutcome::read(&file.absolute) {
            ReadOutcome::Unreadable(placeholder) => {
                warn!("Failed to read {}", file);
                placeholder
            }
            text => text.into_string(),
        };
        let content = truncate(content, self.max_input_chars);

        let mut context = self.extractor.extract(&file.absolute, &content);
        state
            .app_context
            .relate(&file.absolute, &content, &mut context);
        state.app_context.observe(&file.absolute, &context);

        info!("Generating documentation for {}", file);
        let produced = self
            .producer
            .produce(&file.display_path(), &content, &context)
            .await;

        let (body, outcome) = match produced {
            Ok(text) => (strip_reasoning(&text), FileOutcome::Written),
            Err(e) => {
                warn!("Failed to generate documentation for {}: {}", file, e);
                (
                    format!("**Error generating documentation:** {}\n", e),
                    FileOutcome::ErrorWritten,
                )
            }
        };

        write_document(&target, file, &body)?;

        // Hash after the write; the source may have changed during the producer call
        if outcome == FileOutcome::Written && state.cache_enabled {
            match file_hash(&file.absolute) {
                Ok(hash) => state.record.insert(&file.absolute, hash),
                Err(e) => warn!("Failed to hash {} after writing: {}", file, e),
            }
        }

        self.index.refresh()?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::debug!("Finished {} ({:?})", file, reason);
        Ok(outcome)
    }
}

/// Writes the document header and body, creating parent directories.
fn write_document(target: &Path, file: &SourceFile, body: &str) -> Result<(), EngineError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }

    let document = format!(
        "# {}\n\n> Source: `{}`\n\n{}\n",
        file.file_name(),
        file.display_path().to_string_lossy().replace('\\', "/"),
        body.trim_end()
    );
    fs::write(target, document).map_err(|e| EngineError::io(target, e))
}

/// Cuts `content` to at most `max_chars` characters, appending a marker when cut.
pub fn truncate(content: String, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            let mut truncated = content[..byte_index].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => content,
    }
}

fn reasoning_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?is)<(?:think|thinking|reasoning)>.*?</(?:think|thinking|reasoning)>")
                .ok()
        })
        .as_ref()
}

/// Removes reasoning blocks some models emit before their answer.
pub fn strip_reasoning(text: &str) -> String {
    let stripped = match reasoning_pattern() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };

    // A closing tag without an opener means everything before it was reasoning
    let stripped = ["</think>", "</thinking>", "</reasoning>"]
        .iter()
        .filter_map(|tag| stripped.rfind(tag).map(|i| i + tag.len()))
        .max()
        .map(|end| stripped[end..].to_string())
        .unwrap_or(stripped);

    stripped.trim().to_string()
}

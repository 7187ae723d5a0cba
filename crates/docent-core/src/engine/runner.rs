//! Top-level run orchestration.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use super::cache::{CacheRecord, CacheStore};
use super::detector::{ChangeDetector, Decision};
use super::digest::file_hash;
use super::error::EngineError;
use super::fingerprint::ConfigFingerprint;
use super::index::IndexBuilder;
use super::layout::OutputLayout;
use super::policy::PathPolicy;
use super::reaper::OrphanReaper;
use super::walker::{FileWalker, SourceFile, SourceRoot};
use super::writer::{DocumentWriter, FileOutcome, RunState};
use crate::config::{Config, DEFAULT_EXTENSIONS, DEFAULT_SKIP_DIRS};
use crate::context::{ContextExtractor, HeuristicExtractor};
use crate::llm::LLMError;
use crate::producer::ContentProducer;

/// Counts reported by [`Engine::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: usize,
    pub errors: usize,
    pub skipped: usize,
    /// Orphan documents actually deleted.
    pub orphans_removed: usize,
    /// Configured roots that do not exist.
    pub missing_roots: Vec<PathBuf>,
    /// Whether the configuration fingerprint differed from the cached one.
    pub config_changed: bool,
    /// Documents listed in the final index.
    pub indexed: usize,
}

impl RunSummary {
    /// Files sent to the producer, successful or not.
    pub fn processed(&self) -> usize {
        self.written + self.errors
    }
}

/// Dry-run result of [`Engine::plan`].
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub files: Vec<(SourceFile, Decision)>,
    /// Cached sources that no longer exist.
    pub orphans: Vec<PathBuf>,
    pub missing_roots: Vec<PathBuf>,
    pub config_changed: bool,
}

impl StatusReport {
    pub fn pending(&self) -> usize {
        self.files.iter().filter(|(_, d)| !d.is_skip()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files.len() - self.pending()
    }
}

/// Result of [`Engine::seed_cache`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Sources whose existing document was adopted.
    pub seeded: usize,
    /// Eligible sources without a document.
    pub undocumented: usize,
    pub missing_roots: Vec<PathBuf>,
}

/// Incremental documentation engine.
///
/// Walks every source root, produces a document for each file that needs one,
/// deletes documents of vanished sources and keeps the root index current.
pub struct Engine<P, X = HeuristicExtractor> {
    producer: P,
    extractor: X,
    roots: Vec<PathBuf>,
    walker: FileWalker,
    layout: OutputLayout,
    index: IndexBuilder,
    cache: CacheStore,
    fingerprint: ConfigFingerprint,
    max_input_chars: usize,
    delay: Duration,
}

impl<P: ContentProducer> Engine<P> {
    /// Creates an engine with the default path policy and no throttling.
    pub fn new(
        producer: P,
        roots: Vec<PathBuf>,
        layout: OutputLayout,
        cache: CacheStore,
        fingerprint: ConfigFingerprint,
    ) -> Self {
        Self {
            producer,
            extractor: HeuristicExtractor::new(),
            roots,
            walker: FileWalker::new(PathPolicy::new(
                DEFAULT_EXTENSIONS.iter().copied(),
                DEFAULT_SKIP_DIRS.iter().copied(),
            )),
            index: IndexBuilder::new(layout.clone()),
            layout,
            cache,
            fingerprint,
            max_input_chars: usize::MAX,
            delay: Duration::ZERO,
        }
    }

    /// Builds an engine from configuration.
    ///
    /// Fails only when the configured LLM provider is unknown, since the
    /// fingerprint depends on it.
    pub fn from_config(config: &Config, producer: P) -> Result<Self, LLMError> {
        let fingerprint = ConfigFingerprint::for_config(config)?;
        Ok(Self::new(
            producer,
            config.source.roots.clone(),
            OutputLayout::from_config(&config.output),
            CacheStore::from_config(&config.cache),
            fingerprint,
        )
        .with_policy(PathPolicy::from_config(&config.source))
        .with_max_input_chars(config.generation.max_input_chars())
        .with_delay(Duration::from_millis(config.generation.delay_ms)))
    }
}

impl<P, X> Engine<P, X>
where
    P: ContentProducer,
    X: ContextExtractor,
{
    /// Replaces the context extractor.
    pub fn with_extractor<Y: ContextExtractor>(self, extractor: Y) -> Engine<P, Y> {
        Engine {
            producer: self.producer,
            extractor,
            roots: self.roots,
            walker: self.walker,
            layout: self.layout,
            index: self.index,
            cache: self.cache,
            fingerprint: self.fingerprint,
            max_input_chars: self.max_input_chars,
            delay: self.delay,
        }
    }

    pub fn with_policy(mut self, policy: PathPolicy) -> Self {
        self.walker = FileWalker::new(policy);
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn fingerprint(&self) -> &ConfigFingerprint {
        &self.fingerprint
    }

    /// Resolves configured roots, warning about each missing one.
    fn resolve_roots(&self) -> (Vec<SourceRoot>, Vec<PathBuf>) {
        let mut resolved = Vec::new();
        let mut missing = Vec::new();

        for path in &self.roots {
            match SourceRoot::resolve(path) {
                Some(root) => resolved.push(root),
                None => {
                    warn!("Source root not found: {}", path.display());
                    missing.push(path.clone());
                }
            }
        }

        (resolved, missing)
    }

    fn fingerprint_matches(&self, record: &CacheRecord) -> bool {
        record.config_fingerprint == self.fingerprint.as_str()
    }

    /// Runs one full incremental generation pass.
    pub async fn generate(&self) -> Result<RunSummary, EngineError> {
        let cache_enabled = self.cache.is_enabled();
        let mut record = self.cache.load();
        let mut summary = RunSummary::default();

        let mismatch = cache_enabled && !self.fingerprint_matches(&record);
        if mismatch {
            summary.config_changed = !record.config_fingerprint.is_empty();
            if summary.config_changed {
                info!("Configuration changed; regenerating every file without a document");
            }
            record.file_hashes.clear();
            record.config_fingerprint = self.fingerprint.as_str().to_string();
            if let Err(e) = self.cache.save(&record) {
                warn!("Failed to save cache {}: {}", self.cache.path().display(), e);
            }
        }

        let detector = ChangeDetector::new(cache_enabled, mismatch, !mismatch);
        let mut state = RunState::new(record, detector, cache_enabled);

        let (roots, missing) = self.resolve_roots();
        summary.missing_roots = missing;

        let writer = DocumentWriter::new(&self.producer, &self.extractor, &self.layout, &self.index)
            .with_max_input_chars(self.max_input_chars)
            .with_delay(self.delay);

        for root in &roots {
            for file in self.walker.walk(root) {
                match writer.process(&file, &mut state).await? {
                    FileOutcome::Skipped(_) => summary.skipped += 1,
                    FileOutcome::Written => summary.written += 1,
                    FileOutcome::ErrorWritten => summary.errors += 1,
                }
            }
        }

        if cache_enabled {
            summary.orphans_removed =
                OrphanReaper::new(&self.layout, &roots).reap(&mut state.record, &state.encountered);
        }

        summary.indexed = self.index.refresh()?;

        if let Err(e) = self.cache.save(&state.record) {
            warn!("Failed to save cache {}: {}", self.cache.path().display(), e);
        }

        info!(
            "Documentation complete: {} written, {} failed, {} skipped, {} orphans removed",
            summary.written, summary.errors, summary.skipped, summary.orphans_removed
        );
        Ok(summary)
    }

    /// Reports what [`generate`](Self::generate) would do without calling the
    /// producer or writing anything.
    pub fn plan(&self) -> StatusReport {
        let cache_enabled = self.cache.is_enabled();
        let record = self.cache.load();
        let mismatch = cache_enabled && !self.fingerprint_matches(&record);
        let detector = ChangeDetector::new(cache_enabled, mismatch, !mismatch);

        let (roots, missing) = self.resolve_roots();
        let mut report = StatusReport {
            missing_roots: missing,
            config_changed: mismatch && !record.config_fingerprint.is_empty(),
            ..Default::default()
        };

        let mut seen = std::collections::HashSet::new();
        for root in &roots {
            for file in self.walker.walk(root) {
                let output_exists = self.layout.document_path(&file).exists();
                let current = if !output_exists && detector.needs_hash() {
                    file_hash(&file.absolute).ok()
                } else {
                    None
                };
                let decision =
                    detector.decide(output_exists, record.get(&file.absolute), current.as_deref());
                seen.insert(file.absolute.clone());
                report.files.push((file, decision));
            }
        }

        if cache_enabled && !mismatch {
            report.orphans = record
                .paths()
                .into_iter()
                .filter(|path| !seen.contains(path))
                .collect();
        }

        report
    }

    /// Records the current hash of every source whose document already
    /// exists, under the current fingerprint.
    ///
    /// Lets an existing output tree be adopted without regenerating it.
    pub fn seed_cache(&self) -> Result<SeedReport, EngineError> {
        if !self.cache.is_enabled() {
            return Err(EngineError::CacheDisabled);
        }

        let mut record = self.cache.load();
        if !self.fingerprint_matches(&record) {
            record.file_hashes.clear();
            record.config_fingerprint = self.fingerprint.as_str().to_string();
        }

        let (roots, missing) = self.resolve_roots();
        let mut report = SeedReport {
            missing_roots: missing,
            ..Default::default()
        };

        for root in &roots {
            for file in self.walker.walk(root) {
                if !self.layout.document_path(&file).exists() {
                    report.undocumented += 1;
                    continue;
                }
                match file_hash(&file.absolute) {
                    Ok(hash) => {
                        record.insert(&file.absolute, hash);
                        report.seeded += 1;
                    }
                    Err(e) => warn!("Failed to hash {}: {}", file, e),
                }
            }
        }

        self.cache.save(&record)?;
        info!(
            "Seeded cache with {} files ({} without documents)",
            report.seeded, report.undocumented
        );
        Ok(report)
    }

    /// Rewrites the index document only. Returns the number of documents listed.
    pub fn rebuild_index(&self) -> Result<usize, EngineError> {
        let count = self.index.refresh()?;
        info!("Indexed {} documents at {}", count, self.index.index_path().display());
        Ok(count)
    }
}

//! Incremental documentation engine.
//!
//! One [`Engine::generate`] run walks every source root, asks the
//! [`ChangeDetector`] whether each file needs a document, hands the ones that
//! do to a [`ContentProducer`](crate::producer::ContentProducer), deletes
//! documents whose sources disappeared and rewrites the root index.
//!
//! # Example
//!
//! ```ignore
//! use docent_core::{Config, Engine, LlmProducer, Provider};
//!
//! let config = Config::load()?;
//! let llm = Provider::from_config(&config.llm)?.build()?;
//! let engine = Engine::from_config(&config, LlmProducer::new(llm))?;
//! let summary = engine.generate().await?;
//! println!("{} documents written", summary.written);
//! ```

mod cache;
mod detector;
mod digest;
mod error;
mod fingerprint;
mod index;
mod layout;
mod policy;
mod reaper;
mod runner;
mod walker;
mod writer;

pub use cache::{CacheRecord, CacheStore};
pub use detector::{ChangeDetector, Decision, ProcessReason, SkipReason};
pub use digest::{content_hash, file_hash};
pub use error::{CacheError, EngineError};
pub use fingerprint::ConfigFingerprint;
pub use index::{document_title, IndexBuilder, IndexEntry, IndexTree};
pub use layout::OutputLayout;
pub use policy::PathPolicy;
pub use reaper::OrphanReaper;
pub use runner::{Engine, RunSummary, SeedReport, StatusReport};
pub use walker::{FileWalker, SourceFile, SourceRoot};
pub use writer::{
    strip_reasoning, truncate, DocumentWriter, EncounteredSet, FileOutcome, ReadOutcome, RunState,
};

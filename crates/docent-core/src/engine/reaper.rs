//! Removal of documents whose source files are gone.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::cache::CacheRecord;
use super::layout::OutputLayout;
use super::walker::SourceRoot;
use super::writer::EncounteredSet;

/// Deletes documents for cached sources that were not encountered this run.
pub struct OrphanReaper<'a> {
    layout: &'a OutputLayout,
    roots: &'a [SourceRoot],
}

impl<'a> OrphanReaper<'a> {
    pub fn new(layout: &'a OutputLayout, roots: &'a [SourceRoot]) -> Self {
        Self { layout, roots }
    }

    /// Drops every cache key missing from `encountered` and deletes its document.
    ///
    /// Sources under a resolved root map to their document directly. Sources
    /// whose root is gone are matched against the subtrees already present in
    /// the output directory. A document that a source seen this run maps to is
    /// never deleted. Returns the number of documents deleted.
    pub fn reap(&self, record: &mut CacheRecord, encountered: &EncounteredSet) -> usize {
        let orphans: Vec<_> = record
            .paths()
            .into_iter()
            .filter(|path| !encountered.contains(path))
            .collect();
        if orphans.is_empty() {
            return 0;
        }

        let live: HashSet<PathBuf> = encountered
            .iter()
            .filter_map(|source| self.layout.locate(source, self.roots))
            .collect();

        let mut deleted = 0;
        for source in &orphans {
            let document = self
                .layout
                .locate(source, self.roots)
                .or_else(|| self.layout.find_detached(source))
                .filter(|document| !live.contains(document));
            if let Some(document) = document {
                if delete(&document) {
                    deleted += 1;
                }
            }
            record.remove(source);
        }

        deleted
    }
}

fn delete(document: &Path) -> bool {
    match fs::remove_file(document) {
        Ok(()) => {
            info!("Deleting orphan {}", document.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to delete {}: {}", document.display(), e);
            false
        }
    }
}

//! Skip-or-process decisions.

use std::fmt;

/// Why a file is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The output document already exists. Existing documents are never overwritten.
    OutputExists,
    /// Cached hash matches the current content under the current configuration.
    Unchanged,
}

/// Why a file is sent to the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessReason {
    CacheDisabled,
    ForcedRebuild,
    FingerprintMismatch,
    New,
    Changed,
}

/// Outcome of [`ChangeDetector::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Process(ProcessReason),
}

impl Decision {
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Decision::Skip(SkipReason::OutputExists) => "document exists",
            Decision::Skip(SkipReason::Unchanged) => "unchanged",
            Decision::Process(ProcessReason::CacheDisabled) => "cache disabled",
            Decision::Process(ProcessReason::ForcedRebuild) => "full rebuild",
            Decision::Process(ProcessReason::FingerprintMismatch) => "configuration changed",
            Decision::Process(ProcessReason::New) => "new",
            Decision::Process(ProcessReason::Changed) => "changed",
        };
        f.write_str(text)
    }
}

/// Run-wide inputs to the per-file decision.
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    cache_enabled: bool,
    force_rebuild: bool,
    fingerprint_matches: bool,
}

impl ChangeDetector {
    pub fn new(cache_enabled: bool, force_rebuild: bool, fingerprint_matches: bool) -> Self {
        Self {
            cache_enabled,
            force_rebuild,
            fingerprint_matches,
        }
    }

    /// Whether the decision depends on the current content hash.
    pub fn needs_hash(&self) -> bool {
        self.cache_enabled && !self.force_rebuild && self.fingerprint_matches
    }

    /// Decides for one file.
    ///
    /// `current` is `None` when the file could not be hashed; such a file is
    /// processed so that its document records the read failure.
    pub fn decide(&self, output_exists: bool, stored: Option<&str>, current: Option<&str>) -> Decision {
        if output_exists {
            return Decision::Skip(SkipReason::OutputExists);
        }
        if !self.cache_enabled {
            return Decision::Process(ProcessReason::CacheDisabled);
        }
        if self.force_rebuild {
            return Decision::Process(ProcessReason::ForcedRebuild);
        }
        if !self.fingerprint_matches {
            return Decision::Process(ProcessReason::FingerprintMismatch);
        }

        match (stored, current) {
            (Some(stored), Some(current)) if stored == current => {
                Decision::Skip(SkipReason::Unchanged)
            }
            (Some(_), _) => Decision::Process(ProcessReason::Changed),
            (None, _) => Decision::Process(ProcessReason::New),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_disabled() {
        let detector = ChangeDetector::new(false, false, false);
        assert_eq!(
            detector.decide(false, Some("h"), Some("h")),
            Decision::Process(ProcessReason::CacheDisabled)
        );
        assert_eq!(
            detector.decide(true, None, None),
            Decision::Skip(SkipReason::OutputExists)
        );
        assert!(!detector.needs_hash());
    }

    #[test]
    fn test_forced_rebuild_ignores_hashes() {
        let detector = ChangeDetector::new(true, true, false);
        assert_eq!(
            detector.decide(false, Some("h"), Some("h")),
            Decision::Process(ProcessReason::ForcedRebuild)
        );
        assert!(!detector.needs_hash());
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let detector = ChangeDetector::new(true, false, false);
        assert_eq!(
            detector.decide(false, Some("h"), Some("h")),
            Decision::Process(ProcessReason::FingerprintMismatch)
        );
    }

    #[test]
    fn test_hash_comparison() {
        let detector = ChangeDetector::new(true, false, true);
        assert!(detector.needs_hash());
        assert_eq!(
            detector.decide(false, Some("h"), Some("h")),
            Decision::Skip(SkipReason::Unchanged)
        );
        assert_eq!(
            detector.decide(false, Some("h"), Some("other")),
            Decision::Process(ProcessReason::Changed)
        );
        assert_eq!(
            detector.decide(false, Some("h"), None),
            Decision::Process(ProcessReason::Changed)
        );
        assert_eq!(
            detector.decide(false, None, Some("h")),
            Decision::Process(ProcessReason::New)
        );
    }

    #[test]
    fn test_existing_output_always_wins() {
        for (enabled, force, matches) in [
            (false, false, false),
            (true, true, false),
            (true, false, false),
            (true, false, true),
        ] {
            let detector = ChangeDetector::new(enabled, force, matches);
            assert_eq!(
                detector.decide(true, None, Some("h")),
                Decision::Skip(SkipReason::OutputExists)
            );
        }
    }
}

//! Eligibility rules for source files and directories.

use std::path::{Component, Path};

use crate::config::SourceConfig;

/// Decides which files are documented and which directories are pruned.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    extensions: Vec<String>,
    skip_dirs: Vec<String>,
}

impl PathPolicy {
    /// Creates a policy from an extension allow-list and a skip-directory list.
    ///
    /// Extensions are matched case-insensitively with any leading dot removed.
    /// Skip entries may be a single directory name or a root-relative path.
    pub fn new<E, D>(extensions: E, skip_dirs: D) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            skip_dirs: skip_dirs
                .into_iter()
                .map(|d| normalize_dir(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.extensions, &config.skip_dirs)
    }

    /// Hidden entries start with a dot.
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    /// A file is eligible when it is not hidden and its lowercased extension is allowed.
    pub fn is_eligible_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if Self::is_hidden(name) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }

    /// Checks a directory given by its path relative to the source root.
    ///
    /// Excluded when hidden, when any segment equals a skip entry, or when the
    /// path equals or is nested under a multi-segment skip entry.
    pub fn is_skipped_dir(&self, relative: &Path) -> bool {
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if segments.iter().any(|s| Self::is_hidden(s)) {
            return true;
        }

        let joined = segments.join("/");
        self.skip_dirs.iter().any(|skip| {
            joined == *skip
                || joined.starts_with(&format!("{}/", skip))
                || segments.iter().any(|s| s == skip)
        })
    }
}

/// Normalizes separators and strips leading `./` and surrounding slashes.
fn normalize_dir(dir: &str) -> String {
    let dir = dir.trim().replace('\\', "/");
    let dir = dir.strip_prefix("./").unwrap_or(&dir);
    dir.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PathPolicy {
        PathPolicy::new(["php", ".JS"], ["vendor", "bootstrap/cache/", "./storage"])
    }

    #[test]
    fn test_extension_allow_list_is_case_insensitive() {
        let policy = policy();
        assert!(policy.is_eligible_file(Path::new("app/User.php")));
        assert!(policy.is_eligible_file(Path::new("app/User.PHP")));
        assert!(policy.is_eligible_file(Path::new("resources/app.js")));
        assert!(!policy.is_eligible_file(Path::new("README.md")));
        assert!(!policy.is_eligible_file(Path::new("Makefile")));
    }

    #[test]
    fn test_hidden_files_are_not_eligible() {
        assert!(!policy().is_eligible_file(Path::new("app/.secret.php")));
    }

    #[test]
    fn test_segment_match_anywhere() {
        let policy = policy();
        assert!(policy.is_skipped_dir(Path::new("vendor")));
        assert!(policy.is_skipped_dir(Path::new("modules/vendor")));
        assert!(policy.is_skipped_dir(Path::new("modules/vendor/acme")));
        assert!(!policy.is_skipped_dir(Path::new("vendors")));
    }

    #[test]
    fn test_path_prefix_match() {
        let policy = policy();
        assert!(policy.is_skipped_dir(Path::new("bootstrap/cache")));
        assert!(policy.is_skipped_dir(Path::new("bootstrap/cache/views")));
        assert!(!policy.is_skipped_dir(Path::new("bootstrap")));
        assert!(!policy.is_skipped_dir(Path::new("bootstrap/cached")));
        assert!(policy.is_skipped_dir(Path::new("storage")));
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let policy = policy();
        assert!(policy.is_skipped_dir(Path::new(".git")));
        assert!(policy.is_skipped_dir(Path::new("app/.cache")));
        assert!(!policy.is_skipped_dir(Path::new("app/Http")));
    }

    #[test]
    fn test_normalize_dir() {
        assert_eq!(normalize_dir("./a/b/"), "a/b");
        assert_eq!(normalize_dir("a\\b"), "a/b");
        assert_eq!(normalize_dir("/"), "");
    }
}

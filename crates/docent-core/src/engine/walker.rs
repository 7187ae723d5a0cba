//! Recursive traversal of source roots and of the output tree.

use ignore::WalkBuilder;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use super::policy::PathPolicy;

/// A configured source directory that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    /// Absolute, canonical path.
    pub path: PathBuf,
    /// Base directory name, used as the subtree name in the output directory.
    pub name: String,
}

impl SourceRoot {
    /// Resolves a configured root. Returns `None` when it is not an existing directory.
    pub fn resolve(path: &Path) -> Option<Self> {
        let canonical = path.canonicalize().ok()?;
        if !canonical.is_dir() {
            return None;
        }
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        Some(Self {
            path: canonical,
            name,
        })
    }
}

/// One eligible file found under a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path; this is the cache key.
    pub absolute: PathBuf,
    /// Path relative to the owning root.
    pub relative: PathBuf,
    /// Base name of the owning root.
    pub root_name: String,
}

impl SourceFile {
    /// `root/relative/path.ext`, for logs and prompts.
    pub fn display_path(&self) -> PathBuf {
        Path::new(&self.root_name).join(&self.relative)
    }

    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_path().display())
    }
}

/// Walks directory trees applying a [`PathPolicy`].
#[derive(Debug, Clone)]
pub struct FileWalker {
    policy: Arc<PathPolicy>,
}

impl FileWalker {
    pub fn new(policy: PathPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Collects every eligible file under `dir` in pre-order.
    ///
    /// Only the policy decides eligibility: `.gitignore` and friends are not
    /// consulted. Entries within a directory are visited by file name so runs
    /// are reproducible.
    pub fn files(&self, dir: &Path) -> Vec<PathBuf> {
        let policy = Arc::clone(&self.policy);
        let base = dir.to_path_buf();

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    return true;
                }
                let relative = entry.path().strip_prefix(&base).unwrap_or(entry.path());
                !policy.is_skipped_dir(relative)
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            // Symlinked files are documented; symlinked directories are not entered.
            let is_file = match entry.file_type() {
                Some(t) if t.is_symlink() => entry.path().is_file(),
                Some(t) => t.is_file(),
                None => false,
            };
            if is_file && self.policy.is_eligible_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files
    }

    /// Collects the eligible source files of one root.
    pub fn walk(&self, root: &SourceRoot) -> Vec<SourceFile> {
        self.files(&root.path)
            .into_iter()
            .map(|absolute| {
                let relative = absolute
                    .strip_prefix(&root.path)
                    .unwrap_or(&absolute)
                    .to_path_buf();
                SourceFile {
                    absolute,
                    relative,
                    root_name: root.name.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php").unwrap();
    }

    fn relatives(files: &[SourceFile]) -> Vec<String> {
        let mut names: Vec<String> = files
            .iter()
            .map(|f| f.relative.to_string_lossy().replace('\\', "/"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_walk_applies_policy() {
        let temp = TempDir::new().unwrap();
        let root_dir = temp.path().join("app");
        touch(&root_dir, "User.php");
        touch(&root_dir, "Http/Controllers/UserController.php");
        touch(&root_dir, "Http/notes.txt");
        touch(&root_dir, "vendor/acme/Lib.php");
        touch(&root_dir, "bootstrap/cache/compiled.php");
        touch(&root_dir, "bootstrap/app.php");
        touch(&root_dir, ".hidden/Secret.php");
        touch(&root_dir, ".env.php");

        let root = SourceRoot::resolve(&root_dir).unwrap();
        let walker = FileWalker::new(PathPolicy::new(["php"], ["vendor", "bootstrap/cache"]));
        let files = walker.walk(&root);

        assert_eq!(
            relatives(&files),
            vec![
                "Http/Controllers/UserController.php".to_string(),
                "User.php".to_string(),
                "bootstrap/app.php".to_string(),
            ]
        );
        assert!(files.iter().all(|f| f.root_name == "app"));
        assert!(files.iter().all(|f| f.absolute.is_absolute()));
    }

    #[test]
    fn test_ignore_files_are_not_consulted() {
        let temp = TempDir::new().unwrap();
        let root_dir = temp.path().join("src");
        touch(&root_dir, "Kept.php");
        fs::write(root_dir.join(".gitignore"), "Kept.php\n").unwrap();
        fs::write(root_dir.join(".ignore"), "Kept.php\n").unwrap();

        let root = SourceRoot::resolve(&root_dir).unwrap();
        let files = FileWalker::new(PathPolicy::new(["php"], Vec::<String>::new())).walk(&root);
        assert_eq!(relatives(&files), vec!["Kept.php".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_walked() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("shared");
        touch(&shared, "Helpers.php");
        touch(&shared, "nested/Deep.php");

        let root_dir = temp.path().join("app");
        touch(&root_dir, "User.php");
        std::os::unix::fs::symlink(shared.join("Helpers.php"), root_dir.join("Helpers.php")).unwrap();
        std::os::unix::fs::symlink(shared.join("nested"), root_dir.join("nested")).unwrap();

        let root = SourceRoot::resolve(&root_dir).unwrap();
        let files = FileWalker::new(PathPolicy::new(["php"], Vec::<String>::new())).walk(&root);
        assert_eq!(
            relatives(&files),
            vec!["Helpers.php".to_string(), "User.php".to_string()]
        );
    }

    #[test]
    fn test_resolve_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(SourceRoot::resolve(&temp.path().join("nope")).is_none());

        let file = temp.path().join("file.php");
        fs::write(&file, "").unwrap();
        assert!(SourceRoot::resolve(&file).is_none());
    }

    #[test]
    fn test_display_path_prefixes_root_name() {
        let file = SourceFile {
            absolute: PathBuf::from("/p/app/Models/User.php"),
            relative: PathBuf::from("Models/User.php"),
            root_name: "app".to_string(),
        };
        assert_eq!(file.display_path(), PathBuf::from("app/Models/User.php"));
        assert_eq!(file.file_name(), "User.php");
    }
}

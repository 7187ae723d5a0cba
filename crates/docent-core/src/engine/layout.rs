//! Mapping from source files to their output documents.

use std::path::{Path, PathBuf};

use super::walker::{SourceFile, SourceRoot};
use crate::config::{OutputConfig, DOCUMENT_EXTENSION};

/// Layout of the output tree: `<dir>/<root name>/<relative path>.md` plus one index.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    index_file: String,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            index_file: index_file.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.dir, &config.index_file)
    }

    /// Output directory root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the root index document.
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index_file)
    }

    /// Document path for a walked source file.
    pub fn document_path(&self, file: &SourceFile) -> PathBuf {
        self.document_path_for(&file.root_name, &file.relative)
    }

    /// Document path for a file relative to a root with the given base name.
    pub fn document_path_for(&self, root_name: &str, relative: &Path) -> PathBuf {
        self.dir
            .join(root_name)
            .join(relative)
            .with_extension(DOCUMENT_EXTENSION)
    }

    /// Document path for an absolute source path, if it lies under one of `roots`.
    pub fn locate(&self, source: &Path, roots: &[SourceRoot]) -> Option<PathBuf> {
        roots.iter().find_map(|root| {
            source
                .strip_prefix(&root.path)
                .ok()
                .map(|relative| self.document_path_for(&root.name, relative))
        })
    }

    /// Existing document for a source whose root is no longer resolvable.
    ///
    /// The cache keeps only absolute source paths, so every ancestor of
    /// `source` is tried as the root, outermost first, and the first
    /// candidate present on disk wins.
    pub fn find_detached(&self, source: &Path) -> Option<PathBuf> {
        let ancestors: Vec<&Path> = source.ancestors().skip(1).collect();
        ancestors.into_iter().rev().find_map(|root| {
            let name = root.file_name()?.to_str()?;
            let relative = source.strip_prefix(root).ok()?;
            let document = self.document_path_for(name, relative);
            document.is_file().then_some(document)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> OutputLayout {
        OutputLayout::new("out", "index.md")
    }

    #[test]
    fn test_document_path_mirrors_source() {
        let file = SourceFile {
            absolute: PathBuf::from("/project/app/Http/UserController.php"),
            relative: PathBuf::from("Http/UserController.php"),
            root_name: "app".to_string(),
        };
        assert_eq!(
            layout().document_path(&file),
            PathBuf::from("out/app/Http/UserController.md")
        );
    }

    #[test]
    fn test_only_last_extension_replaced() {
        assert_eq!(
            layout().document_path_for("views", Path::new("home.blade.php")),
            PathBuf::from("out/views/home.blade.md")
        );
    }

    #[test]
    fn test_locate_uses_owning_root() {
        let roots = vec![
            SourceRoot {
                path: PathBuf::from("/project/app"),
                name: "app".to_string(),
            },
            SourceRoot {
                path: PathBuf::from("/project/routes"),
                name: "routes".to_string(),
            },
        ];
        assert_eq!(
            layout().locate(Path::new("/project/routes/web.php"), &roots),
            Some(PathBuf::from("out/routes/web.md"))
        );
        assert_eq!(layout().locate(Path::new("/elsewhere/x.php"), &roots), None);
    }

    #[test]
    fn test_find_detached_matches_existing_subtree() {
        let temp = tempfile::TempDir::new().unwrap();
        let layout = OutputLayout::new(temp.path().join("out"), "index.md");
        std::fs::create_dir_all(temp.path().join("out/legacy/Models")).unwrap();
        std::fs::write(temp.path().join("out/legacy/Models/Old.md"), "# Old.php\n").unwrap();

        assert_eq!(
            layout.find_detached(Path::new("/project/legacy/Models/Old.php")),
            Some(temp.path().join("out/legacy/Models/Old.md"))
        );
        assert_eq!(layout.find_detached(Path::new("/project/legacy/Models/New.php")), None);
    }

    #[test]
    fn test_index_path() {
        assert_eq!(layout().index_path(), PathBuf::from("out/index.md"));
    }
}

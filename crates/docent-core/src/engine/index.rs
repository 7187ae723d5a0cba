//! Root index over every generated document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::error::EngineError;
use super::layout::OutputLayout;
use super::policy::PathPolicy;
use super::walker::FileWalker;
use crate::config::{DOCUMENT_EXTENSION, INDEX_TITLE};

/// One document listed in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub file_name: String,
    pub title: String,
    /// Link relative to the output directory, `/`-separated.
    pub link: String,
}

/// Directory level of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTree {
    pub dirs: BTreeMap<String, IndexTree>,
    pub files: Vec<IndexEntry>,
}

impl IndexTree {
    fn insert(&mut self, dirs: &[String], entry: IndexEntry) {
        match dirs.split_first() {
            Some((first, rest)) => self.dirs.entry(first.clone()).or_default().insert(rest, entry),
            None => self.files.push(entry),
        }
    }

    /// Total number of documents in this subtree.
    pub fn len(&self) -> usize {
        self.files.len() + self.dirs.values().map(IndexTree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);

        for (name, subtree) in &self.dirs {
            out.push_str(&format!("{}- **{}/**\n", indent, name));
            subtree.render_into(depth + 1, out);
        }

        let mut files: Vec<&IndexEntry> = self.files.iter().collect();
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        for file in files {
            out.push_str(&format!(
                "{}- [{}]({})\n",
                indent,
                escape_label(&file.title),
                file.link
            ));
        }
    }

    /// Renders the index document.
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n\n", INDEX_TITLE);
        if self.is_empty() {
            out.push_str("_No documents generated yet._\n");
        } else {
            self.render_into(0, &mut out);
        }
        out
    }
}

/// Rebuilds the index document from a scan of the output directory.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    layout: OutputLayout,
    walker: FileWalker,
}

impl IndexBuilder {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            walker: FileWalker::new(PathPolicy::new([DOCUMENT_EXTENSION], Vec::<String>::new())),
        }
    }

    /// Scans the output tree into an [`IndexTree`].
    pub fn scan(&self) -> IndexTree {
        let root = self.layout.dir();
        let index_path = self.layout.index_path();
        let mut tree = IndexTree::default();

        if !root.is_dir() {
            return tree;
        }

        for path in self.walker.files(root) {
            if path == index_path {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };

            let segments = segments(relative);
            let Some((file_name, dirs)) = segments.split_last() else {
                continue;
            };

            tree.insert(
                dirs,
                IndexEntry {
                    file_name: file_name.clone(),
                    title: document_title(&path),
                    link: link(&segments),
                },
            );
        }

        tree
    }

    /// Overwrites the index document. Returns the number of documents listed.
    pub fn refresh(&self) -> Result<usize, EngineError> {
        let root = self.layout.dir();
        fs::create_dir_all(root).map_err(|e| EngineError::io(root, e))?;

        let tree = self.scan();
        let index_path = self.layout.index_path();
        fs::write(&index_path, tree.render()).map_err(|e| EngineError::io(&index_path, e))?;

        Ok(tree.len())
    }

    pub fn index_path(&self) -> PathBuf {
        self.layout.index_path()
    }
}

fn segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// `/`-joined link with the characters that end a Markdown link target
/// percent-encoded.
fn link(segments: &[String]) -> String {
    let mut out = String::new();
    for c in segments.join("/").chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_label(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// First Markdown heading of the document, or its file stem.
pub fn document_title(path: &Path) -> String {
    let fallback = || {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let Ok(content) = fs::read_to_string(path) else {
        return fallback();
    };

    content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_document_title_falls_back_to_stem() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.md", "intro\n\n## Heading Two\n");
        write(temp.path(), "b.md", "no heading at all\n");
        write(temp.path(), "c.md", "#\n");

        assert_eq!(document_title(&temp.path().join("a.md")), "Heading Two");
        assert_eq!(document_title(&temp.path().join("b.md")), "b");
        assert_eq!(document_title(&temp.path().join("c.md")), "c");
        assert_eq!(document_title(&temp.path().join("missing.md")), "missing");
    }

    #[test]
    fn test_render_orders_dirs_then_files() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        write(&out, "app/Zeta.md", "# Zeta.php\n");
        write(&out, "app/Alpha.md", "# Alpha.php\n");
        write(&out, "app/Http/Kernel.md", "# Kernel.php\n");
        write(&out, "app/Http/Controllers/Home Page.md", "# Home Page.php\n");
        write(&out, "routes/web.md", "# web.php\n");
        write(&out, "notes.txt", "ignored");

        let builder = IndexBuilder::new(OutputLayout::new(&out, "index.md"));
        assert_eq!(builder.refresh().unwrap(), 5);

        let index = fs::read_to_string(out.join("index.md")).unwrap();
        let expected = "\
# Documentation Index

- **app/**
  - **Http/**
    - **Controllers/**
      - [Home Page.php](app/Http/Controllers/Home%20Page.md)
    - [Kernel.php](app/Http/Kernel.md)
  - [Alpha.php](app/Alpha.md)
  - [Zeta.php](app/Zeta.md)
- **routes/**
  - [web.php](routes/web.md)
";
        assert_eq!(index, expected);
    }

    #[test]
    fn test_links_and_titles_are_escaped() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        write(&out, "app/User (old).md", "# User (old).php\n");
        write(&out, "app/[id]/page.md", "# [id] route\n");
        write(&out, "app/100%.md", "# 100%.php\n");

        let builder = IndexBuilder::new(OutputLayout::new(&out, "index.md"));
        builder.refresh().unwrap();

        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("- [User (old).php](app/User%20%28old%29.md)"));
        assert!(index.contains("- [\\[id\\] route](app/%5Bid%5D/page.md)"));
        assert!(index.contains("- [100%.php](app/100%25.md)"));
    }

    #[test]
    fn test_refresh_excludes_index_and_is_stable() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        write(&out, "src/lib.md", "# lib.rs\n");

        let builder = IndexBuilder::new(OutputLayout::new(&out, "index.md"));
        assert_eq!(builder.refresh().unwrap(), 1);
        let first = fs::read_to_string(out.join("index.md")).unwrap();

        assert_eq!(builder.refresh().unwrap(), 1);
        let second = fs::read_to_string(out.join("index.md")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_output_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let builder = IndexBuilder::new(OutputLayout::new(&out, "index.md"));

        assert_eq!(builder.refresh().unwrap(), 0);
        let index = fs::read_to_string(out.join("index.md")).unwrap();
        assert!(index.contains("_No documents generated yet._"));
    }
}

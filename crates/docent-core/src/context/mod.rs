//! Structural hints extracted from source files.
//!
//! The extractor scans file content for imports, class relationships and
//! route declarations. Its output only enriches the producer's prompt; the
//! engine treats it as opaque.
//!
//! [`ApplicationContext`] accumulates hints across the files of one run and
//! is passed explicitly through the walk.

mod extractor;

pub use extractor::HeuristicExtractor;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Pure, total extraction of structural hints from one file.
pub trait ContextExtractor: Send + Sync {
    /// Extracts hints from `content`. Never fails; unknown syntax yields an empty context.
    fn extract(&self, path: &Path, content: &str) -> SourceContext;
}

/// Structural hints for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContext {
    /// Imported modules, namespaces or headers.
    pub imports: Vec<String>,
    /// Declared classes with their parents and interfaces.
    pub classes: Vec<ClassHint>,
    /// Declared routes.
    pub routes: Vec<RouteHint>,
    /// Symbols declared elsewhere in this run that this file references.
    pub related: Vec<RelatedSymbol>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHint {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
}

/// A route declaration such as `Route::get('/users', ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteHint {
    pub method: String,
    pub path: String,
    /// Handler reference when it could be read off the same line.
    pub handler: Option<String>,
}

/// A class known from an earlier file of the same run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSymbol {
    pub name: String,
    pub defined_in: PathBuf,
}

impl SourceContext {
    /// Returns true when no hint was found.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.classes.is_empty()
            && self.routes.is_empty()
            && self.related.is_empty()
    }

    /// Formats the context for inclusion in a prompt.
    pub fn to_prompt_string(&self) -> String {
        if self.is_empty() {
            return "(none detected)".to_string();
        }

        let mut result = String::new();

        if !self.imports.is_empty() {
            result.push_str("Imports:\n");
            for import in &self.imports {
                result.push_str(&format!("- {}\n", import));
            }
        }

        if !self.classes.is_empty() {
            result.push_str("Classes:\n");
            for class in &self.classes {
                result.push_str(&format!("- {}", class.name));
                if let Some(parent) = &class.extends {
                    result.push_str(&format!(" extends {}", parent));
                }
                if !class.implements.is_empty() {
                    result.push_str(&format!(" implements {}", class.implements.join(", ")));
                }
                result.push('\n');
            }
        }

        if !self.routes.is_empty() {
            result.push_str("Routes:\n");
            for route in &self.routes {
                result.push_str(&format!("- {} {}", route.method, route.path));
                if let Some(handler) = &route.handler {
                    result.push_str(&format!(" -> {}", handler));
                }
                result.push('\n');
            }
        }

        if !self.related.is_empty() {
            result.push_str("Related files:\n");
            for symbol in &self.related {
                result.push_str(&format!(
                    "- {} (defined in {})\n",
                    symbol.name,
                    symbol.defined_in.display()
                ));
            }
        }

        result
    }
}

/// Cross-file accumulator of declared classes, threaded through one run.
#[derive(Debug, Default)]
pub struct ApplicationContext {
    classes: BTreeMap<String, PathBuf>,
}

impl ApplicationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the classes declared in `path`.
    pub fn observe(&mut self, path: &Path, context: &SourceContext) {
        for class in &context.classes {
            self.classes
                .entry(class.name.clone())
                .or_insert_with(|| path.to_path_buf());
        }
    }

    /// Fills `context.related` with known classes this file mentions but does not declare.
    pub fn relate(&self, path: &Path, content: &str, context: &mut SourceContext) {
        context.related = self
            .classes
            .iter()
            .filter(|(_, defined_in)| defined_in.as_path() != path)
            .filter(|(name, _)| !context.classes.iter().any(|c| &c.name == *name))
            .filter(|(name, _)| mentions(content, name))
            .map(|(name, defined_in)| RelatedSymbol {
                name: name.clone(),
                defined_in: defined_in.clone(),
            })
            .collect();
    }

    /// Number of distinct classes seen so far.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Whole-identifier occurrence of `name` in `content`.
fn mentions(content: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    content.match_indices(name).any(|(start, _)| {
        let before = content[..start].chars().next_back();
        let after = content[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

//! Regex-based structural hint extraction.

use regex::Regex;
use std::path::Path;

use super::{ClassHint, ContextExtractor, RouteHint, SourceContext};

/// Import statements across the supported languages. Group 1 is the target.
const IMPORT_PATTERNS: &[&str] = &[
    // PHP `use App\Models\User;`, Rust `use crate::x;`
    r"(?m)^\s*use\s+([A-Za-z_\\][\w\\:]*(?:::\{[^}]*\})?)",
    // JS/TS `import x from 'y'` and Python `import x`
    r#"(?m)^\s*import\s+(?:[^'";]*\s+from\s+)?['"]?([\w@./\-]+)['"]?"#,
    // Python `from x import y`
    r"(?m)^\s*from\s+([\w.]+)\s+import\s",
    // CommonJS `require('x')`, PHP `require_once 'x'`
    r#"\brequire(?:_once)?\s*\(?\s*['"]([^'"]+)['"]"#,
    // C/C++ `#include <x>`
    r#"(?m)^\s*#include\s*[<"]([^>"]+)[>"]"#,
];

/// Class declarations. Groups: name, parent, interfaces.
const CLASS_PATTERN: &str =
    r"(?m)^\s*(?:export\s+)?(?:(?:abstract|final|public|default)\s+)*class\s+(\w+)(?:\s+extends\s+([\w\\.]+))?(?:\s+implements\s+([\w\\.,\s]+?))?\s*[{:(]";

/// Route declarations. Groups: method, path, optional handler.
const ROUTE_PATTERNS: &[&str] = &[
    // Laravel `Route::get('/users', [UserController::class, 'index'])`
    r#"Route::(get|post|put|patch|delete|any|match|resource)\s*\(\s*['"]([^'"]+)['"]\s*,\s*\[?\s*([\w\\]+)?"#,
    // Express `router.get('/users', handler)`
    r#"\b(?:app|router)\.(get|post|put|patch|delete|all)\s*\(\s*['"]([^'"]+)['"]\s*,\s*(\w+)?"#,
    // Flask `@app.route('/users')`
    r#"@\w+\.(route|get|post|put|patch|delete)\s*\(\s*['"]([^'"]+)['"]()"#,
];

/// Default [`ContextExtractor`] working on raw text with regular expressions.
pub struct HeuristicExtractor {
    imports: Vec<Regex>,
    class: Option<Regex>,
    routes: Vec<Regex>,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            imports: IMPORT_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            class: Regex::new(CLASS_PATTERN).ok(),
            routes: ROUTE_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    fn extract_imports(&self, content: &str) -> Vec<String> {
        let mut imports: Vec<String> = Vec::new();
        for re in &self.imports {
            for cap in re.captures_iter(content) {
                if let Some(target) = cap.get(1) {
                    let target = target.as_str().trim().to_string();
                    if !target.is_empty() && !imports.contains(&target) {
                        imports.push(target);
                    }
                }
            }
        }
        imports
    }

    fn extract_classes(&self, content: &str) -> Vec<ClassHint> {
        let Some(re) = &self.class else {
            return Vec::new();
        };

        re.captures_iter(content)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().to_string();
                let extends = cap.get(2).map(|m| m.as_str().to_string());
                let implements = cap
                    .get(3)
                    .map(|m| {
                        m.as_str()
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                Some(ClassHint {
                    name,
                    extends,
                    implements,
                })
            })
            .collect()
    }

    fn extract_routes(&self, content: &str) -> Vec<RouteHint> {
        let mut routes = Vec::new();
        for re in &self.routes {
            for cap in re.captures_iter(content) {
                let (Some(method), Some(path)) = (cap.get(1), cap.get(2)) else {
                    continue;
                };
                let method = match method.as_str() {
                    "route" => "ANY".to_string(),
                    m => m.to_uppercase(),
                };
                routes.push(RouteHint {
                    method,
                    path: path.as_str().to_string(),
                    handler: cap
                        .get(3)
                        .map(|m| m.as_str().to_string())
                        .filter(|h| !h.is_empty()),
                });
            }
        }
        routes
    }
}

impl ContextExtractor for HeuristicExtractor {
    fn extract(&self, _path: &Path, content: &str) -> SourceContext {
        SourceContext {
            imports: self.extract_imports(content),
            classes: self.extract_classes(content),
            routes: self.extract_routes(content),
            related: Vec::new(),
        }
    }
}

//! REST endpoint discovery from annotated controller classes.
//!
//! A class is a controller iff it carries the `@RestController` annotation,
//! matched by exact name. Every recognized route annotation on one of its
//! methods yields one `Endpoint`:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//! │ .java files  │──▶│ SourceParser │──▶│ controller │──▶│ route table  │──▶ Endpoint
//! │ (sorted walk)│   │ (SourceTree) │   │   filter   │   │ (routes.rs)  │
//! └──────────────┘   └──────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! Files that cannot be read or parsed are logged and skipped.

mod routes;

use std::path::Path;

use globset::GlobSet;
use serde::{Deserialize, Serialize};

use crate::files;
use crate::parser::{ClassDecl, JavaParser, SourceParser, SourceTree};

pub use routes::{resolve, route_kind, strip_quotes, verb_from_text, HttpMethod, Route, RouteKind, DEFAULT_PATH};

/// Annotation marking a class as a REST controller.
pub const CONTROLLER_ANNOTATION: &str = "RestController";

/// A discovered HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub class_name: String,
    pub method_name: String,
    pub http_method: HttpMethod,
    pub path: String,
}

/// Extract endpoints from a parsed source tree, in declaration order.
pub fn endpoints_from_tree(tree: &SourceTree) -> Vec<Endpoint> {
    tree.classes
        .iter()
        .filter(|c| c.has_annotation(CONTROLLER_ANNOTATION))
        .flat_map(endpoints_from_class)
        .collect()
}

fn endpoints_from_class(class: &ClassDecl) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    for method in &class.methods {
        for annotation in &method.annotations {
            if let Some(route) = resolve(annotation) {
                log::trace!(
                    "{}.{} (line {}): {} {}",
                    class.name,
                    method.name,
                    method.line,
                    route.method,
                    route.path
                );
                endpoints.push(Endpoint {
                    class_name: class.name.clone(),
                    method_name: method.name.clone(),
                    http_method: route.method,
                    path: route.path,
                });
            }
        }
    }
    log::debug!(
        "Found @{} {} at line {} with {} endpoint(s)",
        CONTROLLER_ANNOTATION,
        class.name,
        class.line,
        endpoints.len()
    );
    endpoints
}

/// Walks a repository for source files and extracts their endpoints.
pub struct EndpointExtractor {
    parser: Box<dyn SourceParser>,
    excludes: GlobSet,
}

impl EndpointExtractor {
    /// Create an extractor backed by the tree-sitter Java parser.
    pub fn new() -> Self {
        Self::with_parser(Box::new(JavaParser::new()))
    }

    /// Create an extractor with a custom parser.
    pub fn with_parser(parser: Box<dyn SourceParser>) -> Self {
        Self {
            parser,
            excludes: GlobSet::empty(),
        }
    }

    /// Skip paths matching these globs (relative to the scanned root).
    pub fn excludes(mut self, excludes: GlobSet) -> Self {
        self.excludes = excludes;
        self
    }

    /// Extract endpoints from every source file under `root`.
    ///
    /// Ordering: file discovery order, then class, method and annotation order.
    pub fn extract(&self, root: &Path) -> Vec<Endpoint> {
        let files = files::collect_files(root, self.parser.file_extensions(), &self.excludes);
        log::debug!(
            "Scanning {} {} file(s) under {}",
            files.len(),
            self.parser.language(),
            root.display()
        );

        let mut endpoints = Vec::new();
        for file in &files {
            let source = match std::fs::read(file) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("Failed to read source file {}: {}", file.display(), e);
                    continue;
                }
            };
            match self.parser.parse(file, &source) {
                Ok(tree) => endpoints.extend(endpoints_from_tree(&tree)),
                Err(e) => log::warn!("Failed to parse source file {}: {}", file.display(), e),
            }
        }

        log::info!("Extracted {} endpoint(s) from {}", endpoints.len(), root.display());
        endpoints
    }
}

impl Default for EndpointExtractor {
    fn default() -> Self {
        Self::new()
    }
}

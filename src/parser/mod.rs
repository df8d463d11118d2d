//! Source parsing interface for declaration and annotation extraction.
//!
//! This module provides:
//! - `SourceParser` trait: Abstract interface turning source text into a `SourceTree`
//! - Declaration types: classes, methods and the annotations attached to them
//! - A tree-sitter implementation for Java (`JavaParser`)
//!
//! Endpoint extraction only ever sees a `SourceTree`, never a raw syntax tree,
//! so tests can swap in a fake parser.

use std::path::Path;

use thiserror::Error;

pub mod java;

pub use java::JavaParser;

/// Errors produced while turning source text into a `SourceTree`.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("parser produced no tree for {0}")]
    NoTree(String),
    #[error("syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },
}

/// Arguments attached to an annotation, as written in source.
///
/// Values are kept as raw source text (string literals still quoted).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnnotationArgs {
    /// Marker form: `@Foo`
    #[default]
    None,
    /// Single unnamed value: `@Foo("/x")`
    Single(String),
    /// Named pairs in source order: `@Foo(value = "/x", method = GET)`.
    /// An empty argument list `@Foo()` is `Named` with no pairs.
    Named(Vec<(String, String)>),
}

/// An annotation attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// The annotation name exactly as written (e.g., "GetMapping", "org.x.Foo")
    pub name: String,
    pub args: AnnotationArgs,
}

impl Annotation {
    /// Create a marker annotation without arguments.
    pub fn marker(name: &str) -> Self {
        Self {
            name: name.to_string(),
            args: AnnotationArgs::None,
        }
    }

    /// Create an annotation with a single unnamed value.
    pub fn single(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            args: AnnotationArgs::Single(value.to_string()),
        }
    }

    /// Create an annotation with named attribute pairs.
    pub fn named(name: &str, pairs: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            args: AnnotationArgs::Named(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

/// A method declared directly inside a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
    /// Line number (1-indexed)
    pub line: usize,
}

/// A class-like declaration (class or interface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    /// Annotations in source order.
    pub annotations: Vec<Annotation>,
    /// Directly declared methods in source order.
    pub methods: Vec<MethodDecl>,
    /// Line number (1-indexed)
    pub line: usize,
}

impl ClassDecl {
    /// Check whether the class carries an annotation with exactly this name.
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }
}

/// Declarations found in one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// Class-like declarations in pre-order (outer before nested).
    pub classes: Vec<ClassDecl>,
}

/// Parser collaborator: source text in, declaration tree (or failure) out.
pub trait SourceParser: Send + Sync {
    /// Return the language this parser handles (e.g., "java").
    fn language(&self) -> &str;

    /// File extensions this parser handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a whole file into its declaration tree.
    fn parse(&self, path: &Path, source: &[u8]) -> Result<SourceTree, ParseError>;
}

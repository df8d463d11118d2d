//! Java declaration parser using tree-sitter.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::{Annotation, AnnotationArgs, ClassDecl, MethodDecl, ParseError, SourceParser, SourceTree};

/// Tree-sitter query for finding class-like declarations.
///
/// Captures:
/// - `class`/`interface`: The declaration node
/// - `name`: The declared type name
/// - `body`: The class or interface body
const CLASS_QUERY: &str = r#"
; Class declarations
(class_declaration
  name: (identifier) @name
  body: (class_body) @body
) @class

; Interface declarations
(interface_declaration
  name: (identifier) @name
  body: (interface_body) @body
) @interface
"#;

pub struct JavaParser {
    language: Language,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn extract_classes(&self, root: Node, source: &[u8]) -> Result<Vec<ClassDecl>, ParseError> {
        let query = Query::new(&self.language, CLASS_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        let mut found: Vec<(usize, ClassDecl)> = Vec::new();

        while let Some(m) = matches.next() {
            let mut decl_node = None;
            let mut name = String::new();
            let mut body_node = None;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "class" | "interface" => decl_node = Some(capture.node),
                    "name" => name = node_text(capture.node, source).to_string(),
                    "body" => body_node = Some(capture.node),
                    _ => {}
                }
            }

            if let (Some(node), Some(body)) = (decl_node, body_node) {
                if name.is_empty() {
                    continue;
                }
                found.push((
                    node.start_byte(),
                    ClassDecl {
                        name,
                        annotations: annotations_of(node, source),
                        methods: methods_of(body, source),
                        line: node.start_position().row + 1,
                    },
                ));
            }
        }

        // Pre-order: outer declarations start before the ones nested inside them.
        found.sort_by_key(|(start, _)| *start);
        Ok(found.into_iter().map(|(_, class)| class).collect())
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for JavaParser {
    fn language(&self) -> &str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> Result<SourceTree, ParseError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::NoTree(path.display().to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax {
                path: path.display().to_string(),
                line: first_error_line(root).unwrap_or(1),
            });
        }

        Ok(SourceTree {
            classes: self.extract_classes(root, source)?,
        })
    }
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Locate the first ERROR or MISSING node (1-indexed line).
fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error_line)
}

/// Annotations from the `modifiers` child of a declaration, in source order.
fn annotations_of(decl: Node, source: &[u8]) -> Vec<Annotation> {
    let mut cursor = decl.walk();
    let modifiers = decl.children(&mut cursor).find(|n| n.kind() == "modifiers");

    let modifiers = match modifiers {
        Some(m) => m,
        None => return Vec::new(),
    };

    let mut annotations = Vec::new();
    let mut mod_cursor = modifiers.walk();
    for child in modifiers.named_children(&mut mod_cursor) {
        let args = match child.kind() {
            "marker_annotation" => AnnotationArgs::None,
            "annotation" => annotation_args(child, source),
            _ => continue,
        };
        let name = child
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_default();
        if !name.is_empty() {
            annotations.push(Annotation { name, args });
        }
    }
    annotations
}

fn annotation_args(annotation: Node, source: &[u8]) -> AnnotationArgs {
    let list = match annotation.child_by_field_name("arguments") {
        Some(l) => l,
        None => return AnnotationArgs::Named(Vec::new()),
    };

    let mut cursor = list.walk();
    let items: Vec<Node> = list
        .named_children(&mut cursor)
        .filter(|n| !n.is_extra())
        .collect();

    if items.len() == 1 && items[0].kind() != "element_value_pair" {
        return AnnotationArgs::Single(node_text(items[0], source).to_string());
    }

    let pairs = items
        .iter()
        .filter(|n| n.kind() == "element_value_pair")
        .filter_map(|pair| {
            let key = pair.child_by_field_name("key")?;
            let value = pair.child_by_field_name("value")?;
            Some((
                node_text(key, source).to_string(),
                node_text(value, source).to_string(),
            ))
        })
        .collect();
    AnnotationArgs::Named(pairs)
}

/// Methods declared directly in a class or interface body.
fn methods_of(body: Node, source: &[u8]) -> Vec<MethodDecl> {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|n| n.kind() == "method_declaration")
        .filter_map(|method| {
            let name = node_text(method.child_by_field_name("name")?, source).to_string();
            Some(MethodDecl {
                name,
                annotations: annotations_of(method, source),
                line: method.start_position().row + 1,
            })
        })
        .collect()
}

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::Node;

use super::{
    AstBuilder, ClassDeclaration, Comment, CommentKind, Declaration, ExportDefaultDeclaration,
    ExportNamedDeclaration, ExportSpecifier, ImportDeclaration, ImportKind, ImportSpecifier,
    Program, SourceFile, Statement, SuperClass,
};
use crate::error::{ResolverError, Result};

/// File extensions the tree-sitter builder can parse
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// [`AstBuilder`] backed by the tree-sitter TypeScript grammars.
///
/// Plain JavaScript goes through the TSX grammar so that JSX in `.js` files
/// still parses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterBuilder;

impl TreeSitterBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
            .unwrap_or(false)
    }

    fn language_for(path: &Path) -> tree_sitter::Language {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
            _ => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl AstBuilder for TreeSitterBuilder {
    fn build(&self, source: &str, path: &Path) -> Result<SourceFile> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&Self::language_for(path))
            .map_err(|e| ResolverError::Parse(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ResolverError::Parse(format!("Failed to parse {}", path.display())))?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::warn!("Syntax errors in {}, using partial tree", path.display());
        }

        let mut comments = Vec::new();
        collect_comments(root, source, &mut comments);
        let comment_index: HashMap<usize, usize> = comments
            .iter()
            .enumerate()
            .map(|(i, c)| (c.span.start, i))
            .collect();

        let mut body = Vec::new();
        let mut pending = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "comment" {
                if let Some(&index) = comment_index.get(&child.start_byte()) {
                    pending.push(index);
                }
                continue;
            }
            if !child.is_named() {
                continue;
            }
            body.push(
                Statement::new(declaration(child, source))
                    .with_leading_comments(std::mem::take(&mut pending)),
            );
        }

        Ok(SourceFile::new(path, Program { body }, comments).with_source(source))
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn string_value(node: Node, source: &str) -> String {
    node_text(node, source)
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

fn collect_comments(node: Node, source: &str, out: &mut Vec<Comment>) {
    if node.kind() == "comment" {
        out.push(comment(node, source));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, source, out);
    }
}

fn comment(node: Node, source: &str) -> Comment {
    let text = node_text(node, source);
    let (kind, value) = match text.strip_prefix("/*") {
        Some(inner) => (CommentKind::Block, inner.strip_suffix("*/").unwrap_or(inner)),
        None => (CommentKind::Line, text.strip_prefix("//").unwrap_or(text)),
    };
    Comment {
        kind,
        value: value.to_string(),
        span: node.start_byte()..node.end_byte(),
        line: node.start_position().row as u32 + 1,
    }
}

fn declaration(node: Node, source: &str) -> Declaration {
    match node.kind() {
        "import_statement" => Declaration::Import(import_declaration(node, source)),
        "class_declaration" | "abstract_class_declaration" => {
            Declaration::Class(class_declaration(node, source))
        }
        "export_statement" => export_statement(node, source),
        other => Declaration::Other(other.to_string()),
    }
}

fn import_declaration(node: Node, source: &str) -> ImportDeclaration {
    let module = node
        .child_by_field_name("source")
        .map(|s| string_value(s, source))
        .unwrap_or_default();

    let mut specifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "import_clause" {
            import_clause(child, source, &mut specifiers);
        }
    }

    ImportDeclaration {
        source: module,
        specifiers,
    }
}

fn import_clause(node: Node, source: &str, specifiers: &mut Vec<ImportSpecifier>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => specifiers.push(ImportSpecifier {
                kind: ImportKind::Default,
                local: node_text(child, source).to_string(),
                imported: None,
            }),
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = string_value(name, source);
                    let local = spec
                        .child_by_field_name("alias")
                        .map(|a| node_text(a, source).to_string())
                        .unwrap_or_else(|| imported.clone());
                    specifiers.push(ImportSpecifier {
                        kind: ImportKind::Named,
                        local,
                        imported: Some(imported),
                    });
                }
            }
            "namespace_import" => {
                let mut inner = child.walk();
                let local = child
                    .named_children(&mut inner)
                    .find(|n| n.kind() == "identifier")
                    .map(|n| node_text(n, source).to_string());
                if let Some(local) = local {
                    specifiers.push(ImportSpecifier {
                        kind: ImportKind::Namespace,
                        local,
                        imported: None,
                    });
                }
            }
            _ => {}
        }
    }
}

fn class_declaration(node: Node, source: &str) -> ClassDeclaration {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string());

    let mut cursor = node.walk();
    let heritage = node
        .named_children(&mut cursor)
        .find(|n| n.kind() == "class_heritage");

    let super_class = heritage.and_then(|heritage| {
        let mut cursor = heritage.walk();
        let first = heritage.named_children(&mut cursor).next()?;
        // The TypeScript grammars wrap the expression in an extends_clause
        let value = if first.kind() == "extends_clause" {
            first.child_by_field_name("value")?
        } else if first.kind() == "implements_clause" {
            return None;
        } else {
            first
        };
        let text = node_text(value, source).to_string();
        Some(SuperClass {
            name: (value.kind() == "identifier").then(|| text.clone()),
            text,
        })
    });

    ClassDeclaration { name, super_class }
}

fn export_statement(node: Node, source: &str) -> Declaration {
    let mut cursor = node.walk();
    let is_default = node.children(&mut cursor).any(|c| c.kind() == "default");

    if let Some(inner) = node.child_by_field_name("declaration") {
        return if is_default {
            Declaration::ExportDefault(default_value(inner, source))
        } else {
            Declaration::ExportNamed(ExportNamedDeclaration {
                declaration: Some(Box::new(declaration(inner, source))),
                specifiers: Vec::new(),
                source: None,
            })
        };
    }

    if let Some(value) = node.child_by_field_name("value") {
        return Declaration::ExportDefault(default_value(value, source));
    }

    if is_default {
        return Declaration::ExportDefault(ExportDefaultDeclaration::Other);
    }

    let mut specifiers = Vec::new();
    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        if clause.kind() != "export_clause" {
            continue;
        }
        let mut inner = clause.walk();
        for spec in clause.named_children(&mut inner) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let local = string_value(name, source);
            let exported = spec
                .child_by_field_name("alias")
                .map(|a| string_value(a, source))
                .unwrap_or_else(|| local.clone());
            specifiers.push(ExportSpecifier { local, exported });
        }
    }

    Declaration::ExportNamed(ExportNamedDeclaration {
        declaration: None,
        specifiers,
        source: node
            .child_by_field_name("source")
            .map(|s| string_value(s, source)),
    })
}

fn default_value(node: Node, source: &str) -> ExportDefaultDeclaration {
    match node.kind() {
        "identifier" => ExportDefaultDeclaration::Identifier(node_text(node, source).to_string()),
        "class_declaration" | "abstract_class_declaration" | "class" => {
            ExportDefaultDeclaration::Class(class_declaration(node, source))
        }
        _ => ExportDefaultDeclaration::Other,
    }
}

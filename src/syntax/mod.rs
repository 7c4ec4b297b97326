//! Host-facing syntax tree model
//!
//! A deliberately small ESTree-like shape: only the top-level declarations
//! that matter for export analysis and identifier tables are typed, and every
//! comment of the file is kept with its span so rewritten text can be spliced
//! back into the source.

pub mod builder;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;

pub use builder::TreeSitterBuilder;

/// Builds a [`SourceFile`] from source text.
///
/// The resolver only needs this to parse modules that are referenced before
/// the host visits them.
pub trait AstBuilder {
    fn build(&self, source: &str, path: &Path) -> Result<SourceFile>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Block,
    Line,
}

/// A comment with its inner text (delimiters stripped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub value: String,
    /// Byte range of the full comment, delimiters included
    pub span: Range<usize>,
    /// 1-based line of the comment start
    pub line: u32,
}

impl Comment {
    pub fn block(value: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Block,
            value: value.into(),
            span: 0..0,
            line: 0,
        }
    }

    pub fn with_span(mut self, span: Range<usize>, line: u32) -> Self {
        self.span = span;
        self.line = line;
        self
    }

    /// `/** ... */` comments, which are the only ones doc generators read.
    pub fn is_doc(&self) -> bool {
        self.kind == CommentKind::Block && self.value.starts_with('*') && self.value != "*"
    }

    pub fn to_source(&self) -> String {
        match self.kind {
            CommentKind::Block => format!("/*{}*/", self.value),
            CommentKind::Line => format!("//{}", self.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub kind: ImportKind,
    pub local: String,
    /// Exported name on the source module side (named imports only)
    pub imported: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub source: String,
    pub specifiers: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperClass {
    /// Set when the superclass expression is a plain identifier
    pub name: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    pub name: Option<String>,
    pub super_class: Option<SuperClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDefaultDeclaration {
    Identifier(String),
    Class(ClassDeclaration),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNamedDeclaration {
    pub declaration: Option<Box<Declaration>>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Import(ImportDeclaration),
    Class(ClassDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    ExportNamed(ExportNamedDeclaration),
    Other(String),
}

impl Declaration {
    /// Unwraps one level of `export <declaration>`.
    pub fn unwrap_export(&self) -> &Declaration {
        match self {
            Declaration::ExportNamed(ExportNamedDeclaration {
                declaration: Some(inner),
                ..
            }) => inner,
            other => other,
        }
    }
}

/// A top-level statement and the comments directly preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub declaration: Declaration,
    /// Indices into [`SourceFile::comments`], in source order
    pub leading_comments: Vec<usize>,
}

impl Statement {
    pub fn new(declaration: Declaration) -> Self {
        Self {
            declaration,
            leading_comments: Vec::new(),
        }
    }

    pub fn with_leading_comments(mut self, comments: Vec<usize>) -> Self {
        self.leading_comments = comments;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub body: Vec<Statement>,
}

/// One parsed source file.
///
/// The program is shared with the module cache; comments are owned and
/// rewritten in place by the session.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub program: Arc<Program>,
    pub comments: Vec<Comment>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, program: Program, comments: Vec<Comment>) -> Self {
        Self {
            path: path.into(),
            source: String::new(),
            program: Arc::new(program),
            comments,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Re-emits the source text with every comment replaced by its current value.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;
        for comment in &self.comments {
            if comment.span.start < last || comment.span.end > self.source.len() {
                continue;
            }
            out.push_str(&self.source[last..comment.span.start]);
            out.push_str(&comment.to_source());
            last = comment.span.end;
        }
        out.push_str(&self.source[last..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_is_doc() {
        assert!(Comment::block("*\n * Foo\n ").is_doc());
        assert!(!Comment::block(" plain ").is_doc());
        assert!(!Comment::block("*").is_doc());

        let line = Comment {
            kind: CommentKind::Line,
            value: "* not a doc".to_string(),
            span: 0..0,
            line: 1,
        };
        assert!(!line.is_doc());
    }

    #[test]
    fn test_comment_to_source() {
        assert_eq!(Comment::block("* Foo ").to_source(), "/** Foo */");
        let line = Comment {
            kind: CommentKind::Line,
            value: " note".to_string(),
            span: 0..0,
            line: 1,
        };
        assert_eq!(line.to_source(), "// note");
    }

    #[test]
    fn test_unwrap_export() {
        let class = Declaration::Class(ClassDeclaration {
            name: Some("Foo".to_string()),
            super_class: None,
        });
        let wrapped = Declaration::ExportNamed(ExportNamedDeclaration {
            declaration: Some(Box::new(class.clone())),
            specifiers: Vec::new(),
            source: None,
        });
        assert_eq!(wrapped.unwrap_export(), &class);
        assert_eq!(class.unwrap_export(), &class);
    }

    #[test]
    fn test_render_splices_comments() {
        let source = "/** a */\nconst x = 1; // b\n";
        let mut file = SourceFile::new(
            "x.js",
            Program::default(),
            vec![
                Comment::block("* a ").with_span(0..8, 1),
                Comment {
                    kind: CommentKind::Line,
                    value: " b".to_string(),
                    span: 22..26,
                    line: 2,
                },
            ],
        )
        .with_source(source);

        assert_eq!(file.render(), source);

        file.comments[0].value = "* changed ".to_string();
        assert_eq!(file.render(), "/** changed */\nconst x = 1; // b\n");
    }
}

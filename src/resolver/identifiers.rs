//! Per-file local identifier table

use std::collections::HashMap;

use crate::syntax::{ClassDeclaration, Declaration, ExportDefaultDeclaration, ImportKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    DefaultImport,
    NamedImport { imported: String },
    /// Class or `@typedef` declared in the current file
    Local,
}

/// Where an in-file identifier comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Import specifier, or the current file's basename for local declarations
    pub source: String,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierTable {
    entries: HashMap<String, Binding>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert_local(&mut self, name: impl Into<String>, file_name: &str) {
        self.entries.insert(
            name.into(),
            Binding {
                source: file_name.to_string(),
                kind: BindingKind::Local,
            },
        );
    }

    /// Adds the bindings a top-level declaration introduces. Namespace imports
    /// and non-class declarations contribute nothing.
    pub fn add_declaration(&mut self, declaration: &Declaration, file_name: &str) {
        match declaration {
            Declaration::Import(import) => {
                for spec in &import.specifiers {
                    let kind = match spec.kind {
                        ImportKind::Default => BindingKind::DefaultImport,
                        ImportKind::Named => BindingKind::NamedImport {
                            imported: spec.imported.clone().unwrap_or_else(|| spec.local.clone()),
                        },
                        ImportKind::Namespace => continue,
                    };
                    self.entries.insert(
                        spec.local.clone(),
                        Binding {
                            source: import.source.clone(),
                            kind,
                        },
                    );
                }
            }
            other => {
                if let Some(ClassDeclaration {
                    name: Some(name), ..
                }) = declared_class(other)
                {
                    self.insert_local(name.clone(), file_name);
                }
            }
        }
    }
}

/// The class a top-level declaration declares, looking through
/// `export default class`.
pub fn declared_class(declaration: &Declaration) -> Option<&ClassDeclaration> {
    match declaration {
        Declaration::Class(class) => Some(class),
        Declaration::ExportDefault(ExportDefaultDeclaration::Class(class)) => Some(class),
        _ => None,
    }
}

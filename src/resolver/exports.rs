//! Export analysis
//!
//! A single linear scan over a module's top-level declarations. Classes must
//! be declared before the statement that exports them: an `export default Foo`
//! that precedes `class Foo {}` leaves the default export unset.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::syntax::{Declaration, ExportDefaultDeclaration, Program};

/// Export summary of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// Name of the locally declared class exported as default
    pub default_export: Option<String>,
    pub named_exports: BTreeSet<String>,
}

impl ModuleInfo {
    pub fn is_named_export(&self, symbol: &str) -> bool {
        self.named_exports.contains(symbol)
    }

    /// `.` for named exports, `~` for everything else.
    pub fn delimiter(&self, symbol: &str) -> char {
        if self.is_named_export(symbol) {
            '.'
        } else {
            '~'
        }
    }
}

pub fn analyze_exports(program: &Program) -> ModuleInfo {
    let mut info = ModuleInfo::default();
    let mut classes: HashSet<&str> = HashSet::new();

    for statement in &program.body {
        match &statement.declaration {
            Declaration::Class(class) => {
                if let Some(name) = &class.name {
                    classes.insert(name.as_str());
                }
            }
            Declaration::ExportDefault(ExportDefaultDeclaration::Identifier(name)) => {
                if classes.contains(name.as_str()) {
                    info.default_export = Some(name.clone());
                }
            }
            Declaration::ExportDefault(ExportDefaultDeclaration::Class(class)) => {
                if let Some(name) = &class.name {
                    classes.insert(name.as_str());
                    info.default_export = Some(name.clone());
                }
            }
            Declaration::ExportNamed(named) => {
                if let Some(inner) = &named.declaration {
                    if let Declaration::Class(class) = inner.as_ref() {
                        if let Some(name) = &class.name {
                            info.named_exports.insert(name.clone());
                        }
                    }
                } else if named.source.is_none() {
                    for spec in &named.specifiers {
                        if classes.contains(spec.local.as_str()) {
                            info.named_exports.insert(spec.exported.clone());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{
        ClassDeclaration, ExportNamedDeclaration, ExportSpecifier, Statement,
    };

    fn class(name: &str) -> Declaration {
        Declaration::Class(ClassDeclaration {
            name: Some(name.to_string()),
            super_class: None,
        })
    }

    fn export_default(name: &str) -> Declaration {
        Declaration::ExportDefault(ExportDefaultDeclaration::Identifier(name.to_string()))
    }

    fn export_named(decl: Declaration) -> Declaration {
        Declaration::ExportNamed(ExportNamedDeclaration {
            declaration: Some(Box::new(decl)),
            specifiers: Vec::new(),
            source: None,
        })
    }

    fn program(decls: Vec<Declaration>) -> Program {
        Program {
            body: decls.into_iter().map(Statement::new).collect(),
        }
    }

    #[test]
    fn test_default_export_of_declared_class() {
        let info = analyze_exports(&program(vec![class("Map"), export_default("Map")]));
        assert_eq!(info.default_export.as_deref(), Some("Map"));
        assert!(info.named_exports.is_empty());
    }

    #[test]
    fn test_default_export_of_non_class() {
        let info = analyze_exports(&program(vec![
            Declaration::Other("function_declaration".to_string()),
            export_default("helper"),
        ]));
        assert_eq!(info.default_export, None);

        let info = analyze_exports(&program(vec![Declaration::ExportDefault(
            ExportDefaultDeclaration::Other,
        )]));
        assert_eq!(info.default_export, None);
    }

    #[test]
    fn test_forward_reference_is_not_resolved() {
        let info = analyze_exports(&program(vec![export_default("Map"), class("Map")]));
        assert_eq!(info.default_export, None);
    }

    #[test]
    fn test_default_class_declaration() {
        let info = analyze_exports(&program(vec![Declaration::ExportDefault(
            ExportDefaultDeclaration::Class(ClassDeclaration {
                name: Some("View".to_string()),
                super_class: None,
            }),
        )]));
        assert_eq!(info.default_export.as_deref(), Some("View"));
    }

    #[test]
    fn test_named_class_exports() {
        let info = analyze_exports(&program(vec![
            export_named(class("Point")),
            export_named(class("Line")),
            export_named(Declaration::Other("lexical_declaration".to_string())),
        ]));
        assert_eq!(info.default_export, None);
        assert!(info.is_named_export("Point"));
        assert!(info.is_named_export("Line"));
        assert_eq!(info.named_exports.len(), 2);
    }

    #[test]
    fn test_named_class_is_not_a_default_candidate() {
        let info = analyze_exports(&program(vec![
            export_named(class("Point")),
            export_default("Point"),
        ]));
        assert_eq!(info.default_export, None);
        assert!(info.is_named_export("Point"));
    }

    #[test]
    fn test_export_clause_of_declared_class() {
        let info = analyze_exports(&program(vec![
            class("Circle"),
            Declaration::ExportNamed(ExportNamedDeclaration {
                declaration: None,
                specifiers: vec![
                    ExportSpecifier {
                        local: "Circle".to_string(),
                        exported: "Round".to_string(),
                    },
                    ExportSpecifier {
                        local: "notAClass".to_string(),
                        exported: "notAClass".to_string(),
                    },
                ],
                source: None,
            }),
        ]));
        assert!(info.is_named_export("Round"));
        assert!(!info.is_named_export("Circle"));
        assert!(!info.is_named_export("notAClass"));
    }

    #[test]
    fn test_reexports_are_ignored() {
        let info = analyze_exports(&program(vec![
            class("Circle"),
            Declaration::ExportNamed(ExportNamedDeclaration {
                declaration: None,
                specifiers: vec![ExportSpecifier {
                    local: "Circle".to_string(),
                    exported: "Circle".to_string(),
                }],
                source: Some("./other.js".to_string()),
            }),
        ]));
        assert!(info.named_exports.is_empty());
    }

    #[test]
    fn test_delimiter() {
        let info = analyze_exports(&program(vec![
            export_named(class("Point")),
            class("Map"),
            export_default("Map"),
        ]));
        assert_eq!(info.delimiter("Point"), '.');
        assert_eq!(info.delimiter("Map"), '~');
        assert_eq!(info.delimiter("Unknown"), '~');
    }
}

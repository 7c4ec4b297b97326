pub mod config;
pub mod error;
pub mod resolver;
pub mod syntax;

pub use config::Config;
pub use error::{ResolverError, Result};
pub use resolver::{
    analyze_exports, canonical_path, external_path, Binding, BindingKind, FileWalker,
    IdentifierTable, ModuleCache, ModuleId, ModuleInfo, ModuleRoot, Session, SessionStats,
};
pub use syntax::{
    AstBuilder, ClassDeclaration, Comment, CommentKind, Declaration, ExportDefaultDeclaration,
    ExportNamedDeclaration, ExportSpecifier, ImportDeclaration, ImportKind, ImportSpecifier,
    Program, SourceFile, Statement, SuperClass, TreeSitterBuilder,
};

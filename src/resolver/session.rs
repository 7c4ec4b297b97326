//! Per-run resolution session
//!
//! A [`Session`] owns the module cache for one documentation run. The host
//! hands it each parsed file once; it returns the file with `@extends` lines
//! injected and every doc comment's type references rewritten.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::cache::ModuleCache;
use super::exports::ModuleInfo;
use super::identifiers::{declared_class, Binding, BindingKind, IdentifierTable};
use super::paths::{
    canonical_path, external_path, is_relative_specifier, normalize, ModuleId, ModuleRoot,
};
use super::scanner::{
    find_typedef, inject_extends, scan_import_references, scan_type_slots, splice, strip_typeof,
};
use crate::error::Result;
use crate::syntax::{AstBuilder, Comment, SourceFile, Statement, SuperClass};

/// Counters accumulated over a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub files: usize,
    pub comments_rewritten: usize,
    pub references_resolved: usize,
    pub extends_injected: usize,
}

/// What the session knows about the file being rewritten.
struct FileContext {
    path: PathBuf,
    module_id: ModuleId,
    file_name: String,
}

pub struct Session<B: AstBuilder> {
    root: ModuleRoot,
    builder: B,
    cache: ModuleCache,
    stats: SessionStats,
}

impl<B: AstBuilder> Session<B> {
    pub fn new(root: ModuleRoot, builder: B) -> Self {
        Self {
            root,
            builder,
            cache: ModuleCache::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn root(&self) -> &ModuleRoot {
        &self.root
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Export summary of a module, parsing it on demand.
    pub fn module_info(&mut self, id: &ModuleId) -> Result<&ModuleInfo> {
        self.cache.module_info(id, &self.root, &self.builder)
    }

    /// Reads, parses and rewrites one file.
    pub fn process_path(&mut self, path: &Path) -> Result<SourceFile> {
        let source = std::fs::read_to_string(path)?;
        let file = self.builder.build(&source, path)?;
        self.process(file)
    }

    /// Rewrites one parsed file and hands it back.
    pub fn process(&mut self, mut file: SourceFile) -> Result<SourceFile> {
        let path = absolute(&file.path)?;
        let module_id = self.root.module_id(&path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!("Rewriting {} as module {}", path.display(), module_id);
        self.cache
            .insert_program(module_id.clone(), Arc::clone(&file.program));

        let ctx = FileContext {
            path,
            module_id,
            file_name,
        };

        let mut table = IdentifierTable::new();
        let program = Arc::clone(&file.program);
        for statement in &program.body {
            let declaration = statement.declaration.unwrap_export();
            table.add_declaration(declaration, &ctx.file_name);

            let super_class = declared_class(declaration).and_then(|c| c.super_class.as_ref());
            if let Some(super_class) = super_class {
                self.add_extends(&ctx, &table, statement, super_class, &mut file.comments)?;
            }
        }

        for comment in file.comments.iter_mut().filter(|c| c.is_doc()) {
            let rewritten = self.rewrite_comment(&ctx, &mut table, &comment.value)?;
            if rewritten != comment.value {
                comment.value = rewritten;
                self.stats.comments_rewritten += 1;
            }
        }

        self.stats.files += 1;
        Ok(file)
    }

    fn add_extends(
        &mut self,
        ctx: &FileContext,
        table: &IdentifierTable,
        statement: &Statement,
        super_class: &SuperClass,
        comments: &mut [Comment],
    ) -> Result<()> {
        let doc = statement
            .leading_comments
            .iter()
            .rev()
            .copied()
            .find(|&i| comments.get(i).map(Comment::is_doc).unwrap_or(false));
        let Some(index) = doc else {
            tracing::debug!(
                "No doc comment for subclass of {} in {}",
                super_class.text,
                ctx.path.display()
            );
            return Ok(());
        };

        let binding = super_class
            .name
            .as_deref()
            .and_then(|name| table.get(name).map(|binding| (name, binding)));
        let target = match binding {
            Some((name, binding)) => self.resolve_binding(ctx, name, binding)?,
            None => super_class.text.clone(),
        };

        let comment = &mut comments[index];
        comment.value = inject_extends(&comment.value, &target);
        self.stats.extends_injected += 1;
        Ok(())
    }

    fn rewrite_comment(
        &mut self,
        ctx: &FileContext,
        table: &mut IdentifierTable,
        value: &str,
    ) -> Result<String> {
        let text = strip_typeof(value);

        let mut replacements = Vec::new();
        for reference in scan_import_references(&text) {
            let resolved = self.resolve_import(ctx, reference.specifier, reference.export)?;
            tracing::trace!("{} -> {}", &text[reference.span.clone()], resolved);
            replacements.push((reference.span, resolved));
        }
        self.stats.references_resolved += replacements.len();
        let text = splice(&text, &replacements);

        if let Some(name) = find_typedef(&text) {
            table.insert_local(name, &ctx.file_name);
        }

        let mut replacements = Vec::new();
        for slot in scan_type_slots(&text) {
            let Some(binding) = table.get(slot.name) else {
                continue;
            };
            let resolved = self.resolve_binding(ctx, slot.name, binding)?;
            tracing::trace!("{} -> {}", slot.name, resolved);
            replacements.push((slot.span, resolved));
        }
        self.stats.references_resolved += replacements.len();

        Ok(splice(&text, &replacements))
    }

    /// `import("<specifier>").<export>` to a canonical path.
    fn resolve_import(&mut self, ctx: &FileContext, specifier: &str, export: &str) -> Result<String> {
        if !is_relative_specifier(specifier) {
            return Ok(external_path(specifier, export));
        }

        let id = self.root.resolve_specifier(&ctx.path, specifier);
        match export {
            "default" => {
                let name = self.cache.default_export(&id, &self.root, &self.builder)?;
                Ok(canonical_path(&id, name.as_deref(), '~'))
            }
            "" => Ok(canonical_path(&id, None, '~')),
            name => {
                let delimiter = self.cache.delimiter(&id, name, &self.root, &self.builder)?;
                Ok(canonical_path(&id, Some(name), delimiter))
            }
        }
    }

    /// A local identifier to a canonical path through its binding.
    fn resolve_binding(&mut self, ctx: &FileContext, local: &str, binding: &Binding) -> Result<String> {
        let relative = binding.kind == BindingKind::Local || is_relative_specifier(&binding.source);
        if !relative {
            let export = match &binding.kind {
                BindingKind::NamedImport { imported } => imported.as_str(),
                _ => "default",
            };
            return Ok(external_path(&binding.source, export));
        }

        let id = match binding.kind {
            BindingKind::Local => ctx.module_id.clone(),
            _ => self.root.resolve_specifier(&ctx.path, &binding.source),
        };
        match &binding.kind {
            BindingKind::DefaultImport => {
                let name = self.cache.default_export(&id, &self.root, &self.builder)?;
                Ok(canonical_path(&id, name.as_deref(), '~'))
            }
            BindingKind::NamedImport { imported } => {
                let delimiter = self.cache.delimiter(&id, imported, &self.root, &self.builder)?;
                Ok(canonical_path(&id, Some(imported.as_str()), delimiter))
            }
            BindingKind::Local => {
                let delimiter = self.cache.delimiter(&id, local, &self.root, &self.builder)?;
                Ok(canonical_path(&id, Some(local), delimiter))
            }
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

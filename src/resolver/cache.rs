//! Module metadata cache
//!
//! Maps module ids to parsed programs and memoized export summaries for the
//! lifetime of a session. Nothing is ever invalidated.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use super::exports::{analyze_exports, ModuleInfo};
use super::paths::{ModuleId, ModuleRoot};
use crate::error::{ResolverError, Result};
use crate::syntax::{AstBuilder, Program};

#[derive(Debug, Default)]
pub struct ModuleCache {
    programs: HashMap<ModuleId, Arc<Program>>,
    infos: HashMap<ModuleId, ModuleInfo>,
    modules_loaded: usize,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a program the host visited directly so later lookups skip the
    /// disk read.
    pub fn insert_program(&mut self, id: ModuleId, program: Arc<Program>) {
        self.programs.insert(id, program);
    }

    /// Number of modules read from disk on demand.
    pub fn modules_loaded(&self) -> usize {
        self.modules_loaded
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Export summary for `id`, parsing the module from disk on first use.
    pub fn module_info(
        &mut self,
        id: &ModuleId,
        root: &ModuleRoot,
        builder: &dyn AstBuilder,
    ) -> Result<&ModuleInfo> {
        match self.infos.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let program = match self.programs.get(id) {
                    Some(program) => Arc::clone(program),
                    None => {
                        let program = load(id, root, builder)?;
                        self.modules_loaded += 1;
                        self.programs.insert(id.clone(), Arc::clone(&program));
                        program
                    }
                };
                let info = analyze_exports(&program);
                tracing::debug!(
                    "Analyzed module {}: default={:?}, named={}",
                    id,
                    info.default_export,
                    info.named_exports.len()
                );
                Ok(&*entry.insert(info))
            }
        }
    }

    pub fn default_export(
        &mut self,
        id: &ModuleId,
        root: &ModuleRoot,
        builder: &dyn AstBuilder,
    ) -> Result<Option<String>> {
        Ok(self.module_info(id, root, builder)?.default_export.clone())
    }

    pub fn delimiter(
        &mut self,
        id: &ModuleId,
        symbol: &str,
        root: &ModuleRoot,
        builder: &dyn AstBuilder,
    ) -> Result<char> {
        Ok(self.module_info(id, root, builder)?.delimiter(symbol))
    }
}

fn load(id: &ModuleId, root: &ModuleRoot, builder: &dyn AstBuilder) -> Result<Arc<Program>> {
    let path = root.source_path(id);
    tracing::debug!("Loading module {} from {}", id, path.display());

    let source = std::fs::read_to_string(&path).map_err(|source| ResolverError::ModuleRead {
        path: path.clone(),
        source,
    })?;
    Ok(builder.build(&source, &path)?.program)
}

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::Result;
use crate::syntax::TreeSitterBuilder;

/// Finds the source files a documentation run should visit.
pub struct FileWalker {
    extensions: Vec<String>,
}

impl FileWalker {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Supported source files under `root` in path order, honoring ignore files.
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.is_file() && self.is_supported(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false);
        matches_extension && TreeSitterBuilder::supports(path)
    }
}

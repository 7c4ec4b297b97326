//! Module identifiers and module-root path canonicalization

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Root-relative, extension-less, `/`-separated module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `./x` and `../x` specifiers resolve against the importing file; anything
/// else names an external package.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Lexically resolves `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `module:<id>` followed by `<delimiter><export>` when an export name applies.
pub fn canonical_path(id: &ModuleId, export: Option<&str>, delimiter: char) -> String {
    match export.filter(|name| !name.is_empty()) {
        Some(name) => format!("module:{}{}{}", id, delimiter, name),
        None => format!("module:{}", id),
    }
}

/// Reference into a package outside the module root: `default` names the
/// package entry point itself, anything else is a `~` member.
pub fn external_path(specifier: &str, export: &str) -> String {
    if export == "default" || export.is_empty() {
        format!("module:{}", specifier)
    } else {
        format!("module:{}~{}", specifier, export)
    }
}

/// The configured module root plus the source extensions modules are read with.
#[derive(Debug, Clone)]
pub struct ModuleRoot {
    root: PathBuf,
    extensions: Vec<String>,
}

impl ModuleRoot {
    /// `root` must be absolute; it is normalized here.
    pub fn new(root: impl AsRef<Path>, extensions: Vec<String>) -> Self {
        let extensions = if extensions.is_empty() {
            vec!["js".to_string()]
        } else {
            extensions
        };
        Self {
            root: normalize(root.as_ref()),
            extensions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Module id of an absolute source path.
    pub fn module_id(&self, path: &Path) -> ModuleId {
        let path = normalize(path);
        let relative = pathdiff::diff_paths(&path, &self.root).unwrap_or(path);
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let joined = segments.join("/");
        ModuleId(self.strip_extension(&joined).to_string())
    }

    /// Module id of `specifier` imported from the file at `importer`.
    pub fn resolve_specifier(&self, importer: &Path, specifier: &str) -> ModuleId {
        let dir = importer.parent().unwrap_or(Path::new(""));
        self.module_id(&dir.join(specifier))
    }

    /// Source file backing a module id: the first configured extension that
    /// exists on disk, otherwise the first extension.
    pub fn source_path(&self, id: &ModuleId) -> PathBuf {
        let candidates: Vec<PathBuf> = self
            .extensions
            .iter()
            .map(|ext| self.root.join(format!("{}.{}", id.as_str(), ext)))
            .collect();
        candidates
            .iter()
            .find(|p| p.is_file())
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or_else(|| self.root.join(id.as_str()))
    }

    fn strip_extension<'a>(&self, id: &'a str) -> &'a str {
        for ext in &self.extensions {
            if let Some(stripped) = id.strip_suffix(ext.as_str()) {
                if let Some(stripped) = stripped.strip_suffix('.') {
                    return stripped;
                }
            }
        }
        id
    }
}

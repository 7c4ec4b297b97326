//! Host configuration loading
//!
//! Reads the documentation tool's configuration file (JSON, or YAML by
//! extension) and validates the `typescript` plugin section:
//!
//! ```json
//! {
//!   "typescript": {
//!     "moduleRoot": "src",
//!     "extensions": ["js"]
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ResolverError, Result};
use crate::resolver::paths::{normalize, ModuleRoot};

/// Key of the plugin section in the host configuration
pub const CONFIG_SECTION: &str = "typescript";

#[derive(Debug, Clone, Default, Deserialize)]
struct HostConfig {
    typescript: Option<Config>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Module root, relative to the working directory
    pub module_root: Option<PathBuf>,

    /// Source extensions stripped from module ids, tried in order on disk
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

impl Config {
    pub fn new(module_root: impl Into<PathBuf>) -> Self {
        Self {
            module_root: Some(module_root.into()),
            extensions: default_extensions(),
        }
    }

    /// Loads the plugin section from a host configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        if yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let host: HostConfig = serde_json::from_str(content)
            .map_err(|e| ResolverError::Config(format!("Invalid JSON configuration: {}", e)))?;
        Self::from_host(host)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let host: HostConfig = serde_yaml::from_str(content)
            .map_err(|e| ResolverError::Config(format!("Invalid YAML configuration: {}", e)))?;
        Self::from_host(host)
    }

    fn from_host(host: HostConfig) -> Result<Self> {
        host.typescript
            .ok_or_else(|| ResolverError::MissingConfig(CONFIG_SECTION.to_string()))
    }

    /// Validated module root, resolved against `cwd`.
    pub fn module_root(&self, cwd: &Path) -> Result<ModuleRoot> {
        let relative = self
            .module_root
            .as_ref()
            .ok_or_else(|| ResolverError::MissingConfig(format!("{}.moduleRoot", CONFIG_SECTION)))?;

        let absolute = normalize(&cwd.join(relative));
        if !absolute.is_dir() {
            return Err(ResolverError::ModuleRootNotFound(absolute));
        }

        let extensions: Vec<String> = self
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        Ok(ModuleRoot::new(absolute, extensions))
    }
}

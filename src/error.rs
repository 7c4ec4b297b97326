use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read module {}: {source}", path.display())]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration \"{0}\" missing")]
    MissingConfig(String),

    #[error("Directory \"{}\" does not exist. Check the \"typescript.moduleRoot\" config option", .0.display())]
    ModuleRootNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ResolverError>;

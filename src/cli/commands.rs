use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ResolverError, Result};
use crate::resolver::{FileWalker, ModuleId, ModuleRoot, Session};
use crate::syntax::{AstBuilder, Comment, TreeSitterBuilder};

#[derive(Parser)]
#[command(name = "jsdoc-paths")]
#[command(about = "Rewrites TypeScript-style type references in JSDoc comments to module paths")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Show every doc comment that changes under the configured module root
    jsdoc-paths rewrite

    # Rewrite selected files and print the resulting sources
    jsdoc-paths rewrite src/Map.js src/layer --format source

    # Machine-readable report with a module root override
    jsdoc-paths --module-root src rewrite --format json

    # Show what a module exports
    jsdoc-paths exports geom/Point
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the documentation configuration file (JSON or YAML)
    #[arg(long, global = true, default_value = "conf.json")]
    pub config: PathBuf,

    /// Module root, overriding `typescript.moduleRoot` from the configuration
    #[arg(long, global = true)]
    pub module_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite doc comments of source files
    Rewrite {
        /// Files or directories to process (defaults to the module root)
        paths: Vec<PathBuf>,

        /// Output format: text, json, or source
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the export summary of a module
    Exports {
        /// Module id relative to the module root, without extension
        module_id: String,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// One comment whose text the session changed.
#[derive(Debug, Serialize)]
struct CommentChange {
    line: u32,
    before: String,
    after: String,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    module_id: ModuleId,
    changes: Vec<CommentChange>,
}

/// Resolves the module root from the configuration file and the CLI override.
pub fn load_module_root(config_path: &Path, module_root: Option<&Path>) -> Result<ModuleRoot> {
    let mut config = if config_path.is_file() {
        Config::load(config_path)?
    } else if module_root.is_some() {
        Config::default()
    } else {
        return Err(ResolverError::Config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    };

    if let Some(root) = module_root {
        config.module_root = Some(root.to_path_buf());
    }
    if config.extensions.is_empty() {
        config.extensions = vec!["js".to_string()];
    }

    let cwd = std::env::current_dir()?;
    config.module_root(&cwd)
}

/// Rewrites every supported file under `paths` within one session.
pub fn rewrite(root: ModuleRoot, paths: &[PathBuf], format: &str) -> Result<()> {
    let walker = FileWalker::new(root.extensions().to_vec());
    let targets = if paths.is_empty() {
        vec![root.path().to_path_buf()]
    } else {
        paths.to_vec()
    };

    let mut files = Vec::new();
    for target in &targets {
        if target.is_file() {
            files.push(target.clone());
        } else if target.is_dir() {
            files.extend(walker.walk(target)?);
        } else {
            warn!("Skipping {}: not found", target.display());
        }
    }
    info!("Found {} files to rewrite", files.len());

    let mut session = Session::new(root, TreeSitterBuilder::new());
    let mut reports = Vec::new();

    for path in &files {
        let source = std::fs::read_to_string(path)?;
        let parsed = session.builder().build(&source, path)?;
        let original: Vec<Comment> = parsed.comments.clone();
        let rewritten = session.process(parsed)?;

        match format {
            "source" => {
                println!("// ===== {} =====", path.display());
                print!("{}", rewritten.render());
            }
            _ => {
                let changes: Vec<CommentChange> = original
                    .iter()
                    .zip(rewritten.comments.iter())
                    .filter(|(before, after)| before.value != after.value)
                    .map(|(before, after)| CommentChange {
                        line: after.line,
                        before: before.to_source(),
                        after: after.to_source(),
                    })
                    .collect();
                if !changes.is_empty() {
                    reports.push(FileReport {
                        path: path.clone(),
                        module_id: session.root().module_id(&absolute(path)?),
                        changes,
                    });
                }
            }
        }
    }

    match format {
        "source" => {}
        "json" => {
            let output = serde_json::to_string_pretty(&reports).unwrap_or_default();
            println!("{}", output);
        }
        _ => {
            if reports.is_empty() {
                println!("No doc comments changed");
            }
            for report in &reports {
                for change in &report.changes {
                    println!("{}:{} ({})", report.path.display(), change.line, report.module_id);
                    println!("{}", change.after);
                    println!();
                }
            }
        }
    }

    let stats = session.stats();
    info!(
        "Rewrote {} comments in {} files ({} references, {} @extends, {} modules loaded)",
        stats.comments_rewritten,
        stats.files,
        stats.references_resolved,
        stats.extends_injected,
        session.cache().modules_loaded()
    );
    Ok(())
}

/// Prints the export summary of one module.
pub fn show_exports(root: ModuleRoot, module_id: &str, format: &str) -> Result<()> {
    let id = ModuleId::new(module_id);
    let mut session = Session::new(root, TreeSitterBuilder::new());
    let info = session.module_info(&id)?;

    if format == "json" {
        let output = serde_json::to_string_pretty(info).unwrap_or_default();
        println!("{}", output);
    } else {
        println!("Module: {}", id);
        match &info.default_export {
            Some(name) => println!("Default export: {}", name),
            None => println!("Default export: (none)"),
        }
        if info.named_exports.is_empty() {
            println!("No named exports");
        } else {
            println!("Named exports ({}):", info.named_exports.len());
            for name in &info.named_exports {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

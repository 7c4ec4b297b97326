pub mod cache;
pub mod exports;
pub mod identifiers;
pub mod paths;
pub mod scanner;
pub mod session;
pub mod walker;

pub use cache::ModuleCache;
pub use exports::{analyze_exports, ModuleInfo};
pub use identifiers::{Binding, BindingKind, IdentifierTable};
pub use paths::{canonical_path, external_path, ModuleId, ModuleRoot};
pub use session::{Session, SessionStats};
pub use walker::FileWalker;

//! XQuery front end.
//!
//! Re-exports the syntax tree and parser crates and adds [`ModuleManager`],
//! which finds, parses and caches the library modules a query imports.
//!
//! ```ignore
//! use std::sync::Arc;
//! use xqfront::{InMemorySourceProvider, ModuleManager};
//!
//! let sources = InMemorySourceProvider::new();
//! sources.add("lib/math.xq", "module namespace m = 'urn:math'; declare function m:sq($x) { $x * $x };")?;
//! let manager = ModuleManager::new(Arc::new(sources));
//! let parsed = manager.compile_main(
//!     "import module namespace m = 'urn:math' at 'lib/math.xq'; m:sq(4)",
//!     None,
//! )?;
//! assert!(parsed.is_ok());
//! ```

pub mod error;
pub mod manager;

pub use error::CompileError;
pub use manager::{ModuleManager, resolve_location};

pub use xqfront_ast as ast;
pub use xqfront_parser::{
    Diagnostic, ErrorCode, Extension, ModuleResolver, ParseError, ParsedModule, Parser,
    ParserConfig, ResolveError, Severity, StaticContext, parse_expression, parse_library_module,
    parse_main_module,
};
pub use xqfront_traits::{
    FilesystemSourceProvider, InMemorySourceProvider, SourceError, SourceProvider,
};

use std::sync::Arc;

/// Parses a main module whose imports are read from the filesystem, relative
/// to the current directory.
pub fn compile_main(src: &str, config: ParserConfig) -> Result<ParsedModule, CompileError> {
    let manager = ModuleManager::with_config(Arc::new(FilesystemSourceProvider::new(".")), config);
    manager.compile_main(src, None)
}

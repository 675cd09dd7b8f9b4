//! The seam between the parser and whoever finds imported modules.

use crate::context::StaticContext;
use crate::error::{Diagnostic, ParseError};
use std::sync::Arc;
use thiserror::Error;
use xqfront_ast::{Module, ModuleId};

/// A successfully parsed module with its static context and the non-fatal
/// diagnostics recorded while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub id: ModuleId,
    pub module: Module,
    pub context: StaticContext,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedModule {
    /// True when no error diagnostics were recorded. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Target namespace of a library module.
    pub fn namespace(&self) -> Option<&str> {
        match &self.module {
            Module::Library(lib) => Some(&lib.namespace),
            Module::Main(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("no module found for namespace '{namespace}'")]
    NotFound { namespace: String },

    #[error("cyclic module import: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("cannot read module '{location}': {message}")]
    Source { location: String, message: String },

    #[error("module '{location}' failed to parse: {error}")]
    Parse {
        location: String,
        error: Box<ParseError>,
    },

    #[error("maximum module import depth ({0}) exceeded")]
    DepthExceeded(usize),
}

/// Locates and loads library modules for `import module` declarations.
///
/// `load` may parse the module with a parser that uses this same resolver,
/// so implementations must detect import cycles and report
/// [`ResolveError::Cycle`] instead of recursing. Each parse runs on its own
/// thread, hence the `Sync` bound.
pub trait ModuleResolver: Sync {
    /// Physical locations for `namespace`, given the `at` hints of the import
    /// and the id of the importing module.
    fn resolve(
        &self,
        namespace: &str,
        hints: &[String],
        importer: &ModuleId,
    ) -> Result<Vec<String>, ResolveError>;

    fn load(&self, location: &str) -> Result<Arc<ParsedModule>, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = ResolveError::Cycle {
            chain: vec!["a.xq".into(), "b.xq".into(), "a.xq".into()],
        };
        assert_eq!(err.to_string(), "cyclic module import: a.xq -> b.xq -> a.xq");
    }
}

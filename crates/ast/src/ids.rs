//! Newtype wrappers for identifiers carried by syntax tree nodes.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Identifies the module a node was parsed from.
///
/// Every [`Expr`](crate::Expr) holds a clone of its module's id so that later
/// stages can attribute diagnostics without walking back up the tree. The id is
/// the module's source URI, or [`ModuleId::MAIN`] for an anonymous query.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    /// Id used for a main module that was not given a source URI.
    pub const MAIN: &'static str = "#main";

    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::main()
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_clones_share_text() {
        let id = ModuleId::from("http://example.com/lib.xq");
        let other = id.clone();
        assert_eq!(id, other);
        assert_eq!(other.as_str(), "http://example.com/lib.xq");
    }

    #[test]
    fn test_default_is_main() {
        assert_eq!(ModuleId::default().as_str(), ModuleId::MAIN);
    }
}

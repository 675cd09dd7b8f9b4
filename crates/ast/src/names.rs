//! Qualified names and name tests.

use serde::Serialize;
use std::fmt;

/// A lexical QName together with the namespace its prefix resolved to.
///
/// `namespace` is `None` for names in no namespace and for names whose prefix
/// could not be resolved (the parser records a diagnostic in that case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_part: String,
    pub namespace: Option<String>,
}

impl QName {
    pub fn new(local_part: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_part: local_part.into(),
            namespace: None,
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local_part: local_part.into(),
            namespace: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The prefix-independent identity of this name.
    pub fn expanded(&self) -> ExpandedName {
        ExpandedName {
            namespace: self.namespace.clone(),
            local_part: self.local_part.clone(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local_part),
            None => write!(f, "{}", self.local_part),
        }
    }
}

/// Namespace URI plus local name; two QNames with different prefixes bound to
/// the same namespace have equal expanded names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExpandedName {
    pub namespace: Option<String>,
    pub local_part: String,
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local_part),
            None => write!(f, "{}", self.local_part),
        }
    }
}

/// A name test as used by path steps and `catch` clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NameTest {
    Name(QName),
    /// `*`
    Any,
    /// `prefix:*`
    Namespace {
        prefix: String,
        namespace: Option<String>,
    },
    /// `*:local`
    Local(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_name_ignores_prefix() {
        let a = QName::with_prefix("a", "item").in_namespace("urn:x");
        let b = QName::with_prefix("b", "item").in_namespace("urn:x");
        assert_ne!(a, b);
        assert_eq!(a.expanded(), b.expanded());
        assert_eq!(a.expanded().to_string(), "Q{urn:x}item");
    }

    #[test]
    fn test_display_keeps_lexical_form() {
        assert_eq!(QName::with_prefix("fn", "concat").to_string(), "fn:concat");
        assert_eq!(QName::new("x").to_string(), "x");
    }
}

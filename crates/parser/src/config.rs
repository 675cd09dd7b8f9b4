use xqfront_ast::BoundarySpace;

/// Stack reserved for each level of nesting. One level of the operator chain
/// in an unoptimized build needs roughly half of this.
const STACK_PER_LEVEL: usize = 160 * 1024;
const BASE_STACK: usize = 1024 * 1024;

/// Grammar extension a rule belongs to. Rules of a disabled extension never
/// match, so their keywords scan as ordinary names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Extension {
    #[default]
    Core,
    FullText,
    Update,
    Scripting,
}

/// Settings for one parse.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Identifies the module text in diagnostics and becomes its module id.
    pub source_uri: Option<String>,
    pub full_text: bool,
    pub update: bool,
    pub scripting: bool,
    /// Prefix bindings added to the predeclared ones.
    pub namespaces: Vec<(String, String)>,
    /// Boundary-space policy used until a `declare boundary-space` is seen.
    pub boundary_space: BoundarySpace,
    /// Maximum nesting of expressions, direct elements, full-text selections
    /// and sequence types before the parse is aborted. The parse runs on a
    /// stack sized from this limit, see [`ParserConfig::stack_size`].
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            source_uri: None,
            full_text: true,
            update: true,
            scripting: true,
            namespaces: Vec::new(),
            boundary_space: BoundarySpace::Strip,
            max_depth: 256,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }

    pub fn with_full_text(mut self, enabled: bool) -> Self {
        self.full_text = enabled;
        self
    }

    pub fn with_update(mut self, enabled: bool) -> Self {
        self.update = enabled;
        self
    }

    pub fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting = enabled;
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push((prefix.into(), uri.into()));
        self
    }

    pub fn with_boundary_space(mut self, policy: BoundarySpace) -> Self {
        self.boundary_space = policy;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Stack size of the thread the grammar runs on.
    pub fn stack_size(&self) -> usize {
        self.max_depth
            .saturating_mul(STACK_PER_LEVEL)
            .saturating_add(BASE_STACK)
    }

    /// Only XQuery 1.0/3.0 core syntax.
    pub fn core_only() -> Self {
        Self::default()
            .with_full_text(false)
            .with_update(false)
            .with_scripting(false)
    }

    pub fn enables(&self, extension: Extension) -> bool {
        match extension {
            Extension::Core => true,
            Extension::FullText => self.full_text,
            Extension::Update => self.update,
            Extension::Scripting => self.scripting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_default_on() {
        let config = ParserConfig::default();
        assert!(config.enables(Extension::FullText));
        assert!(config.enables(Extension::Scripting));
        let core = ParserConfig::core_only();
        assert!(core.enables(Extension::Core));
        assert!(!core.enables(Extension::Update));
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::new()
            .with_source_uri("file:///q.xq")
            .with_namespace("ex", "urn:example")
            .with_boundary_space(BoundarySpace::Preserve);
        assert_eq!(config.source_uri.as_deref(), Some("file:///q.xq"));
        assert_eq!(config.namespaces, vec![("ex".to_string(), "urn:example".to_string())]);
        assert_eq!(config.boundary_space, BoundarySpace::Preserve);
    }

    #[test]
    fn test_stack_follows_depth() {
        let shallow = ParserConfig::default().with_max_depth(8);
        let deep = ParserConfig::default().with_max_depth(1024);
        assert!(shallow.stack_size() >= BASE_STACK + 8 * STACK_PER_LEVEL);
        assert!(deep.stack_size() > shallow.stack_size());
        assert_eq!(
            ParserConfig::default().with_max_depth(usize::MAX).stack_size(),
            usize::MAX
        );
    }
}

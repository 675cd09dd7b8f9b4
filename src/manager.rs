use crate::error::CompileError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use xqfront_ast::ModuleId;
use xqfront_parser::{ModuleResolver, ParsedModule, Parser, ParserConfig, ResolveError};
use xqfront_traits::SourceProvider;

const MAX_IMPORT_DEPTH: usize = 100;

/// Loads library modules for `import module`, caching each parsed module by
/// location and refusing to re-enter a module that is still being parsed.
///
/// Imports without `at` hints are looked up in a namespace catalog filled
/// with [`ModuleManager::register`].
pub struct ModuleManager {
    provider: Arc<dyn SourceProvider>,
    config: ParserConfig,
    catalog: RwLock<HashMap<String, Vec<String>>>,
    cache: RwLock<HashMap<String, Arc<ParsedModule>>>,
    loading: RwLock<Vec<String>>,
}

impl std::fmt::Debug for ModuleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleManager")
            .field("provider", &self.provider.name())
            .field("cache_size", &self.cache_size())
            .finish()
    }
}

impl ModuleManager {
    pub fn new(provider: Arc<dyn SourceProvider>) -> Self {
        Self::with_config(provider, ParserConfig::default())
    }

    /// Every module this manager parses uses `config`, with its source URI
    /// replaced by the module's location.
    pub fn with_config(provider: Arc<dyn SourceProvider>, config: ParserConfig) -> Self {
        Self {
            provider,
            config,
            catalog: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
            loading: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Records `location` as a place to find the module for `namespace`.
    pub fn register(&self, namespace: impl Into<String>, location: impl Into<String>) {
        if let Ok(mut catalog) = self.catalog.write() {
            catalog.entry(namespace.into()).or_default().push(location.into());
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Parses a main module held in memory. `uri`, when given, names the
    /// module in diagnostics and is the base for relative `at` hints.
    pub fn compile_main(&self, src: &str, uri: Option<&str>) -> Result<ParsedModule, CompileError> {
        let config = match uri {
            Some(uri) => self.config.clone().with_source_uri(uri),
            None => self.config.clone(),
        };
        Ok(Parser::new(src, config).with_resolver(self).parse_main_module()?)
    }

    /// Fetches a main module through the source provider and parses it.
    pub fn compile_main_at(&self, location: &str) -> Result<ParsedModule, CompileError> {
        let src = self.provider.load(location)?;
        self.compile_main(&src, Some(location))
    }

    fn loading_chain(&self) -> Result<Vec<String>, ResolveError> {
        self.loading
            .read()
            .map(|l| l.clone())
            .map_err(|_| lock_error("loading"))
    }

    fn parse_library(&self, location: &str) -> Result<ParsedModule, ResolveError> {
        let src = self
            .provider
            .load(location)
            .map_err(|e| ResolveError::Source {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        let config = self.config.clone().with_source_uri(location);
        Parser::new(&src, config)
            .with_resolver(self)
            .parse_library_module()
            .map_err(|error| ResolveError::Parse {
                location: location.to_string(),
                error: Box::new(error),
            })
    }
}

impl ModuleResolver for ModuleManager {
    fn resolve(
        &self,
        namespace: &str,
        hints: &[String],
        importer: &ModuleId,
    ) -> Result<Vec<String>, ResolveError> {
        let base = (importer.as_str() != ModuleId::MAIN).then(|| importer.as_str());
        if !hints.is_empty() {
            return Ok(hints.iter().map(|h| resolve_location(h, base)).collect());
        }
        let catalog = self.catalog.read().map_err(|_| lock_error("catalog"))?;
        Ok(catalog.get(namespace).cloned().unwrap_or_default())
    }

    fn load(&self, location: &str) -> Result<Arc<ParsedModule>, ResolveError> {
        let chain = self.loading_chain()?;
        if chain.iter().any(|l| l == location) {
            let mut chain = chain;
            chain.push(location.to_string());
            return Err(ResolveError::Cycle { chain });
        }
        if chain.len() >= MAX_IMPORT_DEPTH {
            return Err(ResolveError::DepthExceeded(MAX_IMPORT_DEPTH));
        }

        {
            let cache = self.cache.read().map_err(|_| lock_error("cache"))?;
            if let Some(cached) = cache.get(location) {
                log::trace!("module cache hit for {}", location);
                return Ok(Arc::clone(cached));
            }
        }

        log::debug!("loading library module {}", location);
        self.loading
            .write()
            .map_err(|_| lock_error("loading"))?
            .push(location.to_string());

        let result = self.parse_library(location);

        self.loading
            .write()
            .map_err(|_| lock_error("loading"))?
            .pop();

        let parsed = Arc::new(result?);
        self.cache
            .write()
            .map_err(|_| lock_error("cache"))?
            .insert(location.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }
}

fn lock_error(what: &str) -> ResolveError {
    ResolveError::Source {
        location: String::new(),
        message: format!("module manager {} lock poisoned", what),
    }
}

/// Resolves an `at` hint against the importing module's location. Absolute
/// paths and URIs are returned unchanged. A base URI keeps its
/// `scheme://authority` prefix and only its path is resolved.
pub fn resolve_location(hint: &str, base: Option<&str>) -> String {
    if hint.contains("://") {
        return hint.to_string();
    }
    let (authority, base_path) = match base {
        Some(base) => split_authority(base),
        None => ("", ""),
    };
    let path = if hint.starts_with('/') {
        normalize_path(hint)
    } else {
        let base_dir = Path::new(base_path).parent().unwrap_or(Path::new(""));
        normalize_path(&base_dir.join(hint).to_string_lossy())
    };
    if authority.is_empty() || path.starts_with('/') {
        format!("{}{}", authority, path)
    } else {
        format!("{}/{}", authority, path)
    }
}

/// Splits `scheme://authority` off a URI, leaving the path.
fn split_authority(uri: &str) -> (&str, &str) {
    match uri.find("://") {
        Some(at) => {
            let path_start = uri[at + 3..]
                .find('/')
                .map(|i| at + 3 + i)
                .unwrap_or(uri.len());
            uri.split_at(path_start)
        }
        None => ("", uri),
    }
}

fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    if path.starts_with('/') {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xqfront_parser::ErrorCode;
    use xqfront_traits::InMemorySourceProvider;

    fn manager(sources: &[(&str, &str)]) -> ModuleManager {
        let provider = InMemorySourceProvider::new();
        for (location, text) in sources {
            provider.add(*location, *text).unwrap();
        }
        ModuleManager::new(Arc::new(provider))
    }

    #[test]
    fn test_resolve_location() {
        assert_eq!(resolve_location("/abs/m.xq", Some("lib/a.xq")), "/abs/m.xq");
        assert_eq!(
            resolve_location("http://example.com/m.xq", None),
            "http://example.com/m.xq"
        );
        assert_eq!(resolve_location("util.xq", Some("lib/main.xq")), "lib/util.xq");
        assert_eq!(resolve_location("../b/u.xq", Some("/q/a/main.xq")), "/q/b/u.xq");
        assert_eq!(resolve_location("./u.xq", None), "u.xq");
    }

    #[test]
    fn test_resolve_location_keeps_authority() {
        assert_eq!(
            resolve_location("lib.xq", Some("file:///srv/q/main.xq")),
            "file:///srv/q/lib.xq"
        );
        assert_eq!(
            resolve_location("../lib.xq", Some("http://example.com/q/main.xq")),
            "http://example.com/lib.xq"
        );
        assert_eq!(
            resolve_location("/x/lib.xq", Some("http://example.com/q/main.xq")),
            "http://example.com/x/lib.xq"
        );
        assert_eq!(
            resolve_location("lib.xq", Some("http://example.com")),
            "http://example.com/lib.xq"
        );
    }

    #[test]
    fn test_compile_main_with_file_uri() {
        let m = manager(&[(
            "file:///srv/q/lib.xq",
            "module namespace l = 'urn:l'; declare function l:f() { 1 };",
        )]);
        let parsed = m
            .compile_main(
                "import module namespace l = 'urn:l' at 'lib.xq'; l:f()",
                Some("file:///srv/q/main.xq"),
            )
            .unwrap();
        assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
        assert_eq!(m.cache_size(), 1);
        assert!(m.load("file:///srv/q/lib.xq").is_ok());
    }

    #[test]
    fn test_hints_resolve_against_importer() {
        let m = manager(&[]);
        let locations = m
            .resolve("urn:u", &["util.xq".to_string()], &ModuleId::from("lib/main.xq"))
            .unwrap();
        assert_eq!(locations, vec!["lib/util.xq".to_string()]);
        let locations = m
            .resolve("urn:u", &["util.xq".to_string()], &ModuleId::main())
            .unwrap();
        assert_eq!(locations, vec!["util.xq".to_string()]);
    }

    #[test]
    fn test_catalog_lookup() {
        let m = manager(&[]);
        m.register("urn:u", "lib/u.xq");
        assert_eq!(
            m.resolve("urn:u", &[], &ModuleId::main()).unwrap(),
            vec!["lib/u.xq".to_string()]
        );
        assert!(m.resolve("urn:other", &[], &ModuleId::main()).unwrap().is_empty());
    }

    #[test]
    fn test_load_caches() {
        let m = manager(&[("u.xq", "module namespace u = 'urn:u'; declare function u:f() { 1 };")]);
        let first = m.load("u.xq").unwrap();
        let second = m.load("u.xq").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(m.cache_size(), 1);
        assert_eq!(first.id.as_str(), "u.xq");
        m.clear_cache();
        assert_eq!(m.cache_size(), 0);
    }

    #[test]
    fn test_load_missing_and_broken() {
        let m = manager(&[("bad.xq", "module namespace b = 'urn:b'; declare function")]);
        assert!(matches!(m.load("nope.xq"), Err(ResolveError::Source { .. })));
        match m.load("bad.xq") {
            Err(ResolveError::Parse { location, error }) => {
                assert_eq!(location, "bad.xq");
                assert_eq!(error.code(), ErrorCode::Syntax);
            }
            other => panic!("unexpected {:?}", other.map(|p| p.id.clone())),
        }
        assert_eq!(m.cache_size(), 0);
    }

    #[test]
    fn test_self_import_is_a_cycle() {
        let m = manager(&[(
            "a.xq",
            "module namespace a = 'urn:a'; import module namespace a2 = 'urn:a' at 'a.xq';",
        )]);
        match m.load("a.xq") {
            Err(ResolveError::Parse { error, .. }) => {
                assert_eq!(error.code(), ErrorCode::CyclicImport);
                assert!(error.message().contains("a.xq -> a.xq"));
            }
            other => panic!("unexpected {:?}", other.map(|p| p.id.clone())),
        }
        assert!(m.loading_chain().unwrap().is_empty());
    }
}

//! Library modules and `import module` through a resolver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use xqfront_ast::{DeclarationKind, ModuleId};
use xqfront_parser::{
    ErrorCode, ModuleResolver, ParsedModule, Parser, ParserConfig, ResolveError,
};

/// Serves module texts from a map and parses them on demand.
#[derive(Default)]
struct MapResolver {
    sources: HashMap<String, String>,
    namespaces: HashMap<String, String>,
    loading: Mutex<Vec<String>>,
}

impl MapResolver {
    fn with(mut self, location: &str, namespace: &str, src: &str) -> Self {
        self.sources.insert(location.into(), src.into());
        self.namespaces.insert(namespace.into(), location.into());
        self
    }
}

impl ModuleResolver for MapResolver {
    fn resolve(
        &self,
        namespace: &str,
        hints: &[String],
        _importer: &ModuleId,
    ) -> Result<Vec<String>, ResolveError> {
        if !hints.is_empty() {
            return Ok(hints.to_vec());
        }
        Ok(self.namespaces.get(namespace).cloned().into_iter().collect())
    }

    fn load(&self, location: &str) -> Result<Arc<ParsedModule>, ResolveError> {
        let mut chain = self.loading.lock().unwrap().clone();
        if chain.iter().any(|l| l == location) {
            chain.push(location.to_string());
            return Err(ResolveError::Cycle { chain });
        }
        let src = self
            .sources
            .get(location)
            .ok_or_else(|| ResolveError::Source {
                location: location.to_string(),
                message: "not in map".into(),
            })?;
        self.loading.lock().unwrap().push(location.to_string());
        let result = Parser::new(src, ParserConfig::default().with_source_uri(location))
            .with_resolver(self)
            .parse_library_module();
        self.loading.lock().unwrap().pop();
        result
            .map(Arc::new)
            .map_err(|error| ResolveError::Parse {
                location: location.to_string(),
                error: Box::new(error),
            })
    }
}

const MATH: &str = r#"
module namespace m = "urn:math";
declare variable $m:pi as xs:double := 3.14159;
declare function m:square($x as xs:double) as xs:double { $x * $x };
declare %private function m:helper() { () };
"#;

#[test]
fn test_library_module_declarations() {
    let parsed = Parser::new(MATH, ParserConfig::default())
        .parse_library_module()
        .unwrap();
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.namespace(), Some("urn:math"));
    assert_eq!(parsed.context.functions().count(), 2);
    assert_eq!(parsed.context.variables().count(), 1);
}

#[test]
fn test_library_components_must_use_module_namespace() {
    let parsed = Parser::new(
        "module namespace m = 'urn:math'; declare function local:f() { 1 };",
        ParserConfig::default(),
    )
    .parse_library_module()
    .unwrap();
    assert_eq!(
        parsed.diagnostics[0].code,
        ErrorCode::ComponentOutsideModuleNamespace
    );
}

#[test]
fn test_import_merges_public_signatures() {
    let resolver = MapResolver::default().with("math.xq", "urn:math", MATH);
    let parsed = Parser::new(
        "import module namespace m = 'urn:math'; m:square($m:pi)",
        ParserConfig::default(),
    )
    .with_resolver(&resolver)
    .parse_main_module()
    .unwrap();
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    let names: Vec<String> = parsed
        .context
        .functions()
        .map(|f| f.name.local_part.clone())
        .collect();
    assert!(names.contains(&"square".to_string()));
    assert!(!names.contains(&"helper".to_string()));
    assert!(matches!(
        parsed.module.prolog().declarations[0].kind,
        DeclarationKind::ModuleImport(_)
    ));
}

#[test]
fn test_missing_module_is_recorded() {
    let resolver = MapResolver::default();
    let parsed = Parser::new(
        "import module namespace m = 'urn:nowhere'; 1",
        ParserConfig::default(),
    )
    .with_resolver(&resolver)
    .parse_main_module()
    .unwrap();
    assert_eq!(parsed.diagnostics[0].code, ErrorCode::ModuleNotFound);
}

#[test]
fn test_cyclic_import_is_fatal() {
    let resolver = MapResolver::default()
        .with(
            "a.xq",
            "urn:a",
            "module namespace a = 'urn:a'; import module namespace b = 'urn:b'; declare function a:f() { 1 };",
        )
        .with(
            "b.xq",
            "urn:b",
            "module namespace b = 'urn:b'; import module namespace a = 'urn:a'; declare function b:g() { 2 };",
        );
    let err = Parser::new(
        "import module namespace a = 'urn:a'; a:f()",
        ParserConfig::default(),
    )
    .with_resolver(&resolver)
    .parse_main_module()
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CyclicImport);
}

#[test]
fn test_broken_import_reports_inner_error() {
    let resolver = MapResolver::default().with(
        "bad.xq",
        "urn:bad",
        "module namespace b = 'urn:bad'; declare function b:f() { 1 +  };",
    );
    let err = Parser::new(
        "import module namespace b = 'urn:bad'; b:f()",
        ParserConfig::default(),
    )
    .with_resolver(&resolver)
    .parse_main_module()
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Syntax);
    assert!(err.message().contains("bad.xq"));
}

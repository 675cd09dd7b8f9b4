//! End-to-end module loading from disk through `ModuleManager`.

use std::fs;
use std::sync::Arc;
use xqfront::ast::{DeclarationKind, Module};
use xqfront::{
    CompileError, ErrorCode, FilesystemSourceProvider, InMemorySourceProvider, ModuleManager,
    ParserConfig,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const GEOMETRY: &str = r#"
module namespace geo = "urn:geometry";
import module namespace m = "urn:math" at "math.xq";
declare function geo:area($r as xs:double) as xs:double { $m:pi * m:square($r) };
"#;

const MATH: &str = r#"
module namespace m = "urn:math";
declare variable $m:pi := 3.14159;
declare function m:square($x) { $x * $x };
"#;

#[test]
fn test_nested_imports_resolve_relative_to_importer() {
    init();
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/geometry.xq"), GEOMETRY).unwrap();
    fs::write(dir.path().join("lib/math.xq"), MATH).unwrap();
    fs::write(
        dir.path().join("main.xq"),
        "import module namespace geo = 'urn:geometry' at 'lib/geometry.xq';\ngeo:area(2)",
    )
    .unwrap();

    let manager = ModuleManager::new(Arc::new(FilesystemSourceProvider::new(dir.path())));
    let parsed = manager.compile_main_at("main.xq").unwrap();
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.id.as_str(), "main.xq");
    assert_eq!(manager.cache_size(), 2);
    assert!(parsed.context.functions().any(|f| f.name.local_part == "area"));
    // Transitive imports are not visible to the main module.
    assert!(!parsed.context.functions().any(|f| f.name.local_part == "square"));
}

#[test]
fn test_shared_import_is_parsed_once() {
    let sources = InMemorySourceProvider::new();
    sources.add("math.xq", MATH).unwrap();
    sources
        .add(
            "stats.xq",
            "module namespace s = 'urn:stats'; import module namespace m = 'urn:math' at 'math.xq'; \
             declare function s:var($x) { m:square($x) };",
        )
        .unwrap();
    let manager = ModuleManager::new(Arc::new(sources));
    let parsed = manager
        .compile_main(
            "import module namespace m = 'urn:math' at 'math.xq';\n\
             import module namespace s = 'urn:stats' at 'stats.xq';\n\
             s:var(m:square(2))",
            None,
        )
        .unwrap();
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(manager.cache_size(), 2);
    match &parsed.module {
        Module::Main(main) => {
            let imports = main
                .prolog
                .declarations
                .iter()
                .filter(|d| matches!(d.kind, DeclarationKind::ModuleImport(_)))
                .count();
            assert_eq!(imports, 2);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_catalog_import_without_hints() {
    let sources = InMemorySourceProvider::new();
    sources.add("modules/math.xq", MATH).unwrap();
    let manager = ModuleManager::new(Arc::new(sources));
    manager.register("urn:math", "modules/math.xq");
    let parsed = manager
        .compile_main("import module namespace m = 'urn:math'; m:square(3)", None)
        .unwrap();
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
}

#[test]
fn test_namespace_mismatch_is_recorded() {
    let sources = InMemorySourceProvider::new();
    sources.add("math.xq", MATH).unwrap();
    let manager = ModuleManager::new(Arc::new(sources));
    let parsed = manager
        .compile_main("import module namespace x = 'urn:other' at 'math.xq'; 1", None)
        .unwrap();
    let codes: Vec<_> = parsed.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::ModuleNotFound]);
}

#[test]
fn test_cycle_through_manager() {
    init();
    let sources = InMemorySourceProvider::new();
    sources
        .add("a.xq", "module namespace a = 'urn:a'; import module namespace b = 'urn:b' at 'b.xq';")
        .unwrap();
    sources
        .add("b.xq", "module namespace b = 'urn:b'; import module namespace a = 'urn:a' at 'a.xq';")
        .unwrap();
    let manager = ModuleManager::new(Arc::new(sources));
    let err = manager
        .compile_main("import module namespace a = 'urn:a' at 'a.xq'; 1", None)
        .unwrap_err();
    let parse = err.parse_error().unwrap();
    assert_eq!(parse.code(), ErrorCode::CyclicImport);
    assert_eq!(parse.code().as_str(), "XQST0093");
    assert_eq!(manager.cache_size(), 0);
}

#[test]
fn test_missing_query_file() {
    let manager = ModuleManager::new(Arc::new(InMemorySourceProvider::new()));
    assert!(matches!(
        manager.compile_main_at("nowhere.xq"),
        Err(CompileError::Source(_))
    ));
}

#[test]
fn test_config_applies_to_imports() {
    let sources = InMemorySourceProvider::new();
    sources
        .add(
            "u.xq",
            "module namespace u = 'urn:u'; declare updating function u:wipe($n) { delete node $n };",
        )
        .unwrap();
    let manager = ModuleManager::with_config(
        Arc::new(sources),
        ParserConfig::default().with_update(false),
    );
    let err = manager
        .compile_main("import module namespace u = 'urn:u' at 'u.xq'; 1", None)
        .unwrap_err();
    assert_eq!(err.parse_error().unwrap().code(), ErrorCode::Syntax);
}

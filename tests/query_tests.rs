//! Whole queries through the facade.

use xqfront::ast::{ExprKind, Module};
use xqfront::{ErrorCode, ParserConfig, parse_expression, parse_main_module};

fn body_kind(src: &str) -> ExprKind {
    match parse_main_module(src, ParserConfig::default()).unwrap().module {
        Module::Main(main) => main.body.kind,
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_flwor_with_constructors() {
    let kind = body_kind(
        r#"
        declare boundary-space strip;
        for $b in doc("books.xml")//book
        let $t := $b/title
        where $b/@year > 2000
        order by $t
        return <book year="{$b/@year}">
                 { $t/text() }
               </book>
        "#,
    );
    assert!(matches!(kind, ExprKind::Flwor(_)));
}

#[test]
fn test_full_text_query() {
    let kind = body_kind(
        "//book[. contains text 'xml query' all words using stemming window 10 words]",
    );
    assert!(matches!(kind, ExprKind::Path(_)));
}

#[test]
fn test_tag_mismatch_is_fatal() {
    let err = parse_main_module("<a>text</b>", ParserConfig::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TagMismatch);
    assert_eq!(err.code().as_str(), "XQST0118");
}

#[test]
fn test_syntax_error_location() {
    let src = "let $x := 1\nreturn $x +";
    let err = parse_main_module(src, ParserConfig::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Syntax);
    assert_eq!(err.diagnostic.location(src).line, 2);
}

#[test]
fn test_recorded_diagnostics_keep_order() {
    let parsed = parse_main_module(
        "declare ordering ordered; declare ordering unordered; \
         declare default collation 'a'; declare default collation 'b'; \
         x:y",
        ParserConfig::default(),
    )
    .unwrap();
    let codes: Vec<_> = parsed.diagnostics.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["XQST0065", "XQST0038", "XPST0081"]);
}

#[test]
fn test_core_only_config() {
    let config = ParserConfig::core_only();
    assert!(matches!(
        parse_expression("copy", config.clone()).unwrap().kind,
        ExprKind::Path(_)
    ));
    assert!(parse_expression("$a contains text 'x'", config).is_err());
}

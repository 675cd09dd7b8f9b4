//! Whole-parser properties: determinism, rollback, namespace balance and
//! literal unescaping.

use xqfront_ast::{Decimal, ExprKind, Literal};
use xqfront_parser::pattern::Matcher;
use xqfront_parser::rules;
use xqfront_parser::{ErrorCode, LexState, Parser, ParserConfig, StaticContext, parse_expression};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const QUERY: &str = r#"
xquery version "3.1";
declare namespace ex = "urn:example";
declare variable $limit as xs:integer := 10;
declare function local:label($n as xs:integer) as xs:string {
  concat("item-", $n)
};
for $i at $pos in 1 to $limit
let $e := <ex:item n="{$i}">{local:label($i)}</ex:item>
where $i mod 2 = 0
order by $i descending
return ($pos, $e/@n, //ex:item[1])
"#;

#[test]
fn test_parsing_is_deterministic() {
    init();
    let first = Parser::new(QUERY, ParserConfig::default())
        .parse_main_module()
        .unwrap();
    let second = Parser::new(QUERY, ParserConfig::default())
        .parse_main_module()
        .unwrap();
    assert_eq!(first.module, second.module);
    assert_eq!(
        serde_json::to_string(&first.module).unwrap(),
        serde_json::to_string(&second.module).unwrap()
    );
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_failed_match_does_not_move_cursor() {
    let config = ParserConfig::default();
    let cases: [(&str, LexState, &str); 5] = [
        ("for x in y", LexState::Expression, "for %^$"),
        ("element(a)", LexState::Expression, "element %Q %^{"),
        ("  (: c :) divide", LexState::Operator, "div"),
        ("p:x {", LexState::Expression, "%Q ("),
        ("12abc", LexState::Expression, "%N"),
    ];
    for (src, state, pattern) in cases {
        let mut m = Matcher::new(src, &config);
        m.goto(state);
        let before = m.pos();
        assert!(!m.try_match(pattern).unwrap(), "{} should not match {}", pattern, src);
        assert_eq!(m.pos(), before, "cursor moved for {}", pattern);
    }
}

#[test]
fn test_anchor_rewinds_after_match() {
    let mut m = Matcher::new("for $x in 1", &ParserConfig::default());
    assert!(m.eat(&rules::FOR).unwrap());
    assert_eq!(m.pos(), 4);
    assert_eq!(m.state(), LexState::Expression);
}

#[test]
fn test_namespace_frames_balance() {
    init();
    let config = ParserConfig::default();
    let baseline = StaticContext::new(&config).frame_depth();
    let parsed = Parser::new(
        r#"<a xmlns:p="urn:p"><p:b xmlns="urn:d">{<c xmlns:q="urn:q"/>}</p:b><d/></a>"#,
        config,
    )
    .parse_main_module()
    .unwrap();
    assert_eq!(parsed.context.frame_depth(), baseline);
    assert_eq!(parsed.context.resolve_prefix("p"), None);
}

#[test]
fn test_string_literal_unescaping() {
    let expr = parse_expression(r#""He said ""hi"" &amp; left""#, ParserConfig::default()).unwrap();
    assert_eq!(
        expr.kind,
        ExprKind::Literal(Literal::String(r#"He said "hi" & left"#.into()))
    );
    let expr = parse_expression("'&#65;&#x42;'''", ParserConfig::default()).unwrap();
    assert_eq!(expr.kind, ExprKind::Literal(Literal::String("AB'".into())));
}

#[test]
fn test_dot_forms() {
    let config = ParserConfig::default();
    assert_eq!(parse_expression(".", config.clone()).unwrap().kind, ExprKind::ContextItem);
    assert_eq!(
        parse_expression(".5", config.clone()).unwrap().kind,
        ExprKind::Literal(Literal::Decimal("0.5".parse::<Decimal>().unwrap()))
    );
    assert_eq!(
        parse_expression("1.", config.clone()).unwrap().kind,
        ExprKind::Literal(Literal::Decimal(Decimal::from(1)))
    );
    assert_eq!(
        parse_expression("1e2", config).unwrap().kind,
        ExprKind::Literal(Literal::Double(100.0))
    );
}

#[test]
fn test_wide_integer_literals() {
    let config = ParserConfig::default();
    assert_eq!(
        parse_expression("9223372036854775807", config.clone()).unwrap().kind,
        ExprKind::Literal(Literal::Integer(i64::MAX))
    );
    assert_eq!(
        parse_expression("99999999999999999999", config.clone()).unwrap().kind,
        ExprKind::Literal(Literal::Decimal(
            "99999999999999999999".parse::<Decimal>().unwrap()
        ))
    );
    let err = parse_expression(&"9".repeat(40), config).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ImplementationLimit);
    assert_eq!(err.code().as_str(), "XPDY0130");
}

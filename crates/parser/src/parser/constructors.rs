//! Direct (XML syntax) and computed node constructors.
//!
//! A direct element is scanned in the markup states: [`LexState::Tag`] for
//! the start tag, the attribute-value states, and [`LexState::Content`].
//! Enclosed expressions push [`LexState::Expression`] and pop back into the
//! markup state they came from, so the lexer's saved-state stack mirrors the
//! element nesting.

use super::{PResult, Parser};
use crate::context::{XML_NS, XMLNS_NS};
use crate::error::ErrorCode;
use crate::rules::*;
use crate::scanner;
use std::collections::HashSet;
use xqfront_ast::{
    AttributeValuePart, BoundarySpace, ComputedName, DirAttribute, DirContent, DirElement, Expr,
    ExprKind, NamespaceBinding, QName,
};

type LexicalName = (Option<String>, String);

/// An attribute as written, before namespace resolution.
struct RawAttribute {
    name: LexicalName,
    value: Vec<AttributeValuePart>,
    offset: usize,
}

fn lexical_string((prefix, local): &LexicalName) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.clone(),
    }
}

fn push_text(parts: &mut Vec<AttributeValuePart>, text: String) {
    if let Some(AttributeValuePart::Text(last)) = parts.last_mut() {
        last.push_str(&text);
    } else {
        parts.push(AttributeValuePart::Text(text));
    }
}

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn direct_constructor(&mut self) -> PResult<Option<Expr>> {
        if self.eat(&ELEMENT_OPEN)? {
            let offset = self.start();
            return self.dir_element(offset).map(Some);
        }
        if self.eat(&COMMENT_OPEN)? {
            let offset = self.start();
            return self.dir_comment(offset).map(Some);
        }
        if self.eat(&PI_OPEN)? {
            let offset = self.start();
            return self.dir_pi(offset).map(Some);
        }
        Ok(None)
    }

    /// Element after its `<name`. The caller has pushed [`LexState::Tag`];
    /// the closing `/>` or end tag pops it.
    fn dir_element(&mut self, offset: usize) -> PResult<Expr> {
        let lexical = self.captured_qname(0);
        self.enter()?;
        self.context.push_frame();
        let result = self.dir_element_in_frame(lexical, offset);
        self.context.pop_frame();
        self.leave();
        result
    }

    fn dir_element_in_frame(&mut self, lexical: LexicalName, offset: usize) -> PResult<Expr> {
        let mut raw = Vec::new();
        let mut namespaces: Vec<NamespaceBinding> = Vec::new();
        while self.eat(&ATTRIBUTE_NAME)? {
            let at = self.start();
            let name = self.captured_qname(0);
            let value = self.attribute_value()?;
            match (&name.0, name.1.as_str()) {
                (None, "xmlns") => self.namespace_attribute(None, value, at, &mut namespaces),
                (Some(p), local) if p == "xmlns" => {
                    let prefix = local.to_string();
                    self.namespace_attribute(Some(prefix), value, at, &mut namespaces)
                }
                _ => raw.push(RawAttribute {
                    name,
                    value,
                    offset: at,
                }),
            }
        }

        let name = self.element_name(lexical.clone(), offset);
        let mut seen = HashSet::new();
        let mut attributes = Vec::with_capacity(raw.len());
        for attr in raw {
            let name = self.plain_name(attr.name, attr.offset);
            if !seen.insert(name.expanded()) {
                self.record(
                    ErrorCode::DuplicateAttribute,
                    attr.offset,
                    format!("attribute '{}' occurs more than once", name),
                );
            }
            attributes.push(DirAttribute {
                name,
                value: attr.value,
                offset: attr.offset,
            });
        }

        if self.eat(&EMPTY_TAG_CLOSE)? {
            return Ok(self.node(
                ExprKind::DirElement(DirElement {
                    name,
                    attributes,
                    namespaces,
                    content: Vec::new(),
                    self_closing: true,
                }),
                offset,
            ));
        }
        if !self.eat(&START_TAG_CLOSE)? {
            return Err(self.unexpected("an attribute, '>' or '/>'"));
        }
        let content = self.element_content(&lexical)?;
        Ok(self.node(
            ExprKind::DirElement(DirElement {
                name,
                attributes,
                namespaces,
                content,
                self_closing: false,
            }),
            offset,
        ))
    }

    /// Quoted attribute value: literal text, references and enclosed
    /// expressions, through the closing quote.
    fn attribute_value(&mut self) -> PResult<Vec<AttributeValuePart>> {
        let (delimiter, close) = if self.eat(&ATTRIBUTE_QUOT_OPEN)? {
            ('"', &ATTRIBUTE_QUOT_CLOSE)
        } else if self.eat(&ATTRIBUTE_APOS_OPEN)? {
            ('\'', &ATTRIBUTE_APOS_CLOSE)
        } else {
            return Err(self.unexpected("a quoted attribute value"));
        };
        let mut parts = Vec::new();
        loop {
            if let Some(text) = self.lex(|i: &'src str| scanner::markup_text(i, Some(delimiter)))? {
                push_text(&mut parts, text.value);
            } else if self.eat(close)? {
                break;
            } else if self.eat(&ENCLOSED_OPEN)? {
                parts.push(AttributeValuePart::Enclosed(self.enclosed_content()?));
            } else {
                return Err(self.unexpected("the end of the attribute value"));
            }
        }
        Ok(parts)
    }

    /// Body of `{...}` in markup, after the brace. Closing pops back into
    /// the markup state.
    fn enclosed_content(&mut self) -> PResult<Expr> {
        let offset = self.start();
        if self.eat(&ENCLOSED_CLOSE)? {
            return Ok(self.node(ExprKind::Sequence(Vec::new()), offset));
        }
        let expr = self.expr()?;
        if !self.eat(&ENCLOSED_CLOSE)? {
            return Err(self.unexpected("'}'"));
        }
        Ok(expr)
    }

    fn namespace_attribute(
        &mut self,
        prefix: Option<String>,
        value: Vec<AttributeValuePart>,
        offset: usize,
        bindings: &mut Vec<NamespaceBinding>,
    ) {
        let mut uri = String::new();
        for part in value {
            match part {
                AttributeValuePart::Text(text) => uri.push_str(&text),
                AttributeValuePart::Enclosed(_) => {
                    self.record(
                        ErrorCode::NamespaceAttributeNotLiteral,
                        offset,
                        "a namespace declaration attribute must have a literal value",
                    );
                }
            }
        }
        if bindings.iter().any(|b| b.prefix == prefix) {
            self.record(
                ErrorCode::DuplicateNamespaceAttribute,
                offset,
                match &prefix {
                    Some(p) => format!("namespace prefix '{}' is declared twice", p),
                    None => "the default namespace is declared twice".to_string(),
                },
            );
        }
        match &prefix {
            Some(p) => {
                if uri.is_empty() {
                    self.record(
                        ErrorCode::EmptyNamespaceUri,
                        offset,
                        format!("namespace prefix '{}' cannot be bound to an empty URI", p),
                    );
                }
                self.check_namespace_binding(p, &uri, offset);
                self.context.bind(p, &uri);
            }
            None => {
                if uri == XML_NS || uri == XMLNS_NS {
                    self.record(
                        ErrorCode::ReservedNamespace,
                        offset,
                        format!("'{}' cannot be a default namespace", uri),
                    );
                }
                self.context.bind("", &uri);
            }
        }
        bindings.push(NamespaceBinding { prefix, uri });
    }

    fn element_content(&mut self, open: &LexicalName) -> PResult<Vec<DirContent>> {
        let strip = self.context.boundary_space == BoundarySpace::Strip;
        let mut content = Vec::new();
        loop {
            if self.eat(&END_TAG)? {
                let close = self.captured_qname(0);
                if &close != open {
                    return Err(self.fatal(
                        ErrorCode::TagMismatch,
                        self.start(),
                        format!(
                            "end tag '{}' does not match start tag '{}'",
                            lexical_string(&close),
                            lexical_string(open)
                        ),
                    ));
                }
                break;
            }
            if self.eat(&NESTED_ELEMENT_OPEN)? {
                let offset = self.start();
                content.push(DirContent::Node(self.dir_element(offset)?));
            } else if self.eat(&CDATA_OPEN)? {
                let body = self.lex(scanner::cdata_body)?.unwrap_or_default();
                content.push(DirContent::CData(body.to_string()));
            } else if self.eat(&NESTED_COMMENT_OPEN)? {
                let offset = self.start();
                content.push(DirContent::Node(self.dir_comment(offset)?));
            } else if self.eat(&NESTED_PI_OPEN)? {
                let offset = self.start();
                content.push(DirContent::Node(self.dir_pi(offset)?));
            } else if let Some(text) = self.lex(|i: &'src str| scanner::markup_text(i, None))? {
                // Runs first so that `{{` folds to a literal brace.
                if !(strip && text.boundary) {
                    match content.last_mut() {
                        Some(DirContent::Text(last)) => last.push_str(&text.value),
                        _ => content.push(DirContent::Text(text.value)),
                    }
                }
            } else if self.eat(&ENCLOSED_OPEN)? {
                content.push(DirContent::Enclosed(self.enclosed_content()?));
            } else if self.scan.cursor().is_eof() {
                return Err(self.fatal(
                    ErrorCode::Syntax,
                    self.scan.pos(),
                    format!("element '{}' is not closed", lexical_string(open)),
                ));
            } else {
                return Err(self.unexpected("element content"));
            }
        }
        Ok(content)
    }

    fn dir_comment(&mut self, offset: usize) -> PResult<Expr> {
        let body = self.lex(scanner::xml_comment_body)?.unwrap_or_default();
        Ok(self.node(ExprKind::DirComment(body.to_string()), offset))
    }

    fn dir_pi(&mut self, offset: usize) -> PResult<Expr> {
        let target = self.captured_name(0);
        if target.eq_ignore_ascii_case("xml") {
            self.record(
                ErrorCode::Syntax,
                offset,
                format!("'{}' is reserved and cannot be a processing-instruction target", target),
            );
        }
        let content = self
            .lex(|i: &'src str| scanner::delimited_content(i, "?>", "processing instruction"))?
            .unwrap_or_default();
        Ok(self.node(
            ExprKind::DirPi {
                target,
                content: content.to_string(),
            },
            offset,
        ))
    }

    pub(super) fn computed_constructor(&mut self) -> PResult<Option<Expr>> {
        let offset = self.scan.next_offset();
        let kind = if self.eat(&COMP_DOCUMENT)? {
            ExprKind::CompDocument(self.enclosed_expr()?.boxed())
        } else if self.eat(&COMP_ELEMENT_NAMED)? {
            let at = self.start();
            let lexical = self.captured_qname(0);
            let name = ComputedName::Literal(self.element_name(lexical, at));
            ExprKind::CompElement {
                name,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_ELEMENT)? {
            let name = ComputedName::Expr(self.braced_expr()?.boxed());
            ExprKind::CompElement {
                name,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_ATTRIBUTE_NAMED)? {
            let at = self.start();
            let lexical = self.captured_qname(0);
            let name = ComputedName::Literal(self.plain_name(lexical, at));
            ExprKind::CompAttribute {
                name,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_ATTRIBUTE)? {
            let name = ComputedName::Expr(self.braced_expr()?.boxed());
            ExprKind::CompAttribute {
                name,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_TEXT)? {
            ExprKind::CompText(self.enclosed_expr()?.boxed())
        } else if self.eat(&COMP_COMMENT)? {
            ExprKind::CompComment(self.enclosed_expr()?.boxed())
        } else if self.eat(&COMP_PI_NAMED)? {
            let target = ComputedName::Literal(QName::new(self.captured_name(0)));
            ExprKind::CompPi {
                target,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_PI)? {
            let target = ComputedName::Expr(self.braced_expr()?.boxed());
            ExprKind::CompPi {
                target,
                content: self.optional_content()?,
            }
        } else if self.eat(&COMP_NAMESPACE_NAMED)? {
            let prefix = ComputedName::Literal(QName::new(self.captured_name(0)));
            ExprKind::CompNamespace {
                prefix,
                uri: self.enclosed_expr()?.boxed(),
            }
        } else if self.eat(&COMP_NAMESPACE)? {
            let prefix = ComputedName::Expr(self.braced_expr()?.boxed());
            ExprKind::CompNamespace {
                prefix,
                uri: self.enclosed_expr()?.boxed(),
            }
        } else {
            return Ok(None);
        };
        Ok(Some(self.node(kind, offset)))
    }

    /// `{}` gives no content, as opposed to an explicit `{()}`.
    fn optional_content(&mut self) -> PResult<Option<Box<Expr>>> {
        self.expect(&LBRACE)?;
        if self.eat(&RBRACE)? {
            return Ok(None);
        }
        let expr = self.expr()?;
        self.expect(&RBRACE)?;
        Ok(Some(expr.boxed()))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::error::ErrorCode;
    use crate::parser::Parser;
    use xqfront_ast::{
        AttributeValuePart, BoundarySpace, ComputedName, DirContent, DirElement, Expr, ExprKind,
    };

    fn parse(src: &str) -> Expr {
        Parser::new(src, ParserConfig::default())
            .parse_expression()
            .unwrap()
    }

    fn element(src: &str) -> DirElement {
        match parse(src).kind {
            ExprKind::DirElement(e) => e,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_self_closing() {
        let e = element("<a/>");
        assert!(e.self_closing);
        assert_eq!(e.name.local_part, "a");
        assert!(e.content.is_empty());
    }

    #[test]
    fn test_doubled_braces_in_content() {
        let text = |src: &str| match element(src).content.as_slice() {
            [DirContent::Text(t)] => t.clone(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(text("<a>{{</a>"), "{");
        assert_eq!(text("<a>{{x}}</a>"), "{x}");
        assert!(matches!(
            element("<a><b/>{{x}}</a>").content.as_slice(),
            [DirContent::Node(_), DirContent::Text(t)] if t == "{x}"
        ));
        assert!(matches!(
            element("<a>{1}{{</a>").content.as_slice(),
            [DirContent::Enclosed(_), DirContent::Text(t)] if t == "{"
        ));
    }

    #[test]
    fn test_attributes_and_content() {
        let e = element(r#"<p class="x {1 + 1} y" id='a''b'>Hi &amp; {$name}<b/></p>"#);
        assert_eq!(e.attributes.len(), 2);
        assert!(matches!(
            e.attributes[0].value.as_slice(),
            [AttributeValuePart::Text(a), AttributeValuePart::Enclosed(_), AttributeValuePart::Text(b)]
                if a == "x " && b == " y"
        ));
        assert_eq!(
            e.attributes[1].value,
            vec![AttributeValuePart::Text("a'b".into())]
        );
        assert!(matches!(&e.content[0], DirContent::Text(t) if t == "Hi & "));
        assert!(matches!(e.content[1], DirContent::Enclosed(_)));
        assert!(matches!(e.content[2], DirContent::Node(_)));
    }

    #[test]
    fn test_boundary_whitespace() {
        let e = element("<a>\n  <b/>  </a>");
        assert_eq!(e.content.len(), 1);

        let config = ParserConfig::default().with_boundary_space(BoundarySpace::Preserve);
        let expr = Parser::new("<a> <b/> </a>", config).parse_expression().unwrap();
        match expr.kind {
            ExprKind::DirElement(e) => assert_eq!(e.content.len(), 3),
            other => panic!("unexpected {:?}", other),
        }

        let e = element("<a> x </a>");
        assert!(matches!(&e.content[0], DirContent::Text(t) if t == " x "));
    }

    #[test]
    fn test_markup_nodes() {
        let e = element("<a><![CDATA[<not markup>]]><!-- note --><?php echo ?></a>");
        assert!(matches!(&e.content[0], DirContent::CData(t) if t == "<not markup>"));
        assert!(matches!(&e.content[1], DirContent::Node(n) if n.kind == ExprKind::DirComment(" note ".into())));
        assert!(matches!(
            &e.content[2],
            DirContent::Node(n) if matches!(&n.kind, ExprKind::DirPi { target, content } if target == "php" && content == "echo ")
        ));
        assert!(matches!(parse("<!--x-->").kind, ExprKind::DirComment(ref c) if c == "x"));
    }

    #[test]
    fn test_namespace_attributes() {
        let e = element(r#"<x:a xmlns:x="urn:x" xmlns="urn:d"><b/></x:a>"#);
        assert_eq!(e.namespaces.len(), 2);
        assert_eq!(e.name.namespace.as_deref(), Some("urn:x"));
        match &e.content[0] {
            DirContent::Node(n) => match &n.kind {
                ExprKind::DirElement(b) => assert_eq!(b.name.namespace.as_deref(), Some("urn:d")),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }

        let parsed = Parser::new("<x:a xmlns:x='urn:x'/>, x:b", ParserConfig::default())
            .parse_main_module()
            .unwrap();
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].code, ErrorCode::UnknownPrefix);
    }

    #[test]
    fn test_start_tag_errors() {
        let parsed = Parser::new("<a b='1' b='2' xmlns:p=''/>", ParserConfig::default())
            .parse_main_module()
            .unwrap();
        let codes: Vec<_> = parsed.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::EmptyNamespaceUri, ErrorCode::DuplicateAttribute]);

        let parsed = Parser::new("<a xmlns:p='{1}'/>", ParserConfig::default())
            .parse_main_module()
            .unwrap();
        assert_eq!(parsed.diagnostics[0].code, ErrorCode::NamespaceAttributeNotLiteral);
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = Parser::new("<a>text</b>", ParserConfig::default())
            .parse_expression()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TagMismatch);
        assert_eq!(err.code().as_str(), "XQST0118");

        let err = Parser::new("<a>text", ParserConfig::default())
            .parse_expression()
            .unwrap_err();
        assert!(err.message().contains("not closed"));
    }

    #[test]
    fn test_element_then_operator() {
        match parse("<a/> | <b>{1}</b>").kind {
            ExprKind::Binary { .. } => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_computed_constructors() {
        assert!(matches!(
            parse("element foo { 1 }").kind,
            ExprKind::CompElement { name: ComputedName::Literal(ref n), content: Some(_) } if n.local_part == "foo"
        ));
        assert!(matches!(
            parse("attribute { 'a' } {}").kind,
            ExprKind::CompAttribute { name: ComputedName::Expr(_), content: None }
        ));
        assert!(matches!(parse("document { <a/> }").kind, ExprKind::CompDocument(_)));
        assert!(matches!(parse("text { 'x' }").kind, ExprKind::CompText(_)));
        assert!(matches!(parse("comment { 'x' }").kind, ExprKind::CompComment(_)));
        assert!(matches!(
            parse("processing-instruction php { 'x' }").kind,
            ExprKind::CompPi { target: ComputedName::Literal(_), .. }
        ));
        assert!(matches!(
            parse("namespace p { 'urn:p' }").kind,
            ExprKind::CompNamespace { prefix: ComputedName::Literal(_), .. }
        ));
        assert!(matches!(parse("element(a)").kind, ExprKind::Path(_) | ExprKind::Step(_)));
    }
}

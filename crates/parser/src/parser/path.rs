//! Path expressions, steps, node tests and primary expressions.

use super::{PResult, Parser};
use crate::error::ErrorCode;
use crate::lexer::LexState;
use crate::rules::*;
use std::collections::HashSet;
use std::sync::LazyLock;
use xqfront_ast::{
    Axis, Expr, ExprKind, InlineFunction, KindTest, Literal, NameTest, NodeTest, PathExpr,
    PathRoot, Step,
};

/// Unprefixed names that can never be function calls because the same
/// spelling followed by `(` starts a type test or keyword expression.
static RESERVED_FUNCTION_NAMES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "attribute",
        "comment",
        "document-node",
        "element",
        "empty-sequence",
        "function",
        "if",
        "item",
        "namespace-node",
        "node",
        "processing-instruction",
        "schema-attribute",
        "schema-element",
        "switch",
        "text",
        "typeswitch",
    ]
    .into_iter()
    .collect()
});

pub(crate) fn is_reserved_function_name(local: &str) -> bool {
    RESERVED_FUNCTION_NAMES.contains(local)
}

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn path_expr(&mut self) -> PResult<Expr> {
        if self.eat(&ROOT_DESCENDANTS)? {
            let offset = self.start();
            let mut steps = vec![self.descendant_or_self(offset)];
            steps.push(self.required_step()?);
            return self.relative_path(PathRoot::RootDescendants, steps, offset);
        }
        if self.eat(&ROOT)? {
            let offset = self.start();
            let Some(first) = self.step_expr()? else {
                self.goto(LexState::Operator);
                return Ok(self.node(
                    ExprKind::Path(PathExpr {
                        root: PathRoot::Root,
                        steps: Vec::new(),
                    }),
                    offset,
                ));
            };
            return self.relative_path(PathRoot::Root, vec![first], offset);
        }
        let first = self.required_step()?;
        let offset = first.offset;
        self.relative_path(PathRoot::Relative, vec![first], offset)
    }

    fn relative_path(&mut self, root: PathRoot, mut steps: Vec<Expr>, offset: usize) -> PResult<Expr> {
        loop {
            if self.eat(&DESCENDANTS_SEP)? {
                let at = self.start();
                steps.push(self.descendant_or_self(at));
                steps.push(self.required_step()?);
            } else if self.eat(&SLASH_SEP)? {
                steps.push(self.required_step()?);
            } else {
                break;
            }
        }
        if root == PathRoot::Relative
            && steps.len() == 1
            && !matches!(steps[0].kind, ExprKind::Step(_))
        {
            return Ok(steps.remove(0));
        }
        Ok(self.node(ExprKind::Path(PathExpr { root, steps }), offset))
    }

    fn descendant_or_self(&self, offset: usize) -> Expr {
        self.node(
            ExprKind::Step(Step {
                axis: Axis::DescendantOrSelf,
                node_test: NodeTest::Kind(KindTest::AnyKind),
                predicates: Vec::new(),
            }),
            offset,
        )
    }

    fn required_step(&mut self) -> PResult<Expr> {
        match self.step_expr()? {
            Some(step) => Ok(step),
            None => Err(self.unexpected("an expression")),
        }
    }

    /// A primary expression with its postfix predicates and calls, or an
    /// axis step.
    fn step_expr(&mut self) -> PResult<Option<Expr>> {
        if let Some(primary) = self.primary()? {
            return self.postfix(primary).map(Some);
        }
        self.axis_step()
    }

    fn postfix(&mut self, base: Expr) -> PResult<Expr> {
        let mut expr = base;
        let mut predicates = Vec::new();
        loop {
            if self.eat(&PREDICATE_OPEN)? {
                predicates.push(self.predicate()?);
            } else if self.eat(&DYNAMIC_CALL)? {
                expr = self.filter(expr, std::mem::take(&mut predicates));
                let offset = expr.offset;
                let args = self.argument_list()?;
                expr = self.node(
                    ExprKind::DynamicCall {
                        function: expr.boxed(),
                        args,
                    },
                    offset,
                );
            } else {
                break;
            }
        }
        Ok(self.filter(expr, predicates))
    }

    fn filter(&self, base: Expr, predicates: Vec<Expr>) -> Expr {
        if predicates.is_empty() {
            return base;
        }
        let offset = base.offset;
        self.node(
            ExprKind::Filter {
                base: base.boxed(),
                predicates,
            },
            offset,
        )
    }

    /// Predicate body after `[`, through `]`.
    fn predicate(&mut self) -> PResult<Expr> {
        let expr = self.expr()?;
        self.expect(&PREDICATE_CLOSE)?;
        Ok(expr)
    }

    fn axis_step(&mut self) -> PResult<Option<Expr>> {
        let begin = self.scan.next_offset();
        let (axis, node_test, offset) = if self.eat(&AXIS)? {
            let offset = self.start();
            let name = self.captured_name(0);
            let Some(axis) = Axis::from_name(&name) else {
                return Err(self.fatal(
                    ErrorCode::Syntax,
                    offset,
                    format!("unknown axis '{}'", name),
                ));
            };
            (axis, self.required_node_test(axis)?, offset)
        } else if self.eat(&ABBREV_ATTRIBUTE)? {
            let offset = self.start();
            (Axis::Attribute, self.required_node_test(Axis::Attribute)?, offset)
        } else if self.eat(&PARENT)? {
            (Axis::Parent, NodeTest::Kind(KindTest::AnyKind), self.start())
        } else if let Some(test) = self.kind_test()? {
            let axis = match test {
                KindTest::Attribute(..) | KindTest::SchemaAttribute(_) => Axis::Attribute,
                KindTest::NamespaceNode => Axis::Namespace,
                _ => Axis::Child,
            };
            (axis, NodeTest::Kind(test), begin)
        } else if let Some(test) = self.name_test(self.default_name_test_namespace(Axis::Child))? {
            (Axis::Child, NodeTest::Name(test), begin)
        } else {
            return Ok(None);
        };
        self.goto(LexState::Operator);
        let mut predicates = Vec::new();
        while self.eat(&PREDICATE_OPEN)? {
            predicates.push(self.predicate()?);
        }
        Ok(Some(self.node(
            ExprKind::Step(Step {
                axis,
                node_test,
                predicates,
            }),
            offset,
        )))
    }

    fn default_name_test_namespace(&self, axis: Axis) -> Option<String> {
        match axis {
            Axis::Attribute | Axis::Namespace => None,
            _ => self.context.default_element_namespace().map(str::to_string),
        }
    }

    fn required_node_test(&mut self, axis: Axis) -> PResult<NodeTest> {
        if let Some(test) = self.kind_test()? {
            return Ok(NodeTest::Kind(test));
        }
        let default = self.default_name_test_namespace(axis);
        match self.name_test(default)? {
            Some(test) => Ok(NodeTest::Name(test)),
            None => Err(self.unexpected("a node test")),
        }
    }

    /// `*`, `prefix:*`, `*:local` or a QName.
    pub(super) fn name_test(&mut self, default: Option<String>) -> PResult<Option<NameTest>> {
        if self.eat(&WILDCARD_PREFIX)? {
            return Ok(Some(NameTest::Local(self.captured_name(0))));
        }
        if self.eat(&WILDCARD_LOCAL)? {
            let offset = self.start();
            let prefix = self.captured_name(0);
            let namespace = self.context.resolve_prefix(&prefix).map(str::to_string);
            if namespace.is_none() {
                self.record(
                    ErrorCode::UnknownPrefix,
                    offset,
                    format!("namespace prefix '{}' is not declared", prefix),
                );
            }
            return Ok(Some(NameTest::Namespace { prefix, namespace }));
        }
        if self.eat(&WILDCARD)? {
            return Ok(Some(NameTest::Any));
        }
        if self.eat(&NAME_TEST)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            return Ok(Some(NameTest::Name(self.resolve_name(lexical, default, offset))));
        }
        Ok(None)
    }

    fn primary(&mut self) -> PResult<Option<Expr>> {
        if self.eat(&NUMBER)? {
            let offset = self.start();
            let value = self.scan.captures().number(0).unwrap_or(Literal::Integer(0));
            return Ok(Some(self.node(ExprKind::Literal(value), offset)));
        }
        if self.eat(&STRING)? {
            let offset = self.start();
            let value = self.captured_string(0);
            return Ok(Some(self.node(ExprKind::Literal(Literal::String(value)), offset)));
        }
        if self.peek(&VARIABLE)? {
            let var = self.variable_name()?;
            let offset = self.start();
            return Ok(Some(self.node(ExprKind::VarRef(var), offset)));
        }
        if self.eat(&LPAREN)? {
            let offset = self.start();
            if self.eat(&RPAREN)? {
                return Ok(Some(self.node(ExprKind::Sequence(Vec::new()), offset)));
            }
            let inner = self.expr()?;
            self.expect(&RPAREN)?;
            return Ok(Some(inner));
        }
        if !self.peek(&PARENT)? && self.eat(&CONTEXT_ITEM)? {
            return Ok(Some(self.node(ExprKind::ContextItem, self.start())));
        }
        if let Some(constructor) = self.direct_constructor()? {
            return Ok(Some(constructor));
        }
        if let Some(constructor) = self.computed_constructor()? {
            return Ok(Some(constructor));
        }
        if self.eat(&ORDERED)? {
            let offset = self.start();
            let expr = self.braced_expr()?;
            return Ok(Some(self.node(ExprKind::Ordered(expr.boxed()), offset)));
        }
        if self.eat(&UNORDERED)? {
            let offset = self.start();
            let expr = self.braced_expr()?;
            return Ok(Some(self.node(ExprKind::Unordered(expr.boxed()), offset)));
        }
        if self.peek(&ANNOTATION)? || self.peek(&INLINE_FUNCTION)? {
            return self.inline_function().map(Some);
        }
        if self.eat(&NAMED_FUNCTION_REF)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            let arity = match self.scan.captures().number(1) {
                Some(Literal::Integer(n)) if n >= 0 => n as usize,
                _ => {
                    return Err(self.fatal(
                        ErrorCode::Syntax,
                        offset,
                        "function arity must be a non-negative integer",
                    ));
                }
            };
            let name = self.function_name(lexical, offset);
            return Ok(Some(self.node(ExprKind::NamedFunctionRef { name, arity }, offset)));
        }
        if self.peek(&FUNCTION_CALL)? {
            let (prefix, local) = self.captured_qname(0);
            if prefix.is_none() && is_reserved_function_name(&local) {
                return Ok(None);
            }
            self.expect(&FUNCTION_CALL)?;
            let offset = self.start();
            let name = self.function_name((prefix, local), offset);
            let args = self.argument_list()?;
            return Ok(Some(self.node(ExprKind::FunctionCall { name, args }, offset)));
        }
        Ok(None)
    }

    /// Arguments after `(`, through `)`. `?` stands for an argument left
    /// open by partial application.
    fn argument_list(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(&RPAREN)? {
            return Ok(args);
        }
        loop {
            if self.eat(&ARGUMENT_PLACEHOLDER)? {
                let offset = self.start();
                args.push(self.node(ExprKind::ArgumentPlaceholder, offset));
            } else {
                args.push(self.expr_single()?);
            }
            if !self.eat(&COMMA)? {
                break;
            }
        }
        self.expect(&RPAREN)?;
        Ok(args)
    }

    fn inline_function(&mut self) -> PResult<Expr> {
        let offset = self.scan.next_offset();
        let annotations = self.annotations()?;
        self.expect(&INLINE_FUNCTION)?;
        self.expect(&PARAMS_OPEN)?;
        let params = self.param_list()?;
        let return_type = if self.eat(&VAR_AS)? {
            Some(self.sequence_type(LexState::VarDecl)?)
        } else {
            None
        };
        self.expect(&BODY_OPEN)?;
        let body_offset = self.start();
        let body = self.function_body(false, body_offset)?;
        Ok(self.node(
            ExprKind::InlineFunction(InlineFunction {
                annotations,
                params,
                return_type,
                body: body.boxed(),
            }),
            offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::error::ErrorCode;
    use crate::parser::Parser;
    use xqfront_ast::{
        Axis, Decimal, ExprKind, KindTest, Literal, NameTest, NodeTest, PathRoot,
    };

    fn parse(src: &str) -> ExprKind {
        Parser::new(src, ParserConfig::default())
            .parse_expression()
            .unwrap()
            .kind
    }

    #[test]
    fn test_dot_and_numbers() {
        assert_eq!(parse("."), ExprKind::ContextItem);
        assert_eq!(
            parse(".5"),
            ExprKind::Literal(Literal::Decimal(Decimal::new(5, 1)))
        );
        assert_eq!(parse("1."), ExprKind::Literal(Literal::Decimal(Decimal::new(1, 0))));
        let err = Parser::new("12abc", ParserConfig::default())
            .parse_expression()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Syntax);
    }

    #[test]
    fn test_single_step_is_wrapped() {
        match parse("book") {
            ExprKind::Path(path) => {
                assert_eq!(path.root, PathRoot::Relative);
                assert_eq!(path.steps.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_root_descendants() {
        match parse("//a/@id") {
            ExprKind::Path(path) => {
                assert_eq!(path.root, PathRoot::RootDescendants);
                assert_eq!(path.steps.len(), 3);
                assert!(matches!(
                    path.steps[0].kind,
                    ExprKind::Step(ref s) if s.axis == Axis::DescendantOrSelf
                ));
                assert!(matches!(
                    path.steps[2].kind,
                    ExprKind::Step(ref s) if s.axis == Axis::Attribute
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lone_root() {
        assert!(matches!(
            parse("/"),
            ExprKind::Path(ref p) if p.root == PathRoot::Root && p.steps.is_empty()
        ));
        assert!(matches!(parse("(/)"), ExprKind::Path(_)));
    }

    #[test]
    fn test_axes_and_tests() {
        match parse("ancestor-or-self::x:*/child::node()/../text()[1]") {
            ExprKind::Path(path) => {
                assert_eq!(path.steps.len(), 4);
                match &path.steps[0].kind {
                    ExprKind::Step(step) => {
                        assert_eq!(step.axis, Axis::AncestorOrSelf);
                        assert!(matches!(step.node_test, NodeTest::Name(NameTest::Namespace { .. })));
                    }
                    other => panic!("unexpected {:?}", other),
                }
                assert!(matches!(
                    path.steps[3].kind,
                    ExprKind::Step(ref s) if s.predicates.len() == 1
                        && s.node_test == NodeTest::Kind(KindTest::Text)
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
        let err = Parser::new("sideways::x", ParserConfig::default())
            .parse_expression()
            .unwrap_err();
        assert!(err.message().contains("unknown axis"));
    }

    #[test]
    fn test_filter_expressions() {
        match parse("$items[1][@x]") {
            ExprKind::Filter { base, predicates } => {
                assert!(matches!(base.kind, ExprKind::VarRef(_)));
                assert_eq!(predicates.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_calls() {
        match parse("fn:concat('a', ?)") {
            ExprKind::FunctionCall { name, args } => {
                assert_eq!(name.local_part, "concat");
                assert!(matches!(args[1].kind, ExprKind::ArgumentPlaceholder));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse("count#1"),
            ExprKind::NamedFunctionRef { arity: 1, .. }
        ));
        assert!(matches!(parse("$f(1)(2)"), ExprKind::DynamicCall { .. }));
        // a reserved name followed by `(` is a kind test, not a call
        assert!(matches!(parse("node()"), ExprKind::Path(_)));
    }

    #[test]
    fn test_inline_function() {
        match parse("%local:memo function($a as xs:integer) as xs:integer { $a + 1 }") {
            ExprKind::InlineFunction(f) => {
                assert_eq!(f.annotations.len(), 1);
                assert_eq!(f.params.len(), 1);
                assert!(f.return_type.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse("function() { }"),
            ExprKind::InlineFunction(ref f) if matches!(f.body.kind, ExprKind::Sequence(ref v) if v.is_empty())
        ));
    }

    #[test]
    fn test_empty_and_parenthesized() {
        assert_eq!(parse("()"), ExprKind::Sequence(Vec::new()));
        assert!(matches!(parse("(1, 2)[2]"), ExprKind::Filter { .. }));
    }
}

//! Scripting extension: blocks, assignment, loops and exits.

use super::{PResult, Parser};
use crate::lexer::LexState;
use crate::rules::*;
use xqfront_ast::{Block, BlockVarDecl, Expr, ExprKind};

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn scripting_expr(&mut self) -> PResult<Option<Expr>> {
        let offset = self.scan.next_offset();
        let kind = if self.eat(&BLOCK)? {
            self.expect(&LBRACE)?;
            return self.block_body(offset).map(Some);
        } else if self.eat(&WHILE)? {
            self.expect(&LPAREN)?;
            let condition = self.expr()?;
            self.expect(&RPAREN)?;
            self.goto(LexState::Expression);
            let body = self.expr_single()?;
            ExprKind::While {
                condition: condition.boxed(),
                body: body.boxed(),
            }
        } else if self.eat(&EXIT_RETURNING)? || self.eat(&EXIT_WITH)? {
            ExprKind::Exit(self.expr_single()?.boxed())
        } else if self.eat(&BREAK_LOOP)? {
            ExprKind::BreakLoop
        } else if self.eat(&CONTINUE_LOOP)? {
            ExprKind::ContinueLoop
        } else if self.eat(&SET)? {
            let var = self.variable_name()?;
            self.expect(&ASSIGN)?;
            let value = self.expr_single()?;
            ExprKind::Assign {
                var,
                value: value.boxed(),
            }
        } else if self.eat(&ASSIGNMENT)? {
            let at = self.start();
            let lexical = self.captured_qname(0);
            let var = self.plain_name(lexical, at);
            let value = self.expr_single()?;
            ExprKind::Assign {
                var,
                value: value.boxed(),
            }
        } else {
            return Ok(None);
        };
        Ok(Some(self.node(kind, offset)))
    }

    /// Block contents after `{`: `declare $v := e, ...;` declarations, then
    /// `;`-separated statements, through the closing `}`.
    pub(super) fn block_body(&mut self, offset: usize) -> PResult<Expr> {
        let mut declarations = Vec::new();
        while self.eat(&BLOCK_DECLARE)? {
            loop {
                let (var, type_decl) = self.typed_variable()?;
                let value = if self.eat(&ASSIGN)? {
                    Some(self.expr_single()?)
                } else {
                    None
                };
                declarations.push(BlockVarDecl {
                    var,
                    type_decl,
                    value,
                });
                if !self.eat(&COMMA)? {
                    break;
                }
            }
            self.expect(&STATEMENT_SEPARATOR)?;
        }
        let mut body = Vec::new();
        while !self.eat(&RBRACE)? {
            body.push(self.expr()?);
            if !self.eat(&STATEMENT_SEPARATOR)? {
                self.expect(&RBRACE)?;
                break;
            }
        }
        Ok(self.node(ExprKind::Block(Block { declarations, body }), offset))
    }

    /// Body of a main module. With scripting enabled it is a sequence of
    /// `;`-separated statements, which becomes a block.
    pub(super) fn query_body(&mut self) -> PResult<Expr> {
        let offset = self.scan.next_offset();
        let first = self.expr()?;
        if !self.eat(&STATEMENT_SEPARATOR)? {
            return Ok(first);
        }
        let mut body = vec![first];
        while !self.at_end()? {
            body.push(self.expr()?);
            if !self.eat(&STATEMENT_SEPARATOR)? {
                break;
            }
        }
        Ok(self.node(
            ExprKind::Block(Block {
                declarations: Vec::new(),
                body,
            }),
            offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::parser::Parser;
    use xqfront_ast::{Expr, ExprKind, Module};

    fn body(src: &str) -> Expr {
        let parsed = Parser::new(src, ParserConfig::default())
            .parse_main_module()
            .unwrap();
        match parsed.module {
            Module::Main(main) => main.body,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_block_with_declarations() {
        match body("block { declare $i as xs:integer := 0, $j; set $i := $i + 1; $i }").kind {
            ExprKind::Block(block) => {
                assert_eq!(block.declarations.len(), 2);
                assert!(block.declarations[0].type_decl.is_some());
                assert!(block.declarations[1].value.is_none());
                assert_eq!(block.body.len(), 2);
                assert!(matches!(block.body[0].kind, ExprKind::Assign { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_loop_statements() {
        match body("while ($i < 10) block { $i := $i + 1; if ($i = 5) then break loop else continue loop; }").kind {
            ExprKind::While { body, .. } => match &body.kind {
                ExprKind::Block(block) => {
                    assert_eq!(block.body.len(), 2);
                    assert!(matches!(block.body[0].kind, ExprKind::Assign { .. }));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(body("exit returning 42").kind, ExprKind::Exit(_)));
        assert!(matches!(body("exit with 42").kind, ExprKind::Exit(_)));
    }

    #[test]
    fn test_statement_sequence() {
        match body("set $a := 1; $a;").kind {
            ExprKind::Block(block) => {
                assert!(block.declarations.is_empty());
                assert_eq!(block.body.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(body("1, 2").kind, ExprKind::Sequence(_)));
    }

    #[test]
    fn test_sequential_function_body() {
        let parsed = Parser::new(
            "declare sequential function local:f() { declare $x := 1; $x := 2; $x }; local:f()",
            ParserConfig::default(),
        )
        .parse_main_module()
        .unwrap();
        let function = parsed.module.prolog().functions().next().unwrap();
        assert!(matches!(
            function.body.as_ref().map(|b| &b.kind),
            Some(ExprKind::Block(block)) if block.declarations.len() == 1 && block.body.len() == 2
        ));
    }

    #[test]
    fn test_disabled() {
        let config = ParserConfig::default().with_scripting(false);
        assert!(Parser::new("block { 1 }", config.clone()).parse_main_module().is_err());
        assert!(Parser::new("1; 2", config).parse_main_module().is_err());
    }
}

//! Expressions: the comma operator, keyword expressions and the operator
//! precedence layers down to value expressions.

use super::{PResult, Parser};
use crate::error::ErrorCode;
use crate::lexer::LexState;
use crate::pattern::Rule;
use crate::rules::*;
use crate::scanner;
use xqfront_ast::{
    BinaryOperator, CatchClause, Expr, ExprKind, Pragma, QuantifiedBinding, Quantifier,
    SwitchCase, TypeswitchCase, UnaryOperator, ValidationMode,
};

type Operators = [(&'static Rule, BinaryOperator)];

const OR_OPS: [(&Rule, BinaryOperator); 1] = [(&OR, BinaryOperator::Or)];
const AND_OPS: [(&Rule, BinaryOperator); 1] = [(&AND, BinaryOperator::And)];

/// Longer spellings come before their prefixes.
const COMPARISON_OPS: [(&Rule, BinaryOperator); 15] = [
    (&GENERAL_NE, BinaryOperator::NotEquals),
    (&GENERAL_LE, BinaryOperator::LessThanOrEqual),
    (&NODE_PRECEDES, BinaryOperator::Precedes),
    (&GENERAL_LT, BinaryOperator::LessThan),
    (&GENERAL_GE, BinaryOperator::GreaterThanOrEqual),
    (&NODE_FOLLOWS, BinaryOperator::Follows),
    (&GENERAL_GT, BinaryOperator::GreaterThan),
    (&GENERAL_EQ, BinaryOperator::Equals),
    (&VALUE_EQ, BinaryOperator::ValueEq),
    (&VALUE_NE, BinaryOperator::ValueNe),
    (&VALUE_LT, BinaryOperator::ValueLt),
    (&VALUE_LE, BinaryOperator::ValueLe),
    (&VALUE_GT, BinaryOperator::ValueGt),
    (&VALUE_GE, BinaryOperator::ValueGe),
    (&NODE_IS, BinaryOperator::Is),
];

const ADDITIVE_OPS: [(&Rule, BinaryOperator); 2] = [
    (&PLUS, BinaryOperator::Plus),
    (&MINUS, BinaryOperator::Minus),
];

const MULTIPLICATIVE_OPS: [(&Rule, BinaryOperator); 4] = [
    (&MULTIPLY, BinaryOperator::Multiply),
    (&IDIV, BinaryOperator::IntegerDivide),
    (&DIV, BinaryOperator::Divide),
    (&MOD, BinaryOperator::Modulo),
];

const UNION_OPS: [(&Rule, BinaryOperator); 2] = [
    (&UNION, BinaryOperator::Union),
    (&UNION_BAR, BinaryOperator::Union),
];

const INTERSECT_OPS: [(&Rule, BinaryOperator); 2] = [
    (&INTERSECT, BinaryOperator::Intersect),
    (&EXCEPT, BinaryOperator::Except),
];

impl<'src, 'r> Parser<'src, 'r> {
    /// `ExprSingle ("," ExprSingle)*`
    pub(super) fn expr(&mut self) -> PResult<Expr> {
        let first = self.expr_single()?;
        if !self.peek(&COMMA)? {
            return Ok(first);
        }
        let offset = first.offset;
        let mut items = vec![first];
        while self.eat(&COMMA)? {
            items.push(self.expr_single()?);
        }
        Ok(self.node(ExprKind::Sequence(items), offset))
    }

    pub(super) fn expr_single(&mut self) -> PResult<Expr> {
        self.enter()?;
        let result = self.expr_single_inner();
        self.leave();
        result
    }

    fn expr_single_inner(&mut self) -> PResult<Expr> {
        if let Some(flwor) = self.flwor()? {
            return Ok(flwor);
        }
        if self.eat(&SOME)? {
            let offset = self.start();
            return self.quantified(Quantifier::Some, offset);
        }
        if self.eat(&EVERY)? {
            let offset = self.start();
            return self.quantified(Quantifier::Every, offset);
        }
        if self.eat(&SWITCH)? {
            let offset = self.start();
            return self.switch(offset);
        }
        if self.eat(&TYPESWITCH)? {
            let offset = self.start();
            return self.typeswitch(offset);
        }
        if self.eat(&IF)? {
            let offset = self.start();
            return self.if_expr(offset);
        }
        if self.eat(&TRY)? {
            let offset = self.start();
            return self.try_catch(offset);
        }
        if let Some(update) = self.update_expr()? {
            return Ok(update);
        }
        if let Some(statement) = self.scripting_expr()? {
            return Ok(statement);
        }
        self.or_expr()
    }

    fn quantified(&mut self, quantifier: Quantifier, offset: usize) -> PResult<Expr> {
        let mut bindings = Vec::new();
        loop {
            let (var, type_decl) = self.typed_variable()?;
            self.expect(&IN)?;
            let source = self.expr_single()?;
            bindings.push(QuantifiedBinding {
                var,
                type_decl,
                source,
            });
            if !self.eat(&COMMA)? {
                break;
            }
        }
        self.expect(&SATISFIES)?;
        let satisfies = self.expr_single()?;
        Ok(self.node(
            ExprKind::Quantified {
                quantifier,
                bindings,
                satisfies: satisfies.boxed(),
            },
            offset,
        ))
    }

    /// `$name` with an optional `as SequenceType`, leaving the scanner in
    /// operator position.
    pub(super) fn typed_variable(
        &mut self,
    ) -> PResult<(xqfront_ast::QName, Option<xqfront_ast::SequenceType>)> {
        let var = self.variable_name()?;
        let type_decl = if self.eat(&AS_TYPE)? {
            Some(self.sequence_type(LexState::Operator)?)
        } else {
            None
        };
        Ok((var, type_decl))
    }

    pub(super) fn variable_name(&mut self) -> PResult<xqfront_ast::QName> {
        self.expect(&VARIABLE)?;
        let offset = self.start();
        let lexical = self.captured_qname(0);
        Ok(self.plain_name(lexical, offset))
    }

    fn if_expr(&mut self, offset: usize) -> PResult<Expr> {
        self.expect(&LPAREN)?;
        let condition = self.expr()?;
        self.expect(&RPAREN)?;
        self.expect(&THEN)?;
        let then_expr = self.expr_single()?;
        self.expect(&ELSE)?;
        let else_expr = self.expr_single()?;
        Ok(self.node(
            ExprKind::If {
                condition: condition.boxed(),
                then_expr: then_expr.boxed(),
                else_expr: else_expr.boxed(),
            },
            offset,
        ))
    }

    fn switch(&mut self, offset: usize) -> PResult<Expr> {
        self.expect(&LPAREN)?;
        let operand = self.expr()?;
        self.expect(&RPAREN)?;
        let mut cases = Vec::new();
        while self.peek(&CASE)? {
            let mut operands = Vec::new();
            while self.eat(&CASE)? {
                operands.push(self.expr_single()?);
            }
            self.expect(&RETURN)?;
            let result = self.expr_single()?;
            cases.push(SwitchCase { operands, result });
        }
        if cases.is_empty() {
            return Err(self.unexpected("'case'"));
        }
        self.expect(&DEFAULT_RETURN)?;
        let default = self.expr_single()?;
        Ok(self.node(
            ExprKind::Switch {
                operand: operand.boxed(),
                cases,
                default: default.boxed(),
            },
            offset,
        ))
    }

    fn typeswitch(&mut self, offset: usize) -> PResult<Expr> {
        self.expect(&LPAREN)?;
        let operand = self.expr()?;
        self.expect(&RPAREN)?;
        let mut cases = Vec::new();
        while self.eat(&CASE)? {
            let var = if self.peek(&VARIABLE)? {
                let var = self.variable_name()?;
                self.expect(&AS_TYPE)?;
                Some(var)
            } else {
                None
            };
            let mut types = vec![self.sequence_type(LexState::Operator)?];
            while self.eat(&TYPE_UNION)? {
                types.push(self.sequence_type(LexState::Operator)?);
            }
            self.expect(&RETURN)?;
            let result = self.expr_single()?;
            cases.push(TypeswitchCase { var, types, result });
        }
        if cases.is_empty() {
            return Err(self.unexpected("'case'"));
        }
        let default_var = if self.eat(&DEFAULT_VARIABLE)? {
            let var = self.variable_name()?;
            self.expect(&RETURN)?;
            Some(var)
        } else {
            self.expect(&DEFAULT_RETURN)?;
            None
        };
        let default = self.expr_single()?;
        Ok(self.node(
            ExprKind::Typeswitch {
                operand: operand.boxed(),
                cases,
                default_var,
                default: default.boxed(),
            },
            offset,
        ))
    }

    fn try_catch(&mut self, offset: usize) -> PResult<Expr> {
        let body = self.enclosed_expr()?;
        let mut catches = Vec::new();
        loop {
            let (tests, vars) = if self.eat(&CATCH_LEGACY)? {
                let test = self.catch_name_test()?;
                let mut vars = Vec::new();
                while self.eat(&COMMA)? {
                    vars.push(self.variable_name()?);
                }
                self.expect(&RPAREN)?;
                (vec![test], vars)
            } else if self.eat(&CATCH)? {
                let mut tests = vec![self.catch_name_test()?];
                while self.eat(&UNION_BAR)? {
                    tests.push(self.catch_name_test()?);
                }
                (tests, Vec::new())
            } else {
                break;
            };
            let body = self.enclosed_expr()?;
            catches.push(CatchClause { tests, vars, body });
        }
        if catches.is_empty() {
            return Err(self.unexpected("'catch'"));
        }
        Ok(self.node(
            ExprKind::Try {
                body: body.boxed(),
                catches,
            },
            offset,
        ))
    }

    fn catch_name_test(&mut self) -> PResult<xqfront_ast::NameTest> {
        match self.name_test(None)? {
            Some(test) => Ok(test),
            None => Err(self.unexpected("an error name test")),
        }
    }

    /// `{ Expr? }`; empty braces are the empty sequence.
    pub(super) fn enclosed_expr(&mut self) -> PResult<Expr> {
        self.expect(&LBRACE)?;
        let offset = self.start();
        if self.eat(&RBRACE)? {
            return Ok(self.node(ExprKind::Sequence(Vec::new()), offset));
        }
        let expr = self.expr()?;
        self.expect(&RBRACE)?;
        Ok(expr)
    }

    /// `{ Expr }` where the expression is required.
    pub(super) fn braced_expr(&mut self) -> PResult<Expr> {
        self.expect(&LBRACE)?;
        let expr = self.expr()?;
        self.expect(&RBRACE)?;
        Ok(expr)
    }

    // Operator layers, loosest first.

    fn binary(&self, op: BinaryOperator, left: Expr, right: Expr, offset: usize) -> Expr {
        self.node(
            ExprKind::Binary {
                op,
                left: left.boxed(),
                right: right.boxed(),
            },
            offset,
        )
    }

    /// Left-associative chain of `operand (op operand)*`.
    fn binary_chain(
        &mut self,
        operators: &Operators,
        operand: fn(&mut Self) -> PResult<Expr>,
    ) -> PResult<Expr> {
        let mut left = operand(self)?;
        'chain: loop {
            for (rule, op) in operators {
                if self.eat(rule)? {
                    let offset = self.start();
                    let right = operand(self)?;
                    left = self.binary(*op, left, right, offset);
                    continue 'chain;
                }
            }
            return Ok(left);
        }
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&OR_OPS, Self::and_expr)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&AND_OPS, Self::comparison_expr)
    }

    /// Comparisons do not chain: `a = b = c` is a syntax error.
    fn comparison_expr(&mut self) -> PResult<Expr> {
        let left = self.ftcontains_expr()?;
        for (rule, op) in &COMPARISON_OPS {
            if self.eat(rule)? {
                let offset = self.start();
                let right = self.ftcontains_expr()?;
                return Ok(self.binary(*op, left, right, offset));
            }
        }
        Ok(left)
    }

    fn ftcontains_expr(&mut self) -> PResult<Expr> {
        let left = self.range_expr()?;
        if self.eat(&FTCONTAINS)? || self.eat(&CONTAINS_TEXT)? {
            let offset = self.start();
            return self.ft_contains(left, offset);
        }
        Ok(left)
    }

    fn range_expr(&mut self) -> PResult<Expr> {
        let start = self.additive_expr()?;
        if self.eat(&TO)? {
            let offset = self.start();
            let end = self.additive_expr()?;
            return Ok(self.node(
                ExprKind::Range {
                    start: start.boxed(),
                    end: end.boxed(),
                },
                offset,
            ));
        }
        Ok(start)
    }

    pub(super) fn additive_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&ADDITIVE_OPS, Self::multiplicative_expr)
    }

    fn multiplicative_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&MULTIPLICATIVE_OPS, Self::union_expr)
    }

    pub(super) fn union_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&UNION_OPS, Self::intersect_expr)
    }

    fn intersect_expr(&mut self) -> PResult<Expr> {
        self.binary_chain(&INTERSECT_OPS, Self::instance_of_expr)
    }

    fn instance_of_expr(&mut self) -> PResult<Expr> {
        let expr = self.treat_expr()?;
        if self.eat(&INSTANCE_OF)? {
            let offset = self.start();
            let sequence_type = self.sequence_type(LexState::Operator)?;
            return Ok(self.node(
                ExprKind::InstanceOf {
                    expr: expr.boxed(),
                    sequence_type,
                },
                offset,
            ));
        }
        Ok(expr)
    }

    fn treat_expr(&mut self) -> PResult<Expr> {
        let expr = self.castable_expr()?;
        if self.eat(&TREAT_AS)? {
            let offset = self.start();
            let sequence_type = self.sequence_type(LexState::Operator)?;
            return Ok(self.node(
                ExprKind::TreatAs {
                    expr: expr.boxed(),
                    sequence_type,
                },
                offset,
            ));
        }
        Ok(expr)
    }

    fn castable_expr(&mut self) -> PResult<Expr> {
        let expr = self.cast_expr()?;
        if self.eat(&CASTABLE_AS)? {
            let offset = self.start();
            let single_type = self.single_type()?;
            return Ok(self.node(
                ExprKind::CastableAs {
                    expr: expr.boxed(),
                    single_type,
                },
                offset,
            ));
        }
        Ok(expr)
    }

    fn cast_expr(&mut self) -> PResult<Expr> {
        let expr = self.unary_expr()?;
        if self.eat(&CAST_AS)? {
            let offset = self.start();
            let single_type = self.single_type()?;
            return Ok(self.node(
                ExprKind::CastAs {
                    expr: expr.boxed(),
                    single_type,
                },
                offset,
            ));
        }
        Ok(expr)
    }

    fn unary_expr(&mut self) -> PResult<Expr> {
        let mut signs = Vec::new();
        loop {
            if self.eat(&UNARY_MINUS)? {
                signs.push((UnaryOperator::Minus, self.start()));
            } else if self.eat(&UNARY_PLUS)? {
                signs.push((UnaryOperator::Plus, self.start()));
            } else {
                break;
            }
        }
        let mut expr = self.value_expr()?;
        for (op, offset) in signs.into_iter().rev() {
            expr = self.node(
                ExprKind::Unary {
                    op,
                    operand: expr.boxed(),
                },
                offset,
            );
        }
        Ok(expr)
    }

    fn value_expr(&mut self) -> PResult<Expr> {
        if self.eat(&VALIDATE_TYPE)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            let type_name = self.element_name(lexical, offset);
            let expr = self.braced_expr()?;
            return Ok(self.node(
                ExprKind::Validate {
                    mode: None,
                    type_name: Some(type_name),
                    expr: expr.boxed(),
                },
                offset,
            ));
        }
        if self.eat(&VALIDATE_MODE)? {
            let offset = self.start();
            let mode = match self.captured_name(0).as_str() {
                "lax" => ValidationMode::Lax,
                "strict" => ValidationMode::Strict,
                other => {
                    return Err(self.fatal(
                        ErrorCode::Syntax,
                        offset,
                        format!("unknown validation mode '{}'", other),
                    ));
                }
            };
            let expr = self.braced_expr()?;
            return Ok(self.node(
                ExprKind::Validate {
                    mode: Some(mode),
                    type_name: None,
                    expr: expr.boxed(),
                },
                offset,
            ));
        }
        if self.eat(&VALIDATE)? {
            let offset = self.start();
            let expr = self.braced_expr()?;
            return Ok(self.node(
                ExprKind::Validate {
                    mode: None,
                    type_name: None,
                    expr: expr.boxed(),
                },
                offset,
            ));
        }
        if self.peek(&PRAGMA_OPEN)? {
            return self.extension_expr();
        }
        self.path_expr()
    }

    /// `(# name contents #)+ { Expr? }`
    fn extension_expr(&mut self) -> PResult<Expr> {
        let (pragmas, offset) = self.pragmas()?;
        self.expect(&LBRACE)?;
        let expr = if self.eat(&RBRACE)? {
            None
        } else {
            let expr = self.expr()?;
            self.expect(&RBRACE)?;
            Some(expr.boxed())
        };
        Ok(self.node(ExprKind::Extension { pragmas, expr }, offset))
    }

    /// One or more pragmas, with the offset of the first.
    pub(super) fn pragmas(&mut self) -> PResult<(Vec<Pragma>, usize)> {
        let mut pragmas = Vec::new();
        let mut offset = None;
        while self.eat(&PRAGMA_OPEN)? {
            let at = self.start();
            offset.get_or_insert(at);
            let lexical = self.captured_qname(0);
            let name = self.plain_name(lexical, at);
            let contents = self
                .lex(|i: &'src str| scanner::delimited_content(i, "#)", "pragma"))?
                .unwrap_or_default();
            pragmas.push(Pragma {
                name,
                contents: contents.to_string(),
            });
        }
        let offset = offset.unwrap_or_else(|| self.start());
        Ok((pragmas, offset))
    }
}

//! FLWOR expressions.

use super::{PResult, Parser};
use crate::error::ErrorCode;
use crate::rules::*;
use std::collections::HashSet;
use xqfront_ast::{
    Clause, EmptyOrder, ExpandedName, Expr, ExprKind, Flwor, ForBinding, GroupBy, GroupingSpec,
    LetBinding, OrderBy, OrderSpec, WindowClause, WindowCondition, WindowKind, WindowVars,
};

/// Variables bound by the clauses seen so far, for checking `group by`
/// keys.
fn bound_variables(clauses: &[Clause]) -> HashSet<ExpandedName> {
    let mut names = HashSet::new();
    for clause in clauses {
        match clause {
            Clause::For(bindings) => {
                for b in bindings {
                    names.insert(b.var.expanded());
                    names.extend(b.positional.iter().map(|p| p.expanded()));
                    names.extend(b.score.iter().map(|s| s.expanded()));
                }
            }
            Clause::Let(bindings) => {
                names.extend(bindings.iter().map(|b| b.var.expanded()));
            }
            Clause::Window(window) => {
                names.insert(window.var.expanded());
                names.extend(window.start.vars.names().map(|n| n.expanded()));
                if let Some(end) = &window.end {
                    names.extend(end.vars.names().map(|n| n.expanded()));
                }
            }
            Clause::Count(var) => {
                names.insert(var.expanded());
            }
            Clause::Where(_) => {}
        }
    }
    names
}

impl<'src, 'r> Parser<'src, 'r> {
    /// A FLWOR expression, or `None` if the input does not start with a
    /// `for`, `let` or window clause.
    pub(super) fn flwor(&mut self) -> PResult<Option<Expr>> {
        let offset = self.scan.next_offset();
        let Some(first) = self.initial_clause()? else {
            return Ok(None);
        };
        let mut clauses = vec![first];
        let mut where_clause = None;
        let mut group_by = None;
        let mut post_group = Vec::new();
        loop {
            let clause = if let Some(clause) = self.initial_clause()? {
                clause
            } else if self.eat(&WHERE)? {
                Clause::Where(self.expr_single()?)
            } else if self.eat(&COUNT)? {
                Clause::Count(self.variable_name()?)
            } else if self.eat(&GROUP_BY)? {
                let at = self.start();
                if group_by.is_some() {
                    return Err(self.fatal(
                        ErrorCode::Syntax,
                        at,
                        "only one 'group by' clause is supported",
                    ));
                }
                if let Some(Clause::Where(_)) = clauses.last()
                    && let Some(Clause::Where(expr)) = clauses.pop()
                {
                    where_clause = Some(expr.boxed());
                }
                let bound = bound_variables(&clauses);
                group_by = Some(self.group_by(&bound)?);
                continue;
            } else {
                break;
            };
            if group_by.is_some() {
                post_group.push(clause);
            } else {
                clauses.push(clause);
            }
        }
        if group_by.is_none()
            && let Some(Clause::Where(_)) = clauses.last()
            && let Some(Clause::Where(expr)) = clauses.pop()
        {
            where_clause = Some(expr.boxed());
        }
        let order_by = if self.eat(&STABLE_ORDER_BY)? {
            Some(self.order_by(true)?)
        } else if self.eat(&ORDER_BY)? {
            Some(self.order_by(false)?)
        } else {
            None
        };
        self.expect(&RETURN)?;
        let return_expr = self.expr_single()?;
        Ok(Some(self.node(
            ExprKind::Flwor(Flwor {
                clauses,
                where_clause,
                group_by,
                post_group,
                order_by,
                return_expr: return_expr.boxed(),
            }),
            offset,
        )))
    }

    fn initial_clause(&mut self) -> PResult<Option<Clause>> {
        if self.eat(&FOR_TUMBLING)? {
            return self.window_clause(WindowKind::Tumbling).map(Some);
        }
        if self.eat(&FOR_SLIDING)? {
            return self.window_clause(WindowKind::Sliding).map(Some);
        }
        if self.eat(&FOR)? {
            return self.for_bindings().map(Some);
        }
        if self.eat(&LET_SCORE)? {
            return self.let_bindings(true).map(Some);
        }
        if self.eat(&LET)? {
            return self.let_bindings(false).map(Some);
        }
        Ok(None)
    }

    fn for_bindings(&mut self) -> PResult<Clause> {
        let mut bindings = Vec::new();
        loop {
            let offset = self.scan.next_offset();
            let (var, type_decl) = self.typed_variable()?;
            let allowing_empty = self.eat(&ALLOWING_EMPTY)?;
            let positional = if self.eat(&AT_VARIABLE)? {
                let at = self.scan.next_offset();
                let positional = self.variable_name()?;
                if positional.expanded() == var.expanded() {
                    self.record(
                        ErrorCode::PositionalVariableConflict,
                        at,
                        format!("positional variable ${} has the same name as its binding", var),
                    );
                }
                Some(positional)
            } else {
                None
            };
            let score = if self.eat(&SCORE_VARIABLE)? {
                Some(self.variable_name()?)
            } else {
                None
            };
            self.expect(&IN)?;
            let source = self.expr_single()?;
            bindings.push(ForBinding {
                var,
                type_decl,
                allowing_empty,
                positional,
                score,
                source,
                offset,
            });
            if !self.eat(&COMMA)? {
                break;
            }
        }
        Ok(Clause::For(bindings))
    }

    /// `let $v := e, ...`; with `score`, the first binding takes the
    /// full-text score of its expression.
    fn let_bindings(&mut self, score: bool) -> PResult<Clause> {
        let mut bindings = Vec::new();
        let mut score = score;
        loop {
            let offset = self.scan.next_offset();
            let (var, type_decl) = if score {
                (self.variable_name()?, None)
            } else {
                self.typed_variable()?
            };
            self.expect(&ASSIGN)?;
            let value = self.expr_single()?;
            bindings.push(LetBinding {
                var,
                type_decl,
                score,
                value,
                offset,
            });
            score = false;
            if !self.eat(&COMMA)? {
                break;
            }
        }
        Ok(Clause::Let(bindings))
    }

    fn window_clause(&mut self, kind: WindowKind) -> PResult<Clause> {
        let offset = self.scan.next_offset();
        let (var, type_decl) = self.typed_variable()?;
        self.expect(&IN)?;
        let source = self.expr_single()?;
        self.expect(&WINDOW_START)?;
        let start = self.window_condition(false)?;
        let end = if self.eat(&WINDOW_ONLY_END)? {
            Some(self.window_condition(true)?)
        } else if self.eat(&WINDOW_END)? {
            Some(self.window_condition(false)?)
        } else if kind == WindowKind::Sliding {
            return Err(self.unexpected("'end' of sliding window"));
        } else {
            None
        };

        let mut seen = HashSet::new();
        let names = std::iter::once(&var)
            .chain(start.vars.names())
            .chain(end.iter().flat_map(|e| e.vars.names()));
        let duplicates: Vec<String> = names
            .filter(|name| !seen.insert(name.expanded()))
            .map(|name| name.to_string())
            .collect();
        for name in duplicates {
            self.record(
                ErrorCode::DuplicateWindowVariable,
                offset,
                format!("window variable ${} is bound more than once", name),
            );
        }

        Ok(Clause::Window(WindowClause {
            kind,
            var,
            type_decl,
            source: source.boxed(),
            start,
            end,
        }))
    }

    /// `$cur? (at $pos)? (previous $prev)? (next $next)? when Expr`
    fn window_condition(&mut self, only: bool) -> PResult<WindowCondition> {
        let mut vars = WindowVars::default();
        if self.peek(&VARIABLE)? {
            vars.current = Some(self.variable_name()?);
        }
        if self.eat(&WINDOW_AT)? {
            vars.positional = Some(self.variable_name()?);
        }
        if self.eat(&WINDOW_PREVIOUS)? {
            vars.previous = Some(self.variable_name()?);
        }
        if self.eat(&WINDOW_NEXT)? {
            vars.next = Some(self.variable_name()?);
        }
        self.expect(&WHEN)?;
        let when = self.expr_single()?;
        Ok(WindowCondition {
            only,
            vars,
            when: when.boxed(),
        })
    }

    fn group_by(&mut self, bound: &HashSet<ExpandedName>) -> PResult<GroupBy> {
        let mut specs = Vec::new();
        loop {
            let at = self.scan.next_offset();
            let var = self.variable_name()?;
            let value = if self.eat(&ASSIGN)? {
                Some(self.expr_single()?)
            } else {
                if !bound.contains(&var.expanded()) {
                    self.record(
                        ErrorCode::GroupingVariableNotInScope,
                        at,
                        format!("grouping variable ${} is not bound by this FLWOR expression", var),
                    );
                }
                None
            };
            let collation = if self.eat(&COLLATION)? {
                Some(self.captured_string(0))
            } else {
                None
            };
            specs.push(GroupingSpec {
                var,
                value,
                collation,
            });
            if !self.eat(&COMMA)? {
                break;
            }
        }
        Ok(GroupBy { specs })
    }

    fn order_by(&mut self, stable: bool) -> PResult<OrderBy> {
        let mut specs = Vec::new();
        loop {
            let expr = self.expr_single()?;
            let descending = if self.eat(&DESCENDING)? {
                true
            } else {
                self.eat(&ASCENDING)?;
                false
            };
            let empty = if self.eat(&EMPTY_GREATEST)? {
                Some(EmptyOrder::Greatest)
            } else if self.eat(&EMPTY_LEAST)? {
                Some(EmptyOrder::Least)
            } else {
                None
            };
            let collation = if self.eat(&COLLATION)? {
                Some(self.captured_string(0))
            } else {
                None
            };
            specs.push(OrderSpec {
                expr,
                descending,
                empty,
                collation,
            });
            if !self.eat(&COMMA)? {
                break;
            }
        }
        Ok(OrderBy { stable, specs })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::error::ErrorCode;
    use crate::parser::Parser;
    use crate::resolver::ParsedModule;
    use xqfront_ast::{Clause, ExprKind, Flwor, WindowKind};

    fn flwor(src: &str) -> Flwor {
        match Parser::new(src, ParserConfig::default())
            .parse_expression()
            .unwrap()
            .kind
        {
            ExprKind::Flwor(f) => f,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn module(src: &str) -> ParsedModule {
        Parser::new(src, ParserConfig::default())
            .parse_main_module()
            .unwrap()
    }

    #[test]
    fn test_clauses_in_order() {
        let f = flwor("for $x in (1, 2, 3) let $y := $x * 2 where $y > 2 return $y");
        let keywords: Vec<_> = f.clauses.iter().map(|c| c.keyword()).collect();
        assert_eq!(keywords, vec!["for", "let"]);
        assert!(f.where_clause.is_some());
        assert!(matches!(f.return_expr.kind, ExprKind::VarRef(_)));
    }

    #[test]
    fn test_inner_where_stays_in_place() {
        let f = flwor("for $x in 1 where $x let $y := 2 return $y");
        let keywords: Vec<_> = f.clauses.iter().map(|c| c.keyword()).collect();
        assert_eq!(keywords, vec!["for", "where", "let"]);
        assert!(f.where_clause.is_none());
    }

    #[test]
    fn test_for_binding_options() {
        let f = flwor("for $x as xs:integer? allowing empty at $i in $s, $y in 2 count $c return 1");
        match &f.clauses[0] {
            Clause::For(bindings) => {
                assert_eq!(bindings.len(), 2);
                assert!(bindings[0].allowing_empty);
                assert!(bindings[0].type_decl.is_some());
                assert_eq!(bindings[0].positional.as_ref().map(|p| p.local_part.as_str()), Some("i"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(f.clauses[1], Clause::Count(_)));
    }

    #[test]
    fn test_grouping_and_ordering() {
        let f = flwor(
            "for $b in $books let $a := $b/author where $b/year > 2000 \
             group by $a, $k := $b/lang collation 'urn:c' \
             let $n := count($b) \
             stable order by $n descending empty least, $a \
             return $a",
        );
        assert_eq!(f.clauses.len(), 2);
        assert!(f.where_clause.is_some());
        let group = f.group_by.unwrap();
        assert_eq!(group.specs.len(), 2);
        assert!(group.specs[1].value.is_some());
        assert_eq!(group.specs[1].collation.as_deref(), Some("urn:c"));
        assert_eq!(f.post_group.len(), 1);
        let order = f.order_by.unwrap();
        assert!(order.stable);
        assert!(order.specs[0].descending);
        assert!(!order.specs[1].descending);
    }

    #[test]
    fn test_window_clauses() {
        let f = flwor(
            "for sliding window $w in (1 to 10) \
             start $s at $p previous $prev when true() \
             only end $e next $n when $e - $s eq 2 \
             return $w",
        );
        match &f.clauses[0] {
            Clause::Window(w) => {
                assert_eq!(w.kind, WindowKind::Sliding);
                assert!(w.start.vars.previous.is_some());
                let end = w.end.as_ref().unwrap();
                assert!(end.only);
                assert!(end.vars.next.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        let f = flwor("for tumbling window $w in $s start when true() return $w");
        assert!(matches!(f.clauses[0], Clause::Window(ref w) if w.end.is_none()));
    }

    #[test]
    fn test_variable_checks() {
        let parsed = module("for $x at $x in 1 return $x");
        assert_eq!(parsed.diagnostics[0].code, ErrorCode::PositionalVariableConflict);

        let parsed = module("for tumbling window $w in 1 start $w when 1 return 1");
        assert_eq!(parsed.diagnostics[0].code, ErrorCode::DuplicateWindowVariable);

        let parsed = module("for $x in 1 group by $y return $x");
        assert_eq!(parsed.diagnostics[0].code, ErrorCode::GroupingVariableNotInScope);
        assert_eq!(parsed.diagnostics[0].code.as_str(), "XQST0094");
    }

    #[test]
    fn test_missing_return() {
        let err = Parser::new("for $x in 1 where 2", ParserConfig::default())
            .parse_expression()
            .unwrap_err();
        assert!(err.message().contains("'return'"));
    }
}

//! Update facility: insert, delete, replace, rename and transform.

use super::{PResult, Parser};
use crate::rules::*;
use xqfront_ast::{CopyBinding, Expr, ExprKind, InsertPosition};

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn update_expr(&mut self) -> PResult<Option<Expr>> {
        let offset = self.scan.next_offset();
        let kind = if self.eat(&INSERT)? || self.eat(&INSERT_NODES)? {
            let source = self.expr_single()?;
            let position = self.insert_position()?;
            let target = self.expr_single()?;
            ExprKind::Insert {
                source: source.boxed(),
                position,
                target: target.boxed(),
            }
        } else if self.eat(&DELETE)? || self.eat(&DELETE_NODES)? {
            ExprKind::Delete {
                target: self.expr_single()?.boxed(),
            }
        } else if self.eat(&REPLACE_VALUE)? {
            self.replace(true)?
        } else if self.eat(&REPLACE)? {
            self.replace(false)?
        } else if self.eat(&RENAME)? {
            let target = self.expr_single()?;
            self.expect(&AS_NAME)?;
            let new_name = self.expr_single()?;
            ExprKind::Rename {
                target: target.boxed(),
                new_name: new_name.boxed(),
            }
        } else if self.eat(&COPY)? {
            self.transform()?
        } else {
            return Ok(None);
        };
        Ok(Some(self.node(kind, offset)))
    }

    fn insert_position(&mut self) -> PResult<InsertPosition> {
        if self.eat(&AS_FIRST_INTO)? {
            Ok(InsertPosition::AsFirstInto)
        } else if self.eat(&AS_LAST_INTO)? {
            Ok(InsertPosition::AsLastInto)
        } else if self.eat(&INTO)? {
            Ok(InsertPosition::Into)
        } else if self.eat(&AFTER)? {
            Ok(InsertPosition::After)
        } else if self.eat(&BEFORE)? {
            Ok(InsertPosition::Before)
        } else {
            Err(self.unexpected("'into', 'as first into', 'as last into', 'after' or 'before'"))
        }
    }

    fn replace(&mut self, value_of: bool) -> PResult<ExprKind> {
        let target = self.expr_single()?;
        self.expect(&WITH)?;
        let replacement = self.expr_single()?;
        Ok(ExprKind::Replace {
            value_of,
            target: target.boxed(),
            replacement: replacement.boxed(),
        })
    }

    /// `copy $v := e, ... modify e return e`
    fn transform(&mut self) -> PResult<ExprKind> {
        let mut bindings = Vec::new();
        loop {
            let var = self.variable_name()?;
            self.expect(&ASSIGN)?;
            let value = self.expr_single()?;
            bindings.push(CopyBinding { var, value });
            if !self.eat(&COMMA)? {
                break;
            }
        }
        self.expect(&MODIFY)?;
        let modify = self.expr_single()?;
        self.expect(&RETURN)?;
        let return_expr = self.expr_single()?;
        Ok(ExprKind::Transform {
            bindings,
            modify: modify.boxed(),
            return_expr: return_expr.boxed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::parser::Parser;
    use xqfront_ast::{ExprKind, InsertPosition};

    fn parse(src: &str) -> ExprKind {
        Parser::new(src, ParserConfig::default())
            .parse_expression()
            .unwrap()
            .kind
    }

    #[test]
    fn test_insert_positions() {
        assert!(matches!(
            parse("insert node <a/> as last into $doc/root"),
            ExprKind::Insert { position: InsertPosition::AsLastInto, .. }
        ));
        assert!(matches!(
            parse("insert nodes ($x, $y) before $ref"),
            ExprKind::Insert { position: InsertPosition::Before, .. }
        ));
        assert!(Parser::new("insert node <a/> beside $x", ParserConfig::default())
            .parse_expression()
            .is_err());
    }

    #[test]
    fn test_delete_replace_rename() {
        assert!(matches!(parse("delete nodes $d//tmp"), ExprKind::Delete { .. }));
        assert!(matches!(
            parse("replace value of node $n/@id with 'x'"),
            ExprKind::Replace { value_of: true, .. }
        ));
        assert!(matches!(
            parse("replace node $n with <b/>"),
            ExprKind::Replace { value_of: false, .. }
        ));
        assert!(matches!(
            parse("rename node $n as 'new'"),
            ExprKind::Rename { .. }
        ));
    }

    #[test]
    fn test_transform() {
        match parse("copy $c := $doc, $d := $other modify delete node $c/x return $c") {
            ExprKind::Transform {
                bindings, modify, ..
            } => {
                assert_eq!(bindings.len(), 2);
                assert!(modify.is_updating());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_keywords_are_names_when_disabled() {
        let config = ParserConfig::default().with_update(false);
        let expr = Parser::new("delete", config).parse_expression().unwrap();
        assert!(matches!(expr.kind, ExprKind::Path(_)));
    }
}

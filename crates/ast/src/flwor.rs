//! FLWOR expressions: for/let/window/count/where clauses, grouping and ordering.

use crate::expr::Expr;
use crate::names::QName;
use crate::types::SequenceType;
use serde::Serialize;

/// A FLWOR expression.
///
/// `clauses` keeps the pre-grouping clauses in source order, which is also
/// their evaluation order. A `where` that ends the pre-grouping list is held in
/// `where_clause`; a `where` followed by further clauses stays in place as
/// [`Clause::Where`]. Everything after `group by` lives in `post_group`,
/// because variables bound there see grouped tuples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flwor {
    pub clauses: Vec<Clause>,
    pub where_clause: Option<Box<Expr>>,
    pub group_by: Option<GroupBy>,
    pub post_group: Vec<Clause>,
    pub order_by: Option<OrderBy>,
    pub return_expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Clause {
    For(Vec<ForBinding>),
    Let(Vec<LetBinding>),
    Window(WindowClause),
    Count(QName),
    Where(Expr),
}

impl Clause {
    pub fn keyword(&self) -> &'static str {
        match self {
            Clause::For(_) => "for",
            Clause::Let(_) => "let",
            Clause::Window(_) => "window",
            Clause::Count(_) => "count",
            Clause::Where(_) => "where",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForBinding {
    pub var: QName,
    pub type_decl: Option<SequenceType>,
    pub allowing_empty: bool,
    pub positional: Option<QName>,
    /// Full-text `score $s`.
    pub score: Option<QName>,
    pub source: Expr,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetBinding {
    pub var: QName,
    pub type_decl: Option<SequenceType>,
    /// `let score $s := ...` binds the full-text score rather than the value.
    pub score: bool,
    pub value: Expr,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindowKind {
    Tumbling,
    Sliding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowClause {
    pub kind: WindowKind,
    pub var: QName,
    pub type_decl: Option<SequenceType>,
    pub source: Box<Expr>,
    pub start: WindowCondition,
    pub end: Option<WindowCondition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindowVars {
    pub current: Option<QName>,
    pub positional: Option<QName>,
    pub previous: Option<QName>,
    pub next: Option<QName>,
}

impl WindowVars {
    pub fn names(&self) -> impl Iterator<Item = &QName> {
        [&self.current, &self.positional, &self.previous, &self.next]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowCondition {
    /// `only end ...`; always false for start conditions.
    pub only: bool,
    pub vars: WindowVars,
    pub when: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBy {
    pub specs: Vec<GroupingSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingSpec {
    pub var: QName,
    /// `group by $k := expr`
    pub value: Option<Expr>,
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    pub stable: bool,
    pub specs: Vec<OrderSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSpec {
    pub expr: Expr,
    pub descending: bool,
    pub empty: Option<EmptyOrder>,
    pub collation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyOrder {
    Greatest,
    Least,
}

/// One `$v in expr` binding of a `some`/`every` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantifiedBinding {
    pub var: QName,
    pub type_decl: Option<SequenceType>,
    pub source: Expr,
}

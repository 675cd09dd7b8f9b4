//! Expression nodes.
//!
//! Core types: [`Expr`], [`ExprKind`], [`Literal`], [`BinaryOperator`].

use crate::constructors::{ComputedName, DirElement};
use crate::flwor::{Flwor, QuantifiedBinding};
use crate::fulltext::FtSelection;
use crate::ids::ModuleId;
use crate::names::{NameTest, QName};
use crate::types::{Axis, NodeTest, SequenceType, SingleType};
use rust_decimal::Decimal;
use serde::Serialize;

/// One node of the syntax tree.
///
/// `offset` is the byte offset in the module text where the construct starts
/// (for binary operators, where the operator token starts). It is assigned once
/// when the node is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub offset: usize,
    pub module: ModuleId,
}

impl Expr {
    pub fn new(kind: ExprKind, offset: usize, module: ModuleId) -> Self {
        Self {
            kind,
            offset,
            module,
        }
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    pub fn is_updating(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Insert { .. }
                | ExprKind::Delete { .. }
                | ExprKind::Replace { .. }
                | ExprKind::Rename { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Literal(Literal),
    /// `.`
    ContextItem,
    VarRef(QName),
    /// Comma expression or parenthesized list; `()` is the empty sequence.
    Sequence(Vec<Expr>),
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    InstanceOf {
        expr: Box<Expr>,
        sequence_type: SequenceType,
    },
    TreatAs {
        expr: Box<Expr>,
        sequence_type: SequenceType,
    },
    CastableAs {
        expr: Box<Expr>,
        single_type: SingleType,
    },
    CastAs {
        expr: Box<Expr>,
        single_type: SingleType,
    },

    Path(PathExpr),
    Step(Step),
    Filter {
        base: Box<Expr>,
        predicates: Vec<Expr>,
    },
    FunctionCall {
        name: QName,
        args: Vec<Expr>,
    },
    /// `?` in an argument list (partial function application).
    ArgumentPlaceholder,
    DynamicCall {
        function: Box<Expr>,
        args: Vec<Expr>,
    },
    NamedFunctionRef {
        name: QName,
        arity: usize,
    },
    InlineFunction(InlineFunction),

    Flwor(Flwor),
    Quantified {
        quantifier: Quantifier,
        bindings: Vec<QuantifiedBinding>,
        satisfies: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Switch {
        operand: Box<Expr>,
        cases: Vec<SwitchCase>,
        default: Box<Expr>,
    },
    Typeswitch {
        operand: Box<Expr>,
        cases: Vec<TypeswitchCase>,
        default_var: Option<QName>,
        default: Box<Expr>,
    },
    Try {
        body: Box<Expr>,
        catches: Vec<CatchClause>,
    },
    Validate {
        mode: Option<ValidationMode>,
        type_name: Option<QName>,
        expr: Box<Expr>,
    },
    Extension {
        pragmas: Vec<Pragma>,
        expr: Option<Box<Expr>>,
    },
    Ordered(Box<Expr>),
    Unordered(Box<Expr>),

    DirElement(DirElement),
    DirComment(String),
    DirPi {
        target: String,
        content: String,
    },
    CompDocument(Box<Expr>),
    CompElement {
        name: ComputedName,
        content: Option<Box<Expr>>,
    },
    CompAttribute {
        name: ComputedName,
        content: Option<Box<Expr>>,
    },
    CompNamespace {
        prefix: ComputedName,
        uri: Box<Expr>,
    },
    CompText(Box<Expr>),
    CompComment(Box<Expr>),
    CompPi {
        target: ComputedName,
        content: Option<Box<Expr>>,
    },

    FtContains {
        expr: Box<Expr>,
        selection: FtSelection,
        without_content: Option<Box<Expr>>,
    },

    Insert {
        source: Box<Expr>,
        position: InsertPosition,
        target: Box<Expr>,
    },
    Delete {
        target: Box<Expr>,
    },
    Replace {
        value_of: bool,
        target: Box<Expr>,
        replacement: Box<Expr>,
    },
    Rename {
        target: Box<Expr>,
        new_name: Box<Expr>,
    },
    Transform {
        bindings: Vec<CopyBinding>,
        modify: Box<Expr>,
        return_expr: Box<Expr>,
    },

    Block(Block),
    Assign {
        var: QName,
        value: Box<Expr>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    Exit(Box<Expr>),
    BreakLoop,
    ContinueLoop,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Double(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // General comparison
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Value comparison
    ValueEq,
    ValueNe,
    ValueLt,
    ValueLe,
    ValueGt,
    ValueGe,
    // Node comparison
    Is,
    Precedes,
    Follows,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    IntegerDivide,
    Modulo,
    // Set
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathRoot {
    /// No leading slash.
    Relative,
    /// `/...`
    Root,
    /// `//...`; the implicit descendant-or-self step is included in `steps`.
    RootDescendants,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathExpr {
    pub root: PathRoot,
    /// Axis steps and filter expressions, in evaluation order.
    pub steps: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quantifier {
    Some,
    Every,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: QName,
    pub type_decl: Option<SequenceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub name: QName,
    pub values: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineFunction {
    pub annotations: Vec<Annotation>,
    pub params: Vec<Param>,
    pub return_type: Option<SequenceType>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub operands: Vec<Expr>,
    pub result: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeswitchCase {
    pub var: Option<QName>,
    /// More than one entry for a `case A | B` union.
    pub types: Vec<SequenceType>,
    pub result: Expr,
}

/// A `catch` clause. `vars` is only populated by the legacy
/// `catch (NameTest, $code, $description, $value)` form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub tests: Vec<NameTest>,
    pub vars: Vec<QName>,
    pub body: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationMode {
    Lax,
    Strict,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pragma {
    pub name: QName,
    pub contents: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsertPosition {
    Into,
    AsFirstInto,
    AsLastInto,
    After,
    Before,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyBinding {
    pub var: QName,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockVarDecl {
    pub var: QName,
    pub type_decl: Option<SequenceType>,
    pub value: Option<Expr>,
}

/// `block { declare $v := e; ... ; e1; e2 }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub declarations: Vec<BlockVarDecl>,
    pub body: Vec<Expr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updating_kinds() {
        let module = ModuleId::main();
        let target = Expr::new(ExprKind::ContextItem, 7, module.clone());
        let delete = Expr::new(
            ExprKind::Delete {
                target: target.boxed(),
            },
            0,
            module.clone(),
        );
        assert!(delete.is_updating());
        assert!(!Expr::new(ExprKind::ContextItem, 0, module).is_updating());
    }

    #[test]
    fn test_serializes_variant_tags() {
        let expr = Expr::new(
            ExprKind::Literal(Literal::Integer(42)),
            3,
            ModuleId::from("urn:m"),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["offset"], 3);
        assert_eq!(json["module"], "urn:m");
        assert_eq!(json["kind"]["Literal"]["Integer"], 42);
    }
}

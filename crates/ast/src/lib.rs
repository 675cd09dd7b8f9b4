//! Syntax tree for XQuery modules.
//!
//! The tree is a closed set of tagged variants: [`ExprKind`] enumerates every
//! expression, clause-bearing and constructor form, so consumers match
//! exhaustively instead of testing node types at run time. Each [`Expr`]
//! carries the byte offset where it starts and the [`ModuleId`] of the module
//! it came from.
//!
//! # Key Types
//!
//! - [`Module`]: a main module (prolog + body) or a library module
//! - [`Expr`] / [`ExprKind`]: expression nodes
//! - [`Flwor`]: FLWOR clause lists, grouping and ordering
//! - [`DirElement`]: direct element constructors
//! - [`FtSelection`]: full-text selections
//! - [`SequenceType`]: type declarations

pub mod constructors;
pub mod expr;
pub mod flwor;
pub mod fulltext;
pub mod ids;
pub mod module;
pub mod names;
pub mod types;

pub use constructors::{AttributeValuePart, ComputedName, DirAttribute, DirContent, DirElement, NamespaceBinding};
pub use expr::{
    Annotation, BinaryOperator, Block, BlockVarDecl, CatchClause, CopyBinding, Expr, ExprKind,
    InlineFunction, InsertPosition, Literal, Param, PathExpr, PathRoot, Pragma, Quantifier, Step,
    SwitchCase, TypeswitchCase, UnaryOperator, ValidationMode,
};
pub use flwor::{
    Clause, EmptyOrder, Flwor, ForBinding, GroupBy, GroupingSpec, LetBinding, OrderBy, OrderSpec,
    QuantifiedBinding, WindowClause, WindowCondition, WindowKind, WindowVars,
};
pub use fulltext::{
    FtAnyAll, FtBigUnit, FtCaseOption, FtDiacriticsOption, FtMatchOptions, FtPosFilter, FtRange,
    FtSelection, FtStopWordCombine, FtStopWordOption, FtStopWordSource, FtStopWords,
    FtThesaurusId, FtThesaurusOption, FtUnit, FtWordsValue,
};
pub use ids::ModuleId;
pub use module::{
    BoundarySpace, ConstructionMode, Declaration, DeclarationKind, DecimalFormatProperty,
    DefaultNamespaceKind, FunctionDecl, FunctionKind, LibraryModule, MainModule, Module,
    ModuleImport, OrderingMode, Prolog, SchemaImport, VariableDecl, VersionDecl,
};
pub use names::{ExpandedName, NameTest, QName};
pub use types::{
    Axis, ElementName, ItemType, KindTest, NodeTest, OccurrenceIndicator, SequenceType,
    SingleType, TypeAnnotation,
};
pub use rust_decimal::Decimal;

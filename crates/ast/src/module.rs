//! Compilation units and their prolog declarations.

use crate::expr::{Annotation, Expr, Param, ValidationMode};
use crate::flwor::EmptyOrder;
use crate::fulltext::FtMatchOptions;
use crate::names::QName;
use crate::types::SequenceType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Module {
    Main(MainModule),
    Library(LibraryModule),
}

impl Module {
    pub fn prolog(&self) -> &Prolog {
        match self {
            Module::Main(m) => &m.prolog,
            Module::Library(m) => &m.prolog,
        }
    }

    pub fn body(&self) -> Option<&Expr> {
        match self {
            Module::Main(m) => Some(&m.body),
            Module::Library(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainModule {
    pub prolog: Prolog,
    pub body: Expr,
}

/// `module namespace prefix = "namespace"; prolog`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryModule {
    pub prefix: String,
    pub namespace: String,
    pub prolog: Prolog,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prolog {
    pub version: Option<VersionDecl>,
    pub declarations: Vec<Declaration>,
}

impl Prolog {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match &d.kind {
            DeclarationKind::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDecl> {
        self.declarations.iter().filter_map(|d| match &d.kind {
            DeclarationKind::Variable(v) => Some(v),
            _ => None,
        })
    }
}

/// `xquery version "3.0" encoding "UTF-8";`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDecl {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DeclarationKind {
    BoundarySpace(BoundarySpace),
    DefaultCollation(String),
    BaseUri(String),
    Construction(ConstructionMode),
    Ordering(OrderingMode),
    EmptyOrder(EmptyOrder),
    CopyNamespaces { preserve: bool, inherit: bool },
    DecimalFormat {
        name: Option<QName>,
        properties: Vec<(DecimalFormatProperty, String)>,
    },
    Namespace { prefix: String, uri: String },
    DefaultNamespace { kind: DefaultNamespaceKind, uri: String },
    SchemaImport(SchemaImport),
    ModuleImport(ModuleImport),
    ContextItem {
        item_type: Option<SequenceType>,
        value: Option<Expr>,
        external: bool,
    },
    Variable(VariableDecl),
    Function(FunctionDecl),
    Option { name: QName, value: String },
    FtOption(FtMatchOptions),
    Revalidation(ValidationMode),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BoundarySpace {
    Preserve,
    #[default]
    Strip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConstructionMode {
    #[default]
    Preserve,
    Strip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OrderingMode {
    #[default]
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefaultNamespaceKind {
    Element,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DecimalFormatProperty {
    DecimalSeparator,
    GroupingSeparator,
    Infinity,
    MinusSign,
    NaN,
    Percent,
    PerMille,
    ZeroDigit,
    Digit,
    PatternSeparator,
    ExponentSeparator,
}

impl DecimalFormatProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "decimal-separator" => Self::DecimalSeparator,
            "grouping-separator" => Self::GroupingSeparator,
            "infinity" => Self::Infinity,
            "minus-sign" => Self::MinusSign,
            "NaN" => Self::NaN,
            "percent" => Self::Percent,
            "per-mille" => Self::PerMille,
            "zero-digit" => Self::ZeroDigit,
            "digit" => Self::Digit,
            "pattern-separator" => Self::PatternSeparator,
            "exponent-separator" => Self::ExponentSeparator,
            _ => return None,
        })
    }

    /// Properties whose value must be a single character.
    pub fn is_single_char(self) -> bool {
        !matches!(self, Self::Infinity | Self::NaN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaImport {
    pub prefix: Option<String>,
    pub default_element_namespace: bool,
    pub namespace: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleImport {
    pub prefix: Option<String>,
    pub namespace: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub annotations: Vec<Annotation>,
    pub name: QName,
    pub type_decl: Option<SequenceType>,
    pub value: Option<Expr>,
    pub external: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FunctionKind {
    #[default]
    Simple,
    Updating,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub annotations: Vec<Annotation>,
    pub kind: FunctionKind,
    pub name: QName,
    pub params: Vec<Param>,
    pub return_type: Option<SequenceType>,
    /// `None` for `external` functions.
    pub body: Option<Expr>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

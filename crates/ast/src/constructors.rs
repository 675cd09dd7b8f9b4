//! Direct and computed node constructors.

use crate::expr::Expr;
use crate::names::QName;
use serde::Serialize;

/// `<name attr="...">content</name>` or `<name/>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirElement {
    pub name: QName,
    pub attributes: Vec<DirAttribute>,
    /// `xmlns` / `xmlns:p` attributes, which bind namespaces instead of
    /// producing attribute nodes.
    pub namespaces: Vec<NamespaceBinding>,
    pub content: Vec<DirContent>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirAttribute {
    pub name: QName,
    pub value: Vec<AttributeValuePart>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttributeValuePart {
    Text(String),
    Enclosed(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceBinding {
    /// `None` for a default namespace declaration (`xmlns="..."`).
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DirContent {
    Text(String),
    CData(String),
    Enclosed(Expr),
    /// A nested direct element, comment or processing instruction.
    Node(Expr),
}

/// Name of a computed constructor: either given literally or computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComputedName {
    Literal(QName),
    Expr(Box<Expr>),
}

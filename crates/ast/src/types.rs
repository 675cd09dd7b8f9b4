//! Sequence types, kind tests and path step components.

use crate::names::{NameTest, QName};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceType {
    pub item_type: ItemType,
    pub occurrence: OccurrenceIndicator,
}

impl SequenceType {
    pub fn single(item_type: ItemType) -> Self {
        Self {
            item_type,
            occurrence: OccurrenceIndicator::ExactlyOne,
        }
    }

    /// `empty-sequence()`
    pub fn empty() -> Self {
        Self::single(ItemType::EmptySequence)
    }

    pub fn is_empty_sequence(&self) -> bool {
        matches!(self.item_type, ItemType::EmptySequence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemType {
    /// `empty-sequence()`; never carries an occurrence indicator.
    EmptySequence,
    Item,
    AtomicOrUnion(QName),
    KindTest(KindTest),
    /// `function(*)`
    AnyFunction,
    FunctionTest {
        params: Vec<SequenceType>,
        return_type: Box<SequenceType>,
    },
    Parenthesized(Box<ItemType>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KindTest {
    Document(Option<Box<KindTest>>),
    Element(Option<ElementName>, Option<TypeAnnotation>),
    Attribute(Option<ElementName>, Option<TypeAnnotation>),
    SchemaElement(QName),
    SchemaAttribute(QName),
    ProcessingInstruction(Option<String>),
    Comment,
    Text,
    NamespaceNode,
    AnyKind,
}

/// The name argument of `element(...)` / `attribute(...)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElementName {
    Name(QName),
    Wildcard,
}

/// The type argument of `element(n, T?)` / `attribute(n, T)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAnnotation {
    pub type_name: QName,
    pub nillable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OccurrenceIndicator {
    ExactlyOne,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleType {
    pub type_name: QName,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Child,
    Descendant,
    Attribute,
    SelfAxis,
    DescendantOrSelf,
    FollowingSibling,
    Following,
    Namespace,
    Parent,
    Ancestor,
    PrecedingSibling,
    Preceding,
    AncestorOrSelf,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "attribute" => Axis::Attribute,
            "self" => Axis::SelfAxis,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "following-sibling" => Axis::FollowingSibling,
            "following" => Axis::Following,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "ancestor" => Axis::Ancestor,
            "preceding-sibling" => Axis::PrecedingSibling,
            "preceding" => Axis::Preceding,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            _ => return None,
        })
    }

    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Parent
                | Axis::Ancestor
                | Axis::PrecedingSibling
                | Axis::Preceding
                | Axis::AncestorOrSelf
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeTest {
    Name(NameTest),
    Kind(KindTest),
}

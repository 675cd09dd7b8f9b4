//! Sequence types, item types and kind tests.
//!
//! Types are scanned in [`LexState::KindTest`], where `element`, `item` and
//! friends are type keywords and never names of steps or functions. A type
//! ends in [`LexState::Occurrence`] so that `?`, `*` and `+` bind to it, and
//! the caller says which state to resume afterwards.

use super::{PResult, Parser};
use crate::lexer::LexState;
use crate::rules::*;
use xqfront_ast::{
    ElementName, ItemType, KindTest, OccurrenceIndicator, SequenceType, SingleType,
    TypeAnnotation,
};

impl<'src, 'r> Parser<'src, 'r> {
    pub(super) fn sequence_type(&mut self, resume: LexState) -> PResult<SequenceType> {
        self.goto(LexState::KindTest);
        if self.eat(&EMPTY_SEQUENCE)? {
            self.goto(resume);
            return Ok(SequenceType::empty());
        }
        self.enter()?;
        let item_type = self.item_type();
        self.leave();
        let item_type = item_type?;
        self.goto(LexState::Occurrence);
        let occurrence = if self.eat(&OCCURS_OPTIONAL)? {
            OccurrenceIndicator::ZeroOrOne
        } else if self.eat(&OCCURS_ZERO_OR_MORE)? {
            OccurrenceIndicator::ZeroOrMore
        } else if self.eat(&OCCURS_ONE_OR_MORE)? {
            OccurrenceIndicator::OneOrMore
        } else {
            OccurrenceIndicator::ExactlyOne
        };
        self.goto(resume);
        Ok(SequenceType {
            item_type,
            occurrence,
        })
    }

    fn item_type(&mut self) -> PResult<ItemType> {
        if self.eat(&ITEM)? {
            return Ok(ItemType::Item);
        }
        if self.eat(&ANY_FUNCTION)? {
            return Ok(ItemType::AnyFunction);
        }
        if self.eat(&FUNCTION_TEST)? {
            let mut params = Vec::new();
            if !self.eat(&KT_CLOSE)? {
                loop {
                    params.push(self.sequence_type(LexState::KindTest)?);
                    if !self.eat(&KT_COMMA)? {
                        break;
                    }
                }
                self.expect(&KT_CLOSE)?;
            }
            self.expect(&KT_AS)?;
            let return_type = self.sequence_type(LexState::KindTest)?;
            return Ok(ItemType::FunctionTest {
                params,
                return_type: Box::new(return_type),
            });
        }
        if self.eat(&TYPE_PAREN_OPEN)? {
            let inner = self.item_type()?;
            self.expect(&KT_CLOSE)?;
            return Ok(ItemType::Parenthesized(Box::new(inner)));
        }
        if let Some(test) = self.kind_test()? {
            return Ok(ItemType::KindTest(test));
        }
        if self.eat(&TYPE_NAME)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            return Ok(ItemType::AtomicOrUnion(self.element_name(lexical, offset)));
        }
        Err(self.unexpected("a sequence type"))
    }

    /// A kind test, from its keyword through the closing parenthesis. The
    /// scanner is left in [`LexState::KindTest`].
    pub(super) fn kind_test(&mut self) -> PResult<Option<KindTest>> {
        let test = if self.eat(&KT_DOCUMENT)? {
            let inner = if self.eat(&KT_ELEMENT)? {
                let (name, annotation) = self.element_test_args(true)?;
                Some(Box::new(KindTest::Element(name, annotation)))
            } else if self.eat(&KT_SCHEMA_ELEMENT)? {
                Some(Box::new(KindTest::SchemaElement(self.schema_test_name(true)?)))
            } else {
                None
            };
            self.expect(&KT_CLOSE)?;
            KindTest::Document(inner)
        } else if self.eat(&KT_ELEMENT)? {
            let (name, annotation) = self.element_test_args(true)?;
            KindTest::Element(name, annotation)
        } else if self.eat(&KT_ATTRIBUTE)? {
            let (name, annotation) = self.element_test_args(false)?;
            KindTest::Attribute(name, annotation)
        } else if self.eat(&KT_SCHEMA_ELEMENT)? {
            KindTest::SchemaElement(self.schema_test_name(true)?)
        } else if self.eat(&KT_SCHEMA_ATTRIBUTE)? {
            KindTest::SchemaAttribute(self.schema_test_name(false)?)
        } else if self.eat(&KT_PI)? {
            let target = if self.eat(&KT_NCNAME)? {
                Some(self.captured_name(0))
            } else if self.eat(&KT_STRING)? {
                let value = self.captured_string(0);
                Some(value.split_whitespace().collect::<Vec<_>>().join(" "))
            } else {
                None
            };
            self.expect(&KT_CLOSE)?;
            KindTest::ProcessingInstruction(target)
        } else if self.eat(&KT_COMMENT)? {
            self.expect(&KT_CLOSE)?;
            KindTest::Comment
        } else if self.eat(&KT_TEXT)? {
            self.expect(&KT_CLOSE)?;
            KindTest::Text
        } else if self.eat(&KT_NAMESPACE_NODE)? {
            self.expect(&KT_CLOSE)?;
            KindTest::NamespaceNode
        } else if self.eat(&KT_NODE)? {
            self.expect(&KT_CLOSE)?;
            KindTest::AnyKind
        } else {
            return Ok(None);
        };
        Ok(Some(test))
    }

    /// `(name-or-*, type?)` of an element or attribute test, after the
    /// opening parenthesis.
    fn element_test_args(
        &mut self,
        element: bool,
    ) -> PResult<(Option<ElementName>, Option<TypeAnnotation>)> {
        if self.eat(&KT_CLOSE)? {
            return Ok((None, None));
        }
        let name = if self.eat(&KT_WILDCARD)? {
            ElementName::Wildcard
        } else if self.eat(&KT_NAME)? {
            let offset = self.start();
            let lexical = self.captured_qname(0);
            let name = if element {
                self.element_name(lexical, offset)
            } else {
                self.plain_name(lexical, offset)
            };
            ElementName::Name(name)
        } else {
            return Err(self.unexpected("a name or '*'"));
        };
        let mut annotation = None;
        if self.eat(&KT_COMMA)? {
            self.expect(&KT_NAME)?;
            let offset = self.start();
            let lexical = self.captured_qname(0);
            let type_name = self.element_name(lexical, offset);
            let nillable = element && self.eat(&KT_NILLABLE)?;
            annotation = Some(TypeAnnotation {
                type_name,
                nillable,
            });
        }
        self.expect(&KT_CLOSE)?;
        Ok((Some(name), annotation))
    }

    fn schema_test_name(&mut self, element: bool) -> PResult<xqfront_ast::QName> {
        self.expect(&KT_NAME)?;
        let offset = self.start();
        let lexical = self.captured_qname(0);
        let name = if element {
            self.element_name(lexical, offset)
        } else {
            self.plain_name(lexical, offset)
        };
        self.expect(&KT_CLOSE)?;
        Ok(name)
    }

    /// Target type of `cast as` and `castable as`.
    pub(super) fn single_type(&mut self) -> PResult<SingleType> {
        self.goto(LexState::KindTest);
        self.expect(&TYPE_NAME)?;
        let offset = self.start();
        let lexical = self.captured_qname(0);
        let type_name = self.element_name(lexical, offset);
        self.goto(LexState::Occurrence);
        let optional = self.eat(&OCCURS_OPTIONAL)?;
        self.goto(LexState::Operator);
        Ok(SingleType {
            type_name,
            optional,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::context::XS_NS;
    use crate::lexer::LexState;
    use crate::parser::Parser;
    use xqfront_ast::{ElementName, ItemType, KindTest, OccurrenceIndicator, SequenceType};

    fn seq_type(src: &str) -> SequenceType {
        let mut parser = Parser::new(src, ParserConfig::default());
        let ty = parser.sequence_type(LexState::Operator).unwrap();
        parser.expect_end().unwrap();
        ty
    }

    #[test]
    fn test_atomic_with_occurrence() {
        let ty = seq_type("xs:integer+");
        assert_eq!(ty.occurrence, OccurrenceIndicator::OneOrMore);
        match ty.item_type {
            ItemType::AtomicOrUnion(name) => {
                assert_eq!(name.local_part, "integer");
                assert_eq!(name.namespace.as_deref(), Some(XS_NS));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_sequence() {
        assert!(seq_type("empty-sequence()").is_empty_sequence());
    }

    #[test]
    fn test_kind_tests() {
        assert!(matches!(
            seq_type("element(*, xs:anyType?)").item_type,
            ItemType::KindTest(KindTest::Element(Some(ElementName::Wildcard), Some(ref t))) if t.nillable
        ));
        assert!(matches!(
            seq_type("document-node(element(book))*").item_type,
            ItemType::KindTest(KindTest::Document(Some(_)))
        ));
        assert_eq!(
            seq_type("processing-instruction('  a   b ')").item_type,
            ItemType::KindTest(KindTest::ProcessingInstruction(Some("a b".into())))
        );
        assert_eq!(seq_type("node()").item_type, ItemType::KindTest(KindTest::AnyKind));
    }

    #[test]
    fn test_function_types() {
        assert_eq!(seq_type("function(*)").item_type, ItemType::AnyFunction);
        match seq_type("function(xs:string, item()*) as xs:boolean").item_type {
            ItemType::FunctionTest { params, return_type } => {
                assert_eq!(params.len(), 2);
                assert_eq!(params[1].occurrence, OccurrenceIndicator::ZeroOrMore);
                assert!(matches!(return_type.item_type, ItemType::AtomicOrUnion(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            seq_type("(item())?").item_type,
            ItemType::Parenthesized(_)
        ));
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let mut parser = Parser::new("= 1", ParserConfig::default());
        let err = parser.sequence_type(LexState::Operator).unwrap_err();
        assert!(err.message().contains("sequence type"));
    }
}

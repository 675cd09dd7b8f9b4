//! Full-text selections: `expr contains text selection`.

use super::{PResult, Parser};
use crate::error::ErrorCode;
use crate::lexer::LexState;
use crate::rules::*;
use xqfront_ast::{
    Expr, ExprKind, FtAnyAll, FtBigUnit, FtCaseOption, FtDiacriticsOption, FtMatchOptions,
    FtPosFilter, FtRange, FtSelection, FtStopWordCombine, FtStopWordOption, FtStopWordSource,
    FtStopWords, FtThesaurusId, FtThesaurusOption, FtUnit, FtWordsValue,
};

/// Collapses a one-element operand list into the operand itself.
fn flatten(mut operands: Vec<FtSelection>, wrap: fn(Vec<FtSelection>) -> FtSelection) -> FtSelection {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        wrap(operands)
    }
}

impl<'src, 'r> Parser<'src, 'r> {
    /// The selection after `ftcontains` / `contains text`, plus an optional
    /// `without content` exclusion.
    pub(super) fn ft_contains(&mut self, left: Expr, offset: usize) -> PResult<Expr> {
        let selection = self.ft_selection()?;
        let without_content = if self.eat(&WITHOUT_CONTENT)? {
            Some(self.union_expr()?.boxed())
        } else {
            None
        };
        Ok(self.node(
            ExprKind::FtContains {
                expr: left.boxed(),
                selection,
                without_content,
            },
            offset,
        ))
    }

    fn ft_selection(&mut self) -> PResult<FtSelection> {
        self.enter()?;
        let result = self.ft_selection_inner();
        self.leave();
        result
    }

    fn ft_selection_inner(&mut self) -> PResult<FtSelection> {
        let selection = self.ft_or()?;
        let mut filters = Vec::new();
        while let Some(filter) = self.ft_pos_filter()? {
            filters.push(filter);
        }
        if filters.is_empty() {
            return Ok(selection);
        }
        Ok(FtSelection::Positional {
            selection: Box::new(selection),
            filters,
        })
    }

    fn ft_or(&mut self) -> PResult<FtSelection> {
        let mut operands = vec![self.ft_and()?];
        while self.eat(&FTOR)? {
            operands.push(self.ft_and()?);
        }
        Ok(flatten(operands, FtSelection::Or))
    }

    fn ft_and(&mut self) -> PResult<FtSelection> {
        let mut operands = vec![self.ft_mild_not()?];
        while self.eat(&FTAND)? {
            operands.push(self.ft_mild_not()?);
        }
        Ok(flatten(operands, FtSelection::And))
    }

    fn ft_mild_not(&mut self) -> PResult<FtSelection> {
        let mut operands = vec![self.ft_unary_not()?];
        while self.eat(&NOT_IN)? {
            operands.push(self.ft_unary_not()?);
        }
        Ok(flatten(operands, FtSelection::MildNot))
    }

    fn ft_unary_not(&mut self) -> PResult<FtSelection> {
        if self.eat(&FTNOT)? {
            let operand = self.ft_primary_with_options()?;
            return Ok(FtSelection::Not(Box::new(operand)));
        }
        self.ft_primary_with_options()
    }

    fn ft_primary_with_options(&mut self) -> PResult<FtSelection> {
        let primary = self.ft_primary()?;
        let options = self.match_options()?;
        let weight = if self.eat(&WEIGHT)? {
            Some(self.braced_expr()?.boxed())
        } else {
            None
        };
        if options.is_empty() && weight.is_none() {
            return Ok(primary);
        }
        Ok(FtSelection::WithOptions {
            selection: Box::new(primary),
            options,
            weight,
        })
    }

    fn ft_primary(&mut self) -> PResult<FtSelection> {
        if self.peek(&PRAGMA_OPEN)? {
            let (pragmas, _) = self.pragmas()?;
            self.expect(&LBRACE)?;
            let selection = if self.eat(&RBRACE)? {
                None
            } else {
                let selection = self.ft_selection()?;
                self.expect(&RBRACE)?;
                Some(Box::new(selection))
            };
            return Ok(FtSelection::Extension { pragmas, selection });
        }
        if self.eat(&FT_GROUP_OPEN)? {
            let selection = self.ft_selection()?;
            self.expect(&RPAREN)?;
            return Ok(selection);
        }
        let value = if self.eat(&FT_WORDS)? {
            FtWordsValue::Literal(self.captured_string(0))
        } else if self.eat(&LBRACE)? {
            let expr = self.expr()?;
            self.expect(&RBRACE)?;
            FtWordsValue::Expr(expr.boxed())
        } else {
            return Err(self.unexpected("a full-text selection"));
        };
        let mode = if self.eat(&ANY_WORD)? {
            FtAnyAll::AnyWord
        } else if self.eat(&ANY)? {
            FtAnyAll::Any
        } else if self.eat(&ALL_WORDS)? {
            FtAnyAll::AllWords
        } else if self.eat(&ALL)? {
            FtAnyAll::All
        } else if self.eat(&PHRASE)? {
            FtAnyAll::Phrase
        } else {
            FtAnyAll::default()
        };
        let times = if self.eat(&OCCURS)? {
            let range = self.ft_range()?;
            self.expect(&TIMES)?;
            Some(range)
        } else {
            None
        };
        Ok(FtSelection::Words { value, mode, times })
    }

    fn ft_range(&mut self) -> PResult<FtRange> {
        if self.eat(&EXACTLY)? {
            return Ok(FtRange::Exactly(self.additive_expr()?.boxed()));
        }
        if self.eat(&AT_LEAST)? {
            return Ok(FtRange::AtLeast(self.additive_expr()?.boxed()));
        }
        if self.eat(&AT_MOST)? {
            return Ok(FtRange::AtMost(self.additive_expr()?.boxed()));
        }
        if self.eat(&FROM)? {
            let from = self.additive_expr()?;
            self.expect(&FT_TO)?;
            let to = self.additive_expr()?;
            return Ok(FtRange::FromTo(from.boxed(), to.boxed()));
        }
        Err(self.unexpected("'exactly', 'at least', 'at most' or 'from'"))
    }

    fn ft_unit(&mut self) -> PResult<FtUnit> {
        if self.eat(&WORDS)? {
            Ok(FtUnit::Words)
        } else if self.eat(&SENTENCES)? {
            Ok(FtUnit::Sentences)
        } else if self.eat(&PARAGRAPHS)? {
            Ok(FtUnit::Paragraphs)
        } else {
            Err(self.unexpected("'words', 'sentences' or 'paragraphs'"))
        }
    }

    fn ft_pos_filter(&mut self) -> PResult<Option<FtPosFilter>> {
        let filter = if self.eat(&FT_ORDERED)? {
            FtPosFilter::Ordered
        } else if self.eat(&FT_WINDOW)? {
            let size = self.additive_expr()?;
            FtPosFilter::Window(size.boxed(), self.ft_unit()?)
        } else if self.eat(&DISTANCE)? {
            let range = self.ft_range()?;
            FtPosFilter::Distance(range, self.ft_unit()?)
        } else if self.eat(&SAME)? {
            FtPosFilter::Scope {
                same: true,
                unit: self.ft_big_unit()?,
            }
        } else if self.eat(&DIFFERENT)? {
            FtPosFilter::Scope {
                same: false,
                unit: self.ft_big_unit()?,
            }
        } else if self.eat(&AT_START)? {
            FtPosFilter::AtStart
        } else if self.eat(&AT_END)? {
            FtPosFilter::AtEnd
        } else if self.eat(&ENTIRE_CONTENT)? {
            FtPosFilter::EntireContent
        } else {
            return Ok(None);
        };
        Ok(Some(filter))
    }

    fn ft_big_unit(&mut self) -> PResult<FtBigUnit> {
        if self.eat(&SENTENCE)? {
            Ok(FtBigUnit::Sentence)
        } else if self.eat(&PARAGRAPH)? {
            Ok(FtBigUnit::Paragraph)
        } else {
            Err(self.unexpected("'sentence' or 'paragraph'"))
        }
    }

    /// Zero or more `using ...` options. Each option may be given once; a
    /// repeat is recorded and the later value wins.
    pub(super) fn match_options(&mut self) -> PResult<FtMatchOptions> {
        let mut options = FtMatchOptions::default();
        while self.eat(&USING)? {
            let offset = self.scan.next_offset();
            let (option, repeated) = if let Some(case) = self.case_option()? {
                ("case", options.case.replace(case).is_some())
            } else if self.eat(&DIACRITICS_INSENSITIVE)? {
                let old = options.diacritics.replace(FtDiacriticsOption::Insensitive);
                ("diacritics", old.is_some())
            } else if self.eat(&DIACRITICS_SENSITIVE)? {
                let old = options.diacritics.replace(FtDiacriticsOption::Sensitive);
                ("diacritics", old.is_some())
            } else if self.eat(&NO_STEMMING)? {
                ("stemming", options.stemming.replace(false).is_some())
            } else if self.eat(&STEMMING)? {
                ("stemming", options.stemming.replace(true).is_some())
            } else if self.eat(&NO_WILDCARDS)? {
                ("wildcards", options.wildcards.replace(false).is_some())
            } else if self.eat(&WILDCARDS)? {
                ("wildcards", options.wildcards.replace(true).is_some())
            } else if self.eat(&LANGUAGE)? {
                let language = self.captured_string(0);
                ("language", options.language.replace(language).is_some())
            } else if self.eat(&FT_EXTENSION_OPTION)? {
                let lexical = self.captured_qname(0);
                let value = self.captured_string(1);
                let name = self.plain_name(lexical, offset);
                options.extensions.push((name, value));
                ("option", false)
            } else if self.eat(&NO_THESAURUS)? {
                let disabled = FtThesaurusOption {
                    enabled: false,
                    include_default: false,
                    thesauri: Vec::new(),
                };
                ("thesaurus", options.thesaurus.replace(disabled).is_some())
            } else if self.eat(&THESAURUS)? {
                let thesaurus = self.thesaurus_option()?;
                ("thesaurus", options.thesaurus.replace(thesaurus).is_some())
            } else if let Some(stop_words) = self.stop_word_option()? {
                ("stop words", options.stop_words.replace(stop_words).is_some())
            } else {
                return Err(self.unexpected("a match option"));
            };
            if repeated {
                self.record(
                    ErrorCode::DuplicateMatchOption,
                    offset,
                    format!("the {} match option is given more than once", option),
                );
            }
        }
        Ok(options)
    }

    fn case_option(&mut self) -> PResult<Option<FtCaseOption>> {
        Ok(if self.eat(&CASE_INSENSITIVE)? {
            Some(FtCaseOption::Insensitive)
        } else if self.eat(&CASE_SENSITIVE)? {
            Some(FtCaseOption::Sensitive)
        } else if self.eat(&LOWERCASE)? {
            Some(FtCaseOption::Lowercase)
        } else if self.eat(&UPPERCASE)? {
            Some(FtCaseOption::Uppercase)
        } else {
            None
        })
    }

    /// After `thesaurus`: `default`, one `at "uri"` thesaurus, or a
    /// parenthesized list of them.
    fn thesaurus_option(&mut self) -> PResult<FtThesaurusOption> {
        let mut option = FtThesaurusOption {
            enabled: true,
            include_default: false,
            thesauri: Vec::new(),
        };
        if self.eat(&THESAURUS_OPEN)? {
            loop {
                if self.eat(&THESAURUS_DEFAULT)? {
                    option.include_default = true;
                } else {
                    option.thesauri.push(self.thesaurus_id()?);
                }
                if !self.eat(&THESAURUS_COMMA)? {
                    break;
                }
            }
            self.expect(&THESAURUS_CLOSE)?;
        } else if self.eat(&THESAURUS_DEFAULT)? {
            option.include_default = true;
        } else {
            option.thesauri.push(self.thesaurus_id()?);
        }
        self.goto(LexState::Operator);
        Ok(option)
    }

    fn thesaurus_id(&mut self) -> PResult<FtThesaurusId> {
        self.expect(&THESAURUS_AT)?;
        let at = self.captured_string(0);
        let relationship = if self.eat(&RELATIONSHIP)? {
            Some(self.captured_string(0))
        } else {
            None
        };
        let levels = if self.eat(&LITERAL_EXACTLY)? {
            Some(FtRange::Exactly(self.captured_number(0)))
        } else if self.eat(&LITERAL_AT_LEAST)? {
            Some(FtRange::AtLeast(self.captured_number(0)))
        } else if self.eat(&LITERAL_AT_MOST)? {
            Some(FtRange::AtMost(self.captured_number(0)))
        } else if self.eat(&LITERAL_FROM)? {
            Some(FtRange::FromTo(self.captured_number(0), self.captured_number(1)))
        } else {
            None
        };
        if levels.is_some() {
            self.expect(&LEVELS)?;
        }
        Ok(FtThesaurusId {
            at,
            relationship,
            levels,
        })
    }

    fn captured_number(&self, index: usize) -> Box<Expr> {
        let offset = self.start();
        let literal = self
            .scan
            .captures()
            .number(index)
            .unwrap_or(xqfront_ast::Literal::Integer(0));
        self.node(ExprKind::Literal(literal), offset).boxed()
    }

    fn stop_word_option(&mut self) -> PResult<Option<FtStopWordOption>> {
        if self.eat(&NO_STOP_WORDS)? {
            return Ok(Some(FtStopWordOption {
                enabled: false,
                sources: Vec::new(),
            }));
        }
        let words = if self.eat(&STOP_WORDS_DEFAULT)? {
            FtStopWords::Default
        } else if self.eat(&STOP_WORDS_AT)? {
            FtStopWords::At(self.captured_string(0))
        } else if self.eat(&STOP_WORDS_LIST)? {
            FtStopWords::List(self.stop_word_list()?)
        } else {
            return Ok(None);
        };
        let mut sources = vec![FtStopWordSource {
            combine: None,
            words,
        }];
        loop {
            let mark = self.scan.mark();
            let combine = if self.eat(&STOP_WORDS_UNION)? {
                FtStopWordCombine::Union
            } else if self.eat(&STOP_WORDS_EXCEPT)? {
                FtStopWordCombine::Except
            } else {
                break;
            };
            let words = if self.eat(&FT_LIST_AT)? {
                FtStopWords::At(self.captured_string(0))
            } else if self.eat(&FT_LIST_OPEN)? {
                FtStopWords::List(self.stop_word_list()?)
            } else {
                // `union` / `except` of the enclosing expression.
                self.scan.restore(mark);
                break;
            };
            sources.push(FtStopWordSource {
                combine: Some(combine),
                words,
            });
        }
        Ok(Some(FtStopWordOption {
            enabled: true,
            sources,
        }))
    }

    /// `"w", "w", ... )` after the opening parenthesis.
    fn stop_word_list(&mut self) -> PResult<Vec<String>> {
        let mut words = Vec::new();
        loop {
            if !self.eat(&FT_LIST_STRING)? {
                return Err(self.unexpected("a string literal"));
            }
            words.push(self.captured_string(0));
            if !self.eat(&FT_LIST_COMMA)? {
                break;
            }
        }
        self.expect(&FT_LIST_CLOSE)?;
        Ok(words)
    }
}

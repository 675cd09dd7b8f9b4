//! Full-text selections, match options and positional filters.

use crate::expr::{Expr, Pragma};
use crate::names::QName;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FtSelection {
    /// `a ftor b ftor ...`
    Or(Vec<FtSelection>),
    /// `a ftand b ftand ...`
    And(Vec<FtSelection>),
    /// `a not in b not in ...`
    MildNot(Vec<FtSelection>),
    /// `ftnot a`
    Not(Box<FtSelection>),
    Words {
        value: FtWordsValue,
        mode: FtAnyAll,
        times: Option<FtRange>,
    },
    WithOptions {
        selection: Box<FtSelection>,
        options: FtMatchOptions,
        weight: Option<Box<Expr>>,
    },
    Positional {
        selection: Box<FtSelection>,
        filters: Vec<FtPosFilter>,
    },
    Extension {
        pragmas: Vec<Pragma>,
        selection: Option<Box<FtSelection>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FtWordsValue {
    Literal(String),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FtAnyAll {
    #[default]
    Any,
    AnyWord,
    All,
    AllWords,
    Phrase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FtRange {
    Exactly(Box<Expr>),
    AtLeast(Box<Expr>),
    AtMost(Box<Expr>),
    FromTo(Box<Expr>, Box<Expr>),
}

/// Match options attached to a full-text primary. Each option may be given at
/// most once per primary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FtMatchOptions {
    pub language: Option<String>,
    pub wildcards: Option<bool>,
    pub thesaurus: Option<FtThesaurusOption>,
    pub stemming: Option<bool>,
    pub stop_words: Option<FtStopWordOption>,
    pub case: Option<FtCaseOption>,
    pub diacritics: Option<FtDiacriticsOption>,
    pub extensions: Vec<(QName, String)>,
}

impl FtMatchOptions {
    pub fn is_empty(&self) -> bool {
        *self == FtMatchOptions::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FtThesaurusOption {
    pub enabled: bool,
    pub include_default: bool,
    pub thesauri: Vec<FtThesaurusId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FtThesaurusId {
    pub at: String,
    pub relationship: Option<String>,
    pub levels: Option<FtRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FtStopWordOption {
    pub enabled: bool,
    pub sources: Vec<FtStopWordSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FtStopWordSource {
    /// `None` for the first source, then `union`/`except` for later ones.
    pub combine: Option<FtStopWordCombine>,
    pub words: FtStopWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FtStopWordCombine {
    Union,
    Except,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FtStopWords {
    Default,
    At(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FtCaseOption {
    Sensitive,
    Insensitive,
    Lowercase,
    Uppercase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FtDiacriticsOption {
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FtPosFilter {
    Ordered,
    Window(Box<Expr>, FtUnit),
    Distance(FtRange, FtUnit),
    Scope { same: bool, unit: FtBigUnit },
    AtStart,
    AtEnd,
    EntireContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FtUnit {
    Words,
    Sentences,
    Paragraphs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FtBigUnit {
    Sentence,
    Paragraph,
}

//! Pattern rules and the backtracking matcher.
//!
//! A pattern is a compact string interpreted directly against the input:
//!
//! | Item | Meaning |
//! |------|---------|
//! | literal char | must match exactly |
//! | `' '` | optional whitespace (and comments where the state skips them); mandatory between two word characters |
//! | `%N` | NCName |
//! | `%Q` | QName, with a lenient colon |
//! | `%S` | string literal |
//! | `%D` | numeric literal |
//! | `%^` | anchor: on success the cursor is rewound to this point |
//! | `%%` | a literal `%` |
//!
//! A keyword made of word characters must also end on a word boundary, so
//! `div` does not match the start of `divide`. A failed match leaves the
//! cursor exactly where it was.

use crate::config::{Extension, ParserConfig};
use crate::cursor::Cursor;
use crate::error::{Diagnostic, ErrorCode};
use crate::lexer::{LexState, Lexer, StateSet};
use crate::scanner::{self, LexError, ScanError, is_name_char};
use nom::Parser;
use xqfront_ast::Literal;

/// The lexical state change applied after a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stay,
    Goto(LexState),
    /// Enter a state and resume the current one on [`Next::Pop`].
    Push(LexState),
    /// Enter `state` and resume `resume` on [`Next::Pop`].
    Enter { state: LexState, resume: LexState },
    Pop,
}

/// One entry of the grammar rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub pattern: &'static str,
    /// States in which the rule may match.
    pub states: StateSet,
    pub next: Next,
    pub extension: Extension,
}

impl Rule {
    pub const fn new(pattern: &'static str, states: StateSet, next: Next) -> Rule {
        Rule {
            pattern,
            states,
            next,
            extension: Extension::Core,
        }
    }

    pub const fn ext(self, extension: Extension) -> Rule {
        Rule { extension, ..self }
    }

    /// Human-readable form of the pattern for error messages.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let mut items = self.pattern.chars();
        while let Some(c) = items.next() {
            match c {
                '%' => match items.next() {
                    Some('N') => out.push_str(" name "),
                    Some('Q') => out.push_str(" QName "),
                    Some('S') => out.push_str(" string literal "),
                    Some('D') => out.push_str(" number "),
                    Some('%') => out.push('%'),
                    _ => {}
                },
                c => out.push(c),
            }
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Name(String),
    QName {
        prefix: Option<String>,
        local: String,
    },
    Str(String),
    Number(Literal),
}

/// Side buffer for the typed sub-lexemes of the last successful match.
/// Accessors return empty values when the capture at `index` has a
/// different type.
#[derive(Debug, Clone, Default)]
pub struct Captures(Vec<Capture>);

impl Captures {
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Capture> {
        self.0.get(index)
    }

    pub fn name(&self, index: usize) -> String {
        match self.0.get(index) {
            Some(Capture::Name(name)) => name.clone(),
            Some(Capture::QName { prefix: None, local }) => local.clone(),
            _ => String::new(),
        }
    }

    pub fn qname(&self, index: usize) -> (Option<String>, String) {
        match self.0.get(index) {
            Some(Capture::QName { prefix, local }) => (prefix.clone(), local.clone()),
            Some(Capture::Name(name)) => (None, name.clone()),
            _ => (None, String::new()),
        }
    }

    pub fn string(&self, index: usize) -> String {
        match self.0.get(index) {
            Some(Capture::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn number(&self, index: usize) -> Option<Literal> {
        match self.0.get(index) {
            Some(Capture::Number(n)) => Some(n.clone()),
            _ => None,
        }
    }
}

/// A saved scan position: cursor offset plus lexical state.
#[derive(Debug, Clone)]
pub struct Mark {
    pos: usize,
    lexer: Lexer,
}

/// Cursor, lexical state and captures of one parse.
#[derive(Debug)]
pub struct Matcher<'src> {
    cursor: Cursor<'src>,
    lexer: Lexer,
    captures: Captures,
    token_start: usize,
    full_text: bool,
    update: bool,
    scripting: bool,
}

impl<'src> Matcher<'src> {
    pub fn new(src: &'src str, config: &ParserConfig) -> Self {
        Self {
            cursor: Cursor::new(src),
            lexer: Lexer::default(),
            captures: Captures::default(),
            token_start: 0,
            full_text: config.full_text,
            update: config.update,
            scripting: config.scripting,
        }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Start of the text consumed by the last successful match, after any
    /// skipped whitespace.
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    pub fn state(&self) -> LexState {
        self.lexer.state()
    }

    pub fn goto(&mut self, state: LexState) {
        self.lexer.goto(state);
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn cursor(&self) -> &Cursor<'src> {
        &self.cursor
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.cursor.pos(),
            lexer: self.lexer.clone(),
        }
    }

    pub fn restore(&mut self, mark: Mark) {
        self.cursor.reset(mark.pos);
        self.lexer = mark.lexer;
    }

    pub fn enabled(&self, extension: Extension) -> bool {
        match extension {
            Extension::Core => true,
            Extension::FullText => self.full_text,
            Extension::Update => self.update,
            Extension::Scripting => self.scripting,
        }
    }

    /// Matches `rule` if it is legal in the current state, then applies its
    /// state transition.
    pub fn eat(&mut self, rule: &Rule) -> Result<bool, Diagnostic> {
        if !rule.states.contains(self.lexer.state()) || !self.enabled(rule.extension) {
            return Ok(false);
        }
        if !self.try_match(rule.pattern)? {
            return Ok(false);
        }
        match rule.next {
            Next::Stay => {}
            Next::Goto(state) => self.lexer.goto(state),
            Next::Push(state) => {
                let resume = self.lexer.state();
                self.lexer.push(state, resume);
            }
            Next::Enter { state, resume } => self.lexer.push(state, resume),
            Next::Pop => self.lexer.pop(),
        }
        Ok(true)
    }

    /// Tests `rule` without consuming input or changing state. Captures of a
    /// successful peek stay readable.
    pub fn peek(&mut self, rule: &Rule) -> Result<bool, Diagnostic> {
        if !rule.states.contains(self.lexer.state()) || !self.enabled(rule.extension) {
            return Ok(false);
        }
        let start = self.cursor.pos();
        let matched = self.try_match(rule.pattern)?;
        self.cursor.reset(start);
        Ok(matched)
    }

    /// Matches a pattern at the current position regardless of state. On
    /// failure the cursor is restored and `false` returned; malformed
    /// sub-lexemes are reported as errors.
    pub fn try_match(&mut self, pattern: &str) -> Result<bool, Diagnostic> {
        let start = self.cursor.pos();
        self.captures.clear();
        if self.lexer.state().skips_whitespace() {
            self.skip_trivia()?;
        }
        let token_start = self.cursor.pos();
        match self.match_items(pattern.as_bytes()) {
            Ok(Some(anchor)) => {
                if let Some(anchor) = anchor {
                    self.cursor.reset(anchor);
                }
                self.token_start = token_start;
                Ok(true)
            }
            Ok(None) => {
                self.cursor.reset(start);
                self.captures.clear();
                Ok(false)
            }
            Err(e) => {
                self.cursor.reset(start);
                Err(e)
            }
        }
    }

    /// `Ok(Some(anchor))` on success, `Ok(None)` on mismatch.
    fn match_items(&mut self, pattern: &[u8]) -> Result<Option<Option<usize>>, Diagnostic> {
        let mut anchor = None;
        let mut prev_word = false;
        let mut i = 0;
        while i < pattern.len() {
            let item = pattern[i];
            i += 1;
            let matched = match item {
                b' ' => {
                    let before = self.cursor.pos();
                    self.skip_trivia()?;
                    !(prev_word && starts_word(&pattern[i..]) && self.cursor.pos() == before)
                }
                b'%' => {
                    let kind = pattern.get(i).copied();
                    i += 1;
                    if kind == Some(b'^') {
                        anchor = Some(self.cursor.pos());
                        continue;
                    }
                    prev_word = matches!(kind, Some(b'N') | Some(b'Q') | Some(b'D'));
                    match kind {
                        Some(b'%') => self.literal('%'),
                        Some(b'N') => self.capture_name()?,
                        Some(b'Q') => self.capture_qname()?,
                        Some(b'S') => self.capture_string()?,
                        Some(b'D') => self.capture_number()?,
                        _ => false,
                    }
                }
                c => {
                    let c = c as char;
                    let word = c.is_ascii_alphanumeric() || c == '_' || (c == '-' && prev_word);
                    if !self.literal(c) {
                        false
                    } else if word && !continues_word(&pattern[i..]) {
                        prev_word = true;
                        !is_name_char(self.cursor.current())
                    } else {
                        prev_word = word;
                        true
                    }
                }
            };
            if !matched {
                return Ok(None);
            }
        }
        Ok(Some(anchor))
    }

    fn literal(&mut self, c: char) -> bool {
        if self.cursor.current() == c && !self.cursor.is_eof() {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    fn capture_name(&mut self) -> Result<bool, Diagnostic> {
        Ok(match self.run(scanner::nc_name)? {
            Some(name) => {
                self.captures.0.push(Capture::Name(name.to_string()));
                true
            }
            None => false,
        })
    }

    fn capture_qname(&mut self) -> Result<bool, Diagnostic> {
        Ok(match self.run(scanner::qname)? {
            Some((prefix, local)) => {
                self.captures.0.push(Capture::QName {
                    prefix: prefix.map(str::to_string),
                    local: local.to_string(),
                });
                true
            }
            None => false,
        })
    }

    fn capture_string(&mut self) -> Result<bool, Diagnostic> {
        Ok(match self.run(scanner::string_literal)? {
            Some(value) => {
                self.captures.0.push(Capture::Str(value));
                true
            }
            None => false,
        })
    }

    fn capture_number(&mut self) -> Result<bool, Diagnostic> {
        let start = self.cursor.pos();
        let Some((kind, text)) = self.run(scanner::numeric_literal)? else {
            return Ok(false);
        };
        let value = scanner::number_value(kind, text)
            .map_err(|message| Diagnostic::error(ErrorCode::ImplementationLimit, start, message))?;
        self.captures.0.push(Capture::Number(value));
        Ok(true)
    }

    /// Runs a sub-scanner at the cursor and advances past what it consumed.
    pub fn run<T>(
        &mut self,
        scanner: impl Parser<&'src str, Output = T, Error = ScanError<'src>>,
    ) -> Result<Option<T>, Diagnostic> {
        let start = self.cursor.pos();
        match scanner::run(self.cursor.rest(), scanner) {
            Ok(Some((value, consumed))) => {
                self.cursor.advance_by(consumed);
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(lex_diagnostic(start, e)),
        }
    }

    /// Skips whitespace and comments as the current state allows.
    pub fn skip_trivia(&mut self) -> Result<(), Diagnostic> {
        let comments = self.lexer.state().skips_comments();
        self.run(|i: &'src str| scanner::trivia(i, comments))?;
        Ok(())
    }

    /// True when only whitespace and comments remain.
    pub fn at_end(&mut self) -> Result<bool, Diagnostic> {
        let start = self.cursor.pos();
        self.run(|i: &'src str| scanner::trivia(i, true))?;
        let end = self.cursor.is_eof();
        self.cursor.reset(start);
        Ok(end)
    }

    /// Offset of the next significant character, for error reporting.
    pub fn next_offset(&self) -> usize {
        let rest = self.cursor.rest();
        let trimmed = rest.trim_start();
        self.cursor.pos() + (rest.len() - trimmed.len())
    }

    pub fn excerpt(&self) -> String {
        let mut cursor = self.cursor.clone();
        cursor.reset(self.next_offset());
        cursor.excerpt()
    }
}

fn lex_diagnostic(base: usize, e: LexError) -> Diagnostic {
    Diagnostic::error(e.code(), base + e.at, e.message())
}

/// Whether the remaining pattern starts with something that begins with a
/// word character, skipping anchors.
fn starts_word(rest: &[u8]) -> bool {
    let mut i = 0;
    while rest.get(i) == Some(&b'%') && rest.get(i + 1) == Some(&b'^') {
        i += 2;
    }
    match rest.get(i) {
        Some(b'%') => matches!(rest.get(i + 1), Some(b'N') | Some(b'Q') | Some(b'D')),
        Some(c) => c.is_ascii_alphanumeric() || *c == b'_',
        None => false,
    }
}

fn continues_word(rest: &[u8]) -> bool {
    matches!(rest.first(), Some(c) if c.is_ascii_alphanumeric() || *c == b'_' || *c == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(src: &str) -> Matcher<'_> {
        Matcher::new(src, &ParserConfig::default())
    }

    #[test]
    fn test_failed_match_never_moves_cursor() {
        let inputs = ["forsome", "  for x", "order  (: c :) bx", "declare"];
        let patterns = ["for %^$", "order by", "declare function", "%S", "%D"];
        for src in inputs {
            let mut m = matcher(src);
            for pattern in patterns {
                let before = m.pos();
                let matched = m.try_match(pattern).unwrap();
                assert!(!matched, "{pattern} matched {src}");
                assert_eq!(before, m.pos());
            }
        }
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        let mut m = matcher("divide");
        assert!(!m.try_match("div").unwrap());
        let mut m = matcher("div 2");
        assert!(m.try_match("div").unwrap());
        assert_eq!(m.pos(), 3);
        let mut m = matcher("for-each");
        assert!(!m.try_match("for").unwrap());
    }

    #[test]
    fn test_mandatory_space_between_words() {
        let mut m = matcher("orderby");
        assert!(!m.try_match("order by").unwrap());
        let mut m = matcher("order(: c :)by $x");
        assert!(m.try_match("order by").unwrap());
        assert_eq!(m.cursor().rest(), " $x");
        let mut m = matcher("if(");
        assert!(m.try_match("if %^(").unwrap());
        assert_eq!(m.cursor().rest(), "(");
    }

    #[test]
    fn test_anchor_rewinds_after_success() {
        let mut m = matcher("  for $x in");
        assert!(m.try_match("for %^$").unwrap());
        assert_eq!(m.cursor().rest(), "$x in");
        assert_eq!(m.token_start(), 2);
    }

    #[test]
    fn test_captures() {
        let mut m = matcher("declare option p:opt 'v';");
        assert!(m.try_match("declare option %Q %S").unwrap());
        assert_eq!(
            m.captures().qname(0),
            (Some("p".to_string()), "opt".to_string())
        );
        assert_eq!(m.captures().string(1), "v");

        let mut m = matcher("fn:concat#2");
        assert!(m.try_match("%Q #%D").unwrap());
        assert_eq!(m.captures().number(1), Some(Literal::Integer(2)));
    }

    #[test]
    fn test_lexical_errors_are_reported() {
        let mut m = matcher("  'abc");
        let err = m.try_match("%S").unwrap_err();
        assert_eq!(err.code, ErrorCode::Syntax);
        assert_eq!(err.offset, 2);
        assert_eq!(m.pos(), 0);

        let mut m = matcher("(: open");
        assert!(m.try_match("x").is_err());
    }

    #[test]
    fn test_eat_respects_states_and_extensions() {
        let div = Rule::new("div", StateSet::OPERATOR, Next::Goto(LexState::Expression));
        let mut m = matcher("div");
        assert!(!m.eat(&div).unwrap());
        m.goto(LexState::Operator);
        assert!(m.eat(&div).unwrap());
        assert_eq!(m.state(), LexState::Expression);

        let ftand = Rule::new("ftand", StateSet::CODE, Next::Stay).ext(Extension::FullText);
        let mut m = Matcher::new("ftand", &ParserConfig::core_only());
        assert!(!m.eat(&ftand).unwrap());
    }

    #[test]
    fn test_markup_states_do_not_skip() {
        let text = Rule::new("a", StateSet::CONTENT, Next::Stay);
        let mut m = matcher(" a");
        m.goto(LexState::Content);
        assert!(!m.eat(&text).unwrap());

        let tag_end = Rule::new(">", StateSet::TAG, Next::Stay);
        let mut m = matcher("  >");
        m.goto(LexState::Tag);
        assert!(m.eat(&tag_end).unwrap());

        let mut m = matcher("(: c :)>");
        m.goto(LexState::Tag);
        assert!(!m.eat(&tag_end).unwrap());
    }

    #[test]
    fn test_describe() {
        let rule = Rule::new("declare function %Q (", StateSet::DECLARE, Next::Stay);
        assert_eq!(rule.describe(), "declare function QName (");
        let rule = Rule::new("for %^$", StateSet::CODE, Next::Stay);
        assert_eq!(rule.describe(), "for $");
    }
}

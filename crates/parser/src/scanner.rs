//! Sub-scanners for the typed lexemes of the pattern language.
//!
//! Each scanner is a nom parser over the remaining text. A recoverable
//! `nom::Err::Error` means "not this lexeme here"; `nom::Err::Failure` marks
//! malformed input (an unterminated literal, an illegal character reference,
//! a lone `}` in markup) and is always fatal for the parse.

use crate::error::ErrorCode;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, multispace1, one_of, satisfy},
    combinator::{opt, recognize},
    error::{ErrorKind, ParseError},
    sequence::{preceded, terminated},
};
use rust_decimal::Decimal;
use std::str::FromStr;
use xqfront_ast::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    Nom(ErrorKind),
    Unterminated(&'static str),
    MalformedNumber,
    MalformedReference,
    UnknownEntity,
    IllegalCharacter,
    LoneBrace,
    InvalidMarkup(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanError<'a> {
    pub input: &'a str,
    pub kind: ScanErrorKind,
}

impl<'a> ParseError<&'a str> for ScanError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self {
            input,
            kind: ScanErrorKind::Nom(kind),
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

pub type ScanResult<'a, T> = IResult<&'a str, T, ScanError<'a>>;

/// A fatal lexical error, `at` bytes into the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub kind: ScanErrorKind,
    pub at: usize,
}

impl LexError {
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            ScanErrorKind::IllegalCharacter => ErrorCode::InvalidCharacterReference,
            _ => ErrorCode::Syntax,
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            ScanErrorKind::Nom(kind) => format!("malformed input ({:?})", kind),
            ScanErrorKind::Unterminated(what) => format!("unterminated {}", what),
            ScanErrorKind::MalformedNumber => "invalid character in numeric literal".to_string(),
            ScanErrorKind::MalformedReference => "malformed character reference".to_string(),
            ScanErrorKind::UnknownEntity => "unknown entity reference".to_string(),
            ScanErrorKind::IllegalCharacter => {
                "character reference to a character that is not allowed in XML".to_string()
            }
            ScanErrorKind::LoneBrace => "'}' must be written as '}}' in markup".to_string(),
            ScanErrorKind::InvalidMarkup(what) => what.to_string(),
        }
    }
}

/// Runs a scanner on `input`. `Ok(None)` means the lexeme is absent; on a
/// match the value is returned with the number of bytes consumed.
pub fn run<'a, T>(
    input: &'a str,
    mut scanner: impl Parser<&'a str, Output = T, Error = ScanError<'a>>,
) -> Result<Option<(T, usize)>, LexError> {
    match scanner.parse(input) {
        Ok((rest, value)) => Ok(Some((value, input.len() - rest.len()))),
        Err(nom::Err::Error(_)) | Err(nom::Err::Incomplete(_)) => Ok(None),
        Err(nom::Err::Failure(e)) => Err(LexError {
            kind: e.kind,
            at: input.len() - e.input.len(),
        }),
    }
}

fn failure<T>(input: &str, kind: ScanErrorKind) -> ScanResult<'_, T> {
    Err(nom::Err::Failure(ScanError { input, kind }))
}

pub fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(c, '.' | '-' | '_' | '\u{B7}')
        || matches!(c, '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

pub fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

pub fn nc_name(input: &str) -> ScanResult<'_, &str> {
    recognize((satisfy(is_name_start), take_while(is_name_char))).parse(input)
}

/// `prefix:local` or `local`. A colon not followed by a name is left in
/// place rather than treated as an error.
pub fn qname(input: &str) -> ScanResult<'_, (Option<&str>, &str)> {
    let (rest, first) = nc_name(input)?;
    let (rest, local) = opt(preceded(char(':'), nc_name)).parse(rest)?;
    Ok(match local {
        Some(local) => (rest, (Some(first), local)),
        None => (rest, (None, first)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
    Double,
}

/// Longest match of integer, decimal and double literals. A `.` without a
/// digit on either side is not a number.
pub fn numeric_literal(input: &str) -> ScanResult<'_, (NumberKind, &str)> {
    let (rest, mantissa) = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ))
    .parse(input)?;
    let (rest, exponent) =
        opt(recognize((one_of("eE"), opt(one_of("+-")), digit1))).parse(rest)?;
    if rest.starts_with(is_name_start) {
        return failure(rest, ScanErrorKind::MalformedNumber);
    }
    let text = &input[..input.len() - rest.len()];
    let kind = if exponent.is_some() {
        NumberKind::Double
    } else if mantissa.contains('.') {
        NumberKind::Decimal
    } else {
        NumberKind::Integer
    };
    Ok((rest, (kind, text)))
}

/// Converts scanned numeric text to its literal value. Decimals are
/// normalised, so `1.` and `1.0` both yield `1`. Integers too large for
/// `i64` become decimals.
pub fn number_value(kind: NumberKind, text: &str) -> Result<Literal, &'static str> {
    match kind {
        NumberKind::Integer => match text.parse::<i64>() {
            Ok(value) => Ok(Literal::Integer(value)),
            Err(_) => Decimal::from_str(text)
                .map(Literal::Decimal)
                .map_err(|_| "integer literal exceeds the supported precision"),
        },
        NumberKind::Decimal => {
            let mut normalized = String::with_capacity(text.len() + 2);
            if text.starts_with('.') {
                normalized.push('0');
            }
            normalized.push_str(text);
            if text.ends_with('.') {
                normalized.push('0');
            }
            Decimal::from_str(&normalized)
                .map(|d| Literal::Decimal(d.normalize()))
                .map_err(|_| "decimal literal exceeds the supported precision")
        }
        NumberKind::Double => text
            .parse::<f64>()
            .map(Literal::Double)
            .map_err(|_| "malformed double literal"),
    }
}

/// `&lt;`, `&gt;`, `&amp;`, `&quot;`, `&apos;`, `&#N;` or `&#xH;`.
pub fn reference(input: &str) -> ScanResult<'_, char> {
    let (body_start, _) = char('&').parse(input)?;
    let body: ScanResult<'_, &str> = terminated(
        take_while1(|c: char| c != ';' && c != '&' && !c.is_whitespace()),
        char(';'),
    )
    .parse(body_start);
    let Ok((rest, body)) = body else {
        return failure(input, ScanErrorKind::MalformedReference);
    };
    let c = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        _ => match body.strip_prefix('#') {
            Some(number) => {
                let code = match number.strip_prefix('x') {
                    Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
                        u32::from_str_radix(hex, 16).ok()
                    }
                    None if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
                        number.parse::<u32>().ok()
                    }
                    _ => return failure(input, ScanErrorKind::MalformedReference),
                };
                match code.and_then(char::from_u32).filter(|c| is_xml_char(*c)) {
                    Some(c) => c,
                    None => return failure(input, ScanErrorKind::IllegalCharacter),
                }
            }
            None => return failure(input, ScanErrorKind::UnknownEntity),
        },
    };
    Ok((rest, c))
}

/// A quoted string literal with doubled delimiters and references resolved.
pub fn string_literal(input: &str) -> ScanResult<'_, String> {
    let (mut rest, quote) = one_of("\"'").parse(input)?;
    let mut value = String::new();
    loop {
        let (after, chunk) = take_till(|c: char| c == quote || c == '&').parse(rest)?;
        value.push_str(chunk);
        rest = after;
        if rest.is_empty() {
            return failure(input, ScanErrorKind::Unterminated("string literal"));
        }
        if rest.starts_with('&') {
            let (after, c) = reference(rest)?;
            value.push(c);
            rest = after;
        } else if rest[1..].starts_with(quote) {
            value.push(quote);
            rest = &rest[2..];
        } else {
            return Ok((&rest[1..], value));
        }
    }
}

/// Character data inside a direct constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupText {
    pub value: String,
    /// The run consisted of literal whitespace only (no references or
    /// escaped braces), so it is boundary whitespace.
    pub boundary: bool,
}

/// Element content when `delimiter` is `None`, otherwise an attribute value
/// delimited by that quote. Stops before `<`, an unescaped `{`, the closing
/// delimiter or the end of text. In attribute values literal tab, newline
/// and carriage return are normalised to spaces.
pub fn markup_text(input: &str, delimiter: Option<char>) -> ScanResult<'_, MarkupText> {
    let mut rest = input;
    let mut text = MarkupText {
        value: String::new(),
        boundary: true,
    };
    loop {
        let (after, chunk) =
            take_till(|c: char| matches!(c, '<' | '&' | '{' | '}') || Some(c) == delimiter)
                .parse(rest)?;
        if !chunk.chars().all(is_xml_whitespace) {
            text.boundary = false;
        }
        match delimiter {
            Some(_) => text
                .value
                .extend(chunk.chars().map(|c| if is_xml_whitespace(c) { ' ' } else { c })),
            None => text.value.push_str(chunk),
        }
        rest = after;
        let Some(next) = rest.chars().next() else { break };
        match next {
            '{' | '}' if rest[1..].starts_with(next) => {
                text.value.push(next);
                text.boundary = false;
                rest = &rest[2..];
            }
            '}' => return failure(rest, ScanErrorKind::LoneBrace),
            '&' => {
                let (after, c) = reference(rest)?;
                text.value.push(c);
                text.boundary = false;
                rest = after;
            }
            '<' if delimiter.is_some() => {
                return failure(
                    rest,
                    ScanErrorKind::InvalidMarkup("'<' is not allowed in an attribute value"),
                );
            }
            q if Some(q) == delimiter && rest[1..].starts_with(q) => {
                text.value.push(q);
                text.boundary = false;
                rest = &rest[2..];
            }
            _ => break,
        }
    }
    if rest.len() == input.len() {
        return Err(nom::Err::Error(ScanError::from_error_kind(
            input,
            ErrorKind::TakeTill1,
        )));
    }
    Ok((rest, text))
}

/// `(: ... :)`, nesting.
pub fn comment(input: &str) -> ScanResult<'_, &str> {
    let (mut rest, _) = tag("(:").parse(input)?;
    let mut depth = 1usize;
    while depth > 0 {
        let (after, _) = take_till(|c: char| c == '(' || c == ':').parse(rest)?;
        if after.is_empty() {
            return failure(input, ScanErrorKind::Unterminated("comment"));
        }
        if after.starts_with("(:") {
            depth += 1;
            rest = &after[2..];
        } else if after.starts_with(":)") {
            depth -= 1;
            rest = &after[2..];
        } else {
            rest = &after[1..];
        }
    }
    Ok((rest, &input[..input.len() - rest.len()]))
}

/// Whitespace, and comments when `comments` is set.
pub fn trivia(input: &str, comments: bool) -> ScanResult<'_, ()> {
    let mut rest = input;
    loop {
        let (after, _) = multispace0(rest)?;
        rest = after;
        if comments && rest.starts_with("(:") {
            let (after, _) = comment(rest)?;
            rest = after;
        } else {
            return Ok((rest, ()));
        }
    }
}

fn until<'a>(input: &'a str, terminator: &'static str) -> ScanResult<'a, &'a str> {
    take_until(terminator).parse(input)
}

/// Body of `<!-- ... -->`, starting after the opening `<!--`.
pub fn xml_comment_body(input: &str) -> ScanResult<'_, &str> {
    let Ok((rest, body)) = until(input, "-->") else {
        return failure(input, ScanErrorKind::Unterminated("XML comment"));
    };
    if body.contains("--") || body.ends_with('-') {
        return failure(
            input,
            ScanErrorKind::InvalidMarkup("'--' is not allowed inside an XML comment"),
        );
    }
    Ok((&rest[3..], body))
}

/// Body of `<![CDATA[ ... ]]>`, starting after the opening `<![CDATA[`.
pub fn cdata_body(input: &str) -> ScanResult<'_, &str> {
    let Ok((rest, body)) = until(input, "]]>") else {
        return failure(input, ScanErrorKind::Unterminated("CDATA section"));
    };
    Ok((&rest[3..], body))
}

/// Content of a processing instruction or pragma, starting right after its
/// target name: either the terminator immediately, or whitespace followed by
/// content up to the terminator.
pub fn delimited_content<'a>(
    input: &'a str,
    terminator: &'static str,
    what: &'static str,
) -> ScanResult<'a, &'a str> {
    if let Some(rest) = input.strip_prefix(terminator) {
        return Ok((rest, ""));
    }
    let spaced: ScanResult<'_, &str> = multispace1(input);
    let Ok((content, _)) = spaced else {
        return failure(input, ScanErrorKind::InvalidMarkup("whitespace expected after name"));
    };
    let Ok((rest, body)) = until(content, terminator) else {
        return failure(input, ScanErrorKind::Unterminated(what));
    };
    Ok((&rest[terminator.len()..], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_unescapes() {
        let (rest, value) = string_literal(r#""He said ""hi"" &amp; left" tail"#).unwrap();
        assert_eq!(value, r#"He said "hi" & left"#);
        assert_eq!(rest, " tail");

        let (_, value) = string_literal("'it''s &#65;&#x42;'").unwrap();
        assert_eq!(value, "it's AB");
    }

    #[test]
    fn test_string_literal_errors_are_fatal() {
        assert!(matches!(
            string_literal("\"open"),
            Err(nom::Err::Failure(ScanError {
                kind: ScanErrorKind::Unterminated(_),
                ..
            }))
        ));
        assert!(matches!(
            string_literal("'&#0;'"),
            Err(nom::Err::Failure(ScanError {
                kind: ScanErrorKind::IllegalCharacter,
                ..
            }))
        ));
        assert!(matches!(
            string_literal("'&nbsp;'"),
            Err(nom::Err::Failure(ScanError {
                kind: ScanErrorKind::UnknownEntity,
                ..
            }))
        ));
        assert!(matches!(string_literal("abc"), Err(nom::Err::Error(_))));
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(numeric_literal("42 ").unwrap(), (" ", (NumberKind::Integer, "42")));
        assert_eq!(numeric_literal(".5]").unwrap(), ("]", (NumberKind::Decimal, ".5")));
        assert_eq!(numeric_literal("1.)").unwrap(), (")", (NumberKind::Decimal, "1.")));
        assert_eq!(numeric_literal("1.5E-3").unwrap(), ("", (NumberKind::Double, "1.5E-3")));
        assert!(matches!(numeric_literal("."), Err(nom::Err::Error(_))));
        assert!(matches!(numeric_literal(".."), Err(nom::Err::Error(_))));
        assert!(matches!(numeric_literal("12abc"), Err(nom::Err::Failure(_))));
        assert!(matches!(numeric_literal("1e"), Err(nom::Err::Failure(_))));
    }

    #[test]
    fn test_number_values() {
        assert_eq!(
            number_value(NumberKind::Decimal, "1."),
            Ok(Literal::Decimal(Decimal::from(1)))
        );
        assert_eq!(
            number_value(NumberKind::Decimal, ".5"),
            Ok(Literal::Decimal(Decimal::new(5, 1)))
        );
        assert_eq!(number_value(NumberKind::Double, "1e3"), Ok(Literal::Double(1000.0)));
        assert_eq!(
            number_value(NumberKind::Integer, "99999999999999999999"),
            Ok(Literal::Decimal("99999999999999999999".parse().unwrap()))
        );
        assert!(number_value(NumberKind::Integer, &"9".repeat(40)).is_err());
    }

    #[test]
    fn test_qname_is_lenient_about_colons() {
        assert_eq!(qname("fn:count(").unwrap(), ("(", (Some("fn"), "count")));
        assert_eq!(qname("a:*").unwrap(), (":*", (None, "a")));
        assert_eq!(qname("a-b.c d").unwrap(), (" d", (None, "a-b.c")));
        assert!(qname("1a").is_err());
    }

    #[test]
    fn test_nested_comments() {
        let (rest, text) = comment("(: a (: b :) c :)x").unwrap();
        assert_eq!(rest, "x");
        assert_eq!(text, "(: a (: b :) c :)");
        assert!(matches!(comment("(: a (: b :)"), Err(nom::Err::Failure(_))));
        let (rest, ()) = trivia("  (: c :)\n 1", true).unwrap();
        assert_eq!(rest, "1");
        let (rest, ()) = trivia(" (: c :)", false).unwrap();
        assert_eq!(rest, "(: c :)");
    }

    #[test]
    fn test_markup_text_folds_braces() {
        let (rest, text) = markup_text("a {{b}} &lt;c<d/>", None).unwrap();
        assert_eq!(rest, "<d/>");
        assert_eq!(text.value, "a {b} <c");
        assert!(!text.boundary);

        let (rest, text) = markup_text(" \n {x}", None).unwrap();
        assert_eq!(rest, "{x}");
        assert!(text.boundary);

        assert!(matches!(
            markup_text("a } b", None),
            Err(nom::Err::Failure(ScanError {
                kind: ScanErrorKind::LoneBrace,
                ..
            }))
        ));
        assert!(matches!(markup_text("<x>", None), Err(nom::Err::Error(_))));
    }

    #[test]
    fn test_attribute_text() {
        let (rest, text) = markup_text("a\tb\"\"c\" next", Some('"')).unwrap();
        assert_eq!(text.value, "a b\"c");
        assert_eq!(rest, "\" next");
        assert!(matches!(
            markup_text("a<b'", Some('\'')),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_markup_bodies() {
        assert_eq!(xml_comment_body(" hi -->rest").unwrap(), ("rest", " hi "));
        assert!(xml_comment_body(" a -- b -->").is_err());
        assert_eq!(cdata_body("<x>]]>y").unwrap(), ("y", "<x>"));
        assert_eq!(delimited_content(" a b ?>z", "?>", "PI").unwrap(), ("z", "a b "));
        assert_eq!(delimited_content("?>z", "?>", "PI").unwrap(), ("z", ""));
        assert!(delimited_content("x?>", "?>", "PI").is_err());
    }

    #[test]
    fn test_run_reports_consumed_and_offset() {
        assert_eq!(run("abc def", nc_name), Ok(Some(("abc", 3))));
        assert_eq!(run("1", nc_name), Ok(None));
        let err = run("'abc", string_literal).unwrap_err();
        assert_eq!(err.at, 0);
        assert_eq!(err.code(), ErrorCode::Syntax);
        let err = run("x &#1; y", |i| markup_text(i, None)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCharacterReference);
        assert_eq!(err.at, 2);
    }
}

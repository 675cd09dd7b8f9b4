//! Character cursor over the module text.
//!
//! Positions are byte offsets and always sit on a character boundary. Reading
//! past the end yields [`EOF`], so scanning loops terminate on the sentinel
//! without separate bounds checks.

/// Sentinel returned once the cursor has reached the end of the text.
pub const EOF: char = '\0';

#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    src: &'src str,
    pos: usize,
    current: char,
}

impl<'src> Cursor<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            current: src.chars().next().unwrap_or(EOF),
        }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current
    }

    /// The character `n` positions after the current one.
    pub fn peek(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or(EOF)
    }

    /// True only at the real end of the text; an embedded NUL is not EOF.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += self.current.len_utf8();
            self.current = self.rest().chars().next().unwrap_or(EOF);
        }
    }

    /// Advances by `bytes`, which must end on a character boundary (sub-scanners
    /// report consumed lengths of whole characters).
    pub fn advance_by(&mut self, bytes: usize) {
        self.reset(self.pos + bytes);
    }

    /// Moves to an earlier (or later) position. Used for rollback.
    pub fn reset(&mut self, pos: usize) {
        debug_assert!(self.src.is_char_boundary(pos.min(self.src.len())));
        self.pos = pos.min(self.src.len());
        self.current = self.rest().chars().next().unwrap_or(EOF);
    }

    #[inline]
    pub fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    /// A short excerpt of the upcoming text for error messages.
    pub fn excerpt(&self) -> String {
        if self.is_eof() {
            return "end of input".to_string();
        }
        let snippet: String = self.rest().chars().take(20).collect();
        format!("'{}'", snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_at_end() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.current(), 'a');
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), EOF);
        cursor.advance();
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn test_multibyte_and_reset() {
        let mut cursor = Cursor::new("é<x");
        cursor.advance();
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.current(), '<');
        assert_eq!(cursor.peek(1), 'x');
        cursor.reset(0);
        assert_eq!(cursor.current(), 'é');
        assert_eq!(cursor.excerpt(), "'é<x'");
    }

    #[test]
    fn test_empty_input() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.excerpt(), "end of input");
    }
}

//! Byte-level source iterator for the type-spec lexer.

/// A character cursor over one type-spec string with byte-offset position
/// tracking. All positions are byte offsets into the original UTF-8 text.
pub(crate) struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source text.
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// Look at the current character without consuming it.
    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Consume the current character and advance the position.
    ///
    /// Returns the consumed character, or `None` at end of input.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it equals `expected`.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Current byte position in the source text.
    pub(crate) fn pos(&self) -> u32 {
        self.pos
    }

    /// Advance while the predicate holds for the current character.
    pub(crate) fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Extract a slice of the source text by byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if start or end are out of bounds or not on UTF-8 boundaries.
    pub(crate) fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_position() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos(), 1);
        assert_eq!(cursor.advance(), Some('b'));
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn eat_consumes_only_on_match() {
        let mut cursor = Cursor::new("<-");
        assert!(!cursor.eat('-'));
        assert!(cursor.eat('<'));
        assert!(cursor.eat('-'));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn eat_while_stops_at_mismatch() {
        let mut cursor = Cursor::new("abc1");
        cursor.eat_while(|c| c.is_ascii_alphabetic());
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.peek(), Some('1'));
    }

    #[test]
    fn slice_extracts_text() {
        let cursor = Cursor::new("map[int]");
        assert_eq!(cursor.slice(0, 3), "map");
        assert_eq!(cursor.slice(4, 7), "int");
    }

    #[test]
    fn multibyte_positions_are_byte_offsets() {
        let mut cursor = Cursor::new("\u{00E9}x");
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), 2);
    }
}

//! Tokens of the type-spec language.

use crate::span::Span;

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `*`
    Star,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `<-`
    Arrow,
    /// A `$name` type parameter occurrence. The span covers the `$` and
    /// the name.
    Param,
    /// A plain identifier (also the raw form of keywords).
    Ident,
    /// A decimal integer literal (array lengths).
    Int,
    /// The `map` keyword.
    MapKw,
    /// The `chan` keyword.
    ChanKw,
    /// The `struct` keyword.
    StructKw,
    /// The `interface` keyword.
    InterfaceKw,
    /// The `func` keyword.
    FuncKw,
    /// End of input.
    Eof,
    /// An unrecognized character.
    Error,
}

/// One lexed token: a kind plus its span in the spec string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }

    /// The covered text of `source`.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        self.span.text(source)
    }
}

/// Map an identifier to its keyword kind, if it is one.
pub fn keyword_from_str(ident: &str) -> Option<TokenKind> {
    match ident {
        "map" => Some(TokenKind::MapKw),
        "chan" => Some(TokenKind::ChanKw),
        "struct" => Some(TokenKind::StructKw),
        "interface" => Some(TokenKind::InterfaceKw),
        "func" => Some(TokenKind::FuncKw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(keyword_from_str("map"), Some(TokenKind::MapKw));
        assert_eq!(keyword_from_str("chan"), Some(TokenKind::ChanKw));
        assert_eq!(keyword_from_str("struct"), Some(TokenKind::StructKw));
        assert_eq!(keyword_from_str("interface"), Some(TokenKind::InterfaceKw));
        assert_eq!(keyword_from_str("func"), Some(TokenKind::FuncKw));
        assert_eq!(keyword_from_str("int"), None);
        assert_eq!(keyword_from_str("mapx"), None);
    }

    #[test]
    fn token_text_uses_span() {
        let tok = Token::new(TokenKind::Ident, 4, 7);
        assert_eq!(tok.text("map[int]x"), "int");
    }
}

//! Recursive-descent parser for type specs.
//!
//! Builds [`Term`] trees directly into a fresh arena. Parsing is strict:
//! the first malformed construct aborts with a [`SyntaxError`], and Go
//! syntax outside the spec language (interface bodies, variadic or named
//! function parameters, embedded fields, field tags) is rejected rather
//! than skipped.

use rustc_hash::FxHashMap;

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::expr::TypeExpr;
use crate::lexer::Lexer;
use crate::param::TypeParam;
use crate::term::{ChanDir, Term, TermId};
use crate::token::{Token, TokenKind};

/// Parse one spec into an expression with parameters scoped to `scope`.
pub(crate) fn parse(scope: &str, source: &str) -> Result<TypeExpr, SyntaxError> {
    let mut parser = Parser::new(scope, source);
    let root = parser.parse_type()?;
    parser.expect_eof()?;
    Ok(TypeExpr {
        source: source.to_string(),
        terms: parser.terms,
        root,
        occurrences: parser.occurrences,
    })
}

struct Parser<'src> {
    scope: &'src str,
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    terms: Vec<Term>,
    occurrences: FxHashMap<TypeParam, Vec<TermId>>,
}

impl<'src> Parser<'src> {
    fn new(scope: &'src str, source: &'src str) -> Self {
        Self {
            scope,
            source,
            tokens: Lexer::tokenize(source),
            pos: 0,
            terms: Vec::new(),
            occurrences: FxHashMap::default(),
        }
    }

    // ── Token access ─────────────────────────────────────────────────────

    /// The current token. The lexer guarantees a trailing `Eof`, and the
    /// position never moves past it.
    fn peek(&self) -> Token {
        self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn describe(&self, token: Token) -> String {
        if token.kind == TokenKind::Eof {
            "end of input".to_string()
        } else {
            token.text(self.source).to_string()
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::new(
            SyntaxErrorKind::Unexpected {
                found: self.describe(token),
                expected,
            },
            token.span,
        )
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, SyntaxError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), SyntaxError> {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(SyntaxError::new(
                SyntaxErrorKind::TrailingInput(token.text(self.source).to_string()),
                token.span,
            ))
        }
    }

    fn unsupported(&self, what: &'static str, span: crate::span::Span) -> SyntaxError {
        SyntaxError::new(SyntaxErrorKind::Unsupported(what), span)
    }

    // ── Term construction ────────────────────────────────────────────────

    fn alloc(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        if let Term::Param(param) = &term {
            self.occurrences.entry(param.clone()).or_default().push(id);
        }
        self.terms.push(term);
        id
    }

    /// Deep-copy the subtree at `id` within this arena. Field groups like
    /// `x, y int` get one independent tree per name.
    fn duplicate(&mut self, id: TermId) -> TermId {
        let term = self.terms[id.index()].clone();
        let copy = match term {
            Term::Named(_) | Term::Qualified(_, _) | Term::Param(_) | Term::Interface => term,
            Term::Pointer(t) => Term::Pointer(self.duplicate(t)),
            Term::Slice(t) => Term::Slice(self.duplicate(t)),
            Term::Array(len, t) => Term::Array(len, self.duplicate(t)),
            Term::Chan(dir, t) => Term::Chan(dir, self.duplicate(t)),
            Term::Map(k, v) => Term::Map(self.duplicate(k), self.duplicate(v)),
            Term::Struct(fields) => Term::Struct(
                fields
                    .into_iter()
                    .map(|(name, t)| (name, self.duplicate(t)))
                    .collect(),
            ),
            Term::Func(params, results) => Term::Func(
                params.into_iter().map(|t| self.duplicate(t)).collect(),
                results.into_iter().map(|t| self.duplicate(t)).collect(),
            ),
            Term::Paren(t) => Term::Paren(self.duplicate(t)),
        };
        self.alloc(copy)
    }

    // ── Grammar ──────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> Result<TermId, SyntaxError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Star => {
                self.bump();
                let elem = self.parse_type()?;
                Ok(self.alloc(Term::Pointer(elem)))
            }
            TokenKind::LBracket => self.parse_slice_or_array(),
            TokenKind::Arrow => {
                self.bump();
                self.expect(TokenKind::ChanKw, "`chan` after `<-`")?;
                let elem = self.parse_type()?;
                Ok(self.alloc(Term::Chan(ChanDir::Recv, elem)))
            }
            TokenKind::ChanKw => {
                self.bump();
                let dir = if self.at(TokenKind::Arrow) {
                    self.bump();
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let elem = self.parse_type()?;
                Ok(self.alloc(Term::Chan(dir, elem)))
            }
            TokenKind::MapKw => {
                self.bump();
                self.expect(TokenKind::LBracket, "`[` after `map`")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket, "`]` after map key")?;
                let value = self.parse_type()?;
                Ok(self.alloc(Term::Map(key, value)))
            }
            TokenKind::StructKw => self.parse_struct(),
            TokenKind::InterfaceKw => {
                self.bump();
                self.expect(TokenKind::LBrace, "`{` after `interface`")?;
                if !self.at(TokenKind::RBrace) {
                    return Err(self.unsupported("non-empty interface body", self.peek().span));
                }
                self.bump();
                Ok(self.alloc(Term::Interface))
            }
            TokenKind::FuncKw => self.parse_func(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(self.alloc(Term::Paren(inner)))
            }
            TokenKind::Param => {
                self.bump();
                let name = &token.text(self.source)[1..];
                let param = TypeParam::new(self.scope, name);
                Ok(self.alloc(Term::Param(param)))
            }
            TokenKind::Ident => {
                self.bump();
                let name = token.text(self.source).to_string();
                if self.at(TokenKind::Dot) {
                    self.bump();
                    let member = self.expect(TokenKind::Ident, "an identifier after `.`")?;
                    let member = member.text(self.source).to_string();
                    Ok(self.alloc(Term::Qualified(name, member)))
                } else {
                    Ok(self.alloc(Term::Named(name)))
                }
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    fn parse_slice_or_array(&mut self) -> Result<TermId, SyntaxError> {
        self.bump(); // `[`
        if self.at(TokenKind::RBracket) {
            self.bump();
            let elem = self.parse_type()?;
            return Ok(self.alloc(Term::Slice(elem)));
        }
        let len_token = self.expect(TokenKind::Int, "an array length or `]`")?;
        let text = len_token.text(self.source);
        let len: u64 = text.parse().map_err(|_| {
            SyntaxError::new(
                SyntaxErrorKind::ArrayLenOverflow(text.to_string()),
                len_token.span,
            )
        })?;
        self.expect(TokenKind::RBracket, "`]` after array length")?;
        let elem = self.parse_type()?;
        Ok(self.alloc(Term::Array(len, elem)))
    }

    fn parse_struct(&mut self) -> Result<TermId, SyntaxError> {
        self.bump(); // `struct`
        self.expect(TokenKind::LBrace, "`{` after `struct`")?;
        let mut fields: Vec<(String, TermId)> = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let first = self.expect(TokenKind::Ident, "a field name")?;
            let mut names = vec![first.text(self.source).to_string()];
            while self.at(TokenKind::Comma) {
                self.bump();
                let next = self.expect(TokenKind::Ident, "a field name after `,`")?;
                names.push(next.text(self.source).to_string());
            }
            // A bare name before `.`, `;`, or `}` is an embedded field.
            if self.at(TokenKind::Dot) || self.at(TokenKind::Semicolon) || self.at(TokenKind::RBrace)
            {
                return Err(self.unsupported("embedded struct field", first.span));
            }
            let ty = self.parse_type()?;
            let mut trees = vec![ty];
            for _ in 1..names.len() {
                let copy = self.duplicate(ty);
                trees.push(copy);
            }
            for (name, tree) in names.into_iter().zip(trees) {
                fields.push((name, tree));
            }
            if self.at(TokenKind::Error) && self.peek().text(self.source).starts_with('`') {
                return Err(self.unsupported("struct field tag", self.peek().span));
            }
            if self.at(TokenKind::Semicolon) {
                self.bump();
            } else if !self.at(TokenKind::RBrace) {
                return Err(self.unexpected("`;` or `}`"));
            }
        }
        self.bump(); // `}`
        Ok(self.alloc(Term::Struct(fields)))
    }

    fn parse_func(&mut self) -> Result<TermId, SyntaxError> {
        self.bump(); // `func`
        self.expect(TokenKind::LParen, "`(` after `func`")?;
        let params = if self.at(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_type_list()?
        };
        self.expect(TokenKind::RParen, "`)` after parameters")?;

        let results = if self.at(TokenKind::LParen) {
            self.bump();
            let list = if self.at(TokenKind::RParen) {
                Vec::new()
            } else {
                self.parse_type_list()?
            };
            self.expect(TokenKind::RParen, "`)` after results")?;
            list
        } else if self.at_type_start() {
            vec![self.parse_type()?]
        } else {
            Vec::new()
        };
        Ok(self.alloc(Term::Func(params, results)))
    }

    fn parse_type_list(&mut self) -> Result<Vec<TermId>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            if self.at(TokenKind::Dot) {
                return Err(self.unsupported("variadic parameter", self.peek().span));
            }
            let item = self.parse_type()?;
            // A second type where `,` or `)` belongs means the first token
            // was a parameter name.
            if self.at_type_start() {
                return Err(self.unsupported("named function parameter", self.peek().span));
            }
            items.push(item);
            if self.at(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(items)
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Arrow
                | TokenKind::ChanKw
                | TokenKind::MapKw
                | TokenKind::StructKw
                | TokenKind::InterfaceKw
                | TokenKind::FuncKw
                | TokenKind::LParen
                | TokenKind::Param
                | TokenKind::Ident
        )
    }
}

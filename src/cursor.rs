//! Memoizing lookahead over the tokenizer.
//!
//! Tokens are materialized on demand into an append-only buffer indexed
//! by absolute position, so the parser can peek any distance ahead
//! without re-lexing. Comment tokens are diverted into a side list and
//! never appear in the buffer.

use crate::instrument::{Instrument, NoopInstrument};
use crate::lexer::{LexError, Tokenizer};
use crate::options::Options;
use crate::token::{Token, TokenKind};

/// Texts that end a block without being consumed by it.
const BLOCK_FOLLOW: [&str; 4] = ["else", "elseif", "end", "until"];

/// Something a token can be compared against: either a kind, or the
/// exact text of a keyword, operator, or punctuator.
pub trait TokenPattern {
    fn matches_token(&self, token: &Token) -> bool;
}

impl TokenPattern for TokenKind {
    fn matches_token(&self, token: &Token) -> bool {
        token.kind == *self
    }
}

/// Text patterns never match names, numbers, strings, or comments, so
/// `"end"` cannot be confused with an identifier or a quoted `'end'`.
impl TokenPattern for &str {
    fn matches_token(&self, token: &Token) -> bool {
        !matches!(
            token.kind,
            TokenKind::Identifier
                | TokenKind::StringLiteral
                | TokenKind::NumericLiteral
                | TokenKind::Comment
                | TokenKind::Eof
        ) && token.text == *self
    }
}

/// Token stream with lookahead, pulled lazily from a [`Tokenizer`].
///
/// Comments are set aside and never returned by `current` or `lookahead`.
pub struct TokenCursor<'src, I = NoopInstrument> {
    tokenizer: Tokenizer<'src, I>,
    tokens: Vec<Token>,
    comments: Vec<Token>,
    index: usize,
    eof_reached: bool,
}

impl<'src> TokenCursor<'src> {
    /// Build a cursor positioned on the first significant token.
    pub fn new(source: &'src str, options: &Options) -> Result<Self, LexError> {
        Self::from_tokenizer(Tokenizer::new(source, options))
    }
}

impl<'src, I: Instrument> TokenCursor<'src, I> {
    pub fn from_tokenizer(tokenizer: Tokenizer<'src, I>) -> Result<Self, LexError> {
        let mut cursor = Self {
            tokenizer,
            tokens: Vec::new(),
            comments: Vec::new(),
            index: 0,
            eof_reached: false,
        };
        cursor.materialize()?;
        Ok(cursor)
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        self.tokenizer.options()
    }

    pub const fn instrument(&mut self) -> &mut I {
        self.tokenizer.instrument()
    }

    /// Logical index of the current token.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of tokens materialized so far.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub const fn is_eof_reached(&self) -> bool {
        self.eof_reached
    }

    /// Comments seen so far, in source order.
    #[must_use]
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    pub fn take_comments(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.comments)
    }

    /// Tokenize one more significant token onto the buffer. No-op once
    /// end-of-input is buffered.
    fn materialize(&mut self) -> Result<(), LexError> {
        if self.eof_reached {
            return Ok(());
        }
        loop {
            let token = self.tokenizer.tokenize()?;
            if token.kind == TokenKind::Comment {
                self.comments.push(token);
                continue;
            }
            self.eof_reached = token.is_eof();
            self.tokens.push(token);
            return Ok(());
        }
    }

    /// Token at absolute position `i`, tokenizing forward as needed.
    /// Positions past end-of-input return the end-of-input token.
    pub fn at(&mut self, i: usize) -> Result<&Token, LexError> {
        while self.tokens.len() <= i && !self.eof_reached {
            self.materialize()?;
        }
        let last = self.tokens.len() - 1;
        Ok(&self.tokens[i.min(last)])
    }

    /// The current token. Always materialized.
    #[must_use]
    pub fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    /// Token `k` positions after the current one.
    pub fn lookahead(&mut self, k: usize) -> Result<&Token, LexError> {
        self.at(self.index + k)
    }

    pub fn next_token(&mut self) -> Result<&Token, LexError> {
        self.lookahead(1)
    }

    /// Move to the next token. Saturates on end-of-input.
    pub fn advance(&mut self) -> Result<(), LexError> {
        if self.index + 1 >= self.tokens.len() {
            self.materialize()?;
        }
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        Ok(())
    }

    #[must_use]
    pub fn matches(&self, pattern: impl TokenPattern) -> bool {
        pattern.matches_token(self.current())
    }

    #[must_use]
    pub fn matches_any<P: TokenPattern>(&self, patterns: &[P]) -> bool {
        let current = self.current();
        patterns.iter().any(|p| p.matches_token(current))
    }

    pub fn matches_next(&mut self, pattern: impl TokenPattern) -> Result<bool, LexError> {
        Ok(pattern.matches_token(self.next_token()?))
    }

    pub fn matches_next_any<P: TokenPattern>(&mut self, patterns: &[P]) -> Result<bool, LexError> {
        let next = self.next_token()?;
        Ok(patterns.iter().any(|p| p.matches_token(next)))
    }

    /// Advance past the current token if it matches.
    pub fn consume(&mut self, pattern: impl TokenPattern) -> Result<bool, LexError> {
        if !self.matches(pattern) {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    /// Advance past both the current and the next token if the next one
    /// matches.
    pub fn consume_next(&mut self, pattern: impl TokenPattern) -> Result<bool, LexError> {
        if !self.matches_next(pattern)? {
            return Ok(false);
        }
        self.advance()?;
        self.advance()?;
        Ok(true)
    }

    /// Whether the current token closes a block.
    #[must_use]
    pub fn is_block_follow(&self) -> bool {
        self.current().kind == TokenKind::Keyword && self.matches_any(&BLOCK_FOLLOW)
    }
}

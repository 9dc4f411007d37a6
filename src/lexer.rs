use std::fmt;

use crate::diagnostics::Location;
use crate::instrument::{Instrument, NoopInstrument};
use crate::options::Options;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Bad digits, a second `.`, a dangling exponent, or a misplaced suffix.
    MalformedNumber,
    /// Quoted string not closed before a line break or end of input.
    UnfinishedString,
    /// Long string not closed before end of input.
    UnfinishedLongString { start_line: usize },
    /// Long comment not closed before end of input.
    UnfinishedLongComment { start_line: usize },
    /// `[=` not followed by `[`.
    InvalidLongStringDelimiter,
    /// Byte that cannot start any token.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNumber => write!(f, "malformed number"),
            Self::UnfinishedString => write!(f, "unfinished string"),
            Self::UnfinishedLongString { start_line } => {
                write!(f, "unfinished long string (starting at line {start_line})")
            }
            Self::UnfinishedLongComment { start_line } => {
                write!(f, "unfinished long comment (starting at line {start_line})")
            }
            Self::InvalidLongStringDelimiter => write!(f, "invalid long string delimiter"),
            Self::UnexpectedCharacter(_) => write!(f, "unexpected symbol"),
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location} {kind} near '{near}'")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
    /// Lexeme captured up to the point of failure.
    pub near: String,
}

/// Tokenize a source string with every lexical feature enabled.
///
/// The returned tokens include comments and end with a single
/// [`TokenKind::Eof`] token.
///
/// # Errors
///
/// Returns `LexError` on malformed numbers, unterminated strings or
/// comments, and characters that cannot start a token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with(source, &Options::default())
}

/// Tokenize a source string with explicit options.
pub fn tokenize_with(source: &str, options: &Options) -> Result<Vec<Token>, LexError> {
    let mut tokenizer = Tokenizer::new(source, options);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.tokenize()?;
        let done = token.is_eof();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// Produces one token per call from a [`Scanner`].
pub struct Tokenizer<'src, I = NoopInstrument> {
    scanner: Scanner<'src>,
    options: Options,
    instrument: I,
    started: bool,
    token_line: usize,
    token_line_start: usize,
}

impl<'src> Tokenizer<'src> {
    #[must_use]
    pub fn new(source: &'src str, options: &Options) -> Self {
        Self::with_instrument(source, options, NoopInstrument)
    }
}

impl<'src, I: Instrument> Tokenizer<'src, I> {
    pub fn with_instrument(source: &'src str, options: &Options, instrument: I) -> Self {
        Self {
            scanner: Scanner::new(source, options.extended_identifiers),
            options: options.clone(),
            instrument,
            started: false,
            token_line: 1,
            token_line_start: 0,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn instrument(&mut self) -> &mut I {
        &mut self.instrument
    }

    pub fn into_instrument(self) -> I {
        self.instrument
    }

    /// Produce the next token. Once the input is exhausted every call
    /// returns an end-of-input token with the same empty span.
    pub fn tokenize(&mut self) -> Result<Token, LexError> {
        if !self.started {
            self.started = true;
            self.skip_preamble();
        }
        self.skip_whitespace();

        self.scanner.mark();
        self.token_line = self.scanner.line();
        self.token_line_start = self.scanner.line_start();

        let token = self.read_token()?;
        self.instrument.token(&token);
        Ok(token)
    }

    fn read_token(&mut self) -> Result<Token, LexError> {
        let Some(ch) = self.scanner.peek() else {
            return Ok(self.make_token(TokenKind::Eof));
        };

        if self.scanner.is_alphabetic(0) {
            return Ok(self.read_name());
        }

        match ch {
            b'"' | b'\'' => self.read_string(ch),
            b'0'..=b'9' => self.read_number(),
            b'.' => {
                if self.scanner.is_digit(1) {
                    self.read_number()
                } else if self.scanner.matches("...") {
                    Ok(self.punctuator(3, TokenKind::VarargLiteral))
                } else if self.scanner.matches("..") {
                    Ok(self.punctuator(2, TokenKind::Punctuator))
                } else {
                    Ok(self.punctuator(1, TokenKind::Punctuator))
                }
            }
            b'-' => {
                if self.scanner.matches("--") {
                    self.read_comment()
                } else {
                    Ok(self.punctuator(1, TokenKind::Punctuator))
                }
            }
            b'[' => match self.scanner.peek_at(1) {
                Some(b'[' | b'=') => self.read_long_string(),
                _ => Ok(self.punctuator(1, TokenKind::Punctuator)),
            },
            b'=' => Ok(self.one_or_two(b'=', true)),
            b'<' => Ok(self.angle(b'<')),
            b'>' => Ok(self.angle(b'>')),
            b'/' => Ok(self.one_or_two(b'/', self.options.integer_division)),
            b':' => Ok(self.one_or_two(b':', self.options.labels)),
            b'~' => {
                if self.scanner.peek_at(1) == Some(b'=') {
                    Ok(self.punctuator(2, TokenKind::Punctuator))
                } else if self.options.bitwise_operators {
                    Ok(self.punctuator(1, TokenKind::Punctuator))
                } else {
                    Err(self.unexpected_character())
                }
            }
            b'&' | b'|' if self.options.bitwise_operators => {
                Ok(self.punctuator(1, TokenKind::Punctuator))
            }
            b'*' | b'%' | b'^' | b'#' | b'+' | b',' | b';' | b'(' | b')' | b'{' | b'}'
            | b']' => Ok(self.punctuator(1, TokenKind::Punctuator)),
            _ => Err(self.unexpected_character()),
        }
    }

    // -- Trivia --

    fn skip_preamble(&mut self) {
        if self.scanner.matches("\u{FEFF}") {
            self.scanner.advance_by(3);
        }
        if self.scanner.matches("#!") {
            self.scanner.scan_until(|s| s.is_line_terminator(0));
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            if self.scanner.is_whitespace(0) {
                self.scanner.advance();
            } else if !self.scanner.consume_end_of_line() {
                break;
            }
        }
    }

    // -- Token construction --

    fn make_token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            text: self.scanner.captured_text().into_owned(),
            span: self.scanner.captured_range(),
            line: self.token_line,
            line_start: self.token_line_start,
            is_keyword: kind == TokenKind::Keyword,
        }
    }

    fn punctuator(&mut self, width: usize, kind: TokenKind) -> Token {
        self.scanner.advance_by(width);
        self.make_token(kind)
    }

    /// `xx` when `enabled` and doubled, otherwise `x`.
    fn one_or_two(&mut self, ch: u8, enabled: bool) -> Token {
        let width = if enabled && self.scanner.peek_at(1) == Some(ch) {
            2
        } else {
            1
        };
        self.punctuator(width, TokenKind::Punctuator)
    }

    /// `<`, `<=`, `<<` and their `>` counterparts.
    fn angle(&mut self, ch: u8) -> Token {
        let width = match self.scanner.peek_at(1) {
            Some(b'=') => 2,
            Some(next) if next == ch && self.options.bitwise_operators => 2,
            _ => 1,
        };
        self.punctuator(width, TokenKind::Punctuator)
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            location: Location::new(
                self.scanner.line(),
                self.scanner.line_start(),
                self.scanner.position(),
            ),
            near: self.scanner.captured_text().into_owned(),
        }
    }

    /// Report the character at the current position, which is
    /// consumed so that `near` quotes it whole.
    fn unexpected_character(&mut self) -> LexError {
        let ch = self.scanner.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER);
        let location = Location::new(
            self.scanner.line(),
            self.scanner.line_start(),
            self.scanner.position(),
        );
        self.scanner.advance_by(self.scanner.char_width());
        LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            location,
            near: self.scanner.captured_text().into_owned(),
        }
    }

    // -- Names --

    fn read_name(&mut self) -> Token {
        self.scanner.scan_while(|s| s.is_alphanumeric(0));
        let text = self.scanner.captured_text();
        let kind = match text.as_ref() {
            "and" | "or" | "not" => TokenKind::LogicalOperator,
            "true" | "false" => TokenKind::BooleanLiteral,
            "nil" => TokenKind::NilLiteral,
            "goto" if self.options.contextual_goto => TokenKind::Identifier,
            word if is_reserved(word) => TokenKind::Keyword,
            _ => TokenKind::Identifier,
        };
        self.make_token(kind)
    }

    // -- Strings --

    fn read_string(&mut self, delimiter: u8) -> Result<Token, LexError> {
        self.scanner.advance();
        loop {
            match self.scanner.peek() {
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error(LexErrorKind::UnfinishedString));
                }
                Some(b'\\') => {
                    self.scanner.advance();
                    self.read_escape()?;
                }
                Some(ch) if ch == delimiter => {
                    self.scanner.advance();
                    return Ok(self.make_token(TokenKind::StringLiteral));
                }
                Some(_) => self.scanner.advance(),
            }
        }
    }

    /// Consume the byte after a backslash. `\z` also swallows the
    /// whitespace run that follows it.
    fn read_escape(&mut self) -> Result<(), LexError> {
        if self.scanner.is_out_of_bounds(0) {
            return Err(self.error(LexErrorKind::UnfinishedString));
        }
        if self.scanner.consume_end_of_line() {
            return Ok(());
        }
        let skip_space = self.scanner.peek() == Some(b'z');
        self.scanner.advance();
        if skip_space {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// `[`, then `=`*, then `[`. Returns the number of `=` without
    /// consuming anything.
    fn long_bracket_depth(&self, offset: usize) -> Option<usize> {
        if self.scanner.peek_at(offset) != Some(b'[') {
            return None;
        }
        let mut depth = 0;
        while self.scanner.peek_at(offset + 1 + depth) == Some(b'=') {
            depth += 1;
        }
        (self.scanner.peek_at(offset + 1 + depth) == Some(b'[')).then_some(depth)
    }

    fn read_long_string(&mut self) -> Result<Token, LexError> {
        let Some(depth) = self.long_bracket_depth(0) else {
            self.scanner.advance();
            self.scanner.scan_while(|s| s.peek() == Some(b'='));
            return Err(self.error(LexErrorKind::InvalidLongStringDelimiter));
        };
        let start_line = self.scanner.line();
        if !self.read_long_bracket(depth) {
            return Err(self.error(LexErrorKind::UnfinishedLongString { start_line }));
        }
        Ok(self.make_token(TokenKind::StringLiteral))
    }

    /// Consume an opened long bracket of the given depth up to and
    /// including its closing delimiter. Returns `false` at end of input.
    fn read_long_bracket(&mut self, depth: usize) -> bool {
        self.scanner.advance_by(depth + 2);
        loop {
            match self.scanner.peek() {
                None => return false,
                Some(b']') => {
                    let mut run = 0;
                    while self.scanner.peek_at(1 + run) == Some(b'=') {
                        run += 1;
                    }
                    if run == depth && self.scanner.peek_at(1 + run) == Some(b']') {
                        self.scanner.advance_by(depth + 2);
                        return true;
                    }
                    self.scanner.advance();
                }
                Some(b'\n' | b'\r') => {
                    self.scanner.consume_end_of_line();
                }
                Some(_) => self.scanner.advance(),
            }
        }
    }

    // -- Comments --

    fn read_comment(&mut self) -> Result<Token, LexError> {
        self.scanner.advance_by(2);
        if let Some(depth) = self.long_bracket_depth(0) {
            let start_line = self.scanner.line();
            if !self.read_long_bracket(depth) {
                return Err(self.error(LexErrorKind::UnfinishedLongComment { start_line }));
            }
        } else {
            self.scanner.scan_until(|s| s.is_line_terminator(0));
        }
        Ok(self.make_token(TokenKind::Comment))
    }

    // -- Numbers --

    fn read_number(&mut self) -> Result<Token, LexError> {
        if self.scanner.peek() == Some(b'0') && matches!(self.scanner.peek_at(1), Some(b'x' | b'X'))
        {
            self.read_hex_number()?;
        } else {
            self.read_decimal_number()?;
        }
        Ok(self.make_token(TokenKind::NumericLiteral))
    }

    fn read_decimal_number(&mut self) -> Result<(), LexError> {
        self.scanner.scan_while(|s| s.is_digit(0));
        let mut fractional = false;
        if self.scanner.peek() == Some(b'.') {
            fractional = true;
            self.scanner.advance();
            self.scanner.scan_while(|s| s.is_digit(0));
        }
        let exponent = self.read_exponent(b'e', b'E')?;
        self.read_number_suffixes(fractional || exponent)
    }

    fn read_hex_number(&mut self) -> Result<(), LexError> {
        self.scanner.advance_by(2);
        if !self.scanner.is_hex_digit(0) && self.scanner.peek() != Some(b'.') {
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        let integer_start = self.scanner.position();
        self.scanner.scan_while(|s| s.is_hex_digit(0));
        let mut digits = self.scanner.position() - integer_start;
        let mut fractional = false;
        if self.scanner.peek() == Some(b'.') {
            fractional = true;
            self.scanner.advance();
            let fraction_start = self.scanner.position();
            self.scanner.scan_while(|s| s.is_hex_digit(0));
            digits += self.scanner.position() - fraction_start;
        }
        if digits == 0 {
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        let exponent = self.read_exponent(b'p', b'P')?;
        self.read_number_suffixes(fractional || exponent)
    }

    /// Optional exponent marker, optional sign, mandatory digits. A `.`
    /// after the mantissa has been read is always malformed.
    fn read_exponent(&mut self, lower: u8, upper: u8) -> Result<bool, LexError> {
        if self.scanner.peek() == Some(b'.') {
            self.scanner.advance();
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        if !matches!(self.scanner.peek(), Some(ch) if ch == lower || ch == upper) {
            return Ok(false);
        }
        self.scanner.advance();
        if matches!(self.scanner.peek(), Some(b'+' | b'-')) {
            self.scanner.advance();
        }
        if !self.scanner.is_digit(0) {
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        self.scanner.scan_while(|s| s.is_digit(0));
        if self.scanner.peek() == Some(b'.') {
            self.scanner.advance();
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        Ok(true)
    }

    /// Imaginary unit, then 64-bit integer suffix. Integer suffixes only
    /// apply to plain integers.
    fn read_number_suffixes(&mut self, non_integer: bool) -> Result<(), LexError> {
        let imaginary = self.options.imaginary_numbers
            && matches!(self.scanner.peek(), Some(b'i' | b'I'));
        if imaginary {
            self.scanner.advance();
        }
        if self.read_integer_suffix()? && (non_integer || imaginary) {
            return Err(self.error(LexErrorKind::MalformedNumber));
        }
        Ok(())
    }

    /// `u`, `ull`, or `ll`, in any case. Returns whether a suffix was read.
    fn read_integer_suffix(&mut self) -> Result<bool, LexError> {
        if !self.options.integer_suffixes {
            return Ok(false);
        }
        let is_l = |s: &Scanner<'_>, offset| matches!(s.peek_at(offset), Some(b'l' | b'L'));
        let unsigned = matches!(self.scanner.peek(), Some(b'u' | b'U'));
        if unsigned {
            self.scanner.advance();
        }
        match (is_l(&self.scanner, 0), is_l(&self.scanner, 1)) {
            (true, true) => {
                self.scanner.advance_by(2);
                Ok(true)
            }
            (true, false) => {
                self.scanner.advance();
                Err(self.error(LexErrorKind::MalformedNumber))
            }
            (false, _) => Ok(unsigned),
        }
    }
}

const RESERVED: [&str; 16] = [
    "do", "if", "in", "end", "for", "else", "then", "break", "local", "until", "while", "elseif",
    "repeat", "return", "function", "goto",
];

/// Whether `word` is one of the reserved words that lex as
/// [`TokenKind::Keyword`].
#[must_use]
pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

//! Byte-addressable view over the source text.
//!
//! The scanner owns the position cursor, the current line bookkeeping,
//! and the start mark of the lexeme being captured. Classification
//! predicates take an offset relative to the current position and answer
//! `false` past the end of input instead of failing.

use std::borrow::Cow;

use crate::token::Span;

/// Position, line and capture state over one source string.
#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    input: &'src [u8],
    pos: usize,
    mark: usize,
    line: usize,
    line_start: usize,
    extended_identifiers: bool,
}

impl<'src> Scanner<'src> {
    #[must_use]
    pub const fn new(source: &'src str, extended_identifiers: bool) -> Self {
        Self {
            input: source.as_bytes(),
            pos: 0,
            mark: 0,
            line: 1,
            line_start: 0,
            extended_identifiers,
        }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub const fn line_start(&self) -> usize {
        self.line_start
    }

    /// Start capturing a new lexeme at the current position.
    pub const fn mark(&mut self) {
        self.mark = self.pos;
    }

    #[must_use]
    pub const fn captured_range(&self) -> Span {
        Span::new(self.mark, self.pos)
    }

    /// Text between the mark and the current position.
    #[must_use]
    pub fn captured_text(&self) -> Cow<'src, str> {
        String::from_utf8_lossy(&self.input[self.mark..self.pos])
    }

    /// Move forward one byte, stopping at the end of input.
    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Move forward `n` bytes without line bookkeeping.
    pub fn advance_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Byte at `offset` from the current position.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    #[must_use]
    pub const fn is_out_of_bounds(&self, offset: usize) -> bool {
        self.pos + offset >= self.input.len()
    }

    #[must_use]
    pub fn is_whitespace(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset), Some(b' ' | b'\t' | 0x0B | 0x0C))
    }

    #[must_use]
    pub fn is_line_feed(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some(b'\n')
    }

    #[must_use]
    pub fn is_carriage_return(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some(b'\r')
    }

    #[must_use]
    pub fn is_line_terminator(&self, offset: usize) -> bool {
        self.is_line_feed(offset) || self.is_carriage_return(offset)
    }

    /// `\r\n` or `\n\r` starting at `offset`.
    #[must_use]
    pub fn is_newline_pair(&self, offset: usize) -> bool {
        match (self.peek_at(offset), self.peek_at(offset + 1)) {
            (Some(b'\r'), Some(b'\n')) | (Some(b'\n'), Some(b'\r')) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_digit(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|b| b.is_ascii_digit())
    }

    #[must_use]
    pub fn is_hex_digit(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|b| b.is_ascii_hexdigit())
    }

    /// Letters, `_`, and (when enabled) any byte >= 0x80.
    #[must_use]
    pub fn is_alphabetic(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|b| {
            b.is_ascii_alphabetic() || b == b'_' || (self.extended_identifiers && b >= 0x80)
        })
    }

    #[must_use]
    pub fn is_alphanumeric(&self, offset: usize) -> bool {
        self.is_alphabetic(offset) || self.is_digit(offset)
    }

    /// Consume one logical line terminator (`\n`, `\r`, `\r\n`, or `\n\r`)
    /// and start a new line. Returns whether anything was consumed.
    pub fn consume_end_of_line(&mut self) -> bool {
        if !self.is_line_terminator(0) {
            return false;
        }
        let width = if self.is_newline_pair(0) { 2 } else { 1 };
        self.advance_by(width);
        self.line += 1;
        self.line_start = self.pos;
        true
    }

    /// Advance while `predicate` holds, stopping at the end of input.
    pub fn scan_while(&mut self, predicate: impl Fn(&Self) -> bool) {
        while !self.is_out_of_bounds(0) && predicate(self) {
            self.pos += 1;
        }
    }

    /// Advance until `predicate` holds, stopping at the end of input.
    pub fn scan_until(&mut self, predicate: impl Fn(&Self) -> bool) {
        self.scan_while(|s| !predicate(s));
    }

    /// Whether the input at the current position starts with `literal`.
    #[must_use]
    pub fn matches(&self, literal: &str) -> bool {
        self.input[self.pos..].starts_with(literal.as_bytes())
    }

    /// Character starting at the current position.
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        let end = (self.pos + self.char_width()).min(self.input.len());
        std::str::from_utf8(&self.input[self.pos..end])
            .ok()
            .and_then(|s| s.chars().next())
    }

    /// Length in bytes of the UTF-8 sequence starting at the current
    /// position, or 0 at the end of input.
    #[must_use]
    pub fn char_width(&self) -> usize {
        match self.peek() {
            None => 0,
            Some(b) if b < 0xC0 => 1,
            Some(b) if b < 0xE0 => 2,
            Some(b) if b < 0xF0 => 3,
            Some(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_capture() {
        let mut s = Scanner::new("local x", false);
        s.mark();
        s.scan_while(|s| s.is_alphabetic(0));
        assert_eq!(s.captured_text(), "local");
        assert_eq!(s.captured_range(), Span::new(0, 5));
    }

    #[test]
    fn out_of_bounds_predicates_are_false() {
        let s = Scanner::new("a", false);
        assert!(s.is_out_of_bounds(1));
        assert!(!s.is_digit(5));
        assert!(!s.is_whitespace(5));
        assert!(!s.is_line_terminator(5));
        assert_eq!(s.peek_at(5), None);
    }

    #[test]
    fn advance_saturates() {
        let mut s = Scanner::new("ab", false);
        s.advance_by(10);
        assert_eq!(s.position(), 2);
        s.advance();
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn newline_pairs_count_once() {
        let mut s = Scanner::new("\r\n\n\rx\ny", false);
        assert!(s.consume_end_of_line());
        assert_eq!((s.position(), s.line()), (2, 2));
        assert!(s.consume_end_of_line());
        assert_eq!((s.position(), s.line()), (4, 3));
        assert_eq!(s.line_start(), 4);
        assert!(!s.consume_end_of_line());
        s.advance();
        assert!(s.consume_end_of_line());
        assert_eq!(s.line(), 4);
        assert_eq!(s.line_start(), 6);
    }

    #[test]
    fn extended_identifier_bytes() {
        let plain = Scanner::new("é", false);
        assert!(!plain.is_alphabetic(0));
        let extended = Scanner::new("é", true);
        assert!(extended.is_alphabetic(0));
        assert!(extended.is_alphanumeric(1));
        assert_eq!(extended.char_width(), 2);
        assert_eq!(extended.peek_char(), Some('é'));
    }

    #[test]
    fn scan_until_stops_at_end() {
        let mut s = Scanner::new("abc", false);
        s.scan_until(|s| s.peek() == Some(b'z'));
        assert_eq!(s.position(), 3);
    }

    #[test]
    fn matches_does_not_consume() {
        let s = Scanner::new("--[[", false);
        assert!(s.matches("--"));
        assert!(s.matches("--[["));
        assert!(!s.matches("--[[["));
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn hex_digits() {
        let s = Scanner::new("fG", false);
        assert!(s.is_hex_digit(0));
        assert!(!s.is_hex_digit(1));
    }
}

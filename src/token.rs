use std::fmt;

use crate::diagnostics::Location;

/// Byte range into the source text (`start..end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input. Repeatable, with an empty span.
    Eof,
    /// Quoted (`"..."`, `'...'`) or long-bracket (`[[...]]`) string.
    StringLiteral,
    /// Reserved word such as `local` or `end`.
    Keyword,
    /// `and`, `or`, `not`.
    LogicalOperator,
    /// Plain name.
    Identifier,
    /// Decimal or hexadecimal number, suffixes included.
    NumericLiteral,
    /// Operator or delimiter.
    Punctuator,
    /// `true` or `false`.
    BooleanLiteral,
    /// `nil`.
    NilLiteral,
    /// `...`.
    VarargLiteral,
    /// Line (`-- ...`) or long (`--[[ ... ]]`) comment.
    Comment,
}

impl TokenKind {
    /// Short human name used in "unexpected" diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::StringLiteral => "string",
            Self::Keyword | Self::LogicalOperator => "keyword",
            Self::Identifier => "identifier",
            Self::NumericLiteral => "number",
            Self::BooleanLiteral => "boolean",
            Self::Comment => "comment",
            Self::Eof | Self::Punctuator | Self::NilLiteral | Self::VarargLiteral => "symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single token with its kind, exact source text, and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text exactly as written (quotes, brackets, and suffixes kept).
    pub text: String,
    pub span: Span,
    /// 1-based line on which the token starts.
    pub line: usize,
    /// Offset of the first byte of `line`.
    pub line_start: usize,
    /// True only for reserved words; `and`/`or`/`not` and literals are not.
    pub is_keyword: bool,
}

impl Token {
    /// 1-based column of the token's first byte.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.span.start - self.line_start + 1
    }

    #[must_use]
    pub const fn location(&self) -> Location {
        Location::new(self.line, self.line_start, self.span.start)
    }

    /// Text used when this token is quoted in a diagnostic.
    #[must_use]
    pub fn near(&self) -> &str {
        if self.is_eof() {
            "<eof>"
        } else {
            &self.text
        }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

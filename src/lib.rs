//! Tokenizer and parser for Lua 5.1 through 5.3 and LuaJIT-style
//! extensions.
//!
//! Source text goes through a byte [`Scanner`](scanner::Scanner), a
//! [`Tokenizer`] that yields one [`Token`] per call, a memoizing
//! [`TokenCursor`], and finally a recursive-descent [`Parser`] that builds
//! an owned [`Chunk`]. Errors carry a 1-based line and column and the
//! text near the failure.
//!
//! # Quick start
//!
//! ## Parse a chunk
//!
//! ```
//! use luaparse_rs::{Statement, parse};
//!
//! let chunk = parse("local x = 1 + 2 * 3").unwrap();
//! assert!(matches!(chunk.block.statements[0], Statement::Local(_)));
//! ```
//!
//! ## Tokenize with a dialect
//!
//! ```
//! use luaparse_rs::{Options, TokenKind, tokenize_with};
//!
//! let tokens = tokenize_with("a // b", &Options::lua51()).unwrap();
//! assert_eq!(tokens[1].kind, TokenKind::Punctuator);
//! assert_eq!(tokens[1].text, "/");
//! ```
//!
//! ## Report errors
//!
//! ```
//! use luaparse_rs::parse;
//!
//! let err = parse("while true do").unwrap_err();
//! assert_eq!(err.to_string(), "[1:14] expected 'end' near '<eof>'");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod cursor;
pub mod diagnostics;
pub mod instrument;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod visitor;

pub use ast::{
    BinaryOperator, Block, CallArguments, Chunk, Expression, FunctionDeclaration, Identifier,
    Indexer, Literal, LiteralKind, Statement, TableConstructor, TableField, UnaryOperator,
};
pub use cursor::{TokenCursor, TokenPattern};
pub use diagnostics::Location;
pub use instrument::{Instrument, NoopInstrument, Profile, TracingInstrument};
pub use lexer::{LexError, LexErrorKind, Tokenizer, tokenize, tokenize_with};
pub use options::Options;
pub use parser::{ParseError, ParseErrorKind, Parser, parse, parse_with};
pub use token::{Span, Token, TokenKind};
pub use visitor::{Node, Visitor};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where the error occurred.
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::Lex(err) => err.location,
            Self::Parse(err) => err.location,
        }
    }
}

use std::fmt;

use crate::Error;
use crate::ast::{
    AssignmentStatement, BinaryOperator, Block, CallArguments, CallStatement, Chunk, DoStatement,
    Expression, FunctionDeclaration, GenericForStatement, GotoStatement, Identifier, IfClause,
    IfStatement, Indexer, LabelStatement, Literal, LiteralKind, LocalStatement,
    NumericForStatement, RepeatStatement, ReturnStatement, Statement, TableConstructor, TableField,
    UNARY_PRECEDENCE, UnaryOperator, WhileStatement,
};
use crate::cursor::TokenCursor;
use crate::diagnostics::Location;
use crate::instrument::{Instrument, NoopInstrument};
use crate::lexer::Tokenizer;
use crate::options::Options;
use crate::token::{Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token or construct is missing, e.g. `'end'` or
    /// `<expression>`.
    ExpectedToken { expected: String },
    /// A token that cannot start or continue the current construct.
    UnexpectedToken { kind: TokenKind, value: String },
    /// Syntax nested deeper than `Options::max_depth`.
    NestingTooDeep,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedToken { expected } => write!(f, "expected {expected}"),
            Self::UnexpectedToken {
                kind: TokenKind::Eof,
                ..
            } => write!(f, "unexpected symbol"),
            Self::UnexpectedToken { kind, value } => write!(f, "unexpected {kind} '{value}'"),
            Self::NestingTooDeep => write!(f, "chunk has too many syntax levels"),
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location} {kind} near '{near}'")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
    pub near: String,
}

/// Parse a source string into a [`Chunk`] using [`Options::for_parser`].
///
/// # Errors
///
/// Returns the first lexical or syntax error; there is no recovery.
pub fn parse(source: &str) -> Result<Chunk, Error> {
    parse_with(source, &Options::for_parser())
}

/// Parse a source string with explicit options.
pub fn parse_with(source: &str, options: &Options) -> Result<Chunk, Error> {
    Parser::new(source, options)?.parse_chunk()
}

/// Recursive-descent statement parser with precedence climbing for
/// expressions.
pub struct Parser<'src, I = NoopInstrument> {
    cursor: TokenCursor<'src, I>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, options: &Options) -> Result<Self, Error> {
        Self::with_instrument(source, options, NoopInstrument)
    }
}

impl<'src, I: Instrument> Parser<'src, I> {
    pub fn with_instrument(
        source: &'src str,
        options: &Options,
        instrument: I,
    ) -> Result<Self, Error> {
        let tokenizer = Tokenizer::with_instrument(source, options, instrument);
        Ok(Self {
            cursor: TokenCursor::from_tokenizer(tokenizer)?,
            depth: 0,
        })
    }

    /// Parse the whole input. Anything left after the top-level block is
    /// an error.
    pub fn parse_chunk(mut self) -> Result<Chunk, Error> {
        self.production("chunk", |p| {
            let block = p.parse_block()?;
            if !p.cursor.current().is_eof() {
                return Err(p.unexpected());
            }
            let comments = p
                .cursor
                .take_comments()
                .iter()
                .filter_map(literal)
                .collect();
            Ok(Chunk { block, comments })
        })
    }

    // -- Bookkeeping --

    fn production<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.cursor.instrument().enter(name);
        let result = f(self);
        self.cursor.instrument().exit(name);
        result
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if self.depth >= self.cursor.options().max_depth {
            return Err(self.error_at_current(ParseErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn error_at_current(&self, kind: ParseErrorKind) -> Error {
        let token = self.cursor.current();
        ParseError {
            kind,
            location: token.location(),
            near: token.near().to_string(),
        }
        .into()
    }

    fn expected(&self, what: &str) -> Error {
        self.error_at_current(ParseErrorKind::ExpectedToken {
            expected: what.to_string(),
        })
    }

    /// The current token cannot be used here. Quotes the token after it
    /// as context.
    fn unexpected(&mut self) -> Error {
        let found = self.cursor.current();
        let kind = ParseErrorKind::UnexpectedToken {
            kind: found.kind,
            value: found.text.clone(),
        };
        let location = found.location();
        match self.cursor.next_token() {
            Ok(next) => ParseError {
                kind,
                location,
                near: next.near().to_string(),
            }
            .into(),
            Err(err) => err.into(),
        }
    }

    fn expect(&mut self, text: &str) -> Result<(), Error> {
        if self.cursor.consume(text)? {
            Ok(())
        } else {
            Err(self.expected(&format!("'{text}'")))
        }
    }

    fn current_is(&self, kind: TokenKind, text: &str) -> bool {
        let token = self.cursor.current();
        token.kind == kind && token.text == text
    }

    // -- Blocks and statements --

    fn parse_block(&mut self) -> Result<Block, Error> {
        self.nested(|p| p.production("block", Self::parse_statements))
    }

    fn parse_statements(&mut self) -> Result<Block, Error> {
        let mut statements = Vec::new();
        while !self.cursor.current().is_eof() && !self.cursor.is_block_follow() {
            if self.cursor.consume(";")? {
                continue;
            }
            if self.current_is(TokenKind::Keyword, "return") {
                statements.push(self.parse_return()?);
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, Error> {
        self.production("statement", |p| {
            let (kind, text) = {
                let token = p.cursor.current();
                (token.kind, token.text.clone())
            };
            match (kind, text.as_str()) {
                (TokenKind::Keyword, "local") => p.parse_local(),
                (TokenKind::Keyword, "if") => p.parse_if(),
                (TokenKind::Keyword, "function") => p.parse_function_statement(),
                (TokenKind::Keyword, "while") => p.parse_while(),
                (TokenKind::Keyword, "for") => p.parse_for(),
                (TokenKind::Keyword, "repeat") => p.parse_repeat(),
                (TokenKind::Keyword, "do") => p.parse_do(),
                (TokenKind::Keyword, "goto") => p.parse_goto(),
                (TokenKind::Keyword, "break") => {
                    p.cursor.advance()?;
                    Ok(Statement::Break)
                }
                (TokenKind::Punctuator, "::") => p.parse_label(),
                (TokenKind::Identifier, "goto")
                    if p.cursor.options().labels
                        && p.cursor.matches_next(TokenKind::Identifier)? =>
                {
                    p.parse_goto()
                }
                _ => p.parse_assignment_or_call(),
            }
        })
    }

    fn parse_return(&mut self) -> Result<Statement, Error> {
        self.production("return", |p| {
            p.cursor.advance()?;
            let arguments = if p.cursor.current().is_eof()
                || p.cursor.is_block_follow()
                || p.cursor.matches(";")
            {
                Vec::new()
            } else {
                p.parse_expression_list()?
            };
            p.cursor.consume(";")?;
            Ok(Statement::Return(ReturnStatement { arguments }))
        })
    }

    fn parse_label(&mut self) -> Result<Statement, Error> {
        self.production("label", |p| {
            p.cursor.advance()?;
            let label = p.parse_identifier()?;
            p.expect("::")?;
            Ok(Statement::Label(LabelStatement { label }))
        })
    }

    fn parse_goto(&mut self) -> Result<Statement, Error> {
        self.production("goto", |p| {
            p.cursor.advance()?;
            let label = p.parse_identifier()?;
            Ok(Statement::Goto(GotoStatement { label }))
        })
    }

    fn parse_do(&mut self) -> Result<Statement, Error> {
        self.production("do", |p| {
            p.cursor.advance()?;
            let block = p.parse_block()?;
            p.expect("end")?;
            Ok(Statement::Do(DoStatement { block }))
        })
    }

    fn parse_while(&mut self) -> Result<Statement, Error> {
        self.production("while", |p| {
            p.cursor.advance()?;
            let condition = p.parse_expected_expression()?;
            p.expect("do")?;
            let block = p.parse_block()?;
            p.expect("end")?;
            Ok(Statement::While(WhileStatement { condition, block }))
        })
    }

    fn parse_repeat(&mut self) -> Result<Statement, Error> {
        self.production("repeat", |p| {
            p.cursor.advance()?;
            let block = p.parse_block()?;
            p.expect("until")?;
            let condition = p.parse_expected_expression()?;
            Ok(Statement::Repeat(RepeatStatement { block, condition }))
        })
    }

    fn parse_if(&mut self) -> Result<Statement, Error> {
        self.production("if", |p| {
            let mut clauses = Vec::new();
            loop {
                p.cursor.advance()?;
                let condition = p.parse_expected_expression()?;
                p.expect("then")?;
                let block = p.parse_block()?;
                clauses.push(IfClause { condition, block });
                if !p.current_is(TokenKind::Keyword, "elseif") {
                    break;
                }
            }
            let else_block = if p.cursor.consume("else")? {
                Some(p.parse_block()?)
            } else {
                None
            };
            p.expect("end")?;
            Ok(Statement::If(IfStatement {
                clauses,
                else_block,
            }))
        })
    }

    /// `for name = ...` is numeric, `for name, ... in ...` is generic.
    fn parse_for(&mut self) -> Result<Statement, Error> {
        self.production("for", |p| {
            p.cursor.advance()?;
            let variable = p.parse_identifier()?;

            if p.cursor.consume("=")? {
                let start = p.parse_expected_expression()?;
                p.expect(",")?;
                let end = p.parse_expected_expression()?;
                let step = if p.cursor.consume(",")? {
                    Some(p.parse_expected_expression()?)
                } else {
                    None
                };
                p.expect("do")?;
                let block = p.parse_block()?;
                p.expect("end")?;
                return Ok(Statement::NumericFor(NumericForStatement {
                    variable,
                    start,
                    end,
                    step,
                    block,
                }));
            }

            let mut variables = vec![variable];
            while p.cursor.consume(",")? {
                variables.push(p.parse_identifier()?);
            }
            p.expect("in")?;
            let iterators = p.parse_expression_list()?;
            p.expect("do")?;
            let block = p.parse_block()?;
            p.expect("end")?;
            Ok(Statement::GenericFor(GenericForStatement {
                variables,
                iterators,
                block,
            }))
        })
    }

    fn parse_local(&mut self) -> Result<Statement, Error> {
        self.production("local", |p| {
            p.cursor.advance()?;

            if p.cursor.consume("function")? {
                let name = p.parse_identifier()?;
                let function =
                    p.parse_function_body(Some(Box::new(Expression::Identifier(name))), true)?;
                return Ok(Statement::Function(function));
            }

            let mut variables = vec![p.parse_identifier()?];
            while p.cursor.consume(",")? {
                variables.push(p.parse_identifier()?);
            }
            let init = if p.cursor.consume("=")? {
                p.parse_expression_list()?
            } else {
                Vec::new()
            };
            Ok(Statement::Local(LocalStatement { variables, init }))
        })
    }

    /// `function a.b.c:m(...) ... end`.
    fn parse_function_statement(&mut self) -> Result<Statement, Error> {
        self.production("function", |p| {
            p.cursor.advance()?;
            let mut name = Expression::Identifier(p.parse_identifier()?);
            while p.cursor.consume(".")? {
                name = Expression::Member {
                    base: Box::new(name),
                    indexer: Indexer::Dot,
                    identifier: p.parse_identifier()?,
                };
            }
            if p.cursor.consume(":")? {
                name = Expression::Member {
                    base: Box::new(name),
                    indexer: Indexer::Colon,
                    identifier: p.parse_identifier()?,
                };
            }
            let function = p.parse_function_body(Some(Box::new(name)), false)?;
            Ok(Statement::Function(function))
        })
    }

    /// A single prefix expression is a call statement; a list followed
    /// by `=` is an assignment.
    fn parse_assignment_or_call(&mut self) -> Result<Statement, Error> {
        self.production("assignment_or_call", |p| {
            let Some(first) = p.parse_prefix_expression()? else {
                return Err(p.unexpected());
            };

            if p.cursor.matches_any(&[",", "="]) {
                let mut variables = vec![first];
                while p.cursor.consume(",")? {
                    match p.parse_prefix_expression()? {
                        Some(variable) => variables.push(variable),
                        None => return Err(p.unexpected()),
                    }
                }
                if !variables.iter().all(Expression::is_assignable) {
                    return Err(p.unexpected());
                }
                p.expect("=")?;
                let init = p.parse_expression_list()?;
                return Ok(Statement::Assignment(AssignmentStatement { variables, init }));
            }

            if first.is_call() {
                Ok(Statement::Call(CallStatement { expression: first }))
            } else {
                Err(p.unexpected())
            }
        })
    }

    // -- Functions and tables --

    fn parse_function_body(
        &mut self,
        name: Option<Box<Expression>>,
        is_local: bool,
    ) -> Result<FunctionDeclaration, Error> {
        self.production("function_body", |p| {
            p.expect("(")?;
            let mut parameters = Vec::new();
            let mut is_vararg = false;
            if !p.cursor.consume(")")? {
                loop {
                    if p.cursor.matches(TokenKind::Identifier) {
                        parameters.push(p.parse_identifier()?);
                        if p.cursor.consume(",")? {
                            continue;
                        }
                    } else if p.cursor.consume(TokenKind::VarargLiteral)? {
                        is_vararg = true;
                    } else {
                        return Err(p.expected("<name> or '...'"));
                    }
                    p.expect(")")?;
                    break;
                }
            }
            let body = p.parse_block()?;
            p.expect("end")?;
            Ok(FunctionDeclaration {
                name,
                is_local,
                parameters,
                is_vararg,
                body,
            })
        })
    }

    fn parse_table(&mut self) -> Result<TableConstructor, Error> {
        self.nested(|p| {
            p.production("table", |p| {
                p.expect("{")?;
                let mut fields = Vec::new();
                loop {
                    if p.cursor.consume("[")? {
                        let key = p.parse_expected_expression()?;
                        p.expect("]")?;
                        p.expect("=")?;
                        let value = p.parse_expected_expression()?;
                        fields.push(TableField::Keyed { key, value });
                    } else if p.cursor.matches(TokenKind::Identifier)
                        && p.cursor.matches_next("=")?
                    {
                        let name = identifier(p.cursor.current());
                        p.cursor.consume_next("=")?;
                        let value = p.parse_expected_expression()?;
                        fields.push(TableField::Named { name, value });
                    } else if let Some(value) = p.parse_expression()? {
                        fields.push(TableField::Value(value));
                    } else {
                        break;
                    }

                    if !p.cursor.matches_any(&[",", ";"]) {
                        break;
                    }
                    p.cursor.advance()?;
                }
                p.expect("}")?;
                Ok(TableConstructor { fields })
            })
        })
    }

    // -- Expressions --

    fn parse_identifier(&mut self) -> Result<Identifier, Error> {
        if !self.cursor.matches(TokenKind::Identifier) {
            return Err(self.expected("<name>"));
        }
        let identifier = identifier(self.cursor.current());
        self.cursor.advance()?;
        Ok(identifier)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, Error> {
        let mut expressions = vec![self.parse_expected_expression()?];
        while self.cursor.consume(",")? {
            expressions.push(self.parse_expected_expression()?);
        }
        Ok(expressions)
    }

    fn parse_expected_expression(&mut self) -> Result<Expression, Error> {
        self.parse_expression()?
            .ok_or_else(|| self.expected("<expression>"))
    }

    fn parse_expression(&mut self) -> Result<Option<Expression>, Error> {
        self.production("expression", |p| p.parse_sub_expression(0))
    }

    /// Precedence climbing: fold binary operators binding tighter than
    /// `limit` into the left operand.
    fn parse_sub_expression(&mut self, limit: u8) -> Result<Option<Expression>, Error> {
        self.nested(|p| {
            let mut left = if let Some(operator) = p.unary_operator() {
                p.cursor.advance()?;
                let argument = p
                    .parse_sub_expression(UNARY_PRECEDENCE)?
                    .ok_or_else(|| p.expected("<expression>"))?;
                Expression::Unary {
                    operator,
                    argument: Box::new(argument),
                }
            } else if let Some(primary) = p.parse_primary_expression()? {
                primary
            } else {
                return Ok(None);
            };

            while let Some(operator) = p.binary_operator() {
                let precedence = operator.precedence();
                if precedence <= limit {
                    break;
                }
                p.cursor.advance()?;
                let right_limit = if operator.is_right_associative() {
                    precedence - 1
                } else {
                    precedence
                };
                let right = p
                    .parse_sub_expression(right_limit)?
                    .ok_or_else(|| p.expected("<expression>"))?;
                left = Expression::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                };
            }
            Ok(Some(left))
        })
    }

    fn unary_operator(&self) -> Option<UnaryOperator> {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Punctuator | TokenKind::LogicalOperator => {
                UnaryOperator::from_text(&token.text)
            }
            _ => None,
        }
    }

    fn binary_operator(&self) -> Option<BinaryOperator> {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Punctuator | TokenKind::LogicalOperator => {
                BinaryOperator::from_text(&token.text)
            }
            _ => None,
        }
    }

    fn parse_primary_expression(&mut self) -> Result<Option<Expression>, Error> {
        self.production("primary", |p| {
            if let Some(literal) = literal(p.cursor.current()) {
                p.cursor.advance()?;
                return Ok(Some(Expression::Literal(literal)));
            }
            if p.cursor.consume("function")? {
                return Ok(Some(Expression::Function(p.parse_function_body(None, false)?)));
            }
            if p.cursor.matches("{") {
                return Ok(Some(Expression::Table(p.parse_table()?)));
            }
            p.parse_prefix_expression()
        })
    }

    /// A name or parenthesized expression followed by any chain of
    /// `[index]`, `.name`, `:name args`, and call arguments.
    fn parse_prefix_expression(&mut self) -> Result<Option<Expression>, Error> {
        self.nested(|p| {
            p.production("prefix", |p| {
                let mut base = if p.cursor.matches(TokenKind::Identifier) {
                    Expression::Identifier(p.parse_identifier()?)
                } else if p.cursor.consume("(")? {
                    let inner = p.parse_expected_expression()?;
                    p.expect(")")?;
                    Expression::Grouping(Box::new(inner))
                } else {
                    return Ok(None);
                };

                loop {
                    if p.cursor.consume("[")? {
                        let index = p.parse_expected_expression()?;
                        p.expect("]")?;
                        base = Expression::Index {
                            base: Box::new(base),
                            index: Box::new(index),
                        };
                    } else if p.cursor.consume(".")? {
                        base = Expression::Member {
                            base: Box::new(base),
                            indexer: Indexer::Dot,
                            identifier: p.parse_identifier()?,
                        };
                    } else if p.cursor.consume(":")? {
                        let method = Expression::Member {
                            base: Box::new(base),
                            indexer: Indexer::Colon,
                            identifier: p.parse_identifier()?,
                        };
                        let Some(arguments) = p.parse_call_arguments()? else {
                            return Err(p.expected("function arguments"));
                        };
                        base = Expression::Call {
                            base: Box::new(method),
                            arguments,
                        };
                    } else if let Some(arguments) = p.parse_call_arguments()? {
                        base = Expression::Call {
                            base: Box::new(base),
                            arguments,
                        };
                    } else {
                        return Ok(Some(base));
                    }
                }
            })
        })
    }

    /// `(explist)`, a table constructor, or a single string literal.
    fn parse_call_arguments(&mut self) -> Result<Option<CallArguments>, Error> {
        if self.cursor.consume("(")? {
            let arguments = self.nested(|p| {
                if p.cursor.matches(")") {
                    Ok(Vec::new())
                } else {
                    p.parse_expression_list()
                }
            })?;
            self.expect(")")?;
            return Ok(Some(CallArguments::List(arguments)));
        }
        if self.cursor.matches("{") {
            return Ok(Some(CallArguments::Table(self.parse_table()?)));
        }
        if self.cursor.matches(TokenKind::StringLiteral) {
            let argument = literal(self.cursor.current());
            self.cursor.advance()?;
            return Ok(argument.map(CallArguments::String));
        }
        Ok(None)
    }
}

fn identifier(token: &Token) -> Identifier {
    Identifier {
        name: token.text.clone(),
        span: token.span,
    }
}

/// Literal node for a literal-class token.
fn literal(token: &Token) -> Option<Literal> {
    let kind = match token.kind {
        TokenKind::NilLiteral => LiteralKind::Nil,
        TokenKind::BooleanLiteral => LiteralKind::Boolean(token.text == "true"),
        TokenKind::NumericLiteral => LiteralKind::Numeric,
        TokenKind::StringLiteral => LiteralKind::String,
        TokenKind::VarargLiteral => LiteralKind::Vararg,
        TokenKind::Comment => LiteralKind::Comment,
        _ => return None,
    };
    Some(Literal {
        kind,
        raw: token.text.clone(),
        span: token.span,
    })
}

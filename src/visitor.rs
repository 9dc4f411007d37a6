//! Double-dispatch traversal over the syntax tree.
//!
//! A [`Visitor`] has one method per node kind. Nodes dispatch to the
//! matching method through `accept`; the visitor decides whether and in
//! what order to descend into children.

use crate::ast::{
    AssignmentStatement, BinaryOperator, Block, CallArguments, CallStatement, Chunk, DoStatement,
    Expression, FunctionDeclaration, GenericForStatement, GotoStatement, Identifier, IfStatement,
    Indexer, LabelStatement, Literal, LiteralKind, LocalStatement, NumericForStatement,
    RepeatStatement, ReturnStatement, Statement, TableConstructor, UnaryOperator, WhileStatement,
};

pub trait Visitor {
    type Output;

    fn visit_chunk(&mut self, chunk: &Chunk) -> Self::Output;
    fn visit_block(&mut self, block: &Block) -> Self::Output;

    // Statements.
    fn visit_local_statement(&mut self, statement: &LocalStatement) -> Self::Output;
    fn visit_assignment_statement(&mut self, statement: &AssignmentStatement) -> Self::Output;
    fn visit_call_statement(&mut self, statement: &CallStatement) -> Self::Output;
    fn visit_if_statement(&mut self, statement: &IfStatement) -> Self::Output;
    fn visit_while_statement(&mut self, statement: &WhileStatement) -> Self::Output;
    fn visit_repeat_statement(&mut self, statement: &RepeatStatement) -> Self::Output;
    fn visit_numeric_for_statement(&mut self, statement: &NumericForStatement) -> Self::Output;
    fn visit_generic_for_statement(&mut self, statement: &GenericForStatement) -> Self::Output;
    fn visit_do_statement(&mut self, statement: &DoStatement) -> Self::Output;
    fn visit_return_statement(&mut self, statement: &ReturnStatement) -> Self::Output;
    fn visit_break_statement(&mut self) -> Self::Output;
    fn visit_goto_statement(&mut self, statement: &GotoStatement) -> Self::Output;
    fn visit_label_statement(&mut self, statement: &LabelStatement) -> Self::Output;
    /// Both `function` statements and function expressions.
    fn visit_function(&mut self, function: &FunctionDeclaration) -> Self::Output;

    // Expressions.
    fn visit_identifier(&mut self, identifier: &Identifier) -> Self::Output;
    fn visit_nil_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_boolean_literal(&mut self, literal: &Literal, value: bool) -> Self::Output;
    fn visit_numeric_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_string_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_vararg_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_comment_literal(&mut self, literal: &Literal) -> Self::Output;
    fn visit_grouping(&mut self, inner: &Expression) -> Self::Output;
    fn visit_unary(&mut self, operator: UnaryOperator, argument: &Expression) -> Self::Output;
    fn visit_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> Self::Output;
    fn visit_index(&mut self, base: &Expression, index: &Expression) -> Self::Output;
    fn visit_member(
        &mut self,
        base: &Expression,
        indexer: Indexer,
        identifier: &Identifier,
    ) -> Self::Output;
    fn visit_call(&mut self, base: &Expression, arguments: &CallArguments) -> Self::Output;
    fn visit_table(&mut self, table: &TableConstructor) -> Self::Output;

    /// Dispatch any node to its method.
    fn visit(&mut self, node: Node<'_>) -> Self::Output
    where
        Self: Sized,
    {
        node.accept(self)
    }
}

/// Borrowed handle to any visitable node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Chunk(&'a Chunk),
    Block(&'a Block),
    Statement(&'a Statement),
    Expression(&'a Expression),
    Literal(&'a Literal),
    Identifier(&'a Identifier),
}

impl Node<'_> {
    pub fn accept<V: Visitor + ?Sized>(self, visitor: &mut V) -> V::Output {
        match self {
            Node::Chunk(chunk) => chunk.accept(visitor),
            Node::Block(block) => block.accept(visitor),
            Node::Statement(statement) => statement.accept(visitor),
            Node::Expression(expression) => expression.accept(visitor),
            Node::Literal(literal) => literal.accept(visitor),
            Node::Identifier(identifier) => identifier.accept(visitor),
        }
    }
}

macro_rules! impl_node_from {
    ($($variant:ident),*) => {
        $(
            impl<'a> From<&'a $variant> for Node<'a> {
                fn from(node: &'a $variant) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

impl_node_from!(Chunk, Block, Statement, Expression, Literal, Identifier);

impl Chunk {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_chunk(self)
    }
}

impl Block {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_block(self)
    }
}

impl Statement {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Local(s) => visitor.visit_local_statement(s),
            Self::Assignment(s) => visitor.visit_assignment_statement(s),
            Self::Call(s) => visitor.visit_call_statement(s),
            Self::If(s) => visitor.visit_if_statement(s),
            Self::While(s) => visitor.visit_while_statement(s),
            Self::Repeat(s) => visitor.visit_repeat_statement(s),
            Self::NumericFor(s) => visitor.visit_numeric_for_statement(s),
            Self::GenericFor(s) => visitor.visit_generic_for_statement(s),
            Self::Do(s) => visitor.visit_do_statement(s),
            Self::Return(s) => visitor.visit_return_statement(s),
            Self::Break => visitor.visit_break_statement(),
            Self::Goto(s) => visitor.visit_goto_statement(s),
            Self::Label(s) => visitor.visit_label_statement(s),
            Self::Function(f) => visitor.visit_function(f),
        }
    }
}

impl Expression {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Literal(literal) => literal.accept(visitor),
            Self::Identifier(identifier) => visitor.visit_identifier(identifier),
            Self::Grouping(inner) => visitor.visit_grouping(inner),
            Self::Unary { operator, argument } => visitor.visit_unary(*operator, argument),
            Self::Binary {
                operator,
                left,
                right,
            } => visitor.visit_binary(*operator, left, right),
            Self::Index { base, index } => visitor.visit_index(base, index),
            Self::Member {
                base,
                indexer,
                identifier,
            } => visitor.visit_member(base, *indexer, identifier),
            Self::Call { base, arguments } => visitor.visit_call(base, arguments),
            Self::Table(table) => visitor.visit_table(table),
            Self::Function(function) => visitor.visit_function(function),
        }
    }
}

impl Literal {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self.kind {
            LiteralKind::Nil => visitor.visit_nil_literal(self),
            LiteralKind::Boolean(value) => visitor.visit_boolean_literal(self, value),
            LiteralKind::Numeric => visitor.visit_numeric_literal(self),
            LiteralKind::String => visitor.visit_string_literal(self),
            LiteralKind::Vararg => visitor.visit_vararg_literal(self),
            LiteralKind::Comment => visitor.visit_comment_literal(self),
        }
    }
}

impl Identifier {
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_identifier(self)
    }
}

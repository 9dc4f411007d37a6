//! Syntax tree produced by the parser.
//!
//! The tree is strict: every node is owned by its parent and nothing is
//! shared. Nodes are plain data; traversal goes through
//! [`Visitor`](crate::visitor::Visitor).

use std::fmt;

use crate::token::Span;

/// One fully parsed source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub block: Block,
    /// Every comment in the source, in order, as comment literals.
    pub comments: Vec<Literal>,
}

/// Ordered statements, optionally ending in a `return`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `local a, b = 1, 2`.
    Local(LocalStatement),
    /// `a, b.c = 1, 2`.
    Assignment(AssignmentStatement),
    /// A call evaluated for its side effects.
    Call(CallStatement),
    If(IfStatement),
    While(WhileStatement),
    Repeat(RepeatStatement),
    NumericFor(NumericForStatement),
    GenericFor(GenericForStatement),
    Do(DoStatement),
    Return(ReturnStatement),
    Break,
    Goto(GotoStatement),
    Label(LabelStatement),
    /// `function a.b:c() end` or `local function f() end`.
    Function(FunctionDeclaration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStatement {
    pub variables: Vec<Identifier>,
    pub init: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStatement {
    pub variables: Vec<Expression>,
    pub init: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStatement {
    pub expression: Expression,
}

/// `if`/`elseif` clauses in order, then the optional `else` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub clauses: Vec<IfClause>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfClause {
    pub condition: Expression,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatStatement {
    pub block: Block,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericForStatement {
    pub variable: Identifier,
    pub start: Expression,
    pub end: Expression,
    pub step: Option<Expression>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericForStatement {
    pub variables: Vec<Identifier>,
    pub iterators: Vec<Expression>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoStatement {
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoStatement {
    pub label: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStatement {
    pub label: Identifier,
}

/// Function expression or declaration; the two share one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    /// `None` for anonymous function expressions. An identifier for
    /// `local function` and plain declarations, a member chain for
    /// `function a.b:c()`.
    pub name: Option<Box<Expression>>,
    pub is_local: bool,
    pub parameters: Vec<Identifier>,
    /// Trailing `...` in the parameter list.
    pub is_vararg: bool,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    /// Parenthesized expression.
    Grouping(Box<Expression>),
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `base[index]`.
    Index {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// `base.name` or, as a call target, `base:name`.
    Member {
        base: Box<Expression>,
        indexer: Indexer,
        identifier: Identifier,
    },
    Call {
        base: Box<Expression>,
        arguments: CallArguments,
    },
    Table(TableConstructor),
    Function(FunctionDeclaration),
}

impl Expression {
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    /// Whether this expression may appear on the left of `=`.
    #[must_use]
    pub const fn is_assignable(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::Index { .. }
                | Self::Member {
                    indexer: Indexer::Dot,
                    ..
                }
        )
    }
}

/// Member access separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexer {
    Dot,
    Colon,
}

impl fmt::Display for Indexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dot => ".",
            Self::Colon => ":",
        })
    }
}

/// The three call forms: `f(a, b)`, `f{...}`, and `f"str"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArguments {
    List(Vec<Expression>),
    Table(TableConstructor),
    String(Literal),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableConstructor {
    pub fields: Vec<TableField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableField {
    /// Positional `value`.
    Value(Expression),
    /// `[key] = value`.
    Keyed { key: Expression, value: Expression },
    /// `name = value`.
    Named { name: Identifier, value: Expression },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// A literal keeps its exact source spelling in `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Nil,
    Boolean(bool),
    Numeric,
    String,
    Vararg,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `not`
    Not,
    /// `#`
    Length,
    /// `~`
    BitwiseNot,
}

impl UnaryOperator {
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "-" => Self::Negate,
            "not" => Self::Not,
            "#" => Self::Length,
            "~" => Self::BitwiseNot,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "not",
            Self::Length => "#",
            Self::BitwiseNot => "~",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    ShiftLeft,
    ShiftRight,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

/// Binding power of unary operators, between multiplicative and `^`.
pub const UNARY_PRECEDENCE: u8 = 12;

impl BinaryOperator {
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "or" => Self::Or,
            "and" => Self::And,
            "<" => Self::Less,
            ">" => Self::Greater,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            "==" => Self::Equal,
            "~=" => Self::NotEqual,
            "|" => Self::BitwiseOr,
            "~" => Self::BitwiseXor,
            "&" => Self::BitwiseAnd,
            "<<" => Self::ShiftLeft,
            ">>" => Self::ShiftRight,
            ".." => Self::Concat,
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "//" => Self::FloorDivide,
            "%" => Self::Modulo,
            "^" => Self::Power,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "~=",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "~",
            Self::BitwiseAnd => "&",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Concat => "..",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::FloorDivide => "//",
            Self::Modulo => "%",
            Self::Power => "^",
        }
    }

    /// Binding power, low to high. Unary operators sit at
    /// [`UNARY_PRECEDENCE`].
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Less
            | Self::Greater
            | Self::LessEqual
            | Self::GreaterEqual
            | Self::Equal
            | Self::NotEqual => 3,
            Self::BitwiseOr => 4,
            Self::BitwiseXor => 5,
            Self::BitwiseAnd => 6,
            Self::ShiftLeft | Self::ShiftRight => 7,
            Self::Concat => 9,
            Self::Add | Self::Subtract => 10,
            Self::Multiply | Self::Divide | Self::FloorDivide | Self::Modulo => 11,
            Self::Power => 14,
        }
    }

    #[must_use]
    pub const fn is_right_associative(self) -> bool {
        matches!(self, Self::Concat | Self::Power)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_ladder() {
        let ladder = [
            "or", "and", "==", "|", "~", "&", "<<", "..", "+", "*", "^",
        ];
        let levels: Vec<_> = ladder
            .iter()
            .map(|op| BinaryOperator::from_text(op).map(BinaryOperator::precedence))
            .collect();
        assert!(levels.iter().all(Option::is_some));
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
        assert!(BinaryOperator::Multiply.precedence() < UNARY_PRECEDENCE);
        assert!(UNARY_PRECEDENCE < BinaryOperator::Power.precedence());
    }

    #[test]
    fn operator_text_round_trips() {
        for text in ["<=", "~=", "//", "..", ">>", "%"] {
            let op = BinaryOperator::from_text(text).expect("operator");
            assert_eq!(op.to_string(), text);
        }
        assert_eq!(UnaryOperator::from_text("not"), Some(UnaryOperator::Not));
        assert_eq!(UnaryOperator::from_text("+"), None);
    }

    #[test]
    fn assignable_targets() {
        let name = Expression::Identifier(Identifier {
            name: "a".to_string(),
            span: Span::new(0, 1),
        });
        assert!(name.is_assignable());
        let call = Expression::Call {
            base: Box::new(name.clone()),
            arguments: CallArguments::List(Vec::new()),
        };
        assert!(call.is_call());
        assert!(!call.is_assignable());
        assert!(!Expression::Grouping(Box::new(name)).is_assignable());
    }
}

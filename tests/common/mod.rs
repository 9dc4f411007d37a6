#![allow(dead_code)]

use luaparse_rs::ast::{
    AssignmentStatement, CallStatement, DoStatement, GenericForStatement, GotoStatement,
    IfStatement, LabelStatement, LocalStatement, NumericForStatement, RepeatStatement,
    ReturnStatement, WhileStatement,
};
use luaparse_rs::{
    BinaryOperator, Block, CallArguments, Chunk, Expression, FunctionDeclaration, Identifier,
    Indexer, Literal, Node, Statement, TableConstructor, TableField, Token, TokenKind,
    UnaryOperator, Visitor, parse, tokenize,
};

/// Renders a tree as an S-expression, e.g. `(+ 1 (* 2 3))`.
pub struct SexpPrinter;

fn list(head: &str, items: impl IntoIterator<Item = String>) -> String {
    let mut out = format!("({head}");
    for item in items {
        out.push(' ');
        out.push_str(&item);
    }
    out.push(')');
    out
}

/// Bare parenthesized list, e.g. `(a b)`.
fn group(items: impl IntoIterator<Item = String>) -> String {
    format!("({})", items.into_iter().collect::<Vec<_>>().join(" "))
}

impl SexpPrinter {
    fn all(&mut self, expressions: &[Expression]) -> Vec<String> {
        expressions.iter().map(|e| e.accept(self)).collect()
    }

    fn names(identifiers: &[Identifier]) -> String {
        group(identifiers.iter().map(|i| i.name.clone()))
    }

    fn field(&mut self, field: &TableField) -> String {
        match field {
            TableField::Value(value) => value.accept(self),
            TableField::Keyed { key, value } => {
                format!("([{}] {})", key.accept(self), value.accept(self))
            }
            TableField::Named { name, value } => list("=", [name.name.clone(), value.accept(self)]),
        }
    }
}

impl Visitor for SexpPrinter {
    type Output = String;

    fn visit_chunk(&mut self, chunk: &Chunk) -> String {
        chunk.block.accept(self)
    }

    fn visit_block(&mut self, block: &Block) -> String {
        list("block", block.statements.iter().map(|s| s.accept(self)))
    }

    fn visit_local_statement(&mut self, s: &LocalStatement) -> String {
        let init = self.all(&s.init);
        list("local", [Self::names(&s.variables), group(init)])
    }

    fn visit_assignment_statement(&mut self, s: &AssignmentStatement) -> String {
        let targets = self.all(&s.variables);
        let init = self.all(&s.init);
        list(
            "set",
            [
                group(targets),
                group(init),
            ],
        )
    }

    fn visit_call_statement(&mut self, s: &CallStatement) -> String {
        s.expression.accept(self)
    }

    fn visit_if_statement(&mut self, s: &IfStatement) -> String {
        let mut items = Vec::new();
        for clause in &s.clauses {
            items.push(clause.condition.accept(self));
            items.push(clause.block.accept(self));
        }
        if let Some(block) = &s.else_block {
            items.push("else".to_string());
            items.push(block.accept(self));
        }
        list("if", items)
    }

    fn visit_while_statement(&mut self, s: &WhileStatement) -> String {
        list("while", [s.condition.accept(self), s.block.accept(self)])
    }

    fn visit_repeat_statement(&mut self, s: &RepeatStatement) -> String {
        list("repeat", [s.block.accept(self), s.condition.accept(self)])
    }

    fn visit_numeric_for_statement(&mut self, s: &NumericForStatement) -> String {
        let mut items = vec![
            s.variable.name.clone(),
            s.start.accept(self),
            s.end.accept(self),
        ];
        if let Some(step) = &s.step {
            items.push(step.accept(self));
        }
        items.push(s.block.accept(self));
        list("for", items)
    }

    fn visit_generic_for_statement(&mut self, s: &GenericForStatement) -> String {
        let iterators = self.all(&s.iterators);
        list(
            "for-in",
            [
                Self::names(&s.variables),
                group(iterators),
                s.block.accept(self),
            ],
        )
    }

    fn visit_do_statement(&mut self, s: &DoStatement) -> String {
        list("do", [s.block.accept(self)])
    }

    fn visit_return_statement(&mut self, s: &ReturnStatement) -> String {
        let arguments = self.all(&s.arguments);
        list("return", arguments)
    }

    fn visit_break_statement(&mut self) -> String {
        "break".to_string()
    }

    fn visit_goto_statement(&mut self, s: &GotoStatement) -> String {
        list("goto", [s.label.name.clone()])
    }

    fn visit_label_statement(&mut self, s: &LabelStatement) -> String {
        list("label", [s.label.name.clone()])
    }

    fn visit_function(&mut self, f: &FunctionDeclaration) -> String {
        let head = if f.is_local { "local-function" } else { "function" };
        let mut items = Vec::new();
        if let Some(name) = &f.name {
            items.push(name.accept(self));
        }
        let mut parameters: Vec<_> = f.parameters.iter().map(|p| p.name.clone()).collect();
        if f.is_vararg {
            parameters.push("...".to_string());
        }
        items.push(group(parameters));
        items.push(f.body.accept(self));
        list(head, items)
    }

    fn visit_identifier(&mut self, identifier: &Identifier) -> String {
        identifier.name.clone()
    }

    fn visit_nil_literal(&mut self, _: &Literal) -> String {
        "nil".to_string()
    }

    fn visit_boolean_literal(&mut self, _: &Literal, value: bool) -> String {
        value.to_string()
    }

    fn visit_numeric_literal(&mut self, literal: &Literal) -> String {
        literal.raw.clone()
    }

    fn visit_string_literal(&mut self, literal: &Literal) -> String {
        literal.raw.clone()
    }

    fn visit_vararg_literal(&mut self, _: &Literal) -> String {
        "...".to_string()
    }

    fn visit_comment_literal(&mut self, literal: &Literal) -> String {
        literal.raw.clone()
    }

    fn visit_grouping(&mut self, inner: &Expression) -> String {
        list("paren", [inner.accept(self)])
    }

    fn visit_unary(&mut self, operator: UnaryOperator, argument: &Expression) -> String {
        list(operator.as_str(), [argument.accept(self)])
    }

    fn visit_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> String {
        list(operator.as_str(), [left.accept(self), right.accept(self)])
    }

    fn visit_index(&mut self, base: &Expression, index: &Expression) -> String {
        list("index", [base.accept(self), index.accept(self)])
    }

    fn visit_member(&mut self, base: &Expression, indexer: Indexer, identifier: &Identifier) -> String {
        list(&indexer.to_string(), [base.accept(self), identifier.name.clone()])
    }

    fn visit_call(&mut self, base: &Expression, arguments: &CallArguments) -> String {
        let mut items = vec![base.accept(self)];
        match arguments {
            CallArguments::List(arguments) => items.extend(self.all(arguments)),
            CallArguments::Table(table) => items.push(self.visit_table(table)),
            CallArguments::String(literal) => items.push(literal.accept(self)),
        }
        list("call", items)
    }

    fn visit_table(&mut self, table: &TableConstructor) -> String {
        let fields: Vec<_> = table.fields.iter().map(|f| self.field(f)).collect();
        list("table", fields)
    }
}

/// Parse `source` and render the whole chunk.
pub fn sexp(source: &str) -> String {
    let chunk = parse(source).unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    SexpPrinter.visit(Node::from(&chunk))
}

/// Parse `return <source>` and render the single returned expression.
pub fn expr(source: &str) -> String {
    let chunk = parse(&format!("return {source}"))
        .unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    match chunk.block.statements.as_slice() {
        [Statement::Return(ret)] if ret.arguments.len() == 1 => ret.arguments[0].accept(&mut SexpPrinter),
        other => panic!("expected a single return value, got {other:?}"),
    }
}

/// Error message produced by parsing `source`.
pub fn parse_error(source: &str) -> String {
    match parse(source) {
        Ok(chunk) => panic!("expected {source:?} to fail, got {chunk:?}"),
        Err(e) => e.to_string(),
    }
}

pub fn tokens(source: &str) -> Vec<Token> {
    tokenize(source).unwrap_or_else(|e| panic!("tokenize failed for {source:?}: {e}"))
}

/// `(kind, text)` pairs without the trailing end-of-input token.
pub fn kinds_and_texts(source: &str) -> Vec<(TokenKind, String)> {
    tokens(source)
        .into_iter()
        .filter(|t| !t.is_eof())
        .map(|t| (t.kind, t.text))
        .collect()
}

//! Visitor dispatch over parsed trees.

mod common;

use common::{SexpPrinter, sexp};
use luaparse_rs::ast::{
    AssignmentStatement, CallStatement, DoStatement, GenericForStatement, GotoStatement,
    IfStatement, LabelStatement, LocalStatement, NumericForStatement, RepeatStatement,
    ReturnStatement, WhileStatement,
};
use luaparse_rs::{
    BinaryOperator, Block, CallArguments, Chunk, Expression, FunctionDeclaration, Identifier,
    Indexer, Literal, Node, TableConstructor, UnaryOperator, Visitor, parse,
};
use pretty_assertions::assert_eq;

#[test]
fn printer_covers_a_whole_program() {
    let source = "\
local function fib(n)
  if n < 2 then return n end
  return fib(n - 1) + fib(n - 2)
end
for i = 1, 10 do print(fib(i)) end";
    assert_eq!(
        sexp(source),
        "(block \
         (local-function fib (n) (block \
         (if (< n 2) (block (return n))) \
         (return (+ (call fib (- n 1)) (call fib (- n 2)))))) \
         (for i 1 10 (block (call print (call fib i)))))"
    );
}

#[test]
fn accept_works_on_every_node_handle() {
    let chunk = parse("x = -y").expect("parse");
    let statement = &chunk.block.statements[0];
    let mut printer = SexpPrinter;

    assert_eq!(printer.visit(Node::from(&chunk)), "(block (set (x) ((- y))))");
    assert_eq!(printer.visit(Node::from(&chunk.block)), "(block (set (x) ((- y))))");
    assert_eq!(printer.visit(Node::from(statement)), "(set (x) ((- y)))");
    assert_eq!(statement.accept(&mut printer), "(set (x) ((- y)))");
}

/// Visitor with a non-string output: the deepest expression nesting.
struct Depth;

impl Depth {
    fn max(&mut self, expressions: &[Expression]) -> usize {
        expressions.iter().map(|e| e.accept(self)).max().unwrap_or(0)
    }

    fn block(&mut self, block: &Block) -> usize {
        block.accept(self)
    }
}

impl Visitor for Depth {
    type Output = usize;

    fn visit_chunk(&mut self, chunk: &Chunk) -> usize {
        chunk.block.accept(self)
    }
    fn visit_block(&mut self, block: &Block) -> usize {
        block
            .statements
            .iter()
            .map(|s| s.accept(self))
            .max()
            .unwrap_or(0)
    }
    fn visit_local_statement(&mut self, s: &LocalStatement) -> usize {
        self.max(&s.init)
    }
    fn visit_assignment_statement(&mut self, s: &AssignmentStatement) -> usize {
        self.max(&s.init)
    }
    fn visit_call_statement(&mut self, s: &CallStatement) -> usize {
        s.expression.accept(self)
    }
    fn visit_if_statement(&mut self, s: &IfStatement) -> usize {
        s.clauses
            .iter()
            .map(|c| c.condition.accept(self).max(self.block(&c.block)))
            .max()
            .unwrap_or(0)
    }
    fn visit_while_statement(&mut self, s: &WhileStatement) -> usize {
        s.condition.accept(self).max(self.block(&s.block))
    }
    fn visit_repeat_statement(&mut self, s: &RepeatStatement) -> usize {
        s.condition.accept(self).max(self.block(&s.block))
    }
    fn visit_numeric_for_statement(&mut self, s: &NumericForStatement) -> usize {
        self.block(&s.block)
    }
    fn visit_generic_for_statement(&mut self, s: &GenericForStatement) -> usize {
        self.block(&s.block)
    }
    fn visit_do_statement(&mut self, s: &DoStatement) -> usize {
        self.block(&s.block)
    }
    fn visit_return_statement(&mut self, s: &ReturnStatement) -> usize {
        self.max(&s.arguments)
    }
    fn visit_break_statement(&mut self) -> usize {
        0
    }
    fn visit_goto_statement(&mut self, _: &GotoStatement) -> usize {
        0
    }
    fn visit_label_statement(&mut self, _: &LabelStatement) -> usize {
        0
    }
    fn visit_function(&mut self, f: &FunctionDeclaration) -> usize {
        1 + self.block(&f.body)
    }
    fn visit_identifier(&mut self, _: &Identifier) -> usize {
        1
    }
    fn visit_nil_literal(&mut self, _: &Literal) -> usize {
        1
    }
    fn visit_boolean_literal(&mut self, _: &Literal, _: bool) -> usize {
        1
    }
    fn visit_numeric_literal(&mut self, _: &Literal) -> usize {
        1
    }
    fn visit_string_literal(&mut self, _: &Literal) -> usize {
        1
    }
    fn visit_vararg_literal(&mut self, _: &Literal) -> usize {
        1
    }
    fn visit_comment_literal(&mut self, _: &Literal) -> usize {
        0
    }
    fn visit_grouping(&mut self, inner: &Expression) -> usize {
        1 + inner.accept(self)
    }
    fn visit_unary(&mut self, _: UnaryOperator, argument: &Expression) -> usize {
        1 + argument.accept(self)
    }
    fn visit_binary(&mut self, _: BinaryOperator, left: &Expression, right: &Expression) -> usize {
        1 + left.accept(self).max(right.accept(self))
    }
    fn visit_index(&mut self, base: &Expression, index: &Expression) -> usize {
        1 + base.accept(self).max(index.accept(self))
    }
    fn visit_member(&mut self, base: &Expression, _: Indexer, _: &Identifier) -> usize {
        1 + base.accept(self)
    }
    fn visit_call(&mut self, base: &Expression, arguments: &CallArguments) -> usize {
        let arguments = match arguments {
            CallArguments::List(list) => self.max(list),
            CallArguments::Table(table) => self.visit_table(table),
            CallArguments::String(_) => 1,
        };
        1 + base.accept(self).max(arguments)
    }
    fn visit_table(&mut self, table: &TableConstructor) -> usize {
        use luaparse_rs::TableField;
        let deepest = table
            .fields
            .iter()
            .map(|field| match field {
                TableField::Value(value) | TableField::Named { value, .. } => value.accept(self),
                TableField::Keyed { key, value } => key.accept(self).max(value.accept(self)),
            })
            .max()
            .unwrap_or(0);
        1 + deepest
    }
}

#[test]
fn visitor_output_type_is_free() {
    let chunk = parse("x = 1\ny = (1 + (2 * 3))\nz = {{{}}}").expect("parse");
    assert_eq!(Depth.visit(Node::from(&chunk)), 5);
}

#[test]
fn comments_visit_as_literals() {
    let chunk = parse("-- note\nx = 1").expect("parse");
    let rendered: Vec<_> = chunk
        .comments
        .iter()
        .map(|c| SexpPrinter.visit(Node::from(c)))
        .collect();
    assert_eq!(rendered, ["-- note"]);
}

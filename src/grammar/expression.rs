//! Expression grammar for the Moebius language.

use once_cell::sync::Lazy;

use super::{alphanumeric_char, identifier, number, white_space, SynValue};
use crate::ast::{BinOp, Binary, Expr, Ident, Let};
use crate::parser::{
    char_class, choice, collect, end, error, expect, ignore, infix_ltr, not, parse, pratt,
    pratt_level, reference, sequence, terminal, Collector, Grammar, NamedRule, ParseReport, Sink,
};
use crate::source::{Source, Span};

fn ws() -> Grammar<SynValue> {
    ignore(white_space())
}

/// Operator token with surrounding whitespace, contributing no values.
fn op(symbol: char) -> Grammar<SynValue> {
    sequence((ws(), ignore(symbol), ws()))
}

fn tag_operand(operator: BinOp, out: &mut dyn Sink<SynValue>, value: SynValue) {
    match value {
        SynValue::Expr(expr) => out.push(SynValue::Operand(operator, expr)),
        other => out.push(other),
    }
}

fn map_add(out: &mut dyn Sink<SynValue>, value: SynValue) {
    tag_operand(BinOp::Add, out, value);
}

fn map_sub(out: &mut dyn Sink<SynValue>, value: SynValue) {
    tag_operand(BinOp::Sub, out, value);
}

fn map_mul(out: &mut dyn Sink<SynValue>, value: SynValue) {
    tag_operand(BinOp::Mul, out, value);
}

fn map_div(out: &mut dyn Sink<SynValue>, value: SynValue) {
    tag_operand(BinOp::Div, out, value);
}

/// Folds operand pushes into a left-leaning expression tree.
///
/// A plain expression push is the left operand; each tagged operand wraps
/// the tree built so far in another binary node.
#[derive(Default)]
struct ExprCollector {
    expr: Option<Expr>,
}

impl Collector<SynValue> for ExprCollector {
    fn push(&mut self, value: SynValue) {
        match value {
            SynValue::Expr(expr) => self.expr = Some(expr),
            SynValue::Operand(operator, right) => match self.expr.take() {
                Some(left) => {
                    let span = left.span().merge(&right.span());
                    self.expr = Some(Expr::Binary(Binary {
                        op: operator,
                        left: Box::new(left),
                        right: Box::new(right),
                        span,
                    }));
                }
                None => self.expr = Some(right),
            },
            SynValue::Lexeme(_) => {}
        }
    }

    fn retrieve(self, out: &mut dyn Sink<SynValue>) {
        if let Some(expr) = self.expr {
            out.push(SynValue::Expr(expr));
        }
    }
}

/// Receives, in source order: the bound name, its value, the body.
#[derive(Default)]
struct LetCollector {
    name: Option<Ident>,
    value: Option<Expr>,
    body: Option<Expr>,
    span: Span,
}

impl Collector<SynValue> for LetCollector {
    fn push(&mut self, value: SynValue) {
        let SynValue::Expr(expr) = value else { return };
        if self.name.is_none() {
            if let Expr::Ident(ident) = expr {
                self.name = Some(ident);
            }
        } else if self.value.is_none() {
            self.value = Some(expr);
        } else {
            self.body = Some(expr);
        }
    }

    fn set_location(&mut self, span: Span) {
        self.span = span;
    }

    fn retrieve(self, out: &mut dyn Sink<SynValue>) {
        if let (Some(name), Some(value), Some(body)) = (self.name, self.value, self.body) {
            out.push(SynValue::Expr(Expr::Let(Let {
                name,
                value: Box::new(value),
                body: Box::new(body),
                span: self.span,
            })));
        }
    }
}

/// group := "(" expression ")"
fn group() -> Grammar<SynValue> {
    sequence((
        ignore('('),
        ws(),
        reference::<Expression>(),
        ws(),
        expect(")"),
    ))
}

/// let := "let" !alnum identifier "=" expression ";" expression
///
/// Everything after the keyword is committed: a missing name, `=` or `;`
/// is a hard error, not a fall-through to the other primary forms.
fn let_binding() -> Grammar<SynValue> {
    collect::<LetCollector, _, _>(sequence((
        ignore("let"),
        not(char_class(alphanumeric_char)),
        ws(),
        choice((identifier(), error("expected an identifier"))),
        ws(),
        expect("="),
        ws(),
        reference::<Expression>(),
        ws(),
        expect(";"),
        ws(),
        reference::<Expression>(),
    )))
}

/// primary := group | let | number | identifier
fn primary() -> Grammar<SynValue> {
    choice((
        group(),
        let_binding(),
        number(),
        identifier(),
        error("expected an expression"),
    ))
}

/// expression := primary (("+" | "-" | "*" | "/") primary)*
///
/// with `*` and `/` binding tighter than `+` and `-`, all left-associative.
pub struct Expression;

impl NamedRule for Expression {
    type Value = SynValue;

    fn parser() -> &'static Grammar<SynValue> {
        static PARSER: Lazy<Grammar<SynValue>> = Lazy::new(|| {
            pratt::<ExprCollector, _>(vec![
                pratt_level(vec![
                    infix_ltr(map_add, op('+')),
                    infix_ltr(map_sub, op('-')),
                ]),
                pratt_level(vec![
                    infix_ltr(map_mul, op('*')),
                    infix_ltr(map_div, op('/')),
                ]),
                pratt_level(vec![terminal(primary())]),
            ])
        });
        &PARSER
    }
}

/// program := expression end-of-input
pub struct Program;

impl NamedRule for Program {
    type Value = SynValue;

    fn parser() -> &'static Grammar<SynValue> {
        static PARSER: Lazy<Grammar<SynValue>> = Lazy::new(|| {
            sequence((
                ws(),
                reference::<Expression>(),
                ws(),
                choice((end(), error("unexpected character at end of program"))),
            ))
        });
        &PARSER
    }
}

/// Parse a whole Moebius program.
pub fn parse_program(source: &Source) -> ParseReport<SynValue> {
    parse(Program::parser(), source)
}

//! The Moebius grammar.
//!
//! Rules are organized by category:
//! - this module: character classes, whitespace, comments, and the literal
//!   rules (numbers, identifiers)
//! - [`expression`]: the operator-precedence expression grammar, `let`
//!   bindings, and the `program` rule

mod expression;

pub use expression::{parse_program, Expression, Program};

use crate::ast::{BinOp, Expr, Ident, Number};
use crate::parser::{
    char_class, choice, collect, expect, not, one_or_more, repetition, sequence, to_string, Collector,
    Grammar, Semantic, Sink,
};
use crate::source::Span;

/// Value flowing through the Moebius grammar's callback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum SynValue {
    /// Raw matched text, before a collector gives it meaning.
    Lexeme(String),
    /// A finished expression node.
    Expr(Expr),
    /// A right operand carrying the operator that applies to it.
    Operand(BinOp, Expr),
}

impl Semantic for SynValue {
    fn from_byte(byte: u8) -> Self {
        SynValue::Lexeme((byte as char).to_string())
    }

    fn from_match(bytes: &[u8]) -> Self {
        SynValue::Lexeme(String::from_utf8_lossy(bytes).into_owned())
    }
}

pub(crate) fn white_space_char(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

pub(crate) fn numeric_char(byte: u8) -> bool {
    byte.is_ascii_digit()
}

pub(crate) fn alphabetic_char(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

pub(crate) fn alphanumeric_char(byte: u8) -> bool {
    alphabetic_char(byte) || numeric_char(byte)
}

/// comment := "//" (!"\n" any)* | "/*" (!"*/" any)* "*/"
///
/// An unterminated block comment commits "expected `*/`".
fn comment() -> Grammar<()> {
    choice((
        sequence((
            "//",
            repetition(sequence((not('\n'), char_class(|_| true)))),
        )),
        sequence((
            "/*",
            repetition(sequence((not("*/"), char_class(|_| true)))),
            expect("*/"),
        )),
    ))
}

/// white_space := ws* (comment ws*)*
pub(crate) fn white_space() -> Grammar<()> {
    sequence((
        repetition(char_class(white_space_char)),
        repetition(sequence((
            comment(),
            repetition(char_class(white_space_char)),
        ))),
    ))
}

#[derive(Default)]
struct NumberCollector {
    text: String,
    span: Span,
}

impl Collector<SynValue> for NumberCollector {
    fn push(&mut self, value: SynValue) {
        if let SynValue::Lexeme(text) = value {
            self.text.push_str(&text);
        }
    }

    fn set_location(&mut self, span: Span) {
        self.span = span;
    }

    fn retrieve(self, out: &mut dyn Sink<SynValue>) {
        // Base-10 fold; the grammar guarantees digits only.
        let mut value: i64 = 0;
        for byte in self.text.bytes() {
            value = value.wrapping_mul(10).wrapping_add(i64::from(byte - b'0'));
        }
        out.push(SynValue::Expr(Expr::Number(Number {
            value,
            span: self.span,
        })));
    }
}

/// number := [0-9]+
pub fn number() -> Grammar<SynValue> {
    collect::<NumberCollector, _, _>(to_string(one_or_more(char_class(numeric_char))))
}

#[derive(Default)]
struct IdentCollector {
    text: String,
    span: Span,
}

impl Collector<SynValue> for IdentCollector {
    fn push(&mut self, value: SynValue) {
        if let SynValue::Lexeme(text) = value {
            self.text.push_str(&text);
        }
    }

    fn set_location(&mut self, span: Span) {
        self.span = span;
    }

    fn retrieve(self, out: &mut dyn Sink<SynValue>) {
        out.push(SynValue::Expr(Expr::Ident(Ident {
            name: self.text,
            span: self.span,
        })));
    }
}

/// identifier := [A-Za-z_][A-Za-z0-9_]*
pub fn identifier() -> Grammar<SynValue> {
    collect::<IdentCollector, _, _>(to_string(sequence((
        char_class(alphabetic_char),
        repetition(char_class(alphanumeric_char)),
    ))))
}

//! End-to-end integer calculator built on the combinator and operator
//! engines, mirroring the classic four-function grammar.

use once_cell::sync::Lazy;

use moebius::parser::{
    choice, collect, end, error, expect, ignore, infix_ltr, one_or_more, parse, pratt,
    pratt_level, range, reference, sequence, terminal, zero_or_more, Collector, Grammar, NamedRule,
    Outcome, Semantic, Sink,
};
use moebius::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Calc {
    Digit(u8),
    Value(i64),
    Apply(Op, i64),
}

impl Semantic for Calc {
    fn from_byte(byte: u8) -> Self {
        Calc::Digit(byte)
    }

    fn from_match(_: &[u8]) -> Self {
        Calc::Value(0)
    }
}

#[derive(Default)]
struct IntCollector {
    value: i64,
}

impl Collector<Calc> for IntCollector {
    fn push(&mut self, value: Calc) {
        match value {
            Calc::Digit(byte) => self.value = self.value * 10 + i64::from(byte - b'0'),
            Calc::Value(n) => self.value = n,
            Calc::Apply(Op::Add, n) => self.value += n,
            Calc::Apply(Op::Sub, n) => self.value -= n,
            Calc::Apply(Op::Mul, n) => self.value *= n,
            Calc::Apply(Op::Div, n) => self.value /= n,
        }
    }

    fn retrieve(self, out: &mut dyn Sink<Calc>) {
        out.push(Calc::Value(self.value));
    }
}

fn tag_operand(operator: Op, out: &mut dyn Sink<Calc>, value: Calc) {
    match value {
        Calc::Value(n) => out.push(Calc::Apply(operator, n)),
        other => out.push(other),
    }
}

fn map_add(out: &mut dyn Sink<Calc>, value: Calc) {
    tag_operand(Op::Add, out, value);
}

fn map_sub(out: &mut dyn Sink<Calc>, value: Calc) {
    tag_operand(Op::Sub, out, value);
}

fn map_mul(out: &mut dyn Sink<Calc>, value: Calc) {
    tag_operand(Op::Mul, out, value);
}

fn map_div(out: &mut dyn Sink<Calc>, value: Calc) {
    tag_operand(Op::Div, out, value);
}

fn ws() -> Grammar<Calc> {
    ignore(zero_or_more::<(), _>(' '))
}

fn op(symbol: char) -> Grammar<Calc> {
    sequence((ws(), ignore(symbol), ws()))
}

fn number() -> Grammar<Calc> {
    collect::<IntCollector, _, _>(one_or_more(range(b'0', b'9')))
}

struct Expression;

impl NamedRule for Expression {
    type Value = Calc;

    fn parser() -> &'static Grammar<Calc> {
        static PARSER: Lazy<Grammar<Calc>> = Lazy::new(|| {
            pratt::<IntCollector, _>(vec![
                pratt_level(vec![
                    infix_ltr(map_add, op('+')),
                    infix_ltr(map_sub, op('-')),
                ]),
                pratt_level(vec![
                    infix_ltr(map_mul, op('*')),
                    infix_ltr(map_div, op('/')),
                ]),
                pratt_level(vec![terminal(choice((
                    number(),
                    sequence((
                        ignore('('),
                        ws(),
                        reference::<Expression>(),
                        ws(),
                        expect(")"),
                    )),
                    error("expected an expression"),
                )))]),
            ])
        });
        &PARSER
    }
}

struct Program;

impl NamedRule for Program {
    type Value = Calc;

    fn parser() -> &'static Grammar<Calc> {
        static PARSER: Lazy<Grammar<Calc>> = Lazy::new(|| {
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

fn calculate(input: &str) -> i64 {
    let source = Source::inline(input);
    let report = parse(Program::parser(), &source);
    assert_eq!(report.outcome, Outcome::Success, "input {input:?}");
    match report.value {
        Some(Calc::Value(n)) => n,
        other => panic!("expected a value for {input:?}, got {other:?}"),
    }
}

fn calculate_error(input: &str) -> (String, usize) {
    let source = Source::inline(input);
    let report = parse(Program::parser(), &source);
    assert_eq!(report.outcome, Outcome::Error, "input {input:?}");
    let diagnostic = report.diagnostic.expect("diagnostic must be set");
    (diagnostic.message, diagnostic.offset)
}

#[test]
fn addition() {
    assert_eq!(calculate("1+2"), 3);
}

#[test]
fn multiplication_then_addition() {
    assert_eq!(calculate("2*3+4"), 10);
}

#[test]
fn addition_then_multiplication() {
    assert_eq!(calculate("2+3*4"), 14);
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(calculate("(1+2)*3"), 9);
}

#[test]
fn subtraction_and_division_are_left_associative() {
    assert_eq!(calculate("10 - 2 - 3"), 5);
    assert_eq!(calculate("8/2/2"), 2);
}

#[test]
fn whitespace_around_operators_and_parens() {
    assert_eq!(calculate("  ( 12 + 3 ) * 2  "), 30);
}

#[test]
fn nested_parentheses() {
    assert_eq!(calculate("((7))"), 7);
}

#[test]
fn missing_operand_reports_expected_expression() {
    let (message, offset) = calculate_error("1+");
    assert_eq!(message, "expected an expression");
    assert_eq!(offset, 2);
}

#[test]
fn trailing_garbage_reports_unexpected_character() {
    let (message, offset) = calculate_error("1+2)");
    assert_eq!(message, "unexpected character at end of program");
    assert_eq!(offset, 3);
}

#[test]
fn empty_input_reports_expected_expression() {
    let (message, offset) = calculate_error("");
    assert_eq!(message, "expected an expression");
    assert_eq!(offset, 0);
}

#[test]
fn missing_operand_inside_parentheses() {
    let (message, offset) = calculate_error("2 * (3+)");
    assert_eq!(message, "expected an expression");
    assert_eq!(offset, 7);
}

#[test]
fn one_grammar_serves_concurrent_parses() {
    let handles: Vec<_> = [("1+2", 3), ("2*3+4", 10), ("(1+2)*3", 9)]
        .into_iter()
        .map(|(input, expected)| {
            std::thread::spawn(move || {
                assert_eq!(calculate(input), expected);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("parsing thread panicked");
    }
}

#[test]
fn unclosed_parenthesis_reports_expected_paren() {
    let (message, offset) = calculate_error("(1+2");
    assert_eq!(message, "expected `)`");
    assert_eq!(offset, 4);
}

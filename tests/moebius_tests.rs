use moebius::ast::{BinOp, Expr};
use moebius::grammar::{parse_program, SynValue};
use moebius::interpreter::{run, EvalError};
use moebius::parser::Outcome;
use moebius::source::{Source, Span};

fn parse_expr(input: &str) -> Expr {
    let source = Source::inline(input);
    let report = parse_program(&source);
    assert_eq!(report.outcome, Outcome::Success, "input {input:?}");
    match report.value {
        Some(SynValue::Expr(expr)) => expr,
        other => panic!("expected an expression for {input:?}, got {other:?}"),
    }
}

fn eval_str(input: &str) -> i64 {
    run(&parse_expr(input)).expect("evaluation failed")
}

fn parse_error(input: &str) -> (String, usize) {
    let source = Source::inline(input);
    let report = parse_program(&source);
    assert_eq!(report.outcome, Outcome::Error, "input {input:?}");
    let diagnostic = report.diagnostic.expect("diagnostic must be set");
    (diagnostic.message, diagnostic.offset)
}

#[test]
fn number_literal() {
    let expr = parse_expr("42");
    match expr {
        Expr::Number(number) => {
            assert_eq!(number.value, 42);
            assert_eq!(number.span, Span::new(0, 2));
        }
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn identifier_parses_even_with_a_let_prefix() {
    let expr = parse_expr("letter");
    match expr {
        Expr::Ident(ident) => assert_eq!(ident.name, "letter"),
        other => panic!("expected an identifier, got {other:?}"),
    }
}

#[test]
fn binary_expression_shape_and_span() {
    let expr = parse_expr("1+2");
    match expr {
        Expr::Binary(binary) => {
            assert_eq!(binary.op, BinOp::Add);
            assert_eq!(binary.span, Span::new(0, 3));
            assert!(matches!(*binary.left, Expr::Number(_)));
            assert!(matches!(*binary.right, Expr::Number(_)));
        }
        other => panic!("expected a binary node, got {other:?}"),
    }
}

#[test]
fn operators_group_to_the_left() {
    let expr = parse_expr("1-2-3");
    match expr {
        Expr::Binary(outer) => {
            assert_eq!(outer.op, BinOp::Sub);
            assert!(matches!(*outer.left, Expr::Binary(_)));
            assert!(matches!(*outer.right, Expr::Number(_)));
        }
        other => panic!("expected a binary node, got {other:?}"),
    }
    assert_eq!(eval_str("1-2-3"), -4);
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval_str("2+3*4"), 14);
    assert_eq!(eval_str("2*3+4"), 10);
    assert_eq!(eval_str("(1+2)*3"), 9);
    assert_eq!(eval_str("20/2/5"), 2);
}

#[test]
fn let_binds_a_name_for_its_body() {
    assert_eq!(eval_str("let x = 2; x * 3"), 6);
}

#[test]
fn let_bindings_nest() {
    assert_eq!(eval_str("let x = 1; let y = 2; x + y"), 3);
}

#[test]
fn inner_let_shadows_outer() {
    assert_eq!(eval_str("let x = 1; let x = 2; x"), 2);
}

#[test]
fn let_value_sees_outer_bindings() {
    assert_eq!(eval_str("let x = 1; let y = x + 1; y"), 2);
}

#[test]
fn let_can_appear_as_an_operand() {
    assert_eq!(eval_str("(let x = 2; x) + 1"), 3);
}

#[test]
fn let_node_carries_its_full_span() {
    let input = "let x = 1; x";
    let expr = parse_expr(input);
    match expr {
        Expr::Let(binding) => {
            assert_eq!(binding.name.name, "x");
            assert_eq!(binding.span, Span::new(0, input.len()));
        }
        other => panic!("expected a let node, got {other:?}"),
    }
}

#[test]
fn line_comments_are_whitespace() {
    assert_eq!(eval_str("// leading\n1 + 2 // trailing"), 3);
}

#[test]
fn block_comments_are_whitespace() {
    assert_eq!(eval_str("1 + /* two */ 2"), 3);
    assert_eq!(eval_str("/* a\n   b */ 7"), 7);
}

#[test]
fn number_folding_never_panics_on_huge_literals() {
    // folds with wrapping arithmetic instead of overflowing
    let expr = parse_expr("99999999999999999999999999");
    assert!(matches!(expr, Expr::Number(_)));
}

#[test]
fn missing_operand_is_a_committed_error() {
    let (message, offset) = parse_error("1+");
    assert_eq!(message, "expected an expression");
    assert_eq!(offset, 2);
}

#[test]
fn trailing_input_is_a_committed_error() {
    let (message, offset) = parse_error("1+2)");
    assert_eq!(message, "unexpected character at end of program");
    assert_eq!(offset, 3);
}

#[test]
fn let_without_a_name_is_a_committed_error() {
    let (message, offset) = parse_error("let 1 = 2; x");
    assert_eq!(message, "expected an identifier");
    assert_eq!(offset, 4);
}

#[test]
fn let_without_equals_is_a_committed_error() {
    let (message, offset) = parse_error("let x 2; x");
    assert_eq!(message, "expected `=`");
    assert_eq!(offset, 6);
}

#[test]
fn let_without_semicolon_is_a_committed_error() {
    let (message, offset) = parse_error("let x = 2 x");
    assert_eq!(message, "expected `;`");
    assert_eq!(offset, 10);
}

#[test]
fn unclosed_group_is_a_committed_error() {
    let (message, offset) = parse_error("(1+2");
    assert_eq!(message, "expected `)`");
    assert_eq!(offset, 4);
}

#[test]
fn unterminated_block_comment_is_a_committed_error() {
    let (message, offset) = parse_error("/* foo");
    assert_eq!(message, "expected `*/`");
    assert_eq!(offset, 6);
}

#[test]
fn undefined_name_is_an_eval_error() {
    let expr = parse_expr("x + 1");
    let error = run(&expr).expect_err("x is unbound");
    match error {
        EvalError::Undefined { name, span } => {
            assert_eq!(name, "x");
            assert_eq!(span, Span::new(0, 1));
        }
        other => panic!("expected an undefined-name error, got {other:?}"),
    }
}

#[test]
fn binding_does_not_escape_its_body() {
    let expr = parse_expr("(let x = 1; x) + x");
    let error = run(&expr).expect_err("outer x is unbound");
    assert!(matches!(error, EvalError::Undefined { .. }));
}

#[test]
fn division_by_zero_is_an_eval_error() {
    let expr = parse_expr("1/0");
    let error = run(&expr).expect_err("division by zero");
    assert!(matches!(error, EvalError::DivisionByZero { .. }));
}

//! Evaluator for Moebius expressions.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{BinOp, Expr};
use crate::source::Span;

/// Runtime failure, carrying the span of the offending node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("undefined name `{name}`")]
    Undefined { name: String, span: Span },
    #[error("division by zero")]
    DivisionByZero { span: Span },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::Undefined { span, .. } => *span,
            EvalError::DivisionByZero { span } => *span,
        }
    }
}

/// Manages lexical scoping during evaluation.
///
/// Each `let` body runs in its own frame; names resolve innermost-first.
pub struct Scope {
    frames: Vec<HashMap<String, i64>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn leave(&mut self) {
        self.frames.pop();
    }

    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .copied()
    }

    pub fn add(&mut self, name: impl Into<String>, value: i64) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

pub fn eval(expr: &Expr, scope: &mut Scope) -> Result<i64, EvalError> {
    match expr {
        Expr::Number(number) => Ok(number.value),
        Expr::Ident(ident) => scope.resolve(&ident.name).ok_or_else(|| EvalError::Undefined {
            name: ident.name.clone(),
            span: ident.span,
        }),
        Expr::Binary(binary) => {
            let left = eval(&binary.left, scope)?;
            let right = eval(&binary.right, scope)?;
            match binary.op {
                BinOp::Add => Ok(left.wrapping_add(right)),
                BinOp::Sub => Ok(left.wrapping_sub(right)),
                BinOp::Mul => Ok(left.wrapping_mul(right)),
                BinOp::Div => {
                    if right == 0 {
                        Err(EvalError::DivisionByZero { span: binary.span })
                    } else {
                        Ok(left.wrapping_div(right))
                    }
                }
            }
        }
        Expr::Let(binding) => {
            let value = eval(&binding.value, scope)?;
            scope.enter();
            scope.add(binding.name.name.clone(), value);
            let result = eval(&binding.body, scope);
            scope.leave();
            result
        }
    }
}

/// Evaluate a whole program in a fresh scope.
pub fn run(expr: &Expr) -> Result<i64, EvalError> {
    eval(expr, &mut Scope::new())
}

//! Error taxonomy. Every variant here is recovered locally and surfaced as
//! feedback; none of them aborts the process.

use std::fmt;

use thiserror::Error;

use crate::domain::GameStep;

/// Failure of the restricted arithmetic evaluator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
  #[error("unexpected character '{0}'")]
  InvalidCharacter(char),
  #[error("malformed number '{0}'")]
  InvalidNumber(String),
  #[error("expression ended unexpectedly")]
  UnexpectedEnd,
  #[error("unexpected token at position {0}")]
  UnexpectedToken(usize),
  #[error("unbalanced parentheses")]
  UnbalancedParens,
  #[error("expression nests too deeply")]
  TooDeep,
  #[error("division by zero")]
  DivisionByZero,
  #[error("result is not a finite number")]
  NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Left,
  Right,
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Side::Left => f.write_str("left"),
      Side::Right => f.write_str("right"),
    }
  }
}

/// Outcome categories of checking learner input against a known answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
  #[error("an equation needs exactly one '=' (found {found})")]
  MalformedEquation { found: usize },
  #[error("{side}-hand side is not a valid expression: {source}")]
  InvalidExpression {
    side: Side,
    #[source]
    source: EvalError,
  },
  #[error("sides differ at the answer: {lhs} vs {rhs}")]
  EquationMismatch { lhs: f64, rhs: f64 },
  #[error("answer is outside tolerance")]
  AnswerMismatch,
}

/// The problem generator could not hand back a problem.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("problem generation failed: {0}")]
pub struct GenerationFailure(pub String);

/// A learner action the state machine refused; state is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
  #[error("'{action}' is not allowed in step {step:?}")]
  NotAllowed { action: &'static str, step: GameStep },
  #[error("another request is still in flight")]
  Busy,
  #[error("input is empty")]
  EmptyInput,
  #[error("already at the first problem")]
  NoPreviousProblem,
}

//! Equation validation by substitution, and the final answer check.
//!
//! A submitted equation passes when both sides evaluate to the same value
//! with the unknown bound to the known answer. The submitted form is never
//! compared to the canonical equation text, so any equivalent arrangement
//! passes. An equation that balances by coincidence also passes; the checker
//! does not try to tell whether it models the story.

use serde::Serialize;

use crate::domain::FeedbackKind;
use crate::error::{CheckError, Side};
use crate::expr::evaluate;
use crate::locale::{self, Locale};

/// Absolute tolerance for numeric equality.
pub const TOLERANCE: f64 = 1e-3;

/// Structured result handed to the rendering layer.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CheckResult {
  pub correct: bool,
  pub feedback: String,
}

impl CheckError {
  pub fn feedback_kind(&self) -> FeedbackKind {
    match self {
      CheckError::MalformedEquation { .. } => FeedbackKind::MalformedEquation,
      CheckError::InvalidExpression { .. } => FeedbackKind::InvalidExpression,
      CheckError::EquationMismatch { .. } => FeedbackKind::EquationMismatch,
      CheckError::AnswerMismatch => FeedbackKind::AnswerMismatch,
    }
  }
}

/// Check that `input` is an equation that balances at `answer`.
pub fn check_equation(answer: f64, input: &str) -> Result<(), CheckError> {
  let found = input.matches('=').count();
  let Some((lhs, rhs)) = input.split_once('=').filter(|_| found == 1) else {
    return Err(CheckError::MalformedEquation { found });
  };

  let left = evaluate(lhs, answer)
    .map_err(|source| CheckError::InvalidExpression { side: Side::Left, source })?;
  let right = evaluate(rhs, answer)
    .map_err(|source| CheckError::InvalidExpression { side: Side::Right, source })?;

  if (left - right).abs() < TOLERANCE {
    Ok(())
  } else {
    Err(CheckError::EquationMismatch { lhs: left, rhs: right })
  }
}

/// Check a final numeric answer. Unparsable input counts as a mismatch.
pub fn check_answer(answer: f64, input: &str) -> Result<(), CheckError> {
  match input.trim().parse::<f64>() {
    Ok(v) if v.is_finite() && (v - answer).abs() < TOLERANCE => Ok(()),
    _ => Err(CheckError::AnswerMismatch),
  }
}

pub fn validate_equation(answer: f64, input: &str, locale: Locale) -> CheckResult {
  to_result(check_equation(answer, input), FeedbackKind::EquationCorrect, locale)
}

pub fn validate_answer(answer: f64, input: &str, locale: Locale) -> CheckResult {
  to_result(check_answer(answer, input), FeedbackKind::AnswerCorrect, locale)
}

fn to_result(outcome: Result<(), CheckError>, ok_kind: FeedbackKind, locale: Locale) -> CheckResult {
  match outcome {
    Ok(()) => CheckResult { correct: true, feedback: locale::text(ok_kind, locale).to_string() },
    Err(e) => CheckResult { correct: false, feedback: locale::text(e.feedback_kind(), locale).to_string() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::EvalError;

  #[test]
  fn balancing_equation_is_correct() {
    assert_eq!(check_equation(5.0, "3x-5=10"), Ok(()));
  }

  #[test]
  fn equivalent_rearrangements_pass() {
    assert_eq!(check_equation(5.0, "10 = 3x - 5"), Ok(()));
    assert_eq!(check_equation(5.0, "3x = 10 + 5"), Ok(()));
    assert_eq!(check_equation(5.0, "x*3 - 15 = 0"), Ok(()));
  }

  #[test]
  fn mismatch_is_reported_with_values() {
    assert_eq!(
      check_equation(5.0, "3x-5=11"),
      Err(CheckError::EquationMismatch { lhs: 10.0, rhs: 11.0 })
    );
  }

  #[test]
  fn missing_or_extra_equals_is_malformed() {
    assert_eq!(check_equation(5.0, "3x5"), Err(CheckError::MalformedEquation { found: 0 }));
    assert_eq!(check_equation(5.0, "3x+5=10=2"), Err(CheckError::MalformedEquation { found: 2 }));
  }

  #[test]
  fn digit_after_unknown_is_not_multiplication() {
    assert!(matches!(
      check_equation(5.0, "3x5=10"),
      Err(CheckError::InvalidExpression { side: Side::Left, source: EvalError::UnexpectedToken(_) })
    ));
  }

  #[test]
  fn invalid_side_is_reported() {
    assert_eq!(
      check_equation(5.0, "3x+5=1&0"),
      Err(CheckError::InvalidExpression { side: Side::Right, source: EvalError::InvalidCharacter('&') })
    );
    assert!(matches!(
      check_equation(5.0, "x/0=1"),
      Err(CheckError::InvalidExpression { side: Side::Left, source: EvalError::DivisionByZero })
    ));
    assert!(matches!(check_equation(5.0, "=10"), Err(CheckError::InvalidExpression { side: Side::Left, .. })));
  }

  #[test]
  fn answers_compare_within_tolerance() {
    assert_eq!(check_answer(12.0, " 12 "), Ok(()));
    assert_eq!(check_answer(12.0, "12.0004"), Ok(()));
    assert_eq!(check_answer(12.0, "12.01"), Err(CheckError::AnswerMismatch));
    assert_eq!(check_answer(12.0, "twelve"), Err(CheckError::AnswerMismatch));
    assert_eq!(check_answer(12.0, ""), Err(CheckError::AnswerMismatch));
  }

  #[test]
  fn validation_results_carry_localized_feedback() {
    let ok = validate_equation(5.0, "3x-5=10", Locale::En);
    assert!(ok.correct);
    assert_eq!(ok.feedback, locale::text(FeedbackKind::EquationCorrect, Locale::En));

    let malformed = validate_equation(5.0, "3x-5", Locale::Zh);
    let invalid = validate_equation(5.0, "3x-5=1o", Locale::Zh);
    let mismatch = validate_equation(5.0, "3x-5=11", Locale::Zh);
    assert!(!malformed.correct && !invalid.correct && !mismatch.correct);
    assert_ne!(malformed.feedback, invalid.feedback);
    assert_ne!(invalid.feedback, mismatch.feedback);

    let answer = validate_answer(7.0, "8", Locale::Zh);
    assert!(!answer.correct);
    assert_eq!(answer.feedback, locale::text(FeedbackKind::AnswerMismatch, Locale::Zh));
  }
}

//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Checking equations and answers for a stored problem
//!   - Serving hints
//!   - Asking the optional tutor, with a local fallback text

use tracing::{debug, error, instrument};

use crate::check::{validate_answer, validate_equation, CheckResult};
use crate::domain::{ChatTurn, MathProblem};
use crate::locale::{tutor_fallback, Locale, TutorFallback};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state, equation), fields(%problem_id, equation_len = equation.len()))]
pub async fn check_equation_for(state: &AppState, problem_id: &str, equation: &str, locale: Locale) -> Option<CheckResult> {
  let p = state.get_problem(problem_id).await?;
  Some(validate_equation(p.answer as f64, equation, locale))
}

#[instrument(level = "info", skip(state, answer), fields(%problem_id, answer_len = answer.len()))]
pub async fn check_answer_for(state: &AppState, problem_id: &str, answer: &str, locale: Locale) -> Option<CheckResult> {
  let p = state.get_problem(problem_id).await?;
  Some(validate_answer(p.answer as f64, answer, locale))
}

#[instrument(level = "info", skip(state), fields(%problem_id))]
pub async fn hint_for(state: &AppState, problem_id: &str) -> Option<String> {
  state.get_problem(problem_id).await.map(|p| p.hint)
}

/// Ask the tutor about `problem`. Never fails: absence or errors of the
/// tutor turn into a localized fallback text.
#[instrument(level = "info", skip(state, problem, transcript, question), fields(problem_id = %problem.id, question_len = question.len()))]
pub async fn tutor_reply(
  state: &AppState,
  problem: &MathProblem,
  transcript: &[ChatTurn],
  question: &str,
  locale: Locale,
) -> String {
  let Some(tutor) = &state.tutor else {
    debug!(target: "tutor", "Tutor reply via fallback (not configured).");
    return tutor_fallback(TutorFallback::NotConfigured, locale).into();
  };

  match tutor.explain(&state.config.prompts, problem, transcript, question).await {
    Ok(text) if !text.is_empty() => text,
    Ok(_) => tutor_fallback(TutorFallback::Empty, locale).into(),
    Err(e) => {
      error!(target: "tutor", problem_id = %problem.id, error = %trunc_for_log(&e, 200), "Tutor call failed; using fallback.");
      tutor_fallback(TutorFallback::Unreachable, locale).into()
    }
  }
}

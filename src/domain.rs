//! Domain models used by the backend: difficulty tiers, generated problems,
//! the per-problem game steps and the language-neutral feedback taxonomy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty tier requested by the learner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
  /// One arithmetic step (`ax = b`, `a + x = b`, `a - x = b`).
  #[default]
  Easy,
  /// Two steps with a base/rate structure (`ax + b = c`).
  Medium,
  /// Two-sided relations, combined rates, comparison of two plans.
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "EASY",
      Difficulty::Medium => "MEDIUM",
      Difficulty::Hard => "HARD",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Difficulty {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    Difficulty::ALL
      .into_iter()
      .find(|d| d.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown difficulty '{}'", s.to_ascii_lowercase()))
  }
}

/// A generated word problem. Immutable once created.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MathProblem {
  pub id: String,
  pub difficulty: Difficulty,
  /// Deterministic dedup key: identical signature means identical presentation.
  pub signature: String,
  pub story: String,
  pub question: String,
  pub unknown_definition: String,
  /// Canonical equation; shown as reference, never compared textually.
  pub equation: String,
  pub answer: i64,
  pub hint: String,
}

/// Ordered pedagogical steps. `Ord` follows the workflow order.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStep {
  Menu,
  Loading,
  ReadProblem,
  DefineVar,
  BuildEquation,
  Solve,
  Success,
}

impl GameStep {
  /// Steps in which a problem is on screen and the learner can act on it.
  pub fn has_problem(&self) -> bool {
    *self >= GameStep::ReadProblem
  }
}

/// Severity tag the rendering layer uses to style feedback.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Error,
  Success,
}

/// Language-neutral feedback categories. Text comes from `locale`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
  Loading,
  DefinePrompt,
  BuildPrompt,
  SolvePrompt,
  Hint,
  EquationCorrect,
  MalformedEquation,
  InvalidExpression,
  EquationMismatch,
  AnswerCorrect,
  AnswerMismatch,
  GenerationFailure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
  pub kind: FeedbackKind,
  pub severity: Severity,
  /// Free text appended to the category message (e.g. the hint itself).
  pub detail: Option<String>,
}

impl Feedback {
  pub fn info(kind: FeedbackKind) -> Self {
    Self { kind, severity: Severity::Info, detail: None }
  }

  pub fn error(kind: FeedbackKind) -> Self {
    Self { kind, severity: Severity::Error, detail: None }
  }

  pub fn success(kind: FeedbackKind) -> Self {
    Self { kind, severity: Severity::Success, detail: None }
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }
}

/// Who said what in a tutoring conversation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
  User,
  Model,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
  pub role: ChatRole,
  pub text: String,
}

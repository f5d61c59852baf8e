//! Problem generator: template selection, rendering and deduplication.
//!
//! The generator never mutates caller state. The caller records the returned
//! signature in its own seen set.

use std::collections::HashSet;

use rand::RngCore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Difficulty, MathProblem};
use crate::templates::Template;

pub const DEFAULT_RETRY_BUDGET: usize = 50;

/// Generate a problem whose signature is not in `seen`, using the thread RNG.
#[cfg(test)]
pub fn generate(difficulty: Difficulty, seen: &HashSet<String>) -> MathProblem {
  generate_with(difficulty, seen, DEFAULT_RETRY_BUDGET, &mut rand::thread_rng())
}

/// Draw up to `retry_budget` times and return the first unseen draw. When the
/// budget runs out the last draw is returned anyway, duplicate or not.
pub fn generate_with(
  difficulty: Difficulty,
  seen: &HashSet<String>,
  retry_budget: usize,
  rng: &mut dyn RngCore,
) -> MathProblem {
  let budget = retry_budget.max(1);
  let mut draw = Template::sample(difficulty, rng);
  let mut signature = draw.signature();
  let mut attempts = 1;

  while seen.contains(&signature) && attempts < budget {
    draw = Template::sample(difficulty, rng);
    signature = draw.signature();
    attempts += 1;
  }

  if seen.contains(&signature) {
    warn!(target: "problem", %difficulty, attempts, template = draw.kind().name(), "Retry budget exhausted; returning a duplicate");
  } else {
    debug!(target: "problem", %difficulty, attempts, template = draw.kind().name(), "Generated unique problem");
  }

  build_problem(&draw, signature)
}

fn build_problem(draw: &Template, signature: String) -> MathProblem {
  let r = draw.render();
  MathProblem {
    id: Uuid::new_v4().to_string(),
    difficulty: draw.difficulty(),
    signature,
    story: r.story,
    question: r.question,
    unknown_definition: r.unknown_definition,
    equation: r.equation,
    answer: draw.answer(),
    hint: r.hint,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::check::check_equation;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn generated_problems_are_consistent() {
    let seen = HashSet::new();
    let mut rng = StdRng::seed_from_u64(1);
    for difficulty in Difficulty::ALL {
      for _ in 0..1000 {
        let p = generate_with(difficulty, &seen, DEFAULT_RETRY_BUDGET, &mut rng);
        assert_eq!(p.difficulty, difficulty);
        assert!(check_equation(p.answer as f64, &p.equation).is_ok(), "{:?}", p);
        assert!(p.signature.starts_with(difficulty.as_str()));
        assert!(!p.story.is_empty() && !p.question.is_empty() && !p.hint.is_empty());
      }
    }
  }

  #[test]
  fn growing_seen_set_yields_new_signatures() {
    for difficulty in Difficulty::ALL {
      let mut seen = HashSet::new();
      for _ in 0..300 {
        let p = generate(difficulty, &seen);
        assert!(seen.insert(p.signature.clone()), "duplicate signature {}", p.signature);
      }
    }
  }

  #[test]
  fn exhausted_budget_falls_back_to_last_draw() {
    let first = generate_with(Difficulty::Hard, &HashSet::new(), 1, &mut StdRng::seed_from_u64(99));
    let seen: HashSet<String> = [first.signature.clone()].into_iter().collect();

    let again = generate_with(Difficulty::Hard, &seen, 1, &mut StdRng::seed_from_u64(99));
    assert_eq!(again.signature, first.signature);
    assert_eq!(again.equation, first.equation);
    assert_ne!(again.id, first.id);
  }

  #[test]
  fn zero_budget_still_returns_a_problem() {
    let p = generate_with(Difficulty::Easy, &HashSet::new(), 0, &mut StdRng::seed_from_u64(5));
    assert!(p.answer > 0);
  }

  #[test]
  fn caller_state_is_not_mutated() {
    let seen: HashSet<String> = ["EASY:nothing".to_string()].into_iter().collect();
    let before = seen.clone();
    let _ = generate(Difficulty::Easy, &seen);
    assert_eq!(seen, before);
  }
}

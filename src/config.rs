//! Loading game configuration (tuning knobs + tutor prompts) from TOML.
//!
//! See `AppConfig` for the expected schema. Every field has a default, so an
//! empty or partial file is valid.

use serde::Deserialize;
use tracing::{error, info};

use crate::generator::DEFAULT_RETRY_BUDGET;
use crate::locale::Locale;

pub const DEFAULT_STORE_CAPACITY: usize = 1024;

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct AppConfig {
  #[serde(default)]
  pub game: GameConfig,
  #[serde(default)]
  pub tutor: TutorConfig,
  #[serde(default)]
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
  /// Generator attempts before a duplicate is accepted.
  pub retry_budget: usize,
  /// Delay between a correct equation and the SOLVE step.
  pub advance_delay_ms: u64,
  pub default_locale: Locale,
  /// Most problems kept for stateless HTTP lookups; oldest are dropped first.
  pub store_capacity: usize,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      retry_budget: DEFAULT_RETRY_BUDGET,
      advance_delay_ms: 1000,
      default_locale: Locale::Zh,
      store_capacity: DEFAULT_STORE_CAPACITY,
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TutorConfig {
  pub timeout_secs: u64,
  pub temperature: f32,
  pub max_tokens: u32,
}

impl Default for TutorConfig {
  fn default() -> Self {
    Self { timeout_secs: 20, temperature: 0.7, max_tokens: 1000 }
  }
}

/// Prompts used by the tutor client. Defaults target primary-school learners.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Prompts {
  /// Placeholders: {story} {question} {equation} {answer}
  pub tutor_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      tutor_system: "你是一位友善、耐心的小学数学辅导老师。\n当前题目：{story}\n问题：{question}\n方程：{equation}\n答案：{answer}\n请循循善诱，不要直接给答案。回复简短（3-5句）。".into(),
    }
  }
}

/// Parse a TOML document into `AppConfig`.
pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from GAME_CONFIG_PATH. On any parsing/IO error,
/// or when the variable is unset, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "equation_adventure", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "equation_adventure", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "equation_adventure", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_uses_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.game.retry_budget, 50);
    assert_eq!(cfg.game.advance_delay_ms, 1000);
    assert_eq!(cfg.tutor.timeout_secs, 20);
    assert_eq!(cfg.game.store_capacity, DEFAULT_STORE_CAPACITY);
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg = parse_config(
      r#"
      [game]
      advance_delay_ms = 250
      default_locale = "en"
      store_capacity = 8

      [prompts]
      tutor_system = "Explain {question}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.game.advance_delay_ms, 250);
    assert_eq!(cfg.game.store_capacity, 8);
    assert_eq!(cfg.game.retry_budget, 50);
    assert_eq!(cfg.game.default_locale, Locale::En);
    assert_eq!(cfg.prompts.tutor_system, "Explain {question}");
    assert_eq!(cfg.tutor, TutorConfig::default());
  }

  #[test]
  fn bad_types_are_rejected() {
    assert!(parse_config("[game]\nretry_budget = \"many\"").is_err());
  }
}

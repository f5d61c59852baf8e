//! Feedback text lookup keyed by category and locale.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Feedback, FeedbackKind};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  #[default]
  Zh,
  En,
}

impl FromStr for Locale {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "zh" | "zh-cn" | "cn" => Ok(Locale::Zh),
      "en" | "en-us" | "en-gb" => Ok(Locale::En),
      other => Err(format!("unsupported locale '{}'", other)),
    }
  }
}

pub fn text(kind: FeedbackKind, locale: Locale) -> &'static str {
  use FeedbackKind::*;
  match locale {
    Locale::Zh => match kind {
      Loading => "正在寻找有趣的数学挑战...",
      DefinePrompt => "非常好！既然设定了未知数 x，那就要找出题目中的【等量关系】。",
      BuildPrompt => "根据题目中的数量关系，列出一个方程。",
      SolvePrompt => "现在，请计算出 x 等于多少。",
      Hint => "💡 提示",
      EquationCorrect => "太棒了！这个方程准确描述了题目中的关系！",
      MalformedEquation => "方程必须包含一个等号 '='。",
      InvalidExpression => "方程包含无法识别的字符。",
      EquationMismatch => "方程好像不太对。请检查题目中的固定数值和变化数值是否都用上了？",
      AnswerCorrect => "答案正确！",
      AnswerMismatch => "答案不太对，请再算一下。",
      GenerationFailure => "出题失败了，请稍后再试。",
    },
    Locale::En => match kind {
      Loading => "Looking for a fun math challenge...",
      DefinePrompt => "Great! With the unknown x defined, find the equal quantities in the story.",
      BuildPrompt => "Write an equation from the relationships in the story.",
      SolvePrompt => "Now work out what x equals.",
      Hint => "💡 Hint",
      EquationCorrect => "Excellent! This equation captures the relationship in the problem!",
      MalformedEquation => "An equation must have exactly one '=' sign.",
      InvalidExpression => "The equation contains invalid characters.",
      EquationMismatch => "The equation doesn't look right. Did you use both the fixed and the changing quantities?",
      AnswerCorrect => "Correct answer!",
      AnswerMismatch => "Not quite. Please check your arithmetic.",
      GenerationFailure => "Could not create a problem. Please try again.",
    },
  }
}

/// Render a feedback value, appending its detail when present.
pub fn render(feedback: &Feedback, locale: Locale) -> String {
  let base = text(feedback.kind, locale);
  match &feedback.detail {
    Some(detail) if !detail.is_empty() => format!("{}: {}", base, detail),
    _ => base.to_string(),
  }
}

/// Why the tutor could not answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorFallback {
  NotConfigured,
  Unreachable,
  Empty,
}

pub fn tutor_fallback(reason: TutorFallback, locale: Locale) -> &'static str {
  match (reason, locale) {
    (TutorFallback::NotConfigured, Locale::Zh) => "AI 老师还没有配置，先试试提示按钮吧。",
    (TutorFallback::NotConfigured, Locale::En) => "The AI tutor is not configured. Try the hint button instead.",
    (TutorFallback::Unreachable, Locale::Zh) => "网络有点卡，AI 老师暂时听不见。",
    (TutorFallback::Unreachable, Locale::En) => "The network is slow, the AI tutor can't hear you right now.",
    (TutorFallback::Empty, Locale::Zh) => "抱歉，我走神了。",
    (TutorFallback::Empty, Locale::En) => "Sorry, I lost my train of thought.",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hint_detail_is_appended() {
    let fb = Feedback::info(FeedbackKind::Hint).with_detail("数量 × 单价 = 总金额");
    assert_eq!(render(&fb, Locale::Zh), "💡 提示: 数量 × 单价 = 总金额");
  }

  #[test]
  fn categories_have_distinct_failure_messages() {
    for locale in [Locale::Zh, Locale::En] {
      let malformed = text(FeedbackKind::MalformedEquation, locale);
      let invalid = text(FeedbackKind::InvalidExpression, locale);
      let mismatch = text(FeedbackKind::EquationMismatch, locale);
      assert_ne!(malformed, invalid);
      assert_ne!(invalid, mismatch);
      assert_ne!(malformed, mismatch);
    }
  }

  #[test]
  fn locale_parsing() {
    assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
    assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::Zh));
    assert!("fr".parse::<Locale>().is_err());
  }
}

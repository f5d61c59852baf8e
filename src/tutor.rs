//! Minimal client for the optional AI tutor.
//!
//! Talks to any OpenAI-compatible chat.completions endpoint (DeepSeek by
//! default) and only ever asks for plain text. Calls are instrumented and log
//! the model, latency and response size, never contents or the API key.
//! Nothing in generation, validation or progression depends on this module.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::{Prompts, TutorConfig};
use crate::domain::{ChatRole, ChatTurn, MathProblem};
use crate::util::fill_template;

#[derive(Clone)]
pub struct Tutor {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
}

impl Tutor {
  /// Construct the client if TUTOR_API_KEY is set; otherwise return None.
  pub fn from_env(cfg: &TutorConfig) -> Option<Self> {
    let api_key = std::env::var("TUTOR_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("TUTOR_BASE_URL").unwrap_or_else(|_| "https://api.deepseek.com/v1".into());
    let model = std::env::var("TUTOR_MODEL").unwrap_or_else(|_| "deepseek-chat".into());
    Self::new(cfg, api_key, base_url, model)
  }

  pub fn new(cfg: &TutorConfig, api_key: String, base_url: String, model: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
      .build()
      .ok()?;

    Some(Self {
      client,
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      model,
      temperature: cfg.temperature,
      max_tokens: cfg.max_tokens,
    })
  }

  /// Answer a learner question about `problem`, given the running transcript.
  #[instrument(level = "info", skip_all, fields(problem_id = %problem.id, turns = transcript.len(), question_len = question.len()))]
  pub async fn explain(
    &self,
    prompts: &Prompts,
    problem: &MathProblem,
    transcript: &[ChatTurn],
    question: &str,
  ) -> Result<String, String> {
    let messages = build_messages(prompts, problem, transcript, question);
    let start = std::time::Instant::now();
    let text = self.chat(messages).await?;
    info!(target: "tutor", elapsed = ?start.elapsed(), reply_len = text.len(), "Tutor reply received");
    Ok(text)
  }

  #[instrument(level = "info", skip(self, messages), fields(model = %self.model, messages = messages.len()))]
  async fn chat(&self, messages: Vec<ChatMessageReq>) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages,
      temperature: self.temperature,
      max_tokens: Some(self.max_tokens),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "equation-adventure/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(format!("Tutor HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(target: "tutor", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Tutor usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }
}

/// System prompt with the problem embedded, then the transcript, then the question.
fn build_messages(prompts: &Prompts, problem: &MathProblem, transcript: &[ChatTurn], question: &str) -> Vec<ChatMessageReq> {
  let answer = problem.answer.to_string();
  let system = fill_template(
    &prompts.tutor_system,
    &[
      ("story", problem.story.as_str()),
      ("question", problem.question.as_str()),
      ("equation", problem.equation.as_str()),
      ("answer", answer.as_str()),
    ],
  );

  let mut messages = Vec::with_capacity(transcript.len() + 2);
  messages.push(ChatMessageReq { role: "system".into(), content: system });
  for turn in transcript {
    let role = match turn.role {
      ChatRole::User => "user",
      ChatRole::Model => "assistant",
    };
    messages.push(ChatMessageReq { role: role.into(), content: turn.text.clone() });
  }
  messages.push(ChatMessageReq { role: "user".into(), content: question.into() });
  messages
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize, Debug, PartialEq)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

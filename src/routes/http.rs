//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs ids and input lengths, never contents.
//!
//! The HTTP surface is stateless: problems are fetched by id from the shared
//! store and no session progression happens here.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{info, instrument};

use crate::domain::Difficulty;
use crate::locale::Locale;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

fn not_found(problem_id: &str) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: format!("unknown problem '{}'", problem_id) })).into_response()
}

fn locale_or_default(state: &AppState, requested: Option<&str>) -> Locale {
  requested.and_then(|l| l.parse().ok()).unwrap_or(state.config.game.default_locale)
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(difficulty = ?q.difficulty))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemQuery>,
) -> Response {
  let difficulty = match q.difficulty.as_deref().map(str::parse::<Difficulty>).transpose() {
    Ok(d) => d.unwrap_or_default(),
    Err(e) => return (StatusCode::BAD_REQUEST, Json(ErrorOut { error: e })).into_response(),
  };

  // Stateless callers get no deduplication.
  match state.generate_problem(difficulty, Default::default()).await {
    Ok(p) => {
      info!(target: "problem", %difficulty, id = %p.id, "HTTP problem served");
      let out = to_out(&p);
      state.remember(p).await;
      Json(out).into_response()
    }
    Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: e.to_string() })).into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, equation_len = body.equation.len()))]
pub async fn http_post_equation(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EquationIn>,
) -> Response {
  let locale = locale_or_default(&state, body.locale.as_deref());
  match check_equation_for(&state, &body.problem_id, &body.equation, locale).await {
    Some(result) => {
      info!(target: "problem", id = %body.problem_id, correct = result.correct, "HTTP equation checked");
      Json(result).into_response()
    }
    None => not_found(&body.problem_id),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Response {
  let locale = locale_or_default(&state, body.locale.as_deref());
  match check_answer_for(&state, &body.problem_id, &body.answer, locale).await {
    Some(result) => {
      info!(target: "problem", id = %body.problem_id, correct = result.correct, "HTTP answer checked");
      Json(result).into_response()
    }
    None => not_found(&body.problem_id),
  }
}

#[instrument(level = "info", skip(state), fields(%q.problem_id))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintQuery>,
) -> Response {
  match hint_for(&state, &q.problem_id).await {
    Some(text) => {
      info!(target: "problem", id = %q.problem_id, "HTTP hint served");
      Json(HintOut { text }).into_response()
    }
    None => not_found(&q.problem_id),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.problem_id, text_len = body.text.len(), turns = body.history.len()))]
pub async fn http_post_tutor(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TutorIn>,
) -> Response {
  let Some(problem) = state.get_problem(&body.problem_id).await else {
    return not_found(&body.problem_id);
  };
  let locale = locale_or_default(&state, body.locale.as_deref());
  let text = tutor_reply(&state, &problem, &body.history, &body.text, locale).await;
  Json(TutorOut { text }).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::locale::{tutor_fallback, TutorFallback};
  use crate::routes::build_router;
  use axum::body::{to_bytes, Body};
  use axum::http::{header, Method, Request};
  use serde_json::{json, Value};
  use tower::ServiceExt;

  fn state() -> Arc<AppState> {
    Arc::new(AppState::with_config(AppConfig::default(), None))
  }

  async fn call(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let res = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
      .method(Method::POST)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  #[tokio::test]
  async fn health_is_ok() {
    let (status, body) = call(&state(), get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
  }

  #[tokio::test]
  async fn served_problem_hides_solution_and_can_be_checked() {
    let state = state();
    let (status, body) = call(&state, get("/api/v1/problem?difficulty=medium")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["difficulty"], "MEDIUM");
    assert!(body.get("equation").is_none() && body.get("answer").is_none());

    let id = body["id"].as_str().unwrap().to_string();
    let stored = state.get_problem(&id).await.unwrap();

    let (_, eq) = call(&state, post("/api/v1/equation", json!({"problemId": id, "equation": stored.equation}))).await;
    assert_eq!(eq["correct"], true);

    let wrong = (stored.answer + 1).to_string();
    let (_, ans) = call(&state, post("/api/v1/answer", json!({"problemId": id, "answer": wrong, "locale": "en"}))).await;
    assert_eq!(ans["correct"], false);

    let (_, hint) = call(&state, get(&format!("/api/v1/hint?problemId={}", id))).await;
    assert_eq!(hint["text"], stored.hint);
  }

  #[tokio::test]
  async fn bad_difficulty_is_rejected() {
    let (status, body) = call(&state(), get("/api/v1/problem?difficulty=extreme")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn unknown_problem_is_not_found() {
    let state = state();
    let (status, _) = call(&state, post("/api/v1/answer", json!({"problemId": "missing", "answer": "1"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&state, get("/api/v1/hint?problemId=missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn tutor_without_key_uses_fallback() {
    let state = state();
    let (_, body) = call(&state, get("/api/v1/problem")).await;
    let id = body["id"].as_str().unwrap();
    let (status, reply) = call(&state, post("/api/v1/tutor", json!({"problemId": id, "text": "help", "locale": "en"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["text"], tutor_fallback(TutorFallback::NotConfigured, Locale::En));
  }
}

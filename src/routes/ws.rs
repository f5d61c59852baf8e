//! WebSocket upgrade + per-connection game loop.
//!
//! Each connection owns exactly one `GameSession`. Client messages are parsed as
//! JSON and applied to the session; every accepted action answers with a full
//! `state` snapshot. Slow work (generation, tutor calls, the delayed advance to
//! SOLVE) runs in spawned tasks that report back through an event channel, so
//! the loop keeps reading the socket meanwhile.

use std::{sync::Arc, time::Duration};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::check::check_equation;
use crate::domain::{ChatRole, ChatTurn, Difficulty, MathProblem};
use crate::error::{ActionError, GenerationFailure};
use crate::locale::Locale;
use crate::logic::tutor_reply;
use crate::protocol::{view_of, ClientWsMessage, ServerWsMessage};
use crate::session::{AnswerOutcome, GameSession, GenerationTicket, NextOutcome, ScheduledAdvance};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "equation_adventure", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(conn = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "equation_adventure", "WebSocket connected");
  let (mut conn, mut events) = Connection::new(state);

  'conn: loop {
    let replies = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => conn.handle_text(&txt),
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Err(e)) => {
          warn!(target: "equation_adventure", error = %e, "WS receive error");
          break;
        }
        Some(Ok(_)) => continue,
      },
      Some(event) = events.recv() => conn.on_event(event),
    };

    for reply in replies {
      let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
      });
      if let Err(e) = socket.send(Message::Text(out)).await {
        error!(target: "equation_adventure", error = %e, "WS send error");
        break 'conn;
      }
    }
  }

  conn.shutdown();
  info!(target: "equation_adventure", "WebSocket disconnected");
}

/// Results of spawned work, fed back into the connection loop.
#[derive(Debug)]
pub enum Event {
  Generated(GenerationTicket, Result<MathProblem, GenerationFailure>),
  AdvanceDue(ScheduledAdvance),
  TutorReplied { epoch: u64, question: String, reply: String },
}

/// One learner's game: the session plus its locale, tutor transcript and
/// pending timer.
pub struct Connection {
  state: Arc<AppState>,
  session: GameSession,
  locale: Locale,
  transcript: Vec<ChatTurn>,
  /// Bumped whenever the active problem changes.
  epoch: u64,
  advance_task: Option<JoinHandle<()>>,
  /// At most one tutor call per connection at a time.
  tutor_pending: bool,
  events: mpsc::UnboundedSender<Event>,
}

impl Connection {
  pub fn new(state: Arc<AppState>) -> (Self, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let locale = state.config.game.default_locale;
    let conn = Self {
      state,
      session: GameSession::new(),
      locale,
      transcript: Vec::new(),
      epoch: 0,
      advance_task: None,
      tutor_pending: false,
      events: tx,
    };
    (conn, rx)
  }

  pub fn handle_text(&mut self, txt: &str) -> Vec<ServerWsMessage> {
    match serde_json::from_str::<ClientWsMessage>(txt) {
      Ok(msg) => {
        debug!(target: "session", "WS received: {:?}", &msg);
        self.handle(msg)
      }
      Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
    }
  }

  /// Apply one client message. Rejected actions leave the session untouched
  /// and answer with an `error` message.
  pub fn handle(&mut self, msg: ClientWsMessage) -> Vec<ServerWsMessage> {
    let before = self.active_problem_id();
    let out = match self.apply(msg) {
      Ok(replies) => replies,
      Err(e) => {
        debug!(target: "session", error = %e, step = ?self.session.step(), "Action rejected");
        vec![ServerWsMessage::Error { message: e.to_string() }]
      }
    };
    if self.active_problem_id() != before {
      self.on_problem_change();
    }
    out
  }

  fn apply(&mut self, msg: ClientWsMessage) -> Result<Vec<ServerWsMessage>, ActionError> {
    match msg {
      ClientWsMessage::Ping => return Ok(vec![ServerWsMessage::Pong]),

      ClientWsMessage::SelectDifficulty { difficulty } => {
        let difficulty: Difficulty = match difficulty.parse() {
          Ok(d) => d,
          Err(message) => return Ok(vec![ServerWsMessage::Error { message }]),
        };
        let ticket = self.session.select_difficulty(difficulty)?;
        self.spawn_generation(ticket);
      }

      ClientWsMessage::ReadDone => self.session.read_done()?,
      ClientWsMessage::ConfirmDefinition => self.session.confirm_definition()?,

      ClientWsMessage::SubmitEquation { text } => {
        let ticket = self.session.begin_equation_check(&text)?;
        let result = check_equation(ticket.answer as f64, &ticket.equation);
        info!(target: "session", equation_len = text.len(), correct = result.is_ok(), "Equation submitted");
        if let Some(advance) = self.session.finish_equation_check(&ticket, result) {
          self.schedule_advance(advance);
        }
      }

      ClientWsMessage::SubmitAnswer { text } => {
        let outcome = self.session.submit_answer(&text)?;
        info!(target: "session", answer_len = text.len(), ?outcome, "Answer submitted");
        if outcome == AnswerOutcome::Solved {
          return Ok(vec![self.snapshot(), ServerWsMessage::Celebrate]);
        }
      }

      ClientWsMessage::Hint => self.session.request_hint()?,

      ClientWsMessage::NextProblem => {
        if let NextOutcome::Generate(ticket) = self.session.next_problem()? {
          self.spawn_generation(ticket);
        }
      }

      ClientWsMessage::PreviousProblem => self.session.previous_problem()?,
      ClientWsMessage::GoHome => self.session.go_home(),

      ClientWsMessage::SetLocale { locale } => match locale.parse() {
        Ok(l) => self.locale = l,
        Err(message) => return Ok(vec![ServerWsMessage::Error { message }]),
      },

      ClientWsMessage::TutorMessage { text } => {
        let problem = self
          .session
          .current_problem()
          .filter(|_| self.session.step().has_problem())
          .cloned()
          .ok_or(ActionError::NotAllowed { action: "tutor_message", step: self.session.step() })?;
        if self.tutor_pending {
          return Err(ActionError::Busy);
        }
        if text.trim().is_empty() {
          return Err(ActionError::EmptyInput);
        }
        self.spawn_tutor(problem, text);
        return Ok(Vec::new());
      }
    }
    Ok(vec![self.snapshot()])
  }

  /// Apply the result of spawned work. Stale results produce no output.
  pub fn on_event(&mut self, event: Event) -> Vec<ServerWsMessage> {
    let before = self.active_problem_id();
    let out = match event {
      Event::Generated(ticket, result) => {
        if self.session.complete_generation(&ticket, result) {
          vec![self.snapshot()]
        } else {
          Vec::new()
        }
      }
      Event::AdvanceDue(advance) => {
        self.advance_task = None;
        if self.session.advance_elapsed(advance) {
          vec![self.snapshot()]
        } else {
          Vec::new()
        }
      }
      Event::TutorReplied { epoch, question, reply } => {
        self.tutor_pending = false;
        if epoch != self.epoch {
          debug!(target: "tutor", "Dropping tutor reply for a previous problem");
          return Vec::new();
        }
        self.transcript.push(ChatTurn { role: ChatRole::User, text: question });
        self.transcript.push(ChatTurn { role: ChatRole::Model, text: reply.clone() });
        vec![ServerWsMessage::TutorReply { text: reply }]
      }
    };
    if self.active_problem_id() != before {
      self.on_problem_change();
    }
    out
  }

  pub fn shutdown(&mut self) {
    if let Some(task) = self.advance_task.take() {
      task.abort();
    }
  }

  fn snapshot(&self) -> ServerWsMessage {
    ServerWsMessage::State { view: view_of(&self.session, self.locale) }
  }

  fn active_problem_id(&self) -> Option<String> {
    self.session
      .current_problem()
      .filter(|_| self.session.step().has_problem())
      .map(|p| p.id.clone())
  }

  fn on_problem_change(&mut self) {
    self.shutdown();
    self.transcript.clear();
    self.epoch += 1;
  }

  fn spawn_generation(&self, ticket: GenerationTicket) {
    let state = self.state.clone();
    let seen = self.session.seen_signatures().clone();
    let tx = self.events.clone();
    tokio::spawn(async move {
      let result = state.generate_problem(ticket.difficulty, seen).await;
      let _ = tx.send(Event::Generated(ticket, result));
    });
  }

  fn schedule_advance(&mut self, advance: ScheduledAdvance) {
    self.shutdown();
    let delay = Duration::from_millis(self.state.config.game.advance_delay_ms);
    let tx = self.events.clone();
    self.advance_task = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send(Event::AdvanceDue(advance));
    }));
  }

  fn spawn_tutor(&mut self, problem: MathProblem, question: String) {
    let state = self.state.clone();
    let transcript = self.transcript.clone();
    let (epoch, locale) = (self.epoch, self.locale);
    let tx = self.events.clone();
    self.tutor_pending = true;
    info!(target: "tutor", problem_id = %problem.id, question_len = question.len(), turns = transcript.len(), "Tutor question");
    tokio::spawn(async move {
      let reply = tutor_reply(&state, &problem, &transcript, &question, locale).await;
      let _ = tx.send(Event::TutorReplied { epoch, question, reply });
    });
  }
}

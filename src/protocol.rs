//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatTurn, Difficulty, FeedbackKind, GameStep, MathProblem, Severity};
use crate::locale::{render, Locale};
use crate::session::GameSession;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    SelectDifficulty {
        difficulty: String,
    },
    ReadDone,
    ConfirmDefinition,
    SubmitEquation {
        text: String,
    },
    SubmitAnswer {
        text: String,
    },
    Hint,
    NextProblem,
    PreviousProblem,
    GoHome,
    SetLocale {
        locale: String,
    },
    TutorMessage {
        text: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        view: SessionView,
    },
    Celebrate,
    TutorReply {
        text: String,
    },
    Error {
        message: String,
    },
}

/// Snapshot of one session as the rendering layer sees it.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub step: GameStep,
    pub difficulty: Difficulty,
    pub problem: Option<ProblemOut>,
    /// 1-based position in history.
    pub position: Option<usize>,
    pub history_len: usize,
    pub can_go_previous: bool,
    pub loading: bool,
    pub equation_input: String,
    pub answer_input: String,
    pub feedback: Option<FeedbackOut>,
}

/// Problem DTO. Fields the learner has not reached yet are left out.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOut {
    pub id: String,
    pub difficulty: Difficulty,
    pub story: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeedbackOut {
    pub kind: FeedbackKind,
    pub severity: Severity,
    pub text: String,
}

/// Reveal the parts of `p` that belong to `step`.
pub fn problem_out(p: &MathProblem, step: GameStep) -> ProblemOut {
    ProblemOut {
        id: p.id.clone(),
        difficulty: p.difficulty,
        story: p.story.clone(),
        question: p.question.clone(),
        unknown_definition: (step >= GameStep::DefineVar).then(|| p.unknown_definition.clone()),
        equation: (step >= GameStep::Solve).then(|| p.equation.clone()),
        answer: (step == GameStep::Success).then_some(p.answer),
    }
}

/// Public DTO for stateless HTTP delivery: story material only.
pub fn to_out(p: &MathProblem) -> ProblemOut {
    ProblemOut {
        unknown_definition: Some(p.unknown_definition.clone()),
        ..problem_out(p, GameStep::ReadProblem)
    }
}

pub fn view_of(session: &GameSession, locale: Locale) -> SessionView {
    let step = session.step();
    SessionView {
        step,
        difficulty: session.difficulty(),
        problem: session
            .current_problem()
            .filter(|_| step.has_problem())
            .map(|p| problem_out(p, step)),
        position: session.cursor().map(|c| c + 1),
        history_len: session.history().len(),
        can_go_previous: session.can_go_previous(),
        loading: session.loading(),
        equation_input: session.equation_input().to_string(),
        answer_input: session.answer_input().to_string(),
        feedback: session.feedback().map(|f| FeedbackOut {
            kind: f.kind,
            severity: f.severity,
            text: render(f, locale),
        }),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ProblemQuery {
    pub difficulty: Option<String>,
}

#[derive(Deserialize)]
pub struct EquationIn {
    #[serde(rename = "problemId")]
    pub problem_id: String,
    pub equation: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "problemId")]
    pub problem_id: String,
    pub answer: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    #[serde(rename = "problemId")]
    pub problem_id: String,
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Deserialize)]
pub struct TutorIn {
    #[serde(rename = "problemId")]
    pub problem_id: String,
    pub text: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub locale: Option<String>,
}
#[derive(Serialize)]
pub struct TutorOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

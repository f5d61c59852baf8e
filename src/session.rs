//! Game progression state machine for one learner session.
//!
//! MENU -> LOADING -> READ_PROBLEM -> DEFINE_VAR -> BUILD_EQUATION -> SOLVE -> SUCCESS
//!
//! The session owns the problem history, the cursor into it and the set of
//! seen signatures. Slow work (generation, equation checks) is split into a
//! `begin_*` call that hands out a ticket and a `complete_*`/`finish_*` call
//! that applies the result. Every step change bumps a token; a ticket or a
//! scheduled advance whose token is no longer current is ignored.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::check::check_answer;
use crate::domain::{Difficulty, Feedback, FeedbackKind, GameStep, MathProblem};
use crate::error::{ActionError, CheckError, GenerationFailure};

/// Identifies the step context a deferred result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepToken(u64);

/// Handed out when a generation starts; pass it back with the result.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationTicket {
    pub token: StepToken,
    pub difficulty: Difficulty,
}

/// Handed out when an equation check starts.
#[derive(Clone, Debug, PartialEq)]
pub struct EquationTicket {
    pub token: StepToken,
    pub answer: i64,
    pub equation: String,
}

/// The delayed BUILD_EQUATION -> SOLVE transition, to be fired later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub token: StepToken,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NextOutcome {
    /// At the end of history: a new problem must be generated.
    Generate(GenerationTicket),
    /// Moved forward to a problem already in history.
    Revisited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Solved,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InFlight {
    Generation,
    EquationCheck,
}

#[derive(Debug)]
pub struct GameSession {
    step: GameStep,
    difficulty: Difficulty,
    history: Vec<MathProblem>,
    cursor: Option<usize>,
    seen: HashSet<String>,
    equation_input: String,
    answer_input: String,
    feedback: Option<Feedback>,
    in_flight: Option<InFlight>,
    pending_advance: bool,
    token: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            step: GameStep::Menu,
            difficulty: Difficulty::Easy,
            history: Vec::new(),
            cursor: None,
            seen: HashSet::new(),
            equation_input: String::new(),
            answer_input: String::new(),
            feedback: None,
            in_flight: None,
            pending_advance: false,
            token: 0,
        }
    }

    // -------- read access for the rendering layer --------

    pub fn step(&self) -> GameStep {
        self.step
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn history(&self) -> &[MathProblem] {
        &self.history
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_problem(&self) -> Option<&MathProblem> {
        self.cursor.and_then(|i| self.history.get(i))
    }

    pub fn seen_signatures(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn equation_input(&self) -> &str {
        &self.equation_input
    }

    pub fn answer_input(&self) -> &str {
        &self.answer_input
    }

    /// True while a generation or equation check is outstanding.
    pub fn loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.step.has_problem() && !self.loading() && self.cursor.is_some_and(|c| c > 0)
    }

    // -------- transitions --------

    /// MENU -> LOADING. Returns the ticket for the generation to run.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<GenerationTicket, ActionError> {
        self.require(GameStep::Menu, "select_difficulty")?;
        self.difficulty = difficulty;
        info!(target: "session", %difficulty, "Difficulty selected");
        Ok(self.start_generation())
    }

    /// Apply a finished generation. Returns false if the ticket was stale.
    pub fn complete_generation(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<MathProblem, GenerationFailure>,
    ) -> bool {
        if !self.is_current(ticket.token, InFlight::Generation) {
            debug!(target: "session", "Ignoring stale generation result");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(problem) => {
                self.seen.insert(problem.signature.clone());
                self.history.push(problem);
                self.cursor = Some(self.history.len() - 1);
                self.reset_interaction();
                info!(target: "session", position = self.history.len(), "New problem appended");
            }
            Err(e) => {
                warn!(target: "session", error = %e, "Generation failed; returning to menu");
                self.reset_session();
                self.feedback = Some(Feedback::error(FeedbackKind::GenerationFailure));
            }
        }
        true
    }

    /// READ_PROBLEM -> DEFINE_VAR.
    pub fn read_done(&mut self) -> Result<(), ActionError> {
        self.require(GameStep::ReadProblem, "read_done")?;
        self.enter(GameStep::DefineVar);
        self.feedback = Some(Feedback::info(FeedbackKind::DefinePrompt));
        Ok(())
    }

    /// DEFINE_VAR -> BUILD_EQUATION.
    pub fn confirm_definition(&mut self) -> Result<(), ActionError> {
        self.require(GameStep::DefineVar, "confirm_definition")?;
        self.enter(GameStep::BuildEquation);
        self.feedback = Some(Feedback::info(FeedbackKind::BuildPrompt));
        Ok(())
    }

    /// Store the submitted equation and start checking it.
    pub fn begin_equation_check(&mut self, equation: &str) -> Result<EquationTicket, ActionError> {
        self.require(GameStep::BuildEquation, "submit_equation")?;
        if self.pending_advance {
            return Err(ActionError::Busy);
        }
        self.equation_input = equation.to_string();
        if equation.trim().is_empty() {
            return Err(ActionError::EmptyInput);
        }
        let answer = self.current_problem().map(|p| p.answer).ok_or(ActionError::NotAllowed {
            action: "submit_equation",
            step: self.step,
        })?;
        self.in_flight = Some(InFlight::EquationCheck);
        Ok(EquationTicket { token: StepToken(self.token), answer, equation: equation.to_string() })
    }

    /// Apply an equation check. On success the caller must fire the returned
    /// advance after the display delay.
    pub fn finish_equation_check(
        &mut self,
        ticket: &EquationTicket,
        result: Result<(), CheckError>,
    ) -> Option<ScheduledAdvance> {
        if !self.is_current(ticket.token, InFlight::EquationCheck) {
            debug!(target: "session", "Ignoring stale equation check");
            return None;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.feedback = Some(Feedback::success(FeedbackKind::EquationCorrect));
                self.pending_advance = true;
                Some(ScheduledAdvance { token: StepToken(self.token) })
            }
            Err(e) => {
                debug!(target: "session", error = %e, "Equation rejected");
                self.feedback = Some(Feedback::error(e.feedback_kind()));
                None
            }
        }
    }

    /// Fire the delayed BUILD_EQUATION -> SOLVE transition. Returns false when
    /// the advance belongs to a context that is no longer current.
    pub fn advance_elapsed(&mut self, advance: ScheduledAdvance) -> bool {
        if advance.token.0 != self.token || self.step != GameStep::BuildEquation || !self.pending_advance {
            debug!(target: "session", "Ignoring stale advance");
            return false;
        }
        self.pending_advance = false;
        self.equation_input.clear();
        self.enter(GameStep::Solve);
        self.feedback = Some(Feedback::info(FeedbackKind::SolvePrompt));
        true
    }

    /// SOLVE -> SUCCESS on a correct answer; stays in SOLVE otherwise.
    pub fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, ActionError> {
        self.require(GameStep::Solve, "submit_answer")?;
        self.answer_input = answer.to_string();
        if answer.trim().is_empty() {
            return Err(ActionError::EmptyInput);
        }
        let expected = self.current_problem().map(|p| p.answer).ok_or(ActionError::NotAllowed {
            action: "submit_answer",
            step: self.step,
        })?;

        match check_answer(expected as f64, answer) {
            Ok(()) => {
                self.answer_input.clear();
                self.enter(GameStep::Success);
                self.feedback = Some(Feedback::success(FeedbackKind::AnswerCorrect));
                info!(target: "session", "Problem solved");
                Ok(AnswerOutcome::Solved)
            }
            Err(e) => {
                self.feedback = Some(Feedback::error(e.feedback_kind()));
                Ok(AnswerOutcome::Retry)
            }
        }
    }

    /// Show the current problem's hint. No state change.
    pub fn request_hint(&mut self) -> Result<(), ActionError> {
        if !self.step.has_problem() {
            return Err(ActionError::NotAllowed { action: "hint", step: self.step });
        }
        if let Some(hint) = self.current_problem().map(|p| p.hint.clone()) {
            self.feedback = Some(Feedback::info(FeedbackKind::Hint).with_detail(hint));
        }
        Ok(())
    }

    /// Move forward: revisit the next stored problem, or start generating a
    /// new one when the cursor is at the end of history.
    pub fn next_problem(&mut self) -> Result<NextOutcome, ActionError> {
        self.require_navigable("next_problem")?;
        let len = self.history.len();
        match self.cursor {
            Some(c) if c + 1 < len => {
                self.cursor = Some(c + 1);
                self.reset_interaction();
                Ok(NextOutcome::Revisited)
            }
            _ => Ok(NextOutcome::Generate(self.start_generation())),
        }
    }

    /// Move back one problem and restart its workflow.
    pub fn previous_problem(&mut self) -> Result<(), ActionError> {
        self.require_navigable("previous_problem")?;
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.reset_interaction();
                Ok(())
            }
            _ => Err(ActionError::NoPreviousProblem),
        }
    }

    /// Back to MENU with a fresh session. Any outstanding work becomes stale.
    pub fn go_home(&mut self) {
        info!(target: "session", problems = self.history.len(), "Session reset");
        self.reset_session();
    }

    // -------- internals --------

    fn enter(&mut self, step: GameStep) {
        self.step = step;
        self.token = self.token.wrapping_add(1);
    }

    fn is_current(&self, token: StepToken, kind: InFlight) -> bool {
        token.0 == self.token && self.in_flight == Some(kind)
    }

    fn require(&self, step: GameStep, action: &'static str) -> Result<(), ActionError> {
        if self.in_flight.is_some() {
            return Err(ActionError::Busy);
        }
        if self.step != step {
            return Err(ActionError::NotAllowed { action, step: self.step });
        }
        Ok(())
    }

    fn require_navigable(&self, action: &'static str) -> Result<(), ActionError> {
        if self.in_flight.is_some() {
            return Err(ActionError::Busy);
        }
        if !self.step.has_problem() || self.cursor.is_none() {
            return Err(ActionError::NotAllowed { action, step: self.step });
        }
        Ok(())
    }

    fn start_generation(&mut self) -> GenerationTicket {
        self.enter(GameStep::Loading);
        self.in_flight = Some(InFlight::Generation);
        self.pending_advance = false;
        self.feedback = Some(Feedback::info(FeedbackKind::Loading));
        GenerationTicket { token: StepToken(self.token), difficulty: self.difficulty }
    }

    fn reset_interaction(&mut self) {
        self.equation_input.clear();
        self.answer_input.clear();
        self.feedback = None;
        self.pending_advance = false;
        self.enter(GameStep::ReadProblem);
    }

    fn reset_session(&mut self) {
        self.history.clear();
        self.seen.clear();
        self.cursor = None;
        self.equation_input.clear();
        self.answer_input.clear();
        self.feedback = None;
        self.in_flight = None;
        self.pending_advance = false;
        self.enter(GameStep::Menu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_equation;
    use crate::domain::Severity;
    use crate::generator::generate;

    fn generate_into(session: &mut GameSession, ticket: &GenerationTicket) {
        let problem = generate(ticket.difficulty, session.seen_signatures());
        assert!(session.complete_generation(ticket, Ok(problem)));
    }

    fn started(difficulty: Difficulty) -> GameSession {
        let mut s = GameSession::new();
        let ticket = s.select_difficulty(difficulty).unwrap();
        assert_eq!(s.step(), GameStep::Loading);
        assert!(s.loading());
        generate_into(&mut s, &ticket);
        s
    }

    fn correct_equation(s: &GameSession) -> String {
        s.current_problem().unwrap().equation.clone()
    }

    fn solve_current(s: &mut GameSession) {
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        let eq = correct_equation(s);
        let ticket = s.begin_equation_check(&eq).unwrap();
        let result = check_equation(ticket.answer as f64, &ticket.equation);
        let advance = s.finish_equation_check(&ticket, result).unwrap();
        assert!(s.advance_elapsed(advance));
        let answer = s.current_problem().unwrap().answer.to_string();
        assert_eq!(s.submit_answer(&answer).unwrap(), AnswerOutcome::Solved);
    }

    fn next(s: &mut GameSession) {
        match s.next_problem().unwrap() {
            NextOutcome::Generate(ticket) => generate_into(s, &ticket),
            NextOutcome::Revisited => {}
        }
    }

    #[test]
    fn selecting_difficulty_goes_through_loading() {
        let s = started(Difficulty::Medium);
        assert_eq!(s.step(), GameStep::ReadProblem);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.cursor(), Some(0));
        assert_eq!(s.difficulty(), Difficulty::Medium);
        assert!(!s.loading());
        assert!(s.seen_signatures().contains(&s.current_problem().unwrap().signature));
    }

    #[test]
    fn full_workflow_reaches_success() {
        let mut s = started(Difficulty::Easy);
        s.read_done().unwrap();
        assert_eq!(s.step(), GameStep::DefineVar);
        s.confirm_definition().unwrap();
        assert_eq!(s.step(), GameStep::BuildEquation);
        assert_eq!(s.feedback().unwrap().kind, FeedbackKind::BuildPrompt);

        let eq = correct_equation(&s);
        let ticket = s.begin_equation_check(&eq).unwrap();
        assert!(s.loading());
        let advance = s.finish_equation_check(&ticket, Ok(())).unwrap();
        assert_eq!(s.step(), GameStep::BuildEquation);
        assert_eq!(s.feedback().unwrap().severity, Severity::Success);

        assert!(s.advance_elapsed(advance));
        assert_eq!(s.step(), GameStep::Solve);
        assert_eq!(s.equation_input(), "");

        let wrong = (s.current_problem().unwrap().answer + 1).to_string();
        assert_eq!(s.submit_answer(&wrong).unwrap(), AnswerOutcome::Retry);
        assert_eq!(s.step(), GameStep::Solve);
        assert_eq!(s.answer_input(), wrong);
        assert_eq!(s.feedback().unwrap().kind, FeedbackKind::AnswerMismatch);

        let right = s.current_problem().unwrap().answer.to_string();
        assert_eq!(s.submit_answer(&right).unwrap(), AnswerOutcome::Solved);
        assert_eq!(s.step(), GameStep::Success);
    }

    #[test]
    fn failed_equation_keeps_step_and_input() {
        let mut s = started(Difficulty::Hard);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();

        let ticket = s.begin_equation_check("3x+5=10=2").unwrap();
        let result = check_equation(ticket.answer as f64, &ticket.equation);
        assert!(s.finish_equation_check(&ticket, result).is_none());
        assert_eq!(s.step(), GameStep::BuildEquation);
        assert_eq!(s.equation_input(), "3x+5=10=2");
        assert_eq!(s.feedback().unwrap().kind, FeedbackKind::MalformedEquation);
        assert_eq!(s.feedback().unwrap().severity, Severity::Error);
    }

    #[test]
    fn second_submission_is_refused_while_one_is_outstanding() {
        let mut s = started(Difficulty::Easy);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        let eq = correct_equation(&s);
        let ticket = s.begin_equation_check(&eq).unwrap();
        assert_eq!(s.begin_equation_check(&eq), Err(ActionError::Busy));
        assert_eq!(s.next_problem(), Err(ActionError::Busy));

        s.finish_equation_check(&ticket, Ok(())).unwrap();
        // Waiting for the advance also blocks resubmission.
        assert_eq!(s.begin_equation_check(&eq), Err(ActionError::Busy));
    }

    #[test]
    fn empty_equation_is_refused() {
        let mut s = started(Difficulty::Easy);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        assert_eq!(s.begin_equation_check("   "), Err(ActionError::EmptyInput));
        assert!(!s.loading());
    }

    #[test]
    fn actions_out_of_order_are_rejected() {
        let mut s = GameSession::new();
        assert!(matches!(s.read_done(), Err(ActionError::NotAllowed { step: GameStep::Menu, .. })));
        assert!(s.request_hint().is_err());
        assert!(s.next_problem().is_err());

        let mut s = started(Difficulty::Easy);
        assert!(s.confirm_definition().is_err());
        assert!(s.submit_answer("5").is_err());
        assert!(s.select_difficulty(Difficulty::Hard).is_err());
        assert_eq!(s.step(), GameStep::ReadProblem);
    }

    #[test]
    fn hint_does_not_change_step() {
        let mut s = started(Difficulty::Medium);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        s.request_hint().unwrap();
        assert_eq!(s.step(), GameStep::BuildEquation);
        let fb = s.feedback().unwrap();
        assert_eq!(fb.kind, FeedbackKind::Hint);
        assert_eq!(fb.detail.as_deref(), Some(s.current_problem().unwrap().hint.as_str()));
    }

    #[test]
    fn next_at_tail_appends_unique_problem() {
        let mut s = started(Difficulty::Easy);
        solve_current(&mut s);
        for expected_len in 2..=20 {
            next(&mut s);
            assert_eq!(s.history().len(), expected_len);
            assert_eq!(s.cursor(), Some(expected_len - 1));
            assert_eq!(s.step(), GameStep::ReadProblem);
        }
        let unique: HashSet<_> = s.history().iter().map(|p| p.signature.clone()).collect();
        assert_eq!(unique.len(), s.history().len());
        assert_eq!(s.seen_signatures().len(), s.history().len());
    }

    #[test]
    fn navigation_revisits_without_regenerating() {
        let mut s = started(Difficulty::Hard);
        next(&mut s);
        next(&mut s);
        let snapshot: Vec<MathProblem> = s.history().to_vec();

        s.previous_problem().unwrap();
        s.previous_problem().unwrap();
        assert_eq!(s.cursor(), Some(0));
        assert_eq!(s.previous_problem(), Err(ActionError::NoPreviousProblem));
        assert_eq!(s.cursor(), Some(0));

        for _ in 0..3 {
            assert_eq!(s.next_problem().unwrap(), NextOutcome::Revisited);
            assert_eq!(s.current_problem(), Some(&snapshot[1]));
            s.previous_problem().unwrap();
            assert_eq!(s.current_problem(), Some(&snapshot[0]));
        }
        assert_eq!(s.history(), snapshot.as_slice());
    }

    #[test]
    fn previous_resets_workflow_state() {
        let mut s = started(Difficulty::Easy);
        next(&mut s);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        let ticket = s.begin_equation_check("1=2").unwrap();
        s.finish_equation_check(&ticket, Err(CheckError::EquationMismatch { lhs: 1.0, rhs: 2.0 }));
        assert_eq!(s.equation_input(), "1=2");

        s.previous_problem().unwrap();
        assert_eq!(s.step(), GameStep::ReadProblem);
        assert_eq!(s.equation_input(), "");
        assert!(s.feedback().is_none());
    }

    #[test]
    fn stale_advance_is_ignored_after_going_home() {
        let mut s = started(Difficulty::Easy);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        let eq = correct_equation(&s);
        let ticket = s.begin_equation_check(&eq).unwrap();
        let advance = s.finish_equation_check(&ticket, Ok(())).unwrap();

        s.go_home();
        assert!(!s.advance_elapsed(advance));
        assert_eq!(s.step(), GameStep::Menu);
    }

    #[test]
    fn stale_advance_is_ignored_after_navigation() {
        let mut s = started(Difficulty::Easy);
        next(&mut s);
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        let eq = correct_equation(&s);
        let ticket = s.begin_equation_check(&eq).unwrap();
        let advance = s.finish_equation_check(&ticket, Ok(())).unwrap();

        s.previous_problem().unwrap();
        s.read_done().unwrap();
        s.confirm_definition().unwrap();
        assert!(!s.advance_elapsed(advance));
        assert_eq!(s.step(), GameStep::BuildEquation);
    }

    #[test]
    fn going_home_clears_history_and_seen() {
        let mut s = started(Difficulty::Medium);
        next(&mut s);
        s.go_home();
        assert_eq!(s.step(), GameStep::Menu);
        assert!(s.history().is_empty());
        assert!(s.seen_signatures().is_empty());
        assert!(s.current_problem().is_none());
    }

    #[test]
    fn generation_failure_returns_to_menu() {
        let mut s = started(Difficulty::Easy);
        let NextOutcome::Generate(ticket) = s.next_problem().unwrap() else {
            panic!("expected generation at tail");
        };
        assert!(s.complete_generation(&ticket, Err(GenerationFailure("worker died".into()))));
        assert_eq!(s.step(), GameStep::Menu);
        assert!(s.history().is_empty());
        assert_eq!(s.feedback().unwrap().kind, FeedbackKind::GenerationFailure);
        assert!(!s.loading());
    }

    #[test]
    fn generation_result_after_reset_is_dropped() {
        let mut s = GameSession::new();
        let ticket = s.select_difficulty(Difficulty::Easy).unwrap();
        s.go_home();
        let problem = generate(Difficulty::Easy, &HashSet::new());
        assert!(!s.complete_generation(&ticket, Ok(problem)));
        assert!(s.history().is_empty());
        assert!(s.seen_signatures().is_empty());
    }
}

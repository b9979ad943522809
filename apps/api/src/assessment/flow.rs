//! Quiz flow state machine: `Asking → Generating → Reviewing`.
//!
//! `Asking` loops once per answer. The last answer moves the session to
//! `Generating`; the caller then requests a plan and hands the result to
//! [`QuizSession::finish_generation`], which always lands in `Reviewing`.
//! A failed or degraded plan can be retried from `Reviewing`. A session
//! left in `Generating` by an interrupted request can be retried too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::answers::{score, weak_topics, AnswerSet, ScoreBand};
use crate::assessment::plan::PlanOutcome;
use crate::assessment::pricing::{compute_cart, CartSummary, MODULE_PRICE};
use crate::assessment::questions::Question;
use crate::assessment::selection::SelectionSet;
use crate::errors::AppError;
use crate::models::training::TrainingModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    Asking { next_index: usize },
    Generating,
    Reviewing,
}

/// What the caller must do after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStep {
    Continue { next_index: usize },
    /// The questionnaire is complete; a plan must be requested.
    ReadyForPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub state: FlowState,
    pub answers: AnswerSet,
    pub weak_topics: Vec<String>,
    pub plan: PlanOutcome,
    /// User-facing message of the last failed plan request.
    pub plan_error: Option<String>,
    pub selection: SelectionSet,
    pub created_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn new(question_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: FlowState::Asking { next_index: 0 },
            answers: AnswerSet::new(question_count),
            weak_topics: Vec::new(),
            plan: PlanOutcome::default(),
            plan_error: None,
            selection: SelectionSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Records an answer for `question_index`, or for the next unanswered
    /// question when `None`. Earlier questions may be re-answered; skipping
    /// ahead is rejected.
    pub fn answer(
        &mut self,
        questions: &[Question],
        question_index: Option<usize>,
        value: bool,
    ) -> Result<AnswerStep, AppError> {
        let FlowState::Asking { next_index } = self.state else {
            return Err(AppError::Conflict(
                "the questionnaire is already complete".to_string(),
            ));
        };

        let index = question_index.unwrap_or(next_index);
        if index > next_index {
            return Err(AppError::Validation(format!(
                "question {index} cannot be answered before question {next_index}"
            )));
        }
        self.answers.record(index, value)?;

        if self.answers.is_complete() {
            self.weak_topics = weak_topics(questions, &self.answers);
            self.state = FlowState::Generating;
            return Ok(AnswerStep::ReadyForPlan);
        }

        let next_index = if index == next_index {
            next_index + 1
        } else {
            next_index
        };
        self.state = FlowState::Asking { next_index };
        Ok(AnswerStep::Continue { next_index })
    }

    /// Stores the plan result and moves to `Reviewing`, whatever the outcome.
    /// A failure keeps the previous catalog, if any.
    pub fn finish_generation(&mut self, result: Result<PlanOutcome, AppError>) -> Result<(), AppError> {
        if self.state != FlowState::Generating {
            return Err(AppError::Conflict("no plan request is pending".to_string()));
        }
        match result {
            Ok(outcome) => {
                self.selection
                    .retain_known(outcome.modules.iter().map(|m| m.id.as_str()));
                self.plan = outcome;
                self.plan_error = None;
            }
            Err(e) => {
                tracing::warn!("Plan request failed for session {}: {e}", self.id);
                self.plan_error = Some(e.user_message());
            }
        }
        self.state = FlowState::Reviewing;
        Ok(())
    }

    /// User-initiated retry of the plan request.
    pub fn begin_retry(&mut self) -> Result<(), AppError> {
        if !matches!(self.state, FlowState::Reviewing | FlowState::Generating) {
            return Err(AppError::Conflict(
                "a plan can only be requested once the questionnaire is complete".to_string(),
            ));
        }
        self.state = FlowState::Generating;
        Ok(())
    }

    /// Toggles a catalog module in the cart. Returns whether it is now selected.
    pub fn toggle_module(&mut self, module_id: &str) -> Result<bool, AppError> {
        if self.state != FlowState::Reviewing {
            return Err(AppError::Conflict(
                "modules can only be selected once results are shown".to_string(),
            ));
        }
        if !self.plan.modules.iter().any(|m| m.id == module_id) {
            return Err(AppError::NotFound(format!("Module {module_id} not found")));
        }
        Ok(self.selection.toggle(module_id))
    }

    pub fn score(&self) -> usize {
        score(&self.answers)
    }

    /// Only meaningful once every question is answered.
    pub fn score_band(&self) -> Option<ScoreBand> {
        self.answers
            .is_complete()
            .then(|| ScoreBand::from_score(self.score()))
    }

    pub fn is_recommended(&self, module: &TrainingModule) -> bool {
        self.weak_topics.iter().any(|t| t == &module.topic)
    }

    pub fn cart(&self) -> CartSummary {
        compute_cart(&self.selection, &self.plan.modules, MODULE_PRICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::questions::QUIZ_QUESTIONS;
    use crate::models::training::fixtures::module;

    fn completed_session(no_indices: &[usize]) -> QuizSession {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        for i in 0..QUIZ_QUESTIONS.len() {
            session
                .answer(QUIZ_QUESTIONS, None, !no_indices.contains(&i))
                .unwrap();
        }
        session
    }

    fn plan(pairs: &[(&str, &str)]) -> PlanOutcome {
        PlanOutcome {
            modules: pairs.iter().map(|(id, t)| module(id, t)).collect(),
            requested_topics: pairs.len(),
            degraded: false,
            warnings: vec![],
        }
    }

    #[test]
    fn test_answers_advance_sequentially() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        let step = session.answer(QUIZ_QUESTIONS, None, true).unwrap();
        assert_eq!(step, AnswerStep::Continue { next_index: 1 });
        assert_eq!(session.state, FlowState::Asking { next_index: 1 });
    }

    #[test]
    fn test_last_answer_moves_to_generating() {
        let session = completed_session(&[0, 4, 9]);
        assert_eq!(session.state, FlowState::Generating);
        assert_eq!(session.score(), 13);
        assert_eq!(
            session.weak_topics,
            vec!["Accueil téléphonique", "Propreté et image", "Organisation du travail"]
        );
        assert_eq!(session.score_band(), Some(ScoreBand::Solid));
    }

    #[test]
    fn test_reanswering_earlier_question_does_not_advance() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        session.answer(QUIZ_QUESTIONS, None, true).unwrap();
        session.answer(QUIZ_QUESTIONS, None, true).unwrap();
        let step = session.answer(QUIZ_QUESTIONS, Some(0), false).unwrap();
        assert_eq!(step, AnswerStep::Continue { next_index: 2 });
        assert_eq!(session.answers.get(0), Some(false));
    }

    #[test]
    fn test_skipping_ahead_is_rejected() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        let result = session.answer(QUIZ_QUESTIONS, Some(3), true);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_answer_after_completion_is_conflict() {
        let mut session = completed_session(&[]);
        let result = session.answer(QUIZ_QUESTIONS, None, true);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_generation_success_reaches_reviewing() {
        let mut session = completed_session(&[4]);
        session
            .finish_generation(Ok(plan(&[("proprete", "Propreté et image"), ("accueil", "Accueil physique")])))
            .unwrap();
        assert_eq!(session.state, FlowState::Reviewing);
        assert!(session.plan_error.is_none());
        assert!(session.is_recommended(&session.plan.modules[0]));
        assert!(!session.is_recommended(&session.plan.modules[1]));
    }

    #[test]
    fn test_generation_failure_still_reaches_reviewing() {
        let mut session = completed_session(&[]);
        session
            .finish_generation(Err(AppError::ExternalService("down".to_string())))
            .unwrap();
        assert_eq!(session.state, FlowState::Reviewing);
        assert!(session.plan_error.is_some());
        assert!(session.plan.modules.is_empty());
    }

    #[test]
    fn test_retry_after_failure() {
        let mut session = completed_session(&[]);
        session
            .finish_generation(Err(AppError::ExternalService("down".to_string())))
            .unwrap();
        session.begin_retry().unwrap();
        assert_eq!(session.state, FlowState::Generating);
        session
            .finish_generation(Ok(plan(&[("accueil", "Accueil physique")])))
            .unwrap();
        assert_eq!(session.state, FlowState::Reviewing);
        assert!(session.plan_error.is_none());
        assert_eq!(session.plan.modules.len(), 1);
    }

    #[test]
    fn test_interrupted_generation_can_be_retried() {
        // Stored as `Generating` with no request left to finish it
        let json = serde_json::to_string(&completed_session(&[0])).unwrap();
        let mut session: QuizSession = serde_json::from_str(&json).unwrap();
        assert_eq!(session.state, FlowState::Generating);

        session.begin_retry().unwrap();
        assert_eq!(session.state, FlowState::Generating);
        session
            .finish_generation(Ok(plan(&[("accueil", "Accueil téléphonique")])))
            .unwrap();
        assert_eq!(session.state, FlowState::Reviewing);
        assert!(session.toggle_module("accueil").unwrap());
    }

    #[test]
    fn test_retry_while_asking_is_conflict() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        assert!(matches!(session.begin_retry(), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_finish_without_pending_request_is_conflict() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        let result = session.finish_generation(Ok(PlanOutcome::default()));
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_toggle_and_cart() {
        let mut session = completed_session(&[]);
        let pairs: Vec<(String, String)> = (0..5)
            .map(|i| (format!("m-{i}"), format!("Sujet {i}")))
            .collect();
        let refs: Vec<(&str, &str)> = pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        session.finish_generation(Ok(plan(&refs))).unwrap();

        for (id, _) in &refs {
            assert!(session.toggle_module(id).unwrap());
        }
        let cart = session.cart();
        assert_eq!(cart.module_count, 5);
        assert_eq!(cart.total_price, 2000);

        assert!(!session.toggle_module("m-0").unwrap());
        assert_eq!(session.cart().total_price, 2000);
    }

    #[test]
    fn test_toggle_unknown_module_is_not_found() {
        let mut session = completed_session(&[]);
        session
            .finish_generation(Ok(plan(&[("accueil", "Accueil physique")])))
            .unwrap();
        assert!(matches!(
            session.toggle_module("nope"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_toggle_before_results_is_conflict() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        assert!(matches!(
            session.toggle_module("accueil"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = completed_session(&[1]);
        let json = serde_json::to_string(&session).unwrap();
        let restored: QuizSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state, FlowState::Generating);
        assert_eq!(restored.answers, session.answers);
    }
}

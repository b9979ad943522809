//! Axum route handlers for the quiz flow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::answers::ScoreBand;
use crate::assessment::flow::{AnswerStep, FlowState, QuizSession};
use crate::assessment::plan::request_training_plan;
use crate::assessment::pricing::{CartSummary, CURRENCY_SYMBOL};
use crate::assessment::questions::{distinct_topics, Question, QUIZ_QUESTIONS};
use crate::errors::AppError;
use crate::purchases::checkout::{submit_purchase, CheckoutReceipt};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QuestionnaireResponse {
    pub question_count: usize,
    pub questions: &'static [Question],
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Defaults to the next unanswered question.
    pub question_index: Option<usize>,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentQuestion {
    pub index: usize,
    pub text: &'static str,
    pub topic: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModuleCard {
    pub id: String,
    pub topic: String,
    pub title: String,
    pub mini_course: String,
    pub recommended: bool,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub summary: CartSummary,
    pub currency: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub flow: FlowState,
    pub question_count: usize,
    pub answered: usize,
    pub current_question: Option<CurrentQuestion>,
    pub score: usize,
    pub score_band: Option<ScoreBand>,
    pub score_message: Option<&'static str>,
    pub weak_topics: Vec<String>,
    pub modules: Vec<ModuleCard>,
    pub plan_degraded: bool,
    pub plan_error: Option<String>,
    pub cart: CartResponse,
}

impl SessionResponse {
    fn from_session(session: &QuizSession) -> Self {
        let current_question = match session.state {
            FlowState::Asking { next_index } => {
                QUIZ_QUESTIONS.get(next_index).map(|q| CurrentQuestion {
                    index: next_index,
                    text: q.text,
                    topic: q.topic,
                })
            }
            _ => None,
        };
        let score_band = session.score_band();

        Self {
            session_id: session.id,
            flow: session.state,
            question_count: session.answers.question_count(),
            answered: session.answers.len(),
            current_question,
            score: session.score(),
            score_band,
            score_message: score_band.map(|b| b.message()),
            weak_topics: session.weak_topics.clone(),
            modules: session
                .plan
                .modules
                .iter()
                .map(|m| ModuleCard {
                    id: m.id.clone(),
                    topic: m.topic.clone(),
                    title: m.title.clone(),
                    mini_course: m.mini_course.clone(),
                    recommended: session.is_recommended(m),
                    selected: session.selection.contains(&m.id),
                })
                .collect(),
            plan_degraded: session.plan.degraded,
            plan_error: session.plan_error.clone(),
            cart: CartResponse {
                summary: session.cart(),
                currency: CURRENCY_SYMBOL,
            },
        }
    }
}

/// Issues the plan request for a session in `Generating` and stores the
/// result. The session is saved first so a concurrent read sees the pending
/// state. The request runs in its own task so a dropped connection cannot
/// leave the stored session in `Generating`.
async fn run_generation(state: &AppState, session: QuizSession) -> Result<QuizSession, AppError> {
    state.sessions.save(&session).await?;

    let state = state.clone();
    tokio::spawn(async move {
        let mut session = session;
        let topics = distinct_topics(QUIZ_QUESTIONS);
        let result =
            request_training_plan(state.planner.as_deref(), &topics, state.config.plan_timeout)
                .await;
        session.finish_generation(result)?;
        state.sessions.save(&session).await?;
        Ok::<_, AppError>(session)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("plan generation task failed: {e}")))?
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/quiz/questions
pub async fn handle_list_questions() -> Json<QuestionnaireResponse> {
    Json(QuestionnaireResponse {
        question_count: QUIZ_QUESTIONS.len(),
        questions: QUIZ_QUESTIONS,
    })
}

/// POST /api/v1/quiz/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session = QuizSession::new(QUIZ_QUESTIONS.len());
    state.sessions.save(&session).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::from_session(&session)),
    ))
}

/// GET /api/v1/quiz/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/quiz/sessions/:id/answers
///
/// The last answer triggers plan generation; the response then already
/// carries the catalog (or the generation error).
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;

    if let AnswerStep::Continue { .. } =
        session.answer(QUIZ_QUESTIONS, req.question_index, req.value)?
    {
        state.sessions.save(&session).await?;
    } else {
        session = run_generation(&state, session).await?;
    }

    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/quiz/sessions/:id/plan/retry
///
/// Also recovers a session whose plan request was interrupted.
pub async fn handle_retry_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.begin_retry()?;
    let session = run_generation(&state, session).await?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// POST /api/v1/quiz/sessions/:id/selection/:module_id
pub async fn handle_toggle_module(
    State(state): State<AppState>,
    Path((id, module_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut session = state.sessions.load(id).await?;
    session.toggle_module(&module_id)?;
    state.sessions.save(&session).await?;
    Ok(Json(SessionResponse::from_session(&session)))
}

/// GET /api/v1/quiz/sessions/:id/cart
pub async fn handle_get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartResponse>, AppError> {
    let session = state.sessions.load(id).await?;
    Ok(Json(CartResponse {
        summary: session.cart(),
        currency: CURRENCY_SYMBOL,
    }))
}

/// POST /api/v1/quiz/sessions/:id/checkout
///
/// Records a pending purchase and returns the messaging hand-off link.
pub async fn handle_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), AppError> {
    let session = state.sessions.load(id).await?;
    if session.state != FlowState::Reviewing {
        return Err(AppError::Conflict(
            "checkout is only available once results are shown".to_string(),
        ));
    }

    let cart = session.cart();
    let receipt = submit_purchase(
        &state.db,
        &req.phone,
        &session.selection,
        &session.plan.modules,
        cart.total_price,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::plan::PlanOutcome;
    use crate::models::training::fixtures::module;

    #[test]
    fn test_fresh_session_shows_first_question() {
        let session = QuizSession::new(QUIZ_QUESTIONS.len());
        let view = SessionResponse::from_session(&session);
        let current = view.current_question.unwrap();
        assert_eq!(current.index, 0);
        assert_eq!(current.topic, "Accueil téléphonique");
        assert!(view.score_band.is_none());
        assert_eq!(view.cart.summary.total_price, 0);
    }

    #[test]
    fn test_reviewing_view_flags_recommended_and_selected() {
        let mut session = QuizSession::new(QUIZ_QUESTIONS.len());
        for i in 0..QUIZ_QUESTIONS.len() {
            session.answer(QUIZ_QUESTIONS, None, i != 4).unwrap();
        }
        session
            .finish_generation(Ok(PlanOutcome {
                modules: vec![
                    module("proprete", "Propreté et image"),
                    module("accueil", "Accueil physique"),
                ],
                requested_topics: 2,
                degraded: false,
                warnings: vec![],
            }))
            .unwrap();
        session.toggle_module("accueil").unwrap();

        let view = SessionResponse::from_session(&session);
        assert!(view.current_question.is_none());
        assert_eq!(view.score, 15);
        assert_eq!(view.score_band, Some(ScoreBand::Excellent));
        assert!(view.modules[0].recommended && !view.modules[0].selected);
        assert!(!view.modules[1].recommended && view.modules[1].selected);
        assert_eq!(view.cart.summary.total_price, 500);
    }

    #[test]
    fn test_cart_response_flattens_summary() {
        let session = QuizSession::new(QUIZ_QUESTIONS.len());
        let value = serde_json::to_value(SessionResponse::from_session(&session).cart).unwrap();
        assert_eq!(value["total_price"], 0);
        assert_eq!(value["currency"], "Fcfa");
    }
}

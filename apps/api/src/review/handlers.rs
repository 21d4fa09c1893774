use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::store::list_for_owner;
use crate::errors::AppError;
use crate::grader::prompts::{LearningRole, LEARNING_ROLES};
use crate::models::card::{CardRow, CardStatus};
use crate::review::pipeline::{self, EvaluateRequest, EvaluationResult};
use crate::review::scheduler::due_cards;
use crate::state::AppState;

/// Trimmed card view for queue and listing responses.
#[derive(Debug, Serialize)]
pub struct CardSummary {
    pub id: Uuid,
    pub note_id: Uuid,
    pub term: String,
    pub status: CardStatus,
    pub review_count: i32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<CardRow> for CardSummary {
    fn from(card: CardRow) -> Self {
        Self {
            id: card.id,
            note_id: card.note_id,
            term: card.term,
            status: card.status,
            review_count: card.review_count,
            last_reviewed_at: card.last_reviewed_at,
            created_at: card.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct DueQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct DueListResponse {
    pub cards: Vec<CardSummary>,
    pub total_due: usize,
}

/// GET /api/v1/review/due
/// The due queue, weakest cards first.
pub async fn handle_due_cards(
    State(state): State<AppState>,
    Query(params): Query<DueQuery>,
) -> Result<Json<DueListResponse>, AppError> {
    let now = state.clock.now();
    let cards = list_for_owner(&state.db, params.user_id).await?;
    let due = due_cards(cards, now);
    let total_due = due.len();

    let limit = params.limit.unwrap_or(50).min(100);
    let cards = due.into_iter().take(limit).map(CardSummary::from).collect();

    Ok(Json(DueListResponse { cards, total_due }))
}

#[derive(Deserialize)]
pub struct EvaluateBody {
    pub note_id: Uuid,
    pub role: Option<String>,
    pub explanation: String,
}

/// POST /api/v1/cards/:id/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(body): Json<EvaluateBody>,
) -> Result<Json<EvaluationResult>, AppError> {
    let result = pipeline::evaluate(
        &state.db,
        state.grader.as_ref(),
        EvaluateRequest {
            card_id,
            note_id: body.note_id,
            role: body.role.as_deref(),
            explanation: &body.explanation,
        },
        state.clock.now(),
        state.config.clear_mastered_on_regress,
    )
    .await?;

    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct StatusUpdateBody {
    pub status: CardStatus,
}

/// PATCH /api/v1/cards/:id/status
/// Direct override bypassing grading ("mark as mastered").
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(body): Json<StatusUpdateBody>,
) -> Result<Json<CardRow>, AppError> {
    let card = pipeline::set_card_status(
        &state.db,
        card_id,
        body.status,
        state.clock.now(),
        state.config.clear_mastered_on_regress,
    )
    .await?;

    Ok(Json(card))
}

#[derive(Serialize)]
pub struct RolesResponse {
    pub roles: &'static [LearningRole],
}

/// GET /api/v1/roles
/// The grading-persona catalog offered to the learner.
pub async fn handle_list_roles() -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: LEARNING_ROLES,
    })
}

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::store::{count_by_status_for_note, get_note, ingest_terms, list_for_note};
use crate::errors::AppError;
use crate::models::card::StatusCounters;
use crate::review::handlers::CardSummary;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IngestTermsBody {
    pub terms: Vec<String>,
}

#[derive(Serialize)]
pub struct IngestTermsResponse {
    pub note_id: Uuid,
    pub created: Vec<CardSummary>,
    pub skipped: usize,
}

/// POST /api/v1/notes/:note_id/cards
/// Persists extracted terms as cards. Idempotent per (note, term): terms the
/// note already tracks are skipped with their learning state untouched.
pub async fn handle_ingest_terms(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Json(body): Json<IngestTermsBody>,
) -> Result<Json<IngestTermsResponse>, AppError> {
    if body.terms.is_empty() {
        return Err(AppError::Validation("No terms submitted".to_string()));
    }

    get_note(&state.db, note_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Note {note_id} not found")))?;

    let submitted = body.terms.len();
    let created = ingest_terms(&state.db, note_id, &body.terms, state.clock.now()).await?;
    let skipped = submitted - created.len();

    Ok(Json(IngestTermsResponse {
        note_id,
        created: created.into_iter().map(CardSummary::from).collect(),
        skipped,
    }))
}

#[derive(Serialize)]
pub struct CardListResponse {
    pub note_id: Uuid,
    pub cards: Vec<CardSummary>,
    pub total: usize,
}

/// GET /api/v1/notes/:note_id/cards
pub async fn handle_list_cards(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<CardListResponse>, AppError> {
    get_note(&state.db, note_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Note {note_id} not found")))?;

    let cards = list_for_note(&state.db, note_id).await?;
    let total = cards.len();

    Ok(Json(CardListResponse {
        note_id,
        cards: cards.into_iter().map(CardSummary::from).collect(),
        total,
    }))
}

/// GET /api/v1/notes/:note_id/cards/progress
/// Per-note mastery counters.
pub async fn handle_progress(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<StatusCounters>, AppError> {
    get_note(&state.db, note_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Note {note_id} not found")))?;

    let counts = count_by_status_for_note(&state.db, note_id).await?;
    Ok(Json(StatusCounters::from_counts(&counts)))
}

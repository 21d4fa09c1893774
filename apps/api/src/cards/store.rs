//! Card and note reads plus term ingestion.
//!
//! Cards are keyed by (note_id, term): re-ingesting a term that already
//! exists for the note is a no-op that preserves its learning state.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::card::{CardRow, CardStatus};
use crate::models::note::NoteRow;

pub async fn get_note(pool: &PgPool, note_id: Uuid) -> Result<Option<NoteRow>, AppError> {
    Ok(
        sqlx::query_as::<_, NoteRow>("SELECT * FROM notes WHERE id = $1")
            .bind(note_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_card(pool: &PgPool, card_id: Uuid) -> Result<Option<CardRow>, AppError> {
    Ok(
        sqlx::query_as::<_, CardRow>("SELECT * FROM flash_cards WHERE id = $1")
            .bind(card_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// All cards belonging to one note, in creation order.
pub async fn list_for_note(pool: &PgPool, note_id: Uuid) -> Result<Vec<CardRow>, AppError> {
    Ok(sqlx::query_as::<_, CardRow>(
        "SELECT * FROM flash_cards WHERE note_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(note_id)
    .fetch_all(pool)
    .await?)
}

/// All cards across every note owned by the user. Feeds the scheduler's
/// due-queue projection and the statistics due count.
pub async fn list_for_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<CardRow>, AppError> {
    Ok(sqlx::query_as::<_, CardRow>(
        r#"
        SELECT fc.*
        FROM flash_cards fc
        JOIN notes n ON n.id = fc.note_id
        WHERE n.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Inserts the given terms as NOT_STARTED cards, skipping any term the note
/// already has. Returns only the newly created cards.
pub async fn ingest_terms(
    pool: &PgPool,
    note_id: Uuid,
    terms: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<CardRow>, AppError> {
    let mut created = Vec::new();

    for term in terms {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        let inserted = sqlx::query_as::<_, CardRow>(
            r#"
            INSERT INTO flash_cards (id, note_id, term, status, review_count, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ON CONFLICT (note_id, term) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(note_id)
        .bind(term)
        .bind(CardStatus::NotStarted)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        if let Some(card) = inserted {
            created.push(card);
        }
    }

    info!(
        "Ingested {} new card(s) for note {} ({} term(s) submitted)",
        created.len(),
        note_id,
        terms.len()
    );

    Ok(created)
}

/// Per-status card counts scoped to one note.
pub async fn count_by_status_for_note(
    pool: &PgPool,
    note_id: Uuid,
) -> Result<Vec<(CardStatus, i64)>, AppError> {
    Ok(sqlx::query_as::<_, (CardStatus, i64)>(
        "SELECT status, COUNT(*) FROM flash_cards WHERE note_id = $1 GROUP BY status",
    )
    .bind(note_id)
    .fetch_all(pool)
    .await?)
}

/// Per-status card counts scoped to all of a user's notes.
pub async fn count_by_status_for_owner(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<(CardStatus, i64)>, AppError> {
    Ok(sqlx::query_as::<_, (CardStatus, i64)>(
        r#"
        SELECT fc.status, COUNT(*)
        FROM flash_cards fc
        JOIN notes n ON n.id = fc.note_id
        WHERE n.user_id = $1
        GROUP BY fc.status
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::cards::handlers as card_handlers;
use crate::review::handlers as review_handlers;
use crate::state::AppState;
use crate::stats::handlers as stats_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Card ingestion & listing
        .route(
            "/api/v1/notes/:note_id/cards",
            post(card_handlers::handle_ingest_terms).get(card_handlers::handle_list_cards),
        )
        .route(
            "/api/v1/notes/:note_id/cards/progress",
            get(card_handlers::handle_progress),
        )
        // Review flow
        .route("/api/v1/review/due", get(review_handlers::handle_due_cards))
        .route(
            "/api/v1/cards/:id/evaluate",
            post(review_handlers::handle_evaluate),
        )
        .route(
            "/api/v1/cards/:id/status",
            patch(review_handlers::handle_set_status),
        )
        .route("/api/v1/roles", get(review_handlers::handle_list_roles))
        // Dashboard
        .route("/api/v1/statistics", get(stats_handlers::handle_statistics))
        .with_state(state)
}

use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::Clock;
use crate::config::Config;
use crate::grader::Grader;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable explanation grader. Default: LlmGrader over the Anthropic
    /// Messages API; tests swap in a canned implementation.
    pub grader: Arc<dyn Grader>,
    /// Injectable time source so due-queue and statistics queries are
    /// deterministic under test.
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on a single grading call. Past this the evaluation
    /// pipeline falls back rather than blocking the learner.
    pub grader_timeout_secs: u64,
    /// Reference timezone for streak/trend/weekly windows, as a fixed
    /// offset from UTC in minutes. Explicit config, not host-local time.
    pub stats_utc_offset_minutes: i32,
    /// Weekly attempt target for progress-bar style reporting.
    pub weekly_review_target: i64,
    /// Whether a card that regresses out of MASTERED loses its historical
    /// mastered_at timestamp. Default keeps it.
    pub clear_mastered_on_regress: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            grader_timeout_secs: std::env::var("GRADER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("GRADER_TIMEOUT_SECS must be a number of seconds")?,
            stats_utc_offset_minutes: std::env::var("STATS_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<i32>()
                .context("STATS_UTC_OFFSET_MINUTES must be an offset in minutes")?,
            weekly_review_target: std::env::var("WEEKLY_REVIEW_TARGET")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("WEEKLY_REVIEW_TARGET must be a positive integer")?,
            clear_mastered_on_regress: std::env::var("CLEAR_MASTERED_ON_REGRESS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

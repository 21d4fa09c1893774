/// Explanation grader — the single point of entry for all Claude API calls.
///
/// ARCHITECTURAL RULE: no other module may call the Anthropic API directly.
/// The evaluation pipeline talks to `dyn Grader`; everything HTTP lives here.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all grading calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum GraderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Grader returned empty content")]
    EmptyContent,
}

/// Structured grading verdict for one explanation. The resulting card
/// status is not part of this contract: the state machine derives it from
/// the score. `score` is always within 0–100 by the time a report leaves
/// this module.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub score: i32,
    pub feedback: String,
    pub highlights: Vec<String>,
    pub suggestions: Vec<String>,
}

impl GradeReport {
    /// Deterministic stand-in used when the grading call fails or returns
    /// garbage. Maps to needs_improve; the learning flow never hard-fails
    /// on a grading outage.
    pub fn fallback() -> Self {
        Self {
            score: 60,
            feedback: "Thanks for your explanation! Keep practicing — it gets \
                       clearer every time you put it in your own words."
                .to_string(),
            highlights: vec!["You explained the concept in your own words".to_string()],
            suggestions: vec!["Try spelling out the core idea in more detail".to_string()],
        }
    }
}

/// The grading collaborator. Implement this to swap backends without
/// touching the evaluation pipeline or its handlers.
///
/// Carried in `AppState` as `Arc<dyn Grader>`.
#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(
        &self,
        term: &str,
        explanation: &str,
        role: &str,
    ) -> Result<GradeReport, GraderError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct LlmResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl LlmResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// What the model is asked to return. Kept loose: every field is optional
/// and normalized in `normalize_report` so a sloppy response still grades.
/// The model also emits a `status` label; it is ignored — the state machine
/// owns that mapping.
#[derive(Debug, Deserialize)]
struct RawEvaluation {
    score: Option<i64>,
    feedback: Option<String>,
    #[serde(default)]
    highlights: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Grader backed by the Anthropic Messages API.
/// Wraps the HTTP call with a bounded timeout and retry on 429/5xx.
#[derive(Clone)]
pub struct LlmGrader {
    client: Client,
    api_key: String,
}

impl LlmGrader {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, GraderError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<GraderError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Grading call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GraderError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Grading API returned {}: {}", status, body);
                last_error = Some(GraderError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(GraderError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "Grading call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(GraderError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl Grader for LlmGrader {
    async fn grade(
        &self,
        term: &str,
        explanation: &str,
        role: &str,
    ) -> Result<GradeReport, GraderError> {
        let prompt = prompts::EVALUATOR_PROMPT
            .replace("{term}", term)
            .replace("{role}", role)
            .replace("{explanation}", explanation);

        let response = self.call(&prompt, prompts::EVALUATOR_SYSTEM).await?;
        let text = response.text().ok_or(GraderError::EmptyContent)?;

        parse_grade_report(text)
    }
}

/// Parses the model's JSON verdict into a normalized `GradeReport`.
pub fn parse_grade_report(text: &str) -> Result<GradeReport, GraderError> {
    let text = strip_json_fences(text);
    let raw: RawEvaluation = serde_json::from_str(text)?;
    Ok(normalize_report(raw))
}

/// Clamps the score into 0–100 (missing score reads as a neutral 50).
fn normalize_report(raw: RawEvaluation) -> GradeReport {
    GradeReport {
        score: raw.score.unwrap_or(50).clamp(0, 100) as i32,
        feedback: raw.feedback.unwrap_or_default(),
        highlights: raw.highlights,
        suggestions: raw.suggestions,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"score\": 80}\n```";
        assert_eq!(strip_json_fences(input), "{\"score\": 80}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"score\": 80}";
        assert_eq!(strip_json_fences(input), "{\"score\": 80}");
    }

    #[test]
    fn test_parse_full_report() {
        let report = parse_grade_report(
            r#"{"score": 92, "status": "mastered", "feedback": "Great",
                "highlights": ["clear"], "suggestions": []}"#,
        )
        .unwrap();
        assert_eq!(report.score, 92);
        assert_eq!(report.feedback, "Great");
        assert_eq!(report.highlights, vec!["clear"]);
    }

    #[test]
    fn test_parse_clamps_out_of_range_score() {
        let report = parse_grade_report(r#"{"score": 140}"#).unwrap();
        assert_eq!(report.score, 100);

        let report = parse_grade_report(r#"{"score": -5}"#).unwrap();
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_parse_missing_score_defaults_to_50() {
        let report = parse_grade_report(r#"{"feedback": "hm"}"#).unwrap();
        assert_eq!(report.score, 50);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_grade_report("I think this deserves a B+").is_err());
    }

    #[test]
    fn test_fallback_report_shape() {
        let report = GradeReport::fallback();
        assert_eq!(report.score, 60);
        assert!(!report.feedback.is_empty());
    }
}

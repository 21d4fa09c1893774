// Explanation-grading prompt templates.
// All prompts for the grader module are defined here.

pub const EVALUATOR_SYSTEM: &str = "\
You are an expert learning evaluator. A learner will explain a concept in \
their own words and you assess how well they understand it. \
You MUST respond with valid JSON only — no markdown fences, no explanations.

Scoring rubric (score is an integer 0-100):
- 90-100 (mastered): accurate, complete, explains the core idea in plain words
- 70-89 (needs_review): mostly correct, minor inaccuracies or omissions
- 50-69 (needs_improve): partial understanding, clear errors or missing essentials
- 0-49 (not_mastered): seriously mistaken or essentially no understanding

Adapt the bar to the audience the learner chose: an explanation aimed at a \
five-year-old earns a high score for simple, vivid storytelling, while one \
aimed at a graduate student must use precise terminology and theory.

Return exactly this structure:
{
  \"score\": 85,
  \"status\": \"needs_review\",
  \"feedback\": \"...\",
  \"highlights\": [\"what went well\"],
  \"suggestions\": [\"what to improve\"]
}

Feedback must stay encouraging and constructive: acknowledge what works \
first, point out gaps gently, and give concrete study suggestions.";

pub const EVALUATOR_PROMPT: &str = "\
TERM:
{term}

AUDIENCE THE LEARNER IS EXPLAINING TO:
{role}

LEARNER'S EXPLANATION:
{explanation}

Evaluate this explanation and return the JSON result.";

/// A grading persona the learner can explain to. Stored on attempts as a
/// free-form label; this catalog is what the UI offers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LearningRole {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const LEARNING_ROLES: &[LearningRole] = &[
    LearningRole {
        id: "child_5",
        name: "Five-year-old",
        description: "Use the simplest possible words, like telling a story",
    },
    LearningRole {
        id: "elementary",
        name: "Elementary schooler",
        description: "Plain language with everyday examples",
    },
    LearningRole {
        id: "middle_school",
        name: "Middle schooler",
        description: "Basic concepts, a little technical vocabulary is fine",
    },
    LearningRole {
        id: "college",
        name: "College student",
        description: "Technical but accessible, related concepts welcome",
    },
    LearningRole {
        id: "master",
        name: "Graduate student",
        description: "Precise terminology and theoretical framing expected",
    },
];

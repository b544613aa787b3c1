// Heuristic layout linting for single slides
//
// Pure analysis: every call produces a fresh, fully-replacing issue list,
// and identical (slide, config) input always yields byte-identical output.
// The orchestrator's convergence decisions depend on that determinism.

use serde::{Deserialize, Serialize};

mod checks;
mod score;

pub use checks::check;
pub use score::{score, ScoreWeights};

/// Kind of layout problem found in a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    TooLongText,
    TooManyBullets,
    ImageTextCrowded,
    /// Reported by a rendering environment, never by the heuristic checks.
    OverflowDetected,
    /// Reported by a rendering environment, never by the heuristic checks.
    FontTooSmall,
    EmptySlide,
    MissingTitle,
    CodeBlockTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One heuristic finding about a slide's content density or structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub message: String,
    pub severity: Severity,
    pub slide_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<IssueMeta>,
}

/// Measured counts backing an issue, for callers that want the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_pixels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_lines: Option<usize>,
}

/// Overridable thresholds for the density checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    pub max_chars_per_slide: usize,
    pub max_bullets_per_slide: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_chars_per_slide: 600,
            max_bullets_per_slide: 6,
        }
    }
}

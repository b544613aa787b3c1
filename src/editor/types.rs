// Edit loop types — outcome, configuration, history sink

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deck::{DeckError, SlideDeck};
use crate::generators::GeneratorError;
use crate::lint::{LayoutIssue, LintConfig, ScoreWeights};

/// Terminal state of one edit-with-feedback run.
///
/// `Converged` and `Exhausted` are both successes from the caller's point
/// of view; the distinction (acceptance reached vs. iteration budget
/// spent) is reported, never hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// The acceptance score was reached (or no fixing was needed).
    Converged,
    /// The iteration budget ran out before acceptance.
    Exhausted,
    /// A collaborator call failed; the last good state is preserved.
    Failed,
}

/// Result value of the edit state machine.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub state: EditState,
    /// The last successfully applied content.
    pub content: String,
    /// Issues computed at the last successful check.
    pub issues: Vec<LayoutIssue>,
    /// Collaborator calls completed. Never exceeds `max_iterations`.
    pub iterations: u32,
    /// Score at the last successful check.
    pub score: u8,
    /// The deck after the edit. On `Failed` it reflects only fully
    /// received content — never a partial stream.
    pub deck: SlideDeck,
    /// The collaborator error, present exactly when `state` is `Failed`.
    pub error: Option<GeneratorError>,
}

/// Tuning knobs for the edit loop. The acceptance score and iteration cap
/// were fixed constants in earlier deck tooling; they stay defaults here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Upper bound on collaborator calls per edit request.
    pub max_iterations: u32,
    /// Minimum score at which a fix pass is accepted.
    pub accept_score: u8,
    pub lint: LintConfig,
    pub weights: ScoreWeights,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            accept_score: 80,
            lint: LintConfig::default(),
            weights: ScoreWeights::default(),
        }
    }
}

/// One recorded loop step, for callers that opt into history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub iteration: u32,
    pub content: String,
    pub issue_count: usize,
    pub score: u8,
}

/// Optional append-only sink for loop introspection. Supplied by the
/// caller so no hidden mutable state is shared between concurrent runs;
/// correctness never depends on it.
pub trait HistorySink: Send + Sync {
    fn append(&self, entry: HistoryEntry);
}

/// Errors from the auxiliary single-shot operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

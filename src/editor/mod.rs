// Edit orchestration — the feedback loop and single-shot deck operations

mod feedback_loop;
mod ops;
mod types;

pub use feedback_loop::SlideEditor;
pub use types::{EditError, EditOutcome, EditState, EditorConfig, HistoryEntry, HistorySink};

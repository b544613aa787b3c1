// Slidesmith - markdown slide decks with heuristic linting and issue-aware repair
// Library exports

// Core modules
pub mod deck;
pub mod editor;
pub mod generators;
pub mod lint;

// Convenience re-exports for the common call path
pub use deck::{parse, serialize, DeckError, Slide, SlideDeck};
pub use editor::{EditOutcome, EditState, EditorConfig, SlideEditor};
pub use generators::{cleanup_response, DeckRequest, Generator, GeneratorError, StreamChunk};
pub use lint::{check, score, LayoutIssue, LintConfig, ScoreWeights, Severity};

// The auto-fix state machine
//
// Initial → Edited → Checked → (Fixing ⇄ Checked)* →
//     {Converged | Exhausted | Failed}
//
// One sequential control flow per invocation. Streams are drained to
// completion before any check runs, so detection never sees partial
// output. Cancellation is dropping the future: the input deck is only
// read, and a new deck is built exclusively from fully received content.

use std::sync::Arc;

use crate::deck::{self, DeckError, Slide, SlideDeck};
use crate::generators::{cleanup_response, drain_stream, Generator, GeneratorError};
use crate::lint::{self, LayoutIssue};

use super::types::{EditOutcome, EditState, EditorConfig, HistoryEntry, HistorySink};

/// Drives issue-aware slide regeneration around a [`Generator`].
pub struct SlideEditor {
    generator: Arc<dyn Generator>,
    config: EditorConfig,
    history: Option<Arc<dyn HistorySink>>,
}

impl SlideEditor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            config: EditorConfig::default(),
            history: None,
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an append-only history sink for loop introspection.
    pub fn with_history(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub(crate) fn generator(&self) -> &dyn Generator {
        self.generator.as_ref()
    }

    /// Edit one slide, optionally looping on detected layout issues.
    ///
    /// Returns `Err` only for validation failures caught before any
    /// collaborator call. Collaborator failures are part of the state
    /// machine result: `state == Failed` with the error attached and the
    /// last good content preserved.
    pub async fn edit_slide_with_feedback(
        &self,
        deck: &SlideDeck,
        index: usize,
        instruction: &str,
        auto_fix: bool,
    ) -> Result<EditOutcome, DeckError> {
        let slide = deck.slide(index).ok_or(DeckError::IndexOutOfRange {
            index,
            len: deck.len(),
        })?;

        tracing::debug!(
            slide = index,
            auto_fix,
            generator = self.generator.name(),
            "starting edit loop"
        );

        // Initial → Edited: one delegation with an empty issue list.
        let mut content = match self.request_content(&slide.content, instruction, &[]).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(slide = index, error = %err, "initial edit failed");
                return Ok(self.failed(deck, slide, slide.content.clone(), Vec::new(), 0, err));
            }
        };
        let mut iterations: u32 = 1;

        // Edited → Checked.
        let mut issues = self.check_transient(slide, &content);
        let mut score = lint::score(&issues, &self.config.weights);
        self.record(iterations, &content, &issues, score);

        if !auto_fix || issues.is_empty() {
            return self.settle(deck, index, content, issues, iterations, score, EditState::Converged);
        }

        // Checked → Fixing, bounded by the iteration budget.
        while iterations < self.config.max_iterations {
            tracing::debug!(
                slide = index,
                iteration = iterations + 1,
                issue_count = issues.len(),
                score,
                "regenerating with issue feedback"
            );
            match self.request_content(&content, instruction, &issues).await {
                Ok(text) => {
                    content = text;
                    iterations += 1;
                }
                Err(err) => {
                    tracing::warn!(slide = index, iteration = iterations, error = %err, "fix pass failed");
                    return Ok(self.failed(deck, slide, content, issues, iterations, err));
                }
            }

            // Fixing → Checked.
            issues = self.check_transient(slide, &content);
            score = lint::score(&issues, &self.config.weights);
            self.record(iterations, &content, &issues, score);

            if score >= self.config.accept_score {
                return self.settle(deck, index, content, issues, iterations, score, EditState::Converged);
            }
        }

        self.settle(deck, index, content, issues, iterations, score, EditState::Exhausted)
    }

    /// One collaborator round trip: stream if offered, drained fully,
    /// then cleaned. Empty output counts as a collaborator failure.
    async fn request_content(
        &self,
        content: &str,
        instruction: &str,
        issues: &[LayoutIssue],
    ) -> Result<String, GeneratorError> {
        let raw = match self
            .generator
            .generate_stream(content, instruction, issues)
            .await?
        {
            Some(mut rx) => drain_stream(&mut rx).await?,
            None => self.generator.generate(content, instruction, issues).await?,
        };
        let cleaned = cleanup_response(&raw);
        if cleaned.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(cleaned)
    }

    /// Lint new content as if it already sat in the target slide's spot.
    /// The reply is split into body parts the same way `update_slide`
    /// splits it, so detection never sees frontmatter fences or notes
    /// markers, and layout exemptions stay accurate.
    fn check_transient(&self, slide: &Slide, content: &str) -> Vec<LayoutIssue> {
        let body = deck::parse_slide_body(content);
        let (frontmatter, layout) = match body.frontmatter {
            Some(mapping) => {
                let layout = mapping
                    .get("layout")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                (Some(mapping), layout)
            }
            None => (slide.frontmatter.clone(), slide.layout.clone()),
        };
        let transient = Slide {
            index: slide.index,
            content: body.content,
            frontmatter,
            layout,
            notes: body.notes.or_else(|| slide.notes.clone()),
        };
        lint::check(&transient, &self.config.lint)
    }

    fn record(&self, iteration: u32, content: &str, issues: &[LayoutIssue], score: u8) {
        if let Some(sink) = &self.history {
            sink.append(HistoryEntry {
                iteration,
                content: content.to_string(),
                issue_count: issues.len(),
                score,
            });
        }
    }

    /// Terminal success: apply the content and report how we stopped.
    #[allow(clippy::too_many_arguments)]
    fn settle(
        &self,
        deck: &SlideDeck,
        index: usize,
        content: String,
        issues: Vec<LayoutIssue>,
        iterations: u32,
        score: u8,
        state: EditState,
    ) -> Result<EditOutcome, DeckError> {
        let updated = deck::update_slide(deck, index, &content)?;
        tracing::debug!(slide = index, ?state, iterations, score, "edit loop finished");
        Ok(EditOutcome {
            state,
            content,
            issues,
            iterations,
            score,
            deck: updated,
            error: None,
        })
    }

    /// Terminal failure: keep the last fully received content. If no
    /// content was ever received, the deck comes back unchanged.
    fn failed(
        &self,
        deck: &SlideDeck,
        slide: &Slide,
        content: String,
        issues: Vec<LayoutIssue>,
        iterations: u32,
        error: GeneratorError,
    ) -> EditOutcome {
        let deck = if iterations > 0 && content != slide.content {
            deck::update_slide(deck, slide.index, &content).unwrap_or_else(|_| deck.clone())
        } else {
            deck.clone()
        };
        let score = lint::score(&issues, &self.config.weights);
        EditOutcome {
            state: EditState::Failed,
            content,
            issues,
            iterations,
            score,
            deck,
            error: Some(error),
        }
    }
}

// Single-shot deck operations — one delegation, no feedback loop

use crate::deck::{self, SlideDeck, SLIDE_SEPARATOR};
use crate::generators::{cleanup_response, DeckRequest, GeneratorError};
use crate::lint::{self, LayoutIssue};

use super::feedback_loop::SlideEditor;
use super::types::EditError;

impl SlideEditor {
    /// Run the detector over every slide and concatenate the findings in
    /// slide order. Pure; makes no collaborator call.
    pub fn check_deck(&self, deck: &SlideDeck) -> Vec<LayoutIssue> {
        deck.slides
            .iter()
            .flat_map(|slide| lint::check(slide, &self.config().lint))
            .collect()
    }

    /// Generate a fresh deck from a topic description.
    pub async fn generate_deck(&self, request: &DeckRequest) -> Result<SlideDeck, GeneratorError> {
        let raw = self.generator().generate_deck(request).await?;
        let text = cleanup_response(&raw);
        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(deck::parse(&text))
    }

    /// Generate a diagram block and append it to the slide's content.
    pub async fn insert_diagram(
        &self,
        deck: &SlideDeck,
        index: usize,
        description: &str,
        diagram_type: &str,
    ) -> Result<SlideDeck, EditError> {
        let slide = deck
            .slide(index)
            .ok_or(deck::DeckError::IndexOutOfRange {
                index,
                len: deck.len(),
            })?;
        let raw = self
            .generator()
            .generate_diagram(description, diagram_type)
            .await?;
        let block = cleanup_response(&raw);
        if block.is_empty() {
            return Err(GeneratorError::EmptyResponse.into());
        }
        let content = format!("{}\n\n{}", slide.content.trim_end(), block);
        Ok(deck::update_slide(deck, index, &content)?)
    }

    /// Generate an image reference and append it to the slide's content.
    pub async fn insert_image_reference(
        &self,
        deck: &SlideDeck,
        index: usize,
        prompt: &str,
    ) -> Result<SlideDeck, EditError> {
        let slide = deck
            .slide(index)
            .ok_or(deck::DeckError::IndexOutOfRange {
                index,
                len: deck.len(),
            })?;
        let raw = self.generator().generate_image_reference(prompt).await?;
        let reference = cleanup_response(&raw);
        if reference.is_empty() {
            return Err(GeneratorError::EmptyResponse.into());
        }
        let content = format!("{}\n\n{}", slide.content.trim_end(), reference);
        Ok(deck::update_slide(deck, index, &content)?)
    }

    /// Split one overloaded slide into several.
    ///
    /// Delegates once for N replacement bodies, then atomically replaces
    /// the original slide with the first body and inserts the rest right
    /// after it, re-deriving indices at every step.
    pub async fn split_slide(
        &self,
        deck: &SlideDeck,
        index: usize,
        instruction: &str,
    ) -> Result<SlideDeck, EditError> {
        let slide = deck
            .slide(index)
            .ok_or(deck::DeckError::IndexOutOfRange {
                index,
                len: deck.len(),
            })?;
        let raw = self
            .generator()
            .generate(&slide.content, instruction, &[])
            .await?;
        let cleaned = cleanup_response(&raw);
        let bodies = split_bodies(&cleaned);
        if bodies.is_empty() {
            return Err(GeneratorError::MalformedResponse(
                "split produced no slide bodies".to_string(),
            )
            .into());
        }

        let mut next = deck::update_slide(deck, index, bodies[0])?;
        for (offset, body) in bodies[1..].iter().enumerate() {
            next = deck::insert_slide(&next, index + offset + 1, body)?;
        }
        Ok(next)
    }
}

/// Cut a response into slide bodies on bare separator lines, dropping
/// empty segments. A separator pair fencing a frontmatter block is not a
/// boundary: it stays attached to the body it opens, and the body ops
/// split it back out.
fn split_bodies(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        spans.push((offset, line));
        offset += line.len();
    }

    let mut bodies = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < spans.len() {
        let (at, line) = spans[i];
        if line.trim() == SLIDE_SEPARATOR {
            push_body(&mut bodies, text, start, at);
            if let Some(close) = spans[i + 1..]
                .iter()
                .position(|(_, l)| l.trim() == SLIDE_SEPARATOR)
            {
                let candidate: Vec<&str> =
                    spans[i + 1..i + 1 + close].iter().map(|(_, l)| l.trim_end()).collect();
                if deck::parse_frontmatter_block(&candidate).is_some() {
                    start = at;
                    i += close + 2;
                    continue;
                }
            }
            start = at + line.len();
        }
        i += 1;
    }
    push_body(&mut bodies, text, start, text.len());
    bodies
}

fn push_body<'a>(bodies: &mut Vec<&'a str>, text: &'a str, start: usize, end: usize) {
    let segment = text[start..end].trim();
    if !segment.is_empty() {
        bodies.push(segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bodies_drops_empty_segments() {
        let bodies = split_bodies("# A\n---\n\n---\n# B");
        assert_eq!(bodies, vec!["# A", "# B"]);
    }

    #[test]
    fn test_split_bodies_keeps_frontmatter_with_its_body() {
        let bodies = split_bodies(
            "# Part One\n\nfirst half\n---\nlayout: center\n---\n# Part Two\n\nsecond half\n---\n# Tail\n\ntail body",
        );
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0], "# Part One\n\nfirst half");
        assert!(bodies[1].starts_with("---\nlayout: center\n---"));
        assert!(bodies[1].contains("# Part Two"));
        assert_eq!(bodies[2], "# Tail\n\ntail body");
    }

    #[test]
    fn test_split_bodies_single_body() {
        assert_eq!(split_bodies("# Only"), vec!["# Only"]);
    }

    #[test]
    fn test_split_bodies_empty_text() {
        assert!(split_bodies("").is_empty());
    }
}

// Deck model — SlideDeck / Slide value types and non-destructive operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod parser;

pub use parser::{parse, serialize};
pub(crate) use parser::{parse_frontmatter_block, parse_slide_body, SlideBody};

/// Bare line that separates slides (and delimits frontmatter blocks).
pub const SLIDE_SEPARATOR: &str = "---";

/// A full parsed presentation: global frontmatter plus an ordered slide list.
///
/// Decks are value types. Every mutating operation returns a new deck and
/// leaves its input untouched, so independent decks can be worked on
/// concurrently without coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Deck-level frontmatter (the block at the very top of the source).
    pub frontmatter: serde_yaml::Mapping,
    /// Slides in presentation order. `slides[i].index == i` always holds.
    pub slides: Vec<Slide>,
    /// Source text this deck was derived from.
    pub raw: String,
}

/// One addressable unit of content within a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Position in the deck's slide sequence, 0-based and contiguous.
    pub index: usize,
    /// Body text, excluding the slide's own frontmatter block and notes marker.
    pub content: String,
    /// Per-slide frontmatter, if the source carried one.
    pub frontmatter: Option<serde_yaml::Mapping>,
    /// Layout tag mirroring `frontmatter["layout"]` when it is a string.
    pub layout: Option<String>,
    /// Speaker notes extracted from the trailing comment block, if any.
    pub notes: Option<String>,
}

impl Slide {
    /// Build a bare slide at the given position.
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            frontmatter: None,
            layout: None,
            notes: None,
        }
    }

    /// First level-1..3 heading text, if the slide has one.
    pub fn title(&self) -> Option<&str> {
        self.content.lines().find_map(|line| {
            let trimmed = line.trim_start();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            if (1..=3).contains(&hashes) {
                let rest = trimmed[hashes..].trim();
                if !rest.is_empty() {
                    return Some(rest);
                }
            }
            None
        })
    }
}

/// Validation errors for deck operations. Raised before any generation
/// request is made, so a bad index never costs a collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("slide index {index} out of range (deck has {len} slides)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl SlideDeck {
    /// An empty deck with no frontmatter and no slides.
    pub fn empty() -> Self {
        Self {
            frontmatter: serde_yaml::Mapping::new(),
            slides: Vec::new(),
            raw: String::new(),
        }
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Content equality, ignoring `raw` (which may differ by whitespace
    /// normalization after a round trip).
    pub fn content_eq(&self, other: &Self) -> bool {
        if self.frontmatter != other.frontmatter || self.slides.len() != other.slides.len() {
            return false;
        }
        self.slides.iter().zip(&other.slides).all(|(a, b)| {
            a.index == b.index
                && a.content == b.content
                && a.frontmatter == b.frontmatter
                && a.layout == b.layout
                && a.notes == b.notes
        })
    }
}

/// Replace the content of the slide at `index`. The new content is split
/// the same way the parser splits a source slide: a leading frontmatter
/// block or trailing notes comment replaces the slide's own, while plain
/// content keeps both untouched. Returns a new deck; indices are
/// recomputed across the whole sequence.
pub fn update_slide(deck: &SlideDeck, index: usize, content: &str) -> Result<SlideDeck, DeckError> {
    if index >= deck.slides.len() {
        return Err(DeckError::IndexOutOfRange {
            index,
            len: deck.slides.len(),
        });
    }
    let mut next = deck.clone();
    apply_body(&mut next.slides[index], parse_slide_body(content));
    finish(next)
}

/// Insert a slide at `index` (which may equal the current length, for
/// append). The content is split like a source slide body. Returns a new
/// deck with contiguous indices.
pub fn insert_slide(deck: &SlideDeck, index: usize, content: &str) -> Result<SlideDeck, DeckError> {
    if index > deck.slides.len() {
        return Err(DeckError::IndexOutOfRange {
            index,
            len: deck.slides.len(),
        });
    }
    let mut next = deck.clone();
    let mut slide = Slide::new(index, "");
    apply_body(&mut slide, parse_slide_body(content));
    next.slides.insert(index, slide);
    finish(next)
}

/// Remove the slide at `index`. Returns a new deck with contiguous indices.
pub fn remove_slide(deck: &SlideDeck, index: usize) -> Result<SlideDeck, DeckError> {
    if index >= deck.slides.len() {
        return Err(DeckError::IndexOutOfRange {
            index,
            len: deck.slides.len(),
        });
    }
    let mut next = deck.clone();
    next.slides.remove(index);
    finish(next)
}

/// Write a split body into a slide. A frontmatter block in the body
/// replaces the slide's own (and re-derives `layout`); same for notes.
fn apply_body(slide: &mut Slide, body: SlideBody) {
    slide.content = body.content;
    if let Some(mapping) = body.frontmatter {
        slide.layout = mapping
            .get("layout")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        slide.frontmatter = Some(mapping);
    }
    if body.notes.is_some() {
        slide.notes = body.notes;
    }
}

/// Re-derive slide indices and refresh `raw` so the deck stays
/// self-consistent after a structural change.
fn finish(mut deck: SlideDeck) -> Result<SlideDeck, DeckError> {
    reindex(&mut deck.slides);
    deck.raw = serialize(&deck);
    Ok(deck)
}

fn reindex(slides: &mut [Slide]) {
    for (i, slide) in slides.iter_mut().enumerate() {
        slide.index = i;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_slide_deck() -> SlideDeck {
        parse("# One\n\n---\n\n# Two\n\n---\n\n# Three")
    }

    #[test]
    fn test_slide_title_extraction() {
        let slide = Slide::new(0, "intro text\n\n## Heading Here\nbody");
        assert_eq!(slide.title(), Some("Heading Here"));

        let untitled = Slide::new(0, "no heading at all");
        assert_eq!(untitled.title(), None);

        // A bare marker with no trailing text is not a title
        let bare = Slide::new(0, "#\ncontent");
        assert_eq!(bare.title(), None);
    }

    #[test]
    fn test_update_slide_is_non_destructive() {
        let deck = three_slide_deck();
        let updated = update_slide(&deck, 1, "# Replaced").unwrap();
        assert_eq!(deck.slides[1].content, "# Two");
        assert_eq!(updated.slides[1].content, "# Replaced");
        assert_eq!(updated.slides[1].index, 1);
    }

    #[test]
    fn test_insert_then_remove_restores_content() {
        let deck = three_slide_deck();
        let inserted = insert_slide(&deck, 1, "# Extra").unwrap();
        assert_eq!(inserted.len(), 4);
        assert_eq!(inserted.slides[1].content, "# Extra");
        assert_eq!(inserted.slides[2].content, "# Two");
        assert_eq!(inserted.slides[2].index, 2);

        let removed = remove_slide(&inserted, 1).unwrap();
        assert!(removed.content_eq(&deck));
    }

    #[test]
    fn test_update_slide_splits_replacement_body() {
        let deck = three_slide_deck();
        let updated = update_slide(
            &deck,
            0,
            "---\nlayout: quote\n---\n# Revised\n\nBody\n\n<!--\npause here\n-->",
        )
        .unwrap();
        let slide = &updated.slides[0];
        assert_eq!(slide.content, "# Revised\n\nBody");
        assert_eq!(slide.layout.as_deref(), Some("quote"));
        assert_eq!(slide.notes.as_deref(), Some("pause here"));
    }

    #[test]
    fn test_insert_slide_splits_replacement_body() {
        let deck = three_slide_deck();
        let inserted = insert_slide(&deck, 1, "---\nlayout: center\n---\n# Mid").unwrap();
        assert_eq!(inserted.slides[1].content, "# Mid");
        assert_eq!(inserted.slides[1].layout.as_deref(), Some("center"));
    }

    #[test]
    fn test_insert_at_end_is_allowed() {
        let deck = three_slide_deck();
        let appended = insert_slide(&deck, 3, "# Tail").unwrap();
        assert_eq!(appended.slides[3].content, "# Tail");
        assert_eq!(appended.slides[3].index, 3);
    }

    #[test]
    fn test_index_validation() {
        let deck = three_slide_deck();
        assert_eq!(
            update_slide(&deck, 3, "x"),
            Err(DeckError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            remove_slide(&deck, 5),
            Err(DeckError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            insert_slide(&deck, 4, "x"),
            Err(DeckError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn test_indices_stay_contiguous_after_remove() {
        let deck = three_slide_deck();
        let removed = remove_slide(&deck, 0).unwrap();
        let indices: Vec<usize> = removed.slides.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}

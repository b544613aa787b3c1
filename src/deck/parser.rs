// Deck text parsing and serialization
//
// The parser is total: malformed frontmatter never raises. A block that
// fails to parse as YAML is kept as plain slide content instead.

use super::{Slide, SlideDeck, SLIDE_SEPARATOR};

/// Marker pair for trailing speaker-notes comments.
const NOTES_OPEN: &str = "<!--";
const NOTES_CLOSE: &str = "-->";

/// Parse deck text into a [`SlideDeck`].
///
/// Line endings are normalized and the input trimmed. A frontmatter block
/// at the very start becomes deck frontmatter; the remaining body splits on
/// bare separator lines into slide bodies (empty segments dropped). Each
/// body may carry its own leading frontmatter block and a trailing notes
/// comment; both are stripped out of `content`.
///
/// An empty body yields a deck with zero slides.
pub fn parse(text: &str) -> SlideDeck {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();

    let lines: Vec<&str> = trimmed.lines().collect();
    let mut frontmatter = serde_yaml::Mapping::new();
    let mut start = 0;

    // Deck frontmatter: a block delimited by bare separators at the very top.
    if lines.first().map(|l| is_separator(l)) == Some(true) {
        if let Some(close) = lines[1..].iter().position(|l| is_separator(l)) {
            let block = lines[1..=close].join("\n");
            match serde_yaml::from_str::<serde_yaml::Mapping>(&block) {
                Ok(mapping) => {
                    frontmatter = mapping;
                    start = close + 2;
                }
                Err(err) => {
                    // Leave the lines in place; they fall through to the
                    // slide splitter as plain content.
                    tracing::warn!("malformed deck frontmatter, keeping as content: {err}");
                }
            }
        }
    }

    let slides = split_slides(&lines[start..]);

    SlideDeck {
        frontmatter,
        slides,
        raw: trimmed.to_string(),
    }
}

/// Serialize a deck back to text: global frontmatter block (only if
/// non-empty), then each slide in source order. A slide emits its own
/// frontmatter block, content, and notes block in that fixed order.
pub fn serialize(deck: &SlideDeck) -> String {
    let mut out = String::new();

    if !deck.frontmatter.is_empty() {
        out.push_str(SLIDE_SEPARATOR);
        out.push('\n');
        out.push_str(&yaml_block(&deck.frontmatter));
        out.push_str(SLIDE_SEPARATOR);
        out.push('\n');
    }

    for (i, slide) in deck.slides.iter().enumerate() {
        let has_own_fence = slide.frontmatter.as_ref().map_or(false, |m| !m.is_empty());

        if i > 0 {
            // The separator between slides doubles as the opening fence of
            // the next slide's frontmatter block.
            out.push('\n');
            out.push_str(SLIDE_SEPARATOR);
            out.push('\n');
        } else if has_own_fence {
            // A first slide with its own frontmatter still needs an
            // opening fence.
            out.push_str(SLIDE_SEPARATOR);
            out.push('\n');
        }

        if let Some(mapping) = &slide.frontmatter {
            if !mapping.is_empty() {
                out.push_str(&yaml_block(mapping));
                out.push_str(SLIDE_SEPARATOR);
                out.push('\n');
            }
        }

        out.push_str(slide.content.trim());

        if let Some(notes) = &slide.notes {
            if !notes.trim().is_empty() {
                out.push_str("\n\n");
                out.push_str(NOTES_OPEN);
                out.push('\n');
                out.push_str(notes.trim());
                out.push('\n');
                out.push_str(NOTES_CLOSE);
            }
        }
    }

    out.trim().to_string()
}

fn is_separator(line: &str) -> bool {
    line.trim() == SLIDE_SEPARATOR
}

/// One slide body split into its parts.
pub(crate) struct SlideBody {
    pub frontmatter: Option<serde_yaml::Mapping>,
    pub content: String,
    pub notes: Option<String>,
}

/// Split a single slide body the way the deck parser would: an optional
/// leading frontmatter block, the content proper, and a trailing notes
/// comment. Replacement content often arrives in the persisted slide
/// format; stored verbatim it would leak fences and notes markers into
/// [`Slide::content`].
pub(crate) fn parse_slide_body(text: &str) -> SlideBody {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    let lines: Vec<&str> = trimmed.lines().collect();

    let mut frontmatter = None;
    let mut start = 0;
    if lines.first().map(|l| is_separator(l)) == Some(true) {
        if let Some(close) = lines[1..].iter().position(|l| is_separator(l)) {
            if let Some(mapping) = parse_frontmatter_block(&lines[1..=close]) {
                frontmatter = Some(mapping);
                start = close + 2;
            }
        }
    }

    let (content, notes) = extract_notes(&lines[start..].join("\n"));
    SlideBody {
        frontmatter,
        content,
        notes,
    }
}

fn yaml_block(mapping: &serde_yaml::Mapping) -> String {
    match serde_yaml::to_string(mapping) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("failed to serialize frontmatter block: {err}");
            String::new()
        }
    }
}

/// Split body lines into slides, consuming per-slide frontmatter blocks.
fn split_slides(lines: &[&str]) -> Vec<Slide> {
    let mut slides = Vec::new();
    let mut pending_fm: Option<serde_yaml::Mapping> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_separator(line) {
            flush(&mut slides, &mut body, &mut pending_fm);

            // A frontmatter block needs a closing separator. Look ahead for
            // one; the lines between must look like a YAML mapping.
            if let Some(offset) = lines[i + 1..].iter().position(|l| is_separator(l)) {
                let candidate = &lines[i + 1..i + 1 + offset];
                if let Some(mapping) = parse_frontmatter_block(candidate) {
                    pending_fm = Some(mapping);
                    i += offset + 2;
                    continue;
                }
            }
            i += 1;
        } else {
            body.push(line);
            i += 1;
        }
    }
    flush(&mut slides, &mut body, &mut pending_fm);
    slides
}

/// Close out the current slide, if it has any substance.
fn flush(slides: &mut Vec<Slide>, body: &mut Vec<&str>, fm: &mut Option<serde_yaml::Mapping>) {
    let text = body.join("\n").trim().to_string();
    body.clear();
    let frontmatter = fm.take();

    if text.is_empty() && frontmatter.is_none() {
        return;
    }

    let (content, notes) = extract_notes(&text);
    let layout = frontmatter.as_ref().and_then(|m| {
        m.get("layout")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    });

    slides.push(Slide {
        index: slides.len(),
        content,
        frontmatter,
        layout,
        notes,
    });
}

/// Try to read a candidate block as per-slide frontmatter.
///
/// The block must be non-empty, every top-level line must look like a
/// `key: value` pair (continuation lines may be indented), and the whole
/// thing must parse as a YAML mapping. Anything else is slide content and
/// the separator was just a slide boundary.
pub(crate) fn parse_frontmatter_block(lines: &[&str]) -> Option<serde_yaml::Mapping> {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return None;
    }
    let plausible = lines.iter().all(|line| {
        line.trim().is_empty()
            || line.starts_with(char::is_whitespace)
            || looks_like_yaml_key(line)
    });
    if !plausible {
        return None;
    }
    match serde_yaml::from_str::<serde_yaml::Mapping>(&lines.join("\n")) {
        Ok(mapping) if !mapping.is_empty() => Some(mapping),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("malformed slide frontmatter, keeping as content: {err}");
            None
        }
    }
}

fn looks_like_yaml_key(line: &str) -> bool {
    match line.split_once(':') {
        Some((key, _)) => {
            let key = key.trim();
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Split a trailing `<!-- ... -->` comment off the body as speaker notes.
fn extract_notes(body: &str) -> (String, Option<String>) {
    let trimmed = body.trim();
    if !trimmed.ends_with(NOTES_CLOSE) {
        return (trimmed.to_string(), None);
    }
    match trimmed.rfind(NOTES_OPEN) {
        Some(open) => {
            let inner = &trimmed[open + NOTES_OPEN.len()..trimmed.len() - NOTES_CLOSE.len()];
            let content = trimmed[..open].trim().to_string();
            let notes = inner.trim();
            if notes.is_empty() {
                (content, None)
            } else {
                (content, Some(notes.to_string()))
            }
        }
        None => (trimmed.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_body_yields_zero_slides() {
        assert!(parse("").slides.is_empty());
        assert!(parse("   \n\n  ").slides.is_empty());
    }

    #[test]
    fn test_parse_single_slide() {
        let deck = parse("# Hello\n\nSome body text");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].content, "# Hello\n\nSome body text");
        assert!(deck.frontmatter.is_empty());
    }

    #[test]
    fn test_parse_deck_frontmatter() {
        let deck = parse("---\ntitle: Demo\ntheme: default\n---\n\n# First");
        assert_eq!(
            deck.frontmatter.get("title").and_then(|v| v.as_str()),
            Some("Demo")
        );
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].content, "# First");
    }

    #[test]
    fn test_parse_slide_frontmatter_and_layout() {
        let deck = parse("# One\n\n---\nlayout: center\n---\n\n# Two");
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[1].layout.as_deref(), Some("center"));
        assert_eq!(deck.slides[1].content, "# Two");
        // Slide content never contains its own frontmatter block
        assert!(!deck.slides[1].content.contains("layout"));
    }

    #[test]
    fn test_parse_notes_marker() {
        let deck = parse("# Slide\n\nBody\n\n<!--\nRemember to pause here.\n-->");
        assert_eq!(deck.slides[0].content, "# Slide\n\nBody");
        assert_eq!(
            deck.slides[0].notes.as_deref(),
            Some("Remember to pause here.")
        );
    }

    #[test]
    fn test_malformed_frontmatter_falls_back_to_content() {
        // Not valid YAML between the separators: stays slide content.
        let deck = parse("# One\n\n---\n: : bad [yaml\n---\n\n# Two");
        let joined: Vec<&str> = deck.slides.iter().map(|s| s.content.as_str()).collect();
        assert!(joined.contains(&": : bad [yaml"));
        assert!(deck.slides.iter().all(|s| s.frontmatter.is_none()));
    }

    #[test]
    fn test_plain_content_between_separators_is_a_slide() {
        // "key: value"-free prose must never be eaten as frontmatter.
        let deck = parse("# One\n\n---\n\nJust some prose\n\n---\n\n# Three");
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.slides[1].content, "Just some prose");
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let deck = parse("# One\n\n---\n\n---\n\n# Two");
        assert_eq!(deck.slides.len(), 2);
    }

    #[test]
    fn test_crlf_normalization() {
        let deck = parse("# One\r\n\r\n---\r\n\r\n# Two");
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0].content, "# One");
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let source = "---\ntitle: Demo\n---\n\n# Intro\n\nhello\n\n---\nlayout: center\n---\n\n# Mid\n\n<!--\nnote text\n-->\n\n---\n\n# End";
        let deck = parse(source);
        let rendered = serialize(&deck);
        let reparsed = parse(&rendered);
        assert!(deck.content_eq(&reparsed), "round trip changed the deck");
    }

    #[test]
    fn test_serialize_orders_frontmatter_content_notes() {
        let mut deck = parse("# A");
        let mut fm = serde_yaml::Mapping::new();
        fm.insert("layout".into(), "quote".into());
        deck.slides[0].frontmatter = Some(fm);
        deck.slides[0].notes = Some("speak slowly".to_string());

        let text = serialize(&deck);
        let layout_pos = text.find("layout: quote").unwrap();
        let content_pos = text.find("# A").unwrap();
        let notes_pos = text.find("speak slowly").unwrap();
        assert!(layout_pos < content_pos && content_pos < notes_pos);
    }

    #[test]
    fn test_parse_slide_body_splits_parts() {
        let body = parse_slide_body("---\nlayout: quote\n---\n# A\n\ntext\n\n<!--\nslow down\n-->");
        assert_eq!(body.content, "# A\n\ntext");
        assert_eq!(
            body.frontmatter
                .unwrap()
                .get("layout")
                .and_then(|v| v.as_str()),
            Some("quote")
        );
        assert_eq!(body.notes.as_deref(), Some("slow down"));
    }

    #[test]
    fn test_parse_slide_body_plain_content_passes_through() {
        let body = parse_slide_body("# A\n\nplain text");
        assert_eq!(body.content, "# A\n\nplain text");
        assert!(body.frontmatter.is_none());
        assert!(body.notes.is_none());
    }

    #[test]
    fn test_serialize_empty_deck_frontmatter_omitted() {
        let deck = parse("# Only");
        assert!(!serialize(&deck).starts_with(SLIDE_SEPARATOR));
    }
}

// Response cleanup — generators wrap answers in fences and chatty prefixes
//
// Applied to every collaborator text response before it is treated as
// slide or deck content. Idempotent: clean text passes through untouched.

use crate::deck::SLIDE_SEPARATOR;

/// Fence language tags the outer-fence strip recognizes. Anything else
/// (e.g. `rust`) is a real code block and must be left alone.
const WRAPPER_FENCE_LANGS: &[&str] = &["", "markdown", "md", "yaml", "yml", "text", "plain"];

/// An explanatory prefix longer than this is probably content.
const MAX_PREFIX_CHARS: usize = 100;

/// Normalize a raw generator response into usable content.
///
/// Two transforms, in order:
/// 1. If the entire response is wrapped in one markdown fence with a
///    recognized language tag, strip the fence pair.
/// 2. If a short single prose line precedes the first structural
///    separator ("Here is your slide:" and the like), drop it.
pub fn cleanup_response(text: &str) -> String {
    let unfenced = strip_outer_fence(text.trim());
    strip_explanatory_prefix(unfenced).trim().to_string()
}

fn strip_outer_fence(text: &str) -> &str {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return text;
    };
    let Some(tag) = first.strip_prefix("```") else {
        return text;
    };
    if !WRAPPER_FENCE_LANGS.contains(&tag.trim().to_lowercase().as_str()) {
        return text;
    }
    if text.lines().last().map(str::trim) != Some("```") {
        return text;
    }
    let body_start = first.len() + 1;
    let body_end = text.trim_end().len() - "```".len();
    if body_start > body_end {
        return text;
    }
    text[body_start..body_end].trim_matches('\n')
}

fn strip_explanatory_prefix(text: &str) -> &str {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return text;
    };
    let first_trimmed = first.trim();
    if first_trimmed.is_empty() || first_trimmed.chars().count() >= MAX_PREFIX_CHARS {
        return text;
    }
    // Structural or markdown-looking first lines are content, not chatter.
    if first_trimmed.starts_with(SLIDE_SEPARATOR)
        || first_trimmed.starts_with('#')
        || first_trimmed.starts_with('-')
        || first_trimmed.starts_with('*')
        || first_trimmed.starts_with('!')
        || first_trimmed.starts_with('`')
        || first_trimmed.starts_with('<')
    {
        return text;
    }
    // Only a prefix that sits right before the first separator is chatter.
    match lines.find(|l| !l.trim().is_empty()) {
        Some(next) if next.trim() == SLIDE_SEPARATOR => {
            text[first.len()..].trim_start_matches('\n')
        }
        _ => text,
    }
}

// The seven heuristic checks, run unconditionally in a fixed order

use once_cell::sync::Lazy;
use regex::Regex;

use super::{IssueMeta, IssueType, LayoutIssue, LintConfig, Severity};
use crate::deck::Slide;

/// Below this many meaningful characters a slide counts as empty.
const EMPTY_SLIDE_MIN_CHARS: usize = 10;
/// Lines longer than this (bullet markers removed) are flagged in aggregate.
const LONG_LINE_LIMIT: usize = 100;
/// Fenced code blocks over these line counts draw a warning / an error.
const CODE_BLOCK_WARN_LINES: usize = 20;
const CODE_BLOCK_ERROR_LINES: usize = 30;
/// Exceeding a threshold by this factor escalates warning to error.
const ESCALATION_FACTOR: f64 = 1.5;
/// Images shrink the usable text budget to this fraction, per image.
const IMAGE_CROWDING_FACTOR: f64 = 0.6;

/// Layouts that legitimately carry no heading.
const TITLE_EXEMPT_LAYOUTS: &[&str] = &["cover", "intro", "center", "quote", "image", "end"];

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
// Marker and text must share the line; `\s` would match across the newline.
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,3}[ \t]+\S").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

/// Languages of fenced blocks that are diagrams rather than code.
const DIAGRAM_LANGS: &[&str] = &["mermaid", "plantuml", "dot", "graphviz"];

/// Run every check against one slide. Checks are independent; results are
/// concatenated in check order so the output is deterministic.
pub fn check(slide: &Slide, config: &LintConfig) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    check_empty_slide(slide, &mut issues);
    check_missing_title(slide, &mut issues);
    check_text_length(slide, config, &mut issues);
    check_long_lines(slide, &mut issues);
    check_bullet_count(slide, config, &mut issues);
    check_image_crowding(slide, config, &mut issues);
    check_code_blocks(slide, &mut issues);
    issues
}

/// 1. Too little meaningful text once markup is stripped away.
fn check_empty_slide(slide: &Slide, issues: &mut Vec<LayoutIssue>) {
    let stripped = strip_for_emptiness(&slide.content);
    if stripped.chars().count() < EMPTY_SLIDE_MIN_CHARS {
        issues.push(LayoutIssue {
            issue_type: IssueType::EmptySlide,
            message: format!(
                "slide {} has almost no text content",
                slide.index + 1
            ),
            severity: Severity::Warning,
            slide_index: slide.index,
            suggestion: Some("add content to the slide or remove it".to_string()),
            meta: Some(IssueMeta {
                char_count: Some(stripped.chars().count()),
                ..IssueMeta::default()
            }),
        });
    }
}

/// 2. No level-1..3 heading, unless the layout legitimately has none.
fn check_missing_title(slide: &Slide, issues: &mut Vec<LayoutIssue>) {
    if let Some(layout) = &slide.layout {
        if TITLE_EXEMPT_LAYOUTS.contains(&layout.as_str()) {
            return;
        }
    }
    if !HEADING_RE.is_match(&slide.content) {
        issues.push(LayoutIssue {
            issue_type: IssueType::MissingTitle,
            message: format!("slide {} has no title heading", slide.index + 1),
            severity: Severity::Info,
            slide_index: slide.index,
            suggestion: Some("start the slide with a # or ## heading".to_string()),
            meta: None,
        });
    }
}

/// 3. Whole-slide character count against the configured budget.
fn check_text_length(slide: &Slide, config: &LintConfig, issues: &mut Vec<LayoutIssue>) {
    let stripped = strip_fences_and_images(&slide.content);
    let count = stripped.trim().chars().count();
    let limit = config.max_chars_per_slide;
    if count <= limit {
        return;
    }
    let severity = if count as f64 > limit as f64 * ESCALATION_FACTOR {
        Severity::Error
    } else {
        Severity::Warning
    };
    issues.push(LayoutIssue {
        issue_type: IssueType::TooLongText,
        message: format!(
            "slide {} has {count} characters of text (limit {limit})",
            slide.index + 1
        ),
        severity,
        slide_index: slide.index,
        suggestion: Some("split the slide or tighten the wording".to_string()),
        meta: Some(IssueMeta {
            char_count: Some(count),
            ..IssueMeta::default()
        }),
    });
}

/// 4. Aggregate count of individual lines that run too long.
fn check_long_lines(slide: &Slide, issues: &mut Vec<LayoutIssue>) {
    let stripped = strip_fences_and_images(&slide.content);
    let long = stripped
        .lines()
        .map(|line| BULLET_RE.replace(line, ""))
        .filter(|line| line.chars().count() > LONG_LINE_LIMIT)
        .count();
    if long == 0 {
        return;
    }
    issues.push(LayoutIssue {
        issue_type: IssueType::TooLongText,
        message: format!(
            "slide {} has {long} line(s) over {LONG_LINE_LIMIT} characters",
            slide.index + 1
        ),
        severity: Severity::Info,
        slide_index: slide.index,
        suggestion: Some("wrap long lines or shorten them".to_string()),
        meta: Some(IssueMeta {
            long_lines: Some(long),
            ..IssueMeta::default()
        }),
    });
}

/// 5. Bullet and numbered-list density against the configured budget.
fn check_bullet_count(slide: &Slide, config: &LintConfig, issues: &mut Vec<LayoutIssue>) {
    let count = slide
        .content
        .lines()
        .filter(|line| BULLET_RE.is_match(line))
        .count();
    let limit = config.max_bullets_per_slide;
    if count <= limit {
        return;
    }
    let severity = if count as f64 > limit as f64 * ESCALATION_FACTOR {
        Severity::Error
    } else {
        Severity::Warning
    };
    issues.push(LayoutIssue {
        issue_type: IssueType::TooManyBullets,
        message: format!(
            "slide {} has {count} bullet points (limit {limit})",
            slide.index + 1
        ),
        severity,
        slide_index: slide.index,
        suggestion: Some("split the list across slides or group related points".to_string()),
        meta: Some(IssueMeta {
            bullet_count: Some(count),
            ..IssueMeta::default()
        }),
    });
}

/// 6. Text crowding when images or diagrams share the slide. Each image
/// shrinks the character budget; only runs when at least one is present.
fn check_image_crowding(slide: &Slide, config: &LintConfig, issues: &mut Vec<LayoutIssue>) {
    let image_count = count_images(&slide.content);
    if image_count == 0 {
        return;
    }
    let adjusted =
        (config.max_chars_per_slide as f64 * IMAGE_CROWDING_FACTOR / image_count as f64) as usize;
    let stripped = strip_fences_and_images(&slide.content);
    let count = stripped.trim().chars().count();
    if count <= adjusted {
        return;
    }
    issues.push(LayoutIssue {
        issue_type: IssueType::ImageTextCrowded,
        message: format!(
            "slide {} mixes {image_count} image(s) with {count} characters of text (adjusted limit {adjusted})",
            slide.index + 1
        ),
        severity: Severity::Warning,
        slide_index: slide.index,
        suggestion: Some("move the text or the images to a separate slide".to_string()),
        meta: Some(IssueMeta {
            char_count: Some(count),
            image_count: Some(image_count),
            ..IssueMeta::default()
        }),
    });
}

/// 7. Oversized fenced code blocks.
fn check_code_blocks(slide: &Slide, issues: &mut Vec<LayoutIssue>) {
    for block in fenced_blocks(&slide.content) {
        let lines = block.line_count;
        let severity = if lines > CODE_BLOCK_ERROR_LINES {
            Severity::Error
        } else if lines > CODE_BLOCK_WARN_LINES {
            Severity::Warning
        } else {
            continue;
        };
        issues.push(LayoutIssue {
            issue_type: IssueType::CodeBlockTooLong,
            message: format!(
                "slide {} has a {lines}-line code block",
                slide.index + 1
            ),
            severity,
            slide_index: slide.index,
            suggestion: Some("trim the example or split it across slides".to_string()),
            meta: None,
        });
    }
}

// ── Markdown stripping helpers ────────────────────────────────────────────

struct FencedBlock {
    lang: String,
    line_count: usize,
}

/// Collect fenced blocks with their language tag and body line count.
fn fenced_blocks(content: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<FencedBlock> = None;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            match current.take() {
                Some(block) => blocks.push(block),
                None => {
                    current = Some(FencedBlock {
                        lang: trimmed.trim_start_matches('`').trim().to_lowercase(),
                        line_count: 0,
                    });
                }
            }
        } else if let Some(block) = current.as_mut() {
            block.line_count += 1;
        }
    }
    // An unclosed fence still counts
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

/// Remove fenced blocks (fences included) and image references.
fn strip_fences_and_images(content: &str) -> String {
    let mut kept = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            kept.push(line);
        }
    }
    IMAGE_RE.replace_all(&kept.join("\n"), "").into_owned()
}

/// Stripping for the emptiness check: fences, images, heading markers, and
/// inline markup all go; whitespace collapses so only real text is counted.
fn strip_for_emptiness(content: &str) -> String {
    let base = strip_fences_and_images(content);
    let mut lines = Vec::new();
    for line in base.lines() {
        let trimmed = line.trim_start();
        let hashes = trimmed.chars().take_while(|c| *c == '#').count();
        let line = if hashes > 0 { trimmed[hashes..].trim_start() } else { line };
        lines.push(line);
    }
    let joined = lines.join(" ");
    let unlinked = LINK_RE.replace_all(&joined, "$1");
    let plain: String = unlinked
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`' | '~' | '>' | '|'))
        .collect();
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn count_images(content: &str) -> usize {
    let refs = IMAGE_RE.find_iter(content).count();
    let diagrams = fenced_blocks(content)
        .iter()
        .filter(|b| DIAGRAM_LANGS.contains(&b.lang.as_str()))
        .count();
    refs + diagrams
}

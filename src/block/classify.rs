//! Line classification for the subdocument state.

use crate::ast::{ListStyle, RuleStyle};
use crate::text;

pub(super) enum LineKind {
    Header,
    Rule(RuleStyle),
    CodeFence,
    Comment,
    List { style: ListStyle, marker: u8 },
    Paragraph,
}

/// Classify a line whose indent matches the open subdocument. `trimmed` has
/// its surrounding whitespace removed.
pub(super) fn classify(trimmed: &str) -> LineKind {
    if trimmed.starts_with('#') {
        return LineKind::Header;
    }
    if let Some(style) = rule_style(trimmed) {
        return LineKind::Rule(style);
    }
    if trimmed.starts_with(">>") {
        return LineKind::CodeFence;
    }
    if trimmed.starts_with('>') {
        return LineKind::Comment;
    }
    if let Some((style, marker)) = list_marker(trimmed) {
        return LineKind::List { style, marker };
    }
    LineKind::Paragraph
}

/// A rule line is entirely one repeated character from `-`, `=`, `` ` ``.
/// The first character picks the style.
pub(super) fn rule_style(trimmed: &str) -> Option<RuleStyle> {
    let bytes = trimmed.as_bytes();
    let &first = bytes.first()?;
    if !matches!(first, b'-' | b'=' | b'`') || bytes.iter().any(|&b| b != first) {
        return None;
    }
    Some(match first {
        b'-' => RuleStyle::Solid,
        b'=' => RuleStyle::PageBreak,
        _ => RuleStyle::Dotted,
    })
}

/// A list opens at `* ` (bullets) or `% ` (numbered); a bare marker with
/// nothing after it opens an empty item.
pub(super) fn list_marker(trimmed: &str) -> Option<(ListStyle, u8)> {
    let bytes = trimmed.as_bytes();
    let &first = bytes.first()?;
    let style = match first {
        b'*' => ListStyle::Bullets,
        b'%' => ListStyle::Numbered,
        _ => return None,
    };
    match bytes.get(1) {
        None | Some(b' ') => Some((style, first)),
        _ => None,
    }
}

/// Split a code fence line into its `>` run length and trimmed language
/// tag. The caller has already stripped indentation.
pub(super) fn split_fence(stripped: &str) -> (usize, &str) {
    let trimmed = text::trim(stripped, true, true);
    let rest = text::trim_char(trimmed, '>', true, false);
    let run = trimmed.len() - rest.len();
    (run, text::trim(rest, true, true))
}

/// True when a stripped interior line closes a fence of `fence_len`:
/// nothing but a `>` run of exactly that length.
pub(super) fn is_closing_fence(stripped: &str, fence_len: usize) -> bool {
    let trimmed = text::trim(stripped, true, true);
    !trimmed.is_empty()
        && trimmed.len() == fence_len
        && trimmed.bytes().all(|b| b == b'>')
}

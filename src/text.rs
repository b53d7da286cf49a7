//! Text primitives: zero-copy span helpers, indentation measurement, and
//! backslash-escape resolution.
//!
//! Whitespace throughout this module is the set the block parser cares
//! about: codepoints 9–13 and 32. A tab counts as 4 columns, everything
//! else as 1.

use crate::utf8;

#[inline]
pub(crate) fn is_space_point(point: u32) -> bool {
    (9..=13).contains(&point) || point == 32
}

/// Snap a byte index to the nearest char boundary at or below it.
#[inline]
fn floor_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Python-style substring: half-open byte range, negative indices count
/// from the end, inverted or out-of-range ranges yield `""`. O(1), aliases
/// the input.
pub fn substr(s: &str, i1: i32, i2: i32) -> &str {
    let len = s.len() as i64;
    let resolve = |i: i32| -> usize {
        let i = i as i64;
        let i = if i < 0 { len + i } else { i };
        i.clamp(0, len) as usize
    };
    let start = floor_boundary(s, resolve(i1));
    let end = floor_boundary(s, resolve(i2));
    if end <= start { "" } else { &s[start..end] }
}

/// Indentation of a line in columns. An all-whitespace line reports 0 so
/// blank lines are never mistaken for deeply indented content.
pub fn indent_of(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut cols = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' => {
                cols += 1;
                pos += 1;
            }
            b'\t' => {
                cols += 4;
                pos += 1;
            }
            _ => {
                let (point, size) = utf8::decode(&bytes[pos..]);
                if !is_space_point(point) {
                    return cols;
                }
                cols += 1;
                pos += size;
            }
        }
    }
    0
}

/// Trim whitespace from either end. Returns a subslice of the input.
pub fn trim(s: &str, front: bool, back: bool) -> &str {
    let mut out = s;
    if front {
        out = out.trim_start_matches(|c: char| is_space_point(c as u32));
    }
    if back {
        out = out.trim_end_matches(|c: char| is_space_point(c as u32));
    }
    out
}

/// Trim a specific repeated codepoint from either end.
pub fn trim_char(s: &str, c: char, front: bool, back: bool) -> &str {
    let mut out = s;
    if front {
        out = out.trim_start_matches(c);
    }
    if back {
        out = out.trim_end_matches(c);
    }
    out
}

/// Owned copy of `s` with exactly `n` leading columns removed. When the
/// last consumed character is a tab that overshoots `n`, the remainder of
/// the tab is re-padded with literal spaces so nested content keeps its
/// relative indentation.
pub fn strip_indent(s: &str, n: usize) -> String {
    let bytes = s.as_bytes();
    let mut cols = 0;
    let mut pos = 0;
    while cols < n && pos < bytes.len() {
        match bytes[pos] {
            b' ' => {
                cols += 1;
                pos += 1;
            }
            b'\t' => {
                cols += 4;
                pos += 1;
            }
            _ => {
                let (point, size) = utf8::decode(&bytes[pos..]);
                if !is_space_point(point) {
                    break;
                }
                cols += 1;
                pos += size;
            }
        }
    }
    let padding = cols.saturating_sub(n);
    let rest = &s[pos..];
    let mut out = String::with_capacity(padding + rest.len());
    for _ in 0..padding {
        out.push(' ');
    }
    out.push_str(rest);
    out
}

/// Byte length of one whole escape unit starting at `pos` (which must point
/// at a backslash). A `\(hex…)` unit runs to the closing paren or end of
/// input; any other escape covers the backslash plus the full UTF-8
/// sequence of the next character. Delimiter scanners step by this so a
/// multi-byte or parenthesized escape is never split.
pub(crate) fn escape_len(bytes: &[u8], pos: usize) -> usize {
    debug_assert_eq!(bytes[pos], b'\\');
    let remaining = bytes.len() - pos;
    if remaining == 1 {
        return 1;
    }
    if bytes[pos + 1] == b'(' {
        let mut end = pos + 2;
        while end < bytes.len() && bytes[end] != b')' {
            end += 1;
        }
        if end < bytes.len() {
            end += 1;
        }
        return end - pos;
    }
    let mut size = utf8::byte_size_of_lead(bytes[pos + 1]);
    if size == 0 {
        size = 1;
    }
    (1 + size).min(remaining)
}

/// Resolve backslash escapes into an owned string.
///
/// `\n \t \b \f \v \r` become their control characters, `\(hex…)` becomes
/// the codepoint named by the hex digits, and any other `\X` becomes the
/// literal `X`: the backslash universally escapes the next character. A
/// trailing unescaped backslash is dropped.
pub fn resolve_escapes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            let start = pos;
            while pos < bytes.len() && bytes[pos] != b'\\' {
                pos += 1;
            }
            out.push_str(&s[start..pos]);
            continue;
        }
        let unit = escape_len(bytes, pos);
        if unit == 1 {
            // Trailing backslash at end of input.
            pos += 1;
            continue;
        }
        if bytes[pos + 1] == b'(' {
            push_hex_escape(&mut out, &s[pos..pos + unit]);
            pos += unit;
            continue;
        }
        match bytes[pos + 1] {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'r' => out.push('\r'),
            _ => out.push_str(&s[pos + 1..pos + unit]),
        }
        pos += unit;
    }
    out
}

/// `unit` is a full `\(…)` escape, possibly missing its closing paren at
/// end of input. Bad hex or an out-of-range value resolves to nothing.
fn push_hex_escape(out: &mut String, unit: &str) {
    let digits = unit
        .strip_prefix("\\(")
        .unwrap_or("")
        .trim_end_matches(')');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return;
    }
    let Ok(point) = u32::from_str_radix(digits, 16) else {
        return;
    };
    let mut buf = [0u8; 4];
    let n = utf8::encode(point, &mut buf);
    if n > 0
        && let Ok(encoded) = std::str::from_utf8(&buf[..n])
    {
        out.push_str(encoded);
    }
}

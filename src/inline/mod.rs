//! Recursive-descent parser for inline markup.
//!
//! Input is one assembled logical line: indentation already stripped and
//! physical lines already joined by the block parser. The grammar is
//! `line := (plain-run | span)*`, where a span opens at an unescaped `[`,
//! optionally starts with one-letter flags terminated by `:`, recurses for
//! its body until the first unescaped `]` at the current level, and may be
//! followed by a `(data)` payload.
//!
//! Malformed input is never an error: an unmatched `[` closes implicitly at
//! end of input, and a bare `]` in root-level prose is literal text.

use tracing::warn;

use crate::ast::{Inline, MarkupSet};
use crate::text::{escape_len, resolve_escapes};

/// Spans nested deeper than this are parsed as plain text, bounding
/// recursion on adversarial input.
const MAX_SPAN_DEPTH: usize = 64;

/// Parse one assembled line of text into an inline tree.
///
/// When the input is exactly one markup span, that span's node is returned
/// directly, so its flags and data payload are visible at the top level.
pub fn parse_inline(input: &str) -> Inline {
    let mut parser = InlineParser {
        input,
        bytes: input.as_bytes(),
        pos: 0,
    };
    let mut nodes = parser.parse_run(0);
    match nodes.len() {
        0 => Inline::leaf(""),
        1 => nodes.pop().unwrap(),
        _ => Inline {
            children: nodes,
            ..Inline::default()
        },
    }
}

struct InlineParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> InlineParser<'a> {
    /// Parse spans and plain runs until an unescaped `]` at this level
    /// (`depth > 0` only) or end of input.
    fn parse_run(&mut self, depth: usize) -> Vec<Inline> {
        let mut nodes = Vec::new();
        let mut text_start = self.pos;

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => {
                    // Skip the whole escape unit so a multi-byte or
                    // parenthesized-hex escape is never split.
                    self.pos += escape_len(self.bytes, self.pos);
                }
                b']' if depth > 0 => break,
                b'[' => {
                    if depth >= MAX_SPAN_DEPTH {
                        warn!(depth, "span nesting cap reached, reading bracket as text");
                        self.pos += 1;
                        continue;
                    }
                    self.flush_text(&mut nodes, text_start);
                    nodes.push(self.parse_span(depth + 1));
                    text_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }

        self.flush_text(&mut nodes, text_start);
        nodes
    }

    /// Parse one span; `self.pos` sits on the opening `[`.
    fn parse_span(&mut self, depth: usize) -> Inline {
        self.pos += 1;
        let markup = self.scan_flags();
        let children = self.parse_run(depth);
        if self.pos < self.bytes.len() {
            self.pos += 1; // consume `]`; absent at EOF (implicit close)
        }
        let data = self.scan_data();

        let mut node = Inline {
            markup,
            data,
            ..Inline::default()
        };
        let mut children = children;
        if children.len() == 1 && children[0].markup.is_empty() && children[0].is_leaf() {
            let only = children.pop().unwrap();
            if node.markup.is_empty() && node.data.is_none() {
                // Unstyled bracket around plain text collapses entirely.
                return only;
            }
            node.text = only.text;
        } else {
            node.children = children;
        }
        if node.is_leaf() && node.text.is_empty() {
            // A span with no body displays its data payload.
            if let Some(data) = &node.data {
                node.text = data.clone();
            }
        }
        node
    }

    /// Scan flag letters after `[`. Flags are only consumed when the letter
    /// run is immediately terminated by `:`; otherwise the body starts at
    /// the byte after `[`. Unrecognized letters are ignored.
    fn scan_flags(&mut self) -> MarkupSet {
        let start = self.pos;
        let mut markup = MarkupSet::empty();
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_alphabetic() {
            if let Some(flag) = MarkupSet::from_letter(self.bytes[self.pos]) {
                markup.insert(flag);
            }
            self.pos += 1;
        }
        if self.pos < self.bytes.len() && self.bytes[self.pos] == b':' {
            self.pos += 1;
            markup
        } else {
            self.pos = start;
            MarkupSet::empty()
        }
    }

    /// Capture a `(data)` payload immediately following `]`. Runs to the
    /// first unescaped `)` or end of input, resolving escapes.
    fn scan_data(&mut self) -> Option<String> {
        if self.pos >= self.bytes.len() || self.bytes[self.pos] != b'(' {
            return None;
        }
        self.pos += 1;
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b')' {
            if self.bytes[self.pos] == b'\\' {
                self.pos += escape_len(self.bytes, self.pos);
            } else {
                self.pos += 1;
            }
        }
        let data = resolve_escapes(&self.input[start..self.pos]);
        if self.pos < self.bytes.len() {
            self.pos += 1; // consume `)`
        }
        Some(data)
    }

    fn flush_text(&mut self, nodes: &mut Vec<Inline>, start: usize) {
        if start < self.pos {
            nodes.push(Inline::leaf(resolve_escapes(&self.input[start..self.pos])));
        }
    }
}

//! Block-structure parser: an indentation-driven state machine over lines.
//!
//! Parsing runs one dispatch per source line against an explicit stack of
//! frames. A dispatch that returns [`Disposition::Again`] has pushed or
//! popped frames and asks for the same line to be re-dispatched against the
//! new top; this is how dedents and new constructs propagate without
//! re-reading input. The document is finalized only once the stack fully
//! unwinds at end of input.

mod classify;
mod parser;

use std::io;

use tracing::{debug, warn};

use crate::ast::{Block, Document, ListStyle};
use crate::stream::LineSource;
use crate::text;

/// Frame-stack depth bound. At the cap, deeper structure degrades into
/// paragraphs of the enclosing frame instead of growing the stack.
const MAX_BLOCK_DEPTH: usize = 128;

/// Upper bound on re-dispatches of one line. A correct dispatch sequence
/// pops at most the whole stack and pushes a handful of frames, so hitting
/// this means a classification bug; the line is then dropped rather than
/// spinning.
const MAX_REDISPATCH: usize = 2 * MAX_BLOCK_DEPTH + 16;

/// Parse a document from a pull-based line source.
pub fn parse(source: &mut dyn LineSource) -> io::Result<Document> {
    let mut parser = BlockParser::new();
    while let Some(line) = source.next_line()? {
        parser.feed(line);
    }
    Ok(parser.finish())
}

/// Parse a document from an in-memory string. Infallible: malformed markup
/// always yields a best-effort tree.
pub fn parse_str(input: &str) -> Document {
    let mut parser = BlockParser::new();
    for line in input.lines() {
        parser.feed(line.strip_suffix('\r').unwrap_or(line).to_string());
    }
    parser.finish()
}

pub(super) enum Disposition {
    /// The line was consumed; fetch the next one.
    Consumed,
    /// The stack changed; re-dispatch the same line against the new top.
    Again,
}

/// One source line, with its measurements cached. The list state rewrites
/// the text (blanking the item marker) before re-dispatching, which
/// recomputes both.
pub(super) struct Line {
    text: String,
    indent: usize,
    blank: bool,
}

impl Line {
    fn new(text: String) -> Line {
        let indent = text::indent_of(&text);
        let blank = text::trim(&text, true, true).is_empty();
        Line { text, indent, blank }
    }

    pub(super) fn replace(&mut self, text: String) {
        *self = Line::new(text);
    }

    pub(super) fn text(&self) -> &str {
        &self.text
    }

    pub(super) fn indent(&self) -> i64 {
        self.indent as i64
    }

    pub(super) fn is_blank(&self) -> bool {
        self.blank
    }

    /// Line content with the frame's indent columns removed.
    pub(super) fn stripped(&self, cols: i64) -> String {
        text::strip_indent(&self.text, cols.max(0) as usize)
    }
}

#[derive(Debug)]
pub(super) enum FrameState {
    Subdocument { collapsible: bool },
    Header,
    Paragraph,
    Rule,
    CodeBlock { opened: bool, fence_len: usize, language: String },
    List { style: ListStyle, marker: u8 },
    ListItem,
    BlockComment,
}

/// One activation of the state machine: the construct being built, the
/// column its content is expected at, and the text/children accumulated so
/// far.
pub(super) struct Frame {
    state: FrameState,
    indent: i64,
    buf: String,
    children: Vec<Block>,
}

impl Frame {
    fn new(state: FrameState, indent: i64) -> Frame {
        Frame {
            state,
            indent,
            buf: String::new(),
            children: Vec::new(),
        }
    }
}

pub(super) struct BlockParser {
    frames: Vec<Frame>,
}

impl BlockParser {
    pub(super) fn new() -> BlockParser {
        // Sentinel indent -1: every real line is "inside" the root.
        let root = Frame::new(FrameState::Subdocument { collapsible: false }, -1);
        BlockParser { frames: vec![root] }
    }

    pub(super) fn feed(&mut self, text: String) {
        let mut line = Line::new(text);
        for _ in 0..MAX_REDISPATCH {
            match self.dispatch(&mut line) {
                Disposition::Consumed => return,
                Disposition::Again => {}
            }
        }
        warn!(line = line.text(), "line re-dispatch limit hit, dropping line");
    }

    pub(super) fn finish(mut self) -> Document {
        while self.frames.len() > 1 {
            self.pop_frame();
        }
        let root = self.frames.pop().unwrap();
        debug!(blocks = root.children.len(), "document finalized");

        // The whole input lives in one implicit subdocument at column 0;
        // unwrap it so top-level blocks sit directly in the document.
        let mut items = root.children;
        let single_subdoc = matches!(
            items.as_slice(),
            [Block::List {
                style: ListStyle::None,
                ..
            }]
        );
        if single_subdoc
            && let Some(Block::List { items: inner, .. }) = items.pop()
        {
            return Document { items: inner };
        }
        Document { items }
    }

    pub(super) fn top(&mut self) -> &mut Frame {
        self.frames.last_mut().unwrap()
    }

    /// Push unless the stack is at its depth cap; at the cap the caller
    /// falls back to flat paragraph handling.
    pub(super) fn try_push(&mut self, frame: Frame) -> bool {
        if self.frames.len() >= MAX_BLOCK_DEPTH {
            warn!("block nesting cap reached, flattening to paragraph");
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// Pop the top frame, convert it into its finished block, and append
    /// that to the parent's children.
    pub(super) fn pop_frame(&mut self) {
        let frame = self.frames.pop().unwrap();
        if let Some(block) = parser::finalize(frame) {
            self.top().children.push(block);
        }
    }
}

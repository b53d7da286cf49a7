use tracing::trace;

use super::classify::{self, LineKind};
use super::{BlockParser, Disposition, Frame, FrameState, Line};
use crate::ast::{Block, ListStyle, RuleStyle};
use crate::inline::parse_inline;
use crate::text;

#[derive(Clone, Copy)]
enum Top {
    Subdocument,
    Header,
    Rule,
    Textlike,
    Code,
    List,
    Comment,
}

impl BlockParser {
    pub(super) fn dispatch(&mut self, line: &mut Line) -> Disposition {
        let (frame_indent, top) = {
            let frame = self.frames.last().unwrap();
            let top = match frame.state {
                FrameState::Subdocument { .. } => Top::Subdocument,
                FrameState::Header => Top::Header,
                FrameState::Rule => Top::Rule,
                FrameState::Paragraph | FrameState::ListItem => Top::Textlike,
                FrameState::CodeBlock { .. } => Top::Code,
                FrameState::List { .. } => Top::List,
                FrameState::BlockComment => Top::Comment,
            };
            (frame.indent, top)
        };
        match top {
            Top::Subdocument => self.dispatch_subdocument(line, frame_indent),
            Top::Header => self.dispatch_header(line),
            Top::Rule => self.dispatch_rule(line),
            Top::Textlike => self.dispatch_textlike(line, frame_indent),
            Top::Code => self.dispatch_code(line, frame_indent),
            Top::List => self.dispatch_list(line, frame_indent),
            Top::Comment => self.dispatch_comment(line, frame_indent),
        }
    }

    /// Subdocuments ignore blanks, pop on dedent, nest on extra indent, and
    /// classify lines at their own column into a new construct frame. The
    /// classifying line is never consumed here; it re-dispatches against
    /// the frame it opened.
    fn dispatch_subdocument(&mut self, line: &mut Line, frame_indent: i64) -> Disposition {
        if line.is_blank() {
            return Disposition::Consumed;
        }
        let indent = line.indent();
        if indent < frame_indent {
            self.pop_frame();
            return Disposition::Again;
        }
        if indent > frame_indent {
            return self.push_or_flatten(
                Frame::new(FrameState::Subdocument { collapsible: false }, indent),
                line,
            );
        }

        let trimmed = text::trim(line.text(), true, true);
        let state = match classify::classify(trimmed) {
            LineKind::Header => FrameState::Header,
            LineKind::Rule(_) => FrameState::Rule,
            LineKind::CodeFence => FrameState::CodeBlock {
                opened: false,
                fence_len: 0,
                language: String::new(),
            },
            LineKind::Comment => FrameState::BlockComment,
            LineKind::List { style, marker } => FrameState::List { style, marker },
            LineKind::Paragraph => FrameState::Paragraph,
        };
        trace!(?state, indent, "open block");
        self.push_or_flatten(Frame::new(state, indent), line)
    }

    /// Single-line state: `#` run is the level, the rest is inline text.
    fn dispatch_header(&mut self, line: &Line) -> Disposition {
        let trimmed = text::trim(line.text(), true, true);
        let rest = text::trim_char(trimmed, '#', true, false);
        let level = (trimmed.len() - rest.len()) as u32;
        let node = Block::Header {
            level,
            text: parse_inline(text::trim(rest, true, true)),
        };
        self.frames.pop();
        self.top().children.push(node);
        Disposition::Consumed
    }

    /// Single-line state; the style comes from the repeated character.
    fn dispatch_rule(&mut self, line: &Line) -> Disposition {
        let trimmed = text::trim(line.text(), true, true);
        let style = classify::rule_style(trimmed).unwrap_or(RuleStyle::Solid);
        self.frames.pop();
        self.top().children.push(Block::Rule(style));
        Disposition::Consumed
    }

    /// Paragraph and ListItem: join physical lines with a space; blank,
    /// dedent, or an indent increase ends the run (deeper content nests
    /// via the parent subdocument instead of folding in).
    fn dispatch_textlike(&mut self, line: &Line, frame_indent: i64) -> Disposition {
        if line.is_blank() {
            self.pop_frame();
            return Disposition::Consumed;
        }
        if line.indent() != frame_indent {
            self.pop_frame();
            return Disposition::Again;
        }
        let stripped = line.stripped(frame_indent);
        let content = text::trim(&stripped, false, true);
        let frame = self.top();
        if !frame.buf.is_empty() {
            frame.buf.push(' ');
        }
        frame.buf.push_str(content);
        Disposition::Consumed
    }

    /// The first interior line is the opening fence: its `>` run fixes the
    /// closing run length and its remainder names the language. Everything
    /// else is copied verbatim (blank lines included) until a line that is
    /// exactly a matching `>` run.
    fn dispatch_code(&mut self, line: &Line, frame_indent: i64) -> Disposition {
        let stripped = line.stripped(frame_indent.min(line.indent()));
        let (opened, fence_len) = match &self.frames.last().unwrap().state {
            FrameState::CodeBlock {
                opened, fence_len, ..
            } => (*opened, *fence_len),
            _ => unreachable!("code dispatch on non-code frame"),
        };

        if !opened {
            let (run, lang) = classify::split_fence(&stripped);
            let lang = lang.to_string();
            if let FrameState::CodeBlock {
                opened,
                fence_len,
                language,
            } = &mut self.top().state
            {
                *opened = true;
                *fence_len = run;
                *language = lang;
            }
            return Disposition::Consumed;
        }

        if classify::is_closing_fence(&stripped, fence_len) {
            self.pop_frame();
            return Disposition::Consumed;
        }

        let frame = self.top();
        if !frame.buf.is_empty() {
            frame.buf.push('\n');
        }
        frame.buf.push_str(&stripped);
        Disposition::Consumed
    }

    /// A line carrying the list's own marker at the list's column opens the
    /// next item: a collapsible subdocument wrapping a ListItem at the
    /// item's content column. The marker is blanked out of the line so the
    /// re-dispatch sees plain indented content.
    fn dispatch_list(&mut self, line: &mut Line, frame_indent: i64) -> Disposition {
        if line.is_blank() {
            return Disposition::Consumed;
        }
        let indent = line.indent();
        if indent < frame_indent {
            self.pop_frame();
            return Disposition::Again;
        }
        if indent > frame_indent {
            return self.push_or_flatten(
                Frame::new(FrameState::Subdocument { collapsible: false }, indent),
                line,
            );
        }

        let marker = match &self.frames.last().unwrap().state {
            FrameState::List { marker, .. } => *marker,
            _ => unreachable!("list dispatch on non-list frame"),
        };
        let stripped = line.stripped(frame_indent);
        let bytes = stripped.as_bytes();
        let own_marker =
            bytes.first() == Some(&marker) && matches!(bytes.get(1), None | Some(b' '));
        if !own_marker {
            self.pop_frame();
            return Disposition::Again;
        }

        // Marker plus its space become two columns of indentation; any
        // sub-indent after them shifts the item's content column further.
        let rest = if stripped.len() > 2 { &stripped[2..] } else { "" };
        let content_indent = frame_indent + 2 + text::indent_of(rest) as i64;
        let mut rewritten = String::with_capacity((frame_indent + 2) as usize + rest.len());
        for _ in 0..frame_indent + 2 {
            rewritten.push(' ');
        }
        rewritten.push_str(rest);

        if !self.try_push(Frame::new(
            FrameState::Subdocument { collapsible: true },
            content_indent,
        )) {
            return self.flatten_paragraph(line);
        }
        if !self.try_push(Frame::new(FrameState::ListItem, content_indent)) {
            return self.flatten_paragraph(line);
        }
        line.replace(rewritten);
        Disposition::Again
    }

    /// Every comment line must start with `>` after trimming; the marker
    /// and one following space are stripped and lines are newline-joined.
    fn dispatch_comment(&mut self, line: &Line, frame_indent: i64) -> Disposition {
        if line.is_blank() {
            self.pop_frame();
            return Disposition::Consumed;
        }
        if line.indent() < frame_indent {
            self.pop_frame();
            return Disposition::Again;
        }
        let trimmed = text::trim(line.text(), true, true);
        let Some(rest) = trimmed.strip_prefix('>') else {
            self.pop_frame();
            return Disposition::Again;
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let frame = self.top();
        if !frame.buf.is_empty() {
            frame.buf.push('\n');
        }
        frame.buf.push_str(rest);
        Disposition::Consumed
    }

    fn push_or_flatten(&mut self, frame: Frame, line: &Line) -> Disposition {
        if self.try_push(frame) {
            Disposition::Again
        } else {
            self.flatten_paragraph(line)
        }
    }

    /// Depth-cap fallback: the line becomes a flat paragraph of the current
    /// frame instead of opening deeper structure.
    fn flatten_paragraph(&mut self, line: &Line) -> Disposition {
        let trimmed = text::trim(line.text(), true, true);
        let node = Block::Paragraph(parse_inline(trimmed));
        self.top().children.push(node);
        Disposition::Consumed
    }
}

/// Convert a finished frame into its block, inline-parsing buffered text
/// where the construct calls for it. Returns `None` for frames with
/// nothing to contribute.
pub(super) fn finalize(frame: Frame) -> Option<Block> {
    match frame.state {
        FrameState::Subdocument { collapsible } => {
            let mut children = frame.children;
            if collapsible && children.len() == 1 {
                // A one-block list item sheds its wrapper; plain paragraph
                // content renders bare inside the item.
                return Some(match children.pop().unwrap() {
                    Block::Paragraph(text) => Block::Text(text),
                    other => other,
                });
            }
            if children.is_empty() {
                return None;
            }
            Some(Block::List {
                style: ListStyle::None,
                items: children,
            })
        }
        FrameState::Paragraph => {
            if frame.buf.is_empty() {
                return None;
            }
            Some(Block::Paragraph(parse_inline(&frame.buf)))
        }
        FrameState::ListItem => Some(Block::Text(parse_inline(&frame.buf))),
        FrameState::CodeBlock { language, .. } => Some(Block::CodeBlock {
            literal: frame.buf,
            language,
        }),
        FrameState::BlockComment => Some(Block::CommentBlock(parse_inline(&frame.buf))),
        FrameState::List { style, .. } => {
            if frame.children.is_empty() {
                return None;
            }
            Some(Block::List {
                style,
                items: frame.children,
            })
        }
        // Header and Rule consume their line and finalize inside dispatch;
        // they never survive to a pop.
        FrameState::Header | FrameState::Rule => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Inline, MarkupSet};
    use crate::block::parse_str;

    #[test]
    fn single_paragraph() {
        let doc = parse_str("Hello, World!");
        assert_eq!(doc.items.len(), 1);
        match &doc.items[0] {
            Block::Paragraph(text) => assert_eq!(text.text, "Hello, World!"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_joins_physical_lines_with_spaces() {
        let doc = parse_str("one\ntwo\nthree");
        match &doc.items[0] {
            Block::Paragraph(text) => assert_eq!(text.text, "one two three"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn blank_line_separates_paragraphs() {
        let doc = parse_str("one\n\ntwo");
        assert_eq!(doc.items.len(), 2);
    }

    #[test]
    fn header_level_from_hash_run() {
        let doc = parse_str("### Deep Title");
        match &doc.items[0] {
            Block::Header { level, text } => {
                assert_eq!(*level, 3);
                assert_eq!(text.text, "Deep Title");
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn rule_styles_from_repeated_character() {
        let doc = parse_str("---\n\n===\n\n```");
        assert_eq!(
            doc.items,
            vec![
                Block::Rule(RuleStyle::Solid),
                Block::Rule(RuleStyle::PageBreak),
                Block::Rule(RuleStyle::Dotted),
            ]
        );
    }

    #[test]
    fn code_block_keeps_literal_text_and_language() {
        let doc = parse_str(">>lang\ncode line\n>>");
        assert_eq!(
            doc.items,
            vec![Block::CodeBlock {
                literal: "code line".to_string(),
                language: "lang".to_string(),
            }]
        );
    }

    #[test]
    fn code_block_ignores_blank_and_markup_lines() {
        let doc = parse_str(">>\nfirst\n\n# not a header\n>>>\n>>");
        match &doc.items[0] {
            Block::CodeBlock { literal, language } => {
                assert_eq!(literal, "first\n\n# not a header\n>>>");
                assert_eq!(language, "");
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn longer_fence_needs_matching_closer() {
        let doc = parse_str(">>>py\nx = 1\n>>\n>>>");
        match &doc.items[0] {
            Block::CodeBlock { literal, language } => {
                assert_eq!(language, "py");
                assert_eq!(literal, "x = 1\n>>");
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_code_block_closes_at_eof() {
        let doc = parse_str(">>sh\necho hi");
        assert_eq!(
            doc.items,
            vec![Block::CodeBlock {
                literal: "echo hi".to_string(),
                language: "sh".to_string(),
            }]
        );
    }

    #[test]
    fn bullet_list_items_become_text_nodes() {
        let doc = parse_str("* one\n* two");
        match &doc.items[0] {
            Block::List { style, items } => {
                assert_eq!(*style, ListStyle::Bullets);
                assert_eq!(
                    items,
                    &vec![
                        Block::Text(Inline::leaf("one")),
                        Block::Text(Inline::leaf("two")),
                    ]
                );
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn numbered_list_marker() {
        let doc = parse_str("% first\n% second");
        match &doc.items[0] {
            Block::List { style, items } => {
                assert_eq!(*style, ListStyle::Numbered);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn item_text_wraps_onto_continuation_lines() {
        let doc = parse_str("* one\n  still one\n* two");
        match &doc.items[0] {
            Block::List { items, .. } => {
                assert_eq!(items[0], Block::Text(Inline::leaf("one still one")));
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn deeper_marker_opens_a_nested_list() {
        let doc = parse_str("* outer\n    * inner");
        let Block::List { items, .. } = &doc.items[0] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1);
        // The item holds its own text plus a nested subdocument carrying
        // the inner list.
        let Block::List {
            style: ListStyle::None,
            items: item_blocks,
        } = &items[0]
        else {
            panic!("expected item subdocument, got {:?}", items[0]);
        };
        assert_eq!(item_blocks[0], Block::Text(Inline::leaf("outer")));
        let Block::List {
            style: ListStyle::None,
            items: nested,
        } = &item_blocks[1]
        else {
            panic!("expected nested subdocument, got {:?}", item_blocks[1]);
        };
        match &nested[0] {
            Block::List { style, items } => {
                assert_eq!(*style, ListStyle::Bullets);
                assert_eq!(items[0], Block::Text(Inline::leaf("inner")));
            }
            other => panic!("expected inner list, got {other:?}"),
        }
    }

    #[test]
    fn comment_block_joins_lines_with_newlines() {
        let doc = parse_str("> first\n> second");
        match &doc.items[0] {
            Block::CommentBlock(text) => assert_eq!(text.text, "first\nsecond"),
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn comment_ends_at_non_marker_line() {
        let doc = parse_str("> quoted\nplain");
        assert_eq!(doc.items.len(), 2);
        assert!(matches!(doc.items[0], Block::CommentBlock(_)));
        assert!(matches!(doc.items[1], Block::Paragraph(_)));
    }

    #[test]
    fn indented_region_becomes_a_subdocument() {
        let doc = parse_str("top\n\n    nested");
        assert_eq!(doc.items.len(), 2);
        match &doc.items[1] {
            Block::List { style, items } => {
                assert_eq!(*style, ListStyle::None);
                assert!(matches!(items[0], Block::Paragraph(_)));
            }
            other => panic!("expected subdocument, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_pops_on_indent_increase() {
        let doc = parse_str("shallow\n    deep");
        assert_eq!(doc.items.len(), 2);
        assert!(matches!(doc.items[0], Block::Paragraph(_)));
    }

    #[test]
    fn inline_markup_flows_through_blocks() {
        let doc = parse_str("# [B:Bold] title");
        match &doc.items[0] {
            Block::Header { text, .. } => {
                assert_eq!(text.children[0].markup, MarkupSet::BOLD);
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_yields_empty_document() {
        assert!(parse_str("").items.is_empty());
        assert!(parse_str("\n\n  \n").items.is_empty());
    }

    #[test]
    fn pathological_indent_ladder_is_bounded() {
        let mut input = String::new();
        for depth in 0..300 {
            for _ in 0..depth {
                input.push(' ');
            }
            input.push_str("x\n");
        }
        // Must terminate with a valid tree, not exhaust the stack.
        let _ = parse_str(&input);
    }
}

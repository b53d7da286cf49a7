//! HTML rendering: a depth-first walk of the block and inline trees.
//!
//! Rendering is a pure function of the document, the options, and the
//! ordered insertions; output goes straight to the caller's sink.

use std::io::Write;

use tracing::debug;

use crate::ast::{Block, Document, Inline, ListStyle, MarkupSet, RuleStyle};
use crate::error::RenderError;
use crate::html::{CloseTagGuard, escape_html_into, escape_html_text_into};
use crate::stream::LineSource;

/// Rendering options.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Wrap the output in a full HTML shell (`<!DOCTYPE html>…`) with
    /// insertions in `<head>`. Without it, a fragment is emitted with
    /// insertions ahead of the blocks.
    pub standalone: bool,
}

/// What an insertion injects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertKind {
    Style,
    Script,
}

/// Where an insertion's payload comes from.
pub enum InsertContent<'a> {
    /// Reference an external resource by URL.
    Linked(String),
    /// Embed a literal payload inline.
    Literal(String),
    /// Embed a streamed payload inline, filtered chunk by chunk.
    Stream(Box<dyn LineSource + 'a>),
}

/// One script or style injection, emitted in caller order.
pub struct Insert<'a> {
    pub kind: InsertKind,
    pub content: InsertContent<'a>,
}

/// Render `doc` as HTML bytes into `out`.
pub fn render_html(
    doc: &Document,
    options: &RenderOptions,
    inserts: &mut [Insert<'_>],
    out: &mut dyn Write,
) -> Result<(), RenderError> {
    debug!(
        blocks = doc.items.len(),
        standalone = options.standalone,
        inserts = inserts.len(),
        "render"
    );
    if options.standalone {
        out.write_all(b"<!DOCTYPE html><html><head><meta charset=\"UTF-8\">")?;
        render_inserts(inserts, out)?;
        out.write_all(b"</head><body>")?;
        render_blocks(&doc.items, false, out)?;
        out.write_all(b"</body></html>")?;
    } else {
        render_inserts(inserts, out)?;
        render_blocks(&doc.items, false, out)?;
    }
    Ok(())
}

/// Render to an owned string; convenience over [`render_html`].
pub fn render_html_string(
    doc: &Document,
    options: &RenderOptions,
    inserts: &mut [Insert<'_>],
) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    render_html(doc, options, inserts, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn render_inserts(inserts: &mut [Insert<'_>], out: &mut dyn Write) -> Result<(), RenderError> {
    for insert in inserts {
        match (insert.kind, &mut insert.content) {
            (InsertKind::Style, InsertContent::Linked(href)) => {
                let mut tag = String::from("<link rel=\"stylesheet\" href=\"");
                escape_html_into(&mut tag, href);
                tag.push_str("\">");
                out.write_all(tag.as_bytes())?;
            }
            (InsertKind::Script, InsertContent::Linked(src)) => {
                let mut tag = String::from("<script src=\"");
                escape_html_into(&mut tag, src);
                tag.push_str("\"></script>");
                out.write_all(tag.as_bytes())?;
            }
            (kind, content) => {
                let (open, close, mut guard) = match kind {
                    InsertKind::Style => ("<style>", "</style>", CloseTagGuard::style()),
                    InsertKind::Script => ("<script>", "</script>", CloseTagGuard::script()),
                };
                out.write_all(open.as_bytes())?;
                match content {
                    InsertContent::Literal(payload) => {
                        guard.feed(payload.as_bytes(), out)?;
                    }
                    InsertContent::Stream(source) => {
                        let mut first = true;
                        while let Some(line) = source.next_line()? {
                            if !first {
                                guard.feed(b"\n", out)?;
                            }
                            guard.feed(line.as_bytes(), out)?;
                            first = false;
                        }
                    }
                    InsertContent::Linked(_) => unreachable!(),
                }
                guard.finish(out)?;
                out.write_all(close.as_bytes())?;
            }
        }
    }
    Ok(())
}

/// `in_list` wraps each child of the enclosing styled list in `<li>`.
fn render_blocks(
    items: &[Block],
    in_list: bool,
    out: &mut dyn Write,
) -> Result<(), RenderError> {
    for block in items {
        if in_list {
            out.write_all(b"<li>")?;
        }
        render_block(block, out)?;
        if in_list {
            out.write_all(b"</li>")?;
        }
    }
    Ok(())
}

fn render_block(block: &Block, out: &mut dyn Write) -> Result<(), RenderError> {
    match block {
        Block::Paragraph(text) => {
            out.write_all(b"<p>")?;
            render_inline(text, out)?;
            out.write_all(b"</p>")?;
        }
        Block::Header { level, text } => {
            let level = (*level).clamp(1, 6);
            write!(out, "<h{level}>")?;
            render_inline(text, out)?;
            write!(out, "</h{level}>")?;
        }
        Block::Rule(style) => {
            let class = match style {
                RuleStyle::Solid | RuleStyle::PageBreak => "bkd-solid",
                RuleStyle::Dotted | RuleStyle::Invisible => "bkd-dotted",
            };
            write!(out, "<hr class=\"{class}\">")?;
        }
        Block::CodeBlock { literal, language } => {
            let mut open = String::from("<pre><code");
            if !language.is_empty() {
                open.push_str(" data-bkd-language=\"");
                escape_html_into(&mut open, language);
                open.push('"');
            }
            open.push('>');
            // Literal text: never inline-parsed.
            escape_html_into(&mut open, literal);
            open.push_str("</code></pre>");
            out.write_all(open.as_bytes())?;
        }
        Block::CommentBlock(text) => {
            out.write_all(b"<blockquote>")?;
            render_inline(text, out)?;
            out.write_all(b"</blockquote>")?;
        }
        Block::List { style, items } => match style {
            ListStyle::None => {
                out.write_all(b"<div class=\"bkd-subdoc\">")?;
                render_blocks(items, false, out)?;
                out.write_all(b"</div>")?;
            }
            ListStyle::Bullets => {
                out.write_all(b"<ul>")?;
                render_blocks(items, true, out)?;
                out.write_all(b"</ul>")?;
            }
            ListStyle::Numbered | ListStyle::Alpha | ListStyle::Roman => {
                out.write_all(b"<ol>")?;
                render_blocks(items, true, out)?;
                out.write_all(b"</ol>")?;
            }
        },
        Block::Table { rows, cols, cells } => {
            let rows = *rows as usize;
            let cols = *cols as usize;
            if rows.checked_mul(cols).is_none_or(|need| need > cells.len()) {
                return Err(RenderError::MalformedTable {
                    rows: rows as u32,
                    cols: cols as u32,
                    cells: cells.len(),
                });
            }
            out.write_all(b"<table>")?;
            for row in cells.chunks(cols.max(1)).take(rows) {
                out.write_all(b"<tr>")?;
                for cell in row {
                    out.write_all(b"<td>")?;
                    render_inline(cell, out)?;
                    out.write_all(b"</td>")?;
                }
                out.write_all(b"</tr>")?;
            }
            out.write_all(b"</table>")?;
        }
        Block::Text(text) => render_inline(text, out)?,
        Block::DataString(data) => {
            let mut buf = String::from("<div hidden class=\"bkd-datastring\">");
            escape_html_into(&mut buf, data);
            buf.push_str("</div>");
            out.write_all(buf.as_bytes())?;
        }
    }
    Ok(())
}

fn render_inline(node: &Inline, out: &mut dyn Write) -> Result<(), RenderError> {
    // Images short-circuit: the payload is the source, the leaf text the
    // alternate text, and nothing beneath is walked.
    if node.markup.contains(MarkupSet::IMAGE) {
        let mut tag = String::from("<img src=\"");
        escape_html_into(&mut tag, node.data.as_deref().unwrap_or(""));
        tag.push_str("\" alt=\"");
        escape_html_into(&mut tag, &node.text);
        tag.push_str("\">");
        out.write_all(tag.as_bytes())?;
        return Ok(());
    }

    let data = node.data.as_deref().unwrap_or("");
    let mut closers: Vec<&'static str> = Vec::new();
    for flag in MarkupSet::CANONICAL {
        if !node.markup.contains(flag) {
            continue;
        }
        let mut open = String::new();
        let close = if flag == MarkupSet::BOLD {
            open.push_str("<strong>");
            "</strong>"
        } else if flag == MarkupSet::ITALIC {
            open.push_str("<em>");
            "</em>"
        } else if flag == MarkupSet::STRIKETHROUGH {
            open.push_str("<del>");
            "</del>"
        } else if flag == MarkupSet::UNDERLINE {
            open.push_str("<u>");
            "</u>"
        } else if flag == MarkupSet::ANCHOR {
            open.push_str("<a id=\"");
            escape_html_into(&mut open, data);
            open.push_str("\">");
            "</a>"
        } else if flag == MarkupSet::INTERNAL_LINK {
            open.push_str("<a href=\"#");
            escape_html_into(&mut open, data);
            open.push_str("\">");
            "</a>"
        } else if flag == MarkupSet::CUSTOM_CLASS {
            open.push_str("<span class=\"bkd-custom-");
            escape_html_into(&mut open, data);
            open.push_str("\">");
            "</span>"
        } else if flag == MarkupSet::LINK {
            open.push_str("<a href=\"");
            escape_html_into(&mut open, data);
            open.push_str("\">");
            "</a>"
        } else if flag == MarkupSet::MATH {
            open.push_str("<span class=\"bkd-math\">");
            "</span>"
        } else {
            open.push_str("<code>");
            "</code>"
        };
        out.write_all(open.as_bytes())?;
        closers.push(close);
    }

    if node.is_leaf() {
        let mut text = String::with_capacity(node.text.len());
        escape_html_text_into(&mut text, &node.text);
        out.write_all(text.as_bytes())?;
    } else {
        for child in &node.children {
            render_inline(child, out)?;
        }
    }

    for close in closers.iter().rev() {
        out.write_all(close.as_bytes())?;
    }
    Ok(())
}

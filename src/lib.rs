//! # bkd
//!
//! A parser and HTML renderer for BKD, a lightweight markup language in
//! the spirit of Markdown. Structured plain text goes in, an abstract
//! syntax tree comes out, and the tree renders to escaped HTML.
//!
//! ## Usage
//!
//! ```
//! use bkd::{RenderOptions, parse_str, render_html_string};
//!
//! let doc = parse_str("# Title\n\nSome [B:bold] text.");
//! let html = render_html_string(&doc, &RenderOptions::default(), &mut []).unwrap();
//! assert!(html.contains("<h1>Title</h1>"));
//! assert!(html.contains("<strong>bold</strong>"));
//! ```
//!
//! ## Markup overview
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `# Heading` | header, level = `#` count |
//! | `* item` / `% item` | bulleted / numbered list |
//! | `---` / `===` / `` ``` `` | rule (solid / page break / dotted) |
//! | `>>lang … >>` | fenced code block |
//! | `> text` | comment block |
//! | `[BI:text]` | inline span; letters select styles |
//! | `[L:label](url)` | link; `[P:alt](src)` is an image |
//!
//! Malformed markup is never an error: the parser always produces a
//! best-effort tree, closing open constructs at end of input.
//!
//! ## Streams
//!
//! Input is pulled line by line through [`stream::LineSource`]; output goes
//! to any [`std::io::Write`]. Both are injected by the caller, so the
//! library never touches process streams itself.

pub mod ast;
mod block;
pub mod error;
mod html;
mod inline;
mod render;
pub mod stream;
pub mod text;
pub mod utf8;

pub use ast::{Block, Document, Inline, ListStyle, MarkupSet, RuleStyle};
pub use block::{parse, parse_str};
pub use error::RenderError;
pub use inline::parse_inline;
pub use render::{
    Insert, InsertContent, InsertKind, RenderOptions, render_html, render_html_string,
};

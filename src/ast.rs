//! The BKD abstract syntax tree.
//!
//! Ownership is strictly tree-shaped: dropping a [`Document`] frees
//! everything beneath it in one deterministic recursive pass.

/// Bit set of inline markup styles applied to a span.
///
/// Rendering wraps a span's content in one tag pair per set bit, always in
/// the canonical order of [`MarkupSet::CANONICAL`], regardless of the order
/// the flag letters appeared in the source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkupSet(u16);

impl MarkupSet {
    pub const BOLD: MarkupSet = MarkupSet(1 << 0);
    pub const ITALIC: MarkupSet = MarkupSet(1 << 1);
    pub const STRIKETHROUGH: MarkupSet = MarkupSet(1 << 2);
    pub const UNDERLINE: MarkupSet = MarkupSet(1 << 3);
    pub const ANCHOR: MarkupSet = MarkupSet(1 << 4);
    pub const INTERNAL_LINK: MarkupSet = MarkupSet(1 << 5);
    pub const CUSTOM_CLASS: MarkupSet = MarkupSet(1 << 6);
    pub const LINK: MarkupSet = MarkupSet(1 << 7);
    pub const MATH: MarkupSet = MarkupSet(1 << 8);
    pub const IMAGE: MarkupSet = MarkupSet(1 << 9);
    pub const CODE: MarkupSet = MarkupSet(1 << 10);

    /// Outermost-to-innermost tag order. This ordering is an invariant of
    /// the output format, not an implementation detail.
    pub const CANONICAL: [MarkupSet; 11] = [
        MarkupSet::BOLD,
        MarkupSet::ITALIC,
        MarkupSet::STRIKETHROUGH,
        MarkupSet::UNDERLINE,
        MarkupSet::ANCHOR,
        MarkupSet::INTERNAL_LINK,
        MarkupSet::CUSTOM_CLASS,
        MarkupSet::LINK,
        MarkupSet::MATH,
        MarkupSet::IMAGE,
        MarkupSet::CODE,
    ];

    #[inline]
    pub const fn empty() -> MarkupSet {
        MarkupSet(0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: MarkupSet) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: MarkupSet) {
        self.0 |= other.0;
    }

    /// Markup selected by a single flag letter, if the letter is known.
    pub fn from_letter(letter: u8) -> Option<MarkupSet> {
        Some(match letter {
            b'B' => MarkupSet::BOLD,
            b'I' => MarkupSet::ITALIC,
            b'S' => MarkupSet::STRIKETHROUGH,
            b'U' => MarkupSet::UNDERLINE,
            b'A' => MarkupSet::ANCHOR,
            b'R' => MarkupSet::INTERNAL_LINK,
            b'K' => MarkupSet::CUSTOM_CLASS,
            b'L' => MarkupSet::LINK,
            b'M' => MarkupSet::MATH,
            b'P' => MarkupSet::IMAGE,
            b'C' => MarkupSet::CODE,
            _ => return None,
        })
    }
}

/// One styled run of inline content.
///
/// A node is either a leaf (`children` empty, `text` authoritative) or an
/// interior node whose ordered `children` carry the content. `data` holds
/// the optional `](…)` payload: link target, image source, anchor id, or
/// class name depending on `markup`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inline {
    pub markup: MarkupSet,
    pub text: String,
    pub children: Vec<Inline>,
    pub data: Option<String>,
}

impl Inline {
    pub fn leaf(text: impl Into<String>) -> Inline {
        Inline {
            text: text.into(),
            ..Inline::default()
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Appearance of a horizontal rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleStyle {
    Solid,
    Dotted,
    Invisible,
    PageBreak,
}

/// Numbering style of a list. `None` marks a plain subdocument grouping
/// whose children render unwrapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStyle {
    None,
    Numbered,
    Bullets,
    Alpha,
    Roman,
}

/// A block-level element.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Inline),
    Header { level: u32, text: Inline },
    Rule(RuleStyle),
    CodeBlock { literal: String, language: String },
    CommentBlock(Inline),
    List { style: ListStyle, items: Vec<Block> },
    Table { rows: u32, cols: u32, cells: Vec<Inline> },
    Text(Inline),
    DataString(String),
}

/// A parsed BKD document: an ordered sequence of top-level blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub items: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_set_operations() {
        let mut set = MarkupSet::empty();
        assert!(set.is_empty());
        set.insert(MarkupSet::BOLD);
        set.insert(MarkupSet::LINK);
        assert!(set.contains(MarkupSet::BOLD));
        assert!(set.contains(MarkupSet::LINK));
        assert!(!set.contains(MarkupSet::ITALIC));
    }

    #[test]
    fn canonical_order_covers_every_flag_letter() {
        for letter in b"BISUARKLMPC" {
            let flag = MarkupSet::from_letter(*letter).unwrap();
            assert!(MarkupSet::CANONICAL.contains(&flag));
        }
        assert_eq!(MarkupSet::from_letter(b'Z'), None);
    }
}

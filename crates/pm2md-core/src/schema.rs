//! Canonical node and mark vocabulary
//!
//! The names follow the `prosemirror-markdown` schema. Anything outside this
//! vocabulary is either rejected (nodes) or ignored (marks) by the writer.

use std::fmt;

/// Node kinds the writer can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Block nodes
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    CodeBlock,
    HorizontalRule,

    // Inline nodes
    Text,
    HardBreak,
    Image,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        Self::Doc,
        Self::Paragraph,
        Self::Heading,
        Self::Blockquote,
        Self::BulletList,
        Self::OrderedList,
        Self::ListItem,
        Self::CodeBlock,
        Self::HorizontalRule,
        Self::Text,
        Self::HardBreak,
        Self::Image,
    ];

    /// Look up a canonical node type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Blockquote => "blockquote",
            Self::BulletList => "bullet_list",
            Self::OrderedList => "ordered_list",
            Self::ListItem => "list_item",
            Self::CodeBlock => "code_block",
            Self::HorizontalRule => "horizontal_rule",
            Self::Text => "text",
            Self::HardBreak => "hard_break",
            Self::Image => "image",
        }
    }

    /// Whether the node lives inside inline content
    pub fn is_inline(self) -> bool {
        matches!(self, Self::Text | Self::HardBreak | Self::Image)
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::BulletList | Self::OrderedList)
    }

    /// Leaves never carry child nodes
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::HorizontalRule | Self::HardBreak | Self::Image)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mark kinds the writer can render.
///
/// Declaration order is nesting order: when several marks open on the same
/// run, earlier kinds wrap later ones, so `link` is outermost and `code` is
/// innermost (`[***text***](url)`, `` **`x`** ``).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkKind {
    Link,
    Strong,
    Em,
    Code,
}

impl MarkKind {
    pub const ALL: [MarkKind; 4] = [Self::Link, Self::Strong, Self::Em, Self::Code];

    /// Look up a canonical mark type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Code => "code",
        }
    }

    /// Emphasis delimiters must hug non-whitespace text
    pub fn expels_whitespace(self) -> bool {
        matches!(self, Self::Strong | Self::Em)
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Canonical document tree to Markdown writer
//!
//! Blocks are rendered to strings and composed bottom-up: a list item is its
//! rendered blocks with the marker on the first line and the following lines
//! indented by the marker width, a blockquote is its rendered blocks with
//! every line prefixed by `> `. Sibling blocks are separated by a blank line.

use crate::error::SchemaError;
use crate::escape::fence_length;
use crate::inline::{ActiveMark, InlineItem, InlineWriter};
use crate::schema::{MarkKind, NodeKind};
use pm_model::{DocumentNode, Mark};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;


/// Options for the Markdown writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Marker for bullet list items
    pub bullet: Bullet,
    /// How hard line breaks are written
    pub hard_break: HardBreak,
}

/// Bullet list marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Bullet {
    #[default]
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "+")]
    Plus,
}

impl Bullet {
    pub fn as_char(self) -> char {
        match self {
            Self::Asterisk => '*',
            Self::Dash => '-',
            Self::Plus => '+',
        }
    }
}

impl FromStr for Bullet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" | "asterisk" => Ok(Self::Asterisk),
            "-" | "dash" => Ok(Self::Dash),
            "+" | "plus" => Ok(Self::Plus),
            _ => Err(format!("invalid bullet marker `{s}`, expected `*`, `-` or `+`")),
        }
    }
}

impl fmt::Display for Bullet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Hard line break style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HardBreak {
    /// Backslash at the end of the line
    #[default]
    Backslash,
    /// Two trailing spaces
    Spaces,
}

impl HardBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backslash => "\\\n",
            Self::Spaces => "  \n",
        }
    }
}

impl FromStr for HardBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backslash" => Ok(Self::Backslash),
            "spaces" => Ok(Self::Spaces),
            _ => Err(format!(
                "invalid hard break style `{s}`, expected `backslash` or `spaces`"
            )),
        }
    }
}

/// Convert a canonical document tree to Markdown
pub fn doc_to_markdown(node: &DocumentNode, options: &WriterOptions) -> Result<String, SchemaError> {
    let mut writer = Writer::new(options);
    writer.write_root(node)
}

/// Convert a canonical document tree to Markdown with default options
pub fn serialize(node: &DocumentNode) -> Result<String, SchemaError> {
    doc_to_markdown(node, &WriterOptions::default())
}

/// A rendered block and the kind of node it came from
struct Block {
    kind: NodeKind,
    text: String,
}

type WriteResult<T> = Result<T, SchemaError>;

/// Markdown writer state
struct Writer<'o> {
    options: &'o WriterOptions,
    /// Child indices from the root to the node being written
    path: Vec<usize>,
}

impl<'o> Writer<'o> {
    fn new(options: &'o WriterOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    fn write_root(&mut self, node: &DocumentNode) -> WriteResult<String> {
        let kind = self.kind_of(node)?;
        if kind.is_inline() {
            let item = self.inline_item("doc", node)?;
            let items = item.into_iter().collect();
            return Ok(InlineWriter::new(self.options).write(items));
        }
        self.write_block(node, kind)
    }

    fn write_block(&mut self, node: &DocumentNode, kind: NodeKind) -> WriteResult<String> {
        if kind != NodeKind::Text {
            self.check_no_text(node)?;
        }
        match kind {
            NodeKind::Doc | NodeKind::ListItem => {
                let blocks = self.write_children(node)?;
                Ok(join_blocks(&blocks))
            }
            NodeKind::Paragraph => self.write_inline_content(node, node.children(), 0, false),
            NodeKind::Heading => self.write_heading(node),
            NodeKind::Blockquote => self.write_blockquote(node),
            NodeKind::BulletList | NodeKind::OrderedList => self.write_list(node, kind),
            NodeKind::CodeBlock => self.write_code_block(node),
            NodeKind::HorizontalRule => {
                self.check_leaf(node)?;
                Ok("---".to_string())
            }
            NodeKind::Text | NodeKind::HardBreak | NodeKind::Image => {
                // Inline children of block containers are grouped by write_children
                Err(SchemaError::InvalidChild {
                    parent: "block content".to_string(),
                    child: node.node_type.clone(),
                    path: self.pointer(),
                })
            }
        }
    }

    /// Render the children of a block container, skipping empty output.
    ///
    /// Runs of inline children are wrapped in an implicit paragraph.
    fn write_children(&mut self, node: &DocumentNode) -> WriteResult<Vec<Block>> {
        let children = node.children();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < children.len() {
            self.path.push(i);
            let kind = self.kind_of(&children[i]);
            self.path.pop();
            let kind = kind?;

            if kind.is_inline() {
                let start = i;
                while i < children.len()
                    && NodeKind::from_name(&children[i].node_type).is_some_and(NodeKind::is_inline)
                {
                    i += 1;
                }
                tracing::debug!(
                    parent = %node.node_type,
                    path = %self.pointer(),
                    "wrapping inline content in a paragraph"
                );
                let text = self.write_inline_content(node, &children[start..i], start, false)?;
                push_block(&mut blocks, NodeKind::Paragraph, text);
                continue;
            }

            self.path.push(i);
            let text = self.write_block(&children[i], kind);
            self.path.pop();
            push_block(&mut blocks, kind, text?);
            i += 1;
        }

        Ok(blocks)
    }

    fn write_heading(&mut self, node: &DocumentNode) -> WriteResult<String> {
        let level = match node.get_attr("level") {
            None => 1,
            Some(value) => match value.as_u64() {
                Some(level @ 1..=6) => level as usize,
                _ => {
                    return Err(SchemaError::InvalidAttribute {
                        node_type: node.node_type.clone(),
                        name: "level".to_string(),
                        reason: format!("expected an integer from 1 to 6, found {value}"),
                        path: self.pointer(),
                    });
                }
            },
        };

        let mut text = self.write_inline_content(node, node.children(), 0, true)?;
        if text.is_empty() {
            return Ok(String::new());
        }
        escape_closing_hashes(&mut text);
        Ok(format!("{} {}", "#".repeat(level), text))
    }

    fn write_blockquote(&mut self, node: &DocumentNode) -> WriteResult<String> {
        let blocks = self.write_children(node)?;
        if blocks.is_empty() {
            return Ok(String::new());
        }
        Ok(prefix_lines(&join_blocks(&blocks), "> ", "> ", ">"))
    }

    fn write_list(&mut self, node: &DocumentNode, kind: NodeKind) -> WriteResult<String> {
        let tight = node
            .get_attr("tight")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let start = list_start(node);
        let count = node.children().len() as u64;
        if kind == NodeKind::OrderedList
            && count > 0
            && start.saturating_add(count - 1) > MAX_ORDERED_NUMBER
        {
            let name = if node.u64_attr("order").is_some() {
                "order"
            } else {
                "start"
            };
            return Err(SchemaError::InvalidAttribute {
                node_type: node.node_type.clone(),
                name: name.to_string(),
                reason: format!(
                    "item numbers must not exceed {MAX_ORDERED_NUMBER}, list starts at {start} with {count} items"
                ),
                path: self.pointer(),
            });
        }

        let mut items = Vec::new();
        for (i, item) in node.children().iter().enumerate() {
            self.path.push(i);
            let rendered = self.write_list_item(node, item, tight);
            self.path.pop();

            let marker = if kind == NodeKind::OrderedList {
                format!("{}. ", start + i as u64)
            } else {
                format!("{} ", self.options.bullet)
            };
            let body = rendered?;
            if body.is_empty() {
                items.push(marker.trim_end().to_string());
            } else {
                let indent = " ".repeat(marker.len());
                items.push(prefix_lines(&body, &marker, &indent, ""));
            }
        }

        Ok(items.join(if tight { "\n" } else { "\n\n" }))
    }

    fn write_list_item(
        &mut self,
        list: &DocumentNode,
        item: &DocumentNode,
        tight: bool,
    ) -> WriteResult<String> {
        let kind = self.kind_of(item)?;
        if kind != NodeKind::ListItem {
            return Err(SchemaError::InvalidChild {
                parent: list.node_type.clone(),
                child: item.node_type.clone(),
                path: self.pointer(),
            });
        }
        self.check_no_text(item)?;

        let blocks = self.write_children(item)?;
        let mut output = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                // A nested list hugs the paragraph it belongs to in tight lists
                let hug = tight
                    && blocks[i - 1].kind == NodeKind::Paragraph
                    && interrupts_paragraph(block);
                output.push_str(if hug { "\n" } else { "\n\n" });
            }
            output.push_str(&block.text);
        }
        Ok(output)
    }

    fn write_code_block(&mut self, node: &DocumentNode) -> WriteResult<String> {
        let children = node.children();
        if children.is_empty() {
            return Ok(String::new());
        }

        let mut code = String::new();
        for (i, child) in children.iter().enumerate() {
            self.path.push(i);
            let piece = self.code_text(node, child);
            self.path.pop();
            code.push_str(piece?);
        }

        let lang = node
            .str_attr("language")
            .or_else(|| node.str_attr("params"))
            .unwrap_or_default();
        let fence = "`".repeat(fence_length(&code));

        let mut output = format!("{fence}{lang}\n{code}");
        if !code.is_empty() && !code.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&fence);
        Ok(output)
    }

    /// Literal text of a code block child
    fn code_text<'n>(&self, parent: &DocumentNode, child: &'n DocumentNode) -> WriteResult<&'n str> {
        match self.kind_of(child)? {
            NodeKind::Text => {
                self.check_text_content(child)?;
                self.text_of(child)
            }
            NodeKind::HardBreak => {
                self.check_no_text(child)?;
                self.check_leaf(child)?;
                Ok("\n")
            }
            _ => Err(SchemaError::InvalidChild {
                parent: parent.node_type.clone(),
                child: child.node_type.clone(),
                path: self.pointer(),
            }),
        }
    }

    /// Render inline children, `first_index` being the index of
    /// `children[0]` within `parent`. `single_line` content is written for
    /// a heading.
    fn write_inline_content(
        &mut self,
        parent: &DocumentNode,
        children: &[DocumentNode],
        first_index: usize,
        single_line: bool,
    ) -> WriteResult<String> {
        let mut items = Vec::with_capacity(children.len());
        for (i, child) in children.iter().enumerate() {
            self.path.push(first_index + i);
            let item = self.inline_item(&parent.node_type, child);
            self.path.pop();
            items.extend(item?);
        }
        let writer = if single_line {
            InlineWriter::single_line(self.options)
        } else {
            InlineWriter::new(self.options)
        };
        Ok(writer.write(items))
    }

    /// Resolve one inline node; empty text yields nothing
    fn inline_item<'n>(
        &self,
        parent: &str,
        node: &'n DocumentNode,
    ) -> WriteResult<Option<InlineItem<'n>>> {
        let kind = self.kind_of(node)?;
        let item = match kind {
            NodeKind::Text => {
                self.check_text_content(node)?;
                let text = self.text_of(node)?;
                if text.is_empty() {
                    return Ok(None);
                }
                InlineItem::Text {
                    text: text.to_string(),
                    marks: self.resolve_marks(node.mark_list()),
                }
            }
            NodeKind::HardBreak => {
                self.check_no_text(node)?;
                self.check_leaf(node)?;
                InlineItem::Break {
                    marks: self.resolve_marks(node.mark_list()),
                }
            }
            NodeKind::Image => {
                self.check_no_text(node)?;
                self.check_leaf(node)?;
                InlineItem::Image {
                    src: node.str_attr("src").unwrap_or_default(),
                    alt: node.str_attr("alt").unwrap_or_default(),
                    title: node.str_attr("title"),
                    marks: self.resolve_marks(node.mark_list()),
                }
            }
            _ => {
                return Err(SchemaError::InvalidChild {
                    parent: parent.to_string(),
                    child: node.node_type.clone(),
                    path: self.pointer(),
                });
            }
        };
        Ok(Some(item))
    }

    /// Known marks, first occurrence of each kind, outermost first
    fn resolve_marks<'n>(&self, marks: &'n [Mark]) -> Vec<ActiveMark<'n>> {
        let mut resolved: Vec<ActiveMark<'n>> = Vec::with_capacity(marks.len());
        for mark in marks {
            match MarkKind::from_name(&mark.mark_type) {
                Some(kind) if resolved.iter().any(|m| m.kind == kind) => {}
                Some(kind) => resolved.push(ActiveMark { kind, mark }),
                None => {
                    tracing::debug!(
                        mark = %mark.mark_type,
                        path = %self.pointer(),
                        "ignoring unknown mark"
                    );
                }
            }
        }
        resolved.sort_by_key(|m| m.kind);
        resolved
    }

    // Validation helpers

    fn kind_of(&self, node: &DocumentNode) -> WriteResult<NodeKind> {
        NodeKind::from_name(&node.node_type).ok_or_else(|| SchemaError::UnknownNodeType {
            node_type: node.node_type.clone(),
            path: self.pointer(),
        })
    }

    fn text_of<'n>(&self, node: &'n DocumentNode) -> WriteResult<&'n str> {
        node.text
            .as_deref()
            .ok_or_else(|| SchemaError::MissingText {
                path: self.pointer(),
            })
    }

    fn check_text_content(&self, node: &DocumentNode) -> WriteResult<()> {
        if node.text.is_some() && !node.children().is_empty() {
            return Err(SchemaError::TextWithContent {
                node_type: node.node_type.clone(),
                path: self.pointer(),
            });
        }
        Ok(())
    }

    /// Only `text` nodes carry text
    fn check_no_text(&self, node: &DocumentNode) -> WriteResult<()> {
        if node.text.is_some() {
            return Err(SchemaError::UnexpectedText {
                node_type: node.node_type.clone(),
                path: self.pointer(),
            });
        }
        Ok(())
    }

    fn check_leaf(&self, node: &DocumentNode) -> WriteResult<()> {
        if !node.children().is_empty() {
            return Err(SchemaError::UnexpectedContent {
                node_type: node.node_type.clone(),
                path: self.pointer(),
            });
        }
        Ok(())
    }

    /// JSON pointer of the node being written
    fn pointer(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }
        self.path
            .iter()
            .map(|i| format!("/content/{i}"))
            .collect()
    }
}

/// Whether a rendered block may directly follow a paragraph line.
///
/// Only a bullet list or an ordered list starting at 1, with a non-empty
/// first item, can interrupt a paragraph.
fn interrupts_paragraph(block: &Block) -> bool {
    let first_line = block.text.lines().next().unwrap_or_default();
    match block.kind {
        NodeKind::BulletList => first_line.len() > 2,
        NodeKind::OrderedList => first_line.starts_with("1. "),
        _ => false,
    }
}

/// Largest ordered list number CommonMark accepts (nine digits)
const MAX_ORDERED_NUMBER: u64 = 999_999_999;

/// First number of an ordered list
fn list_start(node: &DocumentNode) -> u64 {
    node.u64_attr("order")
        .or_else(|| node.u64_attr("start"))
        .unwrap_or(1)
}

/// Escape a trailing run of `#` that would be read as the closing sequence of
/// an ATX heading
fn escape_closing_hashes(text: &mut String) {
    let body = text.trim_end_matches('#');
    let at = body.len();
    let closing = at < text.len() && (body.is_empty() || body.ends_with([' ', '\t']));
    if closing {
        text.insert(at, '\\');
    }
}

fn push_block(blocks: &mut Vec<Block>, kind: NodeKind, text: String) {
    if !text.is_empty() {
        blocks.push(Block { kind, text });
    }
}

fn join_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prefix the first line of `text` with `first`, following lines with
/// `rest`, and blank lines with `blank`
fn prefix_lines(text: &str, first: &str, rest: &str, blank: &str) -> String {
    let mut output = String::with_capacity(text.len() + 16);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            output.push('\n');
        }
        if i == 0 {
            output.push_str(first);
        } else if line.is_empty() {
            output.push_str(blank);
        } else {
            output.push_str(rest);
        }
        output.push_str(line);
    }
    output
}

//! Document tree types
//!
//! A ProseMirror-style JSON tree: every node has a `type`, block nodes carry
//! `content`, text leaves carry `text` and `marks`.
//! Reference: https://prosemirror.net/docs/ref/#model.Node.toJSON

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node and mark attributes
pub type Attrs = Map<String, Value>;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Node kind (e.g., "paragraph", "bulletList", "text")
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    /// Child nodes (absent on leaves)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<DocumentNode>>,
    /// Literal payload of a text leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline formatting of a text leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
    /// Fields outside the tree model, kept so that a rewritten tree
    /// serializes back with the same shape
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inline formatting applied to a text run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mark {
    /// Mark kind (e.g., "bold", "em", "link")
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentNode {
    /// Create a node of the given type with no fields set
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    /// Create a container node
    pub fn with_content(node_type: impl Into<String>, content: Vec<DocumentNode>) -> Self {
        Self {
            content: Some(content),
            ..Self::new(node_type)
        }
    }

    /// Set one attribute, returning the updated node
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn doc(content: Vec<DocumentNode>) -> Self {
        Self::with_content("doc", content)
    }

    pub fn paragraph(content: Vec<DocumentNode>) -> Self {
        Self::with_content("paragraph", content)
    }

    pub fn heading(level: u8, content: Vec<DocumentNode>) -> Self {
        Self::with_content("heading", content).attr("level", level)
    }

    pub fn blockquote(content: Vec<DocumentNode>) -> Self {
        Self::with_content("blockquote", content)
    }

    pub fn bullet_list(items: Vec<DocumentNode>) -> Self {
        Self::with_content("bullet_list", items)
    }

    pub fn ordered_list(items: Vec<DocumentNode>) -> Self {
        Self::with_content("ordered_list", items)
    }

    pub fn list_item(content: Vec<DocumentNode>) -> Self {
        Self::with_content("list_item", content)
    }

    /// Code block holding a single text leaf
    pub fn code_block(language: Option<&str>, code: impl Into<String>) -> Self {
        let node = Self::with_content("code_block", vec![Self::text(code)]);
        match language {
            Some(lang) => node.attr("language", lang),
            None => node,
        }
    }

    pub fn horizontal_rule() -> Self {
        Self::new("horizontal_rule")
    }

    pub fn hard_break() -> Self {
        Self::new("hard_break")
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new("image")
            .attr("src", src.into())
            .attr("alt", alt.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self {
            text: Some(s.into()),
            ..Self::new("text")
        }
    }

    pub fn marked_text(s: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            marks: Some(marks),
            ..Self::text(s)
        }
    }

    /// Child nodes, empty for leaves
    pub fn children(&self) -> &[DocumentNode] {
        self.content.as_deref().unwrap_or_default()
    }

    /// Marks of a text leaf, empty when absent
    pub fn mark_list(&self) -> &[Mark] {
        self.marks.as_deref().unwrap_or_default()
    }

    /// Look up an attribute, treating JSON `null` as absent
    pub fn get_attr(&self, key: &str) -> Option<&Value> {
        self.attrs
            .as_ref()
            .and_then(|a| a.get(key))
            .filter(|v| !v.is_null())
    }

    /// Look up a string attribute
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.get_attr(key).and_then(Value::as_str)
    }

    /// Look up an unsigned integer attribute
    pub fn u64_attr(&self, key: &str) -> Option<u64> {
        self.get_attr(key).and_then(Value::as_u64)
    }

    /// Number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }
}

impl Mark {
    pub fn new(mark_type: impl Into<String>) -> Self {
        Self {
            mark_type: mark_type.into(),
            ..Self::default()
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new("link").attr("href", href.into())
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a string attribute, treating JSON `null` as absent
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|a| a.get(key))
            .and_then(Value::as_str)
    }
}

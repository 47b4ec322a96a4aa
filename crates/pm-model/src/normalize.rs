//! Vendor vocabulary normalization
//!
//! Rich-text editors built on ProseMirror (tiptap and friends) spell node and
//! mark types in camelCase (`bulletList`, `bold`), while the Markdown schema
//! uses snake_case names (`bullet_list`, `strong`). Normalization rewrites
//! the names and nothing else.

use crate::node::{DocumentNode, Mark};

/// Vendor node type names and their canonical spelling
const NODE_TYPE_ALIASES: &[(&str, &str)] = &[
    ("orderedList", "ordered_list"),
    ("bulletList", "bullet_list"),
    ("listItem", "list_item"),
    ("hardBreak", "hard_break"),
    ("codeBlock", "code_block"),
    ("horizontalRule", "horizontal_rule"),
];

/// Vendor mark type names and their canonical spelling
const MARK_TYPE_ALIASES: &[(&str, &str)] = &[("bold", "strong"), ("italic", "em")];

fn lookup<'a>(table: &[(&str, &'static str)], name: &'a str) -> &'a str {
    table
        .iter()
        .find(|(vendor, _)| *vendor == name)
        .map_or(name, |&(_, canonical)| canonical)
}

/// Canonical spelling of a node type; unknown names are returned unchanged
pub fn canonical_node_type(name: &str) -> &str {
    lookup(NODE_TYPE_ALIASES, name)
}

/// Canonical spelling of a mark type; unknown names are returned unchanged
pub fn canonical_mark_type(name: &str) -> &str {
    lookup(MARK_TYPE_ALIASES, name)
}

/// Rewrite vendor type names in a tree into the canonical vocabulary.
///
/// The input is left untouched. The result has the same shape, attributes,
/// text and extra fields; only node `type` and mark `type` values differ.
/// Normalizing an already canonical tree returns an equal tree.
pub fn normalize(node: &DocumentNode) -> DocumentNode {
    let node_type = canonical_node_type(&node.node_type);
    if node_type != node.node_type {
        tracing::trace!(from = %node.node_type, to = node_type, "renamed node type");
    }

    DocumentNode {
        node_type: node_type.to_string(),
        attrs: node.attrs.clone(),
        content: node
            .content
            .as_ref()
            .map(|children| children.iter().map(normalize).collect()),
        text: node.text.clone(),
        marks: node
            .marks
            .as_ref()
            .map(|marks| marks.iter().map(normalize_mark).collect()),
        extra: node.extra.clone(),
    }
}

/// Rewrite a mark's type name, keeping its attributes verbatim
pub fn normalize_mark(mark: &Mark) -> Mark {
    Mark {
        mark_type: canonical_mark_type(&mark.mark_type).to_string(),
        ..mark.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    /// Tree shape with type names erased
    fn shape(node: &DocumentNode) -> String {
        let children: Vec<String> = node.children().iter().map(shape).collect();
        format!("({})", children.join(""))
    }

    #[test]
    fn test_node_types_renamed() {
        for (vendor, canonical) in NODE_TYPE_ALIASES {
            let node = normalize(&DocumentNode::new(*vendor));
            assert_eq!(node.node_type, *canonical);
        }
    }

    #[test]
    fn test_mark_types_renamed() {
        let text = DocumentNode::marked_text(
            "x",
            vec![Mark::new("bold"), Mark::new("italic"), Mark::new("code")],
        );
        let normalized = normalize(&text);
        let names: Vec<&str> = normalized
            .mark_list()
            .iter()
            .map(|m| m.mark_type.as_str())
            .collect();
        assert_eq!(names, ["strong", "em", "code"]);
    }

    #[test]
    fn test_unknown_types_pass_through() {
        let node = DocumentNode::with_content(
            "customEmbed",
            vec![DocumentNode::marked_text("x", vec![Mark::new("highlight")])],
        );
        assert_eq!(normalize(&node), node);
    }

    #[test]
    fn test_link_attrs_preserved() {
        let text = DocumentNode::marked_text(
            "site",
            vec![Mark::link("https://example.com").attr("target", "_blank")],
        );
        let normalized = normalize(&text);
        assert_eq!(normalized.mark_list(), text.mark_list());
    }

    #[test]
    fn test_input_not_mutated() {
        let doc = DocumentNode::doc(vec![DocumentNode::with_content(
            "bulletList",
            vec![DocumentNode::with_content("listItem", vec![])],
        )]);
        let before = doc.clone();
        let _ = normalize(&doc);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_nested_lists_renamed() {
        let doc = parse(
            r#"{"type":"doc","content":[
                {"type":"orderedList","attrs":{"start":3},"content":[
                    {"type":"listItem","content":[
                        {"type":"paragraph","content":[{"type":"text","text":"a"}]},
                        {"type":"bulletList","content":[
                            {"type":"listItem","content":[
                                {"type":"paragraph","content":[
                                    {"type":"text","text":"b"},
                                    {"type":"hardBreak"},
                                    {"type":"text","text":"c","marks":[{"type":"italic"}]}
                                ]}
                            ]}
                        ]}
                    ]}
                ]}
            ]}"#,
        )
        .unwrap();

        let normalized = normalize(&doc);
        let list = &normalized.children()[0];
        assert_eq!(list.node_type, "ordered_list");
        assert_eq!(list.u64_attr("start"), Some(3));

        let item = &list.children()[0];
        assert_eq!(item.node_type, "list_item");
        let nested = &item.children()[1];
        assert_eq!(nested.node_type, "bullet_list");

        let para = &nested.children()[0].children()[0];
        assert_eq!(para.children()[1].node_type, "hard_break");
        assert_eq!(para.children()[2].mark_list()[0].mark_type, "em");
    }

    #[test]
    fn test_idempotent() {
        let doc = parse(
            r#"{"type":"doc","content":[
                {"type":"codeBlock","attrs":{"language":"js"},"content":[{"type":"text","text":"x"}]},
                {"type":"horizontalRule"},
                {"type":"paragraph","content":[{"type":"text","text":"y","marks":[{"type":"bold"}]}]}
            ]}"#,
        )
        .unwrap();

        let once = normalize(&doc);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_shape_preserved() {
        let doc = parse(
            r#"{"type":"doc","content":[
                {"type":"bulletList","content":[
                    {"type":"listItem","content":[{"type":"paragraph","content":[]}]},
                    {"type":"listItem","content":[{"type":"paragraph"}]}
                ]},
                {"type":"paragraph","content":[{"type":"text","text":"z"}],"id":"p1"}
            ]}"#,
        )
        .unwrap();

        let normalized = normalize(&doc);
        assert_eq!(normalized.node_count(), doc.node_count());
        assert_eq!(shape(&normalized), shape(&doc));
        assert_eq!(normalized.children()[1].extra, doc.children()[1].extra);
        // `content: []` and a missing `content` stay distinguishable
        let items = normalized.children()[0].children();
        assert_eq!(items[0].children()[0].content.as_deref(), Some(&[][..]));
        assert!(items[1].children()[0].content.is_none());
    }
}

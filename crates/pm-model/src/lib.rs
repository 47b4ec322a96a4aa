//! pm-model: document tree model for ProseMirror-style rich text
//!
//! This crate provides:
//! - The document tree types (`DocumentNode`, `Mark`)
//! - JSON parsing into the tree
//! - Normalization of vendor node/mark names into the canonical vocabulary
//!
//! # Example
//!
//! ```
//! use pm_model::{normalize, parse};
//!
//! let json = r#"{"type":"doc","content":[{"type":"bulletList","content":[]}]}"#;
//!
//! let doc = normalize(&parse(json).unwrap());
//! assert_eq!(doc.children()[0].node_type, "bullet_list");
//! ```

pub mod node;
pub mod normalize;
pub mod parser;

// Re-export main types for convenient access
pub use node::{Attrs, DocumentNode, Mark};
pub use normalize::{canonical_mark_type, canonical_node_type, normalize, normalize_mark};
pub use parser::{MAX_DEPTH, ParseError, ParseResult, parse, parse_value};

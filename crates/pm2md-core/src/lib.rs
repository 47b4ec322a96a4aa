//! pm2md-core: Core library for converting ProseMirror-style documents to Markdown
//!
//! This crate provides:
//! - The canonical node and mark vocabulary
//! - The Markdown writer for canonical trees
//! - The parse, normalize and serialize pipeline
//!
//! ## Example
//!
//! ```rust
//! use pm2md_core::{WriterOptions, convert};
//!
//! let json = r#"{"type":"doc","content":[
//!     {"type":"paragraph","content":[
//!         {"type":"text","text":"Hello","marks":[{"type":"bold"}]}
//!     ]}
//! ]}"#;
//!
//! let markdown = convert(json, &WriterOptions::default()).unwrap();
//! assert_eq!(markdown, "**Hello**");
//! ```

pub mod convert;
pub mod error;
pub mod escape;
mod inline;
pub mod schema;
pub mod writer;

pub use convert::{convert, convert_value};
pub use error::{ConvertError, SchemaError};
pub use schema::{MarkKind, NodeKind};
pub use writer::{Bullet, HardBreak, WriterOptions, doc_to_markdown, serialize};

pub use pm_model::{DocumentNode, Mark, ParseError, normalize, parse};

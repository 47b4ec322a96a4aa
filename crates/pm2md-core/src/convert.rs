//! JSON document to Markdown pipeline
//!
//! Parses the JSON tree, rewrites the vendor vocabulary and writes Markdown.
//! Either the whole document converts or an error is returned; there is no
//! partial output.

use crate::error::ConvertError;
use crate::writer::{WriterOptions, doc_to_markdown};
use pm_model::{normalize, parse, parse_value};
use serde_json::Value;

/// Convert a JSON document to Markdown
pub fn convert(json: &str, options: &WriterOptions) -> Result<String, ConvertError> {
    let doc = parse(json)?;
    Ok(doc_to_markdown(&normalize(&doc), options)?)
}

/// Convert an already decoded JSON document to Markdown
pub fn convert_value(value: Value, options: &WriterOptions) -> Result<String, ConvertError> {
    let doc = parse_value(value)?;
    Ok(doc_to_markdown(&normalize(&doc), options)?)
}

//! JSON input parsing
//!
//! Documents arrive as a complete JSON value. The nesting of objects and
//! arrays is measured before anything is built, and documents nested deeper
//! than [`MAX_DEPTH`] are rejected with [`ParseError::TooDeep`]. Every tree
//! handed to later stages is therefore bounded.

use crate::node::DocumentNode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Maximum nesting of JSON objects and arrays in a document.
///
/// A list level takes four (list object, `content`, item object, `content`),
/// so this allows over 60 nested lists inside a document.
pub const MAX_DEPTH: usize = 256;

/// Errors for input that is not a document tree at all
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document root must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("Malformed document tree: {0}")]
    InvalidTree(#[source] serde_json::Error),
    #[error("Document nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a JSON document tree
pub fn parse(source: &str) -> ParseResult<DocumentNode> {
    if source_depth_exceeds(source, MAX_DEPTH) {
        return Err(ParseError::TooDeep { limit: MAX_DEPTH });
    }

    // Depth is already bounded above; the reader's own limit is lower
    let mut deserializer = serde_json::Deserializer::from_str(source);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;

    parse_value(value)
}

/// Convert an already decoded JSON value into a document tree
pub fn parse_value(value: Value) -> ParseResult<DocumentNode> {
    if !value.is_object() {
        return Err(ParseError::NotAnObject(json_kind(&value)));
    }
    if value_depth_exceeds(&value, MAX_DEPTH) {
        return Err(ParseError::TooDeep { limit: MAX_DEPTH });
    }
    serde_json::from_value(value).map_err(ParseError::InvalidTree)
}

/// Scan JSON text for object/array nesting deeper than `limit`
fn source_depth_exceeds(source: &str, limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for b in source.bytes() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    false
}

/// Object/array nesting of a decoded value, walked without recursion
fn value_depth_exceeds(value: &Value, limit: usize) -> bool {
    let mut stack = vec![(value, 1usize)];
    while let Some((value, depth)) = stack.pop() {
        let children: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => continue,
        };
        if depth > limit {
            return true;
        }
        stack.extend(children.into_iter().map(|child| (child, depth + 1)));
    }
    false
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

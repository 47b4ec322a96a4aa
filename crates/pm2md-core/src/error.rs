//! Conversion errors

use pm_model::ParseError;
use thiserror::Error;

/// A well-formed tree the writer cannot render.
///
/// `path` is a JSON pointer to the offending node, e.g. `/content/0/content/2`
/// (`/` for the root).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown node type `{node_type}` at {path}")]
    UnknownNodeType { node_type: String, path: String },

    #[error("`{node_type}` node at {path} has both text and content")]
    TextWithContent { node_type: String, path: String },

    #[error("`{node_type}` node at {path} cannot carry text")]
    UnexpectedText { node_type: String, path: String },

    #[error("Text node at {path} has no text")]
    MissingText { path: String },

    #[error("`{child}` is not allowed inside `{parent}` at {path}")]
    InvalidChild {
        parent: String,
        child: String,
        path: String,
    },

    #[error("`{node_type}` node at {path} cannot have content")]
    UnexpectedContent { node_type: String, path: String },

    #[error("Invalid `{name}` attribute on `{node_type}` at {path}: {reason}")]
    InvalidAttribute {
        node_type: String,
        name: String,
        reason: String,
        path: String,
    },
}

impl SchemaError {
    /// Type of the node that failed to render
    pub fn node_type(&self) -> &str {
        match self {
            Self::UnknownNodeType { node_type, .. }
            | Self::TextWithContent { node_type, .. }
            | Self::UnexpectedText { node_type, .. }
            | Self::UnexpectedContent { node_type, .. }
            | Self::InvalidAttribute { node_type, .. } => node_type,
            Self::MissingText { .. } => "text",
            Self::InvalidChild { child, .. } => child,
        }
    }

    /// JSON pointer to the node that failed to render
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownNodeType { path, .. }
            | Self::TextWithContent { path, .. }
            | Self::UnexpectedText { path, .. }
            | Self::MissingText { path }
            | Self::InvalidChild { path, .. }
            | Self::UnexpectedContent { path, .. }
            | Self::InvalidAttribute { path, .. } => path,
        }
    }
}

/// Errors of the full JSON to Markdown pipeline
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Malformed(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_node_message() {
        let err = SchemaError::UnknownNodeType {
            node_type: "customEmbed".to_string(),
            path: "/content/3".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown node type `customEmbed` at /content/3");
        assert_eq!(err.node_type(), "customEmbed");
        assert_eq!(err.path(), "/content/3");
    }

    #[test]
    fn test_invalid_child_names_child() {
        let err = SchemaError::InvalidChild {
            parent: "paragraph".to_string(),
            child: "blockquote".to_string(),
            path: "/content/0/content/1".to_string(),
        };
        assert_eq!(err.node_type(), "blockquote");
        assert!(err.to_string().contains("inside `paragraph`"));
    }

    #[test]
    fn test_convert_error_is_transparent() {
        let err: ConvertError = SchemaError::MissingText {
            path: "/".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Text node at / has no text");
    }
}

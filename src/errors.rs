//! Error types for document editing, import and export.

use thiserror::Error;

use crate::types::TextFormat;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for editor operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed JSON input
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML input
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Parsed text is not an acceptable OpenAPI document
    #[error("invalid OpenAPI document: {0}")]
    InvalidDocument(String),

    /// Text that does not name a known enum member
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    /// Path not found in the collection
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// Operation not found in its path
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    /// Parameter not found in its operation
    #[error("parameter not found: {0}")]
    ParameterNotFound(String),

    /// Response not found in its operation
    #[error("response not found: {0}")]
    ResponseNotFound(String),

    /// Content type not present in a request body
    #[error("content type not found: {0}")]
    ContentTypeNotFound(String),

    /// Named example not present
    #[error("example not found: {0}")]
    ExampleNotFound(String),

    /// Security scheme not present in the registry
    #[error("security scheme not found: {0}")]
    SecuritySchemeNotFound(String),

    /// Tag not present
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Server variable not present
    #[error("server variable not found: {0}")]
    ServerVariableNotFound(String),

    /// Positional index past the end of a list
    #[error("{what} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Schema editor asked to descend past its depth cap
    #[error("schema depth limit reached: depth {depth} exceeds max {max_depth}")]
    DepthLimit { depth: usize, max_depth: usize },

    /// Schema path step that does not apply to the node it addresses
    #[error("invalid schema step at depth {depth}: {message}")]
    InvalidSchemaStep { depth: usize, message: String },

    /// Field validation failure
    #[error("validation error: field={field} message={message}")]
    Validation { field: String, message: String },
}

impl Error {
    /// Creates a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Error::InvalidDocument(message.into())
    }

    /// Creates a new unknown variant error
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Error::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Creates a new index out of bounds error
    pub fn index_out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { what, index, len }
    }

    /// Creates a new invalid schema step error
    pub fn invalid_schema_step(depth: usize, message: impl Into<String>) -> Self {
        Error::InvalidSchemaStep {
            depth,
            message: message.into(),
        }
    }

    /// Returns the text format whose syntax was rejected, if this is a syntax error
    pub fn syntax_format(&self) -> Option<TextFormat> {
        match self {
            Error::Json(_) => Some(TextFormat::Json),
            Error::Yaml(_) => Some(TextFormat::Yaml),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PathNotFound("abc".to_string());
        assert_eq!(err.to_string(), "path not found: abc");

        let err = Error::invalid_document("missing info");
        assert_eq!(err.to_string(), "invalid OpenAPI document: missing info");

        let err = Error::unknown_variant("HTTP method", "FETCH");
        assert_eq!(err.to_string(), "unknown HTTP method: FETCH");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("tag.name", "name is required");
        assert!(err.to_string().contains("tag.name"));
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_syntax_format() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).syntax_format(), Some(TextFormat::Json));
        assert_eq!(Error::TagNotFound("x".into()).syntax_format(), None);
    }

    #[test]
    fn test_depth_limit_display() {
        let err = Error::DepthLimit {
            depth: 6,
            max_depth: 5,
        };
        assert!(err.to_string().contains("exceeds max 5"));
    }
}

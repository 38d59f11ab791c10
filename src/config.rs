//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::errors::Result;
use crate::types::TextFormat;
use crate::version::OPENAPI_VERSION;

/// Default cap on how deep the schema editor will descend
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 5;

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// `openapi` value written into new documents
    pub openapi_version: String,
    /// Deepest schema level the editor exposes for editing
    pub max_schema_depth: usize,
    /// Title for new documents
    pub default_title: String,
    /// Version for new documents
    pub default_version: String,
    /// Description for new documents
    pub default_description: String,
    /// Whether new documents start with the example templated server
    pub seed_example_server: bool,
    /// Whether registry schemes nobody references are still exported
    pub export_unreferenced_security_schemes: bool,
    /// Format used by the preview when none is requested
    pub default_format: TextFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            openapi_version: OPENAPI_VERSION.to_string(),
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
            default_title: "My API".to_string(),
            default_version: "1.0.0".to_string(),
            default_description: "API Description".to_string(),
            seed_example_server: true,
            export_unreferenced_security_schemes: true,
            default_format: TextFormat::Yaml,
        }
    }
}

impl EditorConfig {
    /// Loads a configuration from JSON or YAML text.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_text(text: &str) -> Result<Self> {
        let value = codec::parse(text)?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.openapi_version, "3.0.0");
        assert_eq!(config.max_schema_depth, 5);
        assert!(config.seed_example_server);
        assert_eq!(config.default_format, TextFormat::Yaml);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = EditorConfig::from_text("max_schema_depth: 3\ndefault_format: json\n").unwrap();
        assert_eq!(config.max_schema_depth, 3);
        assert_eq!(config.default_format, TextFormat::Json);
        assert_eq!(config.default_title, "My API");
    }

    #[test]
    fn test_from_json() {
        let config = EditorConfig::from_text(r#"{"seed_example_server": false}"#).unwrap();
        assert!(!config.seed_example_server);
    }

    #[test]
    fn test_from_text_rejects_bad_types() {
        assert!(EditorConfig::from_text("max_schema_depth: deep").is_err());
    }
}

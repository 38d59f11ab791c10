//! Docket - headless core of a visual OpenAPI 3.0 editor
//!
//! Docket holds the document an editor works on and every structured edit
//! it can make, without any presentation layer.
//!
//! # Overview
//!
//! Docket provides:
//! - A recursive schema model with a depth-capped editor
//! - Parameters, request bodies, responses and named examples
//! - Operations and the path collection that owns them
//! - A security scheme registry seeded with five baseline schemes
//! - API info, servers and tags
//! - JSON/YAML parse, validate, format and per-section extraction
//! - Atomic import and section-preserving export
//!
//! # Basic Usage
//!
//! ```
//! use docket::prelude::*;
//!
//! let mut doc = Document::new();
//! let path_id = doc.update_paths(|paths| {
//!     let draft = PathDraft::new("/pets")
//!         .update_operation(0, OperationDraft::new(HttpMethod::Get, "List pets"))?;
//!     Ok(paths.add_draft(&draft))
//! })?;
//!
//! let op = doc.paths().get(&path_id)?.operations[0].clone();
//! assert_eq!(op.operation_id, "getPets");
//!
//! let artifact = doc.export(TextFormat::Yaml)?;
//! assert_eq!(artifact.file_name, "api-specification.yaml");
//! # Ok::<(), docket::Error>(())
//! ```
//!
//! Every model type is an immutable value: edits derive a new value that the
//! caller puts back in its parent (`with_*`, `add_*`, `update_*`).

pub mod codec;
pub mod config;
pub mod document;
pub mod errors;
pub mod example;
pub mod info;
pub mod operation;
pub mod parameter;
pub mod path;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod types;
pub mod version;

// Re-exports for convenience
pub use document::{Document, ExportArtifact, Section};
pub use errors::{Error, Result};
pub use version::{is_supported, OPENAPI_VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::{
        extract_api_info, extract_security_schemes, extract_servers, extract_tags, format,
        parse, validate,
    };
    pub use crate::config::EditorConfig;
    pub use crate::document::*;
    pub use crate::errors::{Error, Result};
    pub use crate::example::{Example, ExampleSet};
    pub use crate::info::*;
    pub use crate::operation::{generate_operation_id, Operation};
    pub use crate::parameter::Parameter;
    pub use crate::path::*;
    pub use crate::request_body::{MediaTypeObject, RequestBodyObject};
    pub use crate::response::ResponseObject;
    pub use crate::schema::*;
    pub use crate::security::*;
    pub use crate::types::*;
}

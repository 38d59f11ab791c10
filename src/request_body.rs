//! Request bodies keyed by content type.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::example::{self, ExampleSet};
use crate::schema::SchemaObject;

/// Content types offered by the editor
pub const CONTENT_TYPE_SUGGESTIONS: [&str; 6] = [
    "application/json",
    "application/xml",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
    "text/plain",
    "application/octet-stream",
];

/// Content type the editor shows first when a body has none
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Schema and examples for one content type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaTypeObject {
    pub schema: Option<SchemaObject>,
    pub examples: ExampleSet,
    /// `example`, `encoding` and extensions
    pub extra: Map<String, Value>,
}

/// Request body of an operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestBodyObject {
    pub description: String,
    pub required: bool,
    /// Independent entries per content type
    pub content: IndexMap<String, MediaTypeObject>,
    /// Target of a `$ref` body; such a body is written back as is
    pub reference: Option<String>,
    /// Source keys outside the model
    pub extra: Map<String, Value>,
}

impl RequestBodyObject {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> RequestBodyObject {
        RequestBodyObject {
            description: description.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_required(&self, required: bool) -> RequestBodyObject {
        RequestBodyObject {
            required,
            ..self.clone()
        }
    }

    /// Adds a content type with an empty object schema.
    ///
    /// An existing entry is never overwritten.
    #[must_use]
    pub fn add_content_type(&self, content_type: &str) -> RequestBodyObject {
        if self.content.contains_key(content_type) {
            return self.clone();
        }
        let mut next = self.clone();
        next.content.insert(
            content_type.to_string(),
            MediaTypeObject {
                schema: Some(SchemaObject::object()),
                ..MediaTypeObject::default()
            },
        );
        next
    }

    /// Removes a content type and its schema and examples
    pub fn remove_content_type(&self, content_type: &str) -> Result<RequestBodyObject> {
        if !self.content.contains_key(content_type) {
            return Err(Error::ContentTypeNotFound(content_type.to_string()));
        }
        let mut next = self.clone();
        next.content.shift_remove(content_type);
        Ok(next)
    }

    /// Replaces the schema of one content type, leaving the others alone
    pub fn set_schema(&self, content_type: &str, schema: SchemaObject) -> Result<RequestBodyObject> {
        self.update_media(content_type, |media| MediaTypeObject {
            schema: Some(schema),
            ..media.clone()
        })
    }

    /// Replaces the examples of one content type
    pub fn set_examples(&self, content_type: &str, examples: ExampleSet) -> Result<RequestBodyObject> {
        self.update_media(content_type, |media| MediaTypeObject {
            examples,
            ..media.clone()
        })
    }

    /// Adds a placeholder example to one content type
    pub fn add_example(&self, content_type: &str) -> Result<RequestBodyObject> {
        self.update_media(content_type, |media| MediaTypeObject {
            examples: example::add_example(&media.examples),
            ..media.clone()
        })
    }

    /// The content type an editor shows first
    pub fn active_content_type(&self) -> &str {
        self.content
            .keys()
            .next()
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Suggestions not yet present in this body
    pub fn available_content_types(&self) -> Vec<&'static str> {
        CONTENT_TYPE_SUGGESTIONS
            .iter()
            .copied()
            .filter(|ct| !self.content.contains_key(*ct))
            .collect()
    }

    pub fn media(&self, content_type: &str) -> Result<&MediaTypeObject> {
        self.content
            .get(content_type)
            .ok_or_else(|| Error::ContentTypeNotFound(content_type.to_string()))
    }

    /// Renders the body as an OpenAPI request body object
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if let Some(reference) = &self.reference {
            out.insert("$ref".to_string(), Value::from(reference.as_str()));
            out.extend(self.extra.clone());
            return Value::Object(out);
        }
        if !self.description.is_empty() {
            out.insert(
                "description".to_string(),
                Value::from(self.description.as_str()),
            );
        }
        if self.required {
            out.insert("required".to_string(), Value::Bool(true));
        }

        let content = self
            .content
            .iter()
            .map(|(content_type, media)| (content_type.clone(), media.to_openapi()))
            .collect();
        out.insert("content".to_string(), Value::Object(content));
        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI request body object.
    ///
    /// A `$ref` is not resolved; it is kept and written back unchanged.
    pub fn from_openapi(value: &Value) -> Option<RequestBodyObject> {
        let mut extra = value.as_object()?.clone();
        if let Some(reference) = extra.get("$ref").and_then(Value::as_str).map(String::from) {
            log::debug!("keeping request body reference '{reference}' unresolved");
            extra.remove("$ref");
            return Some(RequestBodyObject {
                reference: Some(reference),
                extra,
                ..RequestBodyObject::default()
            });
        }

        let content = match extra.remove("content") {
            Some(Value::Object(content)) => content
                .iter()
                .map(|(content_type, media)| {
                    (content_type.clone(), MediaTypeObject::from_openapi(media))
                })
                .collect(),
            Some(other) => {
                extra.insert("content".to_string(), other);
                IndexMap::new()
            }
            None => IndexMap::new(),
        };
        let description = match extra.remove("description") {
            Some(Value::String(text)) => text,
            Some(other) => {
                extra.insert("description".to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        // An explicit `required: false` stays in `extra` and is written back
        let required = extra.get("required").and_then(Value::as_bool) == Some(true);
        if required {
            extra.remove("required");
        }

        Some(RequestBodyObject {
            description,
            required,
            content,
            reference: None,
            extra,
        })
    }

    fn update_media<F>(&self, content_type: &str, f: F) -> Result<RequestBodyObject>
    where
        F: FnOnce(&MediaTypeObject) -> MediaTypeObject,
    {
        let media = self.media(content_type)?;
        let mut next = self.clone();
        next.content.insert(content_type.to_string(), f(media));
        Ok(next)
    }
}

impl MediaTypeObject {
    pub fn to_openapi(&self) -> Value {
        let mut entry = Map::new();
        if let Some(schema) = &self.schema {
            entry.insert("schema".to_string(), schema.to_openapi());
        }
        if !self.examples.is_empty() {
            entry.insert(
                "examples".to_string(),
                example::examples_to_openapi(&self.examples),
            );
        }
        for (key, value) in &self.extra {
            if !entry.contains_key(key) {
                entry.insert(key.clone(), value.clone());
            }
        }
        Value::Object(entry)
    }

    /// Reads one entry of a `content` map
    pub fn from_openapi(value: &Value) -> MediaTypeObject {
        let mut extra = value.as_object().cloned().unwrap_or_default();
        let schema = extra.remove("schema").map(|s| SchemaObject::from_openapi(&s));
        let examples = match extra.remove("examples") {
            Some(examples) if examples.is_object() => example::examples_from_openapi(Some(&examples)),
            Some(other) => {
                extra.insert("examples".to_string(), other);
                ExampleSet::new()
            }
            None => ExampleSet::new(),
        };
        MediaTypeObject {
            schema,
            examples,
            extra,
        }
    }
}

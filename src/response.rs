//! Operation responses and the canonical status code suggestions.

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::example::{self, ExampleSet};
use crate::schema::SchemaObject;

/// Media type new responses are emitted under
pub const RESPONSE_CONTENT_TYPE: &str = "application/json";

/// Suggested status code with its canned description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSuggestion {
    pub code: &'static str,
    /// Short reason phrase shown in the picker
    pub reason: &'static str,
    /// Description written into the response when the code is picked
    pub description: &'static str,
}

/// The ten status codes offered by the editor
pub const STATUS_CODE_SUGGESTIONS: [StatusSuggestion; 10] = [
    StatusSuggestion { code: "200", reason: "OK", description: "Successful response" },
    StatusSuggestion { code: "201", reason: "Created", description: "Resource created" },
    StatusSuggestion { code: "204", reason: "No Content", description: "Successful but no content" },
    StatusSuggestion { code: "400", reason: "Bad Request", description: "Invalid request" },
    StatusSuggestion { code: "401", reason: "Unauthorized", description: "Authentication required" },
    StatusSuggestion { code: "403", reason: "Forbidden", description: "Not authorized" },
    StatusSuggestion { code: "404", reason: "Not Found", description: "Resource not found" },
    StatusSuggestion { code: "409", reason: "Conflict", description: "Resource conflict" },
    StatusSuggestion { code: "422", reason: "Unprocessable Entity", description: "Validation failed" },
    StatusSuggestion { code: "500", reason: "Internal Server Error", description: "Server error" },
];

/// Looks up the suggestion for a status code
pub fn status_suggestion(code: &str) -> Option<&'static StatusSuggestion> {
    STATUS_CODE_SUGGESTIONS.iter().find(|s| s.code == code)
}

/// Response of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseObject {
    pub id: String,
    /// Free text; usually a status code, but `default` or `2XX` are accepted
    pub status_code: String,
    pub description: String,
    pub schema: Option<SchemaObject>,
    pub examples: ExampleSet,
    /// Media type the schema and examples are written under
    pub content_type: String,
    /// Other keys of the edited media type entry; `Some` when the source had the entry
    pub media_extra: Option<Map<String, Value>>,
    /// Media types besides `content_type`, kept as written
    pub other_content: Map<String, Value>,
    /// Target of a `$ref` response; such a response is written back as is
    pub reference: Option<String>,
    /// `headers`, `links` and extensions
    pub extra: Map<String, Value>,
}

impl ResponseObject {
    pub fn new(status_code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: format!("resp-{}", uuid::Uuid::new_v4()),
            status_code: status_code.into(),
            description: description.into(),
            schema: None,
            examples: ExampleSet::new(),
            content_type: RESPONSE_CONTENT_TYPE.to_string(),
            media_extra: None,
            other_content: Map::new(),
            reference: None,
            extra: Map::new(),
        }
    }

    /// The `200 Successful operation` response new operations start with
    pub fn successful() -> Self {
        Self::new("200", "Successful operation")
    }

    /// Sets the status code from free text; the description is untouched
    #[must_use]
    pub fn with_status_code(&self, status_code: impl Into<String>) -> ResponseObject {
        ResponseObject {
            status_code: status_code.into(),
            ..self.clone()
        }
    }

    /// Picks a status code from the suggestion list.
    ///
    /// A known code also overwrites the description with its canned text.
    #[must_use]
    pub fn select_status_code(&self, status_code: &str) -> ResponseObject {
        let description = status_suggestion(status_code)
            .map(|s| s.description.to_string())
            .unwrap_or_else(|| self.description.clone());
        ResponseObject {
            status_code: status_code.to_string(),
            description,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> ResponseObject {
        ResponseObject {
            description: description.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_schema(&self, schema: SchemaObject) -> ResponseObject {
        ResponseObject {
            schema: Some(schema),
            ..self.clone()
        }
    }

    /// Creates the response schema on first expansion; no-op when present
    #[must_use]
    pub fn init_schema(&self) -> ResponseObject {
        if self.schema.is_some() {
            return self.clone();
        }
        self.with_schema(SchemaObject::object().with_description("Response schema"))
    }

    #[must_use]
    pub fn with_examples(&self, examples: ExampleSet) -> ResponseObject {
        ResponseObject {
            examples,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn add_example(&self) -> ResponseObject {
        self.with_examples(example::add_example(&self.examples))
    }

    pub fn update_example_value(&self, name: &str, text: &str) -> Result<ResponseObject> {
        Ok(self.with_examples(example::update_example_value(&self.examples, name, text)?))
    }

    pub fn update_example_description(&self, name: &str, description: &str) -> Result<ResponseObject> {
        Ok(self.with_examples(example::update_example_description(
            &self.examples,
            name,
            description,
        )?))
    }

    pub fn rename_example(&self, from: &str, to: &str) -> Result<ResponseObject> {
        Ok(self.with_examples(example::rename_example(&self.examples, from, to)?))
    }

    pub fn delete_example(&self, name: &str) -> Result<ResponseObject> {
        Ok(self.with_examples(example::delete_example(&self.examples, name)?))
    }

    /// Renders the value stored under this response's status code
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if let Some(reference) = &self.reference {
            out.insert("$ref".to_string(), Value::from(reference.as_str()));
            out.extend(self.extra.clone());
            return Value::Object(out);
        }
        out.insert(
            "description".to_string(),
            Value::from(self.description.as_str()),
        );

        let mut content = Map::new();
        if self.schema.is_some() || !self.examples.is_empty() || self.media_extra.is_some() {
            let mut media = Map::new();
            if let Some(schema) = &self.schema {
                media.insert("schema".to_string(), schema.to_openapi());
            }
            if !self.examples.is_empty() {
                media.insert(
                    "examples".to_string(),
                    example::examples_to_openapi(&self.examples),
                );
            }
            for (key, value) in self.media_extra.iter().flatten() {
                if !media.contains_key(key) {
                    media.insert(key.clone(), value.clone());
                }
            }
            content.insert(self.content_type.clone(), Value::Object(media));
        }
        for (content_type, media) in &self.other_content {
            if !content.contains_key(content_type) {
                content.insert(content_type.clone(), media.clone());
            }
        }
        if !content.is_empty() {
            out.insert("content".to_string(), Value::Object(content));
        }

        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads one entry of an OpenAPI `responses` map.
    ///
    /// The schema and examples come from `application/json` when present,
    /// otherwise from the first media type. The remaining media types and
    /// keys such as `headers` are kept as written.
    pub fn from_openapi(status_code: &str, value: &Value) -> ResponseObject {
        let mut extra = value.as_object().cloned().unwrap_or_default();
        if let Some(reference) = extra.remove("$ref") {
            if let Some(text) = reference.as_str() {
                log::debug!("keeping response reference '{text}' unresolved");
                return ResponseObject {
                    reference: Some(text.to_string()),
                    extra,
                    ..ResponseObject::new(status_code, "")
                };
            }
            extra.insert("$ref".to_string(), reference);
        }

        let description = match extra.remove("description") {
            Some(Value::String(text)) => text,
            Some(other) => {
                extra.insert("description".to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        let mut response = ResponseObject::new(status_code, description);

        let Some(mut content) = extra.get("content").and_then(Value::as_object).cloned() else {
            response.extra = extra;
            return response;
        };
        extra.remove("content");

        let chosen = if content.contains_key(RESPONSE_CONTENT_TYPE) {
            Some(RESPONSE_CONTENT_TYPE.to_string())
        } else {
            content.keys().next().cloned()
        };
        if let Some(content_type) = chosen {
            match content.shift_remove(&content_type) {
                Some(Value::Object(mut media)) => {
                    response.schema = media.remove("schema").map(|s| SchemaObject::from_openapi(&s));
                    if let Some(examples) = media.remove("examples") {
                        if examples.is_object() {
                            response.examples = example::examples_from_openapi(Some(&examples));
                        } else {
                            media.insert("examples".to_string(), examples);
                        }
                    }
                    response.content_type = content_type;
                    response.media_extra = Some(media);
                }
                Some(other) => {
                    content.insert(content_type, other);
                }
                None => {}
            }
        }
        response.other_content = content;
        response.extra = extra;
        response
    }
}

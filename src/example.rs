//! Named examples attached to media types and responses.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Example value shown to API consumers
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub description: Option<String>,
    pub value: Value,
    /// `summary`, `externalValue`, `$ref` and extensions, kept as written
    pub extra: Map<String, Value>,
}

/// Keys that mark a mapping as an Example Object rather than a bare value
const EXAMPLE_OBJECT_KEYS: [&str; 5] = ["value", "description", "summary", "externalValue", "$ref"];

/// Examples keyed by name, in insertion order
pub type ExampleSet = IndexMap<String, Example>;

impl Example {
    /// Placeholder example added by the editor
    pub fn placeholder() -> Self {
        Self {
            description: Some("Example description".to_string()),
            value: serde_json::json!({"property": "value"}),
            extra: Map::new(),
        }
    }

    /// Renders the example as an OpenAPI example object
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::from(description.as_str()));
        }
        // An external or referenced example carries no inline value
        let external = self.extra.contains_key("externalValue") || self.extra.contains_key("$ref");
        if !(self.value.is_null() && external) {
            out.insert("value".to_string(), self.value.clone());
        }
        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI example object; a bare value is taken as the example value
    pub fn from_openapi(value: &Value) -> Self {
        match value.as_object() {
            Some(obj) if EXAMPLE_OBJECT_KEYS.iter().any(|key| obj.contains_key(*key)) => {
                let mut extra = obj.clone();
                let value = extra.remove("value").unwrap_or(Value::Null);
                let description = match extra.remove("description") {
                    Some(Value::String(text)) => Some(text),
                    Some(other) => {
                        extra.insert("description".to_string(), other);
                        None
                    }
                    None => None,
                };
                Self {
                    description,
                    value,
                    extra,
                }
            }
            _ => Self {
                description: None,
                value: value.clone(),
                extra: Map::new(),
            },
        }
    }
}

/// Parses editor text as JSON, keeping it as a plain string when it is not JSON
pub fn parse_example_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Adds a placeholder example named `Example <N+1>`
pub fn add_example(examples: &ExampleSet) -> ExampleSet {
    let mut next = examples.clone();
    let mut n = examples.len() + 1;
    while next.contains_key(&format!("Example {n}")) {
        n += 1;
    }
    next.insert(format!("Example {n}"), Example::placeholder());
    next
}

/// Replaces the value of `name` from editor text
pub fn update_example_value(examples: &ExampleSet, name: &str, text: &str) -> Result<ExampleSet> {
    update_example(examples, name, |ex| Example {
        value: parse_example_value(text),
        ..ex.clone()
    })
}

/// Replaces the description of `name`
pub fn update_example_description(
    examples: &ExampleSet,
    name: &str,
    description: impl Into<String>,
) -> Result<ExampleSet> {
    let description = crate::schema::non_empty(description.into());
    update_example(examples, name, |ex| Example {
        description,
        ..ex.clone()
    })
}

/// Renames an example in place; the old key is removed
pub fn rename_example(examples: &ExampleSet, from: &str, to: &str) -> Result<ExampleSet> {
    if !examples.contains_key(from) {
        return Err(Error::ExampleNotFound(from.to_string()));
    }
    if from != to && examples.contains_key(to) {
        return Err(Error::validation(
            "example.name",
            format!("an example named '{to}' already exists"),
        ));
    }
    Ok(examples
        .iter()
        .map(|(name, ex)| {
            let name = if name == from { to.to_string() } else { name.clone() };
            (name, ex.clone())
        })
        .collect())
}

/// Removes an example
pub fn delete_example(examples: &ExampleSet, name: &str) -> Result<ExampleSet> {
    if !examples.contains_key(name) {
        return Err(Error::ExampleNotFound(name.to_string()));
    }
    let mut next = examples.clone();
    next.shift_remove(name);
    Ok(next)
}

/// Renders a set as an OpenAPI `examples` map
pub fn examples_to_openapi(examples: &ExampleSet) -> Value {
    Value::Object(
        examples
            .iter()
            .map(|(name, ex)| (name.clone(), ex.to_openapi()))
            .collect(),
    )
}

/// Reads an OpenAPI `examples` map, ignoring anything that is not a map
pub fn examples_from_openapi(value: Option<&Value>) -> ExampleSet {
    value
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(name, ex)| (name.clone(), Example::from_openapi(ex)))
                .collect()
        })
        .unwrap_or_default()
}

fn update_example<F>(examples: &ExampleSet, name: &str, f: F) -> Result<ExampleSet>
where
    F: FnOnce(&Example) -> Example,
{
    let current = examples
        .get(name)
        .ok_or_else(|| Error::ExampleNotFound(name.to_string()))?;
    let mut next = examples.clone();
    next.insert(name.to_string(), f(current));
    Ok(next)
}

//! Text codec for OpenAPI documents.
//!
//! Input is routed by its first non-blank character: text starting with
//! `{` is JSON, anything else is YAML. Every function here works on the
//! generic [`Value`] tree so that keys the model does not know about survive
//! a parse/format round trip.

use serde_json::{Map, Number, Value};

use crate::errors::{Error, Result};
use crate::info::{self, ApiInfo, Server, Tag};
use crate::types::TextFormat;

/// Top-level keys every importable document must carry
pub const REQUIRED_FIELDS: [&str; 3] = ["openapi", "info", "paths"];

/// Guesses the syntax of `text` from its leading character
pub fn detect_format(text: &str) -> TextFormat {
    if text.trim_start().starts_with('{') {
        TextFormat::Json
    } else {
        TextFormat::Yaml
    }
}

/// Parses JSON or YAML text into a value tree
pub fn parse(text: &str) -> Result<Value> {
    match detect_format(text) {
        TextFormat::Json => Ok(serde_json::from_str(text)?),
        TextFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
            yaml_to_json(yaml)
        }
    }
}

/// Serializes a value tree; JSON is pretty-printed with two-space indent
pub fn to_text(value: &Value, format: TextFormat) -> Result<String> {
    match format {
        TextFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        TextFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Checks that a parsed value has truthy `openapi`, `info` and `paths`
pub fn check_document(value: &Value) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !value.get(*field).map(is_truthy).unwrap_or(false))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_document(format!(
            "missing or empty: {}",
            missing.join(", ")
        )))
    }
}

/// Parses `text` and checks it as an importable document
pub fn parse_document(text: &str) -> Result<Value> {
    let value = parse(text)?;
    check_document(&value)?;
    Ok(value)
}

/// Whether `text` parses and carries the required top-level fields
pub fn validate(text: &str) -> bool {
    match parse_document(text) {
        Ok(_) => true,
        Err(e) => {
            if e.syntax_format().is_some() {
                log::error!("error validating OpenAPI document: {e}");
            } else {
                log::debug!("rejecting document: {e}");
            }
            false
        }
    }
}

/// Re-serializes `text` in `format`.
///
/// Text that does not parse is returned unchanged.
pub fn format(text: &str, format: TextFormat) -> String {
    match parse(text).and_then(|value| to_text(&value, format)) {
        Ok(formatted) => formatted,
        Err(e) => {
            log::error!("error formatting OpenAPI document: {e}");
            text.to_string()
        }
    }
}

/// The `info` section of `text`, or an empty info when it cannot be read
pub fn extract_api_info(text: &str) -> ApiInfo {
    extract(text, "API info", |value| {
        value.get("info").map(ApiInfo::from_openapi).unwrap_or_default()
    })
}

/// The `servers` of `text`, or none when they cannot be read
pub fn extract_servers(text: &str) -> Vec<Server> {
    extract(text, "servers", |value| {
        info::servers_from_openapi(value.get("servers"))
    })
}

/// The `tags` of `text`, or none when they cannot be read
pub fn extract_tags(text: &str) -> Vec<Tag> {
    extract(text, "tags", |value| info::tags_from_openapi(value.get("tags")))
}

/// The raw `components.securitySchemes` map of `text`
pub fn extract_security_schemes(text: &str) -> Map<String, Value> {
    extract(text, "security schemes", |value| {
        value
            .get("components")
            .and_then(|c| c.get("securitySchemes"))
            .and_then(|s| s.as_object())
            .cloned()
            .unwrap_or_default()
    })
}

fn extract<T, F>(text: &str, section: &str, project: F) -> T
where
    T: Default,
    F: FnOnce(&Value) -> T,
{
    match parse(text) {
        Ok(value) => project(&value),
        Err(e) => {
            log::error!("error extracting {section}: {e}");
            T::default()
        }
    }
}

/// Converts a YAML tree into a JSON tree.
///
/// Scalar mapping keys become strings (`200:` becomes `"200"`); tags are
/// dropped.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(
            seq.into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut out = Map::new();
            for (key, value) in mapping {
                out.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        Yaml::Sequence(_) | Yaml::Mapping(_) => Err(Error::invalid_document(
            "mapping keys must be scalars",
        )),
    }
}

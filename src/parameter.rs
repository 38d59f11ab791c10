//! Operation parameters.
//!
//! Keys the editor does not model (`style`, `example`, `content`, schema
//! keywords such as `minimum`) ride along in passthrough maps and are
//! written back as they came in.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::schema::SchemaObject;
use crate::types::{DataFormat, DataType, ParameterLocation};

/// Parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: String,
    pub name: String,
    pub location: ParameterLocation,
    pub description: String,
    pub required: bool,
    pub data_type: DataType,
    pub format: Option<DataFormat>,
    /// Detailed schema, only created on request for array/object parameters.
    /// Also holds imported schemas with no usable type, such as a `$ref`.
    pub schema: Option<SchemaObject>,
    /// Target of a `$ref` parameter; such a parameter is written back as is
    pub reference: Option<String>,
    /// Kept keywords of the schema of a primitive parameter
    pub schema_extra: Map<String, Value>,
    /// Source keys outside the model
    pub extra: Map<String, Value>,
}

impl Parameter {
    /// New unnamed, optional string query parameter
    pub fn new() -> Self {
        Self {
            id: format!("param-{}", uuid::Uuid::new_v4()),
            name: String::new(),
            location: ParameterLocation::Query,
            description: String::new(),
            required: false,
            data_type: DataType::String,
            format: None,
            schema: None,
            reference: None,
            schema_extra: Map::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Parameter {
        Parameter {
            name: name.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_location(&self, location: ParameterLocation) -> Parameter {
        Parameter {
            location,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Parameter {
        Parameter {
            description: description.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_required(&self, required: bool) -> Parameter {
        Parameter {
            required,
            ..self.clone()
        }
    }

    /// Changes the parameter type.
    ///
    /// An existing detailed schema is left alone; once created it is edited
    /// independently of the parameter's own type. An untyped imported
    /// schema is replaced by the chosen type.
    #[must_use]
    pub fn with_type(&self, data_type: DataType) -> Parameter {
        Parameter {
            data_type,
            schema: self.schema.clone().filter(|schema| schema.typed),
            schema_extra: self.primitive_schema().update_type(data_type).extra,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_format(&self, format: Option<DataFormat>) -> Parameter {
        Parameter {
            format,
            schema_extra: self.primitive_schema().with_format(format).extra,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_schema(&self, schema: SchemaObject) -> Parameter {
        Parameter {
            schema: Some(schema),
            ..self.clone()
        }
    }

    /// Creates the detailed schema the first time it is expanded.
    ///
    /// Seeds it from the parameter's type, format and description. Does
    /// nothing when a schema already exists. Only array and object
    /// parameters have a detailed schema.
    pub fn init_schema(&self) -> Result<Parameter> {
        if !self.data_type.is_structural() {
            return Err(Error::validation(
                "schema",
                format!("{} parameters have no detailed schema", self.data_type),
            ));
        }
        if self.schema.is_some() {
            return Ok(self.clone());
        }
        let schema = SchemaObject::new(self.data_type)
            .with_format(self.format)
            .with_description(self.description.clone());
        Ok(self.with_schema(schema))
    }

    /// Renders the parameter as an OpenAPI parameter object
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if let Some(reference) = &self.reference {
            out.insert("$ref".to_string(), Value::from(reference.as_str()));
            out.extend(self.extra.clone());
            return Value::Object(out);
        }
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        out.insert("in".to_string(), Value::from(self.location.as_str()));
        if !self.description.is_empty() {
            out.insert(
                "description".to_string(),
                Value::from(self.description.as_str()),
            );
        }
        if self.required {
            out.insert("required".to_string(), Value::Bool(true));
        }

        // A `content` map stands in for the schema
        if !self.extra.contains_key("content") {
            let schema = match &self.schema {
                Some(schema) => schema.to_openapi(),
                None => self.primitive_schema().to_openapi(),
            };
            out.insert("schema".to_string(), schema);
        }
        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI parameter object.
    ///
    /// Returns `None` for entries that cannot be a parameter (missing name
    /// or location). A `$ref` is not resolved; it is kept and named after
    /// its last segment.
    pub fn from_openapi(value: &Value) -> Option<Parameter> {
        let obj = value.as_object()?;
        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            log::debug!("keeping parameter reference '{reference}' unresolved");
            let mut extra = obj.clone();
            extra.remove("$ref");
            return Some(Parameter {
                name: reference.rsplit('/').next().unwrap_or(reference).to_string(),
                reference: Some(reference.to_string()),
                extra,
                ..Parameter::new()
            });
        }
        let name = obj.get("name")?.as_str()?.to_string();
        let location = match obj.get("in")?.as_str()?.parse::<ParameterLocation>() {
            Ok(location) => location,
            Err(e) => {
                log::warn!("skipping parameter '{name}': {e}");
                return None;
            }
        };

        let schema = obj
            .get("schema")
            .map(SchemaObject::from_openapi)
            .unwrap_or_else(SchemaObject::string);

        let mut extra = obj.clone();
        for key in ["name", "in", "schema"] {
            extra.remove(key);
        }
        let description = match extra.remove("description") {
            Some(Value::String(text)) => text,
            Some(other) => {
                extra.insert("description".to_string(), other);
                String::new()
            }
            None => String::new(),
        };
        // An explicit `required: false` stays in `extra` and is written back
        let required = obj.get("required").and_then(Value::as_bool) == Some(true);
        if required {
            extra.remove("required");
        }

        let data_type = schema.data_type();
        let format = schema.format;
        let (schema, schema_extra) = if data_type.is_structural() || !schema.typed {
            (Some(schema), Map::new())
        } else {
            let mut kept = schema.extra;
            if let Some(text) = schema.description {
                kept.insert("description".to_string(), Value::from(text));
            }
            (None, kept)
        };

        Some(Parameter {
            id: format!("param-{}", uuid::Uuid::new_v4()),
            name,
            location,
            description,
            required,
            data_type,
            format,
            schema,
            reference: None,
            schema_extra,
            extra,
        })
    }

    /// Schema written for a parameter without a detailed schema
    fn primitive_schema(&self) -> SchemaObject {
        SchemaObject {
            extra: self.schema_extra.clone(),
            ..SchemaObject::new(self.data_type).with_format(self.format)
        }
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_defaults() {
        let param = Parameter::new();
        assert!(param.id.starts_with("param-"));
        assert_eq!(param.name, "");
        assert_eq!(param.location, ParameterLocation::Query);
        assert_eq!(param.data_type, DataType::String);
        assert!(!param.required);
        assert!(param.schema.is_none());
    }

    #[test]
    fn test_init_schema_seeds_once() {
        let param = Parameter::new()
            .with_type(DataType::Array)
            .with_description("ids to fetch");
        let param = param.init_schema().unwrap();
        let schema = param.schema.clone().unwrap();
        assert_eq!(schema.data_type(), DataType::Array);
        assert_eq!(schema.items().unwrap().data_type(), DataType::String);
        assert_eq!(schema.description.as_deref(), Some("ids to fetch"));

        // Edited schema survives a second init and a type change
        let edited = schema
            .with_items(SchemaObject::new(DataType::Integer))
            .unwrap();
        let param = param.with_schema(edited.clone()).init_schema().unwrap();
        let param = param.with_type(DataType::Object);
        assert_eq!(param.schema, Some(edited));
    }

    #[test]
    fn test_init_schema_rejects_primitives() {
        assert!(Parameter::new().init_schema().is_err());
    }

    #[test]
    fn test_to_openapi() {
        let param = Parameter::new()
            .with_name("petId")
            .with_location(ParameterLocation::Path)
            .with_required(true)
            .with_format(Some(DataFormat::Uuid));
        assert_eq!(
            param.to_openapi(),
            json!({
                "name": "petId",
                "in": "path",
                "required": true,
                "schema": {"type": "string", "format": "uuid"}
            })
        );
    }

    #[test]
    fn test_from_openapi() {
        let value = json!({
            "name": "tags",
            "in": "query",
            "description": "filter",
            "schema": {"type": "array", "items": {"type": "string"}}
        });
        let param = Parameter::from_openapi(&value).unwrap();
        assert_eq!(param.name, "tags");
        assert_eq!(param.data_type, DataType::Array);
        assert!(param.schema.is_some());
        assert_eq!(param.description, "filter");

        assert!(Parameter::from_openapi(&json!({"name": "x", "in": "body"})).is_none());
    }

    #[test]
    fn test_from_openapi_keeps_reference() {
        let value = json!({"$ref": "#/components/parameters/PageSize"});
        let param = Parameter::from_openapi(&value).unwrap();
        assert_eq!(param.name, "PageSize");
        assert_eq!(param.reference.as_deref(), Some("#/components/parameters/PageSize"));
        assert_eq!(param.to_openapi(), value);
    }

    #[test]
    fn test_from_openapi_keeps_unmodelled_keys() {
        let value = json!({
            "name": "limit",
            "in": "query",
            "required": false,
            "style": "form",
            "example": 20,
            "schema": {"type": "integer", "format": "int64", "minimum": 1, "maximum": 100}
        });
        let param = Parameter::from_openapi(&value).unwrap();
        assert_eq!(param.data_type, DataType::Integer);
        assert_eq!(param.format, None);
        assert!(param.schema.is_none());
        assert_eq!(param.to_openapi(), value);

        // Picking a format replaces the kept one, a new type drops the bounds
        let edited = param.with_format(Some(DataFormat::Byte));
        assert_eq!(
            edited.to_openapi()["schema"],
            json!({"type": "integer", "format": "byte", "minimum": 1, "maximum": 100})
        );
        assert_eq!(
            param.with_type(DataType::Boolean).to_openapi()["schema"],
            json!({"type": "boolean"})
        );
    }

    #[test]
    fn test_content_parameter_has_no_schema() {
        let value = json!({
            "name": "filter",
            "in": "query",
            "content": {"application/json": {"schema": {"type": "object"}}}
        });
        let param = Parameter::from_openapi(&value).unwrap();
        assert_eq!(param.to_openapi(), value);
    }

    #[test]
    fn test_untyped_schema_kept_until_type_chosen() {
        let value = json!({
            "name": "pet",
            "in": "query",
            "schema": {"$ref": "#/components/schemas/PetKind"}
        });
        let param = Parameter::from_openapi(&value).unwrap();
        assert_eq!(param.to_openapi(), value);
        let typed = param.with_type(DataType::String);
        assert!(typed.schema.is_none());
        assert_eq!(typed.to_openapi()["schema"], json!({"type": "string"}));
    }
}

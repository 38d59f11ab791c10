//! Recursive schema model and the depth-aware schema editor.
//!
//! A [`SchemaObject`] is a tagged union over its [`DataType`]: object schemas
//! own an ordered list of named properties, array schemas own a single item
//! schema, and primitives own neither. Changing the type therefore cannot
//! leave stale `properties`/`items` behind.
//!
//! All edits are value-returning: they derive a new schema and leave the
//! receiver untouched, so callers replace the node in its parent.
//!
//! Keywords the model does not edit (`$ref`, `enum`, `minimum`, formats
//! outside [`DataFormat`], ...) are kept in [`SchemaObject::extra`] and
//! written back unchanged.
//!
//! The data itself is unbounded. [`SchemaEditor`] caps how deep an editing
//! session may reach, which is a view restriction only: imported schemas
//! deeper than the cap are preserved and exported unchanged.

use serde_json::{Map, Value};

use crate::config::DEFAULT_MAX_SCHEMA_DEPTH;
use crate::errors::{Error, Result};
use crate::types::{DataFormat, DataType};

/// Structural variant of a schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    /// Array of `items`
    Array(Box<SchemaObject>),
    /// Object with ordered named properties
    Object(Vec<SchemaProperty>),
}

/// JSON-Schema-like type descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaObject {
    pub kind: SchemaKind,
    pub format: Option<DataFormat>,
    pub description: Option<String>,
    /// Whether `type` is written. Imported schemas without a usable `type`
    /// (`$ref`, `allOf`, ...) leave it unset.
    pub typed: bool,
    /// Source keywords outside the model
    pub extra: Map<String, Value>,
}

/// Keywords that stay valid whatever the type
const TYPE_INDEPENDENT_KEYWORDS: [&str; 7] = [
    "title",
    "nullable",
    "deprecated",
    "readOnly",
    "writeOnly",
    "externalDocs",
    "xml",
];

/// Named field of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub name: String,
    pub required: bool,
    pub schema: SchemaObject,
}

impl SchemaObject {
    /// Creates a fresh schema of the given type.
    ///
    /// Arrays start with plain string items, objects with no properties.
    pub fn new(data_type: DataType) -> Self {
        Self {
            kind: fresh_kind(data_type),
            format: None,
            description: None,
            typed: true,
            extra: Map::new(),
        }
    }

    /// Empty object schema
    pub fn object() -> Self {
        Self::new(DataType::Object)
    }

    /// Plain string schema
    pub fn string() -> Self {
        Self::new(DataType::String)
    }

    /// Array schema with the given items
    pub fn array_of(items: SchemaObject) -> Self {
        Self {
            kind: SchemaKind::Array(Box::new(items)),
            format: None,
            description: None,
            typed: true,
            extra: Map::new(),
        }
    }

    /// The type this schema currently has
    pub fn data_type(&self) -> DataType {
        match self.kind {
            SchemaKind::String => DataType::String,
            SchemaKind::Number => DataType::Number,
            SchemaKind::Integer => DataType::Integer,
            SchemaKind::Boolean => DataType::Boolean,
            SchemaKind::Array(_) => DataType::Array,
            SchemaKind::Object(_) => DataType::Object,
        }
    }

    /// Target of a `$ref` schema
    pub fn reference(&self) -> Option<&str> {
        self.extra.get("$ref").and_then(Value::as_str)
    }

    /// Properties, present only for object schemas
    pub fn properties(&self) -> Option<&[SchemaProperty]> {
        match &self.kind {
            SchemaKind::Object(props) => Some(props),
            _ => None,
        }
    }

    /// Item schema, present only for array schemas
    pub fn items(&self) -> Option<&SchemaObject> {
        match &self.kind {
            SchemaKind::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Changes the type, resetting nested structure.
    ///
    /// Object-to-object keeps the existing properties and array-to-array
    /// keeps the existing items; any other change starts from the fresh
    /// defaults of [`SchemaObject::new`]. Choosing a type replaces a `$ref`,
    /// and a real change drops kept keywords tied to the old type.
    #[must_use]
    pub fn update_type(&self, data_type: DataType) -> SchemaObject {
        let kind = match (&self.kind, data_type) {
            (SchemaKind::Object(props), DataType::Object) => SchemaKind::Object(props.clone()),
            (SchemaKind::Array(items), DataType::Array) => SchemaKind::Array(items.clone()),
            (_, other) => fresh_kind(other),
        };
        let mut extra = self.extra.clone();
        extra.remove("$ref");
        extra.remove("type");
        if data_type != self.data_type() {
            extra.retain(|key, _| {
                key.starts_with("x-") || TYPE_INDEPENDENT_KEYWORDS.contains(&key.as_str())
            });
        }
        SchemaObject {
            kind,
            format: self.format,
            description: self.description.clone(),
            typed: true,
            extra,
        }
    }

    /// Sets the format; this replaces any kept source format
    #[must_use]
    pub fn with_format(&self, format: Option<DataFormat>) -> SchemaObject {
        let mut extra = self.extra.clone();
        extra.remove("format");
        SchemaObject {
            format,
            extra,
            ..self.clone()
        }
    }

    /// Sets the description; empty text clears it
    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> SchemaObject {
        SchemaObject {
            description: non_empty(description.into()),
            ..self.clone()
        }
    }

    /// Appends a property named `property<N+1>`.
    ///
    /// Names are only unique by count; renaming to a duplicate is allowed.
    pub fn add_property(&self) -> Result<SchemaObject> {
        let props = self.object_properties("add a property")?;
        let mut props = props.to_vec();
        props.push(SchemaProperty::new(format!("property{}", props.len() + 1)));
        Ok(self.with_kind(SchemaKind::Object(props)))
    }

    /// Replaces the property at `index`
    pub fn update_property(&self, index: usize, property: SchemaProperty) -> Result<SchemaObject> {
        let props = self.object_properties("update a property")?;
        if index >= props.len() {
            return Err(Error::index_out_of_bounds("property", index, props.len()));
        }
        let mut props = props.to_vec();
        props[index] = property;
        Ok(self.with_kind(SchemaKind::Object(props)))
    }

    /// Removes the property at `index` together with everything it owns
    pub fn delete_property(&self, index: usize) -> Result<SchemaObject> {
        let props = self.object_properties("delete a property")?;
        if index >= props.len() {
            return Err(Error::index_out_of_bounds("property", index, props.len()));
        }
        let props = props
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.clone())
            .collect();
        Ok(self.with_kind(SchemaKind::Object(props)))
    }

    /// Replaces the item schema of an array
    pub fn with_items(&self, items: SchemaObject) -> Result<SchemaObject> {
        match self.kind {
            SchemaKind::Array(_) => Ok(self.with_kind(SchemaKind::Array(Box::new(items)))),
            _ => Err(Error::validation(
                "items",
                format!("cannot set items on a {} schema", self.data_type()),
            )),
        }
    }

    /// Nesting depth of the data (a primitive is depth 0)
    pub fn depth(&self) -> usize {
        match &self.kind {
            SchemaKind::Array(items) => 1 + items.depth(),
            SchemaKind::Object(props) => props
                .iter()
                .map(|p| 1 + p.schema.depth())
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Renders the schema as an OpenAPI schema object.
    ///
    /// Empty `properties` are left out; kept keywords follow the modelled ones.
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if self.typed {
            out.insert("type".to_string(), Value::from(self.data_type().as_str()));
        }
        if let (Some(format), false) = (self.format, self.data_type().is_structural()) {
            out.insert("format".to_string(), Value::from(format.as_str()));
        }
        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::from(description.as_str()));
        }

        match &self.kind {
            SchemaKind::Object(props) if !props.is_empty() => {
                let mut properties = Map::new();
                let mut required: Vec<Value> = Vec::new();
                for prop in props {
                    if properties.contains_key(&prop.name) {
                        log::warn!("duplicate schema property '{}', last one wins", prop.name);
                    }
                    properties.insert(prop.name.clone(), prop.schema.to_openapi());
                    let name = Value::from(prop.name.as_str());
                    if prop.required && !required.contains(&name) {
                        required.push(name);
                    }
                }
                out.insert("properties".to_string(), Value::Object(properties));
                if !required.is_empty() {
                    out.insert("required".to_string(), Value::Array(required));
                }
            }
            SchemaKind::Array(items) => {
                out.insert("items".to_string(), items.to_openapi());
            }
            _ => {}
        }

        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI schema object leniently.
    ///
    /// A missing `type` is inferred from `properties`/`items` and otherwise
    /// defaults to string. Anything that is not read into the model,
    /// including unknown types and formats, is kept in `extra`.
    /// No depth limit is applied.
    pub fn from_openapi(value: &Value) -> SchemaObject {
        let Some(obj) = value.as_object() else {
            log::warn!("schema is not an object, using a string schema");
            return SchemaObject::string();
        };

        let mut extra = obj.clone();
        if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
            log::debug!("schema $ref '{reference}' is not resolved, keeping it as is");
        }

        let declared = obj
            .get("type")
            .and_then(Value::as_str)
            .and_then(|text| match text.parse::<DataType>() {
                Ok(data_type) => Some(data_type),
                Err(_) => {
                    log::debug!("keeping unsupported schema type '{text}'");
                    None
                }
            });
        if declared.is_some() {
            extra.remove("type");
        }
        let data_type = declared.unwrap_or(if obj.contains_key("properties") {
            DataType::Object
        } else if obj.contains_key("items") {
            DataType::Array
        } else {
            DataType::String
        });

        let format = obj
            .get("format")
            .and_then(Value::as_str)
            .and_then(|text| match text.parse::<DataFormat>() {
                Ok(format) => Some(format),
                Err(_) => {
                    log::debug!("keeping schema format '{text}' as text");
                    None
                }
            });
        if format.is_some() {
            extra.remove("format");
        }

        let description = match obj.get("description") {
            Some(Value::String(text)) => {
                extra.remove("description");
                non_empty(text.clone())
            }
            _ => None,
        };

        let kind = match data_type {
            DataType::Object => match obj.get("properties").and_then(Value::as_object) {
                Some(props) => {
                    extra.remove("properties");
                    let required: Vec<&str> = match obj.get("required").and_then(Value::as_array) {
                        Some(arr) => {
                            extra.remove("required");
                            arr.iter().filter_map(Value::as_str).collect()
                        }
                        None => Vec::new(),
                    };
                    SchemaKind::Object(
                        props
                            .iter()
                            .map(|(name, schema)| SchemaProperty {
                                name: name.clone(),
                                required: required.contains(&name.as_str()),
                                schema: SchemaObject::from_openapi(schema),
                            })
                            .collect(),
                    )
                }
                None => SchemaKind::Object(Vec::new()),
            },
            DataType::Array => SchemaKind::Array(Box::new(match extra.remove("items") {
                Some(items) => SchemaObject::from_openapi(&items),
                None => SchemaObject::string(),
            })),
            other => fresh_kind(other),
        };

        SchemaObject {
            kind,
            format,
            description,
            typed: declared.is_some(),
            extra,
        }
    }

    fn object_properties(&self, action: &str) -> Result<&[SchemaProperty]> {
        self.properties().ok_or_else(|| {
            Error::validation(
                "properties",
                format!("cannot {action} on a {} schema", self.data_type()),
            )
        })
    }

    fn with_kind(&self, kind: SchemaKind) -> SchemaObject {
        SchemaObject {
            kind,
            format: self.format,
            description: self.description.clone(),
            typed: self.typed,
            extra: self.extra.clone(),
        }
    }
}

impl Default for SchemaObject {
    fn default() -> Self {
        Self::string()
    }
}

impl SchemaProperty {
    /// New optional string property
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            schema: SchemaObject::string(),
        }
    }

    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> SchemaProperty {
        SchemaProperty {
            name: name.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_required(&self, required: bool) -> SchemaProperty {
        SchemaProperty {
            required,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_schema(&self, schema: SchemaObject) -> SchemaProperty {
        SchemaProperty {
            schema,
            ..self.clone()
        }
    }

    /// Changes the property's type with the same reset rules as a schema
    #[must_use]
    pub fn update_type(&self, data_type: DataType) -> SchemaProperty {
        self.with_schema(self.schema.update_type(data_type))
    }
}

fn fresh_kind(data_type: DataType) -> SchemaKind {
    match data_type {
        DataType::String => SchemaKind::String,
        DataType::Number => SchemaKind::Number,
        DataType::Integer => SchemaKind::Integer,
        DataType::Boolean => SchemaKind::Boolean,
        DataType::Array => SchemaKind::Array(Box::new(SchemaObject::string())),
        DataType::Object => SchemaKind::Object(Vec::new()),
    }
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// One step from a schema node to a child node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaStep {
    /// The schema of the object property at this index
    Property(usize),
    /// The item schema of an array
    Items,
}

impl std::fmt::Display for SchemaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStep::Property(index) => write!(f, "property[{index}]"),
            SchemaStep::Items => write!(f, "items"),
        }
    }
}

/// Row of a depth-limited schema outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Steps from the root to this node
    pub path: Vec<SchemaStep>,
    /// Property name, `None` for the root and array items
    pub name: Option<String>,
    pub data_type: DataType,
    pub required: bool,
    /// Node has children that lie beyond the editor's depth cap
    pub truncated: bool,
}

impl OutlineEntry {
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Depth-limited editing view over a schema tree.
///
/// Nodes are addressed by a path of [`SchemaStep`]s; the root sits at depth
/// 0 and each step adds one. Paths longer than `max_depth` are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEditor {
    max_depth: usize,
}

impl Default for SchemaEditor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCHEMA_DEPTH)
    }
}

impl SchemaEditor {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether children of a node at `depth` are shown for editing
    pub fn can_expand(&self, depth: usize) -> bool {
        depth < self.max_depth
    }

    /// Resolves the node at `path`
    pub fn node<'a>(&self, root: &'a SchemaObject, path: &[SchemaStep]) -> Result<&'a SchemaObject> {
        self.check_depth(path)?;
        let mut node = root;
        for (depth, step) in path.iter().enumerate() {
            node = child(node, *step, depth)?;
        }
        Ok(node)
    }

    /// Applies `edit` to the node at `path` and rebuilds every ancestor.
    pub fn edit<F>(&self, root: &SchemaObject, path: &[SchemaStep], edit: F) -> Result<SchemaObject>
    where
        F: FnOnce(&SchemaObject) -> Result<SchemaObject>,
    {
        self.check_depth(path)?;
        edit_at(root, path, 0, edit)
    }

    /// Applies `edit` to property `index` of the object at `parent`
    pub fn edit_property<F>(
        &self,
        root: &SchemaObject,
        parent: &[SchemaStep],
        index: usize,
        edit: F,
    ) -> Result<SchemaObject>
    where
        F: FnOnce(&SchemaProperty) -> SchemaProperty,
    {
        if parent.len() >= self.max_depth {
            return Err(Error::DepthLimit {
                depth: parent.len() + 1,
                max_depth: self.max_depth,
            });
        }
        self.edit(root, parent, |node| {
            let prop = node
                .properties()
                .and_then(|props| props.get(index))
                .ok_or_else(|| {
                    Error::invalid_schema_step(parent.len(), format!("no property at index {index}"))
                })?;
            node.update_property(index, edit(prop))
        })
    }

    /// Flattens the tree into rows, stopping at the depth cap
    pub fn outline(&self, root: &SchemaObject) -> Vec<OutlineEntry> {
        let mut rows = Vec::new();
        self.walk(root, Vec::new(), None, false, &mut rows);
        rows
    }

    fn walk(
        &self,
        node: &SchemaObject,
        path: Vec<SchemaStep>,
        name: Option<String>,
        required: bool,
        rows: &mut Vec<OutlineEntry>,
    ) {
        let has_children = match &node.kind {
            SchemaKind::Array(_) => true,
            SchemaKind::Object(props) => !props.is_empty(),
            _ => false,
        };
        let expand = self.can_expand(path.len());
        rows.push(OutlineEntry {
            path: path.clone(),
            name,
            data_type: node.data_type(),
            required,
            truncated: has_children && !expand,
        });
        if !expand {
            return;
        }

        match &node.kind {
            SchemaKind::Array(items) => {
                let mut child_path = path.clone();
                child_path.push(SchemaStep::Items);
                self.walk(items, child_path, None, false, rows);
            }
            SchemaKind::Object(props) => {
                for (index, prop) in props.iter().enumerate() {
                    let mut child_path = path.clone();
                    child_path.push(SchemaStep::Property(index));
                    self.walk(
                        &prop.schema,
                        child_path,
                        Some(prop.name.clone()),
                        prop.required,
                        rows,
                    );
                }
            }
            _ => {}
        }
    }

    fn check_depth(&self, path: &[SchemaStep]) -> Result<()> {
        if path.len() > self.max_depth {
            return Err(Error::DepthLimit {
                depth: path.len(),
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}

fn child(node: &SchemaObject, step: SchemaStep, depth: usize) -> Result<&SchemaObject> {
    match (step, &node.kind) {
        (SchemaStep::Items, SchemaKind::Array(items)) => Ok(items),
        (SchemaStep::Property(index), SchemaKind::Object(props)) => props
            .get(index)
            .map(|p| &p.schema)
            .ok_or_else(|| Error::invalid_schema_step(depth, format!("no property at index {index}"))),
        (step, _) => Err(Error::invalid_schema_step(
            depth,
            format!("{step} does not apply to a {} schema", node.data_type()),
        )),
    }
}

fn edit_at<F>(node: &SchemaObject, path: &[SchemaStep], depth: usize, edit: F) -> Result<SchemaObject>
where
    F: FnOnce(&SchemaObject) -> Result<SchemaObject>,
{
    let Some((step, rest)) = path.split_first() else {
        return edit(node);
    };

    match (*step, &node.kind) {
        (SchemaStep::Items, SchemaKind::Array(items)) => {
            let items = edit_at(items, rest, depth + 1, edit)?;
            Ok(node.with_kind(SchemaKind::Array(Box::new(items))))
        }
        (SchemaStep::Property(index), SchemaKind::Object(props)) => {
            let prop = props.get(index).ok_or_else(|| {
                Error::invalid_schema_step(depth, format!("no property at index {index}"))
            })?;
            let schema = edit_at(&prop.schema, rest, depth + 1, edit)?;
            node.update_property(index, prop.with_schema(schema))
        }
        (step, _) => Err(Error::invalid_schema_step(
            depth,
            format!("{step} does not apply to a {} schema", node.data_type()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn nested(levels: usize) -> SchemaObject {
        (0..levels).fold(SchemaObject::string(), |inner, _| {
            SchemaObject::object()
                .add_property()
                .unwrap()
                .update_property(0, SchemaProperty::new("child").with_schema(inner))
                .unwrap()
        })
    }

    #[test]
    fn test_update_type_resets_structure() {
        let obj = SchemaObject::object().add_property().unwrap();
        let arr = obj.update_type(DataType::Array);
        assert!(arr.properties().is_none());
        assert_eq!(arr.items().unwrap(), &SchemaObject::string());

        let back = arr.update_type(DataType::Object);
        assert!(back.items().is_none());
        assert_eq!(back.properties().unwrap().len(), 0);
    }

    #[test]
    fn test_update_type_preserves_same_type() {
        let obj = SchemaObject::object().add_property().unwrap().add_property().unwrap();
        let same = obj.update_type(DataType::Object);
        assert_eq!(same.properties().unwrap().len(), 2);

        let arr = SchemaObject::array_of(SchemaObject::new(DataType::Integer));
        let same = arr.update_type(DataType::Array);
        assert_eq!(same.items().unwrap().data_type(), DataType::Integer);
    }

    #[test]
    fn test_add_property_names_by_count() {
        let schema = SchemaObject::object().add_property().unwrap().add_property().unwrap();
        let names: Vec<_> = schema.properties().unwrap().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["property1", "property2"]);

        // Deleting then adding reuses a count-based name, duplicates allowed
        let schema = schema.delete_property(0).unwrap().add_property().unwrap();
        let names: Vec<_> = schema.properties().unwrap().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["property2", "property2"]);

        let prop = &schema.properties().unwrap()[0];
        assert_eq!(prop.schema.data_type(), DataType::String);
        assert!(!prop.required);
        assert_eq!(prop.schema.format, None);
    }

    #[test]
    fn test_property_ops_require_object() {
        let schema = SchemaObject::string();
        assert!(matches!(schema.add_property(), Err(Error::Validation { .. })));
        assert!(schema.with_items(SchemaObject::string()).is_err());

        let obj = SchemaObject::object();
        assert!(matches!(
            obj.delete_property(0),
            Err(Error::IndexOutOfBounds { index: 0, len: 0, .. })
        ));
    }

    #[test]
    fn test_to_openapi() {
        let schema = SchemaObject::object()
            .with_description("A pet")
            .add_property()
            .unwrap()
            .add_property()
            .unwrap();
        let id = SchemaProperty::new("id")
            .with_required(true)
            .with_schema(SchemaObject::new(DataType::String).with_format(Some(DataFormat::Uuid)));
        let tags = SchemaProperty::new("tags").update_type(DataType::Array);
        let schema = schema.update_property(0, id).unwrap().update_property(1, tags).unwrap();

        assert_eq!(
            schema.to_openapi(),
            json!({
                "type": "object",
                "description": "A pet",
                "properties": {
                    "id": {"type": "string", "format": "uuid"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn test_format_not_emitted_for_structural_types() {
        let schema = SchemaObject::string()
            .with_format(Some(DataFormat::Date))
            .update_type(DataType::Object);
        assert_eq!(schema.format, Some(DataFormat::Date));
        assert!(schema.to_openapi().get("format").is_none());
    }

    #[test]
    fn test_from_openapi_infers_and_nests() {
        let value = json!({
            "properties": {
                "name": {"type": "string"},
                "children": {"items": {"type": "integer", "format": "int64"}}
            },
            "required": ["name"]
        });
        let schema = SchemaObject::from_openapi(&value);
        assert_eq!(schema.data_type(), DataType::Object);
        let props = schema.properties().unwrap();
        assert_eq!(props[0].name, "name");
        assert!(props[0].required);
        assert_eq!(props[1].schema.data_type(), DataType::Array);
        let items = props[1].schema.items().unwrap();
        assert_eq!(items.data_type(), DataType::Integer);
        assert_eq!(items.format, None);
        assert_eq!(items.extra.get("format"), Some(&json!("int64")));
        // No `type` in the source, none written back
        assert_eq!(schema.to_openapi(), value);
    }

    #[test]
    fn test_from_openapi_keeps_ref_and_keywords() {
        let reference = json!({"$ref": "#/components/schemas/Pet"});
        let schema = SchemaObject::from_openapi(&reference);
        assert!(!schema.typed);
        assert_eq!(schema.reference(), Some("#/components/schemas/Pet"));
        assert_eq!(schema.to_openapi(), reference);

        let limit = json!({
            "type": "integer",
            "format": "int64",
            "minimum": 1,
            "enum": [10, 20],
            "nullable": true,
            "x-order": 3
        });
        let schema = SchemaObject::from_openapi(&limit);
        assert_eq!(schema.data_type(), DataType::Integer);
        assert_eq!(schema.to_openapi(), limit);

        let untyped = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
        assert_eq!(SchemaObject::from_openapi(&untyped).to_openapi(), untyped);
    }

    #[test]
    fn test_update_type_replaces_kept_keywords() {
        let schema = SchemaObject::from_openapi(&json!({"$ref": "#/components/schemas/Pet"}));
        let typed = schema.update_type(DataType::Object);
        assert_eq!(typed.reference(), None);
        assert_eq!(typed.to_openapi(), json!({"type": "object"}));

        let limit = SchemaObject::from_openapi(&json!({
            "type": "integer",
            "format": "int64",
            "minimum": 1,
            "nullable": true
        }));
        // Same type keeps everything
        assert_eq!(limit.update_type(DataType::Integer), limit);
        assert_eq!(
            limit.update_type(DataType::String).to_openapi(),
            json!({"type": "string", "nullable": true})
        );
        assert_eq!(
            limit.with_format(Some(DataFormat::Email)).to_openapi(),
            json!({"type": "integer", "format": "email", "minimum": 1, "nullable": true})
        );
    }

    #[test]
    fn test_from_openapi_unbounded_depth() {
        let deep = nested(8);
        let restored = SchemaObject::from_openapi(&deep.to_openapi());
        assert_eq!(restored, deep);
        assert_eq!(restored.depth(), 8);
    }

    #[test]
    fn test_editor_edits_nested_node() {
        let editor = SchemaEditor::default();
        let root = nested(2);
        let path = [SchemaStep::Property(0), SchemaStep::Property(0)];
        let edited = editor
            .edit(&root, &path, |node| Ok(node.update_type(DataType::Boolean)))
            .unwrap();
        assert_eq!(editor.node(&edited, &path).unwrap().data_type(), DataType::Boolean);
        // input value unchanged
        assert_eq!(editor.node(&root, &path).unwrap().data_type(), DataType::String);
    }

    #[test]
    fn test_editor_edit_property() {
        let editor = SchemaEditor::default();
        let root = SchemaObject::object().add_property().unwrap();
        let edited = editor
            .edit_property(&root, &[], 0, |p| p.with_name("id").with_required(true))
            .unwrap();
        let prop = &edited.properties().unwrap()[0];
        assert_eq!(prop.name, "id");
        assert!(prop.required);
    }

    #[test]
    fn test_editor_depth_limit() {
        let editor = SchemaEditor::new(2);
        let root = nested(4);
        let deep = [SchemaStep::Property(0); 3];
        assert!(matches!(
            editor.node(&root, &deep),
            Err(Error::DepthLimit { depth: 3, max_depth: 2 })
        ));
        assert!(editor.edit(&root, &deep, |n| Ok(n.clone())).is_err());
        assert!(editor.node(&root, &deep[..2]).is_ok());
    }

    #[test]
    fn test_editor_invalid_step() {
        let editor = SchemaEditor::default();
        let root = SchemaObject::object();
        assert!(matches!(
            editor.node(&root, &[SchemaStep::Items]),
            Err(Error::InvalidSchemaStep { depth: 0, .. })
        ));
    }

    #[test]
    fn test_outline_truncates_at_cap() {
        let editor = SchemaEditor::new(2);
        let rows = editor.outline(&nested(4));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].depth(), 2);
        assert!(rows[2].truncated);
        assert!(!rows[0].truncated);
        assert_eq!(rows[1].name.as_deref(), Some("child"));
    }

    proptest! {
        #[test]
        fn prop_update_type_exclusivity(
            types in proptest::collection::vec(proptest::sample::select(DataType::ALL.to_vec()), 1..12),
            add in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let mut schema = SchemaObject::object();
            for (step, data_type) in types.into_iter().enumerate() {
                let before = schema.clone();
                schema = schema.update_type(data_type);
                prop_assert_eq!(schema.data_type(), data_type);
                match data_type {
                    DataType::Object => {
                        prop_assert!(schema.items().is_none());
                        let props = schema.properties().unwrap();
                        if let Some(prev) = before.properties() {
                            prop_assert_eq!(props, prev);
                        } else {
                            prop_assert!(props.is_empty());
                        }
                        if add[step] {
                            schema = schema.add_property().unwrap();
                        }
                    }
                    DataType::Array => {
                        prop_assert!(schema.properties().is_none());
                        prop_assert!(schema.items().is_some());
                    }
                    _ => {
                        prop_assert!(schema.items().is_none());
                        prop_assert!(schema.properties().is_none());
                    }
                }
            }
        }
    }
}

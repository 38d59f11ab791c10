//! Document metadata: API info, servers and tags.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::schema::non_empty;

/// Contact details of `info.contact`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
}

/// `info.license`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// The `info` section.
///
/// Every field is optional so that a partially filled `info` can be
/// extracted from any document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
}

impl ApiInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> ApiInfo {
        ApiInfo {
            title: Some(title.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> ApiInfo {
        ApiInfo {
            version: Some(version.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> ApiInfo {
        ApiInfo {
            description: non_empty(description.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_terms_of_service(&self, url: impl Into<String>) -> ApiInfo {
        ApiInfo {
            terms_of_service: non_empty(url.into()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_contact(&self, contact: Option<Contact>) -> ApiInfo {
        ApiInfo {
            contact,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_license(&self, license: Option<License>) -> ApiInfo {
        ApiInfo {
            license,
            ..self.clone()
        }
    }

    /// Renders the `info` object; title and version are always written
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "title".to_string(),
            Value::from(self.title.as_deref().unwrap_or_default()),
        );
        insert_text(&mut out, "description", self.description.as_deref());
        insert_text(&mut out, "termsOfService", self.terms_of_service.as_deref());
        if let Some(contact) = &self.contact {
            let mut c = Map::new();
            insert_text(&mut c, "name", contact.name.as_deref());
            insert_text(&mut c, "url", contact.url.as_deref());
            insert_text(&mut c, "email", contact.email.as_deref());
            if !c.is_empty() {
                out.insert("contact".to_string(), Value::Object(c));
            }
        }
        if let Some(license) = &self.license {
            let mut l = Map::new();
            insert_text(&mut l, "name", license.name.as_deref());
            insert_text(&mut l, "url", license.url.as_deref());
            if !l.is_empty() {
                out.insert("license".to_string(), Value::Object(l));
            }
        }
        out.insert(
            "version".to_string(),
            Value::from(self.version.as_deref().unwrap_or_default()),
        );
        Value::Object(out)
    }

    /// Reads an `info` object; numeric and boolean scalars are taken as text
    pub fn from_openapi(value: &Value) -> ApiInfo {
        let field = |v: &Value, key: &str| v.get(key).and_then(scalar_text);
        ApiInfo {
            title: field(value, "title"),
            version: field(value, "version"),
            description: field(value, "description"),
            terms_of_service: field(value, "termsOfService"),
            contact: value.get("contact").filter(|v| v.is_object()).map(|c| Contact {
                name: field(c, "name"),
                url: field(c, "url"),
                email: field(c, "email"),
            }),
            license: value.get("license").filter(|v| v.is_object()).map(|l| License {
                name: field(l, "name"),
                url: field(l, "url"),
            }),
        }
    }
}

/// Placeholder in a server URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVariable {
    pub name: String,
    pub default: String,
    pub enum_values: Vec<String>,
    pub description: Option<String>,
}

impl ServerVariable {
    /// Creates a variable; both name and default are required
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let default = default.into();
        if name.trim().is_empty() {
            return Err(Error::validation("variable.name", "name is required"));
        }
        if default.trim().is_empty() {
            return Err(Error::validation(
                "variable.default",
                format!("variable '{name}' needs a default value"),
            ));
        }
        Ok(Self {
            name,
            default,
            enum_values: Vec::new(),
            description: None,
        })
    }

    /// Appends an allowed value; surrounding whitespace is trimmed
    pub fn add_enum_value(&self, value: &str) -> Result<ServerVariable> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::validation("variable.enum", "enum value is blank"));
        }
        let mut next = self.clone();
        next.enum_values.push(value.to_string());
        Ok(next)
    }

    pub fn remove_enum_value(&self, index: usize) -> Result<ServerVariable> {
        if index >= self.enum_values.len() {
            return Err(Error::index_out_of_bounds(
                "enum value",
                index,
                self.enum_values.len(),
            ));
        }
        let mut next = self.clone();
        next.enum_values.remove(index);
        Ok(next)
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> ServerVariable {
        ServerVariable {
            description: non_empty(description.into()),
            ..self.clone()
        }
    }

    fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        out.insert("default".to_string(), Value::from(self.default.as_str()));
        if !self.enum_values.is_empty() {
            out.insert(
                "enum".to_string(),
                Value::Array(
                    self.enum_values
                        .iter()
                        .map(|v| Value::from(v.as_str()))
                        .collect(),
                ),
            );
        }
        insert_text(&mut out, "description", self.description.as_deref());
        Value::Object(out)
    }

    fn from_openapi(name: &str, value: &Value) -> ServerVariable {
        ServerVariable {
            name: name.to_string(),
            default: value.get("default").and_then(scalar_text).unwrap_or_default(),
            enum_values: value
                .get("enum")
                .and_then(|v| v.as_array())
                .map(|values| values.iter().filter_map(scalar_text).collect())
                .unwrap_or_default(),
            description: value.get("description").and_then(scalar_text),
        }
    }
}

/// Server the API is reachable at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Server {
    pub url: String,
    pub description: String,
    pub variables: Vec<ServerVariable>,
}

impl Server {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
            variables: Vec::new(),
        }
    }

    /// Templated server new documents start with
    pub fn example() -> Self {
        let environment = ServerVariable {
            name: "environment".to_string(),
            default: "api".to_string(),
            enum_values: vec![
                "api".to_string(),
                "api.dev".to_string(),
                "api.staging".to_string(),
            ],
            description: Some("Server environment".to_string()),
        };
        Self {
            url: "https://{environment}.example.com".to_string(),
            description: "Production server".to_string(),
            variables: vec![environment],
        }
    }

    #[must_use]
    pub fn with_url(&self, url: impl Into<String>) -> Server {
        Server {
            url: url.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Server {
        Server {
            description: description.into(),
            ..self.clone()
        }
    }

    /// Adds a variable; names are unique per server
    pub fn add_variable(&self, variable: ServerVariable) -> Result<Server> {
        if self.variables.iter().any(|v| v.name == variable.name) {
            return Err(Error::validation(
                "variable.name",
                format!("variable '{}' already exists", variable.name),
            ));
        }
        let mut next = self.clone();
        next.variables.push(variable);
        Ok(next)
    }

    pub fn remove_variable(&self, name: &str) -> Result<Server> {
        if !self.variables.iter().any(|v| v.name == name) {
            return Err(Error::ServerVariableNotFound(name.to_string()));
        }
        Ok(Server {
            variables: self.variables.iter().filter(|v| v.name != name).cloned().collect(),
            ..self.clone()
        })
    }

    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        out.insert("url".to_string(), Value::from(self.url.as_str()));
        if !self.description.is_empty() {
            out.insert(
                "description".to_string(),
                Value::from(self.description.as_str()),
            );
        }
        if !self.variables.is_empty() {
            out.insert(
                "variables".to_string(),
                Value::Object(
                    self.variables
                        .iter()
                        .map(|v| (v.name.clone(), v.to_openapi()))
                        .collect(),
                ),
            );
        }
        Value::Object(out)
    }

    /// Reads a server object; anything without a mapping shape yields `None`
    pub fn from_openapi(value: &Value) -> Option<Server> {
        let obj = value.as_object()?;
        Some(Server {
            url: obj.get("url").and_then(scalar_text).unwrap_or_default(),
            description: obj.get("description").and_then(scalar_text).unwrap_or_default(),
            variables: obj
                .get("variables")
                .and_then(|v| v.as_object())
                .map(|vars| {
                    vars.iter()
                        .map(|(name, v)| ServerVariable::from_openapi(name, v))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Reads a `servers` array; a missing or non-array value yields no servers
pub fn servers_from_openapi(value: Option<&Value>) -> Vec<Server> {
    value
        .and_then(|v| v.as_array())
        .map(|servers| servers.iter().filter_map(Server::from_openapi).collect())
        .unwrap_or_default()
}

pub fn servers_to_openapi(servers: &[Server]) -> Value {
    Value::Array(servers.iter().map(Server::to_openapi).collect())
}

/// `externalDocs` of a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDocs {
    pub url: String,
    pub description: Option<String>,
}

/// Named group of operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub description: String,
    pub external_docs: Option<ExternalDocs>,
}

impl Tag {
    /// Creates a tag; both name and description are required
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let description = description.into();
        if name.trim().is_empty() {
            return Err(Error::validation("tag.name", "name is required"));
        }
        if description.trim().is_empty() {
            return Err(Error::validation(
                "tag.description",
                format!("tag '{name}' needs a description"),
            ));
        }
        Ok(Self {
            name,
            description,
            external_docs: None,
        })
    }

    /// Attaches external docs; docs with a blank url are dropped
    #[must_use]
    pub fn with_external_docs(&self, external_docs: Option<ExternalDocs>) -> Tag {
        Tag {
            external_docs: external_docs.filter(|docs| !docs.url.trim().is_empty()),
            ..self.clone()
        }
    }

    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        if !self.description.is_empty() {
            out.insert(
                "description".to_string(),
                Value::from(self.description.as_str()),
            );
        }
        if let Some(docs) = &self.external_docs {
            let mut d = Map::new();
            insert_text(&mut d, "description", docs.description.as_deref());
            d.insert("url".to_string(), Value::from(docs.url.as_str()));
            out.insert("externalDocs".to_string(), Value::Object(d));
        }
        Value::Object(out)
    }

    /// Reads a tag object; entries without a name yield `None`
    pub fn from_openapi(value: &Value) -> Option<Tag> {
        let name = value.get("name").and_then(scalar_text)?;
        let external_docs = value.get("externalDocs").and_then(|docs| {
            Some(ExternalDocs {
                url: docs.get("url").and_then(scalar_text)?,
                description: docs.get("description").and_then(scalar_text),
            })
        });
        Some(Tag {
            name,
            description: value
                .get("description")
                .and_then(scalar_text)
                .unwrap_or_default(),
            external_docs,
        })
    }
}

/// Reads a `tags` array; a missing or non-array value yields no tags
pub fn tags_from_openapi(value: Option<&Value>) -> Vec<Tag> {
    value
        .and_then(|v| v.as_array())
        .map(|tags| tags.iter().filter_map(Tag::from_openapi).collect())
        .unwrap_or_default()
}

pub fn tags_to_openapi(tags: &[Tag]) -> Value {
    Value::Array(tags.iter().map(Tag::to_openapi).collect())
}

/// Text of a scalar. YAML reads `version: 1.0` as a number.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn insert_text(out: &mut Map<String, Value>, key: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        out.insert(key.to_string(), Value::from(text));
    }
}

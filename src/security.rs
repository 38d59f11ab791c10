//! Security schemes and the registry operations reference them from.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use crate::errors::{Error, Result};
use crate::types::{ApiKeyLocation, SecuritySchemeType};

/// Credential scheme registered under a unique name
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityScheme {
    /// Registry key; always equal to `name`
    pub id: String,
    pub name: String,
    pub scheme_type: SecuritySchemeType,
    pub description: Option<String>,
    /// `in` of an apiKey scheme
    pub location: Option<ApiKeyLocation>,
    /// `name` of an apiKey scheme (the header, query or cookie name)
    pub key_name: Option<String>,
    /// HTTP auth scheme, e.g. `basic` or `bearer`
    pub scheme: Option<String>,
    pub bearer_format: Option<String>,
    /// OAuth2 flows, kept as written
    pub flows: Option<Value>,
    pub open_id_connect_url: Option<String>,
    /// Extensions and other source keys
    pub extra: Map<String, Value>,
}

impl SecurityScheme {
    /// Creates a bare scheme of the given type
    pub fn new(name: impl Into<String>, scheme_type: SecuritySchemeType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            scheme_type,
            description: None,
            location: None,
            key_name: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            extra: Map::new(),
        }
    }

    /// HTTP authentication scheme (`basic`, `bearer`, ...)
    pub fn http(name: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            ..Self::new(name, SecuritySchemeType::Http)
        }
    }

    /// API key carried in a header, query parameter or cookie
    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation, key_name: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            key_name: Some(key_name.into()),
            ..Self::new(name, SecuritySchemeType::ApiKey)
        }
    }

    /// Short description shown next to the scheme in a picker
    pub fn summary(&self) -> String {
        match (self.scheme_type, self.scheme.as_deref(), self.location) {
            (SecuritySchemeType::Http, Some("bearer"), _) => {
                format!("Bearer {}", self.bearer_format.as_deref().unwrap_or_default())
                    .trim_end()
                    .to_string()
            }
            (SecuritySchemeType::ApiKey, _, Some(location)) => format!("{location} parameter"),
            _ => self.scheme_type.label().to_string(),
        }
    }

    /// Renders the scheme as an OpenAPI security scheme object
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::from(self.scheme_type.as_str()));
        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::from(description.as_str()));
        }
        if let Some(key_name) = &self.key_name {
            out.insert("name".to_string(), Value::from(key_name.as_str()));
        }
        if let Some(location) = self.location {
            out.insert("in".to_string(), Value::from(location.as_str()));
        }
        if let Some(scheme) = &self.scheme {
            out.insert("scheme".to_string(), Value::from(scheme.as_str()));
        }
        if let Some(bearer_format) = &self.bearer_format {
            out.insert("bearerFormat".to_string(), Value::from(bearer_format.as_str()));
        }
        if let Some(flows) = &self.flows {
            out.insert("flows".to_string(), flows.clone());
        }
        if let Some(url) = &self.open_id_connect_url {
            out.insert("openIdConnectUrl".to_string(), Value::from(url.as_str()));
        }
        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads one entry of `components.securitySchemes`
    pub fn from_openapi(name: &str, value: &Value) -> Result<SecurityScheme> {
        let obj = value.as_object().ok_or_else(|| {
            Error::validation(
                format!("securitySchemes.{name}"),
                "security scheme must be a mapping",
            )
        })?;
        let scheme_type = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation(format!("securitySchemes.{name}.type"), "missing type"))?
            .parse::<SecuritySchemeType>()?;
        let text = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(String::from);

        let location = match obj.get("in").and_then(|v| v.as_str()) {
            Some(location) => Some(location.parse::<ApiKeyLocation>()?),
            None => None,
        };

        let scheme = SecurityScheme {
            description: text("description"),
            location,
            key_name: text("name"),
            scheme: text("scheme"),
            bearer_format: text("bearerFormat"),
            flows: obj.get("flows").cloned(),
            open_id_connect_url: text("openIdConnectUrl"),
            ..SecurityScheme::new(name, scheme_type)
        };
        let modelled = scheme.to_openapi();
        let extra = obj
            .iter()
            .filter(|(key, _)| modelled.get(key.as_str()).is_none())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(SecurityScheme { extra, ..scheme })
    }
}

/// Weak reference from an operation to a registered scheme, with the
/// scopes the operation asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemeRef {
    id: String,
    scopes: Vec<String>,
}

impl SchemeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scopes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_scopes<I, S>(&self, scopes: I) -> SchemeRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemeRef {
            scopes: scopes.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// OAuth2 or OpenID Connect scopes; empty for other schemes
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl std::fmt::Display for SchemeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&SecurityScheme> for SchemeRef {
    fn from(scheme: &SecurityScheme) -> Self {
        SchemeRef::new(scheme.id.clone())
    }
}

/// One entry of an operation's `security` list.
///
/// The schemes of a requirement must all be satisfied together; the entries
/// of the list are alternatives. An empty requirement (`{}`) makes the
/// operation callable anonymously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SecurityRequirement(Vec<SchemeRef>);

impl SecurityRequirement {
    pub fn new(schemes: Vec<SchemeRef>) -> Self {
        Self(schemes)
    }

    /// Requirement on a single scheme
    pub fn single(scheme: SchemeRef) -> Self {
        Self(vec![scheme])
    }

    pub fn schemes(&self) -> &[SchemeRef] {
        &self.0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|s| s.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps the schemes for which `keep` holds
    #[must_use]
    pub fn filter<F>(&self, keep: F) -> SecurityRequirement
    where
        F: Fn(&SchemeRef) -> bool,
    {
        SecurityRequirement(self.0.iter().filter(|s| keep(s)).cloned().collect())
    }

    pub fn to_openapi(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|s| {
                    let scopes = s.scopes.iter().map(|scope| Value::from(scope.as_str())).collect();
                    (s.id.clone(), Value::Array(scopes))
                })
                .collect(),
        )
    }

    /// Reads one requirement object; non-mapping entries yield `None`
    pub fn from_openapi(value: &Value) -> Option<SecurityRequirement> {
        let obj = value.as_object()?;
        Some(SecurityRequirement(
            obj.iter()
                .map(|(id, scopes)| {
                    let scopes = scopes
                        .as_array()
                        .map(|arr| arr.iter().filter_map(Value::as_str).map(String::from).collect())
                        .unwrap_or_default();
                    SchemeRef {
                        id: id.clone(),
                        scopes,
                    }
                })
                .collect(),
        ))
    }
}

/// The five schemes every registry starts with
pub static BASELINE_SECURITY_SCHEMES: Lazy<Vec<SecurityScheme>> = Lazy::new(|| {
    vec![
        SecurityScheme::http("BasicAuth", "basic"),
        SecurityScheme {
            bearer_format: Some("JWT".to_string()),
            ..SecurityScheme::http("BearerAuth", "bearer")
        },
        SecurityScheme::api_key("ApiKeyAuth", ApiKeyLocation::Header, "X-API-Key"),
        SecurityScheme {
            open_id_connect_url: Some(
                "https://example.com/.well-known/openid-configuration".to_string(),
            ),
            ..SecurityScheme::new("OpenID", SecuritySchemeType::OpenIdConnect)
        },
        SecurityScheme {
            flows: Some(json!({
                "authorizationCode": {
                    "authorizationUrl": "https://example.com/oauth/authorize",
                    "tokenUrl": "https://example.com/oauth/token",
                    "scopes": {
                        "read": "Grants read access",
                        "write": "Grants write access"
                    }
                }
            })),
            ..SecurityScheme::new("OAuth2", SecuritySchemeType::OAuth2)
        },
    ]
});

/// Registry of security schemes keyed by name
#[derive(Debug, Clone, PartialEq)]
pub struct SecuritySchemeRegistry {
    schemes: IndexMap<String, SecurityScheme>,
    /// Imported entries that could not be read, written back unchanged
    unreadable: IndexMap<String, Value>,
}

impl SecuritySchemeRegistry {
    /// Creates a registry holding the baseline schemes
    pub fn new() -> Self {
        Self {
            schemes: BASELINE_SECURITY_SCHEMES
                .iter()
                .map(|s| (s.id.clone(), s.clone()))
                .collect(),
            unreadable: IndexMap::new(),
        }
    }

    /// Baseline registry with `components.securitySchemes` merged over it
    pub fn with_imported(imported: Option<&Value>) -> Self {
        let mut registry = Self::new();
        registry.merge_imported(imported);
        registry
    }

    /// Merges an imported `components.securitySchemes` map.
    ///
    /// Same-named entries replace existing ones in place; new names are
    /// appended. Malformed entries are kept aside for export only. Returns
    /// the number merged.
    pub fn merge_imported(&mut self, imported: Option<&Value>) -> usize {
        let Some(map) = imported.and_then(|v| v.as_object()) else {
            return 0;
        };
        let mut merged = 0;
        for (name, value) in map {
            match SecurityScheme::from_openapi(name, value) {
                Ok(scheme) => {
                    log::debug!("merging security scheme '{name}'");
                    self.schemes.insert(scheme.id.clone(), scheme);
                    merged += 1;
                }
                Err(e) => {
                    log::warn!("security scheme '{name}' is not editable: {e}");
                    self.unreadable.insert(name.clone(), value.clone());
                }
            }
        }
        merged
    }

    pub fn get(&self, id: &str) -> Option<&SecurityScheme> {
        self.schemes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemes.contains_key(id)
    }

    /// Resolves a reference against the registry
    pub fn resolve(&self, scheme_ref: &SchemeRef) -> Option<&SecurityScheme> {
        self.get(scheme_ref.id())
    }

    pub fn list(&self) -> impl Iterator<Item = &SecurityScheme> {
        self.schemes.values()
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Adds or replaces a scheme; the id is forced to the name
    pub fn insert(&mut self, scheme: SecurityScheme) {
        let scheme = SecurityScheme {
            id: scheme.name.clone(),
            ..scheme
        };
        self.unreadable.shift_remove(&scheme.id);
        self.schemes.insert(scheme.id.clone(), scheme);
    }

    /// Removes a scheme; operations still pointing at it become dangling
    pub fn remove(&mut self, id: &str) -> Result<SecurityScheme> {
        self.schemes
            .shift_remove(id)
            .ok_or_else(|| Error::SecuritySchemeNotFound(id.to_string()))
    }

    /// Renders `components.securitySchemes` from the schemes `include`
    /// accepts, followed by any unreadable imported entries
    pub fn to_openapi<F>(&self, include: F) -> Map<String, Value>
    where
        F: Fn(&SecurityScheme) -> bool,
    {
        let mut out: Map<String, Value> = self
            .schemes
            .iter()
            .filter(|(_, scheme)| include(scheme))
            .map(|(name, scheme)| (name.clone(), scheme.to_openapi()))
            .collect();
        for (name, value) in &self.unreadable {
            out.entry(name.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}

impl Default for SecuritySchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline() {
        let registry = SecuritySchemeRegistry::new();
        let names: Vec<_> = registry.list().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["BasicAuth", "BearerAuth", "ApiKeyAuth", "OpenID", "OAuth2"]
        );
        assert_eq!(
            registry.get("ApiKeyAuth").unwrap().to_openapi(),
            json!({"type": "apiKey", "name": "X-API-Key", "in": "header"})
        );
        assert_eq!(
            registry.get("BearerAuth").unwrap().to_openapi(),
            json!({"type": "http", "scheme": "bearer", "bearerFormat": "JWT"})
        );
    }

    #[test]
    fn test_merge_overrides_and_adds() {
        let imported = json!({
            "BasicAuth": {"type": "http", "scheme": "basic", "description": "team login"},
            "Internal": {"type": "apiKey", "in": "cookie", "name": "sid"},
            "Broken": {"type": "kerberos"}
        });
        let registry = SecuritySchemeRegistry::with_imported(Some(&imported));
        assert_eq!(registry.len(), 6);
        assert_eq!(
            registry.get("BasicAuth").unwrap().description.as_deref(),
            Some("team login")
        );
        // Replaced in place, not moved to the end
        assert_eq!(registry.list().next().unwrap().name, "BasicAuth");
        assert!(registry.contains("Internal"));
        assert!(!registry.contains("Broken"));

        // Unreadable entries are still exported
        let exported = registry.to_openapi(|_| true);
        assert_eq!(exported["Broken"], json!({"type": "kerberos"}));
        assert_eq!(exported.len(), 7);
    }

    #[test]
    fn test_to_openapi_filters_schemes() {
        let registry = SecuritySchemeRegistry::new();
        let exported = registry.to_openapi(|s| s.scheme_type == SecuritySchemeType::Http);
        assert_eq!(exported.keys().collect::<Vec<_>>(), vec!["BasicAuth", "BearerAuth"]);
        assert!(registry.to_openapi(|_| false).is_empty());
    }

    #[test]
    fn test_scheme_keeps_extensions() {
        let value = json!({"type": "http", "scheme": "bearer", "x-token-ttl": 3600});
        let scheme = SecurityScheme::from_openapi("Session", &value).unwrap();
        assert_eq!(scheme.extra.get("x-token-ttl"), Some(&json!(3600)));
        assert_eq!(scheme.to_openapi(), value);
    }

    #[test]
    fn test_requirement_keeps_scopes_and_pairs() {
        let value = json!({"OAuth2": ["read", "write"], "ApiKeyAuth": []});
        let requirement = SecurityRequirement::from_openapi(&value).unwrap();
        assert_eq!(requirement.schemes().len(), 2);
        assert_eq!(requirement.schemes()[0].scopes(), ["read", "write"]);
        assert_eq!(requirement.to_openapi(), value);

        let anonymous = SecurityRequirement::from_openapi(&json!({})).unwrap();
        assert!(anonymous.is_empty());
        assert!(SecurityRequirement::from_openapi(&json!("OAuth2")).is_none());
    }

    #[test]
    fn test_merge_nothing_keeps_baseline() {
        let registry = SecuritySchemeRegistry::with_imported(None);
        assert_eq!(registry, SecuritySchemeRegistry::new());
    }

    #[test]
    fn test_remove() {
        let mut registry = SecuritySchemeRegistry::new();
        let removed = registry.remove("OpenID").unwrap();
        assert_eq!(removed.scheme_type, SecuritySchemeType::OpenIdConnect);
        assert!(registry.remove("OpenID").is_err());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_summary() {
        let registry = SecuritySchemeRegistry::new();
        assert_eq!(registry.get("BearerAuth").unwrap().summary(), "Bearer JWT");
        assert_eq!(registry.get("ApiKeyAuth").unwrap().summary(), "header parameter");
        assert_eq!(registry.get("OAuth2").unwrap().summary(), "OAuth 2.0");
    }

    #[test]
    fn test_from_openapi_round_trip() {
        for scheme in BASELINE_SECURITY_SCHEMES.iter() {
            let parsed = SecurityScheme::from_openapi(&scheme.name, &scheme.to_openapi()).unwrap();
            assert_eq!(&parsed, scheme);
        }
    }
}

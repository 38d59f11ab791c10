//! Operations: one HTTP method bound to a path template.
//!
//! Security is a list of [`SecurityRequirement`]s: alternatives, each
//! naming schemes that apply together, with their scopes.

use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::parameter::Parameter;
use crate::request_body::RequestBodyObject;
use crate::response::ResponseObject;
use crate::security::{SchemeRef, SecurityRequirement, SecuritySchemeRegistry};
use crate::types::HttpMethod;

/// Operation of a path
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub id: String,
    pub method: HttpMethod,
    pub summary: String,
    pub description: String,
    pub operation_id: String,
    /// Whether `operationId` is written out
    pub operation_id_required: bool,
    /// Tag names; weak references to document tags
    pub tags: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Allowed for any method, meaningful for POST, PUT and PATCH
    pub request_body: Option<RequestBodyObject>,
    pub responses: Vec<ResponseObject>,
    pub security: Vec<SecurityRequirement>,
    /// `deprecated`, `externalDocs`, `callbacks`, `servers` and extensions
    pub extra: Map<String, Value>,
}

impl Operation {
    /// New operation with the canonical 200 response.
    ///
    /// The operationId is derived from the method and path template.
    pub fn new(method: HttpMethod, summary: impl Into<String>, path: &str) -> Self {
        Self {
            id: format!("op-{}", uuid::Uuid::new_v4()),
            method,
            summary: summary.into(),
            description: String::new(),
            operation_id: generate_operation_id(method, path),
            operation_id_required: true,
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: vec![ResponseObject::successful()],
            security: Vec::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_method(&self, method: HttpMethod) -> Operation {
        Operation {
            method,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_summary(&self, summary: impl Into<String>) -> Operation {
        Operation {
            summary: summary.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Operation {
        Operation {
            description: description.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_operation_id(&self, operation_id: impl Into<String>) -> Operation {
        Operation {
            operation_id: operation_id.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_operation_id_required(&self, required: bool) -> Operation {
        Operation {
            operation_id_required: required,
            ..self.clone()
        }
    }

    /// Adds a tag unless it is already present
    #[must_use]
    pub fn add_tag(&self, tag: &str) -> Operation {
        if self.tags.iter().any(|t| t == tag) {
            return self.clone();
        }
        let mut next = self.clone();
        next.tags.push(tag.to_string());
        next
    }

    /// Removes every tag equal to `tag`
    #[must_use]
    pub fn remove_tag(&self, tag: &str) -> Operation {
        Operation {
            tags: self.tags.iter().filter(|t| *t != tag).cloned().collect(),
            ..self.clone()
        }
    }

    /// Rewrites tag `from` to `to`, dropping the duplicate if `to` is already present
    #[must_use]
    pub fn rename_tag(&self, from: &str, to: &str) -> Operation {
        if !self.tags.iter().any(|t| t == from) {
            return self.clone();
        }
        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = if tag == from { to } else { tag.as_str() };
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        Operation {
            tags,
            ..self.clone()
        }
    }

    /// Appends a blank query parameter
    #[must_use]
    pub fn add_parameter(&self) -> Operation {
        let mut next = self.clone();
        next.parameters.push(Parameter::new());
        next
    }

    /// Replaces the parameter with the same id
    pub fn update_parameter(&self, parameter: Parameter) -> Result<Operation> {
        let index = self
            .parameters
            .iter()
            .position(|p| p.id == parameter.id)
            .ok_or_else(|| Error::ParameterNotFound(parameter.id.clone()))?;
        let mut next = self.clone();
        next.parameters[index] = parameter;
        Ok(next)
    }

    pub fn delete_parameter(&self, id: &str) -> Result<Operation> {
        if !self.parameters.iter().any(|p| p.id == id) {
            return Err(Error::ParameterNotFound(id.to_string()));
        }
        Ok(Operation {
            parameters: self.parameters.iter().filter(|p| p.id != id).cloned().collect(),
            ..self.clone()
        })
    }

    /// Appends a `200 Successful operation` response
    #[must_use]
    pub fn add_response(&self) -> Operation {
        let mut next = self.clone();
        next.responses.push(ResponseObject::successful());
        next
    }

    /// Replaces the response with the same id
    pub fn update_response(&self, response: ResponseObject) -> Result<Operation> {
        let index = self
            .responses
            .iter()
            .position(|r| r.id == response.id)
            .ok_or_else(|| Error::ResponseNotFound(response.id.clone()))?;
        let mut next = self.clone();
        next.responses[index] = response;
        Ok(next)
    }

    pub fn delete_response(&self, id: &str) -> Result<Operation> {
        if !self.responses.iter().any(|r| r.id == id) {
            return Err(Error::ResponseNotFound(id.to_string()));
        }
        Ok(Operation {
            responses: self.responses.iter().filter(|r| r.id != id).cloned().collect(),
            ..self.clone()
        })
    }

    #[must_use]
    pub fn with_request_body(&self, request_body: Option<RequestBodyObject>) -> Operation {
        Operation {
            request_body,
            ..self.clone()
        }
    }

    /// Whether this method conventionally carries a request body
    pub fn request_body_applicable(&self) -> bool {
        self.method.accepts_request_body()
    }

    /// Replaces the whole security selection
    #[must_use]
    pub fn update_security(&self, security: Vec<SecurityRequirement>) -> Operation {
        Operation {
            security,
            ..self.clone()
        }
    }

    /// Every scheme reference across all requirements
    pub fn security_refs(&self) -> impl Iterator<Item = &SchemeRef> {
        self.security.iter().flat_map(SecurityRequirement::schemes)
    }

    /// Selects or deselects a registered scheme.
    ///
    /// Selecting adds a requirement on that scheme alone. Deselecting
    /// removes it from every requirement and drops the ones left empty.
    pub fn toggle_security(&self, registry: &SecuritySchemeRegistry, id: &str) -> Result<Operation> {
        if self.security.iter().any(|r| r.contains(id)) {
            return Ok(self.without_schemes(|s| s.id() != id));
        }
        let scheme = registry
            .get(id)
            .ok_or_else(|| Error::SecuritySchemeNotFound(id.to_string()))?;
        let mut security = self.security.clone();
        security.push(SecurityRequirement::single(SchemeRef::from(scheme)));
        Ok(self.update_security(security))
    }

    /// Security references whose scheme is no longer registered
    pub fn dangling_security<'a>(&'a self, registry: &SecuritySchemeRegistry) -> Vec<&'a SchemeRef> {
        self.security_refs()
            .filter(|s| registry.resolve(s).is_none())
            .collect()
    }

    /// Drops security references the registry cannot resolve
    #[must_use]
    pub fn retain_security(&self, registry: &SecuritySchemeRegistry) -> Operation {
        self.without_schemes(|s| registry.resolve(s).is_some())
    }

    /// Keeps the scheme references `keep` accepts. Requirements emptied by
    /// this are dropped; ones that were already empty stay.
    fn without_schemes<F>(&self, keep: F) -> Operation
    where
        F: Fn(&SchemeRef) -> bool,
    {
        self.update_security(
            self.security
                .iter()
                .filter_map(|requirement| {
                    let kept = requirement.filter(&keep);
                    (requirement.is_empty() || !kept.is_empty()).then_some(kept)
                })
                .collect(),
        )
    }

    /// Renders the operation as an OpenAPI operation object
    pub fn to_openapi(&self) -> Value {
        let mut out = Map::new();
        if !self.tags.is_empty() {
            out.insert(
                "tags".to_string(),
                Value::Array(self.tags.iter().map(|t| Value::from(t.as_str())).collect()),
            );
        }
        if !self.summary.is_empty() {
            out.insert("summary".to_string(), Value::from(self.summary.as_str()));
        }
        if !self.description.is_empty() {
            out.insert(
                "description".to_string(),
                Value::from(self.description.as_str()),
            );
        }
        if self.operation_id_required && !self.operation_id.is_empty() {
            out.insert(
                "operationId".to_string(),
                Value::from(self.operation_id.as_str()),
            );
        }
        if !self.parameters.is_empty() {
            out.insert(
                "parameters".to_string(),
                Value::Array(self.parameters.iter().map(Parameter::to_openapi).collect()),
            );
        }
        if let Some(body) = &self.request_body {
            out.insert("requestBody".to_string(), body.to_openapi());
        }

        let mut responses = Map::new();
        for response in &self.responses {
            if responses.contains_key(&response.status_code) {
                log::warn!(
                    "{} '{}': duplicate response {}, last one wins",
                    self.method,
                    self.summary,
                    response.status_code
                );
            }
            responses.insert(response.status_code.clone(), response.to_openapi());
        }
        out.insert("responses".to_string(), Value::Object(responses));

        if !self.security.is_empty() {
            out.insert(
                "security".to_string(),
                Value::Array(self.security.iter().map(SecurityRequirement::to_openapi).collect()),
            );
        }

        for (key, value) in &self.extra {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI operation object.
    ///
    /// Schemes the registry does not know are dropped from security
    /// requirements with a warning. An explicit `security: []` is kept.
    pub fn from_openapi(
        method: HttpMethod,
        value: &Value,
        registry: &SecuritySchemeRegistry,
    ) -> Operation {
        let obj = value.as_object();
        let text = |key: &str| {
            obj.and_then(|o| o.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let list = |key: &str| {
            obj.and_then(|o| o.get(key))
                .and_then(|v| v.as_array())
                .map(Vec::as_slice)
                .unwrap_or_default()
        };

        let operation_id = text("operationId");
        let tags = list("tags")
            .iter()
            .filter_map(|t| t.as_str())
            .map(String::from)
            .collect();
        let parameters = list("parameters")
            .iter()
            .filter_map(Parameter::from_openapi)
            .collect();
        let request_body = obj
            .and_then(|o| o.get("requestBody"))
            .and_then(RequestBodyObject::from_openapi);
        let responses = obj
            .and_then(|o| o.get("responses"))
            .and_then(|v| v.as_object())
            .map(|responses| {
                responses
                    .iter()
                    .map(|(code, r)| ResponseObject::from_openapi(code, r))
                    .collect()
            })
            .unwrap_or_default();

        let mut security: Vec<SecurityRequirement> = Vec::new();
        for requirement in list("security").iter().filter_map(SecurityRequirement::from_openapi) {
            let known = requirement.filter(|s| {
                let found = registry.resolve(s).is_some();
                if !found {
                    log::warn!("{method}: dropping unknown security scheme '{s}'");
                }
                found
            });
            if (requirement.is_empty() || !known.is_empty()) && !security.contains(&known) {
                security.push(known);
            }
        }

        let mut extra = obj.cloned().unwrap_or_default();
        for key in [
            "summary",
            "description",
            "operationId",
            "tags",
            "parameters",
            "requestBody",
            "responses",
        ] {
            extra.remove(key);
        }
        if !security.is_empty() {
            extra.remove("security");
        }

        Operation {
            id: format!("op-{}", uuid::Uuid::new_v4()),
            method,
            summary: text("summary"),
            description: text("description"),
            operation_id_required: !operation_id.is_empty(),
            operation_id,
            tags,
            parameters,
            request_body,
            responses,
            security,
            extra,
        }
    }
}

/// Derives an operationId from a method and path template.
///
/// `GET /pets/{petId}` becomes `getPetsByPetId`.
pub fn generate_operation_id(method: HttpMethod, path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

    let resource: String = trimmed
        .split('/')
        .map(|segment| {
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Some(param) => format!("By{}", capitalize(param)),
                None => capitalize(segment),
            }
        })
        .collect();

    format!("{}{}", method.as_str().to_lowercase(), capitalize(&resource))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_operation_id() {
        assert_eq!(generate_operation_id(HttpMethod::Get, "/pets"), "getPets");
        assert_eq!(
            generate_operation_id(HttpMethod::Get, "/pets/{petId}"),
            "getPetsByPetId"
        );
        assert_eq!(
            generate_operation_id(HttpMethod::Delete, "/users/{id}/orders/"),
            "deleteUsersByIdOrders"
        );
        assert_eq!(generate_operation_id(HttpMethod::Post, "/"), "post");
        assert_eq!(generate_operation_id(HttpMethod::Put, "pets"), "putPets");
    }

    #[test]
    fn test_new_operation() {
        let op = Operation::new(HttpMethod::Get, "List pets", "/pets");
        assert_eq!(op.operation_id, "getPets");
        assert!(op.operation_id_required);
        assert_eq!(op.responses.len(), 1);
        assert_eq!(op.responses[0].status_code, "200");
        assert_eq!(op.responses[0].description, "Successful operation");
        assert!(op.parameters.is_empty());
    }

    #[test]
    fn test_tags_are_set_like() {
        let op = Operation::new(HttpMethod::Get, "", "/pets")
            .add_tag("pets")
            .add_tag("pets")
            .add_tag("store");
        assert_eq!(op.tags, vec!["pets", "store"]);
        assert_eq!(op.remove_tag("pets").tags, vec!["store"]);
        assert_eq!(op.rename_tag("pets", "store").tags, vec!["store"]);
        assert_eq!(op.rename_tag("pets", "animals").tags, vec!["animals", "store"]);
    }

    #[test]
    fn test_parameters_by_id() {
        let op = Operation::new(HttpMethod::Get, "", "/pets").add_parameter();
        let param = op.parameters[0].with_name("limit");
        let op = op.update_parameter(param.clone()).unwrap();
        assert_eq!(op.parameters[0].name, "limit");

        let stranger = Parameter::new();
        assert!(matches!(
            op.update_parameter(stranger),
            Err(Error::ParameterNotFound(_))
        ));
        let op = op.delete_parameter(&param.id).unwrap();
        assert!(op.parameters.is_empty());
    }

    #[test]
    fn test_responses_by_id() {
        let op = Operation::new(HttpMethod::Get, "", "/pets").add_response();
        let second = op.responses[1].select_status_code("404");
        let op = op.update_response(second.clone()).unwrap();
        assert_eq!(op.responses[1].description, "Resource not found");
        let op = op.delete_response(&second.id).unwrap();
        assert_eq!(op.responses.len(), 1);
        assert!(op.delete_response(&second.id).is_err());
    }

    #[test]
    fn test_toggle_security() {
        let registry = SecuritySchemeRegistry::new();
        let op = Operation::new(HttpMethod::Get, "", "/pets");
        let op = op.toggle_security(&registry, "BearerAuth").unwrap();
        let op = op.toggle_security(&registry, "ApiKeyAuth").unwrap();
        assert_eq!(op.security.len(), 2);
        let op = op.toggle_security(&registry, "BearerAuth").unwrap();
        assert_eq!(
            op.security,
            vec![SecurityRequirement::single(SchemeRef::new("ApiKeyAuth"))]
        );
        assert!(op.toggle_security(&registry, "Nope").is_err());
    }

    #[test]
    fn test_toggle_off_leaves_rest_of_requirement() {
        let registry = SecuritySchemeRegistry::new();
        let op = Operation::new(HttpMethod::Get, "", "/pets").update_security(vec![
            SecurityRequirement::new(vec![
                SchemeRef::new("OAuth2").with_scopes(["read"]),
                SchemeRef::new("ApiKeyAuth"),
            ]),
            SecurityRequirement::default(),
        ]);
        let op = op.toggle_security(&registry, "ApiKeyAuth").unwrap();
        assert_eq!(
            op.security,
            vec![
                SecurityRequirement::single(SchemeRef::new("OAuth2").with_scopes(["read"])),
                SecurityRequirement::default(),
            ]
        );
        let op = op.toggle_security(&registry, "OAuth2").unwrap();
        assert_eq!(op.security, vec![SecurityRequirement::default()]);
    }

    #[test]
    fn test_retain_security() {
        let mut registry = SecuritySchemeRegistry::new();
        let op = Operation::new(HttpMethod::Get, "", "/pets").update_security(vec![
            SecurityRequirement::single(SchemeRef::new("OpenID")),
            SecurityRequirement::single(SchemeRef::new("BasicAuth")),
        ]);
        registry.remove("OpenID").unwrap();
        assert_eq!(op.dangling_security(&registry), vec![&SchemeRef::new("OpenID")]);
        assert_eq!(
            op.retain_security(&registry).security,
            vec![SecurityRequirement::single(SchemeRef::new("BasicAuth"))]
        );
    }

    #[test]
    fn test_request_body_applicable() {
        let op = Operation::new(HttpMethod::Get, "", "/pets");
        assert!(!op.request_body_applicable());
        assert!(op.with_method(HttpMethod::Patch).request_body_applicable());
        // Permitted regardless
        let op = op.with_request_body(Some(RequestBodyObject::new()));
        assert!(op.request_body.is_some());
    }

    #[test]
    fn test_to_openapi() {
        let op = Operation::new(HttpMethod::Get, "List pets", "/pets")
            .add_tag("pets")
            .update_security(vec![SecurityRequirement::single(SchemeRef::new("BearerAuth"))]);
        assert_eq!(
            op.to_openapi(),
            json!({
                "tags": ["pets"],
                "summary": "List pets",
                "operationId": "getPets",
                "responses": {"200": {"description": "Successful operation"}},
                "security": [{"BearerAuth": []}]
            })
        );

        let hidden = op.with_operation_id_required(false).to_openapi();
        assert!(hidden.get("operationId").is_none());
    }

    #[test]
    fn test_from_openapi() {
        let registry = SecuritySchemeRegistry::new();
        let value = json!({
            "summary": "Create pet",
            "operationId": "createPet",
            "tags": ["pets"],
            "parameters": [{"name": "trace", "in": "header"}],
            "requestBody": {
                "required": true,
                "content": {"application/json": {"schema": {"type": "object"}}}
            },
            "responses": {
                "201": {"description": "Created"},
                "default": {"description": "Error"}
            },
            "security": [{"BearerAuth": []}, {"Ghost": []}]
        });
        let op = Operation::from_openapi(HttpMethod::Post, &value, &registry);
        assert_eq!(op.summary, "Create pet");
        assert!(op.operation_id_required);
        assert_eq!(op.parameters[0].name, "trace");
        assert!(op.request_body.unwrap().required);
        let codes: Vec<_> = op.responses.iter().map(|r| r.status_code.as_str()).collect();
        assert_eq!(codes, vec!["201", "default"]);
        assert_eq!(
            op.security,
            vec![SecurityRequirement::single(SchemeRef::new("BearerAuth"))]
        );
    }

    #[test]
    fn test_from_openapi_keeps_scopes_and_unmodelled_keys() {
        let registry = SecuritySchemeRegistry::new();
        let value = json!({
            "summary": "Delete pet",
            "deprecated": true,
            "externalDocs": {"url": "https://docs.example.com/pets"},
            "x-rate-limit": 10,
            "responses": {"204": {"description": "Deleted"}},
            "security": [{"OAuth2": ["write"], "ApiKeyAuth": []}, {}]
        });
        let op = Operation::from_openapi(HttpMethod::Delete, &value, &registry);
        assert_eq!(op.security.len(), 2);
        assert_eq!(op.security[0].schemes()[0].scopes(), ["write"]);
        assert_eq!(op.to_openapi(), value);

        let public = json!({"responses": {}, "security": []});
        let op = Operation::from_openapi(HttpMethod::Get, &public, &registry);
        assert!(op.security.is_empty());
        assert_eq!(op.to_openapi(), public);
    }
}

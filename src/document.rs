//! The document being edited: model state, import and export.
//!
//! A [`Document`] is either fresh (built from [`EditorConfig`] defaults) or
//! imported from text. An imported document keeps the parsed source tree so
//! that export reproduces everything the model does not represent
//! (`components.schemas`, top-level `x-` extensions, ...); only the
//! sections edited since import are rewritten from the model. Within
//! `paths`, the model itself carries every key it does not edit.

use std::collections::HashSet;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::codec;
use crate::config::EditorConfig;
use crate::errors::{Error, Result};
use crate::info::{self, ApiInfo, Server, Tag};
use crate::path::{DanglingSecurity, DuplicateMethod, PathCollection};
use crate::schema::SchemaEditor;
use crate::security::{SecurityScheme, SecuritySchemeRegistry};
use crate::types::TextFormat;
use crate::version;

/// MIME type of exported files
pub const EXPORT_MIME_TYPE: &str = "text/plain";

/// Base name of exported files
pub const EXPORT_FILE_STEM: &str = "api-specification";

/// Top-level part of a document the model can rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Info,
    Servers,
    Tags,
    Paths,
    SecuritySchemes,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Info,
        Section::Servers,
        Section::Tags,
        Section::Paths,
        Section::SecuritySchemes,
    ];
}

/// Rendered document ready to be copied or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `api-specification.json` or `api-specification.yaml`
    pub file_name: String,
    pub mime_type: &'static str,
    pub format: TextFormat,
    pub contents: String,
    /// Hex SHA-256 of `contents`
    pub sha256: String,
}

/// Editing session state
#[derive(Debug, Clone)]
pub struct Document {
    config: EditorConfig,
    openapi: String,
    info: ApiInfo,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    paths: PathCollection,
    registry: SecuritySchemeRegistry,
    source: Option<Value>,
    touched: HashSet<Section>,
}

impl Document {
    /// Fresh document with the default configuration
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Fresh document seeded from `config`
    pub fn with_config(config: EditorConfig) -> Self {
        let info = ApiInfo::new(config.default_title.clone(), config.default_version.clone())
            .with_description(config.default_description.clone());
        let servers = if config.seed_example_server {
            vec![Server::example()]
        } else {
            Vec::new()
        };
        Self {
            openapi: config.openapi_version.clone(),
            info,
            servers,
            tags: Vec::new(),
            paths: PathCollection::new(),
            registry: SecuritySchemeRegistry::new(),
            source: None,
            touched: HashSet::new(),
            config,
        }
    }

    /// Replaces the whole document with the one in `text`.
    ///
    /// The text must parse and carry truthy `openapi`, `info` and `paths`.
    /// On failure the current state is left exactly as it was.
    pub fn import(&mut self, text: &str) -> Result<()> {
        let value = codec::parse_document(text)?;
        let next = Self::from_value(self.config.clone(), value)?;
        log::debug!(
            "imported document: {} path(s), {} security scheme(s)",
            next.paths.len(),
            next.registry.len()
        );
        *self = next;
        Ok(())
    }

    /// Builds a document from an already parsed source tree
    pub fn from_value(config: EditorConfig, value: Value) -> Result<Self> {
        codec::check_document(&value)?;

        let openapi = value
            .get("openapi")
            .and_then(info::scalar_text)
            .unwrap_or_default();
        if !version::is_supported(&openapi) {
            log::warn!(
                "document declares openapi {openapi}, only 3.0.x is edited; importing as is"
            );
        }

        let registry = SecuritySchemeRegistry::with_imported(
            value
                .get("components")
                .and_then(|c| c.get("securitySchemes")),
        );
        let paths = value
            .get("paths")
            .map(|p| PathCollection::from_openapi(p, &registry))
            .unwrap_or_default();

        Ok(Self {
            openapi,
            info: value.get("info").map(ApiInfo::from_openapi).unwrap_or_default(),
            servers: info::servers_from_openapi(value.get("servers")),
            tags: info::tags_from_openapi(value.get("tags")),
            paths,
            registry,
            source: Some(value),
            touched: HashSet::new(),
            config,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn openapi_version(&self) -> &str {
        &self.openapi
    }

    pub fn info(&self) -> &ApiInfo {
        &self.info
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn paths(&self) -> &PathCollection {
        &self.paths
    }

    pub fn registry(&self) -> &SecuritySchemeRegistry {
        &self.registry
    }

    /// Whether the document came from an import
    pub fn is_imported(&self) -> bool {
        self.source.is_some()
    }

    /// Whether `section` has been edited since import
    pub fn is_touched(&self, section: Section) -> bool {
        self.touched.contains(&section)
    }

    /// Schema editor capped at the configured depth
    pub fn schema_editor(&self) -> SchemaEditor {
        SchemaEditor::new(self.config.max_schema_depth)
    }

    pub fn set_info(&mut self, info: ApiInfo) {
        self.info = info;
        self.touch(Section::Info);
    }

    pub fn update_info<F>(&mut self, f: F)
    where
        F: FnOnce(&ApiInfo) -> ApiInfo,
    {
        let next = f(&self.info);
        self.set_info(next);
    }

    /// Appends a blank server and returns its index
    pub fn add_server(&mut self) -> usize {
        self.servers.push(Server::default());
        self.touch(Section::Servers);
        self.servers.len() - 1
    }

    pub fn remove_server(&mut self, index: usize) -> Result<Server> {
        if index >= self.servers.len() {
            return Err(Error::index_out_of_bounds("server", index, self.servers.len()));
        }
        self.touch(Section::Servers);
        Ok(self.servers.remove(index))
    }

    /// Replaces the server at `index` with the result of `f`
    pub fn update_server<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&Server) -> Result<Server>,
    {
        let len = self.servers.len();
        let current = self
            .servers
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds("server", index, len))?;
        let next = f(current)?;
        self.servers[index] = next;
        self.touch(Section::Servers);
        Ok(())
    }

    /// Adds a tag; names are unique within the document
    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        if self.tags.iter().any(|t| t.name == tag.name) {
            return Err(Error::validation(
                "tag.name",
                format!("tag '{}' already exists", tag.name),
            ));
        }
        self.tags.push(tag);
        self.touch(Section::Tags);
        Ok(())
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<Tag> {
        if index >= self.tags.len() {
            return Err(Error::index_out_of_bounds("tag", index, self.tags.len()));
        }
        self.touch(Section::Tags);
        Ok(self.tags.remove(index))
    }

    /// Renames a tag and every operation reference to it.
    ///
    /// Returns the number of operations rewritten.
    pub fn rename_tag(&mut self, from: &str, to: &str) -> Result<usize> {
        let index = self
            .tags
            .iter()
            .position(|t| t.name == from)
            .ok_or_else(|| Error::TagNotFound(from.to_string()))?;
        if to.trim().is_empty() {
            return Err(Error::validation("tag.name", "name is required"));
        }
        if from != to && self.tags.iter().any(|t| t.name == to) {
            return Err(Error::validation(
                "tag.name",
                format!("tag '{to}' already exists"),
            ));
        }

        self.tags[index].name = to.to_string();
        self.touch(Section::Tags);
        let changed = self.paths.rename_tag(from, to);
        if changed > 0 {
            self.touch(Section::Paths);
        }
        log::debug!("renamed tag {from} -> {to} in {changed} operation(s)");
        Ok(changed)
    }

    /// Runs an edit against a copy of the paths and keeps it only on success
    pub fn update_paths<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PathCollection) -> Result<T>,
    {
        let mut next = self.paths.clone();
        let out = f(&mut next)?;
        self.paths = next;
        self.touch(Section::Paths);
        Ok(out)
    }

    /// Registers or replaces a security scheme
    pub fn add_security_scheme(&mut self, scheme: SecurityScheme) {
        self.registry.insert(scheme);
        self.touch(Section::SecuritySchemes);
    }

    /// Unregisters a scheme and drops every operation reference to it
    pub fn remove_security_scheme(&mut self, id: &str) -> Result<SecurityScheme> {
        let removed = self.registry.remove(id)?;
        self.touch(Section::SecuritySchemes);
        let dropped = self.paths.retain_security(&self.registry);
        if dropped > 0 {
            self.touch(Section::Paths);
        }
        log::debug!("removed security scheme {id}, dropped {dropped} reference(s)");
        Ok(removed)
    }

    /// Operation security references the registry cannot resolve
    pub fn dangling_references(&self) -> Vec<DanglingSecurity> {
        self.paths.dangling_security(&self.registry)
    }

    /// Methods defined more than once under one path template
    pub fn duplicate_methods(&self) -> Vec<DuplicateMethod> {
        self.paths.duplicate_methods()
    }

    /// The document as a value tree.
    ///
    /// Fresh documents are rendered entirely from the model. Imported ones
    /// start from the source tree with edited sections overlaid.
    pub fn to_value(&self) -> Value {
        match &self.source {
            None => {
                let mut out = Map::new();
                out.insert("openapi".to_string(), Value::from(self.openapi.as_str()));
                for section in Section::ALL {
                    self.overlay(&mut out, section);
                }
                Value::Object(out)
            }
            Some(source) => {
                let mut out = source.as_object().cloned().unwrap_or_default();
                for section in Section::ALL {
                    if self.is_touched(section) {
                        self.overlay(&mut out, section);
                    }
                }
                Value::Object(out)
            }
        }
    }

    /// Serializes the document in `format`
    pub fn render(&self, format: TextFormat) -> Result<String> {
        codec::to_text(&self.to_value(), format)
    }

    /// Text for a live preview; falls back to compact JSON instead of failing
    pub fn preview(&self, format: Option<TextFormat>) -> String {
        let format = format.unwrap_or(self.config.default_format);
        let value = self.to_value();
        match codec::to_text(&value, format) {
            Ok(text) => text,
            Err(e) => {
                log::error!("error rendering preview as {format}: {e}");
                value.to_string()
            }
        }
    }

    /// Renders a downloadable file
    pub fn export(&self, format: TextFormat) -> Result<ExportArtifact> {
        let contents = self.render(format)?;
        let mut hasher = Sha256::new();
        hasher.update(contents.as_bytes());
        let sha256 = hex::encode(hasher.finalize());

        Ok(ExportArtifact {
            file_name: format!("{EXPORT_FILE_STEM}.{}", format.extension()),
            mime_type: EXPORT_MIME_TYPE,
            format,
            contents,
            sha256,
        })
    }

    fn touch(&mut self, section: Section) {
        self.touched.insert(section);
    }

    fn overlay(&self, out: &mut Map<String, Value>, section: Section) {
        match section {
            Section::Info => {
                out.insert("info".to_string(), self.info.to_openapi());
            }
            Section::Servers => set_or_remove(out, "servers", &self.servers, info::servers_to_openapi),
            Section::Tags => set_or_remove(out, "tags", &self.tags, info::tags_to_openapi),
            Section::Paths => {
                out.insert("paths".to_string(), self.paths.to_openapi());
            }
            Section::SecuritySchemes => {
                let schemes = self.security_schemes_to_openapi();
                let components = out
                    .entry("components")
                    .or_insert_with(|| Value::Object(Map::new()));
                if !components.is_object() {
                    log::warn!("components is not a mapping, replacing it to write securitySchemes");
                    *components = Value::Object(Map::new());
                }
                if let Value::Object(components) = components {
                    if schemes.is_empty() {
                        components.remove("securitySchemes");
                    } else {
                        components.insert("securitySchemes".to_string(), Value::Object(schemes));
                    }
                    if components.is_empty() {
                        out.remove("components");
                    }
                }
            }
        }
    }

    fn security_schemes_to_openapi(&self) -> Map<String, Value> {
        let referenced: HashSet<&str> = self
            .paths
            .operations()
            .flat_map(|(_, op)| op.security_refs().map(|s| s.id()))
            .collect();
        self.registry.to_openapi(|s| {
            self.config.export_unreferenced_security_schemes || referenced.contains(s.id.as_str())
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn set_or_remove<T>(out: &mut Map<String, Value>, key: &str, items: &[T], render: fn(&[T]) -> Value) {
    if items.is_empty() {
        out.remove(key);
    } else {
        out.insert(key.to_string(), render(items));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{SchemeRef, SecurityRequirement};
    use crate::types::HttpMethod;
    use serde_json::json;

    const PETSTORE: &str = r#"{
  "openapi": "3.0.3",
  "info": {"title": "Petstore", "version": "1.0.0"},
  "x-audience": "public",
  "paths": {
    "/pets": {
      "get": {
        "summary": "List pets",
        "operationId": "listPets",
        "tags": ["pets"],
        "responses": {"200": {"description": "ok"}},
        "security": [{"BearerAuth": []}]
      }
    }
  },
  "components": {
    "schemas": {"Pet": {"type": "object"}},
    "securitySchemes": {"BasicAuth": {"type": "http", "scheme": "basic", "description": "ours"}}
  }
}"#;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert!(!doc.is_imported());
        assert_eq!(doc.info().title.as_deref(), Some("My API"));
        assert_eq!(doc.servers(), &[Server::example()]);
        assert_eq!(doc.registry().len(), 5);

        let value = doc.to_value();
        assert_eq!(value["openapi"], json!("3.0.0"));
        assert_eq!(value["info"]["description"], json!("API Description"));
        assert_eq!(value["paths"], json!({}));
        assert!(value.get("tags").is_none());
        assert_eq!(
            value["components"]["securitySchemes"]
                .as_object()
                .unwrap()
                .len(),
            5
        );
    }

    #[test]
    fn test_unreferenced_schemes_can_be_omitted() {
        let config = EditorConfig {
            export_unreferenced_security_schemes: false,
            seed_example_server: false,
            ..EditorConfig::default()
        };
        let mut doc = Document::with_config(config);
        assert!(doc.to_value().get("components").is_none());
        assert!(doc.to_value().get("servers").is_none());

        let path_id = doc.update_paths(|paths| Ok(paths.add_path("/pets"))).unwrap();
        let registry = doc.registry().clone();
        doc.update_paths(|paths| {
            let op = paths.paths()[0].operations[0].toggle_security(&registry, "OAuth2")?;
            paths.save_operation(&path_id, op)
        })
        .unwrap();
        let schemes = doc.to_value()["components"]["securitySchemes"].clone();
        assert_eq!(schemes.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["OAuth2"]);
    }

    #[test]
    fn test_import_keeps_unmodelled_sections() {
        let mut doc = Document::new();
        doc.import(PETSTORE).unwrap();
        assert!(doc.is_imported());
        assert!(doc.servers().is_empty());

        let value = doc.to_value();
        assert_eq!(value["x-audience"], json!("public"));
        assert_eq!(value["components"]["schemas"]["Pet"], json!({"type": "object"}));
        // Untouched sections are the source verbatim
        assert_eq!(value["components"]["securitySchemes"].as_object().unwrap().len(), 1);
        assert!(value.get("servers").is_none());
    }

    #[test]
    fn test_export_overlays_only_touched_sections() {
        let mut doc = Document::new();
        doc.import(PETSTORE).unwrap();
        doc.update_info(|info| info.with_title("Pet Shop"));

        let value = doc.to_value();
        assert_eq!(value["info"]["title"], json!("Pet Shop"));
        assert_eq!(value["paths"]["/pets"]["get"]["operationId"], json!("listPets"));
        assert!(!doc.is_touched(Section::Paths));

        doc.add_security_scheme(SecurityScheme::http("Extra", "digest"));
        let value = doc.to_value();
        let schemes = value["components"]["securitySchemes"].as_object().unwrap();
        assert_eq!(schemes.len(), 6);
        assert_eq!(schemes["BasicAuth"]["description"], json!("ours"));
        assert_eq!(value["components"]["schemas"]["Pet"], json!({"type": "object"}));
    }

    #[test]
    fn test_failed_import_leaves_state() {
        let mut doc = Document::new();
        doc.import(PETSTORE).unwrap();
        let before = doc.to_value();

        let err = doc.import("openapi: 3.0.0").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
        assert!(doc.import("{\"openapi\": ").is_err());
        assert_eq!(doc.to_value(), before);
        assert_eq!(doc.paths().len(), 1);
    }

    #[test]
    fn test_remove_security_scheme_cascades() {
        let mut doc = Document::new();
        doc.import(PETSTORE).unwrap();
        let op = &doc.paths().paths()[0].operations[0];
        assert_eq!(
            op.security,
            vec![SecurityRequirement::single(SchemeRef::new("BearerAuth"))]
        );

        doc.remove_security_scheme("BearerAuth").unwrap();
        assert!(doc.dangling_references().is_empty());
        assert!(doc.paths().paths()[0].operations[0].security.is_empty());
        assert!(doc.is_touched(Section::Paths));
        assert!(doc.remove_security_scheme("BearerAuth").is_err());
        assert!(doc.to_value()["paths"]["/pets"]["get"].get("security").is_none());
    }

    #[test]
    fn test_rename_tag_cascades() {
        let mut doc = Document::new();
        doc.import(PETSTORE).unwrap();
        assert!(doc.rename_tag("pets", "animals").is_err());

        doc.add_tag(Tag::new("pets", "Pet operations").unwrap()).unwrap();
        assert!(doc.add_tag(Tag::new("pets", "again").unwrap()).is_err());
        assert_eq!(doc.rename_tag("pets", "animals").unwrap(), 1);

        let value = doc.to_value();
        assert_eq!(value["tags"][0]["name"], json!("animals"));
        assert_eq!(value["paths"]["/pets"]["get"]["tags"], json!(["animals"]));

        doc.remove_tag(0).unwrap();
        assert!(doc.to_value().get("tags").is_none());
        assert!(doc.remove_tag(0).is_err());
    }

    #[test]
    fn test_update_paths_is_atomic() {
        let mut doc = Document::new();
        let result: Result<()> = doc.update_paths(|paths| {
            paths.add_path("/ghost");
            Err(Error::PathNotFound("nope".to_string()))
        });
        assert!(result.is_err());
        assert!(doc.paths().is_empty());
        assert!(!doc.is_touched(Section::Paths));
    }

    #[test]
    fn test_servers() {
        let mut doc = Document::new();
        let index = doc.add_server();
        doc.update_server(index, |s| Ok(s.with_url("https://staging.example.com")))
            .unwrap();
        assert!(doc.update_server(9, |s| Ok(s.clone())).is_err());
        let value = doc.to_value();
        assert_eq!(value["servers"][1]["url"], json!("https://staging.example.com"));

        doc.remove_server(0).unwrap();
        doc.remove_server(0).unwrap();
        assert!(doc.to_value().get("servers").is_none());
    }

    #[test]
    fn test_export_artifact() {
        let mut doc = Document::new();
        doc.update_paths(|paths| Ok(paths.add_path("/pets"))).unwrap();

        let artifact = doc.export(TextFormat::Json).unwrap();
        assert_eq!(artifact.file_name, "api-specification.json");
        assert_eq!(artifact.mime_type, "text/plain");
        assert_eq!(artifact.sha256.len(), 64);
        assert_eq!(codec::parse(&artifact.contents).unwrap(), doc.to_value());

        let yaml = doc.export(TextFormat::Yaml).unwrap();
        assert_eq!(yaml.file_name, "api-specification.yaml");
        assert_ne!(yaml.sha256, artifact.sha256);
        assert!(doc.preview(None).starts_with("openapi:"));
    }

    #[test]
    fn test_scheme_edit_replaces_non_mapping_components() {
        let mut doc = Document::new();
        doc.import(r#"{"openapi": "3.0.0", "info": {"title": "T", "version": "1"}, "paths": {}, "components": "legacy"}"#)
            .unwrap();
        assert_eq!(doc.to_value()["components"], json!("legacy"));

        doc.add_security_scheme(SecurityScheme::http("Digest", "digest"));
        let value = doc.to_value();
        let schemes = value["components"]["securitySchemes"].as_object().unwrap();
        assert_eq!(schemes.len(), 6);
        assert_eq!(schemes["Digest"], json!({"type": "http", "scheme": "digest"}));
    }

    #[test]
    fn test_duplicate_methods_diagnostic() {
        let mut doc = Document::new();
        doc.update_paths(|paths| {
            paths.add_path("/pets");
            paths.add_path("/pets");
            Ok(())
        })
        .unwrap();
        let dupes = doc.duplicate_methods();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].method, HttpMethod::Get);
    }
}

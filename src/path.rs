//! Path templates and the collection that owns every operation.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::operation::Operation;
use crate::security::{SchemeRef, SecuritySchemeRegistry};
use crate::types::HttpMethod;

/// Path template with its operations
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub id: String,
    /// Template such as `/pets/{petId}`
    pub path: String,
    pub operations: Vec<Operation>,
    /// Path item keys that are not operations (`parameters`, `servers`,
    /// `summary`, extensions), kept as written
    pub extra: Map<String, Value>,
}

impl Path {
    pub fn new(path: impl Into<String>, operations: Vec<Operation>) -> Self {
        Self {
            id: format!("path-{}", uuid::Uuid::new_v4()),
            path: path.into(),
            operations,
            extra: Map::new(),
        }
    }

    /// Changes the template; existing operationIds are kept
    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> Path {
        Path {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Appends a GET operation summarised "New operation"
    #[must_use]
    pub fn add_operation(&self) -> Path {
        let operation = Operation::new(HttpMethod::Get, "New operation", &self.path)
            .with_operation_id(format!("operation{}", self.operations.len() + 1));
        let mut next = self.clone();
        next.operations.push(operation);
        next
    }

    pub fn operation(&self, id: &str) -> Result<&Operation> {
        self.operations
            .iter()
            .find(|op| op.id == id)
            .ok_or_else(|| Error::OperationNotFound(id.to_string()))
    }

    /// Replaces the operation with the same id
    pub fn save_operation(&self, operation: Operation) -> Result<Path> {
        let index = self
            .operations
            .iter()
            .position(|op| op.id == operation.id)
            .ok_or_else(|| Error::OperationNotFound(operation.id.clone()))?;
        let mut next = self.clone();
        next.operations[index] = operation;
        Ok(next)
    }

    pub fn delete_operation(&self, id: &str) -> Result<Path> {
        self.operation(id)?;
        Ok(Path {
            operations: self.operations.iter().filter(|op| op.id != id).cloned().collect(),
            ..self.clone()
        })
    }

    #[must_use]
    fn map_operations<F>(&self, f: F) -> Path
    where
        F: Fn(&Operation) -> Operation,
    {
        Path {
            operations: self.operations.iter().map(f).collect(),
            ..self.clone()
        }
    }
}

/// Method and summary row of a path draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDraft {
    pub method: HttpMethod,
    pub summary: String,
}

impl OperationDraft {
    pub fn new(method: HttpMethod, summary: impl Into<String>) -> Self {
        Self {
            method,
            summary: summary.into(),
        }
    }
}

/// Unsaved path: a template and the operations to create under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDraft {
    pub path: String,
    pub operations: Vec<OperationDraft>,
}

impl PathDraft {
    /// Draft for `path` with a single `GET "Get resource"` row
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operations: vec![OperationDraft::new(HttpMethod::Get, "Get resource")],
        }
    }

    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> PathDraft {
        PathDraft {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Appends a `GET "New operation"` row
    #[must_use]
    pub fn add_operation(&self) -> PathDraft {
        let mut next = self.clone();
        next.operations
            .push(OperationDraft::new(HttpMethod::Get, "New operation"));
        next
    }

    pub fn update_operation(&self, index: usize, row: OperationDraft) -> Result<PathDraft> {
        let len = self.operations.len();
        let mut next = self.clone();
        let slot = next
            .operations
            .get_mut(index)
            .ok_or_else(|| Error::index_out_of_bounds("operation draft", index, len))?;
        *slot = row;
        Ok(next)
    }

    pub fn delete_operation(&self, index: usize) -> Result<PathDraft> {
        if index >= self.operations.len() {
            return Err(Error::index_out_of_bounds(
                "operation draft",
                index,
                self.operations.len(),
            ));
        }
        let mut next = self.clone();
        next.operations.remove(index);
        Ok(next)
    }

    /// Builds the path, generating ids and operationIds
    pub fn build(&self) -> Path {
        let operations = self
            .operations
            .iter()
            .map(|row| Operation::new(row.method, row.summary.clone(), &self.path))
            .collect();
        Path::new(self.path.clone(), operations)
    }
}

impl Default for PathDraft {
    fn default() -> Self {
        Self::new("/new-path")
    }
}

/// A method that appears more than once under one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMethod {
    pub path: String,
    pub method: HttpMethod,
    pub count: usize,
}

/// An operation security reference whose scheme is not registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingSecurity {
    pub path_id: String,
    pub operation_id: String,
    pub scheme: SchemeRef,
}

/// Every path of a document, in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathCollection {
    paths: Vec<Path>,
}

impl PathCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&Path> {
        self.paths
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PathNotFound(id.to_string()))
    }

    /// Every operation with the path that owns it
    pub fn operations(&self) -> impl Iterator<Item = (&Path, &Operation)> {
        self.paths
            .iter()
            .flat_map(|p| p.operations.iter().map(move |op| (p, op)))
    }

    /// Adds a path with the default `GET "Get resource"` operation.
    ///
    /// Returns the new path's id.
    pub fn add_path(&mut self, path: impl Into<String>) -> String {
        self.add_draft(&PathDraft::new(path))
    }

    /// Saves a draft as a new path and returns its id
    pub fn add_draft(&mut self, draft: &PathDraft) -> String {
        let path = draft.build();
        let id = path.id.clone();
        log::debug!(
            "adding path {} with {} operation(s)",
            path.path,
            path.operations.len()
        );
        self.paths.push(path);
        id
    }

    /// Removes a path together with all of its operations
    pub fn delete_path(&mut self, id: &str) -> Result<Path> {
        let index = self.index_of(id)?;
        Ok(self.paths.remove(index))
    }

    pub fn rename_path(&mut self, id: &str, path: impl Into<String>) -> Result<()> {
        self.replace(id, |p| Ok(p.with_path(path)))
    }

    /// Adds a "New operation" to a path and returns the operation's id
    pub fn add_operation(&mut self, path_id: &str) -> Result<String> {
        let index = self.index_of(path_id)?;
        let next = self.paths[index].add_operation();
        let id = next
            .operations
            .last()
            .map(|op| op.id.clone())
            .unwrap_or_default();
        self.paths[index] = next;
        Ok(id)
    }

    pub fn delete_operation(&mut self, path_id: &str, operation_id: &str) -> Result<Operation> {
        let removed = self.edit_operation(path_id, operation_id)?;
        self.replace(path_id, |p| p.delete_operation(operation_id))?;
        Ok(removed)
    }

    /// Returns a working copy of an operation for editing
    pub fn edit_operation(&self, path_id: &str, operation_id: &str) -> Result<Operation> {
        self.get(path_id)?.operation(operation_id).cloned()
    }

    /// Replaces the operation with the same id under `path_id`
    pub fn save_operation(&mut self, path_id: &str, operation: Operation) -> Result<()> {
        self.replace(path_id, |p| p.save_operation(operation))
    }

    /// Methods used more than once per template, including across paths
    /// sharing a template
    pub fn duplicate_methods(&self) -> Vec<DuplicateMethod> {
        let mut counts: BTreeMap<(&str, HttpMethod), usize> = BTreeMap::new();
        for (path, op) in self.operations() {
            *counts.entry((path.path.as_str(), op.method)).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((path, method), count)| DuplicateMethod {
                path: path.to_string(),
                method,
                count,
            })
            .collect()
    }

    pub fn dangling_security(&self, registry: &SecuritySchemeRegistry) -> Vec<DanglingSecurity> {
        self.operations()
            .flat_map(|(path, op)| {
                op.dangling_security(registry)
                    .into_iter()
                    .map(move |scheme| DanglingSecurity {
                        path_id: path.id.clone(),
                        operation_id: op.id.clone(),
                        scheme: scheme.clone(),
                    })
            })
            .collect()
    }

    /// Drops unresolvable security references; returns how many were removed
    pub fn retain_security(&mut self, registry: &SecuritySchemeRegistry) -> usize {
        let removed = self.dangling_security(registry).len();
        if removed > 0 {
            self.paths = self
                .paths
                .iter()
                .map(|p| p.map_operations(|op| op.retain_security(registry)))
                .collect();
        }
        removed
    }

    /// Rewrites a tag name in every operation; returns how many changed
    pub fn rename_tag(&mut self, from: &str, to: &str) -> usize {
        let changed = self
            .operations()
            .filter(|(_, op)| op.tags.iter().any(|t| t == from))
            .count();
        if changed > 0 {
            self.paths = self
                .paths
                .iter()
                .map(|p| p.map_operations(|op| op.rename_tag(from, to)))
                .collect();
        }
        changed
    }

    /// Renders the `paths` object.
    ///
    /// Paths sharing a template are merged into one path item. A method
    /// repeated under one template keeps its last operation; other path
    /// item keys keep their first value.
    pub fn to_openapi(&self) -> Value {
        let mut out: Map<String, Value> = Map::new();
        for path in &self.paths {
            let item = out
                .entry(path.path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(item) = item.as_object_mut() else {
                continue;
            };
            for op in &path.operations {
                let key = op.method.path_item_key();
                if item.contains_key(key) {
                    log::warn!("{} {}: duplicate method, last one wins", op.method, path.path);
                }
                item.insert(key.to_string(), op.to_openapi());
            }
            for (key, value) in &path.extra {
                if !item.contains_key(key) {
                    item.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Object(out)
    }

    /// Reads an OpenAPI `paths` object.
    ///
    /// Only lower-case method keys become operations. Every other path
    /// item key (`parameters`, `servers`, `summary`, `GET`, ...) is kept
    /// on the path as written.
    pub fn from_openapi(value: &Value, registry: &SecuritySchemeRegistry) -> PathCollection {
        let Some(paths) = value.as_object() else {
            log::warn!("paths is not a mapping, importing no paths");
            return PathCollection::new();
        };

        let paths = paths
            .iter()
            .map(|(template, item)| {
                let mut path = Path::new(template.clone(), Vec::new());
                for (key, value) in item.as_object().into_iter().flatten() {
                    match HttpMethod::from_path_item_key(key) {
                        Some(method) => path
                            .operations
                            .push(Operation::from_openapi(method, value, registry)),
                        None => {
                            log::debug!("{template}: keeping path item key '{key}' as is");
                            path.extra.insert(key.clone(), value.clone());
                        }
                    }
                }
                path
            })
            .collect();
        PathCollection { paths }
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.paths
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::PathNotFound(id.to_string()))
    }

    fn replace<F>(&mut self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<Path>,
    {
        let index = self.index_of(id)?;
        let next = f(&self.paths[index])?;
        self.paths[index] = next;
        Ok(())
    }
}

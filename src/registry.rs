//! Named collections of spec documents.
//!
//! A [`ProfileRegistry`] maps lowercased profile names to parsed documents.
//! Documents are shared as `Arc<SpecDocument>`: lookups clone the handle
//! under the read lock and release it immediately, so resolution and
//! validation never hold the lock.

use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{Operation, Path, SpecDocument};
use crate::error::{LoadError, SpecParseError};
use crate::loader::{find_profile_source, load_document};
use crate::parser::parse_str;
use crate::resolver::{self, profile_from_path, RequestPath};
use crate::types::Method;
use crate::validator;

/// Directory searched after the configured ones.
pub const DEFAULT_FALLBACK_DIR: &str = "api";

/// Where [`ProfileRegistry::load_profile_spec`] looks for profile documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Searched in order, before the fallback.
    pub search_dirs: Vec<PathBuf>,
    pub fallback_dir: Option<PathBuf>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            fallback_dir: Some(PathBuf::from(DEFAULT_FALLBACK_DIR)),
        }
    }
}

impl RegistryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback_dir = None;
        self
    }

    /// All directories to scan, in order.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .cloned()
            .chain(self.fallback_dir.clone())
            .collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Thread-safe profile name -> document map.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    specs: RwLock<HashMap<String, Arc<SpecDocument>>>,
    options: RegistryOptions,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            specs: RwLock::new(HashMap::new()),
            options,
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Parse `source` and register it under `name`, replacing any previous
    /// document for that name.
    ///
    /// # Errors
    ///
    /// Returns the parse error unchanged; the registry is not modified.
    pub fn add_profile_spec(&self, name: &str, source: &str) -> Result<(), SpecParseError> {
        let document = parse_str(source)?;
        self.add_profile_document(name, document);
        Ok(())
    }

    /// Register an already-built document under `name`.
    pub fn add_profile_document(&self, name: &str, document: SpecDocument) -> Arc<SpecDocument> {
        let name = normalize_name(name);
        let document = Arc::new(document);
        let replaced = self
            .specs
            .write()
            .insert(name.clone(), Arc::clone(&document))
            .is_some();
        debug!(profile = %name, replaced, "registered profile spec");
        document
    }

    /// Discover the document for `name` in the configured directories,
    /// load it, and register it.
    ///
    /// # Errors
    ///
    /// `LoadError::ProfileNotFound` when no candidate file matches; read
    /// and parse failures otherwise. The registry is not modified on error.
    pub fn load_profile_spec(&self, name: &str) -> Result<Arc<SpecDocument>, LoadError> {
        let source = find_profile_source(&self.options.candidate_dirs(), name)?;
        self.load_profile_spec_from(name, &source)
    }

    /// Load the document at `path` and register it under `name`.
    ///
    /// # Errors
    ///
    /// Read and parse failures; the registry is not modified on error.
    pub fn load_profile_spec_from(
        &self,
        name: &str,
        path: &FsPath,
    ) -> Result<Arc<SpecDocument>, LoadError> {
        let document = load_document(path)?;
        Ok(self.add_profile_document(name, document))
    }

    pub fn remove_profile_spec(&self, name: &str) -> Option<Arc<SpecDocument>> {
        let name = normalize_name(name);
        let removed = self.specs.write().remove(&name);
        if removed.is_some() {
            debug!(profile = %name, "removed profile spec");
        }
        removed
    }

    pub fn find_profile_spec(&self, name: &str) -> Option<Arc<SpecDocument>> {
        self.specs.read().get(&normalize_name(name)).cloned()
    }

    /// Snapshot of every registered document.
    pub fn profile_specs(&self) -> HashMap<String, Arc<SpecDocument>> {
        self.specs.read().clone()
    }

    /// Registered names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.specs.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.read().contains_key(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.specs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.read().is_empty()
    }

    /// Document for an explicit profile hint, or for the profile segment of
    /// `path`.
    fn document_for(&self, path: &str, profile_hint: Option<&str>) -> Option<Arc<SpecDocument>> {
        let profile = profile_hint.or_else(|| profile_from_path(path))?;
        let document = self.find_profile_spec(profile);
        if document.is_none() {
            debug!(profile, path, "no profile spec registered");
        }
        document
    }

    /// Path item declared for `path` in the profile it names.
    pub fn find_path(&self, path: &str) -> Option<Path> {
        let document = self.document_for(path, None)?;
        resolver::find_path(&document, path).cloned()
    }

    /// Operation declared for `method` on `path`, using the profile segment
    /// of `path` to pick the document.
    pub fn find_operation(&self, method: Method, path: &str) -> Option<Arc<Operation>> {
        self.resolve(method, path, None)
    }

    pub fn find_operation_for(
        &self,
        method: Method,
        request: &RequestPath,
    ) -> Option<Arc<Operation>> {
        self.resolve(method, &request.to_path(), Some(&request.profile))
    }

    /// Resolve `method` + `path`. The document is chosen by `profile_hint`
    /// when given, otherwise by the path's profile segment. No match is
    /// `None`, never an error.
    pub fn resolve(
        &self,
        method: Method,
        path: &str,
        profile_hint: Option<&str>,
    ) -> Option<Arc<Operation>> {
        let document = self.document_for(path, profile_hint)?;
        let operation = resolver::find_shared_operation(&document, method, path);
        if operation.is_none() {
            debug!(%method, path, "no operation declared");
        }
        operation
    }

    /// Validate a request's parameter values against the declared operation.
    /// `profile_hint` picks the document the same way it does for
    /// [`resolve`](Self::resolve). Requests for unknown profiles or
    /// undeclared operations are valid.
    pub fn validate_request(
        &self,
        method: Method,
        path: &str,
        profile_hint: Option<&str>,
        values: &Map<String, Value>,
    ) -> bool {
        match self.document_for(path, profile_hint) {
            Some(document) => validator::validate_request(&document, method, path, values),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ECHO_A: &str = r#"{
        "basePath": "/gotapi/echo",
        "paths": { "/": { "get": { "parameters": [
            { "name": "message", "in": "query", "type": "string", "required": true }
        ] } } }
    }"#;

    const ECHO_B: &str = r#"{
        "basePath": "/gotapi/echo",
        "paths": { "/reverse": { "post": { "parameters": [] } } }
    }"#;

    #[test]
    fn names_are_case_insensitive() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("Echo", ECHO_A).unwrap();

        assert!(registry.contains("ECHO"));
        assert!(registry.find_profile_spec("echo").is_some());
        assert_eq!(registry.profile_names(), vec!["echo"]);
    }

    #[test]
    fn later_add_replaces_whole_document() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();
        registry.add_profile_spec("echo", ECHO_B).unwrap();

        let doc = registry.find_profile_spec("echo").unwrap();
        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["/reverse"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_add_leaves_previous_entry() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();

        let err = registry.add_profile_spec("echo", r#"{"swagger": "2.0"}"#);
        assert!(matches!(err, Err(SpecParseError::MissingPaths)));
        assert!(registry.find_profile_spec("echo").unwrap().paths.contains_key("/"));
    }

    #[test]
    fn remove_returns_document() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();

        assert!(registry.remove_profile_spec("ECHO").is_some());
        assert!(registry.remove_profile_spec("echo").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();

        let snapshot = registry.profile_specs();
        registry.remove_profile_spec("echo");
        assert!(snapshot.contains_key("echo"));
        assert!(registry.profile_specs().is_empty());
    }

    #[test]
    fn resolve_uses_profile_segment_or_hint() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();

        assert!(registry.find_operation(Method::Get, "/gotapi/echo").is_some());
        assert!(registry.resolve(Method::Get, "/gotapi/echo/", Some("ECHO")).is_some());
        assert!(registry.find_operation(Method::Post, "/gotapi/echo").is_none());
        assert!(registry.find_operation(Method::Get, "/gotapi/other").is_none());
        assert!(registry
            .find_operation_for(Method::Get, &RequestPath::new("echo"))
            .is_some());
        assert!(registry.find_path("/gotapi/echo").is_some());
    }

    #[test]
    fn validate_request_is_permissive_when_unresolved() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("echo", ECHO_A).unwrap();

        let empty = Map::new();
        assert!(!registry.validate_request(Method::Get, "/gotapi/echo", None, &empty));
        assert!(registry.validate_request(Method::Delete, "/gotapi/echo", None, &empty));
        assert!(registry.validate_request(Method::Get, "/gotapi/unknown", None, &empty));

        let mut values = Map::new();
        values.insert("message".into(), json!("hello"));
        assert!(registry.validate_request(Method::Get, "/gotapi/echo", None, &values));
    }

    #[test]
    fn validate_request_honors_profile_hint() {
        let registry = ProfileRegistry::new();
        registry.add_profile_spec("legacy-echo", ECHO_A).unwrap();

        let empty = Map::new();
        // the path segment names no registered profile
        assert!(registry.validate_request(Method::Get, "/gotapi/echo", None, &empty));
        assert!(!registry.validate_request(Method::Get, "/gotapi/echo", Some("Legacy-Echo"), &empty));

        let mut values = Map::new();
        values.insert("message".into(), json!("hello"));
        assert!(registry.validate_request(Method::Get, "/gotapi/echo", Some("legacy-echo"), &values));
    }

    #[test]
    fn options_candidate_dirs() {
        let options = RegistryOptions::new().with_search_dir("specs");
        assert_eq!(
            options.candidate_dirs(),
            vec![PathBuf::from("specs"), PathBuf::from("api")]
        );
        assert_eq!(
            options.without_fallback().candidate_dirs(),
            vec![PathBuf::from("specs")]
        );
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProfileRegistry>();
    }
}

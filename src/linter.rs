//! Spec document linting - static analysis of profile definition files.
//!
//! Checks spec files for:
//! - JSON syntax errors
//! - Broken $ref references (file not found, anchor not found)
//! - Structural violations of the supported Swagger subset
//! - Documents the parser rejects
//! - Unknown `type`/`format`/`collectionFormat`/`x-type` names, missing
//!   `info`, and operations without `x-type` (warnings)

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::loader::{load_json, navigate_fragment, SPEC_FILE_EXTENSION};
use crate::parser;
use crate::types::{CollectionFormat, DataFormat, DataType, Method, OperationType};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON path to the issue (e.g., "/paths/~1level/get/parameters/0")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
/// Returns aggregated results for all files.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_spec_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += count(&file_result, Severity::Error);
        total_warnings += count(&file_result, Severity::Warning);
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

fn count(result: &FileResult, severity: Severity) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}

/// Collects diagnostics for one file.
struct Reporter<'a> {
    file: &'a Path,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    fn new(file: &'a Path) -> Self {
        Self {
            file,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            message,
        });
    }

    fn error(&mut self, code: &str, path: &str, message: String) {
        self.push(Severity::Error, code, path, message);
    }

    fn warning(&mut self, code: &str, path: &str, message: String) {
        self.push(Severity::Warning, code, path, message);
    }

    fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    fn finish(self, base_path: &Path) -> FileResult {
        let has_warnings = self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning);
        let status = if self.has_errors() {
            FileStatus::Error
        } else if has_warnings {
            FileStatus::Warning
        } else {
            FileStatus::Ok
        };

        FileResult {
            file: self
                .file
                .strip_prefix(base_path)
                .unwrap_or(self.file)
                .to_path_buf(),
            status,
            diagnostics: self.diagnostics,
        }
    }
}

/// Lint a single spec file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let mut reporter = Reporter::new(file);

    // Try to load the file (checks syntax)
    let document = match load_json(file) {
        Ok(d) => d,
        Err(e) => {
            reporter.error("E001", "", format!("syntax error: {}", e));
            return reporter.finish(base_path);
        }
    };

    let file_dir = file.parent().unwrap_or(Path::new("."));
    check_refs(&document, file_dir, "", &document, &mut reporter);

    check_structure(&document, &mut reporter);

    // Parser errors only once the structure is sound.
    if !reporter.has_errors() {
        if let Err(e) = parser::parse(&document) {
            reporter.error("E005", e.path().unwrap_or(""), format!("spec rejected: {}", e));
        }
    }

    check_names(&document, &mut reporter);
    check_info(&document, &mut reporter);
    check_operation_types(&document, &mut reporter);

    reporter.finish(base_path)
}

/// Recursively check $ref values in a document.
fn check_refs(value: &Value, file_dir: &Path, path: &str, root: &Value, reporter: &mut Reporter) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_val)) = map.get("$ref") {
                check_single_ref(ref_val, file_dir, path, root, reporter);
            }

            for (key, val) in map {
                let child_path = format!("{}/{}", path, escape(key));
                check_refs(val, file_dir, &child_path, root, reporter);
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                let child_path = format!("{}/{}", path, i);
                check_refs(item, file_dir, &child_path, root, reporter);
            }
        }
        _ => {}
    }
}

/// Check a single $ref value.
fn check_single_ref(
    ref_val: &str,
    file_dir: &Path,
    path: &str,
    root: &Value,
    reporter: &mut Reporter,
) {
    // External URLs can't be validated locally - skip silently
    if ref_val.starts_with("http://") || ref_val.starts_with("https://") {
        return;
    }

    if ref_val.starts_with('#') {
        if navigate_fragment(root, ref_val).is_none() {
            reporter.error("E003", path, format!("anchor not found: {}", ref_val));
        }
        return;
    }

    // File reference (possibly with anchor)
    let (file_part, fragment) = match ref_val.find('#') {
        Some(idx) => (&ref_val[..idx], Some(&ref_val[idx..])),
        None => (ref_val, None),
    };

    let ref_path = file_dir.join(file_part);
    if !ref_path.exists() {
        reporter.error("E002", path, format!("file not found: {}", file_part));
        return;
    }

    if let Some(frag) = fragment {
        // An unreadable target is reported when that file itself is linted
        if let Ok(target) = load_json(&ref_path) {
            if navigate_fragment(&target, frag).is_none() {
                reporter.error(
                    "E003",
                    path,
                    format!("anchor not found in {}: {}", file_part, frag),
                );
            }
        }
    }
}

/// Validate the document's shape against the supported Swagger subset.
fn check_structure(document: &Value, reporter: &mut Reporter) {
    let schema = structure_schema();
    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            reporter.error("E004", "", format!("structure check unavailable: {}", e));
            return;
        }
    };

    for error in validator.iter_errors(document) {
        reporter.error(
            "E004",
            &error.instance_path.to_string(),
            format!("structure violation: {}", error),
        );
    }
}

/// JSON Schema for the Swagger 2.0 subset the parser understands.
fn structure_schema() -> Value {
    let methods: Map<String, Value> = Method::ALL
        .iter()
        .map(|m| (m.as_str().to_string(), json!({ "$ref": "#/definitions/operation" })))
        .collect();
    let mut path_item = methods;
    path_item.insert(
        "parameters".to_string(),
        json!({ "$ref": "#/definitions/parameterList" }),
    );

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["paths"],
        "properties": {
            "swagger": { "const": "2.0" },
            "info": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "version": { "type": "string" },
                    "description": { "type": "string" }
                }
            },
            "host": { "type": "string" },
            "basePath": { "type": "string", "pattern": "^/" },
            "schemes": { "$ref": "#/definitions/stringList" },
            "consumes": { "$ref": "#/definitions/stringList" },
            "produces": { "$ref": "#/definitions/stringList" },
            "paths": {
                "type": "object",
                "patternProperties": {
                    "^/": { "type": "object", "properties": path_item }
                }
            },
            "definitions": {
                "type": "object",
                "additionalProperties": { "$ref": "#/definitions/schema" }
            },
            "parameters": {
                "type": "object",
                "additionalProperties": { "$ref": "#/definitions/parameter" }
            },
            "tags": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": { "name": { "type": "string" } }
                }
            }
        },
        "definitions": {
            "stringList": { "type": "array", "items": { "type": "string" } },
            "count": { "type": "integer", "minimum": 0 },
            "operation": {
                "type": "object",
                "properties": {
                    "tags": { "$ref": "#/definitions/stringList" },
                    "summary": { "type": "string" },
                    "description": { "type": "string" },
                    "operationId": { "type": "string" },
                    "consumes": { "$ref": "#/definitions/stringList" },
                    "produces": { "$ref": "#/definitions/stringList" },
                    "parameters": { "$ref": "#/definitions/parameterList" },
                    "responses": {
                        "type": "object",
                        "patternProperties": {
                            "^([0-9]+|default)$": { "$ref": "#/definitions/response" }
                        }
                    },
                    "deprecated": { "type": "boolean" },
                    "x-type": { "type": "string" },
                    "x-event": {
                        "type": "object",
                        "properties": {
                            "description": { "type": "string" },
                            "schema": { "$ref": "#/definitions/schema" }
                        }
                    }
                }
            },
            "response": {
                "type": "object",
                "properties": {
                    "description": { "type": "string" },
                    "schema": { "$ref": "#/definitions/schema" },
                    "headers": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/definitions/constraints" }
                    }
                }
            },
            "parameterList": {
                "type": "array",
                "items": { "$ref": "#/definitions/parameter" }
            },
            "parameter": {
                "type": "object",
                "required": ["name", "in"],
                "allOf": [{ "$ref": "#/definitions/constraints" }],
                "properties": {
                    "name": { "type": "string" },
                    "in": { "enum": ["query", "header", "path", "formData", "body"] },
                    "required": { "type": "boolean" },
                    "description": { "type": "string" },
                    "schema": { "$ref": "#/definitions/schema" }
                }
            },
            "schema": {
                "type": "object",
                "allOf": [{ "$ref": "#/definitions/constraints" }],
                "properties": {
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "required": { "$ref": "#/definitions/stringList" },
                    "maxProperties": { "$ref": "#/definitions/count" },
                    "minProperties": { "$ref": "#/definitions/count" },
                    "properties": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/definitions/schema" }
                    },
                    "additionalProperties": { "type": ["boolean", "object"] },
                    "allOf": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/schema" }
                    }
                }
            },
            "constraints": {
                "type": "object",
                "properties": {
                    "type": { "type": "string" },
                    "format": { "type": "string" },
                    "maximum": { "type": "number" },
                    "exclusiveMaximum": { "type": "boolean" },
                    "minimum": { "type": "number" },
                    "exclusiveMinimum": { "type": "boolean" },
                    "maxLength": { "$ref": "#/definitions/count" },
                    "minLength": { "$ref": "#/definitions/count" },
                    "pattern": { "type": "string" },
                    "items": { "$ref": "#/definitions/schema" },
                    "collectionFormat": { "type": "string" },
                    "maxItems": { "$ref": "#/definitions/count" },
                    "minItems": { "$ref": "#/definitions/count" },
                    "uniqueItems": { "type": "boolean" },
                    "enum": { "type": "array" },
                    "multipleOf": { "type": "number" },
                    "allowEmptyValue": { "type": "boolean" }
                }
            }
        }
    })
}

/// Warn about names the parser tolerates but ignores.
fn check_names(document: &Value, reporter: &mut Reporter) {
    for (path, node) in constraint_nodes(document) {
        let Some(obj) = node.as_object() else {
            continue;
        };
        if let Some(name) = obj.get("type").and_then(Value::as_str) {
            if DataType::parse(name).is_none() {
                reporter.warning("W001", &path, format!("unknown type \"{}\"", name));
            }
        }
        if let Some(name) = obj.get("format").and_then(Value::as_str) {
            if DataFormat::parse(name).is_none() {
                reporter.warning("W001", &path, format!("unknown format \"{}\"", name));
            }
        }
        if let Some(name) = obj.get("collectionFormat").and_then(Value::as_str) {
            if CollectionFormat::parse(name).is_none() {
                reporter.warning(
                    "W001",
                    &path,
                    format!("unknown collectionFormat \"{}\"", name),
                );
            }
        }
    }

    for (path, operation) in operations(document) {
        if let Some(name) = operation.get("x-type").and_then(Value::as_str) {
            if OperationType::parse(name).is_none() {
                reporter.warning(
                    "W001",
                    &format!("{}/x-type", path),
                    format!(
                        "unknown x-type \"{}\": expected one-shot, event, or streaming",
                        name
                    ),
                );
            }
        }
    }
}

fn check_info(document: &Value, reporter: &mut Reporter) {
    let info = document.get("info").and_then(Value::as_object);
    let has_title = info.is_some_and(|i| i.get("title").is_some_and(Value::is_string));
    let has_version = info.is_some_and(|i| i.get("version").is_some_and(Value::is_string));
    if !has_title || !has_version {
        reporter.warning(
            "W002",
            "/info",
            "spec missing info.title or info.version".to_string(),
        );
    }
}

fn check_operation_types(document: &Value, reporter: &mut Reporter) {
    for (path, operation) in operations(document) {
        if operation.get("x-type").is_none() {
            reporter.warning("W003", &path, "operation missing x-type".to_string());
        }
    }
}

/// Every method object under `paths`, with its JSON pointer.
fn operations(document: &Value) -> Vec<(String, &Map<String, Value>)> {
    let mut found = Vec::new();
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return found;
    };
    for (key, item) in paths {
        if !key.starts_with('/') {
            continue;
        }
        let Some(item) = item.as_object() else {
            continue;
        };
        for (name, op) in item {
            if Method::parse(name).is_none() {
                continue;
            }
            if let Some(op) = op.as_object() {
                found.push((format!("/paths/{}/{}", escape(key), escape(name)), op));
            }
        }
    }
    found
}

/// Every parameter, header and schema node in the document, with its JSON
/// pointer.
fn constraint_nodes(document: &Value) -> Vec<(String, &Value)> {
    let mut nodes = Vec::new();

    if let Some(defs) = document.get("definitions").and_then(Value::as_object) {
        for (name, schema) in defs {
            collect_schema(schema, format!("/definitions/{}", escape(name)), &mut nodes);
        }
    }
    if let Some(params) = document.get("parameters").and_then(Value::as_object) {
        for (name, param) in params {
            collect_schema(param, format!("/parameters/{}", escape(name)), &mut nodes);
        }
    }

    if let Some(paths) = document.get("paths").and_then(Value::as_object) {
        for (key, item) in paths {
            let item_path = format!("/paths/{}", escape(key));
            collect_list(item.get("parameters"), &format!("{}/parameters", item_path), &mut nodes);
        }
    }

    for (path, operation) in operations(document) {
        collect_list(operation.get("parameters"), &format!("{}/parameters", path), &mut nodes);

        if let Some(responses) = operation.get("responses").and_then(Value::as_object) {
            for (status, response) in responses {
                let response_path = format!("{}/responses/{}", path, escape(status));
                if let Some(schema) = response.get("schema") {
                    collect_schema(schema, format!("{}/schema", response_path), &mut nodes);
                }
                if let Some(headers) = response.get("headers").and_then(Value::as_object) {
                    for (name, header) in headers {
                        collect_schema(
                            header,
                            format!("{}/headers/{}", response_path, escape(name)),
                            &mut nodes,
                        );
                    }
                }
            }
        }
        if let Some(schema) = operation.get("x-event").and_then(|e| e.get("schema")) {
            collect_schema(schema, format!("{}/x-event/schema", path), &mut nodes);
        }
    }
    nodes
}

fn collect_list<'a>(list: Option<&'a Value>, path: &str, nodes: &mut Vec<(String, &'a Value)>) {
    if let Some(Value::Array(items)) = list {
        for (i, item) in items.iter().enumerate() {
            collect_schema(item, format!("{}/{}", path, i), nodes);
        }
    }
}

/// Add `node` and every schema nested under it.
fn collect_schema<'a>(node: &'a Value, path: String, nodes: &mut Vec<(String, &'a Value)>) {
    let Some(obj) = node.as_object() else {
        return;
    };
    for key in ["items", "schema", "additionalProperties"] {
        if let Some(child @ Value::Object(_)) = obj.get(key) {
            collect_schema(child, format!("{}/{}", path, key), nodes);
        }
    }
    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, child) in props {
            collect_schema(child, format!("{}/properties/{}", path, escape(name)), nodes);
        }
    }
    if let Some(Value::Array(all_of)) = obj.get("allOf") {
        for (i, child) in all_of.iter().enumerate() {
            collect_schema(child, format!("{}/allOf/{}", path, i), nodes);
        }
    }
    nodes.push((path, node));
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Collect all .json files in a path (file or directory).
fn collect_spec_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_spec_file(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn is_spec_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == SPEC_FILE_EXTENSION)
        .unwrap_or(false)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_spec_file(&path) {
            files.push(path);
        }
    }
}

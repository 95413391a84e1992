//! Profile Spec
//!
//! Declarative API specification model and request validation for device
//! profiles.
//!
//! A profile (battery, light, vibration, ...) is described by a Swagger 2.0
//! style JSON document. This library parses those documents into a typed
//! model, resolves an incoming method + path to the declared operation, and
//! checks request parameter values against the declared types and
//! constraints.
//!
//! # Example
//!
//! ```
//! use profile_spec::{validate, Method, ProfileRegistry};
//! use serde_json::json;
//!
//! let registry = ProfileRegistry::new();
//! registry
//!     .add_profile_spec(
//!         "battery",
//!         r#"{
//!             "basePath": "/gotapi/battery",
//!             "paths": {
//!                 "/level": {
//!                     "get": {
//!                         "parameters": [
//!                             { "name": "serviceId", "in": "query", "required": true, "type": "string" },
//!                             { "name": "precision", "in": "query", "type": "integer", "minimum": 0, "maximum": 3 }
//!                         ]
//!                     }
//!                 }
//!             }
//!         }"#,
//!     )
//!     .unwrap();
//!
//! let op = registry
//!     .find_operation(Method::Get, "/gotapi/battery/level")
//!     .unwrap();
//! let precision = op.parameter("precision").unwrap();
//!
//! assert!(validate(precision, Some(&json!("2"))));
//! assert!(!validate(precision, Some(&json!(4))));
//! ```
//!
//! # Validation Rules
//!
//! | Type | Accepted values | Constraints |
//! |------|-----------------|-------------|
//! | `integer` | integers, numeric strings | `enum`, else `minimum`/`maximum`, `multipleOf` |
//! | `number` | numbers, numeric strings | `enum`, else `minimum`/`maximum` |
//! | `string` | strings | `enum`, else `pattern` and format (`text` lengths are exclusive, `rgb`) |
//! | `boolean` | booleans, `"true"`/`"false"` in any case | `enum` |
//! | `array` | arrays, delimited strings | item count, uniqueness, each item against `items` |
//! | `file`, `object`, untyped | anything | none |
//!
//! Requests that resolve to no declared operation are not constrained.

mod document;
mod error;
mod linter;
mod loader;
mod parameter;
mod parser;
mod registry;
mod resolver;
mod schema;
mod types;
mod validator;

pub use document::{
    Contact, EventDescriptor, ExternalDocs, Info, License, Operation, Path, Response,
    SecurityRequirement, SecurityScheme, SpecDocument, Tag,
};
pub use error::{LoadError, SpecParseError};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{
    find_profile_source, is_url, load_document, load_document_auto, load_document_str, load_json,
    navigate_fragment,
};
pub use parameter::{Parameter, ParameterKind};
pub use parser::{parse, parse_str};
pub use registry::{ProfileRegistry, RegistryOptions, DEFAULT_FALLBACK_DIR};
pub use resolver::{
    find_operation, find_path, find_shared_operation, normalize_path, profile_from_path,
    RequestPath, DEFAULT_API,
};
pub use schema::{AdditionalProperties, EnumValues, Header, Pattern, Property, Schema};
pub use types::{
    CollectionFormat, DataFormat, DataType, Method, OperationType, ParameterLocation,
    SUPPORTED_SWAGGER_VERSION,
};
pub use validator::{
    check_request, invalid_parameters, validate, validate_operation, validate_parameter,
    validate_request, Node, RequestVerdict,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;

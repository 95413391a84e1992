//! Core enumerations shared by the document model, parser and validator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Swagger version accepted by the parser.
pub const SUPPORTED_SWAGGER_VERSION: &str = "2.0";

/// Prefix marking vendor extension keys.
pub const VENDOR_EXTENSION_PREFIX: &str = "x-";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Value type declared by a parameter or schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Number,
    String,
    Boolean,
    Array,
    File,
    /// Only meaningful for body schemas.
    Object,
}

impl DataType {
    /// Parse a `type` value. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "integer" => Some(DataType::Integer),
            "number" => Some(DataType::Number),
            "string" => Some(DataType::String),
            "boolean" => Some(DataType::Boolean),
            "array" => Some(DataType::Array),
            "file" => Some(DataType::File),
            "object" => Some(DataType::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::String => "string",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::File => "file",
            DataType::Object => "object",
        }
    }

    /// Format assumed when a node of this type declares none.
    pub fn default_format(&self) -> Option<DataFormat> {
        match self {
            DataType::Integer => Some(DataFormat::Int32),
            DataType::Number => Some(DataFormat::Float),
            DataType::String => Some(DataFormat::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refinement of a [`DataType`] given by the `format` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataFormat {
    Int32,
    Int64,
    Float,
    Double,
    Text,
    Byte,
    Binary,
    Date,
    DateTime,
    Password,
    Rgb,
}

impl DataFormat {
    /// Parse a `format` value. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "int32" => Some(DataFormat::Int32),
            "int64" => Some(DataFormat::Int64),
            "float" => Some(DataFormat::Float),
            "double" => Some(DataFormat::Double),
            "text" => Some(DataFormat::Text),
            "byte" => Some(DataFormat::Byte),
            "binary" => Some(DataFormat::Binary),
            "date" => Some(DataFormat::Date),
            "date-time" => Some(DataFormat::DateTime),
            "password" => Some(DataFormat::Password),
            "rgb" => Some(DataFormat::Rgb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Int32 => "int32",
            DataFormat::Int64 => "int64",
            DataFormat::Float => "float",
            DataFormat::Double => "double",
            DataFormat::Text => "text",
            DataFormat::Byte => "byte",
            DataFormat::Binary => "binary",
            DataFormat::Date => "date",
            DataFormat::DateTime => "date-time",
            DataFormat::Password => "password",
            DataFormat::Rgb => "rgb",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterLocation {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "body")]
    Body,
}

impl ParameterLocation {
    /// Parse an `in` value. Returns `None` for unknown locations.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "path" => Some(ParameterLocation::Path),
            "formData" => Some(ParameterLocation::FormData),
            "body" => Some(ParameterLocation::Body),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::FormData => "formData",
            ParameterLocation::Body => "body",
        }
    }
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Patch,
    Options,
}

impl Method {
    /// All methods, in the order path items list them.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Head,
        Method::Patch,
        Method::Options,
    ];

    /// Parse a method token, ignoring case (`GET`, `get`, `Get`).
    pub fn parse(s: &str) -> Option<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }

    /// Lowercase name, as used for path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Options => "options",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Value of the `x-type` vendor extension on an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationType {
    OneShot,
    Event,
    Streaming,
}

impl OperationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one-shot" => Some(OperationType::OneShot),
            "event" => Some(OperationType::Event),
            "streaming" => Some(OperationType::Streaming),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::OneShot => "one-shot",
            OperationType::Event => "event",
            OperationType::Streaming => "streaming",
        }
    }
}

/// Encoding of an array value inside a single string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }

    /// Token separator, or `None` for `multi` (repeated keys, not splittable).
    pub fn delimiter(&self) -> Option<char> {
        match self {
            CollectionFormat::Csv => Some(','),
            CollectionFormat::Ssv => Some(' '),
            CollectionFormat::Tsv => Some('\t'),
            CollectionFormat::Pipes => Some('|'),
            CollectionFormat::Multi => None,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == CollectionFormat::Csv
    }
}

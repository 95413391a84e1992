//! Turning a JSON document into a [`SpecDocument`].
//!
//! Only the Swagger 2.0 subset used by profile definitions is recognized.
//! Keys are matched exactly, except HTTP method names, which ignore case.
//! `null` values are treated as absent. Unknown `type`, `format` and
//! `collectionFormat` names are tolerated with a warning; structural
//! problems are reported as [`SpecParseError`] with a
//! JSON Pointer to the offending node.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::document::{
    Contact, EventDescriptor, ExternalDocs, Info, License, Operation, Path, Response,
    SecurityRequirement, SecurityScheme, SpecDocument, Tag,
};
use crate::error::SpecParseError;
use crate::parameter::{Parameter, ParameterKind};
use crate::schema::{AdditionalProperties, EnumValues, Header, Pattern, Property, Schema};
use crate::types::{
    json_type_name, CollectionFormat, DataFormat, DataType, Method, OperationType,
    ParameterLocation, SUPPORTED_SWAGGER_VERSION, VENDOR_EXTENSION_PREFIX,
};

type Result<T> = std::result::Result<T, SpecParseError>;

/// Parse a spec document from JSON text.
pub fn parse_str(source: &str) -> Result<SpecDocument> {
    let value: Value =
        serde_json::from_str(source).map_err(|source| SpecParseError::InvalidJson { source })?;
    parse(&value)
}

/// Parse a spec document from an already-decoded JSON value.
pub fn parse(document: &Value) -> Result<SpecDocument> {
    let obj = document.as_object().ok_or_else(|| SpecParseError::NotAnObject {
        actual: json_type_name(document).to_string(),
    })?;
    let path = "";

    let swagger = opt_string(obj, "swagger", path)?;
    if let Some(version) = &swagger {
        if version != SUPPORTED_SWAGGER_VERSION {
            return Err(SpecParseError::UnsupportedVersion {
                version: version.clone(),
            });
        }
    }

    let paths_value = field(obj, "paths").ok_or(SpecParseError::MissingPaths)?;
    let paths_path = child(path, "paths");
    let mut paths = IndexMap::new();
    for (key, item) in expect_object(paths_value, &paths_path)? {
        if key.starts_with('/') {
            if item.is_null() {
                continue;
            }
            paths.insert(key.clone(), parse_path(item, &child(&paths_path, key))?);
        } else if !is_extension(key) {
            warn!(key = %key, "ignoring path key that does not start with '/'");
        }
    }

    Ok(SpecDocument {
        swagger,
        info: field(obj, "info")
            .map(|v| parse_info(v, &child(path, "info")))
            .transpose()?,
        host: opt_string(obj, "host", path)?,
        base_path: opt_string(obj, "basePath", path)?,
        schemes: string_list(obj, "schemes", path)?,
        consumes: string_list(obj, "consumes", path)?,
        produces: string_list(obj, "produces", path)?,
        paths,
        definitions: named_map(obj, "definitions", path, parse_schema)?,
        parameters: named_map(obj, "parameters", path, parse_parameter)?,
        responses: named_map(obj, "responses", path, parse_response)?,
        security_definitions: named_map(obj, "securityDefinitions", path, parse_security_scheme)?,
        security: security_list(obj, path)?,
        tags: match field(obj, "tags") {
            Some(v) => {
                let tags_path = child(path, "tags");
                expect_array(v, &tags_path)?
                    .iter()
                    .enumerate()
                    .map(|(i, t)| parse_tag(t, &child(&tags_path, &i.to_string())))
                    .collect::<Result<Vec<_>>>()?
            }
            None => Vec::new(),
        },
        external_docs: opt_external_docs(obj, path)?,
        extensions: extensions(obj, &[]),
    })
}

fn parse_path(value: &Value, path: &str) -> Result<Path> {
    let obj = expect_object(value, path)?;
    let mut item = Path::new();

    for (key, v) in obj {
        if v.is_null() {
            continue;
        }
        match Method::parse(key) {
            Some(method) => {
                let op = parse_operation(v, &child(path, key))?;
                if item.operations.contains_key(&method) {
                    warn!(path = %path, key = %key, "method declared twice, keeping the later one");
                }
                item = item.with_operation(method, op);
            }
            None if key == "parameters" || is_extension(key) => {}
            None => warn!(path = %path, key = %key, "ignoring unknown path item key"),
        }
    }
    item.parameters = parameter_list(obj, path)?;
    item.extensions = extensions(obj, &[]);
    Ok(item)
}

fn parse_operation(value: &Value, path: &str) -> Result<Operation> {
    let obj = expect_object(value, path)?;

    let operation_type = match opt_string(obj, "x-type", path)? {
        Some(name) => {
            let parsed = OperationType::parse(&name);
            if parsed.is_none() {
                warn!(path = %path, value = %name, "unknown x-type, ignoring");
            }
            parsed
        }
        None => None,
    };

    let mut responses = IndexMap::new();
    if let Some(v) = field(obj, "responses") {
        let responses_path = child(path, "responses");
        for (status, response) in expect_object(v, &responses_path)? {
            if !is_response_key(status) || response.is_null() {
                continue;
            }
            responses.insert(
                status.clone(),
                parse_response(response, &child(&responses_path, status))?,
            );
        }
    }

    Ok(Operation {
        tags: string_list(obj, "tags", path)?,
        summary: opt_string(obj, "summary", path)?,
        description: opt_string(obj, "description", path)?,
        external_docs: opt_external_docs(obj, path)?,
        operation_id: opt_string(obj, "operationId", path)?,
        consumes: string_list(obj, "consumes", path)?,
        produces: string_list(obj, "produces", path)?,
        parameters: parameter_list(obj, path)?,
        responses,
        schemes: string_list(obj, "schemes", path)?,
        deprecated: opt_bool(obj, "deprecated", path)?.unwrap_or(false),
        security: security_list(obj, path)?,
        event: field(obj, "x-event")
            .map(|v| parse_event(v, &child(path, "x-event")))
            .transpose()?,
        operation_type,
        extensions: extensions(obj, &["x-event", "x-type"]),
    })
}

fn is_response_key(key: &str) -> bool {
    key == "default" || (!key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_event(value: &Value, path: &str) -> Result<EventDescriptor> {
    let obj = expect_object(value, path)?;
    Ok(EventDescriptor {
        description: opt_string(obj, "description", path)?,
        schema: opt_schema(obj, "schema", path)?,
        examples: examples(obj, path)?,
        extensions: extensions(obj, &[]),
    })
}

fn parameter_list(obj: &Map<String, Value>, path: &str) -> Result<Vec<Parameter>> {
    let Some(value) = field(obj, "parameters") else {
        return Ok(Vec::new());
    };
    let list_path = child(path, "parameters");
    expect_array(value, &list_path)?
        .iter()
        .enumerate()
        .map(|(i, p)| parse_parameter(p, &child(&list_path, &i.to_string())))
        .collect()
}

fn parse_parameter(value: &Value, path: &str) -> Result<Parameter> {
    let obj = expect_object(value, path)?;

    let location_name = opt_string(obj, "in", path)?.ok_or_else(|| SpecParseError::MissingField {
        path: path.to_string(),
        field: "in",
    })?;
    let location =
        ParameterLocation::parse(&location_name).ok_or_else(|| SpecParseError::UnknownLocation {
            path: child(path, "in"),
            value: location_name.clone(),
        })?;
    let name = opt_string(obj, "name", path)?.ok_or_else(|| SpecParseError::MissingField {
        path: path.to_string(),
        field: "name",
    })?;

    let kind = match location {
        ParameterLocation::Body => ParameterKind::Body {
            schema: opt_schema(obj, "schema", path)?,
        },
        _ => {
            let property = parse_property(obj, path)?;
            require_items(&property, path)?;
            ParameterKind::Value(property)
        }
    };

    Ok(Parameter {
        name,
        location,
        description: opt_string(obj, "description", path)?,
        required: opt_bool(obj, "required", path)?.unwrap_or(false),
        kind,
        extensions: extensions(obj, &[]),
    })
}

fn require_items(property: &Property, path: &str) -> Result<()> {
    if property.data_type == Some(DataType::Array) && property.items.is_none() {
        return Err(SpecParseError::MissingField {
            path: path.to_string(),
            field: "items",
        });
    }
    Ok(())
}

/// Read the constraint fields shared by parameters, headers and schemas.
fn parse_property(obj: &Map<String, Value>, path: &str) -> Result<Property> {
    let data_type = match opt_string(obj, "type", path)? {
        Some(name) => {
            let parsed = DataType::parse(&name);
            if parsed.is_none() {
                warn!(path = %path, value = %name, "unknown type, treating as untyped");
            }
            parsed
        }
        None => None,
    };
    let format = match opt_string(obj, "format", path)? {
        Some(name) => {
            let parsed = DataFormat::parse(&name);
            if parsed.is_none() {
                warn!(path = %path, value = %name, "unknown format, ignoring");
            }
            parsed
        }
        None => None,
    };
    let collection_format = match opt_string(obj, "collectionFormat", path)? {
        Some(name) => CollectionFormat::parse(&name).unwrap_or_else(|| {
            warn!(path = %path, value = %name, "unknown collectionFormat, using csv");
            CollectionFormat::Csv
        }),
        None => CollectionFormat::Csv,
    };
    let pattern = match opt_string(obj, "pattern", path)? {
        Some(source) => Some(Pattern::new(&source).map_err(|source| {
            SpecParseError::InvalidPattern {
                path: child(path, "pattern"),
                source,
            }
        })?),
        None => None,
    };
    let enum_values = match field(obj, "enum") {
        Some(v) => {
            let enum_path = child(path, "enum");
            let entries = expect_array(v, &enum_path)?;
            Some(parse_enum(entries, data_type, format, &enum_path)?)
        }
        None => None,
    };

    Ok(Property {
        data_type,
        format,
        default: field(obj, "default").cloned(),
        maximum: opt_number(obj, "maximum", path)?,
        exclusive_maximum: opt_bool(obj, "exclusiveMaximum", path)?.unwrap_or(false),
        minimum: opt_number(obj, "minimum", path)?,
        exclusive_minimum: opt_bool(obj, "exclusiveMinimum", path)?.unwrap_or(false),
        max_length: opt_u64(obj, "maxLength", path)?,
        min_length: opt_u64(obj, "minLength", path)?,
        pattern,
        items: opt_schema(obj, "items", path)?.map(Box::new),
        collection_format,
        max_items: opt_u64(obj, "maxItems", path)?,
        min_items: opt_u64(obj, "minItems", path)?,
        unique_items: opt_bool(obj, "uniqueItems", path)?.unwrap_or(false),
        enum_values,
        multiple_of: opt_number(obj, "multipleOf", path)?,
        allow_empty_value: opt_bool(obj, "allowEmptyValue", path)?.unwrap_or(false),
    })
}

/// Convert raw `enum` entries into a list of the declared type.
fn parse_enum(
    entries: &[Value],
    data_type: Option<DataType>,
    format: Option<DataFormat>,
    path: &str,
) -> Result<EnumValues> {
    fn convert<T>(
        entries: &[Value],
        path: &str,
        expected: &str,
        f: impl Fn(&Value) -> Option<T>,
    ) -> Result<Vec<T>> {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                f(entry).ok_or_else(|| SpecParseError::InvalidEnum {
                    path: child(path, &i.to_string()),
                    expected: expected.to_string(),
                    actual: entry.to_string(),
                })
            })
            .collect()
    }

    let values = match data_type {
        Some(DataType::Integer) if format == Some(DataFormat::Int64) => {
            EnumValues::Int64(convert(entries, path, "int64", enum_i64)?)
        }
        Some(DataType::Integer) => EnumValues::Int32(convert(entries, path, "int32", |v| {
            enum_i64(v).and_then(|n| i32::try_from(n).ok())
        })?),
        Some(DataType::Number) if format == Some(DataFormat::Double) => {
            EnumValues::Double(convert(entries, path, "double", enum_f64)?)
        }
        Some(DataType::Number) => EnumValues::Float(convert(entries, path, "float", |v| match v {
            Value::String(s) => s.parse::<f32>().ok(),
            _ => enum_f64(v).map(|n| n as f32),
        })?),
        Some(DataType::String) => {
            EnumValues::String(convert(entries, path, "string", |v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })?)
        }
        Some(DataType::Boolean) => {
            EnumValues::Boolean(convert(entries, path, "boolean", |v| match v {
                Value::Bool(b) => Some(*b),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            })?)
        }
        _ => EnumValues::Raw(entries.to_vec()),
    };
    Ok(values)
}

fn enum_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn enum_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_schema(value: &Value, path: &str) -> Result<Schema> {
    let obj = expect_object(value, path)?;

    let additional_properties = match field(obj, "additionalProperties") {
        Some(Value::Bool(allowed)) => Some(AdditionalProperties::Allowed(*allowed)),
        Some(v @ Value::Object(_)) => Some(AdditionalProperties::Schema(Box::new(parse_schema(
            v,
            &child(path, "additionalProperties"),
        )?))),
        Some(other) => {
            return Err(SpecParseError::InvalidField {
                path: child(path, "additionalProperties"),
                expected: "boolean or object",
                actual: json_type_name(other).to_string(),
            })
        }
        None => None,
    };
    let all_of = match field(obj, "allOf") {
        Some(v) => {
            let all_of_path = child(path, "allOf");
            expect_array(v, &all_of_path)?
                .iter()
                .enumerate()
                .map(|(i, s)| parse_schema(s, &child(&all_of_path, &i.to_string())))
                .collect::<Result<Vec<_>>>()?
        }
        None => Vec::new(),
    };

    Ok(Schema {
        reference: opt_string(obj, "$ref", path)?,
        title: opt_string(obj, "title", path)?,
        description: opt_string(obj, "description", path)?,
        property: parse_property(obj, path)?,
        required: string_list(obj, "required", path)?,
        max_properties: opt_u64(obj, "maxProperties", path)?,
        min_properties: opt_u64(obj, "minProperties", path)?,
        properties: named_map(obj, "properties", path, parse_schema)?,
        additional_properties,
        all_of,
        extensions: extensions(obj, &[]),
    })
}

fn opt_schema(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<Schema>> {
    field(obj, key)
        .map(|v| parse_schema(v, &child(path, key)))
        .transpose()
}

fn parse_header(value: &Value, path: &str) -> Result<Header> {
    let obj = expect_object(value, path)?;
    let property = parse_property(obj, path)?;
    require_items(&property, path)?;
    Ok(Header {
        description: opt_string(obj, "description", path)?,
        property,
        extensions: extensions(obj, &[]),
    })
}

fn parse_response(value: &Value, path: &str) -> Result<Response> {
    let obj = expect_object(value, path)?;
    Ok(Response {
        description: opt_string(obj, "description", path)?,
        schema: opt_schema(obj, "schema", path)?,
        headers: named_map(obj, "headers", path, parse_header)?,
        examples: examples(obj, path)?,
        extensions: extensions(obj, &[]),
    })
}

fn parse_info(value: &Value, path: &str) -> Result<Info> {
    let obj = expect_object(value, path)?;

    let contact = match field(obj, "contact") {
        Some(v) => {
            let contact_path = child(path, "contact");
            let c = expect_object(v, &contact_path)?;
            Some(Contact {
                name: opt_string(c, "name", &contact_path)?,
                url: opt_string(c, "url", &contact_path)?,
                email: opt_string(c, "email", &contact_path)?,
                extensions: extensions(c, &[]),
            })
        }
        None => None,
    };
    let license = match field(obj, "license") {
        Some(v) => {
            let license_path = child(path, "license");
            let l = expect_object(v, &license_path)?;
            Some(License {
                name: opt_string(l, "name", &license_path)?,
                url: opt_string(l, "url", &license_path)?,
                extensions: extensions(l, &[]),
            })
        }
        None => None,
    };

    Ok(Info {
        title: opt_string(obj, "title", path)?,
        description: opt_string(obj, "description", path)?,
        version: opt_string(obj, "version", path)?,
        terms_of_service: opt_string(obj, "termsOfService", path)?,
        contact,
        license,
        extensions: extensions(obj, &[]),
    })
}

fn parse_tag(value: &Value, path: &str) -> Result<Tag> {
    let obj = expect_object(value, path)?;
    Ok(Tag {
        name: opt_string(obj, "name", path)?.ok_or_else(|| SpecParseError::MissingField {
            path: path.to_string(),
            field: "name",
        })?,
        description: opt_string(obj, "description", path)?,
        external_docs: opt_external_docs(obj, path)?,
        extensions: extensions(obj, &[]),
    })
}

fn opt_external_docs(obj: &Map<String, Value>, path: &str) -> Result<Option<ExternalDocs>> {
    let Some(value) = field(obj, "externalDocs") else {
        return Ok(None);
    };
    let docs_path = child(path, "externalDocs");
    let docs = expect_object(value, &docs_path)?;
    Ok(Some(ExternalDocs {
        description: opt_string(docs, "description", &docs_path)?,
        url: opt_string(docs, "url", &docs_path)?,
        extensions: extensions(docs, &[]),
    }))
}

fn parse_security_scheme(value: &Value, path: &str) -> Result<SecurityScheme> {
    let obj = expect_object(value, path)?;

    let mut scopes = IndexMap::new();
    if let Some(v) = field(obj, "scopes") {
        let scopes_path = child(path, "scopes");
        for (name, description) in expect_object(v, &scopes_path)? {
            let description = description.as_str().ok_or_else(|| SpecParseError::InvalidField {
                path: child(&scopes_path, name),
                expected: "string",
                actual: json_type_name(description).to_string(),
            })?;
            scopes.insert(name.clone(), description.to_string());
        }
    }

    Ok(SecurityScheme {
        scheme_type: opt_string(obj, "type", path)?,
        description: opt_string(obj, "description", path)?,
        name: opt_string(obj, "name", path)?,
        location: opt_string(obj, "in", path)?,
        flow: opt_string(obj, "flow", path)?,
        authorization_url: opt_string(obj, "authorizationUrl", path)?,
        token_url: opt_string(obj, "tokenUrl", path)?,
        scopes,
        extensions: extensions(obj, &[]),
    })
}

fn security_list(obj: &Map<String, Value>, path: &str) -> Result<Vec<SecurityRequirement>> {
    let Some(value) = field(obj, "security") else {
        return Ok(Vec::new());
    };
    let list_path = child(path, "security");
    let mut requirements = Vec::new();
    for (i, entry) in expect_array(value, &list_path)?.iter().enumerate() {
        let entry_path = child(&list_path, &i.to_string());
        let entry_obj = expect_object(entry, &entry_path)?;
        let mut requirement = SecurityRequirement::new();
        for name in entry_obj.keys() {
            requirement.insert(name.clone(), string_list(entry_obj, name, &entry_path)?);
        }
        requirements.push(requirement);
    }
    Ok(requirements)
}

fn examples(obj: &Map<String, Value>, path: &str) -> Result<IndexMap<String, Value>> {
    match field(obj, "examples") {
        Some(v) => Ok(expect_object(v, &child(path, "examples"))?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        None => Ok(IndexMap::new()),
    }
}

/// Parse every entry of an object-valued field with `parse_entry`.
fn named_map<T>(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
    parse_entry: fn(&Value, &str) -> Result<T>,
) -> Result<IndexMap<String, T>> {
    let Some(value) = field(obj, key) else {
        return Ok(IndexMap::new());
    };
    let map_path = child(path, key);
    let mut out = IndexMap::new();
    for (name, entry) in expect_object(value, &map_path)? {
        if entry.is_null() {
            continue;
        }
        out.insert(name.clone(), parse_entry(entry, &child(&map_path, name))?);
    }
    Ok(out)
}

fn is_extension(key: &str) -> bool {
    key.starts_with(VENDOR_EXTENSION_PREFIX)
}

/// Collect `x-*` keys, minus the ones the caller models explicitly.
fn extensions(obj: &Map<String, Value>, modeled: &[&str]) -> IndexMap<String, Value> {
    obj.iter()
        .filter(|(k, _)| is_extension(k) && !modeled.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Look up `key`, treating an explicit `null` as absent.
fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| invalid(path, "object", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| invalid(path, "array", value))
}

fn opt_string(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match field(obj, key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(&child(path, key), "string", other)),
        None => Ok(None),
    }
}

fn opt_bool(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<bool>> {
    match field(obj, key) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(&child(path, key), "boolean", other)),
        None => Ok(None),
    }
}

fn opt_number(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<Number>> {
    match field(obj, key) {
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(other) => Err(invalid(&child(path, key), "number", other)),
        None => Ok(None),
    }
}

fn opt_u64(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<u64>> {
    match field(obj, key) {
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(&child(path, key), "non-negative integer", v)),
        None => Ok(None),
    }
}

fn string_list(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Vec<String>> {
    let Some(value) = field(obj, key) else {
        return Ok(Vec::new());
    };
    let list_path = child(path, key);
    expect_array(value, &list_path)?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(&child(&list_path, &i.to_string()), "string", entry))
        })
        .collect()
}

fn invalid(path: &str, expected: &'static str, actual: &Value) -> SpecParseError {
    SpecParseError::InvalidField {
        path: path.to_string(),
        expected,
        actual: json_type_name(actual).to_string(),
    }
}

/// Append one reference token to a JSON Pointer, escaping `~` and `/`.
fn child(path: &str, token: &str) -> String {
    format!("{}/{}", path, token.replace('~', "~0").replace('/', "~1"))
}

//! Request value validation against declared parameters and schemas.
//!
//! Validation is a total function: every outcome is a `bool`, and malformed
//! input (unparseable numbers, wrong JSON types) is simply invalid. Values
//! may arrive native-typed (`5`, `true`, `[1, 2]`) or string-encoded
//! (`"5"`, `"TRUE"`, `"1,2"`) and are checked the same way.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::document::{Operation, SpecDocument};
use crate::parameter::{Parameter, ParameterKind};
use crate::resolver::find_path;
use crate::schema::{EnumValues, Header, Property, Schema};
use crate::types::{DataFormat, DataType, Method};

/// Anything a single value can be validated against.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Parameter(&'a Parameter),
    Schema(&'a Schema),
    Property(&'a Property),
}

impl<'a> From<&'a Parameter> for Node<'a> {
    fn from(parameter: &'a Parameter) -> Self {
        Node::Parameter(parameter)
    }
}

impl<'a> From<&'a Schema> for Node<'a> {
    fn from(schema: &'a Schema) -> Self {
        Node::Schema(schema)
    }
}

impl<'a> From<&'a Property> for Node<'a> {
    fn from(property: &'a Property) -> Self {
        Node::Property(property)
    }
}

impl<'a> From<&'a Header> for Node<'a> {
    fn from(header: &'a Header) -> Self {
        Node::Property(&header.property)
    }
}

/// Validate one value against a node. `None` and `Value::Null` both mean
/// the value was not supplied; only a required parameter rejects that.
pub fn validate<'a>(node: impl Into<Node<'a>>, value: Option<&Value>) -> bool {
    let value = value.filter(|v| !v.is_null());
    match node.into() {
        Node::Parameter(parameter) => validate_parameter(parameter, value),
        Node::Schema(schema) => value.map_or(true, |v| check_property(&schema.property, v)),
        Node::Property(property) => value.map_or(true, |v| check_property(property, v)),
    }
}

/// Validate a parameter value. Body parameters delegate to their schema.
pub fn validate_parameter(parameter: &Parameter, value: Option<&Value>) -> bool {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return !parameter.required;
    };
    match &parameter.kind {
        ParameterKind::Value(property) => check_property(property, value),
        ParameterKind::Body { schema: Some(schema) } => check_property(&schema.property, value),
        ParameterKind::Body { schema: None } => true,
    }
}

/// Declared parameters whose supplied value (looked up by name) fails
/// validation. Supplied values with no declaration are ignored.
pub fn invalid_parameters<'a, I>(parameters: I, values: &Map<String, Value>) -> Vec<&'a Parameter>
where
    I: IntoIterator<Item = &'a Parameter>,
{
    parameters
        .into_iter()
        .filter(|parameter| {
            let value = values.get(&parameter.name);
            let valid = validate_parameter(parameter, value);
            if !valid {
                trace!(
                    parameter = %parameter.name,
                    location = parameter.location.as_str(),
                    value = ?value,
                    "parameter failed validation"
                );
            }
            !valid
        })
        .collect()
}

/// True if every parameter the operation declares accepts its supplied value.
pub fn validate_operation(operation: &Operation, values: &Map<String, Value>) -> bool {
    invalid_parameters(&operation.parameters, values).is_empty()
}

/// Outcome of checking a whole request against a document.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestVerdict<'a> {
    /// No operation is declared for the method and path.
    Unresolved,
    Valid,
    /// Parameters that rejected their values, in declaration order.
    Invalid(Vec<&'a Parameter>),
}

impl RequestVerdict<'_> {
    /// Unresolved requests count as valid.
    pub fn is_valid(&self) -> bool {
        !matches!(self, RequestVerdict::Invalid(_))
    }
}

/// Resolve `method` + `path` in `document` and validate `values` against the
/// operation's parameters, plus the path-level and document-level ones it
/// doesn't redeclare.
pub fn check_request<'a>(
    document: &'a SpecDocument,
    method: Method,
    path: &str,
    values: &Map<String, Value>,
) -> RequestVerdict<'a> {
    let Some(item) = find_path(document, path) else {
        debug!(%method, path, "no declared path, skipping validation");
        return RequestVerdict::Unresolved;
    };
    let Some(operation) = item.operation(method) else {
        debug!(%method, path, "no declared operation, skipping validation");
        return RequestVerdict::Unresolved;
    };

    let invalid = invalid_parameters(document.effective_parameters(item, operation), values);
    if invalid.is_empty() {
        RequestVerdict::Valid
    } else {
        RequestVerdict::Invalid(invalid)
    }
}

/// Boolean form of [`check_request`].
pub fn validate_request(
    document: &SpecDocument,
    method: Method,
    path: &str,
    values: &Map<String, Value>,
) -> bool {
    check_request(document, method, path, values).is_valid()
}

fn check_property(property: &Property, value: &Value) -> bool {
    match property.data_type {
        Some(DataType::Integer) => check_integer(property, value),
        Some(DataType::Number) => check_number(property, value),
        Some(DataType::String) => check_string(property, value),
        Some(DataType::Boolean) => check_boolean(property, value),
        Some(DataType::Array) => check_array(property, value),
        Some(DataType::File) | Some(DataType::Object) | None => true,
    }
}

fn check_integer(property: &Property, value: &Value) -> bool {
    let wide = property.format == Some(DataFormat::Int64);
    let parsed = match value {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    let Some(n) = parsed.filter(|n| wide || i32::try_from(*n).is_ok()) else {
        return false;
    };

    if let Some(values) = &property.enum_values {
        return enum_has_integer(values, n);
    }

    check_bounds(property, |bound| compare_integer(n, bound)) && check_multiple_of(property, n)
}

fn compare_integer(n: i64, bound: &Number) -> Option<Ordering> {
    match bound.as_i64() {
        Some(b) => Some(n.cmp(&b)),
        None => (n as f64).partial_cmp(&bound.as_f64()?),
    }
}

fn check_multiple_of(property: &Property, n: i64) -> bool {
    let Some(multiple_of) = &property.multiple_of else {
        return true;
    };
    match multiple_of.as_i64() {
        Some(0) => true,
        Some(m) => n.checked_rem(m).map_or(true, |r| r == 0),
        None => match multiple_of.as_f64() {
            Some(m) if m != 0.0 => (n as f64 / m).fract() == 0.0,
            _ => true,
        },
    }
}

fn enum_has_integer(values: &EnumValues, n: i64) -> bool {
    match values {
        EnumValues::Int32(v) => v.iter().any(|e| i64::from(*e) == n),
        EnumValues::Int64(v) => v.contains(&n),
        EnumValues::Float(v) => v.iter().any(|e| f64::from(*e) == n as f64),
        EnumValues::Double(v) => v.iter().any(|e| *e == n as f64),
        EnumValues::String(v) => v.iter().any(|e| e.parse::<i64>() == Ok(n)),
        EnumValues::Boolean(_) => false,
        EnumValues::Raw(v) => v.iter().any(|e| raw_i64(e) == Some(n)),
    }
}

fn raw_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn check_number(property: &Property, value: &Value) -> bool {
    // float (the default) narrows both the value and the bounds to f32
    let narrow = property.format != Some(DataFormat::Double);
    let width = |f: f64| if narrow { f64::from(f as f32) } else { f };

    let parsed = match value {
        Value::String(s) if narrow => s.parse::<f32>().ok().map(f64::from),
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64().map(width),
        _ => None,
    };
    let Some(n) = parsed.filter(|n| n.is_finite()) else {
        return false;
    };

    if let Some(values) = &property.enum_values {
        return enum_has_number(values, n, width);
    }

    check_bounds(property, |bound| n.partial_cmp(&width(bound.as_f64()?)))
}

fn enum_has_number(values: &EnumValues, n: f64, width: impl Fn(f64) -> f64) -> bool {
    match values {
        EnumValues::Int32(v) => v.iter().any(|e| width(f64::from(*e)) == n),
        EnumValues::Int64(v) => v.iter().any(|e| width(*e as f64) == n),
        EnumValues::Float(v) => v.iter().any(|e| f64::from(*e) == n),
        EnumValues::Double(v) => v.iter().any(|e| width(*e) == n),
        EnumValues::String(v) => v
            .iter()
            .any(|e| e.parse::<f64>().map(&width) == Ok(n)),
        EnumValues::Boolean(_) => false,
        EnumValues::Raw(v) => v.iter().any(|e| {
            let raw = match e {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            };
            raw.map(&width) == Some(n)
        }),
    }
}

/// Apply `minimum`/`maximum`, each inclusive unless its exclusive flag is
/// set. `compare` orders the value against a bound; `None` fails.
fn check_bounds(property: &Property, compare: impl Fn(&Number) -> Option<Ordering>) -> bool {
    let min_ok = property.minimum.as_ref().map_or(true, |min| match compare(min) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => !property.exclusive_minimum,
        _ => false,
    });
    let max_ok = property.maximum.as_ref().map_or(true, |max| match compare(max) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => !property.exclusive_maximum,
        _ => false,
    });
    min_ok && max_ok
}

fn check_string(property: &Property, value: &Value) -> bool {
    let Value::String(s) = value else {
        return false;
    };

    if let Some(values) = &property.enum_values {
        return enum_has_string(values, s);
    }

    if let Some(pattern) = &property.pattern {
        if !pattern.is_match(s) {
            return false;
        }
    }

    match property.format {
        Some(DataFormat::Byte | DataFormat::Binary | DataFormat::Date | DataFormat::DateTime) => true,
        Some(DataFormat::Rgb) => s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit()),
        // text, password, none, or a format of another type
        _ => check_length(property, s),
    }
}

/// Both bounds are exclusive: `minLength < len < maxLength`.
///
/// Length is the number of Unicode scalar values (`char`s), not UTF-16 code
/// units, so a character outside the Basic Multilingual Plane such as an
/// emoji counts as one.
fn check_length(property: &Property, s: &str) -> bool {
    let len = s.chars().count() as u64;
    property.max_length.map_or(true, |max| len < max)
        && property.min_length.map_or(true, |min| len > min)
}

fn enum_has_string(values: &EnumValues, s: &str) -> bool {
    match values {
        EnumValues::String(v) => v.iter().any(|e| e == s),
        EnumValues::Int32(v) => v.iter().any(|e| e.to_string() == s),
        EnumValues::Int64(v) => v.iter().any(|e| e.to_string() == s),
        EnumValues::Float(v) => v.iter().any(|e| e.to_string() == s),
        EnumValues::Double(v) => v.iter().any(|e| e.to_string() == s),
        EnumValues::Boolean(v) => v.iter().any(|e| e.to_string() == s),
        EnumValues::Raw(v) => v.iter().any(|e| e.as_str() == Some(s)),
    }
}

fn check_boolean(property: &Property, value: &Value) -> bool {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    };
    let Some(b) = parsed else {
        return false;
    };

    match &property.enum_values {
        Some(EnumValues::Boolean(v)) => v.contains(&b),
        Some(EnumValues::String(v)) => v.iter().any(|e| e.eq_ignore_ascii_case(&b.to_string())),
        Some(EnumValues::Raw(v)) => v.iter().any(|e| match e {
            Value::Bool(e) => *e == b,
            Value::String(e) => e.eq_ignore_ascii_case(&b.to_string()),
            _ => false,
        }),
        Some(_) => false,
        None => true,
    }
}

fn check_array(property: &Property, value: &Value) -> bool {
    if value.as_str() == Some("") {
        return property.allow_empty_value;
    }

    let elements: Vec<Value> = match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match split_collection(property, s) {
            Some(tokens) => tokens,
            None => return false,
        },
        Value::Number(n) => match split_collection(property, &n.to_string()) {
            Some(tokens) => tokens,
            None => return false,
        },
        Value::Bool(b) => match split_collection(property, &b.to_string()) {
            Some(tokens) => tokens,
            None => return false,
        },
        Value::Object(_) | Value::Null => return false,
    };

    let count = elements.len() as u64;
    if property.max_items.is_some_and(|max| count >= max) {
        return false;
    }
    if property.min_items.is_some_and(|min| count < min) {
        return false;
    }
    if property.unique_items {
        for (i, element) in elements.iter().enumerate() {
            if elements[i + 1..].contains(element) {
                return false;
            }
        }
    }

    match &property.items {
        Some(items) => elements.iter().all(|element| check_property(&items.property, element)),
        None => true,
    }
}

/// Split a string-encoded array by the collection format's delimiter.
///
/// Returns `None` for `multi`, which can't be carried in one string.
/// Trailing empty tokens are dropped (`"1,2,"` has two tokens).
fn split_collection(property: &Property, s: &str) -> Option<Vec<Value>> {
    let delimiter = property.collection_format.delimiter()?;
    let mut tokens: Vec<&str> = s.split(delimiter).collect();
    while tokens.last() == Some(&"") {
        tokens.pop();
    }
    Some(
        tokens
            .into_iter()
            .map(|token| Value::String(token.to_string()))
            .collect(),
    )
}

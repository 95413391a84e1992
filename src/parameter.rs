//! Operation parameters.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::schema::{Property, Schema};
use crate::types::ParameterLocation;

fn is_false(value: &bool) -> bool {
    !*value
}

/// What a parameter carries: a nested schema for `in: body`, the shared
/// constraint fields for every other location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterKind {
    Body {
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<Schema>,
    },
    Value(Property),
}

/// A described input value of an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(flatten)]
    pub kind: ParameterKind,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Parameter {
    /// Create an optional parameter. A `Body` location wraps the property in a
    /// schema so the kind always agrees with the location.
    pub fn new(name: impl Into<String>, location: ParameterLocation, property: Property) -> Self {
        let kind = match location {
            ParameterLocation::Body => ParameterKind::Body {
                schema: Some(property.into()),
            },
            _ => ParameterKind::Value(property),
        };
        Self {
            name: name.into(),
            location,
            description: None,
            required: false,
            kind,
            extensions: IndexMap::new(),
        }
    }

    pub fn query(name: impl Into<String>, property: Property) -> Self {
        Self::new(name, ParameterLocation::Query, property)
    }

    pub fn form_data(name: impl Into<String>, property: Property) -> Self {
        Self::new(name, ParameterLocation::FormData, property)
    }

    pub fn header(name: impl Into<String>, property: Property) -> Self {
        Self::new(name, ParameterLocation::Header, property)
    }

    pub fn path(name: impl Into<String>, property: Property) -> Self {
        Self::new(name, ParameterLocation::Path, property)
    }

    pub fn body(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Body,
            description: None,
            required: false,
            kind: ParameterKind::Body {
                schema: Some(schema),
            },
            extensions: IndexMap::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Constraint fields governing this parameter's value: its own for
    /// non-body parameters, the body schema's otherwise.
    pub fn property(&self) -> Option<&Property> {
        match &self.kind {
            ParameterKind::Value(property) => Some(property),
            ParameterKind::Body { schema } => schema.as_ref().map(|s| &s.property),
        }
    }

    pub fn is_body(&self) -> bool {
        matches!(self.kind, ParameterKind::Body { .. })
    }

    /// Parameters are identified by name and location together.
    pub fn same_slot(&self, other: &Parameter) -> bool {
        self.name == other.name && self.location == other.location
    }
}

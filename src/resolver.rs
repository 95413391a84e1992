//! Operation resolution - maps a method and request path to a declared operation.
//!
//! Declared path keys are literal: there is no `{param}` templating. A key
//! matches when `basePath` + key equals the request path ignoring ASCII
//! case, after one trailing slash is stripped from both sides.

use std::fmt;
use std::sync::Arc;

use crate::document::{Operation, Path, SpecDocument};
use crate::types::Method;

/// API segment used when a [`RequestPath`] doesn't name one.
pub const DEFAULT_API: &str = "gotapi";

/// Strip one trailing slash. The root path `/` is left alone.
pub fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Find the path item whose full path matches `request_path`.
pub fn find_path<'a>(document: &'a SpecDocument, request_path: &str) -> Option<&'a Path> {
    let request_path = normalize_path(request_path);
    let base_path = document.base_path.as_deref().unwrap_or("");

    document
        .paths
        .iter()
        .find(|(key, _)| full_path_matches(base_path, key, request_path))
        .map(|(_, path)| path)
}

fn full_path_matches(base_path: &str, key: &str, request_path: &str) -> bool {
    let full = format!("{}{}", base_path, key);
    normalize_path(&full).eq_ignore_ascii_case(request_path)
}

/// Find the operation declared for `method` on `request_path`.
pub fn find_operation<'a>(
    document: &'a SpecDocument,
    method: Method,
    request_path: &str,
) -> Option<&'a Operation> {
    find_path(document, request_path)?.operation(method)
}

/// Like [`find_operation`], but returns a shared handle.
pub fn find_shared_operation(
    document: &SpecDocument,
    method: Method,
    request_path: &str,
) -> Option<Arc<Operation>> {
    find_path(document, request_path)?.shared_operation(method)
}

/// Extract the profile name from a request path: the second segment
/// (`/gotapi/battery/level` -> `battery`).
pub fn profile_from_path(path: &str) -> Option<&str> {
    path.split('/').nth(2).filter(|segment| !segment.is_empty())
}

/// A request path decomposed into its API, profile, interface and attribute
/// segments: `/{api}/{profile}[/{interface}][/{attribute}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    pub api: String,
    pub profile: String,
    pub interface: Option<String>,
    pub attribute: Option<String>,
}

impl RequestPath {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            profile: profile.into(),
            interface: None,
            attribute: None,
        }
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into();
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Split a path like `/gotapi/light/group/create` into segments.
    ///
    /// Returns `None` for paths with fewer than two or more than four
    /// segments.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = normalize_path(path)
            .trim_start_matches('/')
            .split('/')
            .map(str::to_string);

        let api = segments.next().filter(|s| !s.is_empty())?;
        let profile = segments.next().filter(|s| !s.is_empty())?;
        let rest: Vec<String> = segments.collect();
        let (interface, attribute) = match rest.as_slice() {
            [] => (None, None),
            [attribute] => (None, Some(attribute.clone())),
            [interface, attribute] => (Some(interface.clone()), Some(attribute.clone())),
            _ => return None,
        };

        Some(Self {
            api,
            profile,
            interface,
            attribute,
        })
    }

    /// Compose the full request path.
    pub fn to_path(&self) -> String {
        let mut path = format!("/{}/{}", self.api, self.profile);
        for segment in [&self.interface, &self.attribute].into_iter().flatten() {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

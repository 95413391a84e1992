//! Error types for spec document parsing and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a JSON document into a [`SpecDocument`].
///
/// Paths are JSON Pointers (RFC 6901) into the source document.
///
/// [`SpecDocument`]: crate::SpecDocument
#[derive(Debug, Error)]
pub enum SpecParseError {
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("spec document must be an object, got {actual}")]
    NotAnObject { actual: String },

    #[error("spec document has no paths")]
    MissingPaths,

    #[error("unsupported swagger version \"{version}\": expected 2.0")]
    UnsupportedVersion { version: String },

    #[error("invalid value at {path}: expected {expected}, got {actual}")]
    InvalidField {
        path: String,
        expected: &'static str,
        actual: String,
    },

    #[error("missing \"{field}\" at {path}")]
    MissingField { path: String, field: &'static str },

    #[error("unknown parameter location \"{value}\" at {path}")]
    UnknownLocation { path: String, value: String },

    #[error("enum entry at {path} is not a valid {expected}: {actual}")]
    InvalidEnum {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid pattern at {path}: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: fancy_regex::Error,
    },
}

impl SpecParseError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }

    /// JSON Pointer to the offending node, when the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            SpecParseError::InvalidField { path, .. }
            | SpecParseError::MissingField { path, .. }
            | SpecParseError::UnknownLocation { path, .. }
            | SpecParseError::InvalidEnum { path, .. }
            | SpecParseError::InvalidPattern { path, .. } => Some(path),
            SpecParseError::InvalidJson { .. }
            | SpecParseError::NotAnObject { .. }
            | SpecParseError::MissingPaths
            | SpecParseError::UnsupportedVersion { .. } => None,
        }
    }
}

/// Errors while locating or reading a spec document source.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no spec document for profile \"{profile}\" (searched: {})", display_paths(searched))]
    ProfileNotFound {
        profile: String,
        searched: Vec<PathBuf>,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Parse(#[from] SpecParseError),
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. }
            | LoadError::ReadError { .. }
            | LoadError::ProfileNotFound { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
            LoadError::Parse(e) => e.exit_code(),
        }
    }

    /// True when the source could not be found or read, as opposed to
    /// being found but malformed.
    pub fn is_not_found(&self) -> bool {
        self.exit_code() == 3
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

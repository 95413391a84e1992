//! Spec document loading from various sources.
//!
//! Handles loading documents from files, strings, and HTTP URLs, and
//! discovering which file in a set of directories defines a profile.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::document::SpecDocument;
use crate::error::LoadError;
use crate::parser;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Extension of spec document files considered during discovery.
pub const SPEC_FILE_EXTENSION: &str = "json";

/// Read a JSON value from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    let content = read_source(path)?;
    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load and parse a spec document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound`/`ReadError` when the file can't be read,
/// `LoadError::InvalidJson` for bad JSON, and `LoadError::Parse` when the
/// document is not a valid spec.
pub fn load_document(path: &Path) -> Result<SpecDocument, LoadError> {
    let value = load_json(path)?;
    Ok(parser::parse(&value)?)
}

/// Parse a spec document from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON,
/// or `LoadError::Parse` if it isn't a valid spec document.
pub fn load_document_str(content: &str) -> Result<SpecDocument, LoadError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    Ok(parser::parse(&value)?)
}

/// Load a spec document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the response
/// isn't JSON, or `LoadError::Parse` if it isn't a valid spec document.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<SpecDocument, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    debug!(url, "fetching spec document");
    let value: Value = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network_error)?;

    Ok(parser::parse(&value)?)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a spec document from a URL or a file path.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns appropriate errors based on the source type.
pub fn load_document_auto(source: &str) -> Result<SpecDocument, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Navigate a JSON Pointer fragment (e.g., "#/definitions/Level").
///
/// Returns `None` when any segment is missing. An empty fragment ("#")
/// refers to the whole document.
pub fn navigate_fragment<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(document);
    }

    let mut current = document;
    for part in path.split('/') {
        // ~1 = /, ~0 = ~
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(&key)?,
        };
    }
    Some(current)
}

/// Find the document defining `profile` in `dirs`.
///
/// Directories are scanned in order and missing ones are skipped. Within a
/// directory only `.json` files are considered, in name order; the first
/// whose stem equals `profile` ignoring ASCII case wins.
///
/// # Errors
///
/// Returns `LoadError::ProfileNotFound` listing the scanned directories when
/// no file matches, or `LoadError::ReadError` if a directory can't be listed.
pub fn find_profile_source(dirs: &[PathBuf], profile: &str) -> Result<PathBuf, LoadError> {
    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "skipping missing spec directory");
            continue;
        }

        let entries = std::fs::read_dir(dir).map_err(|source| LoadError::ReadError {
            path: dir.clone(),
            source,
        })?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_spec_extension(path))
            .collect();
        candidates.sort();

        if let Some(found) = candidates.into_iter().find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(profile))
        }) {
            debug!(profile, path = %found.display(), "found profile spec source");
            return Ok(found);
        }
    }

    Err(LoadError::ProfileNotFound {
        profile: profile.to_string(),
        searched: dirs.to_vec(),
    })
}

fn has_spec_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SPEC_FILE_EXTENSION)
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

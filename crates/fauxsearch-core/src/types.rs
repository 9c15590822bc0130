//! Core types for fauxsearch-core.
//!
//! This module defines the data exchanged across the service boundary: the
//! [`SearchRequest`] a caller sends, the [`SearchResult`] a backend answers
//! with, and the [`BackendId`] that tells callers which instance answered.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A query as supplied by the caller. The text is opaque: it is never
/// validated, trimmed or length-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// One synthetic search result.
///
/// `title` is the whole contract; the discrete fields carry the same
/// components for callers that would rather not parse the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Human-readable title encoding the query, the streaming index (if any)
    /// and the backend that produced the result.
    pub title: String,
    /// Query text the result was produced for.
    #[serde(default)]
    pub query: String,
    /// Emission index within a Watch session. Absent for unary results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    /// Identity of the responding backend.
    #[serde(default)]
    pub backend: String,
}

impl std::fmt::Display for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "title:{:?}", self.title)
    }
}

/// Identity of a backend instance, fixed at process start.
///
/// Cheap to clone; every clone shares the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendId(Arc<str>);

impl BackendId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The host's network name, lossily converted to UTF-8.
    pub fn from_hostname() -> Self {
        Self::new(gethostname::gethostname().to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//! JSON encoding of the cache index (`storage-keys.json`)
//!
//! The document is a single object keyed by cache key, in index order:
//!
//! ```json
//! {
//!   "http://x/a.png": {
//!     "request_date": "Fri, 01 Mar 2024 12:00:00 GMT",
//!     "response_date": "Fri, 01 Mar 2024 12:00:01 GMT",
//!     "status_line": "HTTP/1.1 200 OK",
//!     "headers": ["Content-Type: image/png"],
//!     "resource": "/cache/0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33.png",
//!     "variant_map": {}
//!   }
//! }
//! ```
//!
//! Decoding is all-or-nothing: a malformed field anywhere rejects the whole
//! document.

use crate::entry::{CacheEntry, Resource};
use crate::http::{Header, StatusLine, http_date};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A cache entry together with the body file it was normalized to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
    /// Body file under the cache root
    pub path: PathBuf,
    /// Entry whose resource is `Resource::File(path)`
    pub entry: CacheEntry,
}

impl IndexedEntry {
    /// Pair an entry with its body file, pointing the resource at that file
    #[must_use]
    pub fn new(path: PathBuf, entry: CacheEntry) -> Self {
        let entry = entry.with_resource(Resource::File(path.clone()));
        Self { path, entry }
    }
}

/// Cache key to entry, in insertion order
pub type Index = IndexMap<String, IndexedEntry>;

/// On-disk shape of one index value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedEntry {
    #[serde(with = "http_date")]
    pub request_date: DateTime<Utc>,
    #[serde(with = "http_date")]
    pub response_date: DateTime<Utc>,
    pub status_line: StatusLine,
    pub headers: Vec<Header>,
    pub resource: PathBuf,
    pub variant_map: BTreeMap<String, String>,
}

impl PersistedEntry {
    pub(crate) fn from_indexed(indexed: &IndexedEntry) -> Self {
        let entry = &indexed.entry;
        Self {
            request_date: entry.request_date,
            response_date: entry.response_date,
            status_line: entry.status_line.clone(),
            headers: entry.headers.clone(),
            resource: indexed.path.clone(),
            variant_map: entry.variant_map.clone(),
        }
    }

    pub(crate) fn into_indexed(self, root: &Path) -> IndexedEntry {
        let path = if self.resource.is_absolute() {
            self.resource
        } else {
            root.join(self.resource)
        };
        let entry = CacheEntry {
            request_date: self.request_date,
            response_date: self.response_date,
            status_line: self.status_line,
            headers: self.headers,
            resource: Resource::File(path.clone()),
            variant_map: self.variant_map,
        };
        IndexedEntry { path, entry }
    }
}

/// Encode the index as a pretty-printed JSON document
///
/// # Errors
///
/// Returns a serialization error if a resource path is not valid UTF-8.
pub fn encode(index: &Index) -> Result<Vec<u8>> {
    let document: IndexMap<&str, PersistedEntry> = index
        .iter()
        .map(|(key, indexed)| (key.as_str(), PersistedEntry::from_indexed(indexed)))
        .collect();
    serde_json::to_vec_pretty(&document)
        .map_err(|e| Error::serialization(format!("Failed to encode cache index: {e}")))
}

/// Decode an index document, resolving relative resource paths against `root`
///
/// # Errors
///
/// Returns a serialization error for malformed JSON, missing fields, or any
/// unparseable date, status line or header.
pub fn decode(document: &[u8], root: &Path) -> Result<Index> {
    let persisted: IndexMap<String, PersistedEntry> = serde_json::from_slice(document)
        .map_err(|e| Error::serialization(format!("Failed to decode cache index: {e}")))?;
    Ok(persisted
        .into_iter()
        .map(|(key, entry)| (key, entry.into_indexed(root)))
        .collect())
}

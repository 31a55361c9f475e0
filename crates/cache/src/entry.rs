//! Cached HTTP transactions and their body resources

use crate::http::{Header, StatusLine, truncate_to_seconds};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a cached response body lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Body held in memory, as received from the network
    Memory(Vec<u8>),
    /// Body materialized to a file under the cache root
    File(PathBuf),
}

impl Resource {
    /// Read the whole body
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a file-backed body cannot be read.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Memory(bytes) => Ok(bytes.clone()),
            Self::File(path) => fs::read(path).map_err(|e| Error::io(e, path, "read")),
        }
    }

    /// Path of a file-backed body
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory(_) => None,
            Self::File(path) => Some(path),
        }
    }

    /// Body length in bytes
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file metadata cannot be read.
    pub fn len(&self) -> Result<u64> {
        match self {
            Self::Memory(bytes) => Ok(bytes.len() as u64),
            Self::File(path) => fs::metadata(path)
                .map(|m| m.len())
                .map_err(|e| Error::io(e, path, "metadata")),
        }
    }

    /// Whether the body is empty
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file metadata cannot be read.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }
}

impl From<Vec<u8>> for Resource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Memory(bytes)
    }
}

/// One cached HTTP transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// When the request was issued
    pub request_date: DateTime<Utc>,
    /// When the response was received
    pub response_date: DateTime<Utc>,
    /// Response status line, kept verbatim
    pub status_line: StatusLine,
    /// Response headers in arrival order; names may repeat
    pub headers: Vec<Header>,
    /// Response body
    pub resource: Resource,
    /// Variant key to variant cache key, for negotiated responses
    pub variant_map: BTreeMap<String, String>,
}

impl CacheEntry {
    /// Create an entry with no variants
    ///
    /// Dates are truncated to whole seconds so that an entry compares equal to
    /// itself after a trip through the index document.
    #[must_use]
    pub fn new(
        request_date: DateTime<Utc>,
        response_date: DateTime<Utc>,
        status_line: StatusLine,
        headers: Vec<Header>,
        resource: Resource,
    ) -> Self {
        Self {
            request_date: truncate_to_seconds(request_date),
            response_date: truncate_to_seconds(response_date),
            status_line,
            headers,
            resource,
            variant_map: BTreeMap::new(),
        }
    }

    /// Attach a variant map
    #[must_use]
    pub fn with_variants(mut self, variant_map: BTreeMap<String, String>) -> Self {
        self.variant_map = variant_map;
        self
    }

    /// First header with the given name, compared case-insensitively
    #[must_use]
    pub fn first_header(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.is(name))
    }

    /// All headers with the given name, in order
    pub fn headers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Header> + 'a {
        self.headers.iter().filter(move |h| h.is(name))
    }

    /// Whether this entry is the parent of content-negotiated variants
    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variant_map.is_empty()
    }

    /// Check that the status line and every header survive the index document
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::InvalidStatusLine`] or
    /// [`Error::InvalidHeader`] found.
    pub fn validate(&self) -> Result<()> {
        self.status_line.validate()?;
        self.headers.iter().try_for_each(Header::validate)
    }

    /// Replace the body, keeping all metadata
    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = resource;
        self
    }
}

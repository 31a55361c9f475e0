//! Persistent storage for cached HTTP responses
//!
//! This crate keeps fetched responses on local disk so repeated requests for
//! the same remote resource survive process restarts without a network
//! round-trip:
//! - Content-addressed body files (`<sha1>[.<ext>]`), shared between keys
//! - A single JSON index (`storage-keys.json`) mapping cache keys to entries
//! - One-time import of the older per-entry sidecar layout
//!
//! # Overview
//!
//! [`CacheStorage`] is opened once per cache root. Every mutation writes the
//! body to the content store, updates the in-memory index and rewrites the
//! whole index document atomically. A corrupt index is discarded on open:
//! the cache is an optimization, so losing it only costs a refetch.
//!
//! ```rust,no_run
//! use slideshow_cache::{CacheEntry, CacheStorage, Header, Resource, StatusLine};
//!
//! let storage = CacheStorage::open("/tmp/slideshow-cache")?;
//! let now = chrono::Utc::now();
//! let entry = CacheEntry::new(
//!     now,
//!     now,
//!     StatusLine::ok(),
//!     vec![Header::new("Content-Type", "image/png")],
//!     Resource::Memory(std::fs::read("slide.png").unwrap_or_default()),
//! );
//! storage.put("http://example.com/slide.png", entry)?;
//!
//! if let Some(cached) = storage.get("http://example.com/slide.png") {
//!     let bytes = cached.resource.bytes()?;
//!     println!("{} bytes from cache", bytes.len());
//! }
//! # Ok::<(), slideshow_cache::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod content;
mod entry;
mod error;
pub mod http;
pub mod legacy;
mod response_cache;
pub mod storage;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use codec::{Index, IndexedEntry};
pub use config::default_cache_root;
pub use content::ContentStore;
pub use entry::{CacheEntry, Resource};
pub use http::{Header, StatusLine, format_http_date, parse_http_date};
pub use response_cache::{ResponseCache, Revalidation};
pub use storage::{CacheStorage, INDEX_FILE_NAME};

//! Error types for the cache crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for cache storage operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// I/O error while reading or writing the cache root
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(slideshow::cache::io),
        help("Check file permissions and free space in the cache directory")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "write", "rename")
        operation: String,
    },

    /// The index document could not be encoded or decoded
    #[error("Serialization error: {message}")]
    #[diagnostic(code(slideshow::cache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },

    /// A stored status line could not be parsed
    #[error("Invalid status line: {line:?}")]
    #[diagnostic(
        code(slideshow::cache::status_line),
        help("Expected a line such as `HTTP/1.1 200 OK`")
    )]
    InvalidStatusLine {
        /// The offending text
        line: String,
    },

    /// A stored header could not be parsed
    #[error("Invalid header: {header:?}")]
    #[diagnostic(
        code(slideshow::cache::header),
        help("Expected a header in `Name: value` form")
    )]
    InvalidHeader {
        /// The offending text
        header: String,
    },

    /// A stored timestamp is not a valid HTTP-date
    #[error("Invalid HTTP date: {value:?}")]
    #[diagnostic(code(slideshow::cache::date))]
    InvalidDate {
        /// The offending text
        value: String,
    },

    /// Configuration or validation error
    #[error("Cache configuration error: {message}")]
    #[diagnostic(code(slideshow::cache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// An update combinator refused to produce an entry
    #[error("Cache update failed: {message}")]
    #[diagnostic(code(slideshow::cache::update))]
    Update {
        /// Error message supplied by the combinator
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Create an update error, for use inside revalidation combinators
    #[must_use]
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update {
            message: msg.into(),
        }
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;

//! CLI error types rendered through miette

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced to the command line user
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No cached entry for {key}")]
    #[diagnostic(
        code(slideshow::cli::not_found),
        help("Run 'slideshow-cache list' to see cached keys")
    )]
    NotFound { key: String },

    #[error("Invalid command line argument: {argument}")]
    #[diagnostic(
        code(slideshow::cli::invalid_argument),
        help("Run 'slideshow-cache --help' to see available options")
    )]
    InvalidArgument {
        argument: String,
        #[source]
        source: slideshow_cache::Error,
    },

    #[error("Failed to write output")]
    #[diagnostic(code(slideshow::cli::output))]
    Output {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] slideshow_cache::Error),
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::Output { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = CliError::NotFound {
            key: "http://x/a.png".into(),
        };
        assert_eq!(err.to_string(), "No cached entry for http://x/a.png");
    }

    #[test]
    fn test_cache_error_is_transparent() {
        let err = CliError::from(slideshow_cache::Error::configuration("no root"));
        assert_eq!(err.to_string(), "Cache configuration error: no root");
    }
}

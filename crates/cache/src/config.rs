//! Cache root resolution
//!
//! The storage engine only ever needs a directory. This module picks a
//! sensible default for callers that do not have one configured.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the cache root
pub const CACHE_DIR_ENV: &str = "SLIDESHOW_CACHE_DIR";

/// Directory created under the platform or temporary cache location
const APP_DIR: &str = "slideshow";

/// Places a default cache root may live, most preferred first
#[derive(Debug, Clone, Default)]
pub struct RootCandidates {
    /// Explicit root, used as is (`SLIDESHOW_CACHE_DIR`)
    pub explicit: Option<PathBuf>,
    /// Platform cache directory; honours `XDG_CACHE_HOME` on Linux
    pub platform: Option<PathBuf>,
    /// Last resort, normally the system temporary directory
    pub fallback: PathBuf,
}

impl RootCandidates {
    /// Candidates for the current process
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            explicit: std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from),
            platform: dirs::cache_dir(),
            fallback: std::env::temp_dir(),
        }
    }

    fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.explicit
            .iter()
            .filter(|p| !p.as_os_str().is_empty())
            .cloned()
            .chain(self.platform.iter().map(|p| p.join(APP_DIR)))
            .chain(std::iter::once(self.fallback.join(APP_DIR)))
    }

    /// First candidate that exists (or can be created) and accepts writes
    ///
    /// # Errors
    ///
    /// Returns a configuration error if every candidate is unusable.
    pub fn resolve(&self) -> Result<PathBuf> {
        self.paths().find(|p| is_writable_dir(p)).ok_or_else(|| {
            Error::configuration(format!(
                "No writable cache directory; set {CACHE_DIR_ENV} to choose one"
            ))
        })
    }
}

fn is_writable_dir(path: &Path) -> bool {
    if let Err(e) = fs::create_dir_all(path) {
        tracing::debug!(path = %path.display(), "Cannot create cache root: {e}");
        return false;
    }
    // Existing directories may still be read-only
    let marker = path.join(".slideshow-write-check");
    match fs::write(&marker, b"") {
        Ok(()) => {
            let _ = fs::remove_file(&marker);
            true
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), "Cache root not writable: {e}");
            false
        }
    }
}

/// Default cache root for this process
///
/// # Errors
///
/// Returns a configuration error if no candidate directory is writable.
pub fn default_cache_root() -> Result<PathBuf> {
    RootCandidates::from_env().resolve()
}

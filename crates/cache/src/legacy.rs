//! Import of the sidecar layout that predates `storage-keys.json`
//!
//! Older installations kept one metadata file next to each cached body:
//!
//! ```text
//! <root>/
//!   1f3a...e9.png          (body)
//!   1f3a...e9.png.meta     (JSON: url, dates, status line, headers)
//! ```
//!
//! The importer only reads these files. The storage engine writes the
//! imported entries out in the current format, after which the index document
//! takes precedence and this module is never consulted again.

use crate::codec::IndexedEntry;
use crate::entry::{CacheEntry, Resource};
use crate::http::{Header, StatusLine, http_date};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of legacy metadata sidecars
pub const SIDECAR_EXTENSION: &str = "meta";

#[derive(Debug, Deserialize)]
struct Sidecar {
    url: String,
    #[serde(with = "http_date")]
    request_date: DateTime<Utc>,
    #[serde(with = "http_date")]
    response_date: DateTime<Utc>,
    status_line: StatusLine,
    headers: Vec<Header>,
    #[serde(default)]
    variant_map: BTreeMap<String, String>,
}

/// Legacy artifacts found under a cache root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyLayout {
    root: PathBuf,
    sidecars: Vec<PathBuf>,
}

/// Look for legacy sidecars directly under `root`
///
/// Returns `None` when the directory is unreadable or holds no sidecars.
#[must_use]
pub fn detect(root: &Path) -> Option<LegacyLayout> {
    let entries = fs::read_dir(root).ok()?;
    let mut sidecars: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == SIDECAR_EXTENSION) && p.is_file())
        .collect();
    if sidecars.is_empty() {
        return None;
    }
    sidecars.sort();
    Some(LegacyLayout {
        root: root.to_path_buf(),
        sidecars,
    })
}

impl LegacyLayout {
    /// Cache root the layout was found in
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sidecar files, sorted by name
    #[must_use]
    pub fn sidecars(&self) -> &[PathBuf] {
        &self.sidecars
    }

    /// Reconstruct entries from every readable sidecar
    ///
    /// Sidecars that fail to parse, or whose body file is gone, are skipped.
    #[must_use]
    pub fn import(&self) -> Vec<(String, IndexedEntry)> {
        self.sidecars
            .iter()
            .filter_map(|sidecar| match import_one(sidecar) {
                Ok(imported) => Some(imported),
                Err(reason) => {
                    tracing::debug!(
                        sidecar = %sidecar.display(),
                        "Skipping legacy cache entry: {reason}"
                    );
                    None
                }
            })
            .collect()
    }
}

fn import_one(sidecar: &Path) -> Result<(String, IndexedEntry), String> {
    let body = sidecar.with_extension("");
    if !body.is_file() {
        return Err(format!("body file {} is missing", body.display()));
    }
    let raw = fs::read(sidecar).map_err(|e| e.to_string())?;
    let meta: Sidecar = serde_json::from_slice(&raw).map_err(|e| e.to_string())?;

    let entry = CacheEntry {
        request_date: meta.request_date,
        response_date: meta.response_date,
        status_line: meta.status_line,
        headers: meta.headers,
        resource: Resource::File(body.clone()),
        variant_map: meta.variant_map,
    };
    Ok((meta.url, IndexedEntry::new(body, entry)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sidecar(root: &Path, body_name: &str, url: &str) {
        let meta = serde_json::json!({
            "url": url,
            "request_date": "Fri, 01 Mar 2024 12:00:00 GMT",
            "response_date": "Fri, 01 Mar 2024 12:00:02 GMT",
            "status_line": "HTTP/1.1 200 OK",
            "headers": ["Content-Type: image/png", "ETag: \"v1\""],
        });
        fs::write(
            root.join(format!("{body_name}.meta")),
            serde_json::to_vec(&meta).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_detect_empty_root() {
        let tmp = TempDir::new().unwrap();
        assert!(detect(tmp.path()).is_none());
    }

    #[test]
    fn test_detect_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(detect(&tmp.path().join("nope")).is_none());
    }

    #[test]
    fn test_detect_ignores_unrelated_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.png"), b"body").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"hi").unwrap();
        assert!(detect(tmp.path()).is_none());
    }

    #[test]
    fn test_import_sidecar() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc.png"), b"png bytes").unwrap();
        write_sidecar(tmp.path(), "abc.png", "http://x/a.png");

        let layout = detect(tmp.path()).unwrap();
        assert_eq!(layout.sidecars().len(), 1);

        let imported = layout.import();
        assert_eq!(imported.len(), 1);
        let (key, indexed) = &imported[0];
        assert_eq!(key, "http://x/a.png");
        assert_eq!(indexed.path, tmp.path().join("abc.png"));
        assert_eq!(indexed.entry.status_line.code, 200);
        assert_eq!(indexed.entry.headers.len(), 2);
        assert_eq!(indexed.entry.resource.bytes().unwrap(), b"png bytes");
        assert!(indexed.entry.variant_map.is_empty());
    }

    #[test]
    fn test_import_skips_broken_entries() {
        let tmp = TempDir::new().unwrap();
        // Good entry
        fs::write(tmp.path().join("good"), b"ok").unwrap();
        write_sidecar(tmp.path(), "good", "http://x/good");
        // Body missing
        write_sidecar(tmp.path(), "orphan", "http://x/orphan");
        // Unparseable metadata
        fs::write(tmp.path().join("bad"), b"??").unwrap();
        fs::write(tmp.path().join("bad.meta"), b"{ nope").unwrap();

        let imported = detect(tmp.path()).unwrap().import();
        let keys: Vec<_> = imported.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["http://x/good"]);
    }

    #[test]
    fn test_import_leaves_legacy_files_untouched() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("abc"), b"body").unwrap();
        write_sidecar(tmp.path(), "abc", "http://x/abc");

        let _ = detect(tmp.path()).unwrap().import();
        assert!(tmp.path().join("abc").is_file());
        assert!(tmp.path().join("abc.meta").is_file());
    }
}

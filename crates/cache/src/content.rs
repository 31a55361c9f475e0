//! Content-addressed storage for response bodies
//!
//! Bodies are stored flat under the cache root as `<sha1>[.<ext>]`. The name
//! is a pure function of the bytes, so two responses with identical bodies
//! share one file. The extension is a cosmetic hint sniffed from image magic
//! bytes; unknown content gets no extension.
//!
//! ```text
//! <root>/
//!   storage-keys.json
//!   0beec7b5ea3f0fdbc95d0dd47f3c5bc275da8a33.png
//!   62cdb7020ff920e5aa642c3d4066950dd1f01f4d
//! ```

use crate::{Error, Result};
use image::ImageFormat;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// SHA-1 of the bytes as lowercase hex
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Preferred file extension of the image format the bytes start with
///
/// Only formats whose decoder is compiled in are recognized.
#[must_use]
pub fn sniff_extension(data: &[u8]) -> Option<String> {
    let format = image::guess_format(data).ok()?;
    if !format.reading_enabled() {
        return None;
    }
    preferred_extension(format)
}

fn preferred_extension(format: ImageFormat) -> Option<String> {
    format
        .extensions_str()
        .first()
        .map(|ext| ext.to_ascii_lowercase())
}

/// File name under which the bytes are stored
#[must_use]
pub fn file_name_for(data: &[u8]) -> String {
    let hash = content_hash(data);
    match sniff_extension(data) {
        Some(ext) => format!("{hash}.{ext}"),
        None => hash,
    }
}

/// Flat content-addressed body store rooted at the cache directory
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Create a store writing into `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the bodies are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a body would be stored at
    #[must_use]
    pub fn path_for(&self, data: &[u8]) -> PathBuf {
        self.root.join(file_name_for(data))
    }

    /// Store a body and return its path
    ///
    /// An existing file with the same name is replaced; since the name is
    /// derived from the content this leaves the same bytes in place.
    ///
    /// # Errors
    ///
    /// Returns error if IO operations fail
    pub fn store(&self, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(data);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let tmp_path = self.root.join(format!("{file_name}.tmp"));
        let mut file = fs::File::create(&tmp_path).map_err(|e| Error::io(e, &tmp_path, "create"))?;
        file.write_all(data)
            .map_err(|e| Error::io(e, &tmp_path, "write"))?;
        file.sync_all()
            .map_err(|e| Error::io(e, &tmp_path, "sync"))?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::io(e, &path, "rename"));
        }

        tracing::debug!(path = %path.display(), size = data.len(), "Stored response body");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_content_hash() {
        // SHA-1 of "hello world"
        assert_eq!(
            content_hash(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn test_sniff_known_images() {
        assert_eq!(sniff_extension(PNG_MAGIC).as_deref(), Some("png"));
        assert_eq!(sniff_extension(JPEG_MAGIC).as_deref(), Some("jpg"));
    }

    #[test]
    fn test_sniff_unknown_content() {
        assert_eq!(sniff_extension(b"plain text body"), None);
        assert_eq!(sniff_extension(b""), None);
    }

    #[test]
    fn test_file_name_for_png() {
        let name = file_name_for(PNG_MAGIC);
        assert_eq!(name, format!("{}.png", content_hash(PNG_MAGIC)));
    }

    #[test]
    fn test_file_name_without_extension() {
        assert_eq!(file_name_for(b"text"), content_hash(b"text"));
    }

    #[test]
    fn test_store_writes_bytes() {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(tmp.path());

        let path = store.store(PNG_MAGIC).unwrap();
        assert!(path.starts_with(tmp.path()));
        assert_eq!(fs::read(&path).unwrap(), PNG_MAGIC);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }

    #[test]
    fn test_store_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(tmp.path());

        let first = store.store(b"same bytes").unwrap();
        let second = store.store(b"same bytes").unwrap();
        assert_eq!(first, second);

        // Only the body itself; no temporary file left behind
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_store_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let store = ContentStore::new(tmp.path().join("does-not-exist"));
        assert!(matches!(store.store(b"x"), Err(Error::Io { .. })));
    }

    proptest! {
        #[test]
        fn prop_distinct_bodies_get_distinct_paths(
            a in prop::collection::vec(any::<u8>(), 0..64),
            b in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let store = ContentStore::new("/cache");
            prop_assert_eq!(store.path_for(&a), store.path_for(&a.clone()));
            if a != b {
                prop_assert_ne!(store.path_for(&a), store.path_for(&b));
            }
        }
    }
}

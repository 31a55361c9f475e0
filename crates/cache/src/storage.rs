//! The cache storage engine
//!
//! [`CacheStorage`] owns the in-memory index for one cache root and keeps
//! `storage-keys.json` in step with it. Every public operation runs under a
//! single mutex for its full duration, including disk I/O, so no caller ever
//! observes a half-applied mutation.

use crate::codec::{self, Index, IndexedEntry};
use crate::content::ContentStore;
use crate::entry::CacheEntry;
use crate::legacy;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the index document under the cache root
pub const INDEX_FILE_NAME: &str = "storage-keys.json";

/// Persistent HTTP response cache rooted at a directory
#[derive(Debug)]
pub struct CacheStorage {
    root: PathBuf,
    content: ContentStore,
    entries: Mutex<Index>,
}

impl CacheStorage {
    /// Open (creating if needed) the cache rooted at `root`
    ///
    /// Loads `storage-keys.json` when present. Otherwise legacy sidecars are
    /// imported and written out in the current format. A corrupt index is
    /// logged and discarded; the cache then starts empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root directory cannot be created or
    /// resolved.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(e, &root, "create_dir_all"))?;
        let root = fs::canonicalize(&root).map_err(|e| Error::io(e, &root, "canonicalize"))?;

        let storage = Self {
            content: ContentStore::new(root.clone()),
            root,
            entries: Mutex::new(Index::new()),
        };

        {
            let mut entries = storage.entries.lock();
            let index_path = storage.index_path();
            if index_path.exists() {
                *entries = storage.load(&index_path);
            } else if let Some(layout) = legacy::detect(&storage.root) {
                let imported = layout.import();
                tracing::info!(
                    root = %storage.root.display(),
                    sidecars = layout.sidecars().len(),
                    imported = imported.len(),
                    "Imported legacy cache entries"
                );
                if !imported.is_empty() {
                    entries.extend(imported);
                    // Failure is already logged and leaves the cache empty
                    let _ = storage.save(&mut entries);
                }
            }
        }

        Ok(storage)
    }

    /// The cache root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the index document
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Cache keys in index order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Look up the entry for `key`
    ///
    /// An entry whose body file has disappeared is dropped from the index
    /// rather than returned.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.lock();
        let indexed = entries.get(key)?;
        if indexed.path.is_file() {
            return Some(indexed.entry.clone());
        }

        tracing::warn!(
            key,
            path = %indexed.path.display(),
            "Cached body is missing; dropping entry"
        );
        entries.shift_remove(key);
        let _ = self.save(&mut entries);
        None
    }

    /// Store `entry` under `key`, replacing any previous entry
    ///
    /// The body is written to the content store first; if that fails the
    /// index is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the body or the index cannot be written. A
    /// failed index write also empties the in-memory index.
    pub fn put(&self, key: impl Into<String>, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.lock();
        let normalized = self.normalize(entry)?;
        entries.insert(key.into(), normalized);
        self.save(&mut entries)
    }

    /// Remove the entry for `key`, if any
    ///
    /// The body file is kept: another key may share it.
    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        entries.shift_remove(key);
        let _ = self.save(&mut entries);
    }

    /// Replace the entry for `key` with whatever `update` returns
    ///
    /// `update` receives the current entry (or `None`) and runs while the
    /// cache lock is held, so it must not call back into this cache.
    ///
    /// # Errors
    ///
    /// Returns the combinator's error unchanged, or an I/O error if the body
    /// or the index cannot be written.
    pub fn update<F>(&self, key: &str, update: F) -> Result<()>
    where
        F: FnOnce(Option<CacheEntry>) -> Result<CacheEntry>,
    {
        let mut entries = self.entries.lock();
        let current = entries.get(key).map(|indexed| indexed.entry.clone());
        let replacement = update(current)?;
        let normalized = self.normalize(replacement)?;
        entries.insert(key.to_string(), normalized);
        self.save(&mut entries)
    }

    /// Materialize the entry's body into the content store
    ///
    /// Metadata the index document could not read back is rejected before
    /// anything is written.
    fn normalize(&self, entry: CacheEntry) -> Result<IndexedEntry> {
        entry.validate()?;
        let bytes = entry.resource.bytes()?;
        let path = self.content.store(&bytes)?;
        Ok(IndexedEntry::new(path, entry))
    }

    fn load(&self, path: &Path) -> Index {
        let loaded = fs::read(path)
            .map_err(|e| Error::io(e, path, "read"))
            .and_then(|raw| codec::decode(&raw, &self.root));
        match loaded {
            Ok(index) => {
                tracing::debug!(
                    path = %path.display(),
                    entries = index.len(),
                    "Loaded cache index"
                );
                index
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to load cache storage: {e}");
                Index::new()
            }
        }
    }

    /// Rewrite the whole index document; on failure the index is emptied
    fn save(&self, entries: &mut Index) -> Result<()> {
        let result = self.write_index(entries);
        if let Err(e) = &result {
            tracing::warn!(root = %self.root.display(), "Failed to save cache storage: {e}");
            entries.clear();
        }
        result
    }

    fn write_index(&self, entries: &Index) -> Result<()> {
        let document = codec::encode(entries)?;
        let path = self.index_path();
        let tmp_path = self.root.join(format!("{INDEX_FILE_NAME}.tmp"));

        let mut file = fs::File::create(&tmp_path).map_err(|e| Error::io(e, &tmp_path, "create"))?;
        file.write_all(&document)
            .map_err(|e| Error::io(e, &tmp_path, "write"))?;
        file.sync_all()
            .map_err(|e| Error::io(e, &tmp_path, "sync"))?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(|e| Error::io(e, &path, "rename"))?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "Saved cache index");
        Ok(())
    }
}

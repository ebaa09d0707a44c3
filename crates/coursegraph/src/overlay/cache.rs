//! Read-through cache for JSON documents on disk.
//!
//! A cached value is reused as long as the file's modification time and size
//! are unchanged. The offline build replaces files wholesale, so either stamp
//! moving means the document must be re-read.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;
use crate::persist::read_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl From<&Metadata> for FileStamp {
    fn from(meta: &Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    stamp: FileStamp,
    value: Arc<T>,
}

/// A JSON document read on first use and re-read when the file changes.
#[derive(Debug)]
pub struct CachedDocument<T> {
    path: PathBuf,
    entry: Option<Entry<T>>,
}

impl<T: DeserializeOwned> CachedDocument<T> {
    /// Cache for the document at `path`. Nothing is read until [`get`](Self::get).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
        }
    }

    /// Path of the cached document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document, re-reading the file if it changed since the last read.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed. A
    /// failed read drops any previously cached value.
    pub fn get(&mut self) -> Result<Option<Arc<T>>> {
        let meta = match std::fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.entry = None;
                return Ok(None);
            }
            Err(e) => {
                self.entry = None;
                return Err(e.into());
            }
        };
        let stamp = FileStamp::from(&meta);

        if let Some(entry) = &self.entry {
            if entry.stamp == stamp {
                return Ok(Some(Arc::clone(&entry.value)));
            }
            debug!(path = %self.path.display(), "Cached document changed on disk, reloading");
        }

        self.entry = None;
        let value = Arc::new(read_json::<T>(&self.path)?);
        self.entry = Some(Entry {
            stamp,
            value: Arc::clone(&value),
        });
        Ok(Some(value))
    }

    /// Drop the cached value so the next [`get`](Self::get) re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Whether a value is currently cached.
    pub fn is_cached(&self) -> bool {
        self.entry.is_some()
    }
}

//! Flat JSON file store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{Collection, RecordStore, StoreError, StoreResult};

/// Collection persisted as a single JSON object document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the document at path, creating an empty one if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        if !store.path.exists() {
            tracing::info!(path = %store.path.display(), "Creating empty record document");
            store.save(&Collection::new())?;
        }
        Ok(store)
    }

    /// Wrap an existing path without touching the filesystem.
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn unavailable(&self, source: std::io::Error) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> StoreResult<Collection> {
        let raw = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write to a sibling temp file, then rename it over the document.
    fn save(&self, collection: &Collection) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(|e| self.unavailable(e))?;
        serde_json::to_writer_pretty(&mut tmp, collection)?;
        tmp.write_all(b"\n").map_err(|e| self.unavailable(e))?;
        tmp.as_file().sync_all().map_err(|e| self.unavailable(e))?;
        // The temp file is created owner-only; keep the document's own mode.
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| self.unavailable(e))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| self.unavailable(e.error))?;
        Ok(())
    }
}

//! Durable file-backed store implementation.
//!
//! # Responsibility
//! - Persist each key as one file under a root directory.
//! - Keep writes whole-value: temp file first, then rename over the target.
//!
//! # Invariants
//! - A key never maps outside the root directory (names are sanitized).
//! - A failed write leaves the previous value intact.

use super::{KeyValueStore, StoreError, StoreResult};
use log::{error, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File-per-key store rooted at a directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    capacity_bytes: Option<usize>,
}

impl FileStore {
    /// Opens (creating if needed) an unbounded store at `root`.
    ///
    /// # Side effects
    /// - Creates the root directory.
    /// - Emits `store_open` logging events with status.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_inner(root.as_ref().to_path_buf(), None)
    }

    /// Opens a store that rejects writes once `capacity_bytes` of value
    /// data would be stored across all keys.
    pub fn open_with_capacity(root: impl AsRef<Path>, capacity_bytes: usize) -> StoreResult<Self> {
        Self::open_inner(root.as_ref().to_path_buf(), Some(capacity_bytes))
    }

    fn open_inner(root: PathBuf, capacity_bytes: Option<usize>) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start mode=file");

        if let Err(err) = fs::create_dir_all(&root) {
            error!(
                "event=store_open module=store status=error duration_ms={} error_code=store_root_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=store_open module=store status=ok mode=file duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            root,
            capacity_bytes,
        })
    }

    /// Returns the total number of value bytes currently stored.
    pub fn used_bytes(&self) -> StoreResult<usize> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                total += entry.metadata()?.len() as usize;
            }
        }
        Ok(total)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Keys stay inside the root: anything outside a conservative
        // character set becomes '_'.
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(sanitized)
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &[u8]) -> StoreResult<()> {
        let target = self.key_path(key);

        if let Some(capacity) = self.capacity_bytes {
            let existing = match fs::metadata(&target) {
                Ok(meta) => meta.len() as usize,
                Err(err) if err.kind() == ErrorKind::NotFound => 0,
                Err(err) => return Err(err.into()),
            };
            let attempted = self.used_bytes()? - existing + value.len();
            if attempted > capacity {
                return Err(StoreError::QuotaExceeded {
                    attempted_bytes: attempted,
                    capacity_bytes: capacity,
                });
            }
        }

        let mut staged = target.clone().into_os_string();
        staged.push(".tmp");
        let staged = PathBuf::from(staged);
        fs::write(&staged, value)?;
        fs::rename(&staged, &target)?;
        Ok(())
    }
}

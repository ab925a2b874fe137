//! `std::fs` backed storage for host builds and the simulator.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::{DirEntry, Storage, StorageError};

/// Maps browsing paths onto a directory on the host filesystem, so "/"
/// inside the screen is `root` on disk.
pub struct HostStorage {
    root: PathBuf,
}

impl HostStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

fn map_io_error(err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io(err.to_string()),
    }
}

fn entry_for(name: String, path: &Path) -> Result<DirEntry, StorageError> {
    let metadata = fs::metadata(path).map_err(map_io_error)?;
    Ok(DirEntry {
        name,
        size: metadata.len(),
        is_directory: metadata.is_dir(),
    })
}

impl Storage for HostStorage {
    fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        let dir = self.resolve(path);
        if dir.is_file() {
            return Err(StorageError::NotADirectory);
        }
        let mut entries = Vec::new();
        for item in fs::read_dir(&dir).map_err(map_io_error)? {
            let item = item.map_err(map_io_error)?;
            let name = match item.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::debug!("skipping non-UTF-8 entry {:?}", raw);
                    continue;
                }
            };
            entries.push(entry_for(name, &item.path())?);
        }
        Ok(entries)
    }
}

//! In-memory storage for simulators and tests.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::storage::{basename, dirname, DirEntry, Storage, StorageError};

#[derive(Clone)]
enum MockEntry {
    File { data: Vec<u8> },
    Directory { children: Vec<String> },
}

/// Mock storage backed by a path map.
///
/// `add_file`/`add_directory` register entries under their full path and
/// link them into the parent directory listing.
pub struct MockStorage {
    entries: BTreeMap<String, MockEntry>,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorage {
    /// Create a mock storage containing only the root directory.
    pub fn new() -> Self {
        let mut storage = Self {
            entries: BTreeMap::new(),
        };
        storage.insert_directory("/");
        storage
    }

    /// Add a directory, creating missing parents.
    pub fn add_directory(&mut self, path: &str) {
        if path != "/" {
            let parent = dirname(path);
            if !self.entries.contains_key(parent) {
                self.add_directory(parent);
            }
            self.link_child(parent, basename(path));
        }
        self.insert_directory(path);
    }

    /// Add a file with the given contents, creating missing parents.
    pub fn add_file(&mut self, path: &str, data: &[u8]) {
        let parent = dirname(path);
        if !self.entries.contains_key(parent) {
            self.add_directory(parent);
        }
        self.link_child(parent, basename(path));
        self.entries.insert(
            path.to_string(),
            MockEntry::File {
                data: data.to_vec(),
            },
        );
    }

    fn insert_directory(&mut self, path: &str) {
        self.entries
            .entry(path.to_string())
            .or_insert(MockEntry::Directory {
                children: Vec::new(),
            });
    }

    fn link_child(&mut self, parent: &str, name: &str) {
        if let Some(MockEntry::Directory { children }) = self.entries.get_mut(parent) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn child_path(parent: &str, name: &str) -> String {
        crate::storage::join_path(parent, name)
    }
}

impl Storage for MockStorage {
    fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>, StorageError> {
        let children = match self.entries.get(path) {
            Some(MockEntry::Directory { children }) => children.clone(),
            Some(MockEntry::File { .. }) => return Err(StorageError::NotADirectory),
            None => return Err(StorageError::NotFound),
        };

        let mut listing = Vec::with_capacity(children.len());
        for name in children {
            let full = Self::child_path(path, &name);
            match self.entries.get(&full) {
                Some(MockEntry::File { data }) => listing.push(DirEntry {
                    name,
                    size: data.len() as u64,
                    is_directory: false,
                }),
                Some(MockEntry::Directory { .. }) => listing.push(DirEntry {
                    name,
                    size: 0,
                    is_directory: true,
                }),
                None => {}
            }
        }
        Ok(listing)
    }

}

//! Storage abstraction for the browsing screen.
//!
//! The screen only needs directory enumeration, so the trait stays
//! narrow. Implementations:
//! - [`crate::HostStorage`] over `std::fs` (host builds)
//! - [`crate::MockStorage`] in-memory (simulators and tests)

use alloc::string::String;
use alloc::vec::Vec;

/// One directory child as reported by [`Storage::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Storage error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    NotADirectory,
    Io(String),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "not found"),
            StorageError::NotADirectory => write!(f, "not a directory"),
            StorageError::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

/// Trait for storage operations used by the browsing screen.
///
/// Directory enumeration is all the screen needs; book contents are
/// read by the format layer, which owns its own file access.
pub trait Storage {
    /// Enumerate the direct children of `path`.
    fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>, StorageError>;
}

/// Filename without its leading path.
pub fn basename(path: &str) -> &str {
    path.rfind('/').map(|i| &path[i + 1..]).unwrap_or(path)
}

/// Parent directory of a path.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

/// Join a directory path and a child name.
pub fn join_path(base: &str, name: &str) -> String {
    let mut joined = String::with_capacity(base.len() + name.len() + 1);
    joined.push_str(base);
    if !base.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(name);
    joined
}

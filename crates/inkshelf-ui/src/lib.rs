//! Library browsing screen for the Inkshelf e-reader.
//!
//! Lists a storage directory, navigates subdirectories, and opens book
//! files. Leaf directories (files only) render as a paginated cover
//! grid; covers are loaded one per tick by a background display worker
//! so input handling never blocks on storage or decoding.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod book;
pub mod buffered_display;
pub mod input;
pub mod library_activity;
pub mod mock_storage;
pub mod sort;
pub mod storage;
pub mod ui;

#[cfg(feature = "std")]
pub mod formats;
#[cfg(feature = "std")]
pub mod host_storage;
#[cfg(feature = "std")]
pub mod worker;

/// Panel dimensions as seen by the UI (portrait).
pub const DISPLAY_WIDTH: u32 = 480;
pub const DISPLAY_HEIGHT: u32 = 800;

pub use book::{BookCover, BookReader, CoverBitmap, StubBookReader};
pub use buffered_display::{BufferedDisplay, DisplayPanel};
pub use input::{Button, InputEvent};
pub use library_activity::{GridEntry, LibraryState, GRID_COLS, GRID_THUMB_HEIGHT, HOLD_TO_ROOT_MS};
pub use mock_storage::MockStorage;
pub use sort::sort_file_list;
pub use storage::{basename, dirname, join_path, DirEntry, Storage, StorageError};
pub use ui::{Activity, ActivityResult};

#[cfg(feature = "std")]
pub use formats::FormatBookReader;
#[cfg(feature = "std")]
pub use host_storage::HostStorage;
#[cfg(feature = "std")]
pub use library_activity::LibraryActivity;
#[cfg(feature = "std")]
pub use worker::DisplayWorker;

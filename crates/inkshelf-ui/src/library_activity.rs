//! The library browsing screen.
//!
//! Branch directories (containing subdirectories) render as a scrolling
//! list; leaf directories (files only) render as a paginated cover
//! grid. Covers are loaded incrementally, one entry per dispatch tick,
//! by the background display worker, and completed grid pages are
//! cached as whole frames so revisiting them costs a buffer copy
//! instead of a redraw plus cover re-decoding.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::{mono_font::MonoTextStyle, pixelcolor::BinaryColor, prelude::*, text::{Baseline, Text}};

use crate::book::{title_from_filename, BookReader, CoverBitmap};
use crate::buffered_display::{BufferedDisplay, DisplayPanel};
use crate::input::{Button, InputEvent};
use crate::sort::sort_file_list;
use crate::storage::{basename, dirname, join_path, Storage};
use crate::ui::components::{draw_page_indicator, ButtonHints, CoverGrid, GridCell, Header, ItemList};
use crate::ui::theme::{ui_font_body, ThemeMetrics};
use crate::ui::ActivityResult;
use crate::DISPLAY_HEIGHT;

/// Grid layout: three covers per row at a fixed thumbnail height.
pub const GRID_COLS: usize = 3;
pub const GRID_THUMB_HEIGHT: u32 = 180;
pub const GRID_CELL_GAP: i32 = 10;

/// Holding Back this long jumps straight to the storage root.
pub const HOLD_TO_ROOT_MS: u32 = 1000;

/// One OS-reserved directory name never shown to the user.
const SYSTEM_VOLUME_DIR: &str = "System Volume Information";

/// Per-file record backing one grid cell.
///
/// Created unloaded for every file when a leaf directory is entered and
/// filled in exactly once by the incremental cover loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridEntry {
    pub title: String,
    pub cover_bmp_path: String,
    pub loaded: bool,
}

/// Snapshot of a fully rendered grid page.
///
/// Single slot; dropping the struct releases the frame, so cache
/// validity and buffer lifetime are the same thing.
struct FrameCache {
    page: i32,
    frame: Vec<u8>,
}

fn snapshot_frame(buffer: &[u8]) -> Option<Vec<u8>> {
    let mut frame = Vec::new();
    if frame.try_reserve_exact(buffer.len()).is_err() {
        log::warn!("frame cache allocation failed, page will not be cached");
        return None;
    }
    frame.extend_from_slice(buffer);
    Some(frame)
}

/// Complete state of the browsing screen.
///
/// The foreground input path and the background display worker share
/// one instance behind a single mutex; every method is a discrete
/// transition performed under that lock.
pub struct LibraryState {
    storage: Box<dyn Storage + Send>,
    books: Box<dyn BookReader + Send>,
    theme: ThemeMetrics,

    base_path: String,
    files: Vec<String>,
    selector_index: usize,

    grid_mode: bool,
    grid_entries: Vec<GridEntry>,
    current_page: i32,
    page_covers_loaded: bool,
    page_load_index: usize,
    frame_cache: Option<FrameCache>,

    update_required: bool,
    restored_last_render: bool,
    hold_acted: bool,
}

impl LibraryState {
    pub fn new(
        storage: Box<dyn Storage + Send>,
        books: Box<dyn BookReader + Send>,
        base_path: &str,
    ) -> Self {
        Self {
            storage,
            books,
            theme: ThemeMetrics::new(),
            base_path: base_path.to_string(),
            files: Vec::new(),
            selector_index: 0,
            grid_mode: false,
            grid_entries: Vec::new(),
            current_page: -1,
            page_covers_loaded: false,
            page_load_index: 0,
            frame_cache: None,
            update_required: false,
            restored_last_render: false,
            hold_acted: false,
        }
    }

    /// Screen became visible: load the starting directory.
    pub fn enter(&mut self) {
        self.load_files();
        self.selector_index = 0;
        self.update_required = true;
    }

    /// Screen is going away: release the listing and all buffers.
    pub fn exit(&mut self) {
        self.files.clear();
        self.grid_entries.clear();
        self.frame_cache = None;
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn selected_index(&self) -> usize {
        self.selector_index
    }

    pub fn grid_mode(&self) -> bool {
        self.grid_mode
    }

    pub fn current_page(&self) -> i32 {
        self.current_page
    }

    pub fn page_covers_loaded(&self) -> bool {
        self.page_covers_loaded
    }

    pub fn needs_redraw(&self) -> bool {
        self.update_required
    }

    /// Page the frame cache currently holds, if any.
    pub fn cached_page(&self) -> Option<i32> {
        self.frame_cache.as_ref().map(|c| c.page)
    }

    /// Whether the most recent grid render came from the frame cache.
    pub fn last_render_restored(&self) -> bool {
        self.restored_last_render
    }

    /// A directory is a leaf when it holds at least one file and no
    /// subdirectories; only leaves use the cover grid.
    pub fn is_leaf_directory(&self) -> bool {
        !self.files.is_empty() && !self.files.iter().any(|f| f.ends_with('/'))
    }

    fn grid_widget() -> CoverGrid {
        CoverGrid {
            thumb_height: GRID_THUMB_HEIGHT,
            columns: GRID_COLS,
            gap: GRID_CELL_GAP,
        }
    }

    /// Grid cells that fit the screen. Pure function of the fixed
    /// layout constants, safe to call every frame.
    pub fn items_per_page(&self) -> usize {
        let cell_height = Self::grid_widget().cell_height();
        if cell_height <= 0 {
            return 0;
        }
        let rows = self.theme.content_height(DISPLAY_HEIGHT) / cell_height;
        rows.max(0) as usize * GRID_COLS
    }

    pub fn page_for_index(&self, index: usize) -> i32 {
        let ipp = self.items_per_page();
        if ipp == 0 {
            0
        } else {
            (index / ipp) as i32
        }
    }

    /// Begin loading covers for `page`. This is the only place the load
    /// cursor jumps; entries already loaded on a previous visit are
    /// skipped by the loader, never re-checked.
    pub fn start_page_load(&mut self, page: i32) {
        if self.frame_cache.as_ref().is_some_and(|c| c.page != page) {
            self.frame_cache = None;
        }
        self.current_page = page;
        self.page_covers_loaded = false;
        self.page_load_index = page.max(0) as usize * self.items_per_page();
    }

    /// One unit of cover-loading work: load at most one grid entry.
    ///
    /// Bounded work per call is what keeps input handling responsive
    /// while a page loads from slow storage.
    pub fn load_next_page_cover(&mut self) {
        if self.current_page < 0 {
            // No page started yet; the first render will start one.
            self.page_covers_loaded = true;
            return;
        }
        let ipp = self.items_per_page();
        let page_end = if ipp == 0 {
            self.grid_entries.len()
        } else {
            ((self.current_page as usize + 1) * ipp).min(self.grid_entries.len())
        };

        // Skip entries loaded on a previous visit to this page.
        while self.page_load_index < page_end && self.grid_entries[self.page_load_index].loaded {
            self.page_load_index += 1;
        }
        if self.page_load_index >= page_end {
            self.page_covers_loaded = true;
            return;
        }

        let index = self.page_load_index;
        let full_path = join_path(&self.base_path, &self.files[index]);
        let cover = self.books.load_book(&full_path, GRID_THUMB_HEIGHT);
        let entry = &mut self.grid_entries[index];
        entry.title = if cover.title.is_empty() {
            title_from_filename(&self.files[index])
        } else {
            cover.title
        };
        entry.cover_bmp_path = cover.cover_bmp_path;
        entry.loaded = true;
        self.page_load_index += 1;
        if self.page_load_index >= page_end {
            self.page_covers_loaded = true;
        }
        self.update_required = true;
    }

    /// Rebuild the file list for the current directory.
    ///
    /// Storage failures degrade to an empty listing; the screen shows
    /// "No books found" instead of an error.
    pub fn load_files(&mut self) {
        self.files.clear();

        let entries = match self.storage.list_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("unable to open '{}': {}", self.base_path, err);
                Vec::new()
            }
        };
        for entry in entries {
            if entry.name.starts_with('.') || entry.name == SYSTEM_VOLUME_DIR {
                continue;
            }
            if entry.is_directory {
                let mut name = entry.name;
                name.push('/');
                self.files.push(name);
            } else if crate::book::is_supported_book(&entry.name) {
                self.files.push(entry.name);
            }
        }
        sort_file_list(&mut self.files);

        // Grid state is rebuilt from scratch on every directory change.
        self.frame_cache = None;
        self.grid_entries.clear();
        self.current_page = -1;
        self.page_covers_loaded = false;
        self.page_load_index = 0;

        self.grid_mode = self.is_leaf_directory();
        if self.grid_mode {
            self.grid_entries = alloc::vec![GridEntry::default(); self.files.len()];
        }
        log::info!(
            "loaded {} entries from '{}' ({} mode)",
            self.files.len(),
            self.base_path,
            if self.grid_mode { "grid" } else { "list" }
        );
    }

    fn find_entry(&self, name: &str) -> usize {
        self.files.iter().position(|f| f == name).unwrap_or(0)
    }

    /// Translate one input event into a browsing transition.
    ///
    /// A press that triggered a hold action ends with a release carrying
    /// the same hold duration; that release must not fire the short-press
    /// variant on top, so any acted-on `Held` suppresses the `Released`
    /// that follows it.
    pub fn handle_input(&mut self, event: InputEvent) -> ActivityResult {
        match event {
            InputEvent::Pressed(_) => {
                self.hold_acted = false;
                ActivityResult::Ignored
            }
            InputEvent::Held {
                button: Button::Back,
                held_ms,
            } if held_ms >= HOLD_TO_ROOT_MS => {
                self.hold_acted = true;
                if self.base_path == "/" {
                    return ActivityResult::Ignored;
                }
                self.base_path = String::from("/");
                self.load_files();
                self.selector_index = 0;
                self.update_required = true;
                ActivityResult::Consumed
            }
            InputEvent::Held { button, .. } => {
                let result = self.move_selection(button, true);
                if result == ActivityResult::Consumed {
                    self.hold_acted = true;
                }
                result
            }
            InputEvent::Released { button, held_ms } => {
                if core::mem::take(&mut self.hold_acted) {
                    return ActivityResult::Ignored;
                }
                match button {
                    Button::Confirm => self.confirm_selection(),
                    Button::Back => {
                        if held_ms >= HOLD_TO_ROOT_MS {
                            // Hold threshold passed without a repeat
                            // event being delivered.
                            return ActivityResult::Ignored;
                        }
                        self.back_one_level()
                    }
                    _ => self.move_selection(button, false),
                }
            }
        }
    }

    fn confirm_selection(&mut self) -> ActivityResult {
        if self.files.is_empty() {
            return ActivityResult::Ignored;
        }
        let name = self.files[self.selector_index].clone();
        if let Some(dir) = name.strip_suffix('/') {
            self.base_path = join_path(&self.base_path, dir);
            self.load_files();
            self.selector_index = 0;
            self.update_required = true;
            ActivityResult::Consumed
        } else {
            ActivityResult::OpenBook(join_path(&self.base_path, &name))
        }
    }

    fn back_one_level(&mut self) -> ActivityResult {
        if self.base_path == "/" {
            return ActivityResult::GoHome;
        }
        // Reselect the directory we just left in the parent listing.
        let mut exited = basename(&self.base_path).to_string();
        exited.push('/');
        self.base_path = dirname(&self.base_path).to_string();
        self.load_files();
        self.selector_index = self.find_entry(&exited);
        self.update_required = true;
        ActivityResult::Consumed
    }

    fn move_selection(&mut self, button: Button, continuous: bool) -> ActivityResult {
        let len = self.files.len();
        if len == 0 {
            return ActivityResult::Ignored;
        }
        let index = self.selector_index;
        let next = if self.grid_mode {
            let ipp = self.items_per_page();
            match (button, continuous) {
                (Button::Left, false) => wrap_back(index, 1, len),
                (Button::Right, false) => wrap_forward(index, 1, len),
                (Button::Up, false) => wrap_back(index, GRID_COLS, len),
                (Button::Down, false) => wrap_forward(index, GRID_COLS, len),
                (Button::Up, true) => wrap_back(index, ipp, len),
                (Button::Down, true) => wrap_forward(index, ipp, len),
                _ => return ActivityResult::Ignored,
            }
        } else {
            let page_items = self.theme.list_rows(DISPLAY_HEIGHT);
            match (button, continuous) {
                (Button::Up | Button::Left, false) => wrap_back(index, 1, len),
                (Button::Down | Button::Right, false) => wrap_forward(index, 1, len),
                (Button::Up | Button::Left, true) => wrap_back(index, page_items, len),
                (Button::Down | Button::Right, true) => wrap_forward(index, page_items, len),
                _ => return ActivityResult::Ignored,
            }
        };
        self.selector_index = next;
        self.update_required = true;
        ActivityResult::Consumed
    }

    /// One scheduling tick: render if a redraw is pending, then perform
    /// one unit of cover loading when the visible page is incomplete.
    /// Always called under the shared lock, so the frame buffer and
    /// grid entries are never observed half-updated.
    pub fn dispatch(&mut self, display: &mut BufferedDisplay, panel: &mut dyn DisplayPanel) {
        if self.update_required {
            self.update_required = false;
            let _ = self.render(display, panel);
        }
        if self.grid_mode && !self.page_covers_loaded {
            self.load_next_page_cover();
        }
    }

    fn render(
        &mut self,
        display: &mut BufferedDisplay,
        panel: &mut dyn DisplayPanel,
    ) -> Result<(), Infallible> {
        if self.grid_mode {
            self.render_grid(display, panel)
        } else {
            self.render_list(display, panel)
        }
    }

    fn header_title(&self) -> String {
        if self.base_path == "/" {
            String::from("SD card")
        } else {
            basename(&self.base_path).to_string()
        }
    }

    fn render_list(
        &mut self,
        display: &mut BufferedDisplay,
        panel: &mut dyn DisplayPanel,
    ) -> Result<(), Infallible> {
        display.clear();

        let title = self.header_title();
        Header::new(&title).render(display, &self.theme)?;

        if self.files.is_empty() {
            let style = MonoTextStyle::new(ui_font_body(), BinaryColor::On);
            Text::with_baseline(
                "No books found",
                Point::new(self.theme.side_padding, self.theme.content_top() + 20),
                style,
                Baseline::Top,
            )
            .draw(display)?;
        } else {
            ItemList::render(display, &self.theme, &self.files, self.selector_index)?;
        }

        let back_label = if self.base_path == "/" {
            "\u{ab} Home"
        } else {
            "\u{ab} Back"
        };
        ButtonHints::new([back_label, "Open", "Up", "Down"]).render(display, &self.theme)?;

        panel.present(display.buffer());
        Ok(())
    }

    fn render_grid(
        &mut self,
        display: &mut BufferedDisplay,
        panel: &mut dyn DisplayPanel,
    ) -> Result<(), Infallible> {
        let grid = Self::grid_widget();
        let ipp = self.items_per_page();
        let view_page = self.page_for_index(self.selector_index);
        if view_page != self.current_page {
            self.start_page_load(view_page);
        }

        let count = self.grid_entries.len();
        let page_start = if ipp == 0 {
            0
        } else {
            view_page.max(0) as usize * ipp
        };
        let page_count = if ipp == 0 {
            count
        } else {
            ipp.min(count.saturating_sub(page_start))
        };
        let local_selected = self.selector_index as i32 - page_start as i32;

        // A cached frame for this exact page replaces clear, header and
        // cover drawing with one buffer copy.
        let restored = match &self.frame_cache {
            Some(cache) if cache.page == view_page && cache.frame.len() == display.buffer().len() => {
                display.buffer_mut().copy_from_slice(&cache.frame);
                true
            }
            _ => false,
        };
        self.restored_last_render = restored;

        if !restored {
            display.clear();
            let title = self.header_title();
            Header::new(&title).render(display, &self.theme)?;
        }

        let mut covers: Vec<Option<CoverBitmap>> = Vec::with_capacity(page_count);
        for k in 0..page_count {
            let entry = &self.grid_entries[page_start + k];
            if !restored && entry.loaded && !entry.cover_bmp_path.is_empty() {
                covers.push(self.books.read_thumbnail(&entry.cover_bmp_path));
            } else {
                covers.push(None);
            }
        }

        {
            let cells: Vec<GridCell<'_>> = (0..page_count)
                .map(|k| {
                    let i = page_start + k;
                    let entry = &self.grid_entries[i];
                    GridCell {
                        // Until an entry loads, its cell shows the raw
                        // filename.
                        title: if entry.loaded {
                            entry.title.as_str()
                        } else {
                            self.files[i].as_str()
                        },
                        cover: covers[k].as_ref(),
                    }
                })
                .collect();
            grid.render(display, &self.theme, &cells, local_selected, restored)?;
        }

        // Cache the finished frame once every cover on the page is in.
        if !restored && self.page_covers_loaded {
            self.frame_cache = snapshot_frame(display.buffer()).map(|frame| FrameCache {
                page: view_page,
                frame,
            });
        }

        // Page indicator and hints change independently of the cached
        // area, so they are drawn after the snapshot.
        if ipp > 0 {
            let total_pages = (count + ipp - 1) / ipp;
            if total_pages > 1 {
                draw_page_indicator(display, &self.theme, view_page, total_pages as i32)?;
            }
        }
        ButtonHints::new(["\u{ab} Home", "Open", "Up", "Down"]).render(display, &self.theme)?;

        panel.present(display.buffer());
        Ok(())
    }
}

fn wrap_forward(index: usize, step: usize, len: usize) -> usize {
    (index + step % len) % len
}

fn wrap_back(index: usize, step: usize, len: usize) -> usize {
    (index + len - step % len) % len
}

#[cfg(feature = "std")]
pub(crate) fn lock_state(
    state: &std::sync::Mutex<LibraryState>,
) -> std::sync::MutexGuard<'_, LibraryState> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Host-facing wrapper owning the shared state and the display worker.
///
/// Entering the screen spawns the worker; leaving it waits out any
/// in-flight render or load unit before tearing the worker down, so a
/// panel write is never interrupted mid-operation.
#[cfg(feature = "std")]
pub struct LibraryActivity {
    state: std::sync::Arc<std::sync::Mutex<LibraryState>>,
    panel: Option<Box<dyn DisplayPanel + Send>>,
    worker: Option<crate::worker::DisplayWorker>,
}

#[cfg(feature = "std")]
impl LibraryActivity {
    pub fn new(
        state: std::sync::Arc<std::sync::Mutex<LibraryState>>,
        panel: Box<dyn DisplayPanel + Send>,
    ) -> Self {
        Self {
            state,
            panel: Some(panel),
            worker: None,
        }
    }

    /// Shared handle to the browsing state, for hosts and tests.
    pub fn state(&self) -> std::sync::Arc<std::sync::Mutex<LibraryState>> {
        std::sync::Arc::clone(&self.state)
    }
}

#[cfg(feature = "std")]
impl crate::ui::Activity for LibraryActivity {
    fn on_enter(&mut self) {
        lock_state(&self.state).enter();
        if let Some(panel) = self.panel.take() {
            self.worker = Some(crate::worker::DisplayWorker::spawn(
                std::sync::Arc::clone(&self.state),
                panel,
            ));
        }
    }

    fn on_exit(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.panel = worker.stop();
        }
        lock_state(&self.state).exit();
    }

    fn handle_input(&mut self, event: InputEvent) -> ActivityResult {
        lock_state(&self.state).handle_input(event)
    }
}

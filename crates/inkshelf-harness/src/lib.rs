//! Host-side scenario harness for scripted library-browsing flows.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use inkshelf_ui::{
    ActivityResult, BufferedDisplay, Button, DisplayPanel, InputEvent, LibraryState, MockStorage,
    StubBookReader, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use png::{BitDepth, ColorType, Encoder};

/// Panel stand-in that counts refreshes instead of driving hardware.
pub struct CountingPanel {
    presents: Arc<AtomicUsize>,
}

impl CountingPanel {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let presents = Arc::new(AtomicUsize::new(0));
        (
            Self {
                presents: Arc::clone(&presents),
            },
            presents,
        )
    }
}

impl DisplayPanel for CountingPanel {
    fn present(&mut self, _frame: &[u8]) {
        self.presents.fetch_add(1, Ordering::Relaxed);
    }
}

/// Couples browsing state, an in-memory storage tree, a stub book
/// reader, and a frame buffer for scenario tests.
///
/// Scenarios drive the dispatch loop synchronously with [`tick`] and
/// [`pump_until_idle`] instead of spawning the display worker, so every
/// assertion observes a deterministic number of render and load steps.
///
/// [`tick`]: ScenarioHarness::tick
/// [`pump_until_idle`]: ScenarioHarness::pump_until_idle
pub struct ScenarioHarness {
    state: Arc<Mutex<LibraryState>>,
    display: BufferedDisplay,
    panel: CountingPanel,
    presents: Arc<AtomicUsize>,
    book_loads: Arc<AtomicUsize>,
}

impl ScenarioHarness {
    /// Harness over a caller-built storage tree. Every book reports a
    /// synthetic cover.
    pub fn new(storage: MockStorage) -> Self {
        let (reader, book_loads) = StubBookReader::with_covers();
        let (panel, presents) = CountingPanel::new();
        let state = Arc::new(Mutex::new(LibraryState::new(
            Box::new(storage),
            Box::new(reader),
            "/",
        )));
        lock(&state).enter();
        Self {
            state,
            display: BufferedDisplay::new(),
            panel,
            presents,
            book_loads,
        }
    }

    /// Storage tree with `books` EPUB files at the root.
    pub fn with_flat_library(books: usize) -> Self {
        let mut storage = MockStorage::new();
        for i in 1..=books {
            storage.add_file(&format!("/book{}.epub", i), b"zip");
        }
        Self::new(storage)
    }

    /// Simulate a short press-and-release of `button`.
    pub fn press(&mut self, button: Button) -> ActivityResult {
        lock(&self.state).handle_input(InputEvent::Released {
            button,
            held_ms: 120,
        })
    }

    /// Simulate holding `button` for `held_ms` before release.
    pub fn hold(&mut self, button: Button, held_ms: u32) -> ActivityResult {
        let result = lock(&self.state).handle_input(InputEvent::Held { button, held_ms });
        lock(&self.state).handle_input(InputEvent::Released { button, held_ms });
        result
    }

    /// One dispatch tick: at most one render plus one cover load.
    pub fn tick(&mut self) {
        lock(&self.state).dispatch(&mut self.display, &mut self.panel);
    }

    /// Tick until no redraw is pending and the visible page is fully
    /// loaded. Returns the number of ticks spent. Panics when the cap
    /// is hit, which means a scenario never settled.
    pub fn pump_until_idle(&mut self) -> usize {
        const MAX_TICKS: usize = 64;
        for ticks in 0..MAX_TICKS {
            if self.is_idle() {
                return ticks;
            }
            self.tick();
        }
        panic!("scenario never went idle after {} ticks", MAX_TICKS);
    }

    fn is_idle(&self) -> bool {
        let state = lock(&self.state);
        !state.needs_redraw() && (!state.grid_mode() || state.page_covers_loaded())
    }

    /// Panel refreshes so far.
    pub fn presents(&self) -> usize {
        self.presents.load(Ordering::Relaxed)
    }

    /// Book parses so far.
    pub fn book_loads(&self) -> usize {
        self.book_loads.load(Ordering::Relaxed)
    }

    /// Run assertions against the browsing state.
    pub fn with_state<T>(&self, f: impl FnOnce(&LibraryState) -> T) -> T {
        f(&lock(&self.state))
    }

    /// Shared state handle, for scenarios that spawn the real worker.
    pub fn state(&self) -> Arc<Mutex<LibraryState>> {
        Arc::clone(&self.state)
    }

    /// Save the current frame to a PNG (white = Off, black = On).
    pub fn save_screenshot_png(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let mut data = Vec::with_capacity((DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize);
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                data.push(match self.display.pixel(x, y) {
                    embedded_graphics::pixelcolor::BinaryColor::On => 0u8,
                    embedded_graphics::pixelcolor::BinaryColor::Off => 255u8,
                });
            }
        }

        let file = File::create(path).map_err(|e| e.to_string())?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, DISPLAY_WIDTH, DISPLAY_HEIGHT);
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
        png_writer
            .write_image_data(&data)
            .map_err(|e| e.to_string())
    }
}

fn lock(state: &Mutex<LibraryState>) -> std::sync::MutexGuard<'_, LibraryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Background display worker.
//!
//! Rendering and cover loading run on a dedicated thread so slow
//! storage never blocks input handling. Each iteration takes the shared
//! lock, runs one dispatch tick, and sleeps; the input path only ever
//! waits for at most one tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

use crate::buffered_display::{BufferedDisplay, DisplayPanel};
use crate::library_activity::{lock_state, LibraryState};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct DisplayWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Box<dyn DisplayPanel + Send>>>,
}

impl DisplayWorker {
    /// Start the worker thread. The panel moves onto the thread and is
    /// returned by [`DisplayWorker::stop`].
    pub fn spawn(
        state: Arc<Mutex<LibraryState>>,
        mut panel: Box<dyn DisplayPanel + Send>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let result = Builder::new()
            .name(String::from("library-display"))
            .spawn(move || {
                let mut display = BufferedDisplay::new();
                while !stop_flag.load(Ordering::Acquire) {
                    lock_state(&state).dispatch(&mut display, panel.as_mut());
                    std::thread::sleep(POLL_INTERVAL);
                }
                panel
            });

        let handle = match result {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("failed to spawn display worker: {}", err);
                None
            }
        };
        Self { stop, handle }
    }

    /// Stop the worker and wait for the in-flight tick to finish.
    /// Returns the panel so the caller can hand it to the next screen.
    pub fn stop(mut self) -> Option<Box<dyn DisplayPanel + Send>> {
        self.stop.store(true, Ordering::Release);
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl Drop for DisplayWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

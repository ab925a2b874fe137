//! End-to-end run with the real display worker thread.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use inkshelf_harness::CountingPanel;
use inkshelf_ui::{
    Activity, ActivityResult, Button, InputEvent, LibraryActivity, LibraryState, MockStorage,
    StubBookReader,
};

#[test]
fn worker_loads_the_page_and_returns_the_panel() {
    let mut storage = MockStorage::new();
    storage.add_file("/a.epub", b"zip");
    storage.add_file("/b.epub", b"zip");
    storage.add_file("/c.epub", b"zip");
    let (reader, loads) = StubBookReader::with_covers();

    let state = Arc::new(Mutex::new(LibraryState::new(
        Box::new(storage),
        Box::new(reader),
        "/",
    )));
    let (panel, presents) = CountingPanel::new();
    let mut activity = LibraryActivity::new(Arc::clone(&state), Box::new(panel));

    activity.on_enter();

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        {
            let state = state.lock().unwrap();
            if state.page_covers_loaded() {
                break;
            }
        }
        assert!(Instant::now() < deadline, "worker never loaded the page");
        std::thread::sleep(Duration::from_millis(5));
    }

    // Input handling is live while the worker runs.
    assert_eq!(
        activity.handle_input(InputEvent::Released {
            button: Button::Right,
            held_ms: 120,
        }),
        ActivityResult::Consumed
    );

    activity.on_exit();

    assert_eq!(loads.load(std::sync::atomic::Ordering::Relaxed), 3);
    assert!(presents.load(std::sync::atomic::Ordering::Relaxed) > 0);
    let state = state.lock().unwrap();
    assert!(state.files().is_empty(), "exit should release the listing");
}

//! Scenario coverage for incremental cover loading and frame caching.

use inkshelf_harness::ScenarioHarness;
use inkshelf_ui::Button;

#[test]
fn covers_load_one_per_tick() {
    let mut harness = ScenarioHarness::with_flat_library(5);

    for tick in 1..=5 {
        harness.tick();
        assert_eq!(harness.book_loads(), tick, "tick {} overloaded", tick);
    }
    assert!(harness.with_state(|s| s.page_covers_loaded()));

    // The settled page costs no further parsing.
    harness.pump_until_idle();
    assert_eq!(harness.book_loads(), 5);
}

#[test]
fn finished_page_is_snapshotted() {
    let mut harness = ScenarioHarness::with_flat_library(5);
    harness.pump_until_idle();

    assert_eq!(harness.with_state(|s| s.cached_page()), Some(0));
    assert_eq!(harness.book_loads(), 5);
}

#[test]
fn selection_moves_within_a_cached_page_restore_the_frame() {
    let mut harness = ScenarioHarness::with_flat_library(5);
    harness.pump_until_idle();
    let loads = harness.book_loads();
    let presents = harness.presents();

    harness.press(Button::Right);
    harness.tick();

    assert!(harness.with_state(|s| s.last_render_restored()));
    assert_eq!(harness.book_loads(), loads);
    assert_eq!(harness.presents(), presents + 1);
}

#[test]
fn paging_loads_each_entry_exactly_once() {
    let mut harness = ScenarioHarness::with_flat_library(12);
    harness.pump_until_idle();
    assert_eq!(harness.book_loads(), 9);

    harness.hold(Button::Down, 600);
    harness.pump_until_idle();
    // The release ending the hold adds no extra step.
    assert_eq!(harness.with_state(|s| s.selected_index()), 9);
    assert_eq!(harness.with_state(|s| s.current_page()), 1);
    assert_eq!(harness.book_loads(), 12);

    // Returning to the first page finds every entry loaded.
    harness.hold(Button::Up, 600);
    harness.pump_until_idle();
    assert_eq!(harness.with_state(|s| s.current_page()), 0);
    assert_eq!(harness.book_loads(), 12);
}

#[test]
fn grid_render_produces_a_screenshot() {
    let mut harness = ScenarioHarness::with_flat_library(5);
    harness.pump_until_idle();

    let path = std::env::temp_dir().join("inkshelf-grid-loading-flow.png");
    harness.save_screenshot_png(&path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    let _ = std::fs::remove_file(&path);
}

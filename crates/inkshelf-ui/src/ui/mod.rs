//! Screen-level UI abstractions and shared widgets.

pub mod components;
pub mod theme;

use alloc::string::String;

use crate::input::InputEvent;

/// Result of handling an input event.
///
/// Cross-screen navigation surfaces as explicit events for the hosting
/// screen stack rather than callbacks into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityResult {
    /// Event consumed, stay on this screen.
    Consumed,
    /// Event not handled.
    Ignored,
    /// A book file was chosen; the host should open it.
    OpenBook(String),
    /// Back pressed at the storage root; the host should leave the
    /// screen.
    GoHome,
}

/// Lifecycle for screens hosted by the device's screen stack.
///
/// Rendering is not part of the trait: screens that render from a
/// background worker (like the library browser) own their display path.
pub trait Activity {
    /// Called when the screen becomes visible.
    fn on_enter(&mut self);

    /// Called when the screen is being replaced.
    fn on_exit(&mut self);

    /// Handle one input event.
    fn handle_input(&mut self, event: InputEvent) -> ActivityResult;
}

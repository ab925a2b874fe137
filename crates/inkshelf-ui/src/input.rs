//! Button input abstraction.
//!
//! The hardware input layer translates raw button state into discrete
//! events. Releases and repeats carry the hold duration so screens can
//! distinguish a short press from a long hold without polling.

/// Logical device buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Confirm,
    Back,
}

/// Input events delivered to the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Button went down.
    Pressed(Button),
    /// Button came up after being held for `held_ms`.
    Released { button: Button, held_ms: u32 },
    /// Emitted periodically while a button stays held.
    Held { button: Button, held_ms: u32 },
}

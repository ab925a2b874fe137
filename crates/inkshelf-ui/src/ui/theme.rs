//! Layout metrics and fonts shared by the widgets.

// ISO 8859-1 variants so the hint bar's guillemet renders as a glyph.
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_6X10, FONT_8X13};
use embedded_graphics::mono_font::MonoFont;

/// Title font (headers, empty states).
pub fn ui_font_title() -> &'static MonoFont<'static> {
    &FONT_10X20
}

/// Body font (list rows, page indicator).
pub fn ui_font_body() -> &'static MonoFont<'static> {
    &FONT_8X13
}

/// Small font (grid cell titles, hint bar).
pub fn ui_font_small() -> &'static MonoFont<'static> {
    &FONT_6X10
}

/// Pixel width of `text` in the given mono font.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> i32 {
    (font.character_size.width + font.character_spacing) as i32 * text.chars().count() as i32
}

/// Fixed screen layout reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeMetrics {
    pub top_padding: i32,
    pub header_height: i32,
    pub vertical_spacing: i32,
    pub hint_bar_height: i32,
    pub side_padding: i32,
    pub list_item_height: i32,
}

impl ThemeMetrics {
    pub const fn new() -> Self {
        Self {
            top_padding: 8,
            header_height: 40,
            vertical_spacing: 10,
            hint_bar_height: 36,
            side_padding: 12,
            list_item_height: 28,
        }
    }

    /// Y coordinate where content starts, below the header.
    pub fn content_top(&self) -> i32 {
        self.top_padding + self.header_height + self.vertical_spacing
    }

    /// Height left for content between header and hint bar.
    pub fn content_height(&self, display_height: u32) -> i32 {
        display_height as i32 - self.content_top() - self.hint_bar_height - self.vertical_spacing * 2
    }

    /// Usable width inside the side padding.
    pub fn content_width(&self, display_width: u32) -> u32 {
        display_width.saturating_sub(self.side_padding as u32 * 2)
    }

    /// Rows a scrolling list can show, the generic list page size.
    pub fn list_rows(&self, display_height: u32) -> usize {
        (self.content_height(display_height) / self.list_item_height).max(0) as usize
    }
}

impl Default for ThemeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DISPLAY_HEIGHT;

    #[test]
    fn text_width_counts_glyphs_not_bytes() {
        let font = ui_font_small();
        // The guillemet is two UTF-8 bytes but one glyph wide.
        assert_eq!(
            text_width(font, "\u{ab} Back"),
            text_width(font, "x Back")
        );
    }

    #[test]
    fn content_area_fits_the_panel() {
        let metrics = ThemeMetrics::new();
        assert_eq!(metrics.content_top(), 58);
        assert_eq!(metrics.content_height(DISPLAY_HEIGHT), 686);
        assert!(metrics.list_rows(DISPLAY_HEIGHT) > 0);
    }
}

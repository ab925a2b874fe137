//! Shared widgets: header, hint bar, scrolling list, cover grid.
//!
//! All widgets draw into any `BinaryColor` target so they work with the
//! panel frame buffer and with in-memory test displays alike.

use alloc::format;
use alloc::string::String;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Baseline, Text},
};
use embedded_text::{
    alignment::HorizontalAlignment,
    style::{HeightMode, TextBoxStyleBuilder, VerticalOverdraw},
    TextBox,
};

use crate::book::CoverBitmap;
use crate::ui::theme::{ui_font_body, ui_font_small, ui_font_title, text_width, ThemeMetrics};

fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return String::from(name);
    }
    let mut out: String = name.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Screen header with a title and separator rule.
pub struct Header<'a> {
    title: &'a str,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str) -> Self {
        Self { title }
    }

    pub fn render<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        metrics: &ThemeMetrics,
    ) -> Result<(), D::Error> {
        let width = display.bounding_box().size.width;
        let style = MonoTextStyle::new(ui_font_title(), BinaryColor::On);
        let max_chars = (metrics.content_width(width) / ui_font_title().character_size.width) as usize;
        let title = truncate_name(self.title, max_chars);
        Text::with_baseline(
            &title,
            Point::new(metrics.side_padding, metrics.top_padding + 6),
            style,
            Baseline::Top,
        )
        .draw(display)?;

        let rule_y = metrics.top_padding + metrics.header_height - 2;
        Rectangle::new(Point::new(0, rule_y), Size::new(width, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;
        Ok(())
    }
}

/// Four-slot button hint bar along the bottom edge.
pub struct ButtonHints {
    labels: [&'static str; 4],
}

impl ButtonHints {
    pub fn new(labels: [&'static str; 4]) -> Self {
        Self { labels }
    }

    pub fn render<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        metrics: &ThemeMetrics,
    ) -> Result<(), D::Error> {
        let size = display.bounding_box().size;
        let bar_top = size.height as i32 - metrics.hint_bar_height;

        Rectangle::new(Point::new(0, bar_top), Size::new(size.width, 1))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;

        let style = MonoTextStyle::new(ui_font_small(), BinaryColor::On);
        let slot_width = size.width as i32 / 4;
        let text_y = bar_top + (metrics.hint_bar_height - ui_font_small().character_size.height as i32) / 2;
        for (i, label) in self.labels.iter().enumerate() {
            let x = slot_width * i as i32 + (slot_width - text_width(ui_font_small(), label)) / 2;
            Text::with_baseline(label, Point::new(x.max(0), text_y), style, Baseline::Top)
                .draw(display)?;
        }
        Ok(())
    }
}

/// Scrolling item list with page-at-a-time scrolling.
pub struct ItemList;

impl ItemList {
    pub fn render<D: DrawTarget<Color = BinaryColor>>(
        display: &mut D,
        metrics: &ThemeMetrics,
        items: &[String],
        selected: usize,
    ) -> Result<(), D::Error> {
        let size = display.bounding_box().size;
        let rows = metrics.list_rows(size.height).max(1);
        let first = (selected / rows) * rows;
        let content_width = metrics.content_width(size.width);
        let char_width =
            (ui_font_body().character_size.width + ui_font_body().character_spacing) as usize;
        let max_chars = (content_width as usize / char_width.max(1)).saturating_sub(1);

        for (row, item) in items.iter().skip(first).take(rows).enumerate() {
            let index = first + row;
            let y = metrics.content_top() + row as i32 * metrics.list_item_height;
            let is_selected = index == selected;

            if is_selected {
                Rectangle::new(
                    Point::new(metrics.side_padding, y),
                    Size::new(content_width, metrics.list_item_height as u32),
                )
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(display)?;
            }

            let text_color = if is_selected {
                BinaryColor::Off
            } else {
                BinaryColor::On
            };
            let style = MonoTextStyle::new(ui_font_body(), text_color);
            let name = truncate_name(item, max_chars);
            let text_y =
                y + (metrics.list_item_height - ui_font_body().character_size.height as i32) / 2;
            Text::with_baseline(
                &name,
                Point::new(metrics.side_padding + 4, text_y),
                style,
                Baseline::Top,
            )
            .draw(display)?;
        }
        Ok(())
    }
}

/// One grid cell as seen by [`CoverGrid`].
pub struct GridCell<'a> {
    pub title: &'a str,
    pub cover: Option<&'a CoverBitmap>,
}

/// Paginated book cover grid.
///
/// With `skip_background` the cell contents are assumed to already be
/// in the frame buffer (restored from the page cache); only the borders
/// that encode the selection are redrawn.
pub struct CoverGrid {
    pub thumb_height: u32,
    pub columns: usize,
    pub gap: i32,
}

impl CoverGrid {
    /// Height of the title strip under each thumbnail (two small-font
    /// lines).
    pub fn title_strip_height(&self) -> i32 {
        ui_font_small().character_size.height as i32 * 2 + 6
    }

    /// Full cell height including the inter-row gap.
    pub fn cell_height(&self) -> i32 {
        self.thumb_height as i32 + self.title_strip_height() + self.gap
    }

    fn cell_width(&self, metrics: &ThemeMetrics, display_width: u32) -> u32 {
        let gaps = self.gap as u32 * (self.columns as u32 - 1);
        metrics
            .content_width(display_width)
            .saturating_sub(gaps)
            / self.columns as u32
    }

    pub fn render<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        metrics: &ThemeMetrics,
        cells: &[GridCell<'_>],
        selected: i32,
        skip_background: bool,
    ) -> Result<(), D::Error> {
        let width = display.bounding_box().size.width;
        let cell_width = self.cell_width(metrics, width);

        for (i, cell) in cells.iter().enumerate() {
            let col = (i % self.columns) as i32;
            let row = (i / self.columns) as i32;
            let x = metrics.side_padding + col * (cell_width as i32 + self.gap);
            let y = metrics.content_top() + row * self.cell_height();
            let thumb_rect =
                Rectangle::new(Point::new(x, y), Size::new(cell_width, self.thumb_height));

            if !skip_background {
                thumb_rect
                    .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                    .draw(display)?;
                match cell.cover {
                    Some(cover) => {
                        let offset_x = (cell_width as i32 - cover.width() as i32).max(0) / 2;
                        let offset_y = (self.thumb_height as i32 - cover.height() as i32).max(0) / 2;
                        cover.draw(display, Point::new(x + offset_x, y + offset_y))?;
                    }
                    None => self.draw_placeholder(display, &thumb_rect)?,
                }
                self.draw_title(display, cell.title, x, y, cell_width)?;
            } else {
                // Erase whatever border the cached frame carried before
                // redrawing the selection state.
                thumb_rect
                    .into_styled(
                        PrimitiveStyleBuilder::new()
                            .stroke_color(BinaryColor::Off)
                            .stroke_width(3)
                            .build(),
                    )
                    .draw(display)?;
            }

            let stroke = if i as i32 == selected { 3 } else { 1 };
            thumb_rect
                .into_styled(
                    PrimitiveStyleBuilder::new()
                        .stroke_color(BinaryColor::On)
                        .stroke_width(stroke)
                        .build(),
                )
                .draw(display)?;
        }
        Ok(())
    }

    fn draw_title<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        title: &str,
        x: i32,
        y: i32,
        cell_width: u32,
    ) -> Result<(), D::Error> {
        let bounds = Rectangle::new(
            Point::new(x, y + self.thumb_height as i32 + 3),
            Size::new(cell_width, self.title_strip_height() as u32 - 3),
        );
        let character_style = MonoTextStyle::new(ui_font_small(), BinaryColor::On);
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Center)
            .height_mode(HeightMode::Exact(VerticalOverdraw::Hidden))
            .build();
        TextBox::with_textbox_style(title, bounds, character_style, textbox_style).draw(display)?;
        Ok(())
    }

    fn draw_placeholder<D: DrawTarget<Color = BinaryColor>>(
        &self,
        display: &mut D,
        thumb_rect: &Rectangle,
    ) -> Result<(), D::Error> {
        // Small book glyph centered in the cell.
        let icon_w = 28u32;
        let icon_h = 36u32;
        let origin = thumb_rect.top_left;
        let size = thumb_rect.size;
        let icon_x = origin.x + (size.width as i32 - icon_w as i32) / 2;
        let icon_y = origin.y + (size.height as i32 - icon_h as i32) / 2;

        Rectangle::new(Point::new(icon_x, icon_y), Size::new(icon_w, icon_h))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(display)?;
        Rectangle::new(Point::new(icon_x + 2, icon_y + 2), Size::new(icon_w - 4, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;
        for line in 0..3 {
            Rectangle::new(
                Point::new(icon_x + 4, icon_y + 12 + line * 6),
                Size::new(icon_w - 8, 1),
            )
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;
        }
        Ok(())
    }
}

/// Right-aligned page indicator above the hint bar.
pub fn draw_page_indicator<D: DrawTarget<Color = BinaryColor>>(
    display: &mut D,
    metrics: &ThemeMetrics,
    page: i32,
    total_pages: i32,
) -> Result<(), D::Error> {
    let size = display.bounding_box().size;
    let text = format!("{} / {}", page + 1, total_pages);
    let x = size.width as i32 - text_width(ui_font_body(), &text) - metrics.side_padding;
    let y = size.height as i32
        - metrics.hint_bar_height
        - metrics.vertical_spacing
        - ui_font_body().character_size.height as i32;
    let style = MonoTextStyle::new(ui_font_body(), BinaryColor::On);
    Text::with_baseline(&text, Point::new(x, y), style, Baseline::Top).draw(display)?;
    Ok(())
}

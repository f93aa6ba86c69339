//! A grid of terminal cells, each showing up to two pixels using half block characters.

use color_eyre::eyre::bail;
use color_eyre::eyre::ContextCompat as _;
use color_eyre::eyre::Result;
use termwiz::surface::Change as TermwizChange;
use termwiz::surface::Position as TermwizPosition;

use boing_physics::{Colour, Vector2};

use crate::utils::PIXELS_PER_ROW;

/// A pixel in the top half of a cell.
const UPPER_HALF: &str = "▀";

/// A pixel in the bottom half of a cell.
const LOWER_HALF: &str = "▄";

/// One frame, ready for the renderer.
#[derive(Clone)]
#[non_exhaustive]
pub struct Surface {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// How many world units make up one pixel
    pub scale: f64,
    /// The cells themselves
    pub surface: termwiz::surface::Surface,
}

impl Surface {
    /// An empty frame.
    #[must_use]
    pub fn new(width: usize, height: usize, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            surface: termwiz::surface::Surface::new(width, height),
        }
    }

    /// The size of the whole surface in world units.
    #[must_use]
    pub fn canvas(&self) -> boing_physics::Canvas {
        boing_physics::Canvas::new(
            to_world(self.width) * self.scale,
            to_world(self.height * PIXELS_PER_ROW) * self.scale,
        )
    }

    /// The world coordinates of the middle of a terminal cell.
    #[must_use]
    pub fn cell_to_world(&self, column: usize, row: usize) -> Vector2 {
        let pixels_per_row = to_world(PIXELS_PER_ROW);
        Vector2::new(
            (to_world(column) + 0.5) * self.scale,
            (to_world(row) + 0.5) * pixels_per_row * self.scale,
        )
    }

    /// Colour one pixel. Pixel rows are twice as dense as cell rows.
    ///
    /// A cell with both halves coloured is always an upper half block: its foreground is the
    /// top pixel and its background the bottom one. A cell with only its bottom pixel coloured
    /// uses a lower half block, so the top half keeps the terminal's own background.
    ///
    /// # Errors
    /// When the pixel is outside the surface.
    pub fn add_pixel(&mut self, x: usize, y: usize, colour: Colour) -> Result<()> {
        let (column, row) = self.pixel_to_cell(x, y)?;
        let cell = self.cell(column, row)?;
        let existing_fg = cell.attrs().foreground();
        let existing_bg = cell.attrs().background();
        let new = Self::make_colour_attribute(colour);
        let is_upper_half = y.rem_euclid(PIXELS_PER_ROW) == 0;

        let (glyph, foreground, background) = match (cell.str(), is_upper_half) {
            // The existing lower pixel moves into the background.
            (LOWER_HALF, true) => (UPPER_HALF, new, existing_fg),
            (_, true) => (UPPER_HALF, new, existing_bg),
            (UPPER_HALF, false) => (UPPER_HALF, existing_fg, new),
            (_, false) => (LOWER_HALF, new, existing_bg),
        };

        self.surface.add_changes(vec![
            TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(column),
                y: TermwizPosition::Absolute(row),
            },
            TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(foreground)),
            TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(background)),
        ]);
        self.surface.add_change(glyph);

        Ok(())
    }

    /// Write text starting at a cell. Without a background the terminal's default is used,
    /// without a foreground it's white.
    pub fn add_text(
        &mut self,
        x: usize,
        y: usize,
        text: String,
        background: Option<Colour>,
        foreground: Option<Colour>,
    ) {
        let background_change =
            background.map_or_else(Self::make_default_bg_colour, Self::make_bg_colour);
        let foreground_change =
            Self::make_fg_colour(foreground.unwrap_or(boing_physics::painter::WHITE));

        self.surface.add_changes(vec![
            TermwizChange::CursorPosition {
                x: TermwizPosition::Absolute(x),
                y: TermwizPosition::Absolute(y),
            },
            background_change,
            foreground_change,
        ]);
        self.surface.add_change(text);
    }

    /// A true colour for `termwiz`.
    #[must_use]
    pub const fn make_colour_attribute(colour: Colour) -> termwiz::color::ColorAttribute {
        termwiz::color::ColorAttribute::TrueColorWithDefaultFallback(termwiz::color::SrgbaTuple(
            colour.0, colour.1, colour.2, colour.3,
        ))
    }

    /// Change the background colour of what's written next.
    #[must_use]
    pub const fn make_bg_colour(colour: Colour) -> TermwizChange {
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(
            Self::make_colour_attribute(colour),
        ))
    }

    /// Go back to the terminal's own background colour.
    #[must_use]
    pub const fn make_default_bg_colour() -> TermwizChange {
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Background(
            termwiz::color::ColorAttribute::Default,
        ))
    }

    /// Change the foreground colour of what's written next.
    #[must_use]
    pub const fn make_fg_colour(colour: Colour) -> TermwizChange {
        TermwizChange::Attribute(termwiz::cell::AttributeChange::Foreground(
            Self::make_colour_attribute(colour),
        ))
    }

    /// The cell that a pixel is in.
    fn pixel_to_cell(&self, x: usize, y: usize) -> Result<(usize, usize)> {
        let row = y / PIXELS_PER_ROW;
        if x >= self.width || row >= self.height {
            bail!("Pixel ({x}, {y}) is outside the {}x{} surface", self.width, self.height);
        }
        Ok((x, row))
    }

    /// A copy of a cell, so it can be inspected whilst the surface is changed.
    fn cell(&mut self, column: usize, row: usize) -> Result<termwiz::cell::Cell> {
        self.surface
            .screen_cells()
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .context("Cell outside the surface")
    }

    /// Add a pixel that may well be off the surface, in which case it's just ignored.
    fn plot(&mut self, x: i64, y: i64, colour: Colour) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x >= self.width || y >= self.height * PIXELS_PER_ROW {
            return;
        }

        if let Err(error) = self.add_pixel(x, y, colour) {
            tracing::error!("Adding pixel: {error:?}");
        }
    }

    /// The pixels that a span of world units touches. Always at least one pixel, so that thin
    /// things don't disappear.
    fn pixel_span(&self, start: f64, length: f64) -> core::ops::Range<i64> {
        span(start, length, self.scale)
    }

    /// The rows of cells that a span of world units touches.
    fn row_span(&self, start: f64, length: f64) -> core::ops::Range<i64> {
        span(start, length, self.scale * to_world(PIXELS_PER_ROW))
    }
}

impl boing_physics::Painter for Surface {
    fn clear(&mut self) {
        self.surface = termwiz::surface::Surface::new(self.width, self.height);
    }

    fn clear_rect(&mut self, position: Vector2, size: Vector2) {
        for row in self.row_span(position.y, size.y) {
            for col in self.pixel_span(position.x, size.x) {
                let (Ok(col), Ok(row)) = (usize::try_from(col), usize::try_from(row)) else {
                    continue;
                };
                if col < self.width && row < self.height {
                    self.add_text(col, row, " ".to_owned(), None, None);
                }
            }
        }
    }

    fn fill_circle(&mut self, centre: Vector2, radius: f64, colour: Colour) {
        let centre_x = centre.x / self.scale;
        let centre_y = centre.y / self.scale;
        let radius = radius / self.scale;

        for y in to_pixel(centre_y - radius)..=to_pixel(centre_y + radius) {
            for x in to_pixel(centre_x - radius)..=to_pixel(centre_x + radius) {
                let distance_x = from_pixel(x) + 0.5 - centre_x;
                let distance_y = from_pixel(y) + 0.5 - centre_y;
                if distance_x.powi(2) + distance_y.powi(2) <= radius.powi(2) {
                    self.plot(x, y, colour);
                }
            }
        }

        // Circles smaller than a pixel can fall between pixel centres.
        self.plot(to_pixel(centre_x), to_pixel(centre_y), colour);
    }

    fn fill_rect(&mut self, position: Vector2, size: Vector2, colour: Colour) {
        for y in self.pixel_span(position.y, size.y) {
            for x in self.pixel_span(position.x, size.x) {
                self.plot(x, y, colour);
            }
        }
    }

    fn line(&mut self, from: Vector2, to: Vector2, colour: Colour) {
        let start = Vector2::new(from.x / self.scale, from.y / self.scale);
        let delta = Vector2::new(to.x / self.scale - start.x, to.y / self.scale - start.y);
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);

        for step in 0..=to_pixel(steps) {
            let progress = from_pixel(step) / steps;
            self.plot(
                to_pixel(delta.x.mul_add(progress, start.x)),
                to_pixel(delta.y.mul_add(progress, start.y)),
                colour,
            );
        }
    }

    fn text(&mut self, position: Vector2, text: &str, colour: Colour) {
        let pixels_per_row = to_world(PIXELS_PER_ROW);
        let column = to_pixel(position.x / self.scale);
        let Ok(row) = usize::try_from(to_pixel(position.y / self.scale / pixels_per_row)) else {
            return;
        };
        if row >= self.height {
            return;
        }

        let hidden = usize::try_from(-column).unwrap_or(0);
        let start = usize::try_from(column).unwrap_or(0);
        if start >= self.width {
            return;
        }

        let visible: String = text.chars().skip(hidden).take(self.width - start).collect();
        self.add_text(start, row, visible, None, Some(colour));
    }
}

/// The indices of every `unit` sized block that a span touches.
fn span(start: f64, length: f64, unit: f64) -> core::ops::Range<i64> {
    let first = to_pixel(start / unit);
    let last = to_pixel(((start + length) / unit).ceil());
    first..last.max(first + 1)
}

/// World units to the index of the pixel that contains them.
#[expect(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    reason = "We're just rendering to a terminal grid"
)]
fn to_pixel(value: f64) -> i64 {
    value.floor() as i64
}

/// A pixel index to world units.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Terminals aren't big enough to lose precision"
)]
const fn from_pixel(value: i64) -> f64 {
    value as f64
}

/// A terminal dimension to world units.
#[expect(
    clippy::as_conversions,
    clippy::cast_precision_loss,
    reason = "Terminals aren't big enough to lose precision"
)]
const fn to_world(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
#[expect(
    clippy::indexing_slicing,
    clippy::wildcard_enum_match_arm,
    reason = "Tests aren't so strict"
)]
mod test {
    use boing_physics::painter::WHITE;
    use boing_physics::Painter as _;

    use super::*;

    const GREY: Colour = (0.5, 0.5, 0.5, 1.0);
    const RED: Colour = (1.0, 0.0, 0.0, 1.0);

    fn colours(surface: &mut Surface, column: usize, row: usize) -> (String, Colour, Colour) {
        let cell = &surface.surface.screen_cells()[row][column];
        let colour = |attribute: termwiz::color::ColorAttribute| match attribute {
            termwiz::color::ColorAttribute::TrueColorWithDefaultFallback(termwiz::color::SrgbaTuple(
                red,
                green,
                blue,
                alpha,
            )) => (red, green, blue, alpha),
            _ => (0.0, 0.0, 0.0, 0.0),
        };
        (
            cell.str().to_owned(),
            colour(cell.attrs().foreground()),
            colour(cell.attrs().background()),
        )
    }

    #[test]
    fn lone_pixels_keep_the_default_background() {
        let mut surface = Surface::new(2, 1, 1.0);
        surface.add_pixel(0, 0, RED).unwrap();
        surface.add_pixel(1, 1, GREY).unwrap();

        let top = &surface.surface.screen_cells()[0][0];
        assert_eq!(top.str(), "▀");
        assert_eq!(top.attrs().background(), termwiz::color::ColorAttribute::Default);
        let bottom = &surface.surface.screen_cells()[0][1];
        assert_eq!(bottom.str(), "▄");
        assert_eq!(bottom.attrs().foreground(), Surface::make_colour_attribute(GREY));
        assert_eq!(bottom.attrs().background(), termwiz::color::ColorAttribute::Default);
    }

    #[test]
    fn both_halves_make_an_upper_block() {
        let mut surface = Surface::new(2, 1, 1.0);

        surface.add_pixel(0, 1, GREY).unwrap();
        surface.add_pixel(0, 0, RED).unwrap();
        assert_eq!(colours(&mut surface, 0, 0), ("▀".to_owned(), RED, GREY));

        surface.add_pixel(1, 0, RED).unwrap();
        surface.add_pixel(1, 1, GREY).unwrap();
        assert_eq!(colours(&mut surface, 1, 0), ("▀".to_owned(), RED, GREY));

        surface.add_pixel(1, 1, WHITE).unwrap();
        assert_eq!(colours(&mut surface, 1, 0), ("▀".to_owned(), RED, WHITE));
    }

    #[test]
    fn pixels_off_the_surface_are_errors() {
        let mut surface = Surface::new(2, 2, 1.0);
        assert!(surface.add_pixel(1, 3, WHITE).is_ok());
        assert!(surface.add_pixel(1, 4, WHITE).is_err());
        assert!(surface.add_pixel(2, 0, WHITE).is_err());
    }

    #[test]
    fn canvas_is_measured_in_world_units() {
        let surface = Surface::new(100, 30, 8.0);
        assert_eq!(surface.canvas(), boing_physics::Canvas::new(800.0, 480.0));
        assert_eq!(surface.cell_to_world(0, 0), Vector2::new(4.0, 8.0));
        assert_eq!(surface.cell_to_world(10, 3), Vector2::new(84.0, 56.0));
    }

    #[test]
    fn tiny_circles_still_get_a_pixel() {
        let mut surface = Surface::new(4, 2, 8.0);
        surface.fill_circle(Vector2::new(20.0, 20.0), 2.0, RED);

        let cell = &surface.surface.screen_cells()[1][2];
        assert_eq!(cell.str(), "▀");
        assert_eq!(
            cell.attrs().foreground(),
            Surface::make_colour_attribute(RED)
        );
    }

    #[test]
    fn circles_are_clipped_at_the_edges() {
        let mut surface = Surface::new(4, 2, 1.0);
        surface.fill_circle(Vector2::new(0.0, 0.0), 3.0, RED);

        let text = surface.surface.screen_chars_to_string();
        assert!(text.contains('▀'));
        assert_eq!(surface.surface.screen_cells()[1][3].str(), " ");
    }

    #[test]
    fn thin_rects_cover_at_least_one_pixel() {
        let mut surface = Surface::new(3, 1, 8.0);
        surface.fill_rect(Vector2::new(0.0, 10.0), Vector2::new(24.0, 1.0), GREY);

        for col in 0..3 {
            let cell = &surface.surface.screen_cells()[0][col];
            assert_eq!(cell.str(), "▄");
        }
    }

    #[test]
    fn vertical_line() {
        let mut surface = Surface::new(3, 2, 1.0);
        surface.line(Vector2::new(1.5, 0.5), Vector2::new(1.5, 3.5), WHITE);

        let cells = surface.surface.screen_cells();
        assert_eq!(cells[0][1].str(), "▀");
        assert_eq!(cells[1][1].str(), "▀");
        assert_eq!(cells[0][0].str(), " ");
    }

    #[test]
    fn text_is_clipped() {
        let mut surface = Surface::new(5, 2, 1.0);
        surface.text(Vector2::new(-2.0, 2.0), "abcdefgh", WHITE);
        surface.text(Vector2::new(3.0, 100.0), "off screen", WHITE);

        let text = surface.surface.screen_chars_to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim(), "");
        assert_eq!(lines[1], "cdefg");
    }

    #[test]
    fn clearing() {
        let mut surface = Surface::new(4, 2, 1.0);
        surface.fill_rect(Vector2::new(0.0, 0.0), Vector2::new(4.0, 4.0), RED);
        surface.clear_rect(Vector2::new(2.0, 0.0), Vector2::new(2.0, 4.0));

        let cells = surface.surface.screen_cells();
        assert_eq!(cells[0][1].str(), "▀");
        assert_eq!(cells[0][2].str(), " ");
        assert_eq!(cells[1][3].str(), " ");

        surface.clear();
        assert_eq!(surface.surface.screen_chars_to_string().trim(), "");
    }
}

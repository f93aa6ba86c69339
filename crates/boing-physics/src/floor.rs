//! The ground that the ball bounces on.

/// The default thickness of the floor in world units.
pub const DEFAULT_HEIGHT: f64 = 10.0;

/// A static horizontal slab along the bottom of the canvas.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Floor {
    /// Top-left corner. Its `y` is the surface the ball bounces on.
    pub position: crate::Vector2,
    /// Always the full width of the canvas
    pub width: f64,
    /// Thickness
    pub height: f64,
    /// Fill colour
    pub colour: crate::Colour,
}

impl Floor {
    /// Lay a floor along the bottom of the given canvas.
    #[must_use]
    pub fn new(canvas: crate::Canvas, height: f64) -> Self {
        Self {
            position: crate::Vector2::new(0.0, canvas.height - height),
            width: canvas.width,
            height,
            colour: crate::painter::colour_from_rgb(palette::Srgb::new(20, 20, 20)),
        }
    }
}

impl crate::Entity for Floor {
    fn update(&mut self, _environment: &crate::Environment) {}

    fn draw(&self, painter: &mut dyn crate::Painter, _environment: &crate::Environment) {
        painter.fill_rect(
            self.position,
            crate::Vector2::new(self.width, self.height),
            self.colour,
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sits_on_the_bottom_of_the_canvas() {
        let floor = Floor::new(crate::Canvas::new(800.0, 600.0), DEFAULT_HEIGHT);
        assert_eq!(floor.position, crate::Vector2::new(0.0, 590.0));
        assert!((floor.width - 800.0).abs() < f64::EPSILON);
    }
}

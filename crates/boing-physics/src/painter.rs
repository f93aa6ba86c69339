//! The drawing seam between the simulation and whatever displays it.

/// An RGBA colour with channels between 0.0 and 1.0.
pub type Colour = (f32, f32, f32, f32);

/// Plain white, used for on-canvas text.
pub const WHITE: Colour = (1.0, 1.0, 1.0, 1.0);

/// Plain black, used for the velocity vector.
pub const BLACK: Colour = (0.0, 0.0, 0.0, 1.0);

/// Convert an 8 bit sRGB colour into our float tuple.
#[must_use]
pub fn colour_from_rgb(rgb: palette::Srgb<u8>) -> Colour {
    let float: palette::Srgb<f32> = rgb.into_format();
    (float.red, float.green, float.blue, 1.0)
}

/// Anything that can display the simulation. All coordinates are in world units.
///
/// Painting never fails: implementations clip whatever falls outside their bounds.
pub trait Painter {
    /// Wipe everything.
    fn clear(&mut self);

    /// Wipe a rectangle.
    fn clear_rect(&mut self, position: crate::Vector2, size: crate::Vector2);

    /// A filled circle.
    fn fill_circle(&mut self, centre: crate::Vector2, radius: f64, colour: Colour);

    /// A filled rectangle.
    fn fill_rect(&mut self, position: crate::Vector2, size: crate::Vector2, colour: Colour);

    /// A straight line.
    fn line(&mut self, from: crate::Vector2, to: crate::Vector2, colour: Colour);

    /// Some text, starting at `position`.
    fn text(&mut self, position: crate::Vector2, text: &str, colour: Colour);
}

/// Everything in the world that an entity might need to know to update or draw itself.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Environment<'parameters> {
    /// The user-tunable parameters
    pub parameters: &'parameters crate::Parameters,
    /// The top of the floor
    pub floor_y: f64,
    /// Whether the simulation is paused
    pub paused: bool,
}

impl<'parameters> Environment<'parameters> {
    /// Instantiate
    #[must_use]
    pub const fn new(
        parameters: &'parameters crate::Parameters,
        floor_y: f64,
        paused: bool,
    ) -> Self {
        Self {
            parameters,
            floor_y,
            paused,
        }
    }
}

/// The contract shared by everything that lives in the simulation.
pub trait Entity {
    /// Advance by one tick.
    fn update(&mut self, environment: &Environment);

    /// Render the current state. Must not change any state.
    fn draw(&self, painter: &mut dyn Painter, environment: &Environment);
}

/// A painter that just remembers what it was asked to do.
#[cfg(test)]
#[derive(Debug, Default, PartialEq)]
pub(crate) struct RecordingPainter {
    /// Every call, in order, as a readable string
    pub calls: Vec<String>,
}

#[cfg(test)]
impl RecordingPainter {
    /// Only the text that was drawn.
    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| call.strip_prefix("text ").map(ToOwned::to_owned))
            .collect()
    }
}

#[cfg(test)]
impl Painter for RecordingPainter {
    fn clear(&mut self) {
        self.calls.push("clear".to_owned());
    }

    fn clear_rect(&mut self, position: crate::Vector2, size: crate::Vector2) {
        self.calls.push(format!("clear_rect {position:?} {size:?}"));
    }

    fn fill_circle(&mut self, centre: crate::Vector2, radius: f64, colour: Colour) {
        self.calls.push(format!("circle {centre:?} {radius} {colour:?}"));
    }

    fn fill_rect(&mut self, position: crate::Vector2, size: crate::Vector2, colour: Colour) {
        self.calls.push(format!("rect {position:?} {size:?} {colour:?}"));
    }

    fn line(&mut self, from: crate::Vector2, to: crate::Vector2, colour: Colour) {
        self.calls.push(format!("line {from:?} {to:?} {colour:?}"));
    }

    fn text(&mut self, _position: crate::Vector2, text: &str, _colour: Colour) {
        self.calls.push(format!("text {text}"));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn converts_8bit_colours() {
        let colour = colour_from_rgb(palette::Srgb::new(255, 0, 255));
        assert_eq!(colour, (1.0, 0.0, 1.0, 1.0));
    }
}

//! The pause/play button in the top-right corner.

use crate::Vector2;

/// The width and height of the button.
const SIZE: f64 = 50.0;

/// The gap between the button and the edges of the canvas.
const MARGIN: f64 = 5.0;

/// What the button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Icon {
    /// Two vertical bars. Shown whilst running.
    Pause,
    /// A right-pointing triangle. Shown whilst paused.
    Play,
}

/// What pressing the button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    /// Pause or resume the simulation.
    TogglePause,
}

/// A clickable, icon-backed button.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Button {
    /// Top-left corner
    pub position: Vector2,
    /// Width and height
    pub size: Vector2,
    /// The current icon
    pub icon: Icon,
    /// What happens when it's pressed
    pub action: Action,
    /// Colour of the icon
    pub colour: crate::Colour,
}

impl Button {
    /// The pause button, tucked into the top-right corner of the canvas.
    #[must_use]
    pub fn pause(canvas: crate::Canvas) -> Self {
        Self {
            position: Vector2::new(canvas.width - SIZE - MARGIN, MARGIN),
            size: Vector2::new(SIZE, SIZE),
            icon: Icon::Pause,
            action: Action::TogglePause,
            colour: crate::painter::WHITE,
        }
    }

    /// Is the point strictly inside the button? Points on the border don't count.
    #[must_use]
    pub fn contains(&self, point: Vector2) -> bool {
        point.x > self.position.x
            && point.x < self.position.x + self.size.x
            && point.y > self.position.y
            && point.y < self.position.y + self.size.y
    }

    /// If the point is on the button, return its action.
    #[must_use]
    pub fn press(&self, point: Vector2) -> Option<Action> {
        self.contains(point).then_some(self.action)
    }

    /// Show the icon that matches the paused state.
    pub fn show_paused(&mut self, is_paused: bool) {
        self.icon = if is_paused { Icon::Play } else { Icon::Pause };
    }

    /// Draw two bars, each a third of the button's width.
    fn draw_pause_icon(&self, painter: &mut dyn crate::Painter) {
        let bar = Vector2::new(self.size.x / 3.0, self.size.y);
        painter.fill_rect(self.position, bar, self.colour);
        let right = Vector2::new(self.position.x + (self.size.x * 2.0 / 3.0), self.position.y);
        painter.fill_rect(right, bar, self.colour);
    }

    /// Draw a triangle as a stack of horizontal slices that get shorter towards the top and
    /// bottom.
    fn draw_play_icon(&self, painter: &mut dyn crate::Painter) {
        let slices = 10u8;
        let slice_height = self.size.y / f64::from(slices);
        let middle = f64::from(slices) / 2.0;
        for slice in 0..slices {
            let centre = f64::from(slice) + 0.5;
            let width = self.size.x * (1.0 - ((centre - middle).abs() / middle));
            let position = Vector2::new(
                self.position.x,
                self.position.y + (f64::from(slice) * slice_height),
            );
            painter.fill_rect(position, Vector2::new(width, slice_height), self.colour);
        }
    }
}

impl crate::Entity for Button {
    fn update(&mut self, _environment: &crate::Environment) {}

    fn draw(&self, painter: &mut dyn crate::Painter, environment: &crate::Environment) {
        if environment.paused {
            painter.clear_rect(self.position, self.size);
        }

        match self.icon {
            Icon::Pause => self.draw_pause_icon(painter),
            Icon::Play => self.draw_play_icon(painter),
        }
    }
}

//! The ball: falls under gravity and bounces off the floor.

use rand::Rng as _;

use crate::Vector2;

/// How much longer than the actual velocity the drawn velocity vector is.
const VELOCITY_VECTOR_SCALE: f64 = 5.0;

/// Where the velocity readout sits, relative to the ball's centre and top.
const VELOCITY_LABEL_OFFSET: Vector2 = Vector2::new(-75.0, -20.0);

/// Each colour channel of a new ball is picked from this range, so it's never too dark or too
/// bright.
const COLOUR_CHANNEL_RANGE: core::ops::Range<u8> = 20..230;

/// Floating point slack allowed when deciding whether the ball is resting on the floor.
const CONTACT_TOLERANCE: f64 = 1e-9;

/// Which rule moved the ball during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Motion {
    /// The ball was touching the floor, so it rebounded and gravity wasn't applied.
    Contact,
    /// The ball was in the air, so gravity accelerated it.
    FreeFall,
}

/// The one and only ball.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Ball {
    /// Position of the centre
    pub position: Vector2,
    /// Distance travelled per tick
    pub velocity: Vector2,
    /// Radius
    pub radius: f64,
    /// Fill colour
    pub colour: palette::Srgb<u8>,
}

impl Ball {
    /// A stationary ball with a random colour.
    #[must_use]
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        let mut rng = rand::thread_rng();
        let colour = palette::Srgb::new(
            rng.gen_range(COLOUR_CHANNEL_RANGE),
            rng.gen_range(COLOUR_CHANNEL_RANGE),
            rng.gen_range(COLOUR_CHANNEL_RANGE),
        );
        Self::with_colour(x, y, radius, colour)
    }

    /// A stationary ball with a known colour.
    #[must_use]
    pub const fn with_colour(x: f64, y: f64, radius: f64, colour: palette::Srgb<u8>) -> Self {
        Self {
            position: Vector2::new(x, y),
            velocity: Vector2::zero(),
            radius,
            colour,
        }
    }

    /// Nudge the velocity. Mass is always 1, so a force is just a change in velocity.
    pub fn apply_force(&mut self, force: Vector2) {
        self.velocity.add(force);
    }

    /// The lowest point of the ball.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.position.y + self.radius
    }

    /// Whether the ball's bottom edge has reached or passed the floor.
    ///
    /// A ball that sits exactly on the floor but is already moving upwards has just bounced, so
    /// it doesn't count.
    #[must_use]
    pub fn is_in_contact(&self, floor_y: f64) -> bool {
        let gap = floor_y - self.bottom();
        gap < 0.0 || (gap <= CONTACT_TOLERANCE && self.velocity.y >= 0.0)
    }

    /// Advance the ball by one tick.
    ///
    /// On contact the downward velocity is cancelled and replaced by a rebound of `elasticity`
    /// times the impact speed, and the ball is lifted back onto the floor. Gravity is skipped on
    /// that tick. Otherwise gravity updates the velocity first and then the velocity moves the
    /// ball (semi-implicit Euler).
    pub fn step(&mut self, environment: &crate::Environment) -> Motion {
        if self.is_in_contact(environment.floor_y) {
            let impact_velocity = self.velocity.y;
            let cancel_force = -impact_velocity;
            let rebound_force = impact_velocity * environment.parameters.elasticity;
            self.apply_force(Vector2::new(0.0, cancel_force - rebound_force));
            self.position.y = environment.floor_y - self.radius;
            return Motion::Contact;
        }

        let acceleration = environment.parameters.gravity / 1000.0;
        self.apply_force(Vector2::new(0.0, acceleration * crate::FRAME_RATE));
        self.position.add(self.velocity);
        Motion::FreeFall
    }

    /// Teleport the ball so that it hangs just above the given point, at rest.
    pub fn reposition(&mut self, point: Vector2) {
        self.position = Vector2::new(point.x, point.y - (self.radius / 2.0));
        self.velocity = Vector2::zero();
        tracing::debug!("Ball repositioned to {:?}", self.position);
    }
}

impl crate::Entity for Ball {
    fn update(&mut self, environment: &crate::Environment) {
        let motion = self.step(environment);
        tracing::trace!(
            "Ball {motion:?}: position={:?} velocity={:?}",
            self.position,
            self.velocity
        );
    }

    fn draw(&self, painter: &mut dyn crate::Painter, environment: &crate::Environment) {
        painter.fill_circle(
            self.position,
            self.radius,
            crate::painter::colour_from_rgb(self.colour),
        );

        if !environment.parameters.show_velocity {
            return;
        }

        let tip = Vector2::new(
            self.position.x,
            self.position.y + (self.velocity.y * VELOCITY_VECTOR_SCALE),
        );
        painter.line(self.position, tip, crate::painter::BLACK);

        let label_position = Vector2::new(
            self.position.x + VELOCITY_LABEL_OFFSET.x,
            self.position.y - self.radius + VELOCITY_LABEL_OFFSET.y,
        );
        painter.text(
            label_position,
            &crate::units::format_velocity(self.velocity.y),
            crate::painter::WHITE,
        );
    }
}

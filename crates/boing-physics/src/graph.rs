//! Plotting the ball's displacement, velocity and energy as points that drift off the screen.

use std::collections::VecDeque;

use crate::Vector2;

/// The default radius of a plotted point in world units.
pub const DEFAULT_POINT_RADIUS: f64 = 5.0;

/// Scales the potential energy down so that it fits on the canvas.
const POTENTIAL_ENERGY_SCALE: f64 = 120.0;

/// Scales the kinetic energy down so that it fits on the canvas.
const KINETIC_ENERGY_SCALE: f64 = 2.0;

/// A quantity derived from the ball that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Channel {
    /// Where the ball is.
    Displacement,
    /// How fast the ball is moving, vertically.
    Velocity,
    /// Gravitational potential energy, `mgh` with a mass of 1.
    PotentialEnergy,
    /// Kinetic energy, `mv²/2` with a mass of 1.
    KineticEnergy,
}

impl Channel {
    /// Every channel, in the order they're sampled.
    pub const ALL: [Self; 4] = [
        Self::Displacement,
        Self::Velocity,
        Self::PotentialEnergy,
        Self::KineticEnergy,
    ];

    /// Each channel has its own colour.
    #[must_use]
    pub const fn colour(self) -> palette::Srgb<u8> {
        match self {
            Self::Displacement => palette::Srgb::new(67, 188, 224),
            Self::Velocity => palette::Srgb::new(33, 204, 110),
            Self::PotentialEnergy => palette::Srgb::new(144, 47, 196),
            Self::KineticEnergy => palette::Srgb::new(232, 48, 23),
        }
    }

    /// The vertical position of a new point for this channel.
    ///
    /// Everything apart from displacement is plotted around the vertical middle of the canvas.
    /// Energies are negated so that more energy is drawn higher up.
    #[must_use]
    pub fn sample(
        self,
        ball: &crate::Ball,
        floor: &crate::Floor,
        gravity: f64,
        midpoint: f64,
    ) -> f64 {
        match self {
            Self::Displacement => ball.position.y,
            Self::Velocity => midpoint + ball.velocity.y,
            Self::PotentialEnergy => {
                let height = floor.position.y - ball.position.y - ball.radius;
                let energy = -(gravity * height) / POTENTIAL_ENERGY_SCALE;
                midpoint + energy
            }
            Self::KineticEnergy => {
                let energy = -(ball.velocity.y.powi(2) / 2.0) / KINETIC_ENERGY_SCALE;
                midpoint + energy
            }
        }
    }
}

/// A single plotted sample. Only ever moves left.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct GraphPoint {
    /// Centre
    pub position: Vector2,
    /// Radius
    pub radius: f64,
    /// Fill colour
    pub colour: crate::Colour,
}

impl GraphPoint {
    /// Instantiate
    #[must_use]
    pub const fn new(x: f64, y: f64, radius: f64, colour: crate::Colour) -> Self {
        Self {
            position: Vector2::new(x, y),
            radius,
            colour,
        }
    }

    /// Whether the point has completely left the canvas on the left.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.position.x < -self.radius
    }
}

impl crate::Entity for GraphPoint {
    fn update(&mut self, environment: &crate::Environment) {
        self.position.x -= environment.parameters.points_speed;
    }

    fn draw(&self, painter: &mut dyn crate::Painter, _environment: &crate::Environment) {
        painter.fill_circle(self.position, self.radius, self.colour);
    }
}

/// All the live graph points, oldest first.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct Graph {
    /// The points, in the order they were created
    pub points: VecDeque<GraphPoint>,
    /// Radius of new points
    pub point_radius: f64,
    /// The most points that are kept. The oldest are dropped first.
    pub max_points: usize,
}

impl Graph {
    /// Instantiate
    #[must_use]
    pub const fn new(point_radius: f64, max_points: usize) -> Self {
        Self {
            points: VecDeque::new(),
            point_radius,
            max_points,
        }
    }

    /// Add a point for every channel that is being plotted.
    pub fn sample(
        &mut self,
        ball: &crate::Ball,
        floor: &crate::Floor,
        parameters: &crate::Parameters,
        midpoint: f64,
    ) {
        for channel in Channel::ALL {
            if !parameters.is_plotting(channel) {
                continue;
            }

            let y = channel.sample(ball, floor, parameters.gravity, midpoint);
            self.points.push_back(GraphPoint::new(
                ball.position.x,
                y,
                self.point_radius,
                crate::painter::colour_from_rgb(channel.colour()),
            ));
        }

        self.remove_old_points();
    }

    /// Drift every point and then forget the ones that have left the canvas.
    ///
    /// Points normally expire in the order they were created. But the ball can be moved to the
    /// left, so every point is checked rather than just the oldest.
    pub fn advance(&mut self, environment: &crate::Environment) {
        for point in &mut self.points {
            crate::Entity::update(point, environment);
        }

        let before = self.points.len();
        self.points.retain(|point| !point.is_expired());
        let evicted = before - self.points.len();
        if evicted > 0 {
            tracing::trace!("Evicted {evicted} graph point(s)");
        }
    }

    /// Drop the oldest points when there are too many.
    fn remove_old_points(&mut self) {
        while self.points.len() > self.max_points {
            self.points.pop_front();
        }
    }

    /// Draw every live point.
    pub fn draw(&self, painter: &mut dyn crate::Painter, environment: &crate::Environment) {
        for point in &self.points {
            crate::Entity::draw(point, painter, environment);
        }
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "The samples are exact here")]
mod test {
    use super::*;

    const MIDPOINT: f64 = 300.0;

    fn floor() -> crate::Floor {
        crate::Floor::new(crate::Canvas::new(800.0, 600.0), 10.0)
    }

    fn ball(y: f64, velocity: f64) -> crate::Ball {
        let mut ball = crate::Ball::with_colour(200.0, y, 50.0, palette::Srgb::new(1, 2, 3));
        ball.velocity.y = velocity;
        ball
    }

    #[test]
    fn displacement_and_velocity_samples() {
        let ball = ball(123.0, 7.0);
        assert_eq!(Channel::Displacement.sample(&ball, &floor(), 50.0, MIDPOINT), 123.0);
        assert_eq!(Channel::Velocity.sample(&ball, &floor(), 50.0, MIDPOINT), 307.0);
    }

    #[test]
    fn potential_energy_of_a_ball_at_rest() {
        // The bottom of the ball is 120 above the floor at y=590.
        let ball = ball(420.0, 0.0);
        let y = Channel::PotentialEnergy.sample(&ball, &floor(), 120.0, MIDPOINT);
        assert_eq!(y - MIDPOINT, -120.0);
    }

    #[test]
    fn kinetic_energy_of_a_rising_ball() {
        let ball = ball(420.0, -20.0);
        let y = Channel::KineticEnergy.sample(&ball, &floor(), 120.0, MIDPOINT);
        assert_eq!(y - MIDPOINT, -100.0);
    }

    #[test]
    fn only_enabled_channels_are_sampled() {
        let parameters = crate::Parameters {
            plot_velocity: true,
            plot_kinetic_energy: true,
            ..crate::Parameters::default()
        };
        let mut graph = Graph::new(DEFAULT_POINT_RADIUS, 100);
        graph.sample(&ball(100.0, 4.0), &floor(), &parameters, MIDPOINT);

        let colours: Vec<crate::Colour> = graph.points.iter().map(|point| point.colour).collect();
        assert_eq!(
            colours,
            vec![
                crate::painter::colour_from_rgb(Channel::Velocity.colour()),
                crate::painter::colour_from_rgb(Channel::KineticEnergy.colour()),
            ]
        );
        assert!(graph.points.iter().all(|point| point.position.x == 200.0));
    }

    #[test]
    fn points_drift_until_they_leave_the_canvas() {
        let parameters = crate::Parameters {
            points_speed: 5.0,
            ..crate::Parameters::default()
        };
        let environment = crate::Environment::new(&parameters, 590.0, false);
        let mut graph = Graph::new(5.0, 100);
        graph
            .points
            .push_back(GraphPoint::new(12.0, 0.0, 5.0, crate::painter::WHITE));

        let mut positions = Vec::new();
        while let Some(point) = graph.points.front() {
            positions.push(point.position.x);
            graph.advance(&environment);
        }

        assert_eq!(positions, vec![12.0, 7.0, 2.0, -3.0]);
    }

    #[test]
    fn points_behind_the_oldest_still_expire() {
        let parameters = crate::Parameters {
            points_speed: 10.0,
            ..crate::Parameters::default()
        };
        let environment = crate::Environment::new(&parameters, 590.0, false);
        let mut graph = Graph::new(5.0, 100);
        graph
            .points
            .push_back(GraphPoint::new(500.0, 0.0, 5.0, crate::painter::WHITE));
        graph
            .points
            .push_back(GraphPoint::new(3.0, 0.0, 5.0, crate::painter::WHITE));

        graph.advance(&environment);

        assert_eq!(graph.points.len(), 1);
        assert_eq!(graph.points[0].position.x, 490.0);
    }

    #[test]
    fn oldest_points_are_dropped_beyond_the_maximum() {
        let parameters = crate::Parameters {
            plot_displacement: true,
            ..crate::Parameters::default()
        };
        let mut graph = Graph::new(5.0, 3);
        for y in 0..5 {
            graph.sample(&ball(f64::from(y), 0.0), &floor(), &parameters, MIDPOINT);
        }

        let ys: Vec<f64> = graph.points.iter().map(|point| point.position.y).collect();
        assert_eq!(ys, vec![2.0, 3.0, 4.0]);
    }
}

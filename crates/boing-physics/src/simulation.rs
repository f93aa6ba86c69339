//! The whole simulation in one owning context: one tick updates it, one draw renders it.

use crate::{Entity as _, Vector2};

/// How far above the vertical middle of the canvas the ball starts.
const START_HEIGHT_ABOVE_MIDDLE: f64 = 100.0;

/// Where on-canvas readouts sit, relative to the left edge and the top of the floor.
const READOUT_MARGIN: f64 = 5.0;

/// The size of the canvas in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "A canvas is only ever going to have a width and a height"
)]
pub struct Canvas {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Canvas {
    /// Instantiate
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The vertical middle, which the velocity and energy plots are drawn around.
    #[must_use]
    pub fn midpoint(self) -> f64 {
        self.height / 2.0
    }
}

/// The fixed sizes of things in the world. These only change on restart or config reload.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct World {
    /// How many world units make up a single pixel on the display.
    pub scale: f64,
    /// Radius of the ball
    pub ball_radius: f64,
    /// Thickness of the floor
    pub floor_height: f64,
    /// Radius of a graph point
    pub graph_point_radius: f64,
    /// The most graph points that are kept alive at once
    pub max_graph_points: usize,
}

impl Default for World {
    fn default() -> Self {
        Self {
            scale: 8.0,
            ball_radius: 50.0,
            floor_height: crate::floor::DEFAULT_HEIGHT,
            graph_point_radius: crate::graph::DEFAULT_POINT_RADIUS,
            max_graph_points: 10_000,
        }
    }
}

/// What happened when the user pressed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Press {
    /// A button was pressed and its action has been run.
    Button(crate::button::Action),
    /// The ball was moved to the pointer.
    Teleport,
    /// Nothing happened.
    Ignored,
}

/// `Simulation`
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Simulation {
    /// The size of the canvas
    pub canvas: Canvas,
    /// Fixed sizes
    pub world: World,
    /// The ground
    pub floor: crate::Floor,
    /// The ball
    pub ball: crate::Ball,
    /// The plotted points
    pub graph: crate::Graph,
    /// The pause/play button
    pub button: crate::Button,
    /// Everything the user can tune
    pub parameters: crate::Parameters,
    /// Whether the simulation is paused
    pub paused: bool,
    /// Simulated time, which doesn't advance whilst paused
    pub ms_elapsed: f64,
    /// The number of ticks that have actually been simulated
    pub ticks: u64,
    /// A readout of the ball's height, stamped when the pause button is pressed. Where it's
    /// drawn and what it says.
    pub height_readout: Option<(Vector2, String)>,
}

impl Simulation {
    /// Start with a randomly coloured ball above the middle of the canvas.
    #[must_use]
    pub fn new(canvas: Canvas, world: World, parameters: crate::Parameters) -> Self {
        let ball = crate::Ball::new(
            canvas.width / 2.0,
            canvas.midpoint() - START_HEIGHT_ABOVE_MIDDLE,
            world.ball_radius,
        );
        Self::with_ball(canvas, world, parameters, ball)
    }

    /// Start with the given ball.
    #[must_use]
    pub fn with_ball(
        canvas: Canvas,
        world: World,
        parameters: crate::Parameters,
        ball: crate::Ball,
    ) -> Self {
        tracing::debug!("New simulation on canvas {canvas:?}");
        Self {
            canvas,
            floor: crate::Floor::new(canvas, world.floor_height),
            ball,
            graph: crate::Graph::new(world.graph_point_radius, world.max_graph_points),
            button: crate::Button::pause(canvas),
            world,
            parameters,
            paused: false,
            ms_elapsed: 0.0,
            ticks: 0,
            height_readout: None,
        }
    }

    /// Advance everything by one tick. Returns whether anything actually happened.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }

        self.height_readout = None;

        let environment =
            crate::Environment::new(&self.parameters, self.floor.position.y, self.paused);
        self.floor.update(&environment);
        self.ball.update(&environment);
        self.graph.sample(
            &self.ball,
            &self.floor,
            &self.parameters,
            self.canvas.midpoint(),
        );
        self.graph.advance(&environment);

        self.ms_elapsed += crate::FRAME_RATE;
        self.ticks += 1;
        true
    }

    /// Render the current state. Calling this repeatedly without a tick always paints the same
    /// thing.
    pub fn draw(&self, painter: &mut dyn crate::Painter) {
        let environment =
            crate::Environment::new(&self.parameters, self.floor.position.y, self.paused);

        painter.clear();
        self.floor.draw(painter, &environment);
        self.ball.draw(painter, &environment);
        self.graph.draw(painter, &environment);

        painter.text(
            self.readout_position(READOUT_MARGIN),
            &crate::units::format_elapsed(self.ms_elapsed),
            crate::painter::WHITE,
        );
        if let Some((position, text)) = &self.height_readout {
            painter.text(*position, text, crate::painter::WHITE);
        }

        self.button.draw(painter, &environment);
    }

    /// Handle the user pressing the pointer on the canvas. Buttons take priority, otherwise the
    /// ball is moved to the pointer, but only if the modifier key is held.
    pub fn press(&mut self, point: Vector2, is_modifier_held: bool) -> Press {
        if let Some(action) = self.button.press(point) {
            match action {
                crate::button::Action::TogglePause => self.toggle_pause(),
            }
            return Press::Button(action);
        }

        if is_modifier_held {
            self.ball.reposition(point);
            return Press::Teleport;
        }

        Press::Ignored
    }

    /// Pause or resume. Also stamps the ball's current height next to it.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.button.show_paused(self.paused);

        let height = self.floor.position.y - self.ball.bottom();
        let position =
            self.readout_position(self.ball.position.x + self.ball.radius + READOUT_MARGIN);
        self.height_readout = Some((position, crate::units::format_height(height)));

        tracing::debug!("Simulation paused: {}", self.paused);
    }

    /// The canvas has changed size. Everything that depends on its size is rebuilt, and the ball
    /// is kept inside it.
    pub fn resize(&mut self, canvas: Canvas) {
        tracing::debug!("Resizing simulation canvas to {canvas:?}");
        self.canvas = canvas;
        self.floor = crate::Floor::new(canvas, self.world.floor_height);
        self.button = crate::Button::pause(canvas);
        self.button.show_paused(self.paused);

        self.ball.position.x = self.ball.position.x.clamp(0.0, canvas.width.max(0.0));
        if self.ball.bottom() > self.floor.position.y {
            self.ball.position.y = self.floor.position.y - self.ball.radius;
        }
    }

    /// Just above the floor, at the given distance from the left.
    fn readout_position(&self, x: f64) -> Vector2 {
        Vector2::new(x, self.canvas.height - self.floor.height - READOUT_MARGIN)
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "The simulation's results are exact here")]
mod test {
    use super::*;

    fn simulation(parameters: crate::Parameters) -> Simulation {
        let ball = crate::Ball::with_colour(400.0, 200.0, 50.0, palette::Srgb::new(9, 9, 9));
        Simulation::with_ball(
            Canvas::new(800.0, 600.0),
            World::default(),
            parameters,
            ball,
        )
    }

    #[test]
    fn ball_starts_above_the_middle() {
        let simulation = Simulation::new(
            Canvas::new(800.0, 600.0),
            World::default(),
            crate::Parameters::default(),
        );
        assert_eq!(simulation.ball.position, Vector2::new(400.0, 200.0));
        assert_eq!(simulation.ball.radius, 50.0);
        assert_eq!(simulation.floor.position.y, 590.0);
    }

    #[test]
    fn a_tick_advances_time_and_samples_the_graph() {
        let mut simulation = simulation(crate::Parameters {
            plot_displacement: true,
            plot_potential_energy: true,
            ..crate::Parameters::default()
        });

        assert!(simulation.tick());
        assert_eq!(simulation.ticks, 1);
        assert_eq!(simulation.ms_elapsed, crate::FRAME_RATE);
        assert_eq!(simulation.graph.points.len(), 2);

        // New points drift on the tick that they are made.
        let drift = simulation.parameters.points_speed;
        assert!(simulation
            .graph
            .points
            .iter()
            .all(|point| point.position.x == 400.0 - drift));
    }

    #[test]
    fn nothing_moves_whilst_paused() {
        let mut simulation = simulation(crate::Parameters::default());
        simulation.tick();
        simulation.toggle_pause();
        let frozen = simulation.ball.clone();

        for _ in 0..10 {
            assert!(!simulation.tick());
        }

        assert_eq!(simulation.ball, frozen);
        assert_eq!(simulation.ticks, 1);
    }

    #[test]
    fn drawing_is_idempotent() {
        let mut simulation = simulation(crate::Parameters {
            show_velocity: true,
            plot_velocity: true,
            ..crate::Parameters::default()
        });
        for _ in 0..5 {
            simulation.tick();
        }

        let mut first = crate::painter::RecordingPainter::default();
        simulation.draw(&mut first);
        let mut second = crate::painter::RecordingPainter::default();
        simulation.draw(&mut second);

        assert_eq!(first, second);
        assert_eq!(first.calls[0], "clear");
    }

    #[test]
    fn pressing_the_button_pauses_and_stamps_the_height() {
        let mut simulation = simulation(crate::Parameters::default());
        let on_button = Vector2::new(770.0, 30.0);

        let press = simulation.press(on_button, true);

        assert_eq!(press, Press::Button(crate::button::Action::TogglePause));
        assert!(simulation.paused);
        assert_eq!(simulation.button.icon, crate::button::Icon::Play);
        // The bottom of the ball is 340 above the floor.
        let (position, text) = simulation.height_readout.clone().unwrap();
        assert_eq!(text, "height = 9.00 cm");
        assert_eq!(position, Vector2::new(455.0, 585.0));

        let mut painter = crate::painter::RecordingPainter::default();
        simulation.draw(&mut painter);
        assert!(painter.texts().contains(&text));

        simulation.press(on_button, false);
        assert!(!simulation.paused);
        simulation.tick();
        assert_eq!(simulation.height_readout, None);
    }

    #[test]
    fn teleporting_needs_the_modifier() {
        let mut simulation = simulation(crate::Parameters::default());
        simulation.ball.velocity.y = 6.0;

        assert_eq!(
            simulation.press(Vector2::new(100.0, 100.0), false),
            Press::Ignored
        );
        assert_eq!(simulation.ball.velocity.y, 6.0);

        assert_eq!(
            simulation.press(Vector2::new(100.0, 100.0), true),
            Press::Teleport
        );
        assert_eq!(simulation.ball.position, Vector2::new(100.0, 75.0));
        assert_eq!(simulation.ball.velocity, Vector2::zero());
    }

    #[test]
    fn dropped_ball_settles_on_the_floor() {
        let mut simulation = simulation(crate::Parameters {
            gravity: 98.0,
            elasticity: 0.0,
            ..crate::Parameters::default()
        });

        let mut ticks = 0;
        while simulation.ball.bottom() != simulation.floor.position.y
            || simulation.ball.velocity.y != 0.0
        {
            simulation.tick();
            ticks += 1;
            assert!(ticks < 200, "Ball didn't settle");
        }

        for _ in 0..300 {
            simulation.tick();
            assert_eq!(simulation.ball.bottom(), simulation.floor.position.y);
        }
    }

    #[test]
    fn elapsed_time_is_drawn_above_the_floor() {
        let mut simulation = simulation(crate::Parameters::default());
        for _ in 0..60 {
            simulation.tick();
        }
        let mut painter = crate::painter::RecordingPainter::default();
        simulation.draw(&mut painter);
        assert_eq!(painter.texts(), vec!["1.00 s".to_owned()]);
    }

    #[test]
    fn resizing_keeps_the_ball_above_the_floor() {
        let mut simulation = simulation(crate::Parameters::default());
        simulation.ball.position.y = 500.0;

        simulation.resize(Canvas::new(300.0, 400.0));

        assert_eq!(simulation.floor.position.y, 390.0);
        assert_eq!(simulation.floor.width, 300.0);
        assert_eq!(simulation.ball.position, Vector2::new(300.0, 340.0));
        assert_eq!(simulation.button.position, Vector2::new(245.0, 5.0));
    }
}

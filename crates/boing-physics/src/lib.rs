//! Boing physics: a ball that falls, bounces off a floor and leaves a trail of graph points.
//!
//! Nothing in here knows about terminals. Everything that gets drawn goes through the [`Painter`]
//! trait, so the simulation can be rendered anywhere, or recorded in tests.

pub mod ball;
pub mod button;
pub mod floor;
pub mod graph;
pub mod painter;
pub mod parameters;
pub mod simulation;
pub mod units;
pub mod vector;

pub use ball::Ball;
pub use button::Button;
pub use floor::Floor;
pub use graph::{Channel, Graph, GraphPoint};
pub use painter::{Colour, Entity, Environment, Painter};
pub use parameters::Parameters;
pub use simulation::{Canvas, Press, Simulation, World};
pub use vector::Vector2;

/// The length of one tick in milliseconds. The integrator is tuned against this 60Hz reference,
/// regardless of how often the frames are actually rendered.
pub const FRAME_RATE: f64 = 1000.0 / 60.0;

//! Boing: a bouncing ball, with live physics graphs, in your terminal.

pub mod cli_args;
/// All the user-configurable settings.
pub mod config {
    pub mod input;
    pub mod main;
}
pub mod controls;
pub mod hud;
pub mod raw_input;
pub mod renderer;
pub mod run;
pub mod shared_state;
pub mod surface;
pub mod toy;
pub mod utils;

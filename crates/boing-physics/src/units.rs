//! Converting world units into something a human can relate to.

/// An empirical scale: roughly how many centimetres one world unit is on a typical screen.
const CENTIMETRES_PER_UNIT: f64 = 0.026458;

/// Convert world units to centimetres.
#[must_use]
pub fn pixels_to_cm(value: f64) -> f64 {
    value * CENTIMETRES_PER_UNIT
}

/// Convert a per-tick speed to centimetres per second.
#[must_use]
pub fn pixels_per_frame_to_cm_per_second(value: f64) -> f64 {
    let ticks_per_second = 1000.0 / crate::FRAME_RATE;
    pixels_to_cm(value * ticks_per_second)
}

/// Milliseconds to seconds.
#[must_use]
pub fn ms_to_seconds(value: f64) -> f64 {
    value / 1000.0
}

/// The readout next to the ball when its velocity is shown. Positive velocities point down.
#[must_use]
pub fn format_velocity(velocity: f64) -> String {
    format!("{:.2} cm/s [DOWN]", pixels_per_frame_to_cm_per_second(velocity))
}

/// The simulated time since startup.
#[must_use]
pub fn format_elapsed(ms_elapsed: f64) -> String {
    format!("{:.2} s", ms_to_seconds(ms_elapsed))
}

/// How high the bottom of the ball is above the floor. Never negative.
#[must_use]
pub fn format_height(height: f64) -> String {
    format!("height = {:.2} cm", pixels_to_cm(height).max(0.0))
}

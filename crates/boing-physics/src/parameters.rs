//! All the values the user can tune whilst the simulation is running.

/// The tunable parameters. They're only ever written by the controls (or a config reload) and
/// only ever read by the tick.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Scale of the gravitational acceleration. A tick adds `gravity / 1000` per millisecond.
    pub gravity: f64,
    /// How much of the impact speed is given back as rebound speed.
    pub elasticity: f64,
    /// How far the graph points drift to the left each tick.
    pub points_speed: f64,
    /// Draw the ball's velocity vector and speed.
    pub show_velocity: bool,
    /// Plot the ball's vertical position.
    pub plot_displacement: bool,
    /// Plot the ball's vertical velocity.
    pub plot_velocity: bool,
    /// Plot the ball's gravitational potential energy.
    pub plot_potential_energy: bool,
    /// Plot the ball's kinetic energy.
    pub plot_kinetic_energy: bool,
    /// Show the panel explaining the effect of the last change.
    pub show_extra_info: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: 50.0,
            elasticity: 0.8,
            points_speed: 5.0,
            show_velocity: false,
            plot_displacement: false,
            plot_velocity: false,
            plot_potential_energy: false,
            plot_kinetic_energy: false,
            show_extra_info: true,
        }
    }
}

impl Parameters {
    /// Whether the given graph channel is being plotted.
    #[must_use]
    pub const fn is_plotting(&self, channel: crate::Channel) -> bool {
        match channel {
            crate::Channel::Displacement => self.plot_displacement,
            crate::Channel::Velocity => self.plot_velocity,
            crate::Channel::PotentialEnergy => self.plot_potential_energy,
            crate::Channel::KineticEnergy => self.plot_kinetic_energy,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parameters: Parameters = toml::from_str("gravity = 98.0\nplot_velocity = true").unwrap();
        assert!((parameters.gravity - 98.0).abs() < f64::EPSILON);
        assert!(parameters.plot_velocity);
        assert!(!parameters.plot_displacement);
        assert!((parameters.elasticity - 0.8).abs() < f64::EPSILON);
    }
}

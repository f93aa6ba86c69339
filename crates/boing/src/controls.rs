//! The sliders and checkboxes that tune the simulation, and the panel that explains what the
//! last change did.

use boing_physics::Parameters;

use crate::config::input::KeybindingAction;

/// Every control that can change a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControlId {
    /// Gravity slider
    Gravity,
    /// Elasticity slider
    Elasticity,
    /// Graph point drift slider
    PointsSpeed,
    /// Show velocity checkbox
    ShowVelocity,
    /// Plot displacement checkbox
    PlotDisplacement,
    /// Plot velocity checkbox
    PlotVelocity,
    /// Plot potential energy checkbox
    PlotPotentialEnergy,
    /// Plot kinetic energy checkbox
    PlotKineticEnergy,
    /// Show extra info checkbox
    ShowExtraInfo,
}

/// Which way to move a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Direction {
    /// Towards the maximum
    Up,
    /// Towards the minimum
    Down,
}

/// What a keybinding does to the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// Move a slider one step
    Nudge(ControlId, Direction),
    /// Flip a checkbox
    Toggle(ControlId),
}

impl Command {
    /// The command bound to an action, if the action changes a control.
    #[must_use]
    pub const fn from_action(action: KeybindingAction) -> Option<Self> {
        let command = match action {
            KeybindingAction::GravityDown => Self::Nudge(ControlId::Gravity, Direction::Down),
            KeybindingAction::GravityUp => Self::Nudge(ControlId::Gravity, Direction::Up),
            KeybindingAction::ElasticityDown => {
                Self::Nudge(ControlId::Elasticity, Direction::Down)
            }
            KeybindingAction::ElasticityUp => Self::Nudge(ControlId::Elasticity, Direction::Up),
            KeybindingAction::PointsSpeedDown => {
                Self::Nudge(ControlId::PointsSpeed, Direction::Down)
            }
            KeybindingAction::PointsSpeedUp => Self::Nudge(ControlId::PointsSpeed, Direction::Up),
            KeybindingAction::ToggleShowVelocity => Self::Toggle(ControlId::ShowVelocity),
            KeybindingAction::TogglePlotDisplacement => Self::Toggle(ControlId::PlotDisplacement),
            KeybindingAction::TogglePlotVelocity => Self::Toggle(ControlId::PlotVelocity),
            KeybindingAction::TogglePlotPotentialEnergy => {
                Self::Toggle(ControlId::PlotPotentialEnergy)
            }
            KeybindingAction::TogglePlotKineticEnergy => {
                Self::Toggle(ControlId::PlotKineticEnergy)
            }
            KeybindingAction::ToggleExtraInfo => Self::Toggle(ControlId::ShowExtraInfo),
            KeybindingAction::Quit | KeybindingAction::TogglePause => return None,
        };
        Some(command)
    }

    /// The control this command changes.
    #[must_use]
    pub const fn control(self) -> ControlId {
        match self {
            Self::Nudge(id, _) | Self::Toggle(id) => id,
        }
    }
}

/// How a control reads and writes its parameter.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum Widget {
    /// A number within a range.
    Slider {
        /// The smallest value
        min: f64,
        /// The largest value
        max: f64,
        /// The size of one nudge
        step: f64,
        /// Decimal places shown in the label
        decimals: usize,
        /// Read the parameter
        get: fn(&Parameters) -> f64,
        /// Write the parameter
        set: fn(&mut Parameters, f64),
    },
    /// On or off.
    Checkbox {
        /// Read the parameter
        get: fn(&Parameters) -> bool,
        /// Write the parameter
        set: fn(&mut Parameters, bool),
    },
}

/// What to tell the user after a slider has moved.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Explanation {
    /// Shown when the value went up
    pub increased: &'static str,
    /// Shown when the value went down
    pub decreased: &'static str,
}

/// A single entry in the controls registry.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct Control {
    /// Which control this is
    pub id: ControlId,
    /// The name shown in the HUD
    pub label: &'static str,
    /// How it changes its parameter
    pub widget: Widget,
    /// The explanation for a change, if the control has one
    pub explanation: Option<Explanation>,
}

impl Control {
    /// A slider
    const fn slider(
        id: ControlId,
        label: &'static str,
        (min, max, step, decimals): (f64, f64, f64, usize),
        get: fn(&Parameters) -> f64,
        set: fn(&mut Parameters, f64),
    ) -> Self {
        Self {
            id,
            label,
            widget: Widget::Slider {
                min,
                max,
                step,
                decimals,
                get,
                set,
            },
            explanation: None,
        }
    }

    /// A checkbox
    const fn checkbox(
        id: ControlId,
        label: &'static str,
        get: fn(&Parameters) -> bool,
        set: fn(&mut Parameters, bool),
    ) -> Self {
        Self {
            id,
            label,
            widget: Widget::Checkbox { get, set },
            explanation: None,
        }
    }

    /// Attach an explanation
    const fn explained(mut self, increased: &'static str, decreased: &'static str) -> Self {
        self.explanation = Some(Explanation {
            increased,
            decreased,
        });
        self
    }

    /// The HUD label, including the current value.
    #[must_use]
    pub fn describe(&self, parameters: &Parameters) -> String {
        match self.widget {
            Widget::Slider { decimals, get, .. } => {
                format!("{} ({:.decimals$})", self.label, get(parameters))
            }
            Widget::Checkbox { get, .. } => {
                let tick = if get(parameters) { "x" } else { " " };
                format!("[{tick}] {}", self.label)
            }
        }
    }
}

/// The registry of every control, along with the current explanation text.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Controls {
    /// Every control, in the order they're shown
    pub controls: Vec<Control>,
    /// The explanation of the last meaningful change
    pub panel: Option<String>,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    /// Register every control.
    #[must_use]
    pub fn new() -> Self {
        let controls = vec![
            Control::slider(
                ControlId::Gravity,
                "Gravity",
                (0.0, 100.0, 1.0, 0),
                |parameters| parameters.gravity,
                |parameters, value| parameters.gravity = value,
            )
            .explained(
                "You have increased the acceleration of gravity, therefore a greater \
                 downwards force is applied.",
                "You have decreased the acceleration of gravity, therefore a smaller \
                 downwards force is applied.",
            ),
            Control::slider(
                ControlId::Elasticity,
                "Elasticity",
                (0.0, 2.0, 0.05, 2),
                |parameters| parameters.elasticity,
                |parameters, value| parameters.elasticity = value,
            )
            .explained(
                "You have increased the elasticity of the ball, therefore more force will be \
                 applied to make the ball return to its original shape when it hits the ground \
                 and gets compressed. This shape restoration force is what causes the ball to \
                 bounce.",
                "You have decreased the elasticity of the ball, therefore less force will be \
                 applied to make the ball return to its original shape when it hits the ground \
                 and gets compressed. This shape restoration force is what causes the ball to \
                 bounce.",
            ),
            Control::slider(
                ControlId::PointsSpeed,
                "Plotted points speed",
                (0.0, 20.0, 1.0, 0),
                |parameters| parameters.points_speed,
                |parameters, value| parameters.points_speed = value,
            ),
            Control::checkbox(
                ControlId::ShowVelocity,
                "Show velocity",
                |parameters| parameters.show_velocity,
                |parameters, value| parameters.show_velocity = value,
            ),
            Control::checkbox(
                ControlId::PlotDisplacement,
                "Plot displacement",
                |parameters| parameters.plot_displacement,
                |parameters, value| parameters.plot_displacement = value,
            ),
            Control::checkbox(
                ControlId::PlotVelocity,
                "Plot velocity",
                |parameters| parameters.plot_velocity,
                |parameters, value| parameters.plot_velocity = value,
            ),
            Control::checkbox(
                ControlId::PlotPotentialEnergy,
                "Plot gravitational potential energy",
                |parameters| parameters.plot_potential_energy,
                |parameters, value| parameters.plot_potential_energy = value,
            ),
            Control::checkbox(
                ControlId::PlotKineticEnergy,
                "Plot kinetic energy",
                |parameters| parameters.plot_kinetic_energy,
                |parameters, value| parameters.plot_kinetic_energy = value,
            ),
            Control::checkbox(
                ControlId::ShowExtraInfo,
                "Show extra info",
                |parameters| parameters.show_extra_info,
                |parameters, value| parameters.show_extra_info = value,
            ),
        ];

        Self {
            controls,
            panel: None,
        }
    }

    /// Look up a control.
    #[must_use]
    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|control| control.id == id)
    }

    /// Set a slider to a value, clamped to its range. If the control has an explanation then
    /// the panel says whether the value went up or down. An unchanged value leaves the panel as
    /// it was.
    pub fn set_slider(&mut self, parameters: &mut Parameters, id: ControlId, value: f64) {
        let Some(control) = self.get(id).copied() else {
            return;
        };
        let Widget::Slider {
            min, max, get, set, ..
        } = control.widget
        else {
            tracing::warn!("{id:?} isn't a slider");
            return;
        };

        let previous = get(parameters);
        let value = value.clamp(min, max);
        set(parameters, value);
        tracing::debug!("{} changed from {previous} to {value}", control.label);

        if let Some(explanation) = control.explanation {
            if value > previous {
                self.panel = Some(explanation.increased.to_owned());
            } else if value < previous {
                self.panel = Some(explanation.decreased.to_owned());
            }
        }
    }

    /// Move a slider by one step, snapping to the step grid so that repeated nudges don't
    /// accumulate floating point drift.
    pub fn nudge(&mut self, parameters: &mut Parameters, id: ControlId, direction: Direction) {
        let Some(Widget::Slider {
            min, step, get, ..
        }) = self.get(id).map(|control| control.widget)
        else {
            return;
        };

        let delta = match direction {
            Direction::Up => step,
            Direction::Down => -step,
        };
        let target = get(parameters) + delta;
        let snapped = ((target - min) / step).round().mul_add(step, min);
        self.set_slider(parameters, id, snapped);
    }

    /// Flip a checkbox.
    pub fn toggle(&self, parameters: &mut Parameters, id: ControlId) {
        let Some(control) = self.get(id) else {
            return;
        };
        let Widget::Checkbox { get, set } = control.widget else {
            tracing::warn!("{id:?} isn't a checkbox");
            return;
        };

        let value = !get(parameters);
        set(parameters, value);
        tracing::debug!("{} set to {value}", control.label);
    }

    /// Carry out a keybinding's command.
    pub fn apply(&mut self, parameters: &mut Parameters, command: Command) {
        match command {
            Command::Nudge(id, direction) => self.nudge(parameters, id, direction),
            Command::Toggle(id) => self.toggle(parameters, id),
        }
    }

    /// The explanation, but only when the user wants to see it.
    #[must_use]
    pub fn visible_panel(&self, parameters: &Parameters) -> Option<&str> {
        if !parameters.show_extra_info {
            return None;
        }
        self.panel.as_deref()
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "The slider steps are exact here")]
mod test {
    use super::*;

    #[test]
    fn registry_has_every_control() {
        let controls = Controls::new();
        assert_eq!(controls.controls.len(), 9);
        assert!(controls.get(ControlId::PlotKineticEnergy).is_some());
    }

    #[test]
    fn more_gravity_is_explained_as_increased() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.set_slider(&mut parameters, ControlId::Gravity, 80.0);

        assert_eq!(parameters.gravity, 80.0);
        let panel = controls.visible_panel(&parameters).unwrap();
        assert!(panel.starts_with("You have increased the acceleration of gravity"));
    }

    #[test]
    fn less_gravity_is_explained_as_decreased() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.set_slider(&mut parameters, ControlId::Gravity, 30.0);

        assert_eq!(parameters.gravity, 30.0);
        let panel = controls.visible_panel(&parameters).unwrap();
        assert!(panel.contains("decreased"));
        assert!(panel.contains("smaller downwards force"));
    }

    #[test]
    fn unchanged_value_keeps_the_previous_explanation() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.set_slider(&mut parameters, ControlId::Elasticity, 1.2);
        let before = controls.panel.clone();
        controls.set_slider(&mut parameters, ControlId::Elasticity, 1.2);

        assert_eq!(controls.panel, before);
        assert!(before.unwrap().contains("increased the elasticity"));
    }

    #[test]
    fn sliders_without_explanations_leave_the_panel_alone() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.set_slider(&mut parameters, ControlId::PointsSpeed, 9.0);

        assert_eq!(parameters.points_speed, 9.0);
        assert_eq!(controls.panel, None);
    }

    #[test]
    fn sliders_are_clamped() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.set_slider(&mut parameters, ControlId::Gravity, 500.0);
        assert_eq!(parameters.gravity, 100.0);

        controls.nudge(&mut parameters, ControlId::Gravity, Direction::Up);
        assert_eq!(parameters.gravity, 100.0);
    }

    #[test]
    fn nudges_snap_to_the_step() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        for _ in 0..3 {
            controls.nudge(&mut parameters, ControlId::Elasticity, Direction::Up);
        }
        assert!((parameters.elasticity - 0.95).abs() < 1e-9);
        assert_eq!(
            controls
                .get(ControlId::Elasticity)
                .unwrap()
                .describe(&parameters),
            "Elasticity (0.95)"
        );

        controls.nudge(&mut parameters, ControlId::Gravity, Direction::Down);
        assert_eq!(parameters.gravity, 49.0);
    }

    #[test]
    fn checkboxes_toggle_one_parameter() {
        let controls = Controls::new();
        let mut parameters = Parameters::default();

        controls.toggle(&mut parameters, ControlId::PlotVelocity);

        assert!(parameters.plot_velocity);
        assert_eq!(
            parameters,
            Parameters {
                plot_velocity: true,
                ..Parameters::default()
            }
        );
        assert_eq!(
            controls
                .get(ControlId::PlotVelocity)
                .unwrap()
                .describe(&parameters),
            "[x] Plot velocity"
        );
    }

    #[test]
    fn keybinding_commands() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();

        let up = Command::from_action(KeybindingAction::GravityUp).unwrap();
        controls.apply(&mut parameters, up);
        let toggle = Command::from_action(KeybindingAction::TogglePlotDisplacement).unwrap();
        controls.apply(&mut parameters, toggle);

        assert_eq!(parameters.gravity, 51.0);
        assert!(parameters.plot_displacement);
        assert_eq!(toggle.control(), ControlId::PlotDisplacement);
        assert_eq!(Command::from_action(KeybindingAction::Quit), None);
    }

    #[test]
    fn panel_is_hidden_without_extra_info() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();
        controls.set_slider(&mut parameters, ControlId::Gravity, 60.0);

        controls.toggle(&mut parameters, ControlId::ShowExtraInfo);

        assert!(controls.panel.is_some());
        assert_eq!(controls.visible_panel(&parameters), None);
    }
}

//! Keybindings: the actions keys can trigger, and turning config into `termwiz` key events.

/// A keybinding as written in the config file.
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct KeybindingConfigRaw {
    /// Modifiers joined with `|`, e.g. `CTRL|SHIFT`
    pub mods: Option<String>,
    /// A single character or a `termwiz` key name such as `PageUp`
    pub key: String,
}

/// All the possible actions a user can trigger in Boing
#[derive(serde::Serialize, serde::Deserialize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum KeybindingAction {
    /// Exit Boing.
    Quit,
    /// Pause or resume the simulation.
    TogglePause,
    /// Weaken gravity by one slider step.
    GravityDown,
    /// Strengthen gravity by one slider step.
    GravityUp,
    /// Make the ball less bouncy by one slider step.
    ElasticityDown,
    /// Make the ball more bouncy by one slider step.
    ElasticityUp,
    /// Slow the drift of the graph points.
    PointsSpeedDown,
    /// Speed up the drift of the graph points.
    PointsSpeedUp,
    /// Show or hide the velocity vector.
    ToggleShowVelocity,
    /// Plot the ball's displacement.
    TogglePlotDisplacement,
    /// Plot the ball's velocity.
    TogglePlotVelocity,
    /// Plot the ball's gravitational potential energy.
    TogglePlotPotentialEnergy,
    /// Plot the ball's kinetic energy.
    TogglePlotKineticEnergy,
    /// Show or hide the panel explaining the last change.
    ToggleExtraInfo,
}

/// Keybindings straight from the config file.
pub type KeybindingsRaw = std::collections::HashMap<KeybindingAction, KeybindingConfigRaw>;

/// Keybindings ready to compare with key presses.
pub type KeybindingsAsEvents =
    std::collections::HashMap<KeybindingAction, termwiz::input::KeyEvent>;

/// Parse modifiers written like `CTRL|SHIFT`.
///
/// # Errors
/// When any of the modifiers aren't recognised.
pub fn parse_modifiers(
    modifiers: String,
) -> std::result::Result<termwiz::input::Modifiers, std::io::Error> {
    modifiers.clone().try_into().map_err(|error| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Couldn't parse keybinding modifier '{modifiers}': {error:?}"),
        )
    })
}

/// Find the action, if any, that the user has bound to the given key event.
///
/// Terminals don't agree on whether a capital letter also reports the `SHIFT` modifier, so
/// `SHIFT` is ignored when comparing character keys.
#[must_use]
pub fn find_action(
    keybindings: &KeybindingsAsEvents,
    key_event: &termwiz::input::KeyEvent,
) -> Option<KeybindingAction> {
    keybindings
        .iter()
        .find_map(|(action, binding)| is_same_key(binding, key_event).then_some(*action))
}

/// Compare a binding to an actual key press, or to another binding.
#[must_use]
pub fn is_same_key(binding: &termwiz::input::KeyEvent, pressed: &termwiz::input::KeyEvent) -> bool {
    if binding.key != pressed.key {
        return false;
    }

    if matches!(binding.key, termwiz::input::KeyCode::Char(_)) {
        let shift = termwiz::input::Modifiers::SHIFT;
        return (binding.modifiers & !shift) == (pressed.modifiers & !shift);
    }

    binding.modifiers == pressed.modifiers
}

/// A human readable version of a binding, for the HUD.
#[must_use]
pub fn describe(key_event: &termwiz::input::KeyEvent) -> String {
    #[expect(
        clippy::wildcard_enum_match_arm,
        reason = "Only character keys get a short description"
    )]
    let key = match key_event.key {
        termwiz::input::KeyCode::Char(' ') => "space".to_owned(),
        termwiz::input::KeyCode::Char(character) => character.to_string(),
        ref other => format!("{other:?}"),
    };

    if key_event.modifiers == termwiz::input::Modifiers::NONE {
        key
    } else {
        format!("{:?}+{key}", key_event.modifiers)
    }
}

impl TryFrom<KeybindingConfigRaw> for termwiz::input::KeyEvent {
    type Error = std::io::Error;

    /// `KeyEvent` can't be built from a string, but it can be deserialized. So the binding is
    /// rewritten as a tiny TOML document in `KeyEvent`'s own shape and parsed.
    fn try_from(binding: KeybindingConfigRaw) -> std::result::Result<Self, Self::Error> {
        let key_code = match binding.key.chars().count() {
            1 => format!("{{ Char = \"{}\" }}", binding.key),
            _ => format!("\"{}\"", binding.key),
        };
        let document = format!("modifiers = {{ bits = 0 }}\nkey = {key_code}");

        let mut key_event = toml::from_str::<Self>(&document).map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Unknown key in binding {binding:?}: {}", error.message()),
            )
        })?;
        if let Some(modifiers) = binding.mods {
            key_event.modifiers = parse_modifiers(modifiers)?;
        }
        Ok(key_event)
    }
}

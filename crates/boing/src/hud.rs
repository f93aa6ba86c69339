//! The heads-up display: every control with its value and keys, then the explanation of the last
//! change.

use palette::Darken as _;

use boing_physics::{Colour, Parameters};

use crate::config::input::{KeybindingAction, KeybindingsAsEvents};
use crate::controls::{Command, Controls, Direction};
use crate::surface::Surface;

/// The widest that the explanation panel gets.
const PANEL_WIDTH: usize = 60;

/// Text colour of the word "increased".
const INCREASED: Colour = (0.4, 0.9, 0.4, 1.0);

/// Text colour of the word "decreased".
const DECREASED: Colour = (0.95, 0.35, 0.35, 1.0);

/// The panel's colour before it's darkened into a background.
const PANEL: Colour = (0.2, 0.4, 0.6, 1.0);

/// Draw the whole HUD over the top of the simulation.
pub fn draw(
    surface: &mut Surface,
    controls: &Controls,
    parameters: &Parameters,
    keybindings: &KeybindingsAsEvents,
    teleport_modifier: &str,
) {
    let mut row = 0;
    for control in &controls.controls {
        let keys = keys_for(keybindings, control.id);
        let line = format!(" {}  {keys} ", control.describe(parameters));
        put_line(surface, 0, row, &line, None, boing_physics::painter::WHITE);
        row += 1;
    }

    let hints = format!(
        " {}: pause  {}: quit  {teleport_modifier}+click: move ball ",
        key_for(keybindings, KeybindingAction::TogglePause),
        key_for(keybindings, KeybindingAction::Quit),
    );
    put_line(surface, 0, row, &hints, None, boing_physics::painter::WHITE);
    row += 2;

    if let Some(panel) = controls.visible_panel(parameters) {
        draw_panel(surface, row, panel);
    }
}

/// The keys bound to a control, like "g/G".
fn keys_for(keybindings: &KeybindingsAsEvents, id: crate::controls::ControlId) -> String {
    let mut bound: Vec<(u8, String)> = keybindings
        .iter()
        .filter_map(|(action, key_event)| {
            let command = Command::from_action(*action)?;
            if command.control() != id {
                return None;
            }
            let order = match command {
                Command::Nudge(_, Direction::Up) => 1,
                Command::Nudge(_, Direction::Down) | Command::Toggle(_) => 0,
            };
            Some((order, crate::config::input::describe(key_event)))
        })
        .collect();
    bound.sort();

    bound
        .into_iter()
        .map(|(_, key)| key)
        .collect::<Vec<String>>()
        .join("/")
}

/// The key bound to a single action.
fn key_for(keybindings: &KeybindingsAsEvents, action: KeybindingAction) -> String {
    keybindings
        .get(&action)
        .map_or_else(|| "unbound".to_owned(), crate::config::input::describe)
}

/// The wrapped explanation on a darkened background.
fn draw_panel(surface: &mut Surface, first_row: usize, panel: &str) {
    let width = surface.width.saturating_sub(2).min(PANEL_WIDTH);
    if width < 10 {
        return;
    }

    let darkenable: palette::Srgba<f32> = palette::rgb::Rgba::from(PANEL);
    let background: Colour = darkenable.darken(0.3).into();

    for (offset, line) in textwrap::wrap(panel, width - 2).iter().enumerate() {
        let row = first_row + offset;
        if row >= surface.height {
            break;
        }

        put_line(
            surface,
            0,
            row,
            &" ".repeat(width),
            Some(background),
            boing_physics::painter::WHITE,
        );
        let mut column = 1;
        for (segment, colour) in highlights(line) {
            put_line(surface, column, row, segment, Some(background), colour);
            column += segment.chars().count();
        }
    }
}

/// Write HUD text, cut off at the right edge of the surface. `termwiz` wraps anything longer onto
/// the next row, and on the last row that scrolls the whole frame up.
fn put_line(
    surface: &mut Surface,
    column: usize,
    row: usize,
    text: &str,
    background: Option<Colour>,
    foreground: Colour,
) {
    if row >= surface.height {
        return;
    }
    let room = surface.width.saturating_sub(column);
    if room == 0 {
        return;
    }

    let visible: String = text.chars().take(room).collect();
    surface.add_text(column, row, visible, background, Some(foreground));
}

/// Split a line so that the words "increased" and "decreased" get their own colours.
fn highlights(line: &str) -> Vec<(&str, Colour)> {
    let mut segments = Vec::new();
    let mut rest = line;

    loop {
        let next = [("increased", INCREASED), ("decreased", DECREASED)]
            .into_iter()
            .filter_map(|(word, colour)| rest.find(word).map(|index| (index, word, colour)))
            .min_by_key(|(index, _, _)| *index);
        let Some((index, word, colour)) = next else {
            break;
        };
        let Some((before, after)) = rest.split_at_checked(index) else {
            break;
        };
        let Some((highlighted, after)) = after.split_at_checked(word.len()) else {
            break;
        };

        if !before.is_empty() {
            segments.push((before, boing_physics::painter::WHITE));
        }
        segments.push((highlighted, colour));
        rest = after;
    }

    if !rest.is_empty() {
        segments.push((rest, boing_physics::painter::WHITE));
    }

    segments
}

#[cfg(test)]
mod test {
    use super::*;

    fn keybindings() -> KeybindingsAsEvents {
        crate::config::main::Config::default()
            .keybindings_as_events()
            .unwrap()
    }

    fn render(controls: &Controls, parameters: &Parameters) -> Surface {
        let mut surface = Surface::new(80, 30, 8.0);
        draw(&mut surface, controls, parameters, &keybindings(), "CTRL");
        surface
    }

    #[test]
    fn lists_every_control_with_its_keys() {
        let controls = Controls::new();
        let mut surface = render(&controls, &Parameters::default());
        let screen = surface.surface.screen_chars_to_string();
        let lines: Vec<&str> = screen.lines().collect();

        assert!(lines[0].starts_with(" Gravity (50)  g/G"));
        assert!(lines[1].starts_with(" Elasticity (0.80)  e/E"));
        assert!(lines[2].starts_with(" Plotted points speed (5)  s/S"));
        assert!(lines[6].starts_with(" [ ] Plot gravitational potential energy  3"));
        assert!(lines[8].starts_with(" [x] Show extra info  i"));
        assert!(lines[9].starts_with(" space: pause  q: quit  CTRL+click: move ball"));
        let cells = surface.surface.screen_cells();
        assert_eq!(cells[0][0].attrs().background(), termwiz::color::ColorAttribute::Default);
    }

    #[test]
    fn panel_is_wrapped_and_highlighted() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();
        controls.set_slider(&mut parameters, crate::controls::ControlId::Gravity, 70.0);

        let mut surface = render(&controls, &parameters);
        let screen = surface.surface.screen_chars_to_string();
        let lines: Vec<&str> = screen.lines().collect();

        assert!(lines[11].starts_with(" You have increased the acceleration of gravity,"));
        assert!(lines[12].contains("downwards force is applied."));

        let cells = surface.surface.screen_cells();
        let word_start = " You have ".len();
        assert_eq!(
            cells[11][word_start].attrs().foreground(),
            Surface::make_colour_attribute(INCREASED)
        );
        assert_eq!(
            cells[11][1].attrs().foreground(),
            Surface::make_colour_attribute(boing_physics::painter::WHITE)
        );
        assert_ne!(
            cells[11][0].attrs().background(),
            termwiz::color::ColorAttribute::Default
        );
    }

    #[test]
    fn panel_hidden_without_extra_info() {
        let mut controls = Controls::new();
        let mut parameters = Parameters::default();
        controls.set_slider(&mut parameters, crate::controls::ControlId::Gravity, 20.0);
        controls.toggle(&mut parameters, crate::controls::ControlId::ShowExtraInfo);

        let mut surface = render(&controls, &parameters);
        let screen = surface.surface.screen_chars_to_string();

        assert!(!screen.contains("decreased"));
        assert!(screen.contains("[ ] Show extra info"));
    }

    #[test]
    fn narrow_terminals_are_clipped_not_scrolled() {
        let controls = Controls::new();
        let mut surface = Surface::new(36, 10, 8.0);
        draw(
            &mut surface,
            &controls,
            &Parameters::default(),
            &keybindings(),
            "CTRL",
        );

        let screen = surface.surface.screen_chars_to_string();
        let lines: Vec<&str> = screen.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with(" Gravity (50)  g/G"));
        assert!(lines[6].starts_with(" [ ] Plot gravitational potential e"));
        assert!(lines[7].starts_with(" [ ] Plot kinetic energy  4"));
        assert!(lines[9].starts_with(" space: pause  q: quit  CTRL+click:"));
    }

    #[test]
    fn short_terminals_drop_the_lower_rows() {
        let controls = Controls::new();
        let mut surface = Surface::new(80, 4, 8.0);
        draw(
            &mut surface,
            &controls,
            &Parameters::default(),
            &keybindings(),
            "CTRL",
        );

        let screen = surface.surface.screen_chars_to_string();
        let lines: Vec<&str> = screen.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" Gravity (50)"));
        assert!(lines[3].starts_with(" [ ] Show velocity"));
    }

    #[test]
    fn both_words_are_highlighted() {
        let segments = highlights("increased then decreased");
        assert_eq!(
            segments,
            vec![
                ("increased", INCREASED),
                (" then ", boing_physics::painter::WHITE),
                ("decreased", DECREASED),
            ]
        );
    }
}

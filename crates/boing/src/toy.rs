//! The animation loop. It owns the simulation and is the only thing that ever changes it.

use std::sync::Arc;

use color_eyre::eyre::Result;

use boing_physics::Simulation;

use crate::config::input::KeybindingAction;
use crate::controls::{Command, Controls};
use crate::shared_state::SharedState;
use crate::surface::Surface;

/// `Toy`
#[non_exhaustive]
pub struct Toy {
    /// Shared app state
    state: Arc<SharedState>,
    /// Where finished frames are sent to be rendered
    frames_tx: tokio::sync::mpsc::Sender<Surface>,
    /// The ball, the floor and the graph
    pub simulation: Simulation,
    /// The sliders and checkboxes
    pub controls: Controls,
    /// What each frame is drawn onto
    pub surface: Surface,
    /// Target frames per second
    frame_rate: u32,
    /// When the last frame was rendered
    last_frame_tick: std::time::Instant,
    /// The modifier that has to be held to move the ball
    teleport_modifier: termwiz::input::Modifiers,
    /// How the teleport modifier is written in the config
    teleport_modifier_label: String,
    /// The mouse buttons held during the last mouse event
    last_mouse_buttons: termwiz::input::MouseButtons,
    /// The physics from the last config, so reloads only reset the parameters if they changed
    configured_physics: boing_physics::Parameters,
}

impl Toy {
    /// Instantiate, using the current config and terminal size.
    ///
    /// # Errors
    /// When the configured teleport modifier can't be parsed.
    pub async fn new(
        state: Arc<SharedState>,
        frames_tx: tokio::sync::mpsc::Sender<Surface>,
    ) -> Result<Self> {
        let config = state.config.read().await.clone();
        let tty_size = state.get_tty_size().await;

        let surface = Surface::new(
            tty_size.width.into(),
            tty_size.height.into(),
            config.world.scale,
        );
        let configured_physics = config.physics.clone();
        let simulation = Simulation::new(surface.canvas(), config.world.clone(), config.physics);

        Ok(Self {
            state,
            frames_tx,
            simulation,
            controls: Controls::new(),
            surface,
            frame_rate: config.frame_rate,
            last_frame_tick: std::time::Instant::now(),
            teleport_modifier: crate::config::input::parse_modifiers(
                config.teleport_modifier.clone(),
            )?,
            teleport_modifier_label: config.teleport_modifier,
            last_mouse_buttons: termwiz::input::MouseButtons::NONE,
            configured_physics,
        })
    }

    /// Our main entrypoint.
    ///
    /// # Errors
    /// When a frame can't be sent to the renderer.
    pub async fn start(
        state: Arc<SharedState>,
        frames_tx: tokio::sync::mpsc::Sender<Surface>,
    ) -> Result<()> {
        let mut protocol = state.protocol_tx.subscribe();
        let mut toy = Self::new(state, frames_tx).await?;

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                () = toy.sleep_until_next_frame_tick() => {
                    toy.render().await?;
                },
                result = protocol.recv() => {
                    match result {
                        Ok(crate::run::Protocol::End) => break,
                        Ok(message) => toy.handle_protocol_message(message).await,
                        Err(error) => tracing::error!("Receiving protocol message: {error:?}"),
                    }
                }
            }
        }

        tracing::debug!("Leaving the toy loop");
        Ok(())
    }

    /// Sleep until it's time for the next frame.
    async fn sleep_until_next_frame_tick(&mut self) {
        let target = crate::utils::ONE_MICROSECOND.wrapping_div(self.frame_rate.max(1).into());
        let target_frame_rate_micro = std::time::Duration::from_micros(target);
        if let Some(wait) = target_frame_rate_micro.checked_sub(self.last_frame_tick.elapsed()) {
            tokio::time::sleep(wait).await;
        }
        self.last_frame_tick = std::time::Instant::now();
    }

    /// Tick the simulation, draw it and the HUD, then send the frame off to be rendered.
    ///
    /// # Errors
    /// When the renderer has gone away.
    pub async fn render(&mut self) -> Result<()> {
        self.simulation.tick();
        self.simulation.draw(&mut self.surface);

        let keybindings = self.state.keybindings.read().await;
        crate::hud::draw(
            &mut self.surface,
            &self.controls,
            &self.simulation.parameters,
            &keybindings,
            &self.teleport_modifier_label,
        );
        drop(keybindings);

        self.frames_tx.send(self.surface.clone()).await?;
        Ok(())
    }

    /// React to everything else that happens in the app.
    pub async fn handle_protocol_message(&mut self, message: crate::run::Protocol) {
        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "The toy only cares about some messages"
        )]
        match message {
            crate::run::Protocol::Resize { width, height } => self.resize(width, height),
            crate::run::Protocol::Config(config) => self.apply_config(config),
            crate::run::Protocol::Input(input) => self.handle_input(input.event).await,
            _ => (),
        }
    }

    /// Make a new surface for the new terminal size and fit the simulation to it.
    fn resize(&mut self, width: u16, height: u16) {
        self.surface = Surface::new(width.into(), height.into(), self.simulation.world.scale);
        self.simulation.resize(self.surface.canvas());
    }

    /// Use a freshly reloaded config. Changing the world's sizes starts a new simulation, anything
    /// else is applied to the running one. Parameters tuned with the keys are kept unless the
    /// config's own physics changed.
    fn apply_config(&mut self, config: crate::config::main::Config) {
        self.frame_rate = config.frame_rate;

        match config.teleport_modifier() {
            Ok(modifier) => {
                self.teleport_modifier = modifier;
                self.teleport_modifier_label = config.teleport_modifier.clone();
            }
            Err(error) => tracing::error!("Ignoring teleport modifier: {error:?}"),
        }

        let physics_changed = config.physics != self.configured_physics;
        self.configured_physics = config.physics.clone();

        if config.world == self.simulation.world {
            if physics_changed {
                tracing::debug!("Config physics changed: {:?}", config.physics);
                self.simulation.parameters = config.physics;
            }
            return;
        }

        tracing::info!("World changed, restarting the simulation");
        self.surface = Surface::new(self.surface.width, self.surface.height, config.world.scale);
        self.simulation = Simulation::new(self.surface.canvas(), config.world, config.physics);
    }

    /// Keyboard and mouse input.
    async fn handle_input(&mut self, event: termwiz::input::InputEvent) {
        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "Only keys and the mouse do anything"
        )]
        match event {
            termwiz::input::InputEvent::Key(key_event) => self.handle_key(&key_event).await,
            termwiz::input::InputEvent::Mouse(mouse_event) => self.handle_mouse(&mouse_event),
            _ => (),
        }
    }

    /// Run whatever the key is bound to.
    async fn handle_key(&mut self, key_event: &termwiz::input::KeyEvent) {
        let keybindings = self.state.keybindings.read().await;
        let maybe_action = crate::config::input::find_action(&keybindings, key_event);
        drop(keybindings);

        let Some(action) = maybe_action else {
            return;
        };
        tracing::trace!("Key {key_event:?} triggered {action:?}");

        #[expect(
            clippy::wildcard_enum_match_arm,
            reason = "Every other action changes a control"
        )]
        match action {
            KeybindingAction::Quit => crate::run::broadcast_protocol_end(&self.state.protocol_tx),
            KeybindingAction::TogglePause => self.simulation.toggle_pause(),
            _ => {
                if let Some(command) = Command::from_action(action) {
                    self.controls.apply(&mut self.simulation.parameters, command);
                }
            }
        }
    }

    /// Only the moment the left button goes down counts as a press, so dragging does nothing.
    fn handle_mouse(&mut self, mouse_event: &termwiz::input::MouseEvent) {
        let left = termwiz::input::MouseButtons::LEFT;
        let is_press = mouse_event.mouse_buttons.contains(left.clone())
            && !self.last_mouse_buttons.contains(left);
        self.last_mouse_buttons = mouse_event.mouse_buttons.clone();
        if !is_press {
            return;
        }

        // Mouse coordinates from the terminal start at 1.
        let point = self.surface.cell_to_world(
            usize::from(mouse_event.x.saturating_sub(1)),
            usize::from(mouse_event.y.saturating_sub(1)),
        );
        let is_modifier_held = self.teleport_modifier != termwiz::input::Modifiers::NONE
            && mouse_event.modifiers.contains(self.teleport_modifier);

        let press = self.simulation.press(point, is_modifier_held);
        tracing::debug!("Press at {point:?}: {press:?}");
    }
}

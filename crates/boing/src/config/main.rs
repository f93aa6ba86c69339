//! Boing's config file: where it lives, what's in it and reloading it when it changes.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::{ContextCompat as _, Result};
use notify_debouncer_full::notify;

use crate::shared_state::SharedState;

/// The config that ships with Boing. On first run it's written to the config directory so the
/// user has something to edit.
static DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// How long the file watcher waits for writes to settle before reporting them.
const DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(100);

/// How much gets logged. Mirrors `tracing`'s levels, plus a way to turn logging off entirely.
#[derive(serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Errors and warnings
    Warn,
    /// Informational messages too
    Info,
    /// Useful when investigating bugs
    Debug,
    /// Everything, including per-frame messages
    Trace,
    /// Nothing at all
    Off,
}

/// Everything that can be set in `boing.toml`. Missing fields take their default.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Most verbose level written to the log file
    pub log_level: LogLevel,
    /// Where the log file goes
    pub log_path: PathBuf,
    /// Frames per second drawn to the terminal
    pub frame_rate: u32,
    /// Modifier that, held whilst clicking, moves the ball to the pointer.
    pub teleport_modifier: String,
    /// Sizes and layout that only change with a restart of the simulation
    pub world: boing_physics::World,
    /// Physics the simulation starts with
    pub physics: boing_physics::Parameters,
    /// The user's overrides of the shipped keybindings
    pub keybindings: super::input::KeybindingsRaw,
}

/// Physics given on the command line. They win over every config that's loaded, including
/// live reloads.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct PhysicsOverrides {
    /// Replaces `[physics] gravity`
    pub gravity: Option<f64>,
    /// Replaces `[physics] elasticity`
    pub elasticity: Option<f64>,
}

impl PhysicsOverrides {
    /// Overrides for whichever of the values are given.
    #[must_use]
    pub const fn new(gravity: Option<f64>, elasticity: Option<f64>) -> Self {
        Self {
            gravity,
            elasticity,
        }
    }

    /// Replace the overridden parameters.
    pub fn apply(&self, physics: &mut boing_physics::Parameters) {
        if let Some(gravity) = self.gravity {
            physics.gravity = gravity;
        }
        if let Some(elasticity) = self.elasticity {
            physics.elasticity = elasticity;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let state_directory = dirs::state_dir().unwrap_or_else(|| PathBuf::from("./"));

        Self {
            log_level: LogLevel::Off,
            log_path: state_directory.join("boing").join("boing.log"),
            frame_rate: 60,
            teleport_modifier: "CTRL".to_owned(),
            world: boing_physics::World::default(),
            physics: boing_physics::Parameters::default(),
            keybindings: super::input::KeybindingsRaw::new(),
        }
    }
}

impl Config {
    /// The config directory currently in use.
    pub async fn directory(state: &Arc<SharedState>) -> PathBuf {
        state.config_path.read().await.clone()
    }

    /// The OS's usual place for config, e.g. `~/.config/boing` on Linux.
    ///
    /// # Errors
    /// When the OS has no such place.
    pub fn default_directory() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No standard config directory on this system")?;
        Ok(base.join("boing"))
    }

    /// Decide on the config directory, making sure it exists.
    ///
    /// # Errors
    /// When the directory can't be created.
    pub async fn setup_directory(
        custom_directory: Option<PathBuf>,
        state: &Arc<SharedState>,
    ) -> Result<()> {
        let directory = match custom_directory {
            Some(directory) => directory,
            None => Self::default_directory()?,
        };
        std::fs::create_dir_all(&directory)?;
        tracing::debug!("Config directory: {directory:?}");
        *state.config_path.write().await = directory;
        Ok(())
    }

    /// The full path of the main config file.
    pub async fn main_config_path(state: &Arc<SharedState>) -> PathBuf {
        let file_name = state.main_config_file.read().await.clone();
        Self::directory(state).await.join(file_name)
    }

    /// Read and validate the main config, storing its keybindings in the shared state. A missing
    /// `boing.toml` is first created from the shipped one. Custom config files are never
    /// created.
    ///
    /// # Errors
    /// When the file can't be read, or its contents aren't valid.
    pub async fn load(state: &Arc<SharedState>) -> Result<Self> {
        let path = Self::main_config_path(state).await;
        let file_name = path
            .file_name()
            .context("The config path doesn't end in a file name")?;
        if file_name == crate::cli_args::DEFAULT_CONFIG_FILE_NAME && !path.exists() {
            tracing::info!("No config yet, writing the default to {path:?}");
            std::fs::write(&path, DEFAULT_CONFIG)?;
        }

        tracing::info!("Loading config from {path:?}");
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                tracing::error!("Reading {path:?}: {error:?}");
                color_eyre::eyre::bail!("Couldn't read the config at {}: {error}", path.display());
            }
        };
        tracing::trace!("Config contents:\n{contents}");

        let config = toml::from_str::<Self>(&contents)?;
        config.teleport_modifier()?;
        *state.keybindings.write().await = config.keybindings_as_events()?;
        Ok(config)
    }

    /// The config Boing ships with, parsed.
    ///
    /// # Errors
    /// Only if the shipped file is itself invalid.
    pub fn parse_default_config() -> Result<Self> {
        Ok(toml::from_str::<Self>(DEFAULT_CONFIG)?)
    }

    /// `load()`, apply any CLI overrides, then make the result the current config.
    ///
    /// # Errors
    /// When the config can't be loaded.
    pub async fn load_config_into_shared_state(state: &Arc<SharedState>) -> Result<Self> {
        let mut config = Self::load(state).await?;
        let overrides = *state.physics_overrides.read().await;
        overrides.apply(&mut config.physics);
        state.config.write().await.clone_from(&config);
        Ok(config)
    }

    /// The parsed modifier that has to be held to move the ball.
    ///
    /// # Errors
    /// When the modifier isn't one that `termwiz` knows about.
    pub fn teleport_modifier(&self) -> Result<termwiz::input::Modifiers> {
        Ok(super::input::parse_modifiers(self.teleport_modifier.clone())?)
    }

    /// Every keybinding as a `termwiz` key event. The shipped defaults are used for any action
    /// that this config doesn't mention. A default whose key the user has given to another action
    /// is unbound, so every key triggers at most one action.
    ///
    /// # Errors
    /// When a keybinding can't be parsed, or two of the user's bindings share a key.
    #[expect(clippy::iter_over_hash_type, reason = "The ordering doesn't matter")]
    pub fn keybindings_as_events(&self) -> Result<crate::config::input::KeybindingsAsEvents> {
        let mut users = crate::config::input::KeybindingsAsEvents::new();
        for (action, binding) in self.keybindings.clone() {
            let event: termwiz::input::KeyEvent = binding.try_into()?;
            tracing::debug!("User keybinding for {action:?}: {event:?}");
            users.insert(action, event);
        }
        Self::check_for_shared_keys(&users)?;

        let mut events = crate::config::input::KeybindingsAsEvents::new();
        for (action, binding) in Self::parse_default_config()?.keybindings {
            if users.contains_key(&action) {
                continue;
            }
            let event: termwiz::input::KeyEvent = binding.try_into()?;
            if users
                .values()
                .any(|user_event| crate::config::input::is_same_key(user_event, &event))
            {
                tracing::debug!("Unbinding {action:?}, the user gave its key to another action");
                continue;
            }
            events.insert(action, event);
        }
        events.extend(users);

        Ok(events)
    }

    /// Two of the user's own bindings can't be on the same key.
    #[expect(clippy::iter_over_hash_type, reason = "The ordering doesn't matter")]
    fn check_for_shared_keys(
        bindings: &crate::config::input::KeybindingsAsEvents,
    ) -> Result<()> {
        for (action, event) in bindings {
            let shared = bindings.iter().find(|&(other, other_event)| {
                other != action && crate::config::input::is_same_key(other_event, event)
            });
            if let Some((other, _)) = shared {
                color_eyre::eyre::bail!(
                    "{action:?} and {other:?} are both bound to '{}'",
                    crate::config::input::describe(event)
                );
            }
        }
        Ok(())
    }

    /// Reload the config whenever something in the config directory is written to, until
    /// `Protocol::End`.
    #[must_use]
    pub fn watch(state: Arc<SharedState>) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move {
            let directory = Self::directory(&state).await;
            let (changes_tx, mut changes_rx) = tokio::sync::mpsc::channel(1);
            let mut protocol_rx = state.protocol_tx.subscribe();

            // Dropping the debouncer stops the watching, so it has to live as long as the loop.
            let mut debouncer = notify_debouncer_full::new_debouncer(
                DEBOUNCE,
                None,
                move |result: notify_debouncer_full::DebounceEventResult| {
                    Self::forward_changes(result, &changes_tx);
                },
            )?;
            debouncer.watch(&directory, notify::RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching {directory:?} for config changes");

            #[expect(
                clippy::integer_division_remainder_used,
                reason = "This is caused by the `tokio::select!`"
            )]
            loop {
                tokio::select! {
                    Some(change) = changes_rx.recv() => {
                        if Self::is_content_change(&change) {
                            Self::reload(&state).await;
                        }
                    },
                    Ok(message) = protocol_rx.recv() => {
                        if matches!(message, crate::run::Protocol::End) {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Config watcher finished");
            Ok(())
        })
    }

    /// Runs on the debouncer's own thread, so sends have to block.
    fn forward_changes(
        result: notify_debouncer_full::DebounceEventResult,
        changes_tx: &tokio::sync::mpsc::Sender<notify_debouncer_full::DebouncedEvent>,
    ) {
        let changes = match result {
            Ok(changes) => changes,
            Err(errors) => {
                tracing::error!("Config watcher errors: {errors:?}");
                return;
            }
        };
        for change in changes {
            if let Err(error) = changes_tx.blocking_send(change) {
                tracing::error!("Couldn't forward config change: {error:?}");
            }
        }
    }

    /// Only writes to a file's data matter. Metadata changes, creations and so on are ignored.
    fn is_content_change(change: &notify_debouncer_full::DebouncedEvent) -> bool {
        matches!(
            change.kind,
            notify::EventKind::Modify(notify::event::ModifyKind::Data(_))
        )
    }

    /// Load the changed config and tell everyone about it. A broken config is only logged, the
    /// simulation carries on with the last good one.
    async fn reload(state: &Arc<SharedState>) {
        match Self::load_config_into_shared_state(state).await {
            Ok(config) => {
                tracing::debug!("Config reloaded");
                if let Err(error) = state.protocol_tx.send(crate::run::Protocol::Config(config)) {
                    tracing::error!("Couldn't broadcast the reloaded config: {error:?}");
                }
            }
            Err(error) => tracing::error!("Ignoring invalid config: {}", error.root_cause()),
        }
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "The config values are exact")]
mod test {
    use super::*;
    use crate::config::input::KeybindingAction;

    async fn state_in(directory: &tempfile::TempDir) -> Arc<SharedState> {
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = SharedState::init(80, 24, protocol_tx).await.unwrap();
        *state.main_config_file.write().await = crate::cli_args::DEFAULT_CONFIG_FILE_NAME.into();
        Config::setup_directory(Some(directory.path().to_path_buf()), &state)
            .await
            .unwrap();
        state
    }

    fn change(kind: notify::EventKind) -> notify_debouncer_full::DebouncedEvent {
        notify_debouncer_full::DebouncedEvent::new(
            notify::Event::new(kind),
            std::time::Instant::now(),
        )
    }

    fn char_key(character: char) -> termwiz::input::KeyEvent {
        termwiz::input::KeyEvent {
            modifiers: termwiz::input::Modifiers::NONE,
            key: termwiz::input::KeyCode::Char(character),
        }
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = Config::parse_default_config().unwrap();
        let defaults = Config::default();

        assert_eq!(shipped.log_level, LogLevel::Off);
        assert_eq!(shipped.frame_rate, defaults.frame_rate);
        assert_eq!(shipped.world, defaults.world);
        assert_eq!(shipped.physics, defaults.physics);
        assert_eq!(shipped.teleport_modifier().unwrap(), termwiz::input::Modifiers::CTRL);
    }

    #[test]
    fn shipped_config_binds_every_action() {
        let shipped = Config::parse_default_config().unwrap();
        assert_eq!(shipped.keybindings.len(), 14);
    }

    #[test]
    fn partial_config() {
        let config: Config = toml::from_str(
            "
                frame_rate = 30

                [physics]
                gravity = 98.0
            ",
        )
        .unwrap();

        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.physics.gravity, 98.0);
        assert_eq!(config.physics.elasticity, 0.8);
        assert_eq!(config.world.ball_radius, 50.0);
        assert!(config.keybindings.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn default_config_is_written_on_first_load() {
        let directory = tempfile::tempdir().unwrap();
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = crate::shared_state::SharedState::init(80, 24, protocol_tx)
            .await
            .unwrap();
        *state.main_config_file.write().await = crate::cli_args::DEFAULT_CONFIG_FILE_NAME.into();
        Config::setup_directory(Some(directory.path().to_path_buf()), &state)
            .await
            .unwrap();

        let config = Config::load_config_into_shared_state(&state).await.unwrap();

        assert!(directory.path().join("boing.toml").exists());
        assert_eq!(config.physics.gravity, 50.0);
        let keybindings = state.keybindings.read().await;
        assert_eq!(keybindings.len(), 14);
        assert_eq!(
            keybindings.get(&crate::config::input::KeybindingAction::Quit),
            Some(&termwiz::input::KeyEvent {
                modifiers: termwiz::input::Modifiers::NONE,
                key: termwiz::input::KeyCode::Char('q'),
            })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn user_keybindings_override_defaults() {
        let directory = tempfile::tempdir().unwrap();
        std::fs::write(
            directory.path().join("boing.toml"),
            "
                [keybindings]
                quit = { key = \"x\", mods = \"CTRL\" }
            ",
        )
        .unwrap();
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = crate::shared_state::SharedState::init(80, 24, protocol_tx)
            .await
            .unwrap();
        *state.main_config_file.write().await = crate::cli_args::DEFAULT_CONFIG_FILE_NAME.into();
        Config::setup_directory(Some(directory.path().to_path_buf()), &state)
            .await
            .unwrap();

        Config::load_config_into_shared_state(&state).await.unwrap();

        let keybindings = state.keybindings.read().await;
        assert_eq!(keybindings.len(), 14);
        assert_eq!(
            keybindings.get(&crate::config::input::KeybindingAction::Quit),
            Some(&termwiz::input::KeyEvent {
                modifiers: termwiz::input::Modifiers::CTRL,
                key: termwiz::input::KeyCode::Char('x'),
            })
        );
    }

    #[test]
    fn user_keys_unbind_clashing_defaults() {
        let config: Config = toml::from_str(
            "
                [keybindings]
                quit = { key = \"g\" }
            ",
        )
        .unwrap();

        let keybindings = config.keybindings_as_events().unwrap();

        assert_eq!(keybindings.len(), 13);
        assert!(!keybindings.contains_key(&KeybindingAction::GravityDown));
        assert_eq!(
            crate::config::input::find_action(&keybindings, &char_key('g')),
            Some(KeybindingAction::Quit)
        );
        assert_eq!(
            crate::config::input::find_action(&keybindings, &char_key('q')),
            None
        );
    }

    #[test]
    fn user_bindings_cannot_share_a_key() {
        let config: Config = toml::from_str(
            "
                [keybindings]
                quit = { key = \"x\" }
                toggle_pause = { key = \"x\" }
            ",
        )
        .unwrap();

        let error = config.keybindings_as_events().unwrap_err();
        assert!(error.to_string().contains("are both bound to 'x'"));
    }

    #[test]
    fn only_data_changes_trigger_a_reload() {
        let data = notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Content,
        ));
        let metadata = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
            notify::event::MetadataKind::Any,
        ));
        let create = notify::EventKind::Create(notify::event::CreateKind::File);

        assert!(Config::is_content_change(&change(data)));
        assert!(!Config::is_content_change(&change(metadata)));
        assert!(!Config::is_content_change(&change(create)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn watcher_reloads_the_edited_config() {
        let directory = tempfile::tempdir().unwrap();
        let state = state_in(&directory).await;
        let mut protocol_rx = state.protocol_tx.subscribe();
        Config::load_config_into_shared_state(&state).await.unwrap();
        let path = Config::main_config_path(&state).await;
        let shipped = std::fs::read_to_string(&path).unwrap();
        let edited = shipped.replace("gravity = 50.0", "gravity = 98.0");
        assert_ne!(edited, shipped);

        let watcher = Config::watch(Arc::clone(&state));

        // The watcher may not be watching yet, so keep writing until it notices.
        let reloaded = tokio::time::timeout(std::time::Duration::from_secs(10), async {
            loop {
                std::fs::write(&path, &edited).unwrap();
                let wait = std::time::Duration::from_millis(500);
                if let Ok(Ok(crate::run::Protocol::Config(config))) =
                    tokio::time::timeout(wait, protocol_rx.recv()).await
                {
                    return config;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(reloaded.physics.gravity, 98.0);
        assert_eq!(state.config.read().await.physics.gravity, 98.0);

        crate::run::broadcast_protocol_end(&state.protocol_tx);
        watcher.await.unwrap().unwrap();
    }
}

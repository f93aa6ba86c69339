//! Starting Boing: config, logging, and all the long running tasks.

use std::sync::Arc;

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use crate::cli_args::CliArgs;
use crate::config::main::{Config, LogLevel, PhysicsOverrides};
use crate::shared_state::SharedState;

/// Messages broadcast between the toy, the renderer, the input thread and the config watcher.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Protocol {
    /// Everything should stop.
    End,
    /// The user's terminal has a new size.
    Resize {
        /// Columns
        width: u16,
        /// Rows
        height: u16,
    },
    /// A key or mouse event from the user.
    Input(crate::raw_input::ParsedInput),
    /// The config file was changed and has been reloaded.
    Config(Config),
}

/// Run Boing until the user quits.
///
/// # Errors
/// When setup fails, or any of the long running tasks fail.
pub async fn run(state: &Arc<SharedState>) -> Result<()> {
    setup(state).await?;
    let protocol_tx = state.protocol_tx.clone();

    let (frames_tx, frames_rx) = tokio::sync::mpsc::channel(8);
    let renderer_handle =
        crate::renderer::Renderer::start(Arc::clone(state), frames_rx, protocol_tx.clone());
    let watcher_handle = Config::watch(Arc::clone(state));
    let stdin_handle = crate::raw_input::RawInput::start(protocol_tx.clone());
    log_panics();

    let toy_result = crate::toy::Toy::start(Arc::clone(state), frames_tx).await;
    tracing::debug!("🏁 The toy has stopped, shutting down Boing...");
    broadcast_protocol_end(&protocol_tx);
    toy_result?;

    // Reading STDIN blocks, so the thread only ever finishes by itself when something went
    // wrong.
    if stdin_handle.is_finished() {
        stdin_handle
            .join()
            .map_err(|error| color_eyre::eyre::eyre!("STDIN thread: {error:?}"))??;
    }
    renderer_handle.await??;
    watcher_handle.await??;

    tracing::trace!("Boing finished cleanly");
    Ok(())
}

/// Whilst the terminal is in raw mode and on the alternate screen a printed panic can't be seen,
/// so panics are logged instead.
fn log_panics() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map_or_else(
            || "unknown location".to_owned(),
            |location| format!("{}:{}:{}", location.file(), location.line(), location.column()),
        );
        tracing::error!("Panicked at {location}: {}", panic_message(info.payload()));
    }));
}

/// Panics usually carry either a `String` or a `&str`.
fn panic_message(payload: &(dyn core::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<String>() {
        return message;
    }
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message;
    }
    "(panic payload isn't a string)"
}

/// Tell every task and thread to stop.
///
/// A failure to send is only logged. The `End` message is the very thing that lets errors
/// reach the top of `run()`, so bubbling this error up could mean it's never seen.
pub fn broadcast_protocol_end(protocol_tx: &tokio::sync::broadcast::Sender<Protocol>) {
    tracing::debug!("Broadcasting `Protocol::End`");
    if let Err(error) = protocol_tx.send(Protocol::End) {
        tracing::error!("Couldn't broadcast `Protocol::End`: {error:?}");
    }
}

/// Everything that has to happen before the tasks start.
async fn setup(state: &Arc<SharedState>) -> Result<()> {
    let cli_args = CliArgs::parse();

    state
        .main_config_file
        .write()
        .await
        .clone_from(&cli_args.main_config);
    if let Err(error) = Config::setup_directory(cli_args.config_dir.clone(), state).await {
        color_eyre::eyre::bail!("Couldn't create the config directory: {error:?}");
    }
    if let Err(error) = Config::load_config_into_shared_state(state).await {
        let path = Config::main_config_path(state).await;
        color_eyre::eyre::bail!("Bad config file {}:\n\n{error:?}", path.display());
    }

    setup_logging(&cli_args, state).await?;
    apply_cli_overrides(&cli_args, state).await;

    // Every pixel is drawn in true colour.
    std::env::set_var("COLORTERM", "truecolor");

    tracing::info!("Starting Boing");
    tracing::debug!("Config: {:?}", state.config.read().await);

    let size = crate::shared_state::TTYSize::from_screen_size(
        &crate::renderer::Renderer::get_users_tty_size()?,
    )?;
    state.set_tty_size(size.width, size.height).await;

    Ok(())
}

/// Some of the physics can be set from the CLI. They take precedence over the config file, now
/// and whenever it's reloaded.
async fn apply_cli_overrides(cli_args: &CliArgs, state: &Arc<SharedState>) {
    let overrides = PhysicsOverrides::new(cli_args.gravity, cli_args.elasticity);
    tracing::debug!("Physics from the CLI: {overrides:?}");
    *state.physics_overrides.write().await = overrides;
    overrides.apply(&mut state.config.write().await.physics);
}

/// The log file and level, with the CLI taking precedence over the config.
fn log_settings(cli_args: &CliArgs, config: &Config) -> (std::path::PathBuf, LogLevel) {
    let path = cli_args
        .log_path
        .clone()
        .unwrap_or_else(|| config.log_path.clone());
    let level = cli_args
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    (path, level)
}

/// Only Boing's own crates log at the chosen level, everything else is silent.
fn default_log_filter(level: &LogLevel) -> Result<tracing_subscriber::EnvFilter> {
    let level = format!("{level:?}").to_lowercase();
    let mut filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("off".parse()?)
        .from_env_lossy();
    for target in ["boing", "boing_physics", "tests"] {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    Ok(filter)
}

/// Log to a file. Logging is off unless the config, the CLI or `BOING_LOG` ask for it.
async fn setup_logging(cli_args: &CliArgs, state: &Arc<SharedState>) -> Result<()> {
    let custom_filters = std::env::var("BOING_LOG").ok();
    let (path, level) = log_settings(cli_args, &*state.config.read().await);

    if matches!(level, LogLevel::Off) && custom_filters.is_none() {
        return Ok(());
    }

    let directory = path.parent().context("The log path has no parent directory")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(&path)?;
    state.config.write().await.log_path = path;

    let filter = match custom_filters {
        Some(filters) => {
            // Tokio's own `tokio=debug,runtime=debug` targets are only really useful alongside
            // the Tokio console.
            std::env::set_var("RUST_LOG", filters);
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("error".parse()?)
                .from_env_lossy()
        }
        None => default_log_filter(&level)?,
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_filter(filter);
    let registry = tracing_subscriber::registry().with(file_layer);

    if std::env::var_os("ENABLE_TOKIO_CONSOLE") == Some("1".into()) {
        registry.with(console_subscriber::spawn()).init();
    } else {
        registry.init();
    }

    *state.is_logging.write().await = true;
    Ok(())
}

//! All the CLI arguments for Boing

/// The name of the main config file, when it isn't overridden on the CLI.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "boing.toml";

/// Drop a ball and watch it bounce.
#[derive(clap::Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = "A ball falls under gravity and bounces off the floor. Plot its displacement, \
                  velocity and energies whilst tuning gravity and elasticity live."
)]
#[non_exhaustive]
pub struct CliArgs {
    /// Use a custom config directory. Defaults to your OS's standard config directory.
    #[arg(long)]
    pub config_dir: Option<std::path::PathBuf>,

    /// The name of the main config file, inside the config directory.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Where to write logs. Overrides the config file.
    #[arg(long)]
    pub log_path: Option<std::path::PathBuf>,

    /// The maximum log level. Overrides the config file.
    #[arg(long, value_enum)]
    pub log_level: Option<crate::config::main::LogLevel>,

    /// The starting strength of gravity. Overrides the config file.
    #[arg(long)]
    pub gravity: Option<f64>,

    /// The starting elasticity of the ball. Overrides the config file.
    #[arg(long)]
    pub elasticity: Option<f64>,
}

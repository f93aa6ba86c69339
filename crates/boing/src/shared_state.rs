//! State shared between Boing's tasks and threads, each part behind its own lock.

use std::sync::Arc;

use color_eyre::eyre::Result;
use tokio::sync::RwLock;

/// The size of the user's terminal, in cells.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "A terminal only has a width and a height"
)]
pub struct TTYSize {
    /// Columns
    pub width: u16,
    /// Rows
    pub height: u16,
}

impl TTYSize {
    /// Convert the size that `termwiz` reports.
    ///
    /// # Errors
    /// When the terminal is absurdly big.
    pub fn from_screen_size(size: &termwiz::terminal::ScreenSize) -> Result<Self> {
        Ok(Self {
            width: size.cols.try_into()?,
            height: size.rows.try_into()?,
        })
    }
}

/// Everything the tasks need to agree on. The simulation itself isn't here: only the toy task
/// ever touches it.
#[non_exhaustive]
pub struct SharedState {
    /// Where every `Protocol` message is broadcast.
    pub protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    /// The config directory.
    pub config_path: RwLock<std::path::PathBuf>,
    /// The main config file's name, inside the config directory.
    pub main_config_file: RwLock<std::path::PathBuf>,
    /// The most recently loaded config.
    pub config: RwLock<crate::config::main::Config>,
    /// Physics set on the command line, applied to every loaded config.
    pub physics_overrides: RwLock<crate::config::main::PhysicsOverrides>,
    /// Keybindings, with the user's overrides applied to the defaults.
    pub keybindings: RwLock<crate::config::input::KeybindingsAsEvents>,
    /// The user's terminal size. The simulation's canvas follows it.
    pub tty_size: RwLock<TTYSize>,
    /// Whether a log file is being written.
    pub is_logging: RwLock<bool>,
}

impl SharedState {
    /// State for a terminal of the given size, with the default config.
    ///
    /// # Errors
    /// Nothing can fail yet, but callers already handle the fallible terminal-sized version.
    pub async fn init(
        width: u16,
        height: u16,
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<Arc<Self>> {
        let state = Self {
            protocol_tx,
            config_path: RwLock::default(),
            main_config_file: RwLock::default(),
            config: RwLock::default(),
            physics_overrides: RwLock::default(),
            keybindings: RwLock::default(),
            tty_size: RwLock::default(),
            is_logging: RwLock::new(false),
        };
        state.set_tty_size(width, height).await;
        Ok(Arc::new(state))
    }

    /// State sized to the user's actual terminal.
    ///
    /// # Errors
    /// When the user's terminal can't be queried.
    pub async fn init_with_users_tty_size(
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> Result<Arc<Self>> {
        let size = TTYSize::from_screen_size(&crate::renderer::Renderer::get_users_tty_size()?)?;
        Self::init(size.width, size.height, protocol_tx).await
    }

    /// The current terminal size.
    pub async fn get_tty_size(&self) -> TTYSize {
        *self.tty_size.read().await
    }

    /// Record a new terminal size.
    pub async fn set_tty_size(&self, width: u16, height: u16) {
        *self.tty_size.write().await = TTYSize { width, height };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn screen_size_conversion() {
        let size = termwiz::terminal::ScreenSize {
            cols: 120,
            rows: 40,
            xpixel: 0,
            ypixel: 0,
        };
        assert_eq!(
            TTYSize::from_screen_size(&size).unwrap(),
            TTYSize {
                width: 120,
                height: 40
            }
        );

        let huge = termwiz::terminal::ScreenSize {
            cols: 100_000,
            ..size
        };
        assert!(TTYSize::from_screen_size(&huge).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tty_size_can_change() {
        let (protocol_tx, _) = tokio::sync::broadcast::channel(16);
        let state = SharedState::init(80, 24, protocol_tx).await.unwrap();
        assert_eq!(state.get_tty_size().await.width, 80);

        state.set_tty_size(100, 30).await;

        assert_eq!(
            state.get_tty_size().await,
            TTYSize {
                width: 100,
                height: 30
            }
        );
    }
}

//! Puts finished frames on the user's terminal.

use std::sync::Arc;

use color_eyre::eyre::Result;
use termwiz::surface::Change as TermwizChange;
use termwiz::terminal::buffered::BufferedTerminal;
use termwiz::terminal::{ScreenSize, Terminal as TermwizTerminal};

use crate::run::Protocol;
use crate::shared_state::{SharedState, TTYSize};
use crate::surface::Surface;

/// Owns the user's terminal for as long as Boing runs.
#[non_exhaustive]
pub struct Renderer {
    /// Shared app state
    pub state: Arc<SharedState>,
    /// The last known size of the user's terminal
    pub size: TTYSize,
}

impl Renderer {
    /// Spawn the render task. Whatever happens to it, everything else is told to stop when it
    /// does.
    #[must_use]
    pub fn start(
        state: Arc<SharedState>,
        frames_rx: tokio::sync::mpsc::Receiver<Surface>,
        protocol_tx: tokio::sync::broadcast::Sender<Protocol>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let protocol_rx = protocol_tx.subscribe();
        tokio::spawn(async move {
            let result = match Self::get_users_tty_size()
                .and_then(|size| TTYSize::from_screen_size(&size))
            {
                Ok(size) => {
                    let mut renderer = Self { state, size };
                    renderer.run(frames_rx, protocol_rx).await
                }
                Err(error) => Err(error),
            };

            if result.is_err() {
                crate::run::broadcast_protocol_end(&protocol_tx);
            }
            result
        })
    }

    /// `BufferedTerminal::new()` needs a concrete terminal type, not a `Box<dyn Terminal>`.
    fn get_termwiz_terminal() -> Result<impl TermwizTerminal> {
        let capabilities = termwiz::caps::Capabilities::new_from_env()?;
        Ok(termwiz::terminal::new_terminal(capabilities)?)
    }

    /// Ask the user's terminal how big it is.
    ///
    /// # Errors
    /// When the user's terminal can't be queried.
    pub fn get_users_tty_size() -> Result<ScreenSize> {
        Ok(Self::get_termwiz_terminal()?.get_screen_size()?)
    }

    /// Take over the user's terminal, render until told to stop, then give the terminal back
    /// even if rendering failed.
    async fn run(
        &mut self,
        mut frames_rx: tokio::sync::mpsc::Receiver<Surface>,
        mut protocol_rx: tokio::sync::broadcast::Receiver<Protocol>,
    ) -> Result<()> {
        let mut users_terminal = Self::get_termwiz_terminal()?;
        users_terminal.set_raw_mode()?;
        users_terminal.enter_alternate_screen()?;
        let mut terminal = BufferedTerminal::new(users_terminal)?;
        terminal.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Hidden,
        ));
        tracing::debug!("User's terminal is in raw mode on the alternate screen");

        let result = self
            .render_loop(&mut terminal, &mut frames_rx, &mut protocol_rx)
            .await;

        Self::restore(&mut terminal)?;
        result
    }

    /// Undo everything `run()` did to the user's terminal.
    fn restore<T: TermwizTerminal>(terminal: &mut BufferedTerminal<T>) -> Result<()> {
        tracing::debug!("Giving the user's terminal back");
        terminal.add_change(TermwizChange::CursorVisibility(
            termwiz::surface::CursorVisibility::Visible,
        ));
        terminal.flush()?;
        terminal.terminal().exit_alternate_screen()?;
        terminal.terminal().set_cooked_mode()?;
        Ok(())
    }

    /// Draw each frame as it arrives.
    async fn render_loop<T: TermwizTerminal + Send>(
        &mut self,
        terminal: &mut BufferedTerminal<T>,
        frames_rx: &mut tokio::sync::mpsc::Receiver<Surface>,
        protocol_rx: &mut tokio::sync::broadcast::Receiver<Protocol>,
    ) -> Result<()> {
        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                Some(frame) = frames_rx.recv() => {
                    self.check_for_resize(terminal).await?;
                    tracing::trace!("Rendering frame");
                    // `BufferedTerminal` diffs against what's already on screen, so only the
                    // cells that changed are written.
                    terminal.draw_from_screen(&frame.surface, 0, 0);
                    terminal.flush()?;
                }
                Ok(message) = protocol_rx.recv() => {
                    if matches!(message, Protocol::End) {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Left the render loop");
        Ok(())
    }

    /// If the user's terminal has changed size, tell everyone else.
    async fn check_for_resize<T: TermwizTerminal + Send>(
        &mut self,
        terminal: &mut BufferedTerminal<T>,
    ) -> Result<()> {
        if !terminal.check_for_resize()? {
            return Ok(());
        }
        terminal.repaint()?;

        let (width, height) = terminal.dimensions();
        self.size = TTYSize {
            width: width.try_into()?,
            height: height.try_into()?,
        };
        tracing::debug!("User's terminal resized to {:?}", self.size);

        self.state
            .set_tty_size(self.size.width, self.size.height)
            .await;
        self.state.protocol_tx.send(Protocol::Resize {
            width: self.size.width,
            height: self.size.height,
        })?;

        Ok(())
    }
}

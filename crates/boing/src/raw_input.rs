//! Reading the user's keyboard and mouse from STDIN.

use std::io::Read as _;

use color_eyre::eyre::Result;

/// How many bytes are read from STDIN at a time.
const READ_SIZE: usize = 128;

/// A key press, mouse event or anything else `termwiz` could make sense of.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ParsedInput {
    /// The parsed event
    pub event: termwiz::input::InputEvent,
}

impl ParsedInput {
    /// Instantiate
    #[must_use]
    pub const fn new(event: termwiz::input::InputEvent) -> Self {
        Self { event }
    }
}

/// Parses STDIN on its own thread, broadcasting every event it finds.
pub struct RawInput {
    /// Where parsed events are sent
    protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
}

impl RawInput {
    /// Start reading. Reads block, so this is a plain thread rather than a Tokio task.
    #[must_use]
    pub fn start(
        protocol_tx: tokio::sync::broadcast::Sender<crate::run::Protocol>,
    ) -> std::thread::JoinHandle<Result<()>> {
        std::thread::spawn(move || {
            let input = Self { protocol_tx };
            let result = input.read_stdin(std::io::stdin());
            if result.is_err() {
                crate::run::broadcast_protocol_end(&input.protocol_tx);
            }
            result
        })
    }

    /// Keep reading until the reader closes.
    fn read_stdin<R: std::io::Read>(&self, source: R) -> Result<()> {
        tracing::debug!("Reading STDIN");
        let mut reader = std::io::BufReader::new(source);
        let mut parser = termwiz::input::InputParser::new();
        let mut buffer = [0; READ_SIZE];

        loop {
            let count = reader.read(&mut buffer)?;
            if count == 0 {
                tracing::debug!("STDIN closed");
                return Ok(());
            }

            let Some(bytes) = buffer.get(..count) else {
                continue;
            };
            tracing::trace!("STDIN bytes: {bytes:x?}");
            parser.parse(bytes, |event| self.broadcast(event), false);
        }
    }

    /// Send a parsed event to the rest of Boing.
    fn broadcast(&self, event: termwiz::input::InputEvent) {
        tracing::trace!("Parsed input: {event:?}");
        let message = crate::run::Protocol::Input(ParsedInput::new(event));
        if let Err(error) = self.protocol_tx.send(message) {
            tracing::error!("Couldn't broadcast input: {error:?}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bytes_become_key_events() {
        let (protocol_tx, mut protocol_rx) = tokio::sync::broadcast::channel(16);
        let input = RawInput { protocol_tx };

        input.read_stdin(&b"G "[..]).unwrap();

        let mut keys = Vec::new();
        while let Ok(crate::run::Protocol::Input(parsed)) = protocol_rx.try_recv() {
            if let termwiz::input::InputEvent::Key(key_event) = parsed.event {
                keys.push(key_event.key);
            }
        }
        assert_eq!(
            keys,
            vec![
                termwiz::input::KeyCode::Char('G'),
                termwiz::input::KeyCode::Char(' ')
            ]
        );
    }
}

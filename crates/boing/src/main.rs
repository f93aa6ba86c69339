//! Just `main()`. Keep as small as possible.

use color_eyre::eyre::Result;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (protocol_tx, _) = tokio::sync::broadcast::channel(1024);
    let state = boing::shared_state::SharedState::init_with_users_tty_size(protocol_tx).await?;
    let result = boing::run::run(&state).await;
    report(result, &state).await;

    Ok(())
}

/// Leave the terminal usable and tell the user how things went.
#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "The terminal is back to normal, so this is how we talk to the user"
)]
async fn report(result: Result<()>, state: &boing::shared_state::SharedState) {
    println!("{}", boing::utils::RESET_SCREEN);

    let log_path = state.config.read().await.log_path.clone();
    let is_logging = *state.is_logging.read().await;

    if let Err(error) = result {
        tracing::error!("{error:?}");
        eprintln!("Boing stopped with an error: {error}");
        if is_logging {
            eprintln!("Details are in {}", log_path.display());
        }
        return;
    }

    tracing::debug!("Boing exited normally");
    if is_logging {
        println!("Boing logged to {}", log_path.display());
    }
}

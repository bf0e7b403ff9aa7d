//! Client execution logic with reconnection support.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    domain::{ClientState, connect_url, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
    ui::PROMPT,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// How the client connects.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub url: String,
    /// Participant id to resume
    pub user_id: Option<String>,
    /// Display name announced with `join`
    pub name: Option<String>,
}

/// Read lines on a blocking thread and forward them to the async side.
///
/// The thread outlives individual connections so typing continues across reconnects.
fn spawn_readline(input_tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}

/// Run the WebSocket client with reconnection logic
pub async fn run_client(options: ClientOptions) -> Result<(), ClientError> {
    let state = Arc::new(Mutex::new(ClientState {
        participant_id: options.user_id,
        name: options.name,
        ..ClientState::default()
    }));

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    spawn_readline(input_tx);

    let mut reconnect_count = 0;

    loop {
        // Resume the participant learnt from the last init, if any
        let participant_id = state
            .lock()
            .map(|s| s.participant_id.clone())
            .unwrap_or_default();
        let url = connect_url(&options.url, participant_id.as_deref())?;

        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &mut input_rx, &state).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                return Ok(());
            }
            Err(e) if should_exit_immediately(&e) => {
                tracing::error!("{}. Exiting.", e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    return Err(ClientError::ReconnectExhausted(MAX_RECONNECT_ATTEMPTS));
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

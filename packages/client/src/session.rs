//! WebSocket client session management.

use std::sync::{MutexGuard, PoisonError};

use futures_util::{SinkExt, StreamExt};
use notecollab_server::infrastructure::dto::websocket::{ClientMessage, JoinPayload, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, http::StatusCode, protocol::Message},
};

use crate::{
    domain::{ClientState, Command, SharedState, USAGE, parse_command, to_message},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

fn lock_state(state: &SharedState) -> MutexGuard<'_, ClientState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply a server message to the local state and return what to print.
///
/// A `doc_state` can overtake `init` on a fresh connection. Such states are
/// held until `init` arrives, and the newer of the two wins. After `init`, a
/// `doc_state` never moves the local copy back to an older version. An empty
/// string means there is nothing to print.
pub(crate) fn apply_server_message(state: &mut ClientState, message: ServerMessage) -> String {
    match message {
        ServerMessage::Init(init) => {
            let formatted = MessageFormatter::format_init(&init);
            state.participant_id = Some(init.self_.id);
            // init is authoritative for this connection (the server may have restarted)
            state.document.apply_state(init.content, init.version);
            state.synced = true;
            if let Some(pending) = state.pending_state.take()
                && state.document.apply_if_not_older(pending.content, pending.version)
            {
                tracing::debug!("Applied doc_state that arrived before init");
            }
            formatted
        }
        ServerMessage::UserJoined(participant) => {
            MessageFormatter::format_user_joined(&participant)
        }
        ServerMessage::UserUpdated(participant) => {
            MessageFormatter::format_user_updated(&participant)
        }
        ServerMessage::UserLeft(payload) => MessageFormatter::format_user_left(&payload),
        ServerMessage::Cursor(payload) => MessageFormatter::format_cursor(&payload),
        ServerMessage::DocState(payload) if !state.synced => {
            state.hold_pending(payload);
            String::new()
        }
        ServerMessage::DocState(payload) => {
            let formatted = MessageFormatter::format_doc_state(&payload, state.document.version);
            if state.document.apply_if_not_older(payload.content, payload.version) {
                formatted
            } else {
                tracing::debug!("Ignoring doc_state older than the local copy");
                String::new()
            }
        }
        ServerMessage::Pong => MessageFormatter::format_pong(),
    }
}

fn map_connect_error(url: &str, error: tungstenite::Error) -> ClientError {
    match error {
        tungstenite::Error::Http(response)
            if response.status() == StatusCode::SERVICE_UNAVAILABLE =>
        {
            ClientError::CapacityExceeded
        }
        tungstenite::Error::Url(e) => {
            tracing::error!("Unusable URL: {}", e);
            ClientError::InvalidUrl(url.to_string())
        }
        other => ClientError::ConnectionError(other.to_string()),
    }
}

/// Run one WebSocket session until the connection drops or input ends.
///
/// Returns `Ok(())` when the user closes input (Ctrl+C / Ctrl+D).
pub async fn run_client_session(
    url: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    state: &SharedState,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| map_connect_error(url, e))?;

    tracing::info!("Connected to {}", url);
    println!("\nType lines to append them to the note. {}\n", USAGE);

    let (mut write, mut read) = ws_stream.split();

    // Announce the stored display name again after every (re)connect
    let name = {
        let mut guard = lock_state(state);
        guard.begin_connection();
        guard.name.clone()
    };
    if let Some(name) = name {
        let join = ClientMessage::Join(JoinPayload { name });
        match join.encode() {
            Ok(json) => write
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| ClientError::ConnectionError(e.to_string()))?,
            Err(e) => tracing::error!("Failed to serialize join: {}", e),
        }
    }

    let state_for_read = state.clone();

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match ServerMessage::decode(text.as_str()) {
                        Ok(message) => {
                            apply_server_message(&mut lock_state(&state_for_read), message)
                        }
                        Err(e) => {
                            tracing::debug!("Undecodable server message: {}", e);
                            MessageFormatter::format_raw_message(text.as_str())
                        }
                    };
                    if !formatted.is_empty() {
                        print!("{}", formatted);
                        redisplay_prompt();
                    }
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // Input closed: the user is leaving
                    read_task.abort();
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                };

                let command = parse_command(&line);
                let message = {
                    let mut guard = lock_state(state);
                    match &command {
                        Command::Show => {
                            print!("{}", MessageFormatter::format_document(&guard.document));
                            redisplay_prompt();
                        }
                        Command::Invalid(reason) => {
                            println!("{}", reason);
                            redisplay_prompt();
                        }
                        Command::Rename(name) => guard.name = Some(name.clone()),
                        _ => {}
                    }
                    to_message(&command, &guard.document)
                };

                let Some(message) = message else {
                    continue;
                };
                let json = match message.encode() {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send message: {}", e);
                    read_task.abort();
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
            }
        }
    }
}

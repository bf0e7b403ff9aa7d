//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::Outbound,
    usecase::{ConnectError, SessionError},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Participant to resume; absent or unknown ids get a fresh participant.
    pub user_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    if state.session.is_full() {
        tracing::warn!("Connection capacity reached. Rejecting upgrade.");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, query.user_id)))
}

/// Spawns a task that drains the connection's channel into the WebSocket sink.
///
/// Every write to this connection, whether a reply or a broadcast from another
/// connection's task, goes through this channel, so frames leave in the order
/// they were queued. A close instruction sends a Close frame and ends the task.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if let Err(e) = sender.send(Message::Text(text.into())).await {
                        tracing::error!("Failed to write to WebSocket: {}", e);
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, requested_id: Option<String>) {
    // Shutdown waits until this guard is dropped, after the cleanup below
    let _guard = state.connections.track();
    let (mut sender, mut receiver) = socket.split();

    // 1. 参加者の解決（既存 ID の参照、なければ新規発行）
    let participant = match state
        .resolve_participant_usecase
        .execute(requested_id)
        .await
    {
        Ok(participant) => participant,
        Err(e) => {
            tracing::error!("Failed to resolve participant: {}", e);
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    let participant_id = participant.id.clone();

    // 2. 登録と init の送信（init はチャンネルに積まれ、pusher タスクが書き出す）
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = match state.session.on_connect(participant, tx).await {
        Ok(connection) => connection,
        Err(ConnectError::CapacityExceeded { max }) => {
            tracing::warn!(
                "Connection capacity ({}) exceeded. Closing connection of '{}'",
                max,
                participant_id
            );
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
        Err(e) => {
            tracing::error!("Handshake with '{}' failed: {}", participant_id, e);
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    let connection_id = connection.id();
    tracing::info!(
        "Participant '{}' connected (connection '{}')",
        participant_id,
        connection_id
    );

    let state_clone = state.clone();
    let participant_id_clone = participant_id.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", participant_id_clone, text.as_str());

                    match state_clone
                        .session
                        .handle_text(connection_id, text.as_str())
                        .await
                    {
                        Ok(()) => {}
                        Err(SessionError::Decode(e)) => {
                            tracing::warn!(
                                "Dropping malformed message from '{}': {}",
                                participant_id_clone,
                                e
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Failed to handle message from '{}': {}",
                                participant_id_clone,
                                e
                            );
                        }
                    }
                }
                Message::Ping(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Participant '{}' requested close", participant_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push queued messages to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 3. 登録解除と user_left の通知
    state.session.on_disconnect(&connection_id, &participant_id);
    tracing::info!("Participant '{}' disconnected", participant_id);
}

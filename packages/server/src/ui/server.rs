//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{CollaborationSession, ResolveParticipantUseCase};

use super::{
    handler::{get_document, get_participants, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
    tracker::ConnectionTracker,
};

/// How long shutdown waits for open connections to finish their cleanup.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Collaboration server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(resolve_participant_usecase, session);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ResolveParticipantUseCase（参加者解決のユースケース）
    resolve_participant_usecase: Arc<ResolveParticipantUseCase>,
    /// CollaborationSession（接続ごとの処理の入口）
    session: Arc<CollaborationSession>,
    connections: Arc<ConnectionTracker>,
}

impl Server {
    pub fn new(
        resolve_participant_usecase: Arc<ResolveParticipantUseCase>,
        session: Arc<CollaborationSession>,
    ) -> Self {
        Self {
            resolve_participant_usecase,
            session,
            connections: Arc::new(ConnectionTracker::new()),
        }
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            resolve_participant_usecase: self.resolve_participant_usecase.clone(),
            session: self.session.clone(),
            connections: self.connections.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/document", get(get_document))
            .route("/api/participants", get(get_participants))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// On shutdown every registered connection is asked to close, so their
    /// tasks finish through the normal disconnect path. Returns once those
    /// tasks are done, or after [`DRAIN_TIMEOUT`].
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let session = self.session.clone();

        tracing::info!(
            "Collaboration server listening on {} (document '{}')",
            listener.local_addr()?,
            session.document_id()
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                session.close_all();
            })
            .await?;

        let live = self.connections.live();
        if live > 0 {
            tracing::info!("Waiting for {} connection(s) to close", live);
        }
        if tokio::time::timeout(DRAIN_TIMEOUT, self.connections.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} connection(s) still open after {:?}",
                self.connections.live(),
                DRAIN_TIMEOUT
            );
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

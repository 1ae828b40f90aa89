//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use irori_shared::time::{Clock, SystemClock};
use thiserror::Error;
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    coordinator::{Coordinator, CoordinatorHandle},
    infrastructure::{file_store::LocalFileStore, message_pusher::LineMessagePusher},
};

use super::{
    config::ServerConfig,
    connection::{ConnectionLimits, handle_connection},
    handler::{get_room_detail, get_rooms, health_check},
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Line-based TCP chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    clock: Arc<dyn Clock>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new Server instance with a custom clock
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Bind the listeners and start the coordinator, accept loop and HTTP API
    ///
    /// # Errors
    ///
    /// Returns an error if either listener fails to bind.
    pub async fn start(self) -> Result<RunningServer, ServerError> {
        // Initialize dependencies in order:
        // 1. Listeners
        // 2. MessagePusher / FileStore
        // 3. Coordinator
        // 4. Accept loop and HTTP API
        let chat_listener = bind(self.config.chat_bind_addr()).await?;
        let chat_addr = chat_listener.local_addr()?;
        let http_listener = match self.config.http_bind_addr() {
            Some(addr) => Some(bind(addr).await?),
            None => None,
        };
        let http_addr = http_listener
            .as_ref()
            .map(TcpListener::local_addr)
            .transpose()?;

        let message_pusher = Arc::new(LineMessagePusher::default());
        let file_store = Arc::new(LocalFileStore::new(self.config.files_dir.clone()));
        tracing::info!("Files are written to {}", file_store.root().display());

        let (coordinator, handle) = Coordinator::new(
            self.config.queue_capacity,
            message_pusher,
            file_store,
            self.clock,
        );
        let coordinator_task = coordinator.spawn();

        let limits = ConnectionLimits {
            outbound_capacity: self.config.outbound_capacity,
            max_line_bytes: self.config.max_line_bytes,
        };
        let (stop, stopped) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(
            chat_listener,
            handle.clone(),
            limits,
            stopped.clone(),
        ));
        tracing::info!("Chat server listening on {}", chat_addr);

        let http_task = http_listener.map(|listener| {
            tokio::spawn(serve_http(listener, handle.clone(), stopped))
        });
        if let Some(addr) = http_addr {
            tracing::info!("HTTP API listening on http://{}/api", addr);
        }

        Ok(RunningServer {
            chat_addr,
            http_addr,
            coordinator: handle,
            stop,
            accept_task,
            http_task,
            coordinator_task,
        })
    }

    /// Run the server until Ctrl+C or SIGTERM, then shut down gracefully
    pub async fn run(self) -> Result<(), ServerError> {
        let running = self.start().await?;
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        running.run_until(shutdown_signal()).await
    }
}

/// 起動済みのサーバー
pub struct RunningServer {
    chat_addr: SocketAddr,
    http_addr: Option<SocketAddr>,
    coordinator: CoordinatorHandle,
    stop: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
    http_task: Option<JoinHandle<std::io::Result<()>>>,
    coordinator_task: JoinHandle<()>,
}

impl RunningServer {
    /// チャット用 TCP の待ち受けアドレス
    pub fn chat_addr(&self) -> SocketAddr {
        self.chat_addr
    }

    /// HTTP API の待ち受けアドレス
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_addr
    }

    pub fn coordinator(&self) -> &CoordinatorHandle {
        &self.coordinator
    }

    /// `signal` が完了するまで動かし、その後停止する
    pub async fn run_until<F>(self, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        signal.await;
        self.shutdown().await
    }

    /// 新規接続と HTTP API を止め、Coordinator のキューを処理し切ってから全接続を閉じる
    pub async fn shutdown(self) -> Result<(), ServerError> {
        tracing::info!("Shutting down server");
        self.stop.send_replace(true);
        self.accept_task.await?;
        if let Some(http_task) = self.http_task {
            http_task.await??;
        }

        if let Err(e) = self.coordinator.shutdown().await {
            tracing::debug!("Coordinator already stopped: {}", e);
        }
        self.coordinator_task.await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn bind(addr: String) -> Result<TcpListener, ServerError> {
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

async fn accept_loop(
    listener: TcpListener,
    coordinator: CoordinatorHandle,
    limits: ConnectionLimits,
    mut stopped: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = stopped.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::info!("Accepted connection from {}", peer);
                    tokio::spawn(handle_connection(stream, peer, coordinator.clone(), limits));
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            },
        }
    }
    tracing::info!("Stopped accepting chat connections");
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_name}", get(get_room_detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_http(
    listener: TcpListener,
    coordinator: CoordinatorHandle,
    mut stopped: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let app = router(Arc::new(AppState::new(coordinator)));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            stopped.changed().await.ok();
        })
        .await
}

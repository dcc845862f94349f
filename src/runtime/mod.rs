use crate::config::ServerConfig;
use crate::registry::SessionRegistry;
use crate::scheduler::TickScheduler;
use crate::transport::manager::{ConnectionManager, ManagerStats};
use crate::transport::ws_session::handle_socket;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    #[serde(flatten)]
    stats: ManagerStats,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let registry = Arc::new(SessionRegistry::new());
    let scheduler = TickScheduler::new(config.tick_interval, Arc::clone(&registry));
    let manager = ConnectionManager::new(registry, scheduler, config.requeue_after_game);

    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(tick_ms = config.tick_interval.as_millis() as u64, "listening on {address}");

    serve(listener, manager, shutdown_signal()).await
}

pub async fn serve(
    listener: tokio::net::TcpListener,
    manager: Arc<ConnectionManager>,
    signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let shutdown_manager = Arc::clone(&manager);
    axum::serve(listener, router(manager))
        .with_graceful_shutdown(async move {
            signal.await;
            shutdown_manager.shutdown();
        })
        .await?;
    Ok(())
}

pub fn router(manager: Arc<ConnectionManager>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(manager)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(manager): State<Arc<ConnectionManager>>,
) -> impl IntoResponse {
    if !manager.is_running() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                ok: false,
                error: "Server shutting down".to_string(),
            }),
        )
            .into_response();
    }
    ws.on_failed_upgrade(|error| tracing::warn!(%error, "websocket handshake failed"))
        .on_upgrade(move |socket| handle_socket(socket, manager))
        .into_response()
}

async fn health(State(manager): State<Arc<ConnectionManager>>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        stats: manager.stats(),
    })
}

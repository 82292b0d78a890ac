//! Intake Web Server
//!
//! Axum-based server for the intake dashboard: the create-intake endpoint,
//! record API, stored photos, and the `/ws/records/` live feed.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod photos;
pub mod routes;
pub mod state;
pub mod websocket;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

pub use config::ServerConfig;
pub use state::AppState;

use photos::PhotoStore;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/records", get(routes::records::list_records))
        .route("/records/{id}", get(routes::records::get_record));

    let mut router = Router::new()
        .route("/", get(routes::dashboard::index))
        .route(
            "/records/create/",
            post(routes::records::create_record)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .nest("/api", api_routes)
        .route("/ws/records/", get(websocket::ws_handler))
        .route("/health", get(routes::health::health));

    if let Some(mount) = state.config.media_mount() {
        router = router.nest_service(mount, ServeDir::new(state.photos.root()));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Open the database and photo store named by `config`.
pub async fn build_state(config: ServerConfig) -> anyhow::Result<AppState> {
    let db = Arc::new(intake_db::init_pool(&config.db_path)?);
    let photos = PhotoStore::new(config.media_dir.clone()).await?;
    info!(
        db = %config.db_path.display(),
        media = %config.media_dir.display(),
        "Storage ready"
    );
    Ok(AppState::new(db, photos, config))
}

/// Serve on an already-bound listener until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Web server stopped");
    Ok(())
}

/// Run the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let state = build_state(config).await?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", listener.local_addr()?);

    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

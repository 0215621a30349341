use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use order_merger_rust::{api, AppConfig, MergerService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // Load configuration
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // One shared merger service; every request runs its own pipeline pass
    let merger = Arc::new(MergerService::new(config.pipeline.clone()));

    // Build routes
    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/merge", post(api::merge_download))
        .route("/api/merge/preview", post(api::merge_preview))
        .with_state(merger)
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(config.server.max_upload_bytes)));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/merge          - merge uploaded order files into a workbook download");
    info!("  POST /api/merge/preview  - merge uploaded order files, return a JSON preview");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

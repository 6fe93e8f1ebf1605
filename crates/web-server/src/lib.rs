use analysis::AnalysisService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::Config;
use market_data::YahooChartClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

/// Builds the application router around an already-constructed service.
/// Separated from `run_server` so a caller can mount the routes on its own
/// listener.
pub fn router(service: Arc<AnalysisService>) -> Router {
    let app_state = Arc::new(AppState { service });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/exports/:file_name", get(handlers::download_export))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 64)) // Requests are tiny JSON bodies.
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    let provider = YahooChartClient::new(&config.provider);
    let service = Arc::new(AnalysisService::new(Arc::new(provider), config.analysis));
    let app = router(service);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

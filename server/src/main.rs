use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkshelf_server::config::Config;
use linkshelf_server::handlers;
use linkshelf_server::metadata::MetadataExtractor;
use linkshelf_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing: JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linkshelf_server=info,tower_http=info"));

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Linkshelf Server starting...");

    let config = Config::from_env();
    info!("📝 Configuration loaded");

    let extractor = MetadataExtractor::new().expect("Failed to build HTTP client");

    // CORS: permissive in dev, restrictive in production.
    let cors = if config.is_dev {
        info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        tracing::warn!("🔒 CORS: restrictive (production mode)");
        CorsLayer::new()
    };

    let addr = config.server_addr();

    if !config.static_dir.is_dir() {
        tracing::warn!(
            "Static directory {} not found; front-end requests will 404",
            config.static_dir.display()
        );
    }
    info!("📂 Static directory: {}", config.static_dir.display());

    let app_state = AppState { extractor };

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    // Build router
    let app = Router::new()
        // Health check + metrics
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .route("/api/metadata", get(handlers::metadata::get_metadata))
        // Front-end: `/` maps to index.html, anything else to a file under static_dir.
        .fallback_service(ServeDir::new(&config.static_dir))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer)
        .layer(cors)
        .with_state(app_state);

    // Start server
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

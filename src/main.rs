use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rankdash::{
    api,
    config::AppConfig,
    content::{ContentProvider, InMemoryContent},
    state::AppState,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rankdash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RankDash...");

    let config = AppConfig::from_env();

    let content = match InMemoryContent::load(&config.content_path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                "Failed to load question sets from {}: {}. No rounds can be started.",
                config.content_path.display(),
                e
            );
            InMemoryContent::default()
        }
    };

    let content: Arc<dyn ContentProvider> = Arc::new(content);
    tracing::info!("Serving questions from the {} content store", content.name());

    let addr = config.addr;
    let state = Arc::new(AppState::new(content).with_config(config));

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anirec_api::api::{create_router, AppState};
use anirec_api::config::Config;
use anirec_api::services::{load_graph, JsonFileSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anirec_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(catalog = %config.catalog_path, "Loading catalog");

    let source = JsonFileSource::new(&config.catalog_path);
    let graph = load_graph(&source).await?;

    let state = AppState::new(graph, config.recommend_options());
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}
